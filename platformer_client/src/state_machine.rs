//! Finite state machine shared by the player, peer and enemy controllers.
//!
//! Legality comes from the adjacency tables in `platformer_common`. A
//! transition always exits the old state before entering the new one, and a
//! rejected request leaves the machine untouched.

use std::fmt::Debug;

use platformer_common::{EnemyState, PlayerState};

/// A state with a fixed set of outgoing edges
pub trait MachineState: Copy + Eq + Debug + 'static {
    fn name(self) -> &'static str;
    fn allowed_transitions(self) -> &'static [Self];
}

impl MachineState for PlayerState {
    fn name(self) -> &'static str {
        PlayerState::name(self)
    }

    fn allowed_transitions(self) -> &'static [Self] {
        PlayerState::allowed_transitions(self)
    }
}

impl MachineState for EnemyState {
    fn name(self) -> &'static str {
        EnemyState::name(self)
    }

    fn allowed_transitions(self) -> &'static [Self] {
        EnemyState::allowed_transitions(self)
    }
}

/// Who asked for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    /// Input or game logic; must follow the adjacency table
    External,
    /// The current state's own duration ran out
    Timeout,
    /// The server row says so
    Authority,
}

/// Per-state behaviour plugged into a [`StateMachine`]
pub trait StateHooks<S> {
    fn enter(&mut self, state: S);
    fn exit(&mut self, state: S);
    fn update(&mut self, _state: S, _dt: f32) {}
    /// Seconds after which `state` ends on its own
    fn duration(&self, _state: S) -> Option<f32> {
        None
    }
    /// Where a timed-out state goes next
    fn on_timeout(&mut self, state: S) -> S;
}

#[derive(Debug)]
pub struct StateMachine<S> {
    label: &'static str,
    current: S,
    elapsed: f32,
    deadline: Option<f32>,
}

impl<S: MachineState> StateMachine<S> {
    /// Enters `initial` right away
    pub fn new(label: &'static str, initial: S, hooks: &mut impl StateHooks<S>) -> Self {
        hooks.enter(initial);
        Self { label, current: initial, elapsed: 0.0, deadline: hooks.duration(initial) }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Seconds spent in the current state
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Request a transition from input or game logic. Edges missing from the
    /// adjacency table are logged and refused.
    pub fn transition_to(&mut self, next: S, hooks: &mut impl StateHooks<S>) -> bool {
        self.request(next, TransitionSource::External, hooks)
    }

    /// Adopt the server's state. Always applied; re-entering the same state restarts it.
    pub fn apply_authoritative(&mut self, next: S, hooks: &mut impl StateHooks<S>) -> bool {
        self.request(next, TransitionSource::Authority, hooks)
    }

    /// Advance time; fires the state's own timeout when its duration is up
    pub fn update(&mut self, dt: f32, hooks: &mut impl StateHooks<S>) {
        self.elapsed += dt;
        hooks.update(self.current, dt);
        if self.deadline.is_some_and(|deadline| self.elapsed >= deadline) {
            let next = hooks.on_timeout(self.current);
            if next == self.current {
                self.deadline = None;
                return;
            }
            self.request(next, TransitionSource::Timeout, hooks);
        }
    }

    fn request(&mut self, next: S, source: TransitionSource, hooks: &mut impl StateHooks<S>) -> bool {
        let permitted = match source {
            TransitionSource::External => self.current.allowed_transitions().contains(&next),
            TransitionSource::Timeout | TransitionSource::Authority => true,
        };
        if next == self.current && source != TransitionSource::Authority {
            return false;
        }
        if !permitted {
            log::warn!(
                "{}: rejected {} -> {} ({:?})",
                self.label,
                self.current.name(),
                next.name(),
                source
            );
            return false;
        }

        let previous = self.current;
        hooks.exit(previous);
        self.current = next;
        self.elapsed = 0.0;
        self.deadline = hooks.duration(next);
        hooks.enter(next);
        log::debug!("{}: {} -> {} ({:?})", self.label, previous.name(), next.name(), source);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records hook calls and times out attacks after 0.5s
    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        after_attack: Option<PlayerState>,
    }

    impl StateHooks<PlayerState> for Recorder {
        fn enter(&mut self, state: PlayerState) {
            self.log.push(format!("enter {}", state.name()));
        }
        fn exit(&mut self, state: PlayerState) {
            self.log.push(format!("exit {}", state.name()));
        }
        fn duration(&self, state: PlayerState) -> Option<f32> {
            state.is_attack().then_some(0.5)
        }
        fn on_timeout(&mut self, _state: PlayerState) -> PlayerState {
            self.after_attack.unwrap_or(PlayerState::Idle)
        }
    }

    #[test]
    fn exits_before_entering() {
        let mut hooks = Recorder::default();
        let mut machine = StateMachine::new("player", PlayerState::Idle, &mut hooks);
        assert!(machine.transition_to(PlayerState::Walk, &mut hooks));
        assert_eq!(hooks.log, vec!["enter idle", "exit idle", "enter walk"]);
    }

    #[test]
    fn external_attack_to_walk_is_rejected() {
        let mut hooks = Recorder::default();
        let mut machine = StateMachine::new("player", PlayerState::Idle, &mut hooks);
        assert!(machine.transition_to(PlayerState::Attack1, &mut hooks));
        let before = hooks.log.len();
        assert!(!machine.transition_to(PlayerState::Walk, &mut hooks));
        assert_eq!(machine.current(), PlayerState::Attack1);
        assert_eq!(hooks.log.len(), before, "rejected transition must not run hooks");
    }

    #[test]
    fn attack_timeout_may_release_to_walk() {
        let mut hooks = Recorder { after_attack: Some(PlayerState::Walk), ..Default::default() };
        let mut machine = StateMachine::new("player", PlayerState::Walk, &mut hooks);
        machine.transition_to(PlayerState::Attack2, &mut hooks);
        machine.update(0.3, &mut hooks);
        assert_eq!(machine.current(), PlayerState::Attack2);
        machine.update(0.3, &mut hooks);
        assert_eq!(machine.current(), PlayerState::Walk);
    }

    #[test]
    fn authority_overrides_adjacency() {
        let mut hooks = Recorder::default();
        let mut machine = StateMachine::new("player", PlayerState::Attack3, &mut hooks);
        assert!(machine.apply_authoritative(PlayerState::Dead, &mut hooks));
        assert!(!machine.transition_to(PlayerState::Walk, &mut hooks));
        assert!(machine.apply_authoritative(PlayerState::Idle, &mut hooks));
    }

    #[test]
    fn same_state_request_is_ignored() {
        let mut hooks = Recorder::default();
        let mut machine = StateMachine::new("player", PlayerState::Idle, &mut hooks);
        assert!(!machine.transition_to(PlayerState::Idle, &mut hooks));
        assert_eq!(hooks.log, vec!["enter idle"]);
    }

    #[test]
    fn enemy_dead_is_terminal_for_external_requests() {
        struct Quiet;
        impl StateHooks<EnemyState> for Quiet {
            fn enter(&mut self, _: EnemyState) {}
            fn exit(&mut self, _: EnemyState) {}
            fn on_timeout(&mut self, _: EnemyState) -> EnemyState {
                EnemyState::Idle
            }
        }
        let mut machine = StateMachine::new("enemy", EnemyState::Dead, &mut Quiet);
        assert!(!machine.transition_to(EnemyState::Idle, &mut Quiet));
        assert_eq!(machine.current(), EnemyState::Dead);
    }
}
