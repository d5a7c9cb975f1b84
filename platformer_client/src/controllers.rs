/**
 * Per-entity controllers.
 *
 * Each controller owns a state machine and drives the engine collaborators
 * through two narrow traits: a physics [`Body`] for the local player and an
 * [`Animator`] that plays a clip by state name. Remote entities never touch
 * physics; their positions come from the interpolator.
 */
use platformer_common::{AttackSlot, EnemyState, Facing, PlayerState};

use crate::actions::{report, GameActions};
use crate::config::{ClientConfig, StateDurations};
use crate::interpolation::Interpolator;
use crate::prediction::PositionReporter;
use crate::reconciliation::{PositionReconciliationService, Reconciliation};
use crate::state_machine::{StateHooks, StateMachine};
use crate::world_cache::{PlayerRow, SpawnRow};

/// Horizontal speed below which a grounded body counts as standing still
const WALK_EPSILON: f32 = 1.0;

/// Report intervals a sent position may go unanswered before the client
/// checks itself against the last authoritative row
const REPLY_GRACE_REPORTS: f32 = 2.0;

/// Physics body of the local player
pub trait Body {
    fn position(&self) -> (f32, f32);
    fn velocity(&self) -> (f32, f32);
    fn on_floor(&self) -> bool;
    fn set_position(&mut self, position: (f32, f32));
}

/// Sprite animation sink; the core only ever names a state
pub trait Animator {
    fn play(&mut self, clip: &str);
}

/// Locomotion state implied by the body
fn locomotion(body: &impl Body) -> PlayerState {
    if !body.on_floor() {
        PlayerState::Jump
    } else if body.velocity().0.abs() > WALK_EPSILON {
        PlayerState::Walk
    } else {
        PlayerState::Idle
    }
}

struct PlayerHooks<'a, A> {
    animator: &'a mut A,
    durations: &'a StateDurations,
    // locomotion to resume once an attack or hit reaction ends
    resume: PlayerState,
}

impl<A: Animator> StateHooks<PlayerState> for PlayerHooks<'_, A> {
    fn enter(&mut self, state: PlayerState) {
        self.animator.play(state.name());
    }

    fn exit(&mut self, _state: PlayerState) {}

    fn duration(&self, state: PlayerState) -> Option<f32> {
        match state {
            PlayerState::Damaged => Some(self.durations.player_damaged),
            s => AttackSlot::from_player_state(s).map(|slot| self.durations.attack[slot.index() as usize - 1]),
        }
    }

    fn on_timeout(&mut self, _state: PlayerState) -> PlayerState {
        self.resume
    }
}

/// The locally controlled player: prediction, reporting and reconciliation
pub struct PlayerController<B, A> {
    body: B,
    animator: A,
    machine: StateMachine<PlayerState>,
    facing: Facing,
    durations: StateDurations,
    reporter: PositionReporter,
    reconciler: PositionReconciliationService,
    last_server_hp: Option<u32>,
    server_position: Option<(f32, f32)>,
    // seconds since a report that no row has answered yet
    unanswered_for: Option<f32>,
    reply_grace: f32,
}

impl<B: Body, A: Animator> PlayerController<B, A> {
    pub fn new(body: B, mut animator: A, config: &ClientConfig) -> Self {
        let durations = config.durations.clone();
        let mut hooks = PlayerHooks { animator: &mut animator, durations: &durations, resume: PlayerState::Idle };
        let machine = StateMachine::new("player", PlayerState::Idle, &mut hooks);
        Self {
            body,
            animator,
            machine,
            facing: Facing::Right,
            durations,
            reporter: PositionReporter::new(config.position_report_secs()),
            reconciler: PositionReconciliationService::new(config.reconcile_threshold),
            last_server_hp: None,
            server_position: None,
            unanswered_for: None,
            reply_grace: config.position_report_secs() * REPLY_GRACE_REPORTS,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.machine.current()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    fn with_hooks<R>(&mut self, f: impl FnOnce(&mut StateMachine<PlayerState>, &mut PlayerHooks<'_, A>) -> R) -> R {
        let resume = locomotion(&self.body);
        let mut hooks = PlayerHooks { animator: &mut self.animator, durations: &self.durations, resume };
        f(&mut self.machine, &mut hooks)
    }

    /// Local request (input, game logic). On success the server is told too.
    pub fn request(&mut self, state: PlayerState, actions: &impl GameActions) -> bool {
        let changed = self.with_hooks(|machine, hooks| machine.transition_to(state, hooks));
        if changed {
            report("update_player_state", actions.update_player_state(state));
        }
        changed
    }

    /// Start an attack and send the candidate targets to the server
    pub fn attack(&mut self, slot: AttackSlot, spawn_ids: Vec<u32>, actions: &impl GameActions) -> bool {
        if !self.request(slot.player_state(), actions) {
            return false;
        }
        report("damage_enemy", actions.damage_enemy(spawn_ids, slot));
        true
    }

    /// Per-frame step: follow the body with the locomotion states, fire state
    /// timeouts and report the position on its cadence
    pub fn update(&mut self, dt: f32, actions: &impl GameActions) {
        let (vx, _) = self.body.velocity();
        if vx.abs() > WALK_EPSILON {
            self.facing = if vx < 0.0 { Facing::Left } else { Facing::Right };
        }

        let before = self.machine.current();
        self.with_hooks(|machine, hooks| machine.update(dt, hooks));
        let current = self.machine.current();
        if current != before {
            report("update_player_state", actions.update_player_state(current));
        }
        if matches!(current, PlayerState::Idle | PlayerState::Walk | PlayerState::Jump) {
            let wanted = locomotion(&self.body);
            if wanted != current {
                self.request(wanted, actions);
            }
        }

        self.check_unanswered(dt);

        if current != PlayerState::Dead {
            let position = self.body.position();
            let sent = self.reporter.tick(dt, position, self.facing, actions);
            if matches!(sent, Ok(true)) && self.unanswered_for.is_none() {
                self.unanswered_for = Some(0.0);
            }
            report("update_player_position", sent.map(|_| ()));
        }
    }

    /// A rejected move changes no row, so silence past the grace window means
    /// the last authoritative position still stands
    fn check_unanswered(&mut self, dt: f32) {
        let Some(waited) = self.unanswered_for.as_mut() else {
            return;
        };
        *waited += dt;
        if *waited < self.reply_grace {
            return;
        }
        self.unanswered_for = None;
        if let Some(server) = self.server_position {
            if matches!(self.reconciler.reconcile(&mut self.body, server), Reconciliation::Snapped { .. }) {
                self.reporter.reset();
            }
        }
    }

    /// Authoritative row for this player arrived
    pub fn on_server_row(&mut self, row: &PlayerRow) -> Reconciliation {
        self.server_position = Some((row.x, row.y));
        self.unanswered_for = None;
        let reconciled = self.reconciler.reconcile(&mut self.body, (row.x, row.y));
        if matches!(reconciled, Reconciliation::Snapped { .. }) {
            self.reporter.reset();
        }

        let local = self.machine.current();
        let fresh_hit = self.last_server_hp.is_some_and(|hp| row.hp < hp);
        self.last_server_hp = Some(row.hp);
        // the server only ever forces death, hit reactions and the respawn;
        // echoes of an already finished hit reaction are ignored
        let adopt = match row.state {
            PlayerState::Dead => local != PlayerState::Dead,
            PlayerState::Damaged => fresh_hit,
            PlayerState::Idle => local == PlayerState::Dead,
            _ => false,
        };
        if adopt {
            self.with_hooks(|machine, hooks| machine.apply_authoritative(row.state, hooks));
        }
        reconciled
    }
}

struct RemoteHooks<'a, A> {
    animator: &'a mut A,
    damaged_secs: f32,
    recovered: bool,
}

impl<A: Animator> StateHooks<PlayerState> for RemoteHooks<'_, A> {
    fn enter(&mut self, state: PlayerState) {
        self.animator.play(state.name());
    }

    fn exit(&mut self, _state: PlayerState) {}

    fn on_timeout(&mut self, state: PlayerState) -> PlayerState {
        state
    }
}

impl<A: Animator> StateHooks<EnemyState> for RemoteHooks<'_, A> {
    fn enter(&mut self, state: EnemyState) {
        self.animator.play(state.name());
    }

    fn exit(&mut self, _state: EnemyState) {}

    fn duration(&self, state: EnemyState) -> Option<f32> {
        (state == EnemyState::Damaged).then_some(self.damaged_secs)
    }

    fn on_timeout(&mut self, _state: EnemyState) -> EnemyState {
        self.recovered = true;
        EnemyState::Idle
    }
}

/// Another player, driven entirely by its server row
pub struct PeerController<A> {
    animator: A,
    machine: StateMachine<PlayerState>,
    interpolator: Interpolator,
    facing: Facing,
}

impl<A: Animator> PeerController<A> {
    pub fn new(row: &PlayerRow, mut animator: A, config: &ClientConfig) -> Self {
        let mut hooks = RemoteHooks { animator: &mut animator, damaged_secs: 0.0, recovered: false };
        let machine = StateMachine::new("peer", row.state, &mut hooks);
        Self {
            animator,
            machine,
            interpolator: Interpolator::new((row.x, row.y), config.interpolation_secs(), config.teleport_threshold),
            facing: row.facing,
        }
    }

    pub fn on_server_row(&mut self, row: &PlayerRow) {
        self.interpolator.set_target((row.x, row.y));
        self.facing = row.facing;
        if row.state != self.machine.current() {
            let mut hooks = RemoteHooks { animator: &mut self.animator, damaged_secs: 0.0, recovered: false };
            self.machine.apply_authoritative(row.state, &mut hooks);
        }
    }

    /// Position to render this frame
    pub fn update(&mut self, dt: f32) -> (f32, f32) {
        self.interpolator.advance(dt)
    }

    pub fn state(&self) -> PlayerState {
        self.machine.current()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn position(&self) -> (f32, f32) {
        self.interpolator.position()
    }
}

/// A server spawn. Plays its hit reaction locally and tells the server when it ends.
pub struct EnemyController<A> {
    spawn_id: u32,
    animator: A,
    machine: StateMachine<EnemyState>,
    interpolator: Interpolator,
    facing: Facing,
    damaged_secs: f32,
    last_server_hp: u32,
}

impl<A: Animator> EnemyController<A> {
    pub fn new(row: &SpawnRow, mut animator: A, config: &ClientConfig) -> Self {
        let damaged_secs = config.durations.enemy_damaged;
        let mut hooks = RemoteHooks { animator: &mut animator, damaged_secs, recovered: false };
        let machine = StateMachine::new("enemy", row.state, &mut hooks);
        Self {
            spawn_id: row.spawn_id,
            animator,
            machine,
            interpolator: Interpolator::new((row.x, row.y), config.interpolation_secs(), config.teleport_threshold),
            facing: row.facing,
            damaged_secs,
            last_server_hp: row.hp,
        }
    }

    pub fn on_server_row(&mut self, row: &SpawnRow) {
        self.interpolator.set_target((row.x, row.y));
        self.facing = row.facing;
        let fresh_hit = row.hp < self.last_server_hp;
        self.last_server_hp = row.hp;
        // a Damaged row only counts for a new hit, which also restarts a running reaction
        let adopt = if row.state == EnemyState::Damaged {
            fresh_hit
        } else {
            row.state != self.machine.current()
        };
        if adopt {
            let mut hooks = RemoteHooks { animator: &mut self.animator, damaged_secs: self.damaged_secs, recovered: false };
            self.machine.apply_authoritative(row.state, &mut hooks);
        }
    }

    /// Advance interpolation and the hit-reaction timer. When the reaction
    /// ends the server is asked to clear `Damaged` as well.
    pub fn update(&mut self, dt: f32, actions: &impl GameActions) -> (f32, f32) {
        let mut hooks = RemoteHooks { animator: &mut self.animator, damaged_secs: self.damaged_secs, recovered: false };
        self.machine.update(dt, &mut hooks);
        if hooks.recovered {
            report("recover_from_damage", actions.recover_from_damage(self.spawn_id));
        }
        self.interpolator.advance(dt)
    }

    pub fn spawn_id(&self) -> u32 {
        self.spawn_id
    }

    pub fn state(&self) -> EnemyState {
        self.machine.current()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn position(&self) -> (f32, f32) {
        self.interpolator.position()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::actions::tests::FakeActions;
    use crate::world_cache::tests::{player_row, spawn_row};
    use spacetimedb_sdk::Identity;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub struct FakeBody {
        pub position: (f32, f32),
        pub velocity: (f32, f32),
        pub on_floor: bool,
    }

    impl FakeBody {
        pub fn at(x: f32, y: f32) -> Self {
            Self { position: (x, y), velocity: (0.0, 0.0), on_floor: true }
        }
    }

    impl Body for FakeBody {
        fn position(&self) -> (f32, f32) {
            self.position
        }
        fn velocity(&self) -> (f32, f32) {
            self.velocity
        }
        fn on_floor(&self) -> bool {
            self.on_floor
        }
        fn set_position(&mut self, position: (f32, f32)) {
            self.position = position;
        }
    }

    /// Shares the list of played clips with the test
    #[derive(Clone, Default)]
    pub struct FakeAnimator {
        pub played: Rc<RefCell<Vec<String>>>,
    }

    impl Animator for FakeAnimator {
        fn play(&mut self, clip: &str) {
            self.played.borrow_mut().push(clip.to_string());
        }
    }

    fn player() -> (PlayerController<FakeBody, FakeAnimator>, FakeAnimator) {
        let animator = FakeAnimator::default();
        let controller = PlayerController::new(FakeBody::at(100.0, 100.0), animator.clone(), &ClientConfig::default());
        (controller, animator)
    }

    #[test]
    fn walking_body_drives_walk_state() {
        let (mut controller, animator) = player();
        let actions = FakeActions::default();
        controller.body_mut().velocity = (-120.0, 0.0);
        controller.update(0.016, &actions);
        assert_eq!(controller.state(), PlayerState::Walk);
        assert_eq!(controller.facing(), Facing::Left);
        assert_eq!(*animator.played.borrow(), vec!["idle", "walk"]);
        assert!(actions.calls().contains(&"state walk".to_string()));
    }

    #[test]
    fn attack_locks_until_its_own_timeout() {
        let (mut controller, _) = player();
        let actions = FakeActions::default();
        assert!(controller.attack(AttackSlot::Attack1, vec![4, 5], &actions));
        assert!(actions.calls().contains(&"damage [4, 5] 1".to_string()));

        controller.body_mut().velocity = (150.0, 0.0);
        assert!(!controller.request(PlayerState::Walk, &actions));
        controller.update(0.2, &actions);
        assert_eq!(controller.state(), PlayerState::Attack1);

        // default attack1 lasts 0.4s; the timeout hands over to the body's locomotion
        controller.update(0.25, &actions);
        assert_eq!(controller.state(), PlayerState::Walk);
    }

    #[test]
    fn server_death_and_respawn_are_adopted() {
        let (mut controller, _) = player();
        let mut row = player_row(Identity::ZERO, 100.0, 100.0);
        row.hp = 0;
        row.state = PlayerState::Dead;
        controller.on_server_row(&row);
        assert_eq!(controller.state(), PlayerState::Dead);

        row.hp = 100;
        row.state = PlayerState::Idle;
        controller.on_server_row(&row);
        assert_eq!(controller.state(), PlayerState::Idle);
    }

    #[test]
    fn desynced_row_snaps_body() {
        let (mut controller, _) = player();
        let row = player_row(Identity::ZERO, 400.0, 100.0);
        let outcome = controller.on_server_row(&row);
        assert!(matches!(outcome, Reconciliation::Snapped { .. }));
        assert_eq!(controller.body().position(), (400.0, 100.0));
    }

    #[test]
    fn unanswered_report_falls_back_to_server_position() {
        let (mut controller, _) = player();
        let actions = FakeActions::default();
        controller.on_server_row(&player_row(Identity::ZERO, 100.0, 100.0));

        // a frame hitch carries the body past the move cap; the server drops the report
        controller.body_mut().position = (450.0, 100.0);
        controller.update(0.1, &actions);
        assert_eq!(controller.body().position(), (450.0, 100.0));
        for _ in 0..3 {
            controller.update(0.1, &actions);
        }
        assert_eq!(controller.body().position(), (100.0, 100.0));
        assert_eq!(actions.calls(), vec!["position 450 100 Right", "position 100 100 Right"]);
    }

    #[test]
    fn answered_report_keeps_prediction() {
        let (mut controller, _) = player();
        let actions = FakeActions::default();
        controller.on_server_row(&player_row(Identity::ZERO, 100.0, 100.0));
        controller.body_mut().position = (150.0, 100.0);
        controller.update(0.1, &actions);
        controller.on_server_row(&player_row(Identity::ZERO, 150.0, 100.0));
        for _ in 0..5 {
            controller.update(0.1, &actions);
        }
        assert_eq!(controller.body().position(), (150.0, 100.0));
    }

    #[test]
    fn peer_interpolates_and_mirrors_state() {
        let animator = FakeAnimator::default();
        let config = ClientConfig::default();
        let mut row = player_row(Identity::ZERO, 0.0, 0.0);
        let mut peer = PeerController::new(&row, animator.clone(), &config);
        row.x = 40.0;
        row.state = PlayerState::Walk;
        peer.on_server_row(&row);
        let (x, _) = peer.update(0.05);
        assert!(x > 0.0 && x < 40.0);
        assert_eq!(peer.update(0.05), (40.0, 0.0));
        assert_eq!(peer.state(), PlayerState::Walk);
        assert_eq!(*animator.played.borrow(), vec!["idle", "walk"]);
    }

    #[test]
    fn enemy_hit_reaction_reports_recovery() {
        let actions = FakeActions::default();
        let mut row = spawn_row(9, 50.0);
        let mut enemy = EnemyController::new(&row, FakeAnimator::default(), &ClientConfig::default());
        row.state = EnemyState::Damaged;
        row.hp = 20;
        enemy.on_server_row(&row);
        assert_eq!(enemy.state(), EnemyState::Damaged);

        enemy.update(0.3, &actions);
        assert!(actions.calls().is_empty());
        enemy.update(0.3, &actions);
        assert_eq!(enemy.state(), EnemyState::Idle);
        assert_eq!(actions.calls(), vec!["recover 9"]);

        // the server row still says Damaged until the recovery lands
        enemy.on_server_row(&row);
        assert_eq!(enemy.state(), EnemyState::Idle);
    }
}
