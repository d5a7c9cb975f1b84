//! Discrete entity states and their adjacency tables.
//!
//! The same tables back two interpretations: the module uses them as a pure
//! legality filter on requested state changes, the client uses them to gate
//! its per-entity state machines. Keeping them here means the rules exist once.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

/// Horizontal facing of a player or spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing that points from `from_x` toward `to_x`, or `fallback` when they coincide
    pub fn toward(from_x: f32, to_x: f32, fallback: Facing) -> Self {
        if to_x > from_x {
            Facing::Right
        } else if to_x < from_x {
            Facing::Left
        } else {
            fallback
        }
    }
}

/**
 * Player state shared by the authoritative row and the client state machines.
 *
 * `Jump` is only ever entered by client prediction (it depends on the
 * engine's on-floor predicate) but is part of the table so a reported jump is
 * not treated as an illegal state.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
pub enum PlayerState {
    Idle,
    Walk,
    Jump,
    Attack1,
    Attack2,
    Attack3,
    Climbing,
    Damaged,
    Dead,
}

use PlayerState as P;

const FROM_IDLE: &[PlayerState] = &[P::Walk, P::Jump, P::Climbing, P::Attack1, P::Attack2, P::Attack3, P::Damaged, P::Dead];
const FROM_WALK: &[PlayerState] = &[P::Idle, P::Jump, P::Climbing, P::Attack1, P::Attack2, P::Attack3, P::Damaged, P::Dead];
const FROM_JUMP: &[PlayerState] = &[P::Idle, P::Walk, P::Climbing, P::Attack1, P::Attack2, P::Attack3, P::Damaged, P::Dead];
// attack states are locked until their own timeout hands control back to Idle
const FROM_ATTACK: &[PlayerState] = &[P::Idle, P::Damaged, P::Dead];
const FROM_CLIMBING: &[PlayerState] = &[P::Idle, P::Walk, P::Jump, P::Damaged, P::Dead];
const FROM_DAMAGED: &[PlayerState] = &[P::Idle, P::Walk, P::Dead];
// leaving Dead is only possible through a respawn
const FROM_DEAD: &[PlayerState] = &[P::Idle];

impl PlayerState {
    pub const ALL: [PlayerState; 9] = [
        P::Idle,
        P::Walk,
        P::Jump,
        P::Attack1,
        P::Attack2,
        P::Attack3,
        P::Climbing,
        P::Damaged,
        P::Dead,
    ];

    /// Animation clip key requested from the sprite system
    pub fn name(self) -> &'static str {
        match self {
            P::Idle => "idle",
            P::Walk => "walk",
            P::Jump => "jump",
            P::Attack1 => "attack1",
            P::Attack2 => "attack2",
            P::Attack3 => "attack3",
            P::Climbing => "climbing",
            P::Damaged => "damaged",
            P::Dead => "dead",
        }
    }

    pub fn is_attack(self) -> bool {
        matches!(self, P::Attack1 | P::Attack2 | P::Attack3)
    }

    pub fn allowed_transitions(self) -> &'static [PlayerState] {
        match self {
            P::Idle => FROM_IDLE,
            P::Walk => FROM_WALK,
            P::Jump => FROM_JUMP,
            P::Attack1 | P::Attack2 | P::Attack3 => FROM_ATTACK,
            P::Climbing => FROM_CLIMBING,
            P::Damaged => FROM_DAMAGED,
            P::Dead => FROM_DEAD,
        }
    }

    pub fn can_transition_to(self, next: PlayerState) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Server-side legality filter for a client-requested player state.
///
/// Returns the state that should be stored. An HP at or below zero forces
/// `Dead` whatever was requested; `Dead` itself is never left here (respawn
/// owns that edge) and attack states may only hand back to `Idle`.
pub fn validate_player_state_change(
    current: PlayerState,
    requested: PlayerState,
    hp: u32,
) -> Result<PlayerState, Rejection> {
    if hp == 0 {
        return Ok(P::Dead);
    }
    if current == P::Dead {
        return Err(Rejection::PlayerDead);
    }
    if requested == current {
        return Ok(current);
    }
    if requested == P::Dead {
        // death is derived from HP, never requested
        return Err(Rejection::IllegalTransition { from: current.name(), to: requested.name() });
    }
    if current.is_attack() && requested != P::Idle {
        return Err(Rejection::AttackLocked { from: current.name(), to: requested.name() });
    }
    if !current.can_transition_to(requested) {
        return Err(Rejection::IllegalTransition { from: current.name(), to: requested.name() });
    }
    Ok(requested)
}

/// Enemy spawn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
pub enum EnemyState {
    Idle,
    Walk,
    Attack,
    Damaged,
    Dead,
}

impl EnemyState {
    pub fn name(self) -> &'static str {
        match self {
            EnemyState::Idle => "idle",
            EnemyState::Walk => "walk",
            EnemyState::Attack => "attack",
            EnemyState::Damaged => "damaged",
            EnemyState::Dead => "dead",
        }
    }

    pub fn allowed_transitions(self) -> &'static [EnemyState] {
        use EnemyState as E;
        match self {
            E::Idle => &[E::Walk, E::Attack, E::Damaged, E::Dead],
            E::Walk => &[E::Idle, E::Attack, E::Damaged, E::Dead],
            E::Attack => &[E::Idle, E::Walk, E::Damaged, E::Dead],
            E::Damaged => &[E::Idle, E::Walk, E::Damaged, E::Dead],
            E::Dead => &[],
        }
    }

    pub fn can_transition_to(self, next: EnemyState) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_alive(self) -> bool {
        self != EnemyState::Dead
    }
}

/// Attack slot selector carried by `damage_enemy` and the cooldown rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
pub enum AttackSlot {
    Attack1,
    Attack2,
    Attack3,
}

impl AttackSlot {
    /// Slot number, 1 to 3
    pub fn index(self) -> u8 {
        match self {
            AttackSlot::Attack1 => 1,
            AttackSlot::Attack2 => 2,
            AttackSlot::Attack3 => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(AttackSlot::Attack1),
            2 => Some(AttackSlot::Attack2),
            3 => Some(AttackSlot::Attack3),
            _ => None,
        }
    }

    /// Player state the attacker enters while the slot plays
    pub fn player_state(self) -> PlayerState {
        match self {
            AttackSlot::Attack1 => P::Attack1,
            AttackSlot::Attack2 => P::Attack2,
            AttackSlot::Attack3 => P::Attack3,
        }
    }

    pub fn from_player_state(state: PlayerState) -> Option<Self> {
        match state {
            P::Attack1 => Some(AttackSlot::Attack1),
            P::Attack2 => Some(AttackSlot::Attack2),
            P::Attack3 => Some(AttackSlot::Attack3),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_state_lists_itself() {
        for state in PlayerState::ALL {
            assert!(!state.can_transition_to(state), "{:?} lists itself", state);
        }
    }

    #[test]
    fn dead_only_leaves_to_idle() {
        assert_eq!(PlayerState::Dead.allowed_transitions(), &[PlayerState::Idle]);
    }

    #[test]
    fn zero_hp_forces_dead() {
        let stored = validate_player_state_change(PlayerState::Walk, PlayerState::Idle, 0).unwrap();
        assert_eq!(stored, PlayerState::Dead);
    }

    #[test]
    fn dead_player_cannot_request_idle() {
        // a dead row always has zero HP; guard the inconsistent case too
        assert_eq!(
            validate_player_state_change(PlayerState::Dead, PlayerState::Idle, 50),
            Err(Rejection::PlayerDead)
        );
    }

    #[test]
    fn attack_only_releases_to_idle() {
        assert!(matches!(
            validate_player_state_change(PlayerState::Attack1, PlayerState::Walk, 100),
            Err(Rejection::AttackLocked { .. })
        ));
        assert_eq!(
            validate_player_state_change(PlayerState::Attack1, PlayerState::Idle, 100),
            Ok(PlayerState::Idle)
        );
    }

    #[test]
    fn dead_cannot_be_requested_with_hp_left() {
        assert!(validate_player_state_change(PlayerState::Idle, PlayerState::Dead, 10).is_err());
    }

    #[test]
    fn climbing_cannot_attack() {
        assert!(matches!(
            validate_player_state_change(PlayerState::Climbing, PlayerState::Attack2, 100),
            Err(Rejection::IllegalTransition { .. })
        ));
    }

    #[test]
    fn dead_enemy_is_terminal() {
        assert!(EnemyState::Dead.allowed_transitions().is_empty());
        assert!(!EnemyState::Dead.is_alive());
    }

    #[test]
    fn attack_slot_round_trips_through_state() {
        for index in 1..=3 {
            let slot = AttackSlot::from_index(index).unwrap();
            assert_eq!(AttackSlot::from_player_state(slot.player_state()), Some(slot));
        }
        assert_eq!(AttackSlot::from_index(4), None);
    }

    #[test]
    fn facing_toward_keeps_fallback_on_tie() {
        assert_eq!(Facing::toward(5.0, 5.0, Facing::Left), Facing::Left);
        assert_eq!(Facing::toward(5.0, 9.0, Facing::Left), Facing::Right);
    }
}
