//! Housekeeping rules applied by the cleanup tick.

use crate::state::EnemyState;

/// How long a dead spawn lingers before it is purged
pub const DEAD_SPAWN_GRACE_MICROS: i64 = 5_000_000;
/// A player leaves combat this long after their last attack or hit
pub const COMBAT_TIMEOUT_MICROS: i64 = 5_000_000;
/// Spawns still `Damaged` after this long are returned to `Idle` by the server
pub const DAMAGED_FALLBACK_MICROS: i64 = 2_000_000;
pub const DAMAGE_EVENT_RETENTION_MICROS: i64 = 5_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnUpkeep {
    Keep,
    /// Dead past the grace window; delete the row
    Purge,
    /// Stuck in a hit reaction; back to `Idle`
    Recover,
}

/// Decide what the cleanup tick does with a spawn untouched for `idle_for_micros`
pub fn spawn_upkeep(state: EnemyState, idle_for_micros: i64) -> SpawnUpkeep {
    match state {
        EnemyState::Dead if idle_for_micros > DEAD_SPAWN_GRACE_MICROS => SpawnUpkeep::Purge,
        // recover_from_damage is client driven; a vanished client must not pin the spawn
        EnemyState::Damaged if idle_for_micros > DAMAGED_FALLBACK_MICROS => SpawnUpkeep::Recover,
        _ => SpawnUpkeep::Keep,
    }
}

pub fn combat_expired(in_combat: bool, since_combat_micros: i64) -> bool {
    in_combat && since_combat_micros > COMBAT_TIMEOUT_MICROS
}

pub fn event_expired(age_micros: i64) -> bool {
    age_micros > DAMAGE_EVENT_RETENTION_MICROS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_spawn_survives_the_grace_window() {
        assert_eq!(spawn_upkeep(EnemyState::Dead, 0), SpawnUpkeep::Keep);
        assert_eq!(spawn_upkeep(EnemyState::Dead, 4_999_999), SpawnUpkeep::Keep);
        assert_eq!(spawn_upkeep(EnemyState::Dead, 5_000_000), SpawnUpkeep::Keep);
        assert_eq!(spawn_upkeep(EnemyState::Dead, 5_000_001), SpawnUpkeep::Purge);
    }

    #[test]
    fn stuck_hit_reaction_recovers() {
        assert_eq!(spawn_upkeep(EnemyState::Damaged, 1_000_000), SpawnUpkeep::Keep);
        assert_eq!(spawn_upkeep(EnemyState::Damaged, 2_500_000), SpawnUpkeep::Recover);
        assert_eq!(spawn_upkeep(EnemyState::Idle, 60_000_000), SpawnUpkeep::Keep);
        assert_eq!(spawn_upkeep(EnemyState::Walk, 60_000_000), SpawnUpkeep::Keep);
    }

    #[test]
    fn combat_flag_times_out() {
        assert!(!combat_expired(true, 4_000_000));
        assert!(combat_expired(true, 6_000_000));
        assert!(!combat_expired(false, 60_000_000));
    }

    #[test]
    fn old_damage_events_expire() {
        assert!(!event_expired(DAMAGE_EVENT_RETENTION_MICROS));
        assert!(event_expired(DAMAGE_EVENT_RETENTION_MICROS + 1));
    }
}
