use std::time::Duration;

/// Dead-body cleanup, damaged fallback, combat timeout and event pruning
pub const CLEANUP_TICK: Duration = Duration::from_secs(1);
/// Per-route population top-up check
pub const SPAWN_TICK: Duration = Duration::from_secs(10);
/// Enemy AI step
pub const PATROL_TICK: Duration = Duration::from_millis(100);

pub const DEFAULT_LEVEL: u32 = 1;
pub const DEFAULT_MAX_HP: u32 = 100;
pub const DEFAULT_MAX_MANA: u32 = 100;
pub const DEFAULT_JOB: &str = "novice";

/// Microseconds elapsed since `then`, using the reducer clock
pub fn micros_since(now: spacetimedb::Timestamp, then: spacetimedb::Timestamp) -> i64 {
    now.to_micros_since_unix_epoch() - then.to_micros_since_unix_epoch()
}
