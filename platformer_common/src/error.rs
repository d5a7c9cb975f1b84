use thiserror::Error;

/// Why a reducer declined a request.
///
/// Rejections never surface to other clients: reducers log them and commit an
/// empty transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("player is dead")]
    PlayerDead,
    #[error("player is not dead")]
    NotDead,
    #[error("position is not finite")]
    InvalidPosition,
    #[error("moved {distance:.1} units in one update (max {max})")]
    MoveTooFar { distance: f32, max: f32 },
    #[error("not enough mana ({have} < {need})")]
    InsufficientMana { have: u32, need: u32 },
    #[error("attack on cooldown for another {remaining_ms}ms")]
    OnCooldown { remaining_ms: u64 },
    #[error("job {job} has no attack in slot {slot}")]
    UnknownAttack { job: String, slot: u8 },
    #[error("unknown job {0}")]
    UnknownJob(String),
    #[error("job requires level {required}, player is {level}")]
    LevelTooLow { level: u32, required: u32 },
    #[error("cannot change job while in combat")]
    InCombat,
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: &'static str, to: &'static str },
    #[error("attack state {from} only releases to idle, not {to}")]
    AttackLocked { from: &'static str, to: &'static str },
    #[error("target is out of range")]
    OutOfRange,
    #[error("caller is not authorized")]
    Unauthorized,
}

/// Malformed admin or world-setup payload
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload contains no entries")]
    Empty,
    #[error("invalid entry {entry}: {reason}")]
    Invalid { entry: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(entry: impl ToString, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { entry: entry.to_string(), reason: reason.into() }
    }
}
