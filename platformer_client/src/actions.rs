/**
 * Reducer-call façade.
 *
 * The host implements [`GameActions`] on top of its generated bindings
 * (`conn.reducers.damage_enemy(..)` and friends). Calls are fire-and-forget:
 * the server answers through row updates, never through the call result, so
 * an `Ok` only means the request left the client.
 */
use std::time::Duration;

use platformer_common::{AttackSlot, Facing, PlayerState};

use crate::error::GameError;

/// Trait defining game actions for testable client operations
pub trait GameActions {
    fn update_player_position(&self, x: f32, y: f32, facing: Facing) -> Result<(), GameError>;
    fn update_player_state(&self, state: PlayerState) -> Result<(), GameError>;
    fn respawn_player(&self) -> Result<(), GameError>;
    fn damage_enemy(&self, spawn_ids: Vec<u32>, attack: AttackSlot) -> Result<(), GameError>;
    fn recover_from_damage(&self, spawn_id: u32) -> Result<(), GameError>;
    fn change_job(&self, job_key: String) -> Result<(), GameError>;
    fn use_teleport(&self, teleport_id: u32) -> Result<(), GameError>;
}

/// Backoff schedule for [`with_retry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Delay before retry number `attempt` (1-based): base, 2x base, 4x base...
    pub fn backoff(&self, attempt: usize) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1) as u32)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50))
    }
}

/// Run a game operation, retrying network errors with exponential backoff.
///
/// `max_retries` counts total attempts. Any other error is returned at once.
pub fn with_retry<T, F>(policy: RetryPolicy, mut f: F) -> Result<T, GameError>
where
    F: FnMut() -> Result<T, GameError>,
{
    let mut attempts = 0;
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempts += 1;
                if attempts >= policy.max_retries || !e.is_retryable() {
                    return Err(e);
                }
                let backoff = policy.backoff(attempts);
                log::debug!("Attempt {} failed ({}), retrying in {:?}", attempts, e, backoff);
                std::thread::sleep(backoff);
            }
        }
    }
}

/// Rejected calls are never retried; log and carry on with the next input
pub fn report(action: &str, result: Result<(), GameError>) {
    if let Err(e) = result {
        log::warn!("{} failed: {}", action, e);
    }
}
