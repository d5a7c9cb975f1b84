/**
 * Platformer client core.
 *
 * Prediction, reconciliation and interpolation against the authoritative
 * module, plus the per-entity state machines that consume its rows. The
 * engine (physics body, sprites) and the generated bindings (reducer calls,
 * subscriptions, row callbacks) plug in through the traits in `controllers`,
 * `actions`, `proximity` and `session`.
 */
pub mod actions;
pub mod config;
pub mod controllers;
pub mod error;
pub mod interpolation;
pub mod prediction;
pub mod proximity;
pub mod reconciliation;
pub mod session;
pub mod state_machine;
pub mod world_cache;

pub use actions::{with_retry, GameActions, RetryPolicy};
pub use config::ClientConfig;
pub use controllers::{Animator, Body, EnemyController, PeerController, PlayerController};
pub use error::GameError;
pub use proximity::{ProximitySubscriptionManager, SubscriptionBackend};
pub use reconciliation::{PositionReconciliationService, Reconciliation};
pub use session::{AnimatorFactory, GameSession};
pub use state_machine::{StateHooks, StateMachine, TransitionSource};
pub use world_cache::{PlayerRow, SpawnRow, WorldCache};
