//! Rules shared by the authoritative module and the client: entity states and
//! their transition tables, movement and combat validation, leveling, spawn
//! routes, enemy AI, cleanup rules, static config payloads and proximity queries.
//!
//! Nothing here touches tables or the engine, so every rule can be tested natively.

pub mod combat;
pub mod config;
pub mod error;
pub mod leveling;
pub mod movement;
pub mod patrol;
pub mod query;
pub mod spawning;
pub mod state;
pub mod upkeep;

pub use error::{ConfigError, Rejection};
pub use state::{AttackSlot, EnemyState, Facing, PlayerState};
