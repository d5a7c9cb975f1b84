/**
 * Client configuration.
 *
 * Defaults suit a local `spacetime start`; each connection setting and the
 * reconciliation threshold can be overridden from the environment.
 */
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actions::RetryPolicy;

/// URI for connecting to the SpacetimeDB server
pub const SERVER_URI: &str = "http://localhost:3000";

/// Name of the SpacetimeDB module/database to connect to
pub const MODULE_NAME: &str = "platformer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_uri: String,
    pub module_name: String,
    pub token: Option<String>,
    /// Local player snaps to the server position beyond this distance
    pub reconcile_threshold: f32,
    /// Remote entities snap instead of sliding beyond this distance
    pub teleport_threshold: f32,
    pub interpolation_ms: u64,
    /// Cadence of `update_player_position` calls
    pub position_report_ms: u64,
    /// Half-size of the proximity subscription window
    pub proximity_radius: f32,
    /// Distance the player may drift from the window centre before it is re-issued
    pub resubscribe_distance: f32,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    pub durations: StateDurations,
}

/// How long self-ending states last on the client, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDurations {
    pub attack: [f32; 3],
    pub player_damaged: f32,
    pub enemy_damaged: f32,
}

impl Default for StateDurations {
    fn default() -> Self {
        Self { attack: [0.4, 0.5, 0.7], player_damaged: 0.4, enemy_damaged: 0.5 }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_uri: SERVER_URI.to_string(),
            module_name: MODULE_NAME.to_string(),
            token: None,
            reconcile_threshold: 64.0,
            teleport_threshold: 300.0,
            interpolation_ms: 100,
            position_report_ms: 100,
            proximity_radius: 1_000.0,
            resubscribe_distance: 250.0,
            max_retries: 3,
            retry_base_ms: 50,
            durations: StateDurations::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SPACETIME_URI`, `SPACETIME_MODULE`,
    /// `SPACETIME_TOKEN` and `RECONCILE_THRESHOLD`
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a JSON config; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(uri) = lookup("SPACETIME_URI") {
            self.server_uri = uri;
        }
        if let Some(module) = lookup("SPACETIME_MODULE") {
            self.module_name = module;
        }
        if let Some(token) = lookup("SPACETIME_TOKEN") {
            self.token = Some(token);
        }
        if let Some(raw) = lookup("RECONCILE_THRESHOLD") {
            match raw.parse::<f32>() {
                Ok(value) if value > 0.0 => self.reconcile_threshold = value,
                _ => log::warn!("Ignoring RECONCILE_THRESHOLD={:?}, keeping {}", raw, self.reconcile_threshold),
            }
        }
        self
    }

    pub fn interpolation_secs(&self) -> f32 {
        self.interpolation_ms as f32 / 1_000.0
    }

    pub fn position_report_secs(&self) -> f32 {
        self.position_report_ms as f32 / 1_000.0
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_base_ms))
    }
}
