/**
 * Proximity subscriptions.
 *
 * Instead of streaming every player and spawn, the client subscribes to a
 * square window around the local player and re-issues it once the player has
 * drifted far enough from the window centre. Static definitions and the
 * caller's own rows are subscribed once, unbounded.
 */
use platformer_common::movement::distance;
use platformer_common::query::{proximity_queries, static_queries};

use crate::error::GameError;

/// Row-subscription transport, implemented by the host over its connection
pub trait SubscriptionBackend {
    type Handle;

    fn subscribe(&mut self, queries: Vec<String>) -> Result<Self::Handle, GameError>;
    fn unsubscribe(&mut self, handle: Self::Handle) -> Result<(), GameError>;
}

pub struct ProximitySubscriptionManager<S: SubscriptionBackend> {
    backend: S,
    radius: f32,
    resubscribe_distance: f32,
    center: Option<(f32, f32)>,
    window: Option<S::Handle>,
    statics: Option<S::Handle>,
}

impl<S: SubscriptionBackend> ProximitySubscriptionManager<S> {
    pub fn new(backend: S, radius: f32, resubscribe_distance: f32) -> Self {
        Self { backend, radius, resubscribe_distance, center: None, window: None, statics: None }
    }

    /// Subscribe the unbounded tables once
    pub fn subscribe_static(&mut self) -> Result<(), GameError> {
        if self.statics.is_none() {
            self.statics = Some(self.backend.subscribe(static_queries())?);
        }
        Ok(())
    }

    pub fn center(&self) -> Option<(f32, f32)> {
        self.center
    }

    /// Re-issue the window if the player left the current one's centre by
    /// more than the threshold. Returns whether a new window was subscribed.
    pub fn update_position(&mut self, x: f32, y: f32) -> Result<bool, GameError> {
        if let Some(center) = self.center {
            if distance(center, (x, y)) <= self.resubscribe_distance {
                return Ok(false);
            }
        }

        // new window first so rows in the overlap never disappear
        let handle = self.backend.subscribe(proximity_queries(x, y, self.radius))?;
        if let Some(previous) = self.window.replace(handle) {
            if let Err(e) = self.backend.unsubscribe(previous) {
                log::warn!("Failed to unsubscribe from previous proximity window: {}", e);
            }
        }
        log::info!("Proximity window moved to ({:.0}, {:.0}), radius {}", x, y, self.radius);
        self.center = Some((x, y));
        Ok(true)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}
