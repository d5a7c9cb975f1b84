//! Smoothing for remote entities.
//!
//! Authoritative positions arrive in discrete steps (about every 100ms for
//! enemies). Each one becomes a new target that the rendered position eases
//! toward; a jump larger than the teleport threshold snaps instead.

use platformer_common::movement::distance;

/// Quadratic ease-out on `t` in [0, 1]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    start: (f32, f32),
    target: (f32, f32),
    current: (f32, f32),
    elapsed: f32,
    duration: f32,
    teleport_threshold: f32,
}

impl Interpolator {
    pub fn new(position: (f32, f32), duration: f32, teleport_threshold: f32) -> Self {
        Self {
            start: position,
            target: position,
            current: position,
            elapsed: duration,
            duration,
            teleport_threshold,
        }
    }

    /// Start walking from the rendered position toward `target`.
    /// Returns true when the jump was large enough to snap.
    pub fn set_target(&mut self, target: (f32, f32)) -> bool {
        if distance(self.current, target) > self.teleport_threshold {
            self.snap(target);
            return true;
        }
        self.start = self.current;
        self.target = target;
        self.elapsed = 0.0;
        false
    }

    pub fn snap(&mut self, position: (f32, f32)) {
        self.start = position;
        self.target = position;
        self.current = position;
        self.elapsed = self.duration;
    }

    /// Advance by `dt` seconds and return the position to render
    pub fn advance(&mut self, dt: f32) -> (f32, f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        let t = if self.duration > 0.0 { ease_out(self.elapsed / self.duration) } else { 1.0 };
        self.current = (
            self.start.0 + (self.target.0 - self.start.0) * t,
            self.start.1 + (self.target.1 - self.start.1) * t,
        );
        self.current
    }

    pub fn position(&self) -> (f32, f32) {
        self.current
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }
}
