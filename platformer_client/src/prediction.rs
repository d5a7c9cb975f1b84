//! Optimistic movement reporting.
//!
//! Input moves the local body immediately; the position is sent to the
//! server on a fixed cadence and never waits for confirmation.

use platformer_common::Facing;

use crate::actions::GameActions;
use crate::error::GameError;

#[derive(Debug, Clone)]
pub struct PositionReporter {
    interval: f32,
    since_last: f32,
    last_sent: Option<(f32, f32, Facing)>,
}

impl PositionReporter {
    pub fn new(interval_secs: f32) -> Self {
        Self { interval: interval_secs, since_last: interval_secs, last_sent: None }
    }

    /// Send the position if the cadence is due and something changed.
    /// Returns whether a call went out.
    pub fn tick(
        &mut self,
        dt: f32,
        position: (f32, f32),
        facing: Facing,
        actions: &impl GameActions,
    ) -> Result<bool, GameError> {
        self.since_last += dt;
        if self.since_last < self.interval {
            return Ok(false);
        }
        let sample = (position.0, position.1, facing);
        if self.last_sent == Some(sample) {
            return Ok(false);
        }
        self.since_last = 0.0;
        self.last_sent = Some(sample);
        actions.update_player_position(position.0, position.1, facing)?;
        Ok(true)
    }

    /// Forget the last report so the next due tick sends unconditionally
    pub fn reset(&mut self) {
        self.last_sent = None;
        self.since_last = self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::FakeActions;

    #[test]
    fn reports_on_cadence_only_when_moved() {
        let actions = FakeActions::default();
        let mut reporter = PositionReporter::new(0.1);
        assert!(reporter.tick(0.016, (10.0, 0.0), Facing::Right, &actions).unwrap());
        assert!(!reporter.tick(0.05, (12.0, 0.0), Facing::Right, &actions).unwrap());
        assert!(reporter.tick(0.05, (14.0, 0.0), Facing::Right, &actions).unwrap());
        assert!(!reporter.tick(0.2, (14.0, 0.0), Facing::Right, &actions).unwrap());
        assert_eq!(actions.calls(), vec!["position 10 0 Right", "position 14 0 Right"]);
    }

    #[test]
    fn reset_forces_next_report() {
        let actions = FakeActions::default();
        let mut reporter = PositionReporter::new(0.1);
        reporter.tick(0.1, (1.0, 1.0), Facing::Left, &actions).unwrap();
        reporter.reset();
        assert!(reporter.tick(0.0, (1.0, 1.0), Facing::Left, &actions).unwrap());
    }
}
