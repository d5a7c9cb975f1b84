//! Drift correction for the locally predicted player.

use platformer_common::movement::distance;

use crate::controllers::Body;

/// Outcome of comparing the predicted position with the server's
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    /// Within the threshold; prediction stands
    InSync,
    /// Desync; the body was moved to the authoritative position
    Snapped { from: (f32, f32), to: (f32, f32) },
}

/// Snaps the local body to the server position when they diverge too far.
///
/// Small differences are normal prediction lead and are left alone; large
/// ones are treated as a desync, not smoothed.
#[derive(Debug, Clone, Copy)]
pub struct PositionReconciliationService {
    threshold: f32,
}

impl PositionReconciliationService {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn check(&self, client: (f32, f32), server: (f32, f32)) -> Reconciliation {
        if distance(client, server) > self.threshold {
            Reconciliation::Snapped { from: client, to: server }
        } else {
            Reconciliation::InSync
        }
    }

    /// Compare and, on desync, move the body to `server` exactly
    pub fn reconcile(&self, body: &mut impl Body, server: (f32, f32)) -> Reconciliation {
        let outcome = self.check(body.position(), server);
        if let Reconciliation::Snapped { from, to } = outcome {
            log::info!("Desync of {:.1} units, snapping ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                distance(from, to), from.0, from.1, to.0, to.1);
            body.set_position(to);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::tests::FakeBody;

    #[test]
    fn small_drift_is_kept() {
        let service = PositionReconciliationService::new(64.0);
        let mut body = FakeBody::at(100.0, 100.0);
        assert_eq!(service.reconcile(&mut body, (130.0, 100.0)), Reconciliation::InSync);
        assert_eq!(body.position(), (100.0, 100.0));
    }

    #[test]
    fn desync_snaps_exactly_to_server() {
        let service = PositionReconciliationService::new(64.0);
        let mut body = FakeBody::at(100.0, 100.0);
        let outcome = service.reconcile(&mut body, (300.0, 80.0));
        assert!(matches!(outcome, Reconciliation::Snapped { .. }));
        assert_eq!(body.position(), (300.0, 80.0));
    }
}
