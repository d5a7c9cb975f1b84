//! Movement validation shared by the position reducer and client tests.

use crate::error::Rejection;
use crate::state::PlayerState;

/// Largest displacement a single position update may carry (anti-teleport guard)
pub const MAX_MOVE_PER_UPDATE: f32 = 200.0;

/// Fixed spawn / respawn point
pub const SPAWN_POINT: (f32, f32) = (100.0, 100.0);

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// A player may act only while alive
pub fn ensure_alive(hp: u32, state: PlayerState) -> Result<(), Rejection> {
    if hp == 0 || state == PlayerState::Dead {
        return Err(Rejection::PlayerDead);
    }
    Ok(())
}

/// Reject non-finite coordinates and displacements above [`MAX_MOVE_PER_UPDATE`]
pub fn validate_move(from: (f32, f32), to: (f32, f32)) -> Result<(), Rejection> {
    if !to.0.is_finite() || !to.1.is_finite() {
        return Err(Rejection::InvalidPosition);
    }
    let moved = distance(from, to);
    if moved > MAX_MOVE_PER_UPDATE {
        return Err(Rejection::MoveTooFar { distance: moved, max: MAX_MOVE_PER_UPDATE });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_speed_hack() {
        let err = validate_move((100.0, 100.0), (500.0, 100.0)).unwrap_err();
        assert!(matches!(err, Rejection::MoveTooFar { distance, .. } if (distance - 400.0).abs() < 0.01));
    }

    #[test]
    fn accepts_cap_exactly() {
        assert!(validate_move((0.0, 0.0), (120.0, 160.0)).is_ok());
    }

    #[test]
    fn rejects_nan() {
        assert_eq!(validate_move((0.0, 0.0), (f32::NAN, 0.0)), Err(Rejection::InvalidPosition));
    }

    #[test]
    fn dead_cannot_act() {
        assert!(ensure_alive(0, PlayerState::Idle).is_err());
        assert!(ensure_alive(10, PlayerState::Dead).is_err());
        assert!(ensure_alive(10, PlayerState::Walk).is_ok());
    }
}
