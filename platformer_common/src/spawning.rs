//! Spawn-route geometry and top-up scheduling.

use serde::{Deserialize, Serialize};

/// Axis-aligned spawn rectangle of a route, in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SpawnArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.left(), self.right())
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    /// Map two unit samples in [0, 1) onto a point inside the area
    pub fn point_at(&self, u: f32, v: f32) -> (f32, f32) {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        (self.x + u * self.width, self.y + v * self.height)
    }
}

/// Whether a route's own interval has elapsed since its last top-up
pub fn route_due(last_spawn_micros: i64, spawn_interval_ms: u32, now_micros: i64) -> bool {
    now_micros.saturating_sub(last_spawn_micros) >= spawn_interval_ms as i64 * 1_000
}

/// Number of fresh spawns needed to bring `alive` up to `max_population`
pub fn top_up_count(alive: u32, max_population: u32) -> u32 {
    max_population.saturating_sub(alive)
}

/// What one spawn tick does to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTick {
    /// Interval not elapsed; the route row is left alone
    Wait,
    /// Place `spawn` fresh enemies and restart the route clock, even when
    /// `spawn` is zero because the route is already full
    TopUp { spawn: u32 },
}

pub fn plan_route_tick(
    last_spawn_micros: i64,
    spawn_interval_ms: u32,
    alive: u32,
    max_population: u32,
    now_micros: i64,
) -> RouteTick {
    if !route_due(last_spawn_micros, spawn_interval_ms, now_micros) {
        return RouteTick::Wait;
    }
    RouteTick::TopUp { spawn: top_up_count(alive, max_population) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn sampled_points_stay_inside() {
        let area = SpawnArea::new(200.0, 300.0, 400.0, 32.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (x, y) = area.point_at(rng.random(), rng.random());
            assert!(area.contains(x, y), "({x}, {y}) escaped {area:?}");
        }
    }

    #[test]
    fn route_waits_for_its_own_interval() {
        assert!(!route_due(1_000_000, 10_000, 10_999_999));
        assert!(route_due(1_000_000, 10_000, 11_000_000));
    }

    #[test]
    fn population_never_exceeds_cap_across_ticks() {
        let max_population = 6;
        let interval_ms = 10_000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut alive: u32 = 0;
        let mut last_spawn = 0;
        let mut now = 0;
        for _ in 0..1_000 {
            // kills happen between ticks; tick spacing drifts around the interval
            alive -= rng.random_range(0..=alive);
            now += rng.random_range(1_000_000..15_000_000);
            let before = alive;
            match plan_route_tick(last_spawn, interval_ms, alive, max_population, now) {
                RouteTick::Wait => {
                    assert!(now - last_spawn < 10_000_000);
                }
                RouteTick::TopUp { spawn } => {
                    alive += spawn;
                    last_spawn = now;
                    assert_eq!(alive, max_population, "a due route refills to its cap");
                }
            }
            assert!(alive <= max_population);
            assert!(alive >= before);
        }
    }

    #[test]
    fn full_route_still_restarts_its_clock() {
        assert_eq!(plan_route_tick(0, 10_000, 5, 5, 10_000_000), RouteTick::TopUp { spawn: 0 });
        assert_eq!(plan_route_tick(0, 10_000, 2, 5, 10_000_000), RouteTick::TopUp { spawn: 3 });
        assert_eq!(plan_route_tick(5_000_000, 10_000, 2, 5, 10_000_000), RouteTick::Wait);
    }

    #[test]
    fn full_route_gets_nothing() {
        assert_eq!(top_up_count(5, 5), 0);
        assert_eq!(top_up_count(7, 5), 0);
        assert_eq!(top_up_count(2, 5), 3);
    }
}
