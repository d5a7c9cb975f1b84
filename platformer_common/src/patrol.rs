//! Enemy AI step driven by the patrol tick.
//!
//! Generic over the player key so the module can use `Identity` while tests
//! use plain integers.

use crate::combat::cooldown_remaining_ms;
use crate::movement::distance;
use crate::spawning::SpawnArea;
use crate::state::{EnemyState, Facing};

/// Chance per tick that a patrolling enemy pauses
pub const PAUSE_CHANCE: f32 = 0.02;
/// Chance per tick that an idle enemy resumes patrolling
pub const RESUME_CHANCE: f32 = 0.1;
/// Aggro is dropped once the target is further than this multiple of the aggro range
pub const LEASH_FACTOR: f32 = 2.5;

/// Per-enemy-type behaviour tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolParams {
    /// Pixels per second
    pub move_speed: f32,
    pub aggro_range: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u32,
    /// Whether the type picks fights on sight
    pub aggressive: bool,
}

impl PatrolParams {
    pub fn leash_range(&self) -> f32 {
        self.aggro_range * LEASH_FACTOR
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolEnemy<K> {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: EnemyState,
    pub aggro_target: Option<K>,
    pub last_attack_micros: Option<i64>,
}

/// A player as seen by the AI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSighting<K> {
    pub id: K,
    pub x: f32,
    pub y: f32,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolDecision<K> {
    pub x: f32,
    pub facing: Facing,
    pub state: EnemyState,
    pub aggro_target: Option<K>,
    /// Player struck this tick, if any
    pub attack: Option<K>,
}

impl<K: Copy + PartialEq> PatrolDecision<K> {
    /// Whether applying the decision changes anything on the row
    pub fn changes(&self, enemy: &PatrolEnemy<K>) -> bool {
        self.x != enemy.x
            || self.facing != enemy.facing
            || self.state != enemy.state
            || self.aggro_target != enemy.aggro_target
            || self.attack.is_some()
    }
}

fn find<K: Copy + PartialEq>(players: &[PlayerSighting<K>], id: K) -> Option<&PlayerSighting<K>> {
    players.iter().find(|p| p.id == id)
}

/// Keep, drop or acquire an aggro target
pub fn resolve_aggro<K: Copy + PartialEq>(
    enemy: &PatrolEnemy<K>,
    params: &PatrolParams,
    players: &[PlayerSighting<K>],
) -> Option<K> {
    let here = (enemy.x, enemy.y);
    if let Some(current) = enemy.aggro_target {
        match find(players, current) {
            Some(p) if p.alive && distance(here, (p.x, p.y)) <= params.leash_range() => return Some(current),
            _ => {}
        }
    }
    if !params.aggressive {
        return None;
    }
    players
        .iter()
        .filter(|p| p.alive)
        .map(|p| (distance(here, (p.x, p.y)), p.id))
        .filter(|(d, _)| *d <= params.aggro_range)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

/// Advance one enemy by `dt_secs`.
///
/// `idle_roll` is a uniform sample in [0, 1) used for patrol pauses.
/// Damaged and dead enemies hold still.
pub fn patrol_step<K: Copy + PartialEq>(
    enemy: &PatrolEnemy<K>,
    params: &PatrolParams,
    area: &SpawnArea,
    players: &[PlayerSighting<K>],
    dt_secs: f32,
    now_micros: i64,
    idle_roll: f32,
) -> PatrolDecision<K> {
    let mut decision = PatrolDecision {
        x: enemy.x,
        facing: enemy.facing,
        state: enemy.state,
        aggro_target: enemy.aggro_target,
        attack: None,
    };
    if matches!(enemy.state, EnemyState::Dead | EnemyState::Damaged) {
        return decision;
    }

    let stride = params.move_speed * dt_secs;
    decision.aggro_target = resolve_aggro(enemy, params, players);

    if let Some(target) = decision.aggro_target.and_then(|id| find(players, id)) {
        decision.facing = Facing::toward(enemy.x, target.x, enemy.facing);
        let dx = target.x - enemy.x;
        let in_reach = dx.abs() <= params.attack_range && (target.y - enemy.y).abs() <= params.attack_range;
        if in_reach {
            let ready = cooldown_remaining_ms(enemy.last_attack_micros, params.attack_cooldown_ms, now_micros) == 0;
            if ready {
                decision.state = EnemyState::Attack;
                decision.attack = Some(target.id);
            } else {
                decision.state = EnemyState::Idle;
            }
        } else {
            // close in without overshooting into the target
            let step = (dx.abs() - params.attack_range).clamp(0.0, stride);
            decision.x = area.clamp_x(enemy.x + dx.signum() * step);
            decision.state = if decision.x == enemy.x { EnemyState::Idle } else { EnemyState::Walk };
        }
        return decision;
    }

    match enemy.state {
        EnemyState::Idle if idle_roll >= RESUME_CHANCE => return decision,
        EnemyState::Walk if idle_roll < PAUSE_CHANCE => {
            decision.state = EnemyState::Idle;
            return decision;
        }
        _ => {}
    }

    let next = enemy.x + decision.facing.sign() * stride;
    if next < area.left() || next > area.right() {
        decision.x = area.clamp_x(next);
        decision.facing = decision.facing.flipped();
    } else {
        decision.x = next;
    }
    decision.state = EnemyState::Walk;
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(aggressive: bool) -> PatrolParams {
        PatrolParams {
            move_speed: 50.0,
            aggro_range: 100.0,
            attack_range: 20.0,
            attack_cooldown_ms: 1_000,
            aggressive,
        }
    }

    fn area() -> SpawnArea {
        SpawnArea::new(0.0, 0.0, 200.0, 20.0)
    }

    fn enemy(x: f32, state: EnemyState) -> PatrolEnemy<u8> {
        PatrolEnemy { x, y: 10.0, facing: Facing::Right, state, aggro_target: None, last_attack_micros: None }
    }

    #[test]
    fn walker_flips_at_area_edge() {
        let decision = patrol_step(&enemy(198.0, EnemyState::Walk), &params(false), &area(), &[], 0.1, 0, 0.5);
        assert_eq!(decision.x, 200.0);
        assert_eq!(decision.facing, Facing::Left);
        assert_eq!(decision.state, EnemyState::Walk);
    }

    #[test]
    fn idle_enemy_waits_until_roll_resumes() {
        let idle = enemy(50.0, EnemyState::Idle);
        let stay = patrol_step(&idle, &params(false), &area(), &[], 0.1, 0, 0.5);
        assert_eq!(stay.state, EnemyState::Idle);
        assert!(!stay.changes(&idle));
        let go = patrol_step(&idle, &params(false), &area(), &[], 0.1, 0, 0.05);
        assert_eq!(go.state, EnemyState::Walk);
        assert_eq!(go.x, 55.0);
    }

    #[test]
    fn aggressive_enemy_acquires_nearest_living_player() {
        let players = [
            PlayerSighting { id: 1, x: 140.0, y: 10.0, alive: true },
            PlayerSighting { id: 2, x: 90.0, y: 10.0, alive: false },
            PlayerSighting { id: 3, x: 20.0, y: 10.0, alive: true },
        ];
        let decision = patrol_step(&enemy(60.0, EnemyState::Walk), &params(true), &area(), &players, 0.1, 0, 0.5);
        assert_eq!(decision.aggro_target, Some(3));
        assert_eq!(decision.facing, Facing::Left);
        assert_eq!(decision.x, 55.0);
    }

    #[test]
    fn passive_enemy_ignores_players() {
        let players = [PlayerSighting { id: 1, x: 70.0, y: 10.0, alive: true }];
        let decision = patrol_step(&enemy(60.0, EnemyState::Walk), &params(false), &area(), &players, 0.1, 0, 0.5);
        assert_eq!(decision.aggro_target, None);
    }

    #[test]
    fn aggro_lost_beyond_leash() {
        let mut chased = enemy(0.0, EnemyState::Walk);
        chased.aggro_target = Some(1);
        let far = [PlayerSighting { id: 1, x: 260.0, y: 10.0, alive: true }];
        assert_eq!(resolve_aggro(&chased, &params(false), &far), None);
        let near = [PlayerSighting { id: 1, x: 240.0, y: 10.0, alive: true }];
        assert_eq!(resolve_aggro(&chased, &params(false), &near), Some(1));
        assert_eq!(resolve_aggro(&chased, &params(false), &[]), None);
    }

    #[test]
    fn attacks_in_reach_respecting_cooldown() {
        let mut chaser = enemy(100.0, EnemyState::Walk);
        chaser.aggro_target = Some(7);
        let players = [PlayerSighting { id: 7, x: 110.0, y: 10.0, alive: true }];
        let hit = patrol_step(&chaser, &params(false), &area(), &players, 0.1, 5_000_000, 0.5);
        assert_eq!(hit.state, EnemyState::Attack);
        assert_eq!(hit.attack, Some(7));

        chaser.last_attack_micros = Some(4_500_000);
        let wait = patrol_step(&chaser, &params(false), &area(), &players, 0.1, 5_000_000, 0.5);
        assert_eq!(wait.state, EnemyState::Idle);
        assert_eq!(wait.attack, None);
    }

    #[test]
    fn damaged_enemy_holds_still() {
        let hurt = enemy(100.0, EnemyState::Damaged);
        let decision = patrol_step(&hurt, &params(true), &area(), &[], 0.1, 0, 0.0);
        assert!(!decision.changes(&hurt));
    }
}
