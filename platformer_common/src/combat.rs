//! Combat math: cooldowns, target selection, damage rolls, knockback.
//!
//! Everything here is deterministic given its inputs; the module feeds the
//! random crit rolls in from the reducer context.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::spawning::SpawnArea;
use crate::state::{EnemyState, Facing, PlayerState};

/// Damage multiplier applied on a critical hit
pub const CRIT_MULTIPLIER: f32 = 1.5;

/// Extra X reach granted on top of an attack's configured range
pub const RANGE_LENIENCY: f32 = 20.0;

/// Damage scaling gained per level above 1
pub const DAMAGE_PER_LEVEL: f32 = 0.1;

/// Tunables of one attack, as resolved from the attacker's job and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub damage: u32,
    pub cooldown_ms: u32,
    pub range: f32,
    pub hits: u8,
    pub targets: u8,
    pub crit_chance: f32,
    pub knockback: f32,
    pub mana_cost: u32,
}

pub fn level_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * DAMAGE_PER_LEVEL
}

/// Milliseconds left before an attack used at `last_used_micros` is ready again
pub fn cooldown_remaining_ms(last_used_micros: Option<i64>, cooldown_ms: u32, now_micros: i64) -> u64 {
    let Some(last) = last_used_micros else {
        return 0;
    };
    let ready_at = last + cooldown_ms as i64 * 1_000;
    if now_micros >= ready_at {
        0
    } else {
        ((ready_at - now_micros) as u64).div_ceil(1_000)
    }
}

pub fn check_cooldown(last_used_micros: Option<i64>, cooldown_ms: u32, now_micros: i64) -> Result<(), Rejection> {
    match cooldown_remaining_ms(last_used_micros, cooldown_ms, now_micros) {
        0 => Ok(()),
        remaining_ms => Err(Rejection::OnCooldown { remaining_ms }),
    }
}

pub fn check_mana(have: u32, need: u32) -> Result<(), Rejection> {
    if have < need {
        return Err(Rejection::InsufficientMana { have, need });
    }
    Ok(())
}

/// A spawn offered as a possible target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub id: u32,
    pub x: f32,
    pub alive: bool,
}

/// Pick the targets an attack actually lands on.
///
/// Only the X axis counts. Candidates must be alive and within
/// `range + RANGE_LENIENCY`; the nearest `max_targets` win. Duplicate ids in the
/// request are collapsed.
pub fn select_targets(attacker_x: f32, candidates: &[TargetCandidate], range: f32, max_targets: u8) -> Vec<u32> {
    let reach = range + RANGE_LENIENCY;
    let mut in_range: Vec<(f32, u32)> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.alive) {
        let dx = (candidate.x - attacker_x).abs();
        if dx <= reach && !in_range.iter().any(|(_, id)| *id == candidate.id) {
            in_range.push((dx, candidate.id));
        }
    }
    in_range.sort_by(|a, b| a.0.total_cmp(&b.0));
    in_range.into_iter().take(max_targets as usize).map(|(_, id)| id).collect()
}

/// Damage dealt by one hit before it is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRoll {
    pub amount: u32,
    pub critical: bool,
}

/// Scale base damage and roll a crit. `roll` is a uniform sample in [0, 1).
pub fn roll_damage(base: u32, multiplier: f32, crit_chance: f32, roll: f32) -> HitRoll {
    let critical = roll < crit_chance;
    let mut amount = base as f32 * multiplier;
    if critical {
        amount *= CRIT_MULTIPLIER;
    }
    HitRoll { amount: amount.round().max(0.0) as u32, critical }
}

/// HP after one hit; HP is clamped at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub hp: u32,
    pub lethal: bool,
}

pub fn apply_hit(hp: u32, amount: u32) -> HitOutcome {
    let hp = hp.saturating_sub(amount);
    HitOutcome { hp, lethal: hp == 0 }
}

impl HitOutcome {
    pub fn enemy_state(&self) -> EnemyState {
        if self.lethal { EnemyState::Dead } else { EnemyState::Damaged }
    }

    pub fn player_state(&self) -> PlayerState {
        if self.lethal { PlayerState::Dead } else { PlayerState::Damaged }
    }
}

/// Push `target_x` away from the attacker and keep it inside the route area
pub fn knockback_x(attacker_x: f32, attacker_facing: Facing, target_x: f32, distance: f32, area: &SpawnArea) -> f32 {
    let direction = Facing::toward(attacker_x, target_x, attacker_facing);
    area.clamp_x(target_x + direction.sign() * distance)
}

/// One hit as applied to a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedHit {
    pub amount: u32,
    pub critical: bool,
    pub hp: u32,
    pub x: f32,
    pub lethal: bool,
}

/// Where an attacker stands when resolving hits
#[derive(Debug, Clone, Copy)]
pub struct Attacker {
    pub x: f32,
    pub facing: Facing,
    pub damage_multiplier: f32,
}

/// Apply `profile.hits` sequential hits to one target, stopping at the killing blow.
///
/// `next_roll` supplies one uniform crit sample per hit.
pub fn resolve_target_hits(
    attacker: &Attacker,
    profile: &AttackProfile,
    start_hp: u32,
    start_x: f32,
    area: &SpawnArea,
    mut next_roll: impl FnMut() -> f32,
) -> Vec<AppliedHit> {
    let mut hits = Vec::with_capacity(profile.hits as usize);
    let mut hp = start_hp;
    let mut x = start_x;
    for _ in 0..profile.hits {
        if hp == 0 {
            break;
        }
        let roll = roll_damage(profile.damage, attacker.damage_multiplier, profile.crit_chance, next_roll());
        let outcome = apply_hit(hp, roll.amount);
        hp = outcome.hp;
        x = knockback_x(attacker.x, attacker.facing, x, profile.knockback, area);
        hits.push(AppliedHit { amount: roll.amount, critical: roll.critical, hp, x, lethal: outcome.lethal });
        if outcome.lethal {
            break;
        }
    }
    hits
}

/// A requested target as the attack planner sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetState {
    pub id: u32,
    pub x: f32,
    pub hp: u32,
    pub alive: bool,
    /// Route area knockback is clamped to
    pub area: SpawnArea,
}

/// Every hit one attack lands on one target, in order
#[derive(Debug, Clone, PartialEq)]
pub struct TargetStrike {
    pub id: u32,
    pub hits: Vec<AppliedHit>,
}

impl TargetStrike {
    /// Target HP and state after the last hit
    pub fn outcome(&self) -> Option<HitOutcome> {
        self.hits.last().map(|h| HitOutcome { hp: h.hp, lethal: h.lethal })
    }

    pub fn final_x(&self) -> Option<f32> {
        self.hits.last().map(|h| h.x)
    }
}

/// Everything an accepted attack writes.
///
/// A plan exists only once mana and cooldown have passed, so a rejected
/// attempt has nothing to apply. The cooldown is stamped exactly once per
/// plan, regardless of how many targets or hits it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackPlan {
    pub mana_cost: u32,
    pub cooldown_used_at_micros: i64,
    pub strikes: Vec<TargetStrike>,
}

impl AttackPlan {
    /// One damage event per applied hit
    pub fn event_count(&self) -> usize {
        self.strikes.iter().map(|s| s.hits.len()).sum()
    }

    pub fn kills(&self) -> impl Iterator<Item = u32> + '_ {
        self.strikes.iter().filter(|s| s.outcome().is_some_and(|o| o.lethal)).map(|s| s.id)
    }
}

/// Validate and resolve one attack of a living attacker.
///
/// Mana is checked before the cooldown; either rejection means no write at all.
pub fn plan_attack(
    attacker: &Attacker,
    mana: u32,
    profile: &AttackProfile,
    last_used_micros: Option<i64>,
    now_micros: i64,
    requested: &[TargetState],
    mut next_roll: impl FnMut() -> f32,
) -> Result<AttackPlan, Rejection> {
    check_mana(mana, profile.mana_cost)?;
    check_cooldown(last_used_micros, profile.cooldown_ms, now_micros)?;

    let candidates: Vec<TargetCandidate> =
        requested.iter().map(|t| TargetCandidate { id: t.id, x: t.x, alive: t.alive && t.hp > 0 }).collect();
    let strikes = select_targets(attacker.x, &candidates, profile.range, profile.targets)
        .into_iter()
        .filter_map(|id| requested.iter().find(|t| t.id == id))
        .map(|target| TargetStrike {
            id: target.id,
            hits: resolve_target_hits(attacker, profile, target.hp, target.x, &target.area, &mut next_roll),
        })
        .collect();

    Ok(AttackPlan { mana_cost: profile.mana_cost, cooldown_used_at_micros: now_micros, strikes })
}
