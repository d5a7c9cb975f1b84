use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use platformer_common::combat::{apply_hit, level_multiplier, plan_attack, Attacker, HitOutcome, TargetState};
use platformer_common::leveling::award_experience;
use platformer_common::movement::ensure_alive;
use platformer_common::spawning::SpawnArea;
use platformer_common::{AttackSlot, EnemyState, Rejection};

use crate::outcome::settle;
use crate::query_utils::QueryUtils;
use crate::tables::damage_event::{enemy_damage_event, player_damage_event, EnemyDamageEvent, PlayerDamageEvent};
use crate::tables::enemy_definition::enemy_definition;
use crate::tables::player::{player, Player};
use crate::tables::player_cooldown::{player_cooldown, PlayerCooldown};
use crate::tables::spawn::{spawn, Spawn};
use crate::tables::spawn_route::spawn_route;

/**
 * Resolve one player attack against a set of candidate spawns.
 *
 * Validation (alive, job attack, mana, cooldown) runs first; nothing is
 * written unless all of it passes. The accepted plan then lands in this one
 * transaction: mana, combat flag, every hit on every selected target with its
 * damage event, experience for kills and finally the slot cooldown.
 */
#[spacetimedb::reducer]
pub fn damage_enemy(ctx: &ReducerContext, spawn_ids: Vec<u32>, attack: AttackSlot) -> Result<(), String> {
    settle("damage_enemy", ctx.sender, resolve_attack(ctx, &spawn_ids, attack))
}

fn resolve_attack(ctx: &ReducerContext, spawn_ids: &[u32], slot: AttackSlot) -> Result<(), Rejection> {
    let Some(mut attacker) = QueryUtils::caller(ctx, "damage_enemy") else {
        return Ok(());
    };
    ensure_alive(attacker.hp, attacker.state)?;
    let attack = QueryUtils::attack_for(ctx, &attacker.job_key, slot).ok_or_else(|| Rejection::UnknownAttack {
        job: attacker.job_key.clone(),
        slot: slot.index(),
    })?;
    let cooldown = QueryUtils::cooldown(ctx, ctx.sender, slot);

    let mut requested: Vec<(Spawn, TargetState)> = Vec::with_capacity(spawn_ids.len());
    for spawn in spawn_ids.iter().filter_map(|id| ctx.db.spawn().spawn_id().find(*id)) {
        // without its route there is no area to clamp against, so no knockback
        let area = ctx
            .db
            .spawn_route()
            .route_id()
            .find(spawn.route_id)
            .map(|route| route.area())
            .unwrap_or_else(|| SpawnArea::new(spawn.x, spawn.y, 0.0, 0.0));
        let state = TargetState { id: spawn.spawn_id, x: spawn.x, hp: spawn.hp, alive: spawn.is_alive(), area };
        requested.push((spawn, state));
    }
    let targets: Vec<TargetState> = requested.iter().map(|(_, t)| *t).collect();

    let striker = Attacker {
        x: attacker.x,
        facing: attacker.facing,
        damage_multiplier: level_multiplier(attacker.level) + QueryUtils::passive_bonus(ctx, &attacker.job_key),
    };
    let plan = plan_attack(
        &striker,
        attacker.mana,
        &attack.profile(),
        cooldown.as_ref().map(|c| c.last_used_at.to_micros_since_unix_epoch()),
        ctx.timestamp.to_micros_since_unix_epoch(),
        &targets,
        || ctx.random::<f32>(),
    )?;

    attacker.mana -= plan.mana_cost;
    attacker.in_combat = true;
    attacker.last_combat_at = ctx.timestamp;
    attacker.last_active = ctx.timestamp;
    if plan.strikes.is_empty() {
        log::debug!("{} used {} but hit nothing", attacker.name, attack.name);
    }

    for strike in &plan.strikes {
        let (Some(outcome), Some(x)) = (strike.outcome(), strike.final_x()) else {
            continue;
        };
        let Some((mut target, _)) = requested.iter().find(|(s, _)| s.spawn_id == strike.id).cloned() else {
            continue;
        };
        for hit in &strike.hits {
            ctx.db.enemy_damage_event().insert(EnemyDamageEvent {
                event_id: 0,
                spawn_id: strike.id,
                attacker: ctx.sender,
                slot: slot.index(),
                amount: hit.amount,
                critical: hit.critical,
                lethal: hit.lethal,
                x: hit.x,
                y: target.y,
                timestamp: ctx.timestamp,
            });
        }

        target.hp = outcome.hp;
        target.x = x;
        target.state = outcome.enemy_state();
        target.aggro_target = if outcome.lethal { None } else { Some(ctx.sender) };
        target.last_updated = ctx.timestamp;
        log::debug!(
            "{} hit spawn {} {} times, hp now {}",
            attacker.name, strike.id, strike.hits.len(), target.hp
        );
        if outcome.lethal {
            reward_kill(ctx, &mut attacker, &target);
        }
        ctx.db.spawn().spawn_id().update(target);
    }

    ctx.db.player().identity().update(attacker);

    let used_at = Timestamp::from_micros_since_unix_epoch(plan.cooldown_used_at_micros);
    match cooldown {
        Some(mut row) => {
            row.last_used_at = used_at;
            ctx.db.player_cooldown().cooldown_id().update(row);
        }
        None => {
            ctx.db.player_cooldown().insert(PlayerCooldown {
                cooldown_id: 0,
                player_id: ctx.sender,
                slot: slot.index(),
                last_used_at: used_at,
            });
        }
    }
    Ok(())
}

/// Grant the kill's experience and apply any level-ups it pays for
fn reward_kill(ctx: &ReducerContext, attacker: &mut Player, killed: &Spawn) {
    let Some(definition) = ctx.db.enemy_definition().enemy_type().find(&killed.enemy_type) else {
        log::warn!("No definition for {}, no experience awarded", killed.enemy_type);
        return;
    };
    let progress = award_experience(
        attacker.level,
        attacker.experience,
        definition.exp_reward,
        &QueryUtils::level_table(ctx),
    );
    log::info!(
        "{} killed spawn {} ({}) for {} exp",
        attacker.name, killed.spawn_id, killed.enemy_type, definition.exp_reward
    );

    attacker.experience = progress.experience;
    if progress.levels_gained > 0 {
        attacker.level = progress.level;
        attacker.max_hp = progress.max_hp.unwrap_or(attacker.max_hp);
        attacker.max_mana = progress.max_mana.unwrap_or(attacker.max_mana);
        attacker.hp = attacker.max_hp;
        attacker.mana = attacker.max_mana;
        log::info!("{} reached level {}", attacker.name, attacker.level);
    }
}

/// Enemy strike on a player, driven by the patrol tick.
///
/// Returns the outcome, or `None` when the target is gone or already dead.
pub fn strike_player(ctx: &ReducerContext, striker: &Spawn, damage: u32, target: Identity) -> Option<HitOutcome> {
    let mut victim = ctx.db.player().identity().find(target)?;
    if !victim.is_alive() {
        return None;
    }

    let outcome = apply_hit(victim.hp, damage);
    victim.hp = outcome.hp;
    victim.state = outcome.player_state();
    victim.in_combat = true;
    victim.last_combat_at = ctx.timestamp;
    ctx.db.player_damage_event().insert(PlayerDamageEvent {
        event_id: 0,
        player_id: target,
        spawn_id: striker.spawn_id,
        enemy_type: striker.enemy_type.clone(),
        amount: damage,
        lethal: outcome.lethal,
        x: victim.x,
        y: victim.y,
        timestamp: ctx.timestamp,
    });
    if outcome.lethal {
        log::info!("{} was killed by {} {}", victim.name, striker.enemy_type, striker.spawn_id);
    }
    ctx.db.player().identity().update(victim);
    Some(outcome)
}

/// Return a damaged spawn to `Idle` once its hit reaction has played
#[spacetimedb::reducer]
pub fn recover_from_damage(ctx: &ReducerContext, spawn_id: u32) -> Result<(), String> {
    let Some(mut target) = ctx.db.spawn().spawn_id().find(spawn_id) else {
        log::debug!("recover_from_damage: no spawn {}", spawn_id);
        return Ok(());
    };
    if target.state != EnemyState::Damaged {
        return Ok(());
    }
    target.state = EnemyState::Idle;
    target.last_updated = ctx.timestamp;
    ctx.db.spawn().spawn_id().update(target);
    Ok(())
}
