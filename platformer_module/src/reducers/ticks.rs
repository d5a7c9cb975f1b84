use std::collections::HashMap;

use spacetimedb::{Identity, ReducerContext, Table, Timestamp};
use platformer_common::patrol::{patrol_step, PatrolEnemy, PatrolParams, PlayerSighting};
use platformer_common::spawning::{plan_route_tick, RouteTick, SpawnArea};
use platformer_common::upkeep::{combat_expired, event_expired, spawn_upkeep, SpawnUpkeep};
use platformer_common::EnemyState;

use crate::constants::{micros_since, PATROL_TICK};
use crate::query_utils::QueryUtils;
use crate::reducers::combat::strike_player;
use crate::reducers::world::top_up_route;
use crate::tables::damage_event::{enemy_damage_event, player_damage_event};
use crate::tables::enemy_definition::enemy_definition;
use crate::tables::player::player;
use crate::tables::scheduling::{CleanupSchedule, PatrolSchedule, SpawnSchedule};
use crate::tables::spawn::spawn;
use crate::tables::spawn_route::spawn_route;

// Every tick recomputes from table contents; nothing carries over between runs.

/// Scheduled housekeeping: dead-body purge, damaged fallback, combat timeout and
/// damage-event pruning. Idle servers skip it.
#[spacetimedb::reducer]
pub fn cleanup_tick(ctx: &ReducerContext, _schedule: CleanupSchedule) -> Result<(), String> {
    // Only allow scheduler to call
    if ctx.sender != ctx.identity() {
        return Err("Unauthorized".into());
    }
    if QueryUtils::player_count(ctx) == 0 {
        return Ok(());
    }
    let now = ctx.timestamp;

    let mut purged = 0;
    let mut recovered = 0;
    let spawns: Vec<_> = ctx.db.spawn().iter().collect();
    for mut row in spawns {
        match spawn_upkeep(row.state, micros_since(now, row.last_updated)) {
            SpawnUpkeep::Purge => {
                ctx.db.spawn().delete(row);
                purged += 1;
            }
            SpawnUpkeep::Recover => {
                row.state = EnemyState::Idle;
                row.last_updated = now;
                ctx.db.spawn().spawn_id().update(row);
                recovered += 1;
            }
            SpawnUpkeep::Keep => {}
        }
    }

    let cooled: Vec<_> = ctx
        .db
        .player()
        .iter()
        .filter(|p| combat_expired(p.in_combat, micros_since(now, p.last_combat_at)))
        .collect();
    let left_combat = cooled.len();
    for mut row in cooled {
        row.in_combat = false;
        ctx.db.player().identity().update(row);
    }

    let pruned = prune_damage_events(ctx, now);
    if purged + recovered + left_combat + pruned > 0 {
        log::debug!(
            "cleanup: purged {} dead, recovered {} damaged, {} left combat, pruned {} events",
            purged, recovered, left_combat, pruned
        );
    }
    Ok(())
}

fn prune_damage_events(ctx: &ReducerContext, now: Timestamp) -> usize {
    let stale_enemy: Vec<_> = ctx
        .db
        .enemy_damage_event()
        .iter()
        .filter(|e| event_expired(micros_since(now, e.timestamp)))
        .collect();
    let stale_player: Vec<_> = ctx
        .db
        .player_damage_event()
        .iter()
        .filter(|e| event_expired(micros_since(now, e.timestamp)))
        .collect();
    let pruned = stale_enemy.len() + stale_player.len();
    for row in stale_enemy {
        ctx.db.enemy_damage_event().delete(row);
    }
    for row in stale_player {
        ctx.db.player_damage_event().delete(row);
    }
    pruned
}

/// Scheduled per-route top-up. A due route always has its clock advanced,
/// even when it was already full.
#[spacetimedb::reducer]
pub fn spawn_tick(ctx: &ReducerContext, _schedule: SpawnSchedule) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return Err("Unauthorized".into());
    }
    if QueryUtils::player_count(ctx) == 0 {
        return Ok(());
    }
    let now = ctx.timestamp.to_micros_since_unix_epoch();

    let mut spawned = 0;
    let routes: Vec<_> = ctx.db.spawn_route().iter().collect();
    for mut route in routes {
        let alive = QueryUtils::living_on_route(ctx, route.route_id);
        let last = route.last_spawn_time.to_micros_since_unix_epoch();
        let RouteTick::TopUp { spawn } = plan_route_tick(last, route.spawn_interval_ms, alive, route.max_population, now)
        else {
            continue;
        };
        spawned += top_up_route(ctx, &route, spawn);
        route.last_spawn_time = ctx.timestamp;
        ctx.db.spawn_route().route_id().update(route);
    }
    if spawned > 0 {
        log::debug!("spawn tick placed {} spawns", spawned);
    }
    Ok(())
}

/// Scheduled enemy AI step: patrol, aggro and enemy attacks
#[spacetimedb::reducer]
pub fn patrol_tick(ctx: &ReducerContext, _schedule: PatrolSchedule) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return Err("Unauthorized".into());
    }
    let mut sightings: Vec<PlayerSighting<Identity>> = ctx
        .db
        .player()
        .iter()
        .map(|p| PlayerSighting { id: p.identity, x: p.x, y: p.y, alive: p.is_alive() })
        .collect();
    if sightings.is_empty() {
        return Ok(());
    }

    let now = ctx.timestamp.to_micros_since_unix_epoch();
    let dt = PATROL_TICK.as_secs_f32();
    let definitions: HashMap<String, (PatrolParams, u32)> = ctx
        .db
        .enemy_definition()
        .iter()
        .map(|d| (d.enemy_type.clone(), (d.patrol_params(), d.damage)))
        .collect();
    let areas: HashMap<u32, SpawnArea> = ctx.db.spawn_route().iter().map(|r| (r.route_id, r.area())).collect();

    let living: Vec<_> = ctx.db.spawn().iter().filter(|s| s.is_alive()).collect();
    for mut row in living {
        let (Some((params, damage)), Some(area)) = (definitions.get(&row.enemy_type), areas.get(&row.route_id)) else {
            continue;
        };
        let enemy = PatrolEnemy {
            x: row.x,
            y: row.y,
            facing: row.facing,
            state: row.state,
            aggro_target: row.aggro_target,
            last_attack_micros: row.last_attack_at.map(|t| t.to_micros_since_unix_epoch()),
        };
        let decision = patrol_step(&enemy, params, area, &sightings, dt, now, ctx.random::<f32>());
        if !decision.changes(&enemy) && decision.attack.is_none() {
            continue;
        }

        row.x = decision.x;
        row.facing = decision.facing;
        row.state = decision.state;
        row.aggro_target = decision.aggro_target;
        row.last_updated = ctx.timestamp;
        if let Some(target) = decision.attack {
            row.last_attack_at = Some(ctx.timestamp);
            let outcome = strike_player(ctx, &row, *damage, target);
            if outcome.is_some_and(|o| o.lethal) {
                // later enemies this tick must not keep hitting a corpse
                if let Some(seen) = sightings.iter_mut().find(|s| s.id == target) {
                    seen.alive = false;
                }
                row.aggro_target = None;
            }
        }
        ctx.db.spawn().spawn_id().update(row);
    }
    Ok(())
}
