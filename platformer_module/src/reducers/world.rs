use spacetimedb::{ReducerContext, Table, Timestamp};
use platformer_common::config::parse_tilemap_routes;
use platformer_common::spawning::top_up_count;
use platformer_common::{EnemyState, Facing, Rejection};

use crate::outcome::settle;
use crate::query_utils::QueryUtils;
use crate::tables::enemy_definition::{enemy_definition, EnemyDefinition};
use crate::tables::spawn::{spawn, Spawn};
use crate::tables::spawn_route::{spawn_route, SpawnRoute};

/**
 * Load enemy routes from a tilemap export.
 *
 * Anyone may seed an empty world (the first client ships the map); replacing
 * existing routes is reserved to the module owner. Replacing routes also
 * clears their spawns. New routes are due on the next spawn tick.
 */
#[spacetimedb::reducer]
pub fn initialize_enemy_routes(ctx: &ReducerContext, tilemap_json: String) -> Result<(), String> {
    if ctx.db.spawn_route().count() > 0 && !QueryUtils::is_owner(ctx) {
        return settle("initialize_enemy_routes", ctx.sender, Err(Rejection::Unauthorized));
    }
    let routes = match parse_tilemap_routes(&tilemap_json) {
        Ok(routes) => routes,
        Err(e) => {
            log::error!("initialize_enemy_routes: {}; existing routes left untouched", e);
            return Ok(());
        }
    };

    let old_spawns: Vec<_> = ctx.db.spawn().iter().collect();
    for row in old_spawns {
        ctx.db.spawn().delete(row);
    }
    let old_routes: Vec<_> = ctx.db.spawn_route().iter().collect();
    for row in old_routes {
        ctx.db.spawn_route().delete(row);
    }

    let count = routes.len();
    for route in routes {
        if ctx.db.enemy_definition().enemy_type().find(&route.enemy_type).is_none() {
            log::warn!("Route {} uses undefined enemy type {}", route.route_id, route.enemy_type);
        }
        ctx.db.spawn_route().route_id().delete(route.route_id);
        ctx.db.spawn_route().insert(SpawnRoute {
            route_id: route.route_id,
            enemy_type: route.enemy_type,
            area_x: route.area.x,
            area_y: route.area.y,
            area_width: route.area.width,
            area_height: route.area.height,
            max_population: route.max_population,
            spawn_interval_ms: route.spawn_interval_ms,
            last_spawn_time: Timestamp::from_micros_since_unix_epoch(0),
        });
    }
    log::info!("Loaded {} enemy routes", count);
    Ok(())
}

/// Top every route up to its cap right away, ignoring spawn intervals. Owner only.
#[spacetimedb::reducer]
pub fn spawn_all_enemies(ctx: &ReducerContext) -> Result<(), String> {
    if !QueryUtils::is_owner(ctx) {
        return settle("spawn_all_enemies", ctx.sender, Err(Rejection::Unauthorized));
    }
    let mut spawned = 0;
    let routes: Vec<_> = ctx.db.spawn_route().iter().collect();
    for mut route in routes {
        let missing = top_up_count(QueryUtils::living_on_route(ctx, route.route_id), route.max_population);
        spawned += top_up_route(ctx, &route, missing);
        route.last_spawn_time = ctx.timestamp;
        ctx.db.spawn_route().route_id().update(route);
    }
    log::info!("spawn_all_enemies placed {} spawns", spawned);
    Ok(())
}

/// Place `missing` idle spawns at random points inside a route's area.
/// Returns how many were placed.
pub fn top_up_route(ctx: &ReducerContext, route: &SpawnRoute, missing: u32) -> u32 {
    let Some(definition) = ctx.db.enemy_definition().enemy_type().find(&route.enemy_type) else {
        log::warn!("Route {} skipped: no definition for {}", route.route_id, route.enemy_type);
        return 0;
    };
    let area = route.area();
    for _ in 0..missing {
        let (x, y) = area.point_at(ctx.random::<f32>(), ctx.random::<f32>());
        ctx.db.spawn().insert(fresh_spawn(ctx, route, &definition, x, y));
    }
    if missing > 0 {
        log::debug!("Route {} topped up with {} {}", route.route_id, missing, route.enemy_type);
    }
    missing
}

fn fresh_spawn(ctx: &ReducerContext, route: &SpawnRoute, definition: &EnemyDefinition, x: f32, y: f32) -> Spawn {
    Spawn {
        spawn_id: 0,
        route_id: route.route_id,
        enemy_type: definition.enemy_type.clone(),
        x,
        y,
        facing: if ctx.random::<f32>() < 0.5 { Facing::Left } else { Facing::Right },
        state: EnemyState::Idle,
        hp: definition.max_hp,
        max_hp: definition.max_hp,
        aggro_target: None,
        last_updated: ctx.timestamp,
        last_attack_at: None,
    }
}
