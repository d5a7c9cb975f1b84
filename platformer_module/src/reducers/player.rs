use spacetimedb::ReducerContext;
use platformer_common::movement::{distance, ensure_alive, validate_move, SPAWN_POINT};
use platformer_common::state::validate_player_state_change;
use platformer_common::{Facing, PlayerState, Rejection};

use crate::outcome::settle;
use crate::query_utils::QueryUtils;
use crate::tables::job::job;
use crate::tables::player::player;
use crate::tables::teleport::teleport;

/// Client-reported position. Rejected for dead players and for displacements
/// beyond the per-update cap.
#[spacetimedb::reducer]
pub fn update_player_position(ctx: &ReducerContext, x: f32, y: f32, facing: Facing) -> Result<(), String> {
    settle("update_player_position", ctx.sender, move_player(ctx, x, y, facing))
}

fn move_player(ctx: &ReducerContext, x: f32, y: f32, facing: Facing) -> Result<(), Rejection> {
    let Some(mut player) = QueryUtils::caller(ctx, "update_player_position") else {
        return Ok(());
    };
    ensure_alive(player.hp, player.state)?;
    validate_move((player.x, player.y), (x, y))?;

    player.x = x;
    player.y = y;
    player.facing = facing;
    player.last_active = ctx.timestamp;
    ctx.db.player().identity().update(player);
    Ok(())
}

/// Client-requested state change, filtered through the shared adjacency table
#[spacetimedb::reducer]
pub fn update_player_state(ctx: &ReducerContext, state: PlayerState) -> Result<(), String> {
    settle("update_player_state", ctx.sender, change_state(ctx, state))
}

fn change_state(ctx: &ReducerContext, requested: PlayerState) -> Result<(), Rejection> {
    let Some(mut player) = QueryUtils::caller(ctx, "update_player_state") else {
        return Ok(());
    };
    let stored = validate_player_state_change(player.state, requested, player.hp)?;
    if stored == player.state {
        return Ok(());
    }
    if stored != requested {
        log::debug!("{} requested {} but has no HP left", ctx.sender, requested.name());
    }
    player.state = stored;
    player.last_active = ctx.timestamp;
    ctx.db.player().identity().update(player);
    Ok(())
}

/// Bring a dead player back at the spawn point with full HP and mana
#[spacetimedb::reducer]
pub fn respawn_player(ctx: &ReducerContext) -> Result<(), String> {
    settle("respawn_player", ctx.sender, respawn(ctx))
}

fn respawn(ctx: &ReducerContext) -> Result<(), Rejection> {
    let Some(mut player) = QueryUtils::caller(ctx, "respawn_player") else {
        return Ok(());
    };
    if player.is_alive() {
        return Err(Rejection::NotDead);
    }

    player.hp = player.max_hp;
    player.mana = player.max_mana;
    player.state = PlayerState::Idle;
    player.x = SPAWN_POINT.0;
    player.y = SPAWN_POINT.1;
    player.in_combat = false;
    player.last_active = ctx.timestamp;
    log::info!("{} respawned at ({}, {})", player.name, player.x, player.y);
    ctx.db.player().identity().update(player);
    Ok(())
}

/// Switch class. Not allowed mid-fight or below the job's unlock level.
#[spacetimedb::reducer]
pub fn change_job(ctx: &ReducerContext, job_key: String) -> Result<(), String> {
    settle("change_job", ctx.sender, switch_job(ctx, job_key))
}

fn switch_job(ctx: &ReducerContext, job_key: String) -> Result<(), Rejection> {
    let Some(mut player) = QueryUtils::caller(ctx, "change_job") else {
        return Ok(());
    };
    ensure_alive(player.hp, player.state)?;
    if player.in_combat {
        return Err(Rejection::InCombat);
    }
    let job = ctx
        .db
        .job()
        .job_key()
        .find(&job_key)
        .ok_or_else(|| Rejection::UnknownJob(job_key.clone()))?;
    if player.level < job.unlock_level {
        return Err(Rejection::LevelTooLow { level: player.level, required: job.unlock_level });
    }
    if player.job_key == job.job_key {
        return Ok(());
    }

    log::info!("{} changed job {} -> {}", player.name, player.job_key, job.job_key);
    player.job_key = job.job_key;
    player.last_active = ctx.timestamp;
    ctx.db.player().identity().update(player);
    Ok(())
}

/// Step onto a teleport pad. The jump to the destination is exempt from the
/// movement cap; the player must be standing within the pad's radius.
#[spacetimedb::reducer]
pub fn use_teleport(ctx: &ReducerContext, teleport_id: u32) -> Result<(), String> {
    settle("use_teleport", ctx.sender, teleport_player(ctx, teleport_id))
}

fn teleport_player(ctx: &ReducerContext, teleport_id: u32) -> Result<(), Rejection> {
    let Some(mut player) = QueryUtils::caller(ctx, "use_teleport") else {
        return Ok(());
    };
    ensure_alive(player.hp, player.state)?;
    let Some(pad) = ctx.db.teleport().teleport_id().find(teleport_id) else {
        log::debug!("use_teleport: no teleport {}", teleport_id);
        return Ok(());
    };
    if distance((player.x, player.y), (pad.x, pad.y)) > pad.radius {
        return Err(Rejection::OutOfRange);
    }

    player.x = pad.dest_x;
    player.y = pad.dest_y;
    player.last_active = ctx.timestamp;
    ctx.db.player().identity().update(player);
    Ok(())
}
