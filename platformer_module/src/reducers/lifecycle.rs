use spacetimedb::{ReducerContext, ScheduleAt, Table, Timestamp};
use platformer_common::movement::SPAWN_POINT;
use platformer_common::{Facing, PlayerState};

use crate::constants::{CLEANUP_TICK, DEFAULT_JOB, DEFAULT_LEVEL, DEFAULT_MAX_HP, DEFAULT_MAX_MANA, PATROL_TICK, SPAWN_TICK};
use crate::tables::module_config::{module_config, ModuleConfig, MODULE_CONFIG_ID};
use crate::tables::player::{player, Player};
use crate::tables::player_cooldown::player_cooldown;
use crate::tables::player_level::player_level;
use crate::tables::scheduling::{
    cleanup_schedule, patrol_schedule, spawn_schedule, CleanupSchedule, PatrolSchedule, SpawnSchedule,
};

/**
 * Initialization reducer called when the module is first published.
 *
 * Records the publisher as module owner and arms the three recurring
 * schedules. Each schedule row stays in place and the host re-invokes its
 * reducer at the interval for as long as the module lives.
 */
#[spacetimedb::reducer(init)]
pub fn module_init(ctx: &ReducerContext) -> Result<(), String> {
    log::info!("Platformer module initialized by {}", ctx.sender);

    ctx.db.module_config().insert(ModuleConfig {
        id: MODULE_CONFIG_ID,
        owner: ctx.sender,
        admin_api_key: None,
    });

    arm_schedules(ctx);
    Ok(())
}

/// Insert one interval row per tick that is not armed yet
pub fn arm_schedules(ctx: &ReducerContext) {
    if ctx.db.cleanup_schedule().count() == 0 {
        ctx.db.cleanup_schedule().insert(CleanupSchedule {
            scheduled_id: 0,
            scheduled_at: ScheduleAt::Interval(CLEANUP_TICK.into()),
        });
    }
    if ctx.db.spawn_schedule().count() == 0 {
        ctx.db.spawn_schedule().insert(SpawnSchedule {
            scheduled_id: 0,
            scheduled_at: ScheduleAt::Interval(SPAWN_TICK.into()),
        });
    }
    if ctx.db.patrol_schedule().count() == 0 {
        ctx.db.patrol_schedule().insert(PatrolSchedule {
            scheduled_id: 0,
            scheduled_at: ScheduleAt::Interval(PATROL_TICK.into()),
        });
    }
    log::debug!("Schedules armed: cleanup {:?}, spawn {:?}, patrol {:?}", CLEANUP_TICK, SPAWN_TICK, PATROL_TICK);
}

/// Fresh level-1 player at the spawn point
pub fn new_player(ctx: &ReducerContext) -> Player {
    // level 1 stats come from the level table once it has been populated
    let (max_hp, max_mana) = ctx
        .db
        .player_level()
        .level()
        .find(DEFAULT_LEVEL)
        .map(|row| (row.max_hp, row.max_mana))
        .unwrap_or((DEFAULT_MAX_HP, DEFAULT_MAX_MANA));

    Player {
        identity: ctx.sender,
        name: format!("Player-{}", &ctx.sender.to_string()[..8]),
        x: SPAWN_POINT.0,
        y: SPAWN_POINT.1,
        facing: Facing::Right,
        state: PlayerState::Idle,
        hp: max_hp,
        max_hp,
        mana: max_mana,
        max_mana,
        level: DEFAULT_LEVEL,
        experience: 0,
        job_key: DEFAULT_JOB.to_string(),
        last_active: ctx.timestamp,
        in_combat: false,
        last_combat_at: Timestamp::from_micros_since_unix_epoch(0),
    }
}

/**
 * Client connection lifecycle reducer.
 *
 * Every connection gets a fresh player row keyed by its identity. A stale row
 * for the same identity (a disconnect the host never delivered) is replaced.
 */
#[spacetimedb::reducer(client_connected)]
pub fn on_client_connected(ctx: &ReducerContext) -> Result<(), String> {
    let client_id = ctx.sender;
    log::info!("Client connected: {}", client_id);

    if ctx.db.player().identity().delete(client_id) {
        log::warn!("Replaced stale player row for {}", client_id);
    }
    let player = ctx.db.player().insert(new_player(ctx));
    log::info!("Created player {} at ({}, {})", player.name, player.x, player.y);
    Ok(())
}

/**
 * Client disconnection lifecycle reducer.
 *
 * Sessions are ephemeral: the player row and its cooldowns go away. Reducers
 * that later look this identity up treat the missing row as "player gone".
 */
#[spacetimedb::reducer(client_disconnected)]
pub fn on_client_disconnected(ctx: &ReducerContext) -> Result<(), String> {
    let client_id = ctx.sender;
    log::info!("Client disconnected: {}", client_id);

    if !ctx.db.player().identity().delete(client_id) {
        log::debug!("No player row for {}", client_id);
    }
    let cooldowns: Vec<_> = ctx.db.player_cooldown().player_id().filter(client_id).collect();
    for cooldown in cooldowns {
        ctx.db.player_cooldown().delete(cooldown);
    }
    Ok(())
}
