use spacetimedb::{Identity, ReducerContext, Table};
use platformer_common::leveling::LevelRow;
use platformer_common::AttackSlot;

use crate::tables::job::{attack, passive, Attack};
use crate::tables::module_config::{module_config, ModuleConfig, MODULE_CONFIG_ID};
use crate::tables::player::{player, Player};
use crate::tables::player_cooldown::{player_cooldown, PlayerCooldown};
use crate::tables::player_level::player_level;
use crate::tables::spawn::spawn;

/// Lookup helpers shared by the reducers
pub struct QueryUtils;

impl QueryUtils {
    /// The caller's player row. A missing row means the player is gone, which
    /// reducers treat as a no-op rather than an error.
    pub fn caller(ctx: &ReducerContext, reducer: &str) -> Option<Player> {
        let found = ctx.db.player().identity().find(ctx.sender);
        if found.is_none() {
            log::debug!("{}: no player row for {}", reducer, ctx.sender);
        }
        found
    }

    pub fn player_count(ctx: &ReducerContext) -> u64 {
        ctx.db.player().count()
    }

    pub fn config(ctx: &ReducerContext) -> Option<ModuleConfig> {
        ctx.db.module_config().id().find(MODULE_CONFIG_ID)
    }

    pub fn is_owner(ctx: &ReducerContext) -> bool {
        Self::config(ctx).is_some_and(|config| config.owner == ctx.sender)
    }

    /// Attack bound to `slot` of `job_key`
    pub fn attack_for(ctx: &ReducerContext, job_key: &str, slot: AttackSlot) -> Option<Attack> {
        ctx.db.attack().job_key().filter(job_key).find(|a| a.slot == slot)
    }

    /// Sum of the job's passive damage bonuses
    pub fn passive_bonus(ctx: &ReducerContext, job_key: &str) -> f32 {
        ctx.db.passive().job_key().filter(job_key).map(|p| p.damage_bonus).sum()
    }

    pub fn cooldown(ctx: &ReducerContext, player_id: Identity, slot: AttackSlot) -> Option<PlayerCooldown> {
        ctx.db
            .player_cooldown()
            .player_id()
            .filter(player_id)
            .find(|c| c.slot == slot.index())
    }

    pub fn level_table(ctx: &ReducerContext) -> Vec<LevelRow> {
        ctx.db.player_level().iter().map(LevelRow::from).collect()
    }

    /// Live spawns placed by one route
    pub fn living_on_route(ctx: &ReducerContext, route_id: u32) -> u32 {
        ctx.db.spawn().route_id().filter(route_id).filter(|s| s.is_alive()).count() as u32
    }
}
