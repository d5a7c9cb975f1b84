use spacetimedb::{ReducerContext, Table};
use platformer_common::config::{parse_entries, EnemyDefinition, JobDefinition, TeleportDefinition};
use platformer_common::leveling::LevelRow;
use platformer_common::{ConfigError, Rejection};

use crate::outcome::settle;
use crate::query_utils::QueryUtils;
use crate::tables::enemy_definition::{enemy_definition, EnemyDefinition as EnemyDefinitionRow};
use crate::tables::job::{attack, job, passive, Attack, Job, Passive};
use crate::tables::module_config::module_config;
use crate::tables::player_level::{player_level, PlayerLevel};
use crate::tables::teleport::{teleport, Teleport};

/// Set or clear the key that gates the static-data loaders. Owner only.
#[spacetimedb::reducer]
pub fn set_admin_api_key(ctx: &ReducerContext, api_key: String) -> Result<(), String> {
    settle("set_admin_api_key", ctx.sender, store_admin_key(ctx, api_key))
}

fn store_admin_key(ctx: &ReducerContext, api_key: String) -> Result<(), Rejection> {
    let mut config = QueryUtils::config(ctx).ok_or(Rejection::Unauthorized)?;
    if config.owner != ctx.sender {
        return Err(Rejection::Unauthorized);
    }
    let key = api_key.trim();
    config.admin_api_key = (!key.is_empty()).then(|| key.to_string());
    log::info!("Admin API key {}", if config.admin_api_key.is_some() { "set" } else { "cleared" });
    ctx.db.module_config().id().update(config);
    Ok(())
}

fn check_admin_key(ctx: &ReducerContext, api_key: &str) -> Result<(), Rejection> {
    match QueryUtils::config(ctx).and_then(|c| c.admin_api_key) {
        Some(stored) if stored == api_key => Ok(()),
        _ => Err(Rejection::Unauthorized),
    }
}

/// Unwrap a parsed payload, logging the failure. Tables are only cleared after this succeeds.
fn parsed<T>(reducer: &str, payload: Result<Vec<T>, ConfigError>) -> Option<Vec<T>> {
    match payload {
        Ok(entries) => Some(entries),
        Err(e) => {
            log::error!("{}: {}; existing data left untouched", reducer, e);
            None
        }
    }
}

#[spacetimedb::reducer]
pub fn populate_player_level(ctx: &ReducerContext, admin_api_key: String, config_json: String) -> Result<(), String> {
    if let Err(rejection) = check_admin_key(ctx, &admin_api_key) {
        return settle("populate_player_level", ctx.sender, Err(rejection));
    }
    let Some(rows) = parsed("populate_player_level", parse_entries::<LevelRow>(&config_json)) else {
        return Ok(());
    };

    let existing: Vec<_> = ctx.db.player_level().iter().collect();
    for row in existing {
        ctx.db.player_level().delete(row);
    }
    let count = rows.len();
    for row in rows {
        ctx.db.player_level().level().delete(row.level);
        ctx.db.player_level().insert(PlayerLevel::from(row));
    }
    log::info!("Loaded {} player levels", count);
    Ok(())
}

#[spacetimedb::reducer]
pub fn populate_enemy(ctx: &ReducerContext, admin_api_key: String, config_json: String) -> Result<(), String> {
    if let Err(rejection) = check_admin_key(ctx, &admin_api_key) {
        return settle("populate_enemy", ctx.sender, Err(rejection));
    }
    let Some(definitions) = parsed("populate_enemy", parse_entries::<EnemyDefinition>(&config_json)) else {
        return Ok(());
    };

    let existing: Vec<_> = ctx.db.enemy_definition().iter().collect();
    for row in existing {
        ctx.db.enemy_definition().delete(row);
    }
    let count = definitions.len();
    for definition in definitions {
        // later duplicates of a type replace earlier ones
        ctx.db.enemy_definition().enemy_type().delete(&definition.enemy_type);
        ctx.db.enemy_definition().insert(EnemyDefinitionRow::from(definition));
    }
    log::info!("Loaded {} enemy definitions", count);
    Ok(())
}

/// Replace jobs together with their attacks and passives
#[spacetimedb::reducer]
pub fn populate_jobs(ctx: &ReducerContext, admin_api_key: String, config_json: String) -> Result<(), String> {
    if let Err(rejection) = check_admin_key(ctx, &admin_api_key) {
        return settle("populate_jobs", ctx.sender, Err(rejection));
    }
    let Some(jobs) = parsed("populate_jobs", parse_entries::<JobDefinition>(&config_json)) else {
        return Ok(());
    };

    let old_jobs: Vec<_> = ctx.db.job().iter().collect();
    for row in old_jobs {
        ctx.db.job().delete(row);
    }
    let old_attacks: Vec<_> = ctx.db.attack().iter().collect();
    for row in old_attacks {
        ctx.db.attack().delete(row);
    }
    let old_passives: Vec<_> = ctx.db.passive().iter().collect();
    for row in old_passives {
        ctx.db.passive().delete(row);
    }

    let count = jobs.len();
    for definition in jobs {
        ctx.db.job().job_key().delete(&definition.job_key);
        ctx.db.job().insert(Job {
            job_key: definition.job_key.clone(),
            name: definition.name,
            unlock_level: definition.unlock_level,
        });
        for attack in definition.attacks {
            let p = attack.profile();
            ctx.db.attack().insert(Attack {
                attack_id: 0,
                job_key: definition.job_key.clone(),
                slot: attack.slot,
                name: attack.name,
                damage: p.damage,
                cooldown_ms: p.cooldown_ms,
                range: p.range,
                hits: p.hits,
                targets: p.targets,
                crit_chance: p.crit_chance,
                knockback: p.knockback,
                mana_cost: p.mana_cost,
                projectile_key: attack.projectile_key,
                effect_key: attack.effect_key,
            });
        }
        for passive in definition.passives {
            ctx.db.passive().insert(Passive {
                passive_id: 0,
                job_key: definition.job_key.clone(),
                name: passive.name,
                damage_bonus: passive.damage_bonus,
            });
        }
    }
    log::info!("Loaded {} jobs", count);
    Ok(())
}

#[spacetimedb::reducer]
pub fn initialize_teleports(ctx: &ReducerContext, admin_api_key: String, config_json: String) -> Result<(), String> {
    if let Err(rejection) = check_admin_key(ctx, &admin_api_key) {
        return settle("initialize_teleports", ctx.sender, Err(rejection));
    }
    let Some(pads) = parsed("initialize_teleports", parse_entries::<TeleportDefinition>(&config_json)) else {
        return Ok(());
    };

    let existing: Vec<_> = ctx.db.teleport().iter().collect();
    for row in existing {
        ctx.db.teleport().delete(row);
    }
    let count = pads.len();
    for pad in pads {
        ctx.db.teleport().teleport_id().delete(pad.teleport_id);
        ctx.db.teleport().insert(Teleport {
            teleport_id: pad.teleport_id,
            x: pad.x,
            y: pad.y,
            radius: pad.radius,
            dest_x: pad.dest_x,
            dest_y: pad.dest_y,
        });
    }
    log::info!("Loaded {} teleports", count);
    Ok(())
}
