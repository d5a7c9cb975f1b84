/**
 * Authoritative platformer module.
 *
 * Every piece of shared world state lives in tables and every change goes
 * through a reducer: player lifecycle and movement, combat and leveling,
 * spawn routes and enemy AI, plus three scheduled ticks for cleanup, spawning
 * and patrol. The rules themselves live in `platformer_common`; reducers read
 * rows, call those rules and write the result.
 */

pub mod constants;
pub mod outcome;
pub mod query_utils;

pub mod tables {
    pub mod damage_event;
    pub mod enemy_definition;
    pub mod job;
    pub mod module_config;
    pub mod player;
    pub mod player_cooldown;
    pub mod player_level;
    pub mod scheduling;
    pub mod spawn;
    pub mod spawn_route;
    pub mod teleport;
}
pub mod reducers {
    pub mod admin;
    pub mod combat;
    pub mod lifecycle;
    pub mod player;
    pub mod ticks;
    pub mod world;
}

pub mod rls;

// Re-export important types
pub use spacetimedb::{Identity, ReducerContext, Table, Timestamp};

// Re-export table types
pub use tables::player::Player;
pub use tables::spawn::Spawn;
pub use tables::spawn_route::SpawnRoute;
// Re-export reducer functions
pub use reducers::admin::{initialize_teleports, populate_enemy, populate_jobs, populate_player_level, set_admin_api_key};
pub use reducers::combat::{damage_enemy, recover_from_damage};
pub use reducers::lifecycle::{module_init, on_client_connected, on_client_disconnected};
pub use reducers::player::{change_job, respawn_player, update_player_position, update_player_state, use_teleport};
pub use reducers::world::{initialize_enemy_routes, spawn_all_enemies};
