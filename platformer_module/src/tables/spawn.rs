use spacetimedb::{Identity, Timestamp};
use platformer_common::{EnemyState, Facing};

/// A live enemy instance placed by the spawn tick.
///
/// Dead spawns linger for a short grace window so clients can play the death
/// animation, then the cleanup tick deletes them.
#[derive(Clone, Debug)]
#[spacetimedb::table(name = spawn, public)]
pub struct Spawn {
    #[primary_key]
    #[auto_inc]
    pub spawn_id: u32,
    #[index(btree)]
    pub route_id: u32,
    pub enemy_type: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: EnemyState,
    pub hp: u32,
    pub max_hp: u32,
    pub aggro_target: Option<Identity>,
    pub last_updated: Timestamp,
    pub last_attack_at: Option<Timestamp>,
}

impl Spawn {
    pub fn is_alive(&self) -> bool {
        self.hp > 0 && self.state.is_alive()
    }
}
