use spacetimedb::{Identity, Timestamp};
use platformer_common::{Facing, PlayerState};

/**
 * Player entity, one row per live connection.
 *
 * The row is created on connect and deleted on disconnect, so a missing row
 * is the canonical "player gone" signal for every reducer.
 *
 * Invariant: `hp == 0` if and only if `state == Dead`.
 */
#[derive(Clone, Debug)]
#[spacetimedb::table(name = player, public)]
pub struct Player {
    #[primary_key]
    pub identity: Identity,   // Maps directly to the client's Identity
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: PlayerState,
    pub hp: u32,
    pub max_hp: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub level: u32,
    pub experience: u64,
    pub job_key: String,
    pub last_active: Timestamp,
    pub in_combat: bool,
    pub last_combat_at: Timestamp,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.hp > 0 && self.state != PlayerState::Dead
    }
}
