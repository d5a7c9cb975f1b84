use spacetimedb::{Identity, Timestamp};

/**
 * Append-only hit feedback.
 *
 * Clients render damage numbers and hit effects from these rows; HP on the
 * entity rows stays the source of truth. The cleanup tick prunes rows older
 * than the retention window.
 */
#[derive(Clone, Debug)]
#[spacetimedb::table(name = enemy_damage_event, public)]
pub struct EnemyDamageEvent {
    #[primary_key]
    #[auto_inc]
    pub event_id: u64,

    #[index(btree)]
    pub spawn_id: u32,
    pub attacker: Identity,

    pub slot: u8,
    pub amount: u32,
    pub critical: bool,
    pub lethal: bool,
    // victim position after knockback
    pub x: f32,
    pub y: f32,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug)]
#[spacetimedb::table(name = player_damage_event, public)]
pub struct PlayerDamageEvent {
    #[primary_key]
    #[auto_inc]
    pub event_id: u64,

    #[index(btree)]
    pub player_id: Identity,
    pub spawn_id: u32,
    pub enemy_type: String,

    pub amount: u32,
    pub lethal: bool,
    pub x: f32,
    pub y: f32,
    pub timestamp: Timestamp,
}
