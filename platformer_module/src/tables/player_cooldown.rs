use spacetimedb::{Identity, Timestamp};

/// Last use of one attack slot by one player
#[derive(Clone, Debug, PartialEq)]
#[spacetimedb::table(name = player_cooldown, public)]
pub struct PlayerCooldown {
    /// surrogate PK for upserts
    #[primary_key]
    #[auto_inc]
    pub cooldown_id: u64,

    /// index for filter-based lookup
    #[index(btree)]
    pub player_id: Identity,

    pub slot: u8,
    pub last_used_at: Timestamp,
}
