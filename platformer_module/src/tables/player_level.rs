use platformer_common::leveling::LevelRow;

/// Experience curve and per-level stats
#[derive(Clone, Copy, Debug)]
#[spacetimedb::table(name = player_level, public)]
pub struct PlayerLevel {
    #[primary_key]
    pub level: u32,
    pub exp_to_next: u64,
    pub max_hp: u32,
    pub max_mana: u32,
}

impl From<PlayerLevel> for LevelRow {
    fn from(row: PlayerLevel) -> Self {
        LevelRow { level: row.level, exp_to_next: row.exp_to_next, max_hp: row.max_hp, max_mana: row.max_mana }
    }
}

impl From<LevelRow> for PlayerLevel {
    fn from(row: LevelRow) -> Self {
        PlayerLevel { level: row.level, exp_to_next: row.exp_to_next, max_hp: row.max_hp, max_mana: row.max_mana }
    }
}
