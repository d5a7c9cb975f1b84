use serde::{Deserialize, Serialize};

/// Hard ceiling regardless of the level table
pub const MAX_LEVEL: u32 = 200;

/// One row of the player level table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRow {
    pub level: u32,
    /// Experience needed to advance from this level to the next
    pub exp_to_next: u64,
    pub max_hp: u32,
    pub max_mana: u32,
}

/// Experience required to leave `level`; falls back to `100 * level` when the table has no row
pub fn exp_to_next(table: &[LevelRow], level: u32) -> u64 {
    table
        .iter()
        .find(|row| row.level == level)
        .map(|row| row.exp_to_next)
        .unwrap_or(100 * level as u64)
}

/// Result of an experience award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub experience: u64,
    pub levels_gained: u32,
    /// Stats of the reached level, when the table defines them
    pub max_hp: Option<u32>,
    pub max_mana: Option<u32>,
}

/// Add `gained` experience and carry over as many level-ups as it pays for
pub fn award_experience(level: u32, experience: u64, gained: u64, table: &[LevelRow]) -> LevelProgress {
    let mut progress = LevelProgress {
        level,
        experience: experience.saturating_add(gained),
        levels_gained: 0,
        max_hp: None,
        max_mana: None,
    };
    while progress.level < MAX_LEVEL {
        let needed = exp_to_next(table, progress.level);
        if needed == 0 || progress.experience < needed {
            break;
        }
        progress.experience -= needed;
        progress.level += 1;
        progress.levels_gained += 1;
        if let Some(row) = table.iter().find(|row| row.level == progress.level) {
            progress.max_hp = Some(row.max_hp);
            progress.max_mana = Some(row.max_mana);
        }
    }
    progress
}
