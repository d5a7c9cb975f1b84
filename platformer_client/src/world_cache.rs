//! Local mirror of the authoritative player and spawn rows.
//!
//! Fed from the row insert / update / delete callbacks of the subscription.
//! It is never a source of truth and can be rebuilt from rows at any time.

use std::collections::HashMap;

use platformer_common::query::BoundingBox;
use platformer_common::{EnemyState, Facing, PlayerState};
use spacetimedb_sdk::Identity;

/// The columns of a `player` row the client acts on
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub identity: Identity,
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
    pub in_combat: bool,
}

/// The columns of a `spawn` row the client acts on
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRow {
    pub spawn_id: u32,
    pub route_id: u32,
    pub enemy_type: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: EnemyState,
    pub hp: u32,
    pub max_hp: u32,
}

/// What a row event did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Inserted,
    Updated,
    Removed,
    /// Delete for a row the cache never held
    Unknown,
}

#[derive(Debug, Default)]
pub struct WorldCache {
    players: HashMap<Identity, PlayerRow>,
    spawns: HashMap<u32, SpawnRow>,
}

impl WorldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert and update callbacks both land here
    pub fn upsert_player(&mut self, row: PlayerRow) -> RowChange {
        match self.players.insert(row.identity, row) {
            Some(_) => RowChange::Updated,
            None => RowChange::Inserted,
        }
    }

    pub fn remove_player(&mut self, identity: &Identity) -> RowChange {
        match self.players.remove(identity) {
            Some(_) => RowChange::Removed,
            None => RowChange::Unknown,
        }
    }

    pub fn upsert_spawn(&mut self, row: SpawnRow) -> RowChange {
        match self.spawns.insert(row.spawn_id, row) {
            Some(_) => RowChange::Updated,
            None => RowChange::Inserted,
        }
    }

    pub fn remove_spawn(&mut self, spawn_id: u32) -> RowChange {
        match self.spawns.remove(&spawn_id) {
            Some(_) => RowChange::Removed,
            None => RowChange::Unknown,
        }
    }

    pub fn player(&self, identity: &Identity) -> Option<&PlayerRow> {
        self.players.get(identity)
    }

    pub fn spawn(&self, spawn_id: u32) -> Option<&SpawnRow> {
        self.spawns.get(&spawn_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerRow> {
        self.players.values()
    }

    pub fn spawns(&self) -> impl Iterator<Item = &SpawnRow> {
        self.spawns.values()
    }

    /// Living spawns inside a window, e.g. attack candidates around the player
    pub fn living_spawns_in(&self, area: &BoundingBox) -> Vec<&SpawnRow> {
        let mut found: Vec<_> = self
            .spawns
            .values()
            .filter(|s| s.hp > 0 && s.state.is_alive() && area.contains(s.x, s.y))
            .collect();
        found.sort_by_key(|s| s.spawn_id);
        found
    }

    /// Drop everything, e.g. before replaying rows after a reconnect
    pub fn clear(&mut self) {
        self.players.clear();
        self.spawns.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn player_row(identity: Identity, x: f32, y: f32) -> PlayerRow {
        PlayerRow {
            identity,
            name: "tester".to_string(),
            x,
            y,
            facing: Facing::Right,
            state: PlayerState::Idle,
            hp: 100,
            max_hp: 100,
            mana: 100,
            max_mana: 100,
            level: 1,
            in_combat: false,
        }
    }

    pub fn spawn_row(spawn_id: u32, x: f32) -> SpawnRow {
        SpawnRow {
            spawn_id,
            route_id: 1,
            enemy_type: "slime".to_string(),
            x,
            y: 100.0,
            facing: Facing::Left,
            state: EnemyState::Idle,
            hp: 50,
            max_hp: 50,
        }
    }

    #[test]
    fn mirrors_row_lifecycle() {
        let mut cache = WorldCache::new();
        let id = Identity::ZERO;
        assert_eq!(cache.upsert_player(player_row(id, 1.0, 2.0)), RowChange::Inserted);
        assert_eq!(cache.upsert_player(player_row(id, 5.0, 2.0)), RowChange::Updated);
        assert_eq!(cache.player(&id).map(|p| p.x), Some(5.0));
        assert_eq!(cache.remove_player(&id), RowChange::Removed);
        assert_eq!(cache.remove_player(&id), RowChange::Unknown);
    }

    #[test]
    fn window_query_skips_dead_and_distant_spawns() {
        let mut cache = WorldCache::new();
        cache.upsert_spawn(spawn_row(1, 110.0));
        cache.upsert_spawn(spawn_row(2, 900.0));
        let mut dead = spawn_row(3, 120.0);
        dead.hp = 0;
        dead.state = EnemyState::Dead;
        cache.upsert_spawn(dead);

        let area = BoundingBox::around(100.0, 100.0, 50.0);
        let ids: Vec<u32> = cache.living_spawns_in(&area).iter().map(|s| s.spawn_id).collect();
        assert_eq!(ids, vec![1]);
    }
}
