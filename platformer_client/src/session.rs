//! Explicit per-connection context.
//!
//! Everything a frame needs (config, identity, reducer façade, row cache,
//! controllers and subscriptions) is owned here and handed down, so no
//! component has to look the player or connection up globally.

use std::collections::HashMap;

use platformer_common::{AttackSlot, PlayerState};
use spacetimedb_sdk::Identity;

use crate::actions::{report, with_retry, GameActions};
use crate::config::ClientConfig;
use crate::controllers::{Animator, Body, EnemyController, PeerController, PlayerController};
use crate::error::GameError;
use crate::proximity::{ProximitySubscriptionManager, SubscriptionBackend};
use crate::world_cache::{PlayerRow, RowChange, SpawnRow, WorldCache};

/// Creates animators for entities as they enter the subscription window
pub trait AnimatorFactory {
    type Animator: Animator;

    fn peer(&mut self, identity: Identity) -> Self::Animator;
    fn enemy(&mut self, spawn_id: u32, enemy_type: &str) -> Self::Animator;
}

pub struct GameSession<G, S, B, F>
where
    S: SubscriptionBackend,
    F: AnimatorFactory,
{
    config: ClientConfig,
    identity: Identity,
    actions: G,
    cache: WorldCache,
    player: PlayerController<B, F::Animator>,
    peers: HashMap<Identity, PeerController<F::Animator>>,
    enemies: HashMap<u32, EnemyController<F::Animator>>,
    proximity: ProximitySubscriptionManager<S>,
    animators: F,
}

impl<G, S, B, F> GameSession<G, S, B, F>
where
    G: GameActions,
    S: SubscriptionBackend,
    B: Body,
    F: AnimatorFactory,
{
    pub fn new(config: ClientConfig, identity: Identity, actions: G, backend: S, body: B, mut animators: F) -> Self {
        let player = PlayerController::new(body, animators.peer(identity), &config);
        let proximity = ProximitySubscriptionManager::new(backend, config.proximity_radius, config.resubscribe_distance);
        Self {
            config,
            identity,
            actions,
            cache: WorldCache::new(),
            player,
            peers: HashMap::new(),
            enemies: HashMap::new(),
            proximity,
            animators,
        }
    }

    /// Subscribe the static tables and the first proximity window
    pub fn start(&mut self) -> Result<(), GameError> {
        let policy = self.config.retry_policy();
        with_retry(policy, || self.proximity.subscribe_static())?;
        let (x, y) = self.player.body().position();
        with_retry(policy, || self.proximity.update_position(x, y))?;
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn actions(&self) -> &G {
        &self.actions
    }

    pub fn cache(&self) -> &WorldCache {
        &self.cache
    }

    pub fn player(&self) -> &PlayerController<B, F::Animator> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController<B, F::Animator> {
        &mut self.player
    }

    pub fn peer(&self, identity: &Identity) -> Option<&PeerController<F::Animator>> {
        self.peers.get(identity)
    }

    pub fn enemy(&self, spawn_id: u32) -> Option<&EnemyController<F::Animator>> {
        self.enemies.get(&spawn_id)
    }

    /// Player insert and update callbacks
    pub fn on_player_row(&mut self, row: PlayerRow) {
        if row.identity == self.identity {
            self.player.on_server_row(&row);
        } else {
            match self.peers.get_mut(&row.identity) {
                Some(peer) => peer.on_server_row(&row),
                None => {
                    let animator = self.animators.peer(row.identity);
                    self.peers.insert(row.identity, PeerController::new(&row, animator, &self.config));
                }
            }
        }
        self.cache.upsert_player(row);
    }

    pub fn on_player_deleted(&mut self, identity: &Identity) {
        if self.cache.remove_player(identity) == RowChange::Removed {
            self.peers.remove(identity);
        }
    }

    /// Spawn insert and update callbacks
    pub fn on_spawn_row(&mut self, row: SpawnRow) {
        match self.enemies.get_mut(&row.spawn_id) {
            Some(enemy) => enemy.on_server_row(&row),
            None => {
                let animator = self.animators.enemy(row.spawn_id, &row.enemy_type);
                self.enemies.insert(row.spawn_id, EnemyController::new(&row, animator, &self.config));
            }
        }
        self.cache.upsert_spawn(row);
    }

    pub fn on_spawn_deleted(&mut self, spawn_id: u32) {
        self.cache.remove_spawn(spawn_id);
        self.enemies.remove(&spawn_id);
    }

    /// Attack with the candidates the host's hit detection found
    pub fn attack(&mut self, slot: AttackSlot, spawn_ids: Vec<u32>) -> bool {
        self.player.attack(slot, spawn_ids, &self.actions)
    }

    pub fn request_state(&mut self, state: PlayerState) -> bool {
        self.player.request(state, &self.actions)
    }

    pub fn respawn(&self) {
        if self.player.state() == PlayerState::Dead {
            report("respawn_player", self.actions.respawn_player());
        }
    }

    /// One frame: local prediction and reporting, remote smoothing, and a
    /// proximity re-subscribe when the player has moved far enough
    pub fn frame(&mut self, dt: f32) {
        self.player.update(dt, &self.actions);
        for peer in self.peers.values_mut() {
            peer.update(dt);
        }
        for enemy in self.enemies.values_mut() {
            enemy.update(dt, &self.actions);
        }

        let (x, y) = self.player.body().position();
        if let Err(e) = self.proximity.update_position(x, y) {
            // keep the old window and try again next frame
            log::warn!("Proximity re-subscribe failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::FakeActions;
    use crate::controllers::tests::{FakeAnimator, FakeBody};
    use crate::world_cache::tests::{player_row, spawn_row};
    use platformer_common::EnemyState;

    #[derive(Default)]
    struct CountingBackend {
        subscriptions: usize,
    }

    impl SubscriptionBackend for CountingBackend {
        type Handle = usize;

        fn subscribe(&mut self, _queries: Vec<String>) -> Result<usize, GameError> {
            self.subscriptions += 1;
            Ok(self.subscriptions)
        }

        fn unsubscribe(&mut self, _handle: usize) -> Result<(), GameError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Sprites;

    impl AnimatorFactory for Sprites {
        type Animator = FakeAnimator;

        fn peer(&mut self, _identity: Identity) -> FakeAnimator {
            FakeAnimator::default()
        }

        fn enemy(&mut self, _spawn_id: u32, _enemy_type: &str) -> FakeAnimator {
            FakeAnimator::default()
        }
    }

    fn me() -> Identity {
        Identity::from_byte_array([1; 32])
    }

    fn session() -> GameSession<FakeActions, CountingBackend, FakeBody, Sprites> {
        GameSession::new(
            ClientConfig::default(),
            me(),
            FakeActions::default(),
            CountingBackend::default(),
            FakeBody::at(100.0, 100.0),
            Sprites,
        )
    }

    #[test]
    fn routes_rows_to_the_right_controllers() {
        let mut session = session();
        session.start().unwrap();
        let other = Identity::from_byte_array([2; 32]);

        session.on_player_row(player_row(me(), 100.0, 100.0));
        session.on_player_row(player_row(other, 300.0, 100.0));
        session.on_spawn_row(spawn_row(7, 150.0));
        assert!(session.peer(&other).is_some());
        assert!(session.peer(&me()).is_none());
        assert_eq!(session.enemy(7).map(|e| e.state()), Some(EnemyState::Idle));

        session.on_player_deleted(&other);
        session.on_spawn_deleted(7);
        assert!(session.peer(&other).is_none());
        assert!(session.enemy(7).is_none());
        assert_eq!(session.cache().players().count(), 1);
    }

    #[test]
    fn frame_reports_position_and_tracks_window() {
        let mut session = session();
        session.start().unwrap();
        session.frame(0.1);
        assert!(session.actions().calls().contains(&"position 100 100 Right".to_string()));

        session.player_mut().body_mut().position = (600.0, 100.0);
        session.frame(0.1);
        // static tables, first window, moved window
        assert_eq!(session.proximity.backend().subscriptions, 3);
    }

    #[test]
    fn rejected_move_returns_player_to_server_position() {
        let mut session = session();
        session.start().unwrap();
        session.on_player_row(player_row(me(), 100.0, 100.0));
        session.player_mut().body_mut().position = (450.0, 100.0);
        for _ in 0..20 {
            session.frame(0.1);
        }
        assert_eq!(session.player().body().position(), (100.0, 100.0));
        assert_eq!(session.cache().player(&me()).map(|p| (p.x, p.y)), Some((100.0, 100.0)));
    }

    #[test]
    fn respawn_only_when_dead() {
        let mut session = session();
        session.respawn();
        assert!(session.actions().calls().is_empty());

        let mut row = player_row(me(), 100.0, 100.0);
        row.hp = 0;
        row.state = PlayerState::Dead;
        session.on_player_row(row);
        session.respawn();
        assert_eq!(session.actions().calls(), vec!["respawn"]);
    }

    #[test]
    fn failed_respawn_is_not_retried_inside_the_frame() {
        let mut session = session();
        let mut row = player_row(me(), 100.0, 100.0);
        row.hp = 0;
        row.state = PlayerState::Dead;
        session.on_player_row(row);
        *session.actions().fail_with.borrow_mut() = Some(GameError::Network("timeout".into()));
        session.respawn();
        assert_eq!(session.actions().calls(), vec!["respawn"]);
    }
}
