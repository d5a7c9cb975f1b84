use platformer_common::patrol::PatrolParams;

/// Static per-type enemy stats, written only by `populate_enemy`
#[derive(Clone, Debug)]
#[spacetimedb::table(name = enemy_definition, public)]
pub struct EnemyDefinition {
    #[primary_key]
    pub enemy_type: String,
    pub max_hp: u32,
    pub level: u32,
    pub exp_reward: u64,
    pub damage: u32,
    pub move_speed: f32,
    pub aggro_range: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u32,
    pub aggressive: bool,
}

impl EnemyDefinition {
    pub fn patrol_params(&self) -> PatrolParams {
        PatrolParams {
            move_speed: self.move_speed,
            aggro_range: self.aggro_range,
            attack_range: self.attack_range,
            attack_cooldown_ms: self.attack_cooldown_ms,
            aggressive: self.aggressive,
        }
    }
}

impl From<platformer_common::config::EnemyDefinition> for EnemyDefinition {
    fn from(def: platformer_common::config::EnemyDefinition) -> Self {
        Self {
            enemy_type: def.enemy_type,
            max_hp: def.max_hp,
            level: def.level,
            exp_reward: def.exp_reward,
            damage: def.damage,
            move_speed: def.move_speed,
            aggro_range: def.aggro_range,
            attack_range: def.attack_range,
            attack_cooldown_ms: def.attack_cooldown_ms,
            aggressive: def.aggressive,
        }
    }
}
