/**
 * Static game data payloads.
 *
 * Admin reducers receive these as JSON strings. Parsing and validation happen
 * here, before any table is touched, so a malformed payload leaves existing
 * data untouched.
 */
use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::combat::AttackProfile;
use crate::error::ConfigError;
use crate::leveling::LevelRow;
use crate::spawning::SpawnArea;
use crate::state::AttackSlot;

/// Checks a parsed entry beyond what serde enforces
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;

    /// Primary key of the row this entry becomes; keyed entries must be unique in a payload
    fn key(&self) -> Option<&str> {
        None
    }
}

/// Parse a non-empty JSON array of entries and validate each one
pub fn parse_entries<T: DeserializeOwned + Validate>(json: &str) -> Result<Vec<T>, ConfigError> {
    let entries: Vec<T> = serde_json::from_str(json)?;
    if entries.is_empty() {
        return Err(ConfigError::Empty);
    }
    let mut keys = HashSet::new();
    for entry in &entries {
        entry.validate()?;
        if let Some(key) = entry.key() {
            if !keys.insert(key.to_string()) {
                return Err(ConfigError::invalid(key, "defined twice"));
            }
        }
    }
    Ok(entries)
}

impl Validate for LevelRow {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.level == 0 {
            return Err(ConfigError::invalid("level 0", "levels start at 1"));
        }
        if self.max_hp == 0 {
            return Err(ConfigError::invalid(format!("level {}", self.level), "max_hp must be positive"));
        }
        Ok(())
    }
}

/// Static definition of an enemy type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub enemy_type: String,
    pub max_hp: u32,
    pub level: u32,
    pub exp_reward: u64,
    pub damage: u32,
    pub move_speed: f32,
    pub aggro_range: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u32,
    #[serde(default)]
    pub aggressive: bool,
}

impl Validate for EnemyDefinition {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enemy_type.trim().is_empty() {
            return Err(ConfigError::invalid("enemy", "enemy_type is empty"));
        }
        if self.max_hp == 0 {
            return Err(ConfigError::invalid(&self.enemy_type, "max_hp must be positive"));
        }
        if ![self.move_speed, self.aggro_range, self.attack_range].into_iter().all(non_negative) {
            return Err(ConfigError::invalid(&self.enemy_type, "speeds and ranges must be finite and not negative"));
        }
        Ok(())
    }

    fn key(&self) -> Option<&str> {
        Some(self.enemy_type.as_str())
    }
}

/// One attack slot of a job.
///
/// The profile fields sit directly on the entry. Numbers inside a
/// `#[serde(flatten)]` struct do not deserialize once serde_json runs with
/// `arbitrary_precision`, which the module build enables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub slot: AttackSlot,
    pub name: String,
    pub damage: u32,
    pub cooldown_ms: u32,
    pub range: f32,
    pub hits: u8,
    pub targets: u8,
    pub crit_chance: f32,
    pub knockback: f32,
    pub mana_cost: u32,
    #[serde(default)]
    pub projectile_key: Option<String>,
    #[serde(default)]
    pub effect_key: Option<String>,
}

impl AttackDefinition {
    pub fn profile(&self) -> AttackProfile {
        AttackProfile {
            damage: self.damage,
            cooldown_ms: self.cooldown_ms,
            range: self.range,
            hits: self.hits,
            targets: self.targets,
            crit_chance: self.crit_chance,
            knockback: self.knockback,
            mana_cost: self.mana_cost,
        }
    }
}

/// Always-on job bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveDefinition {
    pub name: String,
    /// Fraction added to the damage multiplier, e.g. 0.1 for +10%
    #[serde(default)]
    pub damage_bonus: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub job_key: String,
    pub name: String,
    #[serde(default = "default_unlock_level")]
    pub unlock_level: u32,
    pub attacks: Vec<AttackDefinition>,
    #[serde(default)]
    pub passives: Vec<PassiveDefinition>,
}

fn default_unlock_level() -> u32 {
    1
}

impl Validate for JobDefinition {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.job_key.trim().is_empty() {
            return Err(ConfigError::invalid("job", "job_key is empty"));
        }
        for (i, attack) in self.attacks.iter().enumerate() {
            if self.attacks[..i].iter().any(|a| a.slot == attack.slot) {
                return Err(ConfigError::invalid(&self.job_key, format!("slot {} defined twice", attack.slot.index())));
            }
            if attack.hits == 0 || attack.targets == 0 {
                return Err(ConfigError::invalid(&attack.name, "hits and targets must be at least 1"));
            }
            if !(0.0..=1.0).contains(&attack.crit_chance) {
                return Err(ConfigError::invalid(&attack.name, "crit_chance must be within [0, 1]"));
            }
            if !non_negative(attack.range) || !non_negative(attack.knockback) {
                return Err(ConfigError::invalid(&attack.name, "range and knockback must be finite and not negative"));
            }
        }
        Ok(())
    }

    fn key(&self) -> Option<&str> {
        Some(self.job_key.as_str())
    }
}

/// Finite and at least zero; rejects NaN and infinities
fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

/// A teleport pad and where it leads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleportDefinition {
    pub teleport_id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dest_x: f32,
    pub dest_y: f32,
}

impl Validate for TeleportDefinition {
    fn validate(&self) -> Result<(), ConfigError> {
        let coords = [self.x, self.y, self.dest_x, self.dest_y];
        if coords.iter().any(|c| !c.is_finite()) || !(self.radius > 0.0) {
            return Err(ConfigError::invalid(self.teleport_id, "coordinates must be finite and radius positive"));
        }
        Ok(())
    }
}

/// Enemy route extracted from a tilemap
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    pub route_id: u32,
    pub enemy_type: String,
    pub area: SpawnArea,
    pub max_population: u32,
    pub spawn_interval_ms: u32,
}

/// Default spawn interval when a route object omits it
pub const DEFAULT_SPAWN_INTERVAL_MS: u32 = 10_000;

const ROUTE_LAYER: &str = "enemy_routes";
const ROUTE_CLASS: &str = "enemy_route";

#[derive(Deserialize)]
struct Tilemap {
    #[serde(default)]
    layers: Vec<TileLayer>,
}

#[derive(Deserialize)]
struct TileLayer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    objects: Vec<TileObject>,
}

#[derive(Deserialize)]
struct TileObject {
    id: u32,
    #[serde(default)]
    name: String,
    // Tiled calls this `type` in older exports and `class` in newer ones
    #[serde(default, alias = "class")]
    r#type: String,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    properties: Vec<TileProperty>,
}

#[derive(Deserialize)]
struct TileProperty {
    name: String,
    value: Value,
}

impl TileObject {
    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    fn u32_property(&self, name: &str) -> Result<Option<u32>, ConfigError> {
        match self.property(name) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(self.id, format!("{name} is not a non-negative integer"))),
        }
    }
}

/// Extract enemy routes from a Tiled JSON map.
///
/// Routes are rectangle objects on the `enemy_routes` layer or objects of
/// class `enemy_route` on any layer. Each carries `enemy_type`, `max_enemies`
/// and optionally `spawn_interval` (ms) as custom properties.
pub fn parse_tilemap_routes(json: &str) -> Result<Vec<RouteDefinition>, ConfigError> {
    let map: Tilemap = serde_json::from_str(json)?;
    let mut routes = Vec::new();
    for layer in &map.layers {
        let route_layer = layer.name.eq_ignore_ascii_case(ROUTE_LAYER);
        for object in layer.objects.iter().filter(|o| route_layer || o.r#type == ROUTE_CLASS) {
            let enemy_type = match object.property("enemy_type").and_then(Value::as_str) {
                Some(t) if !t.is_empty() => t.to_string(),
                // fall back to the object name, which designers often use for the type
                _ if !object.name.is_empty() => object.name.clone(),
                _ => return Err(ConfigError::invalid(object.id, "route has no enemy_type")),
            };
            let max_population = object
                .u32_property("max_enemies")?
                .ok_or_else(|| ConfigError::invalid(object.id, "route has no max_enemies"))?;
            if max_population == 0 {
                return Err(ConfigError::invalid(object.id, "max_enemies must be positive"));
            }
            if object.width <= 0.0 {
                return Err(ConfigError::invalid(object.id, "route area has no width"));
            }
            log::debug!("Route {} on layer {:?}: {} x{}", object.id, layer.name, enemy_type, max_population);
            routes.push(RouteDefinition {
                route_id: object.id,
                enemy_type,
                area: SpawnArea::new(object.x, object.y, object.width, object.height.max(0.0)),
                max_population,
                spawn_interval_ms: object.u32_property("spawn_interval")?.unwrap_or(DEFAULT_SPAWN_INTERVAL_MS),
            });
        }
    }
    if routes.is_empty() {
        return Err(ConfigError::Empty);
    }
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_rows() {
        let rows: Vec<LevelRow> = parse_entries(
            r#"[{"level":1,"exp_to_next":100,"max_hp":100,"max_mana":50},
                {"level":2,"exp_to_next":250,"max_hp":120,"max_mana":60}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].max_hp, 120);
    }

    #[test]
    fn empty_and_malformed_payloads_fail() {
        assert!(matches!(parse_entries::<LevelRow>("[]"), Err(ConfigError::Empty)));
        assert!(matches!(parse_entries::<LevelRow>("{not json"), Err(ConfigError::Json(_))));
        assert!(matches!(
            parse_entries::<LevelRow>(r#"[{"level":0,"exp_to_next":1,"max_hp":1,"max_mana":1}]"#),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn parses_job_with_attack_profile() {
        let jobs: Vec<JobDefinition> = parse_entries(
            r#"[{"job_key":"warrior","name":"Warrior","attacks":[
                {"slot":"Attack1","name":"Slash","damage":30,"cooldown_ms":500,"range":60,
                 "hits":1,"targets":1,"crit_chance":0.1,"knockback":12,"mana_cost":0,
                 "effect_key":"slash_fx"}],
               "passives":[{"name":"Brawn","damage_bonus":0.1}]}]"#,
        )
        .unwrap();
        let job = &jobs[0];
        assert_eq!(job.unlock_level, 1);
        assert_eq!(job.attacks[0].profile().damage, 30);
        assert_eq!(job.attacks[0].profile().crit_chance, 0.1);
        assert_eq!(job.attacks[0].effect_key.as_deref(), Some("slash_fx"));
        assert_eq!(job.passives[0].damage_bonus, 0.1);
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let attack = r#"{"slot":"Attack1","name":"A","damage":1,"cooldown_ms":1,"range":1,
                          "hits":1,"targets":1,"crit_chance":0,"knockback":0,"mana_cost":0}"#;
        let json = format!(r#"[{{"job_key":"x","name":"X","attacks":[{attack},{attack}]}}]"#);
        assert!(matches!(parse_entries::<JobDefinition>(&json), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn attack_profile_parses_with_arbitrary_precision_numbers() {
        // goes through Value, the path serde_json takes for buffered fields
        let value: Value = serde_json::from_str(
            r#"{"slot":"Attack2","name":"Bolt","damage":12,"cooldown_ms":900,"range":240.5,
                "hits":3,"targets":1,"crit_chance":0.25,"knockback":0,"mana_cost":8}"#,
        )
        .unwrap();
        let attack: AttackDefinition = serde_json::from_value(value).unwrap();
        let profile = attack.profile();
        assert_eq!(profile.hits, 3);
        assert_eq!(profile.range, 240.5);
        assert_eq!(profile.mana_cost, 8);
    }

    #[test]
    fn repeated_job_key_is_rejected() {
        let job = r#"{"job_key":"mage","name":"Mage","attacks":[]}"#;
        let json = format!("[{job},{job}]");
        assert!(matches!(parse_entries::<JobDefinition>(&json), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn enemy_with_nan_speed_is_rejected() {
        let enemy = EnemyDefinition {
            enemy_type: "slime".into(),
            max_hp: 50,
            level: 1,
            exp_reward: 10,
            damage: 5,
            move_speed: f32::NAN,
            aggro_range: 100.0,
            attack_range: 30.0,
            attack_cooldown_ms: 1000,
            aggressive: false,
        };
        assert!(enemy.validate().is_err());
        let json = serde_json::to_string(&[EnemyDefinition { move_speed: 40.0, ..enemy.clone() }, EnemyDefinition { move_speed: 40.0, ..enemy }]).unwrap();
        assert!(matches!(parse_entries::<EnemyDefinition>(&json), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn extracts_routes_from_tilemap() {
        let map = r#"{
            "layers": [
                {"name": "ground", "type": "tilelayer", "data": [1, 2, 3]},
                {"name": "enemy_routes", "type": "objectgroup", "objects": [
                    {"id": 4, "name": "", "x": 320, "y": 400, "width": 256, "height": 32,
                     "properties": [
                        {"name": "enemy_type", "type": "string", "value": "slime"},
                        {"name": "max_enemies", "type": "int", "value": 3},
                        {"name": "spawn_interval", "type": "int", "value": 15000}]}
                ]},
                {"name": "props", "type": "objectgroup", "objects": [
                    {"id": 9, "name": "bat", "class": "enemy_route", "x": 0, "y": 0, "width": 64, "height": 64,
                     "properties": [{"name": "max_enemies", "type": "string", "value": "2"}]},
                    {"id": 10, "name": "tree", "x": 5, "y": 5}
                ]}
            ]
        }"#;
        let routes = parse_tilemap_routes(map).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route_id, 4);
        assert_eq!(routes[0].enemy_type, "slime");
        assert_eq!(routes[0].spawn_interval_ms, 15_000);
        assert_eq!(routes[0].area.right(), 576.0);
        assert_eq!(routes[1].enemy_type, "bat");
        assert_eq!(routes[1].max_population, 2);
        assert_eq!(routes[1].spawn_interval_ms, DEFAULT_SPAWN_INTERVAL_MS);
    }

    #[test]
    fn tilemap_without_routes_is_empty() {
        assert!(matches!(parse_tilemap_routes(r#"{"layers": []}"#), Err(ConfigError::Empty)));
    }

    #[test]
    fn teleport_needs_positive_radius() {
        let json = r#"[{"teleport_id":1,"x":0,"y":0,"radius":0,"dest_x":10,"dest_y":10}]"#;
        assert!(parse_entries::<TeleportDefinition>(json).is_err());
    }
}
