use platformer_common::AttackSlot;
use platformer_common::combat::AttackProfile;

/**
 * Job (class) definitions with their attack slots and passives.
 *
 * Read-only at runtime; `populate_jobs` clears and rewrites all three tables
 * after the payload has parsed.
 */
#[derive(Clone, Debug)]
#[spacetimedb::table(name = job, public)]
pub struct Job {
    #[primary_key]
    pub job_key: String,
    pub name: String,
    pub unlock_level: u32,
}

#[derive(Clone, Debug)]
#[spacetimedb::table(name = attack, public)]
pub struct Attack {
    #[primary_key]
    #[auto_inc]
    pub attack_id: u32,
    #[index(btree)]
    pub job_key: String,
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
    // render-only keys for the client's projectile and hit effects
    pub projectile_key: Option<String>,
    pub effect_key: Option<String>,
}

impl Attack {
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

#[derive(Clone, Debug)]
#[spacetimedb::table(name = passive, public)]
pub struct Passive {
    #[primary_key]
    #[auto_inc]
    pub passive_id: u32,
    #[index(btree)]
    pub job_key: String,
    pub name: String,
    pub damage_bonus: f32,
}
