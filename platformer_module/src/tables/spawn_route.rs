use spacetimedb::Timestamp;
use platformer_common::spawning::SpawnArea;

/// Enemy route: where a type spawns, how many, and how often it is topped up
#[derive(Clone, Debug)]
#[spacetimedb::table(name = spawn_route, public)]
pub struct SpawnRoute {
    #[primary_key]
    pub route_id: u32,
    pub enemy_type: String,
    pub area_x: f32,
    pub area_y: f32,
    pub area_width: f32,
    pub area_height: f32,
    pub max_population: u32,
    pub spawn_interval_ms: u32,
    pub last_spawn_time: Timestamp,
}

impl SpawnRoute {
    pub fn area(&self) -> SpawnArea {
        SpawnArea::new(self.area_x, self.area_y, self.area_width, self.area_height)
    }
}
