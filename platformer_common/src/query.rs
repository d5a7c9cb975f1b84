//! SQL builders for proximity subscriptions over the public tables

/// Axis-aligned query window in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Square window of half-size `radius` centred on a point
    pub fn around(x: f32, y: f32, radius: f32) -> Self {
        Self { min_x: x - radius, min_y: y - radius, max_x: x + radius, max_y: y + radius }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Players inside a bounding box
pub fn players_in_area(area: &BoundingBox) -> String {
    format!(
        "SELECT * FROM player WHERE x >= {} AND x <= {} AND y >= {} AND y <= {}",
        area.min_x, area.max_x, area.min_y, area.max_y
    )
}

/// Enemy spawns inside a bounding box
pub fn spawns_in_area(area: &BoundingBox) -> String {
    format!(
        "SELECT * FROM spawn WHERE x >= {} AND x <= {} AND y >= {} AND y <= {}",
        area.min_x, area.max_x, area.min_y, area.max_y
    )
}

/// Damage feedback rows land at the victim's position, so they share the window
pub fn enemy_damage_in_area(area: &BoundingBox) -> String {
    format!(
        "SELECT * FROM enemy_damage_event WHERE x >= {} AND x <= {} AND y >= {} AND y <= {}",
        area.min_x, area.max_x, area.min_y, area.max_y
    )
}

/// Every query a client keeps alive around `(x, y)`
pub fn proximity_queries(x: f32, y: f32, radius: f32) -> Vec<String> {
    let area = BoundingBox::around(x, y, radius);
    vec![players_in_area(&area), spawns_in_area(&area), enemy_damage_in_area(&area)]
}

/// Queries that are not spatially bounded: static definitions and the caller's own rows
pub fn static_queries() -> Vec<String> {
    [
        "SELECT * FROM spawn_route",
        "SELECT * FROM enemy_definition",
        "SELECT * FROM player_level",
        "SELECT * FROM job",
        "SELECT * FROM attack",
        "SELECT * FROM passive",
        "SELECT * FROM teleport",
        "SELECT * FROM player_cooldown",
        "SELECT * FROM player_damage_event",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
