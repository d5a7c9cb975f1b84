#[derive(Clone, Debug)]
#[spacetimedb::table(name = teleport, public)]
pub struct Teleport {
    #[primary_key]
    pub teleport_id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dest_x: f32,
    pub dest_y: f32,
}
