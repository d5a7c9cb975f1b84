use spacetimedb::{table, ScheduleAt};
use crate::reducers::ticks::{cleanup_tick, patrol_tick, spawn_tick};

#[table(name = cleanup_schedule, scheduled(cleanup_tick))]
#[derive(Clone)]
pub struct CleanupSchedule {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
}

#[table(name = spawn_schedule, scheduled(spawn_tick))]
#[derive(Clone)]
pub struct SpawnSchedule {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
}

#[table(name = patrol_schedule, scheduled(patrol_tick))]
#[derive(Clone)]
pub struct PatrolSchedule {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
}
