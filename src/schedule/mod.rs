mod live_schedule;

pub use live_schedule::LiveSchedule;
