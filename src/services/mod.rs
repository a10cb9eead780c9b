pub mod checkins;
pub mod daily_guard;

pub use checkins::CheckinService;
pub use daily_guard::{DailyUniquenessGuard, DayWindow};
