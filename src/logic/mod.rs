pub mod reminders;
pub mod schedule;

pub use reminders::ReminderService;
pub use schedule::CareScheduler;
