pub mod calendar;
pub mod check_in;
pub mod dashboard;
pub mod plants;
pub mod settings;

pub use calendar::CalendarScreen;
pub use check_in::{CheckInField, CheckInScreen};
pub use dashboard::DashboardScreen;
pub use plants::PlantsScreen;
pub use settings::{SettingsField, SettingsScreen};
