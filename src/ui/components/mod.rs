pub mod calendar;
pub mod input;

pub use calendar::{CalendarWidget, CareLegend};
pub use input::InputWidget;
