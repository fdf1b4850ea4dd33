mod calendar_day;
mod time_window;

pub use calendar_day::*;
pub use time_window::*;
