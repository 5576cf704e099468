use chrono::{Local, NaiveDateTime, Timelike};

/// Represents an entity responsible for providing dates across application. This allows the
/// manager to be driven by a fake clock during testing.
pub trait Clock {
    /// Current local time, truncated to whole seconds.
    fn time(&self) -> NaiveDateTime;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
pub use manual::ManualClock;
