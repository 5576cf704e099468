use std::{fmt::Display, ops::Deref};

use chrono::Duration;

pub const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `goal_hours` covered by `tracked`, clamped to 100 and rounded to one decimal.
    /// A zero goal has no meaningful progress.
    pub fn of_goal(tracked: Duration, goal_hours: u32) -> Option<Percentage> {
        if goal_hours == 0 {
            return None;
        }
        let goal_seconds = goal_hours as f64 * SECONDS_PER_HOUR as f64;
        let raw = tracked.num_seconds().max(0) as f64 / goal_seconds * 100.;
        let rounded = (raw.min(100.) * 10.).round() / 10.;
        Percentage::new_opt(rounded)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Progress line towards an hours goal, e.g. `10.0% (1/10 hours)`.
pub fn goal_progress(tracked: Duration, goal_hours: u32) -> Option<String> {
    let percentage = Percentage::of_goal(tracked, goal_hours)?;
    let floored_hours = tracked.num_seconds().max(0) / SECONDS_PER_HOUR;
    Some(format!("{percentage} ({floored_hours}/{goal_hours} hours)"))
}
