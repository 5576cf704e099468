use std::fmt::Display;

use chrono::{Duration, NaiveDateTime};
use clap::ValueEnum;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 604_800;
/// A month is approximated as 30 days.
const SECONDS_PER_MONTH: i64 = 2_592_000;

/// How durations are rendered in reports.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum FormatMode {
    /// Largest unit plus the next significant ones, e.g. `2 hours, 5 minutes`
    #[default]
    Smart,
    /// Every non-zero unit, e.g. `1 day, 2 hours, 5 minutes, 3 seconds`
    Full,
    /// Abbreviated units, e.g. `1d 2h 5m 3s`
    Short,
    /// Whole hours only, e.g. `26`
    Hours,
}

impl Display for FormatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatMode::Smart => write!(f, "smart"),
            FormatMode::Full => write!(f, "full"),
            FormatMode::Short => write!(f, "short"),
            FormatMode::Hours => write!(f, "hours"),
        }
    }
}

/// This is the standard way of converting a session timestamp to a string in hourtrack.
pub fn format_timestamp(moment: NaiveDateTime) -> String {
    moment.format("%Y-%m-%d %H:%M:%S").to_string()
}

struct Breakdown {
    months: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

impl Breakdown {
    fn new(total: i64) -> Self {
        let total = total.max(0);
        let (months, rest) = (total / SECONDS_PER_MONTH, total % SECONDS_PER_MONTH);
        let (weeks, rest) = (rest / SECONDS_PER_WEEK, rest % SECONDS_PER_WEEK);
        let (days, rest) = (rest / SECONDS_PER_DAY, rest % SECONDS_PER_DAY);
        let (hours, rest) = (rest / SECONDS_PER_HOUR, rest % SECONDS_PER_HOUR);
        let (minutes, seconds) = (rest / SECONDS_PER_MINUTE, rest % SECONDS_PER_MINUTE);
        Self {
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    fn long_units(&self) -> [(i64, &'static str); 6] {
        [
            (self.months, "month"),
            (self.weeks, "week"),
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
            (self.seconds, "second"),
        ]
    }
}

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}

fn format_full(b: &Breakdown) -> String {
    let mut parts = b
        .long_units()
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, name)| unit(value, name))
        .collect::<Vec<_>>();
    if parts.is_empty() {
        parts.push(unit(0, "second"));
    }
    parts.join(", ")
}

fn format_short(b: &Breakdown) -> String {
    let units = [
        (b.months, "mo"),
        (b.weeks, "w"),
        (b.days, "d"),
        (b.hours, "h"),
        (b.minutes, "m"),
        (b.seconds, "s"),
    ];
    let mut parts = units
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>();
    if parts.is_empty() {
        parts.push("0s".into());
    }
    parts.join(" ")
}

/// Starts at the largest non-zero unit and keeps the few below it that still matter at that
/// scale. Nobody cares about seconds once a project spans weeks.
fn format_smart(b: &Breakdown) -> String {
    let optional = |values: &[(i64, &str)]| {
        values
            .iter()
            .filter(|(value, _)| *value > 0)
            .map(|(value, name)| unit(*value, name))
            .collect::<Vec<_>>()
    };
    let parts = if b.months > 0 {
        let mut parts = vec![unit(b.months, "month")];
        parts.extend(optional(&[(b.weeks, "week"), (b.days, "day"), (b.hours, "hour")]));
        parts
    } else if b.weeks > 0 {
        let mut parts = vec![unit(b.weeks, "week")];
        parts.extend(optional(&[(b.days, "day"), (b.hours, "hour")]));
        parts
    } else if b.days > 0 {
        let mut parts = vec![unit(b.days, "day")];
        parts.extend(optional(&[(b.hours, "hour"), (b.minutes, "minute")]));
        parts
    } else if b.hours > 0 {
        vec![unit(b.hours, "hour"), unit(b.minutes, "minute")]
    } else if b.minutes > 0 {
        vec![unit(b.minutes, "minute"), unit(b.seconds, "second")]
    } else {
        vec![unit(b.seconds, "second")]
    };
    parts.join(", ")
}

pub fn format_duration(duration: Duration, mode: FormatMode) -> String {
    let total = duration.num_seconds();
    match mode {
        FormatMode::Full => format_full(&Breakdown::new(total)),
        FormatMode::Short => format_short(&Breakdown::new(total)),
        FormatMode::Smart => format_smart(&Breakdown::new(total)),
        FormatMode::Hours => format!("{}", total.max(0) / SECONDS_PER_HOUR),
    }
}
