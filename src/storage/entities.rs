use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// The root of the persisted document. Projects are keyed by their case-sensitive name and kept
/// in creation order, which is also the order they are written to disk.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct Store {
    #[serde(default)]
    pub projects: IndexMap<String, ProjectEntity>,
}

impl Store {
    /// Fills in what older documents left out. Closed sessions written before durations were
    /// stored get theirs recomputed from the timestamps. Returns how many sessions were touched.
    pub fn normalize(&mut self) -> usize {
        let mut repaired = 0;
        for session in self.projects.values_mut().flat_map(|p| p.sessions.iter_mut()) {
            if let (Some(end), None) = (session.end, session.duration) {
                session.duration = Some(non_negative(end - session.start));
                repaired += 1;
            }
        }
        repaired
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntity {
    /// Target in hours, `0` means there is no goal.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub hours_goal: u32,
    #[serde(default)]
    pub sessions: Vec<SessionEntity>,
}

impl ProjectEntity {
    pub fn with_goal(hours_goal: u32) -> Self {
        Self {
            hours_goal,
            sessions: vec![],
        }
    }

    pub fn has_goal(&self) -> bool {
        self.hours_goal > 0
    }

    /// Only the last session may be open.
    pub fn open_session(&self) -> Option<&SessionEntity> {
        self.sessions.last().filter(|s| s.is_open())
    }

    pub fn open_session_mut(&mut self) -> Option<&mut SessionEntity> {
        self.sessions.last_mut().filter(|s| s.is_open())
    }

    pub fn is_active(&self) -> bool {
        self.open_session().is_some()
    }

    /// Total tracked time. The open session, if any, counts with its live elapsed time. Saturates
    /// at [Duration::MAX].
    pub fn total_time(&self, now: NaiveDateTime) -> Duration {
        self.sessions.iter().fold(Duration::zero(), |acc, s| {
            acc.checked_add(&s.elapsed(now)).unwrap_or(Duration::MAX)
        })
    }
}

/// One contiguous interval of tracked time.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntity {
    pub start: NaiveDateTime,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default, rename = "durationSeconds", with = "optional_duration_ser")]
    pub duration: Option<Duration>,
}

impl SessionEntity {
    pub fn open(start: NaiveDateTime) -> Self {
        Self {
            start,
            end: None,
            duration: None,
        }
    }

    pub fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: Some(end),
            duration: Some(non_negative(end - start)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Closes the session at `end`. A clock that went backwards yields a zero duration.
    pub fn close(&mut self, end: NaiveDateTime) -> Duration {
        let duration = non_negative(end - self.start);
        self.end = Some(end);
        self.duration = Some(duration);
        duration
    }

    /// Stored duration for closed sessions, time since start for the open one.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        match (self.end, self.duration) {
            (Some(_), Some(duration)) => duration,
            (Some(end), None) => non_negative(end - self.start),
            (None, _) => non_negative(now - self.start),
        }
    }
}

fn non_negative(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

mod optional_duration_ser {
    use chrono::Duration;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<i64>::deserialize(deserializer)?
            .map(|seconds| {
                Duration::try_seconds(seconds).ok_or_else(|| {
                    D::Error::custom(format!("durationSeconds {seconds} is out of range"))
                })
            })
            .transpose()
    }
}
