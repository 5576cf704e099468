//! Text rendering of projects. Everything here is a pure function of the store and the moment the
//! report is made, so open sessions show their live elapsed time.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::{
    storage::entities::{ProjectEntity, Store},
    utils::{
        percentage::goal_progress,
        time::{format_duration, format_timestamp, FormatMode},
    },
};

/// Separates project blocks in multi-project reports.
pub const RULE: &str = "----------------------------------------";

pub const CSV_HEADER: &str = "start,end,duration_seconds";

/// Full report of a single project: totals, goal progress and every session.
pub fn project_block(
    name: &str,
    project: &ProjectEntity,
    now: NaiveDateTime,
    mode: FormatMode,
) -> String {
    let total = project.total_time(now);
    let mut out = String::new();
    // Writing into a String can't fail.
    let _ = writeln!(out, "Project: {name}");
    let _ = writeln!(out, "Total time: {}", format_duration(total, mode));
    if let Some(progress) = goal_progress(total, project.hours_goal) {
        let _ = writeln!(out, "Progress: {progress}");
    }

    if project.sessions.is_empty() {
        let _ = writeln!(out, "Status: (Not Started)");
        return out;
    }

    let _ = writeln!(out, "Sessions: {}", project.sessions.len());
    for (index, session) in project.sessions.iter().enumerate() {
        let end = session
            .end
            .map(format_timestamp)
            .unwrap_or_else(|| "Active".into());
        let _ = writeln!(
            out,
            "  {}. {} -> {} | {}",
            index + 1,
            format_timestamp(session.start),
            end,
            format_duration(session.elapsed(now), mode)
        );
    }
    out
}

/// Every project's block, each wrapped in [RULE] lines.
pub fn all_project_blocks(store: &Store, now: NaiveDateTime, mode: FormatMode) -> String {
    if store.projects.is_empty() {
        return "No projects found\n".into();
    }
    store
        .projects
        .iter()
        .map(|(name, project)| {
            format!("{RULE}\n{}{RULE}\n", project_block(name, project, now, mode))
        })
        .collect()
}

/// Short overview of what is running right now. Only the current session's time is shown, not
/// the project total.
pub fn active_summary(store: &Store, now: NaiveDateTime, mode: FormatMode) -> String {
    let lines = store
        .projects
        .iter()
        .filter_map(|(name, project)| {
            project.open_session().map(|session| {
                format!(
                    "  {name}: {} (current session)\n",
                    format_duration(session.elapsed(now), mode)
                )
            })
        })
        .collect::<Vec<_>>();

    if lines.is_empty() {
        "No active projects\n".into()
    } else {
        format!("Active projects:\n{}", lines.concat())
    }
}

fn list_line(name: &str, project: &ProjectEntity, now: NaiveDateTime, mode: FormatMode) -> String {
    let total = project.total_time(now);
    let mut line = format!("  {name}: {}", format_duration(total, mode));
    if let Some(progress) = goal_progress(total, project.hours_goal) {
        let _ = write!(line, " [{progress}]");
    }
    if project.is_active() {
        line.push_str(" (active)");
    }
    line.push('\n');
    line
}

/// Project listing with live totals. Active projects come first.
pub fn project_list(
    store: &Store,
    now: NaiveDateTime,
    mode: FormatMode,
    active_only: bool,
) -> String {
    let (active, inactive): (Vec<_>, Vec<_>) =
        store.projects.iter().partition(|(_, project)| project.is_active());

    if active_only {
        if active.is_empty() {
            return "No active projects\n".into();
        }
        let mut out = String::from("Active projects:\n");
        for (name, project) in active {
            out.push_str(&list_line(name, project, now, mode));
        }
        return out;
    }

    let mut out = format!(
        "Projects: {} total, {} active, {} inactive\n",
        store.projects.len(),
        active.len(),
        inactive.len()
    );
    for (name, project) in active.into_iter().chain(inactive) {
        out.push_str(&list_line(name, project, now, mode));
    }
    out
}

/// Raw sessions as CSV. The open session has an empty end and its live duration.
pub fn sessions_csv(project: &ProjectEntity, now: NaiveDateTime) -> String {
    let mut out = format!("{CSV_HEADER}\n");
    for session in &project.sessions {
        let end = session
            .end
            .map(|end| end.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{},{},{}",
            session.start.format("%Y-%m-%dT%H:%M:%S"),
            end,
            session.elapsed(now).num_seconds()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use crate::{
        storage::entities::{ProjectEntity, SessionEntity, Store},
        utils::time::FormatMode,
    };

    use super::{active_summary, all_project_blocks, project_block, project_list, sessions_csv, RULE};

    const TEST_DATE_TIME: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    fn tracked_project() -> ProjectEntity {
        ProjectEntity {
            hours_goal: 10,
            sessions: vec![
                SessionEntity::closed(TEST_DATE_TIME, TEST_DATE_TIME + Duration::hours(1)),
                SessionEntity::open(TEST_DATE_TIME + Duration::hours(2)),
            ],
        }
    }

    fn test_store() -> Store {
        let mut store = Store::default();
        store.projects.insert("alpha".into(), tracked_project());
        store.projects.insert("beta".into(), ProjectEntity::with_goal(0));
        store.projects.insert(
            "gamma".into(),
            ProjectEntity {
                hours_goal: 0,
                sessions: vec![SessionEntity::closed(
                    TEST_DATE_TIME,
                    TEST_DATE_TIME + Duration::minutes(30),
                )],
            },
        );
        store
    }

    #[test]
    fn test_project_block_lists_sessions() {
        let now = TEST_DATE_TIME + Duration::hours(3);
        let block = project_block("alpha", &tracked_project(), now, FormatMode::Short);

        assert_eq!(
            block,
            "Project: alpha\n\
             Total time: 2h\n\
             Progress: 20.0% (2/10 hours)\n\
             Sessions: 2\n\
             \x20 1. 2024-04-05 12:00:00 -> 2024-04-05 13:00:00 | 1h\n\
             \x20 2. 2024-04-05 14:00:00 -> Active | 1h\n"
        );
    }

    #[test]
    fn test_project_block_not_started() {
        let block = project_block(
            "beta",
            &ProjectEntity::with_goal(5),
            TEST_DATE_TIME,
            FormatMode::Smart,
        );

        assert_eq!(
            block,
            "Project: beta\n\
             Total time: 0 seconds\n\
             Progress: 0.0% (0/5 hours)\n\
             Status: (Not Started)\n"
        );
        assert!(!block.contains("Sessions"));
    }

    #[test]
    fn test_all_blocks_are_wrapped_in_rules() {
        let report = all_project_blocks(&test_store(), TEST_DATE_TIME, FormatMode::Smart);

        assert_eq!(report.matches(RULE).count(), 6);
        assert!(report.starts_with(RULE));
        assert!(report.contains("Project: alpha"));
        assert!(report.contains("Project: gamma"));
        assert_eq!(RULE.len(), 40);
    }

    #[test]
    fn test_active_summary_shows_current_session_only() {
        let now = TEST_DATE_TIME + Duration::hours(2) + Duration::minutes(5);
        let summary = active_summary(&test_store(), now, FormatMode::Short);

        assert_eq!(summary, "Active projects:\n  alpha: 5m (current session)\n");

        let mut idle = test_store();
        idle.projects.shift_remove("alpha");
        assert_eq!(
            active_summary(&idle, now, FormatMode::Short),
            "No active projects\n"
        );
    }

    #[test]
    fn test_project_list_orders_active_first() {
        let now = TEST_DATE_TIME + Duration::hours(3);
        let list = project_list(&test_store(), now, FormatMode::Short, false);

        assert_eq!(
            list,
            "Projects: 3 total, 1 active, 2 inactive\n\
             \x20 alpha: 2h [20.0% (2/10 hours)] (active)\n\
             \x20 beta: 0s\n\
             \x20 gamma: 30m\n"
        );
    }

    #[test]
    fn test_project_list_active_only() {
        let now = TEST_DATE_TIME + Duration::hours(3);
        let list = project_list(&test_store(), now, FormatMode::Hours, true);

        assert_eq!(list, "Active projects:\n  alpha: 2 [20.0% (2/10 hours)] (active)\n");
    }

    #[test]
    fn test_sessions_csv() {
        let now = TEST_DATE_TIME + Duration::hours(2) + Duration::seconds(42);
        let csv = sessions_csv(&tracked_project(), now);

        assert_eq!(
            csv,
            "start,end,duration_seconds\n\
             2024-04-05T12:00:00,2024-04-05T13:00:00,3600\n\
             2024-04-05T14:00:00,,42\n"
        );
    }
}
