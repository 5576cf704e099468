//! The project store manager. It owns the in-memory [Store] for the length of one invocation,
//! loads it once on construction and writes the whole document back after every change.

pub mod errors;
pub mod report;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Duration;
use tracing::{debug, info, instrument, warn};

use crate::{
    console::Console,
    storage::{
        entities::{ProjectEntity, SessionEntity, Store},
        store_file::StoreBackend,
    },
    utils::{
        clock::Clock,
        time::{format_duration, FormatMode},
    },
};

use errors::TrackerError;

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// Sentinel session id meaning "the last session".
pub const LAST_SESSION: i64 = -1;

/// What a single invocation is about.
#[derive(Debug, Clone, Default)]
pub struct ManagerOptions {
    /// Target project. Absent means "all" or "whatever is active", depending on the operation.
    pub project: Option<String>,
    pub format: FormatMode,
    /// Only used when creating a project.
    pub hours_goal: Option<u32>,
}

pub struct ProjectManager<B: StoreBackend, C: Console> {
    options: ManagerOptions,
    backend: B,
    console: C,
    clock: Box<dyn Clock>,
    store: Store,
}

impl<B: StoreBackend, C: Console> ProjectManager<B, C> {
    /// Loads the store. A document that can't be parsed is fatal.
    pub fn new(
        options: ManagerOptions,
        backend: B,
        console: C,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let store = backend.load()?;
        Ok(Self {
            options,
            backend,
            console,
            clock,
            store,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    fn persist(&self) -> Result<()> {
        self.backend.save(&self.store)?;
        Ok(())
    }

    fn project_name(&self) -> Result<String> {
        self.options
            .project
            .clone()
            .ok_or(TrackerError::MissingProjectName)
    }

    /// Name of the target project, which must exist.
    fn existing_project(&self) -> Result<String> {
        let name = self.project_name()?;
        if self.store.projects.contains_key(&name) {
            Ok(name)
        } else {
            Err(TrackerError::NoSuchProject { name })
        }
    }

    fn project_mut(&mut self, name: &str) -> Result<&mut ProjectEntity> {
        self.store
            .projects
            .get_mut(name)
            .ok_or_else(|| TrackerError::NoSuchProject {
                name: name.to_string(),
            })
    }

    #[instrument(skip(self))]
    pub fn create_project(&mut self) -> Result<()> {
        let name = self.project_name()?;
        if self.store.projects.contains_key(&name) {
            return Err(TrackerError::AlreadyExists { name });
        }

        let goal = self.options.hours_goal.unwrap_or(0);
        self.store
            .projects
            .insert(name.clone(), ProjectEntity::with_goal(goal));
        self.persist()?;

        info!("Created project {name} with goal {goal}");
        if goal > 0 {
            self.console
                .emit(&format!("Created project {name} with a goal of {goal} hours"));
        } else {
            self.console.emit(&format!("Created project {name}"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn start_project(&mut self) -> Result<()> {
        let name = self.project_name()?;
        if !self.store.projects.contains_key(&name) {
            if !self
                .console
                .confirm(&format!("Project {name} does not exist. Create it?"))
            {
                debug!("Declined creating {name}");
                return Ok(());
            }
            self.store
                .projects
                .insert(name.clone(), ProjectEntity::with_goal(0));
            info!("Created project {name} on start");
        }

        let now = self.clock.time();
        let project = self.project_mut(&name)?;
        if project.is_active() {
            self.console
                .notice(&format!("Project {name} is already being tracked"));
            return Ok(());
        }
        project.sessions.push(SessionEntity::open(now));
        self.persist()?;

        info!("Started tracking {name}");
        self.console
            .emit(&format!("Started tracking project {name}"));
        Ok(())
    }

    /// Closes the open session of `name`, if there is one.
    fn stop_single(&mut self, name: &str) -> Result<Option<Duration>> {
        let now = self.clock.time();
        let project = self.project_mut(name)?;
        Ok(project.open_session_mut().map(|session| session.close(now)))
    }

    #[instrument(skip(self))]
    pub fn stop_project(&mut self, apply_to_all: bool) -> Result<()> {
        if apply_to_all {
            if !self.console.confirm("Stop tracking all projects?") {
                return Ok(());
            }
            let names = self.store.projects.keys().cloned().collect::<Vec<_>>();
            let mut stopped = vec![];
            for name in names {
                if let Some(duration) = self.stop_single(&name)? {
                    stopped.push((name, duration));
                }
            }
            if stopped.is_empty() {
                return Ok(());
            }
            self.persist()?;
            for (name, duration) in stopped {
                info!("Stopped tracking {name} after {}s", duration.num_seconds());
                self.console.emit(&format!(
                    "Stopped tracking project {name} ({})",
                    format_duration(duration, self.options.format)
                ));
            }
            return Ok(());
        }

        let name = self.project_name()?;
        match self.stop_single(&name)? {
            Some(duration) => {
                self.persist()?;
                info!("Stopped tracking {name} after {}s", duration.num_seconds());
                self.console.emit(&format!(
                    "Stopped tracking project {name} ({})",
                    format_duration(duration, self.options.format)
                ));
            }
            None => self
                .console
                .notice(&format!("Project {name} is not currently being tracked")),
        }
        Ok(())
    }

    /// Appends an already closed session that ended now and lasted `hours_ago` hours. Overlap
    /// with other sessions is not checked.
    #[instrument(skip(self))]
    pub fn add_backdated_session(&mut self, hours_ago: u32) -> Result<()> {
        let name = self.existing_project()?;
        let end = self.clock.time();
        let start = Duration::try_hours(i64::from(hours_ago))
            .and_then(|length| end.checked_sub_signed(length))
            .ok_or(TrackerError::InvalidHours { hours: hours_ago })?;

        self.project_mut(&name)?
            .sessions
            .push(SessionEntity::closed(start, end));
        self.persist()?;

        info!("Added a {hours_ago}h session to {name}");
        self.console.emit(&format!(
            "Added a session of {} to project {name}",
            format_duration(end - start, self.options.format)
        ));
        Ok(())
    }

    /// `session_id` counts from 1, [LAST_SESSION] means the last one.
    #[instrument(skip(self))]
    pub fn remove_session(&mut self, session_id: i64) -> Result<()> {
        let name = self.existing_project()?;
        let length = self.store.projects[&name].sessions.len();
        let index = resolve_session_index(session_id, length)
            .ok_or(TrackerError::NoSuchSession { id: session_id })?;

        if !self.console.confirm(&format!(
            "Delete session {} of project {name}?",
            index + 1
        )) {
            return Ok(());
        }
        let removed = self.project_mut(&name)?.sessions.remove(index);
        self.persist()?;

        debug!("Removed session {removed:?} from {name}");
        self.console
            .emit(&format!("Deleted session {} of project {name}", index + 1));
        Ok(())
    }

    /// `0` clears the goal.
    #[instrument(skip(self))]
    pub fn set_goal(&mut self, hours: u32) -> Result<()> {
        let name = self.existing_project()?;
        let question = if hours == 0 {
            format!("Remove the goal of project {name}?")
        } else {
            format!("Set the goal of project {name} to {hours} hours?")
        };
        if !self.console.confirm(&question) {
            return Ok(());
        }

        self.project_mut(&name)?.hours_goal = hours;
        self.persist()?;

        info!("Goal of {name} set to {hours}");
        self.console
            .emit(&format!("Goal of project {name} is now {hours} hours"));
        Ok(())
    }

    /// Moves the project to a new key. Asks for the name when none is given.
    #[instrument(skip(self))]
    pub fn rename_project(&mut self, new_name: Option<String>) -> Result<()> {
        let name = self.existing_project()?;
        let new_name = match new_name {
            Some(new_name) => new_name,
            None => self
                .console
                .read_line(&format!("New name for project {name}"))?,
        };
        let new_name = new_name.trim().to_string();
        if new_name.is_empty() {
            return Err(TrackerError::MissingProjectName);
        }
        if self.store.projects.contains_key(&new_name) {
            return Err(TrackerError::AlreadyExists { name: new_name });
        }

        let (index, _, project) = self
            .store
            .projects
            .shift_remove_full(&name)
            .ok_or_else(|| TrackerError::NoSuchProject { name: name.clone() })?;
        self.store
            .projects
            .shift_insert(index, new_name.clone(), project);
        self.persist()?;

        info!("Renamed {name} to {new_name}");
        self.console
            .emit(&format!("Renamed project {name} to {new_name}"));
        self.options.project = Some(new_name);
        Ok(())
    }

    /// Batch operations confirm once up front. Single ones confirm with `question`.
    /// Returns the names to act on, empty when declined.
    fn confirmed_targets(
        &mut self,
        apply_to_all: bool,
        verb: &str,
        consequence: &str,
    ) -> Result<Vec<String>> {
        if apply_to_all {
            let names = self.store.projects.keys().cloned().collect::<Vec<_>>();
            if names.is_empty() {
                self.console.notice("There are no projects");
                return Ok(names);
            }
            let question = format!("{verb} all {} projects? {consequence}", names.len());
            return Ok(if self.console.confirm(&question) {
                names
            } else {
                vec![]
            });
        }

        let name = self.existing_project()?;
        let question = format!("{verb} project {name}? {consequence}");
        Ok(if self.console.confirm(&question) {
            vec![name]
        } else {
            vec![]
        })
    }

    /// Drops every session. The goal stays.
    #[instrument(skip(self))]
    pub fn reset_project(&mut self, apply_to_all: bool) -> Result<()> {
        let targets = self.confirmed_targets(apply_to_all, "Reset", "All sessions will be lost.")?;
        if targets.is_empty() {
            return Ok(());
        }
        for name in &targets {
            self.project_mut(name)?.sessions.clear();
        }
        self.persist()?;

        for name in targets {
            info!("Reset {name}");
            self.console.emit(&format!("Reset project {name}"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_project(&mut self, apply_to_all: bool) -> Result<()> {
        let targets =
            self.confirmed_targets(apply_to_all, "Delete", "This can't be undone.")?;
        if targets.is_empty() {
            return Ok(());
        }
        for name in &targets {
            self.store.projects.shift_remove(name);
        }
        self.persist()?;

        for name in targets {
            warn!("Deleted {name}");
            self.console.emit(&format!("Deleted project {name}"));
        }
        Ok(())
    }

    /// Prints or writes the status report. Without a project and without `apply_to_all` only the
    /// running sessions are summarized.
    #[instrument(skip(self))]
    pub fn report_status(&mut self, output: Option<PathBuf>, apply_to_all: bool) -> Result<()> {
        let now = self.clock.time();
        let format = self.options.format;
        let text = if apply_to_all {
            report::all_project_blocks(&self.store, now, format)
        } else if let Some(name) = self.options.project.clone() {
            let project = self
                .store
                .projects
                .get(&name)
                .ok_or(TrackerError::NoSuchProject { name: name.clone() })?;
            report::project_block(&name, project, now, format)
        } else {
            report::active_summary(&self.store, now, format)
        };

        match output {
            Some(path) => self.write_output(&path, "txt", &text),
            None => {
                self.console.emit(text.trim_end());
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    pub fn list_projects(&mut self, active_only: bool) -> Result<()> {
        let text = report::project_list(
            &self.store,
            self.clock.time(),
            self.options.format,
            active_only,
        );
        self.console.emit(text.trim_end());
        Ok(())
    }

    /// Writes the raw sessions of the target project as CSV, by default to `<project>.csv`.
    #[instrument(skip(self))]
    pub fn export_sessions(&mut self, output: Option<PathBuf>) -> Result<()> {
        let name = self.existing_project()?;
        let csv = report::sessions_csv(&self.store.projects[&name], self.clock.time());
        let path = output.unwrap_or_else(|| PathBuf::from(format!("{name}.csv")));
        self.write_output(&path, "csv", &csv)
    }

    /// Writes `content` to `path`, adding `default_extension` when the path has none. Existing
    /// files are only replaced after confirmation.
    fn write_output(&mut self, path: &Path, default_extension: &str, content: &str) -> Result<()> {
        let path = with_default_extension(path, default_extension);
        if path.exists()
            && !self
                .console
                .confirm(&format!("{} already exists. Overwrite it?", path.display()))
        {
            return Ok(());
        }
        fs::write(&path, content)?;

        info!("Wrote report to {path:?}");
        self.console
            .emit(&format!("Written to {}", path.display()));
        Ok(())
    }
}

fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}

/// Converts a user facing session id into an index into a list of `length` sessions.
pub fn resolve_session_index(session_id: i64, length: usize) -> Option<usize> {
    if session_id == LAST_SESSION {
        return length.checked_sub(1);
    }
    let index = usize::try_from(session_id).ok()?.checked_sub(1)?;
    (index < length).then_some(index)
}
