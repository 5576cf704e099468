pub mod edit;

use std::path::PathBuf;

use ansi_term::Colour;
use anyhow::Result;
use clap::{Parser, Subcommand};
use edit::{process_edit_command, EditCommand};
use tracing::{debug, error, level_filters::LevelFilter, warn};

use crate::{
    console::TerminalConsole,
    manager::{errors::TrackerError, ManagerOptions, ProjectManager},
    storage::store_file::JsonFileStore,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, data_file_path, ensure_dir},
        logging::enable_logging,
        time::FormatMode,
    },
};

#[derive(Parser, Debug)]
#[command(name = "hourtrack", version, long_about = None)]
#[command(about = "Track time spent on projects", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, value_enum, default_value_t = FormatMode::Smart, help = "How durations are displayed")]
    format: FormatMode,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default $HOME/.hourtrack, or %APPDATA%\\hourtrack on Windows"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Create a new project")]
    Init {
        project: String,
        #[arg(long, help = "Goal in hours")]
        goal: Option<u32>,
    },
    #[command(about = "Start tracking time for a project")]
    Start { project: String },
    #[command(about = "Stop tracking time for a project")]
    Stop {
        project: Option<String>,
        #[arg(long, conflicts_with = "project", help = "Stop every running project")]
        all: bool,
    },
    #[command(about = "List projects with their total time")]
    List {
        #[arg(long, help = "Only show projects that are being tracked")]
        active: bool,
    },
    #[command(
        about = "Show the status of a project. Without a project shows what is being tracked right now"
    )]
    Info {
        project: Option<String>,
        #[arg(long, conflicts_with = "project", help = "Show every project")]
        all: bool,
        #[arg(short, long, help = "Write the report to a file instead. Defaults to .txt")]
        output: Option<PathBuf>,
    },
    #[command(about = "Change goal, name or sessions of a project")]
    Edit {
        project: String,
        #[command(flatten)]
        command: EditCommand,
    },
    #[command(about = "Remove all sessions of a project, keeping its goal")]
    Reset {
        project: Option<String>,
        #[arg(long, conflicts_with = "project", help = "Reset every project")]
        all: bool,
    },
    #[command(about = "Delete a project and all of its sessions")]
    Delete {
        project: Option<String>,
        #[arg(long, conflicts_with = "project", help = "Delete every project")]
        all: bool,
    },
    #[command(about = "Export raw sessions of a project as CSV")]
    Export {
        project: String,
        #[arg(short, long, help = "Target file. Defaults to <project>.csv")]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn project(&self) -> Option<String> {
        match self {
            Commands::Init { project, .. }
            | Commands::Start { project }
            | Commands::Edit { project, .. }
            | Commands::Export { project, .. } => Some(project.clone()),
            Commands::Stop { project, .. }
            | Commands::Info { project, .. }
            | Commands::Reset { project, .. }
            | Commands::Delete { project, .. } => project.clone(),
            Commands::List { .. } => None,
        }
    }

    fn hours_goal(&self) -> Option<u32> {
        match self {
            Commands::Init { goal, .. } => *goal,
            _ => None,
        }
    }
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Process status of a finished invocation. Help and version output arrive as clap errors but
/// still count as success.
pub fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => match e.downcast_ref::<clap::Error>() {
            Some(usage) if !usage.use_stderr() => EXIT_SUCCESS,
            _ => EXIT_FAILURE,
        },
    }
}

/// Shows a failed invocation to the user. Clap errors keep clap's own formatting.
pub fn report_failure(e: &anyhow::Error) {
    if let Some(usage) = e.downcast_ref::<clap::Error>() {
        if let Err(print_error) = usage.print() {
            error!("Failed to print usage {print_error:?}");
        }
        return;
    }
    match e.downcast_ref::<TrackerError>() {
        Some(tracker_error) if tracker_error.is_user_error() => warn!("Rejected command {e}"),
        _ => error!("Error running cli {e:?}"),
    }
    eprintln!("{}", Colour::Red.paint(format!("Error: {e}")));
}

pub fn run_cli() -> Result<()> {
    let args = Args::try_parse()?;

    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&app_dir, logging_level, args.log)?;
    debug!("Running {:?}", args.commands);

    let options = ManagerOptions {
        project: args.commands.project(),
        format: args.format,
        hours_goal: args.commands.hours_goal(),
    };
    let backend = JsonFileStore::new(data_file_path(&app_dir));
    debug!("Using data file {:?}", backend.path());
    let mut manager = ProjectManager::new(
        options,
        backend,
        TerminalConsole::stdio(),
        Box::new(DefaultClock),
    )?;

    match args.commands {
        Commands::Init { .. } => manager.create_project()?,
        Commands::Start { .. } => manager.start_project()?,
        Commands::Stop { all, .. } => manager.stop_project(all)?,
        Commands::List { active } => manager.list_projects(active)?,
        Commands::Info { all, output, .. } => manager.report_status(output, all)?,
        Commands::Edit { command, .. } => process_edit_command(&mut manager, command)?,
        Commands::Reset { all, .. } => manager.reset_project(all)?,
        Commands::Delete { all, .. } => manager.delete_project(all)?,
        Commands::Export { output, .. } => manager.export_sessions(output)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use anyhow::anyhow;
    use clap::{error::ErrorKind, CommandFactory, Parser};

    use crate::{
        manager::errors::TrackerError,
        storage::errors::StorageError,
        utils::time::FormatMode,
    };

    use super::{exit_status, Args, Commands, EXIT_FAILURE, EXIT_SUCCESS};

    fn parse_status(args: &[&str]) -> u8 {
        let result: anyhow::Result<()> = Args::try_parse_from(args).map(|_| ()).map_err(Into::into);
        exit_status(&result)
    }

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from(["hourtrack", "list", "--active", "--format", "hours"]).unwrap();

        assert_eq!(args.format, FormatMode::Hours);
        assert!(matches!(args.commands, Commands::List { active: true }));
        assert_eq!(args.commands.project(), None);
    }

    #[test]
    fn test_init_with_goal() {
        let args = Args::try_parse_from(["hourtrack", "init", "alpha", "--goal", "10"]).unwrap();

        assert_eq!(args.commands.project().as_deref(), Some("alpha"));
        assert_eq!(args.commands.hours_goal(), Some(10));
        assert_eq!(args.format, FormatMode::Smart);
    }

    #[test]
    fn test_info_to_file() {
        let args = Args::try_parse_from(["hourtrack", "info", "--all", "-o", "report"]).unwrap();

        match args.commands {
            Commands::Info {
                project,
                all,
                output,
            } => {
                assert_eq!(project, None);
                assert!(all);
                assert_eq!(output, Some(PathBuf::from("report")));
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_all_conflicts_with_project() {
        assert!(Args::try_parse_from(["hourtrack", "delete", "alpha", "--all"]).is_err());
        assert!(Args::try_parse_from(["hourtrack", "delete", "--all"]).is_ok());
    }

    #[test]
    fn test_start_requires_project() {
        assert!(Args::try_parse_from(["hourtrack", "start"]).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["hourtrack", "list", "--format", "weeks"]).is_err());
    }

    #[test]
    fn test_exit_status_of_usage() {
        assert_eq!(parse_status(&["hourtrack", "--help"]), EXIT_SUCCESS);
        assert_eq!(parse_status(&["hourtrack", "--version"]), EXIT_SUCCESS);
        assert_eq!(parse_status(&["hourtrack", "list"]), EXIT_SUCCESS);
        assert_eq!(parse_status(&["hourtrack", "start"]), EXIT_FAILURE);
        assert_eq!(parse_status(&["hourtrack", "frobnicate"]), EXIT_FAILURE);

        let empty_edit = Args::command().error(ErrorKind::MissingRequiredArgument, "nothing to edit");
        assert_eq!(exit_status(&Err(empty_edit.into())), EXIT_FAILURE);
    }

    #[test]
    fn test_exit_status_of_failed_commands() {
        assert_eq!(exit_status(&Ok(())), EXIT_SUCCESS);
        assert_eq!(
            exit_status(&Err(TrackerError::MissingProjectName.into())),
            EXIT_FAILURE
        );
        let storage = TrackerError::from(StorageError::MissingDirectory {
            path: Path::new("/missing").to_path_buf(),
        });
        assert_eq!(exit_status(&Err(storage.into())), EXIT_FAILURE);
        assert_eq!(exit_status(&Err(anyhow!("No home directory"))), EXIT_FAILURE);
    }
}
