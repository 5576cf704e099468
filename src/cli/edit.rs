use anyhow::Result;
use clap::CommandFactory;

use crate::{
    console::Console,
    manager::ProjectManager,
    storage::store_file::StoreBackend,
};

use super::Args;

#[derive(Debug, clap::Args)]
pub struct EditCommand {
    #[arg(long, help = "New goal in hours. 0 removes the goal")]
    goal: Option<u32>,
    #[arg(
        long,
        num_args = 0..=1,
        value_name = "NAME",
        help = "Rename the project. Asks for the new name when none is given"
    )]
    rename: Option<Option<String>>,
    #[arg(
        long = "add-session",
        value_name = "HOURS",
        help = "Add a finished session that started the given number of hours ago"
    )]
    add_session: Option<u32>,
    #[arg(
        long = "delete-session",
        value_name = "ID",
        allow_negative_numbers = true,
        help = "Delete a session by its number as shown by `info`. -1 deletes the last one"
    )]
    delete_session: Option<i64>,
}

impl EditCommand {
    fn is_empty(&self) -> bool {
        self.goal.is_none()
            && self.rename.is_none()
            && self.add_session.is_none()
            && self.delete_session.is_none()
    }
}

/// Command to process `edit`. Several edits can be combined, the rename always goes last so the
/// other edits still find the project under its old name.
pub fn process_edit_command<B: StoreBackend, C: Console>(
    manager: &mut ProjectManager<B, C>,
    command: EditCommand,
) -> Result<()> {
    if command.is_empty() {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "edit needs at least one of --goal, --rename, --add-session or --delete-session",
            )
            .into());
    }

    if let Some(hours) = command.add_session {
        manager.add_backdated_session(hours)?;
    }
    if let Some(id) = command.delete_session {
        manager.remove_session(id)?;
    }
    if let Some(goal) = command.goal {
        manager.set_goal(goal)?;
    }
    if let Some(new_name) = command.rename {
        manager.rename_project(new_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{
        cli::{Args, Commands},
        manager::LAST_SESSION,
    };

    use super::EditCommand;

    fn parse_edit(args: &[&str]) -> EditCommand {
        let args = Args::try_parse_from(["hourtrack", "edit", "alpha"].iter().chain(args)).unwrap();
        match args.commands {
            Commands::Edit { command, .. } => command,
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_delete_last_session_sentinel() {
        let command = parse_edit(&["--delete-session", "-1"]);
        assert_eq!(command.delete_session, Some(LAST_SESSION));
    }

    #[test]
    fn test_rename_with_and_without_value() {
        assert_eq!(parse_edit(&["--rename", "beta"]).rename, Some(Some("beta".into())));
        assert_eq!(parse_edit(&["--rename"]).rename, Some(None));
        assert_eq!(parse_edit(&["--goal", "3"]).rename, None);
    }

    #[test]
    fn test_combined_edits() {
        let command = parse_edit(&["--goal", "0", "--add-session", "2"]);
        assert_eq!(command.goal, Some(0));
        assert_eq!(command.add_session, Some(2));
        assert!(!command.is_empty());
        assert!(parse_edit(&[]).is_empty());
    }
}
