use std::process::ExitCode;

use hourtrack::cli::{exit_status, report_failure, run_cli};

fn main() -> ExitCode {
    let result = run_cli();
    if let Err(e) = &result {
        report_failure(e);
    }
    ExitCode::from(exit_status(&result))
}
