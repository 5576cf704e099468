//! Everything the manager needs from the person at the keyboard. Keeping it behind [Console]
//! lets the business logic run against a scripted console in tests.

use std::io::{self, BufRead, Write};

use ansi_term::Colour;

/// Intended to serve as a contract between the manager and whatever talks to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Console {
    /// Asks a yes/no question. Blocks until answered.
    fn confirm(&mut self, question: &str) -> bool;

    /// Asks for a free-form line of input, returned without surrounding whitespace.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Regular output, such as reports.
    fn emit(&mut self, line: &str);

    /// Informational messages about operations that did nothing.
    fn notice(&mut self, line: &str);
}

/// How a yes/no answer is read. Empty input means yes, unknown input is treated as yes too.
/// Closed input is never an answer.
#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
}

impl Answer {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Answer::Yes,
            "n" | "no" => Answer::No,
            _ => Answer::Unrecognized,
        }
    }
}

/// [Console] over the process's standard streams.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, text: &str) -> io::Result<String> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input was closed"));
        }
        Ok(line.trim().to_string())
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{line}") {
            tracing::error!("Failed to write to the terminal {e:?}");
        }
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        let answer = match self.prompt(&format!("{question} (y/n, default is y): ")) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Couldn't read confirmation, treating it as declined {e:?}");
                return false;
            }
        };
        match Answer::parse(&answer) {
            Answer::Yes => true,
            Answer::No => false,
            Answer::Unrecognized => {
                self.notice("Invalid input, defaulting to 'yes'.");
                true
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompt(&format!("{prompt}: "))
    }

    fn emit(&mut self, line: &str) {
        self.write_line(line);
    }

    fn notice(&mut self, line: &str) {
        let line = Colour::Yellow.paint(line).to_string();
        self.write_line(&line);
    }
}

#[cfg(test)]
pub use recording::RecordingConsole;


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{Answer, Console, TerminalConsole};

    #[test]
    fn test_answer_parsing() {
        assert_eq!(Answer::parse(""), Answer::Yes);
        assert_eq!(Answer::parse(" Y \n"), Answer::Yes);
        assert_eq!(Answer::parse("yes"), Answer::Yes);
        assert_eq!(Answer::parse("N"), Answer::No);
        assert_eq!(Answer::parse("no"), Answer::No);
        assert_eq!(Answer::parse("maybe"), Answer::Unrecognized);
    }

    #[test]
    fn test_terminal_confirm_reads_answers() {
        let mut output = vec![];
        {
            let mut console = TerminalConsole::new(Cursor::new("n\nmaybe\n\n"), &mut output);
            assert!(!console.confirm("Delete?"));
            assert!(console.confirm("Delete?"));
            assert!(console.confirm("Delete?"));
        }
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Delete? (y/n, default is y): "));
        assert!(output.contains("Invalid input, defaulting to 'yes'."));
    }

    #[test]
    fn test_terminal_confirm_on_closed_input_declines() {
        let mut console = TerminalConsole::new(Cursor::new(""), Vec::new());
        assert!(!console.confirm("Proceed?"));
        assert!(console.read_line("Name").is_err());
    }

    #[test]
    fn test_terminal_read_line_trims() {
        let mut console = TerminalConsole::new(Cursor::new("  new-name \n"), Vec::new());
        assert_eq!(console.read_line("New name").unwrap(), "new-name");
    }
}
