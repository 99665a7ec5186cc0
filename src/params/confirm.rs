/// Confirmation gate between planning and applying.
use std::io::{BufRead, BufReader, Write};

/// Literal answer that approves a plan.
pub const CONFIRM_WORD: &str = "yes";

/// Where the desired document was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Standard input (interactive use: piped or typed).
    Stdin,
    /// A named file.
    File(std::path::PathBuf),
}

impl DocumentSource {
    /// Human-readable origin for messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "standard input".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Outcome of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    /// Apply the plan.
    Approved,
    /// Do not apply anything.
    Aborted(String),
}

/// Asks the operator to approve a plan.
pub trait Prompt {
    /// Show `question` and return the operator's answer, trimmed.
    /// `None` when no answer can be obtained (no terminal).
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Decide whether a displayed plan may be applied.
///
/// * `auto_approve` always approves.
/// * A document read from stdin is confirmed interactively; only the literal
///   [`CONFIRM_WORD`] approves.
/// * A document read from a file never prompts: without `auto_approve` the run
///   is aborted before any mutating call.
pub fn gate(source: &DocumentSource, auto_approve: bool, prompt: &mut dyn Prompt) -> Approval {
    if auto_approve {
        return Approval::Approved;
    }
    match source {
        DocumentSource::File(path) => Approval::Aborted(format!(
            "refusing to apply changes from {} without --yes",
            path.display()
        )),
        DocumentSource::Stdin => {
            let question =
                format!("Do you want to apply these changes? Only '{CONFIRM_WORD}' will be accepted: ");
            match prompt.ask(&question) {
                Some(answer) if answer == CONFIRM_WORD => Approval::Approved,
                Some(answer) => Approval::Aborted(format!("answer was '{answer}'")),
                None => Approval::Aborted("no terminal available to confirm; pass --yes".to_owned()),
            }
        }
    }
}

/// Prompt on the controlling terminal.
///
/// Standard input carries the document, so the answer is read from `/dev/tty`
/// and the question is written to stderr.
pub struct TtyPrompt;

impl Prompt for TtyPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        let tty = match std::fs::File::open("/dev/tty") {
            Ok(tty) => tty,
            Err(err) => {
                tracing::debug!(%err, "cannot open controlling terminal");
                return None;
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{question}");
        let _ = stderr.flush();

        let mut line = String::new();
        match BufReader::new(tty).read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_owned()),
        }
    }
}
