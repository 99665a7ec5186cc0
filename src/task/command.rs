/// Building the container command override.
use super::errors::TaskError;

/// Shell used to run the command inside the container.
pub const SHELL: &str = "sh";

/// Quote `input` as a single POSIX shell word.
///
/// Words made only of safe characters are returned as-is; anything else is
/// wrapped in single quotes with embedded quotes spelled `'\''`.
#[must_use]
pub fn shell_quote(input: &str) -> String {
    if input.is_empty() {
        return "''".to_owned();
    }
    let safe = input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ',' | ':' | '=' | '@' | '+'));
    if safe {
        return input.to_owned();
    }
    let mut quoted = String::with_capacity(input.len() + 2);
    quoted.push('\'');
    for c in input.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Turn the user input into the shell command string.
///
/// With `rails` the input is evaluated by `bundle exec rails runner`.
///
/// # Errors
///
/// Returns `TaskError::MissingArgument` when the input is blank.
pub fn build_command(input: &str, rails: bool) -> Result<String, TaskError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TaskError::MissingArgument("command"));
    }
    if rails {
        Ok(format!("bundle exec rails runner {}", shell_quote(input)))
    } else {
        Ok(input.to_owned())
    }
}

/// The container command override: `sh -c <command>`.
#[must_use]
pub fn container_command(command: &str) -> Vec<String> {
    vec![SHELL.to_owned(), "-c".to_owned(), command.to_owned()]
}
