/// Output formatting: plan rendering, progress lines, errors. TTY detection.
use std::io::{IsTerminal, Write};

use chrono::{DateTime, Local, TimeZone};
use comfy_table::{Cell, Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::params::{ApplyEvent, ChangeKind, ChangePlan, Parameter};
use crate::task::{LogEvent, WatchEvent};
use crate::types::{ErrorOutput, PlanEntryOutput, PlanOutput, action_name};

/// Resolve the effective output format, handling TTY auto-detection.
#[must_use]
pub fn resolve_format(fmt: OutputFormat) -> OutputFormat {
    if fmt == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Text
        }
    } else {
        fmt
    }
}

/// Output context passed to all formatters.
pub struct OutputCtx {
    pub format: OutputFormat,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(fmt: OutputFormat) -> Self {
        Self {
            format: resolve_format(fmt),
        }
    }

    /// Start a named timer. Logs the elapsed time at debug level on drop.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label)
    }
}

/// Print a status line. In JSON mode it goes to stderr so stdout stays parseable.
pub fn write_note(message: &str, ctx: &OutputCtx) {
    if ctx.format == OutputFormat::Json {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

// --- Plan output ---

fn symbol(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Create => "+",
        ChangeKind::Update => "~",
        ChangeKind::Delete => "-",
        ChangeKind::Unchanged => "=",
    }
}

/// Render one plan record as a text line. Secure values are redacted.
#[must_use]
pub fn plan_line(change: &Parameter) -> String {
    let entry = PlanEntryOutput::from_change(change);
    let secure = if entry.secure { " (secure)" } else { "" };
    match entry.value {
        Some(value) => format!("{} {}{secure} = {value}", symbol(change.kind), entry.name),
        None => format!("{} {}{secure}", symbol(change.kind), entry.name),
    }
}

/// Write a plan to stdout in the context's format.
pub fn write_plan(plan: &ChangePlan, dry_run: bool, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(&PlanOutput::from_plan(plan, dry_run)),
        OutputFormat::Text => {
            for change in &plan.changes {
                println!("{}", plan_line(change));
            }
            println!("{}", plan.summary());
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if !plan.is_empty() {
                println!("{}", plan_table(plan));
            }
            println!("{}", plan.summary());
        }
    }
}

fn plan_table(plan: &ChangePlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["ACTION", "NAME", "TYPE", "VALUE"]);
    for change in &plan.changes {
        let entry = PlanEntryOutput::from_change(change);
        table.add_row([
            Cell::new(action_name(change.kind)),
            Cell::new(&entry.name),
            Cell::new(if entry.secure { "SecureString" } else { "String" }),
            Cell::new(entry.value.as_deref().unwrap_or("")),
        ]);
    }
    table
}

// --- Apply progress ---

/// Print a progress line for an apply event to stderr.
pub fn write_apply_event(event: ApplyEvent<'_>) {
    let line = match event {
        ApplyEvent::Started(change) => {
            let secure = if change.secure { "secure " } else { "" };
            match change.kind {
                ChangeKind::Delete => format!("Deleting {secure}param {}", change.name),
                ChangeKind::Create => format!("Creating {secure}param {}", change.name),
                ChangeKind::Update => format!("Writing new value for {secure}param {}", change.name),
                ChangeKind::Unchanged => return,
            }
        }
        ApplyEvent::Throttled { attempt, .. } => {
            format!("  rate limited (attempt {attempt}), retrying")
        }
        ApplyEvent::AlreadyAbsent(_) => "  already absent".to_owned(),
        ApplyEvent::Finished(_) => "  done".to_owned(),
    };
    eprintln!("{line}");
}

// --- Task output ---

/// Format a Unix-millisecond timestamp in local time.
#[must_use]
pub fn local_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(at) => format_time(&at),
        None => timestamp_ms.to_string(),
    }
}

fn format_time(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S %z").to_string()
}

/// Render a log event line.
#[must_use]
pub fn log_line(event: &LogEvent) -> String {
    format!("[{}] {}", local_time(event.timestamp_ms), event.message)
}

/// Print a watch event to stdout.
pub fn write_watch_event(event: WatchEvent<'_>) {
    match event {
        WatchEvent::StatusChanged(status) => {
            println!("[{}] Task status changed to {status}", format_time(&Local::now()));
        }
        WatchEvent::StoppedReason(reason) => println!("Stopped reason: {reason}"),
        WatchEvent::Log(event) => println!("{}", log_line(event)),
    }
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &ErrorOutput, format: OutputFormat) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    match format {
        OutputFormat::Json => {
            let s = serde_json::to_string_pretty(err).unwrap_or_default();
            let _ = writeln!(out, "{s}");
        }
        _ => {
            let _ = writeln!(out, "Error: {}", err.error.message);
        }
    }
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds at debug level on drop.
///
/// Created via [`OutputCtx::timer`].
pub struct DebugTimer {
    label: &'static str,
    start: std::time::Instant,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(label = self.label, elapsed_ms = format!("{ms:.2}"), "timing");
    }
}

// --- Generic JSON helper ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}
