/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// param-tool: sync an SSM parameter tree with a YAML document.
#[derive(Debug, Parser)]
#[command(
    name = "param-tool",
    about = "Export or apply a tree of SSM parameters as YAML",
    long_about = "Export (down) or apply (up) a tree of SSM parameters as YAML.\n\n\
        Keys ending in '!' are SecureString parameters; a key without it is a plain \
        String, and changing the marker rewrites the parameter with the new type. \
        In a document, the value SECURE on any key keeps the stored value untouched, \
        and the value DELETE on any key removes it. Both words are reserved: they \
        are never stored as literal values.",
    version,
    arg_required_else_help = true
)]
pub struct ParamToolCli {
    /// Parameter path prefix, e.g. /myapp/production.
    #[arg(short, long, global = true, env = "PARAM_TOOL_PREFIX", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// KMS key for writing secure params (no effect on reading).
    #[arg(short, long, global = true, value_name = "KEY")]
    pub key: Option<String>,

    /// Output decrypted secure params on `down`.
    #[arg(short = 'D', long, global = true)]
    pub decrypt: bool,

    /// Show the plan without applying it.
    #[arg(short, long, global = true)]
    pub dry_run: bool,

    /// Apply without asking for confirmation. Required when reading from --file.
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Document to read (`up`) or write (`down`). Defaults to stdin/stdout; `-` also means that.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Omit the trailing '!' on secure keys when exporting. Combined with --decrypt
    /// the export turns secrets into plain values if applied back.
    #[arg(long, global = true)]
    pub no_secure_suffix: bool,

    /// AWS region. Defaults to the SDK's region chain.
    #[arg(short = 'R', long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Plan output format. Auto-detects: table when TTY, text when piped.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "auto")]
    pub output: OutputFormat,

    /// Verbose diagnostics on stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: ParamCommand,
}

/// Plan output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Auto-detect: table when stdout is a TTY, text when piped.
    #[default]
    Auto,
    /// One line per change.
    Text,
    /// Aligned table with headers (human-readable).
    Table,
    /// JSON object (pretty-printed).
    Json,
}

/// `param-tool` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ParamCommand {
    /// Export the parameters under the prefix as YAML.
    Down,
    /// Apply a YAML document to the parameters under the prefix.
    Up,
}

/// ecs-run: run a one-off command in a service's task definition.
#[derive(Debug, Parser)]
#[command(
    name = "ecs-run",
    about = "Run a one-off command as an ECS task based on an existing service",
    version
)]
pub struct EcsRunCli {
    /// Cluster name.
    #[arg(short, long, env = "ECS_RUN_CLUSTER", value_name = "CLUSTER")]
    pub cluster: Option<String>,

    /// Service name.
    #[arg(short, long, env = "ECS_RUN_SERVICE", value_name = "SERVICE")]
    pub service: Option<String>,

    /// Container name. Defaults to the first container of the task definition.
    #[arg(short = 'C', long, value_name = "CONTAINER")]
    pub container: Option<String>,

    /// AWS region. Defaults to the SDK's region chain.
    #[arg(short = 'R', long, value_name = "REGION")]
    pub region: Option<String>,

    /// Follow task status and output until it stops.
    #[arg(short, long)]
    pub watch: bool,

    /// Evaluate the input with `bundle exec rails runner` instead of the shell.
    #[arg(short = 'r', long, visible_alias = "ruby")]
    pub rails: bool,

    /// Verbose diagnostics on stderr.
    #[arg(long)]
    pub debug: bool,

    /// Command to run. Read from stdin when omitted.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
