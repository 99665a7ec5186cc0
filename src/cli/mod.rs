/// CLI layer: argument parsing, output formatting, logging.
pub mod args;
pub mod logging;
pub mod output;

pub use args::{EcsRunCli, OutputFormat, ParamCommand, ParamToolCli};
pub use output::{OutputCtx, write_error};
