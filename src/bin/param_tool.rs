#![deny(clippy::all, clippy::pedantic)]
//! param-tool: export and apply SSM parameter trees as YAML.

use clap::Parser;

use awsops::cli::{OutputCtx, ParamToolCli, logging, write_error};
use awsops::commands;
use awsops::types::ErrorOutput;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = ParamToolCli::parse();
    logging::init(cli.debug);

    let ctx = OutputCtx::new(cli.output);

    if let Err(err) = commands::dispatch(&cli, &ctx).await {
        let error_output = ErrorOutput::from_param_error(&err);
        write_error(&error_output, ctx.format);
        std::process::exit(err.exit_code());
    }
}
