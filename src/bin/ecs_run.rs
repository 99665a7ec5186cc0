#![deny(clippy::all, clippy::pedantic)]
//! ecs-run: run a one-off command in an ECS service's task definition.

use clap::Parser;

use awsops::cli::{EcsRunCli, OutputFormat, logging, write_error};
use awsops::commands::run;
use awsops::types::ErrorOutput;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = EcsRunCli::parse();
    logging::init(cli.debug);

    if let Err(err) = run::run(&cli).await {
        let error_output = ErrorOutput::from_task_error(&err);
        write_error(&error_output, OutputFormat::Text);
        std::process::exit(err.exit_code());
    }
}
