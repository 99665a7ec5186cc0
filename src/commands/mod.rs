/// Command dispatch: routes `param-tool` subcommands to their implementations.
/// `ecs-run` has a single flow in [`run`].
pub mod down;
pub mod run;
pub mod up;

use std::path::Path;

use crate::aws::{self, SsmStore};
use crate::cli::OutputCtx;
use crate::cli::args::{ParamCommand, ParamToolCli};
use crate::params::{ParamError, Prefix, TtyPrompt};

/// Dispatch a parsed `param-tool` invocation.
///
/// The prefix is validated before the AWS configuration is loaded, so a missing
/// `--prefix` never reaches the network.
///
/// # Errors
///
/// Returns `ParamError` on any command failure.
pub async fn dispatch(cli: &ParamToolCli, ctx: &OutputCtx) -> Result<(), ParamError> {
    let prefix = Prefix::new(cli.prefix.as_deref().unwrap_or_default())?;

    let t_config = ctx.timer("load_config");
    let config = aws::load_config(cli.region.as_deref()).await;
    drop(t_config);
    let store = SsmStore::new(&config);

    match cli.command {
        ParamCommand::Down => down::run(cli, &prefix, &store, ctx).await,
        ParamCommand::Up => up::run(cli, &prefix, &store, ctx, &mut TtyPrompt).await,
    }
}

/// The `--file` path, or `None` for the standard stream (`-` or absent).
fn document_path(file: Option<&Path>) -> Option<&Path> {
    file.filter(|path| path.as_os_str() != "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_means_standard_stream() {
        assert_eq!(document_path(None), None);
        assert_eq!(document_path(Some(Path::new("-"))), None);
        assert_eq!(
            document_path(Some(Path::new("params.yml"))),
            Some(Path::new("params.yml"))
        );
    }
}
