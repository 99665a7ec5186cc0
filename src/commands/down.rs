/// `down` command: export the parameter tree under the prefix as YAML.
use std::io::Write;

use super::document_path;
use crate::cli::OutputCtx;
use crate::cli::args::ParamToolCli;
use crate::params::{ParamError, ParameterStore, Prefix, TreeOptions, read_tree};

/// Run `param-tool down`.
///
/// # Errors
///
/// Returns `ParamError` on listing failure or when the destination cannot be written.
pub async fn run(
    cli: &ParamToolCli,
    prefix: &Prefix,
    store: &dyn ParameterStore,
    ctx: &OutputCtx,
) -> Result<(), ParamError> {
    let opts = TreeOptions {
        decrypted: cli.decrypt,
        secure_suffix: !cli.no_secure_suffix,
    };

    let t_read = ctx.timer("read_tree");
    let tree = read_tree(store, prefix, opts).await?;
    drop(t_read);

    let document = tree.to_yaml_string()?;
    match document_path(cli.file.as_deref()) {
        Some(path) => std::fs::write(path, document).map_err(|source| ParamError::Io {
            origin: path.display().to_string(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .map_err(|source| ParamError::Io {
                    origin: "standard output".to_owned(),
                    source,
                })
        }
    }
}
