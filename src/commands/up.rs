/// `up` command: apply a YAML document to the parameter tree under the prefix.
use super::document_path;
use crate::cli::OutputCtx;
use crate::cli::args::ParamToolCli;
use crate::cli::output::{write_apply_event, write_note, write_plan};
use crate::params::{
    Applier, Approval, DocumentSource, ParamError, ParamNode, ParameterStore, Prefix, Prompt,
    TreeOptions, build_plan, gate, read_tree,
};

/// Run `param-tool up`.
///
/// Nothing is written before the plan has been displayed and approved.
///
/// # Errors
///
/// Returns `ParamError` when the document is unreadable or malformed, when the
/// plan is not approved, or when applying fails.
pub async fn run(
    cli: &ParamToolCli,
    prefix: &Prefix,
    store: &dyn ParameterStore,
    ctx: &OutputCtx,
    prompt: &mut dyn Prompt,
) -> Result<(), ParamError> {
    let (source, text) = read_document(cli)?;
    sync(cli, prefix, store, ctx, prompt, &source, &text).await
}

/// Plan, confirm and apply an already-read document.
///
/// # Errors
///
/// See [`run`].
pub async fn sync(
    cli: &ParamToolCli,
    prefix: &Prefix,
    store: &dyn ParameterStore,
    ctx: &OutputCtx,
    prompt: &mut dyn Prompt,
    source: &DocumentSource,
    text: &str,
) -> Result<(), ParamError> {
    let desired = ParamNode::from_yaml_str(text, &source.describe())?;

    let t_read = ctx.timer("read_tree");
    let observed = read_tree(store, prefix, TreeOptions::baseline()).await?;
    drop(t_read);

    let plan = build_plan(&desired, &observed, prefix);
    write_plan(&plan, cli.dry_run, ctx);

    if plan.is_empty() {
        write_note("No changes.", ctx);
        return Ok(());
    }
    if cli.dry_run {
        write_note("DRY RUN (no changes applied)", ctx);
        return Ok(());
    }

    if let Approval::Aborted(reason) = gate(source, cli.yes, prompt) {
        return Err(ParamError::Aborted { reason });
    }

    let applier = Applier::new(store, cli.key.clone());
    let applied = applier.apply(&plan, &mut write_apply_event).await?;
    write_note(&format!("Applied {applied} change(s)."), ctx);
    Ok(())
}

fn read_document(cli: &ParamToolCli) -> Result<(DocumentSource, String), ParamError> {
    match document_path(cli.file.as_deref()) {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ParamError::Io {
                origin: path.display().to_string(),
                source,
            })?;
            Ok((DocumentSource::File(path.to_path_buf()), text))
        }
        None => {
            let source = DocumentSource::Stdin;
            let text = std::io::read_to_string(std::io::stdin()).map_err(|err| ParamError::Io {
                origin: source.describe(),
                source: err,
            })?;
            Ok((source, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::cli::OutputFormat;
    use crate::params::store::testing::{Call, MemoryStore};

    /// File input never prompts.
    struct NeverAsked;

    impl Prompt for NeverAsked {
        fn ask(&mut self, question: &str) -> Option<String> {
            panic!("unexpected prompt: {question}");
        }
    }

    fn document(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    async fn up(store: &MemoryStore, file: &NamedTempFile, flags: &[&str]) -> Result<(), ParamError> {
        let mut argv = vec!["param-tool", "-p", "/app", "-f", file.path().to_str().unwrap()];
        argv.extend_from_slice(flags);
        argv.push("up");
        let cli = ParamToolCli::try_parse_from(argv).unwrap();
        let prefix = Prefix::new("/app").unwrap();
        run(&cli, &prefix, store, &OutputCtx::new(OutputFormat::Text), &mut NeverAsked).await
    }

    fn seeded() -> MemoryStore {
        MemoryStore::new()
            .with("/app/db/host", "old.internal", false)
            .with("/app/db/password", "hunter2", true)
            .with("/app/legacy", "x", false)
    }

    const DESIRED: &str = "\
db:
  host: new.internal
  password!: SECURE
  port: 5432
legacy: DELETE
";

    #[tokio::test]
    async fn test_apply_with_yes_then_rerun_is_noop() {
        let store = seeded();
        let file = document(DESIRED);

        up(&store, &file, &["--yes"]).await.unwrap();
        assert_eq!(store.get("/app/db/host").unwrap().value, "new.internal");
        assert_eq!(store.get("/app/db/port").unwrap().value, "5432");
        assert_eq!(store.get("/app/db/password").unwrap().value, "hunter2");
        assert!(store.get("/app/legacy").is_none());
        let calls = store.calls().len();

        up(&store, &file, &["--yes"]).await.unwrap();
        assert_eq!(store.calls().len(), calls);
    }

    #[tokio::test]
    async fn test_file_without_yes_is_aborted_before_writes() {
        let store = seeded();
        let file = document(DESIRED);

        let err = up(&store, &file, &[]).await.unwrap_err();
        assert!(matches!(err, ParamError::Aborted { .. }), "{err:?}");
        assert_eq!(err.exit_code(), 1);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = seeded();
        let file = document(DESIRED);

        up(&store, &file, &["--dry-run", "--yes"]).await.unwrap();
        assert!(store.calls().is_empty());
        assert_eq!(store.get("/app/db/host").unwrap().value, "old.internal");
    }

    #[tokio::test]
    async fn test_key_id_reaches_secure_writes() {
        let store = MemoryStore::new();
        let file = document("token!: abc\nname: svc\n");

        up(&store, &file, &["--yes", "-k", "alias/app"]).await.unwrap();
        let token = store.get("/app/token").unwrap();
        assert!(token.secure);
        assert_eq!(token.key_id.as_deref(), Some("alias/app"));
        assert_eq!(store.get("/app/name").unwrap().key_id, None);
        assert_eq!(
            store.calls(),
            [
                Call::Put {
                    name: "/app/token".to_owned(),
                    overwrite: false
                },
                Call::Put {
                    name: "/app/name".to_owned(),
                    overwrite: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_document_is_rejected() {
        let store = seeded();
        let file = document("db: [unclosed\n");

        let err = up(&store, &file, &["--yes"]).await.unwrap_err();
        assert!(matches!(err, ParamError::InvalidDocument { .. }), "{err:?}");
        assert!(store.calls().is_empty());
    }

    /// Answers every question with a fixed word.
    struct Answer(&'static str);

    impl Prompt for Answer {
        fn ask(&mut self, _question: &str) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    async fn up_from_stdin(store: &MemoryStore, answer: &'static str) -> Result<(), ParamError> {
        let cli = ParamToolCli::try_parse_from(["param-tool", "-p", "/app", "up"]).unwrap();
        let prefix = Prefix::new("/app").unwrap();
        sync(
            &cli,
            &prefix,
            store,
            &OutputCtx::new(OutputFormat::Text),
            &mut Answer(answer),
            &DocumentSource::Stdin,
            DESIRED,
        )
        .await
    }

    #[tokio::test]
    async fn test_stdin_document_applies_after_yes() {
        let store = seeded();
        up_from_stdin(&store, "yes").await.unwrap();
        assert_eq!(store.get("/app/db/host").unwrap().value, "new.internal");
        assert!(store.get("/app/legacy").is_none());
    }

    #[tokio::test]
    async fn test_stdin_document_declined_writes_nothing() {
        let store = seeded();
        let err = up_from_stdin(&store, "no").await.unwrap_err();
        assert!(matches!(err, ParamError::Aborted { .. }), "{err:?}");
        assert!(store.calls().is_empty());
        assert_eq!(store.get("/app/db/host").unwrap().value, "old.internal");
        assert!(store.get("/app/legacy").is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let cli = ParamToolCli::try_parse_from([
            "param-tool",
            "-p",
            "/app",
            "-f",
            "/nonexistent/params.yml",
            "up",
        ])
        .unwrap();
        let prefix = Prefix::new("/app").unwrap();
        let err = run(
            &cli,
            &prefix,
            &MemoryStore::new(),
            &OutputCtx::new(OutputFormat::Text),
            &mut NeverAsked,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ParamError::Io { .. }), "{err:?}");
    }
}
