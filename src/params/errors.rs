/// Errors from the parameter sync layer.
use thiserror::Error;

/// Errors reported by a [`ParameterStore`](super::store::ParameterStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist.
    #[error("Parameter '{name}' not found")]
    NotFound {
        /// The requested key.
        name: String,
    },

    /// A no-overwrite write hit an existing key.
    #[error("Parameter '{name}' already exists")]
    AlreadyExists {
        /// The written key.
        name: String,
    },

    /// The store throttled the request. Retryable.
    #[error("Rate limited by the parameter store: {0}")]
    RateLimited(String),

    /// Any other remote failure.
    #[error("Parameter store API error: {0}")]
    Api(String),
}

/// Errors that can occur while reading, planning or applying a parameter tree.
#[derive(Debug, Error)]
pub enum ParamError {
    /// A required option was absent or empty.
    #[error("Missing required argument: --{0}")]
    MissingArgument(&'static str),

    /// The input document could not be turned into a parameter tree.
    #[error("Failed to read params YAML from {origin}: {reason}")]
    InvalidDocument {
        /// Where the document came from (a path or "standard input").
        origin: String,
        /// Parser or shape error.
        reason: String,
    },

    /// Reading the document or writing the export failed.
    #[error("I/O error on {origin}: {source}")]
    Io {
        /// The file or stream involved.
        origin: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The tree could not be rendered as YAML.
    #[error("Failed to serialize params YAML: {0}")]
    Serialize(String),

    /// A create raced with an out-of-band write between plan and apply.
    #[error(
        "Parameter '{name}' was created by someone else after the plan was built; re-run to see the new plan"
    )]
    Conflict {
        /// The conflicting key.
        name: String,
    },

    /// The user declined the plan, or the gate refused to run unattended.
    #[error("Aborted: {reason}")]
    Aborted {
        /// Why nothing was applied.
        reason: String,
    },

    /// A remote call failed after some records were already applied.
    #[error("Apply stopped after {applied} of {total} change(s): {source}")]
    PartialApply {
        /// Records that completed before the failure.
        applied: usize,
        /// Size of the plan.
        total: usize,
        /// The failing call.
        #[source]
        source: Box<ParamError>,
    },

    /// An underlying store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exit code and machine-readable code mapping for `ParamError` variants.
impl ParamError {
    /// Return the CLI exit code for this error.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn exit_code(&self) -> i32 {
        // Every fatal outcome, aborts included, maps to 1.
        1
    }

    /// Snake-case error code used in the JSON error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidDocument { .. } => "invalid_document",
            Self::Io { .. } => "io_error",
            Self::Serialize(_) => "serialize_error",
            Self::Conflict { .. } => "conflict",
            Self::Aborted { .. } => "aborted",
            Self::PartialApply { .. } => "partial_apply",
            Self::Store(StoreError::RateLimited(_)) => "rate_limited",
            Self::Store(_) => "store_error",
        }
    }
}
