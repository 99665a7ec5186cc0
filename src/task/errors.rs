/// Errors from the task runner.
use thiserror::Error;

/// Errors that can occur while launching or watching a one-off task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A required option was absent or empty.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The service does not exist in the cluster.
    #[error("Service '{service}' not found in cluster '{cluster}'")]
    ServiceNotFound {
        /// Cluster searched.
        cluster: String,
        /// Service name.
        service: String,
    },

    /// The task definition has no container definitions.
    #[error("Task definition '{0}' has no containers")]
    NoContainers(String),

    /// The requested container is not part of the task definition.
    #[error("No container found named '{name}'. Available: {}", available.join(", "))]
    ContainerNotFound {
        /// Requested name.
        name: String,
        /// Names in the task definition.
        available: Vec<String>,
    },

    /// `RunTask` returned no task.
    #[error("Task failed to start: {}", reasons.join("; "))]
    LaunchFailed {
        /// Failure reasons reported by the API.
        reasons: Vec<String>,
    },

    /// The launched task was not returned by the API for too long.
    #[error("Task '{task_id}' not found in cluster '{cluster}' after {polls} polls")]
    TaskNotFound {
        /// Cluster polled.
        cluster: String,
        /// Task id.
        task_id: String,
        /// Consecutive polls without the task.
        polls: u32,
    },

    /// A task ARN did not have the expected shape.
    #[error("Unrecognized task ARN '{0}'")]
    InvalidArn(String),

    /// Reading the command from stdin failed.
    #[error("Failed to read command from standard input: {0}")]
    Io(#[from] std::io::Error),

    /// Any other remote failure.
    #[error("AWS API error: {0}")]
    Api(String),
}

impl TaskError {
    /// Return the CLI exit code for this error.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Snake-case error code used in the JSON error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::ServiceNotFound { .. } => "service_not_found",
            Self::NoContainers(_) | Self::ContainerNotFound { .. } => "container_not_found",
            Self::LaunchFailed { .. } => "launch_failed",
            Self::TaskNotFound { .. } => "task_not_found",
            Self::InvalidArn(_) => "invalid_arn",
            Self::Io(_) => "io_error",
            Self::Api(_) => "api_error",
        }
    }
}
