/// One-off task runner: command building, target resolution, watching.
pub mod command;
pub mod errors;
pub mod service;
pub mod target;
pub mod watch;

pub use command::{build_command, container_command, shell_quote};
pub use errors::TaskError;
pub use service::{
    ContainerInfo, LaunchRequest, LogConfig, LogEvent, LogPage, LogSource, NetworkConfig,
    ServiceInfo, TaskService, TaskState,
};
pub use target::{LogTarget, TaskRef, launch_request, log_target, select_container};
pub use watch::{WatchEvent, Watcher};
