/// Remote seams of the task runner and the data they exchange.
use std::collections::HashMap;

use async_trait::async_trait;

use super::errors::TaskError;

/// Log driver whose output can be tailed.
pub const AWSLOGS_DRIVER: &str = "awslogs";

/// awsvpc network settings, mirrored from the service onto the one-off task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    /// `ENABLED` / `DISABLED`, as the service has it. `None` leaves the API default.
    pub assign_public_ip: Option<String>,
}

/// The parts of a service needed to launch a sibling task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub task_definition: String,
    /// Launch type of the service, if it has one (capacity-provider services do not).
    pub launch_type: Option<String>,
    /// Network configuration of the primary deployment, or of the service itself.
    pub network: Option<NetworkConfig>,
}

/// Container log settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub driver: String,
    pub options: HashMap<String, String>,
}

/// A container definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,
    pub log: Option<LogConfig>,
}

/// A `RunTask` request for a single container override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub cluster: String,
    pub task_definition: String,
    pub launch_type: String,
    pub container: String,
    pub command: Vec<String>,
    pub network: Option<NetworkConfig>,
}

/// Current state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    /// `lastStatus`, e.g. `PROVISIONING`, `RUNNING`, `STOPPED`.
    pub last_status: String,
    /// Why the task stopped, once it has.
    pub stopped_reason: Option<String>,
}

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub message: String,
}

/// A page of log events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    /// Token to continue from on the next call.
    pub next_forward_token: Option<String>,
}

/// Container orchestration API.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Describe a service. `Ok(None)` when the service does not exist.
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ServiceInfo>, TaskError>;

    /// Container definitions of a task definition, in definition order.
    async fn containers(&self, task_definition: &str) -> Result<Vec<ContainerInfo>, TaskError>;

    /// Launch a task and return its ARN.
    async fn run_task(&self, request: &LaunchRequest) -> Result<String, TaskError>;

    /// Current state of a task. `Ok(None)` if the API no longer knows it.
    async fn describe_task(&self, cluster: &str, task_id: &str)
    -> Result<Option<TaskState>, TaskError>;
}

/// Log retrieval API.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch events after `token` (from the head when `None`).
    /// `Ok(None)` when the stream does not exist yet.
    async fn fetch(
        &self,
        group: &str,
        stream: &str,
        token: Option<String>,
    ) -> Result<Option<LogPage>, TaskError>;
}
