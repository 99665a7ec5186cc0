/// `ecs-run`: launch a one-off task from a service's definition and optionally follow it.
use std::io::IsTerminal;
use std::time::Duration;

use crate::aws::{self, CloudWatchLogs, EcsTasks};
use crate::cli::args::EcsRunCli;
use crate::cli::output::write_watch_event;
use crate::task::watch::POLL_INTERVAL;
use crate::task::{
    LogSource, TaskError, TaskRef, TaskService, Watcher, build_command, container_command,
    launch_request, log_target, select_container,
};

/// Everything needed to launch, after argument validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub cluster: String,
    pub service: String,
    pub container: Option<String>,
    /// Final shell command (rails wrapping already applied).
    pub command: String,
    pub watch: bool,
    pub interval: Duration,
}

/// Run `ecs-run`.
///
/// # Errors
///
/// Returns `TaskError` on missing arguments, unknown service or container,
/// launch failure, or any API error while watching.
pub async fn run(cli: &EcsRunCli) -> Result<(), TaskError> {
    let cluster = required(cli.cluster.as_deref(), "cluster")?;
    let service = required(cli.service.as_deref(), "service")?;
    let input = read_input(cli)?;
    let launch = Launch {
        cluster: cluster.to_owned(),
        service: service.to_owned(),
        container: cli.container.clone(),
        command: build_command(&input, cli.rails)?,
        watch: cli.watch,
        interval: POLL_INTERVAL,
    };

    let config = aws::load_config(cli.region.as_deref()).await;
    if cli.region.is_none() {
        println!("No region is specified. Using {}", aws::region_name(&config));
    }

    let tasks = EcsTasks::new(&config);
    let logs = CloudWatchLogs::new(&config);
    execute(&launch, &tasks, &logs).await.map(|_| ())
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, TaskError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(TaskError::MissingArgument(name))
}

/// The command from the trailing arguments, or from stdin when there are none.
fn read_input(cli: &EcsRunCli) -> Result<String, TaskError> {
    if !cli.command.is_empty() {
        return Ok(cli.command.join(" "));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        println!("Type your command then press Ctrl+D");
    }
    if cli.rails {
        println!("Note - the evaluation result is NOT printed automatically, use `p`");
    }
    println!();
    let input = std::io::read_to_string(stdin)?;
    println!();
    Ok(input)
}

/// Launch the task described by `launch` and, if requested, watch it stop.
///
/// Returns the launched task.
///
/// # Errors
///
/// See [`run`].
pub async fn execute(
    launch: &Launch,
    tasks: &dyn TaskService,
    logs: &dyn LogSource,
) -> Result<TaskRef, TaskError> {
    let service = tasks
        .describe_service(&launch.cluster, &launch.service)
        .await?
        .ok_or_else(|| TaskError::ServiceNotFound {
            cluster: launch.cluster.clone(),
            service: launch.service.clone(),
        })?;
    tracing::debug!(task_definition = %service.task_definition, "resolved service");

    let containers = tasks.containers(&service.task_definition).await?;
    let choice = select_container(
        &service.task_definition,
        &containers,
        launch.container.as_deref(),
    )?;
    if let Some(notice) = &choice.notice {
        println!("{notice}");
    }

    let request = launch_request(
        &launch.cluster,
        &service,
        choice.container,
        container_command(&launch.command),
    );
    let arn = tasks.run_task(&request).await?;
    let task = TaskRef::from_arn(&arn)?;
    println!("Task started. See it online at {}", task.console_url(&launch.cluster));

    if !launch.watch {
        return Ok(task);
    }

    println!("Watching task. Note - Ctrl+C will stop watching, but will NOT stop the task!");
    let mut watcher = Watcher::new(tasks, &launch.cluster, &task.task_id).with_interval(launch.interval);
    match log_target(choice.container, &task.task_id) {
        Some(target) => watcher = watcher.with_logs(logs, target),
        None => println!("Use `awslogs` log adapter to see the task output."),
    }
    watcher.run(&mut write_watch_event).await?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clap::Parser;

    use super::*;
    use crate::task::{
        ContainerInfo, LaunchRequest, LogConfig, LogPage, NetworkConfig, ServiceInfo, TaskState,
    };

    const ARN: &str = "arn:aws:ecs:eu-west-1:123456789012:task/prod/0f9e8d7c";

    /// Fake ECS: one service, scripted task statuses, recorded launches.
    struct FakeEcs {
        service: Option<ServiceInfo>,
        containers: Vec<ContainerInfo>,
        statuses: Mutex<Vec<&'static str>>,
        launched: Mutex<Vec<LaunchRequest>>,
    }

    impl FakeEcs {
        fn new(containers: Vec<ContainerInfo>) -> Self {
            Self {
                service: Some(ServiceInfo {
                    task_definition: "web:42".to_owned(),
                    launch_type: None,
                    network: Some(NetworkConfig {
                        subnets: vec!["subnet-a".into(), "subnet-b".into()],
                        security_groups: vec!["sg-1".into()],
                        assign_public_ip: Some("DISABLED".into()),
                    }),
                }),
                containers,
                statuses: Mutex::new(vec!["STOPPED", "RUNNING", "PENDING"]),
                launched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TaskService for FakeEcs {
        async fn describe_service(
            &self,
            _cluster: &str,
            _service: &str,
        ) -> Result<Option<ServiceInfo>, TaskError> {
            Ok(self.service.clone())
        }

        async fn containers(&self, _task_definition: &str) -> Result<Vec<ContainerInfo>, TaskError> {
            Ok(self.containers.clone())
        }

        async fn run_task(&self, request: &LaunchRequest) -> Result<String, TaskError> {
            self.launched.lock().unwrap().push(request.clone());
            Ok(ARN.to_owned())
        }

        async fn describe_task(
            &self,
            _cluster: &str,
            task_id: &str,
        ) -> Result<Option<TaskState>, TaskError> {
            assert_eq!(task_id, "0f9e8d7c");
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop()
            } else {
                statuses.last().copied()
            };
            Ok(status.map(|s| TaskState {
                last_status: s.to_owned(),
                stopped_reason: (s == "STOPPED").then(|| "Essential container exited".to_owned()),
            }))
        }
    }

    /// Records which streams were read.
    #[derive(Default)]
    struct RecordingLogs {
        streams: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LogSource for RecordingLogs {
        async fn fetch(
            &self,
            _group: &str,
            stream: &str,
            _token: Option<String>,
        ) -> Result<Option<LogPage>, TaskError> {
            self.streams.lock().unwrap().push(stream.to_owned());
            Ok(None)
        }
    }

    fn container(name: &str, awslogs: bool) -> ContainerInfo {
        ContainerInfo {
            name: name.to_owned(),
            log: awslogs.then(|| LogConfig {
                driver: "awslogs".to_owned(),
                options: HashMap::from([
                    ("awslogs-group".to_owned(), "/ecs/web".to_owned()),
                    ("awslogs-stream-prefix".to_owned(), "ecs".to_owned()),
                ]),
            }),
        }
    }

    fn launch(container: Option<&str>, watch: bool) -> Launch {
        Launch {
            cluster: "prod".to_owned(),
            service: "web".to_owned(),
            container: container.map(str::to_owned),
            command: "rake db:migrate".to_owned(),
            watch,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_launch_mirrors_service_settings() {
        let ecs = FakeEcs::new(vec![container("app", false), container("sidecar", false)]);
        let task = execute(&launch(None, false), &ecs, &RecordingLogs::default())
            .await
            .unwrap();
        assert_eq!(task.region, "eu-west-1");
        assert_eq!(task.task_id, "0f9e8d7c");

        let launched = ecs.launched.lock().unwrap();
        assert_eq!(launched.len(), 1);
        let request = &launched[0];
        assert_eq!(request.container, "app");
        assert_eq!(request.launch_type, "FARGATE");
        assert_eq!(request.command, ["sh", "-c", "rake db:migrate"]);
        assert_eq!(request.network, ecs.service.as_ref().unwrap().network);
    }

    #[tokio::test]
    async fn test_unknown_service_fails_before_launch() {
        let mut ecs = FakeEcs::new(vec![container("app", false)]);
        ecs.service = None;
        let err = execute(&launch(None, false), &ecs, &RecordingLogs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::ServiceNotFound { .. }), "{err:?}");
        assert!(ecs.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_container_fails_before_launch() {
        let ecs = FakeEcs::new(vec![container("app", false)]);
        let err = execute(&launch(Some("worker"), false), &ecs, &RecordingLogs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::ContainerNotFound { .. }), "{err:?}");
        assert!(ecs.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_watch_tails_chosen_container_stream() {
        let ecs = FakeEcs::new(vec![container("app", false), container("worker", true)]);
        let logs = RecordingLogs::default();
        execute(&launch(Some("worker"), true), &ecs, &logs).await.unwrap();

        let streams = logs.streams.lock().unwrap();
        assert!(!streams.is_empty());
        assert!(streams.iter().all(|s| s == "ecs/worker/0f9e8d7c"), "{streams:?}");
    }

    #[tokio::test]
    async fn test_watch_without_awslogs_reads_no_stream() {
        let ecs = FakeEcs::new(vec![container("app", false)]);
        let logs = RecordingLogs::default();
        execute(&launch(None, true), &ecs, &logs).await.unwrap();
        assert!(logs.streams.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blank_cluster_is_missing() {
        let err = required(Some("  "), "cluster").unwrap_err();
        assert!(matches!(err, TaskError::MissingArgument("cluster")));
        assert!(required(None, "service").is_err());
        assert_eq!(required(Some("prod"), "cluster").unwrap(), "prod");
    }

    #[test]
    fn test_trailing_words_are_joined() {
        let cli = EcsRunCli::try_parse_from(["ecs-run", "-c", "a", "-s", "b", "echo", "hi there"])
            .unwrap();
        assert_eq!(read_input(&cli).unwrap(), "echo hi there");
    }
}
