/// Resolving what to launch and where its output goes.
use super::errors::TaskError;
use super::service::{AWSLOGS_DRIVER, ContainerInfo, LaunchRequest, ServiceInfo};

/// Launch type used when the service does not declare one.
pub const DEFAULT_LAUNCH_TYPE: &str = "FARGATE";

/// The chosen container, plus a notice when it was picked implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerChoice<'a> {
    pub container: &'a ContainerInfo,
    /// Set when no name was given and the task definition has several containers.
    pub notice: Option<String>,
}

/// Pick the named container, or the first one.
///
/// # Errors
///
/// `TaskError::NoContainers` for an empty definition,
/// `TaskError::ContainerNotFound` for an unknown name.
pub fn select_container<'a>(
    task_definition: &str,
    containers: &'a [ContainerInfo],
    name: Option<&str>,
) -> Result<ContainerChoice<'a>, TaskError> {
    let first = containers
        .first()
        .ok_or_else(|| TaskError::NoContainers(task_definition.to_owned()))?;
    match name {
        Some(name) => containers
            .iter()
            .find(|c| c.name == name)
            .map(|container| ContainerChoice {
                container,
                notice: None,
            })
            .ok_or_else(|| TaskError::ContainerNotFound {
                name: name.to_owned(),
                available: containers.iter().map(|c| c.name.clone()).collect(),
            }),
        None => {
            let notice = (containers.len() > 1).then(|| {
                let names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
                format!(
                    "Container not set in options. Taking first: {} out of {}.",
                    first.name,
                    names.join(", ")
                )
            });
            Ok(ContainerChoice {
                container: first,
                notice,
            })
        }
    }
}

/// Build the `RunTask` request mirroring the service's launch and network settings.
#[must_use]
pub fn launch_request(
    cluster: &str,
    service: &ServiceInfo,
    container: &ContainerInfo,
    command: Vec<String>,
) -> LaunchRequest {
    LaunchRequest {
        cluster: cluster.to_owned(),
        task_definition: service.task_definition.clone(),
        launch_type: service
            .launch_type
            .clone()
            .unwrap_or_else(|| DEFAULT_LAUNCH_TYPE.to_owned()),
        container: container.name.clone(),
        command,
        network: service.network.clone(),
    }
}

/// Region and id of a launched task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub region: String,
    pub task_id: String,
}

impl TaskRef {
    /// Parse `arn:aws:ecs:<region>:<account>:task/<cluster>/<id>` (or the legacy
    /// `task/<id>` form).
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidArn` for anything else.
    pub fn from_arn(arn: &str) -> Result<Self, TaskError> {
        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        let invalid = || TaskError::InvalidArn(arn.to_owned());
        if parts.len() != 6 || parts[0] != "arn" || parts[3].is_empty() {
            return Err(invalid());
        }
        let resource = parts[5];
        if !resource.starts_with("task/") {
            return Err(invalid());
        }
        let task_id = resource.rsplit('/').next().filter(|id| !id.is_empty()).ok_or_else(invalid)?;
        Ok(Self {
            region: parts[3].to_owned(),
            task_id: task_id.to_owned(),
        })
    }

    /// Console page of the task.
    #[must_use]
    pub fn console_url(&self, cluster: &str) -> String {
        let region = &self.region;
        format!(
            "https://{region}.console.aws.amazon.com/ecs/home?region={region}#/clusters/{cluster}/tasks/{}/details",
            self.task_id
        )
    }
}

/// Log group and stream of a task's container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub group: String,
    pub stream: String,
}

/// Where an `awslogs` container writes for the given task, or `None` when the
/// container uses another driver (or an incomplete `awslogs` setup).
#[must_use]
pub fn log_target(container: &ContainerInfo, task_id: &str) -> Option<LogTarget> {
    let log = container.log.as_ref()?;
    if log.driver != AWSLOGS_DRIVER {
        return None;
    }
    let group = log.options.get("awslogs-group")?;
    let stream_prefix = log.options.get("awslogs-stream-prefix")?;
    Some(LogTarget {
        group: group.clone(),
        stream: format!("{stream_prefix}/{}/{task_id}", container.name),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::task::service::{LogConfig, NetworkConfig};

    fn container(name: &str) -> ContainerInfo {
        ContainerInfo {
            name: name.to_owned(),
            log: None,
        }
    }

    #[test]
    fn test_select_named_container() {
        let containers = [container("web"), container("worker")];
        let choice = select_container("td", &containers, Some("worker")).unwrap();
        assert_eq!(choice.container.name, "worker");
        assert_eq!(choice.notice, None);
    }

    #[test]
    fn test_select_first_with_notice() {
        let containers = [container("web"), container("sidecar")];
        let choice = select_container("td", &containers, None).unwrap();
        assert_eq!(choice.container.name, "web");
        let notice = choice.notice.unwrap();
        assert!(notice.contains("Taking first: web"), "{notice}");
        assert!(notice.contains("web, sidecar"), "{notice}");
    }

    #[test]
    fn test_single_container_has_no_notice() {
        let containers = [container("web")];
        assert_eq!(select_container("td", &containers, None).unwrap().notice, None);
    }

    #[test]
    fn test_unknown_container() {
        let containers = [container("web")];
        let err = select_container("td", &containers, Some("db")).unwrap_err();
        assert!(matches!(err, TaskError::ContainerNotFound { ref name, .. } if name == "db"));
    }

    #[test]
    fn test_empty_task_definition() {
        assert!(matches!(
            select_container("td", &[], None),
            Err(TaskError::NoContainers(_))
        ));
    }

    #[test]
    fn test_launch_request_mirrors_service() {
        let network = NetworkConfig {
            subnets: vec!["subnet-a".into(), "subnet-b".into()],
            security_groups: vec!["sg-1".into()],
            assign_public_ip: Some("DISABLED".into()),
        };
        let service = ServiceInfo {
            task_definition: "arn:td:7".into(),
            launch_type: None,
            network: Some(network.clone()),
        };
        let req = launch_request("prod", &service, &container("web"), vec!["sh".into()]);
        assert_eq!(req.launch_type, "FARGATE");
        assert_eq!(req.network, Some(network));
        assert_eq!(req.task_definition, "arn:td:7");
        assert_eq!(req.container, "web");
    }

    #[test]
    fn test_task_ref_from_arn() {
        let task = TaskRef::from_arn("arn:aws:ecs:eu-west-1:123456789012:task/prod/0f9a8b7c").unwrap();
        assert_eq!(task.region, "eu-west-1");
        assert_eq!(task.task_id, "0f9a8b7c");
        assert_eq!(
            task.console_url("prod"),
            "https://eu-west-1.console.aws.amazon.com/ecs/home?region=eu-west-1#/clusters/prod/tasks/0f9a8b7c/details"
        );
    }

    #[test]
    fn test_task_ref_legacy_arn() {
        let task = TaskRef::from_arn("arn:aws:ecs:us-east-1:123456789012:task/abc123").unwrap();
        assert_eq!(task.task_id, "abc123");
    }

    #[test]
    fn test_task_ref_rejects_other_arns() {
        assert!(TaskRef::from_arn("arn:aws:ecs:us-east-1:1:service/prod/web").is_err());
        assert!(TaskRef::from_arn("not-an-arn").is_err());
    }

    #[test]
    fn test_log_target_for_awslogs() {
        let mut options = HashMap::new();
        options.insert("awslogs-group".to_owned(), "/ecs/app".to_owned());
        options.insert("awslogs-stream-prefix".to_owned(), "ecs".to_owned());
        let web = ContainerInfo {
            name: "web".into(),
            log: Some(LogConfig {
                driver: "awslogs".into(),
                options,
            }),
        };
        assert_eq!(
            log_target(&web, "abc"),
            Some(LogTarget {
                group: "/ecs/app".into(),
                stream: "ecs/web/abc".into()
            })
        );
    }

    #[test]
    fn test_log_target_other_driver() {
        let web = ContainerInfo {
            name: "web".into(),
            log: Some(LogConfig {
                driver: "json-file".into(),
                options: HashMap::new(),
            }),
        };
        assert_eq!(log_target(&web, "abc"), None);
        assert_eq!(log_target(&container("web"), "abc"), None);
    }
}
