/// ECS adapter.
use async_trait::async_trait;
use aws_sdk_ecs::Client;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, LaunchType, NetworkConfiguration,
    TaskOverride,
};

use crate::task::errors::TaskError;
use crate::task::service::{
    ContainerInfo, LaunchRequest, LogConfig, NetworkConfig, ServiceInfo, TaskService, TaskState,
};

/// Deployment whose settings a new task should copy.
const PRIMARY_DEPLOYMENT: &str = "PRIMARY";

/// [`TaskService`] backed by ECS.
pub struct EcsTasks {
    client: Client,
}

impl EcsTasks {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn api_error<E: std::error::Error + 'static, R: std::fmt::Debug>(
    err: &aws_sdk_ecs::error::SdkError<E, R>,
) -> TaskError {
    TaskError::Api(DisplayErrorContext(err).to_string())
}

fn network_from(config: Option<&NetworkConfiguration>) -> Option<NetworkConfig> {
    let vpc = config?.awsvpc_configuration()?;
    Some(NetworkConfig {
        subnets: vpc.subnets().to_vec(),
        security_groups: vpc.security_groups().to_vec(),
        assign_public_ip: vpc.assign_public_ip().map(|a| a.as_str().to_owned()),
    })
}

fn network_to(network: &NetworkConfig) -> Result<NetworkConfiguration, TaskError> {
    let vpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(network.subnets.clone()))
        .set_security_groups(Some(network.security_groups.clone()))
        .set_assign_public_ip(
            network
                .assign_public_ip
                .as_deref()
                .map(AssignPublicIp::from),
        )
        .build()
        .map_err(|e| TaskError::Api(e.to_string()))?;
    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(vpc)
        .build())
}

#[async_trait]
impl TaskService for EcsTasks {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ServiceInfo>, TaskError> {
        let resp = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        for failure in resp.failures() {
            tracing::debug!(arn = ?failure.arn(), reason = ?failure.reason(), "describe_services failure");
        }
        let Some(found) = resp.services().first() else {
            return Ok(None);
        };
        let Some(task_definition) = found.task_definition() else {
            return Ok(None);
        };

        // The primary deployment carries the network settings currently rolled out.
        let network = found
            .deployments()
            .iter()
            .find(|d| d.status() == Some(PRIMARY_DEPLOYMENT))
            .or_else(|| found.deployments().first())
            .and_then(|d| network_from(d.network_configuration()))
            .or_else(|| network_from(found.network_configuration()));

        Ok(Some(ServiceInfo {
            task_definition: task_definition.to_owned(),
            launch_type: found.launch_type().map(|l| l.as_str().to_owned()),
            network,
        }))
    }

    async fn containers(&self, task_definition: &str) -> Result<Vec<ContainerInfo>, TaskError> {
        let resp = self
            .client
            .describe_task_definition()
            .task_definition(task_definition)
            .send()
            .await
            .map_err(|e| api_error(&e))?;
        let Some(definition) = resp.task_definition() else {
            return Ok(Vec::new());
        };
        Ok(definition
            .container_definitions()
            .iter()
            .filter_map(|c| {
                Some(ContainerInfo {
                    name: c.name()?.to_owned(),
                    log: c.log_configuration().map(|l| LogConfig {
                        driver: l.log_driver().as_str().to_owned(),
                        options: l.options().cloned().unwrap_or_default(),
                    }),
                })
            })
            .collect())
    }

    async fn run_task(&self, request: &LaunchRequest) -> Result<String, TaskError> {
        let overrides = TaskOverride::builder()
            .container_overrides(
                ContainerOverride::builder()
                    .name(&request.container)
                    .set_command(Some(request.command.clone()))
                    .build(),
            )
            .build();
        let network = request.network.as_ref().map(network_to).transpose()?;

        let resp = self
            .client
            .run_task()
            .cluster(&request.cluster)
            .task_definition(&request.task_definition)
            .launch_type(LaunchType::from(request.launch_type.as_str()))
            .overrides(overrides)
            .set_network_configuration(network)
            .send()
            .await
            .map_err(|e| api_error(&e))?;

        if let Some(arn) = resp.tasks().first().and_then(|t| t.task_arn()) {
            return Ok(arn.to_owned());
        }
        let reasons = resp
            .failures()
            .iter()
            .map(|f| {
                format!(
                    "{} {}",
                    f.reason().unwrap_or("unknown"),
                    f.detail().unwrap_or_default()
                )
                .trim_end()
                .to_owned()
            })
            .collect();
        Err(TaskError::LaunchFailed { reasons })
    }

    async fn describe_task(
        &self,
        cluster: &str,
        task_id: &str,
    ) -> Result<Option<TaskState>, TaskError> {
        let resp = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .tasks(task_id)
            .send()
            .await
            .map_err(|e| api_error(&e))?;
        Ok(resp.tasks().first().and_then(|t| {
            Some(TaskState {
                last_status: t.last_status()?.to_owned(),
                stopped_reason: t.stopped_reason().map(str::to_owned),
            })
        }))
    }
}
