/// CloudWatch Logs adapter.
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata};

use crate::task::errors::TaskError;
use crate::task::service::{LogEvent, LogPage, LogSource};

/// Error code returned while the stream has not been created yet.
const STREAM_MISSING: &str = "ResourceNotFoundException";

/// [`LogSource`] backed by CloudWatch Logs.
pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl LogSource for CloudWatchLogs {
    async fn fetch(
        &self,
        group: &str,
        stream: &str,
        token: Option<String>,
    ) -> Result<Option<LogPage>, TaskError> {
        let result = self
            .client
            .get_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .start_from_head(true)
            .set_next_token(token)
            .send()
            .await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) if err.code() == Some(STREAM_MISSING) => return Ok(None),
            Err(err) => return Err(TaskError::Api(DisplayErrorContext(&err).to_string())),
        };
        let events = resp
            .events()
            .iter()
            .map(|e| LogEvent {
                timestamp_ms: e.timestamp().unwrap_or_default(),
                message: e.message().unwrap_or_default().to_owned(),
            })
            .collect();
        Ok(Some(LogPage {
            events,
            next_forward_token: resp.next_forward_token().map(str::to_owned),
        }))
    }
}
