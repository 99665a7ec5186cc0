/// AWS adapters for the domain traits.
///
/// Each adapter is a thin wrapper around one SDK client; all behavior lives in
/// `params` and `task`. Errors are classified by their AWS error code so the
/// domain layer never sees SDK types.
pub mod ecs;
pub mod logs;
pub mod ssm;

use aws_config::{BehaviorVersion, Region, SdkConfig};

pub use ecs::EcsTasks;
pub use logs::CloudWatchLogs;
pub use ssm::SsmStore;

/// Load shared SDK configuration, pinning the region when one is given.
pub async fn load_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_owned()));
    }
    let config = loader.load().await;
    tracing::debug!(region = ?config.region(), "loaded AWS config");
    config
}

/// The region the SDK resolved, for display.
#[must_use]
pub fn region_name(config: &SdkConfig) -> String {
    config
        .region()
        .map_or_else(|| "<none>".to_owned(), ToString::to_string)
}
