/// SSM Parameter Store adapter.
use async_trait::async_trait;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::ParameterType;

use crate::params::errors::StoreError;
use crate::params::store::{ParameterPage, ParameterStore, ParameterWrite, RemoteParameter};

/// Error codes the store uses for throttling.
const THROTTLE_CODES: [&str; 3] = ["TooManyUpdates", "ThrottlingException", "Throttling"];

/// [`ParameterStore`] backed by SSM.
pub struct SsmStore {
    client: Client,
}

impl SsmStore {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmStore {
    async fn list_page(
        &self,
        path: &str,
        with_decryption: bool,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError> {
        let resp = self
            .client
            .get_parameters_by_path()
            .path(path)
            .recursive(true)
            .with_decryption(with_decryption)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| classify(&e, path))?;

        let parameters = resp
            .parameters()
            .iter()
            .filter_map(|p| {
                Some(RemoteParameter {
                    name: p.name()?.to_owned(),
                    value: p.value().unwrap_or_default().to_owned(),
                    secure: p.r#type() == Some(&ParameterType::SecureString),
                })
            })
            .collect();
        Ok(ParameterPage {
            parameters,
            next_token: resp.next_token().map(str::to_owned),
        })
    }

    async fn put(&self, write: ParameterWrite<'_>) -> Result<(), StoreError> {
        let kind = if write.secure {
            ParameterType::SecureString
        } else {
            ParameterType::String
        };
        self.client
            .put_parameter()
            .name(write.name)
            .value(write.value)
            .r#type(kind)
            .set_key_id(write.key_id.map(str::to_owned))
            .overwrite(write.overwrite)
            .send()
            .await
            .map_err(|e| classify(&e, write.name))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.client
            .delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| classify(&e, name))?;
        Ok(())
    }
}

/// Map an SDK error onto the store error kinds by its AWS error code.
fn classify<E, R>(err: &SdkError<E, R>, name: &str) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    store_error(err.code(), name, || DisplayErrorContext(err).to_string())
}

fn store_error(code: Option<&str>, name: &str, message: impl FnOnce() -> String) -> StoreError {
    match code {
        Some("ParameterNotFound") => StoreError::NotFound {
            name: name.to_owned(),
        },
        Some("ParameterAlreadyExists") => StoreError::AlreadyExists {
            name: name.to_owned(),
        },
        Some(code) if THROTTLE_CODES.contains(&code) => StoreError::RateLimited(message()),
        _ => StoreError::Api(message()),
    }
}
