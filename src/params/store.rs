/// The remote parameter store seam.
///
/// Domain code talks to [`ParameterStore`]; the SSM adapter lives in
/// `crate::aws::ssm` and tests use the in-memory store in [`testing`].
use async_trait::async_trait;

use super::errors::StoreError;
use super::prefix::Prefix;

/// A parameter as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParameter {
    /// Fully qualified key.
    pub name: String,
    /// Stored value. Opaque ciphertext for secure parameters read without decryption.
    pub value: String,
    /// Whether the store keeps the value encrypted (`SecureString`).
    pub secure: bool,
}

/// One page of a recursive listing.
#[derive(Debug, Clone, Default)]
pub struct ParameterPage {
    /// Parameters in this page, in store order.
    pub parameters: Vec<RemoteParameter>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// A single write request.
#[derive(Debug, Clone, Copy)]
pub struct ParameterWrite<'a> {
    /// Fully qualified key.
    pub name: &'a str,
    /// New value.
    pub value: &'a str,
    /// Store as `SecureString`.
    pub secure: bool,
    /// KMS key for secure values. `None` uses the store's default key.
    pub key_id: Option<&'a str>,
    /// Replace an existing value. When false, an existing key is a conflict.
    pub overwrite: bool,
}

/// Read/write access to a hierarchical parameter namespace.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// List one page of parameters under `path`, recursively.
    async fn list_page(
        &self,
        path: &str,
        with_decryption: bool,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError>;

    /// Write one parameter.
    async fn put(&self, write: ParameterWrite<'_>) -> Result<(), StoreError>;

    /// Delete one parameter. Returns `StoreError::NotFound` if it does not exist.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// List every parameter under `prefix`, following pagination until exhausted.
///
/// # Errors
///
/// Propagates the first listing error unchanged.
pub async fn list_all(
    store: &dyn ParameterStore,
    prefix: &Prefix,
    with_decryption: bool,
) -> Result<Vec<RemoteParameter>, StoreError> {
    let mut all = Vec::new();
    let mut token = None;
    loop {
        let page = store
            .list_page(prefix.as_query_path(), with_decryption, token)
            .await?;
        tracing::debug!(count = page.parameters.len(), "listed parameter page");
        all.extend(page.parameters);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(all),
        }
    }
}
