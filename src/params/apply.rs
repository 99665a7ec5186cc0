/// Plan execution against a [`ParameterStore`].
///
/// Records are applied strictly in plan order. A throttled call is retried after
/// a fixed delay until it goes through; any other failure stops the run and
/// leaves earlier records applied.
use std::time::Duration;

use super::errors::{ParamError, StoreError};
use super::plan::{ChangeKind, ChangePlan, Parameter};
use super::store::{ParameterStore, ParameterWrite};

/// Delay between attempts of a throttled call.
pub const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Progress notifications emitted while applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyEvent<'a> {
    /// About to call the store for this record.
    Started(&'a Parameter),
    /// The store throttled the call; it will be retried after the delay.
    Throttled {
        /// The record being applied.
        change: &'a Parameter,
        /// Attempts made so far.
        attempt: u32,
    },
    /// A delete found the key already gone.
    AlreadyAbsent(&'a Parameter),
    /// The record is applied.
    Finished(&'a Parameter),
}

/// Applies a [`ChangePlan`] with the stricter create/update overwrite rules.
pub struct Applier<'s> {
    store: &'s dyn ParameterStore,
    key_id: Option<String>,
    retry_delay: Duration,
}

impl<'s> Applier<'s> {
    /// Create an applier. `key_id` is the KMS key for secure writes.
    #[must_use]
    pub fn new(store: &'s dyn ParameterStore, key_id: Option<String>) -> Self {
        Self {
            store,
            key_id,
            retry_delay: RATE_LIMIT_RETRY_DELAY,
        }
    }

    /// Override the throttling retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Apply every record in order, reporting progress through `report`.
    ///
    /// Returns the number of applied records.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::PartialApply` wrapping the first non-retryable
    /// failure. A create that finds the key already present is reported as
    /// `ParamError::Conflict` inside it.
    pub async fn apply(
        &self,
        plan: &ChangePlan,
        report: &mut dyn FnMut(ApplyEvent<'_>),
    ) -> Result<usize, ParamError> {
        let total = plan.changes.len();
        for (applied, change) in plan.changes.iter().enumerate() {
            report(ApplyEvent::Started(change));
            if let Err(err) = self.apply_one(change, report).await {
                return Err(ParamError::PartialApply {
                    applied,
                    total,
                    source: Box::new(err),
                });
            }
            report(ApplyEvent::Finished(change));
        }
        Ok(total)
    }

    async fn apply_one(
        &self,
        change: &Parameter,
        report: &mut dyn FnMut(ApplyEvent<'_>),
    ) -> Result<(), ParamError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.call(change).await {
                Ok(()) => return Ok(()),
                Err(StoreError::RateLimited(reason)) => {
                    tracing::debug!(name = %change.name, attempt, %reason, "throttled, retrying");
                    report(ApplyEvent::Throttled { change, attempt });
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(StoreError::NotFound { name }) if change.kind == ChangeKind::Delete => {
                    tracing::info!(%name, "parameter already absent");
                    report(ApplyEvent::AlreadyAbsent(change));
                    return Ok(());
                }
                Err(StoreError::AlreadyExists { name }) if change.kind == ChangeKind::Create => {
                    return Err(ParamError::Conflict { name });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn call(&self, change: &Parameter) -> Result<(), StoreError> {
        match (change.kind, change.value.as_deref()) {
            (ChangeKind::Delete, _) => self.store.delete(&change.name).await,
            (ChangeKind::Create | ChangeKind::Update, Some(value)) => {
                let write = ParameterWrite {
                    name: &change.name,
                    value,
                    secure: change.secure,
                    key_id: if change.secure {
                        self.key_id.as_deref()
                    } else {
                        None
                    },
                    overwrite: change.kind == ChangeKind::Update,
                };
                self.store.put(write).await
            }
            (ChangeKind::Unchanged, _) | (_, None) => Ok(()),
        }
    }
}
