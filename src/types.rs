/// Shared serializable output types.
///
/// These types are what gets written to stdout in JSON mode. They are
/// decoupled from the internal plan types so secure values can never leak
/// through serialization.
use serde::{Deserialize, Serialize};

use crate::params::{ChangeKind, ChangePlan, ParamError, Parameter};
use crate::task::TaskError;

/// Shown instead of any secure value.
pub const REDACTED: &str = "(sensitive)";

/// One change in a displayed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntryOutput {
    /// `create`, `update` or `delete`.
    pub action: String,
    /// Fully qualified key.
    pub name: String,
    /// Whether the value is stored encrypted.
    pub secure: bool,
    /// New value (redacted for secure keys), or null for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PlanEntryOutput {
    /// Build the display form of a plan record, redacting secure values.
    #[must_use]
    pub fn from_change(change: &Parameter) -> Self {
        Self {
            action: action_name(change.kind).to_owned(),
            name: change.name.clone(),
            secure: change.secure,
            value: change.value.as_ref().map(|v| {
                if change.secure {
                    REDACTED.to_owned()
                } else {
                    v.clone()
                }
            }),
        }
    }
}

/// A whole plan in JSON form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    /// Whether this run only previews changes.
    pub dry_run: bool,
    /// Pending changes in apply order.
    pub changes: Vec<PlanEntryOutput>,
    /// Number of creates.
    pub create: usize,
    /// Number of updates.
    pub update: usize,
    /// Number of deletes.
    pub delete: usize,
    /// Leaves that already match.
    pub unchanged: usize,
}

impl PlanOutput {
    #[must_use]
    pub fn from_plan(plan: &ChangePlan, dry_run: bool) -> Self {
        Self {
            dry_run,
            changes: plan.changes.iter().map(PlanEntryOutput::from_change).collect(),
            create: plan.count(ChangeKind::Create),
            update: plan.count(ChangeKind::Update),
            delete: plan.count(ChangeKind::Delete),
            unchanged: plan.unchanged,
        }
    }
}

/// Lowercase name of a change kind.
#[must_use]
pub fn action_name(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Create => "create",
        ChangeKind::Update => "update",
        ChangeKind::Delete => "delete",
        ChangeKind::Unchanged => "unchanged",
    }
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Changes applied before the failure, for partial applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
}

impl ErrorOutput {
    /// Construct from a `ParamError`.
    #[must_use]
    pub fn from_param_error(err: &ParamError) -> Self {
        let applied = match err {
            ParamError::PartialApply { applied, .. } => Some(*applied),
            _ => None,
        };
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
                applied,
            },
        }
    }

    /// Construct from a `TaskError`.
    #[must_use]
    pub fn from_task_error(err: &TaskError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
                applied: None,
            },
        }
    }
}
