/// Parameter sync layer: tree building, diffing, planning and applying.
pub mod apply;
pub mod confirm;
pub mod errors;
pub mod flatten;
pub mod node;
pub mod plan;
pub mod prefix;
pub mod store;

pub use apply::{ApplyEvent, Applier};
pub use confirm::{Approval, DocumentSource, Prompt, TtyPrompt, gate};
pub use errors::{ParamError, StoreError};
pub use flatten::{TreeOptions, build_tree, read_tree};
pub use node::{DELETE_MARKER, ParamNode, SECURE_MARKER};
pub use plan::{ChangeKind, ChangePlan, Parameter, build_plan};
pub use prefix::Prefix;
pub use store::{ParameterStore, ParameterWrite, RemoteParameter};
