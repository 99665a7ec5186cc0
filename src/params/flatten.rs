/// Fold a flat list of remote parameters into a [`ParamNode`] tree.
use indexmap::IndexMap;

use super::errors::StoreError;
use super::node::{ParamNode, PATH_SEP, SECURE_MARKER, SECURE_SUFFIX};
use super::prefix::Prefix;
use super::store::{ParameterStore, RemoteParameter, list_all};

/// Options for tree building.
#[derive(Debug, Clone, Copy)]
pub struct TreeOptions {
    /// Values were read decrypted. When false, secure leaves read as [`SECURE_MARKER`].
    pub decrypted: bool,
    /// Append [`SECURE_SUFFIX`] to secure leaf keys.
    pub secure_suffix: bool,
}

impl TreeOptions {
    /// Options for the diff baseline of `up`: plain values, secure keys marked,
    /// so a change of parameter type is visible to the planner.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            decrypted: true,
            secure_suffix: true,
        }
    }
}

/// Build a tree from listed parameters.
///
/// Insertion order follows the order of `params`; nothing is sorted.
#[must_use]
pub fn build_tree(params: &[RemoteParameter], prefix: &Prefix, opts: TreeOptions) -> ParamNode {
    let mut root: IndexMap<String, ParamNode> = IndexMap::new();
    for param in params {
        let Some(relative) = prefix.relative(&param.name) else {
            tracing::warn!(name = %param.name, %prefix, "skipping parameter outside prefix");
            continue;
        };
        let mut segments: Vec<&str> = relative.split(PATH_SEP).collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };

        let mut key = leaf.to_owned();
        let mut value = param.value.clone();
        if param.secure {
            if opts.secure_suffix {
                key.push(SECURE_SUFFIX);
            }
            if !opts.decrypted {
                value = SECURE_MARKER.to_owned();
            }
        }
        insert(&mut root, &segments, key, value, &param.name);
    }
    ParamNode::Map(root)
}

/// Insert a leaf below `parents`, creating namespaces on the way.
///
/// A namespace always wins over a value at the same key.
fn insert(
    map: &mut IndexMap<String, ParamNode>,
    parents: &[&str],
    key: String,
    value: String,
    name: &str,
) {
    let Some((segment, rest)) = parents.split_first() else {
        if matches!(map.get(&key), Some(ParamNode::Map(_))) {
            tracing::warn!(name, "key is both a value and a namespace; keeping the namespace");
        } else {
            map.insert(key, ParamNode::Scalar(value));
        }
        return;
    };

    let slot = map
        .entry((*segment).to_owned())
        .or_insert_with(ParamNode::default);
    if let ParamNode::Scalar(_) = slot {
        tracing::warn!(name, segment = *segment, "key is both a value and a namespace; keeping the namespace");
        *slot = ParamNode::default();
    }
    if let ParamNode::Map(children) = slot {
        insert(children, rest, key, value, name);
    }
}

/// List everything under `prefix` and build the tree.
///
/// # Errors
///
/// Propagates listing errors from the store unchanged.
pub async fn read_tree(
    store: &dyn ParameterStore,
    prefix: &Prefix,
    opts: TreeOptions,
) -> Result<ParamNode, StoreError> {
    let params = list_all(store, prefix, opts.decrypted).await?;
    tracing::info!(count = params.len(), %prefix, "read parameters");
    Ok(build_tree(&params, prefix, opts))
}
