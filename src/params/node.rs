/// Parameter trees: the nested form of a flat `/`-separated parameter namespace.
///
/// A document (YAML) and the remote store both map onto [`ParamNode`]. Sequences
/// are desugared into maps keyed by their decimal index at parse time, so every
/// walk over a tree only has to handle two shapes.
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use super::errors::ParamError;

/// Path separator of the remote namespace.
pub const PATH_SEP: char = '/';

/// Trailing marker on a leaf key that flags the value as secure (encrypted at rest).
pub const SECURE_SUFFIX: char = '!';

/// Value meaning "keep the stored secret as it is". Only meaningful on secure leaves.
pub const SECURE_MARKER: &str = "SECURE";

/// Value meaning "remove this key from the store if present".
pub const DELETE_MARKER: &str = "DELETE";

/// A node of a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamNode {
    /// A leaf value.
    Scalar(String),
    /// A namespace level. Iteration order is insertion order.
    Map(IndexMap<String, ParamNode>),
}

impl Default for ParamNode {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl ParamNode {
    /// Build a scalar node.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// The scalar value, if this node is a leaf.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Map(_) => None,
        }
    }

    /// Look up a node by path. An empty path returns `self`.
    #[must_use]
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&ParamNode> {
        let mut current = self;
        for segment in path {
            match current {
                Self::Map(children) => current = children.get(segment.as_ref())?,
                Self::Scalar(_) => return None,
            }
        }
        Some(current)
    }

    /// Number of scalar leaves below this node.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Map(children) => children.values().map(Self::leaf_count).sum(),
        }
    }

    /// Parse a YAML document into a tree.
    ///
    /// `origin` names where the document came from and is carried into errors.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::InvalidDocument` when the text is not YAML, when the
    /// root is a bare scalar, or when a leaf is `null` or a key is not a scalar.
    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self, ParamError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| ParamError::InvalidDocument {
                origin: origin.to_owned(),
                reason: e.to_string(),
            })?;
        Self::from_yaml_value(value, origin)
    }

    /// Convert an already-parsed YAML value into a tree.
    ///
    /// # Errors
    ///
    /// See [`ParamNode::from_yaml_str`].
    pub fn from_yaml_value(value: Value, origin: &str) -> Result<Self, ParamError> {
        match value {
            // An empty document is an empty namespace.
            Value::Null => Ok(Self::default()),
            Value::Mapping(_) | Value::Sequence(_) => convert(value, &mut Vec::new(), origin),
            Value::Tagged(tagged) => Self::from_yaml_value(tagged.value, origin),
            _ => Err(ParamError::InvalidDocument {
                origin: origin.to_owned(),
                reason: "the document root must be a mapping or a sequence".to_owned(),
            }),
        }
    }

    /// Render the tree as a YAML value (maps become mappings, leaves strings).
    #[must_use]
    pub fn to_yaml_value(&self) -> Value {
        match self {
            Self::Scalar(s) => Value::String(s.clone()),
            Self::Map(children) => {
                let mut mapping = Mapping::with_capacity(children.len());
                for (key, child) in children {
                    mapping.insert(Value::String(key.clone()), child.to_yaml_value());
                }
                Value::Mapping(mapping)
            }
        }
    }

    /// Serialize the tree as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::Serialize` if the emitter fails.
    pub fn to_yaml_string(&self) -> Result<String, ParamError> {
        serde_yaml::to_string(&self.to_yaml_value())
            .map_err(|e| ParamError::Serialize(e.to_string()))
    }
}

fn convert(value: Value, path: &mut Vec<String>, origin: &str) -> Result<ParamNode, ParamError> {
    match value {
        Value::Mapping(mapping) => {
            let mut children = IndexMap::with_capacity(mapping.len());
            for (key, child) in mapping {
                let key = key_to_string(key).ok_or_else(|| ParamError::InvalidDocument {
                    origin: origin.to_owned(),
                    reason: format!("non-scalar key under '{}'", display_path(path)),
                })?;
                path.push(key.clone());
                let node = convert(child, path, origin)?;
                path.pop();
                children.insert(key, node);
            }
            Ok(ParamNode::Map(children))
        }
        Value::Sequence(items) => {
            let mut children = IndexMap::with_capacity(items.len());
            for (index, child) in items.into_iter().enumerate() {
                let key = index.to_string();
                path.push(key.clone());
                let node = convert(child, path, origin)?;
                path.pop();
                children.insert(key, node);
            }
            Ok(ParamNode::Map(children))
        }
        Value::Tagged(tagged) => convert(tagged.value, path, origin),
        Value::Null => Err(ParamError::InvalidDocument {
            origin: origin.to_owned(),
            reason: format!("'{}' has no value", display_path(path)),
        }),
        scalar => scalar_to_string(&scalar)
            .map(ParamNode::Scalar)
            .ok_or_else(|| ParamError::InvalidDocument {
                origin: origin.to_owned(),
                reason: format!("'{}' is not a scalar", display_path(path)),
            }),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn key_to_string(key: Value) -> Option<String> {
    match key {
        Value::Tagged(tagged) => key_to_string(tagged.value),
        other => scalar_to_string(&other),
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_owned()
    } else {
        path.join("/")
    }
}

/// Split a leaf segment into its key and whether it carries the secure marker.
#[must_use]
pub fn split_secure(segment: &str) -> (&str, bool) {
    match segment.strip_suffix(SECURE_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (segment, false),
    }
}
