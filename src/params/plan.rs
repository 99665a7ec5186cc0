/// Change planning: diff a desired tree against the observed one.
///
/// The plan is pure data. It is built once, shown to the user, and executed at
/// most once by [`Applier`](super::apply::Applier).
use serde::Serialize;

use super::node::{DELETE_MARKER, ParamNode, SECURE_MARKER, SECURE_SUFFIX, split_secure};
use super::prefix::Prefix;

/// What a plan record does to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Key is absent remotely and will be written.
    Create,
    /// Key exists with a different value and will be overwritten.
    Update,
    /// Key exists and the document asks for its removal.
    Delete,
    /// Key already holds the desired value. Counted, never applied.
    Unchanged,
}

/// A leaf change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Fully qualified remote key (secure marker stripped).
    pub name: String,
    /// New value. `None` for deletes.
    pub value: Option<String>,
    /// Store as `SecureString`.
    pub secure: bool,
    /// Change kind.
    pub kind: ChangeKind,
}

/// Ordered list of pending changes, in the desired tree's depth-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePlan {
    /// Create, update and delete records.
    pub changes: Vec<Parameter>,
    /// Leaves that already match.
    pub unchanged: usize,
}

impl ChangePlan {
    /// True when nothing would be written or deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of records of the given kind.
    #[must_use]
    pub fn count(&self, kind: ChangeKind) -> usize {
        if kind == ChangeKind::Unchanged {
            return self.unchanged;
        }
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// One-line summary, e.g. `Plan: 1 to create, 0 to update, 2 to delete, 4 unchanged.`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Plan: {} to create, {} to update, {} to delete, {} unchanged.",
            self.count(ChangeKind::Create),
            self.count(ChangeKind::Update),
            self.count(ChangeKind::Delete),
            self.unchanged,
        )
    }
}

/// Diff `desired` against `observed`.
///
/// `observed` must be a baseline tree: read decrypted, with secure leaves keyed
/// `name!`. A desired `password!` or `password` is matched against either form,
/// and a differing secure flag is an update even when the value is the same.
#[must_use]
pub fn build_plan(desired: &ParamNode, observed: &ParamNode, prefix: &Prefix) -> ChangePlan {
    let mut plan = ChangePlan::default();
    let mut path = Vec::new();
    walk(desired, observed, prefix, &mut path, &mut plan);
    plan
}

fn walk(
    node: &ParamNode,
    observed: &ParamNode,
    prefix: &Prefix,
    path: &mut Vec<String>,
    plan: &mut ChangePlan,
) {
    match node {
        ParamNode::Map(children) => {
            for (key, child) in children {
                path.push(key.clone());
                walk(child, observed, prefix, path, plan);
                path.pop();
            }
        }
        ParamNode::Scalar(value) => {
            if let Some(record) = evaluate_leaf(value, observed, prefix, path) {
                if record.kind == ChangeKind::Unchanged {
                    plan.unchanged += 1;
                } else {
                    plan.changes.push(record);
                }
            }
        }
    }
}

/// Evaluate one leaf. `None` means the leaf produces no record at all
/// (kept secret, or delete of an absent key).
fn evaluate_leaf(
    value: &str,
    observed: &ParamNode,
    prefix: &Prefix,
    path: &[String],
) -> Option<Parameter> {
    let (last, parents) = path.split_last()?;
    let (leaf, secure) = split_secure(last);

    // SECURE is reserved on every leaf: it never becomes a stored value.
    if value == SECURE_MARKER {
        return None;
    }

    let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
    let mut lookup = parents.clone();
    lookup.push(leaf);
    let name = prefix.key_for(&lookup);
    let current = observed_leaf(observed, &parents, leaf);

    if value == DELETE_MARKER {
        return current.map(|(_, was_secure)| Parameter {
            name,
            value: None,
            secure: was_secure,
            kind: ChangeKind::Delete,
        });
    }

    let kind = match current {
        Some((old, was_secure)) if old == value && was_secure == secure => ChangeKind::Unchanged,
        Some(_) => ChangeKind::Update,
        None => ChangeKind::Create,
    };
    Some(Parameter {
        name,
        value: Some(value.to_owned()),
        secure,
        kind,
    })
}

/// The observed value of `leaf` under `parents` and whether it is secure.
fn observed_leaf<'a>(observed: &'a ParamNode, parents: &[&str], leaf: &str) -> Option<(&'a str, bool)> {
    let namespace = observed.get_path(parents)?;
    let secure_key = format!("{leaf}{SECURE_SUFFIX}");
    if let Some(value) = namespace.get_path(&[secure_key.as_str()]).and_then(ParamNode::as_scalar) {
        return Some((value, true));
    }
    namespace
        .get_path(&[leaf])
        .and_then(ParamNode::as_scalar)
        .map(|value| (value, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(yaml: &str) -> ParamNode {
        ParamNode::from_yaml_str(yaml, "test").unwrap()
    }

    fn prefix() -> Prefix {
        Prefix::new("app").unwrap()
    }

    fn summary(plan: &ChangePlan) -> Vec<(ChangeKind, &str)> {
        plan.changes.iter().map(|c| (c.kind, c.name.as_str())).collect()
    }

    #[test]
    fn test_plan_order_follows_desired_tree() {
        let desired = tree("a:\n  x: '1'\n  y: '2'\nb: '3'\n");
        let plan = build_plan(&desired, &ParamNode::default(), &prefix());
        assert_eq!(
            summary(&plan),
            [
                (ChangeKind::Create, "/app/a/x"),
                (ChangeKind::Create, "/app/a/y"),
                (ChangeKind::Create, "/app/b"),
            ]
        );
    }

    #[test]
    fn test_sequence_elements_in_index_order() {
        let desired = tree("hosts: [one, two, three]\n");
        let plan = build_plan(&desired, &ParamNode::default(), &prefix());
        assert_eq!(
            summary(&plan),
            [
                (ChangeKind::Create, "/app/hosts/0"),
                (ChangeKind::Create, "/app/hosts/1"),
                (ChangeKind::Create, "/app/hosts/2"),
            ]
        );
    }

    #[test]
    fn test_diff_against_self_is_empty() {
        let t = tree("a:\n  x: '1'\n  list: [p, q]\nb: hello\n");
        let plan = build_plan(&t, &t, &prefix());
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 4);
    }

    #[test]
    fn test_update_when_value_differs() {
        let plan = build_plan(&tree("a: new\n"), &tree("a: old\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Update, "/app/a")]);
        assert_eq!(plan.changes[0].value.as_deref(), Some("new"));
    }

    #[test]
    fn test_numbers_compare_by_string_form() {
        let plan = build_plan(&tree("port: 5432\n"), &tree("port: '5432'\n"), &prefix());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_secure_marker_is_never_planned() {
        let desired = tree("db_password!: SECURE\n");
        let observed = tree("db_password!: actual-secret\n");
        let plan = build_plan(&desired, &observed, &prefix());
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 0);
    }

    #[test]
    fn test_secure_marker_without_existing_value_is_skipped() {
        let plan = build_plan(&tree("token!: SECURE\n"), &ParamNode::default(), &prefix());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_secure_marker_on_bare_key_keeps_stored_secret() {
        // What `down --no-secure-suffix` writes for an undecrypted secret.
        let plan = build_plan(&tree("pw: SECURE\n"), &tree("pw!: hunter2\n"), &prefix());
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 0);
    }

    #[test]
    fn test_secure_marker_is_never_written_as_a_value() {
        let plan = build_plan(&tree("mode: SECURE\n"), &ParamNode::default(), &prefix());
        assert!(plan.is_empty());
        let plan = build_plan(&tree("mode: SECURE\n"), &tree("mode: plain\n"), &prefix());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_secure_leaf_strips_suffix_and_compares_bare_key() {
        let desired = tree("db:\n  password!: rotated\n");
        let observed = tree("db:\n  password!: original\n");
        let plan = build_plan(&desired, &observed, &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Update, "/app/db/password")]);
        assert!(plan.changes[0].secure);
    }

    #[test]
    fn test_secure_leaf_unchanged_when_decrypted_value_matches() {
        let plan = build_plan(&tree("password!: same\n"), &tree("password!: same\n"), &prefix());
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_plain_to_secure_with_same_value_is_an_update() {
        let plan = build_plan(&tree("pw!: hunter2\n"), &tree("pw: hunter2\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Update, "/app/pw")]);
        assert!(plan.changes[0].secure);
        assert_eq!(plan.changes[0].value.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_secure_to_plain_with_same_value_is_an_update() {
        let plan = build_plan(&tree("pw: hunter2\n"), &tree("pw!: hunter2\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Update, "/app/pw")]);
        assert!(!plan.changes[0].secure);
    }

    #[test]
    fn test_delete_only_when_present() {
        let desired = tree("gone: DELETE\nnever_existed: DELETE\n");
        let observed = tree("gone: value\n");
        let plan = build_plan(&desired, &observed, &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Delete, "/app/gone")]);
        assert_eq!(plan.changes[0].value, None);
    }

    #[test]
    fn test_delete_secure_leaf() {
        let plan = build_plan(&tree("key!: DELETE\n"), &tree("key!: x\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Delete, "/app/key")]);
        assert!(plan.changes[0].secure);
        let plan = build_plan(&tree("key: DELETE\n"), &tree("key!: x\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Delete, "/app/key")]);
    }

    #[test]
    fn test_observed_namespace_at_leaf_counts_as_absent() {
        let plan = build_plan(&tree("db: x\n"), &tree("db:\n  host: h\n"), &prefix());
        assert_eq!(summary(&plan), [(ChangeKind::Create, "/app/db")]);
    }

    #[test]
    fn test_summary_line() {
        let desired = tree("a: '1'\nb: changed\nc: DELETE\nd: same\n");
        let observed = tree("b: old\nc: x\nd: same\n");
        let plan = build_plan(&desired, &observed, &prefix());
        assert_eq!(
            plan.summary(),
            "Plan: 1 to create, 1 to update, 1 to delete, 1 unchanged."
        );
    }
}
