/*!
# Snapshot Trees

A [`SnapshotTree`] is a recorded accessibility tree held in memory. It
implements [`TreeProvider`], so every query that runs against a live UI can
be replayed against a snapshot, which is how the `cpath` binary, the tests
and the benchmarks exercise the engine.

Snapshots are documents of nested nodes. Every key of a node except
`children` must be a property name:

```json
{
  "ControlType": "Window",
  "Name": "Login",
  "children": [
    { "ControlType": "Edit", "AutomationId": "user" },
    { "ControlType": "Button", "Name": "OK", "IsEnabled": true }
  ]
}
```

Nodes can be marked removed with [`SnapshotTree::remove`], after which the
tree reports them as stale, the way a live provider does when a window
closes in the middle of a search.
*/
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    fmt,
    path::Path,
    str::FromStr,
};

use crate::provider::{ProviderError, TreeProvider};
use crate::query::{PropertyId, PropertyValue};

/// One node of a snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(flatten)]
    pub properties: BTreeMap<PropertyId, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl SnapshotNode {
    /// Creates a node of the given control type.
    #[must_use]
    pub fn new(control_type: impl Into<String>) -> Self {
        Self::default().with(PropertyId::CONTROL_TYPE, control_type.into())
    }

    /// Sets a property.
    #[must_use]
    pub fn with(
        mut self,
        property: impl Into<PropertyId>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        self.with(PropertyId::NAME, name.into())
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// Handle of a node inside a [`SnapshotTree`]. Handles are assigned in
/// document order, so comparing them compares positions in a pre-order walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Supported snapshot document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}

impl SnapshotFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for SnapshotFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            #[cfg(feature = "toml")]
            "toml" => Ok(Self::Toml),
            other => Err(format!("unsupported snapshot format `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    properties: BTreeMap<PropertyId, PropertyValue>,
}

/// An in-memory accessibility tree.
#[derive(Debug, Clone)]
pub struct SnapshotTree {
    entries: Vec<Entry>,
    removed: RefCell<HashSet<NodeId>>,
}

impl SnapshotTree {
    /// Flattens a node hierarchy into a tree.
    #[must_use]
    pub fn new(root: SnapshotNode) -> Self {
        let mut tree = Self {
            entries: Vec::new(),
            removed: RefCell::default(),
        };
        tree.insert(root, None);
        tree
    }

    fn insert(&mut self, node: SnapshotNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.entries.len());
        self.entries.push(Entry {
            parent,
            children: Vec::with_capacity(node.children.len()),
            properties: node.properties,
        });
        for child in node.children {
            let child_id = self.insert(child, Some(id));
            self.entries[id.0].children.push(child_id);
        }
        id
    }

    /// Parses a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or names an unknown
    /// property.
    pub fn parse(text: &str, format: SnapshotFormat) -> Result<Self> {
        let root: SnapshotNode = match format {
            SnapshotFormat::Json => {
                serde_json::from_str(text).context("Failed to parse JSON snapshot")?
            }
            #[cfg(feature = "yaml")]
            SnapshotFormat::Yaml => {
                serde_yaml::from_str(text).context("Failed to parse YAML snapshot")?
            }
            #[cfg(feature = "toml")]
            SnapshotFormat::Toml => {
                toml::from_str(text).context("Failed to parse TOML snapshot")?
            }
        };
        let tree = Self::new(root);
        log::debug!("loaded snapshot with {} nodes", tree.node_count());
        Ok(tree)
    }

    /// Reads a snapshot file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension
    /// or fails to parse.
    pub fn load(path: &Path) -> Result<Self> {
        let Some(format) = SnapshotFormat::from_path(path) else {
            bail!("Cannot tell the snapshot format of {}", path.display());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        Self::parse(&text, format)
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including removed ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Marks `node` and its whole subtree as removed.
    pub fn remove(&self, node: NodeId) {
        let mut removed = self.removed.borrow_mut();
        let mut pending = vec![node];
        while let Some(next) = pending.pop() {
            if let Some(entry) = self.entries.get(next.0) {
                removed.insert(next);
                pending.extend(entry.children.iter().copied());
            }
        }
    }

    /// Properties recorded for `node`, or `None` if it is stale.
    #[must_use]
    pub fn properties(
        &self,
        node: NodeId,
    ) -> Option<&BTreeMap<PropertyId, PropertyValue>> {
        self.entry(node).ok().map(|entry| &entry.properties)
    }

    /// The path from the root down to `node`, both included.
    #[must_use]
    pub fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(entry) = self.entries.get(id.0) else { break };
            path.push(id);
            current = entry.parent;
        }
        path.reverse();
        path
    }

    /// A short label such as `Button 'OK'` for diagnostics.
    #[must_use]
    pub fn label(&self, node: NodeId) -> String {
        let Some(properties) = self.properties(node) else {
            return format!("<stale {node}>");
        };
        let control_type = properties
            .get(&PropertyId::CONTROL_TYPE)
            .map_or_else(|| "*".to_string(), ToString::to_string);
        match properties.get(&PropertyId::NAME) {
            Some(name) => format!("{control_type} '{name}'"),
            None => control_type,
        }
    }

    fn entry(&self, node: NodeId) -> std::result::Result<&Entry, ProviderError> {
        if self.removed.borrow().contains(&node) {
            log::trace!("node {node} is stale");
            return Err(ProviderError::Stale);
        }
        self.entries.get(node.0).ok_or(ProviderError::Stale)
    }
}

impl TreeProvider for SnapshotTree {
    type Node = NodeId;

    fn parent(
        &self,
        node: &NodeId,
    ) -> std::result::Result<Option<NodeId>, ProviderError> {
        Ok(self.entry(*node)?.parent)
    }

    fn children(&self, node: &NodeId) -> std::result::Result<Vec<NodeId>, ProviderError> {
        Ok(self.entry(*node)?.children.clone())
    }

    fn property(
        &self,
        node: &NodeId,
        property: &PropertyId,
    ) -> std::result::Result<Option<PropertyValue>, ProviderError> {
        Ok(self.entry(*node)?.properties.get(property).cloned())
    }

    fn is_valid(&self, node: &NodeId) -> bool {
        self.entry(*node).is_ok()
    }
}

impl From<SnapshotNode> for SnapshotTree {
    fn from(root: SnapshotNode) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_window() -> SnapshotTree {
        SnapshotTree::new(
            SnapshotNode::new("Window")
                .named("Login")
                .child(SnapshotNode::new("Edit").with(PropertyId::AUTOMATION_ID, "user"))
                .child(
                    SnapshotNode::new("Pane")
                        .child(SnapshotNode::new("Button").named("OK")),
                ),
        )
    }

    #[test]
    fn ids_follow_document_order() {
        let tree = login_window();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.children(&tree.root()), Ok(vec![NodeId(1), NodeId(2)]));
        assert_eq!(tree.children(&NodeId(2)), Ok(vec![NodeId(3)]));
        assert_eq!(tree.parent(&NodeId(3)), Ok(Some(NodeId(2))));
        assert_eq!(tree.parent(&tree.root()), Ok(None));
    }

    #[test]
    fn properties_and_labels() {
        let tree = login_window();
        assert_eq!(
            tree.property(&NodeId(1), &PropertyId::AUTOMATION_ID),
            Ok(Some("user".into()))
        );
        assert_eq!(tree.property(&NodeId(1), &PropertyId::NAME), Ok(None));
        assert_eq!(tree.label(NodeId(3)), "Button 'OK'");
        assert_eq!(tree.label(NodeId(2)), "Pane");
    }

    #[test]
    fn removal_marks_subtree_stale() {
        let tree = login_window();
        tree.remove(NodeId(2));
        assert!(!tree.is_valid(&NodeId(2)));
        assert!(!tree.is_valid(&NodeId(3)));
        assert!(tree.is_valid(&NodeId(1)));
        assert_eq!(tree.children(&NodeId(3)), Err(ProviderError::Stale));
        assert_eq!(tree.label(NodeId(3)), "<stale #3>");
        // The parent still lists the removed child; callers check validity.
        assert_eq!(tree.children(&tree.root()), Ok(vec![NodeId(1), NodeId(2)]));
    }

    #[test]
    fn ancestry_is_root_first() {
        let tree = login_window();
        assert_eq!(tree.ancestry(NodeId(3)), vec![NodeId(0), NodeId(2), NodeId(3)]);
        assert_eq!(tree.ancestry(tree.root()), vec![NodeId(0)]);
    }

    #[test]
    fn parse_json_snapshot() {
        let text = r#"{
            "ControlType": "Window",
            "children": [
                { "ControlType": "Button", "Name": "OK", "IsEnabled": true, "ProcessId": 7 }
            ]
        }"#;
        let tree = SnapshotTree::parse(text, SnapshotFormat::Json).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(
            tree.property(&NodeId(1), &PropertyId::IS_ENABLED),
            Ok(Some(PropertyValue::Bool(true)))
        );
        assert_eq!(
            tree.property(&NodeId(1), &"ProcessId".parse().unwrap()),
            Ok(Some(PropertyValue::Int(7)))
        );
    }

    #[test]
    fn unknown_property_keys_are_rejected() {
        let text = r#"{ "ControlType": "Window", "Colour": "red" }"#;
        let err = SnapshotTree::parse(text, SnapshotFormat::Json).unwrap_err();
        assert!(format!("{err:#}").contains("Colour"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parse_yaml_snapshot() {
        let text = "ControlType: Window\n\
                    children:\n  - ControlType: Button\n    Name: OK\n";
        let tree = SnapshotTree::parse(text, SnapshotFormat::Yaml).unwrap();
        assert_eq!(tree.label(NodeId(1)), "Button 'OK'");
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parse_toml_snapshot() {
        let text = "ControlType = \"Window\"\n\n\
                    [[children]]\nControlType = \"Button\"\nName = \"OK\"\n";
        let tree = SnapshotTree::parse(text, SnapshotFormat::Toml).unwrap();
        assert_eq!(tree.label(NodeId(1)), "Button 'OK'");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("tree.JSON")),
            Some(SnapshotFormat::Json)
        );
        assert_eq!(SnapshotFormat::from_path(Path::new("tree.txt")), None);
        assert_eq!(SnapshotFormat::from_path(Path::new("tree")), None);
    }
}
