//! Snapshot - a timestamped, read-only copy of a host UI tree
//!
//! Every query runs against the snapshot it is handed. A snapshot never
//! refreshes itself: when the host UI changes, take a new one and query again.

use crate::error::{Error, Result};
use crate::node::{Node, UiNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub root: Node,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub index: usize,
    pub path: Vec<usize>,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "resource-id", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub visible: bool,
    pub depth: usize,
    pub children_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResult {
    pub captured_at: DateTime<Utc>,
    pub element_count: usize,
    pub nodes: Vec<TreeNode>,
}

impl Snapshot {
    pub fn new(root: Node) -> Self {
        Self {
            captured_at: Utc::now(),
            source: None,
            root,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.captured_at)
    }

    /// Accepts the full envelope or a bare hierarchy dump (a node object)
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("root").is_some() {
            Ok(serde_json::from_value(value)?)
        } else if value.is_object() {
            Ok(Self::new(serde_json::from_value(value)?))
        } else {
            Err(Error::snapshot_invalid("expected a snapshot or node object"))
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            Error::from(e).with_context(serde_json::json!({ "path": path.display().to_string() }))
        })?;
        let snapshot = Self::from_json(&json)?;
        Ok(match snapshot.source {
            Some(_) => snapshot,
            None => snapshot.with_source(&path.display().to_string()),
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Flat pre-order outline of the tree, hidden nodes included
    pub fn tree(&self, max_depth: usize) -> TreeResult {
        let mut nodes = Vec::new();
        let mut path = Vec::new();
        build_tree(&self.root, &mut path, max_depth, &mut nodes);

        TreeResult {
            captured_at: self.captured_at,
            element_count: nodes.len(),
            nodes,
        }
    }
}

fn build_tree(node: &Node, path: &mut Vec<usize>, max_depth: usize, nodes: &mut Vec<TreeNode>) {
    if path.len() > max_depth {
        return;
    }

    nodes.push(TreeNode {
        index: nodes.len(),
        path: path.clone(),
        class_name: node.class_name().unwrap_or("Unknown").to_string(),
        text: node.text().map(truncate),
        description: node.description().map(truncate),
        resource_id: node.resource_id().map(str::to_string),
        visible: node.is_visible(),
        depth: path.len(),
        children_count: node.children.len(),
    });

    for (i, child) in node.children.iter().enumerate() {
        path.push(i);
        build_tree(child, path, max_depth, nodes);
        path.pop();
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() > 100 {
        format!("{}...", s.chars().take(100).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn bare_node_becomes_snapshot() {
        let snapshot = Snapshot::from_json(r#"{"class": "ListView", "children": [{"class": "Row"}]}"#)
            .unwrap();
        assert_eq!(snapshot.root().class_name(), Some("ListView"));
        assert_eq!(snapshot.root().children.len(), 1);
    }

    #[test]
    fn full_envelope_keeps_metadata() {
        let json = r#"{
            "captured_at": "2024-05-01T10:00:00Z",
            "source": "settings",
            "root": {"class": "Frame"}
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.source.as_deref(), Some("settings"));
        assert_eq!(snapshot.captured_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert!(snapshot.age() > chrono::Duration::zero());
    }

    #[test]
    fn garbage_is_snapshot_invalid() {
        let err = Snapshot::from_json("[1, 2, 3]").unwrap_err();
        assert_eq!(err.code, ErrorCode::SnapshotInvalid);
    }

    #[test]
    fn tree_outline_respects_depth() {
        let root = Node::new("Frame").child(
            Node::new("ListView").child(Node::new("Row").hidden().child(Node::new("TextView"))),
        );
        let snapshot = Snapshot::new(root);

        let full = snapshot.tree(10);
        assert_eq!(full.element_count, 4);
        assert_eq!(full.nodes[2].path, vec![0, 0]);
        assert!(!full.nodes[2].visible);

        assert_eq!(snapshot.tree(1).element_count, 2);
    }

    #[test]
    fn json_round_trip_preserves_tree() {
        let snapshot = Snapshot::new(Node::new("Frame").child(Node::new("Button").with_text("Save")));
        let back = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }
}
