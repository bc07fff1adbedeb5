//! UI node representation with structured output
//!
//! [`UiNode`] is the boundary the host tree implements. [`Node`] is the owned,
//! serializable tree used for snapshots and fixtures. [`Element`] is a handle to
//! a node located by a query.

use serde::{Deserialize, Serialize};

/// Read-only access to one node of a host UI tree.
///
/// The query layer only ever reads through this trait and walks `children()`
/// in the order given.
pub trait UiNode {
    fn text(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn class_name(&self) -> Option<&str>;
    fn resource_id(&self) -> Option<&str>;
    fn is_visible(&self) -> bool;
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "content-desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, rename = "resource-id", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

fn default_visible() -> bool {
    true
}

impl Default for Node {
    fn default() -> Self {
        Self {
            text: None,
            description: None,
            class_name: None,
            resource_id: None,
            visible: true,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: Some(class_name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_resource_id(mut self, id: &str) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Follow a child-index path from this node
    pub fn at_path(&self, path: &[usize]) -> Option<&Node> {
        path.iter().try_fold(self, |node, &i| node.children.get(i))
    }
}

impl UiNode for Node {
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// A node located by a query, borrowed from the snapshot it was found in.
pub struct Element<'t, N> {
    node: &'t N,
    path: Vec<usize>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub path: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "resource-id", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub children_count: usize,
}

impl<'t, N: UiNode> Element<'t, N> {
    pub fn new(node: &'t N, path: Vec<usize>) -> Self {
        Self {
            node,
            path,
            index: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn raw(&self) -> &'t N {
        self.node
    }

    /// Child indices leading from the snapshot root to this node
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn text(&self) -> Option<&'t str> {
        self.node.text()
    }

    pub fn description(&self) -> Option<&'t str> {
        self.node.description()
    }

    pub fn class_name(&self) -> Option<&'t str> {
        self.node.class_name()
    }

    pub fn resource_id(&self) -> Option<&'t str> {
        self.node.resource_id()
    }

    pub fn children(&self) -> Vec<Element<'t, N>> {
        self.node
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let mut path = self.path.clone();
                path.push(i);
                Element::new(child, path)
            })
            .collect()
    }

    pub fn info(&self) -> ElementInfo {
        ElementInfo {
            path: self.path.clone(),
            index: self.index,
            class_name: self.class_name().unwrap_or("Unknown").to_string(),
            text: self.text().map(str::to_string),
            description: self.description().map(str::to_string),
            resource_id: self.resource_id().map(str::to_string),
            children_count: self.node.children().len(),
        }
    }
}

impl<N> Clone for Element<'_, N> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            path: self.path.clone(),
            index: self.index,
        }
    }
}

impl<N: UiNode> std::fmt::Debug for Element<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("path", &self.path)
            .field("class", &self.class_name())
            .field("text", &self.text())
            .field("description", &self.description())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_dump_fields() {
        let json = r#"{
            "class": "android.widget.LinearLayout",
            "content-desc": "Wi-Fi settings",
            "children": [{ "class": "android.widget.TextView", "text": "Wi-Fi", "visible": false }]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.description(), Some("Wi-Fi settings"));
        assert!(node.is_visible());
        assert!(!node.children[0].is_visible());
        assert_eq!(node.children[0].text(), Some("Wi-Fi"));
    }

    #[test]
    fn element_children_extend_path() {
        let tree = Node::new("List")
            .child(Node::new("Row"))
            .child(Node::new("Row").child(Node::new("Button").with_text("Save")));
        let root = Element::new(&tree, vec![]);
        let rows = root.children();
        let buttons = rows[1].children();
        let button = &buttons[0];
        assert_eq!(button.path(), &[1, 0]);
        assert_eq!(tree.at_path(button.path()).unwrap().text(), Some("Save"));
        assert_eq!(button.info().children_count, 0);
    }
}
