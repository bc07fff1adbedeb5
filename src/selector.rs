//! Selector parsing and matching for UI nodes
//!
//! Syntax:
//!
//! ```text
//!   text:Save                      - exact text match
//!   text~:Sav                      - text contains
//!   text^:Sa                       - text starts with
//!   desc~:Wi-Fi                    - description contains
//!   class:android.widget.ListView  - exact class match
//!   id:com.example:id/row          - exact resource id match
//!   instance:2                     - third match in traversal order
//!   class:Row AND desc~:Wi-Fi      - compound selector
//!   class:List >> class:Row        - Row nodes inside the first List
//!   *                              - any visible node
//! ```
//!
//! Values are taken verbatim up to the next ` AND ` or ` >> `; there is no
//! quoting, so a value containing either separator can only be built with the
//! builder methods, and its `Display` form does not parse back.
//!
//! Selectors are values. Every builder method consumes `self` and hands back a
//! new selector, so a clone held elsewhere never changes underneath its owner.
//!
//! The `with_*` builders take values as given. An empty value never matches
//! anything; [`Selector::try_with_condition`] rejects it up front the way
//! `parse` does.

use crate::error::{Error, Result};
use crate::node::UiNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Box<Selector>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub attr: Attribute,
    pub op: MatchOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Text,
    Description,
    ClassName,
    ResourceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOp {
    Equals,
    Contains,
    StartsWith,
}

impl Attribute {
    pub fn read<N: UiNode>(self, node: &N) -> Option<&str> {
        match self {
            Attribute::Text => node.text(),
            Attribute::Description => node.description(),
            Attribute::ClassName => node.class_name(),
            Attribute::ResourceId => node.resource_id(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::Description => "description",
            Attribute::ClassName => "class",
            Attribute::ResourceId => "resource-id",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::Description => "desc",
            Attribute::ClassName => "class",
            Attribute::ResourceId => "id",
        }
    }
}

impl MatchOp {
    /// Case-sensitive comparison of a node attribute against an expected value
    pub fn apply(self, actual: &str, expected: &str) -> bool {
        match self {
            MatchOp::Equals => actual == expected,
            MatchOp::Contains => actual.contains(expected),
            MatchOp::StartsWith => actual.starts_with(expected),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MatchOp::Equals => ":",
            MatchOp::Contains => "~:",
            MatchOp::StartsWith => "^:",
        }
    }
}

impl Selector {
    /// Matches every visible node
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::selector_invalid(s, "empty selector"));
        }

        let mut chain: Option<Selector> = None;
        for segment in s.split(" >> ") {
            let selector = Self::parse_segment(s, segment.trim())?;
            chain = Some(match chain {
                Some(ancestor) => selector.child_of(ancestor),
                None => selector,
            });
        }

        chain.ok_or_else(|| Error::selector_invalid(s, "empty selector"))
    }

    fn parse_segment(full: &str, segment: &str) -> Result<Self> {
        if segment.is_empty() {
            return Err(Error::selector_invalid(full, "empty segment around '>>'"));
        }
        if segment == "*" {
            return Ok(Self::new());
        }

        let mut selector = Self::new();
        for term in segment.split(" AND ") {
            let term = term.trim();
            if let Some(raw) = term.strip_prefix("instance:") {
                if selector.instance.is_some() {
                    return Err(Error::selector_invalid(full, "instance given more than once"));
                }
                let instance: i64 = raw.trim().parse().map_err(|_| {
                    Error::selector_invalid(full, &format!("instance '{}' is not an integer", raw))
                })?;
                selector = selector
                    .try_instance(instance)
                    .map_err(|_| Error::selector_invalid(full, "instance must be non-negative"))?;
            } else {
                selector.conditions.push(Condition::parse(term)?);
            }
        }

        Ok(selector)
    }

    pub fn text(text: &str) -> Self {
        Self::new().with_text(text)
    }

    pub fn text_contains(text: &str) -> Self {
        Self::new().with_text_contains(text)
    }

    pub fn description(desc: &str) -> Self {
        Self::new().with_description(desc)
    }

    pub fn description_contains(desc: &str) -> Self {
        Self::new().with_description_contains(desc)
    }

    pub fn class_name(class_name: &str) -> Self {
        Self::new().with_class_name(class_name)
    }

    pub fn resource_id(id: &str) -> Self {
        Self::new().with_resource_id(id)
    }

    pub fn with_condition(mut self, attr: Attribute, op: MatchOp, value: &str) -> Self {
        self.conditions.push(Condition {
            attr,
            op,
            value: value.to_string(),
        });
        self
    }

    /// Like [`Selector::with_condition`], failing with `InvalidSelector` on an
    /// empty value
    pub fn try_with_condition(
        mut self,
        attr: Attribute,
        op: MatchOp,
        value: &str,
    ) -> Result<Self> {
        self.conditions.push(Condition::new(attr, op, value)?);
        Ok(self)
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_condition(Attribute::Text, MatchOp::Equals, text)
    }

    pub fn with_text_contains(self, text: &str) -> Self {
        self.with_condition(Attribute::Text, MatchOp::Contains, text)
    }

    pub fn with_text_starts_with(self, text: &str) -> Self {
        self.with_condition(Attribute::Text, MatchOp::StartsWith, text)
    }

    pub fn with_description(self, desc: &str) -> Self {
        self.with_condition(Attribute::Description, MatchOp::Equals, desc)
    }

    pub fn with_description_contains(self, desc: &str) -> Self {
        self.with_condition(Attribute::Description, MatchOp::Contains, desc)
    }

    pub fn with_description_starts_with(self, desc: &str) -> Self {
        self.with_condition(Attribute::Description, MatchOp::StartsWith, desc)
    }

    pub fn with_class_name(self, class_name: &str) -> Self {
        self.with_condition(Attribute::ClassName, MatchOp::Equals, class_name)
    }

    pub fn with_resource_id(self, id: &str) -> Self {
        self.with_condition(Attribute::ResourceId, MatchOp::Equals, id)
    }

    pub fn instance(mut self, instance: usize) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Like [`Selector::instance`] for indices arriving as signed integers
    pub fn try_instance(self, instance: i64) -> Result<Self> {
        let index = usize::try_from(instance).map_err(|_| {
            Error::selector_invalid(
                &self.to_string(),
                &format!("instance must be non-negative, got {}", instance),
            )
        })?;
        Ok(self.instance(index))
    }

    /// Restrict matches to descendants of `ancestor`.
    ///
    /// When this selector already has an ancestor chain, `ancestor` goes on
    /// top of it.
    pub fn child_of(mut self, ancestor: Selector) -> Self {
        self.parent = Some(Box::new(match self.parent.take() {
            Some(parent) => parent.child_of(ancestor),
            None => ancestor,
        }));
        self
    }

    /// Both selectors' conditions on one node.
    ///
    /// `other`'s instance wins when set. Its ancestor chain goes on top of
    /// this selector's chain, as with [`Selector::child_of`].
    pub fn and(mut self, other: Selector) -> Self {
        self.conditions.extend(other.conditions);
        if other.instance.is_some() {
            self.instance = other.instance;
        }
        match other.parent {
            Some(parent) => self.child_of(*parent),
            None => self,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn instance_index(&self) -> Option<usize> {
        self.instance
    }

    pub fn parent(&self) -> Option<&Selector> {
        self.parent.as_deref()
    }

    /// Whether `node` satisfies every attribute condition.
    ///
    /// Structure (parent chain) and instance are resolved by the query layer.
    pub fn matches<N: UiNode>(&self, node: &N) -> bool {
        self.conditions.iter().all(|c| c.matches(node))
    }

    fn fmt_segment(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        if let Some(instance) = self.instance {
            parts.push(format!("instance:{}", instance));
        }
        if parts.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", parts.join(" AND "))
        }
    }
}

impl Condition {
    pub fn new(attr: Attribute, op: MatchOp, value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::selector_invalid(
                &format!("{}{}", attr.keyword(), op.symbol()),
                "empty value",
            ));
        }
        Ok(Self {
            attr,
            op,
            value: value.to_string(),
        })
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (attr_str, rest) = s.split_once(':').ok_or_else(|| {
            Error::selector_invalid(s, "expected format 'attr:value', 'attr~:value' or 'attr^:value'")
        })?;

        let (attr, op) = if let Some(attr) = attr_str.strip_suffix('~') {
            (attr, MatchOp::Contains)
        } else if let Some(attr) = attr_str.strip_suffix('^') {
            (attr, MatchOp::StartsWith)
        } else {
            (attr_str, MatchOp::Equals)
        };

        let attr = match attr.to_lowercase().as_str() {
            "text" => Attribute::Text,
            "desc" | "description" => Attribute::Description,
            "class" | "classname" => Attribute::ClassName,
            "id" | "resource-id" | "resourceid" => Attribute::ResourceId,
            _ => {
                return Err(Error::selector_invalid(
                    s,
                    &format!("unknown attribute '{}'", attr),
                ))
            }
        };

        Self::new(attr, op, rest).map_err(|_| Error::selector_invalid(s, "empty value"))
    }

    /// Missing or empty attributes never match, nor does an empty value
    pub fn matches<N: UiNode>(&self, node: &N) -> bool {
        if self.value.is_empty() {
            return false;
        }
        match self.attr.read(node) {
            Some(actual) if !actual.is_empty() => self.op.apply(actual, &self.value),
            _ => false,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} >> ", parent)?;
        }
        self.fmt_segment(f)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.attr.keyword(), self.op.symbol(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::node::Node;
    use crate::query::{Executor, QueryEngine};

    #[test]
    fn parse_simple() {
        let s = Selector::parse("class:android.widget.ListView").unwrap();
        assert_eq!(s.conditions().len(), 1);
        assert_eq!(s.conditions()[0].attr, Attribute::ClassName);
        assert_eq!(s.conditions()[0].value, "android.widget.ListView");
    }

    #[test]
    fn parse_ops() {
        let s = Selector::parse("desc~:Wi-Fi AND text^:Sa").unwrap();
        assert_eq!(s.conditions()[0].op, MatchOp::Contains);
        assert_eq!(s.conditions()[1].op, MatchOp::StartsWith);
    }

    #[test]
    fn parse_resource_id_keeps_colons() {
        let s = Selector::parse("id:com.example:id/row").unwrap();
        assert_eq!(s.conditions()[0].value, "com.example:id/row");
    }

    #[test]
    fn parse_chain_and_instance() {
        let s = Selector::parse("class:List >> class:Row AND instance:2").unwrap();
        assert_eq!(s.instance_index(), Some(2));
        assert_eq!(s.parent().unwrap().to_string(), "class:List");
        assert_eq!(s.to_string(), "class:List >> class:Row AND instance:2");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "instance:-1", "instance:two", "color:red", "text:", "a >>  >> b", "Save"] {
            let err = Selector::parse(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidSelector, "input: {:?}", bad);
        }
    }

    #[test]
    fn negative_instance_fails_at_construction() {
        let err = Selector::class_name("Row").try_instance(-1).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSelector);
        assert_eq!(
            Selector::class_name("Row").try_instance(3).unwrap().instance_index(),
            Some(3)
        );
    }

    #[test]
    fn builders_leave_clones_untouched() {
        let base = Selector::class_name("Row");
        let narrowed = base.clone().with_text("Save").instance(1);
        assert_eq!(base.conditions().len(), 1);
        assert_eq!(base.instance_index(), None);
        assert_eq!(narrowed.conditions().len(), 2);
    }

    #[test]
    fn child_of_stacks_ancestors_on_top() {
        let s = Selector::class_name("Button")
            .child_of(Selector::class_name("Row"))
            .child_of(Selector::class_name("List"));
        assert_eq!(s.to_string(), "class:List >> class:Row >> class:Button");
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let node = Node::new("Button").with_text("Save all");
        assert!(!Selector::text("Save").matches(&node));
        assert!(Selector::text_contains("Save").matches(&node));
        assert!(!Selector::text_contains("save").matches(&node));
        assert!(Selector::new().with_text_starts_with("Save").matches(&node));
    }

    #[test]
    fn empty_attributes_never_match() {
        let node = Node::new("Row").with_description("");
        assert!(!Selector::description_contains("W").matches(&node));
        assert!(!Selector::text("Save").matches(&node));
        assert!(Selector::new().matches(&node));
    }

    #[test]
    fn and_keeps_the_other_ancestor_chain() {
        let tree = Node::new("Frame").with_children([
            Node::new("ListView").with_children([
                Node::new("Row").with_text("Inside"),
                Node::new("Row").with_text("Aside"),
            ]),
            Node::new("Row").with_text("Outside"),
        ]);
        let scoped = Selector::class_name("Row")
            .and(Selector::text_contains("side").child_of(Selector::class_name("ListView")));
        assert_eq!(scoped.to_string(), "class:ListView >> class:Row AND text~:side");

        let exec = Executor::new();
        assert_eq!(exec.count(&tree, &scoped).unwrap(), 2);

        let unscoped = Selector::class_name("Row").and(Selector::text_contains("side"));
        assert_eq!(exec.count(&tree, &unscoped).unwrap(), 3);
    }

    #[test]
    fn and_stacks_chains_from_both_sides() {
        let s = Selector::class_name("Row")
            .child_of(Selector::class_name("ListView"))
            .and(Selector::text("Save").child_of(Selector::class_name("Frame")).instance(1));
        assert_eq!(
            s.to_string(),
            "class:Frame >> class:ListView >> class:Row AND text:Save AND instance:1"
        );
    }

    #[test]
    fn empty_values_rejected_or_inert() {
        let err = Selector::new()
            .try_with_condition(Attribute::Text, MatchOp::Contains, "")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSelector);
        assert_eq!(
            Selector::parse("text~:").unwrap_err().code,
            ErrorCode::InvalidSelector
        );

        let node = Node::new("Button").with_text("Save");
        assert!(!Selector::text_contains("").matches(&node));
        assert!(!Selector::new().with_description_starts_with("").matches(&node));
        assert!(Selector::new()
            .try_with_condition(Attribute::Text, MatchOp::Contains, "Sa")
            .unwrap()
            .matches(&node));
    }

    #[test]
    fn separator_inside_value_does_not_round_trip() {
        let s = Selector::text("Save AND exit");
        assert_eq!(s.conditions().len(), 1);
        assert_eq!(s.to_string(), "text:Save AND exit");
        assert_eq!(
            Selector::parse(&s.to_string()).unwrap_err().code,
            ErrorCode::InvalidSelector
        );
        let plain = Selector::parse("class:List >> desc~:Wi-Fi AND instance:1").unwrap();
        assert_eq!(Selector::parse(&plain.to_string()).unwrap(), plain);
    }
}
