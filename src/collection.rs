//! Collection - enumerate a container's children and pick one by an
//! identifying attribute
//!
//! A settings list holds many rows, each with its own switch. To reach the
//! switch next to "Wi-Fi" rather than the one next to "Bluetooth", point a
//! [`Collection`] at the list, find the row by text or description, then query
//! inside that row.
//!
//! Only visible children are considered and nothing is scrolled. Callers that
//! need more rows scroll the host view, take a new snapshot and search again.

use crate::error::{Error, Result};
use crate::node::{Element, UiNode};
use crate::pattern;
use crate::query::{Executor, QueryEngine};
use crate::selector::{Attribute, Condition, MatchOp, Selector};
use tracing::{debug, warn};

/// Which attribute identifies a child, and how its own value is compared.
///
/// The fallback search over the child's descendants always uses containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifyBy {
    pub attribute: Attribute,
    pub direct: MatchOp,
}

impl IdentifyBy {
    /// Exact text on the child itself
    pub const TEXT: Self = Self {
        attribute: Attribute::Text,
        direct: MatchOp::Equals,
    };

    /// Description containing the text on the child itself
    pub const DESCRIPTION: Self = Self {
        attribute: Attribute::Description,
        direct: MatchOp::Contains,
    };
}

pub struct Collection<'e, E = Executor> {
    selector: Selector,
    engine: &'e E,
}

impl<'e, E: QueryEngine> Collection<'e, E> {
    pub fn new(selector: Selector, engine: &'e E) -> Self {
        Self { selector, engine }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The container node itself
    pub fn container<'t, N: UiNode>(&self, root: &'t N) -> Result<Element<'t, N>> {
        self.engine.resolve(root, &self.selector)
    }

    /// Visible children matching `child_pattern` anywhere below the container
    pub fn child_count<N: UiNode>(&self, root: &N, child_pattern: &Selector) -> Result<usize> {
        let composed = pattern::compose(&self.selector, child_pattern, None);
        self.engine.count(root, &composed)
    }

    pub fn child_by_instance<'t, N: UiNode>(
        &self,
        root: &'t N,
        child_pattern: &Selector,
        instance: usize,
    ) -> Result<Element<'t, N>> {
        let composed = pattern::compose(&self.selector, child_pattern, Some(instance));
        self.engine.resolve(root, &composed)
    }

    /// First child whose text equals `text`, or that has a descendant whose
    /// text contains it. Returns the child, never the descendant.
    pub fn child_by_text<'t, N: UiNode>(
        &self,
        root: &'t N,
        child_pattern: &Selector,
        text: &str,
    ) -> Result<Element<'t, N>> {
        self.child_by(root, child_pattern, text, IdentifyBy::TEXT)
    }

    /// First child whose description contains `text`, or that has a
    /// descendant whose description contains it. Returns the child, never the
    /// descendant.
    pub fn child_by_description<'t, N: UiNode>(
        &self,
        root: &'t N,
        child_pattern: &Selector,
        text: &str,
    ) -> Result<Element<'t, N>> {
        self.child_by(root, child_pattern, text, IdentifyBy::DESCRIPTION)
    }

    pub fn child_by<'t, N: UiNode>(
        &self,
        root: &'t N,
        child_pattern: &Selector,
        text: &str,
        by: IdentifyBy,
    ) -> Result<Element<'t, N>> {
        if text.is_empty() {
            return Err(Error::invalid_argument(
                by.attribute.name(),
                "search text must not be empty",
            ));
        }

        let direct = Condition {
            attr: by.attribute,
            op: by.direct,
            value: text.to_string(),
        };
        let nested = Selector::new().with_condition(by.attribute, MatchOp::Contains, text);

        let count = self.child_count(root, child_pattern)?;
        for instance in 0..count {
            let row = match self.child_by_instance(root, child_pattern, instance) {
                Ok(row) => row,
                // the tree shrank since it was counted
                Err(e) if e.is_not_found() => {
                    warn!(instance, count, "child vanished during search");
                    break;
                }
                Err(e) => return Err(e),
            };

            if direct.matches(row.raw()) {
                debug!(instance, attribute = by.attribute.name(), "direct match");
                return Ok(row);
            }

            if let Some(item) = self.engine.find_within(&row, &nested)? {
                debug!(instance, item = ?item.path(), "match below child");
                return Ok(row);
            }
        }

        Err(Error::search_not_found(by.attribute.name(), text)
            .with_suggestions(vec![
                "Only visible children are searched; scroll the container and search again"
                    .to_string(),
            ])
            .with_context_field("container", self.selector.to_string())
            .with_context_field("child_pattern", child_pattern.to_string())
            .with_context_field("searched", count))
    }
}
