//! Query execution over a UI tree snapshot
//!
//! Traversal is pre-order, depth-first, children in the order the host gives
//! them. Invisible nodes are skipped together with their subtrees. "Instance N"
//! is the Nth match met in that order, counted from 0.
//!
//! A selector without a parent is matched against the whole tree, root
//! included. A selector with a parent is matched against the descendants of the
//! node the parent resolves to.

use crate::error::{Error, Result};
use crate::node::{Element, UiNode};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capability to count and locate nodes for a selector.
///
/// [`Executor`] is the stock implementation. Hosts with their own query
/// backend (a device-side accessibility service, a cached index) implement
/// this instead; the collection search only talks to this trait.
pub trait QueryEngine {
    /// Number of visible nodes matching `selector`. The selector's own
    /// instance index is ignored.
    fn count<N: UiNode>(&self, root: &N, selector: &Selector) -> Result<usize>;

    /// The match at the selector's instance index (0 when unset).
    fn resolve<'t, N: UiNode>(&self, root: &'t N, selector: &Selector) -> Result<Element<'t, N>>;

    /// First descendant of `scope` (instance-th if set) satisfying the
    /// selector's conditions. The selector's ancestor chain is not consulted;
    /// `scope` takes its place.
    fn find_within<'t, N: UiNode>(
        &self,
        scope: &Element<'t, N>,
        selector: &Selector,
    ) -> Result<Option<Element<'t, N>>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Deepest level (root = 0) visited; `None` walks the whole tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: QueryConfig,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Every match, numbered by instance
    pub fn find_all<'t, N: UiNode>(
        &self,
        root: &'t N,
        selector: &Selector,
    ) -> Result<Vec<Element<'t, N>>> {
        let results = self
            .matches(root, selector, usize::MAX)?
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.with_index(i))
            .collect();
        Ok(results)
    }

    pub fn exists<N: UiNode>(&self, root: &N, selector: &Selector) -> bool {
        self.resolve(root, selector).is_ok()
    }

    /// Up to `limit` matches in traversal order
    fn matches<'t, N: UiNode>(
        &self,
        root: &'t N,
        selector: &Selector,
        limit: usize,
    ) -> Result<Vec<Element<'t, N>>> {
        let (start, match_start) = match selector.parent() {
            None => (Element::new(root, Vec::new()), true),
            Some(parent) => match self.resolve(root, parent) {
                Ok(container) => (container, false),
                Err(e) if e.is_not_found() => {
                    debug!(parent = %parent, "container not present");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            },
        };

        let mut path = start.path().to_vec();
        let mut results = Vec::new();
        self.walk(start.raw(), &mut path, match_start, selector, limit, &mut results);
        Ok(results)
    }

    fn walk<'t, N: UiNode>(
        &self,
        node: &'t N,
        path: &mut Vec<usize>,
        match_self: bool,
        selector: &Selector,
        limit: usize,
        results: &mut Vec<Element<'t, N>>,
    ) {
        if results.len() >= limit || !node.is_visible() {
            return;
        }
        if self.config.max_depth.is_some_and(|max| path.len() > max) {
            return;
        }

        if match_self && selector.matches(node) {
            results.push(Element::new(node, path.clone()));
        }

        for (i, child) in node.children().iter().enumerate() {
            path.push(i);
            self.walk(child, path, true, selector, limit, results);
            path.pop();
            if results.len() >= limit {
                return;
            }
        }
    }
}

impl QueryEngine for Executor {
    fn count<N: UiNode>(&self, root: &N, selector: &Selector) -> Result<usize> {
        let count = self.matches(root, selector, usize::MAX)?.len();
        debug!(selector = %selector, count, "count");
        Ok(count)
    }

    fn resolve<'t, N: UiNode>(&self, root: &'t N, selector: &Selector) -> Result<Element<'t, N>> {
        let instance = selector.instance_index().unwrap_or(0);
        let found = self.matches(root, selector, instance.saturating_add(1))?;
        let visible = found.len();

        match found.into_iter().nth(instance) {
            Some(element) => {
                debug!(selector = %selector, path = ?element.path(), "resolved");
                Ok(element.with_index(instance))
            }
            None => {
                debug!(selector = %selector, instance, visible, "no match at instance");
                Err(Error::not_found(&selector.to_string())
                    .with_suggestions(not_found_suggestions(visible))
                    .with_context(serde_json::json!({
                        "selector": selector,
                        "instance": instance,
                        "visible_matches": visible,
                    })))
            }
        }
    }

    fn find_within<'t, N: UiNode>(
        &self,
        scope: &Element<'t, N>,
        selector: &Selector,
    ) -> Result<Option<Element<'t, N>>> {
        let instance = selector.instance_index().unwrap_or(0);
        let mut path = scope.path().to_vec();
        let mut results = Vec::new();
        self.walk(
            scope.raw(),
            &mut path,
            false,
            selector,
            instance.saturating_add(1),
            &mut results,
        );
        Ok(results.into_iter().nth(instance))
    }
}

fn not_found_suggestions(visible: usize) -> Vec<String> {
    if visible == 0 {
        vec![
            "Check the selector against the tree output".to_string(),
            "The element may be off screen: scroll the host view and query again".to_string(),
        ]
    } else {
        vec![format!(
            "Only {} visible match(es); use instance:0 through instance:{}",
            visible,
            visible - 1
        )]
    }
}
