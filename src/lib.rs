//! uiscope - query UI accessibility trees with composable selectors
//!
//! Deterministic lookups over a tree snapshot the host hands in, with
//! structured errors when nothing matches.
//!
//! ## Pieces
//!
//! - **selector**: immutable predicates with an ancestor chain and instance index
//! - **pattern**: nest a child pattern under a container selector
//! - **query**: count and resolve selectors in pre-order over visible nodes
//! - **collection**: find a container's child by text or description
//! - **snapshot**: timestamped tree copies, JSON in and out
//!
//! ## Quick Start
//!
//! ```rust
//! use uiscope::prelude::*;
//!
//! let root = Node::new("ListView").with_children([
//!     Node::new("Row").with_description("Bluetooth"),
//!     Node::new("Row").with_description("Wi-Fi settings"),
//! ]);
//!
//! let exec = Executor::new();
//! let list = Collection::new(Selector::class_name("ListView"), &exec);
//! let row = list.child_by_description(&root, &Selector::class_name("Row"), "Wi-Fi")?;
//! assert_eq!(row.path(), &[1]);
//! # Ok::<(), uiscope::Error>(())
//! ```

pub mod collection;
pub mod error;
pub mod node;
pub mod pattern;
pub mod query;
pub mod selector;
pub mod snapshot;

pub use collection::{Collection, IdentifyBy};
pub use error::{Error, ErrorCode, Result};
pub use node::{Element, ElementInfo, Node, UiNode};
pub use query::{Executor, QueryConfig, QueryEngine};
pub use selector::Selector;
pub use snapshot::Snapshot;

pub mod prelude {
    pub use crate::collection::{Collection, IdentifyBy};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::node::{Element, Node, UiNode};
    pub use crate::pattern::compose;
    pub use crate::query::{Executor, QueryEngine};
    pub use crate::selector::Selector;
    pub use crate::snapshot::Snapshot;
}
