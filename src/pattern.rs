//! Pattern composition: a child pattern nested under a container selector

use crate::error::Result;
use crate::selector::Selector;

/// Build the selector for the `instance`-th node matching `child` inside the
/// node `container` resolves to.
///
/// Both inputs are borrowed; the result is a fresh selector. An ancestor chain
/// already on `child` stays below `container`. `None` leaves the instance
/// unset, which is what counting wants.
pub fn compose(container: &Selector, child: &Selector, instance: Option<usize>) -> Selector {
    let composed = child.clone().child_of(container.clone());
    match instance {
        Some(i) => composed.instance(i),
        None => composed,
    }
}

/// [`compose`] for instance indices arriving as signed integers
pub fn try_compose(container: &Selector, child: &Selector, instance: i64) -> Result<Selector> {
    child.clone().child_of(container.clone()).try_instance(instance)
}
