use html::{DOM, NodeId};

use crate::attributes::TargetRef;

/// Locate the swap target for `trigger`. No reference means no target.
pub fn resolve(document: &DOM, trigger: NodeId, reference: Option<&TargetRef>) -> Option<NodeId> {
    match reference? {
        TargetRef::Closest(selector) => document.closest(trigger, selector),
        TargetRef::Query(selector) => document.query_selector(document.root(), selector),
    }
}
