//! Fragment splicing.
//!
//! Fragment text is parsed as markup and never executed. Every swap that
//! inserts an element hands it to the enhancement hook.

use anyhow::{Context as _, Error, anyhow};
use html::{DOM, NodeId};

use crate::attributes::SwapMode;
use crate::enhance::EnhancementHook;

/// Splice `fragment` into the document at `target`.
///
/// Returns the node that was activated: the target for inner swaps, the new
/// root for outer swaps, `None` when an outer swap only left text or nothing.
///
/// # Errors
/// Fails when the fragment cannot be parsed or an outer target has no parent.
pub fn swap(
    document: &mut DOM,
    hook: &EnhancementHook,
    target: NodeId,
    fragment: &str,
    mode: SwapMode,
) -> Result<Option<NodeId>, Error> {
    if mode == SwapMode::Outer && document.parent(target).is_none() {
        return Err(anyhow!("outer swap target has no parent"));
    }
    let parsed = document.parse_fragment(fragment).context("unparseable fragment")?;
    let activated = match mode {
        SwapMode::Inner => {
            document.clear_children(target);
            document.move_children(parsed, target)?;
            Some(target)
        }
        SwapMode::Outer => replace_outer(document, target, parsed)?,
    };
    document.remove(parsed);
    if let Some(root) = activated {
        hook.activate(document, root);
    }
    Ok(activated)
}

fn replace_outer(document: &mut DOM, target: NodeId, parsed: NodeId) -> Result<Option<NodeId>, Error> {
    // Single-root: siblings after the first element are discarded.
    if let Some(first) = document.element_children(parsed).first().copied() {
        document.replace_with(target, first)?;
        return Ok(Some(first));
    }
    if document.text_content(parsed).trim().is_empty() {
        document.remove(target);
        return Ok(None);
    }
    for node in document.children(parsed) {
        document.insert_before(target, node)?;
    }
    document.remove(target);
    Ok(None)
}
