//! Resize operations on the layout tree.

use crate::error::{MuxError, MuxResult};
use crate::layout::{PaneId, PaneNode, Side};

/// Minimum ratio for the smaller child after a resize.
pub const MIN_RATIO: f64 = 0.1;
/// Maximum ratio for the larger child after a resize.
pub const MAX_RATIO: f64 = 0.9;

/// Grow the pane `target` by `delta` of its nearest enclosing split.
///
/// Positive values grow the pane, negative values shrink it. The innermost
/// split containing `target` is the one adjusted, and its ratio is clamped to
/// `[MIN_RATIO, MAX_RATIO]`. A tab with a single pane has nothing to resize.
pub fn adjust_ratio(tree: &mut PaneNode, target: PaneId, delta: f64) -> MuxResult<()> {
    if !tree.contains(target) {
        return Err(MuxError::pane(target));
    }
    adjust_inner(tree, target, delta);
    Ok(())
}

fn adjust_inner(node: &mut PaneNode, target: PaneId, delta: f64) -> bool {
    match node {
        PaneNode::Leaf { .. } => false,
        PaneNode::Split { ratio, anchor, first, second, .. } => {
            let in_first = first.contains(target);

            // Prefer the deepest split around the pane.
            let subtree = if in_first { first } else { second };
            if adjust_inner(subtree, target, delta) {
                return true;
            }

            let grows_anchor = in_first == (*anchor == Side::First);
            let signed = if grows_anchor { delta } else { -delta };
            *ratio = (*ratio + signed).clamp(MIN_RATIO, MAX_RATIO);
            true
        },
    }
}
