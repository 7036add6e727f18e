//! Split and remove operations on the layout tree.

use log::debug;

use crate::error::{MuxError, MuxResult};
use crate::layout::{PaneId, PaneNode, Side, SplitDirection};

/// Check that a split fraction leaves both sides with a non-empty share.
pub fn validate_fraction(fraction: f64) -> MuxResult<()> {
    if fraction > 0.0 && fraction < 1.0 {
        Ok(())
    } else {
        Err(MuxError::InvalidArgument(format!(
            "split size must be strictly between 0 and 1, got {fraction}"
        )))
    }
}

/// Split the leaf holding `target`, giving `fraction` of its space to `new_id`.
///
/// The split stores `fraction` itself, anchored on the new pane, so the new
/// pane's share is exactly the requested one. The original pane keeps the
/// rest. Only the target leaf's slot is
/// replaced, every other node in the tree is left as it was. Nothing is
/// mutated when validation fails.
pub fn split_pane(
    tree: &mut PaneNode,
    target: PaneId,
    direction: SplitDirection,
    fraction: f64,
    new_id: PaneId,
) -> MuxResult<()> {
    validate_fraction(fraction)?;
    let slot = find_leaf_mut(tree, target).ok_or(MuxError::pane(target))?;

    let existing = Box::new(PaneNode::leaf(target));
    let created = Box::new(PaneNode::leaf(new_id));
    let (first, second, anchor) = if direction.new_pane_first() {
        (created, existing, Side::First)
    } else {
        (existing, created, Side::Second)
    };

    *slot = PaneNode::Split { axis: direction.axis(), ratio: fraction, anchor, first, second };
    debug!("Split pane {target} {direction:?} at {fraction}, new pane {new_id}");
    Ok(())
}

fn find_leaf_mut(node: &mut PaneNode, target: PaneId) -> Option<&mut PaneNode> {
    if matches!(node, PaneNode::Leaf { pane_id } if *pane_id == target) {
        return Some(node);
    }

    match node {
        PaneNode::Leaf { .. } => None,
        PaneNode::Split { first, second, .. } => {
            if first.contains(target) {
                find_leaf_mut(first, target)
            } else {
                find_leaf_mut(second, target)
            }
        },
    }
}

/// Remove the pane identified by `target`, collapsing its parent split.
///
/// The sibling subtree takes over the parent's whole slot. Returns `None` if
/// the last pane was removed.
pub fn remove_pane(tree: PaneNode, target: PaneId) -> MuxResult<Option<PaneNode>> {
    match remove_inner(tree, target) {
        RemoveResult::Removed(remaining) => Ok(remaining),
        RemoveResult::NotFound(_) => Err(MuxError::pane(target)),
    }
}

enum RemoveResult {
    Removed(Option<PaneNode>),
    NotFound(PaneNode),
}

fn remove_inner(node: PaneNode, target: PaneId) -> RemoveResult {
    let (axis, ratio, anchor, first, second) = match node {
        PaneNode::Leaf { pane_id } if pane_id == target => return RemoveResult::Removed(None),
        PaneNode::Leaf { .. } => return RemoveResult::NotFound(node),
        PaneNode::Split { axis, ratio, anchor, first, second } => {
            (axis, ratio, anchor, first, second)
        },
    };
    let rebuild = |first: PaneNode, second: PaneNode| PaneNode::Split {
        axis,
        ratio,
        anchor,
        first: Box::new(first),
        second: Box::new(second),
    };

    match remove_inner(*first, target) {
        RemoveResult::Removed(None) => RemoveResult::Removed(Some(*second)),
        RemoveResult::Removed(Some(first)) => RemoveResult::Removed(Some(rebuild(first, *second))),
        RemoveResult::NotFound(first) => match remove_inner(*second, target) {
            RemoveResult::Removed(None) => RemoveResult::Removed(Some(first)),
            RemoveResult::Removed(Some(second)) => {
                RemoveResult::Removed(Some(rebuild(first, second)))
            },
            RemoveResult::NotFound(second) => RemoveResult::NotFound(rebuild(first, second)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Axis;

    fn leaf(id: u64) -> PaneNode {
        PaneNode::leaf(PaneId(id))
    }

    #[test]
    fn split_right_keeps_original_first() {
        let mut tree = leaf(1);
        split_pane(&mut tree, PaneId(1), SplitDirection::Right, 0.25, PaneId(2)).unwrap();
        match &tree {
            PaneNode::Split { axis, ratio, anchor, first, second } => {
                assert_eq!(*axis, Axis::Vertical);
                assert_eq!(*ratio, 0.25);
                assert_eq!(*anchor, Side::Second);
                assert_eq!(**first, leaf(1));
                assert_eq!(**second, leaf(2));
            },
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn split_top_places_new_pane_first() {
        let mut tree = leaf(1);
        split_pane(&mut tree, PaneId(1), SplitDirection::Top, 0.25, PaneId(2)).unwrap();
        match &tree {
            PaneNode::Split { axis, ratio, anchor, first, second } => {
                assert_eq!(*axis, Axis::Horizontal);
                assert_eq!(*ratio, 0.25);
                assert_eq!(*anchor, Side::First);
                assert_eq!(**first, leaf(2));
                assert_eq!(**second, leaf(1));
            },
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn new_pane_gets_the_exact_fraction() {
        for direction in [SplitDirection::Right, SplitDirection::Bottom, SplitDirection::Left] {
            let mut tree = leaf(1);
            split_pane(&mut tree, PaneId(1), direction, 0.1, PaneId(2)).unwrap();
            let (first, second) = tree.child_fractions().unwrap();
            let created = if direction.new_pane_first() { first } else { second };
            assert_eq!(created, 0.1);
            assert_eq!(first + second, 1.0);
        }
    }

    #[test]
    fn split_leaves_siblings_untouched() {
        let mut tree = leaf(1);
        split_pane(&mut tree, PaneId(1), SplitDirection::Right, 0.5, PaneId(2)).unwrap();
        let before = tree.region_of(PaneId(1));
        split_pane(&mut tree, PaneId(2), SplitDirection::Bottom, 0.5, PaneId(3)).unwrap();
        assert_eq!(tree.region_of(PaneId(1)), before);
        assert_eq!(tree.pane_count(), 3);
    }

    #[test]
    fn split_rejects_degenerate_fractions() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let mut tree = leaf(1);
            let err = split_pane(&mut tree, PaneId(1), SplitDirection::Right, bad, PaneId(2));
            assert!(matches!(err, Err(MuxError::InvalidArgument(_))), "{bad} accepted");
            assert_eq!(tree, leaf(1));
        }
    }

    #[test]
    fn split_not_found() {
        let mut tree = leaf(1);
        let result = split_pane(&mut tree, PaneId(99), SplitDirection::Right, 0.5, PaneId(2));
        assert_eq!(result, Err(MuxError::pane(PaneId(99))));
        assert_eq!(tree, leaf(1));
    }

    #[test]
    fn remove_collapses_parent() {
        let mut tree = leaf(1);
        split_pane(&mut tree, PaneId(1), SplitDirection::Right, 0.5, PaneId(2)).unwrap();
        let remaining = remove_pane(tree, PaneId(1)).unwrap().unwrap();
        assert_eq!(remaining, leaf(2));
    }

    #[test]
    fn remove_last_pane() {
        assert!(remove_pane(leaf(1), PaneId(1)).unwrap().is_none());
    }

    #[test]
    fn remove_not_found() {
        assert!(remove_pane(leaf(1), PaneId(99)).unwrap_err().is_not_found());
    }
}
