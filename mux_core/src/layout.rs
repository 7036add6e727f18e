//! Binary split tree for pane arrangement.
//!
//! A tab's panes are the leaves of a strictly binary tree. Every internal
//! node stores the share of its axis given to one child, its anchor, exactly
//! as requested when the split was made; the other child gets the rest.
//! Nothing absolute is stored: regions and cell
//! rectangles are derived from the ratio chain whenever they are asked for,
//! so a canvas resize never needs an invalidation pass.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MuxError;
use crate::rect::{Rect, Region};

/// Unique identifier for a pane (monotonic counter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PaneId(pub u64);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis along which a split divides its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Top/bottom division.
    Horizontal,
    /// Left/right division.
    Vertical,
}

/// Where a freshly split pane is placed relative to the original one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SplitDirection {
    /// New pane above.
    Top,
    /// New pane below.
    Bottom,
    /// New pane to the left.
    Left,
    /// New pane to the right.
    #[default]
    Right,
}

impl SplitDirection {
    /// The axis divided by a split in this direction.
    pub fn axis(self) -> Axis {
        match self {
            SplitDirection::Top | SplitDirection::Bottom => Axis::Horizontal,
            SplitDirection::Left | SplitDirection::Right => Axis::Vertical,
        }
    }

    /// Whether the new pane becomes the first (top/left) child.
    pub fn new_pane_first(self) -> bool {
        matches!(self, SplitDirection::Top | SplitDirection::Left)
    }
}

impl FromStr for SplitDirection {
    type Err = MuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "up" => Ok(SplitDirection::Top),
            "bottom" | "down" => Ok(SplitDirection::Bottom),
            "left" => Ok(SplitDirection::Left),
            "right" => Ok(SplitDirection::Right),
            _ => Err(MuxError::InvalidArgument(format!("unknown split direction \"{s}\""))),
        }
    }
}

impl TryFrom<String> for SplitDirection {
    type Error = MuxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Child of a split whose share is stored in its `ratio`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Top or left child.
    #[default]
    First,
    /// Bottom or right child.
    Second,
}

impl Side {
    /// Shares of `(first, second)` when `ratio` belongs to this side.
    pub fn shares(self, ratio: f64) -> (f64, f64) {
        match self {
            Side::First => (ratio, 1.0 - ratio),
            Side::Second => (1.0 - ratio, ratio),
        }
    }
}

/// A node in the binary layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaneNode {
    /// A terminal leaf containing a single pane.
    Leaf {
        /// The pane occupying this leaf.
        pane_id: PaneId,
    },
    /// A split producing two children.
    Split {
        /// Axis divided by this split.
        axis: Axis,
        /// Share of the axis allocated to the anchor child, in `(0, 1)`.
        ratio: f64,
        /// Child receiving `ratio`; the pane created by the split.
        #[serde(default)]
        anchor: Side,
        /// First child (top or left).
        first: Box<PaneNode>,
        /// Second child (bottom or right).
        second: Box<PaneNode>,
    },
}

impl PaneNode {
    /// A single leaf.
    pub fn leaf(pane_id: PaneId) -> Self {
        PaneNode::Leaf { pane_id }
    }

    /// Whether the tree contains a pane with the given id.
    pub fn contains(&self, id: PaneId) -> bool {
        match self {
            PaneNode::Leaf { pane_id } => *pane_id == id,
            PaneNode::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    /// Collect all pane ids in depth-first order.
    pub fn pane_ids(&self) -> Vec<PaneId> {
        let mut ids = Vec::with_capacity(self.pane_count());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, out: &mut Vec<PaneId>) {
        match self {
            PaneNode::Leaf { pane_id } => out.push(*pane_id),
            PaneNode::Split { first, second, .. } => {
                first.collect_ids(out);
                second.collect_ids(out);
            },
        }
    }

    /// Number of panes in this tree.
    pub fn pane_count(&self) -> usize {
        match self {
            PaneNode::Leaf { .. } => 1,
            PaneNode::Split { first, second, .. } => first.pane_count() + second.pane_count(),
        }
    }

    /// Shares of the parent axis given to `(first, second)`, for a split node.
    pub fn child_fractions(&self) -> Option<(f64, f64)> {
        match self {
            PaneNode::Leaf { .. } => None,
            PaneNode::Split { ratio, anchor, .. } => Some(anchor.shares(*ratio)),
        }
    }

    /// Every split ratio in the tree, depth-first.
    pub fn ratios(&self) -> Vec<f64> {
        match self {
            PaneNode::Leaf { .. } => Vec::new(),
            PaneNode::Split { ratio, first, second, .. } => {
                let mut out = vec![*ratio];
                out.extend(first.ratios());
                out.extend(second.ratios());
                out
            },
        }
    }

    /// Fractional region of every pane, relative to the whole canvas.
    pub fn regions(&self) -> HashMap<PaneId, Region> {
        let mut result = HashMap::new();
        self.regions_inner(Region::FULL, &mut result);
        result
    }

    /// Fractional region of a single pane.
    pub fn region_of(&self, id: PaneId) -> Option<Region> {
        self.find_region(id, Region::FULL)
    }

    fn find_region(&self, id: PaneId, area: Region) -> Option<Region> {
        match self {
            PaneNode::Leaf { pane_id } => (*pane_id == id).then_some(area),
            PaneNode::Split { axis, ratio, anchor, first, second } => {
                let (a, b) = area.split(*axis, anchor.shares(*ratio));
                first.find_region(id, a).or_else(|| second.find_region(id, b))
            },
        }
    }

    fn regions_inner(&self, area: Region, out: &mut HashMap<PaneId, Region>) {
        match self {
            PaneNode::Leaf { pane_id } => {
                out.insert(*pane_id, area);
            },
            PaneNode::Split { axis, ratio, anchor, first, second } => {
                let (a, b) = area.split(*axis, anchor.shares(*ratio));
                first.regions_inner(a, out);
                second.regions_inner(b, out);
            },
        }
    }

    /// Compute the screen rectangle for every pane.
    pub fn rects(&self, area: Rect) -> HashMap<PaneId, Rect> {
        let mut result = HashMap::new();
        self.rects_inner(area, &mut result);
        result
    }

    fn rects_inner(&self, area: Rect, out: &mut HashMap<PaneId, Rect>) {
        match self {
            PaneNode::Leaf { pane_id } => {
                out.insert(*pane_id, area);
            },
            PaneNode::Split { axis, ratio, anchor, first, second } => {
                let (first_share, _) = anchor.shares(*ratio);
                let (a, b) = match axis {
                    Axis::Horizontal => area.split_horizontal(first_share),
                    Axis::Vertical => area.split_vertical(first_share),
                };
                first.rects_inner(a, out);
                second.rects_inner(b, out);
            },
        }
    }
}
