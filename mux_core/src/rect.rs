//! Rectangle math for pane regions.
//!
//! Two flavours exist: [`Region`] is expressed in fractions of the tab canvas
//! and is what the split tree actually describes, [`Rect`] is the cell grid
//! projection of a region for a concrete [`TermSize`].

use serde::{Deserialize, Serialize};

use crate::layout::Axis;

/// Size of a terminal canvas in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TermSize {
    /// Number of rows.
    pub rows: u16,
    /// Number of columns.
    pub cols: u16,
}

impl TermSize {
    /// Create a new size.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for TermSize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

/// A rectangle defined by its top-left corner and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Column of the left edge.
    pub x: u16,
    /// Row of the top edge.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole canvas.
    pub fn from_size(size: TermSize) -> Self {
        Self::new(0, 0, size.cols, size.rows)
    }

    /// Size of this rectangle as a terminal size.
    pub fn size(&self) -> TermSize {
        TermSize::new(self.height, self.width)
    }

    /// Whether the cell at `col`, `row` lies inside this rectangle.
    pub fn contains(&self, col: u16, row: u16) -> bool {
        (self.x..self.x.saturating_add(self.width)).contains(&col)
            && (self.y..self.y.saturating_add(self.height)).contains(&row)
    }

    /// Split horizontally (top/bottom), giving `first_share` of the rows to the top.
    ///
    /// Returns `(top, bottom)`.
    pub fn split_horizontal(&self, first_share: f64) -> (Rect, Rect) {
        let top_h = cells_for(self.height, first_share);
        let bottom_h = self.height.saturating_sub(top_h);

        let top = Rect::new(self.x, self.y, self.width, top_h);
        let bottom = Rect::new(self.x, self.y.saturating_add(top_h), self.width, bottom_h);
        (top, bottom)
    }

    /// Split vertically (left/right), giving `first_share` of the columns to the left.
    ///
    /// Returns `(left, right)`.
    pub fn split_vertical(&self, first_share: f64) -> (Rect, Rect) {
        let left_w = cells_for(self.width, first_share);
        let right_w = self.width.saturating_sub(left_w);

        let left = Rect::new(self.x, self.y, left_w, self.height);
        let right = Rect::new(self.x.saturating_add(left_w), self.y, right_w, self.height);
        (left, right)
    }
}

/// Cells given to the first child; both sides keep at least one cell when possible.
fn cells_for(total: u16, share: f64) -> u16 {
    let first = (f64::from(total) * share.clamp(0.0, 1.0)).round() as u16;
    first.max(1).min(total.saturating_sub(1))
}

/// A rectangle expressed in fractions of the tab canvas (`0.0..=1.0` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Region {
    /// The whole canvas.
    pub const FULL: Region = Region { x: 0.0, y: 0.0, width: 1.0, height: 1.0 };

    /// Split along `axis`, giving the two parts the `(first, second)` shares.
    pub fn split(&self, axis: Axis, shares: (f64, f64)) -> (Region, Region) {
        match axis {
            Axis::Horizontal => self.split_horizontal(shares),
            Axis::Vertical => self.split_vertical(shares),
        }
    }

    /// Split into top/bottom with `(top, bottom)` shares of the height.
    pub fn split_horizontal(&self, (top, bottom): (f64, f64)) -> (Region, Region) {
        let top_h = self.height * top;
        let upper = Region { height: top_h, ..*self };
        let lower = Region { y: self.y + top_h, height: self.height * bottom, ..*self };
        (upper, lower)
    }

    /// Split into left/right with `(left, right)` shares of the width.
    pub fn split_vertical(&self, (left, right): (f64, f64)) -> (Region, Region) {
        let left_w = self.width * left;
        let west = Region { width: left_w, ..*self };
        let east = Region { x: self.x + left_w, width: self.width * right, ..*self };
        (west, east)
    }
}
