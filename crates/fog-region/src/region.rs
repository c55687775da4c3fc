//! The region value type and its set algebra.
//!
//! A [`Region`] is a copy-on-write value: cloning is `O(1)` (it bumps the
//! box list's `Arc` refcount via [`CowCell`]); the first mutator to touch a
//! shared region detaches by copying the box list, via
//! [`CowCell::get_mut`]. Every mutator restores four invariants before
//! returning:
//!
//! - **Y-X sort**: boxes are ordered by `(y1, x1)`; all boxes sharing a
//!   `(y1, y2)` pair form one contiguous *band*.
//! - **Maximal coalescing**: adjacent bands with identical x-spans are
//!   merged; no two x-adjacent boxes share a y-range within a band.
//! - **Extents tightness**: the cached bounding box equals the union of
//!   every box, or is absent for an empty region.
//! - **Empty rejection**: [`crate::box_::Box`] itself forbids zero-area
//!   boxes, so this only has to hold region-wide (no boxes at all is the
//!   canonical empty region).

use crate::box_::Box;
use crate::STACK_BOXES;
use fog_core::cow::CowCell;
use tracing::trace;

/// Result of a point/rectangle/region containment test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contains {
    /// Entirely outside the region.
    Out,
    /// Entirely inside the region.
    In,
    /// Partially inside, partially outside.
    Part,
}

/// A Y-X-sorted, maximally coalesced list of boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    boxes: CowCell<Vec<Box>>,
    extents: Option<Box>,
}

impl Default for Region {
    fn default() -> Self {
        Region::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Unite,
    Intersect,
    Subtract,
    Xor,
}

impl Region {
    /// The empty region.
    pub fn new() -> Self {
        Region {
            boxes: CowCell::new(Vec::new()),
            extents: None,
        }
    }

    /// A region containing exactly one box.
    pub fn from_box(b: Box) -> Self {
        Region {
            extents: Some(b),
            boxes: CowCell::new(vec![b]),
        }
    }

    /// Builds a canonical region from an arbitrary (possibly unsorted,
    /// possibly overlapping) list of boxes.
    pub fn from_boxes(boxes: &[Box]) -> Self {
        if boxes.is_empty() {
            return Region::new();
        }
        // Fold the input through repeated union; correctness doesn't
        // depend on input order or overlap, only cost does.
        let mut acc = Region::from_box(boxes[0]);
        for b in &boxes[1..] {
            acc = acc.unite(&Region::from_box(*b));
        }
        acc
    }

    /// `true` if this region has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.get().is_empty()
    }

    /// The region's boxes, in canonical Y-X order.
    #[inline]
    pub fn boxes(&self) -> &[Box] {
        self.boxes.get()
    }

    /// The smallest box containing every box in this region, or `None` if
    /// empty.
    #[inline]
    pub fn extents(&self) -> Option<Box> {
        self.extents
    }

    /// Empties this region in place.
    pub fn clear(&mut self) {
        self.boxes.get_mut().clear();
        self.extents = None;
    }

    /// Replaces this region's contents with `boxes`, re-canonicalizing.
    pub fn set(&mut self, boxes: &[Box]) {
        *self = Region::from_boxes(boxes);
    }

    /// A copy translated by `(dx, dy)`. Translation can't break any
    /// invariant, so no re-canonicalization is needed.
    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        Region {
            boxes: CowCell::new(self.boxes.get().iter().map(|b| b.translated(dx, dy)).collect()),
            extents: self.extents.map(|b| b.translated(dx, dy)),
        }
    }

    /// A copy with every box shrunk by `(dx, dy)` (see
    /// [`Box::shrunk`]); boxes that vanish are dropped and the result is
    /// re-canonicalized, since shrinking can break adjacency/coalescing.
    pub fn shrink(&self, dx: i32, dy: i32) -> Region {
        let shrunk: Vec<Box> = self.boxes.get().iter().filter_map(|b| b.shrunk(dx, dy)).collect();
        Region::from_boxes(&shrunk)
    }

    /// The outline of thickness `(dx, dy)`: `self` minus its own
    /// [`Region::shrink`].
    pub fn frame(&self, dx: i32, dy: i32) -> Region {
        self.subtract(&self.shrink(dx, dy))
    }

    /// Tests whether `(x, y)` falls inside this region.
    ///
    /// Uses a binary search over bands by `y1` (bands are contiguous and
    /// sorted), then a linear scan by `x1` within the matching band.
    pub fn contains_point(&self, x: i32, y: i32) -> Contains {
        if let Some(extents) = self.extents {
            if !extents.contains_point(x, y) {
                return Contains::Out;
            }
        } else {
            return Contains::Out;
        }
        // Find the first box whose y-range could contain `y`.
        let idx = self.boxes.get().partition_point(|b| b.y2 <= y);
        for b in &self.boxes.get()[idx..] {
            if b.y1 > y {
                break;
            }
            if b.y1 <= y && y < b.y2 && b.x1 <= x && x < b.x2 {
                return Contains::In;
            }
        }
        Contains::Out
    }

    /// Tests how `b` relates to this region: entirely outside, entirely
    /// inside, or straddling the boundary.
    pub fn contains_box(&self, query: &Box) -> Contains {
        match self.extents {
            None => Contains::Out,
            Some(extents) if !extents.overlaps(query) => Contains::Out,
            _ => {
                let covered = self.intersect(&Region::from_box(*query));
                if covered.is_empty() {
                    Contains::Out
                } else if covered.boxes.get().len() == 1 && covered.boxes.get()[0] == *query {
                    Contains::In
                } else {
                    let area = |r: &Region| -> i64 {
                        r.boxes
                            .get()
                            .iter()
                            .map(|b| b.width() as i64 * b.height() as i64)
                            .sum()
                    };
                    let query_area = query.width() as i64 * query.height() as i64;
                    if area(&covered) == query_area {
                        Contains::In
                    } else {
                        Contains::Part
                    }
                }
            }
        }
    }

    /// Tests how `other` relates to this region.
    pub fn contains_region(&self, other: &Region) -> Contains {
        if other.is_empty() {
            return Contains::Out;
        }
        let outside = other.subtract(self);
        if outside.is_empty() {
            Contains::In
        } else if outside == *other {
            Contains::Out
        } else {
            Contains::Part
        }
    }

    /// Structural equality after canonicalization (both operands are
    /// already canonical by invariant, so this is a plain slice compare).
    pub fn eq_region(&self, other: &Region) -> bool {
        self.boxes == other.boxes
    }

    /// Union of `self` and `other`.
    pub fn unite(&self, other: &Region) -> Region {
        combine(self, other, SetOp::Unite)
    }

    /// Intersection of `self` and `other`.
    pub fn intersect(&self, other: &Region) -> Region {
        combine(self, other, SetOp::Intersect)
    }

    /// `self` minus `other`.
    pub fn subtract(&self, other: &Region) -> Region {
        combine(self, other, SetOp::Subtract)
    }

    /// Symmetric difference of `self` and `other`.
    pub fn symmetric_difference(&self, other: &Region) -> Region {
        combine(self, other, SetOp::Xor)
    }

    /// In-place union; tolerates `other` aliasing `self`.
    pub fn unite_with(&mut self, other: &Region) {
        *self = self.unite(other);
    }

    /// In-place intersection; tolerates `other` aliasing `self`.
    pub fn intersect_with(&mut self, other: &Region) {
        *self = self.intersect(other);
    }

    /// In-place subtraction; tolerates `other` aliasing `self`.
    pub fn subtract_with(&mut self, other: &Region) {
        *self = self.subtract(other);
    }

    /// In-place symmetric difference; tolerates `other` aliasing `self`.
    pub fn symmetric_difference_with(&mut self, other: &Region) {
        *self = self.symmetric_difference(other);
    }

    fn recompute_extents(boxes: &[Box]) -> Option<Box> {
        let mut iter = boxes.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(b)))
    }
}

/// Combines the disjoint, sorted interval list `a` with `b` under `op`,
/// returning a new disjoint, sorted interval list.
///
/// Implemented as a coordinate-compressed coverage sweep: every interval
/// boundary from either input becomes a cut point, then each resulting
/// slice is kept or dropped by evaluating `op` against which side(s) cover
/// it, and adjacent kept slices are rejoined. This is the per-row
/// replacement for the original engine's pairwise x-interval walk; the
/// result is identical, but expressed as a single reusable sweep shared by
/// all four operators instead of bespoke merge logic per operator.
fn combine_intervals(a: &[(i32, i32)], b: &[(i32, i32)], op: SetOp) -> Vec<(i32, i32)> {
    let mut cuts: Vec<i32> = Vec::with_capacity(a.len() * 2 + b.len() * 2);
    for &(x1, x2) in a.iter().chain(b.iter()) {
        cuts.push(x1);
        cuts.push(x2);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let covers = |intervals: &[(i32, i32)], lo: i32, hi: i32| -> bool {
        intervals
            .iter()
            .any(|&(x1, x2)| x1 <= lo && hi <= x2)
    };

    let mut out: Vec<(i32, i32)> = Vec::new();
    for window in cuts.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        if lo >= hi {
            continue;
        }
        let in_a = covers(a, lo, hi);
        let in_b = covers(b, lo, hi);
        let active = match op {
            SetOp::Unite => in_a || in_b,
            SetOp::Intersect => in_a && in_b,
            SetOp::Subtract => in_a && !in_b,
            SetOp::Xor => in_a != in_b,
        };
        if !active {
            continue;
        }
        if let Some(last) = out.last_mut() {
            if last.1 == lo {
                last.1 = hi;
                continue;
            }
        }
        out.push((lo, hi));
    }
    out
}

/// Every distinct horizontal strip boundary across `a` and `b`'s boxes.
fn y_boundaries(a: &[Box], b: &[Box]) -> Vec<i32> {
    let mut ys: Vec<i32> = Vec::with_capacity(a.len() * 2 + b.len() * 2);
    for bx in a.iter().chain(b.iter()) {
        ys.push(bx.y1);
        ys.push(bx.y2);
    }
    ys.sort_unstable();
    ys.dedup();
    ys
}

/// The x-intervals of `boxes` that fully cover the horizontal strip
/// `[y_top, y_bot)`, in ascending x order.
fn row_intervals(boxes: &[Box], y_top: i32, y_bot: i32) -> Vec<(i32, i32)> {
    boxes
        .iter()
        .filter(|b| b.y1 <= y_top && b.y2 >= y_bot)
        .map(|b| (b.x1, b.x2))
        .collect()
}

fn combine(a: &Region, b: &Region, op: SetOp) -> Region {
    if a.is_empty() && b.is_empty() {
        return Region::new();
    }
    trace!(op = ?std::mem::discriminant(&op), a_boxes = a.boxes.get().len(), b_boxes = b.boxes.get().len(), "region: combine");

    let ys = y_boundaries(a.boxes.get(), b.boxes.get());
    let mut rows: Vec<(i32, i32, Vec<(i32, i32)>)> = Vec::with_capacity(ys.len());
    for window in ys.windows(2) {
        let (y_top, y_bot) = (window[0], window[1]);
        if y_top >= y_bot {
            continue;
        }
        let a_row = row_intervals(a.boxes.get(), y_top, y_bot);
        let b_row = row_intervals(b.boxes.get(), y_top, y_bot);
        let merged = combine_intervals(&a_row, &b_row, op);
        if !merged.is_empty() {
            rows.push((y_top, y_bot, merged));
        }
    }

    // (|A|+|B|)*2 is the original engine's worst-case output size; used here
    // as a reserve hint rather than a hard cap, so pathological inputs just
    // reallocate instead of failing.
    let hint = ((a.boxes.get().len() + b.boxes.get().len()) * 2).max(STACK_BOXES.min(16));
    let mut out: Vec<Box> = Vec::with_capacity(hint);
    let mut pending: Vec<Box> = Vec::new();
    let mut pending_spans: Vec<(i32, i32)> = Vec::new();
    for (y_top, y_bot, spans) in rows {
        let extends = pending_spans.len() == spans.len()
            && pending_spans.iter().zip(&spans).all(|(p, s)| p == s)
            && pending.first().map(|b| b.y2) == Some(y_top);
        if extends {
            for b in pending.iter_mut() {
                b.y2 = y_bot;
            }
        } else {
            out.append(&mut pending);
            pending = spans
                .iter()
                .map(|&(x1, x2)| Box {
                    x1,
                    y1: y_top,
                    x2,
                    y2: y_bot,
                })
                .collect();
            pending_spans = spans;
        }
    }
    out.append(&mut pending);

    let extents = Region::recompute_extents(&out);
    Region {
        boxes: CowCell::new(out),
        extents,
    }
}
