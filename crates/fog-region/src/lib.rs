//! # fog-region
//!
//! A copy-on-write, Y-X-sorted band-list region algebra: `unite`,
//! `intersect`, `subtract`, `symmetricDifference`, point/rect/region
//! containment, translate/shrink/frame.
//!
//! - [`Box`] - a half-open rectangle (`x1 < x2`, `y1 < y2`)
//! - [`Region`] - the region value type, built from a sorted, coalesced
//!   list of boxes
//! - [`Contains`] - the three-way containment result (`Out`/`In`/`Part`)
//!
//! ```
//! use fog_region::{Box, Region};
//!
//! let a = Region::from_box(Box::new(0, 0, 10, 10).unwrap());
//! let b = Region::from_box(Box::new(5, 0, 15, 10).unwrap());
//! let u = a.unite(&b);
//! assert_eq!(u.boxes(), &[Box::new(0, 0, 15, 10).unwrap()]);
//! ```

#![warn(missing_docs)]

pub mod box_;
pub mod region;

pub use box_::Box;
pub use region::{Contains, Region};

/// Size of the on-stack scratch buffer binary operators prefer before
/// spilling to the heap. Matches the original engine's `Fog_Region_Local`.
pub const STACK_BOXES: usize = 256;
