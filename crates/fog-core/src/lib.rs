//! # fog-core
//!
//! Foundational types shared by the Fog graphics framework's conversion and
//! region engines:
//!
//! - [`PixelDescriptor`] / [`CanonicalFormat`] - immutable pixel format description
//! - [`Error`] / [`Result`] - the framework's unified error type
//! - [`ImageBuffer`] / [`OwnedImage`] - the pixel buffer contract
//! - [`CowCell`] - the copy-on-write cell `fog-region`'s `Region` wraps its
//!   box list in (`OwnedImage` below uses `Arc` directly for the same effect)
//!
//! ## Crate structure
//!
//! This crate has no internal dependencies. `fog-raster` and `fog-region`
//! both depend on it:
//!
//! ```text
//! fog-core (this crate)
//!    ^
//!    |
//!    +-- fog-raster (Converter, SpanOps, RasterDispatch)
//!    +-- fog-region (Region algebra)
//! ```

#![warn(missing_docs)]

pub mod cow;
pub mod descriptor;
pub mod error;
pub mod image;

pub use cow::CowCell;
pub use descriptor::{CanonicalFormat, ChannelField, PixelDescriptor, PixelCategory};
pub use error::{Error, Result};
pub use image::{ImageBuffer, OwnedImage};

/// Prelude module for convenient imports.
///
/// ```
/// use fog_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::descriptor::{CanonicalFormat, ChannelField, PixelCategory, PixelDescriptor};
    pub use crate::error::{Error, Result};
    pub use crate::image::{ImageBuffer, OwnedImage};
}
