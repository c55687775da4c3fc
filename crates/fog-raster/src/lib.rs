//! # fog-raster
//!
//! Pixel-format conversion and span compositing for the Fog graphics
//! framework.
//!
//! - [`span`] - inner-loop span functions (copy, byte-swap, premultiply,
//!   channel-general pack/unpack, ordered dithering)
//! - [`convert_pass`] - the per-channel constants a generic pass is driven by
//! - [`converter`] - [`converter::Converter`], the pipeline assembler
//! - [`dispatch`] - the `[dst][src][operator]` raster dispatch table and
//!   [`dispatch::Operator`]
//! - [`composite`] - [`composite::Compositor`], the generic Porter-Duff
//!   fallback behind the dispatch table
//!
//! ```
//! use fog_core::descriptor::CanonicalFormat;
//! use fog_raster::converter::Converter;
//!
//! let converter = Converter::setup(
//!     CanonicalFormat::Xrgb32.descriptor(),
//!     CanonicalFormat::Rgb16_565.descriptor(),
//! ).unwrap();
//! let src: [u8; 2] = 0xF81Fu16.to_le_bytes(); // R=max, G=0, B=max
//! let mut dst = [0u8; 4];
//! converter.convert_row(&mut dst, &src, 1);
//! assert_eq!(dst, [0xFF, 0x00, 0xFF, 0xFF]); // B, G, R, forced alpha
//! ```

#![warn(missing_docs)]

pub mod composite;
pub mod convert_pass;
pub mod converter;
pub mod dispatch;
pub mod span;

pub use composite::Compositor;
pub use convert_pass::{ConvertPass, MultiPass};
pub use converter::Converter;
pub use dispatch::{Operator, RasterDispatch};
