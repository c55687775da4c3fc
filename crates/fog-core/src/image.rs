//! The image buffer contract.
//!
//! The conversion and region engines never own a concrete image type —
//! callers (a painter, a codec, a GUI surface) bring their own buffer and
//! implement [`ImageBuffer`] over it. [`OwnedImage`] is a minimal
//! implementation used by this crate's own tests and by the `demos/`
//! samples.
//!
//! # Memory layout
//!
//! Pixels are stored row-major, top to bottom, `stride` bytes per row
//! (`stride >= width * format.bytes_per_pixel()`).
//!
//! # Used by
//!
//! - `fog-raster::Converter` - reads a source buffer, writes a destination
//!   buffer, row by row.
//! - `fog-region` - clips blits against a buffer's width/height only.

use crate::descriptor::PixelDescriptor;
use crate::error::{Error, Result};
use std::sync::Arc;

/// The pixel buffer contract the conversion and raster engines require.
///
/// Implementors provide raw row access; this crate never assumes a
/// particular allocation strategy, only that `stride` bytes separate
/// consecutive rows and that the buffer holds at least
/// `height * stride` bytes.
pub trait ImageBuffer {
    /// Pixel format of the buffer's contents.
    fn format(&self) -> PixelDescriptor;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Row stride in bytes. May exceed `width * bytes_per_pixel()` for
    /// alignment padding.
    fn stride(&self) -> usize;

    /// Read-only access to the whole buffer.
    fn data(&self) -> &[u8];

    /// Exclusive access to the whole buffer. Implementors backed by a
    /// copy-on-write allocation should detach here.
    fn data_mut(&mut self) -> &mut [u8];

    /// Palette entries (ARGB32-encoded), defined only when
    /// `format().indexed` is `true`.
    fn palette(&self) -> Option<&[u32]> {
        None
    }

    /// Mutable palette access; see [`ImageBuffer::palette`].
    fn palette_mut(&mut self) -> Option<&mut [u32]> {
        None
    }

    /// Byte offset and length of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height()`. This mirrors the span-function contract:
    /// row bounds are the caller's responsibility, not a recoverable error.
    fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height(), "row {y} out of bounds");
        let stride = self.stride();
        let start = y as usize * stride;
        let width_bytes = self.width() as usize * self.format().bytes_per_pixel();
        &self.data()[start..start + width_bytes]
    }

    /// Mutable counterpart of [`ImageBuffer::row`].
    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height(), "row {y} out of bounds");
        let stride = self.stride();
        let width_bytes = self.width() as usize * self.format().bytes_per_pixel();
        let start = y as usize * stride;
        &mut self.data_mut()[start..start + width_bytes]
    }
}

/// A reference-counted, copy-on-write pixel buffer.
///
/// Cloning an `OwnedImage` is `O(1)` (it bumps the backing `Arc`'s
/// refcount); the first mutation after a clone copies the buffer via
/// [`Arc::make_mut`], matching the reference stack's COW discipline for
/// its own image type.
#[derive(Debug, Clone)]
pub struct OwnedImage {
    format: PixelDescriptor,
    width: u32,
    height: u32,
    stride: usize,
    data: Arc<Vec<u8>>,
    palette: Option<Arc<Vec<u32>>>,
}

impl OwnedImage {
    /// Allocates a zero-filled buffer of `width x height` pixels in
    /// `format`, with a minimal stride (no row padding).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `width` or `height` is zero,
    /// or [`Error::ResourceExhaustion`] if the byte size would overflow
    /// `usize`.
    pub fn new(width: u32, height: u32, format: PixelDescriptor) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_argument(format!(
                "zero dimension: {width}x{height}"
            )));
        }
        let stride = width as usize * format.bytes_per_pixel();
        let total = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::resource_exhaustion(usize::MAX, "size overflow"))?;
        let palette = format.indexed.then(|| Arc::new(vec![0u32; 256]));
        Ok(OwnedImage {
            format,
            width,
            height,
            stride,
            data: Arc::new(vec![0u8; total]),
            palette,
        })
    }

    /// Wraps caller-supplied pixel bytes with an explicit stride.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `stride` is smaller than one
    /// packed row or `data` is too short for `height * stride`.
    pub fn from_bytes(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelDescriptor,
        data: Vec<u8>,
    ) -> Result<Self> {
        let min_stride = width as usize * format.bytes_per_pixel();
        if stride < min_stride {
            return Err(Error::invalid_argument(format!(
                "stride {stride} smaller than minimum {min_stride}"
            )));
        }
        if data.len() < stride * height as usize {
            return Err(Error::invalid_argument(
                "buffer shorter than height * stride".to_string(),
            ));
        }
        let palette = format.indexed.then(|| Arc::new(vec![0u32; 256]));
        Ok(OwnedImage {
            format,
            width,
            height,
            stride,
            data: Arc::new(data),
            palette,
        })
    }

    /// Ensures this handle has exclusive access to its backing storage,
    /// cloning the buffer if another handle shares it.
    pub fn detach(&mut self) {
        let _ = Arc::make_mut(&mut self.data);
        if let Some(palette) = &mut self.palette {
            let _ = Arc::make_mut(palette);
        }
    }

    /// `true` if this handle is the sole owner of its backing storage.
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.data) == 1
    }
}

impl ImageBuffer for OwnedImage {
    fn format(&self) -> PixelDescriptor {
        self.format
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data)
    }

    fn palette(&self) -> Option<&[u32]> {
        self.palette.as_deref()
    }

    fn palette_mut(&mut self) -> Option<&mut [u32]> {
        self.palette.as_mut().map(Arc::make_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CanonicalFormat;

    #[test]
    fn new_buffer_is_zeroed() {
        let img = OwnedImage::new(4, 4, CanonicalFormat::Argb32.descriptor()).unwrap();
        assert!(img.data().iter().all(|&b| b == 0));
        assert_eq!(img.stride(), 16);
    }

    #[test]
    fn clone_then_write_detaches_copy_on_write() {
        let img = OwnedImage::new(2, 2, CanonicalFormat::A8.descriptor()).unwrap();
        let mut clone = img.clone();
        assert!(!clone.is_unique());
        clone.data_mut()[0] = 0xFF;
        assert!(clone.is_unique());
        assert_eq!(img.data()[0], 0);
        assert_eq!(clone.data()[0], 0xFF);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(OwnedImage::new(0, 4, CanonicalFormat::Argb32.descriptor()).is_err());
    }

    #[test]
    fn row_bounds_match_stride() {
        let img = OwnedImage::new(3, 2, CanonicalFormat::A8.descriptor()).unwrap();
        assert_eq!(img.row(0).len(), 3);
        assert_eq!(img.row(1).len(), 3);
    }

    #[test]
    fn indexed_formats_allocate_a_palette() {
        let img = OwnedImage::new(4, 4, CanonicalFormat::I8.descriptor()).unwrap();
        assert_eq!(img.palette().unwrap().len(), 256);
    }
}
