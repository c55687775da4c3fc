//! Cross-crate integration tests for the fog workspace.
//!
//! These tests exercise `fog-core`, `fog-raster`, and `fog-region` together,
//! the way a painter or codec caller would: build an image, convert it,
//! clip it against a region, and check the end-to-end result.

#[cfg(test)]
mod tests {
    use fog_core::descriptor::CanonicalFormat;
    use fog_core::image::{ImageBuffer, OwnedImage};
    use fog_raster::Converter;
    use fog_region::{Box, Contains, Region};

    /// Converting a whole image row by row and writing it back through the
    /// `ImageBuffer` trait, the way a real caller would drive `Converter`.
    #[test]
    fn converts_an_owned_image_row_by_row() {
        let width = 4;
        let height = 3;
        let src_format = CanonicalFormat::Rgb16_565.descriptor();
        let dst_format = CanonicalFormat::Argb32.descriptor();

        let mut src = OwnedImage::new(width, height, src_format).unwrap();
        // Paint every pixel pure red (0xF800 in 565).
        for y in 0..height {
            for px in src.row_mut(y).chunks_exact_mut(2) {
                px.copy_from_slice(&0xF800u16.to_le_bytes());
            }
        }

        let mut dst = OwnedImage::new(width, height, dst_format).unwrap();
        let converter = Converter::setup(dst_format, src_format).unwrap();
        for y in 0..height {
            let src_row = src.row(y).to_vec();
            converter.convert_row(dst.row_mut(y), &src_row, width as usize);
        }

        for y in 0..height {
            for px in dst.row(y).chunks_exact(4) {
                // B, G, R, A: 565 has no alpha channel and Argb32 doesn't
                // force one, so the converted alpha byte is zero.
                assert_eq!(px, [0x00, 0x00, 0xFF, 0x00]);
            }
        }
    }

    /// A region built from an image's bounds and a cut-out both drive a
    /// caller's clip test the same way a painter's blitter would.
    #[test]
    fn region_clips_an_image_sized_rectangle() {
        let image = OwnedImage::new(64, 64, CanonicalFormat::Argb32.descriptor()).unwrap();
        let bounds = Region::from_box(
            Box::new(0, 0, image.width() as i32, image.height() as i32).unwrap(),
        );
        let hole = Region::from_box(Box::new(16, 16, 48, 48).unwrap());
        let visible = bounds.subtract(&hole);

        assert_eq!(visible.contains_point(4, 4), Contains::In);
        assert_eq!(visible.contains_point(32, 32), Contains::Out);
        assert_eq!(
            visible.extents(),
            Some(Box::new(0, 0, 64, 64).unwrap())
        );
    }

    /// Premultiplied round-trip through a real `OwnedImage`, exercising the
    /// middleware-fixup branch of `Converter::setup`.
    #[test]
    fn premultiply_then_demultiply_round_trips_through_images() {
        let straight = CanonicalFormat::Argb32.descriptor();
        let premul = CanonicalFormat::Prgb32.descriptor();

        let mut src = OwnedImage::new(1, 1, straight).unwrap();
        src.data_mut().copy_from_slice(&[0x80, 0x00, 0x00, 0x80]); // half-alpha blue-ish

        let to_premul = Converter::setup(premul, straight).unwrap();
        let mut mid = OwnedImage::new(1, 1, premul).unwrap();
        to_premul.convert_row(mid.row_mut(0), src.row(0), 1);

        let back = Converter::setup(straight, premul).unwrap();
        let mut round_tripped = OwnedImage::new(1, 1, straight).unwrap();
        back.convert_row(round_tripped.row_mut(0), mid.row(0), 1);

        for (a, b) in src.data().iter().zip(round_tripped.data()) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
    }
}
