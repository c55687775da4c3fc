//! The pipeline assembler: given a destination and source
//! [`PixelDescriptor`], chooses (once, at setup time) the cheapest reachable
//! span function or pair of span functions.
//!
//! See the module's `setup` for the eight-step decision procedure. Once
//! built, a [`Converter`] is infallible to run: every failure mode is
//! resolved during setup. [`Converter::convert_row`] handles one row;
//! [`Converter::convert_image`] fans a whole image's rows across a rayon
//! pool behind the `parallel` feature (on by default), falling back to a
//! plain row loop when it's off.

use crate::convert_pass::{ConvertPass, Middleware, MultiPass, LOW_BPC_STEP, MID_BPC_STEP};
use crate::dispatch::{Operator, RasterDispatch, SpanFn};
use crate::span::{self, SpanClosure};
use fog_core::descriptor::{CanonicalFormat, PixelCategory, PixelDescriptor};
use fog_core::error::{Error, Result};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The shape of pipeline [`Converter::setup`] picked, kept around only for
/// tests and diagnostics — `convert_row` dispatches on it internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// A direct dispatch-table hit (step 1).
    Direct,
    /// Bit-identical formats (step 2).
    Identity,
    /// Formats differ only by whole-pixel byte order (step 3).
    ByteSwapOnly,
    /// One generic pass, run in place (step 5/7, no middleware).
    OnePass,
    /// One generic pass followed by a middleware fixup on the destination
    /// (step 5/7, destination is the pivot format).
    OnePassPostMiddleware,
    /// A middleware fixup on the source followed by one generic pass (step
    /// 5/7, source is the pivot format).
    OnePassPreMiddleware,
    /// Two generic passes through a scratch pivot buffer (step 6/7).
    TwoPass,
}

/// A ready-to-run conversion pipeline between two pixel formats.
pub struct Converter {
    pipeline: Pipeline,
    direct: Option<SpanFn>,
    bpp: usize,
    unit_bytes: usize,
    one_pass: Option<ConvertPass>,
    middleware: Option<Middleware>,
    multi: Option<MultiPass>,
}

impl Converter {
    /// Runs the eight-step decision procedure and returns a ready pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when no reachable pipeline exists
    /// (step 8: source and destination both exceed 16 bits per channel and
    /// neither is canonical).
    pub fn setup(dst: PixelDescriptor, src: PixelDescriptor) -> Result<Converter> {
        // Step 1: direct dispatch-table hit.
        if let (PixelCategory::Canonical(dst_c), PixelCategory::Canonical(src_c)) =
            (dst.category(), src.category())
        {
            let table = RasterDispatch::new();
            if let Some(f) = table.lookup(dst_c, src_c, Operator::Src) {
                tracing::debug!(?dst_c, ?src_c, "converter: direct dispatch hit");
                return Ok(Converter {
                    pipeline: Pipeline::Direct,
                    direct: Some(f),
                    bpp: dst.bytes_per_pixel(),
                    unit_bytes: 0,
                    one_pass: None,
                    middleware: None,
                    multi: None,
                });
            }
        }

        // Step 2: identity.
        let keep_color_space = dst.premultiplied == src.premultiplied
            || (dst.premultiplied && src.a.size == 0)
            || (src.premultiplied && dst.a.size == 0);
        if dst.equals(&src) && keep_color_space {
            tracing::debug!("converter: identity mem-copy");
            return Ok(Converter {
                pipeline: Pipeline::Identity,
                direct: None,
                bpp: dst.bytes_per_pixel(),
                unit_bytes: 0,
                one_pass: None,
                middleware: None,
                multi: None,
            });
        }

        // Step 3: byte-order-only difference.
        if keep_color_space && is_byte_swap_of(&dst, &src) {
            tracing::debug!("converter: byte-swap only");
            return Ok(Converter {
                pipeline: Pipeline::ByteSwapOnly,
                direct: None,
                bpp: 0,
                unit_bytes: dst.bytes_per_pixel(),
                one_pass: None,
                middleware: None,
                multi: None,
            });
        }

        // Step 4: decide whether a middleware fixup is needed.
        let middleware_low = if !keep_color_space {
            Some(if dst.premultiplied {
                Middleware::PremultiplyArgb32
            } else {
                Middleware::DemultiplyArgb32
            })
        } else {
            None
        };

        // Step 5: <=8 bits per channel, pivot through ARGB32/XRGB32.
        if dst.is_low_bit_depth() && src.is_low_bit_depth() {
            let pivot_is_dst = matches!(
                dst.canonical,
                Some(CanonicalFormat::Argb32) | Some(CanonicalFormat::Xrgb32)
            );
            let pivot_is_src = matches!(
                src.canonical,
                Some(CanonicalFormat::Argb32) | Some(CanonicalFormat::Xrgb32)
            );
            if middleware_low.is_none() {
                tracing::trace!("converter: one-pass 8bpc pivot, no middleware");
                return Ok(Converter {
                    pipeline: Pipeline::OnePass,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: None,
                    multi: None,
                });
            }
            if pivot_is_dst {
                tracing::trace!("converter: one-pass 8bpc pivot, post-middleware");
                return Ok(Converter {
                    pipeline: Pipeline::OnePassPostMiddleware,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: middleware_low,
                    multi: None,
                });
            }
            if pivot_is_src {
                tracing::trace!("converter: one-pass 8bpc pivot, pre-middleware");
                return Ok(Converter {
                    pipeline: Pipeline::OnePassPreMiddleware,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: middleware_low,
                    multi: None,
                });
            }

            // Step 6: neither side is the 8bpc pivot itself; two passes
            // through a 4KiB ARGB32/XRGB32 scratch slab.
            let pivot_has_alpha = src.a.size > 0 || dst.a.size > 0;
            let pivot = if pivot_has_alpha {
                CanonicalFormat::Argb32.descriptor()
            } else {
                CanonicalFormat::Xrgb32.descriptor()
            };
            tracing::trace!("converter: two-pass 8bpc pivot via scratch slab");
            return Ok(Converter {
                pipeline: Pipeline::TwoPass,
                direct: None,
                bpp: 0,
                unit_bytes: 0,
                one_pass: None,
                middleware: None,
                multi: Some(MultiPass {
                    pass0: Some(ConvertPass::build(pivot, src)),
                    pass1: Some(ConvertPass::build(dst, pivot)),
                    middleware: middleware_low,
                    step: LOW_BPC_STEP,
                    pivot_bpp: 4,
                }),
            });
        }

        // Step 7: <=16 bits per channel, pivot through ARGB64/PRGB64.
        if dst.is_mid_bit_depth() && src.is_mid_bit_depth() {
            let middleware_mid = if !keep_color_space {
                Some(if dst.premultiplied {
                    Middleware::PremultiplyArgb64
                } else {
                    Middleware::DemultiplyArgb64
                })
            } else {
                None
            };
            let pivot_is_dst = matches!(
                dst.canonical,
                Some(CanonicalFormat::Argb64) | Some(CanonicalFormat::Prgb64)
            );
            let pivot_is_src = matches!(
                src.canonical,
                Some(CanonicalFormat::Argb64) | Some(CanonicalFormat::Prgb64)
            );
            if middleware_mid.is_none() {
                tracing::trace!("converter: one-pass 16bpc pivot, no middleware");
                return Ok(Converter {
                    pipeline: Pipeline::OnePass,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: None,
                    multi: None,
                });
            }
            if pivot_is_dst {
                return Ok(Converter {
                    pipeline: Pipeline::OnePassPostMiddleware,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: middleware_mid,
                    multi: None,
                });
            }
            if pivot_is_src {
                return Ok(Converter {
                    pipeline: Pipeline::OnePassPreMiddleware,
                    direct: None,
                    bpp: 0,
                    unit_bytes: 0,
                    one_pass: Some(ConvertPass::build(dst, src)),
                    middleware: middleware_mid,
                    multi: None,
                });
            }
            let pivot = if dst.premultiplied || src.premultiplied {
                CanonicalFormat::Prgb64.descriptor()
            } else {
                CanonicalFormat::Argb64.descriptor()
            };
            tracing::trace!("converter: two-pass 16bpc pivot via scratch slab");
            return Ok(Converter {
                pipeline: Pipeline::TwoPass,
                direct: None,
                bpp: 0,
                unit_bytes: 0,
                one_pass: None,
                middleware: None,
                multi: Some(MultiPass {
                    pass0: Some(ConvertPass::build(pivot, src)),
                    pass1: Some(ConvertPass::build(dst, pivot)),
                    middleware: middleware_mid,
                    step: MID_BPC_STEP,
                    pivot_bpp: 8,
                }),
            });
        }

        // Step 8: unreachable.
        Err(Error::invalid_argument(
            "no converter pipeline reaches this format pair".to_string(),
        ))
    }

    /// Converts one row of `width_px` pixels.
    pub fn convert_row(&self, dst: &mut [u8], src: &[u8], width_px: usize) {
        self.convert_row_with_closure(dst, src, width_px, &SpanClosure::new());
    }

    /// Converts one row of `width_px` pixels with an explicit dither phase.
    pub fn convert_row_with_closure(
        &self,
        dst: &mut [u8],
        src: &[u8],
        width_px: usize,
        closure: &SpanClosure,
    ) {
        match self.pipeline {
            Pipeline::Direct => (self.direct.unwrap())(dst, src, width_px, closure),
            Pipeline::Identity => span::mem_copy(dst, src, width_px, self.bpp),
            Pipeline::ByteSwapOnly => span::byte_swap(dst, src, width_px, self.unit_bytes),
            Pipeline::OnePass => self.one_pass.as_ref().unwrap().run(dst, src, width_px, closure),
            Pipeline::OnePassPostMiddleware => {
                let pass = self.one_pass.as_ref().unwrap();
                pass.run(dst, src, width_px, closure);
                self.middleware.unwrap().apply(dst, width_px);
            }
            Pipeline::OnePassPreMiddleware => {
                let mut scratch = src.to_vec();
                self.middleware.unwrap().apply(&mut scratch, width_px);
                self.one_pass
                    .as_ref()
                    .unwrap()
                    .run(dst, &scratch, width_px, closure);
            }
            Pipeline::TwoPass => self.run_two_pass(dst, src, width_px, closure),
        }
    }

    fn run_two_pass(&self, dst: &mut [u8], src: &[u8], width_px: usize, closure: &SpanClosure) {
        let multi = self.multi.as_ref().unwrap();
        let mut remaining = width_px;
        let mut src_off = 0usize;
        let mut dst_off = 0usize;
        let mut phase = *closure;
        let pass0 = multi.pass0.as_ref().unwrap();
        let pass1 = multi.pass1.as_ref().unwrap();
        let mut scratch = vec![0u8; multi.step * multi.pivot_bpp];

        while remaining > 0 {
            let n = remaining.min(multi.step);
            pass0.run(&mut scratch, &src[src_off..], n, &phase);
            if let Some(mw) = multi.middleware {
                mw.apply(&mut scratch, n);
            }
            pass1.run(&mut dst[dst_off..], &scratch, n, &phase);

            remaining -= n;
            src_off += n * pass0.src_bpp;
            dst_off += n * pass1.dst_bpp;
            phase = phase.advanced(n as u32);
        }
    }

    /// Converts a whole image of `height` rows, each `width_px` pixels wide,
    /// laid out as `dst_stride`/`src_stride` bytes per row (allowing row
    /// padding beyond `width_px` pixels, as `convert_row` already permits per
    /// row). The dither phase carries a fresh row origin `(0, y)` per row, so
    /// output matches calling [`Converter::convert_row`] row by row.
    ///
    /// With the `parallel` feature (on by default) rows fan out across a
    /// rayon thread pool; without it this runs the same rows serially.
    #[cfg(feature = "parallel")]
    pub fn convert_image(
        &self,
        dst: &mut [u8],
        src: &[u8],
        width_px: usize,
        height: usize,
        dst_stride: usize,
        src_stride: usize,
    ) {
        dst[..height * dst_stride]
            .par_chunks_mut(dst_stride)
            .zip(src[..height * src_stride].par_chunks(src_stride))
            .enumerate()
            .for_each(|(y, (dst_row, src_row))| {
                let closure = SpanClosure::at_origin(0, y as u32);
                self.convert_row_with_closure(dst_row, src_row, width_px, &closure);
            });
    }

    /// Serial fallback of [`Converter::convert_image`] when the `parallel`
    /// feature is disabled.
    #[cfg(not(feature = "parallel"))]
    pub fn convert_image(
        &self,
        dst: &mut [u8],
        src: &[u8],
        width_px: usize,
        height: usize,
        dst_stride: usize,
        src_stride: usize,
    ) {
        for y in 0..height {
            let closure = SpanClosure::at_origin(0, y as u32);
            self.convert_row_with_closure(
                &mut dst[y * dst_stride..(y + 1) * dst_stride],
                &src[y * src_stride..(y + 1) * src_stride],
                width_px,
                &closure,
            );
        }
    }

    /// The pipeline shape chosen for this conversion (diagnostics/tests).
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline
    }
}

/// `true` if `dst` and `src` describe the same channel layout except for
/// whole-pixel byte order.
fn is_byte_swap_of(dst: &PixelDescriptor, src: &PixelDescriptor) -> bool {
    if dst.depth != src.depth || dst.premultiplied != src.premultiplied || dst.indexed != src.indexed
    {
        return false;
    }
    if dst.equals(src) {
        return false; // identity already handled by step 2
    }
    let bytes = dst.depth / 8;
    let swapped = |f: fog_core::descriptor::ChannelField| -> fog_core::descriptor::ChannelField {
        if f.size == 0 || f.size % 8 != 0 {
            return f;
        }
        let byte_idx = f.shift / 8;
        let new_byte_idx = bytes - 1 - byte_idx;
        fog_core::descriptor::ChannelField {
            mask: (f.mask >> f.shift) << (new_byte_idx * 8),
            shift: new_byte_idx * 8,
            size: f.size,
        }
    };
    swapped(src.a) == dst.a
        && swapped(src.r) == dst.r
        && swapped(src.g) == dst.g
        && swapped(src.b) == dst.b
}

#[cfg(test)]
mod tests {
    use super::*;
    use fog_core::descriptor::CanonicalFormat;

    #[test]
    fn identical_canonical_formats_hit_direct_dispatch() {
        let c = Converter::setup(
            CanonicalFormat::Argb32.descriptor(),
            CanonicalFormat::Argb32.descriptor(),
        )
        .unwrap();
        assert_eq!(c.pipeline(), Pipeline::Direct);
    }

    #[test]
    fn endian_swap_scenario() {
        let native = CanonicalFormat::Argb32.descriptor();
        let swapped_fields = PixelDescriptor::from_fields(
            32,
            fog_core::descriptor::ChannelField { mask: 0x000000FF, shift: 0, size: 8 },
            fog_core::descriptor::ChannelField { mask: 0x0000FF00, shift: 8, size: 8 },
            fog_core::descriptor::ChannelField { mask: 0x00FF0000, shift: 16, size: 8 },
            fog_core::descriptor::ChannelField { mask: 0xFF000000, shift: 24, size: 8 },
            false,
            false,
            false,
            false,
        )
        .unwrap();
        let c = Converter::setup(native, swapped_fields).unwrap();
        assert_eq!(c.pipeline(), Pipeline::ByteSwapOnly);

        let src = [0x11u8, 0x22, 0x33, 0x44, 0xAA, 0xBB, 0xCC, 0xDD];
        let mut dst = [0u8; 8];
        c.convert_row(&mut dst, &src, 2);
        assert_eq!(dst, [0x44, 0x33, 0x22, 0x11, 0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn premultiply_scenario_via_middleware() {
        let c = Converter::setup(
            CanonicalFormat::Prgb32.descriptor(),
            CanonicalFormat::Argb32.descriptor(),
        )
        .unwrap();
        let pixel = (0x80u32 << 24) | (0xFF << 16);
        let src = pixel.to_ne_bytes();
        let mut dst = [0u8; 4];
        c.convert_row(&mut dst, &src, 1);
        let out = u32::from_ne_bytes(dst);
        assert_eq!((out >> 24) & 0xFF, 0x80);
        assert_eq!((out >> 16) & 0xFF, 0x80);
    }

    #[test]
    fn rgb565_to_xrgb32_scenario() {
        let c = Converter::setup(
            CanonicalFormat::Xrgb32.descriptor(),
            CanonicalFormat::Rgb16_565.descriptor(),
        )
        .unwrap();
        let src = 0xF81Fu16.to_le_bytes();
        let mut dst = [0u8; 4];
        c.convert_row(&mut dst, &src, 1);
        assert_eq!(dst, [0xF8, 0x00, 0xF8, 0xFF]);
    }

    #[test]
    fn two_pass_pivot_handles_tiling_across_scratch_boundary() {
        use fog_core::descriptor::ChannelField;
        // A hand-built premultiplied 16bpp ARGB layout: has alpha, is not
        // one of the canonical pivot formats, and disagrees with
        // Argb16_4444 on premultiplication, so neither side is a pivot and
        // a middleware fixup is required -> two-pass.
        let dst = PixelDescriptor::from_fields(
            16,
            ChannelField { mask: 0xF000, shift: 12, size: 4 },
            ChannelField { mask: 0x0F00, shift: 8, size: 4 },
            ChannelField { mask: 0x00F0, shift: 4, size: 4 },
            ChannelField { mask: 0x000F, shift: 0, size: 4 },
            false,
            true,
            false,
            false,
        )
        .unwrap();
        let src = CanonicalFormat::Argb16_4444.descriptor();
        let c = Converter::setup(dst, src).unwrap();
        assert_eq!(c.pipeline(), Pipeline::TwoPass);

        let width = LOW_BPC_STEP * 2 + 3;
        let src_bytes = vec![0xFFu8; width * 2];
        let mut dst_bytes = vec![0u8; width * 2];
        c.convert_row(&mut dst_bytes, &src_bytes, width);
        // Fully opaque, fully saturated input premultiplies to itself.
        for chunk in dst_bytes.chunks(2) {
            assert_eq!(u16::from_ne_bytes([chunk[0], chunk[1]]), 0xFFFF);
        }
    }

    #[test]
    fn dither_phase_is_continuous_across_tile_boundaries() {
        // Xrgb32 -> Rgb16_565 narrows 8-bit channels to 5/6 bits, so the
        // dither nudge actually has somewhere to apply; splitting the row
        // into two closure-advanced calls must reproduce the single-call
        // output pixel for pixel.
        let c = Converter::setup(
            CanonicalFormat::Rgb16_565.descriptor(),
            CanonicalFormat::Xrgb32.descriptor(),
        )
        .unwrap();
        let width = 37usize;
        let src: Vec<u8> = (0..width as u32)
            .flat_map(|i| {
                let v = ((i * 7) % 256) as u8;
                [v, v, v, 0xFF]
            })
            .collect();

        let mut whole = vec![0u8; width * 2];
        c.convert_row(&mut whole, &src, width);

        let split = width / 2;
        let mut tiled = vec![0u8; width * 2];
        let origin = SpanClosure::new();
        c.convert_row_with_closure(&mut tiled[..split * 2], &src[..split * 4], split, &origin);
        let advanced = origin.advanced(split as u32);
        c.convert_row_with_closure(
            &mut tiled[split * 2..],
            &src[split * 4..],
            width - split,
            &advanced,
        );

        assert_eq!(tiled, whole);
    }

    #[test]
    fn convert_image_matches_row_by_row_conversion() {
        let c = Converter::setup(
            CanonicalFormat::Xrgb32.descriptor(),
            CanonicalFormat::Rgb16_565.descriptor(),
        )
        .unwrap();
        let width = 9usize;
        let height = 5usize;
        let src_stride = width * 2;
        let dst_stride = width * 4;
        let src: Vec<u8> = (0..height as u32)
            .flat_map(|y| {
                (0..width as u32).flat_map(move |x| ((x * 37 + y * 11) as u16 % 0xFFFF).to_le_bytes())
            })
            .collect();

        let mut expected = vec![0u8; height * dst_stride];
        for y in 0..height {
            let closure = SpanClosure::at_origin(0, y as u32);
            c.convert_row_with_closure(
                &mut expected[y * dst_stride..(y + 1) * dst_stride],
                &src[y * src_stride..(y + 1) * src_stride],
                width,
                &closure,
            );
        }

        let mut actual = vec![0u8; height * dst_stride];
        c.convert_image(&mut actual, &src, width, height, dst_stride, src_stride);

        assert_eq!(actual, expected);
    }

    #[test]
    fn unreachable_pair_is_an_error() {
        use fog_core::descriptor::ChannelField;
        // A depth-64 layout with a 20-bit-wide red channel exceeds the
        // <=16-bits-per-channel pivot and is not canonical, so no pipeline
        // reaches it.
        let wide_r = PixelDescriptor::from_fields(
            64,
            ChannelField::NONE,
            ChannelField { mask: 0x0000_000F_FFFF_0000, shift: 16, size: 20 },
            ChannelField::NONE,
            ChannelField::NONE,
            false,
            false,
            false,
            false,
        )
        .unwrap();
        let other_wide = PixelDescriptor::from_fields(
            64,
            ChannelField::NONE,
            ChannelField::NONE,
            ChannelField { mask: 0x0000_000F_FFFF_0000, shift: 16, size: 20 },
            ChannelField::NONE,
            false,
            false,
            false,
            false,
        )
        .unwrap();
        let err = Converter::setup(wide_r, other_wide).unwrap_err();
        assert!(err.to_string().contains("no converter pipeline"));
    }
}
