//! Converts one synthetic scanline from `Rgb16565` to `Argb32` and prints the
//! bytes. Run with `RUST_LOG=trace` to see the `Converter::setup` decision
//! trail.

use fog_core::descriptor::{CanonicalFormat, PixelDescriptor};
use fog_raster::Converter;

fn main() {
    tracing_subscriber::fmt::init();

    let src = PixelDescriptor::from_format_id(CanonicalFormat::Rgb16_565);
    let dst = PixelDescriptor::from_format_id(CanonicalFormat::Argb32);

    let converter = Converter::setup(dst, src).expect("rgb565 -> argb32 is always reachable");

    // A single 0xF800 (pure red, 565) pixel.
    let src_row = [0x00, 0xF8];
    let mut dst_row = [0u8; 4];
    converter.convert_row(&mut dst_row, &src_row, 1);

    println!("pipeline:  {:?}", converter.pipeline());
    println!("src bytes: {src_row:02x?}");
    println!("dst bytes: {dst_row:02x?}");
}
