//! Builds two overlapping rectangular regions and prints the result of each
//! binary operator, demonstrating the band list a caller would iterate to
//! drive a clipped blit.

use fog_region::{Box, Region};

fn main() {
    let a = Region::from_box(Box::new(0, 0, 20, 20).unwrap());
    let b = Region::from_box(Box::new(10, 10, 30, 30).unwrap());

    for (name, r) in [
        ("union", a.unite(&b)),
        ("intersect", a.intersect(&b)),
        ("subtract", a.subtract(&b)),
        ("xor", a.symmetric_difference(&b)),
    ] {
        println!("{name}:");
        for bx in r.boxes() {
            println!("  ({}, {}) - ({}, {})", bx.x1, bx.y1, bx.x2, bx.y2);
        }
    }
}
