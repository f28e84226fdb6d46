// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quantizes escape-time values into colors.
//!
//! The gradient runs red -> blue -> green -> red -> black over the
//! iteration counts 0 -> 16 -> 32 -> 64 -> 127, with the iteration cap
//! always black.  Channel arithmetic is done in 8 bits and wraps, and
//! every band past the first is selected on the low byte of the count,
//! so counts above 255 cycle back through the gradient.  This is the
//! look of the palette and is reproduced exactly.

use image::Rgb;

/// Pure black, used for points inside the set.
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Pure red, used for points that escape immediately.
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Iteration counts below this are served from the `ColorTable`.
pub const TABLE_SIZE: usize = 128;

/// The color of a point that escaped at `iterations`, given the cap.
pub fn color_of(iterations: usize, max_iterations: usize) -> Rgb<u8> {
    if iterations == max_iterations {
        return BLACK;
    }
    if iterations == 0 {
        return RED;
    }

    // Truncation to a byte at each step gives the wraparound.
    let n = i32::from(iterations as u8);
    let (r, g, b) = if iterations < 16 {
        (16 * (16 - n), 0, 16 * n - 1)
    } else if n < 32 {
        (0, 16 * (n - 16), 16 * (32 - n) - 1)
    } else if n < 64 {
        (8 * (n - 32), 8 * (64 - n) - 1, 0)
    } else {
        (255 - (n - 64) * 4, 0, 0)
    };
    Rgb([r as u8, g as u8, b as u8])
}

/// Precomputed colors for the common low iteration counts, plus the
/// cap.  Anything else falls through to `color_of`.
#[derive(Clone, Debug)]
pub struct ColorTable {
    max_iterations: usize,
    colors: Vec<Rgb<u8>>,
}

impl ColorTable {
    /// Builds the table for an iteration cap.  Rebuild whenever the
    /// cap changes.
    pub fn new(max_iterations: usize) -> Self {
        ColorTable {
            max_iterations,
            colors: (0..TABLE_SIZE)
                .map(|n| color_of(n, max_iterations))
                .collect(),
        }
    }

    /// The cap this table was built for.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Looks up the color for an iteration count.
    #[inline]
    pub fn get(&self, iterations: usize) -> Rgb<u8> {
        if iterations == self.max_iterations {
            BLACK
        } else if iterations < TABLE_SIZE {
            self.colors[iterations]
        } else {
            color_of(iterations, self.max_iterations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_black_and_zero_is_red() {
        for &cap in &[1, 16, 100, 127, 128, 1000, 5000] {
            assert_eq!(color_of(cap, cap), BLACK);
            assert_eq!(color_of(0, cap), RED);
        }
    }

    #[test]
    fn gradient_bands() {
        assert_eq!(color_of(1, 1000), Rgb([240, 0, 15]));
        assert_eq!(color_of(15, 1000), Rgb([16, 0, 239]));
        assert_eq!(color_of(16, 1000), Rgb([0, 0, 255]));
        assert_eq!(color_of(31, 1000), Rgb([0, 240, 15]));
        assert_eq!(color_of(32, 1000), Rgb([0, 255, 0]));
        assert_eq!(color_of(63, 1000), Rgb([248, 7, 0]));
        assert_eq!(color_of(64, 1000), Rgb([255, 0, 0]));
        assert_eq!(color_of(127, 1000), Rgb([3, 0, 0]));
    }

    #[test]
    fn early_escapes_fall_in_the_red_to_blue_band() {
        for n in 1..16 {
            let Rgb([r, g, b]) = color_of(n, 1000);
            assert_eq!(g, 0);
            assert!(r > 0 && b > 0, "{} -> {:?}", n, (r, g, b));
        }
    }

    #[test]
    fn high_counts_wrap_in_eight_bits() {
        // 255 - (128 - 64) * 4 is -1, which wraps to 255.
        assert_eq!(color_of(128, 1000), Rgb([255, 0, 0]));
        // 129 -> 255 - 260 wraps to 251.
        assert_eq!(color_of(129, 1000), Rgb([251, 0, 0]));
        // 260 is 4 in the low byte, so it lands in the blue -> green band.
        assert_eq!(color_of(260, 1000), Rgb([0, 64, 191]));
        // And 256 is 0 in the low byte: 16 * (0 - 16) and 16 * 32 - 1 wrap.
        assert_eq!(color_of(256, 1000), Rgb([0, 0, 255]));
    }

    #[test]
    fn table_agrees_with_direct_computation() {
        for &cap in &[1, 50, 127, 1000] {
            let table = ColorTable::new(cap);
            assert_eq!(table.max_iterations(), cap);
            for n in 0..=cap.min(600) {
                assert_eq!(table.get(n), color_of(n, cap), "cap {} n {}", cap, n);
            }
            assert_eq!(table.get(cap), BLACK);
        }
    }
}
