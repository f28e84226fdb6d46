// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits the pixel grid into one region of work per worker.
//!
//! Regions are horizontal bands spanning the full width of the grid.
//! Because the pixel buffer is row-major, a band is a contiguous run
//! of the buffer, which lets each worker be handed its own `&mut`
//! slice.  Band heights differ by at most one row, and the bands
//! together cover every pixel exactly once.

use errors::EngineError;
use itertools::iproduct;
use planes::{IntegralPlane, Pixel, PlaneView};
use std::ops::Range;

/// A rectangle of pixels `[min_x, max_x) x [min_y, max_y)` and the
/// view it is to be rendered with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    /// First column.
    pub min_x: usize,
    /// One past the last column.
    pub max_x: usize,
    /// First row.
    pub min_y: usize,
    /// One past the last row.
    pub max_y: usize,
    /// The view the region is rendered with.
    pub view: PlaneView,
}

impl Region {
    /// The number of pixels in the region.
    pub fn len(&self) -> usize {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// True when the region holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The region's pixels, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(self.min_y..self.max_y, self.min_x..self.max_x).map(|(y, x)| Pixel(x, y))
    }

    /// The run of a row-major buffer of the given width the region
    /// occupies.  Only meaningful for full-width bands.
    pub fn offsets(&self, width: usize) -> Range<usize> {
        (self.min_y * width)..(self.max_y * width)
    }
}

/// Partitions the plane into `threads` full-width bands, top to
/// bottom.  A band is never less than one row, so with more threads
/// than rows there is one band per row.
pub fn partition(
    plane: IntegralPlane,
    threads: usize,
    view: PlaneView,
) -> Result<Vec<Region>, EngineError> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads);
    }
    if plane.is_empty() {
        return Err(EngineError::EmptyGrid(plane.0, plane.1));
    }

    let IntegralPlane(width, height) = plane;
    let bands = threads.min(height);
    let (rows, extra) = (height / bands, height % bands);
    let mut regions = Vec::with_capacity(bands);
    let mut min_y = 0;
    for band in 0..bands {
        let max_y = min_y + rows + if band < extra { 1 } else { 0 };
        regions.push(Region {
            min_x: 0,
            max_x: width,
            min_y,
            max_y,
            view,
        });
        min_y = max_y;
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(plane: IntegralPlane, threads: usize) -> Vec<u32> {
        let mut seen = vec![0u32; plane.len()];
        for region in partition(plane, threads, PlaneView::default()).unwrap() {
            for Pixel(x, y) in region.pixels() {
                seen[y * plane.0 + x] += 1;
            }
        }
        seen
    }

    #[test]
    fn every_pixel_is_covered_exactly_once() {
        let planes = [
            IntegralPlane(1280, 720),
            IntegralPlane(1281, 721),
            IntegralPlane(7, 3),
            IntegralPlane(1, 1),
            IntegralPlane(13, 97),
        ];
        for &plane in &planes {
            for threads in 1..=17 {
                let seen = coverage(plane, threads);
                assert!(
                    seen.iter().all(|&n| n == 1),
                    "{:?} with {} threads",
                    plane,
                    threads
                );
            }
        }
    }

    #[test]
    fn produces_one_region_per_thread() {
        for threads in 1..=16 {
            let regions = partition(IntegralPlane(1280, 720), threads, PlaneView::default()).unwrap();
            assert_eq!(regions.len(), threads);
        }
    }

    #[test]
    fn bands_are_balanced() {
        let regions = partition(IntegralPlane(100, 10), 4, PlaneView::default()).unwrap();
        let heights: Vec<usize> = regions.iter().map(|r| r.max_y - r.min_y).collect();
        assert_eq!(heights, vec![3, 3, 2, 2]);
    }

    #[test]
    fn bands_are_contiguous_runs_of_the_buffer() {
        let regions = partition(IntegralPlane(9, 10), 3, PlaneView::default()).unwrap();
        assert_eq!(regions[0].offsets(9), 0..36);
        assert_eq!(regions[1].offsets(9), 36..63);
        assert_eq!(regions[2].offsets(9), 63..90);
        for region in &regions {
            assert_eq!(region.offsets(9).len(), region.len());
        }
    }

    #[test]
    fn more_threads_than_rows_gives_one_band_per_row() {
        let regions = partition(IntegralPlane(4, 2), 5, PlaneView::default()).unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.max_y - r.min_y == 1));
    }

    #[test]
    fn huge_thread_counts_do_not_allocate_per_thread() {
        for &threads in &[usize::MAX / 2, usize::MAX] {
            let regions = partition(IntegralPlane(16, 9), threads, PlaneView::default()).unwrap();
            assert_eq!(regions.len(), 9);
            assert_eq!(regions[8].max_y, 9);
        }
    }

    #[test]
    fn regions_carry_the_view() {
        let view = PlaneView::new(0.004, -0.7, 0.0);
        for region in partition(IntegralPlane(8, 8), 2, view).unwrap() {
            assert_eq!(region.view, view);
        }
    }

    #[test]
    fn zero_threads_is_rejected() {
        match partition(IntegralPlane(8, 8), 0, PlaneView::default()) {
            Err(EngineError::ZeroThreads) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(partition(IntegralPlane(0, 8), 2, PlaneView::default()).is_err());
    }
}
