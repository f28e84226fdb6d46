// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a view onto the complex plane defined by a zoom factor and the
//! complex coordinate sitting under the center of the integral plane.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

impl IntegralPlane {
    /// The total number of pixels on the plane.
    pub fn len(&self) -> usize {
        self.0 * self.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.0 == 0 || self.1 == 0
    }
}

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The visible rectangle of the complex plane.  `zoom` is the size of
/// one pixel in complex units; the offset is the complex coordinate
/// under the center of the screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneView {
    /// Complex units per pixel.
    pub zoom: f64,
    /// Real part of the point under the screen center.
    pub offset_x: f64,
    /// Imaginary part of the point under the screen center.
    pub offset_y: f64,
}

impl PlaneView {
    /// Constructor.
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64) -> Self {
        PlaneView {
            zoom,
            offset_x,
            offset_y,
        }
    }
}

impl Default for PlaneView {
    fn default() -> Self {
        PlaneView::new(0.0, 0.0, 0.0)
    }
}

/// Maps pixels of an integral plane onto the complex plane through a
/// `PlaneView`, and back again.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The right-lower hand corner of the integral cartesian plane.
    /// The left-upper is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The view of the complex plane being mapped onto.
    pub view: PlaneView,
    // Half the width and height of the integral plane; the pixel that
    // sits on top of the view's offset.
    center: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  A zero zoom is a legal, if degenerate, view: every
    /// pixel collapses onto the offset.
    pub fn new(plane: IntegralPlane, view: PlaneView) -> PlaneMapper {
        PlaneMapper {
            integral_plane: plane,
            view,
            center: ((plane.0 as f64) / 2.0, (plane.1 as f64) / 2.0),
        }
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.len()
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.is_empty()
    }

    /// Given a pixel on the integral cartesian plane, map it to a point
    /// on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            ((pixel.0 as f64) - self.center.0) * self.view.zoom + self.view.offset_x,
            ((pixel.1 as f64) - self.center.1) * self.view.zoom + self.view.offset_y,
        )
    }

    /// The inverse of `pixel_to_point`.  Returns fractional pixel
    /// coordinates, which may lie off the integral plane.  With a zero
    /// zoom the mapping is not invertible and there is no answer.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<(f64, f64)> {
        if self.view.zoom == 0.0 {
            return None;
        }
        Some((
            (point.re - self.view.offset_x) / self.view.zoom + self.center.0,
            (point.im - self.view.offset_y) / self.view.zoom + self.center.1,
        ))
    }

    /// The row-major offset of a pixel in a buffer the size of the
    /// integral plane.
    pub fn pixel_to_offset(&self, pixel: &Pixel) -> Option<usize> {
        if pixel.0 >= self.integral_plane.0 || pixel.1 >= self.integral_plane.1 {
            return None;
        }
        Some(pixel.1 * self.integral_plane.0 + pixel.0)
    }
}
