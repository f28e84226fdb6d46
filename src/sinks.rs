// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two buffers a frame can be rendered into.
//!
//! A `PointCloudSink` holds one colored point per pixel, each pinned
//! to its screen position; a `RasterSink` holds a plain grid of colors
//! and turns it into an image on commit.  Both expose their pixels as
//! a row-major slice of slots, so the renderer can hand disjoint runs
//! of it to its workers, and both publish an immutable `Frame` when
//! the computation is committed.

use image::{Rgb, RgbImage};
use planes::IntegralPlane;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use colors::BLACK;

/// Which representation the engine renders into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// One colored point per pixel at a fixed screen position.
    PointCloud,
    /// A two-dimensional grid of colors, committed as an image.
    Raster,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" | "pointcloud" | "point-cloud" => Ok(Backend::PointCloud),
            "raster" | "image" => Ok(Backend::Raster),
            _ => Err(format!("Unknown backend '{}'; expected 'points' or 'raster'", s)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Backend::PointCloud => write!(f, "points"),
            Backend::Raster => write!(f, "raster"),
        }
    }
}

/// Anything a pixel's color can be written into.
pub trait PixelSlot: Send {
    /// Store the color for this pixel.
    fn paint(&mut self, color: Rgb<u8>);
}

impl PixelSlot for Rgb<u8> {
    #[inline]
    fn paint(&mut self, color: Rgb<u8>) {
        *self = color;
    }
}

/// A colored point pinned to a screen position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColoredPoint {
    /// Screen position of the point; set once and never moved.
    pub position: (f32, f32),
    /// The point's current color.
    pub color: Rgb<u8>,
}

impl PixelSlot for ColoredPoint {
    #[inline]
    fn paint(&mut self, color: Rgb<u8>) {
        self.color = color;
    }
}

/// A committed, immutable frame, ready to hand to a renderer.
#[derive(Clone, Debug)]
pub enum Frame {
    /// The whole point cloud and the grid it was laid out on.
    Points(IntegralPlane, Arc<Vec<ColoredPoint>>),
    /// The raster image.
    Raster(Arc<RgbImage>),
}

impl Frame {
    /// The backend that produced this frame.
    pub fn backend(&self) -> Backend {
        match *self {
            Frame::Points(..) => Backend::PointCloud,
            Frame::Raster(_) => Backend::Raster,
        }
    }

    /// The grid the frame covers.
    pub fn plane(&self) -> IntegralPlane {
        match *self {
            Frame::Points(plane, _) => plane,
            Frame::Raster(ref image) => {
                let (width, height) = image.dimensions();
                IntegralPlane(width as usize, height as usize)
            }
        }
    }

    /// The color of the pixel at `x, y`, if it is on the frame.
    pub fn color_at(&self, x: usize, y: usize) -> Option<Rgb<u8>> {
        let IntegralPlane(width, height) = self.plane();
        if x >= width || y >= height {
            return None;
        }
        match *self {
            Frame::Points(_, ref points) => points.get(y * width + x).map(|p| p.color),
            Frame::Raster(ref image) => Some(*image.get_pixel(x as u32, y as u32)),
        }
    }

    /// True if both frames are the very same published buffer.
    pub fn same_buffer(&self, other: &Frame) -> bool {
        match (self, other) {
            (&Frame::Points(_, ref a), &Frame::Points(_, ref b)) => Arc::ptr_eq(a, b),
            (&Frame::Raster(ref a), &Frame::Raster(ref b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The contract between the renderer and a pixel buffer: the
/// renderer paints slots, and the sink publishes them on commit.
pub trait OutputSink: Send {
    /// The per-pixel storage the renderer paints.
    type Slot: PixelSlot;

    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// The dimensions of the buffer.
    fn plane(&self) -> IntegralPlane;

    /// Every slot, in row-major order.
    fn slots_mut(&mut self) -> &mut [Self::Slot];

    /// Paint a single pixel by its row-major index.
    fn write_pixel(&mut self, index: usize, color: Rgb<u8>) {
        self.slots_mut()[index].paint(color);
    }

    /// Publish everything painted so far as an immutable frame.
    fn commit(&mut self) -> Frame;
}

/// Backs a buffer of colored points at fixed screen positions.
pub struct PointCloudSink {
    plane: IntegralPlane,
    points: Vec<ColoredPoint>,
}

impl PointCloudSink {
    /// Allocates one black point per pixel, each at its screen position.
    pub fn new(plane: IntegralPlane) -> Self {
        let mut points = Vec::with_capacity(plane.len());
        for y in 0..plane.1 {
            for x in 0..plane.0 {
                points.push(ColoredPoint {
                    position: (x as f32, y as f32),
                    color: BLACK,
                });
            }
        }
        PointCloudSink { plane, points }
    }
}

impl OutputSink for PointCloudSink {
    type Slot = ColoredPoint;

    fn backend(&self) -> Backend {
        Backend::PointCloud
    }

    fn plane(&self) -> IntegralPlane {
        self.plane
    }

    fn slots_mut(&mut self) -> &mut [ColoredPoint] {
        &mut self.points
    }

    fn commit(&mut self) -> Frame {
        Frame::Points(self.plane, Arc::new(self.points.clone()))
    }
}

/// Backs a two-dimensional grid of colors.
pub struct RasterSink {
    plane: IntegralPlane,
    grid: Vec<Rgb<u8>>,
}

impl RasterSink {
    /// Allocates a black grid.
    pub fn new(plane: IntegralPlane) -> Self {
        RasterSink {
            plane,
            grid: vec![BLACK; plane.len()],
        }
    }
}

impl OutputSink for RasterSink {
    type Slot = Rgb<u8>;

    fn backend(&self) -> Backend {
        Backend::Raster
    }

    fn plane(&self) -> IntegralPlane {
        self.plane
    }

    fn slots_mut(&mut self) -> &mut [Rgb<u8>] {
        &mut self.grid
    }

    fn commit(&mut self) -> Frame {
        let width = self.plane.0;
        let grid = &self.grid;
        let image = RgbImage::from_fn(self.plane.0 as u32, self.plane.1 as u32, |x, y| {
            grid[(y as usize) * width + (x as usize)]
        });
        Frame::Raster(Arc::new(image))
    }
}

/// Whichever sink is currently selected.
pub enum ActiveSink {
    /// Rendering into a point cloud.
    PointCloud(PointCloudSink),
    /// Rendering into a raster.
    Raster(RasterSink),
}

impl ActiveSink {
    /// A freshly allocated sink of the given kind.
    pub fn for_backend(backend: Backend, plane: IntegralPlane) -> Self {
        match backend {
            Backend::PointCloud => ActiveSink::PointCloud(PointCloudSink::new(plane)),
            Backend::Raster => ActiveSink::Raster(RasterSink::new(plane)),
        }
    }

    /// Which backend is active.
    pub fn backend(&self) -> Backend {
        match *self {
            ActiveSink::PointCloud(ref sink) => sink.backend(),
            ActiveSink::Raster(ref sink) => sink.backend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colors::RED;

    #[test]
    fn point_positions_follow_the_grid() {
        let mut sink = PointCloudSink::new(IntegralPlane(4, 3));
        let slots = sink.slots_mut();
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0].position, (0.0, 0.0));
        assert_eq!(slots[3].position, (3.0, 0.0));
        assert_eq!(slots[4].position, (0.0, 1.0));
        assert_eq!(slots[11].position, (3.0, 2.0));
    }

    #[test]
    fn painting_keeps_point_positions() {
        let mut sink = PointCloudSink::new(IntegralPlane(4, 3));
        sink.write_pixel(6, RED);
        match sink.commit() {
            Frame::Points(plane, points) => {
                assert_eq!(plane, IntegralPlane(4, 3));
                assert_eq!(points[6].color, RED);
                assert_eq!(points[6].position, (2.0, 1.0));
                assert_eq!(points[5].color, BLACK);
            }
            other => panic!("unexpected {:?}", other.backend()),
        }
    }

    #[test]
    fn committed_points_do_not_see_later_writes() {
        let mut sink = PointCloudSink::new(IntegralPlane(2, 2));
        let frame = sink.commit();
        sink.write_pixel(0, RED);
        assert_eq!(frame.color_at(0, 0), Some(BLACK));
        assert_eq!(sink.commit().color_at(0, 0), Some(RED));
    }

    #[test]
    fn raster_commit_builds_an_image() {
        let plane = IntegralPlane(5, 2);
        let mut sink = RasterSink::new(plane);
        sink.write_pixel(7, RED);
        let frame = sink.commit();
        assert_eq!(frame.backend(), Backend::Raster);
        assert_eq!(frame.plane(), plane);
        assert_eq!(frame.color_at(2, 1), Some(RED));
        assert_eq!(frame.color_at(1, 2), None);
        match frame {
            Frame::Raster(image) => assert_eq!(image.dimensions(), (5, 2)),
            _ => panic!("expected a raster"),
        }
    }

    #[test]
    fn point_frames_index_by_their_own_width() {
        let mut sink = PointCloudSink::new(IntegralPlane(5, 2));
        sink.write_pixel(7, RED);
        let frame = sink.commit();
        assert_eq!(frame.plane(), IntegralPlane(5, 2));
        assert_eq!(frame.color_at(2, 1), Some(RED));
        assert_eq!(frame.color_at(5, 0), None);
        assert_eq!(frame.color_at(0, 2), None);
    }

    #[test]
    fn backends_parse_from_their_names() {
        assert_eq!("points".parse::<Backend>(), Ok(Backend::PointCloud));
        assert_eq!("raster".parse::<Backend>(), Ok(Backend::Raster));
        assert!("sprite".parse::<Backend>().is_err());
        assert_eq!(Backend::Raster.to_string(), "raster");
    }

    #[test]
    fn active_sink_matches_its_backend() {
        let plane = IntegralPlane(3, 3);
        assert_eq!(ActiveSink::for_backend(Backend::Raster, plane).backend(), Backend::Raster);
        assert_eq!(
            ActiveSink::for_backend(Backend::PointCloud, plane).backend(),
            Backend::PointCloud
        );
    }
}
