#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot set engine
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the sequence `z = z * z + c` stays bounded.  To draw it,
//! every pixel of a fixed-size grid is mapped to a point on the plane,
//! the sequence is iterated until it escapes or an iteration cap is
//! reached, and the number of steps it took is turned into a color.
//!
//! This crate is the computational core of an interactive viewer.  A
//! `MandelbrotEngine` holds the view (zoom and offset), the iteration
//! cap, the worker count and the output backend.  A UI collaborator
//! changes those through setters, asks the engine to `update`, and
//! draws whichever `Frame` was last committed.  Frames are computed by
//! a pool of scoped worker threads, each owning a disjoint band of the
//! output buffer.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;

pub mod colors;
pub mod config;
pub mod engine;
pub mod errors;
pub mod escape;
pub mod planes;
pub mod sinks;
pub mod tiles;

pub use config::EngineConfig;
pub use engine::{EngineState, MandelbrotEngine, UpdateOutcome};
pub use errors::EngineError;
pub use planes::{IntegralPlane, Pixel, PlaneMapper, PlaneView};
pub use sinks::{Backend, Frame};
