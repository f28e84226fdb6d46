// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Startup configuration for the engine.  The grid size is fixed for
//! the life of an engine; everything else is only a starting value and
//! the target of `MandelbrotEngine::reset`.

use errors::EngineError;
use planes::{IntegralPlane, PlaneView};
use sinks::Backend;

/// Default grid width, in pixels.
pub const DEFAULT_WIDTH: usize = 1280;
/// Default grid height, in pixels.
pub const DEFAULT_HEIGHT: usize = 720;
/// Default size of a pixel in complex units.
pub const DEFAULT_ZOOM: f64 = 0.004;
/// Default complex coordinate under the screen center.
pub const DEFAULT_OFFSET: (f64, f64) = (-0.7, 0.0);
/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Everything needed to start an engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Grid width in pixels.
    pub width: usize,
    /// Grid height in pixels.
    pub height: usize,
    /// Complex units per pixel.
    pub zoom: f64,
    /// Complex coordinate under the screen center.
    pub offset: (f64, f64),
    /// Iteration cap.
    pub max_iterations: usize,
    /// Number of render workers.
    pub threads: usize,
    /// Which buffer to render into.
    pub backend: Backend,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            zoom: DEFAULT_ZOOM,
            offset: DEFAULT_OFFSET,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: num_cpus::get(),
            backend: Backend::PointCloud,
        }
    }
}

impl EngineConfig {
    /// The pixel grid.
    pub fn plane(&self) -> IntegralPlane {
        IntegralPlane(self.width, self.height)
    }

    /// The initial view.
    pub fn view(&self) -> PlaneView {
        PlaneView::new(self.zoom, self.offset.0, self.offset.1)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.plane().is_empty() {
            return Err(EngineError::EmptyGrid(self.width, self.height));
        }
        if self.threads == 0 {
            return Err(EngineError::ZeroThreads);
        }
        if self.max_iterations == 0 {
            return Err(EngineError::ZeroIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.plane(), IntegralPlane(1280, 720));
        assert_eq!(config.view(), PlaneView::new(0.004, -0.7, 0.0));
        assert!(config.threads >= 1);
    }

    #[test]
    fn degenerate_configurations_are_rejected() {
        let config = EngineConfig {
            threads: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            max_iterations: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            height: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
