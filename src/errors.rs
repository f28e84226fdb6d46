// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The ways a request to the engine can be refused.

use failure::Fail;

/// Errors raised by the engine and its scheduler.  None of them are
/// transient: each one is a bad parameter or a crashed worker.
#[derive(Debug, Fail)]
pub enum EngineError {
    /// A worker pool needs at least one worker.
    #[fail(display = "thread count must be at least 1")]
    ZeroThreads,

    /// An iteration cap of zero cannot tell the inside of the set from the outside.
    #[fail(display = "iteration cap must be at least 1")]
    ZeroIterations,

    /// The pixel grid has no pixels.
    #[fail(display = "pixel grid must not be empty, got {}x{}", _0, _1)]
    EmptyGrid(usize, usize),

    /// A worker thread panicked before finishing its region.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}
