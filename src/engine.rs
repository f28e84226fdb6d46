// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The compute engine.
//!
//! A `MandelbrotEngine` owns everything a collaborator can change (the
//! view, the iteration cap, the worker count and the backend) along
//! with a dirty flag, the active output sink and the last committed
//! frame.  The collaborator changes parameters through setters, asks
//! for an `update`, and pulls the committed frame with `draw`.
//!
//! Every dispatch works from an immutable `Snapshot` of the parameters
//! stamped with a generation number.  Dispatches are serialized on the
//! sink; the latest generation wins, and a computation that discovers
//! a newer generation has started stops and never commits.  Within a
//! dispatch each worker owns a disjoint band of the sink, so pixel
//! writes take no lock.

use crossbeam::thread::ScopedJoinHandle;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use colors::ColorTable;
use config::EngineConfig;
use errors::EngineError;
use escape::escape;
use planes::{IntegralPlane, PlaneMapper, PlaneView};
use sinks::{ActiveSink, Backend, Frame, OutputSink, PixelSlot};
use tiles::{partition, Region};

/// Whether a frame is being computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing in flight.
    Idle,
    /// Workers are rendering a frame.
    Computing,
}

/// What an update request turned into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing had changed since the last computation; nothing ran.
    Clean,
    /// A frame was computed and committed.
    Committed {
        /// The generation of the committed frame.
        generation: u64,
    },
    /// A newer request arrived first; this one was discarded.
    Superseded {
        /// The generation that was discarded.
        generation: u64,
        /// The newest generation at the time it was discarded.
        latest: u64,
    },
}

/// The parameters of one full-frame computation, frozen at dispatch.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Monotonically increasing dispatch number.
    pub generation: u64,
    /// The view being rendered.
    pub view: PlaneView,
    /// The iteration cap.
    pub max_iterations: usize,
    /// The number of workers.
    pub threads: usize,
    /// The sink being rendered into.
    pub backend: Backend,
    /// The color table for `max_iterations`.
    pub colors: Arc<ColorTable>,
}

// The parameters the collaborator changes.
struct Settings {
    view: PlaneView,
    previous_view: PlaneView,
    max_iterations: usize,
    threads: usize,
    backend: Backend,
    colors: Arc<ColorTable>,
    dirty: bool,
}

impl Settings {
    fn from_config(config: &EngineConfig) -> Self {
        Settings {
            view: config.view(),
            previous_view: config.view(),
            max_iterations: config.max_iterations,
            threads: config.threads,
            backend: config.backend,
            colors: Arc::new(ColorTable::new(config.max_iterations)),
            dirty: true,
        }
    }
}

// None of the guarded data can be left half-updated by a panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Holds the computing flag up for as long as it lives, including
// while unwinding.
struct Computing<'a>(&'a AtomicBool);

impl<'a> Computing<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Computing(flag)
    }
}

impl<'a> Drop for Computing<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The engine context.  Owned by the caller and shared by reference
/// between the thread driving the UI and any thread asking for updates.
pub struct MandelbrotEngine {
    config: EngineConfig,
    settings: Mutex<Settings>,
    sink: Mutex<ActiveSink>,
    frame: Mutex<Option<Frame>>,
    latest: AtomicU64,
    computing: AtomicBool,
    dispatches: AtomicUsize,
}

impl MandelbrotEngine {
    /// Builds an engine with the configured grid and starting
    /// parameters.  The engine starts dirty, with nothing committed.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            "Engine initialized: {}x{} grid, {} threads available",
            config.width,
            config.height,
            num_cpus::get()
        );
        Ok(MandelbrotEngine {
            config,
            settings: Mutex::new(Settings::from_config(&config)),
            sink: Mutex::new(ActiveSink::for_backend(config.backend, config.plane())),
            frame: Mutex::new(None),
            latest: AtomicU64::new(0),
            computing: AtomicBool::new(false),
            dispatches: AtomicUsize::new(0),
        })
    }

    /// The fixed pixel grid.
    pub fn plane(&self) -> IntegralPlane {
        self.config.plane()
    }

    /// Sets the size of a pixel in complex units.
    pub fn set_zoom(&self, zoom: f64) {
        let mut settings = lock(&self.settings);
        settings.previous_view.zoom = settings.view.zoom;
        settings.view.zoom = zoom;
        settings.dirty = true;
    }

    /// Sets the complex coordinate under the screen center.
    pub fn set_offset(&self, offset_x: f64, offset_y: f64) {
        let mut settings = lock(&self.settings);
        settings.previous_view.offset_x = settings.view.offset_x;
        settings.previous_view.offset_y = settings.view.offset_y;
        settings.view.offset_x = offset_x;
        settings.view.offset_y = offset_y;
        settings.dirty = true;
    }

    /// Sets the iteration cap, rebuilding the color table if it changed.
    pub fn set_max_iterations(&self, max_iterations: usize) -> Result<(), EngineError> {
        if max_iterations == 0 {
            return Err(EngineError::ZeroIterations);
        }
        let mut settings = lock(&self.settings);
        if settings.max_iterations != max_iterations {
            settings.colors = Arc::new(ColorTable::new(max_iterations));
            settings.max_iterations = max_iterations;
        }
        settings.dirty = true;
        Ok(())
    }

    /// Sets the number of render workers.
    pub fn set_max_threads(&self, threads: usize) -> Result<(), EngineError> {
        if threads == 0 {
            return Err(EngineError::ZeroThreads);
        }
        let mut settings = lock(&self.settings);
        settings.threads = threads;
        settings.dirty = true;
        Ok(())
    }

    /// Selects the sink to render into.  Switching invalidates the
    /// whole buffer.
    pub fn select_backend(&self, backend: Backend) {
        let mut settings = lock(&self.settings);
        if settings.backend != backend {
            settings.backend = backend;
            settings.dirty = true;
        }
    }

    /// Restores every parameter to its configured starting value.
    pub fn reset(&self) {
        let mut settings = lock(&self.settings);
        let previous = settings.view;
        *settings = Settings::from_config(&self.config);
        settings.previous_view = previous;
    }

    /// The current view.
    pub fn view(&self) -> PlaneView {
        lock(&self.settings).view
    }

    /// The view as it was before the most recent zoom or offset change.
    pub fn previous_view(&self) -> PlaneView {
        lock(&self.settings).previous_view
    }

    /// The current zoom.
    pub fn zoom(&self) -> f64 {
        self.view().zoom
    }

    /// The current offset.
    pub fn offset(&self) -> (f64, f64) {
        let view = self.view();
        (view.offset_x, view.offset_y)
    }

    /// The current iteration cap.
    pub fn max_iterations(&self) -> usize {
        lock(&self.settings).max_iterations
    }

    /// The current number of render workers.
    pub fn max_threads(&self) -> usize {
        lock(&self.settings).threads
    }

    /// The selected backend.
    pub fn backend(&self) -> Backend {
        lock(&self.settings).backend
    }

    /// True if the committed frame is stale.
    pub fn is_dirty(&self) -> bool {
        lock(&self.settings).dirty
    }

    /// Whether a frame is being computed right now.
    pub fn state(&self) -> EngineState {
        if self.computing.load(Ordering::SeqCst) {
            EngineState::Computing
        } else {
            EngineState::Idle
        }
    }

    /// The newest generation handed out.
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// How many computations have actually been run.
    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }

    /// Recomputes the frame if anything changed since the last one.
    pub fn update(&self) -> Result<UpdateOutcome, EngineError> {
        let snapshot = {
            let mut settings = lock(&self.settings);
            if !settings.dirty {
                return Ok(UpdateOutcome::Clean);
            }
            settings.dirty = false;
            self.snapshot(&settings)
        };
        self.dispatch(snapshot)
    }

    /// Recomputes the frame unconditionally.
    pub fn force_update(&self) -> Result<UpdateOutcome, EngineError> {
        let snapshot = {
            let mut settings = lock(&self.settings);
            settings.dirty = false;
            self.snapshot(&settings)
        };
        self.dispatch(snapshot)
    }

    /// The last committed frame, if any.
    pub fn draw(&self) -> Option<Frame> {
        lock(&self.frame).clone()
    }

    // Taken under the settings lock, so generations are ordered the
    // same way as the parameter changes they capture.
    fn snapshot(&self, settings: &Settings) -> Snapshot {
        Snapshot {
            generation: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
            view: settings.view,
            max_iterations: settings.max_iterations,
            threads: settings.threads,
            backend: settings.backend,
            colors: settings.colors.clone(),
        }
    }

    fn superseded(&self, generation: u64) -> Option<UpdateOutcome> {
        let latest = self.latest.load(Ordering::SeqCst);
        if latest == generation {
            return None;
        }
        warn!(
            "Discarding generation {}: generation {} has been requested",
            generation, latest
        );
        Some(UpdateOutcome::Superseded { generation, latest })
    }

    fn dispatch(&self, snapshot: Snapshot) -> Result<UpdateOutcome, EngineError> {
        let mut sink = lock(&self.sink);
        if let Some(outcome) = self.superseded(snapshot.generation) {
            return Ok(outcome);
        }

        debug!(
            "Dispatching generation {}: {:?}, {} iterations, {} threads, {} backend",
            snapshot.generation,
            snapshot.view,
            snapshot.max_iterations,
            snapshot.threads,
            snapshot.backend
        );
        let rendered = {
            let _computing = Computing::start(&self.computing);
            self.dispatches.fetch_add(1, Ordering::SeqCst);
            self.compute(&mut sink, &snapshot)
        };
        match rendered {
            Ok(finished) => Ok(self.finish(&mut sink, snapshot.generation, finished)),
            Err(e) => {
                lock(&self.settings).dirty = true;
                Err(e)
            }
        }
    }

    // Commits a rendered frame unless it was stopped early or overtaken
    // after its last row was checked.
    fn finish(&self, sink: &mut ActiveSink, generation: u64, finished: bool) -> UpdateOutcome {
        if !finished {
            let latest = self.generation();
            warn!(
                "Generation {} stopped early: generation {} has been requested",
                generation, latest
            );
            return UpdateOutcome::Superseded { generation, latest };
        }
        if let Some(outcome) = self.superseded(generation) {
            return outcome;
        }

        let frame = match *sink {
            ActiveSink::PointCloud(ref mut s) => s.commit(),
            ActiveSink::Raster(ref mut s) => s.commit(),
        };
        *lock(&self.frame) = Some(frame);
        info!("Committed generation {}", generation);
        UpdateOutcome::Committed { generation }
    }

    fn compute(&self, sink: &mut ActiveSink, snapshot: &Snapshot) -> Result<bool, EngineError> {
        if sink.backend() != snapshot.backend {
            warn!(
                "Switching to the {} backend; the whole frame will be recomputed",
                snapshot.backend
            );
            *sink = ActiveSink::for_backend(snapshot.backend, self.config.plane());
        }
        match *sink {
            ActiveSink::PointCloud(ref mut s) => render(s, snapshot, &self.latest),
            ActiveSink::Raster(ref mut s) => render(s, snapshot, &self.latest),
        }
    }
}

/// Renders a full frame into `sink`, one worker per region,
/// and waits for all of them.  Returns false if `latest` moved past the
/// snapshot's generation before the frame was finished.
pub fn render<S: OutputSink>(
    sink: &mut S,
    snapshot: &Snapshot,
    latest: &AtomicU64,
) -> Result<bool, EngineError> {
    let plane = sink.plane();
    let regions = partition(plane, snapshot.threads, snapshot.view)?;
    let slots = sink.slots_mut();

    if regions.len() == 1 {
        return Ok(render_region(&regions[0], slots, plane, snapshot, latest));
    }

    let mut work = Vec::with_capacity(regions.len());
    let mut rest = slots;
    for region in regions {
        let (band, tail) = { rest }.split_at_mut(region.len());
        rest = tail;
        work.push((region, band));
    }

    let joined = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<bool>> = work
            .into_iter()
            .map(|(region, band)| {
                spawner.spawn(move |_| render_region(&region, band, plane, snapshot, latest))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<bool>, _>>()
    })
    .map_err(|_| EngineError::WorkerPanicked)?;
    let finished = joined.map_err(|_| EngineError::WorkerPanicked)?;
    Ok(finished.into_iter().all(|done| done))
}

// Paints one region.  `band` is exactly the region's slots.  The
// generation is checked at the start of every row.
fn render_region<T: PixelSlot>(
    region: &Region,
    band: &mut [T],
    plane: IntegralPlane,
    snapshot: &Snapshot,
    latest: &AtomicU64,
) -> bool {
    trace!("Rendering {:?} ({} pixels)", region, band.len());
    let mapper = PlaneMapper::new(plane, region.view);
    for (slot, pixel) in band.iter_mut().zip(region.pixels()) {
        if pixel.0 == region.min_x && latest.load(Ordering::Relaxed) != snapshot.generation {
            return false;
        }
        let iterations = escape(&mapper.pixel_to_point(&pixel), snapshot.max_iterations);
        slot.paint(snapshot.colors.get(iterations));
    }
    true
}
