//! The simulator module provides the mechanics to move patients through the
//! hospital via discrete event simulation.  Arrivals and service completions
//! are held in an `EventScheduler` and processed strictly in time order, on
//! a single thread.
//!
//! `SimulationEngine` executes runs.  Each run works on a snapshot of a
//! `SimulationConfig` and produces one `SimulationResults` record.  Stage
//! transitions are published to any subscribed `StageObserver`, which is how
//! consoles, front-ends, and tests follow individual patients.

use std::cell::{Cell, RefCell};

use log::{info, warn};

use crate::input_modeling::dynamic_rng::{default_rng, seeded_rng, DynRng};
use crate::output_analysis::SimulationResults;
use crate::utils::errors::SimulationError;

pub mod config;
pub mod observer;
pub mod patient;
mod run;
pub mod scheduler;
pub mod services;

pub use self::config::{RunLimits, SimulationConfig, StationCapacity};
pub use self::observer::{RendererSink, StageObserver, StageTransition, TransitionLog};
pub use self::patient::{Patient, PatientId, Stage};
pub use self::scheduler::{Event, EventKind, EventScheduler};
pub use self::services::Services;

use self::run::Run;

/// Marks the engine busy for the lifetime of a run.
struct RunGuard<'a> {
    running: &'a Cell<bool>,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a Cell<bool>) -> Result<Self, SimulationError> {
        if running.replace(true) {
            return Err(SimulationError::Reentrancy);
        }
        Ok(RunGuard { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.set(false);
    }
}

/// The `SimulationEngine` struct is the core of the simulation.  It owns
/// the random number generator that carries across unseeded runs, and the
/// subscribed observers.  Runs execute to completion on the caller's
/// thread; starting a run from inside a running one fails with
/// `SimulationError::Reentrancy`.
pub struct SimulationEngine {
    rng: DynRng,
    observers: RefCell<Vec<Box<dyn StageObserver>>>,
    running: Cell<bool>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::with_rng(default_rng())
    }
}

impl SimulationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an injected random number generator, used by
    /// every run whose configuration carries no seed.
    pub fn with_rng(rng: DynRng) -> Self {
        Self {
            rng,
            observers: RefCell::new(Vec::new()),
            running: Cell::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Add an observer of stage transitions.  Observers cannot be added
    /// while a run is in progress.
    pub fn subscribe(&self, observer: Box<dyn StageObserver>) -> Result<(), SimulationError> {
        self.observers
            .try_borrow_mut()
            .map_err(|_| SimulationError::Reentrancy)?
            .push(observer);
        Ok(())
    }

    /// Execute one complete run.  The configuration is validated and
    /// snapshotted first; a failed run publishes no results.
    pub fn run(
        &self,
        config: &SimulationConfig,
        run_id: usize,
    ) -> Result<SimulationResults, SimulationError> {
        let _guard = RunGuard::acquire(&self.running)?;
        config.validate()?;
        let snapshot = config.clone();
        let rng = match snapshot.seed {
            Some(seed) => seeded_rng(seed),
            None => self.rng.clone(),
        };
        let mut observers = self
            .observers
            .try_borrow_mut()
            .map_err(|_| SimulationError::Reentrancy)?;
        info!(
            "starting run {} (limits: {:?}, seed: {:?})",
            run_id, snapshot.limits, snapshot.seed
        );
        observers
            .iter_mut()
            .for_each(|observer| observer.on_run_start(run_id));
        let results = Run::new(run_id, &snapshot, &mut observers[..], Services::new(rng))
            .execute()
            .map_err(|error| {
                warn!("run {} failed: {}", run_id, error);
                error
            })?;
        observers
            .iter_mut()
            .for_each(|observer| observer.on_run_end(run_id));
        info!(
            "finished run {}: {} patients, average wait {:.4}, end time {:.4}",
            run_id,
            results.total_patients(),
            results.average_wait_time(),
            results.end_time()
        );
        Ok(results)
    }
}
