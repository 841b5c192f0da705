use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};

use super::config::SimulationConfig;
use super::observer::{StageObserver, StageTransition};
use super::patient::{Patient, PatientId, Stage};
use super::scheduler::{Event, EventKind, EventScheduler};
use super::services::Services;
use crate::input_modeling::Activity;
use crate::output_analysis::SimulationResults;
use crate::utils::errors::SimulationError;

/// The servers and FIFO queue behind a service stage.
#[derive(Debug, Clone)]
struct Station {
    servers: usize,
    queue: VecDeque<(PatientId, f64)>,
    /// Service start time of each patient currently being served
    in_service: BTreeMap<PatientId, f64>,
    busy_time: f64,
    visits: usize,
}

impl Station {
    fn new(servers: usize) -> Self {
        Station {
            servers,
            queue: VecDeque::new(),
            in_service: BTreeMap::new(),
            busy_time: 0.0,
            visits: 0,
        }
    }

    fn has_idle_server(&self) -> bool {
        self.in_service.len() < self.servers
    }

    /// Busy time up to `until`, including services still in progress.
    fn busy_time_until(&self, until: f64) -> f64 {
        self.in_service
            .values()
            .fold(self.busy_time, |busy, started| busy + (until - started).max(0.0))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The state of a single run.  A `Run` borrows the configuration snapshot
/// for its whole lifetime and is discarded once results are produced.
pub(super) struct Run<'a> {
    run_id: usize,
    config: &'a SimulationConfig,
    observers: &'a mut [Box<dyn StageObserver>],
    services: Services,
    scheduler: EventScheduler,
    stations: BTreeMap<Stage, Station>,
    active: BTreeMap<PatientId, Patient>,
    admitted: usize,
    next_patient: PatientId,
    wait_times: Vec<f64>,
    queue_times: Vec<f64>,
    time_limited: bool,
}

impl<'a> Run<'a> {
    pub(super) fn new(
        run_id: usize,
        config: &'a SimulationConfig,
        observers: &'a mut [Box<dyn StageObserver>],
        services: Services,
    ) -> Self {
        let stations = Stage::SERVICE_STAGES
            .iter()
            .map(|stage| (*stage, Station::new(config.servers.get(*stage))))
            .collect();
        Run {
            run_id,
            config,
            observers,
            services,
            scheduler: EventScheduler::new(),
            stations,
            active: BTreeMap::new(),
            admitted: 0,
            next_patient: 0,
            wait_times: Vec::new(),
            queue_times: Vec::new(),
            time_limited: false,
        }
    }

    /// Process events in time order until the scheduler is exhausted or the
    /// time limit is reached.
    pub(super) fn execute(mut self) -> Result<SimulationResults, SimulationError> {
        if self.more_arrivals_allowed() {
            self.scheduler
                .schedule(Event::new(0.0, EventKind::Arrival, self.next_patient))?;
        }
        let mut processed: usize = 0;
        while let Some(next_time) = self.scheduler.peek_time() {
            if let Some(limit) = self.config.limits.time_limit {
                if next_time > limit {
                    self.time_limited = true;
                    break;
                }
            }
            let event = self.scheduler.pop_next()?;
            self.services.set_global_time(event.time());
            processed += 1;
            debug!(
                "run {} t={:.4} {:?} patient={} pending={}",
                self.run_id,
                event.time(),
                event.kind(),
                event.patient(),
                self.scheduler.len()
            );
            match event.kind() {
                EventKind::Arrival => self.arrive(event.patient())?,
                EventKind::ServiceComplete(stage) => self.complete(stage, event.patient())?,
            }
        }
        if !self.time_limited && !self.active.is_empty() {
            return Err(self.stranded());
        }
        debug!("run {} processed {} events", self.run_id, processed);
        Ok(self.results())
    }

    fn now(&self) -> f64 {
        self.services.global_time()
    }

    fn more_arrivals_allowed(&self) -> bool {
        self.config
            .limits
            .max_patients
            .map_or(true, |max_patients| self.admitted < max_patients)
    }

    fn sample(&self, activity: Activity) -> Result<f64, SimulationError> {
        let rng = self.services.global_rng();
        let mut rng = rng.borrow_mut();
        self.config.distributions.get(activity).sample(&mut *rng)
    }

    fn notify(&mut self, transition: StageTransition) {
        self.observers
            .iter_mut()
            .for_each(|observer| observer.on_transition(&transition));
    }

    fn station(&mut self, stage: Stage) -> Result<&mut Station, SimulationError> {
        self.stations
            .get_mut(&stage)
            .ok_or(SimulationError::InvalidModelState)
    }

    fn patient(&mut self, patient: PatientId) -> Result<&mut Patient, SimulationError> {
        self.active
            .get_mut(&patient)
            .ok_or(SimulationError::InvalidModelState)
    }

    fn arrive(&mut self, patient: PatientId) -> Result<(), SimulationError> {
        let now = self.now();
        self.admitted += 1;
        self.active.insert(patient, Patient::new(patient, now));
        self.notify(StageTransition {
            time: now,
            patient,
            from: None,
            to: Stage::Sick,
        });
        if self.more_arrivals_allowed() {
            let until_next_arrival = self.sample(Activity::Arrival)?;
            self.next_patient += 1;
            self.scheduler.schedule(Event::new(
                now + until_next_arrival,
                EventKind::Arrival,
                self.next_patient,
            ))?;
        }
        self.enter_station(Stage::Sick, patient)
    }

    fn enter_station(&mut self, stage: Stage, patient: PatientId) -> Result<(), SimulationError> {
        let now = self.now();
        let station = self.station(stage)?;
        if station.has_idle_server() {
            self.start_service(stage, patient, now)
        } else {
            station.queue.push_back((patient, now));
            trace!(
                "patient {} queued at {} (queue length {})",
                patient,
                stage,
                station.queue.len()
            );
            Ok(())
        }
    }

    fn start_service(
        &mut self,
        stage: Stage,
        patient: PatientId,
        enqueued_at: f64,
    ) -> Result<(), SimulationError> {
        let now = self.now();
        let activity = Activity::for_stage(stage).ok_or(SimulationError::InvalidModelState)?;
        let duration = self.sample(activity)?;
        self.patient(patient)?.add_queue_time(now - enqueued_at);
        let station = self.station(stage)?;
        station.in_service.insert(patient, now);
        station.visits += 1;
        self.scheduler.schedule(Event::new(
            now + duration,
            EventKind::ServiceComplete(stage),
            patient,
        ))
    }

    fn complete(&mut self, stage: Stage, patient: PatientId) -> Result<(), SimulationError> {
        let now = self.now();
        let station = self.station(stage)?;
        let started = station
            .in_service
            .remove(&patient)
            .ok_or(SimulationError::InvalidModelState)?;
        station.busy_time += now - started;
        if let Some((waiting, enqueued_at)) = station.queue.pop_front() {
            self.start_service(stage, waiting, enqueued_at)?;
        }
        let next_stage = self.route(stage)?;
        self.advance(patient, stage, next_stage)
    }

    /// Gates are independent Bernoulli trials, evaluated in the fixed order
    /// lab, x-ray, treatment.  Every patient sees the doctor last.
    fn route(&self, from: Stage) -> Result<Stage, SimulationError> {
        if from == Stage::Doctor {
            return Ok(Stage::Done);
        }
        let rng = self.services.global_rng();
        let mut rng = rng.borrow_mut();
        for decision in from.remaining_decisions() {
            if self.config.probabilities.passes(*decision, &mut *rng)? {
                return Ok(Stage::for_decision(*decision));
            }
        }
        Ok(Stage::Doctor)
    }

    fn advance(&mut self, patient: PatientId, from: Stage, to: Stage) -> Result<(), SimulationError> {
        let now = self.now();
        self.patient(patient)?.advance(to, now);
        self.notify(StageTransition {
            time: now,
            patient,
            from: Some(from),
            to,
        });
        if to == Stage::Done {
            let archived = self
                .active
                .remove(&patient)
                .ok_or(SimulationError::InvalidModelState)?;
            self.wait_times.push(now - archived.arrival_time());
            self.queue_times.push(archived.queue_time());
            Ok(())
        } else {
            self.enter_station(to, patient)
        }
    }

    fn stranded(&self) -> SimulationError {
        SimulationError::StrandedPatients {
            time: self.now(),
            patients: self
                .active
                .values()
                .map(|patient| (patient.id(), patient.current_stage()))
                .collect(),
        }
    }

    fn results(&self) -> SimulationResults {
        let end_time = match (self.time_limited, self.config.limits.time_limit) {
            (true, Some(limit)) => limit,
            _ => self.scheduler.now(),
        };
        let completed = self.wait_times.len();
        let per_stage_utilization = self
            .stations
            .iter()
            .map(|(stage, station)| {
                let available = station.servers as f64 * end_time;
                let utilization = if available > 0.0 {
                    station.busy_time_until(end_time) / available
                } else {
                    0.0
                };
                (*stage, utilization)
            })
            .collect();
        SimulationResults {
            run_id: self.run_id,
            average_wait_time: mean(&self.wait_times),
            total_patients: completed,
            per_stage_utilization,
            average_queue_time: mean(&self.queue_times),
            max_wait_time: self.wait_times.iter().cloned().fold(0.0, f64::max),
            stage_visits: self
                .stations
                .iter()
                .map(|(stage, station)| (*stage, station.visits))
                .collect(),
            end_time,
            incomplete_patients: self.active.len(),
        }
    }
}
