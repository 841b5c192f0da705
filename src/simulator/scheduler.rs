//! The event scheduler is a min-priority queue of pending events, ordered by
//! time and then by insertion sequence.  Equal-time events therefore fire in
//! the order they were scheduled, which keeps replays deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::patient::{PatientId, Stage};
use crate::utils::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Arrival,
    ServiceComplete(Stage),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    time: f64,
    kind: EventKind,
    patient: PatientId,
}

impl Event {
    pub fn new(time: f64, kind: EventKind, patient: PatientId) -> Self {
        Event {
            time,
            kind,
            patient,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn patient(&self) -> PatientId {
        self.patient
    }
}

#[derive(Debug, Clone)]
struct ScheduledEvent {
    sequence: u64,
    event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    // Reversed, so the max-heap yields the earliest event
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .time
            .total_cmp(&other.event.time)
            .then(self.sequence.cmp(&other.sequence))
            .reverse()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    queue: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
    now: f64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event.  Events in the past (before the last popped event)
    /// and NaN times are rejected, so the clock can only move forward.
    pub fn schedule(&mut self, event: Event) -> Result<(), SimulationError> {
        if event.time.is_nan() || event.time < self.now {
            return Err(SimulationError::EventScheduling {
                now: self.now,
                scheduled: event.time,
            });
        }
        self.queue.push(ScheduledEvent {
            sequence: self.next_sequence,
            event,
        });
        self.next_sequence += 1;
        Ok(())
    }

    /// Remove and return the earliest event, advancing the clock to its time.
    pub fn pop_next(&mut self) -> Result<Event, SimulationError> {
        let scheduled = self.queue.pop().ok_or(SimulationError::EmptyQueue)?;
        self.now = scheduled.event.time;
        Ok(scheduled.event)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.queue.peek().map(|scheduled| scheduled.event.time)
    }

    /// The time of the most recently popped event.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
