#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic telemetry system that folds replay events into metrics.
//!
//! The engine itself never logs; hosts feed the event stream emitted by the
//! scene into this system and read back aggregate counters whenever they
//! need a progress display or an end-of-run summary.

use rescue_replay_core::{Event, ReplayError};

/// Aggregated counters describing one replay run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayMetrics {
    /// Frames whose static state reached the display, frame 0 included.
    pub frames_advanced: usize,
    /// Completed agent steps between two distinct cells.
    pub agent_moves: usize,
    /// Visual instances created across all registries.
    pub entities_created: usize,
    /// Visual instances destroyed across all registries.
    pub entities_removed: usize,
    /// Doors that fired their opening animation.
    pub doors_opened: usize,
    /// Point-of-interest tokens revealed.
    pub pois_revealed: usize,
    /// Agents reported missing from an upcoming frame.
    pub agent_absences: usize,
    /// Recoverable defects that were skipped during playback.
    pub faults: usize,
    /// Whether the sequence played through to its final frame.
    pub completed: bool,
}

/// Pure system that accumulates [`ReplayMetrics`] from scene events.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    metrics: ReplayMetrics,
    last_fault: Option<FaultRecord>,
}

/// One recorded fault with the offending frame index when known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultRecord {
    /// Index of the frame the defect was found in, if any.
    pub index: Option<usize>,
    /// The defect itself.
    pub error: ReplayError,
}

impl Telemetry {
    /// Creates a telemetry system with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a batch of scene events.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FrameAdvanced { .. } => self.metrics.frames_advanced += 1,
                Event::AgentMoved { .. } => self.metrics.agent_moves += 1,
                Event::AgentAbsent { .. } => self.metrics.agent_absences += 1,
                Event::EntityCreated { .. } => self.metrics.entities_created += 1,
                Event::EntityRemoved { .. } => self.metrics.entities_removed += 1,
                Event::DoorOpened { .. } => self.metrics.doors_opened += 1,
                Event::PoiRevealed { .. } => self.metrics.pois_revealed += 1,
                Event::SequenceDone => self.metrics.completed = true,
                Event::Fault { index, error } => {
                    self.metrics.faults += 1;
                    self.last_fault = Some(FaultRecord {
                        index: *index,
                        error: error.clone(),
                    });
                }
            }
        }
    }

    /// Metrics accumulated so far.
    #[must_use]
    pub fn metrics(&self) -> &ReplayMetrics {
        &self.metrics
    }

    /// The most recently recorded fault, if any.
    #[must_use]
    pub fn last_fault(&self) -> Option<&FaultRecord> {
        self.last_fault.as_ref()
    }
}
