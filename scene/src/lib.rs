#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state management for Rescue Replay.
//!
//! The scene owns every placed visual: one registry per entity class, the
//! current edge grid and the playback state machine. Hosts mutate it
//! exclusively through [`apply`], handing in the [`VisualSink`] that receives
//! the resulting create/move/destroy operations, and observe it through the
//! emitted [`Event`] stream and the read-only [`query`] module.

use std::collections::BTreeSet;

use rescue_replay_core::{
    BoardConfig, Command, EdgeGrid, EdgeKey, EntityKind, Event, Frame, GridCoord, ReplayError,
    ScoreStats, VisualSink,
};

mod playback;
mod registry;

use playback::{AgentMotion, Phase};
use registry::Registry;

/// Externally observable playback state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No sequence loaded.
    Idle,
    /// The transition from the indexed frame to its successor is animating.
    Animating {
        /// Index of the frame currently on display.
        transition: usize,
    },
    /// The final frame is on display.
    Done,
    /// The last `start` was rejected outright.
    Failed(ReplayError),
}

/// The authoritative Rescue Replay scene.
#[derive(Debug)]
pub struct Scene {
    pub(crate) config: BoardConfig,
    pub(crate) frames: Vec<Frame>,
    pub(crate) phase: Phase,
    pub(crate) agents: Registry,
    pub(crate) fires: Registry,
    pub(crate) pois: Registry,
    pub(crate) doors: Registry,
    pub(crate) walls: Registry,
    pub(crate) grid: EdgeGrid,
    pub(crate) opened_doors: BTreeSet<EdgeKey>,
    pub(crate) revealed_pois: BTreeSet<GridCoord>,
    pub(crate) motions: Vec<AgentMotion>,
    pub(crate) score: ScoreStats,
}

impl Scene {
    /// Creates an idle scene for the provided board configuration.
    #[must_use]
    pub fn new(config: BoardConfig) -> Self {
        let grid = EdgeGrid::new(config.rows(), config.columns());
        Self {
            frames: Vec::new(),
            phase: Phase::Idle,
            agents: Registry::unbounded(EntityKind::Agent),
            fires: Registry::bounded(EntityKind::FireMarker, config.fire_capacity()),
            pois: Registry::bounded(EntityKind::Poi, config.poi_capacity()),
            doors: Registry::bounded(EntityKind::Door, config.door_capacity()),
            walls: Registry::unbounded(EntityKind::WallSegment),
            grid,
            opened_doors: BTreeSet::new(),
            revealed_pois: BTreeSet::new(),
            motions: Vec::new(),
            score: ScoreStats::default(),
            config,
        }
    }
}

/// Applies the provided command to the scene, mutating state deterministically
/// and writing the resulting visual operations to `sink`.
pub fn apply<S: VisualSink>(
    scene: &mut Scene,
    command: Command,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Start { frames } => playback::start(scene, frames, sink, out_events),
        Command::Tick { dt } => playback::tick(scene, dt, sink, out_events),
        Command::Reset => playback::reset(scene, sink, out_events),
    }
}

/// Query functions that provide read-only access to the scene state.
pub mod query {
    use rescue_replay_board::mapper;
    use rescue_replay_core::{
        AgentId, BoardConfig, EdgeGrid, GridCoord, ScoreStats, SlotKey, WorldPosition,
    };

    use super::{Phase, PlaybackStatus, Scene};

    /// Immutable representation of a single agent's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct AgentSnapshot {
        /// Identifier assigned to the agent by the producer.
        pub id: AgentId,
        /// Board cell nearest to the agent's current position.
        pub cell: GridCoord,
        /// Exact world position, mid-interpolation included.
        pub position: WorldPosition,
    }

    /// Read-only snapshot describing all agents in the scene.
    #[derive(Clone, Debug, Default)]
    pub struct AgentView {
        snapshots: Vec<AgentSnapshot>,
    }

    impl AgentView {
        /// Iterator over the captured snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<AgentSnapshot> {
            self.snapshots
        }
    }

    /// Current playback state of the scene.
    #[must_use]
    pub fn playback(scene: &Scene) -> PlaybackStatus {
        match &scene.phase {
            Phase::Idle => PlaybackStatus::Idle,
            Phase::Animating { transition, .. } => PlaybackStatus::Animating {
                transition: *transition,
            },
            Phase::Done => PlaybackStatus::Done,
            Phase::Failed(error) => PlaybackStatus::Failed(error.clone()),
        }
    }

    /// Captures a read-only view of the agents, sorted by id.
    #[must_use]
    pub fn agent_view(scene: &Scene) -> AgentView {
        let snapshots = scene
            .agents
            .iter()
            .filter_map(|(key, slot)| {
                let SlotKey::Agent(id) = key else {
                    return None;
                };
                Some(AgentSnapshot {
                    id: *id,
                    cell: mapper::world_to_grid(slot.position, &scene.config),
                    position: slot.position,
                })
            })
            .collect();
        AgentView { snapshots }
    }

    /// Edge grid of the most recently built frame.
    #[must_use]
    pub fn edge_grid(scene: &Scene) -> &EdgeGrid {
        &scene.grid
    }

    /// Score counters of the most recently built frame.
    #[must_use]
    pub fn score(scene: &Scene) -> ScoreStats {
        scene.score
    }

    /// Board configuration the scene was constructed with.
    #[must_use]
    pub fn board_config(scene: &Scene) -> &BoardConfig {
        &scene.config
    }

    /// Number of frames in the loaded sequence.
    #[must_use]
    pub fn frame_count(scene: &Scene) -> usize {
        scene.frames.len()
    }
}
