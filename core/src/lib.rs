#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rescue Replay engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative scene, and pure systems. Hosts submit [`Command`] values
//! describing playback requests, the scene executes those commands via its
//! `apply` entry point while writing to an opaque [`VisualSink`], and then
//! broadcasts [`Event`] values for systems and hosts to react to
//! deterministically. The frame data model mirrors the wire shapes emitted by
//! the simulation server; frames are read-only inputs and are never mutated
//! by the engine.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the replay experience boots.
pub const WELCOME_BANNER: &str = "Rescue Replay ready.";

/// Unique identifier assigned to a rescue agent by the simulation server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single board cell expressed as one-indexed row and column.
///
/// Row 1 is the far edge of the board and column 1 the left edge, matching
/// the coordinates carried by door endpoint pairs on the wire. Coordinates
/// just outside the board (row or column 0, or one past the configured
/// bounds) are representable so doors adjacent to exterior entry points can
/// name their outside cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct GridCoord {
    row: u32,
    col: u32,
}

impl GridCoord {
    /// Creates a new board coordinate.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// One-indexed row of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// One-indexed column of the cell.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }
}

impl From<[u32; 2]> for GridCoord {
    fn from(pair: [u32; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<GridCoord> for [u32; 2] {
    fn from(coord: GridCoord) -> Self {
        [coord.row, coord.col]
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Position on the ground plane of the rendered scene, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldPosition {
    /// Distance along the column axis.
    pub x: f32,
    /// Distance along the row axis, growing toward row 1.
    pub z: f32,
}

impl WorldPosition {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Linearly interpolates between `self` and `other` at ratio `t`.
    ///
    /// `t` is clamped to `0.0..=1.0` so callers can never overshoot the
    /// destination.
    #[must_use]
    pub fn lerp(self, other: WorldPosition, t: f32) -> WorldPosition {
        let t = t.clamp(0.0, 1.0);
        WorldPosition {
            x: self.x + (other.x - self.x) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: WorldPosition) -> WorldPosition {
        self.lerp(other, 0.5)
    }
}

/// State of one side of one board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeCode {
    /// Nothing occupies the edge.
    Clear,
    /// A solid wall segment.
    Wall,
    /// A doorway holding a door.
    Door,
    /// A boundary opening through which agents enter the structure.
    Entry,
}

impl EdgeCode {
    /// Parses a single wire digit into an edge code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Self::Clear),
            '1' => Some(Self::Wall),
            '2' => Some(Self::Door),
            '3' => Some(Self::Entry),
            _ => None,
        }
    }

    /// Wire digit representing this edge code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Clear => '0',
            Self::Wall => '1',
            Self::Door => '2',
            Self::Entry => '3',
        }
    }
}

/// The four sides of a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeSide {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
}

impl EdgeSide {
    /// All sides in the order cells encode them on the wire.
    pub const ALL: [EdgeSide; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// The side facing this one from the neighboring cell.
    #[must_use]
    pub const fn opposite(self) -> EdgeSide {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }
}

/// Edge codes for all four sides of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellEdges {
    /// Code on the side toward row 1.
    pub up: EdgeCode,
    /// Code on the side toward the last column.
    pub right: EdgeCode,
    /// Code on the side toward the last row.
    pub down: EdgeCode,
    /// Code on the side toward column 1.
    pub left: EdgeCode,
}

impl CellEdges {
    /// A cell with nothing on any side.
    pub const CLEAR: CellEdges = CellEdges {
        up: EdgeCode::Clear,
        right: EdgeCode::Clear,
        down: EdgeCode::Clear,
        left: EdgeCode::Clear,
    };

    /// Retrieves the code on the provided side.
    #[must_use]
    pub const fn get(&self, side: EdgeSide) -> EdgeCode {
        match side {
            EdgeSide::Up => self.up,
            EdgeSide::Right => self.right,
            EdgeSide::Down => self.down,
            EdgeSide::Left => self.left,
        }
    }

    /// Overwrites the code on the provided side.
    pub fn set(&mut self, side: EdgeSide, code: EdgeCode) {
        match side {
            EdgeSide::Up => self.up = code,
            EdgeSide::Right => self.right = code,
            EdgeSide::Down => self.down = code,
            EdgeSide::Left => self.left = code,
        }
    }
}

impl Default for CellEdges {
    fn default() -> Self {
        Self::CLEAR
    }
}

/// Dense rows×columns matrix of per-cell edge codes for one frame.
///
/// Rebuilt wholesale from each frame's wall payload; never partially carried
/// across frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeGrid {
    cells: Vec<CellEdges>,
    rows: u32,
    columns: u32,
}

impl EdgeGrid {
    /// Creates a grid of the provided dimensions with every edge clear.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let count = rows as usize * columns as usize;
        Self {
            cells: vec![CellEdges::CLEAR; count],
            rows,
            columns,
        }
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the one-indexed coordinate lies within the grid.
    #[must_use]
    pub const fn contains(&self, coord: GridCoord) -> bool {
        coord.row() >= 1
            && coord.row() <= self.rows
            && coord.col() >= 1
            && coord.col() <= self.columns
    }

    /// Returns the edge codes of the provided cell, if it is within bounds.
    #[must_use]
    pub fn cell(&self, coord: GridCoord) -> Option<CellEdges> {
        self.index(coord).map(|index| self.cells[index])
    }

    /// Returns the code on one side of the provided cell.
    #[must_use]
    pub fn edge(&self, coord: GridCoord, side: EdgeSide) -> Option<EdgeCode> {
        self.cell(coord).map(|edges| edges.get(side))
    }

    /// Overwrites the full edge set of a cell.
    ///
    /// Returns `false` when the coordinate lies outside the grid, leaving the
    /// grid untouched.
    pub fn set_cell(&mut self, coord: GridCoord, edges: CellEdges) -> bool {
        match self.index(coord) {
            Some(index) => {
                self.cells[index] = edges;
                true
            }
            None => false,
        }
    }

    /// Overwrites the code on one side of a cell.
    ///
    /// Returns `false` when the coordinate lies outside the grid, leaving the
    /// grid untouched.
    pub fn set_edge(&mut self, coord: GridCoord, side: EdgeSide, code: EdgeCode) -> bool {
        match self.index(coord) {
            Some(index) => {
                self.cells[index].set(side, code);
                true
            }
            None => false,
        }
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.contains(coord) {
            let row = (coord.row() - 1) as usize;
            let col = (coord.col() - 1) as usize;
            Some(row * self.columns as usize + col)
        } else {
            None
        }
    }
}

/// Identity of one physical cell edge.
///
/// A shared edge can be named from either adjacent cell; [`EdgeKey::canonical`]
/// collapses both spellings to the owning cell so registries and door-state
/// memory key each physical edge exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    cell: GridCoord,
    side: EdgeSide,
}

impl EdgeKey {
    /// Creates an edge key from a cell and one of its sides.
    #[must_use]
    pub const fn new(cell: GridCoord, side: EdgeSide) -> Self {
        Self { cell, side }
    }

    /// Cell naming the edge.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        self.cell
    }

    /// Side of the cell the edge lies on.
    #[must_use]
    pub const fn side(&self) -> EdgeSide {
        self.side
    }

    /// Canonical spelling of the key: `Up`/`Left` edges are restated as the
    /// `Down`/`Right` edge of the neighboring cell.
    #[must_use]
    pub fn canonical(self) -> EdgeKey {
        match self.side {
            EdgeSide::Up => EdgeKey::new(
                GridCoord::new(self.cell.row().saturating_sub(1), self.cell.col()),
                EdgeSide::Down,
            ),
            EdgeSide::Left => EdgeKey::new(
                GridCoord::new(self.cell.row(), self.cell.col().saturating_sub(1)),
                EdgeSide::Right,
            ),
            EdgeSide::Right | EdgeSide::Down => self,
        }
    }
}

/// Prefab class a visual instance is spawned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneClass {
    /// A mobile rescue agent.
    Agent,
    /// A smoke marker filling a cell.
    Smoke,
    /// A fire marker filling a cell.
    Fire,
    /// A face-down point-of-interest token.
    HiddenPoi,
    /// A revealed victim token.
    RevealedPoi,
    /// A solid wall segment on a cell edge.
    Wall,
    /// A wall segment with a doorway opening.
    DoorFrame,
    /// A door slab hung inside a doorway.
    Door,
}

impl fmt::Display for SceneClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agent => "agent",
            Self::Smoke => "smoke",
            Self::Fire => "fire",
            Self::HiddenPoi => "hidden poi",
            Self::RevealedPoi => "revealed poi",
            Self::Wall => "wall",
            Self::DoorFrame => "door frame",
            Self::Door => "door",
        };
        f.write_str(name)
    }
}

/// Logical entity classes managed by the scene registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Mobile agents keyed by server-assigned id.
    Agent,
    /// Fire and smoke markers keyed by cell.
    FireMarker,
    /// Points of interest keyed by cell.
    Poi,
    /// Doors keyed by canonical edge.
    Door,
    /// Wall segments keyed by canonical edge.
    WallSegment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agent => "agent",
            Self::FireMarker => "fire marker",
            Self::Poi => "point of interest",
            Self::Door => "door",
            Self::WallSegment => "wall segment",
        };
        f.write_str(name)
    }
}

/// Orientation of an edge-mounted visual.
///
/// Up/down edges run across the camera axis ("frontal"); left/right edges run
/// along it ("lateral") and are rotated a quarter turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Placed along a horizontal (up/down) edge.
    Frontal,
    /// Placed along a vertical (left/right) edge, rotated 90 degrees.
    Lateral,
}

/// Named animation triggers the engine may fire on a visual instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationCue {
    /// Swing open a door mounted on a frontal edge.
    OpenFrontal,
    /// Swing open a door mounted on a lateral edge.
    OpenLateral,
    /// Flip a point-of-interest token face up.
    Reveal,
}

/// Score counters displayed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreField {
    /// Victims carried to safety.
    Saved,
    /// Victims lost to the fire.
    Lost,
    /// Structural damage accumulated by the building.
    Damage,
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Saved => "saved",
            Self::Lost => "lost",
            Self::Damage => "damage",
        };
        f.write_str(name)
    }
}

/// Logical identity of a registry slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    /// Agents are keyed by their server-assigned id.
    Agent(AgentId),
    /// Cell-bound entities (fires, points of interest) are keyed by position.
    Cell(GridCoord),
    /// Edge-mounted entities (walls, doors) are keyed by canonical edge.
    Edge(EdgeKey),
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(id) => write!(f, "agent {id}"),
            Self::Cell(cell) => write!(f, "cell {cell}"),
            Self::Edge(key) => write!(f, "edge {} {:?}", key.cell(), key.side()),
        }
    }
}

/// Opaque reference to a placed visual instance.
///
/// Allocated by the [`VisualSink`] and owned exclusively by the registry slot
/// that created it; the engine never shares or fabricates handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(u64);

impl VisualHandle {
    /// Creates a handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Write-only contract toward the rendering collaborator.
///
/// The engine issues create/move/destroy/animate operations and never reads
/// rendering state back.
pub trait VisualSink {
    /// Creates a visual instance and returns its opaque handle.
    fn spawn(
        &mut self,
        class: SceneClass,
        key: SlotKey,
        position: WorldPosition,
        facing: Facing,
    ) -> VisualHandle;

    /// Moves an existing instance to a new position.
    fn relocate(&mut self, handle: VisualHandle, position: WorldPosition);

    /// Destroys an existing instance.
    fn destroy(&mut self, handle: VisualHandle);

    /// Fires a named animation on an existing instance.
    fn trigger_animation(&mut self, handle: VisualHandle, cue: AnimationCue);

    /// Overwrites one of the score display fields.
    fn set_text(&mut self, field: ScoreField, value: &str);
}

/// Role a rescue agent plays in the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// Specialised in extinguishing fire.
    #[serde(alias = "firefighter")]
    Firefighter,
    /// Specialised in carrying victims out.
    #[serde(alias = "rescue")]
    Rescue,
    /// Unspecialised agent.
    #[default]
    #[serde(alias = "base")]
    Base,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Firefighter => "firefighter",
            Self::Rescue => "rescue",
            Self::Base => "base",
        };
        f.write_str(name)
    }
}

/// Per-frame state of one rescue agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// Identifier stable across the whole frame sequence.
    pub id: AgentId,
    /// One-indexed row occupied at this step.
    pub row: u32,
    /// One-indexed column occupied at this step.
    pub col: u32,
    /// Whether the agent is carrying a victim.
    #[serde(default)]
    pub carrying: bool,
    /// Role the agent plays.
    #[serde(default)]
    pub role: AgentRole,
}

impl AgentState {
    /// Board cell occupied by the agent.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        GridCoord::new(self.row, self.col)
    }
}

/// Intensity of a fire marker, wire-encoded as the digits 0, 1 and 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FirePhase {
    /// No fire in the cell.
    Clear,
    /// Smoke that has not yet ignited.
    Smoke,
    /// Open flame.
    Fire,
}

impl TryFrom<u8> for FirePhase {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Clear),
            1 => Ok(Self::Smoke),
            2 => Ok(Self::Fire),
            other => Err(format!("unrecognised fire intensity {other}")),
        }
    }
}

impl From<FirePhase> for u8 {
    fn from(phase: FirePhase) -> Self {
        match phase {
            FirePhase::Clear => 0,
            FirePhase::Smoke => 1,
            FirePhase::Fire => 2,
        }
    }
}

/// Per-frame state of one fire or smoke marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireState {
    /// One-indexed row of the marker.
    pub row: u32,
    /// One-indexed column of the marker.
    pub col: u32,
    /// Intensity of the marker.
    #[serde(alias = "state")]
    pub intensity: FirePhase,
}

impl FireState {
    /// Board cell occupied by the marker.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        GridCoord::new(self.row, self.col)
    }
}

/// Kind of a point-of-interest token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiKind {
    /// A victim waiting to be rescued.
    #[serde(rename = "v", alias = "victim", alias = "Victim")]
    Victim,
    /// A false alarm that disappears once revealed.
    #[serde(rename = "f", alias = "false", alias = "FalseAlarm")]
    FalseAlarm,
}

/// Per-frame state of one point-of-interest token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiState {
    /// One-indexed row of the token.
    pub row: u32,
    /// One-indexed column of the token.
    pub col: u32,
    /// What the token turns out to be.
    #[serde(alias = "type")]
    pub kind: PoiKind,
    /// Whether the kind is currently known to the viewer.
    #[serde(default)]
    pub revealed: bool,
}

impl PoiState {
    /// Board cell occupied by the token.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        GridCoord::new(self.row, self.col)
    }
}

/// Whether a door is currently open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorStatus {
    /// The door is shut.
    #[default]
    #[serde(alias = "closed")]
    Closed,
    /// The door has been opened.
    #[serde(alias = "open")]
    Open,
}

/// Per-frame state of one door, named by its two adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorState {
    /// First adjacent cell.
    pub p1: GridCoord,
    /// Second adjacent cell.
    pub p2: GridCoord,
    /// Whether the door is open at this step.
    #[serde(default)]
    pub status: DoorStatus,
}

/// Score counters carried by every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreStats {
    /// Victims carried to safety so far.
    #[serde(default)]
    pub saved: u32,
    /// Victims lost so far.
    #[serde(default)]
    pub lost: u32,
    /// Structural damage accumulated so far.
    #[serde(default)]
    pub damage: u32,
}

/// One complete, immutable snapshot of the simulation at a given step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Step index assigned by the producer.
    #[serde(default)]
    pub step: u32,
    /// Agents present at this step.
    #[serde(default)]
    pub agents: Vec<AgentState>,
    /// Fire and smoke markers present at this step.
    #[serde(default)]
    pub fires: Vec<FireState>,
    /// Point-of-interest tokens present at this step.
    #[serde(default)]
    pub pois: Vec<PoiState>,
    /// Doors present at this step.
    #[serde(default)]
    pub doors: Vec<DoorState>,
    /// Per-row encoded wall strings, one per board row.
    #[serde(default)]
    pub walls: Vec<String>,
    /// Score counters at this step.
    #[serde(default)]
    pub stats: ScoreStats,
}

/// Static board parameters passed into the engine at construction.
///
/// There is no process-wide board table; every component reads these values
/// from the configuration it was handed.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfig {
    rows: u32,
    columns: u32,
    cell_size: f32,
    door_capacity: usize,
    fire_capacity: usize,
    poi_capacity: usize,
    time_per_step: Duration,
}

impl BoardConfig {
    /// Creates a configuration with the provided board dimensions and the
    /// default capacities and step duration.
    #[must_use]
    pub fn new(rows: u32, columns: u32, cell_size: f32) -> Self {
        Self {
            rows,
            columns,
            cell_size,
            ..Self::default()
        }
    }

    /// Replaces the maximum number of door slots.
    #[must_use]
    pub fn with_door_capacity(mut self, capacity: usize) -> Self {
        self.door_capacity = capacity;
        self
    }

    /// Replaces the maximum number of fire-marker slots.
    #[must_use]
    pub fn with_fire_capacity(mut self, capacity: usize) -> Self {
        self.fire_capacity = capacity;
        self
    }

    /// Replaces the maximum number of point-of-interest slots.
    #[must_use]
    pub fn with_poi_capacity(mut self, capacity: usize) -> Self {
        self.poi_capacity = capacity;
        self
    }

    /// Replaces the duration of one agent animation step.
    #[must_use]
    pub fn with_time_per_step(mut self, duration: Duration) -> Self {
        self.time_per_step = duration;
        self
    }

    /// Number of board rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of board columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Side length of one square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Highest one-indexed row; anchors the world-space row axis.
    #[must_use]
    pub const fn max_row(&self) -> u32 {
        self.rows
    }

    /// Maximum number of simultaneously placed doors.
    #[must_use]
    pub const fn door_capacity(&self) -> usize {
        self.door_capacity
    }

    /// Maximum number of simultaneously placed fire markers.
    #[must_use]
    pub const fn fire_capacity(&self) -> usize {
        self.fire_capacity
    }

    /// Maximum number of simultaneously placed point-of-interest tokens.
    #[must_use]
    pub const fn poi_capacity(&self) -> usize {
        self.poi_capacity
    }

    /// Duration of the animation between two consecutive frames.
    #[must_use]
    pub const fn time_per_step(&self) -> Duration {
        self.time_per_step
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            columns: 8,
            cell_size: 6.4,
            door_capacity: 8,
            fire_capacity: 48,
            poi_capacity: 15,
            time_per_step: Duration::from_secs(1),
        }
    }
}

/// Commands that express all permissible playback requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces any in-flight sequence and begins playing the provided one.
    Start {
        /// Frames to play, in strictly increasing step order.
        frames: Vec<Frame>,
    },
    /// Advances the agent animation clock by the provided delta time.
    Tick {
        /// Duration of host time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Destroys every placed visual and returns the scene to idle.
    Reset,
}

/// Events broadcast by the scene after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The static geometry and entities of a frame are now on display.
    FrameAdvanced {
        /// Index of the frame within the sequence.
        index: usize,
    },
    /// An agent finished its animated step between two cells.
    AgentMoved {
        /// Identifier of the agent that moved.
        id: AgentId,
        /// Cell the agent occupied before the step.
        from: GridCoord,
        /// Cell the agent occupies after the step.
        to: GridCoord,
    },
    /// An agent present earlier is missing from the upcoming frame; its
    /// visual stays at the last position until the host decides otherwise.
    AgentAbsent {
        /// Identifier of the missing agent.
        id: AgentId,
        /// Index of the frame the agent is missing from.
        index: usize,
    },
    /// A registry created a new visual instance.
    EntityCreated {
        /// Logical class of the created entity.
        kind: EntityKind,
        /// Identity key of the created entity.
        key: SlotKey,
    },
    /// A registry destroyed a visual instance.
    EntityRemoved {
        /// Logical class of the removed entity.
        kind: EntityKind,
        /// Identity key of the removed entity.
        key: SlotKey,
    },
    /// A door transitioned to open and fired its opening animation.
    DoorOpened {
        /// Canonical edge the door occupies.
        key: EdgeKey,
    },
    /// A point-of-interest token was revealed.
    PoiRevealed {
        /// Cell holding the token.
        cell: GridCoord,
    },
    /// The final frame is on display and playback has finished.
    SequenceDone,
    /// A recoverable defect was skipped; the rest of the frame proceeded.
    Fault {
        /// Index of the offending frame, when one is known.
        index: Option<usize>,
        /// The defect that was skipped.
        error: ReplayError,
    },
}

/// Recoverable defects surfaced on the event channel.
///
/// None of these abort playback; the offending sub-update is skipped and the
/// host decides whether to stop.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// A frame's board payload could not be decoded.
    #[error("malformed board: {0}")]
    MalformedBoard(#[from] BoardDefect),
    /// More entities of one class than the configured slot maximum.
    #[error("{kind} capacity exceeded, the configured maximum is {max}")]
    CapacityExceeded {
        /// Class whose registry ran out of slots.
        kind: EntityKind,
        /// The configured maximum that was hit.
        max: usize,
    },
    /// `start` was invoked with no frames to play.
    #[error("the frame sequence is empty")]
    EmptySequence,
    /// A frame references an agent id that was never seeded from frame 0.
    #[error("agent {id} was never seeded from the opening frame")]
    UnknownAgent {
        /// The unrecognised identifier.
        id: AgentId,
    },
}

/// Specific ways a board payload can be malformed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardDefect {
    /// The wall payload has the wrong number of rows.
    #[error("expected {expected} wall rows, found {found}")]
    RowCount {
        /// Configured row count.
        expected: usize,
        /// Rows actually present.
        found: usize,
    },
    /// One wall row has the wrong length.
    #[error("wall row {row} is {found} characters long, expected {expected}")]
    RowLength {
        /// Zero-indexed row within the payload.
        row: usize,
        /// Expected length, four characters per column.
        expected: usize,
        /// Length actually found.
        found: usize,
    },
    /// One wall row contains a character outside `0..=3`.
    #[error("wall row {row} contains unrecognised code {code:?}")]
    UnknownCode {
        /// Zero-indexed row within the payload.
        row: usize,
        /// The offending character.
        code: char,
    },
    /// A door names two cells that do not share an edge.
    #[error("door endpoints {p1} and {p2} are not adjacent")]
    DetachedDoor {
        /// First endpoint.
        p1: GridCoord,
        /// Second endpoint.
        p2: GridCoord,
    },
    /// An entity names a cell outside the configured board.
    #[error("cell {cell} lies outside the configured board")]
    OutOfBounds {
        /// The offending cell.
        cell: GridCoord,
    },
}
