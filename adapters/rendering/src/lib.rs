#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Renderer-neutral presentation adapters for Rescue Replay.
//!
//! The engine only ever talks to a [`VisualSink`]; this crate supplies the
//! sink implementations a host needs before a concrete renderer exists: a
//! recording sink that keeps the full call log plus the table of live
//! instances, a discarding sink for headless runs, and an ASCII rasterizer
//! that projects the live instances onto a character grid for terminals and
//! tests.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{ensure, Result};
use glam::Vec2;
use rescue_replay_core::{
    AnimationCue, BoardConfig, Facing, SceneClass, ScoreField, SlotKey, VisualHandle, VisualSink,
    WorldPosition,
};

/// One operation received from the engine, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkCall {
    /// A visual instance was created.
    Spawn {
        /// Prefab class of the instance.
        class: SceneClass,
        /// Identity key the engine filed the instance under.
        key: SlotKey,
        /// Initial position.
        position: WorldPosition,
        /// Initial orientation.
        facing: Facing,
        /// Handle allocated for the instance.
        handle: VisualHandle,
    },
    /// An instance moved.
    Relocate {
        /// Handle of the moved instance.
        handle: VisualHandle,
        /// New position.
        position: WorldPosition,
    },
    /// An instance was destroyed.
    Destroy {
        /// Handle of the destroyed instance.
        handle: VisualHandle,
    },
    /// An animation was fired on an instance.
    Animate {
        /// Handle of the animated instance.
        handle: VisualHandle,
        /// Cue that was fired.
        cue: AnimationCue,
    },
    /// A score display field was overwritten.
    SetText {
        /// Field that changed.
        field: ScoreField,
        /// New text.
        value: String,
    },
}

/// One currently live visual instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedVisual {
    /// Prefab class of the instance.
    pub class: SceneClass,
    /// Identity key the engine filed the instance under.
    pub key: SlotKey,
    /// Current position.
    pub position: WorldPosition,
    /// Orientation assigned at spawn.
    pub facing: Facing,
}

/// Sink that records every call and tracks the live instance table.
///
/// Doubles as the reference back end for tests and the data source for the
/// ASCII rasterizer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    next_handle: u64,
    calls: Vec<SinkCall>,
    live: BTreeMap<VisualHandle, PlacedVisual>,
    score: BTreeMap<ScoreField, String>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete call log in arrival order.
    #[must_use]
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Currently live instances in handle order.
    pub fn live(&self) -> impl Iterator<Item = &PlacedVisual> {
        self.live.values()
    }

    /// Number of currently live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Last text written to the provided score field.
    #[must_use]
    pub fn score_text(&self, field: ScoreField) -> Option<&str> {
        self.score.get(&field).map(String::as_str)
    }
}

impl VisualSink for RecordingSink {
    fn spawn(
        &mut self,
        class: SceneClass,
        key: SlotKey,
        position: WorldPosition,
        facing: Facing,
    ) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle::new(self.next_handle);
        self.calls.push(SinkCall::Spawn {
            class,
            key,
            position,
            facing,
            handle,
        });
        let _ = self.live.insert(
            handle,
            PlacedVisual {
                class,
                key,
                position,
                facing,
            },
        );
        handle
    }

    fn relocate(&mut self, handle: VisualHandle, position: WorldPosition) {
        self.calls.push(SinkCall::Relocate { handle, position });
        if let Some(placed) = self.live.get_mut(&handle) {
            placed.position = position;
        }
    }

    fn destroy(&mut self, handle: VisualHandle) {
        self.calls.push(SinkCall::Destroy { handle });
        let _ = self.live.remove(&handle);
    }

    fn trigger_animation(&mut self, handle: VisualHandle, cue: AnimationCue) {
        self.calls.push(SinkCall::Animate { handle, cue });
    }

    fn set_text(&mut self, field: ScoreField, value: &str) {
        self.calls.push(SinkCall::SetText {
            field,
            value: value.to_owned(),
        });
        let _ = self.score.insert(field, value.to_owned());
    }
}

/// Sink that allocates handles and discards everything else.
#[derive(Clone, Debug, Default)]
pub struct NullSink {
    next_handle: u64,
}

impl NullSink {
    /// Creates a discarding sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisualSink for NullSink {
    fn spawn(
        &mut self,
        _class: SceneClass,
        _key: SlotKey,
        _position: WorldPosition,
        _facing: Facing,
    ) -> VisualHandle {
        self.next_handle += 1;
        VisualHandle::new(self.next_handle)
    }

    fn relocate(&mut self, _handle: VisualHandle, _position: WorldPosition) {}

    fn destroy(&mut self, _handle: VisualHandle) {}

    fn trigger_animation(&mut self, _handle: VisualHandle, _cue: AnimationCue) {}

    fn set_text(&mut self, _field: ScoreField, _value: &str) {}
}

/// Projection from world space onto the character raster.
///
/// The raster doubles the board resolution: odd raster coordinates are cell
/// interiors, even ones are the edges and corners between them, so walls land
/// between the cells they separate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    cell_size: f32,
    max_row: f32,
}

impl Projection {
    /// Creates a projection for the provided board configuration.
    pub fn new(config: &BoardConfig) -> Result<Self> {
        ensure!(
            config.cell_size() > 0.0,
            "cell size must be positive to project world positions"
        );
        Ok(Self {
            cell_size: config.cell_size(),
            max_row: config.max_row() as f32,
        })
    }

    /// Maps a world position to raster coordinates, clamped to the raster.
    #[must_use]
    pub fn to_raster(&self, position: WorldPosition, width: usize, height: usize) -> (usize, usize) {
        let scaled = Vec2::new(position.x, position.z) / self.cell_size;
        let x = 2.0 * scaled.x + 1.0;
        let y = 2.0 * (self.max_row - 1.0 - scaled.y) + 1.0;
        let clamp = Vec2::new(x, y)
            .round()
            .clamp(Vec2::ZERO, Vec2::new(width as f32 - 1.0, height as f32 - 1.0));
        (clamp.x as usize, clamp.y as usize)
    }
}

/// Character grid holding one rendered scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneRaster {
    width: usize,
    height: usize,
    glyphs: Vec<char>,
}

impl SceneRaster {
    /// Glyph at the provided raster coordinates.
    #[must_use]
    pub fn glyph(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            self.glyphs.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    fn blank(width: usize, height: usize) -> Self {
        let mut glyphs = vec![' '; width * height];
        for y in (0..height).step_by(2) {
            for x in (0..width).step_by(2) {
                glyphs[y * width + x] = '+';
            }
        }
        Self {
            width,
            height,
            glyphs,
        }
    }

    fn put(&mut self, x: usize, y: usize, glyph: char) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = glyph;
        }
    }
}

impl fmt::Display for SceneRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.glyphs.chunks(self.width) {
            for glyph in row {
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Draw passes from background to foreground.
const DRAW_ORDER: [SceneClass; 8] = [
    SceneClass::Wall,
    SceneClass::DoorFrame,
    SceneClass::Door,
    SceneClass::Smoke,
    SceneClass::Fire,
    SceneClass::HiddenPoi,
    SceneClass::RevealedPoi,
    SceneClass::Agent,
];

/// Projects the sink's live instances onto a character raster.
pub fn rasterize(sink: &RecordingSink, config: &BoardConfig) -> Result<SceneRaster> {
    ensure!(
        config.rows() > 0 && config.columns() > 0,
        "board must have at least one cell to rasterize"
    );
    let projection = Projection::new(config)?;
    let width = config.columns() as usize * 2 + 1;
    let height = config.rows() as usize * 2 + 1;
    let mut raster = SceneRaster::blank(width, height);

    for class in DRAW_ORDER {
        for placed in sink.live().filter(|placed| placed.class == class) {
            let (x, y) = projection.to_raster(placed.position, width, height);
            raster.put(x, y, glyph_for(placed));
        }
    }

    Ok(raster)
}

fn glyph_for(placed: &PlacedVisual) -> char {
    match placed.class {
        SceneClass::Wall => match placed.facing {
            Facing::Frontal => '-',
            Facing::Lateral => '|',
        },
        SceneClass::DoorFrame => match placed.facing {
            Facing::Frontal => '=',
            Facing::Lateral => '"',
        },
        SceneClass::Door => 'D',
        SceneClass::Smoke => '~',
        SceneClass::Fire => '*',
        SceneClass::HiddenPoi => '?',
        SceneClass::RevealedPoi => '!',
        SceneClass::Agent => match placed.key {
            SlotKey::Agent(id) => {
                char::from_digit(id.get() % 10, 10).unwrap_or('A')
            }
            _ => 'A',
        },
    }
}
