//! Frame playback: geometry rebuild, entity reconciliation and agent motion.
//!
//! Playback walks the frame sequence in strictly increasing index order. Each
//! displayed frame rebuilds the static scene wholesale (walls, doors, fires,
//! points of interest) while agents persist across frames and are moved by a
//! single shared interpolation timer. The timer is the only suspension point:
//! the host drives it with tick commands and the machine never begins frame
//! `i + 1` before the animation into it has completed.

use std::time::Duration;

use rescue_replay_board::{codec, doors, mapper};
use rescue_replay_core::{
    AgentId, AnimationCue, BoardDefect, DoorStatus, EdgeCode, EdgeGrid, EdgeKey, EdgeSide, Event,
    Facing, FirePhase, FireState, Frame, GridCoord, PoiKind, PoiState, ReplayError, SceneClass,
    ScoreField, ScoreStats, SlotKey, VisualSink, WorldPosition,
};

use crate::Scene;

/// Internal playback phase of the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No sequence loaded.
    Idle,
    /// Animating the transition `transition -> transition + 1`.
    Animating {
        /// Index of the frame currently on display.
        transition: usize,
        /// Time accumulated toward the shared step timer.
        elapsed: Duration,
    },
    /// The final frame is on display.
    Done,
    /// The sequence was rejected outright.
    Failed(ReplayError),
}

/// One agent's planned motion for the transition in flight.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AgentMotion {
    id: AgentId,
    from: GridCoord,
    to: GridCoord,
    start: WorldPosition,
    end: WorldPosition,
}

pub(crate) fn start<S: VisualSink>(
    scene: &mut Scene,
    frames: Vec<Frame>,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    if frames.is_empty() {
        scene.phase = Phase::Failed(ReplayError::EmptySequence);
        out_events.push(Event::Fault {
            index: None,
            error: ReplayError::EmptySequence,
        });
        return;
    }

    reset(scene, sink, out_events);
    scene.frames = frames;

    seed_agents(scene, sink, out_events);
    build_frame(scene, 0, sink, out_events);
    out_events.push(Event::FrameAdvanced { index: 0 });
    enter_transition(scene, 0, Duration::ZERO, out_events);
}

pub(crate) fn tick<S: VisualSink>(
    scene: &mut Scene,
    dt: Duration,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    let Phase::Animating { transition, elapsed } = &scene.phase else {
        return;
    };
    let mut transition = *transition;
    let mut elapsed = elapsed.saturating_add(dt);
    let step = scene.config.time_per_step();

    // A large delta may complete several transitions; surplus time carries
    // over so playback stays aligned with the host clock.
    while elapsed >= step {
        complete_transition(scene, sink, out_events);
        let next = transition + 1;
        build_frame(scene, next, sink, out_events);
        out_events.push(Event::FrameAdvanced { index: next });
        elapsed = elapsed.saturating_sub(step);

        if next + 1 >= scene.frames.len() {
            scene.phase = Phase::Done;
            out_events.push(Event::SequenceDone);
            return;
        }

        plan_motions(scene, next, out_events);
        transition = next;
    }

    if !elapsed.is_zero() {
        let ratio = elapsed.as_secs_f32() / step.as_secs_f32();
        for index in 0..scene.motions.len() {
            let motion = scene.motions[index];
            let position = motion.start.lerp(motion.end, ratio);
            let _ = scene
                .agents
                .relocate(SlotKey::Agent(motion.id), position, sink);
        }
    }

    scene.phase = Phase::Animating {
        transition,
        elapsed,
    };
}

pub(crate) fn reset<S: VisualSink>(scene: &mut Scene, sink: &mut S, out_events: &mut Vec<Event>) {
    scene.agents.remove_all(sink, out_events);
    scene.fires.remove_all(sink, out_events);
    scene.pois.remove_all(sink, out_events);
    scene.doors.remove_all(sink, out_events);
    scene.walls.remove_all(sink, out_events);
    scene.opened_doors.clear();
    scene.revealed_pois.clear();
    scene.motions.clear();
    scene.frames.clear();
    scene.grid = EdgeGrid::new(scene.config.rows(), scene.config.columns());
    scene.score = ScoreStats::default();
    scene.phase = Phase::Idle;
}

/// Creates every agent of frame 0 at its mapped position.
fn seed_agents<S: VisualSink>(scene: &mut Scene, sink: &mut S, out_events: &mut Vec<Event>) {
    let seeds: Vec<(AgentId, GridCoord)> = scene.frames[0]
        .agents
        .iter()
        .map(|agent| (agent.id, agent.cell()))
        .collect();

    for (id, cell) in seeds {
        let position = mapper::grid_to_world(cell, &scene.config);
        if let Err(error) = scene.agents.upsert(
            SlotKey::Agent(id),
            SceneClass::Agent,
            position,
            Facing::Frontal,
            sink,
            out_events,
        ) {
            out_events.push(Event::Fault {
                index: Some(0),
                error,
            });
        }
    }
}

/// Ends the in-flight transition: snaps every animating agent exactly onto
/// its destination and reports the completed moves.
fn complete_transition<S: VisualSink>(
    scene: &mut Scene,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    let motions = std::mem::take(&mut scene.motions);
    for motion in motions {
        let _ = scene
            .agents
            .relocate(SlotKey::Agent(motion.id), motion.end, sink);
        if motion.from != motion.to {
            out_events.push(Event::AgentMoved {
                id: motion.id,
                from: motion.from,
                to: motion.to,
            });
        }
    }
}

/// Plans the motions for the transition `current -> current + 1`.
///
/// Agents missing from the upcoming frame keep their last position and are
/// reported as absent; agents never seeded from frame 0 are skipped with an
/// unknown-agent fault.
fn plan_motions(scene: &mut Scene, current: usize, out_events: &mut Vec<Event>) {
    let upcoming = current + 1;
    scene.motions.clear();

    for agent in &scene.frames[upcoming].agents {
        let key = SlotKey::Agent(agent.id);
        match scene.agents.get(key) {
            Some(slot) => {
                let start = slot.position;
                let end = mapper::grid_to_world(agent.cell(), &scene.config);
                scene.motions.push(AgentMotion {
                    id: agent.id,
                    from: mapper::world_to_grid(start, &scene.config),
                    to: agent.cell(),
                    start,
                    end,
                });
            }
            None => out_events.push(Event::Fault {
                index: Some(upcoming),
                error: ReplayError::UnknownAgent { id: agent.id },
            }),
        }
    }

    for (key, _) in scene.agents.iter() {
        let SlotKey::Agent(id) = key else { continue };
        let listed = scene.frames[upcoming]
            .agents
            .iter()
            .any(|agent| agent.id == *id);
        if !listed {
            out_events.push(Event::AgentAbsent {
                id: *id,
                index: upcoming,
            });
        }
    }
}

/// Decides whether another transition follows the freshly built frame.
fn enter_transition(
    scene: &mut Scene,
    current: usize,
    leftover: Duration,
    out_events: &mut Vec<Event>,
) {
    if current + 1 >= scene.frames.len() {
        scene.phase = Phase::Done;
        out_events.push(Event::SequenceDone);
        return;
    }
    plan_motions(scene, current, out_events);
    scene.phase = Phase::Animating {
        transition: current,
        elapsed: leftover,
    };
}

/// Rebuilds the static scene from one frame: score text, walls, doors, fires
/// and points of interest, plus the door-open and reveal reconciliation.
fn build_frame<S: VisualSink>(
    scene: &mut Scene,
    index: usize,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    let frame = scene.frames[index].clone();

    // Score text is overwritten wholesale, never diffed.
    sink.set_text(ScoreField::Saved, &frame.stats.saved.to_string());
    sink.set_text(ScoreField::Lost, &frame.stats.lost.to_string());
    sink.set_text(ScoreField::Damage, &frame.stats.damage.to_string());
    scene.score = frame.stats;

    match codec::decode(&frame.walls, &scene.config) {
        Ok(mut grid) => {
            let resolution = doors::resolve(&frame.doors, &mut grid, &scene.config);
            for error in resolution.faults {
                out_events.push(Event::Fault {
                    index: Some(index),
                    error,
                });
            }

            scene.walls.remove_all(sink, out_events);
            scene.doors.remove_all(sink, out_events);
            rebuild_walls(scene, &grid, index, sink, out_events);
            rebuild_doors(scene, &resolution.placements, index, sink, out_events);
            scene.grid = grid;
        }
        // A malformed payload leaves the previous frame's geometry standing.
        Err(defect) => out_events.push(Event::Fault {
            index: Some(index),
            error: ReplayError::MalformedBoard(defect),
        }),
    }

    rebuild_fires(scene, &frame.fires, index, sink, out_events);
    rebuild_pois(scene, &frame.pois, index, sink, out_events);
}

/// Instantiates wall segments and doorway frames, visiting each physical
/// edge exactly once: every cell owns its right and down edges, row 1 adds
/// the up edge and column 1 the left edge.
fn rebuild_walls<S: VisualSink>(
    scene: &mut Scene,
    grid: &EdgeGrid,
    index: usize,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    for row in 1..=grid.rows() {
        for col in 1..=grid.columns() {
            let coord = GridCoord::new(row, col);
            let Some(edges) = grid.cell(coord) else {
                continue;
            };

            let owned = [
                Some(EdgeSide::Right),
                Some(EdgeSide::Down),
                (row == 1).then_some(EdgeSide::Up),
                (col == 1).then_some(EdgeSide::Left),
            ];

            for side in owned.into_iter().flatten() {
                let class = match edges.get(side) {
                    EdgeCode::Clear => continue,
                    EdgeCode::Wall => SceneClass::Wall,
                    EdgeCode::Door | EdgeCode::Entry => SceneClass::DoorFrame,
                };
                let key = EdgeKey::new(coord, side);
                let position = mapper::edge_position(key, &scene.config);
                if let Err(error) = scene.walls.upsert(
                    SlotKey::Edge(key.canonical()),
                    class,
                    position,
                    mapper::side_facing(side),
                    sink,
                    out_events,
                ) {
                    out_events.push(Event::Fault {
                        index: Some(index),
                        error,
                    });
                }
            }
        }
    }
}

/// Places door slabs and applies open transitions exactly once per door.
fn rebuild_doors<S: VisualSink>(
    scene: &mut Scene,
    placements: &[doors::DoorPlacement],
    index: usize,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    for placement in placements {
        let handle = match scene.doors.upsert(
            SlotKey::Edge(placement.key),
            SceneClass::Door,
            placement.position,
            placement.facing,
            sink,
            out_events,
        ) {
            Ok(handle) => handle,
            Err(error) => {
                out_events.push(Event::Fault {
                    index: Some(index),
                    error,
                });
                continue;
            }
        };

        match placement.status {
            DoorStatus::Open => {
                // Only the closed -> open transition fires the animation;
                // a door that stays open is a no-op.
                if scene.opened_doors.insert(placement.key) {
                    let cue = match placement.facing {
                        Facing::Frontal => AnimationCue::OpenFrontal,
                        Facing::Lateral => AnimationCue::OpenLateral,
                    };
                    sink.trigger_animation(handle, cue);
                    out_events.push(Event::DoorOpened { key: placement.key });
                }
            }
            DoorStatus::Closed => {
                let _ = scene.opened_doors.remove(&placement.key);
            }
        }
    }
}

/// Rebuilds the fire and smoke markers for one frame.
fn rebuild_fires<S: VisualSink>(
    scene: &mut Scene,
    fires: &[FireState],
    index: usize,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    scene.fires.remove_all(sink, out_events);

    for fire in fires {
        let class = match fire.intensity {
            FirePhase::Clear => continue,
            FirePhase::Smoke => SceneClass::Smoke,
            FirePhase::Fire => SceneClass::Fire,
        };
        let coord = fire.cell();
        if !scene.grid.contains(coord) {
            out_events.push(Event::Fault {
                index: Some(index),
                error: ReplayError::MalformedBoard(BoardDefect::OutOfBounds { cell: coord }),
            });
            continue;
        }

        let position = mapper::grid_to_world(coord, &scene.config);
        if let Err(error) = scene.fires.upsert(
            SlotKey::Cell(coord),
            class,
            position,
            Facing::Frontal,
            sink,
            out_events,
        ) {
            out_events.push(Event::Fault {
                index: Some(index),
                error,
            });
        }
    }
}

/// Rebuilds the point-of-interest tokens for one frame.
///
/// Hidden tokens spawn face down. A token whose revealed flag rises fires
/// its reveal cue once per cell; revealed false alarms disappear entirely.
fn rebuild_pois<S: VisualSink>(
    scene: &mut Scene,
    pois: &[PoiState],
    index: usize,
    sink: &mut S,
    out_events: &mut Vec<Event>,
) {
    scene.pois.remove_all(sink, out_events);

    for poi in pois {
        let coord = poi.cell();
        if !scene.grid.contains(coord) {
            out_events.push(Event::Fault {
                index: Some(index),
                error: ReplayError::MalformedBoard(BoardDefect::OutOfBounds { cell: coord }),
            });
            continue;
        }
        let position = mapper::grid_to_world(coord, &scene.config);

        if !poi.revealed {
            let _ = scene.revealed_pois.remove(&coord);
            if let Err(error) = scene.pois.upsert(
                SlotKey::Cell(coord),
                SceneClass::HiddenPoi,
                position,
                Facing::Frontal,
                sink,
                out_events,
            ) {
                out_events.push(Event::Fault {
                    index: Some(index),
                    error,
                });
            }
            continue;
        }

        let newly_revealed = scene.revealed_pois.insert(coord);
        match poi.kind {
            PoiKind::Victim => {
                match scene.pois.upsert(
                    SlotKey::Cell(coord),
                    SceneClass::RevealedPoi,
                    position,
                    Facing::Frontal,
                    sink,
                    out_events,
                ) {
                    Ok(handle) => {
                        if newly_revealed {
                            sink.trigger_animation(handle, AnimationCue::Reveal);
                            out_events.push(Event::PoiRevealed { cell: coord });
                        }
                    }
                    Err(error) => out_events.push(Event::Fault {
                        index: Some(index),
                        error,
                    }),
                }
            }
            // The original discards a discovered false alarm; no token stays.
            PoiKind::FalseAlarm => {
                if newly_revealed {
                    out_events.push(Event::PoiRevealed { cell: coord });
                }
            }
        }
    }
}
