//! Deterministic demo sequence generator.
//!
//! Produces a plausible rescue run without a simulation server: a walled
//! building with an entry point, agents wandering cell by cell, smoke
//! igniting and spreading, doors opening partway through and tokens being
//! revealed when an agent reaches them. The same seed always yields the
//! same frames.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rescue_replay_board::codec;
use rescue_replay_core::{
    AgentId, AgentRole, AgentState, BoardConfig, DoorState, DoorStatus, EdgeCode, EdgeGrid,
    EdgeSide, FirePhase, FireState, Frame, GridCoord, PoiKind, PoiState, ScoreStats,
};

const DEMO_AGENTS: u32 = 3;
const DEMO_POIS: usize = 3;
const INTERIOR_WALLS: usize = 6;

pub(crate) fn generate(config: &BoardConfig, seed: u64, steps: u32) -> Vec<Frame> {
    let steps = steps.max(1);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let walls = building_walls(config, &mut rng);
    let doors = [
        (GridCoord::new(2, 3), GridCoord::new(2, 4)),
        (GridCoord::new(4, 5), GridCoord::new(5, 5)),
    ];

    let mut agents: Vec<(AgentId, GridCoord, AgentRole)> = (1..=DEMO_AGENTS)
        .map(|index| {
            let role = match index % 3 {
                0 => AgentRole::Base,
                1 => AgentRole::Firefighter,
                _ => AgentRole::Rescue,
            };
            (AgentId::new(index), random_cell(config, &mut rng), role)
        })
        .collect();

    let mut fires: BTreeMap<GridCoord, FirePhase> = BTreeMap::new();
    let _ = fires.insert(random_cell(config, &mut rng), FirePhase::Fire);

    let mut pois: Vec<(GridCoord, PoiKind, bool)> = Vec::new();
    while pois.len() < DEMO_POIS {
        let cell = random_cell(config, &mut rng);
        if pois.iter().all(|(existing, _, _)| *existing != cell) {
            let kind = if rng.gen_bool(0.6) {
                PoiKind::Victim
            } else {
                PoiKind::FalseAlarm
            };
            pois.push((cell, kind, false));
        }
    }

    let mut frames = Vec::with_capacity(steps as usize);
    for step in 0..steps {
        frames.push(snapshot(step, &agents, &fires, &pois, &doors, &walls, steps));

        for (_, cell, _) in agents.iter_mut() {
            *cell = wander(*cell, config, &mut rng);
        }
        spread_fire(&mut fires, config, &mut rng);

        // Tokens are revealed the moment an agent reaches them; discovered
        // false alarms are withdrawn by the producer on the next step.
        pois.retain(|(_, kind, revealed)| !(*revealed && *kind == PoiKind::FalseAlarm));
        for (cell, _, revealed) in pois.iter_mut() {
            if !*revealed && agents.iter().any(|(_, agent_cell, _)| agent_cell == cell) {
                *revealed = true;
            }
        }
    }

    frames
}

fn snapshot(
    step: u32,
    agents: &[(AgentId, GridCoord, AgentRole)],
    fires: &BTreeMap<GridCoord, FirePhase>,
    pois: &[(GridCoord, PoiKind, bool)],
    doors: &[(GridCoord, GridCoord); 2],
    walls: &[String],
    steps: u32,
) -> Frame {
    let door_status = |opens_at: u32| {
        if step >= opens_at {
            DoorStatus::Open
        } else {
            DoorStatus::Closed
        }
    };

    Frame {
        step,
        agents: agents
            .iter()
            .map(|(id, cell, role)| AgentState {
                id: *id,
                row: cell.row(),
                col: cell.col(),
                carrying: false,
                role: *role,
            })
            .collect(),
        fires: fires
            .iter()
            .map(|(cell, intensity)| FireState {
                row: cell.row(),
                col: cell.col(),
                intensity: *intensity,
            })
            .collect(),
        pois: pois
            .iter()
            .map(|(cell, kind, revealed)| PoiState {
                row: cell.row(),
                col: cell.col(),
                kind: *kind,
                revealed: *revealed,
            })
            .collect(),
        doors: vec![
            DoorState {
                p1: doors[0].0,
                p2: doors[0].1,
                status: door_status(steps / 3),
            },
            DoorState {
                p1: doors[1].0,
                p2: doors[1].1,
                status: door_status(steps * 2 / 3),
            },
        ],
        walls: walls.to_vec(),
        stats: ScoreStats {
            saved: pois
                .iter()
                .filter(|(_, kind, revealed)| *revealed && *kind == PoiKind::Victim)
                .count() as u32,
            lost: 0,
            damage: fires.len() as u32,
        },
    }
}

/// Perimeter walls, one entry point and a handful of interior walls,
/// serialised through the board codec.
fn building_walls(config: &BoardConfig, rng: &mut ChaCha8Rng) -> Vec<String> {
    let mut grid = EdgeGrid::new(config.rows(), config.columns());

    for row in 1..=config.rows() {
        for col in 1..=config.columns() {
            let coord = GridCoord::new(row, col);
            if row == 1 {
                let _ = grid.set_edge(coord, EdgeSide::Up, EdgeCode::Wall);
            }
            if row == config.rows() {
                let _ = grid.set_edge(coord, EdgeSide::Down, EdgeCode::Wall);
            }
            if col == 1 {
                let _ = grid.set_edge(coord, EdgeSide::Left, EdgeCode::Wall);
            }
            if col == config.columns() {
                let _ = grid.set_edge(coord, EdgeSide::Right, EdgeCode::Wall);
            }
        }
    }

    let entry_row = rng.gen_range(1..=config.rows());
    let _ = grid.set_edge(GridCoord::new(entry_row, 1), EdgeSide::Left, EdgeCode::Entry);

    for _ in 0..INTERIOR_WALLS {
        let row = rng.gen_range(1..config.rows());
        let col = rng.gen_range(1..=config.columns());
        let _ = grid.set_edge(GridCoord::new(row, col), EdgeSide::Down, EdgeCode::Wall);
        let _ = grid.set_edge(GridCoord::new(row + 1, col), EdgeSide::Up, EdgeCode::Wall);
    }

    codec::encode(&grid)
}

fn random_cell(config: &BoardConfig, rng: &mut ChaCha8Rng) -> GridCoord {
    GridCoord::new(
        rng.gen_range(1..=config.rows()),
        rng.gen_range(1..=config.columns()),
    )
}

fn wander(cell: GridCoord, config: &BoardConfig, rng: &mut ChaCha8Rng) -> GridCoord {
    let (row, col) = (cell.row(), cell.col());
    let candidate = match rng.gen_range(0..4u8) {
        0 if row > 1 => GridCoord::new(row - 1, col),
        1 if col < config.columns() => GridCoord::new(row, col + 1),
        2 if row < config.rows() => GridCoord::new(row + 1, col),
        3 if col > 1 => GridCoord::new(row, col - 1),
        _ => cell,
    };
    candidate
}

fn spread_fire(
    fires: &mut BTreeMap<GridCoord, FirePhase>,
    config: &BoardConfig,
    rng: &mut ChaCha8Rng,
) {
    for intensity in fires.values_mut() {
        if *intensity == FirePhase::Smoke && rng.gen_bool(0.5) {
            *intensity = FirePhase::Fire;
        }
    }

    let sources: Vec<GridCoord> = fires
        .iter()
        .filter(|(_, intensity)| **intensity == FirePhase::Fire)
        .map(|(cell, _)| *cell)
        .collect();
    for source in sources {
        if rng.gen_bool(0.4) {
            let neighbor = wander(source, config, rng);
            if neighbor != source {
                let _ = fires.entry(neighbor).or_insert(FirePhase::Smoke);
            }
        }
    }
}
