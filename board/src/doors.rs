//! Geometric inference of door placement from adjacent endpoint pairs.
//!
//! Each door names the two cells it connects. The resolver classifies the
//! pair into one of the four shared-edge cases, writes the door code into
//! both adjacent cells' edge entries exactly once per rebuild, and computes
//! the world placement of the door visual. Doors whose partner cell lies
//! outside the board (entry-point doors) mark only the in-bounds side.

use rescue_replay_core::{
    BoardConfig, BoardDefect, DoorState, DoorStatus, EdgeCode, EdgeGrid, EdgeKey, EdgeSide,
    EntityKind, Facing, GridCoord, ReplayError, WorldPosition,
};

use crate::mapper::{grid_to_world, side_facing};

/// Everything needed to place one door visual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoorPlacement {
    /// Canonical edge the door occupies.
    pub key: EdgeKey,
    /// World position centered on the shared edge.
    pub position: WorldPosition,
    /// Frontal for up/down edges, lateral for left/right edges.
    pub facing: Facing,
    /// Open state carried over from the frame.
    pub status: DoorStatus,
}

/// Outcome of resolving one frame's door list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoorResolution {
    /// Placements for every accepted door, in input order.
    pub placements: Vec<DoorPlacement>,
    /// One fault per skipped door; never a silent drop.
    pub faults: Vec<ReplayError>,
}

/// Resolves a frame's door list against the current edge grid.
///
/// Processes doors in input order. Every accepted door writes the door code
/// into both in-bounds adjacent cells; doors beyond the configured capacity,
/// non-adjacent pairs and fully out-of-board pairs are skipped with a fault.
#[must_use]
pub fn resolve(doors: &[DoorState], grid: &mut EdgeGrid, config: &BoardConfig) -> DoorResolution {
    let mut resolution = DoorResolution::default();

    for door in doors {
        let Some(side) = side_between(door.p1, door.p2) else {
            resolution
                .faults
                .push(ReplayError::MalformedBoard(BoardDefect::DetachedDoor {
                    p1: door.p1,
                    p2: door.p2,
                }));
            continue;
        };

        if !grid.contains(door.p1) && !grid.contains(door.p2) {
            resolution
                .faults
                .push(ReplayError::MalformedBoard(BoardDefect::OutOfBounds {
                    cell: door.p1,
                }));
            continue;
        }

        if resolution.placements.len() >= config.door_capacity() {
            resolution.faults.push(ReplayError::CapacityExceeded {
                kind: EntityKind::Door,
                max: config.door_capacity(),
            });
            continue;
        }

        let _ = grid.set_edge(door.p1, side, EdgeCode::Door);
        let _ = grid.set_edge(door.p2, side.opposite(), EdgeCode::Door);

        resolution.placements.push(DoorPlacement {
            key: EdgeKey::new(door.p1, side).canonical(),
            position: grid_to_world(door.p1, config)
                .midpoint(grid_to_world(door.p2, config)),
            facing: side_facing(side),
            status: door.status,
        });
    }

    resolution
}

/// Side of `p1` shared with `p2`, or `None` when the cells are not adjacent.
fn side_between(p1: GridCoord, p2: GridCoord) -> Option<EdgeSide> {
    if p1.row() == p2.row() {
        if p2.col() == p1.col() + 1 {
            Some(EdgeSide::Right)
        } else if p2.col() + 1 == p1.col() {
            Some(EdgeSide::Left)
        } else {
            None
        }
    } else if p1.col() == p2.col() {
        if p2.row() + 1 == p1.row() {
            Some(EdgeSide::Up)
        } else if p2.row() == p1.row() + 1 {
            Some(EdgeSide::Down)
        } else {
            None
        }
    } else {
        None
    }
}
