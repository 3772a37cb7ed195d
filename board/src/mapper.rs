//! Stateless bijection between board cells and world positions.
//!
//! Column 1 sits at the world origin and columns grow along +x; row 1 is the
//! far edge of the board, so rows grow toward -z. Both directions are pure
//! functions of the configured cell size and row count.

use rescue_replay_core::{BoardConfig, EdgeKey, EdgeSide, Facing, GridCoord, WorldPosition};

/// Maps a board cell to the world position of its center.
#[must_use]
pub fn grid_to_world(coord: GridCoord, config: &BoardConfig) -> WorldPosition {
    let x = (coord.col() as f32 - 1.0) * config.cell_size();
    let z = (config.max_row() as f32 - coord.row() as f32) * config.cell_size();
    WorldPosition::new(x, z)
}

/// Maps a world position back to the nearest board cell.
///
/// Inverse of [`grid_to_world`] for every in-bounds cell; positions outside
/// the board clamp to the nearest boundary cell.
#[must_use]
pub fn world_to_grid(position: WorldPosition, config: &BoardConfig) -> GridCoord {
    let col = (position.x / config.cell_size()).round() as i64 + 1;
    let row = config.max_row() as i64 - (position.z / config.cell_size()).round() as i64;
    GridCoord::new(
        row.clamp(1, config.rows() as i64) as u32,
        col.clamp(1, config.columns() as i64) as u32,
    )
}

/// World position of the midpoint of one cell edge, half a cell away from
/// the owning cell's center.
#[must_use]
pub fn edge_position(key: EdgeKey, config: &BoardConfig) -> WorldPosition {
    let center = grid_to_world(key.cell(), config);
    let half = config.cell_size() / 2.0;
    match key.side() {
        EdgeSide::Up => WorldPosition::new(center.x, center.z + half),
        EdgeSide::Down => WorldPosition::new(center.x, center.z - half),
        EdgeSide::Left => WorldPosition::new(center.x - half, center.z),
        EdgeSide::Right => WorldPosition::new(center.x + half, center.z),
    }
}

/// Orientation of a visual mounted on the provided side.
#[must_use]
pub const fn side_facing(side: EdgeSide) -> Facing {
    match side {
        EdgeSide::Up | EdgeSide::Down => Facing::Frontal,
        EdgeSide::Left | EdgeSide::Right => Facing::Lateral,
    }
}

#[cfg(test)]
mod tests {
    use super::{edge_position, grid_to_world, side_facing, world_to_grid};
    use rescue_replay_core::{BoardConfig, EdgeKey, EdgeSide, Facing, GridCoord};

    #[test]
    fn every_cell_round_trips_through_world_space() {
        let config = BoardConfig::default();
        for row in 1..=config.rows() {
            for col in 1..=config.columns() {
                let coord = GridCoord::new(row, col);
                let mapped = world_to_grid(grid_to_world(coord, &config), &config);
                assert_eq!(mapped, coord, "round trip failed for {coord}");
            }
        }
    }

    #[test]
    fn origin_is_the_near_left_corner() {
        let config = BoardConfig::default();
        let position = grid_to_world(GridCoord::new(config.rows(), 1), &config);
        assert!(position.x.abs() < f32::EPSILON);
        assert!(position.z.abs() < f32::EPSILON);
    }

    #[test]
    fn shared_edge_midpoint_matches_from_both_cells() {
        let config = BoardConfig::default();
        let right = edge_position(EdgeKey::new(GridCoord::new(2, 3), EdgeSide::Right), &config);
        let left = edge_position(EdgeKey::new(GridCoord::new(2, 4), EdgeSide::Left), &config);
        assert!((right.x - left.x).abs() < f32::EPSILON);
        assert!((right.z - left.z).abs() < f32::EPSILON);

        let centers = grid_to_world(GridCoord::new(2, 3), &config)
            .midpoint(grid_to_world(GridCoord::new(2, 4), &config));
        assert!((right.x - centers.x).abs() < 1e-4);
        assert!((right.z - centers.z).abs() < 1e-4);
    }

    #[test]
    fn horizontal_edges_face_frontal_and_vertical_edges_lateral() {
        assert_eq!(side_facing(EdgeSide::Up), Facing::Frontal);
        assert_eq!(side_facing(EdgeSide::Down), Facing::Frontal);
        assert_eq!(side_facing(EdgeSide::Left), Facing::Lateral);
        assert_eq!(side_facing(EdgeSide::Right), Facing::Lateral);
    }
}
