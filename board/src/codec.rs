//! Codec between per-row wall strings and the structured edge grid.
//!
//! Each cell is a four-character slice encoding `{up, right, down, left}` as
//! the digits 0 (clear), 1 (wall), 2 (door) and 3 (entry point). The codec
//! decodes every cell's four sides independently; it never deduplicates the
//! two spellings of a shared edge. Physical placement dedup is the scene's
//! concern.

use rescue_replay_core::{BoardConfig, BoardDefect, CellEdges, EdgeCode, EdgeGrid, EdgeSide, GridCoord};

/// Characters encoding one cell on the wire.
const CODES_PER_CELL: usize = 4;

/// Decodes a frame's wall payload into an edge grid.
///
/// Fails without partial output when the row count disagrees with the
/// configuration, any row has the wrong length, or any character is not a
/// recognised digit.
pub fn decode(rows: &[String], config: &BoardConfig) -> Result<EdgeGrid, BoardDefect> {
    let expected_rows = config.rows() as usize;
    if rows.len() != expected_rows {
        return Err(BoardDefect::RowCount {
            expected: expected_rows,
            found: rows.len(),
        });
    }

    let expected_len = config.columns() as usize * CODES_PER_CELL;
    let mut grid = EdgeGrid::new(config.rows(), config.columns());

    for (row_index, row) in rows.iter().enumerate() {
        let codes: Vec<char> = row.chars().collect();
        if codes.len() != expected_len {
            return Err(BoardDefect::RowLength {
                row: row_index,
                expected: expected_len,
                found: codes.len(),
            });
        }

        for col_index in 0..config.columns() as usize {
            let slice = &codes[col_index * CODES_PER_CELL..(col_index + 1) * CODES_PER_CELL];
            let mut edges = CellEdges::CLEAR;
            for (side, &code) in EdgeSide::ALL.iter().zip(slice) {
                let decoded = EdgeCode::from_code(code).ok_or(BoardDefect::UnknownCode {
                    row: row_index,
                    code,
                })?;
                edges.set(*side, decoded);
            }

            let coord = GridCoord::new(row_index as u32 + 1, col_index as u32 + 1);
            let _ = grid.set_cell(coord, edges);
        }
    }

    Ok(grid)
}

/// Encodes an edge grid back into per-row wall strings.
///
/// Exact inverse of [`decode`]: `decode(&encode(grid), config)` reproduces
/// `grid` for every grid matching the configured dimensions.
#[must_use]
pub fn encode(grid: &EdgeGrid) -> Vec<String> {
    (1..=grid.rows())
        .map(|row| {
            let mut line = String::with_capacity(grid.columns() as usize * CODES_PER_CELL);
            for col in 1..=grid.columns() {
                let edges = grid
                    .cell(GridCoord::new(row, col))
                    .unwrap_or(CellEdges::CLEAR);
                for side in EdgeSide::ALL {
                    line.push(edges.get(side).code());
                }
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use rescue_replay_core::{BoardConfig, BoardDefect, EdgeCode, EdgeSide, GridCoord};

    fn tiny_config() -> BoardConfig {
        BoardConfig::new(2, 2, 1.0)
    }

    #[test]
    fn decodes_each_side_in_wire_order() {
        let config = BoardConfig::new(1, 1, 1.0);
        let grid = decode(&["2103".to_owned()], &config).expect("row decodes");
        let cell = GridCoord::new(1, 1);
        assert_eq!(grid.edge(cell, EdgeSide::Up), Some(EdgeCode::Door));
        assert_eq!(grid.edge(cell, EdgeSide::Right), Some(EdgeCode::Wall));
        assert_eq!(grid.edge(cell, EdgeSide::Down), Some(EdgeCode::Clear));
        assert_eq!(grid.edge(cell, EdgeSide::Left), Some(EdgeCode::Entry));
    }

    #[test]
    fn round_trips_every_valid_batch() {
        let rows = vec!["11000010".to_owned(), "03102100".to_owned()];
        let grid = decode(&rows, &tiny_config()).expect("rows decode");
        assert_eq!(encode(&grid), rows);
    }

    #[test]
    fn rejects_wrong_row_count() {
        let result = decode(&["1100".to_owned()], &tiny_config());
        assert_eq!(
            result,
            Err(BoardDefect::RowCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_wrong_row_length() {
        let rows = vec!["11000010".to_owned(), "031021".to_owned()];
        let result = decode(&rows, &tiny_config());
        assert_eq!(
            result,
            Err(BoardDefect::RowLength {
                row: 1,
                expected: 8,
                found: 6
            })
        );
    }

    #[test]
    fn rejects_unrecognised_codes() {
        let rows = vec!["11000010".to_owned(), "0310x100".to_owned()];
        let result = decode(&rows, &tiny_config());
        assert_eq!(result, Err(BoardDefect::UnknownCode { row: 1, code: 'x' }));
    }
}
