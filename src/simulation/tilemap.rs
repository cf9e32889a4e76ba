//! Tile grid backing tilemap colliders.

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::vector::Vector;

/// Tile value marking an empty cell.
pub const EMPTY_TILE: i32 = -1;

/// A rectangular grid of tiles, laid out row-major from the top-left corner.
///
/// Cells holding a non-negative tile index are solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: usize,
    rows: usize,
    tile_size: f64,
    tiles: Vec<i32>,
}

impl TileGrid {
    /// Creates a grid; `tiles.len()` must equal `columns * rows`.
    pub fn new(columns: usize, rows: usize, tile_size: f64, tiles: Vec<i32>) -> Result<Self> {
        if tiles.len() != columns * rows {
            return Err(Error::invalid(format!(
                "tile grid {}x{} needs {} cells, got {}",
                columns,
                rows,
                columns * rows,
                tiles.len()
            )));
        }
        if tile_size <= 0.0 {
            return Err(Error::invalid("tile size must be positive"));
        }
        Ok(Self {
            columns,
            rows,
            tile_size,
            tiles,
        })
    }

    /// Edge length of one tile in world units.
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// World-space extent of the whole grid.
    pub fn world_size(&self) -> Vector {
        Vector::new(
            self.columns as f64 * self.tile_size,
            self.rows as f64 * self.tile_size,
        )
    }

    /// Tile at grid cell `(column, row)`; cells outside the grid are empty.
    pub fn tile(&self, column: i64, row: i64) -> i32 {
        if column < 0 || row < 0 || column >= self.columns as i64 || row >= self.rows as i64 {
            return EMPTY_TILE;
        }
        self.tiles[row as usize * self.columns + column as usize]
    }

    /// Tile under a world position for a grid centred at `center`.
    pub fn tile_at_world_pos(&self, center: Vector, pos: Vector) -> i32 {
        let size = self.world_size();
        let left = center.x - size.x / 2.0;
        let top = center.y - size.y / 2.0;
        let column = ((pos.x - left) / self.tile_size).floor() as i64;
        let row = ((pos.y - top) / self.tile_size).floor() as i64;
        self.tile(column, row)
    }

    /// Whether any solid tile lies under the rectangle `[min, max)`.
    ///
    /// The grid is centred at `center`. The right and bottom edges are pulled
    /// in by a small epsilon so a rectangle ending exactly on a tile boundary
    /// does not reach into the next tile.
    pub fn overlaps_rect(&self, center: Vector, min: Vector, max: Vector) -> bool {
        const EDGE_EPSILON: f64 = 0.0001;

        let size = self.world_size();
        let left = center.x - size.x / 2.0;
        let top = center.y - size.y / 2.0;

        let start_x = ((min.x - left) / self.tile_size).floor() as i64;
        let end_x = ((max.x - left - EDGE_EPSILON) / self.tile_size).floor() as i64;
        let start_y = ((min.y - top) / self.tile_size).floor() as i64;
        let end_y = ((max.y - top - EDGE_EPSILON) / self.tile_size).floor() as i64;

        for row in start_y..=end_y {
            for column in start_x..=end_x {
                if self.tile(column, row) >= 0 {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> TileGrid {
        // 2x2 grid of 10-unit tiles, only the bottom-right solid
        TileGrid::new(2, 2, 10.0, vec![-1, -1, -1, 3]).unwrap()
    }

    #[test]
    fn lookup_by_world_position() {
        let grid = checker();
        let center = Vector::new(0.0, 0.0);
        assert_eq!(grid.tile_at_world_pos(center, Vector::new(5.0, 5.0)), 3);
        assert_eq!(grid.tile_at_world_pos(center, Vector::new(-5.0, 5.0)), EMPTY_TILE);
        assert_eq!(grid.tile_at_world_pos(center, Vector::new(50.0, 5.0)), EMPTY_TILE);
    }

    #[test]
    fn rect_ending_on_boundary_stays_out() {
        let grid = checker();
        let center = Vector::new(0.0, 0.0);
        // spans the top-left tile exactly
        assert!(!grid.overlaps_rect(center, Vector::new(-10.0, -10.0), Vector::new(0.0, 0.0)));
        assert!(grid.overlaps_rect(center, Vector::new(-10.0, -10.0), Vector::new(0.5, 0.5)));
    }
}
