//! Path discovery and the distance-to-position replay used by monsters.

use tower_defence_core::{BlockKind, Direction, GridPoint, PixelPoint};

use crate::grid::{BlockGrid, MapError};

/// Outcome of replaying a travel distance along the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathProgress {
    /// The monster is still on the path at the given pixel position.
    Walking(PixelPoint),
    /// The distance walked past the terminal marker.
    Breached,
}

/// Immutable walkway derived once from the block grid.
///
/// A monster's position is never stored directly; it is a pure function of
/// the cumulative distance travelled, replayed over the recorded direction
/// sequence one whole block at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLattice {
    spawn: PixelPoint,
    directions: Vec<Direction>,
    block_size: f32,
}

impl PathLattice {
    /// Walks the grid's path cells from their entry edge and records the
    /// resulting direction sequence.
    pub fn resolve(grid: &BlockGrid) -> Result<Self, MapError> {
        let block_size = grid.block_size();
        let half = block_size / 2.0;
        let (mut cell, spawn) = Self::find_spawn(grid, half).ok_or(MapError::NoSpawn)?;

        let mut directions = Vec::new();
        let mut last: Option<Direction> = None;
        let step_limit = grid.dimension() as usize * grid.dimension() as usize;
        while directions.len() < step_limit {
            let Some((next_cell, step)) = Self::next_path_cell(grid, cell, last) else {
                break;
            };
            directions.push(step);
            last = Some(step);
            cell = next_cell;
        }
        directions.push(Direction::End);

        Ok(Self {
            spawn,
            directions,
            block_size,
        })
    }

    fn find_spawn(grid: &BlockGrid, half: f32) -> Option<(GridPoint, PixelPoint)> {
        for column in 0..grid.dimension() {
            let at = GridPoint::new(column, 0);
            if grid.kind_at(at) == Some(BlockKind::Path) {
                let spawn = PixelPoint::new(column as f32 * grid.block_size() + half, 0.0);
                return Some((at, spawn));
            }
        }
        for row in 0..grid.dimension() {
            let at = GridPoint::new(0, row);
            if grid.kind_at(at) == Some(BlockKind::Path) {
                let spawn = PixelPoint::new(0.0, row as f32 * grid.block_size() + half);
                return Some((at, spawn));
            }
        }
        None
    }

    fn next_path_cell(
        grid: &BlockGrid,
        from: GridPoint,
        last: Option<Direction>,
    ) -> Option<(GridPoint, Direction)> {
        const CANDIDATES: [Direction; 4] = [
            Direction::Right,
            Direction::Left,
            Direction::Down,
            Direction::Up,
        ];
        for candidate in CANDIDATES {
            if last.map(Direction::opposite) == Some(candidate) {
                continue;
            }
            let (dc, dr) = candidate.offset();
            let column = from.column() as i64 + i64::from(dc);
            let row = from.row() as i64 + i64::from(dr);
            if column < 0 || row < 0 {
                continue;
            }
            let neighbour = GridPoint::new(column as u32, row as u32);
            if grid.kind_at(neighbour) == Some(BlockKind::Path) {
                return Some((neighbour, candidate));
            }
        }
        None
    }

    /// Pixel position where monsters enter the maze.
    #[must_use]
    pub const fn spawn(&self) -> PixelPoint {
        self.spawn
    }

    /// Recorded direction sequence, terminated by [`Direction::End`].
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Replays a cumulative travel distance into a pixel position.
    ///
    /// Whole blocks of distance consume recorded directions; the remainder
    /// displaces fractionally along the next direction. Landing on the
    /// terminal marker reports a breach with no fractional displacement.
    #[must_use]
    pub fn position_at(&self, distance: f32) -> PathProgress {
        let mut x = self.spawn.x();
        let mut y = self.spawn.y() + self.block_size / 2.0;
        let whole = (distance / self.block_size).floor() as usize;
        let steps = whole.min(self.directions.len());
        for direction in &self.directions[..steps] {
            let (dc, dr) = direction.offset();
            x += dc as f32 * self.block_size;
            y += dr as f32 * self.block_size;
        }
        let next = self
            .directions
            .get(whole)
            .copied()
            .unwrap_or(Direction::End);
        if next == Direction::End {
            return PathProgress::Breached;
        }
        let remainder = distance - whole as f32 * self.block_size;
        let (dc, dr) = next.offset();
        PathProgress::Walking(PixelPoint::new(
            x + dc as f32 * remainder,
            y + dr as f32 * remainder,
        ))
    }
}
