//! Map template parsing and block grid geometry.

use thiserror::Error;
use tower_defence_core::{BlockKind, GridPoint, PixelPoint};

/// Failures raised while parsing a map template.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The template contained no block values at all.
    #[error("map template is empty")]
    Empty,
    /// The number of values is not a perfect square.
    #[error("map template holds {count} values, which is not a perfect square")]
    NotSquare {
        /// Number of values found in the template.
        count: usize,
    },
    /// A token could not be parsed as an unsigned integer.
    #[error("map template value {token:?} is not an unsigned integer")]
    BadValue {
        /// Offending token from the template.
        token: String,
    },
    /// A value did not map to a known block kind.
    #[error("map template value {value} does not name a block kind")]
    UnknownBlock {
        /// Offending numeric value.
        value: u32,
    },
    /// No path cell touches row zero or column zero, so no spawn exists.
    #[error("map template has no path cell on its top or left edge")]
    NoSpawn,
}

/// Square grid of terrain blocks with its pixel geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockGrid {
    dimension: u32,
    block_size: f32,
    blocks: Vec<BlockKind>,
}

impl BlockGrid {
    /// Parses a whitespace-separated row-major template into a grid.
    pub fn from_template(template: &str, block_size: f32) -> Result<Self, MapError> {
        let mut blocks = Vec::new();
        for token in template.split_whitespace() {
            let value: u32 = token
                .parse()
                .map_err(|_| MapError::BadValue {
                    token: token.to_owned(),
                })?;
            let kind = BlockKind::from_index(value)
                .ok_or(MapError::UnknownBlock { value })?;
            blocks.push(kind);
        }
        if blocks.is_empty() {
            return Err(MapError::Empty);
        }
        let dimension = (blocks.len() as f64).sqrt() as u32;
        if (dimension as usize) * (dimension as usize) != blocks.len() {
            return Err(MapError::NotSquare {
                count: blocks.len(),
            });
        }
        Ok(Self {
            dimension,
            block_size,
            blocks,
        })
    }

    /// Number of cells along each edge of the square grid.
    #[must_use]
    pub const fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Edge length of a single block in pixels.
    #[must_use]
    pub const fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, at: GridPoint) -> bool {
        at.column() < self.dimension && at.row() < self.dimension
    }

    /// Terrain of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind_at(&self, at: GridPoint) -> Option<BlockKind> {
        if !self.contains(at) {
            return None;
        }
        let index = at.row() as usize * self.dimension as usize + at.column() as usize;
        Some(self.blocks[index])
    }

    /// Pixel-space center of the cell.
    #[must_use]
    pub fn center_of(&self, at: GridPoint) -> PixelPoint {
        let half = self.block_size / 2.0;
        PixelPoint::new(
            at.column() as f32 * self.block_size + half,
            at.row() as f32 * self.block_size + half,
        )
    }
}
