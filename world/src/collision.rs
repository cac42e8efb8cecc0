//! Static obstacle map compiled from the symbol grids describing the level.

use outpost_core::{WorldPoint, WorldRect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of one map cell in world units.
pub const CELL_SIZE: f32 = 64.0;

/// Symbol marking a cell that blocks movement.
pub const BLOCKING_SYMBOL: u32 = 95;

/// Symbol marking a cell reserved as walkable.
pub const WALKABLE_SYMBOL: u32 = 99;

/// Row width of the shipped level.
pub const DEFAULT_COLUMNS: usize = 70;

/// World position of the top-left corner of the shipped level.
pub const DEFAULT_OFFSET: WorldPoint = WorldPoint::new(-300.0, -1200.0);

/// Row-major symbol grids describing a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    /// Number of cells per row.
    pub columns: usize,
    /// World position of the top-left corner of the grid.
    pub offset: WorldPoint,
    /// Grid where [`BLOCKING_SYMBOL`] marks obstacles.
    pub blocking: Vec<u32>,
    /// Grid where [`WALKABLE_SYMBOL`] marks walkable tiles.
    pub walkable: Vec<u32>,
}

/// Failures reported while compiling a [`MapLayout`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The layout declares rows of zero cells.
    #[error("map layout declares zero columns")]
    ZeroColumns,
    /// The blocking and walkable grids describe different areas.
    #[error("blocking grid holds {blocking} cells but walkable grid holds {walkable}")]
    GridLengthMismatch {
        /// Number of cells in the blocking grid.
        blocking: usize,
        /// Number of cells in the walkable grid.
        walkable: usize,
    },
    /// The grid does not split into whole rows.
    #[error("grid of {cells} cells is not a whole number of {columns}-cell rows")]
    RaggedGrid {
        /// Number of cells in the grid.
        cells: usize,
        /// Declared row width.
        columns: usize,
    },
}

/// Immutable set of obstacle rectangles checked by every movement step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionMap {
    obstacles: Vec<WorldRect>,
    walkable: Vec<WorldRect>,
}

impl CollisionMap {
    /// Compiles the symbol grids into world-space rectangles.
    pub fn compile(layout: &MapLayout) -> Result<Self, MapError> {
        if layout.columns == 0 {
            return Err(MapError::ZeroColumns);
        }

        if layout.blocking.len() != layout.walkable.len() {
            return Err(MapError::GridLengthMismatch {
                blocking: layout.blocking.len(),
                walkable: layout.walkable.len(),
            });
        }

        if layout.blocking.len() % layout.columns != 0 {
            return Err(MapError::RaggedGrid {
                cells: layout.blocking.len(),
                columns: layout.columns,
            });
        }

        Ok(Self {
            obstacles: cells_with_symbol(layout, &layout.blocking, BLOCKING_SYMBOL),
            walkable: cells_with_symbol(layout, &layout.walkable, WALKABLE_SYMBOL),
        })
    }

    /// Map without any obstacle.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map made of the provided obstacle rectangles.
    #[must_use]
    pub fn from_obstacles(obstacles: Vec<WorldRect>) -> Self {
        Self {
            obstacles,
            walkable: Vec::new(),
        }
    }

    /// Obstacle rectangles in grid order.
    #[must_use]
    pub fn obstacles(&self) -> &[WorldRect] {
        &self.obstacles
    }

    /// Walkable rectangles, kept for debug overlays only.
    #[must_use]
    pub fn walkable(&self) -> &[WorldRect] {
        &self.walkable
    }

    /// Reports whether `rect` touches any obstacle.
    #[must_use]
    pub fn is_blocked(&self, rect: &WorldRect) -> bool {
        self.obstacles.iter().any(|obstacle| rect.touches(obstacle))
    }
}

fn cells_with_symbol(layout: &MapLayout, grid: &[u32], symbol: u32) -> Vec<WorldRect> {
    grid.iter()
        .enumerate()
        .filter(|(_, cell)| **cell == symbol)
        .map(|(index, _)| {
            let column = (index % layout.columns) as f32;
            let row = (index / layout.columns) as f32;
            WorldRect::new(
                column * CELL_SIZE + layout.offset.x(),
                row * CELL_SIZE + layout.offset.y(),
                CELL_SIZE,
                CELL_SIZE,
            )
        })
        .collect()
}
