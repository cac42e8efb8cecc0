//! TOML level files describing the collision grids and the starting population.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use outpost_core::WorldPoint;
use outpost_system_bootstrap::{BuildingPlacement, Scenario};
use outpost_world::{CollisionMap, MapLayout, DEFAULT_COLUMNS, DEFAULT_OFFSET};
use serde::Deserialize;

/// Level description as written on disk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct MapFile {
    /// Number of cells per grid row.
    #[serde(default = "default_columns")]
    pub(crate) columns: usize,
    /// Horizontal world position of the grid's left edge.
    #[serde(default = "default_offset_x")]
    pub(crate) offset_x: f32,
    /// Vertical world position of the grid's top edge.
    #[serde(default = "default_offset_y")]
    pub(crate) offset_y: f32,
    /// Row-major grid marking obstacles.
    pub(crate) blocking: Vec<u32>,
    /// Row-major grid marking walkable tiles.
    #[serde(default)]
    pub(crate) walkable: Vec<u32>,
    /// Pawn spawn points.
    pub(crate) pawns: Option<Vec<WorldPoint>>,
    /// Goblin spawn points.
    pub(crate) goblins: Option<Vec<WorldPoint>>,
    /// Buildings placed at launch.
    pub(crate) buildings: Option<Vec<BuildingPlacement>>,
}

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

fn default_offset_x() -> f32 {
    DEFAULT_OFFSET.x()
}

fn default_offset_y() -> f32 {
    DEFAULT_OFFSET.y()
}

/// Level ready to seed a world.
#[derive(Debug)]
pub(crate) struct Level {
    /// Compiled static obstacles.
    pub(crate) collision: CollisionMap,
    /// Entities spawned at launch.
    pub(crate) scenario: Scenario,
}

impl MapFile {
    /// Parses a level from TOML text.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("map file is not valid TOML for an outpost level")
    }

    /// Compiles the grids and resolves the spawn tables.
    ///
    /// A file without any spawn table keeps the built-in population.
    pub(crate) fn into_level(self) -> Result<Level> {
        let walkable = if self.walkable.is_empty() {
            vec![0; self.blocking.len()]
        } else {
            self.walkable
        };
        let layout = MapLayout {
            columns: self.columns,
            offset: WorldPoint::new(self.offset_x, self.offset_y),
            blocking: self.blocking,
            walkable,
        };
        let collision = CollisionMap::compile(&layout).context("map grids do not compile")?;

        let scenario = if self.pawns.is_none() && self.goblins.is_none() && self.buildings.is_none()
        {
            Scenario::outpost()
        } else {
            Scenario {
                pawns: self.pawns.unwrap_or_default(),
                goblins: self.goblins.unwrap_or_default(),
                buildings: self.buildings.unwrap_or_default(),
            }
        };

        Ok(Level {
            collision,
            scenario,
        })
    }
}

/// Reads and compiles the level stored at `path`.
pub(crate) fn load(path: &Path) -> Result<Level> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file {}", path.display()))?;
    MapFile::parse(&text)
        .and_then(MapFile::into_level)
        .with_context(|| format!("failed to load map file {}", path.display()))
}
