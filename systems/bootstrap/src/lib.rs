#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Outpost experience.

use outpost_core::{BuildingKind, Command, WorldPoint};
use outpost_world::{
    query, MapLayout, World, BLOCKING_SYMBOL, DEFAULT_COLUMNS, DEFAULT_OFFSET, WALKABLE_SYMBOL,
};
use serde::{Deserialize, Serialize};

/// Number of rows in the built-in map.
pub const DEFAULT_ROWS: usize = 50;

/// Building placed by a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// Kind of the building.
    pub kind: BuildingKind,
    /// Top-left sprite anchor.
    pub position: WorldPoint,
}

/// Initial population of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Pawn sprite anchors.
    #[serde(default)]
    pub pawns: Vec<WorldPoint>,
    /// Goblin sprite anchors.
    #[serde(default)]
    pub goblins: Vec<WorldPoint>,
    /// Buildings starting construction at launch.
    #[serde(default)]
    pub buildings: Vec<BuildingPlacement>,
}

impl Scenario {
    /// The shipped outpost: one pawn guarding a castle and five houses
    /// against eleven goblin camps.
    #[must_use]
    pub fn outpost() -> Self {
        let point = |(x, y): (f32, f32)| WorldPoint::new(x, y);
        let house = |(x, y): (f32, f32)| BuildingPlacement {
            kind: BuildingKind::House,
            position: WorldPoint::new(x, y),
        };

        let mut buildings: Vec<BuildingPlacement> = [
            (750.0, 700.0),
            (900.0, 100.0),
            (950.0, -100.0),
            (1_100.0, 0.0),
            (1_300.0, 300.0),
        ]
        .into_iter()
        .map(house)
        .collect();
        buildings.push(BuildingPlacement {
            kind: BuildingKind::Castle,
            position: WorldPoint::new(800.0, 400.0),
        });

        Self {
            pawns: vec![point((1_000.0, 300.0))],
            goblins: [
                (2_100.0, 200.0),
                (2_650.0, -850.0),
                (2_500.0, -300.0),
                (2_850.0, 150.0),
                (3_000.0, -400.0),
                (3_000.0, -700.0),
                (3_300.0, -1_000.0),
                (3_700.0, -150.0),
                (1_000.0, -500.0),
                (0.0, -800.0),
                (400.0, -600.0),
            ]
            .into_iter()
            .map(point)
            .collect(),
            buildings,
        }
    }

    /// Total number of entities the scenario spawns.
    #[must_use]
    pub fn population(&self) -> usize {
        self.pawns.len() + self.goblins.len() + self.buildings.len()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::outpost()
    }
}

/// Built-in map: open ground enclosed by a one-cell wall.
#[must_use]
pub fn default_layout() -> MapLayout {
    let mut blocking = Vec::with_capacity(DEFAULT_COLUMNS * DEFAULT_ROWS);
    let mut walkable = Vec::with_capacity(DEFAULT_COLUMNS * DEFAULT_ROWS);

    for row in 0..DEFAULT_ROWS {
        for column in 0..DEFAULT_COLUMNS {
            let border =
                row == 0 || column == 0 || row + 1 == DEFAULT_ROWS || column + 1 == DEFAULT_COLUMNS;
            if border {
                blocking.push(BLOCKING_SYMBOL);
                walkable.push(0);
            } else {
                blocking.push(0);
                walkable.push(WALKABLE_SYMBOL);
            }
        }
    }

    MapLayout {
        columns: DEFAULT_COLUMNS,
        offset: DEFAULT_OFFSET,
        blocking,
        walkable,
    }
}

/// Produces data required to start a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Emits the spawn commands populating the world: pawns, then goblins, then buildings.
    pub fn handle(&self, scenario: &Scenario, out: &mut Vec<Command>) {
        out.extend(
            scenario
                .pawns
                .iter()
                .map(|&position| Command::SpawnPawn { position }),
        );
        out.extend(
            scenario
                .goblins
                .iter()
                .map(|&position| Command::SpawnGoblin { position }),
        );
        out.extend(
            scenario
                .buildings
                .iter()
                .map(|placement| Command::PlaceBuilding {
                    kind: placement.kind,
                    position: placement.position,
                }),
        );
    }
}
