//! Converts a validated level map into level entities.

use fear_the_water_core::{CellCoord, EntityId, LevelMap};
use glam::Vec2;

use crate::{
    entities::{Component, Hole, Tile, TileKind},
    EntityAllocator,
};

/// Entities produced by a single pass over a level map.
#[derive(Debug, Default)]
pub(crate) struct LoadedLevel {
    pub(crate) floor: Vec<Tile>,
    pub(crate) components: Vec<Component>,
    pub(crate) hole: Option<EntityId>,
    pub(crate) player_start: Vec2,
    pub(crate) merged: usize,
}

/// Claim state of every cell while the map is being scanned.
struct ClaimGrid {
    columns: u32,
    rows: u32,
    claimed: Vec<bool>,
}

impl ClaimGrid {
    fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            claimed: vec![false; columns as usize * rows as usize],
        }
    }

    fn index(&self, cell: CellCoord) -> usize {
        cell.row() as usize * self.columns as usize + cell.column() as usize
    }

    fn is_claimed(&self, cell: CellCoord) -> bool {
        self.claimed[self.index(cell)]
    }

    fn claim(&mut self, cell: CellCoord) {
        let index = self.index(cell);
        self.claimed[index] = true;
    }

    /// Cells of the 2×2 block anchored at `cell`, or `None` when it would leave the grid.
    fn block(&self, cell: CellCoord) -> Option<[CellCoord; 4]> {
        if cell.column() + 1 >= self.columns || cell.row() + 1 >= self.rows {
            return None;
        }
        let (column, row) = (cell.column(), cell.row());
        Some([
            cell,
            CellCoord::new(column + 1, row),
            CellCoord::new(column, row + 1),
            CellCoord::new(column + 1, row + 1),
        ])
    }
}

/// Scans `map` row-major and emits tiles, floor, the hole and the spawn point.
///
/// Solid cells are greedily merged into 2×2 walls when the block fits inside
/// the grid and all four cells are solid and unclaimed. Testing the solid bit
/// alone could let two walls overlap on a claimed cell, so the claim check is
/// stricter than a solid-only merge. Floor is emitted for every non-solid
/// cell. Later holes and player starts replace earlier ones.
pub(crate) fn load(map: &LevelMap, grid_size: f32, ids: &mut EntityAllocator) -> LoadedLevel {
    let mut claims = ClaimGrid::new(map.columns(), map.rows());
    let mut level = LoadedLevel::default();

    for (cell, flags) in map.iter() {
        if flags.is_solid() && !claims.is_claimed(cell) {
            let block = claims.block(cell).filter(|block| {
                block
                    .iter()
                    .all(|&part| map.is_solid(part) && !claims.is_claimed(part))
            });

            let kind = match block {
                Some(block) => {
                    for part in block {
                        claims.claim(part);
                    }
                    level.merged += 1;
                    TileKind::Double
                }
                None => {
                    claims.claim(cell);
                    TileKind::Single
                }
            };

            level
                .components
                .push(Component::Tile(Tile::new(ids.allocate(), cell, kind, grid_size)));
        } else if !flags.is_solid() {
            level
                .floor
                .push(Tile::new(ids.allocate(), cell, TileKind::Floor, grid_size));
        }

        if flags.is_hole() {
            if let Some(previous) = level.hole.take() {
                level.components.retain(|component| component.id() != previous);
            }
            let hole = Hole::new(ids.allocate(), cell, grid_size);
            level.hole = Some(hole.id());
            level.components.push(Component::Hole(hole));
        }

        if flags.is_player_start() {
            level.player_start = cell.center(grid_size);
        }
    }

    level
}
