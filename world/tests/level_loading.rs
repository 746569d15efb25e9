use std::collections::HashMap;

use fear_the_water_core::{CellCoord, GameConfig, LevelDocument};
use fear_the_water_world::{query, Level, TileKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn build(map: Vec<Vec<u32>>) -> Level {
    let config = GameConfig {
        grid_size: 8.0,
        ..GameConfig::default()
    };
    Level::new(
        config,
        &LevelDocument {
            background: None,
            map,
        },
    )
    .expect("level builds")
}

fn random_map(rng: &mut ChaCha8Rng) -> Vec<Vec<u32>> {
    let columns = rng.gen_range(1..=12);
    let rows = rng.gen_range(1..=12);
    (0..rows)
        .map(|_| (0..columns).map(|_| rng.gen_range(0..16)).collect())
        .collect()
}

#[test]
fn every_cell_is_covered_exactly_once() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x00f1_00d5);

    for _ in 0..200 {
        let map = random_map(&mut rng);
        let columns = map[0].len() as u32;
        let rows = map.len() as u32;
        let level = build(map.clone());

        let mut walls: HashMap<CellCoord, usize> = HashMap::new();
        for tile in query::tiles(&level) {
            assert!(tile.kind().is_structural());
            for cell in tile.covered_cells() {
                assert!(
                    cell.column() < columns && cell.row() < rows,
                    "tile at {:?} leaves the grid",
                    tile.cell()
                );
                *walls.entry(cell).or_default() += 1;
            }
        }

        let mut floor: HashMap<CellCoord, usize> = HashMap::new();
        for tile in query::floor(&level) {
            assert_eq!(tile.kind(), TileKind::Floor);
            assert!(!tile.kind().is_structural());
            *floor.entry(tile.cell()).or_default() += 1;
        }

        for (row, values) in map.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                let cell = CellCoord::new(column as u32, row as u32);
                let solid = value & 1 == 1;
                let (expected_walls, expected_floor) = if solid { (1, 0) } else { (0, 1) };
                assert_eq!(
                    walls.get(&cell).copied().unwrap_or_default(),
                    expected_walls,
                    "wall coverage at {cell:?} in {map:?}"
                );
                assert_eq!(
                    floor.get(&cell).copied().unwrap_or_default(),
                    expected_floor,
                    "floor coverage at {cell:?} in {map:?}"
                );
            }
        }
    }
}

#[test]
fn retained_hole_is_the_last_in_scan_order() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..100 {
        let map = random_map(&mut rng);
        let level = build(map.clone());

        let last = map
            .iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .map(move |(column, value)| (row, column, *value))
            })
            .filter(|(_, _, value)| value & 2 == 2)
            .last()
            .map(|(row, column, _)| CellCoord::new(column as u32, row as u32));

        assert_eq!(query::hole(&level).map(|hole| hole.cell()), last);
        let holes = query::components(&level)
            .iter()
            .filter(|component| component.as_hole().is_some())
            .count();
        assert_eq!(holes, usize::from(last.is_some()));
    }
}

#[test]
fn three_by_three_solid_map_merges_top_left_block() {
    let level = build(vec![vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1]]);
    let tiles: Vec<_> = query::tiles(&level)
        .map(|tile| (tile.cell(), tile.kind()))
        .collect();

    assert_eq!(tiles[0], (CellCoord::new(0, 0), TileKind::Double));
    assert_eq!(tiles.len(), 6);
    assert_eq!(
        tiles
            .iter()
            .filter(|(_, kind)| *kind == TileKind::Single)
            .count(),
        5
    );
}

#[test]
fn two_holes_keep_the_second() {
    let level = build(vec![vec![2, 0], vec![0, 2]]);
    let hole = query::hole(&level).expect("hole retained");
    assert_eq!(hole.cell(), CellCoord::new(1, 1));
    assert_eq!(hole.center(), glam::Vec2::new(12.0, 12.0));
}

#[test]
fn spawn_defaults_to_origin_without_start_bit() {
    let level = build(vec![vec![0, 1], vec![1, 0]]);
    assert_eq!(query::player_initial_position(&level), glam::Vec2::ZERO);
}

#[test]
fn tree_bit_does_not_change_tiling() {
    let plain = build(vec![vec![1, 1], vec![1, 0]]);
    let trees = build(vec![vec![5, 5], vec![5, 4]]);

    let kinds = |level: &Level| -> Vec<_> {
        query::tiles(level)
            .map(|tile| (tile.cell(), tile.kind()))
            .collect()
    };
    assert_eq!(kinds(&plain), kinds(&trees));
    assert_eq!(query::floor(&plain).len(), query::floor(&trees).len());
}
