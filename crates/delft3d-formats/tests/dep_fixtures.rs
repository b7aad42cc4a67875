#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for depth files
//!
//! Each depth fixture belongs to the grid fixture of the same name. The
//! river depth has one value per line row, the estuary depth wraps rows of
//! 14 values after the twelfth.

use delft3d_formats::grd::Grid;
use delft3d_formats::{Delft3dFormat, DepthGrid, DepthOptions, Matrix};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn fixture(kind: &str, name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(kind)
        .join(name)
}

fn load_pair(name: &str) -> (Grid, String) {
    let grid = Grid::load(fixture("grid", &format!("{name}.grd")))
        .unwrap_or_else(|e| panic!("Failed to load {name}.grd: {e}"));
    let path = fixture("depth", &format!("{name}.dep"));
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    (grid, text)
}

#[test]
fn depth_fixtures_round_trip() {
    for name in ["river", "estuary"] {
        let (grid, text) = load_pair(name);
        let depth = DepthGrid::parse(&text, &grid)
            .unwrap_or_else(|e| panic!("Failed to parse {name}.dep: {e}"));
        assert_eq!(depth.export(), text, "{name}: export differs");
        assert!(DepthGrid::verify_round_trip(&text, &grid).is_ok());
    }
}

#[test]
fn depth_shape_follows_grid() {
    let (grid, text) = load_pair("river");
    let depth = DepthGrid::parse(&text, &grid).expect("Test operation should succeed");
    let (m, n) = grid.dimensions();
    assert_eq!(depth.shape(), (n, m));
    assert_eq!(depth.get(0, 0), Some(2.5));
    assert_eq!(depth.get(0, 6), Some(-999.0));
    assert_eq!(depth.get(1, 6), Some(4.31));

    // Exported text has one extra row and column
    let exported = depth.export();
    assert_eq!(exported.lines().count(), n + 1);
    assert!(exported.lines().all(|line| line.len() == 16 * (m + 1)));
}

#[test]
fn depth_wrapped_rows() {
    let (grid, text) = load_pair("estuary");
    let depth = DepthGrid::parse(&text, &grid).expect("Test operation should succeed");
    assert_eq!(depth.shape(), (4, 13));
    assert_eq!(depth.get(0, 12), Some(-2.75));
    assert_eq!(depth.get(3, 0), Some(-2.75));
}

#[test]
fn depth_for_wrong_grid_fails() {
    let (river, _) = load_pair("river");
    let (_, estuary_depth) = load_pair("estuary");
    assert!(DepthGrid::parse(&estuary_depth, &river).is_err());
}

#[test]
fn depth_set_and_write() {
    let (grid, text) = load_pair("estuary");
    let mut depth = DepthGrid::parse(&text, &grid).expect("Test operation should succeed");
    depth
        .set_depth(Matrix::filled(4, 13, -3.0))
        .expect("Test operation should succeed");
    assert!(depth.set_depth(Matrix::filled(13, 4, -3.0)).is_err());

    let dir = tempfile::tempdir().expect("Test operation should succeed");
    let path = dir.path().join("flat.dep");
    depth.write(&path).expect("Test operation should succeed");
    let reloaded = DepthGrid::load(&path, &grid).expect("Test operation should succeed");
    assert_eq!(reloaded, depth);
    let values = reloaded.depth().as_slice();
    assert!(values.iter().all(|&value| value == -3.0));
}

#[test]
fn depth_custom_border() {
    let (grid, text) = load_pair("estuary");
    let options = DepthOptions::new().with_border_value(-99.0);
    let depth =
        DepthGrid::parse_with(&text, &grid, &options).expect("Test operation should succeed");
    assert_eq!(depth.border_value(), -99.0);
    assert!(depth.export().ends_with("  -9.9000000E+01\n"));
}
