// SPDX-License-Identifier: Apache-2.0

use gridstitch::*;

fn checkerboard_grid(width: usize, height: usize) -> GridArray {
    let params = GridParams::default();
    let cores = checkerboard(width, height, &params).unwrap();
    GridArray::new(cores, &params).unwrap()
}

#[test]
fn four_by_four_checkerboard_builds() {
    let grid = checkerboard_grid(4, 4);
    assert_eq!(grid.width(), 4);
    assert_eq!(grid.height(), 4);
    assert_eq!(grid.node().name(), "CGRA");

    // Even columns are all processing elements, odd columns all memories.
    assert_eq!(
        grid.columns()[0].tiles()[0].name(),
        "Tile_PECore"
    );
    assert_eq!(
        grid.columns()[1].tiles()[0].name(),
        "Tile_MemCore_16_1024"
    );
}

#[test]
fn controller_fans_out_the_shared_busses() {
    let grid = checkerboard_grid(3, 2);
    let node = grid.node();

    for i in 0..3 {
        let column = format!("column_{i}");
        assert!(node.has_wire(
            &WireEnd::child("global_controller", "config"),
            &WireEnd::child(&column, "config")
        ));
        assert!(node.has_wire(
            &WireEnd::child("global_controller", "clk_out"),
            &WireEnd::child(&column, "clk")
        ));
        assert!(node.has_wire(
            &WireEnd::child("global_controller", "reset_out"),
            &WireEnd::child(&column, "rst")
        ));
    }
}

#[test]
fn external_boundary_reaches_the_controller() {
    let grid = checkerboard_grid(2, 2);
    let node = grid.node();

    assert!(node.has_wire(
        &WireEnd::boundary("clk_in"),
        &WireEnd::child("global_controller", "clk_in")
    ));
    assert!(node.has_wire(
        &WireEnd::boundary("reset_in"),
        &WireEnd::child("global_controller", "reset_in")
    ));
    // JTAG is a mixed bundle: tdi flows in, tdo flows back out.
    assert!(node.has_wire(
        &WireEnd::boundary("jtag").field("tdi"),
        &WireEnd::child("global_controller", "jtag").field("tdi")
    ));
    assert!(node.has_wire(
        &WireEnd::child("global_controller", "jtag").field("tdo"),
        &WireEnd::boundary("jtag").field("tdo")
    ));
}

#[test]
fn array_readback_aggregates_columns() {
    let grid = checkerboard_grid(3, 2);
    let node = grid.node();

    for i in 0..3 {
        assert!(node.has_wire(
            &WireEnd::child(format!("column_{i}"), "read_config_data"),
            &WireEnd::child("read_data_or", format!("I{i}"))
        ));
    }
    assert!(node.has_wire(
        &WireEnd::child("read_data_or", "O"),
        &WireEnd::boundary("read_config_data")
    ));
    assert!(node.has_wire(
        &WireEnd::child("read_data_or", "O"),
        &WireEnd::child("global_controller", "read_config_data")
    ));
}

#[test]
fn boundary_mesh_ports_have_no_wraparound() {
    let grid = checkerboard_grid(3, 2);
    let node = grid.node();

    for i in 0..3 {
        let column = format!("column_{i}");
        assert!(node.has_wire(
            &WireEnd::boundary("north").index(i).field("I"),
            &WireEnd::child(&column, "north").field("I")
        ));
        assert!(node.has_wire(
            &WireEnd::child(&column, "south").field("O"),
            &WireEnd::boundary("south").index(i).field("O")
        ));
    }
    for j in 0..2 {
        assert!(node.has_wire(
            &WireEnd::boundary("west").index(j).field("I"),
            &WireEnd::child("column_0", "west").index(j).field("I")
        ));
        assert!(node.has_wire(
            &WireEnd::child("column_2", "east").index(j).field("O"),
            &WireEnd::boundary("east").index(j).field("O")
        ));
    }
    // The west edge of column 0 is never fed from the east edge of the last
    // column.
    assert!(!node.has_wire(
        &WireEnd::child("column_2", "east").index(0).field("O"),
        &WireEnd::child("column_0", "west").index(0).field("I")
    ));
}

#[test]
fn adjacent_columns_are_daisy_chained_per_row() {
    let grid = checkerboard_grid(3, 2);
    let node = grid.node();

    for i in 0..2 {
        let left = format!("column_{i}");
        let right = format!("column_{}", i + 1);
        for j in 0..2 {
            assert!(node.has_wire(
                &WireEnd::child(&left, "east").index(j).field("O"),
                &WireEnd::child(&right, "west").index(j).field("I")
            ));
            assert!(node.has_wire(
                &WireEnd::child(&right, "west").index(j).field("O"),
                &WireEnd::child(&left, "east").index(j).field("I")
            ));
        }
    }
}

#[test]
fn identical_grids_build_identically() {
    let a = checkerboard_grid(4, 4);
    let b = checkerboard_grid(4, 4);
    assert_eq!(a.node().name(), b.node().name());
    assert_eq!(a.node().structural_hash(), b.node().structural_hash());
    assert_eq!(
        a.columns()[2].node().structural_hash(),
        b.columns()[2].node().structural_hash()
    );
}

#[test]
fn different_grids_hash_differently() {
    let a = checkerboard_grid(2, 2);
    let b = checkerboard_grid(2, 3);
    assert_ne!(a.node().structural_hash(), b.node().structural_hash());
}

#[test]
fn ragged_placement_is_rejected() {
    let params = GridParams::default();
    let mut cores = checkerboard(2, 2, &params).unwrap();
    cores[1].pop();
    let err = GridArray::new(cores, &params).unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}

#[test]
fn empty_placement_is_rejected() {
    let params = GridParams::default();
    let err = GridArray::new(Vec::new(), &params).unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}
