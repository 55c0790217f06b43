// SPDX-License-Identifier: Apache-2.0

use crate::bus::{global_controller, or_gate};
use crate::grid::{Column, GridParams, Tile};
use crate::{BuildError, Node, SignalType, jtag_type, side_type};

/// The top-level array: `width` columns of `height` tiles, a global
/// controller that owns the external configuration/clock/reset boundary,
/// horizontal daisy chains between adjacent columns, boundary mesh ports
/// exported at the top level (no wraparound), and an array-wide OR-reduced
/// readback output.
#[derive(Debug)]
pub struct GridArray {
    node: Node,
    columns: Vec<Column>,
}

impl GridArray {
    /// Builds the array from an already-decided placement: `cores[i]` is the
    /// ordered stack of leaf cores for column `i`, row 0 at the north edge.
    /// How that placement was chosen is a policy external to this builder.
    /// All columns must have the same nonzero height.
    pub fn new(cores: Vec<Vec<Node>>, params: &GridParams) -> Result<GridArray, BuildError> {
        let width = cores.len();
        if width == 0 {
            return Err(BuildError::Config(
                "grid must have at least one column".to_string(),
            ));
        }
        let height = cores[0].len();
        if height == 0 {
            return Err(BuildError::Config(
                "grid columns must have at least one tile".to_string(),
            ));
        }
        if cores.iter().any(|column| column.len() != height) {
            return Err(BuildError::Config(
                "all grid columns must have the same height".to_string(),
            ));
        }

        let columns = cores
            .iter()
            .map(|column_cores| {
                let tiles = column_cores
                    .iter()
                    .map(|core| Tile::new(core, params))
                    .collect::<Result<Vec<_>, _>>()?;
                Column::new(tiles, params)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let node = Node::new("CGRA");
        let side = side_type(params.track_width, params.track_depth)?;
        node.declare_ports([
            ("north", SignalType::array(side.ty.clone(), width)?.inout()),
            ("south", SignalType::array(side.ty.clone(), width)?.inout()),
            ("west", SignalType::array(side.ty.clone(), height)?.inout()),
            ("east", SignalType::array(side.ty.clone(), height)?.inout()),
            ("jtag", jtag_type()?),
            ("clk_in", SignalType::bits(1)?.input()),
            ("reset_in", SignalType::bits(1)?.input()),
            (
                "read_config_data",
                SignalType::bits(params.config_data_width)?.output(),
            ),
        ])?;

        let controller = global_controller(params)?;
        let controller_inst = node.instantiate(&controller, "global_controller")?;
        node.wire(&node.port("jtag"), &controller_inst.port("jtag"))?;
        node.wire(&node.port("clk_in"), &controller_inst.port("clk_in"))?;
        node.wire(&node.port("reset_in"), &controller_inst.port("reset_in"))?;

        let column_insts = columns
            .iter()
            .enumerate()
            .map(|(i, column)| node.instantiate(column.node(), format!("column_{i}")))
            .collect::<Result<Vec<_>, _>>()?;

        // The controller is the single driver of the shared busses; every
        // column is a receiver.
        for inst in &column_insts {
            node.wire(&controller_inst.port("config"), &inst.port("config"))?;
            node.wire(&controller_inst.port("clk_out"), &inst.port("clk"))?;
            node.wire(&controller_inst.port("reset_out"), &inst.port("rst"))?;
        }

        let read_data_or = or_gate(width, params.config_data_width)?;
        let or_inst = node.instantiate(&read_data_or, "read_data_or")?;
        for (i, inst) in column_insts.iter().enumerate() {
            node.wire(
                &inst.port("read_config_data"),
                &or_inst.port(format!("I{i}")),
            )?;
        }
        node.wire(&or_inst.port("O"), &node.port("read_config_data"))?;
        node.wire(
            &or_inst.port("O"),
            &controller_inst.port("read_config_data"),
        )?;

        // Boundary mesh ports: outward sides are exported directly, with no
        // wraparound connectivity.
        for (i, inst) in column_insts.iter().enumerate() {
            node.wire(&node.port("north").index(i), &inst.port("north"))?;
            node.wire(&node.port("south").index(i), &inst.port("south"))?;
        }
        for j in 0..height {
            node.wire(
                &node.port("west").index(j),
                &column_insts[0].port("west").index(j),
            )?;
            node.wire(
                &node.port("east").index(j),
                &column_insts[width - 1].port("east").index(j),
            )?;
        }

        // Horizontal daisy chain between adjacent columns, row by row, the
        // same split-link scheme the columns use vertically.
        for i in 1..width {
            let left = &column_insts[i - 1];
            let right = &column_insts[i];
            for j in 0..height {
                node.wire(
                    &left.port("east").index(j).field("O"),
                    &right.port("west").index(j).field("I"),
                )?;
                node.wire(
                    &right.port("west").index(j).field("O"),
                    &left.port("east").index(j).field("I"),
                )?;
            }
        }

        node.set_name_override("CGRA");
        Ok(GridArray { node, columns })
    }

    /// The array's node in the structural hierarchy.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The columns composing this array, west to east.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Grid width in columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.columns[0].height()
    }
}
