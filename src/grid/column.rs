// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;

use crate::bus::or_gate;
use crate::grid::{GridParams, Tile};
use crate::{BuildError, Node, SignalType, config_type, side_type};

/// A vertical stack of tiles. The column's north side is tile 0's north and
/// its south side is the last tile's south; west and east are exported as
/// per-row arrays. Adjacent tiles are daisy-chained (each mesh link split
/// into an output half and an input half, each with a single driver), the
/// configuration bus, clock, and reset are broadcast to every tile, and the
/// per-tile readback outputs are OR-reduced into one column value.
#[derive(Debug)]
pub struct Column {
    node: Node,
    tiles: Vec<Tile>,
}

impl Column {
    /// Builds a column from an ordered, non-empty stack of tiles (index 0 at
    /// the north edge).
    pub fn new(tiles: Vec<Tile>, params: &GridParams) -> Result<Column, BuildError> {
        let height = tiles.len();
        if height == 0 {
            return Err(BuildError::Config(
                "column must have at least one tile".to_string(),
            ));
        }

        let node = Node::new("Column");
        let side = side_type(params.track_width, params.track_depth)?;
        node.declare_ports([
            ("north", side.clone()),
            ("south", side.clone()),
            (
                "west",
                SignalType::array(side.ty.clone(), height)?.inout(),
            ),
            ("east", SignalType::array(side.ty.clone(), height)?.inout()),
            (
                "config",
                config_type(params.config_addr_width, params.config_data_width)?.input(),
            ),
            ("clk", SignalType::bits(1)?.input()),
            ("rst", SignalType::bits(1)?.input()),
            (
                "read_config_data",
                SignalType::bits(params.config_data_width)?.output(),
            ),
        ])?;

        let insts = tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| node.instantiate(tile.node(), format!("tile_{i}")))
            .collect::<Result<Vec<_>, _>>()?;

        let read_data_or = or_gate(height, params.config_data_width)?;
        let or_inst = node.instantiate(&read_data_or, "read_data_or")?;
        node.wire(&or_inst.port("O"), &node.port("read_config_data"))?;

        for inst in &insts {
            node.wire(&node.port("config"), &inst.port("config"))?;
            node.wire(&node.port("clk"), &inst.port("clk"))?;
            node.wire(&node.port("rst"), &inst.port("rst"))?;
        }

        node.wire(&node.port("north"), &insts[0].port("north"))?;
        node.wire(&node.port("south"), &insts[height - 1].port("south"))?;
        for (i, inst) in insts.iter().enumerate() {
            node.wire(&node.port("west").index(i), &inst.port("west"))?;
            node.wire(&node.port("east").index(i), &inst.port("east"))?;
            node.wire(
                &inst.port("read_config_data"),
                &or_inst.port(format!("I{i}")),
            )?;
        }

        // Bidirectional daisy chain between vertical neighbors. Southbound
        // traffic leaves tile i on south.O and enters tile i+1 on north.I;
        // northbound traffic leaves tile i+1 on north.O and enters tile i on
        // south.I.
        for i in 1..height {
            let above = &insts[i - 1];
            let below = &insts[i];
            node.wire(
                &below.port("north").field("O"),
                &above.port("south").field("I"),
            )?;
            node.wire(
                &above.port("south").field("O"),
                &below.port("north").field("I"),
            )?;
        }

        let tile_names = tiles.iter().map(Tile::name).join("_");
        node.set_name_override(format!("Column_{tile_names}"));
        Ok(Column { node, tiles })
    }

    /// The column's node in the structural hierarchy.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The tiles composing this column, north to south.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles in this column.
    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    /// The column's derived artifact name: `Column_` followed by the ordered
    /// concatenation of the tiles' derived names.
    pub fn name(&self) -> String {
        self.node.name()
    }
}
