// SPDX-License-Identifier: Apache-2.0

use crate::grid::GridParams;
use crate::{BuildError, Node, SignalType, config_type, side_type};

/// Port names every leaf core must expose to be wrapped in a tile.
const CONTRACT_PORTS: [&str; 4] = ["config", "clk", "rst", "read_config_data"];

/// Mesh side names, one per grid neighbor.
pub(crate) const SIDES: [&str; 4] = ["north", "south", "east", "west"];

/// One grid cell: wraps exactly one leaf core and exposes the fixed tile
/// port set — four mesh sides, the configuration bus, clock, reset, and the
/// per-tile readback output.
#[derive(Debug)]
pub struct Tile {
    node: Node,
}

impl Tile {
    /// Wraps `core` in a tile. The core must expose the contract ports
    /// (`config`, `clk`, `rst`, `read_config_data`); those are wired through
    /// the tile boundary. Mesh sides are wired through to same-named,
    /// same-shaped core ports when the core declares them; otherwise the
    /// tile's side ports are left to the routing fabric, which is outside
    /// this builder.
    pub fn new(core: &Node, params: &GridParams) -> Result<Tile, BuildError> {
        let core_ports = core.ports();
        for required in CONTRACT_PORTS {
            if !core_ports.iter().any(|(name, _)| name == required) {
                return Err(BuildError::Config(format!(
                    "core {} is missing required port '{}'",
                    core.kind(),
                    required
                )));
            }
        }

        let node = Node::new("Tile");
        let side = side_type(params.track_width, params.track_depth)?;
        node.declare_ports([
            ("north", side.clone()),
            ("south", side.clone()),
            ("east", side.clone()),
            ("west", side.clone()),
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

        let core_inst = node.instantiate(core, "core")?;
        node.wire(&node.port("config"), &core_inst.port("config"))?;
        node.wire(&node.port("clk"), &core_inst.port("clk"))?;
        node.wire(&node.port("rst"), &core_inst.port("rst"))?;
        node.wire(
            &core_inst.port("read_config_data"),
            &node.port("read_config_data"),
        )?;

        for side_name in SIDES {
            let routed = core_ports
                .iter()
                .any(|(name, signal)| name == side_name && signal.ty.same_shape(&side.ty));
            if routed {
                node.wire(&node.port(side_name), &core_inst.port(side_name))?;
            }
        }

        node.set_name_override(format!("Tile_{}", core.name()));
        Ok(Tile { node })
    }

    /// The tile's node in the structural hierarchy.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The tile's derived artifact name.
    pub fn name(&self) -> String {
        self.node.name()
    }
}
