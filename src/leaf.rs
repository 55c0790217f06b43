// SPDX-License-Identifier: Apache-2.0

//! Interface-only leaf-core stubs. Real compute and memory cores are
//! externally generated IP; the topology builder only needs their port
//! surface, so these stubs declare the tile contract ports plus each core's
//! data ports and nothing else.

use crate::grid::GridParams;
use crate::{BuildError, Node, Signal, SignalType, config_type};

/// The port set every leaf core must present to be wrapped in a tile.
fn contract_ports(params: &GridParams) -> Result<Vec<(String, Signal)>, BuildError> {
    Ok(vec![
        (
            "config".to_string(),
            config_type(params.config_addr_width, params.config_data_width)?.input(),
        ),
        ("clk".to_string(), SignalType::bits(1)?.input()),
        ("rst".to_string(), SignalType::bits(1)?.input()),
        (
            "read_config_data".to_string(),
            SignalType::bits(params.config_data_width)?.output(),
        ),
    ])
}

/// A 16-bit processing-element core stub: two operand inputs, one result
/// output, and an opcode select.
pub fn pe_core(params: &GridParams) -> Result<Node, BuildError> {
    let mut ports = contract_ports(params)?;
    let data = SignalType::bits(16)?;
    ports.push(("I0".to_string(), data.clone().input()));
    ports.push(("I1".to_string(), data.clone().input()));
    ports.push(("O".to_string(), data.output()));
    ports.push(("opcode".to_string(), SignalType::bits(2)?.input()));
    Node::leaf("PECore", ports)
}

/// A memory core stub of `data_width`-bit words and `data_depth` entries.
/// The kind name carries the parameterization, so differently sized memory
/// cores derive different artifact names.
pub fn mem_core(
    data_width: usize,
    data_depth: usize,
    params: &GridParams,
) -> Result<Node, BuildError> {
    if data_width == 0 || data_depth == 0 {
        return Err(BuildError::Config(
            "memory core width and depth must be greater than zero".to_string(),
        ));
    }
    let mut ports = contract_ports(params)?;
    let data = SignalType::bits(data_width)?;
    ports.push(("addr_in".to_string(), SignalType::bits(clog2(data_depth))?.input()));
    ports.push(("data_in".to_string(), data.clone().input()));
    ports.push(("data_out".to_string(), data.output()));
    ports.push(("wen".to_string(), SignalType::bits(1)?.input()));
    ports.push(("cen".to_string(), SignalType::bits(1)?.input()));
    Node::leaf(format!("MemCore_{data_width}_{data_depth}"), ports)
}

/// The stock demo placement: memory cores in odd columns, processing
/// elements everywhere else. Returns `cores[column][row]`, row 0 at the
/// north edge. Placement is a policy external to the topology builder; this
/// one exists so tests and demos have a realistic grid to assemble.
pub fn checkerboard(
    width: usize,
    height: usize,
    params: &GridParams,
) -> Result<Vec<Vec<Node>>, BuildError> {
    let mut cores = Vec::with_capacity(width);
    for i in 0..width {
        let mut column = Vec::with_capacity(height);
        for _ in 0..height {
            let core = if i % 2 == 1 {
                mem_core(16, 1024, params)?
            } else {
                pe_core(params)?
            };
            column.push(core);
        }
        cores.push(column);
    }
    Ok(cores)
}

/// Ceiling log2, with a one-bit floor so depth-1 memories still get an
/// address port.
fn clog2(x: usize) -> usize {
    (usize::BITS - x.saturating_sub(1).leading_zeros()).max(1) as usize
}
