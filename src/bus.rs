// SPDX-License-Identifier: Apache-2.0

//! Configuration bus plumbing: the readback OR-reduce leaf, the global
//! controller leaf, and the behavioral reference for readback aggregation.
//!
//! Configuration writes are pure fan-out: the address/data bus reaches every
//! leaf unmodified and each leaf decides for itself whether a write targets
//! it. Readback selection relies on the decode policy being
//! partition-disjoint: for any read address, at most one leaf drives a
//! non-zero `read_config_data` and every other leaf drives exactly zero, so
//! a bitwise OR of all leaf outputs recovers the selected value.

use crate::grid::GridParams;
use crate::{BuildError, Node, SignalType, config_type, jtag_type};

/// Builds an `n`-input, `width`-bit bitwise OR leaf with ports `I0..I{n-1}`
/// and `O`. A flat gate and a balanced tree are behaviorally identical
/// realizations; which one the backend emits is its own concern.
pub fn or_gate(n: usize, width: usize) -> Result<Node, BuildError> {
    if n == 0 {
        return Err(BuildError::Config(
            "OR gate must have at least one input".to_string(),
        ));
    }
    let mut ports = Vec::with_capacity(n + 1);
    for i in 0..n {
        ports.push((format!("I{i}"), SignalType::bits(width)?.input()));
    }
    ports.push(("O".to_string(), SignalType::bits(width)?.output()));
    Node::leaf(format!("Or{n}x{width}"), ports)
}

/// Builds the global controller leaf: it owns the external JTAG/clock/reset
/// boundary, drives the shared configuration bus, and receives the
/// aggregated array-wide readback value.
pub fn global_controller(params: &GridParams) -> Result<Node, BuildError> {
    Node::leaf(
        "GlobalController",
        [
            ("jtag".to_string(), jtag_type()?),
            ("clk_in".to_string(), SignalType::bits(1)?.input()),
            ("reset_in".to_string(), SignalType::bits(1)?.input()),
            (
                "config".to_string(),
                config_type(params.config_addr_width, params.config_data_width)?.output(),
            ),
            ("clk_out".to_string(), SignalType::bits(1)?.output()),
            ("reset_out".to_string(), SignalType::bits(1)?.output()),
            (
                "read_config_data".to_string(),
                SignalType::bits(params.config_data_width)?.input(),
            ),
        ],
    )
}

/// Behavioral reference for the readback OR tree: the aggregate of a set of
/// per-leaf readback values is their bitwise OR. Valid as a *selection* only
/// under the partition-disjoint decode invariant described in the module
/// docs; verification harnesses check the structural aggregation against
/// this function.
pub fn aggregate_readback(values: &[u32]) -> u32 {
    values.iter().fold(0, |acc, value| acc | value)
}
