// SPDX-License-Identifier: Apache-2.0

//! Stitch together CGRA tile grids with Rust.
//!
//! gridstitch assembles the structural description of a coarse-grained
//! reconfigurable array: a grid of tiles, each wrapping a compute or memory
//! leaf core, interconnected by a point-to-point mesh and a shared
//! configuration bus. The building blocks are generic — typed multi-bit
//! signal bundles ([`SignalType`]), nodes with ports, children, and wires
//! ([`Node`]) — and the grid builders ([`Tile`], [`Column`], [`GridArray`])
//! compose them into the full array, including the mesh daisy chains and
//! the OR-reduced configuration readback.
//!
//! The finished hierarchy is a write-once artifact: built single-threaded,
//! deterministic down to the bit (see [`Node::structural_hash`]), and handed
//! off to external netlist compilers and verification harnesses. Backend
//! formats, leaf-core datapaths, and placement policies all live outside
//! this crate. [`MemModel`] is the one behavioral piece: a golden-reference
//! model of the configurable memory leaf for verification to check against.

mod bus;
mod dtype;
mod error;
mod grid;
mod leaf;
mod mem;
mod node;

pub use bus::{aggregate_readback, global_controller, or_gate};
pub use dtype::{Direction, Signal, SignalType, config_type, jtag_type, side_type};
pub use error::{BuildError, MemError};
pub use grid::{Column, GridArray, GridParams, Tile};
pub use leaf::{checkerboard, mem_core, pe_core};
pub use mem::{MemModel, MemParams, Mode};
pub use node::{Endpoint, Node, NodeInst, PathElem, Wire, WireEnd};
