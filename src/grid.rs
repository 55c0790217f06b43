// SPDX-License-Identifier: Apache-2.0

//! Grid topology builder: tiles wrap leaf cores, columns stack tiles along
//! the mesh, and the full array stitches columns together with a global
//! controller. All wiring here reduces to the composition framework's
//! `wire()`; this module decides *what* gets connected, never *how*.

mod array;
mod column;
mod tile;

pub use array::GridArray;
pub use column::Column;
pub use tile::Tile;

/// Structural parameters shared across the grid. Passed explicitly into
/// every builder; there is no global registry.
#[derive(Clone, Debug)]
pub struct GridParams {
    /// Bits per mesh track.
    pub track_width: usize,
    /// Mesh tracks per side.
    pub track_depth: usize,
    /// Configuration bus address width.
    pub config_addr_width: usize,
    /// Configuration bus data width, which is also the readback width.
    pub config_data_width: usize,
}

impl Default for GridParams {
    /// The stock CGRA numbers: 16 tracks of 5 bits per side, 32/32
    /// configuration bus.
    fn default() -> Self {
        GridParams {
            track_width: 5,
            track_depth: 16,
            config_addr_width: 32,
            config_data_width: 32,
        }
    }
}
