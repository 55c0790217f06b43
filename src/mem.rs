// SPDX-License-Identifier: Apache-2.0

//! Golden-reference behavioral model of a configurable memory leaf. The
//! model is not part of the structural graph; a verification harness drives
//! it directly and compares against the hardware's responses.
//!
//! Known gaps, deliberate on both counts: LINE_BUFFER and FIFO modes have no
//! functional read/write semantics (calls fail with
//! [`MemError::UnsupportedMode`] rather than approximating), and there is no
//! reset operation — the only way to clear the model is to construct a new
//! one.

use indexmap::IndexMap;
use num_bigint::BigUint;
use std::collections::HashMap;

use crate::MemError;

/// Operating mode of a configurable memory leaf, encoded in bits [1:0] of
/// the configuration word at the leaf's configuration address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    LineBuffer,
    Fifo,
    Sram,
}

impl Mode {
    /// The 2-bit encoding of this mode.
    pub fn encode(self) -> u32 {
        match self {
            Mode::LineBuffer => 0,
            Mode::Fifo => 1,
            Mode::Sram => 2,
        }
    }

    /// Decodes a 2-bit encoding. The encoding `0b11` names no mode and
    /// fails with [`MemError::InvalidMode`]; this is also where a harness
    /// holding a raw integer mode value gets its validity check, since
    /// `set_mode` itself only accepts the typed enum.
    pub fn decode(bits: u32) -> Result<Mode, MemError> {
        match bits {
            0 => Ok(Mode::LineBuffer),
            1 => Ok(Mode::Fifo),
            2 => Ok(Mode::Sram),
            other => Err(MemError::InvalidMode(other)),
        }
    }
}

/// Fixed construction-time parameters of a memory model. There is no
/// mid-life reconfiguration; build a new model instead.
#[derive(Clone, Debug)]
pub struct MemParams {
    /// Width of one data entry in bits.
    pub data_width: u32,
    /// Number of data entries.
    pub data_depth: u64,
    /// The configuration-space address whose word holds this leaf's mode.
    pub config_addr: u32,
}

/// The behavioral model: a 32-bit-word configuration space plus
/// mode-governed data contents. Operations are synchronous and single-owner;
/// a failed call never disturbs previously committed state.
pub struct MemModel {
    params: MemParams,
    config: IndexMap<u32, u32>,
    contents: HashMap<u64, BigUint>,
}

impl MemModel {
    /// Creates a model with the given fixed parameters. All configuration
    /// words and data entries start at zero.
    pub fn new(params: MemParams) -> MemModel {
        MemModel {
            params,
            config: IndexMap::new(),
            contents: HashMap::new(),
        }
    }

    pub fn data_width(&self) -> u32 {
        self.params.data_width
    }

    pub fn data_depth(&self) -> u64 {
        self.params.data_depth
    }

    pub fn config_addr(&self) -> u32 {
        self.params.config_addr
    }

    /// Writes a raw word into the configuration space. Whether the word
    /// means anything is up to the sub-field consumers; only the word at
    /// `config_addr` is interpreted by this model.
    pub fn configure(&mut self, addr: u32, data: u32) {
        self.config.insert(addr, data);
    }

    /// Reads a raw configuration-space word; never-written words read zero.
    pub fn config_word(&self, addr: u32) -> u32 {
        self.config.get(&addr).copied().unwrap_or(0)
    }

    /// The current mode, decoded from bits [1:0] of the word at
    /// `config_addr`. Fails with [`MemError::InvalidMode`] if the stored
    /// encoding names no mode (reachable only via [`MemModel::configure`];
    /// `set_mode` cannot store one).
    pub fn mode(&self) -> Result<Mode, MemError> {
        Mode::decode(self.config_word(self.params.config_addr) & 0x3)
    }

    /// Sets the mode with a read-modify-write of the word at `config_addr`:
    /// bits [1:0] are replaced by the mode encoding and bits [31:2] are
    /// preserved unchanged.
    pub fn set_mode(&mut self, mode: Mode) {
        let addr = self.params.config_addr;
        let word = self.config_word(addr);
        self.configure(addr, (word & !0x3) | mode.encode());
    }

    /// Reads the entry at `addr`. The address must be in `[0, data_depth)`
    /// and the model must be in SRAM mode; never-written entries read zero.
    pub fn read(&self, addr: i64) -> Result<BigUint, MemError> {
        let addr = self.check_addr(addr)?;
        self.require_sram()?;
        Ok(self.contents.get(&addr).cloned().unwrap_or_default())
    }

    /// Writes `value` to the entry at `addr`, overwriting any prior value.
    /// The address must be in `[0, data_depth)`, the value must fit in
    /// `data_width` bits, and the model must be in SRAM mode.
    pub fn write(&mut self, addr: i64, value: impl Into<BigUint>) -> Result<(), MemError> {
        let addr = self.check_addr(addr)?;
        let value = value.into();
        if value.bits() > u64::from(self.params.data_width) {
            return Err(MemError::ValueWidth {
                actual: value.bits(),
                width: self.params.data_width,
            });
        }
        self.require_sram()?;
        self.contents.insert(addr, value);
        Ok(())
    }

    /// Shared range guard invoked at the top of every address-taking
    /// operation.
    fn check_addr(&self, addr: i64) -> Result<u64, MemError> {
        if addr < 0 || (addr as u64) >= self.params.data_depth {
            return Err(MemError::AddressRange {
                addr,
                depth: self.params.data_depth,
            });
        }
        Ok(addr as u64)
    }

    fn require_sram(&self) -> Result<(), MemError> {
        match self.mode()? {
            Mode::Sram => Ok(()),
            other => Err(MemError::UnsupportedMode(other)),
        }
    }
}
