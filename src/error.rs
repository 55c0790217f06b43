// SPDX-License-Identifier: Apache-2.0

//! Error types for the structural build phase and the memory behavioral
//! model.

use crate::mem::Mode;

/// Errors raised while assembling the structural hierarchy. All variants are
/// fatal to the in-progress build: they surface at the offending call and the
/// partially built hierarchy must be discarded.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A malformed type, port declaration, or structural request.
    #[error("configuration error: {0}")]
    Config(String),

    /// Two wire endpoints with incompatible shapes or directions.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An attempt to drive a receiver endpoint that already has a driver.
    #[error("duplicate driver: {0}")]
    DuplicateDriver(String),
}

/// Per-call, recoverable errors from the memory behavioral model. A failed
/// call never disturbs the model's committed state.
#[derive(Debug, thiserror::Error)]
pub enum MemError {
    /// A 2-bit mode encoding that does not name a known mode.
    #[error("invalid mode encoding: {0:#04b}")]
    InvalidMode(u32),

    /// An address outside `[0, data_depth)`.
    #[error("address {addr} out of range [0, {depth})")]
    AddressRange { addr: i64, depth: u64 },

    /// A data value wider than `data_width` bits.
    #[error("value needs {actual} bits but data width is {width}")]
    ValueWidth { actual: u64, width: u32 },

    /// A read or write issued while the model is in a mode whose functional
    /// semantics are not defined by this model.
    #[error("operation not supported in {0:?} mode")]
    UnsupportedMode(Mode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = BuildError::Config("ports already declared".to_string());
        assert_eq!(
            format!("{err}"),
            "configuration error: ports already declared"
        );
    }

    #[test]
    fn display_type_mismatch() {
        let err = BuildError::TypeMismatch("bits[8] vs bits[16]".to_string());
        assert_eq!(format!("{err}"), "type mismatch: bits[8] vs bits[16]");
    }

    #[test]
    fn display_address_range() {
        let err = MemError::AddressRange { addr: -1, depth: 8 };
        assert_eq!(format!("{err}"), "address -1 out of range [0, 8)");
    }

    #[test]
    fn display_unsupported_mode() {
        let err = MemError::UnsupportedMode(Mode::Fifo);
        assert_eq!(format!("{err}"), "operation not supported in Fifo mode");
    }
}
