// SPDX-License-Identifier: Apache-2.0

//! Immutable signal type descriptors: scalar bit vectors, arrays, and named
//! bundles, plus the direction qualifier that turns a type into a port
//! declaration. Descriptors are pure values; two descriptors are
//! interchangeable for wiring purposes iff they have the same shape
//! (see [`SignalType::same_shape`]), regardless of direction annotations.

use indexmap::IndexMap;
use std::rc::Rc;

use crate::BuildError;

/// Direction of a signal as seen from the boundary of the node that declares
/// it. `InOut` on a bundle means the bundle is mixed: each field carries its
/// own direction (e.g. the mesh side type, whose `I` half flows in and whose
/// `O` half flows out).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    /// Returns the opposite direction; `InOut` flips to itself.
    pub fn flip(&self) -> Direction {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
            Direction::InOut => Direction::InOut,
        }
    }
}

/// A direction-qualified signal type: what a port declaration carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    pub ty: SignalType,
    pub dir: Direction,
}

/// The shape of a multi-bit signal bundle. Immutable once created; array
/// element types are reference-counted so descriptors stay cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignalType {
    /// A scalar bit vector of the given width.
    Bits(usize),
    /// A homogeneous array of the given element type and length.
    Array(Rc<SignalType>, usize),
    /// An ordered map of named, direction-annotated fields. Field directions
    /// only take effect when the enclosing port is declared `InOut` (mixed);
    /// a port-level `In`/`Out` applies to every field.
    Bundle(IndexMap<String, Signal>),
}

impl SignalType {
    /// Creates a scalar bit-vector type. Zero widths are malformed.
    pub fn bits(width: usize) -> Result<SignalType, BuildError> {
        if width == 0 {
            return Err(BuildError::Config(
                "bit vector width must be greater than zero".to_string(),
            ));
        }
        Ok(SignalType::Bits(width))
    }

    /// Creates an array type of `len` elements. Zero lengths are malformed.
    pub fn array(elem: SignalType, len: usize) -> Result<SignalType, BuildError> {
        if len == 0 {
            return Err(BuildError::Config(
                "array length must be greater than zero".to_string(),
            ));
        }
        Ok(SignalType::Array(Rc::new(elem), len))
    }

    /// Creates a bundle type from an ordered sequence of named fields.
    /// Duplicate field names and empty bundles are malformed.
    pub fn bundle<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, Signal)>,
    ) -> Result<SignalType, BuildError> {
        let mut map = IndexMap::new();
        for (name, signal) in fields {
            let name = name.into();
            if map.insert(name.clone(), signal).is_some() {
                return Err(BuildError::Config(format!(
                    "duplicate bundle field '{name}'"
                )));
            }
        }
        if map.is_empty() {
            return Err(BuildError::Config(
                "bundle must have at least one field".to_string(),
            ));
        }
        Ok(SignalType::Bundle(map))
    }

    /// Qualifies this type with a direction, producing a port declaration.
    pub fn qualify(self, dir: Direction) -> Signal {
        Signal { ty: self, dir }
    }

    /// Shorthand for `qualify(Direction::In)`.
    pub fn input(self) -> Signal {
        self.qualify(Direction::In)
    }

    /// Shorthand for `qualify(Direction::Out)`.
    pub fn output(self) -> Signal {
        self.qualify(Direction::Out)
    }

    /// Shorthand for `qualify(Direction::InOut)`; used for mixed bundles.
    pub fn inout(self) -> Signal {
        self.qualify(Direction::InOut)
    }

    /// Total number of bits when this type is flattened.
    pub fn total_width(&self) -> usize {
        match self {
            SignalType::Bits(width) => *width,
            SignalType::Array(elem, len) => elem.total_width() * len,
            SignalType::Bundle(fields) => {
                fields.values().map(|f| f.ty.total_width()).sum()
            }
        }
    }

    /// Structural equality: same kind, width, and nested shape, ignoring all
    /// direction annotations. This is the compatibility relation used by the
    /// wiring check.
    pub fn same_shape(&self, other: &SignalType) -> bool {
        match (self, other) {
            (SignalType::Bits(a), SignalType::Bits(b)) => a == b,
            (SignalType::Array(a_elem, a_len), SignalType::Array(b_elem, b_len)) => {
                a_len == b_len && a_elem.same_shape(b_elem)
            }
            (SignalType::Bundle(a_fields), SignalType::Bundle(b_fields)) => {
                a_fields.len() == b_fields.len()
                    && a_fields.iter().zip(b_fields.iter()).all(
                        |((a_name, a_sig), (b_name, b_sig))| {
                            a_name == b_name && a_sig.ty.same_shape(&b_sig.ty)
                        },
                    )
            }
            _ => false,
        }
    }

    /// Human-readable shape description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            SignalType::Bits(width) => format!("bits[{width}]"),
            SignalType::Array(elem, len) => format!("{}[{len}]", elem.describe()),
            SignalType::Bundle(fields) => {
                let inner = fields
                    .iter()
                    .map(|(name, sig)| format!("{name}: {}", sig.ty.describe()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{inner}}}")
            }
        }
    }
}

/// The mesh side bundle: `depth` tracks of `track_width` bits in each
/// direction, split into an incoming `I` half and an outgoing `O` half. The
/// stock CGRA uses `side_type(5, 16)`.
pub fn side_type(track_width: usize, depth: usize) -> Result<Signal, BuildError> {
    let lane = SignalType::array(SignalType::bits(track_width)?, depth)?;
    Ok(SignalType::bundle([
        ("I", lane.clone().input()),
        ("O", lane.output()),
    ])?
    .inout())
}

/// The configuration bus bundle: an address word and a data word that travel
/// together. Direction is applied by the port that carries the bundle.
pub fn config_type(addr_width: usize, data_width: usize) -> Result<SignalType, BuildError> {
    SignalType::bundle([
        ("config_addr", SignalType::bits(addr_width)?.input()),
        ("config_data", SignalType::bits(data_width)?.input()),
    ])
}

/// The JTAG boundary bundle carried by the global controller.
pub fn jtag_type() -> Result<Signal, BuildError> {
    let bit = SignalType::bits(1)?;
    Ok(SignalType::bundle([
        ("tdi", bit.clone().input()),
        ("tdo", bit.clone().output()),
        ("tms", bit.clone().input()),
        ("tck", bit.clone().input()),
        ("trst_n", bit.input()),
    ])?
    .inout())
}
