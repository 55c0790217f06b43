// SPDX-License-Identifier: Apache-2.0

//! Endpoint references: a port on a node boundary or on a child instance,
//! optionally narrowed to a bundle field or array element. Endpoints are
//! lazy, non-owning references; every check happens when they are wired.

use std::cell::RefCell;
use std::rc::Weak;

use crate::node::NodeCore;
use crate::{BuildError, Direction, SignalType};

/// One step into a composite signal: a named bundle field or an array index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathElem {
    Field(String),
    Index(usize),
}

/// A reference to one end of a wire: a port on the wiring node's own
/// boundary (`inst == None`) or on one of its direct children, plus an
/// optional sub-field/index path. Endpoints never own the node they point
/// into.
#[derive(Clone)]
pub struct Endpoint {
    pub(crate) scope: Weak<RefCell<NodeCore>>,
    pub(crate) inst: Option<String>,
    pub(crate) port: String,
    pub(crate) path: Vec<PathElem>,
}

/// An endpoint resolved against its scope: residual shape, effective
/// direction, and position within the flattened port.
pub(crate) struct Resolved {
    pub ty: SignalType,
    pub dir: Direction,
    pub lsb: usize,
}

impl Endpoint {
    /// Narrows this endpoint to the named field of a bundle.
    pub fn field(mut self, name: impl AsRef<str>) -> Endpoint {
        self.path.push(PathElem::Field(name.as_ref().to_string()));
        self
    }

    /// Narrows this endpoint to one element of an array.
    pub fn index(mut self, index: usize) -> Endpoint {
        self.path.push(PathElem::Index(index));
        self
    }

    /// Resolves this endpoint within `scope`, computing its residual type,
    /// effective direction, and flattened bit offset. The effective direction
    /// is the port-level direction unless the port is mixed (`InOut`), in
    /// which case the innermost explicitly-directed field on the path
    /// governs.
    pub(crate) fn resolve(&self, scope: &NodeCore) -> Result<Resolved, BuildError> {
        let signal = match &self.inst {
            None => scope.ports.get(&self.port).cloned().ok_or_else(|| {
                BuildError::Config(format!("no port '{}' on {}", self.port, scope.kind))
            })?,
            Some(inst) => {
                let child = scope.children.get(inst.as_str()).ok_or_else(|| {
                    BuildError::Config(format!("no instance '{}' in {}", inst, scope.kind))
                })?;
                let child = child.borrow();
                child.ports.get(&self.port).cloned().ok_or_else(|| {
                    BuildError::Config(format!("no port '{}' on {}", self.port, child.kind))
                })?
            }
        };

        let mut ty = signal.ty;
        let mut dir = signal.dir;
        let mut lsb = 0;
        for elem in &self.path {
            match elem {
                PathElem::Field(name) => {
                    let SignalType::Bundle(fields) = &ty else {
                        return Err(BuildError::Config(format!(
                            "{}: cannot select field '{}' of {}",
                            self.debug_string(scope),
                            name,
                            ty.describe()
                        )));
                    };
                    let mut offset = 0;
                    let mut found = None;
                    for (field_name, field) in fields {
                        if field_name == name {
                            found = Some(field.clone());
                            break;
                        }
                        offset += field.ty.total_width();
                    }
                    let Some(field) = found else {
                        return Err(BuildError::Config(format!(
                            "{}: no field '{}' in {}",
                            self.debug_string(scope),
                            name,
                            ty.describe()
                        )));
                    };
                    if dir == Direction::InOut {
                        dir = field.dir;
                    }
                    lsb += offset;
                    ty = field.ty;
                }
                PathElem::Index(index) => {
                    let SignalType::Array(elem_ty, len) = &ty else {
                        return Err(BuildError::Config(format!(
                            "{}: cannot index into {}",
                            self.debug_string(scope),
                            ty.describe()
                        )));
                    };
                    if *index >= *len {
                        return Err(BuildError::Config(format!(
                            "{}: index {} out of range for {}",
                            self.debug_string(scope),
                            index,
                            ty.describe()
                        )));
                    }
                    lsb += index * elem_ty.total_width();
                    ty = (**elem_ty).clone();
                }
            }
        }

        Ok(Resolved { ty, dir, lsb })
    }

    /// Converts this endpoint to the owned description recorded in the wire
    /// set.
    pub(crate) fn to_end(&self) -> super::WireEnd {
        super::WireEnd {
            inst: self.inst.clone(),
            port: self.port.clone(),
            path: self.path.clone(),
        }
    }

    pub(crate) fn debug_string(&self, scope: &NodeCore) -> String {
        let mut out = match &self.inst {
            Some(inst) => format!("{}.{}.{}", scope.kind, inst, self.port),
            None => format!("{}.{}", scope.kind, self.port),
        };
        for elem in &self.path {
            match elem {
                PathElem::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                PathElem::Index(index) => {
                    out.push_str(&format!("[{index}]"));
                }
            }
        }
        out
    }
}
