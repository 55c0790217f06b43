// SPDX-License-Identifier: Apache-2.0

//! Wiring: endpoint validation, mixed-bundle expansion, duplicate-driver
//! detection, and the atomic commit of planned wires. A `wire()` call either
//! commits every wire it implies or commits nothing.

use log::{debug, trace};
use num_bigint::BigUint;
use std::collections::HashMap;
use std::rc::Rc;

use crate::node::NodeCore;
use crate::{BuildError, Direction, Endpoint, Node, PathElem, SignalType};

/// One end of a committed wire, described by instance name (`None` for the
/// wiring node's own boundary), port name, and sub-field/index path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WireEnd {
    pub inst: Option<String>,
    pub port: String,
    pub path: Vec<PathElem>,
}

impl WireEnd {
    /// Describes a port on the wiring node's own boundary.
    pub fn boundary(port: impl Into<String>) -> WireEnd {
        WireEnd {
            inst: None,
            port: port.into(),
            path: Vec::new(),
        }
    }

    /// Describes a port on a child instance.
    pub fn child(inst: impl Into<String>, port: impl Into<String>) -> WireEnd {
        WireEnd {
            inst: Some(inst.into()),
            port: port.into(),
            path: Vec::new(),
        }
    }

    /// Narrows the description to the named bundle field.
    pub fn field(mut self, name: impl Into<String>) -> WireEnd {
        self.path.push(PathElem::Field(name.into()));
        self
    }

    /// Narrows the description to one array element.
    pub fn index(mut self, index: usize) -> WireEnd {
        self.path.push(PathElem::Index(index));
        self
    }
}

/// A committed point-to-point wire: an ordered (driver, receiver) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wire {
    pub driver: WireEnd,
    pub receiver: WireEnd,
}

/// Per-receiver-port record of which flattened bits already have a driver.
#[derive(Clone, Debug, Default)]
pub(crate) struct DrivenBits {
    mask: BigUint,
}

impl DrivenBits {
    pub(crate) fn overlaps(&self, lsb: usize, width: usize) -> bool {
        (&self.mask & &(ones(width) << lsb)).bits() != 0
    }

    pub(crate) fn mark(&mut self, lsb: usize, width: usize) {
        self.mask |= ones(width) << lsb;
    }
}

fn ones(width: usize) -> BigUint {
    (BigUint::from(1u8) << width) - 1u8
}

struct Planned {
    driver: WireEnd,
    receiver: WireEnd,
    receiver_key: (Option<String>, String),
    receiver_lsb: usize,
    width: usize,
    driver_desc: String,
    receiver_desc: String,
}

impl Node {
    /// Connects two endpoints within this node: its own boundary ports and/or
    /// ports of its direct children. Exactly one endpoint must be a driver (a
    /// boundary input or a child output) and the other a receiver, and both
    /// must have structurally identical types; mixed bundles (e.g. mesh side
    /// ports) are expanded field by field with each half wired in its own
    /// direction. Fails with [`BuildError::TypeMismatch`] on incompatible
    /// endpoints and [`BuildError::DuplicateDriver`] if any receiver bit
    /// already has a driver. Failure is atomic: the committed wire set is
    /// unchanged.
    pub fn wire(&self, a: &Endpoint, b: &Endpoint) -> Result<(), BuildError> {
        for ep in [a, b] {
            let owned = ep
                .scope
                .upgrade()
                .is_some_and(|rc| Rc::ptr_eq(&rc, &self.core));
            if !owned {
                return Err(BuildError::Config(format!(
                    "endpoint '{}' does not belong to {}",
                    ep.port,
                    self.kind()
                )));
            }
        }

        let mut plan = Vec::new();
        let mut pending: HashMap<(Option<String>, String), DrivenBits> = HashMap::new();
        {
            let core = self.core.borrow();
            plan_connection(&core, a, b, &mut plan)?;
            for planned in &plan {
                let bits = pending
                    .entry(planned.receiver_key.clone())
                    .or_insert_with(|| {
                        core.driven
                            .get(&planned.receiver_key)
                            .cloned()
                            .unwrap_or_default()
                    });
                if bits.overlaps(planned.receiver_lsb, planned.width) {
                    return Err(BuildError::DuplicateDriver(format!(
                        "{} already has a driver",
                        planned.receiver_desc
                    )));
                }
                bits.mark(planned.receiver_lsb, planned.width);
            }
        }

        let mut core = self.core.borrow_mut();
        for planned in plan {
            debug!("wired {} -> {}", planned.driver_desc, planned.receiver_desc);
            core.wires.push(Wire {
                driver: planned.driver,
                receiver: planned.receiver,
            });
        }
        for (key, bits) in pending {
            core.driven.insert(key, bits);
        }
        Ok(())
    }
}

/// Recursively plans the wires implied by connecting `a` to `b`, expanding
/// mixed bundles into per-field wires. Nothing is committed here.
fn plan_connection(
    core: &NodeCore,
    a: &Endpoint,
    b: &Endpoint,
    plan: &mut Vec<Planned>,
) -> Result<(), BuildError> {
    let ra = a.resolve(core)?;
    let rb = b.resolve(core)?;

    if !ra.ty.same_shape(&rb.ty) {
        return Err(BuildError::TypeMismatch(format!(
            "cannot wire {} ({}) to {} ({})",
            a.debug_string(core),
            ra.ty.describe(),
            b.debug_string(core),
            rb.ty.describe()
        )));
    }

    if ra.dir == Direction::InOut || rb.dir == Direction::InOut {
        if let SignalType::Bundle(fields) = &ra.ty {
            for name in fields.keys() {
                plan_connection(core, &a.clone().field(name), &b.clone().field(name), plan)?;
            }
            return Ok(());
        }
        return Err(BuildError::TypeMismatch(format!(
            "cannot wire {} to {}: unresolved direction",
            a.debug_string(core),
            b.debug_string(core)
        )));
    }

    let a_drives = is_driver(a, ra.dir);
    let b_drives = is_driver(b, rb.dir);
    let (driver, receiver, resolved_receiver) = match (a_drives, b_drives) {
        (true, false) => (a, b, &rb),
        (false, true) => (b, a, &ra),
        (true, true) => {
            return Err(BuildError::TypeMismatch(format!(
                "cannot wire {} to {}: both endpoints are drivers",
                a.debug_string(core),
                b.debug_string(core)
            )));
        }
        (false, false) => {
            return Err(BuildError::TypeMismatch(format!(
                "cannot wire {} to {}: neither endpoint is a driver",
                a.debug_string(core),
                b.debug_string(core)
            )));
        }
    };

    trace!(
        "planned {} -> {}",
        driver.debug_string(core),
        receiver.debug_string(core)
    );
    plan.push(Planned {
        driver: driver.to_end(),
        receiver: receiver.to_end(),
        receiver_key: (receiver.inst.clone(), receiver.port.clone()),
        receiver_lsb: resolved_receiver.lsb,
        width: resolved_receiver.ty.total_width(),
        driver_desc: driver.debug_string(core),
        receiver_desc: receiver.debug_string(core),
    });
    Ok(())
}

/// A boundary input drives inward; a child output drives outward into its
/// parent's scope. The mirror cases are receivers.
fn is_driver(endpoint: &Endpoint, dir: Direction) -> bool {
    match (endpoint.inst.is_some(), dir) {
        (false, Direction::In) => true,
        (false, Direction::Out) => false,
        (true, Direction::Out) => true,
        (true, Direction::In) => false,
        (_, Direction::InOut) => unreachable!("mixed endpoints are expanded before planning"),
    }
}
