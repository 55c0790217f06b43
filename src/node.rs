// SPDX-License-Identifier: Apache-2.0

//! The generic composition framework. A [`Node`] declares ports, instantiates
//! child nodes, and wires endpoints together; the finished hierarchy is a
//! write-once artifact handed to downstream compilers and verification
//! harnesses. All build operations are single-threaded and fail fast: an
//! invariant violation surfaces as a [`BuildError`] at the offending call and
//! leaves the node unchanged.

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::{BuildError, Signal, SignalType};

mod endpoint;
pub use endpoint::{Endpoint, PathElem};

mod wire;
pub(crate) use wire::DrivenBits;
pub use wire::{Wire, WireEnd};

/// Data structure behind a node. Not used directly; [`Node`] holds a smart
/// pointer to this struct.
#[derive(Debug)]
pub struct NodeCore {
    pub(crate) kind: String,
    pub(crate) name_override: Option<String>,
    pub(crate) ports: IndexMap<String, Signal>,
    pub(crate) ports_declared: bool,
    pub(crate) children: IndexMap<String, Rc<RefCell<NodeCore>>>,
    pub(crate) wires: Vec<Wire>,
    pub(crate) driven: HashMap<(Option<String>, String), DrivenBits>,
}

/// A handle to a node in the structural hierarchy. Cloning the handle does
/// not copy the node; both handles refer to the same underlying structure.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) core: Rc<RefCell<NodeCore>>,
}

/// A handle to a child instance within a parent node, returned by
/// [`Node::instantiate`] and used to reference the child's ports as wire
/// endpoints.
#[derive(Clone, Debug)]
pub struct NodeInst {
    pub(crate) parent: Weak<RefCell<NodeCore>>,
    pub(crate) inst_name: String,
}

impl Node {
    /// Creates a new node of the given kind with no ports or children yet.
    pub fn new(kind: impl AsRef<str>) -> Node {
        Node {
            core: Rc::new(RefCell::new(NodeCore {
                kind: kind.as_ref().to_string(),
                name_override: None,
                ports: IndexMap::new(),
                ports_declared: false,
                children: IndexMap::new(),
                wires: Vec::new(),
                driven: HashMap::new(),
            })),
        }
    }

    /// Creates a leaf node: a node whose ports are declared up front and
    /// whose behavior is supplied by an external collaborator.
    pub fn leaf<S: Into<String>>(
        kind: impl AsRef<str>,
        ports: impl IntoIterator<Item = (S, Signal)>,
    ) -> Result<Node, BuildError> {
        let node = Node::new(kind);
        node.declare_ports(ports)?;
        Ok(node)
    }

    /// Returns the static kind of this node (e.g. `"Tile"`).
    pub fn kind(&self) -> String {
        self.core.borrow().kind.clone()
    }

    /// Returns the derived artifact name of this node: the kind for leaves,
    /// or the kind followed by the ordered concatenation of the children's
    /// derived names for composites. Pure and deterministic: two nodes with
    /// identical structure derive identical names. Concatenated names are not
    /// self-delimiting, so downstream deduplication should key on
    /// [`Node::structural_hash`] instead.
    pub fn name(&self) -> String {
        let core = self.core.borrow();
        if let Some(name) = &core.name_override {
            return name.clone();
        }
        if core.children.is_empty() {
            core.kind.clone()
        } else {
            let children = core
                .children
                .values()
                .map(|child| Node { core: child.clone() }.name())
                .join("_");
            format!("{}_{}", core.kind, children)
        }
    }

    /// Overrides the derived name. Used by topology builders whose artifact
    /// names enumerate only a subset of their children (e.g. a column names
    /// its tiles but not its readback OR gate).
    pub(crate) fn set_name_override(&self, name: impl Into<String>) {
        self.core.borrow_mut().name_override = Some(name.into());
    }

    /// Declares this node's full port set. May be called exactly once per
    /// node; a second call fails with a configuration error.
    pub fn declare_ports<S: Into<String>>(
        &self,
        ports: impl IntoIterator<Item = (S, Signal)>,
    ) -> Result<(), BuildError> {
        let mut core = self.core.borrow_mut();
        if core.ports_declared {
            return Err(BuildError::Config("ports already declared".to_string()));
        }
        let mut map = IndexMap::new();
        for (name, signal) in ports {
            let name = name.into();
            if map.insert(name.clone(), signal).is_some() {
                return Err(BuildError::Config(format!(
                    "duplicate port '{}' on {}",
                    name, core.kind
                )));
            }
        }
        core.ports = map;
        core.ports_declared = true;
        Ok(())
    }

    /// Appends a child instance of `child` under the given instance name.
    /// Instance names must be unique within the parent. The returned handle
    /// is used to reference the child's ports as wire endpoints.
    pub fn instantiate(
        &self,
        child: &Node,
        name: impl AsRef<str>,
    ) -> Result<NodeInst, BuildError> {
        let name = name.as_ref();
        if Rc::ptr_eq(&self.core, &child.core) {
            return Err(BuildError::Config(format!(
                "{} cannot instantiate itself",
                self.kind()
            )));
        }
        let mut core = self.core.borrow_mut();
        if core.children.contains_key(name) {
            return Err(BuildError::Config(format!(
                "instance {}.{} already exists",
                core.kind, name
            )));
        }
        debug!("instantiating {} as {}.{}", child.kind(), core.kind, name);
        core.children.insert(name.to_string(), child.core.clone());
        Ok(NodeInst {
            parent: Rc::downgrade(&self.core),
            inst_name: name.to_string(),
        })
    }

    /// Returns an endpoint referencing the named port on this node's own
    /// boundary. The reference is not validated until it is wired.
    pub fn port(&self, name: impl AsRef<str>) -> Endpoint {
        Endpoint {
            scope: Rc::downgrade(&self.core),
            inst: None,
            port: name.as_ref().to_string(),
            path: Vec::new(),
        }
    }

    /// Returns this node's ordered port declarations.
    pub fn ports(&self) -> Vec<(String, Signal)> {
        self.core
            .borrow()
            .ports
            .iter()
            .map(|(name, signal)| (name.clone(), signal.clone()))
            .collect()
    }

    /// Returns this node's ordered child instances.
    pub fn children(&self) -> Vec<(String, Node)> {
        self.core
            .borrow()
            .children
            .iter()
            .map(|(name, core)| (name.clone(), Node { core: core.clone() }))
            .collect()
    }

    /// Returns the child instance with the given name, if any.
    pub fn child(&self, name: impl AsRef<str>) -> Option<Node> {
        self.core
            .borrow()
            .children
            .get(name.as_ref())
            .map(|core| Node { core: core.clone() })
    }

    /// Returns the committed wire set, in commit order.
    pub fn wires(&self) -> Vec<Wire> {
        self.core.borrow().wires.clone()
    }

    /// Returns whether a committed wire connects exactly the given driver and
    /// receiver descriptions.
    pub fn has_wire(&self, driver: &WireEnd, receiver: &WireEnd) -> bool {
        self.core
            .borrow()
            .wires
            .iter()
            .any(|wire| wire.driver == *driver && wire.receiver == *receiver)
    }

    /// Returns a 128-bit XXH3 digest of this node's static structure: kind,
    /// ordered port declarations, ordered children (by instance name and
    /// child digest), and the ordered wire list. Bit-identical across builds
    /// of identical structure and collision-resistant where derived names are
    /// not, so downstream caching should key on this value.
    pub fn structural_hash(&self) -> u128 {
        xxhash_rust::xxh3::xxh3_128(&self.digest_bytes())
    }

    fn digest_bytes(&self) -> Vec<u8> {
        let core = self.core.borrow();
        let mut buf = Vec::new();
        put_str(&mut buf, &core.kind);
        match &core.name_override {
            Some(name) => {
                buf.push(1);
                put_str(&mut buf, name);
            }
            None => buf.push(0),
        }
        put_len(&mut buf, core.ports.len());
        for (name, signal) in &core.ports {
            put_str(&mut buf, name);
            put_signal(&mut buf, signal);
        }
        put_len(&mut buf, core.children.len());
        for (name, child) in &core.children {
            put_str(&mut buf, name);
            let child_hash = Node { core: child.clone() }.structural_hash();
            buf.extend_from_slice(&child_hash.to_le_bytes());
        }
        put_len(&mut buf, core.wires.len());
        for wire in &core.wires {
            put_end(&mut buf, &wire.driver);
            put_end(&mut buf, &wire.receiver);
        }
        buf
    }
}

impl NodeInst {
    /// Returns the instance name this child has within its parent.
    pub fn name(&self) -> &str {
        &self.inst_name
    }

    /// Returns a handle to the instantiated child node.
    pub fn node(&self) -> Node {
        let parent = self
            .parent
            .upgrade()
            .expect("parent node has been dropped");
        let core = parent
            .borrow()
            .children
            .get(self.inst_name.as_str())
            .expect("instance no longer exists")
            .clone();
        Node { core }
    }

    /// Returns an endpoint referencing the named port on this child instance.
    /// The reference is not validated until it is wired.
    pub fn port(&self, name: impl AsRef<str>) -> Endpoint {
        Endpoint {
            scope: self.parent.clone(),
            inst: Some(self.inst_name.clone()),
            port: name.as_ref().to_string(),
            path: Vec::new(),
        }
    }
}

// Length-prefixed serialization keeps the digest self-delimiting; this is
// exactly the property plain name concatenation lacks.

fn put_len(buf: &mut Vec<u8>, len: usize) {
    buf.extend_from_slice(&(len as u64).to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_len(buf, s.len());
    buf.extend_from_slice(s.as_bytes());
}

fn put_signal(buf: &mut Vec<u8>, signal: &Signal) {
    buf.push(match signal.dir {
        crate::Direction::In => 0,
        crate::Direction::Out => 1,
        crate::Direction::InOut => 2,
    });
    put_type(buf, &signal.ty);
}

fn put_type(buf: &mut Vec<u8>, ty: &SignalType) {
    match ty {
        SignalType::Bits(width) => {
            buf.push(0);
            put_len(buf, *width);
        }
        SignalType::Array(elem, len) => {
            buf.push(1);
            put_len(buf, *len);
            put_type(buf, elem);
        }
        SignalType::Bundle(fields) => {
            buf.push(2);
            put_len(buf, fields.len());
            for (name, signal) in fields {
                put_str(buf, name);
                put_signal(buf, signal);
            }
        }
    }
}

fn put_end(buf: &mut Vec<u8>, end: &WireEnd) {
    match &end.inst {
        Some(inst) => {
            buf.push(1);
            put_str(buf, inst);
        }
        None => buf.push(0),
    }
    put_str(buf, &end.port);
    put_len(buf, end.path.len());
    for elem in &end.path {
        match elem {
            PathElem::Field(name) => {
                buf.push(0);
                put_str(buf, name);
            }
            PathElem::Index(index) => {
                buf.push(1);
                put_len(buf, *index);
            }
        }
    }
}
