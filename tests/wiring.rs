// SPDX-License-Identifier: Apache-2.0

use gridstitch::*;

fn bits(width: usize) -> SignalType {
    SignalType::bits(width).unwrap()
}

#[test]
fn ports_are_declared_exactly_once() {
    let node = Node::new("Alu");
    node.declare_ports([("a", bits(8).input())]).unwrap();

    let err = node.declare_ports([("b", bits(8).input())]).unwrap_err();
    assert_eq!(
        format!("{err}"),
        "configuration error: ports already declared"
    );
    // The original declaration survives.
    assert_eq!(node.ports().len(), 1);
    assert_eq!(node.ports()[0].0, "a");
}

#[test]
fn duplicate_port_name_is_rejected() {
    let node = Node::new("Alu");
    let err = node
        .declare_ports([("a", bits(8).input()), ("a", bits(8).output())])
        .unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}

#[test]
fn duplicate_instance_name_is_rejected() {
    let child = Node::leaf("Child", [("x", bits(1).input())]).unwrap();
    let top = Node::new("Top");
    top.instantiate(&child, "c0").unwrap();
    let err = top.instantiate(&child, "c0").unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
    assert_eq!(top.children().len(), 1);
}

#[test]
fn sibling_output_drives_sibling_input() {
    let source = Node::leaf("Source", [("y", bits(8).output())]).unwrap();
    let sink = Node::leaf("Sink", [("d", bits(8).input())]).unwrap();
    let top = Node::new("Top");
    let source_inst = top.instantiate(&source, "source").unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    // Argument order does not decide who drives; directions do.
    top.wire(&sink_inst.port("d"), &source_inst.port("y"))
        .unwrap();
    assert!(top.has_wire(
        &WireEnd::child("source", "y"),
        &WireEnd::child("sink", "d")
    ));
}

#[test]
fn parent_boundary_input_drives_child_input() {
    let sink = Node::leaf("Sink", [("d", bits(4).input())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("din", bits(4).input())]).unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    top.wire(&top.port("din"), &sink_inst.port("d")).unwrap();
    assert!(top.has_wire(&WireEnd::boundary("din"), &WireEnd::child("sink", "d")));
}

#[test]
fn broadcast_fanout_is_one_driver_many_receivers() {
    let sink = Node::leaf("Sink", [("d", bits(4).input())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("din", bits(4).input())]).unwrap();
    for i in 0..3 {
        let inst = top.instantiate(&sink, format!("sink_{i}")).unwrap();
        top.wire(&top.port("din"), &inst.port("d")).unwrap();
    }
    assert_eq!(top.wires().len(), 3);
}

#[test]
fn duplicate_driver_fails_atomically() {
    let source = Node::leaf("Source", [("y", bits(8).output())]).unwrap();
    let sink = Node::leaf("Sink", [("d", bits(8).input())]).unwrap();
    let top = Node::new("Top");
    let a = top.instantiate(&source, "a").unwrap();
    let b = top.instantiate(&source, "b").unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    top.wire(&a.port("y"), &sink_inst.port("d")).unwrap();
    let before = top.wires();

    let err = top.wire(&b.port("y"), &sink_inst.port("d")).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateDriver(_)));
    assert_eq!(top.wires(), before);
}

#[test]
fn partial_overlap_is_a_duplicate_driver() {
    let ty = SignalType::array(bits(8), 4).unwrap();
    let source = Node::leaf("Source", [("y", ty.clone().output())]).unwrap();
    let bit_source = Node::leaf("BitSource", [("y", bits(8).output())]).unwrap();
    let sink = Node::leaf("Sink", [("d", ty.input())]).unwrap();
    let top = Node::new("Top");
    let whole = top.instantiate(&source, "whole").unwrap();
    let one = top.instantiate(&bit_source, "one").unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    top.wire(&whole.port("y"), &sink_inst.port("d")).unwrap();
    let err = top
        .wire(&one.port("y"), &sink_inst.port("d").index(2))
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateDriver(_)));
}

#[test]
fn element_wires_to_disjoint_indices_coexist() {
    let ty = SignalType::array(bits(8), 4).unwrap();
    let bit_source = Node::leaf("BitSource", [("y", bits(8).output())]).unwrap();
    let sink = Node::leaf("Sink", [("d", ty.input())]).unwrap();
    let top = Node::new("Top");
    let sink_inst = top.instantiate(&sink, "sink").unwrap();
    for i in 0..4 {
        let inst = top.instantiate(&bit_source, format!("src_{i}")).unwrap();
        top.wire(&inst.port("y"), &sink_inst.port("d").index(i))
            .unwrap();
    }
    assert_eq!(top.wires().len(), 4);
}

#[test]
fn two_outputs_cannot_be_wired_together() {
    let source = Node::leaf("Source", [("y", bits(8).output())]).unwrap();
    let top = Node::new("Top");
    let a = top.instantiate(&source, "a").unwrap();
    let b = top.instantiate(&source, "b").unwrap();

    let err = top.wire(&a.port("y"), &b.port("y")).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch(_)));
}

#[test]
fn two_inputs_cannot_be_wired_together() {
    let sink = Node::leaf("Sink", [("d", bits(8).input())]).unwrap();
    let top = Node::new("Top");
    let a = top.instantiate(&sink, "a").unwrap();
    let b = top.instantiate(&sink, "b").unwrap();

    let err = top.wire(&a.port("d"), &b.port("d")).unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch(_)));
}

#[test]
fn unknown_port_fails_at_the_wire_call() {
    let sink = Node::leaf("Sink", [("d", bits(8).input())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("din", bits(8).input())]).unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    let err = top
        .wire(&top.port("nonexistent"), &sink_inst.port("d"))
        .unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
    assert!(top.wires().is_empty());
}

#[test]
fn out_of_range_index_fails_at_the_wire_call() {
    let ty = SignalType::array(bits(8), 4).unwrap();
    let source = Node::leaf("Source", [("y", bits(8).output())]).unwrap();
    let sink = Node::leaf("Sink", [("d", ty.input())]).unwrap();
    let top = Node::new("Top");
    let source_inst = top.instantiate(&source, "source").unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    let err = top
        .wire(&source_inst.port("y"), &sink_inst.port("d").index(4))
        .unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}

#[test]
fn foreign_endpoint_is_rejected() {
    let sink = Node::leaf("Sink", [("d", bits(8).input())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("din", bits(8).input())]).unwrap();
    let other = Node::new("Other");
    other.declare_ports([("din", bits(8).input())]).unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    let err = other
        .wire(&top.port("din"), &sink_inst.port("d"))
        .unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}

#[test]
fn mixed_bundle_expands_into_directional_halves() {
    let side = side_type(5, 16).unwrap();
    let core = Node::leaf("Core", [("north", side.clone())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("north", side)]).unwrap();
    let core_inst = top.instantiate(&core, "core").unwrap();

    top.wire(&top.port("north"), &core_inst.port("north"))
        .unwrap();

    assert_eq!(top.wires().len(), 2);
    assert!(top.has_wire(
        &WireEnd::boundary("north").field("I"),
        &WireEnd::child("core", "north").field("I")
    ));
    assert!(top.has_wire(
        &WireEnd::child("core", "north").field("O"),
        &WireEnd::boundary("north").field("O")
    ));
}

#[test]
fn concrete_direction_covers_whole_bundle_in_one_wire() {
    let ty = config_type(32, 32).unwrap();
    let sink = Node::leaf("Sink", [("config", ty.clone().input())]).unwrap();
    let top = Node::new("Top");
    top.declare_ports([("config", ty.input())]).unwrap();
    let sink_inst = top.instantiate(&sink, "sink").unwrap();

    top.wire(&top.port("config"), &sink_inst.port("config"))
        .unwrap();
    assert_eq!(top.wires().len(), 1);
}
