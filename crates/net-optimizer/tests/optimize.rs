// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end optimizer tests: build a network, optimize it against a
//! device policy, and check placement, adapters, shapes, and workloads.

use backend_ref::{NeonWorkloadFactory, RefWorkloadFactory};
use graph_core::{
    BackendId, LayerGuid, Network, NormalizationDescriptor, Operator, OriginsDescriptor,
    SoftmaxDescriptor, ViewsDescriptor,
};
use net_optimizer::{optimize, DevicePolicy, OptimizeError};
use tensor_desc::{DType, Shape, TensorInfo};

fn ref_only() -> DevicePolicy {
    DevicePolicy::new().prefer(Box::new(RefWorkloadFactory::new()))
}

fn neon_then_ref() -> DevicePolicy {
    DevicePolicy::new()
        .prefer(Box::new(NeonWorkloadFactory::new()))
        .prefer(Box::new(RefWorkloadFactory::new()))
}

/// Input feeding both addends of an Addition, then an Output.
fn addition_network() -> (Network, LayerGuid, LayerGuid, LayerGuid) {
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    let add = net.add_addition_layer(Some("add"));
    let output = net.add_output_layer(0, Some("out"));
    net.connect(input.output(0), add.input(0)).unwrap();
    net.connect(input.output(0), add.input(1)).unwrap();
    net.connect(add.output(0), output.input(0)).unwrap();
    net.set_tensor_info(input.output(0), TensorInfo::new(Shape::vector(4), DType::F32))
        .unwrap();
    (net, input, add, output)
}

/// Input [4, 4] split into two [2, 4] halves, softmax on each, merged back.
fn splitter_merger_network() -> (Network, Vec<LayerGuid>) {
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));

    let mut views = ViewsDescriptor::new(2, 2);
    views.set_view_size(0, vec![2, 4]).unwrap();
    views.set_view_origin(1, vec![2, 0]).unwrap();
    views.set_view_size(1, vec![2, 4]).unwrap();
    let splitter = net.add_splitter_layer(views, Some("split"));

    let sm0 = net.add_softmax_layer(SoftmaxDescriptor::default(), Some("sm0"));
    let sm1 = net.add_softmax_layer(SoftmaxDescriptor::default(), Some("sm1"));

    let mut origins = OriginsDescriptor::new(2, 2);
    origins.set_view_origin(1, vec![2, 0]).unwrap();
    let merger = net.add_merger_layer(origins, Some("merge"));

    let output = net.add_output_layer(0, Some("out"));

    net.connect(input.output(0), splitter.input(0)).unwrap();
    net.connect(splitter.output(0), sm0.input(0)).unwrap();
    net.connect(splitter.output(1), sm1.input(0)).unwrap();
    net.connect(sm0.output(0), merger.input(0)).unwrap();
    net.connect(sm1.output(0), merger.input(1)).unwrap();
    net.connect(merger.output(0), output.input(0)).unwrap();
    net.set_tensor_info(
        input.output(0),
        TensorInfo::new(Shape::matrix(4, 4), DType::F32),
    )
    .unwrap();
    (net, vec![input, splitter, sm0, sm1, merger, output])
}

#[test]
fn test_optimize_assigns_reference_backend() {
    let (net, _, add, _) = addition_network();
    let optimized = optimize(&net, &ref_only()).unwrap();
    assert_eq!(optimized.graph().num_layers(), 3);
    for layer in optimized.graph().layers() {
        assert_eq!(layer.backend(), Some(BackendId::CpuRef));
    }
    assert_eq!(
        optimized
            .graph()
            .layer(add)
            .unwrap()
            .output_slot(0)
            .unwrap()
            .tensor_info(),
        Some(&TensorInfo::new(Shape::vector(4), DType::F32)),
    );
}

#[test]
fn test_optimize_leaves_input_network_untouched() {
    let (net, _, _, _) = addition_network();
    let _optimized = optimize(&net, &ref_only()).unwrap();
    assert_eq!(net.graph().num_layers(), 3);
    for layer in net.graph().layers() {
        assert_eq!(layer.backend(), None);
    }
}

#[test]
fn test_optimize_preserves_guids() {
    let (net, input, add, output) = addition_network();
    let optimized = optimize(&net, &ref_only()).unwrap();
    assert_eq!(optimized.graph().layer(input).unwrap().operator(), Operator::Input);
    assert_eq!(optimized.graph().layer(add).unwrap().operator(), Operator::Addition);
    assert_eq!(optimized.graph().layer(output).unwrap().operator(), Operator::Output);
}

#[test]
fn test_optimize_rejects_empty_network() {
    let net = Network::new();
    assert!(matches!(
        optimize(&net, &ref_only()),
        Err(OptimizeError::EmptyNetwork),
    ));
}

#[test]
fn test_optimize_rejects_empty_policy() {
    let (net, _, _, _) = addition_network();
    assert!(matches!(
        optimize(&net, &DevicePolicy::new()),
        Err(OptimizeError::EmptyPolicy),
    ));
}

#[test]
fn test_optimize_rejects_orphan_layer() {
    let (mut net, input, _, _) = addition_network();
    let orphan = net.add_softmax_layer(SoftmaxDescriptor::default(), Some("dangling"));
    net.connect(input.output(0), orphan.input(0)).unwrap();
    match optimize(&net, &ref_only()).unwrap_err() {
        OptimizeError::OrphanLayer { layer } => assert_eq!(layer, "dangling"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_optimize_rejects_zero_view_merger() {
    // Zero views means zero input slots, so structural validation has
    // nothing to flag; inference must reject the descriptor instead of
    // producing an output from no views.
    let (mut net, _, _, _) = addition_network();
    let merger = net.add_merger_layer(OriginsDescriptor::new(0, 2), Some("empty-merge"));
    let out2 = net.add_output_layer(1, Some("out2"));
    net.connect(merger.output(0), out2.input(0)).unwrap();
    match optimize(&net, &ref_only()).unwrap_err() {
        OptimizeError::Graph(graph_core::GraphError::InvalidDescriptor { detail }) => {
            assert!(detail.contains("empty-merge"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_optimize_rejects_disconnected_input() {
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    let add = net.add_addition_layer(Some("add"));
    let output = net.add_output_layer(0, Some("out"));
    net.connect(input.output(0), add.input(0)).unwrap();
    net.connect(add.output(0), output.input(0)).unwrap();
    net.set_tensor_info(input.output(0), TensorInfo::new(Shape::vector(4), DType::F32))
        .unwrap();
    match optimize(&net, &ref_only()).unwrap_err() {
        OptimizeError::DisconnectedInput { layer, slot } => {
            assert_eq!(layer, "add");
            assert_eq!(slot, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_optimize_requires_input_descriptor() {
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    let output = net.add_output_layer(0, Some("out"));
    net.connect(input.output(0), output.input(0)).unwrap();
    assert!(matches!(
        optimize(&net, &ref_only()),
        Err(OptimizeError::Graph(
            graph_core::GraphError::UnassignedInputShape { .. }
        )),
    ));
}

#[test]
fn test_optimize_rejects_unplaceable_layer() {
    // A policy without the reference fallback cannot place normalization.
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    let norm = net.add_normalization_layer(NormalizationDescriptor::default(), Some("norm"));
    let output = net.add_output_layer(0, Some("out"));
    net.connect(input.output(0), norm.input(0)).unwrap();
    net.connect(norm.output(0), output.input(0)).unwrap();
    net.set_tensor_info(
        input.output(0),
        TensorInfo::new(Shape::new(vec![1, 3, 4, 4]), DType::F32),
    )
    .unwrap();

    let neon_only = DevicePolicy::new().prefer(Box::new(NeonWorkloadFactory::new()));
    match optimize(&net, &neon_only).unwrap_err() {
        OptimizeError::UnsupportedOperator { layer, operator } => {
            assert_eq!(layer, "norm");
            assert_eq!(operator, Operator::Normalization);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_optimize_inserts_copy_adapters_at_backend_boundaries() {
    // Neon takes everything except normalization, which falls back to the
    // reference backend; both edges around it cross a backend boundary.
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    let norm = net.add_normalization_layer(NormalizationDescriptor::default(), Some("norm"));
    let output = net.add_output_layer(0, Some("out"));
    net.connect(input.output(0), norm.input(0)).unwrap();
    net.connect(norm.output(0), output.input(0)).unwrap();
    net.set_tensor_info(
        input.output(0),
        TensorInfo::new(Shape::new(vec![1, 3, 4, 4]), DType::F32),
    )
    .unwrap();

    let policy = neon_then_ref();
    let optimized = optimize(&net, &policy).unwrap();

    assert_eq!(optimized.graph().num_layers(), 5);
    let adapters: Vec<_> = optimized
        .graph()
        .layers()
        .filter(|l| l.operator() == Operator::Copy)
        .collect();
    assert_eq!(adapters.len(), 2);
    // Each adapter runs on its consumer's backend and carries the shape
    // flowing across the boundary.
    for adapter in &adapters {
        let consumer = adapter.output_slot(0).unwrap().connection(0).unwrap();
        assert_eq!(
            adapter.backend(),
            optimized.graph().layer(consumer.layer).unwrap().backend(),
        );
        assert_eq!(
            adapter.output_slot(0).unwrap().tensor_info(),
            Some(&TensorInfo::new(Shape::new(vec![1, 3, 4, 4]), DType::F32)),
        );
    }
    assert_eq!(
        optimized.graph().layer(norm).unwrap().backend(),
        Some(BackendId::CpuRef),
    );
    assert_eq!(
        optimized.graph().layer(input).unwrap().backend(),
        Some(BackendId::CpuAcc),
    );

    // The rewired graph still builds workloads end to end.
    let workloads = optimized.create_workloads(&policy).unwrap();
    assert_eq!(workloads.len(), 3); // norm + two adapters
}

#[test]
fn test_optimize_no_adapters_on_uniform_backend() {
    let (net, _, _, _) = addition_network();
    let optimized = optimize(&net, &neon_then_ref()).unwrap();
    assert_eq!(optimized.graph().num_layers(), 3);
    assert!(optimized
        .graph()
        .layers()
        .all(|l| l.backend() == Some(BackendId::CpuAcc)));
}

#[test]
fn test_splitter_merger_network_optimizes() {
    let (net, guids) = splitter_merger_network();
    let optimized = optimize(&net, &ref_only()).unwrap();
    assert_eq!(optimized.graph().num_layers(), 6);

    let merger = &guids[4];
    assert_eq!(
        optimized
            .graph()
            .layer(*merger)
            .unwrap()
            .output_slot(0)
            .unwrap()
            .tensor_info(),
        Some(&TensorInfo::new(Shape::matrix(4, 4), DType::F32)),
    );
    let splitter = &guids[1];
    for slot in 0..2 {
        assert_eq!(
            optimized
                .graph()
                .layer(*splitter)
                .unwrap()
                .output_slot(slot)
                .unwrap()
                .tensor_info(),
            Some(&TensorInfo::new(Shape::matrix(2, 4), DType::F32)),
        );
    }
}

#[test]
fn test_merger_overlap_rejected_through_optimizer() {
    let (mut net, _) = splitter_merger_network();
    // Rebuild the merger with overlapping origins.
    let mut overlapping = OriginsDescriptor::new(2, 2);
    overlapping.set_view_origin(1, vec![1, 0]).unwrap();
    let bad = net.add_merger_layer(overlapping, Some("bad-merge"));
    let out2 = net.add_output_layer(1, Some("out2"));

    // Wire the softmax outputs into the overlapping merger too.
    let layers: Vec<_> = net.graph().layers().map(|l| l.guid()).collect();
    let (sm0, sm1) = (layers[2], layers[3]);
    net.connect(sm0.output(0), bad.input(0)).unwrap();
    net.connect(sm1.output(0), bad.input(1)).unwrap();
    net.connect(bad.output(0), out2.input(0)).unwrap();

    match optimize(&net, &ref_only()).unwrap_err() {
        OptimizeError::Graph(graph_core::GraphError::ShapeMismatch { layer, .. }) => {
            assert_eq!(layer, "bad-merge");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_create_workloads_for_all_compute_layers() {
    let (net, _) = splitter_merger_network();
    let policy = ref_only();
    let optimized = optimize(&net, &policy).unwrap();
    let workloads = optimized.create_workloads(&policy).unwrap();
    // Splitter, two softmaxes, merger; boundary layers produce none.
    assert_eq!(workloads.len(), 4);
    assert!(workloads.iter().all(|w| w.backend() == BackendId::CpuRef));
}

#[test]
fn test_create_tensor_handles_one_per_output_slot() {
    let (net, _) = splitter_merger_network();
    let policy = ref_only();
    let optimized = optimize(&net, &policy).unwrap();
    let handles = optimized.create_tensor_handles(&policy).unwrap();
    // input 1 + splitter 2 + softmax 2 + merger 1.
    assert_eq!(handles.len(), 6);

    let splitter = net.graph().layers().nth(1).unwrap().guid();
    let handle = handles.get(splitter.output(1)).unwrap();
    assert_eq!(handle.info(), &TensorInfo::new(Shape::matrix(2, 4), DType::F32));
}

#[test]
fn test_dot_export_of_optimized_addition_network() {
    let (net, _, _, _) = addition_network();
    let optimized = optimize(&net, &ref_only()).unwrap();
    let mut buf = Vec::new();
    optimized.serialize_to_dot(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let expected = "digraph Optimized {\n    \
        node [shape=\"record\"];\n    \
        edge [fontsize=8 fontcolor=\"blue\" fontname=\"arial-bold\"];\n    \
        0 [label=\"{Input}\"];\n    \
        1 [label=\"{Addition}\"];\n    \
        2 [label=\"{Output}\"];\n    \
        0 -> 1 [label=< [4] >];\n    \
        0 -> 1 [label=< [4] >];\n    \
        1 -> 2 [label=< [4] >];\n\
        }\n";
    assert_eq!(text, expected);
}

#[test]
fn test_optimize_is_repeatable() {
    let (net, _, _, _) = addition_network();
    let first = optimize(&net, &ref_only()).unwrap();
    let second = optimize(&net, &ref_only()).unwrap();
    assert_eq!(first.graph().num_layers(), second.graph().num_layers());
    let mut a = Vec::new();
    let mut b = Vec::new();
    first.serialize_to_dot(&mut a).unwrap();
    second.serialize_to_dot(&mut b).unwrap();
    assert_eq!(a, b);
}
