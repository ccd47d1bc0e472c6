// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for graph construction and ordering.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graph_core::{ActivationDescriptor, Network};
use tensor_desc::{DType, Shape, TensorInfo};

fn build_chain(depth: usize) -> Network {
    let mut net = Network::new();
    let input = net.add_input_layer(0, Some("in"));
    net.set_tensor_info(input.output(0), TensorInfo::new(Shape::vector(256), DType::F32))
        .expect("input slot exists");
    let mut prev = input;
    for i in 0..depth {
        let act = net.add_activation_layer(ActivationDescriptor::default(), None);
        net.connect(prev.output(0), act.input(0))
            .unwrap_or_else(|e| panic!("connect failed at depth {i}: {e}"));
        prev = act;
    }
    let output = net.add_output_layer(0, Some("out"));
    net.connect(prev.output(0), output.input(0))
        .expect("final connect");
    net
}

fn bench_build_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chain");
    for depth in [16, 128, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| build_chain(depth));
        });
    }
    group.finish();
}

fn bench_topological_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_order");
    for depth in [16, 128, 1024] {
        let net = build_chain(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| net.graph().topological_order().expect("chain is acyclic"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_chain, bench_topological_order);
criterion_main!(benches);
