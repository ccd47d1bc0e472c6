// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-core
//!
//! A typed dataflow graph of neural-network operators, independent of any
//! execution backend.
//!
//! The pieces:
//!
//! - [`Network`] — the construction facade: one typed `add_*_layer` method
//!   per operator, plus slot connection.
//! - [`Graph`] — the arena owning all layers; connections are acyclic by
//!   construction and layer guids are graph-scoped and never reused.
//! - [`LayerKind`] — the closed operator set, each variant carrying its
//!   immutable parameters; shape inference is a pure function of the
//!   resolved input descriptors.
//! - [`WorkloadFactory`] — the backend capability seam: support queries,
//!   tensor handle allocation, and workload creation behind trait objects.
//! - [`serialize_to_dot`] — Graphviz export with guid-stable node keys.
//!
//! # Example
//! ```
//! use graph_core::{Network, SoftmaxDescriptor};
//! use tensor_desc::{DType, Shape, TensorInfo};
//!
//! let mut net = Network::new();
//! let input = net.add_input_layer(0, Some("in"));
//! let softmax = net.add_softmax_layer(SoftmaxDescriptor::default(), None);
//! let output = net.add_output_layer(0, Some("out"));
//! net.connect(input.output(0), softmax.input(0)).unwrap();
//! net.connect(softmax.output(0), output.input(0)).unwrap();
//! net.set_tensor_info(input.output(0), TensorInfo::new(Shape::vector(10), DType::F32))
//!     .unwrap();
//! ```

pub mod backend;
mod descriptor;
mod dot;
mod error;
pub mod graph;
mod layer;
mod network;
mod slot;

pub use backend::{
    BackendError, BackendId, LayerQuery, TensorHandle, TensorHandles, Workload, WorkloadFactory,
    WorkloadRequest,
};
pub use descriptor::{
    ActivationDescriptor, ActivationFunction, BatchNormalizationDescriptor,
    Convolution2dDescriptor, FullyConnectedDescriptor, NormalizationDescriptor,
    OriginsDescriptor, Pooling2dDescriptor, PoolingAlgorithm, SoftmaxDescriptor, ViewsDescriptor,
};
pub use dot::serialize_to_dot;
pub use error::GraphError;
pub use graph::Graph;
pub use layer::{Layer, LayerBindingId, LayerGuid, LayerKind, Operator};
pub use network::Network;
pub use slot::{InputSlot, InputSlotRef, OutputSlot, OutputSlotRef};
