// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The network builder: the construction facade over [`Graph`].
//!
//! Callers assemble a network by adding typed layers and connecting slots,
//! then hand the network to the optimizer. One `add_*_layer` method exists
//! per operator, so a layer can never be built with the wrong parameter
//! bundle. All methods return the new layer's guid; slots are addressed as
//! `guid.output(i)` / `guid.input(i)`.

use crate::descriptor::{
    ActivationDescriptor, BatchNormalizationDescriptor, Convolution2dDescriptor,
    FullyConnectedDescriptor, NormalizationDescriptor, OriginsDescriptor, Pooling2dDescriptor,
    SoftmaxDescriptor, ViewsDescriptor,
};
use crate::graph::Graph;
use crate::layer::{LayerBindingId, LayerGuid, LayerKind};
use crate::slot::{InputSlotRef, OutputSlotRef};
use crate::GraphError;
use tensor_desc::{ConstTensor, TensorInfo};

/// A network under construction. Wraps a [`Graph`] and exposes one typed
/// construction method per operator.
#[derive(Debug, Clone, Default)]
pub struct Network {
    graph: Graph,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a graph entry point bound to `binding_id`. Assign its output
    /// descriptor with [`Network::set_tensor_info`] before optimizing.
    pub fn add_input_layer(&mut self, binding_id: LayerBindingId, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Input { binding_id }, name)
    }

    /// Adds a graph exit point bound to `binding_id`.
    pub fn add_output_layer(
        &mut self,
        binding_id: LayerBindingId,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph.add_layer(LayerKind::Output { binding_id }, name)
    }

    /// Adds an activation layer.
    pub fn add_activation_layer(
        &mut self,
        desc: ActivationDescriptor,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph.add_layer(LayerKind::Activation(desc), name)
    }

    /// Adds an elementwise addition layer (two inputs, exact shape match).
    pub fn add_addition_layer(&mut self, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Addition, name)
    }

    /// Adds an elementwise multiplication layer.
    pub fn add_multiplication_layer(&mut self, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Multiplication, name)
    }

    /// Adds a softmax layer.
    pub fn add_softmax_layer(&mut self, desc: SoftmaxDescriptor, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Softmax(desc), name)
    }

    /// Adds a local-response normalization layer.
    pub fn add_normalization_layer(
        &mut self,
        desc: NormalizationDescriptor,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph.add_layer(LayerKind::Normalization(desc), name)
    }

    /// Adds a 2-D pooling layer.
    pub fn add_pooling2d_layer(
        &mut self,
        desc: Pooling2dDescriptor,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph.add_layer(LayerKind::Pooling2d(desc), name)
    }

    /// Adds a 2-D convolution layer with its filter weights and optional
    /// bias attached as constant tensors.
    pub fn add_convolution2d_layer(
        &mut self,
        desc: Convolution2dDescriptor,
        weights: ConstTensor,
        bias: Option<ConstTensor>,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph
            .add_layer(LayerKind::Convolution2d { desc, weights, bias }, name)
    }

    /// Adds a fully-connected layer with its weights and optional bias.
    pub fn add_fully_connected_layer(
        &mut self,
        desc: FullyConnectedDescriptor,
        weights: ConstTensor,
        bias: Option<ConstTensor>,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph
            .add_layer(LayerKind::FullyConnected { desc, weights, bias }, name)
    }

    /// Adds a batch-normalization layer with its per-channel statistics.
    pub fn add_batch_normalization_layer(
        &mut self,
        desc: BatchNormalizationDescriptor,
        mean: ConstTensor,
        variance: ConstTensor,
        beta: ConstTensor,
        gamma: ConstTensor,
        name: Option<&str>,
    ) -> LayerGuid {
        self.graph.add_layer(
            LayerKind::BatchNormalization {
                desc,
                mean,
                variance,
                beta,
                gamma,
            },
            name,
        )
    }

    /// Adds a splitter layer: one output slot per declared view.
    pub fn add_splitter_layer(&mut self, desc: ViewsDescriptor, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Splitter(desc), name)
    }

    /// Adds a merger (concatenation) layer: one input slot per declared view.
    pub fn add_merger_layer(&mut self, desc: OriginsDescriptor, name: Option<&str>) -> LayerGuid {
        self.graph.add_layer(LayerKind::Merger(desc), name)
    }

    /// Connects an output slot to an input slot. See [`Graph::connect`].
    pub fn connect(&mut self, from: OutputSlotRef, to: InputSlotRef) -> Result<(), GraphError> {
        self.graph.connect(from, to)
    }

    /// Removes exactly the given edge; a no-op when the edge does not exist.
    pub fn disconnect(&mut self, from: OutputSlotRef, to: InputSlotRef) {
        self.graph.disconnect(from, to)
    }

    /// Assigns the resolved descriptor on an output slot.
    pub fn set_tensor_info(
        &mut self,
        slot: OutputSlotRef,
        info: TensorInfo,
    ) -> Result<(), GraphError> {
        self.graph.set_tensor_info(slot, info)
    }

    /// Declares the descriptor an input slot expects.
    pub fn set_input_tensor_info(
        &mut self,
        slot: InputSlotRef,
        info: TensorInfo,
    ) -> Result<(), GraphError> {
        self.graph.set_input_tensor_info(slot, info)
    }

    /// Read access to the underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the underlying graph.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Logs a per-layer summary of the network at info level.
    pub fn print(&self) {
        for layer in self.graph.layers() {
            tracing::info!("{}", layer.summary());
        }
    }
}
