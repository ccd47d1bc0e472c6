// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # net-optimizer
//!
//! Lowers a [`graph_core::Network`] to an [`OptimizedNetwork`] ready for
//! workload creation, against an ordered backend preference list.
//!
//! [`optimize`] never mutates its input: it deep-clones the graph (layer
//! guids are preserved, so introspection output stays comparable across the
//! boundary) and runs four passes in a fixed order:
//!
//! 1. structural validation — all inputs wired, no orphan layers;
//! 2. shape inference — every slot descriptor resolved topologically;
//! 3. backend assignment — first supporting backend in policy order;
//! 4. copy-adapter insertion — a `Copy` layer spliced into every edge
//!    crossing a backend boundary.
//!
//! # Example
//! ```ignore
//! use backend_ref::{NeonWorkloadFactory, RefWorkloadFactory};
//! use net_optimizer::{optimize, DevicePolicy};
//!
//! let policy = DevicePolicy::new()
//!     .prefer(Box::new(NeonWorkloadFactory::new()))
//!     .prefer(Box::new(RefWorkloadFactory::new()));
//! let optimized = optimize(&network, &policy)?;
//! let workloads = optimized.create_workloads(&policy)?;
//! ```

mod error;
mod passes;
mod policy;

pub use error::OptimizeError;
pub use passes::{assign_backends, infer_shapes, insert_copy_layers, validate_structure};
pub use policy::DevicePolicy;

use graph_core::{
    serialize_to_dot, Graph, GraphError, Network, Operator, TensorHandles, Workload,
    WorkloadFactory,
};
use std::io::Write;

/// Runs the full pass pipeline over a copy of the network's graph.
///
/// The input network is left untouched. Every layer in the result carries a
/// backend assignment and fully resolved slot descriptors; edges between
/// layers on different backends go through spliced `Copy` adapters.
pub fn optimize(network: &Network, policy: &DevicePolicy) -> Result<OptimizedNetwork, OptimizeError> {
    if policy.is_empty() {
        return Err(OptimizeError::EmptyPolicy);
    }
    if network.graph().num_layers() == 0 {
        return Err(OptimizeError::EmptyNetwork);
    }
    tracing::info!(
        layers = network.graph().num_layers(),
        backends = ?policy.backends(),
        "optimizing network",
    );

    let mut graph = network.graph().clone();
    validate_structure(&graph)?;
    infer_shapes(&mut graph)?;
    assign_backends(&mut graph, policy)?;
    let adapters = insert_copy_layers(&mut graph)?;
    if !adapters.is_empty() {
        // Adapters have unresolved output descriptors until re-inferred.
        infer_shapes(&mut graph)?;
        tracing::info!(count = adapters.len(), "inserted copy adapters");
    }

    Ok(OptimizedNetwork { graph })
}

/// The result of [`optimize`]: a graph with resolved shapes and backend
/// assignments, ready to be turned into tensor handles and workloads.
#[derive(Debug, Clone)]
pub struct OptimizedNetwork {
    graph: Graph,
}

impl OptimizedNetwork {
    /// Read access to the optimized graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Writes the optimized graph in Graphviz dot format.
    pub fn serialize_to_dot<W: Write>(&self, writer: &mut W) -> Result<(), GraphError> {
        serialize_to_dot(&self.graph, writer)
    }

    fn factory_for<'a>(
        &self,
        policy: &'a DevicePolicy,
        layer: &graph_core::Layer,
    ) -> Result<&'a dyn WorkloadFactory, OptimizeError> {
        layer
            .backend()
            .and_then(|backend| policy.factory(backend))
            .ok_or_else(|| OptimizeError::UnsupportedOperator {
                layer: layer.ident(),
                operator: layer.operator(),
            })
    }

    /// Allocates one tensor handle per output slot, each from the factory of
    /// the producing layer's backend.
    pub fn create_tensor_handles(
        &self,
        policy: &DevicePolicy,
    ) -> Result<TensorHandles, OptimizeError> {
        let mut handles = TensorHandles::new();
        for layer in self.graph.layers() {
            if layer.num_output_slots() == 0 {
                continue;
            }
            let factory = self.factory_for(policy, layer)?;
            for (slot, handle) in layer.create_tensor_handles(factory)?.into_iter().enumerate() {
                handles.insert(layer.guid().output(slot), handle);
            }
        }
        Ok(handles)
    }

    /// Builds one workload per compute layer, in topological order. Graph
    /// boundary layers (`Input`, `Output`) produce no workload.
    pub fn create_workloads(
        &self,
        policy: &DevicePolicy,
    ) -> Result<Vec<Box<dyn Workload>>, OptimizeError> {
        let mut workloads = Vec::new();
        for guid in self.graph.topological_order()? {
            let layer = self
                .graph
                .layer(guid)
                .ok_or(GraphError::UnknownLayer { guid: guid.as_u64() })?;
            if matches!(layer.operator(), Operator::Input | Operator::Output) {
                continue;
            }
            let factory = self.factory_for(policy, layer)?;
            workloads.push(layer.create_workload(&self.graph, factory)?);
        }
        Ok(workloads)
    }
}
