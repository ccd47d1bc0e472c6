// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The optimizer passes, in the order they run.
//!
//! 1. [`validate_structure`] — every input slot connected, no orphans.
//! 2. [`infer_shapes`] — resolve all slot descriptors in topological order.
//! 3. [`assign_backends`] — first supporting backend in policy order.
//! 4. [`insert_copy_layers`] — splice adapters across mixed-backend edges.
//!
//! Each pass takes the working graph by mutable reference; the caller owns
//! sequencing and never exposes a graph that has run only some passes.

use crate::error::OptimizeError;
use crate::policy::DevicePolicy;
use graph_core::{BackendId, Graph, LayerGuid, LayerKind};

/// Rejects graphs whose connection structure cannot execute: layers with
/// disconnected input slots, and non-output layers feeding nothing.
///
/// Orphans are rejected rather than pruned, on the grounds that a layer the
/// caller added but never wired up is a construction bug, not dead weight
/// to silently drop.
pub fn validate_structure(graph: &Graph) -> Result<(), OptimizeError> {
    for layer in graph.layers() {
        for slot in 0..layer.num_input_slots() {
            let input = layer.input_slot(slot).expect("slot index in range");
            if input.connection().is_none() {
                return Err(OptimizeError::DisconnectedInput {
                    layer: layer.ident(),
                    slot,
                });
            }
        }
        if !matches!(layer.kind(), LayerKind::Output { .. }) {
            let feeds_nothing = (0..layer.num_output_slots()).all(|slot| {
                layer
                    .output_slot(slot)
                    .expect("slot index in range")
                    .num_connections()
                    == 0
            });
            if feeds_nothing {
                return Err(OptimizeError::OrphanLayer {
                    layer: layer.ident(),
                });
            }
        }
    }
    Ok(())
}

/// Resolves every slot descriptor by walking the graph in topological order
/// and applying each operator's shape contract.
///
/// Idempotent: re-running over an unchanged graph rewrites identical values.
pub fn infer_shapes(graph: &mut Graph) -> Result<(), OptimizeError> {
    for guid in graph.topological_order()? {
        graph.validate_tensor_shapes(guid)?;
    }
    Ok(())
}

/// Assigns every layer the first backend in the policy whose factory
/// supports its operator at the resolved shapes.
///
/// Requires [`infer_shapes`] to have run. Fails with
/// [`OptimizeError::UnsupportedOperator`] when no backend in the policy
/// accepts a layer.
pub fn assign_backends(graph: &mut Graph, policy: &DevicePolicy) -> Result<(), OptimizeError> {
    let mut assignments: Vec<(LayerGuid, BackendId)> = Vec::with_capacity(graph.num_layers());
    for layer in graph.layers() {
        let request = layer.workload_request(graph)?;
        let query = request.query();
        let backend = policy
            .iter()
            .find(|factory| factory.supports(&query))
            .map(|factory| factory.backend())
            .ok_or_else(|| OptimizeError::UnsupportedOperator {
                layer: layer.ident(),
                operator: layer.operator(),
            })?;
        tracing::debug!(layer = %layer.ident(), %backend, "assign backend");
        assignments.push((layer.guid(), backend));
    }
    for (guid, backend) in assignments {
        graph.set_backend(guid, backend)?;
    }
    Ok(())
}

/// Splices a `Copy` adapter into every edge whose producer and consumer are
/// assigned different backends.
///
/// The adapter inherits the consumer's backend, so the backend boundary sits
/// between the producer and the adapter. Fan-out edges are handled per edge:
/// an output feeding consumers on two other backends gets two adapters.
/// Returns the guids of the inserted adapters.
///
/// Requires [`assign_backends`] to have run: both endpoints of every edge
/// must carry a backend, else [`OptimizeError::UnassignedBackend`].
pub fn insert_copy_layers(graph: &mut Graph) -> Result<Vec<LayerGuid>, OptimizeError> {
    struct MixedEdge {
        from: graph_core::OutputSlotRef,
        to: graph_core::InputSlotRef,
        producer: BackendId,
        consumer: BackendId,
    }

    let mut mixed = Vec::new();
    for layer in graph.layers() {
        for slot in 0..layer.num_output_slots() {
            let out = layer.output_slot(slot).expect("slot index in range");
            for &target in out.connections() {
                let producer = layer.backend().ok_or_else(|| {
                    OptimizeError::UnassignedBackend {
                        layer: layer.ident(),
                    }
                })?;
                let consumer_layer = graph.layer(target.layer).expect("edge target exists");
                let consumer = consumer_layer.backend().ok_or_else(|| {
                    OptimizeError::UnassignedBackend {
                        layer: consumer_layer.ident(),
                    }
                })?;
                if consumer != producer {
                    mixed.push(MixedEdge {
                        from: layer.guid().output(slot),
                        to: target,
                        producer,
                        consumer,
                    });
                }
            }
        }
    }

    let mut inserted = Vec::with_capacity(mixed.len());
    for edge in mixed {
        let name = format!("copy_{}_to_{}", edge.producer, edge.consumer);
        graph.disconnect(edge.from, edge.to);
        let copy = graph.add_layer(LayerKind::Copy, Some(&name));
        graph.connect(edge.from, copy.input(0))?;
        graph.connect(copy.output(0), edge.to)?;
        graph.set_backend(copy, edge.consumer)?;
        tracing::debug!(
            from = %edge.from.layer, to = %edge.to.layer, adapter = %copy,
            "insert copy adapter",
        );
        inserted.push(copy);
    }
    Ok(inserted)
}
