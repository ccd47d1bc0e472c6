// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph: exclusive owner of all layers.
//!
//! Layers live in an arena keyed by [`LayerGuid`]; slots reference each other
//! by guid and slot index rather than by pointer, so clone, erase, and splice
//! are plain value rewrites with no lifetime puzzles. The guid counter is
//! owned by the graph itself — there is no process-global identity state, and
//! independent graphs in one process stay deterministic.
//!
//! Destroying the graph destroys its layers. Iteration is in ascending guid
//! order (= insertion order); [`Graph::topological_order`] computes a
//! dataflow-consistent order.

use crate::layer::{Layer, LayerGuid, LayerKind};
use crate::slot::{InputSlotRef, OutputSlotRef};
use crate::GraphError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tensor_desc::TensorInfo;

/// A compute graph: an arena of layers plus the connections between their
/// slots. The connection structure is kept acyclic by construction —
/// [`Graph::connect`] refuses edges that would close a cycle.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    layers: BTreeMap<LayerGuid, Layer>,
    next_guid: u64,
}

impl Graph {
    /// Creates an empty graph with a fresh guid sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new layer of the given kind and returns its guid.
    ///
    /// Slot counts are fixed by the kind and never change afterwards.
    pub fn add_layer(&mut self, kind: LayerKind, name: Option<&str>) -> LayerGuid {
        let guid = LayerGuid(self.next_guid);
        self.next_guid += 1;
        let layer = Layer::new(guid, kind, name);
        tracing::debug!(guid = guid.as_u64(), operator = %layer.operator(), "add layer");
        self.layers.insert(guid, layer);
        guid
    }

    /// Removes a layer, first severing every connection touching its slots.
    pub fn erase_layer(&mut self, guid: LayerGuid) -> Result<(), GraphError> {
        let layer = self.require(guid)?;

        // Collect both edge directions before mutating.
        let feeding: Vec<(OutputSlotRef, InputSlotRef)> = layer
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.connection().map(|src| (src, guid.input(i))))
            .collect();
        let fed: Vec<InputSlotRef> = layer
            .outputs
            .iter()
            .flat_map(|slot| slot.connections().iter().copied())
            .collect();

        for (src, dst) in feeding {
            self.disconnect(src, dst);
        }
        for target in fed {
            if let Some(consumer) = self.layers.get_mut(&target.layer) {
                if let Some(slot) = consumer.inputs.get_mut(target.slot) {
                    slot.clear_connection();
                }
            }
        }

        tracing::debug!(guid = guid.as_u64(), "erase layer");
        self.layers.remove(&guid);
        Ok(())
    }

    /// Returns the number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Looks up a layer by guid.
    pub fn layer(&self, guid: LayerGuid) -> Option<&Layer> {
        self.layers.get(&guid)
    }

    /// Iterates layers in ascending guid (insertion) order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    fn require(&self, guid: LayerGuid) -> Result<&Layer, GraphError> {
        self.layers
            .get(&guid)
            .ok_or(GraphError::UnknownLayer { guid: guid.as_u64() })
    }

    fn require_output(&self, slot: OutputSlotRef) -> Result<&Layer, GraphError> {
        let layer = self.require(slot.layer)?;
        if slot.slot >= layer.num_output_slots() {
            return Err(GraphError::UnknownSlot {
                layer: layer.ident(),
                kind: "output",
                slot: slot.slot,
            });
        }
        Ok(layer)
    }

    fn require_input(&self, slot: InputSlotRef) -> Result<&Layer, GraphError> {
        let layer = self.require(slot.layer)?;
        if slot.slot >= layer.num_input_slots() {
            return Err(GraphError::UnknownSlot {
                layer: layer.ident(),
                kind: "input",
                slot: slot.slot,
            });
        }
        Ok(layer)
    }

    /// Connects an output slot to an input slot.
    ///
    /// Fails with [`GraphError::InvalidConnection`] when the input slot is
    /// already bound or when the edge would create a cycle. When both
    /// endpoints already carry resolved descriptors they must match exactly
    /// ([`GraphError::ShapeMismatch`] / [`GraphError::TypeMismatch`]); the
    /// core never relaxes this to a broadcast rule.
    ///
    /// Fan-out entries are appended in call order, so callers relying on
    /// positional correspondence must connect in that order.
    pub fn connect(&mut self, from: OutputSlotRef, to: InputSlotRef) -> Result<(), GraphError> {
        let producer = self.require_output(from)?;
        let consumer = self.require_input(to)?;
        let consumer_ident = consumer.ident();

        if consumer.inputs[to.slot].connection().is_some() {
            return Err(GraphError::InvalidConnection {
                layer: consumer_ident,
                slot: to.slot,
                detail: "input slot is already connected".to_string(),
            });
        }
        if from.layer == to.layer || self.reaches(to.layer, from.layer) {
            return Err(GraphError::InvalidConnection {
                layer: consumer_ident,
                slot: to.slot,
                detail: "connection would create a cycle".to_string(),
            });
        }
        if let (Some(out_info), Some(expected)) = (
            producer.outputs[from.slot].tensor_info(),
            consumer.inputs[to.slot].expected_info(),
        ) {
            if out_info.dtype() != expected.dtype() {
                return Err(GraphError::TypeMismatch {
                    layer: consumer_ident,
                    detail: format!(
                        "connection carries {}, input expects {}",
                        out_info.dtype(),
                        expected.dtype(),
                    ),
                });
            }
            if out_info.shape() != expected.shape() {
                return Err(GraphError::ShapeMismatch {
                    layer: consumer_ident,
                    detail: format!(
                        "connection carries {}, input expects {}",
                        out_info.shape(),
                        expected.shape(),
                    ),
                });
            }
        }

        self.layers
            .get_mut(&from.layer)
            .expect("validated above")
            .outputs[from.slot]
            .push_connection(to);
        self.layers
            .get_mut(&to.layer)
            .expect("validated above")
            .inputs[to.slot]
            .set_connection(from);
        tracing::debug!(
            from = %from.layer, from_slot = from.slot,
            to = %to.layer, to_slot = to.slot,
            "connect",
        );
        Ok(())
    }

    /// Removes exactly the given edge. Silently does nothing when the edge
    /// does not exist, so disconnection can never leave an input slot
    /// ambiguously bound.
    pub fn disconnect(&mut self, from: OutputSlotRef, to: InputSlotRef) {
        let is_this_edge = self
            .layers
            .get(&to.layer)
            .and_then(|l| l.inputs.get(to.slot))
            .and_then(|s| s.connection())
            == Some(from);
        if !is_this_edge {
            return;
        }
        if let Some(producer) = self.layers.get_mut(&from.layer) {
            if let Some(slot) = producer.outputs.get_mut(from.slot) {
                slot.remove_connection(to);
            }
        }
        if let Some(consumer) = self.layers.get_mut(&to.layer) {
            if let Some(slot) = consumer.inputs.get_mut(to.slot) {
                slot.clear_connection();
            }
        }
    }

    /// Assigns (or overwrites) the resolved descriptor on an output slot.
    ///
    /// Existing fan-out edges are not re-validated here; shape inference
    /// owns that. Future `connect` calls validate against the new value.
    pub fn set_tensor_info(
        &mut self,
        slot: OutputSlotRef,
        info: TensorInfo,
    ) -> Result<(), GraphError> {
        self.require_output(slot)?;
        self.layers
            .get_mut(&slot.layer)
            .expect("validated above")
            .outputs[slot.slot]
            .set_tensor_info(info);
        Ok(())
    }

    /// Declares the descriptor an input slot expects; validated on connect
    /// and during inference.
    pub fn set_input_tensor_info(
        &mut self,
        slot: InputSlotRef,
        info: TensorInfo,
    ) -> Result<(), GraphError> {
        self.require_input(slot)?;
        self.layers
            .get_mut(&slot.layer)
            .expect("validated above")
            .inputs[slot.slot]
            .set_expected_info(info);
        Ok(())
    }

    /// Returns the resolved descriptor on an output slot, if any.
    pub fn tensor_info(&self, slot: OutputSlotRef) -> Result<Option<&TensorInfo>, GraphError> {
        Ok(self.require_output(slot)?.outputs[slot.slot].tensor_info())
    }

    /// Assigns the executing backend for a layer. Called by the optimizer
    /// during backend assignment.
    pub fn set_backend(
        &mut self,
        guid: LayerGuid,
        backend: crate::backend::BackendId,
    ) -> Result<(), GraphError> {
        self.require(guid)?;
        self.layers
            .get_mut(&guid)
            .expect("validated above")
            .set_backend(backend);
        Ok(())
    }

    /// True when `target` is reachable from `start` along connection edges.
    fn reaches(&self, start: LayerGuid, target: LayerGuid) -> bool {
        let mut stack = vec![start];
        let mut visited = BTreeSet::new();
        while let Some(guid) = stack.pop() {
            if guid == target {
                return true;
            }
            if !visited.insert(guid) {
                continue;
            }
            if let Some(layer) = self.layers.get(&guid) {
                for slot in &layer.outputs {
                    for conn in slot.connections() {
                        stack.push(conn.layer);
                    }
                }
            }
        }
        false
    }

    /// Computes a topological order of the connection graph.
    ///
    /// A layer appears only after every layer feeding one of its connected
    /// input slots. The order is deterministic: among ready layers, the
    /// lowest guid goes first. Fails with [`GraphError::CyclicGraph`] when
    /// the connections contain a cycle.
    pub fn topological_order(&self) -> Result<Vec<LayerGuid>, GraphError> {
        let mut indegree: BTreeMap<LayerGuid, usize> = self
            .layers
            .iter()
            .map(|(guid, layer)| {
                let connected = layer
                    .inputs
                    .iter()
                    .filter(|s| s.connection().is_some())
                    .count();
                (*guid, connected)
            })
            .collect();

        let mut ready: BTreeSet<LayerGuid> = indegree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(g, _)| *g)
            .collect();
        let mut order = Vec::with_capacity(self.layers.len());

        while let Some(&guid) = ready.iter().next() {
            ready.remove(&guid);
            order.push(guid);
            for slot in &self.layers[&guid].outputs {
                for conn in slot.connections() {
                    let d = indegree.get_mut(&conn.layer).expect("edge target exists");
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(conn.layer);
                    }
                }
            }
        }

        if order.len() != self.layers.len() {
            return Err(GraphError::CyclicGraph);
        }
        Ok(order)
    }

    /// Recomputes a layer's output descriptors from the resolved descriptors
    /// on its connected inputs, per the operator's shape contract.
    ///
    /// For an `Input` layer this only checks that the caller has assigned
    /// the descriptor. Fails with [`GraphError::UnassignedInputShape`] when
    /// any feeding descriptor is missing, and with the operator's own
    /// [`GraphError::ShapeMismatch`] / [`GraphError::TypeMismatch`] when the
    /// contract is violated. Re-running with unchanged inputs overwrites
    /// output descriptors with identical values.
    pub fn validate_tensor_shapes(&mut self, guid: LayerGuid) -> Result<(), GraphError> {
        let layer = self.require(guid)?;
        let ident = layer.ident();

        if matches!(layer.kind(), LayerKind::Input { .. }) {
            return if layer.outputs[0].tensor_info().is_some() {
                Ok(())
            } else {
                Err(GraphError::UnassignedInputShape {
                    layer: ident,
                    slot: 0,
                })
            };
        }

        let mut inputs = Vec::with_capacity(layer.num_input_slots());
        for (slot, input) in layer.inputs.iter().enumerate() {
            let unassigned = || GraphError::UnassignedInputShape {
                layer: ident.clone(),
                slot,
            };
            let source = input.connection().ok_or_else(unassigned)?;
            let info = self
                .layer(source.layer)
                .and_then(|l| l.output_slot(source.slot))
                .and_then(|s| s.tensor_info())
                .ok_or_else(unassigned)?;
            if let Some(expected) = input.expected_info() {
                if expected.dtype() != info.dtype() {
                    return Err(GraphError::TypeMismatch {
                        layer: ident,
                        detail: format!(
                            "input {slot} carries {}, declared expectation is {}",
                            info.dtype(),
                            expected.dtype(),
                        ),
                    });
                }
                if expected.shape() != info.shape() {
                    return Err(GraphError::ShapeMismatch {
                        layer: ident,
                        detail: format!(
                            "input {slot} carries {}, declared expectation is {}",
                            info.shape(),
                            expected.shape(),
                        ),
                    });
                }
            }
            inputs.push(info.clone());
        }

        let outputs = layer.kind().infer_outputs(&inputs, &ident)?;
        let layer = self.layers.get_mut(&guid).expect("validated above");
        debug_assert_eq!(outputs.len(), layer.num_output_slots());
        for (slot, info) in outputs.into_iter().enumerate() {
            layer.outputs[slot].set_tensor_info(info);
        }
        Ok(())
    }

    /// Clones a layer into `target`: same kind and immutable parameters,
    /// fresh guid from the target's sequence, zero connections, no backend.
    /// The caller re-wires the copy.
    pub fn clone_layer_into(
        &self,
        guid: LayerGuid,
        target: &mut Graph,
    ) -> Result<LayerGuid, GraphError> {
        let layer = self.require(guid)?;
        Ok(target.add_layer(layer.kind().clone(), layer.name()))
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph ({} layers):", self.layers.len())?;
        for layer in self.layers.values() {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}
