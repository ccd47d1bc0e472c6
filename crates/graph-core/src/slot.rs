// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Connection endpoints on layers.
//!
//! Slots never own the layers they point at. Output slots hold an ordered
//! fan-out list of [`InputSlotRef`]s; input slots hold at most one
//! back-reference to the [`OutputSlotRef`] feeding them. Both reference
//! layers by guid, which keeps the connection graph free of ownership cycles.

use crate::LayerGuid;
use tensor_desc::TensorInfo;

/// Addresses one output slot of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSlotRef {
    pub layer: LayerGuid,
    pub slot: usize,
}

/// Addresses one input slot of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputSlotRef {
    pub layer: LayerGuid,
    pub slot: usize,
}

/// An output endpoint: optional resolved descriptor plus ordered fan-out.
///
/// The descriptor is unset until assigned via `set_tensor_info` or computed
/// by shape inference. Every edge leaving the slot carries the slot's
/// descriptor; fan-out order is insertion order and positionally stable.
#[derive(Debug, Clone, Default)]
pub struct OutputSlot {
    tensor_info: Option<TensorInfo>,
    connections: Vec<InputSlotRef>,
}

impl OutputSlot {
    /// Returns the resolved descriptor, if any.
    pub fn tensor_info(&self) -> Option<&TensorInfo> {
        self.tensor_info.as_ref()
    }

    /// Returns the number of input slots this slot feeds.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns the `i`-th fan-out entry, in connection order.
    pub fn connection(&self, i: usize) -> Option<InputSlotRef> {
        self.connections.get(i).copied()
    }

    /// Returns all fan-out entries in connection order.
    pub fn connections(&self) -> &[InputSlotRef] {
        &self.connections
    }

    pub(crate) fn set_tensor_info(&mut self, info: TensorInfo) {
        self.tensor_info = Some(info);
    }

    pub(crate) fn push_connection(&mut self, target: InputSlotRef) {
        self.connections.push(target);
    }

    pub(crate) fn remove_connection(&mut self, target: InputSlotRef) {
        self.connections.retain(|c| *c != target);
    }
}

/// An input endpoint: at most one back-reference to the feeding output slot,
/// plus an optional caller-declared expected descriptor validated at connect
/// time and during inference.
#[derive(Debug, Clone, Default)]
pub struct InputSlot {
    connection: Option<OutputSlotRef>,
    expected_info: Option<TensorInfo>,
}

impl InputSlot {
    /// Returns the output slot feeding this input, if connected.
    pub fn connection(&self) -> Option<OutputSlotRef> {
        self.connection
    }

    /// Returns the caller-declared expected descriptor, if any.
    pub fn expected_info(&self) -> Option<&TensorInfo> {
        self.expected_info.as_ref()
    }

    pub(crate) fn set_connection(&mut self, source: OutputSlotRef) {
        self.connection = Some(source);
    }

    pub(crate) fn clear_connection(&mut self) {
        self.connection = None;
    }

    pub(crate) fn set_expected_info(&mut self, info: TensorInfo) {
        self.expected_info = Some(info);
    }
}
