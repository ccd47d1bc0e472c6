// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph construction and shape inference.

/// Errors that can occur when building or validating a graph.
///
/// Every variant that concerns a specific layer carries that layer's
/// identity (name when set, otherwise operator and guid) so callers can
/// pinpoint the offending node without re-walking the graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A connection could not be made: the input slot is already bound,
    /// or the edge would create a cycle.
    #[error("invalid connection into '{layer}' input {slot}: {detail}")]
    InvalidConnection {
        layer: String,
        slot: usize,
        detail: String,
    },

    /// Resolved tensor shapes violate an operator's contract.
    #[error("shape mismatch at layer '{layer}': {detail}")]
    ShapeMismatch { layer: String, detail: String },

    /// Element types disagree across an operator's inputs or a connection.
    #[error("element type mismatch at layer '{layer}': {detail}")]
    TypeMismatch { layer: String, detail: String },

    /// Shape inference reached a layer whose input descriptor is unresolved,
    /// either because inference ran out of order or an input is disconnected.
    #[error("input {slot} of layer '{layer}' has no resolved tensor descriptor")]
    UnassignedInputShape { layer: String, slot: usize },

    /// The connection graph contains a cycle.
    #[error("graph contains a connection cycle")]
    CyclicGraph,

    /// A layer guid does not exist in this graph.
    #[error("no layer with guid {guid} in this graph")]
    UnknownLayer { guid: u64 },

    /// A slot index is out of range for the referenced layer.
    #[error("layer '{layer}' has no {kind} slot {slot}")]
    UnknownSlot {
        layer: String,
        kind: &'static str,
        slot: usize,
    },

    /// An operator descriptor is internally inconsistent.
    #[error("invalid descriptor: {detail}")]
    InvalidDescriptor { detail: String },

    /// Writing the textual graph export failed.
    #[error("graph export failed: {0}")]
    Export(#[from] std::io::Error),
}
