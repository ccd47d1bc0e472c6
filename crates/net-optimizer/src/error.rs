// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for network optimization.

use graph_core::{BackendError, GraphError, Operator};

/// Errors that can occur while optimizing a network.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// The network has no layers.
    #[error("cannot optimize an empty network")]
    EmptyNetwork,

    /// The device policy names no backends.
    #[error("device policy lists no backends")]
    EmptyPolicy,

    /// A layer's input slot is not connected to any producer.
    #[error("input {slot} of layer '{layer}' is not connected")]
    DisconnectedInput { layer: String, slot: usize },

    /// A non-boundary layer feeds nothing, so it can never contribute to
    /// an output.
    #[error("layer '{layer}' has no consumers and is not an output")]
    OrphanLayer { layer: String },

    /// No backend in the device policy can run the layer.
    #[error("no backend in the device policy supports layer '{layer}' ({operator})")]
    UnsupportedOperator { layer: String, operator: Operator },

    /// A pass that requires backend assignment found a layer without one.
    #[error("layer '{layer}' has no assigned backend")]
    UnassignedBackend { layer: String },

    /// A structural or shape error surfaced by the graph core.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A backend capability failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
