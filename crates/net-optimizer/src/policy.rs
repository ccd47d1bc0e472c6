// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device policy: the ordered backend preference list.

use graph_core::{BackendId, WorkloadFactory};

/// An ordered list of backend capabilities, most preferred first.
///
/// Backend assignment walks the list per layer and takes the first backend
/// whose factory supports the layer's operator at its resolved shapes. A
/// policy ending in a backend that supports everything (such as the
/// reference CPU backend) can always place every layer.
#[derive(Default)]
pub struct DevicePolicy {
    factories: Vec<Box<dyn WorkloadFactory>>,
}

impl DevicePolicy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a backend at the lowest preference so far.
    pub fn prefer(mut self, factory: Box<dyn WorkloadFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// The backends in preference order.
    pub fn backends(&self) -> Vec<BackendId> {
        self.factories.iter().map(|f| f.backend()).collect()
    }

    /// Looks up the factory for a backend, if the policy carries one.
    pub fn factory(&self, backend: BackendId) -> Option<&dyn WorkloadFactory> {
        self.factories
            .iter()
            .find(|f| f.backend() == backend)
            .map(Box::as_ref)
    }

    /// Iterates factories in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn WorkloadFactory> {
        self.factories.iter().map(Box::as_ref)
    }

    /// Number of backends in the policy.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when the policy names no backends.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for DevicePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DevicePolicy").field(&self.backends()).finish()
    }
}
