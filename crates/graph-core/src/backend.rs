// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The backend capability seam.
//!
//! A backend is anything that can answer "can you run this operator at these
//! shapes?" and, when asked, hand back opaque tensor storage and executable
//! units. The graph core never looks inside either — [`TensorHandle`] and
//! [`Workload`] are trait objects whose concrete types live entirely in the
//! backend crate. Reference implementations live in `backend-ref`.

use crate::layer::{LayerGuid, LayerKind, Operator};
use crate::slot::OutputSlotRef;
use std::collections::BTreeMap;
use std::fmt;
use tensor_desc::TensorInfo;

/// Names a compute backend.
///
/// The set is closed at the graph-core level so backend assignments can be
/// stored and compared by value; adding a backend means adding a variant and
/// a [`WorkloadFactory`] for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BackendId {
    /// Portable reference CPU backend. Supports every operator.
    CpuRef,
    /// Accelerated CPU backend with a restricted operator and dtype set.
    CpuAcc,
    /// GPU backend.
    GpuAcc,
}

impl BackendId {
    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendId::CpuRef => "CpuRef",
            BackendId::CpuAcc => "CpuAcc",
            BackendId::GpuAcc => "GpuAcc",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by backend capabilities.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend cannot run this operator at the requested shapes.
    #[error("backend {backend} does not support {operator}: {detail}")]
    Unsupported {
        backend: BackendId,
        operator: Operator,
        detail: String,
    },

    /// A workload or handle was requested before shape inference resolved
    /// the relevant slot descriptor.
    #[error("slot {slot} of layer '{layer}' has no resolved tensor descriptor")]
    UnresolvedShape { layer: String, slot: usize },

    /// The backend failed to allocate tensor storage.
    #[error("backend {backend} allocation failed: {detail}")]
    Allocation { backend: BackendId, detail: String },
}

/// A support query: one operator at concrete input and output shapes.
///
/// Borrowed views only — queries are cheap to build and answer, and a
/// factory must not need to clone descriptors just to say no.
#[derive(Debug, Clone, Copy)]
pub struct LayerQuery<'a> {
    pub operator: Operator,
    pub inputs: &'a [TensorInfo],
    pub outputs: &'a [TensorInfo],
}

/// Everything a factory needs to build one layer's workload: the operator
/// variant with its immutable parameters, plus resolved slot descriptors.
#[derive(Debug)]
pub struct WorkloadRequest<'a> {
    pub layer: LayerGuid,
    pub name: Option<&'a str>,
    pub kind: &'a LayerKind,
    pub inputs: Vec<TensorInfo>,
    pub outputs: Vec<TensorInfo>,
}

impl WorkloadRequest<'_> {
    /// Returns the fieldless operator tag.
    pub fn operator(&self) -> Operator {
        self.kind.operator()
    }

    /// Views this request as a support query.
    pub fn query(&self) -> LayerQuery<'_> {
        LayerQuery {
            operator: self.operator(),
            inputs: &self.inputs,
            outputs: &self.outputs,
        }
    }
}

/// Opaque tensor storage owned by a backend.
pub trait TensorHandle: fmt::Debug {
    /// The descriptor this storage was allocated for.
    fn info(&self) -> &TensorInfo;

    /// The backend that owns the storage.
    fn backend(&self) -> BackendId;
}

/// An opaque executable unit for one layer on one backend.
pub trait Workload: fmt::Debug {
    /// The operator this workload executes.
    fn operator(&self) -> Operator;

    /// The backend this workload runs on.
    fn backend(&self) -> BackendId;
}

/// The capability interface one backend exposes to the graph core.
pub trait WorkloadFactory {
    /// The backend this factory builds for.
    fn backend(&self) -> BackendId;

    /// Whether this backend can run the queried operator at the queried
    /// shapes. Must be side-effect free.
    fn supports(&self, query: &LayerQuery<'_>) -> bool;

    /// Allocates tensor storage for one descriptor.
    fn create_tensor_handle(
        &self,
        info: &TensorInfo,
    ) -> Result<Box<dyn TensorHandle>, BackendError>;

    /// Builds the executable unit for one layer. Fails with
    /// [`BackendError::Unsupported`] when [`WorkloadFactory::supports`]
    /// would have answered false.
    fn create_workload(
        &self,
        request: &WorkloadRequest<'_>,
    ) -> Result<Box<dyn Workload>, BackendError>;
}

/// Tensor storage for a whole graph, keyed by producing output slot.
#[derive(Debug, Default)]
pub struct TensorHandles {
    handles: BTreeMap<(LayerGuid, usize), Box<dyn TensorHandle>>,
}

impl TensorHandles {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the handle backing one output slot, replacing any previous one.
    pub fn insert(&mut self, slot: OutputSlotRef, handle: Box<dyn TensorHandle>) {
        self.handles.insert((slot.layer, slot.slot), handle);
    }

    /// Returns the handle backing one output slot, if allocated.
    pub fn get(&self, slot: OutputSlotRef) -> Option<&dyn TensorHandle> {
        self.handles.get(&(slot.layer, slot.slot)).map(Box::as_ref)
    }

    /// Number of allocated handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when no handles have been allocated.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
