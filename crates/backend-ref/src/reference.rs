// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The portable reference CPU backend.
//!
//! `CpuRef` accepts every operator at every shape and dtype, so a device
//! policy ending in [`RefWorkloadFactory`] can always place every layer.
//! Workloads record what they were built for; actual kernel execution is
//! out of scope for this backend crate.

use crate::handle::HeapTensorHandle;
use graph_core::{
    BackendError, BackendId, LayerQuery, Operator, TensorHandle, Workload, WorkloadFactory,
    WorkloadRequest,
};
use tensor_desc::TensorInfo;

/// Executable unit built by the reference backend.
#[derive(Debug)]
pub struct RefWorkload {
    operator: Operator,
    inputs: Vec<TensorInfo>,
    outputs: Vec<TensorInfo>,
}

impl RefWorkload {
    /// Resolved input descriptors the workload was built for.
    pub fn inputs(&self) -> &[TensorInfo] {
        &self.inputs
    }

    /// Resolved output descriptors the workload was built for.
    pub fn outputs(&self) -> &[TensorInfo] {
        &self.outputs
    }
}

impl Workload for RefWorkload {
    fn operator(&self) -> Operator {
        self.operator
    }

    fn backend(&self) -> BackendId {
        BackendId::CpuRef
    }
}

/// Capability for the reference backend: supports everything.
#[derive(Debug, Default)]
pub struct RefWorkloadFactory;

impl RefWorkloadFactory {
    pub fn new() -> Self {
        Self
    }
}

impl WorkloadFactory for RefWorkloadFactory {
    fn backend(&self) -> BackendId {
        BackendId::CpuRef
    }

    fn supports(&self, _query: &LayerQuery<'_>) -> bool {
        true
    }

    fn create_tensor_handle(
        &self,
        info: &TensorInfo,
    ) -> Result<Box<dyn TensorHandle>, BackendError> {
        Ok(Box::new(HeapTensorHandle::new(info.clone(), BackendId::CpuRef)))
    }

    fn create_workload(
        &self,
        request: &WorkloadRequest<'_>,
    ) -> Result<Box<dyn Workload>, BackendError> {
        tracing::debug!(
            layer = request.layer.as_u64(),
            operator = %request.operator(),
            "create CpuRef workload",
        );
        Ok(Box::new(RefWorkload {
            operator: request.operator(),
            inputs: request.inputs.clone(),
            outputs: request.outputs.clone(),
        }))
    }
}
