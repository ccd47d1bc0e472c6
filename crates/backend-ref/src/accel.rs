// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The accelerated CPU backend.
//!
//! `CpuAcc` runs a restricted operator set over `f32` tensors only. Layers
//! it rejects are expected to fall back to a later backend in the device
//! policy, with the optimizer splicing copy adapters at the seams.

use crate::handle::HeapTensorHandle;
use graph_core::{
    BackendError, BackendId, LayerQuery, Operator, TensorHandle, Workload, WorkloadFactory,
    WorkloadRequest,
};
use tensor_desc::{DType, TensorInfo};

/// Executable unit built by the accelerated backend.
#[derive(Debug)]
pub struct NeonWorkload {
    operator: Operator,
}

impl Workload for NeonWorkload {
    fn operator(&self) -> Operator {
        self.operator
    }

    fn backend(&self) -> BackendId {
        BackendId::CpuAcc
    }
}

/// Capability for the accelerated backend.
#[derive(Debug, Default)]
pub struct NeonWorkloadFactory;

impl NeonWorkloadFactory {
    pub fn new() -> Self {
        Self
    }
}

impl WorkloadFactory for NeonWorkloadFactory {
    fn backend(&self) -> BackendId {
        BackendId::CpuAcc
    }

    fn supports(&self, query: &LayerQuery<'_>) -> bool {
        // No accelerated normalization kernels.
        if matches!(
            query.operator,
            Operator::Normalization | Operator::BatchNormalization
        ) {
            return false;
        }
        query
            .inputs
            .iter()
            .chain(query.outputs)
            .all(|info| info.dtype() == DType::F32)
    }

    fn create_tensor_handle(
        &self,
        info: &TensorInfo,
    ) -> Result<Box<dyn TensorHandle>, BackendError> {
        Ok(Box::new(HeapTensorHandle::new(info.clone(), BackendId::CpuAcc)))
    }

    fn create_workload(
        &self,
        request: &WorkloadRequest<'_>,
    ) -> Result<Box<dyn Workload>, BackendError> {
        if !self.supports(&request.query()) {
            return Err(BackendError::Unsupported {
                backend: BackendId::CpuAcc,
                operator: request.operator(),
                detail: "operator or dtype outside the accelerated set".to_string(),
            });
        }
        tracing::debug!(
            layer = request.layer.as_u64(),
            operator = %request.operator(),
            "create CpuAcc workload",
        );
        Ok(Box::new(NeonWorkload {
            operator: request.operator(),
        }))
    }
}
