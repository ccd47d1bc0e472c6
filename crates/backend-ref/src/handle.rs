// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Heap-backed tensor storage shared by the CPU factories.

use graph_core::{BackendId, TensorHandle};
use tensor_desc::TensorInfo;

/// Zero-initialized heap storage sized from the descriptor.
#[derive(Debug)]
pub struct HeapTensorHandle {
    info: TensorInfo,
    backend: BackendId,
    data: Vec<u8>,
}

impl HeapTensorHandle {
    pub fn new(info: TensorInfo, backend: BackendId) -> Self {
        let data = vec![0u8; info.num_bytes()];
        Self {
            info,
            backend,
            data,
        }
    }

    /// Raw storage bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw storage bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl TensorHandle for HeapTensorHandle {
    fn info(&self) -> &TensorInfo {
        &self.info
    }

    fn backend(&self) -> BackendId {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_desc::{DType, Shape};

    #[test]
    fn test_handle_sized_from_descriptor() {
        let info = TensorInfo::new(Shape::new(vec![2, 3]), DType::F32);
        let handle = HeapTensorHandle::new(info.clone(), BackendId::CpuRef);
        assert_eq!(handle.data().len(), 24);
        assert_eq!(handle.info(), &info);
        assert_eq!(handle.backend(), BackendId::CpuRef);
    }
}
