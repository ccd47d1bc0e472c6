// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor descriptors and constant tensors.

use crate::{DType, Shape, TensorDescError};
use std::fmt;

/// The immutable (shape, element type) value describing data on a graph edge.
///
/// A `TensorInfo` says nothing about where the data lives — it is pure
/// metadata, propagated along connections during shape inference and later
/// consumed by backends when allocating handles and building workloads.
/// Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TensorInfo {
    shape: Shape,
    dtype: DType,
}

impl TensorInfo {
    /// Creates a descriptor from a shape and element type.
    pub fn new(shape: Shape, dtype: DType) -> Self {
        Self { shape, dtype }
    }

    /// Returns the shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the memory footprint in bytes.
    pub fn num_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }
}

impl fmt::Display for TensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.shape, self.dtype)
    }
}

/// An immutable tensor value: descriptor plus owned data.
///
/// Used for weights and per-layer parameters attached at construction time
/// (convolution filters, batch-normalization statistics, and so on). The
/// buffer is raw bytes so any [`DType`] can be carried; [`ConstTensor::from_f32`]
/// covers the common case.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConstTensor {
    info: TensorInfo,
    data: Vec<u8>,
}

impl ConstTensor {
    /// Creates a constant tensor from raw bytes.
    ///
    /// Fails with [`TensorDescError::DataLengthMismatch`] when the buffer
    /// length disagrees with the descriptor.
    pub fn new(info: TensorInfo, data: Vec<u8>) -> Result<Self, TensorDescError> {
        let expected = info.num_bytes();
        if data.len() != expected {
            return Err(TensorDescError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { info, data })
    }

    /// Creates an F32 constant tensor from a value slice.
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorDescError> {
        let info = TensorInfo::new(shape, DType::F32);
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(info, data)
    }

    /// Creates a zero-filled constant tensor with the given descriptor.
    pub fn zeroed(info: TensorInfo) -> Self {
        let data = vec![0u8; info.num_bytes()];
        Self { info, data }
    }

    /// Returns the descriptor.
    pub fn info(&self) -> &TensorInfo {
        &self.info
    }

    /// Returns the raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
