// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-desc
//!
//! Value types describing the data that flows along graph edges:
//!
//! - [`Shape`] — an ordered sequence of dimension sizes.
//! - [`DType`] — the element type of a tensor.
//! - [`TensorInfo`] — the immutable (shape, element type) descriptor carried
//!   by every resolved output slot.
//! - [`ConstTensor`] — a descriptor plus owned data, for immutable weights
//!   and parameters attached to layers at construction time.
//!
//! All of these are plain values with structural equality. None of them own
//! device memory — backend tensor handles live behind the workload-factory
//! capability in `graph-core`.

mod dtype;
mod error;
mod info;
mod shape;

pub use dtype::DType;
pub use error::TensorDescError;
pub use info::{ConstTensor, TensorInfo};
pub use shape::Shape;
