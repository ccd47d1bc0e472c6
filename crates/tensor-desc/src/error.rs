// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor descriptor construction.

/// Errors that can occur when building descriptor values.
#[derive(Debug, thiserror::Error)]
pub enum TensorDescError {
    /// A constant tensor's data buffer does not match its descriptor.
    #[error("constant tensor data is {actual} bytes, descriptor requires {expected}")]
    DataLengthMismatch { expected: usize, actual: usize },
}
