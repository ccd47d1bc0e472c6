// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # backend-ref
//!
//! CPU backend implementations of the `graph-core` capability seam:
//!
//! - [`RefWorkloadFactory`] — the portable reference backend (`CpuRef`),
//!   which supports every operator and serves as the fallback of last
//!   resort in a device policy.
//! - [`NeonWorkloadFactory`] — the accelerated backend (`CpuAcc`), limited
//!   to `f32` tensors and a restricted operator set.
//!
//! Both allocate plain heap storage via [`HeapTensorHandle`].

mod accel;
mod handle;
mod reference;

pub use accel::{NeonWorkload, NeonWorkloadFactory};
pub use handle::HeapTensorHandle;
pub use reference::{RefWorkload, RefWorkloadFactory};
