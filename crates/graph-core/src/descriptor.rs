// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator-specific parameter values ("descriptors").
//!
//! A subset of layer kinds is parameterized by an immutable descriptor
//! attached at construction time. Descriptors carry no tensor data — weights
//! travel separately as [`tensor_desc::ConstTensor`] values.

use crate::GraphError;

/// The nonlinearity applied by an activation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    TanH,
    Linear,
    ReLu,
    BoundedReLu,
    SoftReLu,
    LeakyReLu,
    Abs,
    Sqrt,
    Square,
}

/// Parameters for an activation layer.
///
/// `alpha` and `beta` are interpreted per function (e.g. the upper bound for
/// `BoundedReLu`, the slope for `LeakyReLu`); unused for the others.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActivationDescriptor {
    pub function: ActivationFunction,
    pub alpha: f32,
    pub beta: f32,
}

impl Default for ActivationDescriptor {
    fn default() -> Self {
        Self {
            function: ActivationFunction::Sigmoid,
            alpha: 0.0,
            beta: 0.0,
        }
    }
}

/// Parameters for a softmax layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SoftmaxDescriptor {
    /// Exponentiation scale applied to the input.
    pub beta: f32,
}

impl Default for SoftmaxDescriptor {
    fn default() -> Self {
        Self { beta: 1.0 }
    }
}

/// Parameters for a local-response normalization layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizationDescriptor {
    /// Width of the normalization window, in channels.
    pub norm_size: u32,
    pub alpha: f32,
    pub beta: f32,
    pub k: f32,
}

impl Default for NormalizationDescriptor {
    fn default() -> Self {
        Self {
            norm_size: 5,
            alpha: 1.0,
            beta: 0.5,
            k: 1.0,
        }
    }
}

/// The reduction applied within a pooling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PoolingAlgorithm {
    Max,
    Average,
}

/// Parameters for a 2-D pooling layer (NCHW layout).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pooling2dDescriptor {
    pub algorithm: PoolingAlgorithm,
    pub pool_width: usize,
    pub pool_height: usize,
    pub stride_x: usize,
    pub stride_y: usize,
    pub pad_left: usize,
    pub pad_right: usize,
    pub pad_top: usize,
    pub pad_bottom: usize,
}

impl Default for Pooling2dDescriptor {
    fn default() -> Self {
        Self {
            algorithm: PoolingAlgorithm::Max,
            pool_width: 1,
            pool_height: 1,
            stride_x: 1,
            stride_y: 1,
            pad_left: 0,
            pad_right: 0,
            pad_top: 0,
            pad_bottom: 0,
        }
    }
}

/// Parameters for a 2-D convolution layer (NCHW layout).
///
/// Filter weights are shaped `[out_channels, in_channels, kernel_h, kernel_w]`
/// and attached separately as a constant tensor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Convolution2dDescriptor {
    pub stride_x: usize,
    pub stride_y: usize,
    pub pad_left: usize,
    pub pad_right: usize,
    pub pad_top: usize,
    pub pad_bottom: usize,
    pub bias_enabled: bool,
}

impl Default for Convolution2dDescriptor {
    fn default() -> Self {
        Self {
            stride_x: 1,
            stride_y: 1,
            pad_left: 0,
            pad_right: 0,
            pad_top: 0,
            pad_bottom: 0,
            bias_enabled: false,
        }
    }
}

/// Parameters for a fully-connected layer.
///
/// Weights are shaped `[out_features, in_features]`; inputs of rank above 2
/// have their trailing dimensions flattened into `in_features`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FullyConnectedDescriptor {
    pub bias_enabled: bool,
}

/// Parameters for a batch-normalization layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchNormalizationDescriptor {
    /// Added to the variance for numerical stability.
    pub eps: f32,
}

impl Default for BatchNormalizationDescriptor {
    fn default() -> Self {
        Self { eps: 1e-5 }
    }
}

/// Per-view placement offsets for a merger (concatenation) layer.
///
/// Declares how many input views the merger consumes, the rank every view
/// must have, and where each view's region starts inside the merged output.
/// The merged output shape is the bounding box of all placed regions, so no
/// separate output declaration is needed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OriginsDescriptor {
    num_dims: usize,
    origins: Vec<Vec<usize>>,
}

impl OriginsDescriptor {
    /// Creates a descriptor for `num_views` views of rank `num_dims`,
    /// with every origin initially at zero.
    pub fn new(num_views: usize, num_dims: usize) -> Self {
        Self {
            num_dims,
            origins: vec![vec![0; num_dims]; num_views],
        }
    }

    /// Returns the number of input views.
    pub fn num_views(&self) -> usize {
        self.origins.len()
    }

    /// Returns the rank every view must have.
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Returns the placement offset of a view.
    pub fn view_origin(&self, view: usize) -> Option<&[usize]> {
        self.origins.get(view).map(Vec::as_slice)
    }

    /// Sets the placement offset of a view.
    pub fn set_view_origin(&mut self, view: usize, origin: Vec<usize>) -> Result<(), GraphError> {
        if origin.len() != self.num_dims {
            return Err(GraphError::InvalidDescriptor {
                detail: format!(
                    "origin for view {view} has {} coordinates, descriptor declares {} dimensions",
                    origin.len(),
                    self.num_dims,
                ),
            });
        }
        match self.origins.get_mut(view) {
            Some(slot) => {
                *slot = origin;
                Ok(())
            }
            None => Err(GraphError::InvalidDescriptor {
                detail: format!(
                    "view index {view} out of range, descriptor declares {} views",
                    self.origins.len(),
                ),
            }),
        }
    }
}

/// Per-view origins and sizes for a splitter layer.
///
/// Each view names a sub-region of the input tensor: where it starts
/// (`origin`) and its extent (`size`). The splitter produces one output slot
/// per view.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewsDescriptor {
    origins: OriginsDescriptor,
    sizes: Vec<Vec<usize>>,
}

impl ViewsDescriptor {
    /// Creates a descriptor for `num_views` views of rank `num_dims`, with
    /// all origins and sizes initially zero.
    pub fn new(num_views: usize, num_dims: usize) -> Self {
        Self {
            origins: OriginsDescriptor::new(num_views, num_dims),
            sizes: vec![vec![0; num_dims]; num_views],
        }
    }

    /// Returns the number of views.
    pub fn num_views(&self) -> usize {
        self.origins.num_views()
    }

    /// Returns the rank every view has.
    pub fn num_dims(&self) -> usize {
        self.origins.num_dims()
    }

    /// Returns where a view starts inside the input tensor.
    pub fn view_origin(&self, view: usize) -> Option<&[usize]> {
        self.origins.view_origin(view)
    }

    /// Returns the extent of a view.
    pub fn view_size(&self, view: usize) -> Option<&[usize]> {
        self.sizes.get(view).map(Vec::as_slice)
    }

    /// Sets where a view starts inside the input tensor.
    pub fn set_view_origin(&mut self, view: usize, origin: Vec<usize>) -> Result<(), GraphError> {
        self.origins.set_view_origin(view, origin)
    }

    /// Sets the extent of a view.
    pub fn set_view_size(&mut self, view: usize, size: Vec<usize>) -> Result<(), GraphError> {
        if size.len() != self.num_dims() {
            return Err(GraphError::InvalidDescriptor {
                detail: format!(
                    "size for view {view} has {} coordinates, descriptor declares {} dimensions",
                    size.len(),
                    self.num_dims(),
                ),
            });
        }
        match self.sizes.get_mut(view) {
            Some(slot) => {
                *slot = size;
                Ok(())
            }
            None => Err(GraphError::InvalidDescriptor {
                detail: format!(
                    "view index {view} out of range, descriptor declares {} views",
                    self.sizes.len(),
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_descriptor() {
        let mut d = OriginsDescriptor::new(2, 3);
        assert_eq!(d.num_views(), 2);
        assert_eq!(d.num_dims(), 3);
        assert_eq!(d.view_origin(0), Some(&[0, 0, 0][..]));

        d.set_view_origin(1, vec![0, 4, 0]).unwrap();
        assert_eq!(d.view_origin(1), Some(&[0, 4, 0][..]));
    }

    #[test]
    fn test_origins_descriptor_rejects_bad_rank() {
        let mut d = OriginsDescriptor::new(2, 3);
        assert!(matches!(
            d.set_view_origin(0, vec![1, 2]),
            Err(GraphError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_origins_descriptor_rejects_bad_view() {
        let mut d = OriginsDescriptor::new(2, 2);
        assert!(matches!(
            d.set_view_origin(5, vec![0, 0]),
            Err(GraphError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_views_descriptor() {
        let mut d = ViewsDescriptor::new(2, 2);
        d.set_view_origin(1, vec![2, 0]).unwrap();
        d.set_view_size(0, vec![2, 4]).unwrap();
        d.set_view_size(1, vec![2, 4]).unwrap();
        assert_eq!(d.view_origin(1), Some(&[2, 0][..]));
        assert_eq!(d.view_size(0), Some(&[2, 4][..]));
    }

    #[test]
    fn test_descriptor_defaults() {
        assert_eq!(SoftmaxDescriptor::default().beta, 1.0);
        assert_eq!(NormalizationDescriptor::default().norm_size, 5);
        assert_eq!(Pooling2dDescriptor::default().stride_x, 1);
        assert!(!Convolution2dDescriptor::default().bias_enabled);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut d = ViewsDescriptor::new(2, 4);
        d.set_view_origin(1, vec![0, 0, 2, 0]).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        let back: ViewsDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
