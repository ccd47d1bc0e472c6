// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layers: the nodes of the compute graph.
//!
//! A [`Layer`] is one operator instance with a fixed number of input and
//! output slots, identified by a [`LayerGuid`] assigned at construction and
//! immutable thereafter. The operator set is the closed variant set
//! [`LayerKind`]; dispatch is by pattern matching, and each kind carries its
//! immutable parameters (descriptor and any constant tensors) inline.

use crate::backend::{BackendError, BackendId, TensorHandle, Workload, WorkloadFactory, WorkloadRequest};
use crate::descriptor::{
    ActivationDescriptor, BatchNormalizationDescriptor, Convolution2dDescriptor,
    FullyConnectedDescriptor, NormalizationDescriptor, OriginsDescriptor, Pooling2dDescriptor,
    SoftmaxDescriptor, ViewsDescriptor,
};
use crate::graph::Graph;
use crate::slot::{InputSlot, InputSlotRef, OutputSlot, OutputSlotRef};
use crate::GraphError;
use std::fmt;
use tensor_desc::{ConstTensor, DType, Shape, TensorInfo};

/// Identifies the network binding a graph boundary layer is attached to.
pub type LayerBindingId = u32;

/// Identity of a layer, unique within its owning graph's scope.
///
/// Guids come from a monotonically increasing counter owned by the graph,
/// never from process-global state, so independent graphs in one process
/// stay deterministic. A guid is never reused within a graph, and cloning a
/// whole graph preserves guids so introspection output stays comparable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerGuid(pub(crate) u64);

impl LayerGuid {
    /// Returns the raw numeric identity.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Addresses this layer's `slot`-th output.
    pub fn output(self, slot: usize) -> OutputSlotRef {
        OutputSlotRef { layer: self, slot }
    }

    /// Addresses this layer's `slot`-th input.
    pub fn input(self, slot: usize) -> InputSlotRef {
        InputSlotRef { layer: self, slot }
    }
}

impl fmt::Display for LayerGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The operator a layer performs, without its parameters.
///
/// Used for backend support queries and graph export labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Operator {
    Input,
    Output,
    Activation,
    Addition,
    Multiplication,
    Softmax,
    Normalization,
    Pooling2d,
    Convolution2d,
    FullyConnected,
    BatchNormalization,
    Splitter,
    Merger,
    Copy,
}

impl Operator {
    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Input => "Input",
            Operator::Output => "Output",
            Operator::Activation => "Activation",
            Operator::Addition => "Addition",
            Operator::Multiplication => "Multiplication",
            Operator::Softmax => "Softmax",
            Operator::Normalization => "Normalization",
            Operator::Pooling2d => "Pooling2d",
            Operator::Convolution2d => "Convolution2d",
            Operator::FullyConnected => "FullyConnected",
            Operator::BatchNormalization => "BatchNormalization",
            Operator::Splitter => "Splitter",
            Operator::Merger => "Merger",
            Operator::Copy => "Copy",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of operator variants, each carrying its immutable
/// parameters.
#[derive(Debug, Clone)]
pub enum LayerKind {
    /// Graph entry point. Its output descriptor is supplied by the caller
    /// through `set_tensor_info` before optimization.
    Input { binding_id: LayerBindingId },
    /// Graph exit point.
    Output { binding_id: LayerBindingId },
    Activation(ActivationDescriptor),
    Addition,
    Multiplication,
    Softmax(SoftmaxDescriptor),
    Normalization(NormalizationDescriptor),
    Pooling2d(Pooling2dDescriptor),
    Convolution2d {
        desc: Convolution2dDescriptor,
        weights: ConstTensor,
        bias: Option<ConstTensor>,
    },
    FullyConnected {
        desc: FullyConnectedDescriptor,
        weights: ConstTensor,
        bias: Option<ConstTensor>,
    },
    BatchNormalization {
        desc: BatchNormalizationDescriptor,
        mean: ConstTensor,
        variance: ConstTensor,
        beta: ConstTensor,
        gamma: ConstTensor,
    },
    Splitter(ViewsDescriptor),
    Merger(OriginsDescriptor),
    /// Backend adapter spliced in by the optimizer between layers assigned
    /// to different backends. Identity shape.
    Copy,
}

impl LayerKind {
    /// Returns the fieldless operator tag for this kind.
    pub fn operator(&self) -> Operator {
        match self {
            LayerKind::Input { .. } => Operator::Input,
            LayerKind::Output { .. } => Operator::Output,
            LayerKind::Activation(_) => Operator::Activation,
            LayerKind::Addition => Operator::Addition,
            LayerKind::Multiplication => Operator::Multiplication,
            LayerKind::Softmax(_) => Operator::Softmax,
            LayerKind::Normalization(_) => Operator::Normalization,
            LayerKind::Pooling2d(_) => Operator::Pooling2d,
            LayerKind::Convolution2d { .. } => Operator::Convolution2d,
            LayerKind::FullyConnected { .. } => Operator::FullyConnected,
            LayerKind::BatchNormalization { .. } => Operator::BatchNormalization,
            LayerKind::Splitter(_) => Operator::Splitter,
            LayerKind::Merger(_) => Operator::Merger,
            LayerKind::Copy => Operator::Copy,
        }
    }

    /// Number of input slots, fixed per kind at construction time.
    pub fn num_inputs(&self) -> usize {
        match self {
            LayerKind::Input { .. } => 0,
            LayerKind::Addition | LayerKind::Multiplication => 2,
            LayerKind::Merger(origins) => origins.num_views(),
            _ => 1,
        }
    }

    /// Number of output slots, fixed per kind at construction time.
    pub fn num_outputs(&self) -> usize {
        match self {
            LayerKind::Output { .. } => 0,
            LayerKind::Splitter(views) => views.num_views(),
            _ => 1,
        }
    }

    /// Computes the output descriptors from resolved input descriptors,
    /// according to this operator's shape contract.
    ///
    /// Pure: the same inputs always yield the same outputs, so re-running
    /// inference over an unchanged graph overwrites descriptors with equal
    /// values. `layer` is the owning layer's identity, used in errors.
    pub(crate) fn infer_outputs(
        &self,
        inputs: &[TensorInfo],
        layer: &str,
    ) -> Result<Vec<TensorInfo>, GraphError> {
        match self {
            // Boundary descriptors come from the caller, never inference.
            LayerKind::Input { .. } => Ok(vec![]),
            LayerKind::Output { .. } => Ok(vec![]),

            LayerKind::Addition | LayerKind::Multiplication => {
                let (a, b) = (&inputs[0], &inputs[1]);
                if a.dtype() != b.dtype() {
                    return Err(GraphError::TypeMismatch {
                        layer: layer.to_string(),
                        detail: format!("inputs are {} and {}", a.dtype(), b.dtype()),
                    });
                }
                // Elementwise requires exact equality; no implicit broadcast.
                if a.shape() != b.shape() {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!("elementwise inputs are {} and {}", a.shape(), b.shape()),
                    });
                }
                Ok(vec![a.clone()])
            }

            LayerKind::Activation(_)
            | LayerKind::Softmax(_)
            | LayerKind::Normalization(_)
            | LayerKind::Copy => Ok(vec![inputs[0].clone()]),

            LayerKind::BatchNormalization {
                mean,
                variance,
                beta,
                gamma,
                ..
            } => {
                let input = &inputs[0];
                if input.shape().rank() != 4 {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!("expected rank-4 NCHW input, got {}", input.shape()),
                    });
                }
                let channels = input.shape().dims()[1];
                for (name, param) in [
                    ("mean", mean),
                    ("variance", variance),
                    ("beta", beta),
                    ("gamma", gamma),
                ] {
                    if param.info().shape() != &Shape::vector(channels) {
                        return Err(GraphError::ShapeMismatch {
                            layer: layer.to_string(),
                            detail: format!(
                                "{name} parameter is {}, expected [{channels}]",
                                param.info().shape(),
                            ),
                        });
                    }
                }
                Ok(vec![input.clone()])
            }

            LayerKind::Pooling2d(desc) => {
                let input = &inputs[0];
                let dims = require_rank4(input, layer)?;
                let out_h = window_extent(
                    dims[2],
                    desc.pad_top,
                    desc.pad_bottom,
                    desc.pool_height,
                    desc.stride_y,
                    layer,
                    "pooling height",
                )?;
                let out_w = window_extent(
                    dims[3],
                    desc.pad_left,
                    desc.pad_right,
                    desc.pool_width,
                    desc.stride_x,
                    layer,
                    "pooling width",
                )?;
                Ok(vec![TensorInfo::new(
                    Shape::new(vec![dims[0], dims[1], out_h, out_w]),
                    input.dtype(),
                )])
            }

            LayerKind::Convolution2d { desc, weights, bias } => {
                let input = &inputs[0];
                let dims = require_rank4(input, layer)?;
                let w = weights.info().shape().dims();
                if w.len() != 4 {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!(
                            "filter weights must be [out, in, kh, kw], got {}",
                            weights.info().shape(),
                        ),
                    });
                }
                if w[1] != dims[1] {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!(
                            "input has {} channels, filter expects {}",
                            dims[1], w[1],
                        ),
                    });
                }
                if let Some(bias) = bias {
                    if bias.info().shape() != &Shape::vector(w[0]) {
                        return Err(GraphError::ShapeMismatch {
                            layer: layer.to_string(),
                            detail: format!(
                                "bias is {}, expected [{}]",
                                bias.info().shape(),
                                w[0],
                            ),
                        });
                    }
                }
                let out_h = window_extent(
                    dims[2],
                    desc.pad_top,
                    desc.pad_bottom,
                    w[2],
                    desc.stride_y,
                    layer,
                    "convolution height",
                )?;
                let out_w = window_extent(
                    dims[3],
                    desc.pad_left,
                    desc.pad_right,
                    w[3],
                    desc.stride_x,
                    layer,
                    "convolution width",
                )?;
                Ok(vec![TensorInfo::new(
                    Shape::new(vec![dims[0], w[0], out_h, out_w]),
                    input.dtype(),
                )])
            }

            LayerKind::FullyConnected { weights, bias, .. } => {
                let input = &inputs[0];
                if input.shape().rank() < 2 {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!("expected at least rank-2 input, got {}", input.shape()),
                    });
                }
                let batch = input.shape().dims()[0];
                let in_features: usize = input.shape().dims()[1..].iter().product();
                let w = weights.info().shape().dims();
                if w.len() != 2 || w[1] != in_features {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!(
                            "weights are {}, expected [out, {in_features}]",
                            weights.info().shape(),
                        ),
                    });
                }
                if let Some(bias) = bias {
                    if bias.info().shape() != &Shape::vector(w[0]) {
                        return Err(GraphError::ShapeMismatch {
                            layer: layer.to_string(),
                            detail: format!("bias is {}, expected [{}]", bias.info().shape(), w[0]),
                        });
                    }
                }
                Ok(vec![TensorInfo::new(
                    Shape::matrix(batch, w[0]),
                    input.dtype(),
                )])
            }

            LayerKind::Splitter(views) => {
                let input = &inputs[0];
                if input.shape().rank() != views.num_dims() {
                    return Err(GraphError::ShapeMismatch {
                        layer: layer.to_string(),
                        detail: format!(
                            "input rank {} does not match declared view rank {}",
                            input.shape().rank(),
                            views.num_dims(),
                        ),
                    });
                }
                let mut outputs = Vec::with_capacity(views.num_views());
                for view in 0..views.num_views() {
                    let origin = views.view_origin(view).expect("view index in range");
                    let size = views.view_size(view).expect("view index in range");
                    for (d, (&o, &s)) in origin.iter().zip(size).enumerate() {
                        let extent = input.shape().dims()[d];
                        if s == 0 || o + s > extent {
                            return Err(GraphError::ShapeMismatch {
                                layer: layer.to_string(),
                                detail: format!(
                                    "view {view} spans [{o}, {}) on axis {d}, input extent is {extent}",
                                    o + s,
                                ),
                            });
                        }
                    }
                    outputs.push(TensorInfo::new(Shape::new(size.to_vec()), input.dtype()));
                }
                Ok(outputs)
            }

            LayerKind::Merger(origins) => {
                if inputs.is_empty() {
                    return Err(GraphError::InvalidDescriptor {
                        detail: format!("merger '{layer}' declares zero views"),
                    });
                }
                let dtype = common_dtype(inputs, layer)?;
                let nd = origins.num_dims();
                for (i, info) in inputs.iter().enumerate() {
                    if info.shape().rank() != nd {
                        return Err(GraphError::ShapeMismatch {
                            layer: layer.to_string(),
                            detail: format!(
                                "input {i} has rank {}, descriptor declares {nd} dimensions",
                                info.shape().rank(),
                            ),
                        });
                    }
                }
                // Pairwise overlap check on the placed regions.
                for i in 0..inputs.len() {
                    for j in i + 1..inputs.len() {
                        if regions_overlap(
                            origins.view_origin(i).expect("view index in range"),
                            inputs[i].shape().dims(),
                            origins.view_origin(j).expect("view index in range"),
                            inputs[j].shape().dims(),
                        ) {
                            return Err(GraphError::ShapeMismatch {
                                layer: layer.to_string(),
                                detail: format!("views {i} and {j} overlap in the merged output"),
                            });
                        }
                    }
                }
                // Output shape is the bounding box of all placed regions.
                let mut bounds = vec![0usize; nd];
                for (i, info) in inputs.iter().enumerate() {
                    let origin = origins.view_origin(i).expect("view index in range");
                    for d in 0..nd {
                        bounds[d] = bounds[d].max(origin[d] + info.shape().dims()[d]);
                    }
                }
                Ok(vec![TensorInfo::new(Shape::new(bounds), dtype)])
            }
        }
    }
}

fn require_rank4<'a>(input: &'a TensorInfo, layer: &str) -> Result<&'a [usize], GraphError> {
    if input.shape().rank() != 4 {
        return Err(GraphError::ShapeMismatch {
            layer: layer.to_string(),
            detail: format!("expected rank-4 NCHW input, got {}", input.shape()),
        });
    }
    Ok(input.shape().dims())
}

/// Output extent of a strided window sweep over one padded axis.
fn window_extent(
    input: usize,
    pad_lo: usize,
    pad_hi: usize,
    window: usize,
    stride: usize,
    layer: &str,
    what: &str,
) -> Result<usize, GraphError> {
    let padded = input + pad_lo + pad_hi;
    if window == 0 || stride == 0 || window > padded {
        return Err(GraphError::ShapeMismatch {
            layer: layer.to_string(),
            detail: format!(
                "{what}: window {window} with stride {stride} does not fit padded extent {padded}",
            ),
        });
    }
    Ok((padded - window) / stride + 1)
}

fn common_dtype(inputs: &[TensorInfo], layer: &str) -> Result<DType, GraphError> {
    let first = inputs[0].dtype();
    for (i, info) in inputs.iter().enumerate().skip(1) {
        if info.dtype() != first {
            return Err(GraphError::TypeMismatch {
                layer: layer.to_string(),
                detail: format!("input 0 is {first}, input {i} is {}", info.dtype()),
            });
        }
    }
    Ok(first)
}

/// True when two half-open boxes `[origin, origin + size)` intersect.
fn regions_overlap(a_origin: &[usize], a_size: &[usize], b_origin: &[usize], b_size: &[usize]) -> bool {
    a_origin
        .iter()
        .zip(a_size)
        .zip(b_origin.iter().zip(b_size))
        .all(|((&ao, &asz), (&bo, &bsz))| ao < bo + bsz && bo < ao + asz)
}

/// A node in the compute graph: one operator instance.
#[derive(Debug, Clone)]
pub struct Layer {
    guid: LayerGuid,
    name: Option<String>,
    kind: LayerKind,
    pub(crate) inputs: Vec<InputSlot>,
    pub(crate) outputs: Vec<OutputSlot>,
    backend: Option<BackendId>,
}

impl Layer {
    pub(crate) fn new(guid: LayerGuid, kind: LayerKind, name: Option<&str>) -> Self {
        let inputs = vec![InputSlot::default(); kind.num_inputs()];
        let outputs = vec![OutputSlot::default(); kind.num_outputs()];
        Self {
            guid,
            name: name.map(str::to_string),
            kind,
            inputs,
            outputs,
            backend: None,
        }
    }

    /// Returns this layer's identity.
    pub fn guid(&self) -> LayerGuid {
        self.guid
    }

    /// Returns the optional human-readable name. Names have no semantic
    /// effect and need not be unique.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the operator variant and its parameters.
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    /// Returns the fieldless operator tag.
    pub fn operator(&self) -> Operator {
        self.kind.operator()
    }

    /// Returns the backend assigned by the optimizer, if any.
    pub fn backend(&self) -> Option<BackendId> {
        self.backend
    }

    pub(crate) fn set_backend(&mut self, backend: BackendId) {
        self.backend = Some(backend);
    }

    /// Number of input slots.
    pub fn num_input_slots(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output slots.
    pub fn num_output_slots(&self) -> usize {
        self.outputs.len()
    }

    /// Returns the `i`-th input slot.
    pub fn input_slot(&self, i: usize) -> Option<&InputSlot> {
        self.inputs.get(i)
    }

    /// Returns the `i`-th output slot.
    pub fn output_slot(&self, i: usize) -> Option<&OutputSlot> {
        self.outputs.get(i)
    }

    /// Identity string used in errors and logs: the name when set,
    /// otherwise operator and guid.
    pub fn ident(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}:{}", self.operator(), self.guid),
        }
    }

    /// Returns a concise one-line summary for display.
    pub fn summary(&self) -> String {
        let shapes: Vec<String> = self
            .outputs
            .iter()
            .map(|s| match s.tensor_info() {
                Some(info) => info.to_string(),
                None => "?".to_string(),
            })
            .collect();
        format!(
            "[{}] {} '{}' in={} out={} {}",
            self.guid,
            self.operator(),
            self.ident(),
            self.inputs.len(),
            self.outputs.len(),
            shapes.join(", "),
        )
    }

    /// Asks the backend capability for one tensor handle per output slot,
    /// allocated from the slot's resolved descriptor. Handle ownership
    /// passes to the caller.
    pub fn create_tensor_handles(
        &self,
        factory: &dyn WorkloadFactory,
    ) -> Result<Vec<Box<dyn TensorHandle>>, BackendError> {
        self.outputs
            .iter()
            .enumerate()
            .map(|(slot, out)| {
                let info = out.tensor_info().ok_or_else(|| BackendError::UnresolvedShape {
                    layer: self.ident(),
                    slot,
                })?;
                factory.create_tensor_handle(info)
            })
            .collect()
    }

    /// Assembles the workload request for this layer from its resolved
    /// slots. Requires every connected input's descriptor to be resolved.
    pub fn workload_request(&self, graph: &Graph) -> Result<WorkloadRequest<'_>, BackendError> {
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for (slot, input) in self.inputs.iter().enumerate() {
            let unresolved = || BackendError::UnresolvedShape {
                layer: self.ident(),
                slot,
            };
            let source = input.connection().ok_or_else(unresolved)?;
            let info = graph
                .layer(source.layer)
                .and_then(|l| l.output_slot(source.slot))
                .and_then(|s| s.tensor_info())
                .ok_or_else(unresolved)?;
            inputs.push(info.clone());
        }
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for (slot, out) in self.outputs.iter().enumerate() {
            let info = out.tensor_info().ok_or_else(|| BackendError::UnresolvedShape {
                layer: self.ident(),
                slot,
            })?;
            outputs.push(info.clone());
        }
        Ok(WorkloadRequest {
            layer: self.guid,
            name: self.name.as_deref(),
            kind: &self.kind,
            inputs,
            outputs,
        })
    }

    /// Asks the backend capability to produce the opaque executable unit for
    /// this layer's operator at its resolved shapes. Workload ownership
    /// passes to the caller; backend rejections propagate unchanged.
    pub fn create_workload(
        &self,
        graph: &Graph,
        factory: &dyn WorkloadFactory,
    ) -> Result<Box<dyn Workload>, BackendError> {
        let request = self.workload_request(graph)?;
        factory.create_workload(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_info(dims: Vec<usize>) -> TensorInfo {
        TensorInfo::new(Shape::new(dims), DType::F32)
    }

    #[test]
    fn test_arity_per_kind() {
        assert_eq!(LayerKind::Input { binding_id: 0 }.num_inputs(), 0);
        assert_eq!(LayerKind::Input { binding_id: 0 }.num_outputs(), 1);
        assert_eq!(LayerKind::Output { binding_id: 0 }.num_inputs(), 1);
        assert_eq!(LayerKind::Output { binding_id: 0 }.num_outputs(), 0);
        assert_eq!(LayerKind::Addition.num_inputs(), 2);
        assert_eq!(LayerKind::Multiplication.num_inputs(), 2);
        assert_eq!(LayerKind::Splitter(ViewsDescriptor::new(3, 2)).num_outputs(), 3);
        assert_eq!(LayerKind::Merger(OriginsDescriptor::new(3, 2)).num_inputs(), 3);
        assert_eq!(LayerKind::Copy.num_inputs(), 1);
    }

    #[test]
    fn test_elementwise_inference() {
        let a = f32_info(vec![3, 5]);
        let out = LayerKind::Addition
            .infer_outputs(&[a.clone(), a.clone()], "add")
            .unwrap();
        assert_eq!(out, vec![a]);
    }

    #[test]
    fn test_elementwise_shape_mismatch() {
        let a = f32_info(vec![3, 5]);
        let b = f32_info(vec![5, 3]);
        let err = LayerKind::Multiplication
            .infer_outputs(&[a, b], "mul")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_elementwise_type_mismatch() {
        let a = f32_info(vec![4]);
        let b = TensorInfo::new(Shape::vector(4), DType::F16);
        let err = LayerKind::Addition.infer_outputs(&[a, b], "add").unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }

    #[test]
    fn test_identity_kinds() {
        let info = f32_info(vec![2, 8]);
        for kind in [
            LayerKind::Activation(ActivationDescriptor::default()),
            LayerKind::Softmax(SoftmaxDescriptor::default()),
            LayerKind::Normalization(NormalizationDescriptor::default()),
            LayerKind::Copy,
        ] {
            let out = kind.infer_outputs(&[info.clone()], "x").unwrap();
            assert_eq!(out, vec![info.clone()]);
        }
    }

    #[test]
    fn test_pooling_inference() {
        let desc = Pooling2dDescriptor {
            pool_width: 2,
            pool_height: 2,
            stride_x: 2,
            stride_y: 2,
            ..Default::default()
        };
        let out = LayerKind::Pooling2d(desc)
            .infer_outputs(&[f32_info(vec![1, 3, 8, 8])], "pool")
            .unwrap();
        assert_eq!(out[0].shape().dims(), &[1, 3, 4, 4]);
    }

    #[test]
    fn test_pooling_window_too_large() {
        let desc = Pooling2dDescriptor {
            pool_width: 9,
            pool_height: 2,
            ..Default::default()
        };
        let err = LayerKind::Pooling2d(desc)
            .infer_outputs(&[f32_info(vec![1, 3, 8, 8])], "pool")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_convolution_inference() {
        let weights = ConstTensor::from_f32(Shape::new(vec![8, 3, 3, 3]), &[0.0; 8 * 3 * 3 * 3])
            .unwrap();
        let kind = LayerKind::Convolution2d {
            desc: Convolution2dDescriptor {
                pad_left: 1,
                pad_right: 1,
                pad_top: 1,
                pad_bottom: 1,
                ..Default::default()
            },
            weights,
            bias: None,
        };
        let out = kind
            .infer_outputs(&[f32_info(vec![1, 3, 16, 16])], "conv")
            .unwrap();
        assert_eq!(out[0].shape().dims(), &[1, 8, 16, 16]);
    }

    #[test]
    fn test_convolution_channel_mismatch() {
        let weights = ConstTensor::from_f32(Shape::new(vec![8, 4, 3, 3]), &[0.0; 8 * 4 * 3 * 3])
            .unwrap();
        let kind = LayerKind::Convolution2d {
            desc: Convolution2dDescriptor::default(),
            weights,
            bias: None,
        };
        let err = kind
            .infer_outputs(&[f32_info(vec![1, 3, 16, 16])], "conv")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_fully_connected_inference() {
        let weights = ConstTensor::from_f32(Shape::matrix(10, 64), &[0.0; 640]).unwrap();
        let kind = LayerKind::FullyConnected {
            desc: FullyConnectedDescriptor::default(),
            weights,
            bias: None,
        };
        let out = kind.infer_outputs(&[f32_info(vec![2, 64])], "fc").unwrap();
        assert_eq!(out[0].shape().dims(), &[2, 10]);

        // Trailing dimensions flatten into the feature axis.
        let weights = ConstTensor::from_f32(Shape::matrix(10, 48), &[0.0; 480]).unwrap();
        let kind = LayerKind::FullyConnected {
            desc: FullyConnectedDescriptor::default(),
            weights,
            bias: None,
        };
        let out = kind
            .infer_outputs(&[f32_info(vec![2, 3, 4, 4])], "fc")
            .unwrap();
        assert_eq!(out[0].shape().dims(), &[2, 10]);
    }

    #[test]
    fn test_batch_norm_checks_params() {
        let param = |len: usize| ConstTensor::from_f32(Shape::vector(len), &vec![0.0; len]).unwrap();
        let kind = LayerKind::BatchNormalization {
            desc: BatchNormalizationDescriptor::default(),
            mean: param(3),
            variance: param(3),
            beta: param(3),
            gamma: param(3),
        };
        let out = kind
            .infer_outputs(&[f32_info(vec![1, 3, 4, 4])], "bn")
            .unwrap();
        assert_eq!(out[0].shape().dims(), &[1, 3, 4, 4]);

        let bad = LayerKind::BatchNormalization {
            desc: BatchNormalizationDescriptor::default(),
            mean: param(2),
            variance: param(3),
            beta: param(3),
            gamma: param(3),
        };
        assert!(matches!(
            bad.infer_outputs(&[f32_info(vec![1, 3, 4, 4])], "bn"),
            Err(GraphError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_splitter_inference() {
        let mut views = ViewsDescriptor::new(2, 2);
        views.set_view_size(0, vec![2, 4]).unwrap();
        views.set_view_origin(1, vec![2, 0]).unwrap();
        views.set_view_size(1, vec![2, 4]).unwrap();
        let out = LayerKind::Splitter(views)
            .infer_outputs(&[f32_info(vec![4, 4])], "split")
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].shape().dims(), &[2, 4]);
        assert_eq!(out[1].shape().dims(), &[2, 4]);
    }

    #[test]
    fn test_splitter_view_out_of_bounds() {
        let mut views = ViewsDescriptor::new(1, 2);
        views.set_view_origin(0, vec![3, 0]).unwrap();
        views.set_view_size(0, vec![2, 4]).unwrap();
        let err = LayerKind::Splitter(views)
            .infer_outputs(&[f32_info(vec![4, 4])], "split")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_merger_bounding_box() {
        let mut origins = OriginsDescriptor::new(2, 2);
        origins.set_view_origin(1, vec![2, 0]).unwrap();
        let out = LayerKind::Merger(origins)
            .infer_outputs(&[f32_info(vec![2, 4]), f32_info(vec![2, 4])], "merge")
            .unwrap();
        assert_eq!(out[0].shape().dims(), &[4, 4]);
    }

    #[test]
    fn test_merger_overlap_rejected() {
        let mut origins = OriginsDescriptor::new(2, 2);
        origins.set_view_origin(1, vec![1, 0]).unwrap();
        let err = LayerKind::Merger(origins)
            .infer_outputs(&[f32_info(vec![2, 4]), f32_info(vec![2, 4])], "merge")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_merger_rank_mismatch() {
        let origins = OriginsDescriptor::new(2, 3);
        let err = LayerKind::Merger(origins)
            .infer_outputs(&[f32_info(vec![2, 4]), f32_info(vec![2, 4])], "merge")
            .unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_merger_zero_views_rejected() {
        let origins = OriginsDescriptor::new(0, 2);
        let err = LayerKind::Merger(origins)
            .infer_outputs(&[], "merge")
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_merger_type_mismatch() {
        let origins = OriginsDescriptor::new(2, 1);
        let err = LayerKind::Merger(origins)
            .infer_outputs(
                &[
                    f32_info(vec![2]),
                    TensorInfo::new(Shape::vector(2), DType::F16),
                ],
                "merge",
            )
            .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }

    #[test]
    fn test_inference_is_idempotent() {
        let a = f32_info(vec![4]);
        let first = LayerKind::Addition
            .infer_outputs(&[a.clone(), a.clone()], "add")
            .unwrap();
        let second = LayerKind::Addition
            .infer_outputs(&[a.clone(), a], "add")
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(format!("{}", Operator::Merger), "Merger");
        assert_eq!(format!("{}", Operator::Pooling2d), "Pooling2d");
    }
}
