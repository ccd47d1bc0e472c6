// Copyright (c) 2026 Netforge Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graphviz dot export for graph introspection.
//!
//! Nodes are keyed by layer guid and labeled with the operator; edges carry
//! the producing slot's resolved shape. Because guids survive optimization,
//! exports taken before and after an optimizer run are directly comparable.

use crate::graph::Graph;
use crate::GraphError;
use std::io::Write;

/// Writes the graph in Graphviz dot format.
///
/// Nodes appear in ascending guid order, then all edges in the same order,
/// so the output is deterministic for a given graph. Edges whose producing
/// slot has no resolved descriptor are labeled `?`.
pub fn serialize_to_dot<W: Write>(graph: &Graph, writer: &mut W) -> Result<(), GraphError> {
    writeln!(writer, "digraph Optimized {{")?;
    writeln!(writer, "    node [shape=\"record\"];")?;
    writeln!(
        writer,
        "    edge [fontsize=8 fontcolor=\"blue\" fontname=\"arial-bold\"];"
    )?;
    for layer in graph.layers() {
        writeln!(
            writer,
            "    {} [label=\"{{{}}}\"];",
            layer.guid(),
            layer.operator(),
        )?;
    }
    for layer in graph.layers() {
        for slot in 0..layer.num_output_slots() {
            let out = layer
                .output_slot(slot)
                .expect("slot index from num_output_slots");
            let label = match out.tensor_info() {
                Some(info) => info.shape().to_string(),
                None => "?".to_string(),
            };
            for target in out.connections() {
                writeln!(
                    writer,
                    "    {} -> {} [label=< {} >];",
                    layer.guid(),
                    target.layer,
                    label,
                )?;
            }
        }
    }
    writeln!(writer, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;
    use tensor_desc::{DType, Shape, TensorInfo};

    #[test]
    fn test_dot_export() {
        let mut g = Graph::new();
        let input = g.add_layer(LayerKind::Input { binding_id: 0 }, Some("in"));
        let add = g.add_layer(LayerKind::Addition, Some("add"));
        let output = g.add_layer(LayerKind::Output { binding_id: 0 }, Some("out"));
        g.connect(input.output(0), add.input(0)).unwrap();
        g.connect(input.output(0), add.input(1)).unwrap();
        g.connect(add.output(0), output.input(0)).unwrap();
        g.set_tensor_info(input.output(0), TensorInfo::new(Shape::vector(4), DType::F32))
            .unwrap();
        for guid in g.topological_order().unwrap() {
            g.validate_tensor_shapes(guid).unwrap();
        }

        let mut buf = Vec::new();
        serialize_to_dot(&g, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("digraph Optimized {\n"));
        assert!(text.contains("node [shape=\"record\"];"));
        assert!(text.contains("edge [fontsize=8 fontcolor=\"blue\" fontname=\"arial-bold\"];"));
        assert!(text.contains("0 [label=\"{Input}\"];"));
        assert!(text.contains("1 [label=\"{Addition}\"];"));
        assert!(text.contains("2 [label=\"{Output}\"];"));
        // Fan-out of two produces two parallel labeled edges.
        assert_eq!(text.matches("0 -> 1 [label=< [4] >];").count(), 2);
        assert!(text.contains("1 -> 2 [label=< [4] >];"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_dot_export_unresolved_shape() {
        let mut g = Graph::new();
        let input = g.add_layer(LayerKind::Input { binding_id: 0 }, None);
        let output = g.add_layer(LayerKind::Output { binding_id: 0 }, None);
        g.connect(input.output(0), output.input(0)).unwrap();

        let mut buf = Vec::new();
        serialize_to_dot(&g, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0 -> 1 [label=< ? >];"));
    }
}
