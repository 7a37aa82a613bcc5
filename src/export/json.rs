use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::graph::{Graph, Instruction};

use super::ExportError;

impl Graph {
    /// `{"nodes": [{"id": 0, "inst": "start", "edges": [[1, ""]]}, ...]}`
    pub fn to_json(&self) -> Result<String, ExportError> {
        let mut buf = vec![];
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes valid utf-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Read back a graph written by [`Graph::to_json`]
    pub fn from_json(text: &str) -> Result<Graph, ExportError> {
        let graph: Graph = serde_json::from_str(text)?;
        validate(&graph)?;
        Ok(graph)
    }
}

/// The builder guarantees these, a file on disk doesn't
fn validate(graph: &Graph) -> Result<(), ExportError> {
    match graph.node(0) {
        Some(node) if node.instruction == Instruction::Start => {}
        _ => return Err(ExportError::MissingStart),
    }

    for (position, node) in graph.nodes().iter().enumerate() {
        if node.id != position {
            return Err(ExportError::NodeIdMismatch {
                position,
                id: node.id,
            });
        }
    }

    if let Some((from, edge)) = graph.edges().find(|(_, edge)| edge.target >= graph.len()) {
        return Err(ExportError::DanglingEdge {
            from,
            target: edge.target,
        });
    }

    Ok(())
}

pub fn write(graph: &Graph, path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, graph.to_json()?)?;
    Ok(())
}

pub fn read(path: &Path) -> Result<Graph, ExportError> {
    Graph::from_json(&std::fs::read_to_string(path)?)
}
