use thiserror::Error;

use crate::graph::NodeId;

pub mod dot;
pub mod json;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO Error")]
    FileIO(
        #[from]
        std::io::Error,
    ),

    #[error("Invalid json: {0}")]
    Json(
        #[from]
        serde_json::Error,
    ),

    #[error("Node at position {position:} has id {id:}")]
    NodeIdMismatch { position: usize, id: NodeId },

    #[error("Edge from node {from:} points to missing node {target:}")]
    DanglingEdge { from: NodeId, target: NodeId },

    #[error("Graph has no start node")]
    MissingStart,

    #[error("Renderer `{program:}` failed with {status:}")]
    Renderer {
        program: String,
        status: std::process::ExitStatus,
    },
}
