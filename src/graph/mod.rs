use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lexer::{Symbol, Token};

pub mod builder;

pub use builder::build;

pub type NodeId = usize;

/// What a node does once control reaches it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "print machine state")]
    PrintState,
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "move left")]
    MoveLeft,
    #[serde(rename = "move right")]
    MoveRight,
    #[serde(rename = "write 0")]
    WriteZero,
    #[serde(rename = "write 1")]
    WriteOne,
    #[serde(rename = "if read 0")]
    IfReadZero,
    #[serde(rename = "if read 1")]
    IfReadOne,
    #[serde(rename = "loop")]
    Loop,
    /// Reached by a `fin` outside of any loop
    #[serde(rename = "finish")]
    Finish,
    #[serde(rename = "end")]
    End,
}

impl Instruction {
    pub fn label(self) -> &'static str {
        match self {
            Instruction::Start => "start",
            Instruction::PrintState => "print machine state",
            Instruction::Pause => "pause",
            Instruction::MoveLeft => "move left",
            Instruction::MoveRight => "move right",
            Instruction::WriteZero => "write 0",
            Instruction::WriteOne => "write 1",
            Instruction::IfReadZero => "if read 0",
            Instruction::IfReadOne => "if read 1",
            Instruction::Loop => "loop",
            Instruction::Finish => "finish",
            Instruction::End => "end",
        }
    }

    pub fn write(symbol: Symbol) -> Instruction {
        match symbol {
            Symbol::Zero => Instruction::WriteZero,
            Symbol::One => Instruction::WriteOne,
        }
    }

    pub fn if_read(symbol: Symbol) -> Instruction {
        match symbol {
            Symbol::Zero => Instruction::IfReadZero,
            Symbol::One => Instruction::IfReadOne,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an edge is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    #[default]
    #[serde(rename = "")]
    Always,
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "start loop")]
    StartLoop,
    #[serde(rename = "end loop")]
    EndLoop,
    #[serde(rename = "break")]
    Break,
    #[serde(rename = "continue")]
    Continue,
    #[serde(rename = "program finished")]
    ProgramFinished,
    #[serde(rename = "end of file")]
    EndOfFile,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::Always => "",
            Condition::True => "true",
            Condition::False => "false",
            Condition::StartLoop => "start loop",
            Condition::EndLoop => "end loop",
            Condition::Break => "break",
            Condition::Continue => "continue",
            Condition::ProgramFinished => "program finished",
            Condition::EndOfFile => "end of file",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized as a `[target, condition]` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(NodeId, Condition)", into = "(NodeId, Condition)")]
pub struct Edge {
    pub target: NodeId,
    pub condition: Condition,
}

impl From<(NodeId, Condition)> for Edge {
    fn from((target, condition): (NodeId, Condition)) -> Self {
        Edge { target, condition }
    }
}

impl From<Edge> for (NodeId, Condition) {
    fn from(edge: Edge) -> Self {
        (edge.target, edge.condition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "inst")]
    pub instruction: Instruction,
    pub edges: Vec<Edge>,
}

impl Node {
    fn new(id: NodeId, instruction: Instruction) -> Self {
        Node {
            id,
            instruction,
            edges: vec![],
        }
    }
}

/// A finished control flow graph, node `0` is always the start node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Only the builder and the json reader create graphs, both uphold the id invariants
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Graph { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge along with the id of the node it leaves
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, &Edge)> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.edges.iter().map(move |edge| (node.id, edge)))
    }

    /// The node reached through the `end of file` edge
    pub fn end_node(&self) -> Option<&Node> {
        self.edges()
            .find(|(_, edge)| edge.condition == Condition::EndOfFile)
            .and_then(|(_, edge)| self.node(edge.target))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParserError {
    #[error("Unmatched `}}` (token {index:})")]
    UnmatchedCloser { index: usize },

    #[error("Block opened at token {index:} is never closed")]
    UnclosedScope { index: usize },

    #[error("Missing end of file token `#`")]
    MissingEndOfFile,

    #[error("Unknown token `{token:}` (token {index:})")]
    UnknownToken { index: usize, token: Token },
}
