use crate::lexer::Token;

use super::{Condition, Edge, Graph, Instruction, Node, NodeId, ParserError};

/// An open `si` or `boucle` block, holding the node that opened it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Branch(NodeId),
    Loop(NodeId),
}

/// The structural event the previous token produced,
/// it decides the condition of the next edge we add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    EnteredBranch,
    ClosedBranch,
    EnteredLoop,
    ClosedLoop,
}

impl Event {
    fn condition(event: Option<Event>) -> Condition {
        match event {
            Some(Event::EnteredBranch) => Condition::True,
            Some(Event::ClosedBranch) => Condition::False,
            Some(Event::EnteredLoop) => Condition::StartLoop,
            Some(Event::ClosedLoop) => Condition::EndLoop,
            None => Condition::Always,
        }
    }
}

pub struct GraphBuilder<'a> {
    tokens: std::iter::Enumerate<std::slice::Iter<'a, Token>>,

    nodes: Vec<Node>,
    /// The node the next instruction gets linked from
    current: NodeId,
    last_event: Option<Event>,

    /// Every open block along with the index of the token that opened it
    scope_stack: Vec<(Scope, usize)>,
    /// Only the open loops, `fin` has to skip over branches
    loop_stack: Vec<NodeId>,

    terminated: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(tokens: &'a [Token]) -> GraphBuilder<'a> {
        GraphBuilder {
            tokens: tokens.iter().enumerate(),
            nodes: vec![Node::new(0, Instruction::Start)],
            current: 0,
            last_event: None,
            scope_stack: vec![],
            loop_stack: vec![],
            terminated: false,
        }
    }

    fn link(&mut self, from: NodeId, to: NodeId, condition: Condition) {
        self.nodes[from].edges.push(Edge {
            target: to,
            condition,
        });
    }

    /// Create a node and link it from `current`, `current` is left alone
    fn push_node(&mut self, instruction: Instruction, condition: Condition) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, instruction));
        self.link(self.current, id, condition);
        id
    }

    /// A plain instruction, the only thing that clears the last event
    fn instruction(&mut self, instruction: Instruction, condition: Condition) {
        self.current = self.push_node(instruction, condition);
        self.last_event = None;
    }

    fn step(&mut self, index: usize, token: &Token) -> Result<(), ParserError> {
        let condition = Event::condition(self.last_event);

        match token {
            Token::PrintState => self.instruction(Instruction::PrintState, condition),
            Token::Pause => self.instruction(Instruction::Pause, condition),
            Token::MoveLeft => self.instruction(Instruction::MoveLeft, condition),
            Token::MoveRight => self.instruction(Instruction::MoveRight, condition),
            Token::Write(symbol) => self.instruction(Instruction::write(*symbol), condition),
            Token::Loop => {
                let id = self.push_node(Instruction::Loop, condition);
                self.scope_stack.push((Scope::Loop(id), index));
                self.loop_stack.push(id);
                self.last_event = Some(Event::EnteredLoop);
                self.current = id;
            }
            Token::Branch(symbol) => {
                let id = self.push_node(Instruction::if_read(*symbol), condition);
                self.scope_stack.push((Scope::Branch(id), index));
                self.last_event = Some(Event::EnteredBranch);
                self.current = id;
            }
            // `current` stays where it is in both cases
            Token::Break => match self.loop_stack.last() {
                Some(&loop_id) => self.link(self.current, loop_id, Condition::Break),
                None => {
                    self.push_node(Instruction::Finish, Condition::ProgramFinished);
                }
            },
            Token::Close => match self.scope_stack.pop() {
                Some((Scope::Branch(id), _)) => {
                    self.last_event = Some(Event::ClosedBranch);
                    if self.current != id {
                        self.link(self.current, id, condition);
                    }
                    self.current = id;
                }
                Some((Scope::Loop(id), _)) => {
                    self.loop_stack.pop();
                    self.link(self.current, id, Condition::Continue);
                    self.current = id;
                    self.last_event = Some(Event::ClosedLoop);
                }
                None => return Err(ParserError::UnmatchedCloser { index }),
            },
            Token::EndOfFile => {
                self.push_node(Instruction::End, Condition::EndOfFile);
                self.terminated = true;
            }
            Token::Unknown(_) => {
                return Err(ParserError::UnknownToken {
                    index,
                    token: token.clone(),
                })
            }
        }

        Ok(())
    }

    pub fn build(mut self) -> Result<Graph, ParserError> {
        while let Some((index, token)) = self.tokens.next() {
            self.step(index, token)?;
            // anything after `#` is ignored
            if self.terminated {
                break;
            }
        }

        if !self.terminated {
            return Err(ParserError::MissingEndOfFile);
        }
        if let Some(&(_, index)) = self.scope_stack.first() {
            return Err(ParserError::UnclosedScope { index });
        }

        Ok(Graph::from_nodes(self.nodes))
    }
}

/// Build the control flow graph of a tokenized program
pub fn build(tokens: &[Token]) -> Result<Graph, ParserError> {
    GraphBuilder::new(tokens).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn graph(src: &str) -> Graph {
        build(&tokenize(src).unwrap()).unwrap()
    }

    fn error(src: &str) -> ParserError {
        build(&tokenize(src).unwrap()).unwrap_err()
    }

    fn instructions(graph: &Graph) -> Vec<Instruction> {
        graph.nodes().iter().map(|n| n.instruction).collect()
    }

    fn edges(graph: &Graph) -> Vec<(NodeId, NodeId, Condition)> {
        graph
            .edges()
            .map(|(from, edge)| (from, edge.target, edge.condition))
            .collect()
    }

    #[test]
    fn straight_line_program() {
        let g = graph("I P G D 0 1 #");
        assert_eq!(
            instructions(&g),
            vec![
                Instruction::Start,
                Instruction::PrintState,
                Instruction::Pause,
                Instruction::MoveLeft,
                Instruction::MoveRight,
                Instruction::WriteZero,
                Instruction::WriteOne,
                Instruction::End,
            ]
        );
        let expected: Vec<_> = (0..6)
            .map(|i| (i, i + 1, Condition::Always))
            .chain([(6, 7, Condition::EndOfFile)])
            .collect();
        assert_eq!(edges(&g), expected);
    }

    #[test]
    fn empty_program() {
        let g = graph("#");
        assert_eq!(instructions(&g), vec![Instruction::Start, Instruction::End]);
        assert_eq!(edges(&g), vec![(0, 1, Condition::EndOfFile)]);
    }

    #[test]
    fn branch_merges_back_into_its_node() {
        let g = graph("si (0) D } #");
        assert_eq!(
            instructions(&g),
            vec![
                Instruction::Start,
                Instruction::IfReadZero,
                Instruction::MoveRight,
                Instruction::End
            ]
        );
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::True),
                (1, 3, Condition::EndOfFile),
                (2, 1, Condition::Always),
            ]
        );
    }

    #[test]
    fn instruction_after_branch_is_false_edge() {
        let g = graph("si (1) D G } 0 #");
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::True),
                (1, 4, Condition::False),
                (2, 3, Condition::Always),
                (3, 1, Condition::Always),
                (4, 5, Condition::EndOfFile),
            ]
        );
        let false_edges = g
            .edges()
            .filter(|(_, e)| e.condition == Condition::False)
            .count();
        assert_eq!(false_edges, 1);
    }

    #[test]
    fn empty_branch_has_no_self_edge() {
        let g = graph("si (0) } D #");
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::False),
                (2, 3, Condition::EndOfFile),
            ]
        );
    }

    #[test]
    fn loop_with_break() {
        let g = graph("boucle G fin } #");
        assert_eq!(
            instructions(&g),
            vec![
                Instruction::Start,
                Instruction::Loop,
                Instruction::MoveLeft,
                Instruction::End
            ]
        );
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::StartLoop),
                (1, 3, Condition::EndOfFile),
                (2, 1, Condition::Break),
                (2, 1, Condition::Continue),
            ]
        );
        assert!(!instructions(&g).contains(&Instruction::Finish));
    }

    #[test]
    fn instruction_after_loop_is_end_loop_edge() {
        let g = graph("boucle D } P #");
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::StartLoop),
                (1, 3, Condition::EndLoop),
                (2, 1, Condition::Continue),
                (3, 4, Condition::EndOfFile),
            ]
        );
    }

    #[test]
    fn break_targets_nearest_loop_through_branches() {
        let g = graph("boucle D boucle si (1) fin } G } } #");
        // 1: outer loop, 3: inner loop, 4: branch
        let breaks: Vec<_> = edges(&g)
            .into_iter()
            .filter(|e| e.2 == Condition::Break)
            .collect();
        assert_eq!(breaks, vec![(4, 3, Condition::Break)]);
        assert_eq!(g.node(3).unwrap().instruction, Instruction::Loop);
    }

    #[test]
    fn break_outside_loop_finishes_program() {
        let g = graph("D fin G #");
        assert_eq!(
            instructions(&g),
            vec![
                Instruction::Start,
                Instruction::MoveRight,
                Instruction::Finish,
                Instruction::MoveLeft,
                Instruction::End,
            ]
        );
        // `G` is still linked from `D`, not from the finish node
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::ProgramFinished),
                (1, 3, Condition::Always),
                (3, 4, Condition::EndOfFile),
            ]
        );
    }

    #[test]
    fn break_keeps_stale_position_for_closer() {
        // `fin` does not move `current`, so the closer links the node before it
        let g = graph("si (0) D fin } #");
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 2, Condition::True),
                (1, 4, Condition::EndOfFile),
                (2, 3, Condition::ProgramFinished),
                (2, 1, Condition::Always),
            ]
        );

        let g = graph("boucle fin } #");
        assert_eq!(
            edges(&g),
            vec![
                (0, 1, Condition::Always),
                (1, 1, Condition::Break),
                (1, 1, Condition::Continue),
                (1, 2, Condition::EndOfFile),
            ]
        );
    }

    #[test]
    fn nested_closers_carry_pending_condition() {
        let g = graph("si (0) si (1) } } #");
        assert!(edges(&g).contains(&(2, 1, Condition::False)));

        let g = graph("si (0) boucle } } #");
        assert!(edges(&g).contains(&(2, 1, Condition::EndLoop)));
    }

    #[test]
    fn tokens_after_end_are_ignored() {
        let g = graph("D # G } nonsense");
        assert_eq!(g.len(), 3);
        assert_eq!(g.end_node().unwrap().id, 2);
    }

    #[test]
    fn unmatched_closer() {
        assert_eq!(error("D } #"), ParserError::UnmatchedCloser { index: 1 });
        assert_eq!(error("boucle } } #"), ParserError::UnmatchedCloser { index: 2 });
    }

    #[test]
    fn missing_end_of_file() {
        assert_eq!(error(""), ParserError::MissingEndOfFile);
        assert_eq!(error("boucle D }"), ParserError::MissingEndOfFile);
    }

    #[test]
    fn unclosed_scope() {
        assert_eq!(error("D boucle si (0) G } #"), ParserError::UnclosedScope { index: 1 });
    }

    #[test]
    fn unknown_token() {
        assert_eq!(
            error("D X #"),
            ParserError::UnknownToken {
                index: 1,
                token: Token::Unknown("X".to_string())
            }
        );
    }

    #[test]
    fn ids_are_dense() {
        let g = graph("boucle si (0) 1 D } si (1) fin } G } fin #");
        for (i, node) in g.nodes().iter().enumerate() {
            assert_eq!(node.id, i);
        }
        assert!(g.edges().all(|(_, e)| e.target < g.len()));
        let ends = g
            .nodes()
            .iter()
            .filter(|n| n.instruction == Instruction::End)
            .count();
        assert_eq!(ends, 1);
    }
}
