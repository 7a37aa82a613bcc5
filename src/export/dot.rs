use std::{
    fmt::Write as _,
    io::Write as _,
    path::Path,
    process::{Command, Stdio},
};

use crate::graph::{Graph, Node};

use super::ExportError;

/// The Graphviz program used to lay out the graph
pub const RENDERER: &str = "dot";

fn node_name(node: &Node) -> String {
    format!("\"{} {}\"", node.id, node.instruction)
}

/// Graphviz source with one statement per edge, nodes named `"<id> <instruction>"`
pub fn render(graph: &Graph) -> String {
    let mut out = String::from("digraph mtdv {\n");

    for node in graph.nodes() {
        // nodes without edges would otherwise vanish from the picture
        if node.edges.is_empty() && !graph.edges().any(|(_, e)| e.target == node.id) {
            let _ = writeln!(out, "    {};", node_name(node));
        }
    }

    for (from, edge) in graph.edges() {
        // `render` only sees graphs that went through the builder or `from_json`
        let (Some(source), Some(target)) = (graph.node(from), graph.node(edge.target)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\"];",
            node_name(source),
            node_name(target),
            edge.condition
        );
    }

    out.push_str("}\n");
    out
}

pub fn write(graph: &Graph, path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, render(graph))?;
    Ok(())
}

/// Pipe the graph through `dot -Tpng`
pub fn render_png(graph: &Graph, path: &Path) -> Result<(), ExportError> {
    let mut child = Command::new(RENDERER)
        .arg("-Tpng")
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(render(graph).as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(ExportError::Renderer {
            program: RENDERER.to_string(),
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::build, lexer::tokenize};

    #[test]
    fn one_line_per_edge() {
        let graph = build(&tokenize("si (0) D } #").unwrap()).unwrap();
        assert_eq!(
            render(&graph),
            "digraph mtdv {\n\
             \x20   \"0 start\" -> \"1 if read 0\" [label=\"\"];\n\
             \x20   \"1 if read 0\" -> \"2 move right\" [label=\"true\"];\n\
             \x20   \"1 if read 0\" -> \"3 end\" [label=\"end of file\"];\n\
             \x20   \"2 move right\" -> \"1 if read 0\" [label=\"\"];\n\
             }\n"
        );
    }

    #[test]
    fn parallel_edges_are_kept() {
        let graph = build(&tokenize("boucle G fin } #").unwrap()).unwrap();
        let out = render(&graph);
        assert!(out.contains("\"2 move left\" -> \"1 loop\" [label=\"break\"];"));
        assert!(out.contains("\"2 move left\" -> \"1 loop\" [label=\"continue\"];"));
    }

    #[test]
    fn every_node_is_named() {
        let graph = build(&tokenize("D fin #").unwrap()).unwrap();
        let out = render(&graph);
        for node in graph.nodes() {
            assert!(out.contains(&node_name(node)), "{}", node_name(node));
        }
    }
}
