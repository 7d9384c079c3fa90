//! Render a compiled graph as Graphviz DOT or plain text.

use std::fmt::Write;

use super::compiled::{CompiledStateGraph, NextEntry};
use super::{END, START};

/// (from, label, to) for every edge, START edge first, then sorted by source id.
fn edges(graph: &CompiledStateGraph) -> Vec<(String, Option<String>, String)> {
    let mut out = vec![(START.to_string(), None, graph.inner.entry.clone())];
    for id in graph.node_ids() {
        match graph.inner.next_map.get(id) {
            Some(NextEntry::Fixed(to)) => out.push((id.to_string(), None, to.clone())),
            Some(NextEntry::Conditional(edge)) => {
                for (key, to) in edge.branches() {
                    out.push((id.to_string(), Some(key), to));
                }
            }
            None => {}
        }
    }
    out
}

/// Graphviz DOT; conditional edges are dashed and labelled with their route key.
pub fn generate_dot(graph: &CompiledStateGraph) -> String {
    let mut dot = String::from("digraph {\n  rankdir=LR;\n  node [shape=box];\n\n");
    let _ = writeln!(dot, "  \"{}\" [label=\"START\", style=bold];", START);
    let _ = writeln!(dot, "  \"{}\" [label=\"END\", style=bold];", END);
    for id in graph.node_ids() {
        let _ = writeln!(dot, "  \"{}\";", id);
    }
    dot.push('\n');
    for (from, label, to) in edges(graph) {
        match label {
            Some(key) => {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\" [label=\"{}\", style=dashed];", from, to, key);
            }
            None => {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", from, to);
            }
        }
    }
    dot.push_str("}\n");
    dot
}

pub fn generate_text(graph: &CompiledStateGraph) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", graph.node_ids().join(", "));
    let _ = writeln!(text, "\nEdges:");
    for (from, label, to) in edges(graph) {
        match label {
            Some(key) => {
                let _ = writeln!(text, "  {} -[{}]-> {}", from, key, to);
            }
            None => {
                let _ = writeln!(text, "  {} -> {}", from, to);
            }
        }
    }
    text
}
