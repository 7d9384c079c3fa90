//! State graph builder: nodes plus fixed and conditional edges over a transcript.
//!
//! Add nodes with `add_node`, fixed edges with `add_edge(from, to)` using [`START`] and
//! [`END`], and branches with `add_conditional_edges(source, router, path_map)`. Then
//! `compile` (optionally with a checkpointer) to get a [`CompiledStateGraph`].
//!
//! A node has exactly one of: one fixed outgoing edge, or conditional edges.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, GraphInner, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;
use crate::graph::route::{ConditionalEdge, RouteKey, Router, TypedConditionalEdge};
use crate::memory::Checkpointer;

/// Sentinel for graph entry: `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: `add_edge(last_node_id, END)` or a path map target.
pub const END: &str = "__end__";

pub struct StateGraph {
    nodes: HashMap<String, Arc<dyn Node>>,
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, Arc<dyn ConditionalEdge>>,
    middleware: Option<Arc<dyn NodeMiddleware>>,
    lenient_routes: bool,
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            middleware: None,
            lenient_routes: false,
        }
    }

    /// Wraps every node invocation of the compiled graph.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Skips the "every route key is mapped" compile check. Unmapped keys then fail at
    /// run time with `AgentError::Routing`.
    pub fn with_lenient_routes(self) -> Self {
        Self {
            lenient_routes: true,
            ..self
        }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Same as `add_edge(START, node_id)`.
    pub fn set_entry_point(&mut self, node_id: impl Into<String>) -> &mut Self {
        self.add_edge(START, node_id)
    }

    /// After `source` runs, `router` picks a key from the updated transcript; the next
    /// node is `path_map[key]` (a node id or END).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "agent",
    ///     Arc::new(FnRouter(tools_condition)),
    ///     [(ToolsCondition::Act, "tools".into()), (ToolsCondition::Stop, END.into())].into(),
    /// );
    /// ```
    pub fn add_conditional_edges<K: RouteKey>(
        &mut self,
        source: impl Into<String>,
        router: Arc<dyn Router<K>>,
        path_map: HashMap<K, String>,
    ) -> &mut Self {
        self.conditional_edges.insert(
            source.into(),
            Arc::new(TypedConditionalEdge::new(router, path_map)),
        );
        self
    }

    pub fn compile(self) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(None)
    }

    /// Compiles with a checkpointer: runs with a `thread_id` resume from and save to it.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer>>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        let known = |id: &str| self.nodes.contains_key(id);

        for (from, to) in &self.edges {
            if from != START && !known(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !known(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }

        let entries: Vec<String> = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone())
            .collect();
        let entry = match entries.as_slice() {
            [] => return Err(CompilationError::MissingStart),
            [only] if only == END => return Err(CompilationError::NodeNotFound(END.to_string())),
            [only] => only.clone(),
            _ => return Err(CompilationError::MultipleEntries(entries)),
        };

        let mut next_map: HashMap<String, NextEntry> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if next_map
                .insert(from.clone(), NextEntry::Fixed(to.clone()))
                .is_some()
            {
                return Err(CompilationError::DuplicateEdge(from.clone()));
            }
        }

        // Deterministic error reporting regardless of HashMap order.
        let sources: BTreeSet<&String> = self.conditional_edges.keys().collect();
        for source in sources {
            let edge = &self.conditional_edges[source];
            if !known(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if next_map.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(source.clone()));
            }
            for (_, target) in edge.branches() {
                if target != END && !known(&target) {
                    return Err(CompilationError::InvalidConditionalPathMap(target));
                }
            }
            if !self.lenient_routes {
                if let Some(key) = edge.unmapped_keys().into_iter().next() {
                    return Err(CompilationError::UnmappedRouteKey {
                        node: source.clone(),
                        key,
                    });
                }
            }
            next_map.insert(source.clone(), NextEntry::Conditional(Arc::clone(edge)));
        }

        let ids: BTreeSet<&String> = self.nodes.keys().collect();
        for id in ids {
            if !next_map.contains_key(id) {
                return Err(CompilationError::NoOutgoingEdge(id.clone()));
            }
        }

        let reaches_end = next_map.values().any(|e| match e {
            NextEntry::Fixed(t) => t == END,
            NextEntry::Conditional(c) => c.branches().iter().any(|(_, t)| t == END),
        });
        if !reaches_end {
            return Err(CompilationError::MissingEnd);
        }

        Ok(CompiledStateGraph::from_inner(GraphInner {
            nodes: self.nodes,
            entry,
            next_map,
            checkpointer,
            middleware: self.middleware,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::AgentError;
    use crate::graph::FnRouter;
    use crate::message::Message;
    use crate::transcript::Transcript;

    struct Noop;

    #[async_trait]
    impl Node for Noop {
        async fn run(&self, _t: &Transcript) -> Result<Vec<Message>, AgentError> {
            Ok(vec![])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Fork {
        Yes,
        No,
    }

    impl RouteKey for Fork {
        const VARIANTS: &'static [Self] = &[Fork::Yes, Fork::No];
    }

    fn always_yes(_: &Transcript) -> Fork {
        Fork::Yes
    }

    fn two_nodes() -> StateGraph {
        let mut g = StateGraph::new();
        g.add_node("a", Arc::new(Noop));
        g.add_node("b", Arc::new(Noop));
        g
    }

    /// **Scenario**: Compile fails when a node has both an outgoing edge and conditional edges.
    #[test]
    fn compile_fails_when_node_has_both_edge_and_conditional() {
        let mut g = two_nodes();
        g.set_entry_point("a");
        g.add_edge("a", "b");
        g.add_edge("b", END);
        g.add_conditional_edges(
            "a",
            Arc::new(FnRouter(always_yes)),
            [(Fork::Yes, "b".to_string()), (Fork::No, END.to_string())].into(),
        );
        assert_eq!(
            g.compile().err(),
            Some(CompilationError::NodeHasBothEdgeAndConditional("a".into()))
        );
    }

    /// **Scenario**: Compile fails when a path map target does not exist.
    #[test]
    fn compile_fails_on_invalid_path_map_target() {
        let mut g = two_nodes();
        g.set_entry_point("a");
        g.add_edge("b", END);
        g.add_conditional_edges(
            "a",
            Arc::new(FnRouter(always_yes)),
            [(Fork::Yes, "nonexistent".to_string()), (Fork::No, END.to_string())].into(),
        );
        assert_eq!(
            g.compile().err(),
            Some(CompilationError::InvalidConditionalPathMap("nonexistent".into()))
        );
    }

    /// **Scenario**: A route key missing from the path map is rejected unless routes are lenient.
    #[test]
    fn unmapped_route_key_rejected_unless_lenient() {
        let build = |lenient: bool| {
            let mut g = if lenient {
                two_nodes().with_lenient_routes()
            } else {
                two_nodes()
            };
            g.set_entry_point("a");
            g.add_edge("b", END);
            g.add_conditional_edges(
                "a",
                Arc::new(FnRouter(always_yes)),
                [(Fork::Yes, "b".to_string())].into(),
            );
            g.compile()
        };
        assert_eq!(
            build(false).err(),
            Some(CompilationError::UnmappedRouteKey {
                node: "a".into(),
                key: "No".into()
            })
        );
        assert!(build(true).is_ok());
    }

    /// **Scenario**: Entry problems: none, several, or an unknown node.
    #[test]
    fn compile_checks_entry_point() {
        let mut g = two_nodes();
        g.add_edge("a", "b");
        g.add_edge("b", END);
        assert_eq!(g.compile().err(), Some(CompilationError::MissingStart));

        let mut g = two_nodes();
        g.set_entry_point("a");
        g.set_entry_point("b");
        g.add_edge("a", END);
        g.add_edge("b", END);
        assert!(matches!(g.compile(), Err(CompilationError::MultipleEntries(_))));

        let mut g = StateGraph::new();
        g.set_entry_point("ghost");
        assert_eq!(g.compile().err(), Some(CompilationError::NodeNotFound("ghost".into())));
    }

    /// **Scenario**: A node with no outgoing edge, a node with two, and a graph with no END.
    #[test]
    fn compile_checks_outgoing_edges() {
        let mut g = two_nodes();
        g.set_entry_point("a");
        g.add_edge("a", END);
        assert_eq!(g.compile().err(), Some(CompilationError::NoOutgoingEdge("b".into())));

        let mut g = two_nodes();
        g.set_entry_point("a");
        g.add_edge("a", "b");
        g.add_edge("a", END);
        g.add_edge("b", END);
        assert_eq!(g.compile().err(), Some(CompilationError::DuplicateEdge("a".into())));

        let mut g = two_nodes();
        g.set_entry_point("a");
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        assert_eq!(g.compile().err(), Some(CompilationError::MissingEnd));
    }
}
