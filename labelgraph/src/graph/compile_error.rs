//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the topology cannot be run: unknown node
//! ids, a missing or ambiguous entry, nodes without a way out, or conditional edges
//! whose path map does not cover every route key.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge mentions a node id that was never added (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge from START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// More than one edge from START.
    #[error("graph has more than one entry point: {0:?}")]
    MultipleEntries(Vec<String>),

    /// Nothing routes to END.
    #[error("graph must have at least one edge to END")]
    MissingEnd,

    /// A node has two fixed outgoing edges.
    #[error("node has more than one outgoing edge: {0}")]
    DuplicateEdge(String),

    /// A node has both a fixed edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A registered node has neither a fixed edge nor conditional edges.
    #[error("node has no outgoing edge: {0}")]
    NoOutgoingEdge(String),

    /// A path map value is not a node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// A route key has no entry in its path map.
    #[error("conditional edges from '{node}' do not map route key {key}")]
    UnmappedRouteKey { node: String, key: String },
}
