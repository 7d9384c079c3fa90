//! Agent routing graph: nodes, fixed and conditional edges, compile and run.
//!
//! Build a [`StateGraph`], compile it into a [`CompiledStateGraph`], then `run` or
//! `stream` it over a transcript. Conditional edges take a typed [`Router`] whose keys
//! ([`RouteKey`]) are mapped to node ids or [`END`].

mod compile_error;
mod compiled;
mod logging;
mod logging_middleware;
mod node;
mod node_middleware;
mod route;
mod run_config;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_route,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeMiddleware};
pub use route::{FnRouter, RouteKey, Router};
pub use run_config::{RunConfig, DEFAULT_STEP_BUDGET};
pub use state_graph::{StateGraph, END, START};
pub use visualization::{generate_dot, generate_text};
