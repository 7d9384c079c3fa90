//! Typed routing for conditional edges.
//!
//! A router inspects the transcript after its source node ran and returns a key; the
//! key is looked up in the edge's path map to find the next node id (or `END`).

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::transcript::Transcript;

/// A routing decision enum. `VARIANTS` lists every value so compilation can check
/// that each one has an edge.
pub trait RouteKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    const VARIANTS: &'static [Self];

    /// Label used in logs, stream events and rendered graphs.
    fn label(&self) -> String {
        format!("{:?}", self)
    }
}

/// Chooses a route key from the transcript. May call collaborators (e.g. a grader model).
#[async_trait]
pub trait Router<K: RouteKey>: Send + Sync {
    async fn route(&self, transcript: &Transcript) -> Result<K, AgentError>;
}

/// Adapts a synchronous, infallible closure into a [`Router`].
pub struct FnRouter<F>(pub F);

#[async_trait]
impl<K, F> Router<K> for FnRouter<F>
where
    K: RouteKey,
    F: Fn(&Transcript) -> K + Send + Sync,
{
    async fn route(&self, transcript: &Transcript) -> Result<K, AgentError> {
        Ok((self.0)(transcript))
    }
}

/// Outcome of evaluating a conditional edge.
pub(crate) struct Decision {
    pub key: String,
    pub target: String,
}

/// Type-erased conditional edge stored in the graph.
#[async_trait]
pub(crate) trait ConditionalEdge: Send + Sync {
    async fn decide(&self, source: &str, transcript: &Transcript) -> Result<Decision, AgentError>;

    /// (key label, target) pairs, sorted by key label.
    fn branches(&self) -> Vec<(String, String)>;

    /// Labels of keys that have no path map entry.
    fn unmapped_keys(&self) -> Vec<String>;
}

pub(crate) struct TypedConditionalEdge<K: RouteKey> {
    router: Arc<dyn Router<K>>,
    path_map: HashMap<K, String>,
}

impl<K: RouteKey> TypedConditionalEdge<K> {
    pub fn new(router: Arc<dyn Router<K>>, path_map: HashMap<K, String>) -> Self {
        Self { router, path_map }
    }
}

#[async_trait]
impl<K: RouteKey> ConditionalEdge for TypedConditionalEdge<K> {
    async fn decide(&self, source: &str, transcript: &Transcript) -> Result<Decision, AgentError> {
        let key = self.router.route(transcript).await?;
        let target = self.path_map.get(&key).ok_or_else(|| AgentError::Routing {
            node: source.to_string(),
            key: key.label(),
        })?;
        Ok(Decision {
            key: key.label(),
            target: target.clone(),
        })
    }

    fn branches(&self) -> Vec<(String, String)> {
        let mut out: Vec<_> = self
            .path_map
            .iter()
            .map(|(k, t)| (k.label(), t.clone()))
            .collect();
        out.sort();
        out
    }

    fn unmapped_keys(&self) -> Vec<String> {
        K::VARIANTS
            .iter()
            .filter(|k| !self.path_map.contains_key(k))
            .map(RouteKey::label)
            .collect()
    }
}
