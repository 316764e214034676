//! Service-backed child producers
//!
//! This module defines the `CommandSource` trait that abstracts over
//! backends supplying a branch's children at expansion time, e.g. the live
//! list of running tasks fetched from an API.

use std::sync::Arc;

use crate::tree::{BranchNode, Children, Node, ProducerError};

/// Trait for backends that produce a branch's children on demand.
///
/// Implementations are queried on every expansion of the branch they back;
/// nothing is cached in between, so results may change between keystrokes.
/// Any mutable state behind an implementation is owned and synchronized by
/// the implementation itself.
#[async_trait::async_trait]
pub trait CommandSource: Send + Sync {
    /// Produces the current children for the given branch.
    async fn children(&self, branch: &BranchNode) -> Result<Children, ProducerError>;
}

impl Node {
    /// Creates a branch node whose children are supplied by a shared
    /// [`CommandSource`]. Expansion awaits the source; its errors propagate
    /// unchanged through resolution.
    pub fn from_source(title: impl Into<String>, source: Arc<dyn CommandSource>) -> Self {
        Node::dynamic_async(title, move |branch: &BranchNode| {
            let source = source.clone();
            let branch = branch.clone();
            async move { source.children(&branch).await }
        })
    }
}
