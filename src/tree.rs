//! Core command tree model
//!
//! This module contains the node types and the address-resolution logic for
//! the command tree: a lazily-expanded n-ary tree of named nodes, each either
//! an actionable leaf or a branch whose children are computed on demand
//! (statically, synchronously, or via a future).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Error produced by a branch's child producer. Propagated verbatim to the
/// caller of [`Node::resolve`]; the tree adds no retry and no fallback.
pub type ProducerError = Box<dyn std::error::Error + Send + Sync>;

/// An ordered set of child nodes, as produced by one expansion.
pub type Children = Vec<Node>;

/// The root-to-current trajectory taken while resolving an address. Always
/// non-empty; grows by one node per matched address segment.
pub type Path = Vec<Node>;

/// A leaf action. Receives the leaf itself, so a single closure can be
/// reused across many manufactured leaves.
pub type ActionFn = dyn Fn(&LeafNode) + Send + Sync;

type SyncProducer = dyn Fn(&BranchNode) -> Result<Children, ProducerError> + Send + Sync;
type AsyncProducer = dyn Fn(&BranchNode) -> BoxFuture<'static, Result<Children, ProducerError>> + Send + Sync;

/// Resolution errors
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The address could not be fully matched against the tree: either no
    /// child carried the segment's title, or a leaf was reached with
    /// segments remaining.
    #[error("bad path: no command {segment:?} under {under:?}")]
    BadPath { segment: String, under: String },

    /// A child producer failed. The inner error is the producer's own,
    /// unwrapped.
    #[error("{0}")]
    Producer(#[from] ProducerError),
}

/// A node in the command tree: an actionable leaf or an expandable branch.
///
/// Nodes are cheap to clone (a title plus shared handles) and are never
/// mutated by resolution, so dynamic producers may hand out clones freely.
#[derive(Clone)]
pub enum Node {
    Leaf(LeafNode),
    Branch(BranchNode),
}

impl Node {
    /// Creates a leaf node with the given title and action.
    pub fn leaf(
        title: impl Into<String>,
        action: impl Fn(&LeafNode) + Send + Sync + 'static,
    ) -> Self {
        Node::Leaf(LeafNode::new(title, Arc::new(action)))
    }

    /// Creates a branch node with an already-materialized child list.
    pub fn branch(title: impl Into<String>, children: Children) -> Self {
        Node::Branch(BranchNode::new(title, ChildSource::Static(Arc::new(children))))
    }

    /// Creates a branch node whose children are produced synchronously on
    /// each expansion.
    pub fn dynamic(
        title: impl Into<String>,
        producer: impl Fn(&BranchNode) -> Result<Children, ProducerError> + Send + Sync + 'static,
    ) -> Self {
        Node::Branch(BranchNode::new(title, ChildSource::Dynamic(Arc::new(producer))))
    }

    /// Creates a branch node whose children are produced by a future on
    /// each expansion. Resolution suspends at this node until the future
    /// settles.
    pub fn dynamic_async<F, Fut>(title: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&BranchNode) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Children, ProducerError>> + Send + 'static,
    {
        let producer: Arc<AsyncProducer> =
            Arc::new(move |branch: &BranchNode| producer(branch).boxed());
        Node::Branch(BranchNode::new(title, ChildSource::Async(producer)))
    }

    /// Returns the title of this node.
    pub fn title(&self) -> &str {
        match self {
            Node::Leaf(leaf) => leaf.title(),
            Node::Branch(branch) => branch.title(),
        }
    }

    /// Returns true if this node is an actionable leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns true if this node is an expandable branch.
    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    /// Returns the leaf behind this node, if it is one.
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(_) => None,
        }
    }

    /// Returns the branch behind this node, if it is one.
    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    /// Resolves an address (an ordered list of titles) against the tree
    /// rooted at this node, returning the path of nodes visited.
    ///
    /// The walk is a deterministic single pass with no backtracking: each
    /// branch along the way is expanded (suspending if its producer is
    /// asynchronous), its children are searched in order for the first one
    /// whose title equals the current segment, and the walk descends.
    /// Matching is strict equality; any normalization is the caller's job.
    ///
    /// On success the returned path starts with this node and contains one
    /// additional node per address segment; an empty address resolves to
    /// just `[self]`. If a segment fails to match, or a leaf is reached
    /// with segments remaining, resolution fails with
    /// [`ResolveError::BadPath`]. Producer failures propagate unchanged.
    ///
    /// Children are never cached between calls: re-resolving the same
    /// address re-invokes every producer along the path, exactly once each.
    pub async fn resolve<S: AsRef<str>>(&self, address: &[S]) -> Result<Path, ResolveError> {
        let mut current = self.clone();
        let mut path: Path = vec![current.clone()];
        let mut matched = 0;

        while matched < address.len() {
            let branch = match &current {
                Node::Branch(branch) => branch.clone(),
                // A leaf consumes no segments; anything left over fails below.
                Node::Leaf(_) => break,
            };

            let wanted = address[matched].as_ref();
            let children = branch.expand().await?;
            match children.into_iter().find(|child| child.title() == wanted) {
                Some(next) => {
                    path.push(next.clone());
                    current = next;
                    matched += 1;
                }
                None => break,
            }
        }

        if matched < address.len() {
            let err = ResolveError::BadPath {
                segment: address[matched].as_ref().to_string(),
                under: current.title().to_string(),
            };
            tracing::debug!(%err, "address resolution failed");
            return Err(err);
        }

        Ok(path)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => leaf.fmt(f),
            Node::Branch(branch) => branch.fmt(f),
        }
    }
}

/// A terminal, actionable node. Invoking it performs a caller-defined side
/// effect; the tree never inspects or constrains what the action does.
#[derive(Clone)]
pub struct LeafNode {
    title: String,
    action: Arc<ActionFn>,
}

impl LeafNode {
    /// Creates a leaf with the given title and shared action.
    pub fn new(title: impl Into<String>, action: Arc<ActionFn>) -> Self {
        let title = title.into();
        debug_assert!(!title.is_empty(), "node titles must be non-empty");
        Self { title, action }
    }

    /// Returns the title of this leaf.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Invokes the leaf's action, passing the leaf itself.
    pub fn invoke(&self) {
        tracing::debug!(command = %self.title, "invoking leaf action");
        self.action.as_ref()(self);
    }
}

impl fmt::Debug for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafNode")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Where a branch's children come from.
///
/// The three variants are resolved through one expansion function,
/// [`BranchNode::expand`]; callers never need to know which kind backs a
/// given branch.
#[derive(Clone)]
pub enum ChildSource {
    /// An already-materialized child list.
    Static(Arc<Children>),
    /// Children computed synchronously on each expansion.
    Dynamic(Arc<SyncProducer>),
    /// Children computed by a future on each expansion.
    Async(Arc<AsyncProducer>),
}

impl ChildSource {
    fn kind(&self) -> &'static str {
        match self {
            ChildSource::Static(_) => "static",
            ChildSource::Dynamic(_) => "dynamic",
            ChildSource::Async(_) => "async",
        }
    }
}

/// A branching node whose children are computed on demand.
#[derive(Clone)]
pub struct BranchNode {
    title: String,
    source: ChildSource,
}

impl BranchNode {
    /// Creates a branch with the given title and child source.
    pub fn new(title: impl Into<String>, source: ChildSource) -> Self {
        let title = title.into();
        debug_assert!(!title.is_empty(), "node titles must be non-empty");
        Self { title, source }
    }

    /// Returns the title of this branch.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Expands this branch's children, invoking the producer exactly once
    /// if the source is dynamic. Nothing is cached: the next expansion
    /// invokes the producer again, so child sets may reflect live state.
    ///
    /// Producer failures are returned unchanged.
    pub async fn expand(&self) -> Result<Children, ProducerError> {
        tracing::debug!(branch = %self.title, source = self.source.kind(), "expanding children");
        match &self.source {
            ChildSource::Static(children) => Ok(children.as_ref().clone()),
            ChildSource::Dynamic(producer) => producer.as_ref()(self),
            ChildSource::Async(producer) => producer.as_ref()(self).await,
        }
    }
}

impl fmt::Debug for BranchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchNode")
            .field("title", &self.title)
            .field("source", &self.source.kind())
            .finish()
    }
}
