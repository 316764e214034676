//! cmdtree library crate
//!
//! A lazily-expanded, optionally-asynchronous command tree for
//! keyboard-driven command palettes. A tree is built from actionable leaves
//! and branches whose children are materialized on demand (statically,
//! synchronously, or via a future); typed input is tokenized into an
//! address and resolved down the tree to the path of nodes visited, so a
//! palette can invoke the final action or show the next level as
//! suggestions.

pub mod cli;
pub mod menu;
pub mod palette;
pub mod source;
pub mod tree;

pub use palette::{Outcome, Palette};
pub use source::CommandSource;
pub use tree::{
    BranchNode, ChildSource, Children, LeafNode, Node, Path, ProducerError, ResolveError,
};
