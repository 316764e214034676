//! Command palette glue
//!
//! This module turns free-typed input into tree addresses and back: it
//! tokenizes input, resolves it against a root node, invokes the resolved
//! leaf or reports the next level of children, and computes prefix-filtered
//! suggestions for partially-typed input.

use crate::tree::{Node, ResolveError};

/// Splits typed input into address tokens on whitespace. No other
/// normalization happens here; address matching downstream is strict.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// The result of running one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input resolved to a leaf, whose action was invoked.
    Executed { command: String },
    /// The input resolved to a branch; these are its children's titles.
    Incomplete { suggestions: Vec<String> },
}

/// A command palette over a single root node.
#[derive(Debug, Clone)]
pub struct Palette {
    root: Node,
}

impl Palette {
    /// Creates a palette rooted at the given node.
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Tokenizes and resolves one line of input. A fully-resolved leaf is
    /// invoked; a fully-resolved branch yields its children as the next
    /// suggestions. Unmatched input surfaces as [`ResolveError::BadPath`].
    pub async fn run(&self, input: &str) -> Result<Outcome, ResolveError> {
        let tokens = tokenize(input);
        let path = self.root.resolve(&tokens).await?;

        match path.last() {
            Some(Node::Leaf(leaf)) => {
                leaf.invoke();
                Ok(Outcome::Executed {
                    command: tokens.join(" "),
                })
            }
            Some(Node::Branch(branch)) => {
                let children = branch.expand().await?;
                Ok(Outcome::Incomplete {
                    suggestions: children.iter().map(|c| c.title().to_string()).collect(),
                })
            }
            // resolve always returns a path that starts with the root
            None => unreachable!("resolution produced an empty path"),
        }
    }

    /// Computes suggestions for partially-typed input: all complete tokens
    /// are resolved as an address, and the children of the deepest resolved
    /// branch are filtered by case-insensitive prefix against the trailing
    /// partial token (if any). Input ending in whitespace treats the last
    /// token as complete and suggests the full next level.
    pub async fn suggestions(&self, input: &str) -> Result<Vec<String>, ResolveError> {
        let mut tokens = tokenize(input);
        let partial = if input.ends_with(char::is_whitespace) {
            String::new()
        } else {
            tokens.pop().unwrap_or_default()
        };

        let path = self.root.resolve(&tokens).await?;
        match path.last() {
            Some(Node::Branch(branch)) => {
                let children = branch.expand().await?;
                let partial = partial.to_lowercase();
                Ok(children
                    .iter()
                    .map(|c| c.title().to_string())
                    .filter(|title| title.to_lowercase().starts_with(&partial))
                    .collect())
            }
            // A leaf has nothing left to suggest.
            _ => Ok(Vec::new()),
        }
    }
}
