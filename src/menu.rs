//! Declarative menu definitions
//!
//! This module provides a serde-friendly description of static command
//! trees, so menus can arrive as JSON from configuration rather than being
//! assembled in code. Entries are validated as they are converted into
//! nodes: this is the boundary where loosely-typed data enters the tree,
//! so shape errors are rejected here instead of surfacing mid-resolution.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tree::{ActionFn, LeafNode, Node};

/// A single entry in a menu definition.
///
/// An entry with `children` becomes a branch; an entry with `action` (the
/// name of a registered action) becomes a leaf. Exactly one of the two must
/// be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Menu validation and parsing errors
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu entry has an empty title")]
    EmptyTitle,

    #[error("menu entry {title:?} has both children and an action")]
    Ambiguous { title: String },

    #[error("menu entry {title:?} has neither children nor an action")]
    Unreachable { title: String },

    #[error("menu entry {title:?} names unknown action {action:?}")]
    UnknownAction { title: String, action: String },

    #[error("failed to parse menu definition: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Named leaf actions that menu definitions can bind to.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<ActionFn>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under the given name, replacing any previous
    /// action with that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        action: impl Fn(&LeafNode) + Send + Sync + 'static,
    ) {
        self.actions.insert(name.into(), Arc::new(action));
    }

    /// Looks up a registered action by name.
    pub fn get(&self, name: &str) -> Option<Arc<ActionFn>> {
        self.actions.get(name).cloned()
    }
}

/// Converts a validated menu entry into a tree node, binding leaf entries
/// to actions from the registry.
pub fn build(entry: &MenuEntry, actions: &ActionRegistry) -> Result<Node, MenuError> {
    if entry.title.is_empty() {
        return Err(MenuError::EmptyTitle);
    }

    match (&entry.children, &entry.action) {
        (Some(_), Some(_)) => Err(MenuError::Ambiguous {
            title: entry.title.clone(),
        }),
        (None, None) => Err(MenuError::Unreachable {
            title: entry.title.clone(),
        }),
        (Some(children), None) => {
            let children = children
                .iter()
                .map(|child| build(child, actions))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::branch(entry.title.clone(), children))
        }
        (None, Some(name)) => {
            let action = actions.get(name).ok_or_else(|| MenuError::UnknownAction {
                title: entry.title.clone(),
                action: name.clone(),
            })?;
            Ok(Node::Leaf(LeafNode::new(entry.title.clone(), action)))
        }
    }
}

/// Parses a JSON menu definition and converts it into a tree node.
pub fn from_json(json: &str, actions: &ActionRegistry) -> Result<Node, MenuError> {
    let entry: MenuEntry = serde_json::from_str(json)?;
    build(&entry, actions)
}
