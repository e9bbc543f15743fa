// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree mutation and action binding.
//!
//! These cover invariant violations that callers can provoke through the
//! public API. Each failing operation leaves all state untouched. Stale
//! handles are not reported here; they panic at the point of use.

use core::fmt;

use crate::node::NodeId;

/// Errors from [`SceneTree`](crate::node::SceneTree) topology operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The child is already attached to a parent.
    AlreadyParented {
        /// The node that was being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Attaching would make a node its own ancestor.
    Cycle {
        /// The requested parent.
        parent: NodeId,
        /// The requested child, which is the parent itself or one of its ancestors.
        child: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyParented { child, parent } => {
                write!(f, "{child:?} already has a parent ({parent:?})")
            }
            Self::Cycle { parent, child } => {
                write!(f, "adding {child:?} under {parent:?} would create a cycle")
            }
        }
    }
}

impl core::error::Error for TreeError {}

/// Errors from [`Action`](crate::action::Action) binding and construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// The action (or one of its children) is already bound to a node.
    AlreadyBound {
        /// The node the action is bound to.
        target: NodeId,
    },
    /// The action has no well-defined reverse (absolute `To` tweens).
    Irreversible,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound { target } => {
                write!(f, "action is already bound to {target:?}; clone it to reuse")
            }
            Self::Irreversible => f.write_str("action cannot be reversed"),
        }
    }
}

impl core::error::Error for ActionError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_nodes() {
        let a = NodeId {
            idx: 1,
            generation: 0,
        };
        let b = NodeId {
            idx: 2,
            generation: 3,
        };
        let msg = TreeError::AlreadyParented {
            child: a,
            parent: b,
        }
        .to_string();
        assert_eq!(msg, "NodeId(1@gen0) already has a parent (NodeId(2@gen3))");
        assert_eq!(
            ActionError::Irreversible.to_string(),
            "action cannot be reversed"
        );
    }
}
