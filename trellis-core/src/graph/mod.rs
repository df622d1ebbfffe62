//! Dependency Graph
//!
//! This module implements the node graph that everything else is built on.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph where:
//!
//! - Nodes are typed value cells ([`Node<In, Out>`](Node))
//! - Edges live on the upstream node and point at downstream nodes, in two
//!   flavours: *influencer* edges copy written values, *derived* edges
//!   re-run derivations
//!
//! When a node is written, the write walks both edge lists recursively and
//! synchronously. Reads never walk edges; a derived node recomputes from its
//! inputs on every read.
//!
//! # Design Decisions
//!
//! 1. Edges are stored on the nodes themselves rather than in a central
//!    registry, so a node's lifetime is plain reference counting.
//!
//! 2. Edge lists hold type-erased [`AnyNode`] handles. Every traversal step
//!    recovers the concrete type with a checked downcast.
//!
//! 3. Acyclicity is a construction discipline: combinators only ever add
//!    edges from existing nodes to the node they are creating.

mod convert;
mod handle;
mod node;
mod propagation;

pub use convert::convert;
pub use handle::{AnyNode, TypePair};
pub use node::{Node, NodeId};
