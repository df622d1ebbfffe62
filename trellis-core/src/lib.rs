//! Trellis Core
//!
//! This crate provides the core engine for Trellis, a reactive dependency
//! graph. It implements:
//!
//! - Typed value nodes with optional read/write transforms and derivations
//! - Type-erased node handles with checked recovery
//! - Synchronous write propagation along influencer and derived edges
//! - Combinators (map, filter, fold, when, mirror) and operator sugar
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Nodes, handles, value conversion and the propagation algorithm
//! - `combinators`: Functions and operators that build new nodes from old ones
//! - `error`: The crate error type
//!
//! The engine is single-threaded. Nodes are `Rc`-based handles and are
//! neither `Send` nor `Sync`.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{combinators::fold, Node};
//!
//! let a = Node::new(10);
//! let b = Node::new(20);
//! let c = Node::new(30);
//!
//! // Create a derived value
//! let sum = fold(&[a.clone(), b.clone(), c], 0, |acc, x| acc + x);
//! assert_eq!(sum.read().unwrap(), 60);
//!
//! // Update a source; the sum follows
//! a.write(100).unwrap();
//! assert_eq!(sum.read().unwrap(), 150);
//!
//! b.write(5).unwrap();
//! assert_eq!(sum.read().unwrap(), 135);
//! ```

pub mod combinators;
pub mod error;
pub mod graph;

pub use combinators::{combine, derive_from, filter, fold, map, mirror, when, Minus, Plus, Times};
pub use error::{GraphError, Result};
pub use graph::{AnyNode, Node, NodeId, TypePair};
