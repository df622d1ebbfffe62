//! Type-Erased Node Handles
//!
//! Edge lists have to hold nodes of many different `(In, Out)` pairs side by
//! side: a comparison node of type `Node<bool>` sits in the derived list of a
//! `Node<i32>`, a `map` to `String` sits next to a sum of integers, and so on.
//! [`AnyNode`] is the uniform handle stored in those lists.
//!
//! Getting a typed node back out is always checked. [`AnyNode::try_recover`]
//! returns `None` and [`AnyNode::recover_as`] returns
//! [`GraphError::TypeMismatch`] when the requested pair is not exactly the
//! node's own. The check is a `TypeId` comparison performed by
//! `Rc::downcast`; there is no unchecked path.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::debug;

use super::node::{Edges, Node, NodeId, NodeInner};
use crate::error::{GraphError, Result};

/// The runtime identity of a node's `(In, Out)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    input: TypeId,
    output: TypeId,
    input_name: &'static str,
    output_name: &'static str,
}

impl TypePair {
    pub fn of<In: 'static, Out: 'static>() -> Self {
        Self {
            input: TypeId::of::<In>(),
            output: TypeId::of::<Out>(),
            input_name: type_name::<In>(),
            output_name: type_name::<Out>(),
        }
    }

    pub fn input_name(&self) -> &'static str {
        self.input_name
    }

    pub fn output_name(&self) -> &'static str {
        self.output_name
    }

    /// Check whether this pair has the same input and output type.
    pub fn is_homogeneous(&self) -> bool {
        self.input == self.output
    }
}

impl Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.input_name, self.output_name)
    }
}

/// What every node exposes without knowing its static types.
pub(crate) trait ErasedNode {
    fn id(&self) -> NodeId;

    fn type_pair(&self) -> TypePair;

    /// Edge lists do not depend on the node's value types.
    fn edges(&self) -> &RefCell<Edges>;

    fn has_derivation(&self) -> bool;

    /// Upcast for a checked downcast to the concrete node type.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<In, Out> ErasedNode for NodeInner<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    fn id(&self) -> NodeId {
        self.id
    }

    fn type_pair(&self) -> TypePair {
        TypePair::of::<In, Out>()
    }

    fn edges(&self) -> &RefCell<Edges> {
        &self.edges
    }

    fn has_derivation(&self) -> bool {
        self.slots.borrow().derivation.is_some()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A shared reference to a node of unknown static type.
///
/// Handles compare and hash by node identity.
#[derive(Clone)]
pub struct AnyNode {
    node: Rc<dyn ErasedNode>,
}

impl AnyNode {
    pub(crate) fn from_inner<In, Out>(inner: Rc<NodeInner<In, Out>>) -> Self
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        Self { node: inner }
    }

    /// Get the node's unique ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get the node's runtime type pair.
    pub fn type_pair(&self) -> TypePair {
        self.node.type_pair()
    }

    /// Check whether the node is exactly a `Node<In, Out>`.
    pub fn is<In: 'static, Out: 'static>(&self) -> bool {
        let pair = self.type_pair();
        pair.input == TypeId::of::<In>() && pair.output == TypeId::of::<Out>()
    }

    /// Recover the typed node, or `None` if the pair does not match exactly.
    pub fn try_recover<In, Out>(&self) -> Option<Node<In, Out>>
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        Rc::clone(&self.node)
            .into_any()
            .downcast::<NodeInner<In, Out>>()
            .ok()
            .map(Node::from_inner)
    }

    /// Recover the typed node, failing with a type mismatch error if the pair
    /// does not match exactly.
    pub fn recover_as<In, Out>(&self) -> Result<Node<In, Out>>
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        self.try_recover().ok_or_else(|| GraphError::TypeMismatch {
            expected: TypePair::of::<In, Out>().to_string(),
            actual: self.type_pair().to_string(),
        })
    }

    /// Shorthand for recovering a homogeneous `Node<T>`.
    pub fn recover<T>(&self) -> Result<Node<T>>
    where
        T: Clone + 'static,
    {
        self.recover_as::<T, T>()
    }

    /// Register `target` to receive a copy of every value written here.
    ///
    /// Re-adding the same node is a no-op. During propagation only targets
    /// of the writer's own `(In, Out)` pair are written; others are skipped.
    ///
    /// This is raw wiring: unlike the combinators it can close a cycle, and
    /// writing into a cycle recurses without bound.
    pub fn add_influencer(&self, target: &AnyNode) {
        let mut edges = self.node.edges().borrow_mut();
        if !edges.influencers.contains_key(&target.id()) {
            debug!(node = %self.id(), target = %target.id(), "influencer edge added");
            edges.influencers.insert(target.id(), target.clone());
        }
    }

    /// Register `target` to have its derivation re-run after every write here.
    ///
    /// Raw wiring, with the same caveat as [`AnyNode::add_influencer`].
    pub fn add_derived(&self, target: &AnyNode) {
        debug!(node = %self.id(), target = %target.id(), "derived edge added");
        self.node.edges().borrow_mut().derived.push(target.clone());
    }

    /// Snapshot of the influencer list, in insertion order.
    pub fn influencers(&self) -> Vec<AnyNode> {
        self.node.edges().borrow().influencers.values().cloned().collect()
    }

    /// Snapshot of the derived list, in insertion order.
    pub fn derived(&self) -> Vec<AnyNode> {
        self.node.edges().borrow().derived.to_vec()
    }

    pub fn influencer_count(&self) -> usize {
        self.node.edges().borrow().influencers.len()
    }

    pub fn derived_count(&self) -> usize {
        self.node.edges().borrow().derived.len()
    }

    pub fn has_derivation(&self) -> bool {
        self.node.has_derivation()
    }

    /// Check whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl PartialEq for AnyNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for AnyNode {}

impl Hash for AnyNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Debug for AnyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyNode")
            .field("id", &self.id())
            .field("types", &self.type_pair().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_exact_pair_succeeds() {
        let node = Node::new(42);
        let handle = node.handle();

        let recovered = handle.recover_as::<i32, i32>().unwrap();
        assert_eq!(recovered.read(), Ok(42));
        assert!(recovered.ptr_eq(&node));
    }

    #[test]
    fn recover_wrong_pair_fails() {
        let handle = Node::new(42).handle();

        assert!(handle.try_recover::<String, String>().is_none());
        let err = handle.recover_as::<String, String>().unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("i32, i32"));
    }

    #[test]
    fn recover_checks_both_halves_of_the_pair() {
        let node = Node::<String, usize>::with_raw("Hello".to_string());
        node.attach_read_transform(|s: &String| s.len());
        let handle = node.handle();

        assert_eq!(handle.recover_as::<String, usize>().unwrap().read(), Ok(5));
        assert!(handle.recover_as::<usize, String>().is_err());
        assert!(handle.recover_as::<String, String>().is_err());
        assert!(handle.recover::<usize>().is_err());
    }

    #[test]
    fn recovered_node_writes_through_to_original() {
        let node = Node::new(String::from("before"));
        let recovered = node.handle().recover::<String>().unwrap();

        recovered.write("after".to_string()).unwrap();
        assert_eq!(node.read().unwrap(), "after");
    }

    #[test]
    fn type_pair_reports_names() {
        let handle = Node::<i32, f64>::with_raw(1).handle();
        let pair = handle.type_pair();

        assert!(handle.is::<i32, f64>());
        assert!(!handle.is::<f64, i32>());
        assert!(!pair.is_homogeneous());
        assert_eq!(pair.input_name(), "i32");
        assert_eq!(pair.output_name(), "f64");
        assert_eq!(pair.to_string(), "i32, f64");
    }

    #[test]
    fn wiring_through_erased_handles() {
        let source = Node::new(1);
        let target = Node::new(0);
        let (source_handle, target_handle) = (source.handle(), target.handle());

        source_handle.add_influencer(&target_handle);
        source_handle.add_influencer(&target_handle);
        source_handle.add_derived(&target_handle);

        assert_eq!(source_handle.influencer_count(), 1);
        assert_eq!(source.derived_count(), 1);
        assert_eq!(source_handle.derived(), vec![target_handle]);

        source.write(4).unwrap();
        assert_eq!(target.read(), Ok(4));
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = Node::new(1);
        let b = Node::new(1);

        assert_eq!(a.handle(), a.clone().handle());
        assert_ne!(a.handle(), b.handle());
    }
}
