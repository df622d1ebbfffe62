//! Graph Nodes
//!
//! This module defines [`Node`], the typed value cell that lives in the
//! dependency graph.
//!
//! # Anatomy of a Node
//!
//! A `Node<In, Out>` stores a canonical value of type `In` and presents it to
//! the outside world as `Out`. Three optional closures shape that view:
//!
//! - a *read transform* (`&In -> Out`) applied on every plain read,
//! - a *write transform* (`&Out -> In`) applied on every write,
//! - a *derivation* (`() -> Out`) that, when present, replaces the stored
//!   value entirely and computes the node from other nodes.
//!
//! Without transforms, values cross between `In` and `Out` through
//! [`convert`](super::convert::convert), which fails with
//! [`GraphError::Conversion`](crate::GraphError) for unrelated types.
//!
//! # Edges
//!
//! Each node carries two outgoing edge lists of type-erased handles:
//!
//! - `influencers`: nodes that receive a copy of every value written here.
//!   Set semantics on node identity, insertion order preserved.
//! - `derived`: nodes whose derivation is re-run after every write here.
//!
//! The public `Node` is itself a reference-counted handle. Cloning it is
//! cheap and every clone refers to the same cell.

use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::convert::convert;
use super::handle::AnyNode;
use crate::error::Result;

/// Unique identifier for a node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type ReadTransform<In, Out> = Rc<dyn Fn(&In) -> Out>;
pub(crate) type WriteTransform<In, Out> = Rc<dyn Fn(&Out) -> In>;
pub(crate) type Derivation<Out> = Rc<dyn Fn() -> Result<Out>>;

/// Value storage and the closures that shape it.
pub(crate) struct Slots<In, Out> {
    pub(crate) raw: In,
    /// Last result of the read transform.
    pub(crate) cached: Option<Out>,
    pub(crate) read_transform: Option<ReadTransform<In, Out>>,
    pub(crate) write_transform: Option<WriteTransform<In, Out>>,
    pub(crate) derivation: Option<Derivation<Out>>,
}

/// Outgoing edges of a node.
#[derive(Default)]
pub(crate) struct Edges {
    pub(crate) influencers: IndexMap<NodeId, AnyNode>,
    pub(crate) derived: SmallVec<[AnyNode; 4]>,
}

/// The shared cell behind every clone of a [`Node`].
pub(crate) struct NodeInner<In, Out> {
    pub(crate) id: NodeId,
    pub(crate) slots: RefCell<Slots<In, Out>>,
    pub(crate) edges: RefCell<Edges>,
}

/// A typed value cell in the dependency graph.
///
/// # Type Parameters
///
/// - `In`: the canonical type stored inside the node.
/// - `Out`: the type seen by readers and accepted by writers. Defaults to
///   `In`, so `Node<T>` is the homogeneous case.
///
/// # Example
///
/// ```rust
/// use trellis_core::Node;
///
/// let length = Node::<String, usize>::with_raw("Hello".to_string());
/// length.attach_read_transform(|s: &String| s.len());
/// length.attach_write_transform(|n: &usize| "*".repeat(*n));
///
/// assert_eq!(length.read().unwrap(), 5);
/// length.write(10).unwrap();
/// assert_eq!(length.read().unwrap(), 10);
/// ```
pub struct Node<In, Out = In>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    pub(crate) inner: Rc<NodeInner<In, Out>>,
}

impl<T> Node<T, T>
where
    T: Clone + 'static,
{
    /// Create a homogeneous node holding `value`.
    ///
    /// Storing the value directly is equivalent to an initial write: with
    /// `In = Out` and no transforms the write path is the identity.
    pub fn new(value: T) -> Self {
        Self::with_raw(value)
    }
}

impl<In, Out> Node<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    /// Create a node from its internal value, with no transforms attached.
    pub fn with_raw(raw: In) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                id: NodeId::new(),
                slots: RefCell::new(Slots {
                    raw,
                    cached: None,
                    read_transform: None,
                    write_transform: None,
                    derivation: None,
                }),
                edges: RefCell::new(Edges::default()),
            }),
        }
    }

    /// Create a node by writing `initial` through the direct conversion.
    ///
    /// Fails with a conversion error when `Out` cannot become `In`.
    pub fn create(initial: Out) -> Result<Self> {
        let raw = convert::<Out, In>(&initial)?;
        Ok(Self::with_raw(raw))
    }

    pub(crate) fn from_inner(inner: Rc<NodeInner<In, Out>>) -> Self {
        Self { inner }
    }

    /// Get the node's unique ID.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Get a type-erased handle to this node.
    pub fn handle(&self) -> AnyNode {
        AnyNode::from_inner(Rc::clone(&self.inner))
    }

    /// Read the node's current value.
    ///
    /// A derivation, if attached, is evaluated and its result returned as-is.
    /// Otherwise the stored value goes through the read transform (and the
    /// result is cached) or through the direct conversion.
    pub fn read(&self) -> Result<Out> {
        let derivation = self.inner.slots.borrow().derivation.clone();
        if let Some(derivation) = derivation {
            return derivation();
        }

        let (raw, transform) = {
            let slots = self.inner.slots.borrow();
            (slots.raw.clone(), slots.read_transform.clone())
        };

        match transform {
            Some(transform) => {
                let value = transform(&raw);
                self.inner.slots.borrow_mut().cached = Some(value.clone());
                Ok(value)
            }
            None => convert::<In, Out>(&raw),
        }
    }

    /// Get the stored internal value, ignoring transforms and derivation.
    pub fn raw(&self) -> In {
        self.inner.slots.borrow().raw.clone()
    }

    /// Get the last value produced by the read transform, if any.
    pub fn cached(&self) -> Option<Out> {
        self.inner.slots.borrow().cached.clone()
    }

    /// Install or replace the read transform.
    pub fn attach_read_transform<F>(&self, transform: F)
    where
        F: Fn(&In) -> Out + 'static,
    {
        self.inner.slots.borrow_mut().read_transform = Some(Rc::new(transform));
    }

    /// Install or replace the write transform.
    pub fn attach_write_transform<F>(&self, transform: F)
    where
        F: Fn(&Out) -> In + 'static,
    {
        self.inner.slots.borrow_mut().write_transform = Some(Rc::new(transform));
    }

    /// Install or replace the derivation.
    ///
    /// The derivation should obtain its inputs through other nodes' `read`.
    pub fn attach_derivation<F>(&self, derivation: F)
    where
        F: Fn() -> Result<Out> + 'static,
    {
        self.inner.slots.borrow_mut().derivation = Some(Rc::new(derivation));
    }

    /// Install both transforms at once.
    ///
    /// This only installs; use [`Node::detach_read_transform`] and
    /// [`Node::detach_write_transform`] to fall back to direct conversion.
    pub fn hook<R, W>(&self, read: R, write: W)
    where
        R: Fn(&In) -> Out + 'static,
        W: Fn(&Out) -> In + 'static,
    {
        let mut slots = self.inner.slots.borrow_mut();
        slots.read_transform = Some(Rc::new(read));
        slots.write_transform = Some(Rc::new(write));
    }

    /// Remove the read transform, returning whether one was attached.
    ///
    /// The cached value is cleared with it.
    pub fn detach_read_transform(&self) -> bool {
        let mut slots = self.inner.slots.borrow_mut();
        slots.cached = None;
        slots.read_transform.take().is_some()
    }

    /// Remove the write transform, returning whether one was attached.
    pub fn detach_write_transform(&self) -> bool {
        self.inner.slots.borrow_mut().write_transform.take().is_some()
    }

    /// Check whether a derivation is attached.
    pub fn has_derivation(&self) -> bool {
        self.inner.slots.borrow().derivation.is_some()
    }

    /// A fresh node with the same stored value and transforms, no derivation
    /// and no edges.
    pub(crate) fn detached_copy(&self) -> Self {
        let slots = self.inner.slots.borrow();
        let copy = Self::with_raw(slots.raw.clone());
        {
            let mut target = copy.inner.slots.borrow_mut();
            target.read_transform = slots.read_transform.clone();
            target.write_transform = slots.write_transform.clone();
        }
        copy
    }

    /// Register `target` to receive a copy of every value written here.
    ///
    /// See [`AnyNode::add_influencer`].
    pub fn add_influencer(&self, target: &AnyNode) {
        self.handle().add_influencer(target);
    }

    /// Register `target` to have its derivation re-run after every write here.
    ///
    /// See [`AnyNode::add_derived`].
    pub fn add_derived(&self, target: &AnyNode) {
        self.handle().add_derived(target);
    }

    /// Snapshot of the influencer list, in insertion order.
    pub fn influencers(&self) -> Vec<AnyNode> {
        self.handle().influencers()
    }

    /// Snapshot of the derived list, in insertion order.
    pub fn derived(&self) -> Vec<AnyNode> {
        self.handle().derived()
    }

    /// Get the number of influencer edges.
    pub fn influencer_count(&self) -> usize {
        self.inner.edges.borrow().influencers.len()
    }

    /// Get the number of derived edges.
    pub fn derived_count(&self) -> usize {
        self.inner.edges.borrow().derived.len()
    }

    /// Check whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<In, Out> Clone for Node<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<In, Out> Debug for Node<In, Out>
where
    In: Clone + Debug + 'static,
    Out: Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("raw", &self.raw())
            .field("derived", &self.has_derivation())
            .field("influencer_count", &self.influencer_count())
            .field("derived_count", &self.derived_count())
            .finish()
    }
}

impl<In, Out> From<&Node<In, Out>> for AnyNode
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    fn from(node: &Node<In, Out>) -> Self {
        node.handle()
    }
}

impl<In, Out> From<Node<In, Out>> for AnyNode
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    fn from(node: Node<In, Out>) -> Self {
        node.handle()
    }
}
