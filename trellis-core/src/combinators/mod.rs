//! Combinators
//!
//! Combinators build new nodes out of existing ones. Each one:
//!
//! 1. creates a fresh result node,
//! 2. gives it a derivation that reads its inputs through `read`,
//! 3. appends the result to the `derived` (or, for [`mirror`], the
//!    `influencers`) list of each input.
//!
//! Combinators never remove or redirect an existing edge, and every edge they
//! add points from an older node to the node being created. Graphs built only
//! through this module are therefore acyclic by construction.
//!
//! Nothing is memoized: reading a combinator node recomputes its whole input
//! chain.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{combinators::{filter, map}, Node};
//!
//! let value = Node::new(15);
//! let fallback = Node::new(0);
//! let positive = filter(&map(&value, |x| x - 10), &fallback, |x| *x > 0);
//!
//! assert_eq!(positive.read().unwrap(), 5);
//! value.write(5).unwrap();
//! assert_eq!(positive.read().unwrap(), 0);
//! ```

pub mod ops;

use tracing::debug;

use crate::error::Result;
use crate::graph::{AnyNode, Node};

pub use ops::{Minus, Plus, Times};

/// A homogeneous node whose reads go through `derivation`.
///
/// The stored value starts at `T::default()`; it is only ever observed
/// through `raw()` and is refreshed whenever an input write re-evaluates the
/// node.
fn derived_node<T, F>(derivation: F) -> Node<T>
where
    T: Clone + Default + 'static,
    F: Fn() -> Result<T> + 'static,
{
    let node = Node::new(T::default());
    node.attach_derivation(derivation);
    node
}

/// Register `result` as derived from each of `sources`.
fn link(sources: &[&AnyNode], result: &AnyNode) {
    for source in sources {
        source.add_derived(result);
    }
}

/// Transform a node's value through `f`.
pub fn map<In, Out, U, F>(source: &Node<In, Out>, f: F) -> Node<U>
where
    In: Clone + 'static,
    Out: Clone + 'static,
    U: Clone + Default + 'static,
    F: Fn(Out) -> U + 'static,
{
    let input = source.clone();
    let result = derived_node(move || input.read().map(&f));
    source.add_derived(&result.handle());
    debug!(source = %source.id(), result = %result.id(), "map");
    result
}

/// Pass the source value through when `predicate` holds, else the fallback's.
pub fn filter<T, P>(source: &Node<T>, fallback: &Node<T>, predicate: P) -> Node<T>
where
    T: Clone + Default + 'static,
    P: Fn(&T) -> bool + 'static,
{
    let (input, otherwise) = (source.clone(), fallback.clone());
    let result = derived_node(move || {
        let value = input.read()?;
        if predicate(&value) {
            Ok(value)
        } else {
            otherwise.read()
        }
    });
    link(&[&source.handle(), &fallback.handle()], &result.handle());
    debug!(source = %source.id(), fallback = %fallback.id(), result = %result.id(), "filter");
    result
}

/// Left-fold `sources`, in order, starting from `initial`.
///
/// With no sources the result reads `initial` and no edges are created.
/// Each source gets the result appended to its `derived` list.
pub fn fold<In, T, A, F>(sources: &[Node<In, T>], initial: A, combine: F) -> Node<A>
where
    In: Clone + 'static,
    T: Clone + 'static,
    A: Clone + 'static,
    F: Fn(A, T) -> A + 'static,
{
    let inputs = sources.to_vec();
    let seed = initial.clone();
    let result = Node::new(initial);
    result.attach_derivation(move || {
        inputs
            .iter()
            .try_fold(seed.clone(), |acc, input| Ok(combine(acc, input.read()?)))
    });

    let handle = result.handle();
    for source in sources {
        source.add_derived(&handle);
    }
    debug!(sources = sources.len(), result = %result.id(), "fold");
    result
}

/// Select `on_true` or `on_false` depending on `condition`.
pub fn when<T>(condition: &Node<bool>, on_true: &Node<T>, on_false: &Node<T>) -> Node<T>
where
    T: Clone + Default + 'static,
{
    let (flag, yes, no) = (condition.clone(), on_true.clone(), on_false.clone());
    let result = derived_node(move || if flag.read()? { yes.read() } else { no.read() });
    link(
        &[&condition.handle(), &on_true.handle(), &on_false.handle()],
        &result.handle(),
    );
    debug!(condition = %condition.id(), result = %result.id(), "when");
    result
}

/// Combine two nodes through a binary function.
pub fn combine<A, B, T, F>(left: &Node<A>, right: &Node<B>, f: F) -> Node<T>
where
    A: Clone + 'static,
    B: Clone + 'static,
    T: Clone + Default + 'static,
    F: Fn(A, B) -> T + 'static,
{
    let (p, q) = (left.clone(), right.clone());
    let result = derived_node(move || Ok(f(p.read()?, q.read()?)));
    link(&[&left.handle(), &right.handle()], &result.handle());
    result
}

/// A node computed by an arbitrary derivation over the listed sources.
///
/// `derivation` is expected to read only nodes in `sources`, or nodes that
/// are themselves downstream of them; anything else will not trigger
/// re-evaluation on write.
pub fn derive_from<T, F>(sources: &[AnyNode], derivation: F) -> Node<T>
where
    T: Clone + Default + 'static,
    F: Fn() -> Result<T> + 'static,
{
    let result = derived_node(derivation);
    let handle = result.handle();
    for source in sources {
        source.add_derived(&handle);
    }
    debug!(sources = sources.len(), result = %result.id(), "derive_from");
    result
}

/// A plain node that receives a copy of every value written to `source`.
///
/// The copy starts with the source's stored value and shares its read and
/// write transforms, but not its derivation.
pub fn mirror<In, Out>(source: &Node<In, Out>) -> Node<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    let result = source.detached_copy();
    source.add_influencer(&result.handle());
    debug!(source = %source.id(), result = %result.id(), "mirror");
    result
}

// Chainable forms of the free functions above.
impl<T> Node<T>
where
    T: Clone + Default + 'static,
{
    pub fn map<U, F>(&self, f: F) -> Node<U>
    where
        U: Clone + Default + 'static,
        F: Fn(T) -> U + 'static,
    {
        map(self, f)
    }

    pub fn filter<P>(&self, fallback: &Node<T>, predicate: P) -> Node<T>
    where
        P: Fn(&T) -> bool + 'static,
    {
        filter(self, fallback, predicate)
    }

    /// `self` when `condition` holds, otherwise `on_false`.
    pub fn when(&self, condition: &Node<bool>, on_false: &Node<T>) -> Node<T> {
        when(condition, self, on_false)
    }

    pub fn combine<B, U, F>(&self, other: &Node<B>, f: F) -> Node<U>
    where
        B: Clone + 'static,
        U: Clone + Default + 'static,
        F: Fn(T, B) -> U + 'static,
    {
        combine(self, other, f)
    }

    pub fn mirror(&self) -> Node<T> {
        mirror(self)
    }
}
