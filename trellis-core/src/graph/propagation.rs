//! Write Propagation
//!
//! Writing a node is the only way the graph changes, and the whole cascade
//! completes before [`Node::write`] returns.
//!
//! # Algorithm
//!
//! 1. Lower the written `Out` value to the canonical `In` value (write
//!    transform, else direct conversion) and store it.
//! 2. For each influencer, in insertion order: recover it as the writer's own
//!    `Node<In, Out>` and write the same value into it, recursively.
//! 3. For each derived node, in insertion order: recover it the same way and,
//!    if it has a derivation, evaluate it and write the result back through
//!    that node's own write path (which cascades further).
//!
//! A handle that does not recover as the writer's type is skipped. Edge lists
//! legitimately mix node types, so this is not an error.
//!
//! Errors raised by nested writes or derivations abort the cascade and reach
//! the caller. Nodes updated before the failure keep their new values.

use tracing::trace;

use super::convert::convert;
use super::node::Node;
use crate::error::Result;

impl<In, Out> Node<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    /// Write a new value and propagate it through the graph.
    pub fn write(&self, value: Out) -> Result<()> {
        let raw = self.lower(&value)?;
        self.inner.slots.borrow_mut().raw = raw;
        trace!(node = %self.id(), "write");

        // Snapshot the edges so user closures may touch this node freely.
        let (influencers, derived) = {
            let edges = self.inner.edges.borrow();
            (
                edges.influencers.values().cloned().collect::<Vec<_>>(),
                edges.derived.to_vec(),
            )
        };

        for handle in &influencers {
            match handle.try_recover::<In, Out>() {
                Some(target) => target.write(value.clone())?,
                None => trace!(
                    node = %self.id(),
                    target = %handle.id(),
                    types = %handle.type_pair(),
                    "skipping influencer of another type"
                ),
            }
        }

        for handle in &derived {
            match handle.try_recover::<In, Out>() {
                Some(target) => {
                    target.reevaluate()?;
                }
                None => trace!(
                    node = %self.id(),
                    target = %handle.id(),
                    types = %handle.type_pair(),
                    "skipping derived node of another type"
                ),
            }
        }

        Ok(())
    }

    /// Re-run the derivation and write its result through this node.
    ///
    /// Returns `false` without doing anything if no derivation is attached.
    pub fn reevaluate(&self) -> Result<bool> {
        let derivation = self.inner.slots.borrow().derivation.clone();
        let Some(derivation) = derivation else {
            return Ok(false);
        };

        trace!(node = %self.id(), "reevaluate");
        let value = derivation()?;
        self.write(value)?;
        Ok(true)
    }

    /// Map an external value to the canonical stored value.
    fn lower(&self, value: &Out) -> Result<In> {
        let transform = self.inner.slots.borrow().write_transform.clone();
        match transform {
            Some(transform) => Ok(transform(value)),
            None => convert::<Out, In>(value),
        }
    }
}
