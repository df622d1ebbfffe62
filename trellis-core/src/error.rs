//! Error Types
//!
//! The graph has exactly two ways to fail:
//!
//! - A value cannot be mapped between a node's internal and external type
//!   because no transform is attached and no direct conversion exists.
//! - A type-erased handle is recovered against the wrong `(In, Out)` pair.
//!
//! Both surface synchronously to whoever triggered them. Propagation is the
//! one place where a `TypeMismatch` is swallowed: edge lists deliberately mix
//! node types, so a failed recovery there just means "not my kind of node".

use thiserror::Error;

/// Errors raised by node reads, writes and handle recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No transform was supplied and there is no legal conversion.
    #[error("type conversion not possible: {from} -> {to}")]
    Conversion {
        from: &'static str,
        to: &'static str,
    },

    /// A handle was recovered as a node type it does not have.
    #[error("type mismatch in recovery: expected Node<{expected}>, found Node<{actual}>")]
    TypeMismatch {
        expected: String,
        actual: String,
    },
}

impl GraphError {
    /// Build a conversion error for the `From -> To` pair.
    pub(crate) fn conversion<From: ?Sized, To: ?Sized>() -> Self {
        Self::Conversion {
            from: std::any::type_name::<From>(),
            to: std::any::type_name::<To>(),
        }
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
