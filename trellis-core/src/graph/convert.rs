//! Direct Value Conversion
//!
//! When a node has no read or write transform, values cross between its
//! internal and external type through [`convert`]. The conversion is decided
//! at runtime from the concrete types involved:
//!
//! 1. Identical types convert by cloning.
//! 2. Primitive scalars (integers, floats, `bool`) convert with `as` cast
//!    semantics: floats truncate toward zero when narrowed to an integer,
//!    integers wrap when narrowed, and anything non-zero becomes `true`.
//! 3. Everything else fails with [`GraphError::Conversion`].
//!
//! Nodes whose types fall into case 3 must be given transforms.

use std::any::{Any, TypeId};

use crate::error::{GraphError, Result};

/// Intermediate form for primitive scalar casts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Int(i128),
    Float(f64),
    Bool(bool),
}

/// Convert `value` from `A` to `B`, or fail if no legal mapping exists.
pub fn convert<A, B>(value: &A) -> Result<B>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    let any: &dyn Any = value;

    if let Some(same) = any.downcast_ref::<B>() {
        return Ok(same.clone());
    }

    scalar_of(any)
        .and_then(scalar_into::<B>)
        .ok_or_else(GraphError::conversion::<A, B>)
}

macro_rules! scalar_types {
    ($callback:ident) => {
        $callback!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize)
    };
}

fn scalar_of(value: &dyn Any) -> Option<Scalar> {
    macro_rules! read_int {
        ($($t:ty),*) => {
            $(
                if let Some(v) = value.downcast_ref::<$t>() {
                    return Some(Scalar::Int(*v as i128));
                }
            )*
        };
    }

    scalar_types!(read_int);

    if let Some(v) = value.downcast_ref::<f32>() {
        return Some(Scalar::Float(f64::from(*v)));
    }
    if let Some(v) = value.downcast_ref::<f64>() {
        return Some(Scalar::Float(*v));
    }
    value.downcast_ref::<bool>().map(|v| Scalar::Bool(*v))
}

fn scalar_into<B: 'static>(scalar: Scalar) -> Option<B> {
    let target = TypeId::of::<B>();

    macro_rules! write_int {
        ($($t:ty),*) => {
            $(
                if target == TypeId::of::<$t>() {
                    let v = match scalar {
                        Scalar::Int(i) => i as $t,
                        Scalar::Float(f) => f as $t,
                        Scalar::Bool(b) => b as $t,
                    };
                    return rebox(v);
                }
            )*
        };
    }

    scalar_types!(write_int);

    if target == TypeId::of::<f64>() {
        return rebox(as_f64(scalar));
    }
    if target == TypeId::of::<f32>() {
        return rebox(as_f64(scalar) as f32);
    }
    if target == TypeId::of::<bool>() {
        let truthy = match scalar {
            Scalar::Int(i) => i != 0,
            Scalar::Float(f) => f != 0.0,
            Scalar::Bool(b) => b,
        };
        return rebox(truthy);
    }
    None
}

fn as_f64(scalar: Scalar) -> f64 {
    match scalar {
        Scalar::Int(i) => i as f64,
        Scalar::Float(f) => f,
        Scalar::Bool(b) => f64::from(u8::from(b)),
    }
}

/// Move a concretely-typed value into the generic target type.
fn rebox<V: 'static, B: 'static>(value: V) -> Option<B> {
    let boxed: Box<dyn Any> = Box::new(value);
    boxed.downcast::<B>().ok().map(|b| *b)
}
