//! Operator Sugar
//!
//! Standard operators on nodes build derived nodes:
//!
//! ```rust
//! use trellis_core::Node;
//!
//! let p = Node::new("Hello ".to_string());
//! let q = Node::new("World ".to_string());
//! let r = Node::new("!".to_string());
//! let z = &p + &q + &r;
//!
//! assert_eq!(z.read().unwrap(), "Hello World !");
//! q.write("China ".to_string()).unwrap();
//! assert_eq!(z.read().unwrap(), "Hello China !");
//! ```
//!
//! Binary operators (`+ - * / % & | ^`) and unary `-`/`!` are implemented for
//! `Node<T>` by value and by reference, producing a `Node<T>`. The operation
//! wraps on integer overflow for `+`, `-` and `*`; every other operation is
//! the primitive one for `T`, so integer `/` and `%` by zero panic, as does
//! unary `-` of a signed minimum in debug builds, and float overflow
//! saturates to infinity.
//!
//! Comparisons cannot go through `PartialEq`/`PartialOrd`, which must return
//! a plain `bool`, so they are methods returning `Node<bool>`.

use std::num::Wrapping;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};

use super::{combine, map};
use crate::graph::Node;

/// Values that `+` can combine.
///
/// `String` does not implement `Add<String>`, so `+` on nodes goes through
/// this trait instead of `std::ops::Add`: numbers add, strings concatenate.
/// Integers wrap on overflow.
pub trait Plus {
    fn plus(self, rhs: Self) -> Self;
}

/// Values that `-` on nodes can subtract. Integers wrap on overflow.
pub trait Minus {
    fn minus(self, rhs: Self) -> Self;
}

/// Values that `*` on nodes can multiply. Integers wrap on overflow.
pub trait Times {
    fn times(self, rhs: Self) -> Self;
}

// Derived nodes are re-evaluated inside `write`; these must not panic.
macro_rules! wrapping_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Plus for $t {
                fn plus(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
            }

            impl Minus for $t {
                fn minus(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
            }

            impl Times for $t {
                fn times(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
            }
        )*
    };
}

wrapping_arithmetic!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Plus for $t {
                fn plus(self, rhs: Self) -> Self {
                    self + rhs
                }
            }

            impl Minus for $t {
                fn minus(self, rhs: Self) -> Self {
                    self - rhs
                }
            }

            impl Times for $t {
                fn times(self, rhs: Self) -> Self {
                    self * rhs
                }
            }
        )*
    };
}

float_arithmetic!(f32, f64);

impl Plus for String {
    fn plus(mut self, rhs: Self) -> Self {
        self.push_str(&rhs);
        self
    }
}

impl<T> Plus for Wrapping<T>
where
    Wrapping<T>: Add<Output = Wrapping<T>>,
{
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl<T> Minus for Wrapping<T>
where
    Wrapping<T>: Sub<Output = Wrapping<T>>,
{
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }
}

impl<T> Times for Wrapping<T>
where
    Wrapping<T>: Mul<Output = Wrapping<T>>,
{
    fn times(self, rhs: Self) -> Self {
        self * rhs
    }
}

macro_rules! binary_operator {
    ($Op:ident, $method:ident, [$($bound:tt)+], $apply:expr) => {
        impl<T> $Op<&Node<T>> for &Node<T>
        where
            T: $($bound)+ + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self, rhs: &Node<T>) -> Node<T> {
                combine(self, rhs, $apply)
            }
        }

        impl<T> $Op<Node<T>> for Node<T>
        where
            T: $($bound)+ + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self, rhs: Node<T>) -> Node<T> {
                combine(&self, &rhs, $apply)
            }
        }

        impl<T> $Op<&Node<T>> for Node<T>
        where
            T: $($bound)+ + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self, rhs: &Node<T>) -> Node<T> {
                combine(&self, rhs, $apply)
            }
        }

        impl<T> $Op<Node<T>> for &Node<T>
        where
            T: $($bound)+ + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self, rhs: Node<T>) -> Node<T> {
                combine(self, &rhs, $apply)
            }
        }
    };
}

binary_operator!(Add, add, [Plus], Plus::plus);
binary_operator!(Sub, sub, [Minus], Minus::minus);
binary_operator!(Mul, mul, [Times], Times::times);
binary_operator!(Div, div, [Div<Output = T>], Div::div);
binary_operator!(Rem, rem, [Rem<Output = T>], Rem::rem);
binary_operator!(BitAnd, bitand, [BitAnd<Output = T>], BitAnd::bitand);
binary_operator!(BitOr, bitor, [BitOr<Output = T>], BitOr::bitor);
binary_operator!(BitXor, bitxor, [BitXor<Output = T>], BitXor::bitxor);

macro_rules! unary_operator {
    ($Op:ident, $method:ident) => {
        impl<T> $Op for &Node<T>
        where
            T: $Op<Output = T> + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self) -> Node<T> {
                map(self, $Op::$method)
            }
        }

        impl<T> $Op for Node<T>
        where
            T: $Op<Output = T> + Clone + Default + 'static,
        {
            type Output = Node<T>;

            fn $method(self) -> Node<T> {
                map(&self, $Op::$method)
            }
        }
    };
}

// `!` is the operand's own complement: bitwise for integers, logical for bool.
unary_operator!(Neg, neg);
unary_operator!(Not, not);

impl<T> Node<T>
where
    T: Clone + 'static,
{
    pub fn equals(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialEq,
    {
        combine(self, other, |a, b| a == b)
    }

    pub fn not_equals(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialEq,
    {
        combine(self, other, |a, b| a != b)
    }

    pub fn less_than(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialOrd,
    {
        combine(self, other, |a, b| a < b)
    }

    pub fn greater_than(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialOrd,
    {
        combine(self, other, |a, b| a > b)
    }

    pub fn less_eq(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialOrd,
    {
        combine(self, other, |a, b| a <= b)
    }

    pub fn greater_eq(&self, other: &Node<T>) -> Node<bool>
    where
        T: PartialOrd,
    {
        combine(self, other, |a, b| a >= b)
    }

    /// `true` exactly when the value equals `T::default()` (zero, `false`,
    /// the empty string).
    pub fn logical_not(&self) -> Node<bool>
    where
        T: PartialEq + Default,
    {
        map(self, |value: T| value == T::default())
    }
}
