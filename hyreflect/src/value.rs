//! Dynamic values exchanged through [`Property::get`](crate::property::Property::get)
//! and [`Property::set`](crate::property::Property::set).
//!
//! Properties are declared against concrete Rust types; the [`ReflectValue`] trait
//! describes how such a type is lowered into a [`Value`] and lifted back. Lifting
//! is checked: a value of the wrong [`ValueKind`], an integer that does not fit
//! the declared width, or a real outside the range of `f32`, is refused rather
//! than truncated. Reals narrowed to `f32` are still rounded to its precision.
use std::fmt;

use strum::{EnumDiscriminants, EnumIs};

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(strum::Display, Hash, PartialOrd, Ord))]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
}

impl Value {
    /// Kind of the value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.into()
    }

    /// Lifts the value into a `T`, see [`ReflectValue::from_value`].
    pub fn to<T: ReflectValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(b) => b.fmt(f),
            Value::Int(i) => i.fmt(f),
            Value::Real(r) => r.fmt(f),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Rust types that can be carried by a [`Value`].
pub trait ReflectValue: Sized + 'static {
    /// Kind of the values produced by [`Self::to_value`].
    const KIND: ValueKind;

    fn to_value(&self) -> Value;

    /// Returns `None` if `value` is not of kind [`Self::KIND`] or does not fit
    /// into `Self`.
    fn from_value(value: Value) -> Option<Self>;
}

impl ReflectValue for () {
    const KIND: ValueKind = ValueKind::None;

    fn to_value(&self) -> Value {
        Value::None
    }

    fn from_value(value: Value) -> Option<Self> {
        value.is_none().then_some(())
    }
}

impl ReflectValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl ReflectValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_reflect_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ReflectValue for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    value.to_value()
                }
            }
        )+
    };
}

impl_reflect_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_reflect_real {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ReflectValue for $ty {
                const KIND: ValueKind = ValueKind::Real;

                fn to_value(&self) -> Value {
                    Value::Real(f64::from(*self))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Real(r) => {
                            let narrowed = r as $ty;
                            // Finite values must stay finite once narrowed.
                            (narrowed.is_finite() || !r.is_finite()).then_some(narrowed)
                        }
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    value.to_value()
                }
            }
        )+
    };
}

impl_reflect_real!(f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}
