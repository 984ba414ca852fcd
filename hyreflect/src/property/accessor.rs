//! Getter and setter strategies.
//!
//! An [`Accessor`] captures how a property's value is read from and written to an
//! instance of the owning type. It is erased into an [`ErasedGetter`] and an
//! optional [`ErasedSetter`] when declared, so that properties of different value
//! types can live side by side in one [`Metaclass`](crate::class::Metaclass).
use strum::Display;

use crate::{
    utils::object::{ObjectMut, ObjectRef, Reflected},
    value::{ReflectValue, Value, ValueKind},
};

/// How the getter of a property is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GetterKind {
    /// The getter returns the value by value; on its own it cannot write.
    Value,
    /// The getter borrows the value in place, which also makes it writable.
    Reference,
}

enum Getter<T, V> {
    Value(fn(&T) -> V),
    Reference(fn(&T) -> &V),
}

enum Setter<T, V> {
    Function(fn(&mut T, V)),
    Reference(fn(&mut T) -> &mut V),
}

/// Typed description of how to read and write a property of type `V` on `T`.
///
/// ```rust
/// # use hyreflect::{field, property::Accessor};
/// struct Counter {
///     hits: u32,
/// }
///
/// impl Counter {
///     fn hits(&self) -> u32 {
///         self.hits
///     }
///
///     fn set_hits(&mut self, hits: u32) {
///         self.hits = hits;
///     }
/// }
///
/// let read_only = Accessor::value(Counter::hits);
/// assert!(!read_only.has_setter());
///
/// let read_write = Accessor::value(Counter::hits).with_setter(Counter::set_hits);
/// assert!(read_write.has_setter());
///
/// let in_place = field!(Counter, hits);
/// assert!(in_place.has_setter());
/// ```
pub struct Accessor<T, V> {
    getter: Getter<T, V>,
    setter: Option<Setter<T, V>>,
}

impl<T: Reflected, V: ReflectValue> Accessor<T, V> {
    /// Read-only accessor returning the value.
    pub fn value(getter: fn(&T) -> V) -> Self {
        Self {
            getter: Getter::Value(getter),
            setter: None,
        }
    }

    /// Accessor borrowing the value in place, both for reading and writing.
    ///
    /// A plain field is bound this way, see [`field!`](crate::field).
    pub fn reference(getter: fn(&T) -> &V, getter_mut: fn(&mut T) -> &mut V) -> Self {
        Self {
            getter: Getter::Reference(getter),
            setter: Some(Setter::Reference(getter_mut)),
        }
    }

    /// Writes through `setter` instead of any previously bound one.
    pub fn with_setter(mut self, setter: fn(&mut T, V)) -> Self {
        self.setter = Some(Setter::Function(setter));
        self
    }

    pub fn getter_kind(&self) -> GetterKind {
        match self.getter {
            Getter::Value(_) => GetterKind::Value,
            Getter::Reference(_) => GetterKind::Reference,
        }
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub(crate) fn erase(self) -> (ErasedGetter, Option<ErasedSetter>) {
        let kind = self.getter_kind();
        let read: ReadFn = match self.getter {
            Getter::Value(get) => {
                Box::new(move |object| object.downcast::<T>().map(|o| get(o).to_value()))
            }
            Getter::Reference(get) => {
                Box::new(move |object| object.downcast::<T>().map(|o| get(o).to_value()))
            }
        };

        let setter = self.setter.map(|setter| {
            let write: WriteFn = match setter {
                Setter::Function(set) => Box::new(move |object, value| {
                    let value = V::from_value(value).ok_or(WriteFault::Value)?;
                    let target = object.into_downcast::<T>().ok_or(WriteFault::Object)?;
                    set(target, value);
                    Ok(())
                }),
                Setter::Reference(get_mut) => Box::new(move |object, value| {
                    let value = V::from_value(value).ok_or(WriteFault::Value)?;
                    let target = object.into_downcast::<T>().ok_or(WriteFault::Object)?;
                    *get_mut(target) = value;
                    Ok(())
                }),
            };
            ErasedSetter { write }
        });

        (
            ErasedGetter {
                kind,
                value_kind: V::KIND,
                read,
            },
            setter,
        )
    }
}

type ReadFn = Box<dyn Fn(ObjectRef<'_>) -> Option<Value> + Send + Sync>;
type WriteFn = Box<dyn Fn(ObjectMut<'_>, Value) -> Result<(), WriteFault> + Send + Sync>;

/// Why an erased setter refused to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteFault {
    /// The handle is not an instance of the owning type.
    Object,
    /// The value does not fit the declared value type.
    Value,
}

/// Erased getter strategy.
pub struct ErasedGetter {
    kind: GetterKind,
    value_kind: ValueKind,
    read: ReadFn,
}

impl ErasedGetter {
    pub fn kind(&self) -> GetterKind {
        self.kind
    }

    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Reads the value, `None` if `object` is not of the owning type.
    pub(crate) fn read(&self, object: ObjectRef<'_>) -> Option<Value> {
        (self.read)(object)
    }
}

/// Erased setter strategy.
pub struct ErasedSetter {
    write: WriteFn,
}

impl ErasedSetter {
    pub(crate) fn write(&self, object: ObjectMut<'_>, value: Value) -> Result<(), WriteFault> {
        (self.write)(object, value)
    }
}

/// Binds a plain field of `$ty` as a reference accessor.
#[macro_export]
macro_rules! field {
    ($ty:ty, $field:ident) => {
        $crate::property::Accessor::reference(
            |object: &$ty| &object.$field,
            |object: &mut $ty| &mut object.$field,
        )
    };
}
