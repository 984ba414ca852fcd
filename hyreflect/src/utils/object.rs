//! Type-erased, non-owning handles to reflected objects.
//!
//! Every per-instance operation of a [`Property`](crate::property::Property) takes
//! one of these handles. A handle only borrows the object for the duration of the
//! call; nothing in the crate retains it afterwards.
use std::any::{Any, TypeId};

use downcast_rs::{Downcast, impl_downcast};

/// Any `'static` type can be handed to the reflection layer behind this trait.
pub trait Reflected: Downcast {
    /// Name of the concrete type behind the trait object, for diagnostics.
    fn reflected_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
impl_downcast!(Reflected);

impl<T: Any> Reflected for T {}

/// Shared handle to a reflected object.
#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    inner: &'a (dyn Reflected + 'static),
}

impl<'a> ObjectRef<'a> {
    pub fn new(inner: &'a (dyn Reflected + 'static)) -> Self {
        Self { inner }
    }

    /// [`TypeId`] of the concrete object.
    pub fn type_id(&self) -> TypeId {
        let inner: &(dyn Reflected + 'static) = self.inner;
        inner.as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        let inner: &(dyn Reflected + 'static) = self.inner;
        inner.reflected_type_name()
    }

    /// Returns the object as a `T`, or `None` if it is of another type.
    pub fn downcast<T: Reflected>(&self) -> Option<&'a T> {
        let inner: &'a (dyn Reflected + 'static) = self.inner;
        inner.downcast_ref::<T>()
    }
}

/// The handle wraps `T` itself. Smart pointers are reflected as their own
/// types, so pass `&*boxed` or `&*arc` rather than `&Box<T>` or `&Arc<T>`, which
/// every property of `T` rejects with a type mismatch.
impl<'a, T: Reflected> From<&'a T> for ObjectRef<'a> {
    fn from(value: &'a T) -> Self {
        Self { inner: value }
    }
}

impl std::fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.type_name()).finish()
    }
}

/// Exclusive handle to a reflected object, required by write accesses.
pub struct ObjectMut<'a> {
    inner: &'a mut (dyn Reflected + 'static),
}

impl<'a> ObjectMut<'a> {
    pub fn new(inner: &'a mut (dyn Reflected + 'static)) -> Self {
        Self { inner }
    }

    /// Shortens the borrow so the handle can be used again afterwards.
    pub fn reborrow(&mut self) -> ObjectMut<'_> {
        ObjectMut {
            inner: &mut *self.inner,
        }
    }

    /// Shared view over the same object.
    pub fn as_ref(&self) -> ObjectRef<'_> {
        ObjectRef { inner: &*self.inner }
    }

    pub fn type_id(&self) -> TypeId {
        self.as_ref().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.as_ref().type_name()
    }

    pub fn downcast_mut<T: Reflected>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut::<T>()
    }

    /// Consumes the handle, keeping the full borrow.
    pub fn into_downcast<T: Reflected>(self) -> Option<&'a mut T> {
        self.inner.downcast_mut::<T>()
    }
}

impl<'a, T: Reflected> From<&'a mut T> for ObjectMut<'a> {
    fn from(value: &'a mut T) -> Self {
        Self { inner: value }
    }
}

impl std::fmt::Debug for ObjectMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectMut").field(&self.type_name()).finish()
    }
}
