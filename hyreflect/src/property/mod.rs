//! Named, type-erased properties.
//!
//! A [`Property`] bundles a getter, an optional setter and two [`AccessPolicy`]
//! values. It is built once by a [`ClassBuilder`](crate::class::ClassBuilder) and
//! never changes afterwards, so it can be shared freely between threads. All
//! per-instance operations take a borrowed object handle and resolve the policies
//! against it on every call.
use std::any::TypeId;

use log::trace;

use crate::{
    utils::{
        error::{ReflectError, ReflectResult},
        object::{ObjectMut, ObjectRef},
    },
    value::{Value, ValueKind},
};

pub mod accessor;
pub mod policy;

pub use accessor::{Accessor, GetterKind};
pub use policy::{AccessPolicy, Policy, PolicyKind};

use accessor::{ErasedGetter, ErasedSetter, WriteFault};

pub struct Property {
    name: String,
    owner: TypeId,
    owner_name: &'static str,
    getter: ErasedGetter,
    setter: Option<ErasedSetter>,
    readable: AccessPolicy,
    writable: AccessPolicy,
}

impl Property {
    /// Assembles a property. Callers are responsible for pinning `writable` to
    /// `Constant(false)` when there is no setter.
    pub(crate) fn new(
        name: String,
        owner: TypeId,
        owner_name: &'static str,
        getter: ErasedGetter,
        setter: Option<ErasedSetter>,
        readable: AccessPolicy,
        writable: AccessPolicy,
    ) -> Self {
        debug_assert!(setter.is_some() || writable.constant() == Some(false));
        Self {
            name,
            owner,
            owner_name,
            getter,
            setter,
            readable,
            writable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the values read and written through this property.
    pub fn kind(&self) -> ValueKind {
        self.getter.value_kind()
    }

    pub fn getter_kind(&self) -> GetterKind {
        self.getter.kind()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn readable_policy(&self) -> &AccessPolicy {
        &self.readable
    }

    pub fn writable_policy(&self) -> &AccessPolicy {
        &self.writable
    }

    /// Whether `object` can currently be read through this property.
    pub fn readable<'a>(&self, object: impl Into<ObjectRef<'a>>) -> ReflectResult<bool> {
        self.readable.evaluate(&self.name, object.into())
    }

    /// Whether `object` can currently be written through this property.
    ///
    /// Always `false` for a property without setter.
    pub fn writable<'a>(&self, object: impl Into<ObjectRef<'a>>) -> ReflectResult<bool> {
        self.writable.evaluate(&self.name, object.into())
    }

    /// Reads the property from `object`.
    ///
    /// Fails with [`ReflectError::ForbiddenRead`] if the property is not readable
    /// on `object` at the time of the call.
    pub fn get<'a>(&self, object: impl Into<ObjectRef<'a>>) -> ReflectResult<Value> {
        let object = object.into();
        self.check_owner(object)?;

        if !self.readable.evaluate(&self.name, object)? {
            trace!("read of '{}' refused", self.name);
            return Err(ReflectError::ForbiddenRead {
                property: self.name.clone(),
            });
        }

        self.getter
            .read(object)
            .ok_or_else(|| self.object_mismatch(object))
    }

    /// Writes `value` to the property of `object`.
    ///
    /// Fails with [`ReflectError::ForbiddenWrite`] if the property is not
    /// writable on `object`, and with [`ReflectError::TypeMismatch`] if `value`
    /// does not fit the property type. The setter is not invoked in either case.
    pub fn set<'a>(
        &self,
        object: impl Into<ObjectMut<'a>>,
        value: impl Into<Value>,
    ) -> ReflectResult<()> {
        let mut object = object.into();
        let value = value.into();
        self.check_owner(object.as_ref())?;

        let setter = match &self.setter {
            Some(setter) if self.writable.evaluate(&self.name, object.as_ref())? => setter,
            _ => {
                trace!("write of '{}' refused", self.name);
                return Err(ReflectError::ForbiddenWrite {
                    property: self.name.clone(),
                });
            }
        };

        if value.kind() != self.kind() {
            return Err(ReflectError::kind_mismatch(
                &self.name,
                self.kind(),
                value.kind(),
            ));
        }

        let found = value.to_string();
        setter
            .write(object.reborrow(), value)
            .map_err(|fault| match fault {
                WriteFault::Object => self.object_mismatch(object.as_ref()),
                WriteFault::Value => ReflectError::TypeMismatch {
                    property: self.name.clone(),
                    expected: format!("a {} in the range of the property type", self.kind()),
                    found,
                },
            })
    }

    fn check_owner(&self, object: ObjectRef<'_>) -> ReflectResult<()> {
        if object.type_id() == self.owner {
            Ok(())
        } else {
            Err(self.object_mismatch(object))
        }
    }

    fn object_mismatch(&self, object: ObjectRef<'_>) -> ReflectError {
        ReflectError::TypeMismatch {
            property: self.name.clone(),
            expected: self.owner_name.to_string(),
            found: object.type_name().to_string(),
        }
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("getter", &self.getter_kind())
            .field("setter", &self.has_setter())
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .finish()
    }
}
