//! Readability and writability policies.
//!
//! A policy is declared against the owning type with [`Policy<T>`] and erased into
//! an [`AccessPolicy`] when the class is built. Resolution is a single match over
//! the erased variant, evaluated against the object handle on every call; no
//! answer is ever cached since predicates may depend on live object state.
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use log::trace;
use strum::EnumDiscriminants;

use crate::utils::{
    error::{ReflectError, ReflectResult},
    object::{ObjectRef, Reflected},
};

type FreeFn<T> = Arc<dyn Fn(&T) -> Result<bool, String> + Send + Sync>;

/// Source of a readability or writability policy for a property of `T`.
///
/// ```rust
/// # use hyreflect::property::Policy;
/// struct Door {
///     locked: bool,
/// }
///
/// impl Door {
///     fn is_open(&self) -> bool {
///         !self.locked
///     }
/// }
///
/// let _constant: Policy<Door> = false.into();
/// let _member = Policy::member(Door::is_open);
/// let _field = Policy::field(|door: &Door| &door.locked);
/// let _free = Policy::free(|door: &Door| !door.locked);
/// ```
pub enum Policy<T> {
    /// Same answer for every instance.
    Constant(bool),
    /// A `&self -> bool` method of the owning type.
    Member(fn(&T) -> bool),
    /// Any callable taking the object by reference. Errors are reported as
    /// [`ReflectError::PredicateFailure`].
    Free(FreeFn<T>),
    /// A `bool` field of the owning type, read on every evaluation.
    DataMember(fn(&T) -> &bool),
}

impl<T: Reflected> Policy<T> {
    pub fn member(method: fn(&T) -> bool) -> Self {
        Policy::Member(method)
    }

    pub fn field(field: fn(&T) -> &bool) -> Self {
        Policy::DataMember(field)
    }

    pub fn free<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Policy::Free(Arc::new(move |object: &T| Ok(predicate(object))))
    }

    /// Like [`Self::free`] for predicates that can fail.
    pub fn try_free<F, E>(predicate: F) -> Self
    where
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: std::fmt::Display,
    {
        Policy::Free(Arc::new(move |object: &T| {
            predicate(object).map_err(|e| e.to_string())
        }))
    }

    /// `true` if this policy can only ever answer `false`.
    pub(crate) fn is_constant_false(&self) -> bool {
        matches!(self, Policy::Constant(false))
    }

    pub(crate) fn erase(self) -> AccessPolicy {
        match self {
            Policy::Constant(value) => AccessPolicy::Constant(value),
            Policy::Member(method) => AccessPolicy::Member(Box::new(move |object| {
                object.downcast::<T>().map(method)
            })),
            Policy::Free(predicate) => AccessPolicy::Free(Box::new(move |object| {
                object.downcast::<T>().map(|o| predicate(o))
            })),
            Policy::DataMember(field) => AccessPolicy::DataMember(Box::new(move |object| {
                object.downcast::<T>().map(|o| *field(o))
            })),
        }
    }
}

impl<T> From<bool> for Policy<T> {
    fn from(value: bool) -> Self {
        Policy::Constant(value)
    }
}

/// Erased predicate. Yields `None` when the handle is not of the owning type.
pub(crate) type Predicate<R> = Box<dyn Fn(ObjectRef<'_>) -> Option<R> + Send + Sync>;

/// Erased policy stored in a [`Property`](super::Property).
#[derive(EnumDiscriminants)]
#[strum_discriminants(name(PolicyKind), derive(strum::Display, Hash))]
pub enum AccessPolicy {
    Constant(bool),
    Member(Predicate<bool>),
    Free(Predicate<Result<bool, String>>),
    DataMember(Predicate<bool>),
}

impl AccessPolicy {
    pub fn kind(&self) -> PolicyKind {
        self.into()
    }

    /// Value of a [`AccessPolicy::Constant`] policy.
    pub fn constant(&self) -> Option<bool> {
        match self {
            AccessPolicy::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Evaluates the policy against `object` on behalf of `property`.
    pub(crate) fn evaluate(&self, property: &str, object: ObjectRef<'_>) -> ReflectResult<bool> {
        let outcome = match self {
            AccessPolicy::Constant(value) => return Ok(*value),
            AccessPolicy::Member(predicate) | AccessPolicy::DataMember(predicate) => {
                guarded(property, || predicate(object))?.map(Ok)
            }
            AccessPolicy::Free(predicate) => guarded(property, || predicate(object))?,
        };

        match outcome {
            Some(Ok(value)) => {
                trace!("policy {} of '{}' -> {}", self.kind(), property, value);
                Ok(value)
            }
            Some(Err(message)) => Err(ReflectError::PredicateFailure {
                property: property.to_string(),
                message,
            }),
            None => Err(ReflectError::TypeMismatch {
                property: property.to_string(),
                expected: "an instance of the owning class".to_string(),
                found: object.type_name().to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessPolicy::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            other => f.write_str(&other.kind().to_string()),
        }
    }
}

/// Runs user code, turning a panic into [`ReflectError::PredicateFailure`].
fn guarded<R>(property: &str, f: impl FnOnce() -> R) -> ReflectResult<R> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| ReflectError::PredicateFailure {
        property: property.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "predicate panicked".to_string()
    }
}
