use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Class '{0}' is not registered")]
    ClassNotFound(String),

    #[error("Class '{class}' has no property named '{property}'")]
    PropertyNotFound { class: String, property: String },

    #[error("Invalid declaration of class '{class}': {reason}")]
    Binding { class: String, reason: String },

    #[error("Property '{property}' is not readable on this instance")]
    ForbiddenRead { property: String },

    #[error("Property '{property}' is not writable on this instance")]
    ForbiddenWrite { property: String },

    #[error("Type mismatch on property '{property}': expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    #[error("Access predicate of property '{property}' failed: {message}")]
    PredicateFailure { property: String, message: String },
}

impl ReflectError {
    pub(crate) fn binding(class: &str, reason: impl Into<String>) -> Self {
        ReflectError::Binding {
            class: class.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn kind_mismatch(property: &str, expected: ValueKind, found: ValueKind) -> Self {
        ReflectError::TypeMismatch {
            property: property.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// `true` for an unknown class or property name.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReflectError::ClassNotFound(_) | ReflectError::PropertyNotFound { .. }
        )
    }

    /// `true` when the access was refused by the property's current policy.
    ///
    /// These are expected outcomes that callers can avoid by checking
    /// [`Property::readable`](crate::property::Property::readable) or
    /// [`Property::writable`](crate::property::Property::writable) first.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            ReflectError::ForbiddenRead { .. } | ReflectError::ForbiddenWrite { .. }
        )
    }

    /// `true` when the error reveals a bug in the caller or in a declaration
    /// rather than a refused access.
    pub fn is_defect(&self) -> bool {
        !self.is_permission_denied() && !self.is_not_found()
    }
}

pub type ReflectResult<T> = Result<T, ReflectError>;
