use std::any::TypeId;

use log::{debug, trace, warn};

use crate::{
    class::Metaclass,
    property::{
        AccessPolicy, Accessor, Policy, Property,
        accessor::{ErasedGetter, ErasedSetter},
    },
    utils::{
        conf::ReflectConfig,
        error::{ReflectError, ReflectResult},
        object::Reflected,
    },
    value::ReflectValue,
};

/// A property declared on a [`ClassBuilder`] whose policies are not final yet.
struct PendingProperty<T> {
    name: String,
    getter: ErasedGetter,
    setter: Option<ErasedSetter>,
    readable: Option<Policy<T>>,
    writable: Option<Policy<T>>,
}

/// Fluent declaration of the [`Metaclass`] of `T`.
///
/// [`Self::readable`] and [`Self::writable`] apply to the most recently declared
/// property; declaring either twice keeps the last one. Nothing is published
/// until [`Self::build`], which reports the first declaration error instead of
/// producing a partially declared class.
///
/// ```rust
/// # use hyreflect::{field, class::ClassBuilder, property::{Accessor, Policy}};
/// struct Account {
///     balance: i64,
///     frozen: bool,
/// }
///
/// impl Account {
///     fn is_active(&self) -> bool {
///         !self.frozen
///     }
/// }
///
/// let class = ClassBuilder::<Account>::new("Account")
///     .property("balance", field!(Account, balance))
///     .readable(true)
///     .writable(Policy::member(Account::is_active))
///     .property("frozen", Accessor::value(|account: &Account| account.frozen))
///     .build()
///     .unwrap();
///
/// let mut account = Account { balance: 10, frozen: true };
/// let balance = class.property("balance").unwrap();
/// assert!(balance.readable(&account).unwrap());
/// assert!(!balance.writable(&account).unwrap());
/// assert!(balance.set(&mut account, 20).unwrap_err().is_permission_denied());
/// ```
pub struct ClassBuilder<T> {
    name: String,
    config: ReflectConfig,
    properties: Vec<PendingProperty<T>>,
    error: Option<ReflectError>,
}

impl<T: Reflected> ClassBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ReflectConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: ReflectConfig) -> Self {
        let name = name.into();
        let error = name
            .is_empty()
            .then(|| ReflectError::binding(std::any::type_name::<T>(), "class name is empty"));

        Self {
            name,
            config,
            properties: Vec::new(),
            error,
        }
    }

    /// Declares a property named `name` accessed through `accessor`.
    pub fn property<V: ReflectValue>(
        mut self,
        name: impl Into<String>,
        accessor: Accessor<T, V>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let name = name.into();
        if name.is_empty() {
            self.fail("property name is empty".to_string());
            return self;
        }
        if self.properties.iter().any(|p| p.name == name) {
            self.fail(format!("property '{}' is declared twice", name));
            return self;
        }

        let (getter, setter) = accessor.erase();
        trace!(
            "{}: declared property '{}' ({}, {} getter, setter: {})",
            self.name,
            name,
            getter.value_kind(),
            getter.kind(),
            setter.is_some()
        );

        self.properties.push(PendingProperty {
            name,
            getter,
            setter,
            readable: None,
            writable: None,
        });
        self
    }

    /// Sets the readability policy of the last declared property.
    pub fn readable(mut self, policy: impl Into<Policy<T>>) -> Self {
        if let Some(property) = self.last_property("readable") {
            property.readable = Some(policy.into());
        }
        self
    }

    /// Sets the writability policy of the last declared property.
    ///
    /// Has no effect on a property without setter, which is never writable; see
    /// [`ReflectConfig::strict_writable_override`] to reject such declarations.
    pub fn writable(mut self, policy: impl Into<Policy<T>>) -> Self {
        if let Some(property) = self.last_property("writable") {
            property.writable = Some(policy.into());
        }
        self
    }

    /// Finalizes the declaration.
    pub fn build(self) -> ReflectResult<Metaclass> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut properties = Vec::with_capacity(self.properties.len());
        for pending in self.properties {
            let readable = pending.readable.map_or(AccessPolicy::Constant(true), Policy::erase);

            let writable = match (&pending.setter, pending.writable) {
                (Some(_), Some(policy)) => policy.erase(),
                (Some(_), None) => AccessPolicy::Constant(true),
                (None, Some(policy)) if !policy.is_constant_false() => {
                    if self.config.strict_writable_override {
                        return Err(ReflectError::binding(
                            &self.name,
                            format!(
                                "property '{}' has no setter and cannot be made writable",
                                pending.name
                            ),
                        ));
                    }
                    warn!(
                        "{}: ignoring writable override of read-only property '{}'",
                        self.name, pending.name
                    );
                    AccessPolicy::Constant(false)
                }
                (None, _) => AccessPolicy::Constant(false),
            };

            trace!(
                "{}: property '{}' readable {:?}, writable {:?}",
                self.name, pending.name, readable, writable
            );

            properties.push(Property::new(
                pending.name,
                TypeId::of::<T>(),
                std::any::type_name::<T>(),
                pending.getter,
                pending.setter,
                readable,
                writable,
            ));
        }

        debug!(
            "declared class '{}' ({}) with {} properties",
            self.name,
            std::any::type_name::<T>(),
            properties.len()
        );

        Ok(Metaclass::new(
            self.name,
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            properties,
        ))
    }

    fn fail(&mut self, reason: String) {
        if self.error.is_none() {
            self.error = Some(ReflectError::binding(&self.name, reason));
        }
    }

    fn last_property(&mut self, what: &str) -> Option<&mut PendingProperty<T>> {
        if self.error.is_some() {
            return None;
        }
        if self.properties.is_empty() {
            self.fail(format!("{}() declared before any property", what));
            return None;
        }
        self.properties.last_mut()
    }
}
