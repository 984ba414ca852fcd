//! Process-wide registry mapping Rust types to their [`Metaclass`].
//!
//! Classes enter a registry in one of two ways:
//!
//! - explicitly, with [`ClassRegistry::register_class`];
//! - lazily, by submitting a declaration with [`declare_class!`](crate::declare_class).
//!   The declaration runs the first time the type is looked up with
//!   [`ClassRegistry::class_by_type`], or eagerly through
//!   [`ClassRegistry::declare_submitted`].
//!
//! Either way, a class is fully built before it is published, and a published
//! class never changes. Lookups only take a read lock.
use std::{
    any::TypeId,
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, RwLock};

use crate::{
    class::Metaclass,
    utils::{
        conf::ReflectConfig,
        error::{ReflectError, ReflectResult},
        object::Reflected,
    },
};

/// Inventory entry submitted by [`declare_class!`](crate::declare_class).
pub struct ClassDeclaration {
    pub type_id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub declare: fn(&ReflectConfig) -> ReflectResult<Metaclass>,
}
inventory::collect!(ClassDeclaration);

/// Submits the declaration of the class of `$ty`, run on first lookup.
///
/// `$declare` receives a [`ClassBuilder`](crate::class::ClassBuilder) named
/// `$name` and returns it with the properties declared.
#[macro_export]
macro_rules! declare_class {
    (
        $ty:ty, $name:expr, $declare:expr
        $(,)?
    ) => {
        $crate::inventory::submit! {
            $crate::registry::ClassDeclaration {
                type_id: || ::std::any::TypeId::of::<$ty>(),
                type_name: || ::std::any::type_name::<$ty>(),
                declare: |config: &$crate::utils::conf::ReflectConfig| -> $crate::utils::error::ReflectResult<$crate::class::Metaclass> {
                    let builder = $crate::class::ClassBuilder::<$ty>::with_config($name, config.clone());
                    ($declare)(builder).build()
                },
            }
        }
    };
}

#[derive(Default)]
struct ClassMaps {
    by_type: BTreeMap<TypeId, Arc<Metaclass>>,
    by_name: BTreeMap<String, Arc<Metaclass>>,
}

pub struct ClassRegistry {
    config: ReflectConfig,
    classes: RwLock<ClassMaps>,
    /// Serializes auto-declarations and tracks the ones in progress on the
    /// owning thread, so a declaration may look up other classes.
    declaring: ReentrantMutex<RefCell<BTreeSet<TypeId>>>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::with_config(ReflectConfig::default())
    }

    pub fn with_config(config: ReflectConfig) -> Self {
        Self {
            config,
            classes: RwLock::new(ClassMaps::default()),
            declaring: ReentrantMutex::new(RefCell::new(BTreeSet::new())),
        }
    }

    pub fn config(&self) -> &ReflectConfig {
        &self.config
    }

    /// Publishes `metaclass`.
    ///
    /// Registering a type twice is a [`ReflectError::Binding`] unless
    /// [`ReflectConfig::reject_duplicate_classes`] is off, in which case the
    /// class registered first is returned. A class name already held by
    /// another type is always rejected.
    pub fn register_class(&self, metaclass: Metaclass) -> ReflectResult<Arc<Metaclass>> {
        self.insert(metaclass, self.config.reject_duplicate_classes)
    }

    /// Metaclass of `T`, declaring it first if a declaration was submitted.
    pub fn class_by_type<T: Reflected>(&self) -> ReflectResult<Arc<Metaclass>> {
        let type_id = TypeId::of::<T>();
        if let Some(class) = self.classes.read().by_type.get(&type_id) {
            return Ok(class.clone());
        }

        if self.config.auto_declare {
            let declaration = inventory::iter::<ClassDeclaration>
                .into_iter()
                .find(|declaration| (declaration.type_id)() == type_id);
            if let Some(declaration) = declaration {
                return self.run_declaration(declaration);
            }
        }

        Err(ReflectError::ClassNotFound(
            std::any::type_name::<T>().to_string(),
        ))
    }

    /// Metaclass registered under `name`.
    ///
    /// Unlike [`Self::class_by_type`] this never runs a pending declaration,
    /// since the name of a class is only known once it is declared.
    pub fn class_by_name(&self, name: &str) -> ReflectResult<Arc<Metaclass>> {
        self.classes
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ReflectError::ClassNotFound(name.to_string()))
    }

    pub fn contains<T: Reflected>(&self) -> bool {
        self.classes.read().by_type.contains_key(&TypeId::of::<T>())
    }

    pub fn class_count(&self) -> usize {
        self.classes.read().by_type.len()
    }

    /// All registered classes, ordered by name.
    pub fn classes(&self) -> Vec<Arc<Metaclass>> {
        self.classes.read().by_name.values().cloned().collect()
    }

    /// Runs every submitted declaration whose type is not registered yet and
    /// returns how many classes were declared.
    ///
    /// Calling this once during start-up makes every later lookup read-only.
    pub fn declare_submitted(&self) -> ReflectResult<usize> {
        let mut declared = 0;
        for declaration in inventory::iter::<ClassDeclaration> {
            if !self
                .classes
                .read()
                .by_type
                .contains_key(&(declaration.type_id)())
            {
                self.run_declaration(declaration)?;
                declared += 1;
            }
        }
        Ok(declared)
    }

    fn run_declaration(&self, declaration: &ClassDeclaration) -> ReflectResult<Arc<Metaclass>> {
        let type_id = (declaration.type_id)();
        let type_name = (declaration.type_name)();
        let in_progress = self.declaring.lock();

        // Another thread may have completed the declaration while we waited.
        if let Some(class) = self.classes.read().by_type.get(&type_id) {
            return Ok(class.clone());
        }

        if !in_progress.borrow_mut().insert(type_id) {
            return Err(ReflectError::binding(
                type_name,
                "the class declaration looks up its own class",
            ));
        }

        debug!("running submitted declaration of {}", type_name);
        let result = {
            let _declaring = DeclaringGuard {
                in_progress: &in_progress,
                type_id,
            };
            (declaration.declare)(&self.config)
        };

        let metaclass = result?;
        if metaclass.type_id() != type_id {
            return Err(ReflectError::binding(
                type_name,
                format!("declaration produced the class of {}", metaclass.type_name()),
            ));
        }

        self.insert(metaclass, false)
    }

    fn insert(
        &self,
        metaclass: Metaclass,
        reject_duplicates: bool,
    ) -> ReflectResult<Arc<Metaclass>> {
        let mut classes = self.classes.write();

        if let Some(existing) = classes.by_type.get(&metaclass.type_id()) {
            if reject_duplicates {
                return Err(ReflectError::binding(
                    metaclass.name(),
                    format!("{} is already registered as '{}'", existing.type_name(), existing.name()),
                ));
            }
            debug!("keeping previously registered class '{}'", existing.name());
            return Ok(existing.clone());
        }

        // A name always designates a single type.
        if let Some(existing) = classes.by_name.get(metaclass.name()) {
            return Err(ReflectError::binding(
                metaclass.name(),
                format!("the name is already taken by {}", existing.type_name()),
            ));
        }

        let metaclass = Arc::new(metaclass);
        classes
            .by_type
            .insert(metaclass.type_id(), metaclass.clone());
        classes
            .by_name
            .insert(metaclass.name().to_string(), metaclass.clone());

        debug!(
            "registered class '{}' ({}, {} properties)",
            metaclass.name(),
            metaclass.type_name(),
            metaclass.property_count()
        );
        Ok(metaclass)
    }
}

/// Clears the in-progress mark of a declaration, even if it panics.
struct DeclaringGuard<'a> {
    in_progress: &'a RefCell<BTreeSet<TypeId>>,
    type_id: TypeId,
}

impl Drop for DeclaringGuard<'_> {
    fn drop(&mut self) {
        self.in_progress.borrow_mut().remove(&self.type_id);
    }
}

static REGISTRY: Lazy<ClassRegistry> =
    Lazy::new(|| ClassRegistry::with_config(ReflectConfig::load_or_default()));

/// The process-wide registry, configured from [`ReflectConfig::load_or_default`].
pub fn registry() -> &'static ClassRegistry {
    &REGISTRY
}

/// Shorthand for [`ClassRegistry::register_class`] on [`registry`].
pub fn register_class(metaclass: Metaclass) -> ReflectResult<Arc<Metaclass>> {
    registry().register_class(metaclass)
}

/// Shorthand for [`ClassRegistry::class_by_type`] on [`registry`].
pub fn class_by_type<T: Reflected>() -> ReflectResult<Arc<Metaclass>> {
    registry().class_by_type::<T>()
}

/// Shorthand for [`ClassRegistry::class_by_name`] on [`registry`].
pub fn class_by_name(name: &str) -> ReflectResult<Arc<Metaclass>> {
    registry().class_by_name(name)
}
