//! Runtime property reflection for the Hyperion engine.
//!
//! The crate lets calling code enumerate and access the named properties of an
//! object knowing only a property name and a type-erased handle to the object.
//!
//! - A [`property::Property`] erases the way a value is read (a field, a
//!   getter returning a value, an accessor borrowing it in place) and written
//!   behind [`property::Property::get`] and [`property::Property::set`].
//! - Whether an access is allowed is decided per call and per instance by the
//!   property's readability and writability [`property::Policy`]: a constant, a
//!   method, a `bool` field or any callable of the owning type.
//! - A [`class::Metaclass`] holds the properties of one type; the
//!   [`registry::ClassRegistry`] maps types and class names to metaclasses.
//!
//! ```rust
//! use hyreflect::prelude::*;
//!
//! struct Sensor {
//!     reading: f64,
//!     calibrated: bool,
//! }
//!
//! impl Sensor {
//!     fn reading(&self) -> f64 {
//!         self.reading
//!     }
//! }
//!
//! let class = Metaclass::declare::<Sensor>("Sensor")
//!     .property("reading", Accessor::value(Sensor::reading))
//!     .readable(Policy::field(|sensor: &Sensor| &sensor.calibrated))
//!     .build()
//!     .unwrap();
//!
//! let reading = class.property("reading").unwrap();
//! let sensor = Sensor { reading: 0.25, calibrated: true };
//! assert_eq!(reading.get(&sensor).unwrap(), Value::Real(0.25));
//! assert!(!reading.writable(&sensor).unwrap());
//!
//! let raw = Sensor { reading: 9.0, calibrated: false };
//! assert!(reading.get(&raw).unwrap_err().is_permission_denied());
//! ```

pub mod class;
pub mod magic;
pub mod property;
pub mod registry;
pub mod utils;
pub mod value;

pub extern crate inventory;

pub mod prelude {
    pub use crate::{
        class::{ClassBuilder, Metaclass},
        declare_class, field,
        property::{Accessor, Policy, Property},
        registry::{ClassRegistry, class_by_name, class_by_type, register_class, registry},
        utils::{
            conf::ReflectConfig,
            error::{ReflectError, ReflectResult},
            object::{ObjectMut, ObjectRef, Reflected},
        },
        value::{ReflectValue, Value, ValueKind},
    };
}
