//! Metaclasses: the reflected description of one registered type.
use std::{any::TypeId, collections::BTreeMap};

use crate::{
    property::Property,
    utils::{
        error::{ReflectError, ReflectResult},
        object::{ObjectRef, Reflected},
    },
};

pub mod builder;

pub use builder::ClassBuilder;

/// Name-keyed, ordered collection of the [`Property`]s of one type.
///
/// Properties keep their declaration order; [`Self::property`] resolves a name
/// through an index. A metaclass is immutable once built.
#[derive(Debug)]
pub struct Metaclass {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    properties: Vec<Property>,
    index: BTreeMap<String, usize>,
}

impl Metaclass {
    /// Starts the declaration of the metaclass of `T`.
    pub fn declare<T: Reflected>(name: impl Into<String>) -> ClassBuilder<T> {
        ClassBuilder::new(name)
    }

    pub(crate) fn new(
        name: String,
        type_id: TypeId,
        type_name: &'static str,
        properties: Vec<Property>,
    ) -> Self {
        let index = properties
            .iter()
            .enumerate()
            .map(|(i, property)| (property.name().to_string(), i))
            .collect();

        Self {
            name,
            type_id,
            type_name,
            properties,
            index,
        }
    }

    /// Name the class was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust name of the reflected type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `true` if `object` is an instance of the reflected type.
    pub fn is_type_of<'a>(&self, object: impl Into<ObjectRef<'a>>) -> bool {
        object.into().type_id() == self.type_id
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> ReflectResult<&Property> {
        self.index
            .get(name)
            .map(|&i| &self.properties[i])
            .ok_or_else(|| ReflectError::PropertyNotFound {
                class: self.name.clone(),
                property: name.to_string(),
            })
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Property at `index` in declaration order.
    pub fn property_at(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Iterates the properties in declaration order.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &Property> + '_ {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field, property::Accessor};

    struct Point {
        x: i32,
        y: i32,
    }

    impl Point {
        fn norm1(&self) -> i32 {
            self.x.abs() + self.y.abs()
        }
    }

    fn point_class() -> Metaclass {
        Metaclass::declare::<Point>("Point")
            .property("y", field!(Point, y))
            .property("x", field!(Point, x))
            .property("norm1", Accessor::value(Point::norm1))
            .build()
            .unwrap()
    }

    #[test]
    fn properties_keep_declaration_order() {
        let class = point_class();
        let names: Vec<_> = class.properties().map(|p| p.name()).collect();
        assert_eq!(names, ["y", "x", "norm1"]);
        assert_eq!(class.property_count(), 3);
        assert_eq!(class.property_at(2).map(|p| p.name()), Some("norm1"));
        assert!(class.property_at(3).is_none());
    }

    #[test]
    fn lookup_by_name() {
        let class = point_class();
        assert_eq!(class.name(), "Point");
        assert_eq!(class.type_id(), TypeId::of::<Point>());
        assert!(class.has_property("x"));
        assert_eq!(class.property("x").unwrap().name(), "x");

        let err = class.property("z").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Class 'Point' has no property named 'z'");
    }

    #[test]
    fn type_check_of_objects() {
        let class = point_class();
        assert!(class.is_type_of(&Point { x: 1, y: 2 }));
        assert!(!class.is_type_of(&(1, 2)));
    }
}
