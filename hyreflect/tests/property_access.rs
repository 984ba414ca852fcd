use std::sync::Arc;

use hyreflect::prelude::*;

struct MyClass {
    p: i32,
    m_b: bool,
}

impl MyClass {
    fn new(b: bool) -> Self {
        Self { p: 0, m_b: b }
    }

    fn set(&mut self, x: i32) {
        self.p = x;
    }

    fn get(&self) -> i32 {
        self.p
    }

    fn b1(&self) -> bool {
        true
    }

    fn b2(&self) -> bool {
        false
    }
}

fn declare(class: ClassBuilder<MyClass>) -> ClassBuilder<MyClass> {
    class
        // constant value
        .property("p0", field!(MyClass, p))
        .readable(false)
        .writable(true)
        .property("p1", field!(MyClass, p))
        .readable(true)
        .writable(false)
        .property("p2", field!(MyClass, p))
        .readable(false)
        .writable(false)
        // function
        .property("p3", field!(MyClass, p))
        .readable(Policy::member(MyClass::b1))
        .property("p4", field!(MyClass, p))
        .readable(Policy::member(MyClass::b2))
        .property("p5", field!(MyClass, p))
        .readable(Policy::free(MyClass::b1))
        .property("p6", field!(MyClass, p))
        .readable(Policy::field(|object: &MyClass| &object.m_b))
        .property("p7", field!(MyClass, p))
        .readable(Policy::free(|object: &MyClass| object.m_b))
        // implicit, based on the availability of a getter/setter
        .property("p8", Accessor::value(MyClass::get))
        .property("p9", field!(MyClass, p))
        .property("p10", Accessor::value(MyClass::get).with_setter(MyClass::set))
}

declare_class!(MyClass, "PropertyAccessTest::MyClass", declare);

struct Fixture {
    object_t: MyClass,
    object_f: MyClass,
    metaclass: Arc<Metaclass>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            object_t: MyClass::new(true),
            object_f: MyClass::new(false),
            metaclass: class_by_type::<MyClass>().expect("MyClass is declared"),
        }
    }

    fn readable(&self, name: &str) -> (bool, bool) {
        let property = self.metaclass.property(name).unwrap();
        (
            property.readable(&self.object_t).unwrap(),
            property.readable(&self.object_f).unwrap(),
        )
    }

    fn writable(&self, name: &str) -> (bool, bool) {
        let property = self.metaclass.property(name).unwrap();
        (
            property.writable(&self.object_t).unwrap(),
            property.writable(&self.object_f).unwrap(),
        )
    }
}

#[test]
fn readable_implicit() {
    let fixture = Fixture::new();
    assert_eq!(fixture.readable("p8"), (true, true));
    assert_eq!(fixture.readable("p9"), (true, true));
    assert_eq!(fixture.readable("p10"), (true, true));
}

#[test]
fn readable_static() {
    let fixture = Fixture::new();
    assert_eq!(fixture.readable("p0"), (false, false));
    assert_eq!(fixture.readable("p1"), (true, true));
    assert_eq!(fixture.readable("p2"), (false, false));
    assert_eq!(fixture.readable("p3"), (true, true));
    assert_eq!(fixture.readable("p4"), (false, false));
    assert_eq!(fixture.readable("p5"), (true, true));
}

#[test]
fn readable_dynamic() {
    let fixture = Fixture::new();
    assert_eq!(fixture.readable("p6"), (true, false));
    assert_eq!(fixture.readable("p7"), (true, false));
}

#[test]
fn writable_implicit() {
    let fixture = Fixture::new();
    assert_eq!(fixture.writable("p8"), (false, false));
    assert_eq!(fixture.writable("p9"), (true, true));
    assert_eq!(fixture.writable("p10"), (true, true));
}

#[test]
fn writable_static() {
    let fixture = Fixture::new();
    assert_eq!(fixture.writable("p0"), (true, true));
    assert_eq!(fixture.writable("p1"), (false, false));
    assert_eq!(fixture.writable("p2"), (false, false));
}

#[test]
fn data_member_predicate_follows_live_state() {
    let fixture = Fixture::new();
    let p6 = fixture.metaclass.property("p6").unwrap();

    let mut object = MyClass::new(true);
    assert!(p6.readable(&object).unwrap());
    assert!(p6.readable(&object).unwrap(), "unchanged instance, same answer");

    object.m_b = false;
    assert!(!p6.readable(&object).unwrap());
    assert!(matches!(
        p6.get(&object),
        Err(ReflectError::ForbiddenRead { .. })
    ));

    object.m_b = true;
    assert_eq!(p6.get(&object).unwrap(), Value::Int(0));
}

#[test]
fn write_only_field_accepts_writes_but_refuses_reads() {
    let fixture = Fixture::new();
    let p0 = fixture.metaclass.property("p0").unwrap();
    let mut object = MyClass::new(true);

    p0.set(&mut object, 12).unwrap();
    assert_eq!(object.p, 12);

    let err = p0.get(&object).unwrap_err();
    assert!(err.is_permission_denied());
    assert!(!err.is_defect());
}

#[test]
fn getter_only_property_refuses_writes() {
    let fixture = Fixture::new();
    let p8 = fixture.metaclass.property("p8").unwrap();
    let mut object = MyClass::new(true);
    object.p = 5;

    assert_eq!(p8.getter_kind(), hyreflect::property::GetterKind::Value);
    assert!(!p8.has_setter());
    assert_eq!(p8.get(&object).unwrap(), Value::Int(5));

    let err = p8.set(&mut object, 6).unwrap_err();
    assert!(matches!(err, ReflectError::ForbiddenWrite { .. }), "{err}");
    assert_eq!(object.p, 5, "a refused write must not touch the object");
}

#[test]
fn getter_setter_pair_round_trips() {
    let fixture = Fixture::new();
    let p10 = fixture.metaclass.property("p10").unwrap();
    let mut object = MyClass::new(false);

    p10.set(&mut object, 42).unwrap();
    assert_eq!(p10.get(&object).unwrap(), Value::Int(42));

    let current = p10.get(&object).unwrap();
    p10.set(&mut object, current.clone()).unwrap();
    assert_eq!(p10.get(&object).unwrap(), current);
}

#[test]
fn set_checks_the_value_type_first() {
    let fixture = Fixture::new();
    let p9 = fixture.metaclass.property("p9").unwrap();
    let mut object = MyClass::new(true);
    object.p = 1;

    let err = p9.set(&mut object, "seven").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Type mismatch on property 'p9': expected Int, found String"
    );

    let err = p9.set(&mut object, Value::Int(i64::MAX)).unwrap_err();
    assert!(matches!(err, ReflectError::TypeMismatch { .. }), "{err}");
    assert_eq!(object.p, 1);
}

#[test]
fn foreign_objects_are_type_mismatches() {
    let fixture = Fixture::new();
    let p6 = fixture.metaclass.property("p6").unwrap();
    let other = String::from("not a MyClass");

    assert!(matches!(
        p6.readable(&other),
        Err(ReflectError::TypeMismatch { .. })
    ));
    assert!(matches!(
        p6.get(&other),
        Err(ReflectError::TypeMismatch { .. })
    ));

    // Constant policies do not look at the object.
    let p1 = fixture.metaclass.property("p1").unwrap();
    assert!(p1.readable(&other).unwrap());
}

#[test]
fn unknown_property_is_not_found() {
    let fixture = Fixture::new();
    let err = fixture.metaclass.property("p11").unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ReflectError::PropertyNotFound { .. }));
}

#[test]
fn metaclass_lists_every_property() {
    let fixture = Fixture::new();
    let metaclass = &fixture.metaclass;
    assert_eq!(metaclass.name(), "PropertyAccessTest::MyClass");
    assert_eq!(metaclass.property_count(), 11);

    let names: Vec<_> = metaclass.properties().map(|p| p.name().to_string()).collect();
    let expected: Vec<_> = (0..=10).map(|i| format!("p{i}")).collect();
    assert_eq!(names, expected);
    assert!(metaclass.properties().all(|p| p.kind() == ValueKind::Int));
}

#[test]
fn properties_are_shared_across_threads() {
    let metaclass = class_by_type::<MyClass>().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let metaclass = Arc::clone(&metaclass);
            std::thread::spawn(move || {
                let mut object = MyClass::new(i % 2 == 0);
                let p6 = metaclass.property("p6").unwrap();
                let p10 = metaclass.property("p10").unwrap();
                for n in 0..100 {
                    p10.set(&mut object, n).unwrap();
                    assert_eq!(p10.get(&object).unwrap(), Value::Int(i64::from(n)));
                    assert_eq!(p6.readable(&object).unwrap(), i % 2 == 0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("reader thread panicked");
    }
}

struct Meter {
    reading: i32,
    calibrated: Option<bool>,
}

#[test]
fn failing_read_predicates_are_not_permission_denials() {
    let metaclass = ClassBuilder::<Meter>::new("Meter")
        .property("reading", field!(Meter, reading))
        .readable(Policy::try_free(|m: &Meter| {
            m.calibrated.ok_or("calibration unknown")
        }))
        .property("raw", field!(Meter, reading))
        .readable(Policy::free(|m: &Meter| {
            m.calibrated.expect("calibration unknown")
        }))
        .build()
        .unwrap();

    let unknown = Meter {
        reading: 12,
        calibrated: None,
    };
    for name in ["reading", "raw"] {
        let property = metaclass.property(name).unwrap();
        let err = property.get(&unknown).unwrap_err();
        assert!(matches!(err, ReflectError::PredicateFailure { .. }), "{err}");
        assert!(!err.is_permission_denied());
        assert!(matches!(
            property.readable(&unknown).unwrap_err(),
            ReflectError::PredicateFailure { .. }
        ));
    }

    let ready = Meter {
        reading: 12,
        calibrated: Some(true),
    };
    assert_eq!(metaclass.property("reading").unwrap().get(&ready).unwrap(), Value::Int(12));
}
