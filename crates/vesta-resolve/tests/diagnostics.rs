use vesta_classpath::InMemoryProvider;
use vesta_config::{CompilerOptions, SourceLevel};
use vesta_core::{Severity, Span};
use vesta_resolve::{Allocation, CompilationContext, Invocation};
use vesta_types::{
    CallKind, ClassDef, ClassKind, ClassStub, CtorCall, CtorDef, MethodCall, MethodDef,
    MethodStub, NoClasspath, ResolutionResult, StubType, Type, TypeStore,
};

use pretty_assertions::assert_eq;

fn method(name: &str, params: Vec<Type>) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        type_params: vec![],
        params,
        return_type: Type::Void,
        throws: vec![],
        is_static: false,
        is_varargs: false,
        is_abstract: false,
    }
}

fn define(store: &mut TypeStore, name: &str, methods: Vec<MethodDef>) -> Type {
    let object = Type::class(store.well_known().object, vec![]);
    let id = store.add_class(ClassDef {
        name: name.to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(object),
        interfaces: vec![],
        constructors: vec![],
        methods,
    });
    Type::class(id, vec![])
}

fn invocation(span: Span, receiver: Type, name: &str, args: Vec<Type>) -> Invocation {
    Invocation {
        span,
        call: MethodCall {
            receiver,
            call_kind: CallKind::Instance,
            name: name.to_string(),
            args,
            expected_return: None,
            explicit_type_args: None,
        },
    }
}

#[test]
fn undefined_method_message() {
    let mut store = TypeStore::with_minimal_jdk();
    let recv = define(&mut store, "com.example.R", vec![]);
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    unit.resolve_invocation(&invocation(Span::new(0, 5), recv, "n", vec![]));
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "undefined-method");
    assert_eq!(diags[0].message, "The method n() is undefined for the type R");
}

#[test]
fn ambiguous_method_names_the_first_declaration() {
    let mut store = TypeStore::with_minimal_jdk();
    let string = Type::class(store.well_known().string, vec![]);
    let object = Type::class(store.well_known().object, vec![]);
    let recv = define(
        &mut store,
        "com.example.Y",
        vec![
            method("m", vec![string.clone(), object.clone()]),
            method("m", vec![object, string.clone()]),
        ],
    );
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    unit.resolve_invocation(&invocation(
        Span::new(0, 5),
        recv,
        "m",
        vec![string.clone(), string],
    ));
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "ambiguous");
    assert_eq!(
        diags[0].message,
        "The method m(String, Object) is ambiguous for the type Y"
    );
}

#[test]
fn missing_parameter_type_is_reported_against_the_method() {
    let mut store = TypeStore::with_minimal_jdk();
    let zork = store.resolve("com.example.Zork", &NoClasspath);
    let string = Type::class(store.well_known().string, vec![]);
    let recv = define(&mut store, "com.example.Y", vec![method("m", vec![zork])]);
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    unit.resolve_invocation(&invocation(Span::new(0, 5), recv, "m", vec![string]));
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "missing-type");
    assert_eq!(
        diags[0].message,
        "The method m(Zork) from the type Y refers to the missing type Zork"
    );
}

#[test]
fn unresolved_type_is_reported_once_per_name() {
    let store = TypeStore::with_minimal_jdk();
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    let first = unit.resolve_type_name("com.example.Gone", Span::new(0, 5));
    assert!(matches!(first, Type::Missing(_)));
    unit.resolve_type_name("com.example.Gone", Span::new(10, 15));
    unit.resolve_type_name("com.example.AlsoGone", Span::new(20, 25));

    let diags = unit.finish();
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].code, "unresolved-type");
    assert_eq!(diags[0].message, "com.example.Gone cannot be resolved to a type");
    assert_eq!(diags[1].message, "com.example.AlsoGone cannot be resolved to a type");
}

#[test]
fn classpath_provider_supplies_referenced_types() {
    let mut provider = InMemoryProvider::new();
    provider
        .add(ClassStub {
            name: "com.example.Widget".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: Some(StubType::named("java.lang.Object")),
            interfaces: vec![],
            constructors: vec![],
            methods: vec![MethodStub {
                name: "render".to_string(),
                type_params: vec![],
                params: vec![StubType::named("java.lang.String")],
                return_type: StubType::Void,
                throws: vec![],
                is_static: false,
                is_varargs: false,
                is_abstract: false,
            }],
        })
        .unwrap();

    let store = TypeStore::with_minimal_jdk();
    let mut unit = CompilationContext::new(store, &provider, CompilerOptions::default());

    let widget = unit.resolve_type_name("com.example.Widget", Span::new(0, 5));
    assert!(matches!(widget, Type::Class(_)));

    let string = Type::class(unit.store().well_known().string, vec![]);
    let result = unit.resolve_invocation(&invocation(
        Span::new(10, 20),
        widget,
        "render",
        vec![string],
    ));
    assert!(matches!(result, ResolutionResult::Bound(_)));
    assert_eq!(unit.finish(), vec![]);
}

#[test]
fn diagnostics_come_back_in_source_order() {
    let mut store = TypeStore::with_minimal_jdk();
    let recv = define(&mut store, "com.example.R", vec![]);
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    // Resolve out of source order; finish() sorts by span.
    unit.resolve_invocation(&invocation(Span::new(50, 55), recv.clone(), "b", vec![]));
    unit.resolve_invocation(&invocation(Span::new(5, 9), recv, "a", vec![]));

    let diags = unit.finish();
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].span, Some(Span::new(5, 9)));
    assert_eq!(diags[1].span, Some(Span::new(50, 55)));
}

fn diamond_class(store: &mut TypeStore) -> vesta_types::ClassId {
    let object = Type::class(store.well_known().object, vec![]);
    let t = store.add_type_param("T", vec![object.clone()]);
    store.add_class(ClassDef {
        name: "com.example.Box".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        super_class: Some(object),
        interfaces: vec![],
        constructors: vec![CtorDef {
            type_params: vec![],
            params: vec![Type::TypeVar(t)],
            throws: vec![],
            is_varargs: false,
            is_accessible: true,
        }],
        methods: vec![],
    })
}

#[test]
fn diamond_conflict_reports_cannot_infer() {
    let mut store = TypeStore::with_minimal_jdk();
    let boxy = diamond_class(&mut store);
    let string = Type::class(store.well_known().string, vec![]);
    let integer = Type::class(store.well_known().integer, vec![]);
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    unit.resolve_allocation(&Allocation {
        span: Span::new(0, 12),
        call: CtorCall {
            class: Type::Raw(boxy),
            diamond: true,
            args: vec![integer],
            explicit_type_args: None,
            expected_type: Some(Type::class(boxy, vec![string])),
        },
    });
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "cannot-infer");
    assert_eq!(diags[0].message, "Cannot infer type arguments for Box<>");
}

#[test]
fn constructor_arity_mismatch_is_undefined() {
    let mut store = TypeStore::with_minimal_jdk();
    let boxy = diamond_class(&mut store);
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());

    unit.resolve_allocation(&Allocation {
        span: Span::new(0, 10),
        call: CtorCall {
            class: Type::Raw(boxy),
            diamond: false,
            args: vec![],
            explicit_type_args: None,
            expected_type: None,
        },
    });
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "not-applicable");
    assert_eq!(diags[0].message, "The constructor Box() is undefined");
}

#[test]
fn redundant_type_arguments_advisory_is_configurable() {
    let build = || {
        let mut store = TypeStore::with_minimal_jdk();
        let boxy = diamond_class(&mut store);
        let string = Type::class(store.well_known().string, vec![]);
        let alloc = Allocation {
            span: Span::new(0, 24),
            call: CtorCall {
                class: Type::class(boxy, vec![string.clone()]),
                diamond: false,
                args: vec![string],
                explicit_type_args: None,
                expected_type: None,
            },
        };
        (store, alloc)
    };

    // Default: a warning.
    let (store, alloc) = build();
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());
    unit.resolve_allocation(&alloc);
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "redundant-type-arguments");
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(
        diags[0].message,
        "Redundant specification of type arguments <String>"
    );

    // Raised to an error.
    let (store, alloc) = build();
    let mut options = CompilerOptions::default();
    options.redundant_type_arguments = Some(Severity::Error);
    let mut unit = CompilationContext::new(store, &NoClasspath, options);
    unit.resolve_allocation(&alloc);
    let diags = unit.finish();
    assert_eq!(diags[0].severity, Severity::Error);

    // Disabled entirely.
    let (store, alloc) = build();
    let mut options = CompilerOptions::default();
    options.redundant_type_arguments = None;
    let mut unit = CompilationContext::new(store, &NoClasspath, options);
    unit.resolve_allocation(&alloc);
    assert_eq!(unit.finish(), vec![]);
}

#[test]
fn unchecked_warnings_respect_the_option() {
    let build = || {
        let mut store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let list_string = Type::class(list, vec![string]);
        let recv = define(
            &mut store,
            "com.example.Y",
            vec![method("m", vec![list_string])],
        );
        let inv = invocation(Span::new(0, 8), recv, "m", vec![Type::Raw(list)]);
        (store, inv)
    };

    let (store, inv) = build();
    let mut unit = CompilationContext::new(store, &NoClasspath, CompilerOptions::default());
    unit.resolve_invocation(&inv);
    let diags = unit.finish();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "unchecked");
    assert_eq!(
        diags[0].message,
        "Type safety: unchecked conversion from a raw type"
    );

    let (store, inv) = build();
    let mut options = CompilerOptions::default();
    options.report_unchecked = false;
    let mut unit = CompilationContext::new(store, &NoClasspath, options);
    unit.resolve_invocation(&inv);
    assert_eq!(unit.finish(), vec![]);
}

#[test]
fn source_level_gates_target_typed_diamonds() {
    let run = |level: SourceLevel| {
        let mut store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let options = CompilerOptions {
            source_level: level,
            ..CompilerOptions::default()
        };
        let mut unit = CompilationContext::new(store, &NoClasspath, options);
        let result = unit.resolve_allocation(&Allocation {
            span: Span::new(0, 16),
            call: CtorCall {
                class: Type::Raw(array_list),
                diamond: true,
                args: vec![],
                explicit_type_args: None,
                expected_type: Some(Type::class(list, vec![string])),
            },
        });
        let ResolutionResult::Bound(bound) = result else {
            panic!("expected a binding, got {result:?}");
        };
        let elem = unit.store().well_known();
        let elem = match level {
            SourceLevel::Java8 => Type::class(elem.string, vec![]),
            SourceLevel::Java7 => Type::class(elem.object, vec![]),
        };
        // Java 7 ignores the target and erases to the bound; Java 8 adopts it.
        assert_eq!(bound.return_type, Type::class(array_list, vec![elem]));
        assert_eq!(unit.finish(), vec![]);
    };

    run(SourceLevel::Java8);
    run(SourceLevel::Java7);
}
