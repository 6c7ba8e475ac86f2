use vesta_config::SourceLevel;
use vesta_types::{
    check_applicability, resolve_method_call, resolve_overload, Applicability, CallKind, ClassDef,
    ClassId, ClassKind, InvocationSite, MethodCall, MethodDef, MethodSig, Phase, ResolutionResult,
    TyContext, Type, TypeStore,
};

use pretty_assertions::assert_eq;

fn method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        type_params: vec![],
        params,
        return_type,
        throws: vec![],
        is_static: false,
        is_varargs: false,
        is_abstract: false,
    }
}

fn define(env: &mut TypeStore, name: &str, methods: Vec<MethodDef>) -> ClassId {
    let object = Type::class(env.well_known().object, vec![]);
    env.add_class(ClassDef {
        name: name.to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(object),
        interfaces: vec![],
        constructors: vec![],
        methods,
    })
}

fn call(receiver: Type, name: &str, args: Vec<Type>) -> MethodCall {
    MethodCall {
        receiver,
        call_kind: CallKind::Instance,
        name: name.to_string(),
        args,
        expected_return: None,
        explicit_type_args: None,
    }
}

fn run(env: &TypeStore, call: &MethodCall) -> ResolutionResult {
    let mut ctx = TyContext::new(env);
    resolve_method_call(&mut ctx, call, SourceLevel::Java8)
}

#[test]
fn strict_phase_wins_before_boxing_is_tried() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = Type::class(env.well_known().integer, vec![]);
    let owner = define(
        &mut env,
        "com.example.X",
        vec![
            method("m", vec![integer], Type::Void),
            method("m", vec![Type::int()], Type::Void),
        ],
    );

    let result = run(&env, &call(Type::class(owner, vec![]), "m", vec![Type::int()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.params, vec![Type::int()]);
    assert_eq!(bound.phase, Phase::Strict);
}

#[test]
fn loose_phase_boxes_when_strict_finds_nothing() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = Type::class(env.well_known().integer, vec![]);
    let owner = define(
        &mut env,
        "com.example.X",
        vec![method("m", vec![integer.clone()], Type::Void)],
    );

    let result = run(&env, &call(Type::class(owner, vec![]), "m", vec![Type::int()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.params, vec![integer]);
    assert_eq!(bound.phase, Phase::Loose);
}

#[test]
fn most_specific_parameter_type_wins() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let object = Type::class(env.well_known().object, vec![]);
    // Less specific overload declared first.
    let owner = define(
        &mut env,
        "com.example.X",
        vec![
            method("m", vec![object], Type::Void),
            method("m", vec![string.clone()], Type::Void),
        ],
    );

    let result = run(&env, &call(Type::class(owner, vec![]), "m", vec![string.clone()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.params, vec![string]);
}

#[test]
fn incomparable_candidates_are_ambiguous_in_declaration_order() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let object = Type::class(env.well_known().object, vec![]);
    let owner = define(
        &mut env,
        "com.example.X",
        vec![
            method("m", vec![string.clone(), object.clone()], Type::Void),
            method("m", vec![object.clone(), string.clone()], Type::Void),
        ],
    );

    let result = run(
        &env,
        &call(
            Type::class(owner, vec![]),
            "m",
            vec![string.clone(), string.clone()],
        ),
    );
    let ResolutionResult::Ambiguous { candidates } = result else {
        panic!("expected ambiguity, got {result:?}");
    };
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].params, vec![string, object]);
}

#[test]
fn fixed_arity_is_preferred_over_varargs() {
    let mut env = TypeStore::with_minimal_jdk();
    let mut spread = method("m", vec![Type::array(Type::int())], Type::Void);
    spread.is_varargs = true;
    let owner = define(
        &mut env,
        "com.example.X",
        vec![spread, method("m", vec![Type::int(), Type::int()], Type::Void)],
    );

    let result = run(
        &env,
        &call(
            Type::class(owner, vec![]),
            "m",
            vec![Type::int(), Type::int()],
        ),
    );
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert!(!bound.sig.is_varargs);
    assert!(!bound.used_varargs);
}

#[test]
fn applicability_is_monotonic_across_phases() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let owner = define(&mut env, "com.example.X", vec![]);
    let sig = |params: Vec<Type>, is_varargs: bool| MethodSig {
        owner,
        name: "m".to_string(),
        type_params: vec![],
        params,
        return_type: Type::Void,
        is_varargs,
        is_static: false,
        is_constructor: false,
    };

    // Strictly applicable stays applicable once boxing is allowed.
    let fixed = sig(vec![string.clone()], false);
    let args = vec![string];
    let site = InvocationSite {
        args: &args,
        explicit_type_args: None,
        expected_type: None,
    };
    for phase in [Phase::Strict, Phase::Loose] {
        assert!(matches!(
            check_applicability(&env, &fixed, &site, phase, SourceLevel::Java8),
            Applicability::Applicable(_)
        ));
    }

    // A varargs signature matched strictly (array passed through) stays
    // applicable in every later phase.
    let spread = sig(vec![Type::array(Type::int())], true);
    let args = vec![Type::array(Type::int())];
    let site = InvocationSite {
        args: &args,
        explicit_type_args: None,
        expected_type: None,
    };
    for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
        let result = check_applicability(&env, &spread, &site, phase, SourceLevel::Java8);
        let Applicability::Applicable(found) = result else {
            panic!("expected applicability in {phase:?}, got {result:?}");
        };
        assert!(!found.used_varargs);
    }
}

#[test]
fn tied_identical_signatures_stay_ambiguous() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let a = define(&mut env, "com.example.A", vec![]);
    let b = define(&mut env, "com.example.B", vec![]);
    let sig = |owner: ClassId| MethodSig {
        owner,
        name: "m".to_string(),
        type_params: vec![],
        params: vec![string.clone()],
        return_type: Type::Void,
        is_varargs: false,
        is_static: false,
        is_constructor: false,
    };

    // Identical parameter lists from distinct members are mutually "at least
    // as specific"; neither may silently win.
    let candidates = vec![sig(a), sig(b)];
    let args = vec![string];
    let site = InvocationSite {
        args: &args,
        explicit_type_args: None,
        expected_type: None,
    };
    let result = resolve_overload(&env, &candidates, &site, SourceLevel::Java8);
    let ResolutionResult::Ambiguous { candidates } = result else {
        panic!("expected ambiguity, got {result:?}");
    };
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].owner, a);
}

#[test]
fn arity_mismatch_reports_the_attempted_candidates() {
    let mut env = TypeStore::with_minimal_jdk();
    let owner = define(
        &mut env,
        "com.example.X",
        vec![method("m", vec![Type::int()], Type::Void)],
    );

    let result = run(&env, &call(Type::class(owner, vec![]), "m", vec![]));
    let ResolutionResult::NotApplicable { attempted } = result else {
        panic!("expected rejection, got {result:?}");
    };
    assert_eq!(attempted.len(), 1);
    assert_eq!(attempted[0].params, vec![Type::int()]);
}

#[test]
fn unknown_member_name_yields_empty_attempted_list() {
    let mut env = TypeStore::with_minimal_jdk();
    let owner = define(&mut env, "com.example.X", vec![]);

    let result = run(&env, &call(Type::class(owner, vec![]), "nope", vec![]));
    assert_eq!(result, ResolutionResult::NotApplicable { attempted: vec![] });
}

#[test]
fn override_shadows_the_supertype_declaration() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let object = Type::class(env.well_known().object, vec![]);
    let base = define(
        &mut env,
        "com.example.Base",
        vec![
            method("m", vec![string.clone()], object.clone()),
            method("baseOnly", vec![], Type::Void),
        ],
    );
    let sub = env.add_class(ClassDef {
        name: "com.example.Sub".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(base, vec![])),
        interfaces: vec![],
        constructors: vec![],
        // Covariant override.
        methods: vec![method("m", vec![string.clone()], string.clone())],
    });

    let result = run(&env, &call(Type::class(sub, vec![]), "m", vec![string.clone()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.sig.owner, sub);
    assert_eq!(bound.return_type, string);

    // Inherited members are still visible.
    let result = run(&env, &call(Type::class(sub, vec![]), "baseOnly", vec![]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.sig.owner, base);
}

#[test]
fn static_call_kind_filters_instance_methods() {
    let mut env = TypeStore::with_minimal_jdk();
    let mut stat = method("util", vec![], Type::Void);
    stat.is_static = true;
    let owner = define(
        &mut env,
        "com.example.X",
        vec![method("inst", vec![], Type::Void), stat],
    );

    let mut c = call(Type::class(owner, vec![]), "inst", vec![]);
    c.call_kind = CallKind::Static;
    assert_eq!(run(&env, &c), ResolutionResult::NotApplicable { attempted: vec![] });

    let mut c = call(Type::class(owner, vec![]), "util", vec![]);
    c.call_kind = CallKind::Static;
    assert!(matches!(run(&env, &c), ResolutionResult::Bound(_)));
}

#[test]
fn type_variable_receiver_resolves_through_its_bound() {
    let mut env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let string = Type::class(env.well_known().string, vec![]);
    let t = env.add_type_param("T", vec![Type::class(list, vec![string.clone()])]);

    let result = run(&env, &call(Type::TypeVar(t), "get", vec![Type::int()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.return_type, string);
}

#[test]
fn raw_receiver_sees_erased_members() {
    let env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let object = Type::class(env.well_known().object, vec![]);

    let result = run(&env, &call(Type::Raw(list), "get", vec![Type::int()]));
    let ResolutionResult::Bound(bound) = result else {
        panic!("expected a binding, got {result:?}");
    };
    assert_eq!(bound.return_type, object);
}
