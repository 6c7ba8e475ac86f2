//! Subtyping, conversion, and erasure over [`Type`] descriptors.
//!
//! All walks over the supertype graph are iterative (queue + seen set), so a
//! cyclic hierarchy terminates here and is reported separately by
//! [`crate::TypeStore::find_hierarchy_cycle`].

use std::collections::{HashSet, VecDeque};

use crate::{ClassType, PrimitiveType, Substitution, Type, TypeEnv, TypeVarId, WildcardBound};

/// Widening primitive conversion (JLS 5.1.2).
pub fn widens_primitive(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short => matches!(to, Int | Long | Float | Double),
        Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        Boolean | Double => false,
    }
}

pub(crate) fn boxed_type(env: &dyn TypeEnv, p: PrimitiveType) -> Type {
    Type::class(env.well_known().boxed(p), vec![])
}

pub(crate) fn unboxed_primitive(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(ClassType { def, args }) if args.is_empty() => env.well_known().unboxed(*def),
        _ => None,
    }
}

/// Reference subtyping (JLS 4.10), with identity on primitives.
///
/// `Missing` is a subtype only of itself and `Object`; it never silently
/// matches a resolved type. Raw types relate to other raw/non-generic uses by
/// erasure but are *not* subtypes of parameterized instantiations (that is an
/// unchecked conversion, see [`is_assignable`]).
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let mut guard = HashSet::new();
    subtype_inner(env, sub, sup, &mut guard)
}

fn subtype_inner(
    env: &dyn TypeEnv,
    sub: &Type,
    sup: &Type,
    guard: &mut HashSet<TypeVarId>,
) -> bool {
    if sub == sup {
        return true;
    }

    match (sub, sup) {
        (Type::Missing(_), Type::Class(ClassType { def, args })) => {
            *def == env.well_known().object && args.is_empty()
        }
        (Type::Missing(_), _) | (_, Type::Missing(_)) => false,

        (Type::Null, _) => sup.is_reference(),

        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Void, _) | (_, Type::Void) => false,

        // A type variable is below anything one of its upper bounds is below.
        (Type::TypeVar(v), _) => {
            if !guard.insert(*v) {
                return false;
            }
            let ok = env
                .type_param(*v)
                .map(|tp| {
                    tp.upper_bounds
                        .iter()
                        .any(|b| subtype_inner(env, b, sup, guard))
                })
                .unwrap_or(false);
            guard.remove(v);
            ok
        }

        // Anything below a capture variable's lower bound is below the
        // variable itself (the only way *into* a type variable).
        (_, Type::TypeVar(w)) => {
            if !guard.insert(*w) {
                return false;
            }
            let ok = env
                .type_param(*w)
                .and_then(|tp| tp.lower_bound.as_ref())
                .map(|lb| subtype_inner(env, sub, lb, guard))
                .unwrap_or(false);
            guard.remove(w);
            ok
        }

        (Type::Intersection(parts), _) => parts.iter().any(|p| subtype_inner(env, p, sup, guard)),
        (_, Type::Intersection(parts)) => parts.iter().all(|p| subtype_inner(env, sub, p, guard)),

        (Type::Array(e1), Type::Array(e2)) => match (e1.as_ref(), e2.as_ref()) {
            (Type::Primitive(p), Type::Primitive(q)) => p == q,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            _ => subtype_inner(env, e1, e2, guard),
        },
        (Type::Array(_), Type::Class(ClassType { def, args })) if args.is_empty() => {
            let wk = env.well_known();
            *def == wk.object || *def == wk.cloneable || *def == wk.serializable
        }

        (Type::Class(_) | Type::Raw(_), Type::Class(ClassType { def, args })) => {
            let Some(inst) = instantiate_as_supertype(env, sub, *def) else {
                return false;
            };
            if args.is_empty() {
                return true;
            }
            match inst {
                Type::Class(ClassType { args: sargs, .. }) if sargs.len() == args.len() => args
                    .iter()
                    .zip(sargs.iter())
                    .all(|(want, have)| contains(env, want, have, guard)),
                // Raw on the way up: erasure information only, not a subtype
                // of a parameterized instantiation.
                _ => false,
            }
        }
        (Type::Class(_) | Type::Raw(_), Type::Raw(def)) => {
            instantiate_as_supertype(env, sub, *def).is_some()
        }

        _ => false,
    }
}

/// Type-argument containment (JLS 4.5.1): does the formal argument `want`
/// contain the actual argument `have`?
fn contains(env: &dyn TypeEnv, want: &Type, have: &Type, guard: &mut HashSet<TypeVarId>) -> bool {
    if want == have {
        return true;
    }
    match want {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => match have {
            Type::Wildcard(WildcardBound::Extends(inner)) => {
                subtype_inner(env, inner, upper, guard)
            }
            Type::Wildcard(_) => false,
            _ => subtype_inner(env, have, upper, guard),
        },
        Type::Wildcard(WildcardBound::Super(lower)) => match have {
            Type::Wildcard(WildcardBound::Super(inner)) => subtype_inner(env, lower, inner, guard),
            Type::Wildcard(_) => false,
            _ => subtype_inner(env, lower, have, guard),
        },
        // Invariant position otherwise.
        _ => false,
    }
}

/// View `ty` as an instantiation of the class `target`, walking the supertype
/// graph and applying type-argument substitution along the way.
///
/// Returns `Type::Class(target, ..)` with recovered arguments, or
/// `Type::Raw(target)` when the walk passed through a raw reference and the
/// arguments are unrecoverable, or `None` if `target` is not a supertype.
pub(crate) fn instantiate_as_supertype(
    env: &dyn TypeEnv,
    ty: &Type,
    target: crate::ClassId,
) -> Option<Type> {
    match ty {
        Type::Array(_) => {
            let wk = env.well_known();
            if target == wk.object || target == wk.cloneable || target == wk.serializable {
                return Some(Type::class(target, vec![]));
            }
            return None;
        }
        Type::TypeVar(v) => {
            let tp = env.type_param(*v)?;
            // Bounds are tried in declaration order; first hit wins, which is
            // deterministic for a fixed store.
            return tp
                .upper_bounds
                .iter()
                .filter(|b| !matches!(b, Type::TypeVar(w) if w == v))
                .find_map(|b| instantiate_as_supertype(env, b, target));
        }
        Type::Intersection(parts) => {
            return parts
                .iter()
                .find_map(|p| instantiate_as_supertype(env, p, target));
        }
        _ => {}
    }

    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<Type> = HashSet::new();
    queue.push_back(ty.clone());

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let (def, args, raw) = match &current {
            Type::Class(ClassType { def, args }) => (*def, args.clone(), false),
            Type::Raw(def) => (*def, Vec::new(), true),
            _ => continue,
        };

        if def == target {
            return Some(current);
        }

        let Some(class_def) = env.class(def) else {
            continue;
        };

        if raw {
            // Rawness is preserved while walking: `List` (raw) reaches
            // `Collection` as raw `Collection`.
            if let Some(sc) = &class_def.super_class {
                if let Some(t) = as_raw(env, sc) {
                    queue.push_back(t);
                }
            }
            for iface in &class_def.interfaces {
                if let Some(t) = as_raw(env, iface) {
                    queue.push_back(t);
                }
            }
        } else {
            let subst: Substitution = class_def
                .type_params
                .iter()
                .copied()
                .zip(args.iter().cloned())
                .collect();
            if let Some(sc) = &class_def.super_class {
                queue.push_back(crate::substitute(sc, &subst));
            }
            for iface in &class_def.interfaces {
                queue.push_back(crate::substitute(iface, &subst));
            }
        }

        // Every interface implicitly has Object as a supertype (JLS 4.10.2).
        if class_def.kind == crate::ClassKind::Interface {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
    }

    None
}

fn as_raw(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match ty {
        Type::Class(ClassType { def, .. }) | Type::Raw(def) => {
            let generic = env
                .class(*def)
                .map(|d| !d.type_params.is_empty())
                .unwrap_or(false);
            Some(if generic {
                Type::Raw(*def)
            } else {
                Type::class(*def, vec![])
            })
        }
        _ => None,
    }
}

/// Assignment compatibility (JLS 5.2): subtyping plus boxing, unboxing,
/// primitive widening, and the unchecked raw conversion.
pub fn is_assignable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (Type::Primitive(p), Type::Primitive(q)) => widens_primitive(*p, *q),
        (Type::Primitive(p), _) => is_subtype(env, &boxed_type(env, *p), to),
        (_, Type::Primitive(q)) => match unboxed_primitive(env, from) {
            Some(p) => p == *q || widens_primitive(p, *q),
            None => false,
        },
        (Type::Raw(c), Type::Class(ClassType { def, .. })) => {
            // Unchecked conversion: raw to any instantiation of a supertype.
            is_subtype(env, from, to) || instantiate_as_supertype(env, &Type::Raw(*c), *def).is_some()
        }
        _ => is_subtype(env, from, to),
    }
}

/// Erasure (JLS 4.6).
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Class(ClassType { def, args }) => {
            if args.is_empty() {
                ty.clone()
            } else {
                Type::Raw(*def)
            }
        }
        Type::Raw(_) | Type::Primitive(_) | Type::Void | Type::Null | Type::Missing(_) => {
            ty.clone()
        }
        Type::Array(elem) => Type::array(erasure(env, elem)),
        Type::TypeVar(v) => match env.type_param(*v).and_then(|tp| tp.upper_bounds.first()) {
            Some(first) if !matches!(first, Type::TypeVar(w) if w == v) => erasure(env, first),
            _ => Type::class(env.well_known().object, vec![]),
        },
        Type::Wildcard(WildcardBound::Extends(b)) => erasure(env, b),
        Type::Wildcard(_) => Type::class(env.well_known().object, vec![]),
        Type::Intersection(parts) => match parts.first() {
            Some(first) => erasure(env, first),
            None => Type::class(env.well_known().object, vec![]),
        },
    }
}

/// Whether `ty` is reifiable (JLS 4.7) — relevant for the unchecked generic
/// varargs warning.
pub fn is_reifiable(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Primitive(_) | Type::Void | Type::Raw(_) => true,
        Type::Class(ClassType { args, .. }) => args
            .iter()
            .all(|a| matches!(a, Type::Wildcard(WildcardBound::Unbounded))),
        Type::Array(elem) => is_reifiable(env, elem),
        _ => false,
    }
}

/// Greatest lower bound, best effort: one side when comparable, otherwise a
/// deterministic two-part intersection.
pub fn glb(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if a == b || is_subtype(env, a, b) {
        return a.clone();
    }
    if is_subtype(env, b, a) {
        return b.clone();
    }
    let mut parts = vec![a.clone(), b.clone()];
    sort_types(env, &mut parts);
    Type::Intersection(parts)
}

/// Least upper bound, best effort (JLS 4.10.4 without the parameterized-lub
/// refinement): one input when it is above all the others, otherwise the most
/// specific supertypes shared by every input, as a deterministic intersection
/// when several are incomparable.
pub fn lub(env: &dyn TypeEnv, types: &[Type]) -> Option<Type> {
    let (first, rest) = types.split_first()?;
    'cand: for cand in types {
        for other in types {
            if other != cand && !is_subtype(env, other, cand) {
                continue 'cand;
            }
        }
        return Some(cand.clone());
    }

    let shared: Vec<Type> = supertype_views(env, first)
        .into_iter()
        .filter(|sup| rest.iter().all(|t| is_subtype(env, t, sup)))
        .collect();
    let mut maximal: Vec<Type> = shared
        .iter()
        .filter(|sup| {
            !shared
                .iter()
                .any(|other| other != *sup && is_subtype(env, other, *sup))
        })
        .cloned()
        .collect();
    sort_types(env, &mut maximal);
    match maximal.len() {
        0 => Some(Type::class(env.well_known().object, vec![])),
        1 => maximal.pop(),
        _ => Some(Type::Intersection(maximal)),
    }
}

/// Every class/interface view reachable upward from `ty`, substitution
/// applied along the way, in breadth-first order.
fn supertype_views(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let mut queue: VecDeque<Type> = VecDeque::new();
    match ty {
        Type::Class(_) | Type::Raw(_) => queue.push_back(ty.clone()),
        Type::Array(_) => {
            let wk = env.well_known();
            for def in [wk.object, wk.cloneable, wk.serializable] {
                queue.push_back(Type::class(def, vec![]));
            }
        }
        Type::TypeVar(v) => {
            if let Some(tp) = env.type_param(*v) {
                queue.extend(
                    tp.upper_bounds
                        .iter()
                        .filter(|b| !matches!(b, Type::TypeVar(w) if w == v))
                        .cloned(),
                );
            }
        }
        Type::Intersection(parts) => queue.extend(parts.iter().cloned()),
        _ => return Vec::new(),
    }

    let mut seen: HashSet<Type> = HashSet::new();
    let mut out: Vec<Type> = Vec::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let (def, args, raw) = match &current {
            Type::Class(ClassType { def, args }) => (*def, args.clone(), false),
            Type::Raw(def) => (*def, Vec::new(), true),
            _ => continue,
        };
        out.push(current);

        let Some(class_def) = env.class(def) else {
            continue;
        };
        if raw {
            for sup in class_def.super_class.iter().chain(&class_def.interfaces) {
                if let Some(t) = as_raw(env, sup) {
                    queue.push_back(t);
                }
            }
        } else {
            let subst: Substitution = class_def
                .type_params
                .iter()
                .copied()
                .zip(args.iter().cloned())
                .collect();
            if let Some(sc) = &class_def.super_class {
                queue.push_back(crate::substitute(sc, &subst));
            }
            for iface in &class_def.interfaces {
                queue.push_back(crate::substitute(iface, &subst));
            }
        }
        if class_def.kind == crate::ClassKind::Interface {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
    }
    out
}

/// Deterministic ordering for bound/intersection lists so results never
/// depend on declaration order of equivalent inputs.
pub(crate) fn sort_types(env: &dyn TypeEnv, types: &mut [Type]) {
    types.sort_by_cached_key(|t| crate::format::type_sort_key(env, t));
}
