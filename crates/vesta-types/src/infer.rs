//! Type-argument inference for generic method and constructor invocations.
//!
//! This is a constraint-gathering solver rather than a full JLS 18 reduction
//! engine: argument types contribute lower bounds (or equality constraints in
//! invariant positions), the target context contributes a second solution
//! that is merged with the argument-side one, and declared bounds are checked
//! on the final substitution. Bounds that mention a missing type are skipped
//! during that check rather than failing it.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use vesta_config::SourceLevel;

use crate::{
    applicability::{InvocationSite, Phase},
    format, subtype, ClassId, ClassType, MethodSig, Substitution, Type, TypeEnv, TypeVarId,
    WildcardBound,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("cannot infer type arguments for {type_name}")]
    CannotInferTypeArguments { type_name: String },
    #[error("inferred type {inferred} for {type_var} is not within bound {bound}")]
    BoundMismatch {
        type_var: String,
        inferred: String,
        bound: String,
    },
}

#[derive(Default)]
struct Constraints {
    eq: BTreeMap<TypeVarId, Vec<Type>>,
    lower: BTreeMap<TypeVarId, Vec<Type>>,
}

fn mentions_vars(ty: &Type, vars: &BTreeSet<TypeVarId>) -> bool {
    match ty {
        Type::TypeVar(v) => vars.contains(v),
        Type::Class(ClassType { args, .. }) => args.iter().any(|a| mentions_vars(a, vars)),
        Type::Array(elem) => mentions_vars(elem, vars),
        Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
            mentions_vars(b, vars)
        }
        Type::Intersection(parts) => parts.iter().any(|p| mentions_vars(p, vars)),
        _ => false,
    }
}

/// Covariant position: `actual` flows into `formal`, so an inference variable
/// in `formal` picks up `actual` as a lower bound.
fn constrain_lower(
    env: &dyn TypeEnv,
    actual: &Type,
    formal: &Type,
    vars: &BTreeSet<TypeVarId>,
    out: &mut Constraints,
) {
    if !mentions_vars(formal, vars) {
        return;
    }
    match formal {
        Type::TypeVar(v) => {
            let bound = match actual {
                // Loose invocation boxes the argument before it constrains T.
                Type::Primitive(p) => subtype::boxed_type(env, *p),
                Type::Null | Type::Missing(_) => return,
                other => other.clone(),
            };
            out.lower.entry(*v).or_default().push(bound);
        }
        // Arrays are covariant, so the element stays a lower bound.
        Type::Array(felem) => {
            if let Type::Array(aelem) = actual {
                constrain_lower(env, aelem, felem, vars, out);
            }
        }
        Type::Class(ClassType { def, args: fargs }) => {
            let Some(inst) = subtype::instantiate_as_supertype(env, actual, *def) else {
                return;
            };
            if let Type::Class(ClassType { args: aargs, .. }) = inst {
                if aargs.len() == fargs.len() {
                    for (aa, fa) in aargs.iter().zip(fargs.iter()) {
                        constrain_eq(env, aa, fa, vars, out);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Invariant position: type arguments must match exactly, so an inference
/// variable here gets an equality constraint. Wildcard actuals degrade to
/// lower bounds on their bound type.
fn constrain_eq(
    env: &dyn TypeEnv,
    actual: &Type,
    formal: &Type,
    vars: &BTreeSet<TypeVarId>,
    out: &mut Constraints,
) {
    if !mentions_vars(formal, vars) {
        return;
    }
    match formal {
        Type::TypeVar(v) => match actual {
            Type::Wildcard(WildcardBound::Unbounded) => {}
            Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
                if !matches!(b.as_ref(), Type::Missing(_)) {
                    out.lower.entry(*v).or_default().push((**b).clone());
                }
            }
            Type::Missing(_) | Type::Null => {}
            other => out.eq.entry(*v).or_default().push(other.clone()),
        },
        Type::Array(felem) => {
            if let Type::Array(aelem) = actual {
                constrain_eq(env, aelem, felem, vars, out);
            }
        }
        Type::Class(ClassType { def: fdef, args: fargs }) => {
            if let Type::Class(ClassType { def: adef, args: aargs }) = actual {
                if adef == fdef && aargs.len() == fargs.len() {
                    for (aa, fa) in aargs.iter().zip(fargs.iter()) {
                        constrain_eq(env, aa, fa, vars, out);
                    }
                }
            }
        }
        Type::Wildcard(WildcardBound::Extends(fb)) => match actual {
            Type::Wildcard(WildcardBound::Extends(ab)) => constrain_eq(env, ab, fb, vars, out),
            Type::Wildcard(_) => {}
            other => constrain_lower(env, other, fb, vars, out),
        },
        Type::Wildcard(WildcardBound::Super(fb)) => {
            if let Type::Wildcard(WildcardBound::Super(ab)) = actual {
                constrain_eq(env, ab, fb, vars, out);
            }
        }
        _ => {}
    }
}

/// Resolve one variable's constraint set. `None` means conflict, not absence;
/// callers only invoke this when at least one constraint exists.
fn solve_var(env: &dyn TypeEnv, eq: &[Type], lower: &[Type]) -> Option<Type> {
    if let Some(first) = eq.first() {
        if eq.iter().any(|t| t != first) {
            return None;
        }
        if lower.iter().any(|l| !subtype::is_subtype(env, l, first)) {
            return None;
        }
        return Some(first.clone());
    }
    // Pick the lower bound every other lower bound fits under; pairwise
    // incomparable bounds meet at their least upper bound instead of failing
    // (JLS 18.4 resolves such a variable to lub).
    subtype::lub(env, lower)
}

/// Pair up arguments with formals according to the invocation phase, with
/// varargs expansion when applicable.
fn argument_pairs<'t>(sig: &'t MethodSig, args: &'t [Type], phase: Phase) -> Vec<(&'t Type, &'t Type)> {
    let n = sig.params.len();
    if matches!(phase, Phase::Varargs) && sig.is_varargs && n > 0 {
        let mut pairs: Vec<(&Type, &Type)> = args
            .iter()
            .zip(sig.params.iter())
            .take(n - 1)
            .collect();
        if let Type::Array(elem) = &sig.params[n - 1] {
            let trailing = &args[(n - 1).min(args.len())..];
            if trailing.len() == 1 && matches!(trailing[0], Type::Array(_)) {
                pairs.push((&trailing[0], &sig.params[n - 1]));
            } else {
                for arg in trailing {
                    pairs.push((arg, elem));
                }
            }
        }
        pairs
    } else {
        args.iter().zip(sig.params.iter()).collect()
    }
}

/// Infer type arguments for `sig`'s own type parameters at the given call
/// site. Under [`SourceLevel::Java8`] the expected type participates; under
/// [`SourceLevel::Java7`] only the arguments do, and an unconstrained
/// variable falls back to the erasure of its declared bound.
pub fn infer_method_type_args(
    env: &dyn TypeEnv,
    sig: &MethodSig,
    site: &InvocationSite<'_>,
    phase: Phase,
    level: SourceLevel,
) -> Result<Substitution, InferenceError> {
    let vars: BTreeSet<TypeVarId> = sig.type_params.iter().copied().collect();
    let cannot_infer = || InferenceError::CannotInferTypeArguments {
        type_name: sig.name.clone(),
    };

    let mut from_args = Constraints::default();
    for (arg, formal) in argument_pairs(sig, site.args, phase) {
        constrain_lower(env, arg, formal, &vars, &mut from_args);
    }

    let mut from_context = Constraints::default();
    if level.uses_target_context() {
        if let Some(expected) = site.expected_type {
            // The return type only has to be a subtype of the target; view it
            // as an instantiation of the target's class before matching
            // (`ArrayList<E>` against an expected `List<String>`).
            let view = match (expected, &sig.return_type) {
                (
                    Type::Class(ClassType { def: want, .. }),
                    Type::Class(ClassType { def: have, .. }),
                ) if want != have => subtype::instantiate_as_supertype(env, &sig.return_type, *want),
                _ => None,
            };
            let formal = view.as_ref().unwrap_or(&sig.return_type);
            constrain_eq(env, expected, formal, &vars, &mut from_context);
        }
    }

    let mut subst = Substitution::new();
    for v in &sig.type_params {
        let empty: Vec<Type> = Vec::new();
        let arg_eq = from_args.eq.get(v).unwrap_or(&empty);
        let arg_lower = from_args.lower.get(v).unwrap_or(&empty);
        let arg_solution = if arg_eq.is_empty() && arg_lower.is_empty() {
            None
        } else {
            Some(solve_var(env, arg_eq, arg_lower).ok_or_else(cannot_infer)?)
        };

        let ctx_eq = from_context.eq.get(v).unwrap_or(&empty);
        let ctx_lower = from_context.lower.get(v).unwrap_or(&empty);
        let ctx_solution = if ctx_eq.is_empty() && ctx_lower.is_empty() {
            None
        } else {
            // A context conflict only discards the context, it does not fail
            // an argument-determined variable.
            solve_var(env, ctx_eq, ctx_lower)
        };

        let solution = match (arg_solution, ctx_solution) {
            (Some(a), Some(c)) => {
                if a == c || subtype::is_subtype(env, &a, &c) {
                    a
                } else {
                    return Err(cannot_infer());
                }
            }
            (Some(a), None) => a,
            (None, Some(c)) if !matches!(c, Type::Wildcard(_)) => c,
            _ => {
                // Unconstrained: fall back to the erasure of the declared
                // bound (Object when there is none).
                match env.type_param(*v).and_then(|tp| tp.upper_bounds.first()) {
                    Some(b) if !matches!(b, Type::TypeVar(w) if w == v) => subtype::erasure(env, b),
                    _ => Type::class(env.well_known().object, vec![]),
                }
            }
        };
        subst.insert(*v, solution);
    }

    // Solutions may mention sibling variables (`T extends Comparable<U>`);
    // one self-application pass closes them.
    let closed: Substitution = sig
        .type_params
        .iter()
        .filter_map(|v| subst.get(*v).map(|t| (*v, crate::substitute(t, &subst))))
        .collect();

    check_bounds(env, &sig.type_params, &closed)?;
    Ok(closed)
}

/// Diamond inference: same solver, but a failure is reported against the
/// class being allocated rather than the constructor.
pub fn infer_constructor_type_args(
    env: &dyn TypeEnv,
    class: ClassId,
    sig: &MethodSig,
    site: &InvocationSite<'_>,
    phase: Phase,
    level: SourceLevel,
) -> Result<Substitution, InferenceError> {
    infer_method_type_args(env, sig, site, phase, level).map_err(|err| match err {
        InferenceError::CannotInferTypeArguments { .. } => {
            InferenceError::CannotInferTypeArguments {
                type_name: env
                    .class(class)
                    .map(|d| d.simple_name().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            }
        }
        other => other,
    })
}

/// Would inference have produced exactly the explicitly written type
/// arguments? Drives the redundant-type-arguments advisory.
pub fn check_redundant_type_args(
    env: &dyn TypeEnv,
    sig: &MethodSig,
    site: &InvocationSite<'_>,
    phase: Phase,
    level: SourceLevel,
) -> bool {
    let Some(explicit) = site.explicit_type_args else {
        return false;
    };
    if sig.type_params.is_empty() || explicit.len() != sig.type_params.len() {
        return false;
    }
    let stripped = InvocationSite {
        explicit_type_args: None,
        ..*site
    };
    match infer_method_type_args(env, sig, &stripped, phase, level) {
        Ok(subst) => subst.type_args_for(&sig.type_params).as_slice() == explicit,
        Err(_) => false,
    }
}

fn check_bounds(
    env: &dyn TypeEnv,
    vars: &[TypeVarId],
    subst: &Substitution,
) -> Result<(), InferenceError> {
    for v in vars {
        let Some(solution) = subst.get(*v) else {
            continue;
        };
        if matches!(solution, Type::Missing(_)) {
            continue;
        }
        let Some(tp) = env.type_param(*v) else {
            continue;
        };
        let solution_ref = match solution {
            Type::Primitive(p) => subtype::boxed_type(env, *p),
            other => other.clone(),
        };
        for bound in &tp.upper_bounds {
            if matches!(bound, Type::TypeVar(w) if w == v) {
                continue;
            }
            let bound = crate::substitute(bound, subst);
            // A bound that mentions a missing type can neither be proven nor
            // refuted; tolerate it instead of rejecting the candidate.
            if bound.first_missing().is_some() {
                continue;
            }
            if !subtype::is_subtype(env, &solution_ref, &bound) {
                return Err(InferenceError::BoundMismatch {
                    type_var: tp.name.clone(),
                    inferred: format::display_type(env, solution),
                    bound: format::display_type(env, &bound),
                });
            }
        }
    }
    Ok(())
}

/// Explicit type arguments are validated against declared bounds with the
/// same missing-type tolerance as inferred ones.
pub(crate) fn bounds_satisfied(
    env: &dyn TypeEnv,
    vars: &[TypeVarId],
    subst: &Substitution,
) -> bool {
    check_bounds(env, vars, subst).is_ok()
}
