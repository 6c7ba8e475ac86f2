//! Per-candidate applicability checking (JLS 15.12.2.2–15.12.2.4).
//!
//! This is a pure function over its inputs; it never mutates the symbol
//! table. The distinctive rule is the missing-type policy: a parameter whose
//! type cannot be loaded does not make a candidate inapplicable, it makes the
//! outcome [`Applicability::BlockedByMissingType`], so the resolver can stop
//! instead of silently preferring some other overload.

use vesta_config::SourceLevel;

use crate::{
    infer, subtype, MethodSig, MissingTypeId, Substitution, Type, TypeEnv,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No boxing, no varargs expansion (strict invocation).
    Strict,
    /// Boxing and unboxing permitted (loose invocation).
    Loose,
    /// Variable-arity invocation; only meaningful for varargs signatures.
    Varargs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UncheckedReason {
    /// Raw type converted to a parameterized type.
    RawConversion,
    /// Variable-arity invocation creating a non-reifiable array.
    UncheckedVarargs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeWarning {
    Unchecked(UncheckedReason),
}

/// The call site's view of one invocation, as handed over by the parser
/// layer: already-typed arguments, optional explicit type arguments, and the
/// target context type for poly expressions.
#[derive(Clone, Copy, Debug)]
pub struct InvocationSite<'a> {
    pub args: &'a [Type],
    pub explicit_type_args: Option<&'a [Type]>,
    pub expected_type: Option<&'a Type>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicableMatch {
    pub substitution: Substitution,
    /// Whether the varargs parameter was expanded (as opposed to receiving
    /// an array directly or the phase being fixed-arity).
    pub used_varargs: bool,
    pub warnings: Vec<TypeWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applicability {
    Applicable(ApplicableMatch),
    NotApplicable,
    /// Neither applicable nor inapplicable: a parameter type is missing and
    /// no resolved parameter (or the arity) rules the candidate out.
    BlockedByMissingType(MissingTypeId),
}

enum Compat {
    Yes,
    YesUnchecked,
    No,
    Blocked(MissingTypeId),
}

fn compat(env: &dyn TypeEnv, arg: &Type, formal: &Type, boxing: bool) -> Compat {
    // A missing formal can neither accept nor reject any argument.
    if let Some(id) = formal.first_missing() {
        return Compat::Blocked(id);
    }
    // A missing argument type was already reported at the argument
    // expression; treat it as compatible so one error does not cascade.
    if matches!(arg, Type::Missing(_)) {
        return Compat::Yes;
    }
    if arg == formal {
        return Compat::Yes;
    }
    if matches!(arg, Type::Null) {
        return if formal.is_reference() {
            Compat::Yes
        } else {
            Compat::No
        };
    }

    match (arg, formal) {
        (Type::Primitive(p), Type::Primitive(q)) => {
            if subtype::widens_primitive(*p, *q) {
                Compat::Yes
            } else {
                Compat::No
            }
        }
        (Type::Primitive(p), _) => {
            if boxing && subtype::is_subtype(env, &subtype::boxed_type(env, *p), formal) {
                Compat::Yes
            } else {
                Compat::No
            }
        }
        (_, Type::Primitive(q)) => match subtype::unboxed_primitive(env, arg) {
            Some(p) if boxing && (p == *q || subtype::widens_primitive(p, *q)) => Compat::Yes,
            _ => Compat::No,
        },
        _ => {
            if subtype::is_subtype(env, arg, formal) {
                Compat::Yes
            } else if matches!(arg, Type::Raw(_)) && subtype::is_assignable(env, arg, formal) {
                Compat::YesUnchecked
            } else {
                Compat::No
            }
        }
    }
}

/// Check one candidate signature against a call site under one phase.
pub fn check_applicability(
    env: &dyn TypeEnv,
    sig: &MethodSig,
    site: &InvocationSite<'_>,
    phase: Phase,
    level: SourceLevel,
) -> Applicability {
    let formal_count = sig.params.len();
    let arg_count = site.args.len();

    match phase {
        Phase::Strict | Phase::Loose => {
            if arg_count != formal_count {
                return Applicability::NotApplicable;
            }
        }
        Phase::Varargs => {
            // Reaching the varargs phase with a fixed-arity signature is a
            // resolver bug, not an input condition.
            assert!(
                sig.is_varargs,
                "varargs applicability phase on a fixed-arity signature"
            );
            if arg_count + 1 < formal_count {
                return Applicability::NotApplicable;
            }
        }
    }

    // Instantiate the signature's own type parameters first: explicit
    // arguments when supplied, inference otherwise.
    let substitution = if sig.type_params.is_empty() {
        Substitution::new()
    } else if let Some(explicit) = site.explicit_type_args {
        if explicit.len() != sig.type_params.len() {
            return Applicability::NotApplicable;
        }
        let subst: Substitution = sig
            .type_params
            .iter()
            .copied()
            .zip(explicit.iter().cloned())
            .collect();
        if !infer::bounds_satisfied(env, &sig.type_params, &subst) {
            return Applicability::NotApplicable;
        }
        subst
    } else {
        match infer::infer_method_type_args(env, sig, site, phase, level) {
            Ok(subst) => subst,
            Err(_) => return Applicability::NotApplicable,
        }
    };

    let params: Vec<Type> = sig
        .params
        .iter()
        .map(|p| crate::substitute(p, &substitution))
        .collect();

    let boxing = !matches!(phase, Phase::Strict);
    let mut blocked: Option<MissingTypeId> = None;
    let mut warnings: Vec<TypeWarning> = Vec::new();
    let mut used_varargs = false;

    let fixed = match phase {
        Phase::Varargs => formal_count - 1,
        _ => formal_count,
    };

    for (arg, formal) in site.args.iter().zip(params.iter()).take(fixed) {
        match compat(env, arg, formal, boxing) {
            Compat::Yes => {}
            Compat::YesUnchecked => {
                warnings.push(TypeWarning::Unchecked(UncheckedReason::RawConversion));
            }
            Compat::No => return Applicability::NotApplicable,
            Compat::Blocked(id) => blocked = blocked.or(Some(id)),
        }
    }

    if matches!(phase, Phase::Varargs) {
        let array_param = &params[formal_count - 1];
        let Type::Array(elem) = array_param else {
            // MethodSig invariant: a varargs signature's last parameter is
            // always an array.
            panic!("varargs signature without trailing array parameter");
        };

        let trailing = &site.args[fixed..];
        if trailing.is_empty() {
            // Zero-argument varargs invocation matches with an empty array;
            // the element type is never compared, so a missing element type
            // must not block here.
            used_varargs = true;
        } else if trailing.len() == 1 {
            // Prefer the non-expanded form (array passed through), then
            // fall back to expansion.
            match compat(env, &trailing[0], array_param, boxing) {
                Compat::Yes => {}
                Compat::YesUnchecked => {
                    warnings.push(TypeWarning::Unchecked(UncheckedReason::RawConversion));
                }
                Compat::No | Compat::Blocked(_) => {
                    used_varargs = true;
                    match compat(env, &trailing[0], elem, boxing) {
                        Compat::Yes => {}
                        Compat::YesUnchecked => {
                            warnings.push(TypeWarning::Unchecked(UncheckedReason::RawConversion));
                        }
                        Compat::No => return Applicability::NotApplicable,
                        Compat::Blocked(id) => blocked = blocked.or(Some(id)),
                    }
                }
            }
        } else {
            used_varargs = true;
            for arg in trailing {
                match compat(env, arg, elem, boxing) {
                    Compat::Yes => {}
                    Compat::YesUnchecked => {
                        warnings.push(TypeWarning::Unchecked(UncheckedReason::RawConversion));
                    }
                    Compat::No => return Applicability::NotApplicable,
                    Compat::Blocked(id) => blocked = blocked.or(Some(id)),
                }
            }
        }

        if used_varargs && !trailing.is_empty() && !subtype::is_reifiable(env, elem) {
            warnings.push(TypeWarning::Unchecked(UncheckedReason::UncheckedVarargs));
        }
    }

    if let Some(id) = blocked {
        return Applicability::BlockedByMissingType(id);
    }

    Applicability::Applicable(ApplicableMatch {
        substitution,
        used_varargs,
        warnings,
    })
}
