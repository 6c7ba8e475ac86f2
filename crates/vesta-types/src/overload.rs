//! Overload resolution for method invocations and class instance creation
//! (JLS 15.12.2, 15.9.3).
//!
//! Resolution runs the three applicability phases in order; a phase that
//! produces applicable candidates ends the search, and a phase whose only
//! surviving candidates are blocked on a missing type ends the search with
//! [`ResolutionResult::MissingTypeBlocked`] instead of leaking into the next
//! phase.

use vesta_config::SourceLevel;

use crate::{
    applicability::{self, Applicability, ApplicableMatch, InvocationSite, Phase, TypeWarning},
    subtype, ClassId, ClassType, Substitution, TyContext, Type, TypeEnv, TypeVarId,
};

/// A resolution-ready view of one method or constructor declaration: owner
/// instantiation already applied to parameter and return types, the
/// declaration's own type parameters still free.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSig {
    pub owner: ClassId,
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_varargs: bool,
    pub is_static: bool,
    pub is_constructor: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Instance,
    Static,
}

/// One method invocation as seen by the resolver.
#[derive(Clone, Debug)]
pub struct MethodCall {
    pub receiver: Type,
    pub call_kind: CallKind,
    pub name: String,
    pub args: Vec<Type>,
    /// Target context for poly expressions, when the call sits in one.
    pub expected_return: Option<Type>,
    pub explicit_type_args: Option<Vec<Type>>,
}

/// One `new` expression as seen by the resolver.
///
/// `class` carries explicit type arguments when written (`new C<String>()`),
/// is raw for `new C()` on a generic class, and `diamond` marks `new C<>()`.
#[derive(Clone, Debug)]
pub struct CtorCall {
    pub class: Type,
    pub diamond: bool,
    pub args: Vec<Type>,
    pub explicit_type_args: Option<Vec<Type>>,
    pub expected_type: Option<Type>,
}

/// A successfully resolved candidate with its instantiation applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundMethod {
    pub sig: MethodSig,
    pub substitution: Substitution,
    pub params: Vec<Type>,
    pub return_type: Type,
    /// Arguments for `sig.type_params`, in declaration order.
    pub inferred_type_args: Vec<Type>,
    pub used_varargs: bool,
    pub phase: Phase,
    pub warnings: Vec<TypeWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionResult {
    Bound(BoundMethod),
    /// Several maximally specific candidates; in declaration order.
    Ambiguous { candidates: Vec<MethodSig> },
    /// A candidate could not be judged because a parameter type is missing.
    MissingTypeBlocked {
        sig: MethodSig,
        missing: crate::MissingTypeId,
    },
    /// Every candidate was rejected on resolved grounds. `attempted` is
    /// empty when no member of that name exists at all.
    NotApplicable { attempted: Vec<MethodSig> },
}

fn bind(sig: &MethodSig, found: ApplicableMatch, phase: Phase) -> BoundMethod {
    let params = sig
        .params
        .iter()
        .map(|p| crate::substitute(p, &found.substitution))
        .collect();
    let return_type = crate::substitute(&sig.return_type, &found.substitution);
    let inferred_type_args = found.substitution.type_args_for(&sig.type_params);
    BoundMethod {
        sig: sig.clone(),
        substitution: found.substitution,
        params,
        return_type,
        inferred_type_args,
        used_varargs: found.used_varargs,
        phase,
        warnings: found.warnings,
    }
}

/// The parameter list a candidate competes with in the given phase: varargs
/// signatures are expanded to the call's arity in the varargs phase, with at
/// least one element slot so zero-argument calls still compare element types.
fn phase_params(sig: &MethodSig, phase: Phase, arity: usize) -> Vec<Type> {
    if matches!(phase, Phase::Varargs) && sig.is_varargs && !sig.params.is_empty() {
        let n = sig.params.len();
        let mut out: Vec<Type> = sig.params[..n - 1].to_vec();
        if let Type::Array(elem) = &sig.params[n - 1] {
            while out.len() < arity.max(n) {
                out.push((**elem).clone());
            }
        }
        out
    } else {
        sig.params.clone()
    }
}

fn param_more_specific(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Primitive(p), Type::Primitive(q)) => p == q || subtype::widens_primitive(*p, *q),
        _ => subtype::is_subtype(env, a, b),
    }
}

/// Whether `a` is at least as specific as `b` (JLS 15.12.2.5, on declared
/// parameter types).
fn more_specific(env: &dyn TypeEnv, a: &MethodSig, b: &MethodSig, phase: Phase, arity: usize) -> bool {
    let pa = phase_params(a, phase, arity);
    let pb = phase_params(b, phase, arity);
    pa.len() == pb.len()
        && pa
            .iter()
            .zip(pb.iter())
            .all(|(x, y)| param_more_specific(env, x, y))
}

/// Run the three-phase search over a fixed candidate list.
///
/// Candidate order is declaration order; every outcome that names candidates
/// preserves it, so diagnostics are deterministic.
pub fn resolve_overload(
    env: &dyn TypeEnv,
    candidates: &[MethodSig],
    site: &InvocationSite<'_>,
    level: SourceLevel,
) -> ResolutionResult {
    for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
        let mut applicable: Vec<(&MethodSig, ApplicableMatch)> = Vec::new();
        let mut blocked: Vec<(&MethodSig, crate::MissingTypeId)> = Vec::new();

        for sig in candidates {
            if matches!(phase, Phase::Varargs) && !sig.is_varargs {
                continue;
            }
            match applicability::check_applicability(env, sig, site, phase, level) {
                Applicability::Applicable(found) => applicable.push((sig, found)),
                Applicability::BlockedByMissingType(id) => blocked.push((sig, id)),
                Applicability::NotApplicable => {}
            }
        }

        if !applicable.is_empty() {
            return pick_most_specific(env, applicable, phase, site.args.len());
        }
        if let Some((sig, missing)) = blocked.into_iter().next() {
            // A candidate blocked on a missing type must not silently lose to
            // a later phase; resolution stops here.
            return ResolutionResult::MissingTypeBlocked {
                sig: sig.clone(),
                missing,
            };
        }
    }

    ResolutionResult::NotApplicable {
        attempted: candidates.to_vec(),
    }
}

fn pick_most_specific(
    env: &dyn TypeEnv,
    mut applicable: Vec<(&MethodSig, ApplicableMatch)>,
    phase: Phase,
    arity: usize,
) -> ResolutionResult {
    if applicable.len() == 1 {
        let (sig, found) = applicable.remove(0);
        return ResolutionResult::Bound(bind(sig, found, phase));
    }

    let maximal: Vec<usize> = applicable
        .iter()
        .enumerate()
        .filter(|(_, (a, _))| {
            applicable
                .iter()
                .all(|(b, _)| std::ptr::eq(*a, *b) || more_specific(env, a, b, phase, arity))
        })
        .map(|(i, _)| i)
        .collect();
    match maximal.split_first() {
        // A tie between override-equivalent duplicates of one declaration
        // collapses to the first; distinct signatures that tie both ways
        // (identical parameter lists, different members) stay ambiguous.
        Some((&idx, others)) if others.iter().all(|&j| applicable[j].0 == applicable[idx].0) => {
            let (sig, found) = applicable.remove(idx);
            ResolutionResult::Bound(bind(sig, found, phase))
        }
        _ => ResolutionResult::Ambiguous {
            candidates: applicable.into_iter().map(|(s, _)| s.clone()).collect(),
        },
    }
}

/// The type member lookup starts from: type variables are replaced by their
/// first usable upper bound, everything else passes through.
fn receiver_view(env: &dyn TypeEnv, recv: &Type) -> Type {
    match recv {
        Type::TypeVar(v) => {
            if let Some(tp) = env.type_param(*v) {
                for bound in &tp.upper_bounds {
                    if !matches!(bound, Type::TypeVar(w) if w == v) {
                        return receiver_view(env, bound);
                    }
                }
            }
            Type::class(env.well_known().object, vec![])
        }
        other => other.clone(),
    }
}

/// Substitution erasing every type parameter of a class, for members of raw
/// types (JLS 4.8).
fn erased_subst(env: &dyn TypeEnv, type_params: &[TypeVarId]) -> Substitution {
    type_params
        .iter()
        .map(|v| (*v, subtype::erasure(env, &Type::TypeVar(*v))))
        .collect()
}

/// Collect the named methods visible on `recv`, most derived first, with
/// overridden supertype declarations dropped (same name, same erased
/// parameter types).
fn collect_methods(env: &dyn TypeEnv, recv: &Type, name: &str, kind: CallKind) -> Vec<MethodSig> {
    use std::collections::{HashSet, VecDeque};

    let mut queue: VecDeque<Type> = VecDeque::new();
    match recv {
        Type::Class(_) | Type::Raw(_) => queue.push_back(recv.clone()),
        Type::Array(_) => queue.push_back(Type::class(env.well_known().object, vec![])),
        Type::Intersection(parts) => queue.extend(parts.iter().cloned()),
        _ => return Vec::new(),
    }

    let mut seen: HashSet<ClassId> = HashSet::new();
    let mut out: Vec<MethodSig> = Vec::new();

    while let Some(current) = queue.pop_front() {
        let (def, subst, raw) = match &current {
            Type::Class(ClassType { def, args }) => {
                let Some(class_def) = env.class(*def) else {
                    continue;
                };
                let subst: Substitution = class_def
                    .type_params
                    .iter()
                    .copied()
                    .zip(args.iter().cloned())
                    .collect();
                (*def, subst, false)
            }
            Type::Raw(def) => {
                let Some(class_def) = env.class(*def) else {
                    continue;
                };
                (*def, erased_subst(env, &class_def.type_params), true)
            }
            _ => continue,
        };
        if !seen.insert(def) {
            continue;
        }
        let class_def = match env.class(def) {
            Some(d) => d,
            None => continue,
        };

        for method in &class_def.methods {
            if method.name != name {
                continue;
            }
            if matches!(kind, CallKind::Static) && !method.is_static {
                continue;
            }
            let sig = MethodSig {
                owner: def,
                name: method.name.clone(),
                type_params: method.type_params.clone(),
                params: method.params.iter().map(|p| crate::substitute(p, &subst)).collect(),
                return_type: crate::substitute(&method.return_type, &subst),
                is_varargs: method.is_varargs,
                is_static: method.is_static,
                is_constructor: false,
            };
            let overridden = out.iter().any(|prev| {
                prev.params.len() == sig.params.len()
                    && prev
                        .params
                        .iter()
                        .zip(sig.params.iter())
                        .all(|(a, b)| subtype::erasure(env, a) == subtype::erasure(env, b))
            });
            if !overridden {
                out.push(sig);
            }
        }

        if raw {
            // Rawness propagates to supertypes during member lookup.
            for sup in class_def.super_class.iter().chain(&class_def.interfaces) {
                if let Type::Class(ClassType { def, .. }) | Type::Raw(def) = sup {
                    queue.push_back(raw_or_plain(env, *def));
                }
            }
        } else {
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

fn raw_or_plain(env: &dyn TypeEnv, def: ClassId) -> Type {
    let generic = env
        .class(def)
        .map(|d| !d.type_params.is_empty())
        .unwrap_or(false);
    if generic {
        Type::Raw(def)
    } else {
        Type::class(def, vec![])
    }
}

/// Resolve a method invocation: normalize the receiver (capture conversion,
/// type-variable bounds), collect candidates over its supertypes, and run the
/// phased search.
pub fn resolve_method_call(
    ctx: &mut TyContext<'_>,
    call: &MethodCall,
    level: SourceLevel,
) -> ResolutionResult {
    if matches!(call.receiver, Type::Missing(_)) {
        // The unresolved receiver already produced its own diagnostic.
        return ResolutionResult::NotApplicable { attempted: Vec::new() };
    }
    let recv = receiver_view(ctx, &call.receiver);
    let recv = ctx.capture_conversion(&recv);
    let candidates = collect_methods(ctx, &recv, &call.name, call.call_kind);
    let site = InvocationSite {
        args: &call.args,
        explicit_type_args: call.explicit_type_args.as_deref(),
        expected_type: call.expected_return.as_ref(),
    };
    resolve_overload(ctx, &candidates, &site, level)
}

fn ctor_candidates(env: &dyn TypeEnv, alloc: &CtorCall) -> Vec<MethodSig> {
    let (def, class_subst, diamond_params) = match &alloc.class {
        Type::Class(ClassType { def, args }) => {
            let Some(class_def) = env.class(*def) else {
                return Vec::new();
            };
            if alloc.diamond {
                (*def, Substitution::new(), class_def.type_params.clone())
            } else {
                let subst: Substitution = class_def
                    .type_params
                    .iter()
                    .copied()
                    .zip(args.iter().cloned())
                    .collect();
                (*def, subst, Vec::new())
            }
        }
        Type::Raw(def) => {
            let Some(class_def) = env.class(*def) else {
                return Vec::new();
            };
            if alloc.diamond {
                (*def, Substitution::new(), class_def.type_params.clone())
            } else {
                (*def, erased_subst(env, &class_def.type_params), Vec::new())
            }
        }
        _ => return Vec::new(),
    };

    let class_def = match env.class(def) {
        Some(d) => d,
        None => return Vec::new(),
    };

    let return_type = if alloc.diamond {
        Type::class(
            def,
            diamond_params.iter().map(|v| Type::TypeVar(*v)).collect(),
        )
    } else if matches!(alloc.class, Type::Raw(_)) {
        Type::Raw(def)
    } else {
        alloc.class.clone()
    };

    class_def
        .constructors
        .iter()
        .filter(|c| c.is_accessible)
        .map(|ctor| {
            let mut type_params = diamond_params.clone();
            type_params.extend(ctor.type_params.iter().copied());
            MethodSig {
                owner: def,
                name: class_def.simple_name().to_string(),
                type_params,
                params: ctor
                    .params
                    .iter()
                    .map(|p| crate::substitute(p, &class_subst))
                    .collect(),
                return_type: return_type.clone(),
                is_varargs: ctor.is_varargs,
                is_static: false,
                is_constructor: true,
            }
        })
        .collect()
}

/// Resolve a class instance creation expression. Diamond allocations
/// (`new C<>(..)`) treat the class's type parameters as inference variables,
/// constrained by the arguments and the allocation's target type.
pub fn resolve_constructor_call(
    ctx: &mut TyContext<'_>,
    alloc: &CtorCall,
    level: SourceLevel,
) -> ResolutionResult {
    if alloc.class.first_missing().is_some() {
        return ResolutionResult::NotApplicable { attempted: Vec::new() };
    }
    let candidates = ctor_candidates(ctx, alloc);
    let site = InvocationSite {
        args: &alloc.args,
        explicit_type_args: alloc.explicit_type_args.as_deref(),
        expected_type: alloc.expected_type.as_ref(),
    };
    resolve_overload(ctx, &candidates, &site, level)
}
