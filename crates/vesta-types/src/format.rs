//! Stable, Java-like renderings of types and the diagnostic message
//! families produced by resolution.
//!
//! Messages use simple (unqualified) type names and list parameter/argument
//! types in declaration order, matching the wording the JDT batch compiler
//! emits for the same situations.

use crate::{
    ClassType, MethodSig, MissingTypeId, Type, TypeEnv, TypeVarId, WildcardBound,
};

fn simple_segment(name: &str) -> &str {
    name.rsplit(|c| c == '.' || c == '$').next().unwrap_or(name)
}

fn class_simple_name(env: &dyn TypeEnv, id: crate::ClassId) -> String {
    env.class(id)
        .map(|d| d.simple_name().to_string())
        .unwrap_or_else(|| format!("<class #{:?}>", id))
}

fn type_var_name(env: &dyn TypeEnv, id: TypeVarId) -> String {
    env.type_param(id)
        .map(|tp| tp.name.clone())
        .unwrap_or_else(|| format!("T#{:?}", id))
}

/// Render `ty` with simple names, the way it appears in diagnostics.
pub fn display_type(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.name().to_string(),
        Type::Void => "void".to_string(),
        Type::Null => "null".to_string(),
        Type::Class(ClassType { def, args }) => {
            let mut out = class_simple_name(env, *def);
            if !args.is_empty() {
                out.push('<');
                out.push_str(&type_list(env, args));
                out.push('>');
            }
            out
        }
        Type::Raw(def) => class_simple_name(env, *def),
        Type::Array(elem) => format!("{}[]", display_type(env, elem)),
        Type::TypeVar(v) => type_var_name(env, *v),
        Type::Wildcard(WildcardBound::Unbounded) => "?".to_string(),
        Type::Wildcard(WildcardBound::Extends(b)) => {
            format!("? extends {}", display_type(env, b))
        }
        Type::Wildcard(WildcardBound::Super(b)) => format!("? super {}", display_type(env, b)),
        Type::Intersection(parts) => parts
            .iter()
            .map(|p| display_type(env, p))
            .collect::<Vec<_>>()
            .join(" & "),
        Type::Missing(id) => simple_segment(env.missing_type_name(*id)).to_string(),
    }
}

/// Comma-separated rendering in declaration order.
pub fn type_list(env: &dyn TypeEnv, types: &[Type]) -> String {
    types
        .iter()
        .map(|t| display_type(env, t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fully qualified rendering used only as a deterministic sort key.
pub(crate) fn type_sort_key(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Class(ClassType { def, args }) => {
            let name = env
                .class(*def)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| format!("<class #{:?}>", def));
            if args.is_empty() {
                name
            } else {
                let args = args
                    .iter()
                    .map(|a| type_sort_key(env, a))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{name}<{args}>")
            }
        }
        Type::Raw(def) => env
            .class(*def)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("<class #{:?}>", def)),
        Type::Array(elem) => format!("{}[]", type_sort_key(env, elem)),
        Type::Missing(id) => env.missing_type_name(*id).to_string(),
        Type::Wildcard(WildcardBound::Extends(b)) => format!("? extends {}", type_sort_key(env, b)),
        Type::Wildcard(WildcardBound::Super(b)) => format!("? super {}", type_sort_key(env, b)),
        Type::Intersection(parts) => parts
            .iter()
            .map(|p| type_sort_key(env, p))
            .collect::<Vec<_>>()
            .join(" & "),
        other => display_type(env, other),
    }
}

fn owner_name(env: &dyn TypeEnv, sig: &MethodSig) -> String {
    class_simple_name(env, sig.owner)
}

pub fn format_method_not_applicable(env: &dyn TypeEnv, sig: &MethodSig, args: &[Type]) -> String {
    format!(
        "The method {}({}) in the type {} is not applicable for the arguments ({})",
        sig.name,
        type_list(env, &sig.params),
        owner_name(env, sig),
        type_list(env, args),
    )
}

pub fn format_method_refers_to_missing(
    env: &dyn TypeEnv,
    sig: &MethodSig,
    missing: MissingTypeId,
) -> String {
    format!(
        "The method {}({}) from the type {} refers to the missing type {}",
        sig.name,
        type_list(env, &sig.params),
        owner_name(env, sig),
        simple_segment(env.missing_type_name(missing)),
    )
}

pub fn format_ambiguous(env: &dyn TypeEnv, sig: &MethodSig) -> String {
    format!(
        "The method {}({}) is ambiguous for the type {}",
        sig.name,
        type_list(env, &sig.params),
        owner_name(env, sig),
    )
}

pub fn format_undefined_method(
    env: &dyn TypeEnv,
    name: &str,
    args: &[Type],
    receiver: &Type,
) -> String {
    format!(
        "The method {}({}) is undefined for the type {}",
        name,
        type_list(env, args),
        display_type(env, receiver),
    )
}

pub fn format_constructor_not_applicable(
    env: &dyn TypeEnv,
    class: crate::ClassId,
    args: &[Type],
) -> String {
    format!(
        "The constructor {}({}) is undefined",
        class_simple_name(env, class),
        type_list(env, args),
    )
}

pub fn format_constructor_ambiguous(env: &dyn TypeEnv, sig: &MethodSig) -> String {
    format!(
        "The constructor {}({}) is ambiguous",
        owner_name(env, sig),
        type_list(env, &sig.params),
    )
}

pub fn format_constructor_refers_to_missing(
    env: &dyn TypeEnv,
    sig: &MethodSig,
    missing: MissingTypeId,
) -> String {
    format!(
        "The constructor {}({}) refers to the missing type {}",
        owner_name(env, sig),
        type_list(env, &sig.params),
        simple_segment(env.missing_type_name(missing)),
    )
}

pub fn format_cannot_infer(type_name: &str) -> String {
    format!("Cannot infer type arguments for {}<>", simple_segment(type_name))
}

pub fn format_redundant_type_args(env: &dyn TypeEnv, args: &[Type]) -> String {
    format!(
        "Redundant specification of type arguments <{}>",
        type_list(env, args)
    )
}

pub fn format_unresolved_type(name: &str) -> String {
    format!("{name} cannot be resolved to a type")
}
