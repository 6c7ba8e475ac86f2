//! Java type descriptors, the symbol table, and the overload-resolution /
//! generic-inference engines built on top of them.
//!
//! The crate is deliberately parser- and I/O-free: callers hand it already
//! typed argument lists (see `vesta-resolve` for the driver layer) and a
//! [`TypeProvider`] for loading referenced classes. A type that cannot be
//! loaded becomes [`Type::Missing`] and keeps the same identity for the rest
//! of the compilation, so diagnostics about it deduplicate naturally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod applicability;
mod context;
mod format;
mod infer;
mod overload;
mod provider;
mod store;
mod subtype;

pub use applicability::{
    check_applicability, Applicability, ApplicableMatch, InvocationSite, Phase, TypeWarning,
    UncheckedReason,
};
pub use context::TyContext;
pub use format::{
    display_type, format_ambiguous, format_cannot_infer, format_constructor_ambiguous,
    format_constructor_not_applicable, format_constructor_refers_to_missing,
    format_method_not_applicable, format_method_refers_to_missing, format_redundant_type_args,
    format_undefined_method, format_unresolved_type, type_list,
};
pub use infer::{
    check_redundant_type_args, infer_constructor_type_args, infer_method_type_args, InferenceError,
};
pub use overload::{
    resolve_constructor_call, resolve_method_call, resolve_overload, BoundMethod,
    CallKind, CtorCall, MethodCall, MethodSig, ResolutionResult,
};
pub use provider::{
    ClassStub, CtorStub, MethodStub, NoClasspath, StubType, TypeParamStub, TypeProvider,
};
pub use store::{TypeStore, WellKnownTypes};
pub use subtype::{erasure, glb, is_assignable, is_reifiable, is_subtype, lub, widens_primitive};

/// Identifies a class or interface definition in a [`TypeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) u32);

/// Identifies a type variable declaration.
///
/// Ids with the high bit set are context-local capture variables allocated by
/// a [`TyContext`]; they never appear in a [`TypeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub(crate) u32);

/// Identifies an interned missing type (a qualified name that could not be
/// loaded from the classpath).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissingTypeId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// A class or interface instantiation.
///
/// `args` is empty only for non-generic classes; a generic class used
/// without arguments is [`Type::Raw`] instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

/// The closed descriptor sum type for Java types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Void,
    /// The type of the `null` literal.
    Null,
    Class(ClassType),
    /// Erasure of a generic class referenced without type arguments.
    Raw(ClassId),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
    /// A referenced type whose definition is absent from the classpath.
    Missing(MissingTypeId),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { def, args })
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    /// Whether a `null` argument is compatible with this type.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Raw(_)
                | Type::Array(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Missing(_)
        )
    }

    /// First missing type structurally reachable from this descriptor, if any.
    ///
    /// Does not look through type-variable bounds: a capture variable with a
    /// missing bound is still a usable type on its own (its other bounds and
    /// identity conversions keep working).
    pub fn first_missing(&self) -> Option<MissingTypeId> {
        match self {
            Type::Missing(id) => Some(*id),
            Type::Array(elem) => elem.first_missing(),
            Type::Class(ClassType { args, .. }) => args.iter().find_map(Type::first_missing),
            Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
                b.first_missing()
            }
            Type::Intersection(parts) => parts.iter().find_map(Type::first_missing),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// A declared type variable with its bounds.
///
/// `lower_bound` is only ever set on capture variables produced from `? super`
/// wildcards; source-level type parameters have upper bounds only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub throws: Vec<Type>,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtorDef {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub throws: Vec<Type>,
    pub is_varargs: bool,
    pub is_accessible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub constructors: Vec<CtorDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    /// Last segment of the qualified name, as used in diagnostics.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(|c| c == '.' || c == '$')
            .next()
            .unwrap_or(&self.name)
    }
}

/// Read-only view of the type universe used by every resolution algorithm.
///
/// [`TypeStore`] is the canonical implementation; [`TyContext`] layers
/// context-local capture variables on top of another environment.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
    fn missing_type_name(&self, id: MissingTypeId) -> &str;
}

/// A solved mapping from type variables to type arguments.
///
/// Backed by a `BTreeMap` so iteration (and therefore everything derived
/// from it, like rendered type-argument lists) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: BTreeMap<TypeVarId, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: TypeVarId, ty: Type) {
        self.map.insert(var, ty);
    }

    pub fn get(&self, var: TypeVarId) -> Option<&Type> {
        self.map.get(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeVarId, &Type)> {
        self.map.iter().map(|(k, v)| (*k, v))
    }

    /// The inferred arguments for `vars`, in declaration order. Unmapped
    /// variables stay as themselves.
    pub fn type_args_for(&self, vars: &[TypeVarId]) -> Vec<Type> {
        vars.iter()
            .map(|v| self.get(*v).cloned().unwrap_or(Type::TypeVar(*v)))
            .collect()
    }
}

impl FromIterator<(TypeVarId, Type)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVarId, Type)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Apply `subst` to every type-variable occurrence in `ty`.
pub fn substitute(ty: &Type, subst: &Substitution) -> Type {
    match ty {
        Type::TypeVar(v) => subst.get(*v).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => {
            Type::class(*def, args.iter().map(|a| substitute(a, subst)).collect())
        }
        Type::Array(elem) => Type::array(substitute(elem, subst)),
        Type::Wildcard(WildcardBound::Extends(b)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(b, subst))))
        }
        Type::Wildcard(WildcardBound::Super(b)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(b, subst))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, subst)).collect())
        }
        _ => ty.clone(),
    }
}
