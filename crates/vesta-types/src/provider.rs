//! The classpath boundary: raw, name-based class descriptors and the
//! provider trait that yields them.
//!
//! Providers are implemented in `vesta-classpath`; this crate only consumes
//! them. A `None` from [`TypeProvider::load_type`] is what turns a
//! referenced name into a [`crate::Type::Missing`] placeholder.

use serde::{Deserialize, Serialize};

/// A type reference as it appears in a class descriptor, before any
/// [`crate::ClassId`] interning has happened. Names are fully qualified
/// (binary names with `$` for nested classes are accepted).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StubType {
    Primitive(crate::PrimitiveType),
    Void,
    Named { name: String, args: Vec<StubType> },
    Array(Box<StubType>),
    /// Reference to a type variable declared by the enclosing class or
    /// method, by name.
    Var(String),
    Wildcard,
    WildcardExtends(Box<StubType>),
    WildcardSuper(Box<StubType>),
}

impl StubType {
    pub fn named(name: impl Into<String>) -> StubType {
        StubType::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<StubType>) -> StubType {
        StubType::Named {
            name: name.into(),
            args,
        }
    }
}

/// A type-variable declaration in a stub: name plus upper bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamStub {
    pub name: String,
    pub bounds: Vec<StubType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    pub name: String,
    pub type_params: Vec<TypeParamStub>,
    pub params: Vec<StubType>,
    pub return_type: StubType,
    pub throws: Vec<StubType>,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtorStub {
    pub type_params: Vec<TypeParamStub>,
    pub params: Vec<StubType>,
    pub throws: Vec<StubType>,
    pub is_varargs: bool,
    pub is_accessible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    pub name: String,
    pub kind: crate::ClassKind,
    pub type_params: Vec<TypeParamStub>,
    pub super_class: Option<StubType>,
    pub interfaces: Vec<StubType>,
    pub constructors: Vec<CtorStub>,
    pub methods: Vec<MethodStub>,
}

/// Source of raw class descriptors, keyed by qualified name.
///
/// Implementations must be deterministic: repeated lookups of the same name
/// within one compilation observe the same answer.
pub trait TypeProvider {
    fn load_type(&self, qualified_name: &str) -> Option<ClassStub>;
}

/// The empty classpath: every lookup is missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClasspath;

impl TypeProvider for NoClasspath {
    fn load_type(&self, _qualified_name: &str) -> Option<ClassStub> {
        None
    }
}
