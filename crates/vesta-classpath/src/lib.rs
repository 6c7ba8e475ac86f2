//! Classpath providers: implementations of [`TypeProvider`] that back a
//! `TypeStore` with class descriptors.
//!
//! The stub model itself ([`vesta_types::ClassStub`] and friends) lives in
//! `vesta-types`, next to the store that consumes it; this crate supplies the
//! provider implementations a compilation wires together. Real archive and
//! classfile readers would slot in as further [`TypeProvider`] impls; a name
//! no provider can answer is what becomes a `Missing` type downstream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vesta_types::{ClassStub, TypeProvider};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("duplicate class descriptor for {0}")]
    DuplicateClass(String),
    #[error("malformed class descriptor set: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serialized form of an in-memory classpath: a flat list of descriptors.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StubSet {
    classes: Vec<ClassStub>,
}

/// A classpath held entirely in memory, keyed by qualified name.
///
/// The backbone of the test suites and of callers that synthesize
/// descriptors instead of reading archives.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    classes: HashMap<String, ClassStub>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Duplicate qualified names are an error: the
    /// provider contract requires deterministic answers, and last-one-wins
    /// would hide a broken classpath.
    pub fn add(&mut self, stub: ClassStub) -> Result<(), ClasspathError> {
        if self.classes.contains_key(&stub.name) {
            return Err(ClasspathError::DuplicateClass(stub.name));
        }
        self.classes.insert(stub.name.clone(), stub);
        Ok(())
    }

    /// Load a descriptor set from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ClasspathError> {
        let set: StubSet = serde_json::from_str(json)?;
        let mut provider = Self::new();
        for stub in set.classes {
            provider.add(stub)?;
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeProvider for InMemoryProvider {
    fn load_type(&self, qualified_name: &str) -> Option<ClassStub> {
        self.classes.get(qualified_name).cloned()
    }
}

/// Several providers consulted in order, first answer wins — the classpath
/// entry ordering of a real compiler invocation.
#[derive(Default)]
pub struct ChainProvider<'a> {
    links: Vec<&'a dyn TypeProvider>,
}

impl<'a> ChainProvider<'a> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    pub fn push(&mut self, provider: &'a dyn TypeProvider) {
        self.links.push(provider);
    }
}

impl TypeProvider for ChainProvider<'_> {
    fn load_type(&self, qualified_name: &str) -> Option<ClassStub> {
        self.links
            .iter()
            .find_map(|link| link.load_type(qualified_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vesta_types::{ClassKind, StubType};

    fn stub(name: &str) -> ClassStub {
        ClassStub {
            name: name.to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: Some(StubType::named("java.lang.Object")),
            interfaces: vec![],
            constructors: vec![],
            methods: vec![],
        }
    }

    #[test]
    fn in_memory_lookup_and_duplicates() {
        let mut provider = InMemoryProvider::new();
        provider.add(stub("com.example.A")).unwrap();
        assert!(provider.load_type("com.example.A").is_some());
        assert!(provider.load_type("com.example.B").is_none());

        let err = provider.add(stub("com.example.A")).unwrap_err();
        assert!(matches!(err, ClasspathError::DuplicateClass(n) if n == "com.example.A"));
    }

    #[test]
    fn chain_answers_in_order() {
        let mut first = InMemoryProvider::new();
        first.add(stub("com.example.A")).unwrap();
        let mut second = InMemoryProvider::new();
        let mut shadowed = stub("com.example.A");
        shadowed.kind = ClassKind::Interface;
        second.add(shadowed).unwrap();
        second.add(stub("com.example.B")).unwrap();

        let mut chain = ChainProvider::new();
        chain.push(&first);
        chain.push(&second);

        // First entry shadows the second for A; B falls through.
        assert_eq!(
            chain.load_type("com.example.A").unwrap().kind,
            ClassKind::Class
        );
        assert!(chain.load_type("com.example.B").is_some());
        assert!(chain.load_type("com.example.C").is_none());
    }

    #[test]
    fn json_descriptor_set_loads() {
        let json = r#"{
            "classes": [
                {
                    "name": "com.example.Widget",
                    "kind": "Class",
                    "type_params": [],
                    "super_class": { "Named": { "name": "java.lang.Object", "args": [] } },
                    "interfaces": [],
                    "constructors": [],
                    "methods": []
                }
            ]
        }"#;
        let provider = InMemoryProvider::from_json(json).unwrap();
        assert_eq!(provider.len(), 1);
        assert_eq!(
            provider.load_type("com.example.Widget").unwrap().name,
            "com.example.Widget"
        );
    }
}
