//! The symbol table: interned classes, type parameters, and missing types.

use std::collections::HashMap;

use crate::{
    provider::{ClassStub, CtorStub, MethodStub, TypeParamStub},
    ClassDef, ClassId, ClassKind, ClassType, CtorDef, MethodDef, MissingTypeId, PrimitiveType,
    StubType, Type, TypeEnv, TypeParamDef, TypeProvider, TypeVarId,
};

/// Class ids of types the resolution algorithms need unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
}

impl WellKnownTypes {
    /// Wrapper class for a primitive (boxing conversion target).
    pub fn boxed(&self, p: PrimitiveType) -> ClassId {
        match p {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// Primitive for a wrapper class (unboxing conversion), if `id` is one.
    pub fn unboxed(&self, id: ClassId) -> Option<PrimitiveType> {
        if id == self.boolean {
            Some(PrimitiveType::Boolean)
        } else if id == self.byte {
            Some(PrimitiveType::Byte)
        } else if id == self.short {
            Some(PrimitiveType::Short)
        } else if id == self.character {
            Some(PrimitiveType::Char)
        } else if id == self.integer {
            Some(PrimitiveType::Int)
        } else if id == self.long {
            Some(PrimitiveType::Long)
        } else if id == self.float {
            Some(PrimitiveType::Float)
        } else if id == self.double {
            Some(PrimitiveType::Double)
        } else {
            None
        }
    }
}

/// Mutable type universe for one compilation.
///
/// Construction (`add_class` / loading through a [`TypeProvider`]) happens up
/// front; the resolution algorithms then borrow the store immutably, so one
/// store can back many call-site resolutions. The missing-type cache is part
/// of the store: the first unresolvable reference to a qualified name interns
/// a [`MissingTypeId`] and every later reference observes the same identity.
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    missing_names: Vec<String>,
    missing_by_name: HashMap<String, MissingTypeId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store pre-seeded with the handful of `java.lang`/`java.util` types
    /// the JLS conversion rules depend on (Object, String, the wrapper
    /// classes, `List` and friends).
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            by_name: HashMap::new(),
            type_params: Vec::new(),
            missing_names: Vec::new(),
            missing_by_name: HashMap::new(),
            // Placeholder ids, patched below once the classes exist.
            well_known: WellKnownTypes {
                object: ClassId(0),
                string: ClassId(0),
                cloneable: ClassId(0),
                serializable: ClassId(0),
                number: ClassId(0),
                boolean: ClassId(0),
                byte: ClassId(0),
                short: ClassId(0),
                character: ClassId(0),
                integer: ClassId(0),
                long: ClassId(0),
                float: ClassId(0),
                double: ClassId(0),
            },
        };
        store.seed_minimal_jdk();
        store
    }

    fn seed_minimal_jdk(&mut self) {
        let object = self.intern_class_id("java.lang.Object");
        let string = self.intern_class_id("java.lang.String");
        let cloneable = self.intern_class_id("java.lang.Cloneable");
        let serializable = self.intern_class_id("java.io.Serializable");
        let number = self.intern_class_id("java.lang.Number");
        let boolean = self.intern_class_id("java.lang.Boolean");
        let byte = self.intern_class_id("java.lang.Byte");
        let short = self.intern_class_id("java.lang.Short");
        let character = self.intern_class_id("java.lang.Character");
        let integer = self.intern_class_id("java.lang.Integer");
        let long = self.intern_class_id("java.lang.Long");
        let float = self.intern_class_id("java.lang.Float");
        let double = self.intern_class_id("java.lang.Double");

        self.well_known = WellKnownTypes {
            object,
            string,
            cloneable,
            serializable,
            number,
            boolean,
            byte,
            short,
            character,
            integer,
            long,
            float,
            double,
        };

        let object_ty = Type::class(object, vec![]);

        self.define_class(
            object,
            ClassDef {
                name: "java.lang.Object".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                constructors: vec![CtorDef {
                    type_params: vec![],
                    params: vec![],
                    throws: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![
                    MethodDef {
                        name: "equals".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(object, vec![])],
                        return_type: Type::boolean(),
                        throws: vec![],
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "hashCode".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        throws: vec![],
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "toString".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::class(string, vec![]),
                        throws: vec![],
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        for (id, name) in [
            (cloneable, "java.lang.Cloneable"),
            (serializable, "java.io.Serializable"),
        ] {
            self.define_class(
                id,
                ClassDef {
                    name: name.to_string(),
                    kind: ClassKind::Interface,
                    type_params: vec![],
                    super_class: None,
                    interfaces: vec![],
                    constructors: vec![],
                    methods: vec![],
                },
            );
        }

        self.define_class(
            string,
            ClassDef {
                name: "java.lang.String".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: vec![Type::class(serializable, vec![])],
                constructors: vec![CtorDef {
                    type_params: vec![],
                    params: vec![],
                    throws: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![MethodDef {
                    name: "length".to_string(),
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::int(),
                    throws: vec![],
                    is_static: false,
                    is_varargs: false,
                    is_abstract: false,
                }],
            },
        );

        self.define_class(
            number,
            ClassDef {
                name: "java.lang.Number".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: vec![Type::class(serializable, vec![])],
                constructors: vec![],
                methods: vec![],
            },
        );

        let numeric = [
            (byte, "java.lang.Byte"),
            (short, "java.lang.Short"),
            (integer, "java.lang.Integer"),
            (long, "java.lang.Long"),
            (float, "java.lang.Float"),
            (double, "java.lang.Double"),
        ];
        for (id, name) in numeric {
            self.define_class(
                id,
                ClassDef {
                    name: name.to_string(),
                    kind: ClassKind::Class,
                    type_params: vec![],
                    super_class: Some(Type::class(number, vec![])),
                    interfaces: vec![Type::class(serializable, vec![])],
                    constructors: vec![],
                    methods: vec![],
                },
            );
        }
        for (id, name) in [
            (boolean, "java.lang.Boolean"),
            (character, "java.lang.Character"),
        ] {
            self.define_class(
                id,
                ClassDef {
                    name: name.to_string(),
                    kind: ClassKind::Class,
                    type_params: vec![],
                    super_class: Some(object_ty.clone()),
                    interfaces: vec![Type::class(serializable, vec![])],
                    constructors: vec![],
                    methods: vec![],
                },
            );
        }

        // java.lang.Iterable<T>
        let iterable_t = self.add_type_param("T", vec![object_ty.clone()]);
        let iterable = self.add_class(ClassDef {
            name: "java.lang.Iterable".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![iterable_t],
            super_class: None,
            interfaces: vec![],
            constructors: vec![],
            methods: vec![],
        });

        // java.util.Collection<E> extends Iterable<E>
        let collection_e = self.add_type_param("E", vec![object_ty.clone()]);
        let collection = self.add_class(ClassDef {
            name: "java.util.Collection".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![collection_e],
            super_class: None,
            interfaces: vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])],
            constructors: vec![],
            methods: vec![MethodDef {
                name: "size".to_string(),
                type_params: vec![],
                params: vec![],
                return_type: Type::int(),
                throws: vec![],
                is_static: false,
                is_varargs: false,
                is_abstract: true,
            }],
        });

        // java.util.List<E> extends Collection<E>
        let list_e = self.add_type_param("E", vec![object_ty.clone()]);
        let list = self.add_class(ClassDef {
            name: "java.util.List".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![list_e],
            super_class: None,
            interfaces: vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
            constructors: vec![],
            methods: vec![
                MethodDef {
                    name: "get".to_string(),
                    type_params: vec![],
                    params: vec![Type::int()],
                    return_type: Type::TypeVar(list_e),
                    throws: vec![],
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
                MethodDef {
                    name: "add".to_string(),
                    type_params: vec![],
                    params: vec![Type::TypeVar(list_e)],
                    return_type: Type::boolean(),
                    throws: vec![],
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
            ],
        });

        // java.util.ArrayList<E> implements List<E>
        let array_list_e = self.add_type_param("E", vec![object_ty.clone()]);
        self.add_class(ClassDef {
            name: "java.util.ArrayList".to_string(),
            kind: ClassKind::Class,
            type_params: vec![array_list_e],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
            constructors: vec![CtorDef {
                type_params: vec![],
                params: vec![],
                throws: vec![],
                is_varargs: false,
                is_accessible: true,
            }],
            methods: vec![],
        });
    }

    // --- class interning ----------------------------------------------------

    /// Reserve (or fetch) the id for `name` without defining it.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(None);
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Define (or overwrite) the class behind an interned id.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.classes[id.0 as usize] = Some(def);
    }

    /// Intern by the definition's own name and define in one step.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name.clone());
        self.define_class(id, def);
        id
    }

    /// Like [`TypeStore::add_class`], but spelled for the re-definition case:
    /// the id stays stable when a class is defined twice.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        self.add_class(def)
    }

    /// Exact-name lookup (no `java.lang` fallback).
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// The pre-interned `java.lang`/`java.util` ids.
    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    /// The definition behind `id`, if the class has been defined (an interned
    /// but not yet defined id yields `None`).
    pub fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize).and_then(Option::as_ref)
    }

    // --- type parameters ----------------------------------------------------

    pub fn add_type_param(&mut self, name: &str, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Overwrite a reserved type parameter, for self-referential bounds
    /// (`E extends Enum<E>`) that need the id before the bound exists.
    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        self.type_params[id.0 as usize] = def;
    }

    // --- missing types ------------------------------------------------------

    /// Intern the missing-type placeholder for `name`. Idempotent: the same
    /// qualified name always yields the same id within one store.
    pub fn intern_missing(&mut self, name: &str) -> MissingTypeId {
        if let Some(&id) = self.missing_by_name.get(name) {
            return id;
        }
        let id = MissingTypeId(self.missing_names.len() as u32);
        self.missing_names.push(name.to_string());
        self.missing_by_name.insert(name.to_string(), id);
        id
    }

    /// Whether `name` has already been recorded as missing.
    pub fn missing_id(&self, name: &str) -> Option<MissingTypeId> {
        self.missing_by_name.get(name).copied()
    }

    // --- raw types ----------------------------------------------------------

    /// The type denoted by referencing `id` without type arguments:
    /// [`Type::Raw`] for generic classes, a plain class type otherwise.
    pub fn declare_raw(&self, id: ClassId) -> Type {
        match self.class(id) {
            Some(def) if !def.type_params.is_empty() => Type::Raw(id),
            _ => Type::class(id, vec![]),
        }
    }

    // --- loading ------------------------------------------------------------

    /// Resolve a qualified name to a type descriptor, consulting `provider`
    /// for classes not yet in the store. Never fails hard: an unloadable
    /// name becomes (and stays) [`Type::Missing`].
    pub fn resolve(&mut self, name: &str, provider: &dyn TypeProvider) -> Type {
        match self.ensure_class(name, provider) {
            Some(id) => self.declare_raw(id),
            None => Type::Missing(self.intern_missing(name)),
        }
    }

    /// Load `name` (and, transitively, the classes its signatures mention)
    /// through `provider`. Returns `None` when the provider has no
    /// descriptor for `name`.
    pub fn ensure_class(&mut self, name: &str, provider: &dyn TypeProvider) -> Option<ClassId> {
        if let Some(id) = self.class_id(name) {
            if self.classes[id.0 as usize].is_some() {
                return Some(id);
            }
        }
        if self.missing_by_name.contains_key(name) {
            return None;
        }
        let stub = provider.load_type(name)?;
        Some(self.define_from_stub(stub, provider))
    }

    fn define_from_stub(&mut self, stub: ClassStub, provider: &dyn TypeProvider) -> ClassId {
        let id = self.intern_class_id(&stub.name);

        // Reserve type-parameter ids and install a skeleton definition first,
        // so self- and mutually-referential signatures find the class mid-load
        // instead of recursing forever.
        let mut scope: HashMap<String, TypeVarId> = HashMap::new();
        let mut class_tvars = Vec::with_capacity(stub.type_params.len());
        for tp in &stub.type_params {
            let tv = self.add_type_param(&tp.name, vec![]);
            scope.insert(tp.name.clone(), tv);
            class_tvars.push(tv);
        }
        self.define_class(
            id,
            ClassDef {
                name: stub.name.clone(),
                kind: stub.kind,
                type_params: class_tvars.clone(),
                super_class: None,
                interfaces: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );

        let object = Type::class(self.well_known.object, vec![]);
        for (tp, tv) in stub.type_params.iter().zip(class_tvars.iter().copied()) {
            let bounds = if tp.bounds.is_empty() {
                vec![object.clone()]
            } else {
                tp.bounds
                    .iter()
                    .map(|b| self.stub_to_type(b, &scope, provider))
                    .collect()
            };
            self.define_type_param(
                tv,
                TypeParamDef {
                    name: tp.name.clone(),
                    upper_bounds: bounds,
                    lower_bound: None,
                },
            );
        }

        let super_class = match &stub.super_class {
            Some(sc) => Some(self.stub_to_type(sc, &scope, provider)),
            None if id != self.well_known.object && stub.kind == ClassKind::Class => {
                Some(object.clone())
            }
            None => None,
        };
        let interfaces = stub
            .interfaces
            .iter()
            .map(|i| self.stub_to_type(i, &scope, provider))
            .collect();
        let constructors = stub
            .constructors
            .iter()
            .map(|c| self.ctor_from_stub(c, &scope, provider))
            .collect();
        let methods = stub
            .methods
            .iter()
            .map(|m| self.method_from_stub(m, &scope, provider))
            .collect();

        self.define_class(
            id,
            ClassDef {
                name: stub.name,
                kind: stub.kind,
                type_params: class_tvars,
                super_class,
                interfaces,
                constructors,
                methods,
            },
        );
        id
    }

    fn method_scope(
        &mut self,
        type_params: &[TypeParamStub],
        class_scope: &HashMap<String, TypeVarId>,
        provider: &dyn TypeProvider,
    ) -> (Vec<TypeVarId>, HashMap<String, TypeVarId>) {
        let mut scope = class_scope.clone();
        let mut tvars = Vec::with_capacity(type_params.len());
        for tp in type_params {
            let tv = self.add_type_param(&tp.name, vec![]);
            scope.insert(tp.name.clone(), tv);
            tvars.push(tv);
        }
        let object = Type::class(self.well_known.object, vec![]);
        for (tp, tv) in type_params.iter().zip(tvars.iter().copied()) {
            let bounds = if tp.bounds.is_empty() {
                vec![object.clone()]
            } else {
                tp.bounds
                    .iter()
                    .map(|b| self.stub_to_type(b, &scope, provider))
                    .collect()
            };
            self.define_type_param(
                tv,
                TypeParamDef {
                    name: tp.name.clone(),
                    upper_bounds: bounds,
                    lower_bound: None,
                },
            );
        }
        (tvars, scope)
    }

    fn method_from_stub(
        &mut self,
        stub: &MethodStub,
        class_scope: &HashMap<String, TypeVarId>,
        provider: &dyn TypeProvider,
    ) -> MethodDef {
        let (tvars, scope) = self.method_scope(&stub.type_params, class_scope, provider);
        MethodDef {
            name: stub.name.clone(),
            type_params: tvars,
            params: stub
                .params
                .iter()
                .map(|p| self.stub_to_type(p, &scope, provider))
                .collect(),
            return_type: self.stub_to_type(&stub.return_type, &scope, provider),
            throws: stub
                .throws
                .iter()
                .map(|t| self.stub_to_type(t, &scope, provider))
                .collect(),
            is_static: stub.is_static,
            is_varargs: stub.is_varargs,
            is_abstract: stub.is_abstract,
        }
    }

    fn ctor_from_stub(
        &mut self,
        stub: &CtorStub,
        class_scope: &HashMap<String, TypeVarId>,
        provider: &dyn TypeProvider,
    ) -> CtorDef {
        let (tvars, scope) = self.method_scope(&stub.type_params, class_scope, provider);
        CtorDef {
            type_params: tvars,
            params: stub
                .params
                .iter()
                .map(|p| self.stub_to_type(p, &scope, provider))
                .collect(),
            throws: stub
                .throws
                .iter()
                .map(|t| self.stub_to_type(t, &scope, provider))
                .collect(),
            is_varargs: stub.is_varargs,
            is_accessible: stub.is_accessible,
        }
    }

    fn stub_to_type(
        &mut self,
        stub: &StubType,
        scope: &HashMap<String, TypeVarId>,
        provider: &dyn TypeProvider,
    ) -> Type {
        match stub {
            StubType::Primitive(p) => Type::Primitive(*p),
            StubType::Void => Type::Void,
            StubType::Array(elem) => Type::array(self.stub_to_type(elem, scope, provider)),
            StubType::Var(name) => match scope.get(name) {
                Some(tv) => Type::TypeVar(*tv),
                // A dangling variable reference is a malformed descriptor;
                // degrade to Object rather than invent a missing type.
                None => Type::class(self.well_known.object, vec![]),
            },
            StubType::Wildcard => Type::Wildcard(crate::WildcardBound::Unbounded),
            StubType::WildcardExtends(b) => Type::Wildcard(crate::WildcardBound::Extends(
                Box::new(self.stub_to_type(b, scope, provider)),
            )),
            StubType::WildcardSuper(b) => Type::Wildcard(crate::WildcardBound::Super(Box::new(
                self.stub_to_type(b, scope, provider),
            ))),
            StubType::Named { name, args } => match self.ensure_class(name, provider) {
                Some(id) => {
                    if args.is_empty() {
                        self.declare_raw(id)
                    } else {
                        let args = args
                            .iter()
                            .map(|a| self.stub_to_type(a, scope, provider))
                            .collect();
                        Type::class(id, args)
                    }
                }
                None => Type::Missing(self.intern_missing(name)),
            },
        }
    }

    // --- hierarchy sanity ---------------------------------------------------

    /// Detect a cycle in the declared superclass/superinterface graph
    /// reachable from `id`, returning the qualified names along the cycle.
    ///
    /// The subtype walkers use seen-sets and terminate on cyclic input; this
    /// is the reporting side so a malformed hierarchy becomes a diagnostic
    /// rather than a silent fixpoint.
    pub fn find_hierarchy_cycle(&self, id: ClassId) -> Option<Vec<String>> {
        fn direct_supers(def: &ClassDef) -> impl Iterator<Item = ClassId> + '_ {
            def.super_class
                .iter()
                .chain(def.interfaces.iter())
                .filter_map(|t| match t {
                    Type::Class(ClassType { def, .. }) => Some(*def),
                    Type::Raw(id) => Some(*id),
                    _ => None,
                })
        }

        fn visit(
            store: &TypeStore,
            id: ClassId,
            path: &mut Vec<ClassId>,
            done: &mut Vec<ClassId>,
        ) -> Option<Vec<String>> {
            if done.contains(&id) {
                return None;
            }
            if let Some(pos) = path.iter().position(|&p| p == id) {
                let names = path[pos..]
                    .iter()
                    .chain(std::iter::once(&id))
                    .map(|&c| {
                        store
                            .class(c)
                            .map(|d| d.name.clone())
                            .unwrap_or_else(|| format!("<class #{}>", c.0))
                    })
                    .collect();
                return Some(names);
            }
            let Some(def) = store.class(id) else {
                return None;
            };
            path.push(id);
            for sup in direct_supers(def) {
                if let Some(cycle) = visit(store, sup, path, done) {
                    return Some(cycle);
                }
            }
            path.pop();
            done.push(id);
            None
        }

        let mut path = Vec::new();
        let mut done = Vec::new();
        visit(self, id, &mut path, &mut done)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        TypeStore::class(self, id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_id(name) {
            return Some(id);
        }
        // Implicit java.lang.* import.
        if !name.contains('.') {
            return self.class_id(&format!("java.lang.{name}"));
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        TypeStore::well_known(self)
    }

    fn missing_type_name(&self, id: MissingTypeId) -> &str {
        &self.missing_names[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NoClasspath;

    #[test]
    fn missing_types_are_interned_once() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.resolve("com.example.Zork", &NoClasspath);
        let b = store.resolve("com.example.Zork", &NoClasspath);
        assert_eq!(a, b);
        let Type::Missing(id) = a else {
            panic!("expected missing type, got {a:?}");
        };
        assert_eq!(store.missing_type_name(id), "com.example.Zork");
        assert_eq!(store.missing_id("com.example.Zork"), Some(id));
    }

    #[test]
    fn declare_raw_distinguishes_generic_classes() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = store.well_known().string;
        assert_eq!(store.declare_raw(list), Type::Raw(list));
        assert_eq!(store.declare_raw(string), Type::class(string, vec![]));
    }

    #[test]
    fn hierarchy_cycle_is_detected_not_overflowed() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.intern_class_id("com.example.A");
        let b = store.intern_class_id("com.example.B");
        store.define_class(
            a,
            ClassDef {
                name: "com.example.A".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(b, vec![])),
                interfaces: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );
        store.define_class(
            b,
            ClassDef {
                name: "com.example.B".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(a, vec![])),
                interfaces: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );

        let cycle = store.find_hierarchy_cycle(a).expect("cycle expected");
        assert_eq!(
            cycle,
            vec!["com.example.A", "com.example.B", "com.example.A"]
        );
        assert_eq!(
            store.find_hierarchy_cycle(store.well_known().string),
            None
        );
    }
}
