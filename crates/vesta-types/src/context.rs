//! Per-invocation typing context.
//!
//! Capture conversion allocates fresh type variables; doing that in the
//! shared [`crate::TypeStore`] would leak call-site-local state across
//! resolutions. `TyContext` instead layers context-local variables (high-bit
//! tagged ids) over a read-only base environment, so each call site's
//! captures are scoped to exactly one resolution run.

use std::fmt;

use crate::{
    subtype, ClassType, Type, TypeEnv, TypeParamDef, TypeVarId, WildcardBound,
};

pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    locals: Vec<TypeParamDef>,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("locals", &self.locals)
            .finish_non_exhaustive()
    }
}

impl TypeVarId {
    const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

    pub(crate) fn new_context_local(index: u32) -> Self {
        Self(Self::CONTEXT_LOCAL_BIT | index)
    }

    pub(crate) fn context_local_index(self) -> Option<usize> {
        if (self.0 & Self::CONTEXT_LOCAL_BIT) == 0 {
            return None;
        }
        Some((self.0 & !Self::CONTEXT_LOCAL_BIT) as usize)
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    /// Clear all context-local allocations. Prefer a fresh context per
    /// invocation when deterministic capture ids matter.
    pub fn reset(&mut self) {
        self.locals.clear();
    }

    fn add_capture_type_param(
        &mut self,
        upper_bounds: Vec<Type>,
        lower_bound: Option<Type>,
    ) -> TypeVarId {
        let idx: u32 = self
            .locals
            .len()
            .try_into()
            .expect("too many context-local type params");
        let id = TypeVarId::new_context_local(idx);
        self.locals.push(TypeParamDef {
            name: format!("CAP#{}", idx),
            upper_bounds,
            lower_bound,
        });
        id
    }

    /// Capture conversion for parameterized types containing wildcards
    /// (JLS 5.1.10).
    ///
    /// Fresh capture variables are allocated in this context, never in the
    /// base environment. A wildcard bound that is a missing type is kept as
    /// a bound verbatim; the capture variable itself stays usable (identity
    /// conversions and unconstrained inference still succeed on it).
    pub fn capture_conversion(&mut self, ty: &Type) -> Type {
        let Type::Class(ClassType { def, args }) = ty else {
            return ty.clone();
        };

        if args.iter().all(|a| !matches!(a, Type::Wildcard(_))) {
            return ty.clone();
        }

        let Some(class_def) = self.class(*def) else {
            return ty.clone();
        };
        let formal_params = class_def.type_params.clone();

        let object = Type::class(self.well_known().object, vec![]);
        let formal_bounds: Vec<Type> = formal_params
            .iter()
            .map(|tp| {
                self.type_param(*tp)
                    .and_then(|d| d.upper_bounds.first().cloned())
                    .unwrap_or_else(|| object.clone())
            })
            .collect();

        let mut new_args = Vec::with_capacity(args.len());
        for (idx, arg) in args.iter().enumerate() {
            match arg {
                Type::Wildcard(WildcardBound::Unbounded) => {
                    let upper = formal_bounds
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| object.clone());
                    let cap = self.add_capture_type_param(vec![upper], None);
                    new_args.push(Type::TypeVar(cap));
                }
                Type::Wildcard(WildcardBound::Extends(upper)) => {
                    let formal = formal_bounds
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| object.clone());
                    let bound = subtype::glb(self, &formal, upper);
                    let uppers = match bound {
                        Type::Intersection(mut parts) => {
                            subtype::sort_types(self, &mut parts);
                            parts
                        }
                        other => vec![other],
                    };
                    let cap = self.add_capture_type_param(uppers, None);
                    new_args.push(Type::TypeVar(cap));
                }
                Type::Wildcard(WildcardBound::Super(lower)) => {
                    let upper = formal_bounds
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| object.clone());
                    let cap =
                        self.add_capture_type_param(vec![upper], Some((**lower).clone()));
                    new_args.push(Type::TypeVar(cap));
                }
                other => new_args.push(other.clone()),
            }
        }

        // Substitute self-referential formal bounds with the fresh captures
        // (`class Enum<E extends Enum<E>>` and friends).
        let subst: crate::Substitution = formal_params
            .iter()
            .copied()
            .zip(new_args.iter().cloned())
            .collect();
        for arg in &new_args {
            let Type::TypeVar(cap) = arg else { continue };
            let Some(idx) = cap.context_local_index() else {
                continue;
            };
            let def = &mut self.locals[idx];
            def.upper_bounds = def
                .upper_bounds
                .iter()
                .map(|b| crate::substitute(b, &subst))
                .collect();
        }

        Type::class(*def, new_args)
    }
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: crate::ClassId) -> Option<&crate::ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if let Some(idx) = id.context_local_index() {
            return self.locals.get(idx);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<crate::ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &crate::WellKnownTypes {
        self.base.well_known()
    }

    fn missing_type_name(&self, id: crate::MissingTypeId) -> &str {
        self.base.missing_type_name(id)
    }
}
