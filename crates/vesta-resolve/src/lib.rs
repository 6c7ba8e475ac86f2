//! Per-compilation-unit resolution driver.
//!
//! [`CompilationContext`] owns the symbol table, the compiler options, and
//! the diagnostic sink for one unit. The parser layer hands it spanned
//! [`Invocation`]/[`Allocation`] values with already-typed arguments; each
//! entry point returns the structured [`ResolutionResult`] for downstream
//! consumers (the bytecode emitter binds against `BoundMethod`) and records
//! at most one primary diagnostic per failed site. A failed site never
//! aborts the unit; the next call site resolves against the same store.

use std::collections::HashSet;

use tracing::debug;

use vesta_config::CompilerOptions;
use vesta_core::{sort_diagnostics, Diagnostic, Span};
use vesta_types::{
    check_redundant_type_args, display_type, format_ambiguous, format_cannot_infer,
    format_constructor_ambiguous, format_constructor_not_applicable,
    format_constructor_refers_to_missing, format_method_not_applicable,
    format_method_refers_to_missing, format_redundant_type_args, format_undefined_method,
    format_unresolved_type, resolve_constructor_call, resolve_method_call, ClassType, CtorCall,
    InvocationSite, MethodCall, MissingTypeId, ResolutionResult, TyContext, Type, TypeProvider,
    TypeStore, TypeWarning, UncheckedReason,
};

/// A method call site: the parser-layer [`MethodCall`] plus its source span.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub span: Span,
    pub call: MethodCall,
}

/// A `new` expression site: the parser-layer [`CtorCall`] plus its span.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub span: Span,
    pub call: CtorCall,
}

/// Resolution state for one compilation unit.
///
/// Always an explicit value, threaded by the caller; two units resolving on
/// different threads simply hold different contexts (the store is built once
/// up front and only read during resolution).
pub struct CompilationContext<'p> {
    store: TypeStore,
    provider: &'p dyn TypeProvider,
    options: CompilerOptions,
    diagnostics: Vec<Diagnostic>,
    reported_missing: HashSet<MissingTypeId>,
}

impl<'p> CompilationContext<'p> {
    pub fn new(store: TypeStore, provider: &'p dyn TypeProvider, options: CompilerOptions) -> Self {
        Self {
            store,
            provider,
            options,
            diagnostics: Vec::new(),
            reported_missing: HashSet::new(),
        }
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TypeStore {
        &mut self.store
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Resolve a type reference by qualified name, loading through the
    /// classpath provider. An unresolvable name yields `Type::Missing` and an
    /// `unresolved-type` error, reported once per name per unit.
    pub fn resolve_type_name(&mut self, name: &str, span: Span) -> Type {
        let ty = self.store.resolve(name, self.provider);
        if let Type::Missing(id) = ty {
            if self.reported_missing.insert(id) {
                self.diagnostics.push(Diagnostic::error(
                    "unresolved-type",
                    format_unresolved_type(name),
                    Some(span),
                ));
            }
        }
        ty
    }

    /// Report a declared hierarchy cycle for `name`, if one exists.
    pub fn check_hierarchy(&mut self, name: &str, span: Span) {
        let Some(id) = self.store.class_id(name) else {
            return;
        };
        if self.store.find_hierarchy_cycle(id).is_some() {
            let simple = name.rsplit('.').next().unwrap_or(name);
            self.diagnostics.push(Diagnostic::error(
                "hierarchy-cycle",
                format!("The hierarchy of the type {simple} is inconsistent"),
                Some(span),
            ));
        }
    }

    /// Resolve a method invocation, recording diagnostics for the outcome.
    pub fn resolve_invocation(&mut self, inv: &Invocation) -> ResolutionResult {
        debug!(name = %inv.call.name, args = inv.call.args.len(), "resolving invocation");
        let level = self.options.source_level;
        let mut ctx = TyContext::new(&self.store);
        let result = resolve_method_call(&mut ctx, &inv.call, level);

        match &result {
            ResolutionResult::Bound(bound) => {
                push_unchecked_warnings(
                    &self.options,
                    &mut self.diagnostics,
                    &bound.warnings,
                    inv.span,
                );
                if let (Some(severity), Some(explicit)) = (
                    self.options.redundant_type_arguments,
                    inv.call.explicit_type_args.as_deref(),
                ) {
                    let site = InvocationSite {
                        args: &inv.call.args,
                        explicit_type_args: Some(explicit),
                        expected_type: inv.call.expected_return.as_ref(),
                    };
                    if check_redundant_type_args(&ctx, &bound.sig, &site, bound.phase, level) {
                        self.diagnostics.push(
                            Diagnostic::warning(
                                "redundant-type-arguments",
                                format_redundant_type_args(&ctx, explicit),
                                Some(inv.span),
                            )
                            .with_severity(severity),
                        );
                    }
                }
            }
            ResolutionResult::Ambiguous { candidates } => {
                // Declaration order: the first candidate names the report.
                if let Some(first) = candidates.first() {
                    self.diagnostics.push(Diagnostic::error(
                        "ambiguous",
                        format_ambiguous(&ctx, first),
                        Some(inv.span),
                    ));
                }
            }
            ResolutionResult::MissingTypeBlocked { sig, missing } => {
                self.diagnostics.push(Diagnostic::error(
                    "missing-type",
                    format_method_refers_to_missing(&ctx, sig, *missing),
                    Some(inv.span),
                ));
            }
            ResolutionResult::NotApplicable { attempted } => {
                if let Some(first) = attempted.first() {
                    self.diagnostics.push(Diagnostic::error(
                        "not-applicable",
                        format_method_not_applicable(&ctx, first, &inv.call.args),
                        Some(inv.span),
                    ));
                } else if inv.call.receiver.first_missing().is_none() {
                    // No member of that name at all. A missing receiver was
                    // already reported where its reference failed to resolve.
                    self.diagnostics.push(Diagnostic::error(
                        "undefined-method",
                        format_undefined_method(
                            &ctx,
                            &inv.call.name,
                            &inv.call.args,
                            &inv.call.receiver,
                        ),
                        Some(inv.span),
                    ));
                }
            }
        }
        result
    }

    /// Resolve a class instance creation, recording diagnostics for the
    /// outcome (including the diamond cannot-infer and redundancy cases).
    pub fn resolve_allocation(&mut self, alloc: &Allocation) -> ResolutionResult {
        debug!(
            class = %display_type(&self.store, &alloc.call.class),
            diamond = alloc.call.diamond,
            "resolving allocation"
        );
        let level = self.options.source_level;
        let mut ctx = TyContext::new(&self.store);
        let result = resolve_constructor_call(&mut ctx, &alloc.call, level);

        match &result {
            ResolutionResult::Bound(bound) => {
                push_unchecked_warnings(
                    &self.options,
                    &mut self.diagnostics,
                    &bound.warnings,
                    alloc.span,
                );
                if let Some(severity) = self.options.redundant_type_arguments {
                    if explicit_args_redundant(&self.store, &alloc.call, level) {
                        let Type::Class(ClassType { args, .. }) = &alloc.call.class else {
                            unreachable!("redundancy requires explicit class type arguments");
                        };
                        self.diagnostics.push(
                            Diagnostic::warning(
                                "redundant-type-arguments",
                                format_redundant_type_args(&ctx, args),
                                Some(alloc.span),
                            )
                            .with_severity(severity),
                        );
                    }
                }
            }
            ResolutionResult::Ambiguous { candidates } => {
                if let Some(first) = candidates.first() {
                    self.diagnostics.push(Diagnostic::error(
                        "ambiguous",
                        format_constructor_ambiguous(&ctx, first),
                        Some(alloc.span),
                    ));
                }
            }
            ResolutionResult::MissingTypeBlocked { sig, missing } => {
                self.diagnostics.push(Diagnostic::error(
                    "missing-type",
                    format_constructor_refers_to_missing(&ctx, sig, *missing),
                    Some(alloc.span),
                ));
            }
            ResolutionResult::NotApplicable { .. } => {
                let class_def = match &alloc.call.class {
                    Type::Class(ClassType { def, .. }) | Type::Raw(def) => Some(*def),
                    _ => None,
                };
                match class_def {
                    Some(def) if alloc.call.diamond => {
                        let name = self
                            .store
                            .class(def)
                            .map(|d| d.name.clone())
                            .unwrap_or_default();
                        self.diagnostics.push(Diagnostic::error(
                            "cannot-infer",
                            format_cannot_infer(&name),
                            Some(alloc.span),
                        ));
                    }
                    Some(def) => {
                        self.diagnostics.push(Diagnostic::error(
                            "not-applicable",
                            format_constructor_not_applicable(&ctx, def, &alloc.call.args),
                            Some(alloc.span),
                        ));
                    }
                    // Allocating a missing class: its unresolved reference
                    // was already reported.
                    None => {}
                }
            }
        }
        result
    }

    /// All diagnostics for the unit, sorted by source position (stable for
    /// equal spans, spanless last).
    pub fn finish(mut self) -> Vec<Diagnostic> {
        sort_diagnostics(&mut self.diagnostics);
        self.diagnostics
    }
}

fn push_unchecked_warnings(
    options: &CompilerOptions,
    diagnostics: &mut Vec<Diagnostic>,
    warnings: &[TypeWarning],
    span: Span,
) {
    if !options.report_unchecked {
        return;
    }
    for warning in warnings {
        let TypeWarning::Unchecked(reason) = warning;
        let message = match reason {
            UncheckedReason::RawConversion => "Type safety: unchecked conversion from a raw type",
            UncheckedReason::UncheckedVarargs => {
                "Type safety: a generic array is created for a varargs parameter"
            }
        };
        diagnostics.push(Diagnostic::warning("unchecked", message, Some(span)));
    }
}

/// Would the diamond form have inferred exactly the written type arguments?
fn explicit_args_redundant(
    store: &TypeStore,
    call: &CtorCall,
    level: vesta_config::SourceLevel,
) -> bool {
    if call.diamond {
        return false;
    }
    let Type::Class(ClassType { def, args }) = &call.class else {
        return false;
    };
    if args.is_empty() || args.iter().any(|a| matches!(a, Type::Wildcard(_))) {
        return false;
    }
    let as_diamond = CtorCall {
        class: call.class.clone(),
        diamond: true,
        args: call.args.clone(),
        explicit_type_args: call.explicit_type_args.clone(),
        expected_type: call.expected_type.clone(),
    };
    let mut ctx = TyContext::new(store);
    match resolve_constructor_call(&mut ctx, &as_diamond, level) {
        ResolutionResult::Bound(bound) => {
            bound.return_type == Type::class(*def, args.clone())
        }
        _ => false,
    }
}
