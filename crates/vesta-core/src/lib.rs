//! Shared leaf types used across Vesta crates: source spans, diagnostic
//! severities, and the diagnostic record produced by resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte-span into a compilation unit's source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single diagnostic attached to a call site or declaration.
///
/// `code` is a stable machine-readable key (e.g. `"not-applicable"`);
/// `message` is the user-facing rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Sort diagnostics by source position, keeping the insertion order of
/// diagnostics that share a span (or have none).
///
/// Resolution failures are per-call-site and collected for a whole unit
/// before reporting, so a stable position sort is what the reporter sees.
pub fn sort_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    // Spanless diagnostics sort last.
    let key = |d: &Diagnostic| d.span.map_or((usize::MAX, usize::MAX), |s| (s.start, s.end));
    diagnostics.sort_by_key(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sort_is_stable_for_equal_spans() {
        let span = Some(Span::new(4, 9));
        let mut diags = vec![
            Diagnostic::error("b", "second at 10", Some(Span::new(10, 12))),
            Diagnostic::error("a", "first at 4", span),
            Diagnostic::warning("a2", "second at 4", span),
            Diagnostic::info("z", "spanless", None),
        ];
        sort_diagnostics(&mut diags);

        let codes: Vec<&str> = diags.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["a", "a2", "b", "z"]);
    }

    #[test]
    fn span_len_saturates() {
        assert_eq!(Span::new(5, 3).len(), 0);
        assert!(Span::new(5, 3).is_empty());
        assert_eq!(Span::new(3, 5).len(), 2);
    }
}
