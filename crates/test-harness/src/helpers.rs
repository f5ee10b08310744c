//! Helper functions: error type, sub-element names, diagnostic filters.

use file_format::{LoadError, SaveError};
use object_graph::{DiagnosticKind, DocumentError, LoadDiagnostic};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("object not found: {name}")]
    ObjectNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("archive save error: {0}")]
    Save(#[from] SaveError),

    #[error("archive load error: {0}")]
    Load(#[from] LoadError),
}

// ── Value Constructors ──────────────────────────────────────────────────────

/// Owned sub-element names, e.g. `subs(&["Face1", "Edge3"])`.
pub fn subs(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ── Diagnostics ─────────────────────────────────────────────────────────────

/// The diagnostics of one kind, in the order they were recorded.
pub fn diagnostics_of(diagnostics: &[LoadDiagnostic], kind: DiagnosticKind) -> Vec<&LoadDiagnostic> {
    diagnostics.iter().filter(|d| d.kind == kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(kind: DiagnosticKind, subject: &str) -> LoadDiagnostic {
        LoadDiagnostic {
            kind,
            subject: subject.to_string(),
            message: format!("{subject} failed"),
        }
    }

    #[test]
    fn subs_are_owned_in_order() {
        assert_eq!(subs(&["Face1", "Edge3"]), vec!["Face1".to_string(), "Edge3".to_string()]);
        assert!(subs(&[]).is_empty());
    }

    #[test]
    fn diagnostics_filter_by_kind() {
        let all = vec![
            diagnostic(DiagnosticKind::DanglingLink, "Base"),
            diagnostic(DiagnosticKind::MissingFile, "Pad.Knots"),
            diagnostic(DiagnosticKind::DanglingLink, "Tool"),
        ];
        let dangling = diagnostics_of(&all, DiagnosticKind::DanglingLink);
        assert_eq!(dangling.len(), 2);
        assert_eq!(dangling[1].subject, "Tool");
        assert!(diagnostics_of(&all, DiagnosticKind::SelfLink).is_empty());
    }
}
