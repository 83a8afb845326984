//! Diagnostics: syntax and linking problems collected on a resource.
//!
//! Nothing in this module is ever returned as an `Err`. A resource that failed
//! to parse cleanly or whose references could not all be bound still exists;
//! it just carries diagnostics.

use std::fmt;
use std::sync::Arc;

use crate::base::{TextRange, Uri};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Which phase produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Syntax,
    Linking,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// URI of the node the diagnostic is attached to.
    pub source: Option<Uri>,
    /// Source text covered, when known.
    pub range: Option<TextRange>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(kind: DiagnosticKind, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(kind: DiagnosticKind, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            kind,
            code: None,
            message: message.into(),
            source: None,
            range: None,
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: Option<Uri>) -> Self {
        self.source = source;
        self
    }

    pub fn with_range(mut self, range: Option<TextRange>) -> Self {
        self.range = range;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        f.write_str(&self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0001-E0099**: Linking errors and warnings
/// - **S0001-S0099**: Syntax errors reported by parsers
pub mod codes {
    /// Reference target not found in scope.
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Several candidates conform; the first one was bound.
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// Malformed source text.
    pub const SYNTAX_ERROR: &str = "S0001";
}
