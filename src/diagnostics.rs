//! Unified Diagnostics Module
//!
//! Single diagnostic type for everything an author can get wrong in a unit.
//! Diagnostics are recoverable: they are collected in a [`DiagnosticSink`]
//! and the pass continues with sibling and subsequent elements.

use markup_types::SourceLocation;
use serde::{Deserialize, Serialize};

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic codes for categorizing issues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // =========================================================================
    // Attribute errors
    // =========================================================================
    MissingRequiredAttribute,
    IllegalAttributeValue,
    MutuallyExclusiveAttributes,
    IllegalAttributeCombination,
    GenericReadNotAllowed,
    UnexpectedAttribute,

    // =========================================================================
    // Element errors
    // =========================================================================
    UnexpectedElement,
    UnsupportedPlatform,

    // =========================================================================
    // Reference errors
    // =========================================================================
    UndefinedSymbol,

    // =========================================================================
    // Warnings
    // =========================================================================
    DeprecatedAttribute,
}

/// Broad grouping of diagnostic codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    MissingRequired,
    IllegalValue,
    MutuallyExclusive,
    IllegalCombination,
    UnsupportedPlatform,
    Structure,
    Reference,
    Deprecation,
}

impl DiagnosticCode {
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            DiagnosticCode::MissingRequiredAttribute => DiagnosticCategory::MissingRequired,
            DiagnosticCode::IllegalAttributeValue => DiagnosticCategory::IllegalValue,
            DiagnosticCode::MutuallyExclusiveAttributes => DiagnosticCategory::MutuallyExclusive,
            DiagnosticCode::IllegalAttributeCombination | DiagnosticCode::GenericReadNotAllowed => {
                DiagnosticCategory::IllegalCombination
            }
            DiagnosticCode::UnsupportedPlatform => DiagnosticCategory::UnsupportedPlatform,
            DiagnosticCode::UnexpectedAttribute | DiagnosticCode::UnexpectedElement => {
                DiagnosticCategory::Structure
            }
            DiagnosticCode::UndefinedSymbol => DiagnosticCategory::Reference,
            DiagnosticCode::DeprecatedAttribute => DiagnosticCategory::Deprecation,
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Add source location
    pub fn at(mut self, location: &SourceLocation) -> Self {
        self.location = Some(location.clone());
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.location {
            Some(loc) => write!(f, "{}: {} {:?}: {}", loc, severity, self.code, self.message),
            None => write!(f, "{} {:?}: {}", severity, self.code, self.message),
        }
    }
}

// =============================================================================
// Sink
// =============================================================================

/// Collects the diagnostics of one compiled unit.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    warnings_as_errors: bool,
    errors: usize,
}

impl DiagnosticSink {
    pub fn new(warnings_as_errors: bool) -> Self {
        Self {
            diagnostics: Vec::new(),
            warnings_as_errors,
            errors: 0,
        }
    }

    /// Record a diagnostic, promoting warnings when configured to.
    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        if self.warnings_as_errors && diagnostic.is_warning() {
            diagnostic.severity = Severity::Error;
        }
        if diagnostic.is_error() {
            self.errors += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Number of errors recorded so far.
    ///
    /// Element compilers take this before validating a node and compare
    /// afterwards to decide whether the node may emit rows.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

// =============================================================================
// Convenience Builders
// =============================================================================

/// Required attribute absent from an element
pub fn missing_attribute(element: &str, attribute: &str, location: &SourceLocation) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::MissingRequiredAttribute,
        format!(
            "The {} element's {} attribute was not found; it is required.",
            element, attribute
        ),
    )
    .at(location)
}

/// Required attribute absent, satisfiable by one of several attributes
pub fn missing_one_of(element: &str, attributes: &[&str], location: &SourceLocation) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::MissingRequiredAttribute,
        format!(
            "The {} element requires one of the attributes: {}.",
            element,
            attributes.join(", ")
        ),
    )
    .at(location)
}

/// Value outside an enumerated legal set
pub fn illegal_value(
    element: &str,
    attribute: &str,
    value: &str,
    legal: &[&str],
    location: &SourceLocation,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::IllegalAttributeValue,
        format!(
            "The {} element's {} attribute contains an illegal value '{}'. Legal values are: {}.",
            element,
            attribute,
            value,
            legal
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    )
    .at(location)
}

/// Value malformed for the attribute's type
pub fn malformed_value(
    element: &str,
    attribute: &str,
    value: &str,
    expected: &str,
    location: &SourceLocation,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::IllegalAttributeValue,
        format!(
            "The {} element's {} attribute value '{}' is not {}.",
            element, attribute, value, expected
        ),
    )
    .at(location)
}

/// Two attributes that cannot appear together
pub fn mutually_exclusive(
    element: &str,
    attribute: &str,
    other: &str,
    location: &SourceLocation,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::MutuallyExclusiveAttributes,
        format!(
            "The {} element cannot specify the {} attribute together with the {} attribute.",
            element, attribute, other
        ),
    )
    .at(location)
}

/// Attribute values that are individually legal but contradict each other
pub fn illegal_combination(
    element: &str,
    attribute: &str,
    other: &str,
    other_value: &str,
    location: &SourceLocation,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::IllegalAttributeCombination,
        format!(
            "The {} element's {} attribute cannot be specified when the {} attribute has the value '{}'.",
            element, attribute, other, other_value
        ),
    )
    .at(location)
}

/// Attribute not understood by the element
pub fn unexpected_attribute(element: &str, attribute: &str, location: &SourceLocation) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::UnexpectedAttribute,
        format!(
            "The {} element contains an unexpected attribute '{}'.",
            element, attribute
        ),
    )
    .at(location)
}

/// Element not legal in its position
pub fn unexpected_element(parent: &str, element: &str, location: &SourceLocation) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::UnexpectedElement,
        format!(
            "The {} element contains an unexpected child element '{}'.",
            parent, element
        ),
    )
    .at(location)
}

/// Hard reference to an entity the unit does not declare
pub fn undefined_symbol(kind: &str, id: &str, location: &SourceLocation) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::UndefinedSymbol,
        format!("Unresolved reference to symbol '{}:{}'.", kind, id),
    )
    .at(location)
}

// =============================================================================
// Tests
// =============================================================================
