//! Fatal compiler errors.
//!
//! Everything an author can get wrong is reported as a [`Diagnostic`] and the
//! pass keeps going. The errors here abort the compiled unit: they mean the
//! host handed over a malformed tree or an internal invariant broke.
//!
//! [`Diagnostic`]: crate::diagnostics::Diagnostic

use markup_types::SourceLocation;
use thiserror::Error;

/// Errors that abort compilation of a unit.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// Element without a name.
    #[error("malformed tree at {0}: element has no name")]
    UnnamedElement(SourceLocation),

    /// Same attribute twice on one element.
    #[error("malformed tree at {location}: attribute '{attribute}' repeated on '{element}'")]
    DuplicateAttribute {
        element: String,
        attribute: String,
        location: SourceLocation,
    },

    /// The host walk did not supply a parent value the element depends on.
    #[error("malformed tree at {location}: '{element}' under '{parent}' is missing parent value '{key}'")]
    MissingParentValue {
        element: String,
        parent: String,
        key: String,
        location: SourceLocation,
    },

    /// Identifier synthesis was called with the wrong number of fields.
    #[error("identifier prefix '{prefix}' expects {expected} fields, got {actual}")]
    IdentifierFieldCount {
        prefix: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Ordering edge for a search that was never created in this pass.
    #[error("search edge from unknown child '{child}' to '{parent}'")]
    UnknownEdgeChild { child: String, parent: String },
}

impl CompileError {
    /// Check if the error was caused by the input tree rather than by this crate.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CompileError::UnnamedElement(_)
                | CompileError::DuplicateAttribute { .. }
                | CompileError::MissingParentValue { .. }
        )
    }
}
