//! Typed attribute readers.
//!
//! Each reader validates one attribute value, reports a diagnostic when it is
//! not legal and returns `None` so the caller can carry on with the rest of
//! the element.

use markup_types::{Attribute, Element};
use std::collections::HashSet;

use crate::diagnostics::{self, Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::is_legal_identifier;

/// Reject trees the host should never have produced.
pub fn check_structure(element: &Element) -> Result<(), CompileError> {
    if element.name.is_empty() {
        return Err(CompileError::UnnamedElement(element.location.clone()));
    }

    let mut seen = HashSet::new();
    for attr in &element.attributes {
        if !seen.insert(attr.name.as_str()) {
            return Err(CompileError::DuplicateAttribute {
                element: element.name.clone(),
                attribute: attr.name.clone(),
                location: attr.location.clone(),
            });
        }
    }
    Ok(())
}

/// Any non-empty string.
pub fn string(element: &str, attr: &Attribute, sink: &mut DiagnosticSink) -> Option<String> {
    if attr.value.is_empty() {
        sink.push(
            Diagnostic::error(
                DiagnosticCode::IllegalAttributeValue,
                format!(
                    "The {} element's {} attribute cannot be empty.",
                    element, attr.name
                ),
            )
            .at(&attr.location),
        );
        return None;
    }
    Some(attr.value.clone())
}

/// A legal identifier.
pub fn identifier(element: &str, attr: &Attribute, sink: &mut DiagnosticSink) -> Option<String> {
    let value = string(element, attr, sink)?;
    if !is_legal_identifier(&value) {
        sink.push(diagnostics::malformed_value(
            element,
            &attr.name,
            &value,
            "a legal identifier",
            &attr.location,
        ));
        return None;
    }
    Some(value)
}

/// `yes` or `no`.
pub fn yes_no(element: &str, attr: &Attribute, sink: &mut DiagnosticSink) -> Option<bool> {
    match attr.value.as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        other => {
            sink.push(diagnostics::illegal_value(
                element,
                &attr.name,
                other,
                &["yes", "no"],
                &attr.location,
            ));
            None
        }
    }
}

/// A non-negative integer.
pub fn integer(element: &str, attr: &Attribute, sink: &mut DiagnosticSink) -> Option<u32> {
    match attr.value.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            sink.push(diagnostics::malformed_value(
                element,
                &attr.name,
                &attr.value,
                "a non-negative integer",
                &attr.location,
            ));
            None
        }
    }
}

/// A GUID, normalized to upper case with braces.
pub fn guid(element: &str, attr: &Attribute, sink: &mut DiagnosticSink) -> Option<String> {
    let value = string(element, attr, sink)?;
    let trimmed = value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(&value);

    match uuid::Uuid::try_parse(trimmed) {
        Ok(parsed) if trimmed.len() == 36 => Some(format!(
            "{{{}}}",
            parsed.hyphenated().to_string().to_uppercase()
        )),
        _ => {
            sink.push(diagnostics::malformed_value(
                element,
                &attr.name,
                &value,
                "a GUID",
                &attr.location,
            ));
            None
        }
    }
}

/// One of an enumerated set of values.
pub fn one_of<'v>(
    element: &str,
    attr: &Attribute,
    legal: &[&'v str],
    sink: &mut DiagnosticSink,
) -> Option<&'v str> {
    match legal.iter().find(|v| **v == attr.value) {
        Some(v) => Some(*v),
        None => {
            sink.push(diagnostics::illegal_value(
                element,
                &attr.name,
                &attr.value,
                legal,
                &attr.location,
            ));
            None
        }
    }
}
