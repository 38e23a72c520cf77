//! Content-addressed identifiers for unnamed markup nodes.
//!
//! ```text
//! tag | len1:field1 | len2:field2 | ... | lenN:fieldN     (null field: "-")
//!   → SHA-256
//!   → first 20 bytes
//!   → base64 (no padding, '+' → '.', '/' → '_')
//!   → tag ++ encoded
//! ```
//!
//! The same prefix and fields always give the same identifier, so compiling
//! unchanged markup twice produces byte-identical rows. There is no counter
//! or cache anywhere in here; units compiled in parallel cannot influence
//! each other's identifiers.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CompileError;

/// Separator between hashed fields. Fields are length-prefixed, so field
/// content may contain it.
const FIELD_SEPARATOR: char = '|';

/// Segment written for a null field. Present fields always start with a digit.
const NULL_FIELD: &str = "-";

/// Bytes of the digest kept in the identifier.
const DIGEST_BYTES: usize = 20;

/// Longest identifier the downstream engine accepts.
pub const MAX_IDENTIFIER_LENGTH: usize = 72;

/// A row identifier, author-supplied or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an explicit, author-supplied identifier verbatim.
    pub fn explicit(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Node kinds that get synthesized identifiers.
///
/// Each kind hashes a fixed number of fields; the tag keeps kinds with equal
/// fields apart (a directory search and a file search on the same path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierPrefix {
    /// variable, condition, after, guid, product code, attributes
    ComponentSearch,
    /// variable, condition, after, path, attributes
    DirectorySearch,
    /// variable, condition, after, path, attributes
    FileSearch,
    /// variable, condition, after, product or upgrade code, attributes
    ProductSearch,
    /// variable, condition, after, root, key, value, attributes
    RegistrySearch,
    /// component, root, key, name
    RegistryValue,
}

impl IdentifierPrefix {
    pub fn tag(&self) -> &'static str {
        match self {
            IdentifierPrefix::ComponentSearch => "wcs",
            IdentifierPrefix::DirectorySearch => "wds",
            IdentifierPrefix::FileSearch => "wfs",
            IdentifierPrefix::ProductSearch => "wps",
            IdentifierPrefix::RegistrySearch => "wrs",
            IdentifierPrefix::RegistryValue => "reg",
        }
    }

    pub fn field_count(&self) -> usize {
        match self {
            IdentifierPrefix::ComponentSearch => 6,
            IdentifierPrefix::DirectorySearch => 5,
            IdentifierPrefix::FileSearch => 5,
            IdentifierPrefix::ProductSearch => 5,
            IdentifierPrefix::RegistrySearch => 7,
            IdentifierPrefix::RegistryValue => 4,
        }
    }
}

/// Synthesize an identifier from a prefix and its ordered fields.
///
/// Every present field is written as `<byte length>:<value>` and a `None`
/// field as `-`, so no two distinct field lists hash the same material.
pub fn synthesize(
    prefix: IdentifierPrefix,
    fields: &[Option<&str>],
) -> Result<Identifier, CompileError> {
    if fields.len() != prefix.field_count() {
        return Err(CompileError::IdentifierFieldCount {
            prefix: prefix.tag(),
            expected: prefix.field_count(),
            actual: fields.len(),
        });
    }

    let mut material = String::from(prefix.tag());
    for field in fields {
        material.push(FIELD_SEPARATOR);
        match field {
            Some(value) => {
                material.push_str(&value.len().to_string());
                material.push(':');
                material.push_str(value);
            }
            None => material.push_str(NULL_FIELD),
        }
    }

    let digest = Sha256::digest(material.as_bytes());
    let encoded = STANDARD_NO_PAD
        .encode(&digest[..DIGEST_BYTES])
        .replace('+', ".")
        .replace('/', "_");

    Ok(Identifier(format!("{}{}", prefix.tag(), encoded)))
}

/// Check that `id` is usable as a row identifier.
///
/// Letter or underscore first, then letters, digits, underscores and periods.
pub fn is_legal_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    first_ok
        && id.len() <= MAX_IDENTIFIER_LENGTH
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_search(path: &str) -> Identifier {
        synthesize(
            IdentifierPrefix::FileSearch,
            &[Some("HASFOO"), None, None, Some(path), Some("257")],
        )
        .unwrap()
    }

    #[test]
    fn synthesize_is_deterministic() {
        assert_eq!(file_search("C:\\foo.txt"), file_search("C:\\foo.txt"));
    }

    #[test]
    fn synthesize_changes_with_any_field() {
        assert_ne!(file_search("C:\\foo.txt"), file_search("C:\\bar.txt"));
    }

    #[test]
    fn synthesize_keeps_field_positions() {
        let a = synthesize(
            IdentifierPrefix::FileSearch,
            &[Some("V"), None, Some("X"), Some("p"), Some("1")],
        )
        .unwrap();
        let b = synthesize(
            IdentifierPrefix::FileSearch,
            &[Some("V"), Some("X"), None, Some("p"), Some("1")],
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn separator_inside_fields_does_not_collide() {
        let registry = |key: &str, value: &str| {
            synthesize(
                IdentifierPrefix::RegistrySearch,
                &[Some("A"), None, None, Some("2"), Some(key), Some(value), Some("2")],
            )
            .unwrap()
        };
        assert_ne!(registry("Software\\K|", "X"), registry("Software\\K", "|X"));
        assert_ne!(registry("K|-", "X"), registry("K", "-|X"));
    }

    #[test]
    fn null_and_empty_fields_differ() {
        let a = synthesize(
            IdentifierPrefix::FileSearch,
            &[Some("V"), None, None, Some("p"), Some("1")],
        )
        .unwrap();
        let b = synthesize(
            IdentifierPrefix::FileSearch,
            &[Some("V"), Some(""), None, Some("p"), Some("1")],
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prefix_separates_kinds() {
        let fields = [Some("V"), None, None, Some("C:\\dir"), Some("1")];
        let dir = synthesize(IdentifierPrefix::DirectorySearch, &fields).unwrap();
        let file = synthesize(IdentifierPrefix::FileSearch, &fields).unwrap();
        assert_ne!(dir, file);
        assert!(dir.as_str().starts_with("wds"));
        assert!(file.as_str().starts_with("wfs"));
    }

    #[test]
    fn synthesized_ids_are_legal() {
        let id = file_search("C:\\foo.txt");
        assert_eq!(id.as_str().len(), 30);
        assert!(is_legal_identifier(id.as_str()));
    }

    #[test]
    fn field_count_mismatch_is_fatal() {
        let err = synthesize(IdentifierPrefix::RegistrySearch, &[Some("V")]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::IdentifierFieldCount {
                expected: 7,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn identifier_legality() {
        assert!(is_legal_identifier("MySearch"));
        assert!(is_legal_identifier("_x.y_1"));
        assert!(!is_legal_identifier("1abc"));
        assert!(!is_legal_identifier("has space"));
        assert!(!is_legal_identifier(""));
        assert!(!is_legal_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)));
    }
}
