//! Bitmask encoder for permission grants.

use thiserror::Error;

use super::vocabulary::ObjectKind;

/// GENERIC_READ alone. Indistinguishable from "no access" downstream.
pub const GENERIC_READ_ONLY: u32 = 0x8000_0000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Name in none of the vocabularies for the object kind.
    #[error("'{0}' is not a permission of this object kind")]
    UnknownPermission(String),

    /// The grant collapses to the reserved GENERIC_READ-only pattern.
    #[error("GenericRead alone grants no access")]
    GenericReadOnly,
}

/// Accumulates yes/no permission attributes into one mask.
#[derive(Debug, Clone)]
pub struct PermissionEncoder {
    kind: ObjectKind,
    mask: u32,
}

impl PermissionEncoder {
    pub fn new(kind: ObjectKind) -> Self {
        Self { kind, mask: 0 }
    }

    /// Apply one attribute. Returns `false` when the name is not a
    /// permission; the caller reports it as an unexpected attribute.
    pub fn apply(&mut self, name: &str, granted: bool) -> bool {
        match self.kind.mask_of(name) {
            Some(mask) => {
                if granted {
                    self.mask |= mask;
                }
                true
            }
            None => false,
        }
    }

    /// Whether `name` is a permission of this object kind.
    pub fn accepts(&self, name: &str) -> bool {
        self.kind.mask_of(name).is_some()
    }

    /// The finished mask, or `None` when it collapses to GENERIC_READ alone.
    pub fn finish(self) -> Option<u32> {
        (self.mask != GENERIC_READ_ONLY).then_some(self.mask)
    }
}

/// Encode a complete set of permission attributes.
pub fn encode<'a>(
    kind: ObjectKind,
    attributes: impl IntoIterator<Item = (&'a str, bool)>,
) -> Result<u32, EncodeError> {
    let mut encoder = PermissionEncoder::new(kind);
    for (name, granted) in attributes {
        if !encoder.apply(name, granted) {
            return Err(EncodeError::UnknownPermission(name.to_string()));
        }
    }
    encoder.finish().ok_or(EncodeError::GenericReadOnly)
}
