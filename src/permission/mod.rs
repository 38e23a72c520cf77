//! Permission grants.
//!
//! `vocabulary` and `encoder` turn yes/no permission attributes into the
//! 32-bit access mask; `element` compiles the `PermissionEx` element itself.

pub mod element;
pub mod encoder;
pub mod vocabulary;

pub use element::PermissionElement;
pub use encoder::{encode, EncodeError, PermissionEncoder, GENERIC_READ_ONLY};
pub use vocabulary::{ObjectKind, FILE_ALL_RIGHTS};
