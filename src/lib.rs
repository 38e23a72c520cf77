//! setup-util-compiler: utility element compiler for installation packages
//!
//! Translates the utility markup vocabulary into rows for the linking engine:
//! - Searches (component, directory, file, product, registry) and search
//!   references, with content-addressed identifiers and ordering edges
//! - `PermissionEx` grants encoded as 32-bit access masks
//! - `EventSource` registrations written as registry rows
//!
//! The host walks the markup and hands each extension element over together
//! with its parent context (see the `markup_types` crate). Resolving soft
//! references and ordering the search graph are left to the linking phase.

pub mod attributes;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod elements;
pub mod emitter;
pub mod error;
pub mod event_source;
pub mod graph;
pub mod identifier;
pub mod permission;
pub mod references;
pub mod rows;
pub mod search;

// Re-export commonly used types
pub use compiler::{CompiledUnit, UnitCompiler, WireUnit};
pub use config::{CompilerConfig, Platform};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSink, Severity};
pub use elements::{ElementCompiler, ElementRegistry, Parent, UnitContext};
pub use error::CompileError;
pub use graph::{DependencyGraph, RelationStrength, SearchEdge};
pub use identifier::{synthesize, Identifier, IdentifierPrefix};
pub use permission::{encode, EncodeError, ObjectKind, PermissionEncoder};
pub use references::{HardReference, ReferenceSet, SoftReference};
pub use rows::{FieldValue, OutputTables, RegistryRoot, Row, TableName};

pub use markup_types;
