//! Markup Types - Foundation Types for the Utility Compiler
//!
//! This crate contains the pure data structures a host hands to the compiler:
//! a markup tree that has already been split into elements and attributes,
//! each carrying its source position, plus the context of the enclosing
//! (non-extension) element and the symbols the host already knows about.
//!
//! ## Contents
//!
//! - Source location tracking
//! - Elements and attributes
//! - Parent context (kind of the enclosing element and its key values)
//! - Declared symbols (targets for hard references)
//! - Compilation units
//!
//! ## Rules
//!
//! 1. **NO COMPILER LOGIC** - Only data structures, constructors and accessors
//! 2. **NO WORKSPACE DEPENDENCIES** - The compiler depends on this crate, never the reverse
//! 3. **SERIALIZABLE** - All types support serde so hosts can ship units as YAML/JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SOURCE LOCATION AND POSITIONING
// ============================================================================

/// Source location in a markup document for error reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename or identifier for the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            source_name: None,
        }
    }

    /// Create a source location with source name
    pub fn with_source(line: usize, column: usize, source_name: impl Into<String>) -> Self {
        Self {
            line,
            column,
            source_name: Some(source_name.into()),
        }
    }

    /// Get a human-readable description of the location
    pub fn description(&self) -> String {
        match &self.source_name {
            Some(name) => format!("{}:{}:{}", name, self.line, self.column),
            None => format!("{}:{}", self.line, self.column),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// ELEMENTS AND ATTRIBUTES
// ============================================================================

/// A single attribute on a markup element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub location: SourceLocation,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location: SourceLocation::default(),
        }
    }
}

/// A markup element with its attributes and nested elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Local name of the element (namespace already stripped by the host)
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<Element>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Set the element location; attributes added later inherit it
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Add an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut attribute = Attribute::new(name, value);
        attribute.location = self.location.clone();
        self.attributes.push(attribute);
        self
    }

    /// Add a nested element
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Find an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

// ============================================================================
// PARENT CONTEXT
// ============================================================================

/// Kind of the element enclosing an extension element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentKind {
    Bundle,
    Fragment,
    Component,
    CreateFolder,
    File,
    Registry,
    RegistryValue,
    ServiceInstall,
    /// Any other host element, by name
    Other(String),
}

impl ParentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ParentKind::Bundle => "Bundle",
            ParentKind::Fragment => "Fragment",
            ParentKind::Component => "Component",
            ParentKind::CreateFolder => "CreateFolder",
            ParentKind::File => "File",
            ParentKind::Registry => "Registry",
            ParentKind::RegistryValue => "RegistryValue",
            ParentKind::ServiceInstall => "ServiceInstall",
            ParentKind::Other(name) => name,
        }
    }
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known parent context keys
pub mod context_keys {
    pub const COMPONENT_ID: &str = "ComponentId";
    pub const DIRECTORY_ID: &str = "DirectoryId";
    pub const FILE_ID: &str = "FileId";
    pub const REGISTRY_ID: &str = "RegistryId";
    pub const SERVICE_INSTALL_ID: &str = "ServiceInstallId";
}

/// The enclosing element of an extension element, as seen by the host walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentContext {
    pub kind: ParentKind,
    /// Key values of the parent (component id, file id, ...)
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl ParentContext {
    pub fn new(kind: ParentKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

// ============================================================================
// DECLARED SYMBOLS
// ============================================================================

/// Kinds of entities owned by sibling subsystems that extension rows point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Component,
    Directory,
    File,
    Registry,
    ServiceInstall,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Component => "Component",
            SymbolKind::Directory => "Directory",
            SymbolKind::File => "File",
            SymbolKind::Registry => "Registry",
            SymbolKind::ServiceInstall => "ServiceInstall",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity the host has already declared in the compiled unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclaredSymbol {
    pub kind: SymbolKind,
    pub id: String,
}

impl DeclaredSymbol {
    pub fn new(kind: SymbolKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

// ============================================================================
// COMPILATION UNIT
// ============================================================================

/// One extension element occurrence together with its enclosing context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitItem {
    pub parent: ParentContext,
    pub element: Element,
}

/// One markup document, as handed to a single compiler pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub name: String,
    #[serde(default)]
    pub items: Vec<UnitItem>,
    #[serde(default)]
    pub declared: Vec<DeclaredSymbol>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            declared: Vec::new(),
        }
    }

    pub fn with_item(mut self, parent: ParentContext, element: Element) -> Self {
        self.items.push(UnitItem { parent, element });
        self
    }

    pub fn declare(mut self, kind: SymbolKind, id: impl Into<String>) -> Self {
        self.declared.push(DeclaredSymbol::new(kind, id));
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
