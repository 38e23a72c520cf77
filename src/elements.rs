//! Element dispatch.
//!
//! Every extension element kind implements [`ElementCompiler`] and is looked
//! up by name in an [`ElementRegistry`]. The registry is built once and only
//! read afterwards; all per-unit state lives in [`UnitContext`].

use std::collections::HashMap;
use std::sync::Arc;

use markup_types::{Element, ParentContext, ParentKind};
use tracing::debug;

use crate::attributes::check_structure;
use crate::config::CompilerConfig;
use crate::diagnostics::{self, DiagnosticSink};
use crate::emitter::Emitter;
use crate::error::CompileError;
use crate::event_source::EventSourceElement;
use crate::graph::DependencyGraph;
use crate::identifier::Identifier;
use crate::permission::PermissionElement;
use crate::references::DeclaredSymbols;
use crate::search::{
    component::ComponentSearch, directory::DirectorySearch, file::FileSearch,
    product::ProductSearch, reference::SearchRefElement, registry::RegistrySearch,
    SearchElement,
};

/// What encloses the element being compiled.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'p> {
    /// A host element, with the values the host walk collected for it.
    Host(&'p ParentContext),
    /// Another search element. `id` is `None` when that search did not
    /// validate.
    Search {
        element: &'p str,
        id: Option<&'p Identifier>,
    },
}

impl Parent<'_> {
    /// Element name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Parent::Host(context) => context.kind.as_str(),
            Parent::Search { element, .. } => element,
        }
    }

    /// Host kind, if the parent is a host element.
    pub fn host_kind(&self) -> Option<&ParentKind> {
        match self {
            Parent::Host(context) => Some(&context.kind),
            Parent::Search { .. } => None,
        }
    }
}

/// Compiles one markup element into zero or more rows.
pub trait ElementCompiler: Send + Sync {
    /// Validate `element` and emit its rows into `cx`.
    ///
    /// Authoring mistakes are pushed to `cx.diagnostics`; an `Err` aborts the
    /// whole unit.
    fn compile(
        &self,
        element: &Element,
        parent: &Parent<'_>,
        cx: &mut UnitContext<'_>,
    ) -> Result<(), CompileError>;
}

/// Element compilers keyed by element name.
pub struct ElementRegistry {
    compilers: HashMap<String, Arc<dyn ElementCompiler>>,
}

impl ElementRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            compilers: HashMap::new(),
        }
    }

    /// Registry with every element of the utility vocabulary.
    pub fn with_util_elements() -> Self {
        let mut registry = Self::new();
        registry.register("ComponentSearch", Arc::new(SearchElement(ComponentSearch)));
        registry.register("DirectorySearch", Arc::new(SearchElement(DirectorySearch)));
        registry.register("FileSearch", Arc::new(SearchElement(FileSearch)));
        registry.register("ProductSearch", Arc::new(SearchElement(ProductSearch)));
        registry.register("RegistrySearch", Arc::new(SearchElement(RegistrySearch)));
        for &name in SearchRefElement::NAMES {
            registry.register(name, Arc::new(SearchRefElement::new(name)));
        }
        registry.register("PermissionEx", Arc::new(PermissionElement));
        registry.register("EventSource", Arc::new(EventSourceElement));
        registry
    }

    /// Register a compiler, replacing any earlier one for the same name.
    pub fn register(&mut self, name: &str, compiler: Arc<dyn ElementCompiler>) {
        self.compilers.insert(name.to_string(), compiler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ElementCompiler>> {
        self.compilers.get(name)
    }

    /// Registered element names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.compilers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::with_util_elements()
    }
}

impl std::fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("elements", &self.names())
            .finish()
    }
}

/// Mutable state of one unit being compiled.
pub struct UnitContext<'a> {
    pub config: &'a CompilerConfig,
    registry: &'a ElementRegistry,
    pub diagnostics: DiagnosticSink,
    pub emitter: Emitter,
    pub graph: DependencyGraph,
    pub declared: DeclaredSymbols,
}

impl<'a> UnitContext<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        registry: &'a ElementRegistry,
        declared: DeclaredSymbols,
    ) -> Self {
        Self {
            config,
            registry,
            diagnostics: DiagnosticSink::new(config.warnings_as_errors),
            emitter: Emitter::new(),
            graph: DependencyGraph::new(),
            declared,
        }
    }

    /// Compile one element with the compiler registered for its name.
    pub fn dispatch(&mut self, element: &Element, parent: &Parent<'_>) -> Result<(), CompileError> {
        check_structure(element)?;

        let registry = self.registry;
        match registry.get(&element.name) {
            Some(compiler) => {
                debug!(element = %element.name, parent = parent.name(), "dispatch");
                compiler.compile(element, parent, self)
            }
            None => {
                self.diagnostics.push(diagnostics::unexpected_element(
                    parent.name(),
                    &element.name,
                    &element.location,
                ));
                Ok(())
            }
        }
    }
}

/// Look up a value the host walk must have supplied for the parent.
pub fn parent_value<'p>(
    parent: &'p ParentContext,
    key: &str,
    element: &Element,
) -> Result<&'p str, CompileError> {
    parent
        .value(key)
        .ok_or_else(|| CompileError::MissingParentValue {
            element: element.name.clone(),
            parent: parent.kind.to_string(),
            key: key.to_string(),
            location: element.location.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use markup_types::SourceLocation;

    #[test]
    fn registry_knows_the_util_vocabulary() {
        let registry = ElementRegistry::default();
        for name in [
            "ComponentSearch",
            "DirectorySearch",
            "FileSearch",
            "ProductSearch",
            "RegistrySearch",
            "FileSearchRef",
            "PermissionEx",
            "EventSource",
        ] {
            assert!(registry.get(name).is_some(), "{name}");
        }
        assert!(registry.get("ServiceConfig").is_none());
    }

    #[test]
    fn unknown_elements_are_diagnosed() {
        let config = CompilerConfig::default();
        let registry = ElementRegistry::default();
        let mut cx = UnitContext::new(&config, &registry, DeclaredSymbols::default());
        let bundle = ParentContext::new(ParentKind::Bundle);

        let element = Element::new("XmlFile").at(SourceLocation::new(7, 3));
        cx.dispatch(&element, &Parent::Host(&bundle)).unwrap();

        let diags = cx.diagnostics.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UnexpectedElement);
        assert!(diags[0].message.contains("Bundle"));
    }

    #[test]
    fn malformed_elements_abort() {
        let config = CompilerConfig::default();
        let registry = ElementRegistry::default();
        let mut cx = UnitContext::new(&config, &registry, DeclaredSymbols::default());
        let bundle = ParentContext::new(ParentKind::Bundle);

        let err = cx
            .dispatch(&Element::new(""), &Parent::Host(&bundle))
            .unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn missing_parent_values_are_fatal() {
        let parent = ParentContext::new(ParentKind::File);
        let element = Element::new("PermissionEx");
        let err = parent_value(&parent, "FileId", &element).unwrap_err();
        assert!(matches!(err, CompileError::MissingParentValue { .. }));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ElementRegistry>();
    }
}
