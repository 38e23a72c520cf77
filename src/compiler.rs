//! Unit compiler.
//!
//! [`UnitCompiler`] owns the configuration and the element registry and is
//! never mutated after construction, so one instance can compile many units,
//! from many threads. Each call to [`UnitCompiler::compile`] gets fresh
//! state.

use markup_types::CompilationUnit;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostic;
use crate::elements::{ElementRegistry, Parent, UnitContext};
use crate::error::CompileError;
use crate::graph::SearchEdge;
use crate::references::{DeclaredSymbols, ReferenceSet};
use crate::rows::{FieldValue, OutputTables};

/// Compiles units with a fixed configuration and element registry.
#[derive(Debug)]
pub struct UnitCompiler {
    config: CompilerConfig,
    registry: ElementRegistry,
}

impl UnitCompiler {
    /// Compiler for the full utility vocabulary.
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_registry(config, ElementRegistry::with_util_elements())
    }

    pub fn with_registry(config: CompilerConfig, registry: ElementRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Compile one unit.
    ///
    /// Authoring mistakes come back as diagnostics on the [`CompiledUnit`];
    /// `Err` means the tree itself was malformed.
    pub fn compile(&self, unit: &CompilationUnit) -> Result<CompiledUnit, CompileError> {
        let declared = DeclaredSymbols::new(unit.declared.iter().cloned());
        let mut cx = UnitContext::new(&self.config, &self.registry, declared);

        for item in &unit.items {
            cx.dispatch(&item.element, &Parent::Host(&item.parent))?;
        }

        let UnitContext {
            diagnostics,
            emitter,
            graph,
            ..
        } = cx;
        let (tables, references) = emitter.into_parts();
        let compiled = CompiledUnit {
            name: unit.name.clone(),
            tables,
            references,
            edges: graph.edges().to_vec(),
            diagnostics: diagnostics.into_vec(),
        };

        info!(
            unit = %unit.name,
            rows = compiled.tables.len(),
            errors = compiled.error_count(),
            warnings = compiled.warnings().count(),
            "compiled unit"
        );
        Ok(compiled)
    }
}

/// Result of compiling one unit.
#[derive(Debug, Serialize)]
pub struct CompiledUnit {
    pub name: String,
    pub tables: OutputTables,
    pub references: ReferenceSet,
    pub edges: Vec<SearchEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledUnit {
    /// No error diagnostics: every row is final.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Wire view of the unit for the linking engine.
    pub fn to_wire(&self) -> WireUnit<'_> {
        WireUnit {
            name: &self.name,
            tables: self.tables.to_wire(),
            references: &self.references,
            diagnostics: &self.diagnostics,
        }
    }
}

/// Serialized form of a compiled unit: rows as positional field lists.
#[derive(Debug, Serialize)]
pub struct WireUnit<'a> {
    pub name: &'a str,
    pub tables: BTreeMap<&'static str, Vec<Vec<FieldValue>>>,
    pub references: &'a ReferenceSet,
    pub diagnostics: &'a [Diagnostic],
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_types::{Element, ParentContext, ParentKind};

    fn bundle() -> ParentContext {
        ParentContext::new(ParentKind::Bundle)
    }

    #[test]
    fn empty_unit_compiles_cleanly() {
        let compiler = UnitCompiler::new(CompilerConfig::default());
        let compiled = compiler.compile(&CompilationUnit::new("empty.wxs")).unwrap();
        assert!(compiled.is_success());
        assert!(compiled.tables.is_empty());
        assert!(compiled.references.is_empty());
    }

    #[test]
    fn diagnostics_do_not_stop_later_items() {
        let unit = CompilationUnit::new("a.wxs")
            .with_item(bundle(), Element::new("FileSearch").attr("Path", "C:\\a"))
            .with_item(
                bundle(),
                Element::new("FileSearch")
                    .attr("Variable", "B")
                    .attr("Path", "C:\\b"),
            );
        let compiled = UnitCompiler::new(CompilerConfig::default())
            .compile(&unit)
            .unwrap();

        assert_eq!(compiled.error_count(), 1);
        assert!(!compiled.is_success());
        assert_eq!(compiled.tables.len(), 2);
    }

    #[test]
    fn duplicate_attribute_aborts_the_unit() {
        let unit = CompilationUnit::new("a.wxs").with_item(
            bundle(),
            Element::new("FileSearch").attr("Path", "a").attr("Path", "b"),
        );
        let err = UnitCompiler::new(CompilerConfig::default())
            .compile(&unit)
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateAttribute { .. }));
    }

    #[test]
    fn wire_view_serializes() {
        let unit = CompilationUnit::new("a.wxs").with_item(
            bundle(),
            Element::new("FileSearch")
                .attr("Variable", "HASFOO")
                .attr("Path", "C:\\foo.txt"),
        );
        let compiled = UnitCompiler::new(CompilerConfig::default())
            .compile(&unit)
            .unwrap();
        let json = serde_json::to_value(compiled.to_wire()).unwrap();
        assert_eq!(json["tables"]["Search"][0][1], "HASFOO");
        assert_eq!(json["tables"]["FileSearch"][0][2], 1);
    }

    #[test]
    fn compiler_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UnitCompiler>();
    }
}
