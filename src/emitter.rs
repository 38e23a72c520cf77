//! Row and reference emission.
//!
//! Element compilers validate first, including hard references and platform
//! support, and only write rows and record references when the node raised
//! no errors.

use markup_types::{SourceLocation, SymbolKind};
use tracing::{debug, warn};

use crate::config::CompilerConfig;
use crate::diagnostics::{self, Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::error::CompileError;
use crate::graph::DependencyGraph;
use crate::identifier::Identifier;
use crate::references::{DeclaredSymbols, HardReference, NativeAction, ReferenceSet, SoftReference};
use crate::rows::{OutputTables, Row, SearchRelationRow};
use crate::search::ValidatedSearch;

/// Output tables and references of one compiled unit.
#[derive(Debug, Default)]
pub struct Emitter {
    tables: OutputTables,
    references: ReferenceSet,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one row. Identical rows are written once; a different row
    /// reusing an identifier is kept for the linker to report.
    pub fn write(&mut self, row: Row) {
        let table = row.table();
        let collides = row
            .primary_key()
            .is_some_and(|key| self.tables.has_key(table, key));
        let key = row.primary_key().map(str::to_string);

        if !self.tables.insert(row) {
            debug!(table = %table, "identical row skipped");
        } else if collides {
            warn!(
                table = %table,
                id = key.as_deref().unwrap_or_default(),
                "identifier reused by a different row"
            );
        }
    }

    /// Check a hard reference against the unit's declared symbols.
    ///
    /// Reports `UndefinedSymbol` and returns `None` when it is missing.
    /// Nothing is recorded; pass the result to [`Emitter::record_hard`] once
    /// the node's rows are written.
    pub fn require(
        kind: SymbolKind,
        id: &str,
        declared: &DeclaredSymbols,
        location: &SourceLocation,
        sink: &mut DiagnosticSink,
    ) -> Option<HardReference> {
        if !declared.contains(kind, id) {
            sink.push(diagnostics::undefined_symbol(kind.as_str(), id, location));
            return None;
        }
        Some(HardReference {
            kind,
            id: id.to_string(),
        })
    }

    pub fn record_hard(&mut self, reference: HardReference) {
        self.references.add_hard(reference);
    }

    pub fn soft(&mut self, reference: SoftReference) {
        self.references.add_soft(reference);
    }

    /// Resolve the configured platform's variant of a native action.
    ///
    /// Reports `UnsupportedPlatform` and returns `None` when the action is
    /// not built for that platform. Record the name with
    /// [`Emitter::record_action`].
    pub fn action(
        action: &NativeAction,
        config: &CompilerConfig,
        element: &str,
        location: &SourceLocation,
        sink: &mut DiagnosticSink,
    ) -> Option<String> {
        if !action.platforms.supports(config.platform) {
            sink.push(
                Diagnostic::error(
                    DiagnosticCode::UnsupportedPlatform,
                    format!(
                        "The {} element is not supported when building for the {} platform.",
                        element, config.platform
                    ),
                )
                .at(location),
            );
            return None;
        }
        Some(action.qualified_name(&config.action_prefix, config.platform))
    }

    pub fn record_action(&mut self, name: String) {
        self.references.add_action(name);
    }

    /// Emit a validated search: its `Search` row, its kind row and, when it
    /// runs after another search, the ordering edge.
    pub fn search(
        &mut self,
        node: ValidatedSearch,
        graph: &mut DependencyGraph,
    ) -> Result<Identifier, CompileError> {
        let ValidatedSearch {
            search,
            detail,
            after,
        } = node;
        let id = search.id.clone();

        graph.register_node(&id);
        self.write(Row::Search(search));
        self.write(detail);

        if let Some(parent) = after {
            let edge = graph.link(&id, &parent, &mut self.references)?;
            self.write(Row::SearchRelation(SearchRelationRow {
                child_id: edge.child_id,
                parent_id: edge.parent_id,
                strength: edge.strength,
            }));
        }

        debug!(id = %id, "search emitted");
        Ok(id)
    }

    pub fn tables(&self) -> &OutputTables {
        &self.tables
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    pub fn into_parts(self) -> (OutputTables, ReferenceSet) {
        (self.tables, self.references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;
    use crate::references::SCHED_SECURE_OBJECTS;
    use crate::rows::{FileSearchRow, SearchRow, TableName};
    use crate::search::flags::FileSearchAttributes;
    use markup_types::DeclaredSymbol;

    fn node(id: &str, after: Option<&str>) -> ValidatedSearch {
        ValidatedSearch {
            search: SearchRow {
                id: Identifier::explicit(id),
                variable: "HASFOO".into(),
                condition: None,
            },
            detail: Row::FileSearch(FileSearchRow {
                id: Identifier::explicit(id),
                path: "C:\\foo.txt".into(),
                attributes: FileSearchAttributes::DEFAULT,
            }),
            after: after.map(Identifier::explicit),
        }
    }

    #[test]
    fn search_with_after_writes_one_relation() {
        let mut emitter = Emitter::new();
        let mut graph = DependencyGraph::new();

        emitter.search(node("Child", Some("Parent")), &mut graph).unwrap();

        let tables = emitter.tables();
        assert_eq!(tables.rows(TableName::Search).len(), 1);
        assert_eq!(tables.rows(TableName::FileSearch).len(), 1);
        assert_eq!(tables.rows(TableName::SearchRelation).len(), 1);
        assert!(emitter.references().contains_soft(TableName::Search, "Parent"));
    }

    #[test]
    fn emitting_the_same_search_twice_is_idempotent() {
        let mut emitter = Emitter::new();
        let mut graph = DependencyGraph::new();

        emitter.search(node("Same", Some("P")), &mut graph).unwrap();
        emitter.search(node("Same", Some("P")), &mut graph).unwrap();

        assert_eq!(emitter.tables().len(), 3);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn hard_references_are_checked_then_recorded() {
        let mut emitter = Emitter::new();
        let mut sink = DiagnosticSink::default();
        let declared = DeclaredSymbols::new([DeclaredSymbol::new(SymbolKind::Component, "Main")]);
        let loc = SourceLocation::default();

        let main = Emitter::require(SymbolKind::Component, "Main", &declared, &loc, &mut sink);
        let missing = Emitter::require(SymbolKind::File, "missing", &declared, &loc, &mut sink);
        assert!(missing.is_none());
        assert!(emitter.references().is_empty());

        emitter.record_hard(main.unwrap());
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UndefinedSymbol);
        assert_eq!(emitter.references().hard.len(), 1);
    }

    #[test]
    fn actions_respect_platform_support() {
        let mut sink = DiagnosticSink::default();
        let loc = SourceLocation::default();

        let x64 = CompilerConfig::for_platform(Platform::X64);
        assert_eq!(
            Emitter::action(&SCHED_SECURE_OBJECTS, &x64, "PermissionEx", &loc, &mut sink)
                .as_deref(),
            Some("Wix4SchedSecureObjects_X64")
        );

        let arm = CompilerConfig::for_platform(Platform::Arm);
        assert!(Emitter::action(&SCHED_SECURE_OBJECTS, &arm, "PermissionEx", &loc, &mut sink)
            .is_none());
        assert_eq!(sink.into_vec()[0].code, DiagnosticCode::UnsupportedPlatform);
    }
}
