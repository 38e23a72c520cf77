//! The sample unit shipped in `demos/` compiles cleanly.

use pretty_assertions::assert_eq;
use setup_util_compiler::markup_types::CompilationUnit;
use setup_util_compiler::{CompilerConfig, Platform, TableName, UnitCompiler};

const DEMO: &str = include_str!("../demos/bundle.yaml");

#[test]
fn demo_unit_compiles() {
    let unit: CompilationUnit = serde_yaml::from_str(DEMO).unwrap();
    let compiled = UnitCompiler::new(CompilerConfig::for_platform(Platform::Arm64))
        .compile(&unit)
        .unwrap();

    assert!(compiled.is_success(), "{:?}", compiled.diagnostics);
    assert_eq!(compiled.tables.rows(TableName::Search).len(), 3);
    assert_eq!(compiled.tables.rows(TableName::SearchRelation).len(), 2);
    assert_eq!(compiled.tables.rows(TableName::PermissionGrant).len(), 1);
    assert!(compiled
        .references
        .actions
        .contains("Wix4SchedSecureObjects_A64"));
}
