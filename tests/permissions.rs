//! `PermissionEx` compilation through the full unit compiler.

use pretty_assertions::assert_eq;
use setup_util_compiler::markup_types::{
    context_keys, CompilationUnit, Element, ParentContext, ParentKind, SymbolKind,
};
use setup_util_compiler::{
    CompileError, CompiledUnit, CompilerConfig, DiagnosticCode, FieldValue, Platform, TableName,
    UnitCompiler,
};

fn folder_parent() -> ParentContext {
    ParentContext::new(ParentKind::CreateFolder)
        .with_value(context_keys::DIRECTORY_ID, "INSTALLDIR")
        .with_value(context_keys::COMPONENT_ID, "Main")
}

fn declared_unit() -> CompilationUnit {
    CompilationUnit::new("product.wxs")
        .declare(SymbolKind::Directory, "INSTALLDIR")
        .declare(SymbolKind::File, "readme")
        .declare(SymbolKind::Registry, "AcmeKey")
        .declare(SymbolKind::ServiceInstall, "AcmeSvc")
        .declare(SymbolKind::Component, "Main")
}

fn compile(config: CompilerConfig, parent: ParentContext, element: Element) -> CompiledUnit {
    let unit = declared_unit().with_item(parent, element);
    UnitCompiler::new(config).compile(&unit).unwrap()
}

fn codes(compiled: &CompiledUnit) -> Vec<DiagnosticCode> {
    compiled.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn generic_read_alone_is_rejected() {
    let compiled = compile(
        CompilerConfig::default(),
        folder_parent(),
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("GenericRead", "yes"),
    );

    assert_eq!(codes(&compiled), vec![DiagnosticCode::GenericReadNotAllowed]);
    assert!(compiled.tables.is_empty());
    assert!(compiled.references.hard.is_empty());
    assert!(compiled.references.actions.is_empty());
}

#[test]
fn generic_read_only_is_rejected_for_every_parent() {
    let parents = [
        folder_parent(),
        ParentContext::new(ParentKind::File)
            .with_value(context_keys::FILE_ID, "readme")
            .with_value(context_keys::COMPONENT_ID, "Main"),
        ParentContext::new(ParentKind::RegistryValue)
            .with_value(context_keys::REGISTRY_ID, "AcmeKey")
            .with_value(context_keys::COMPONENT_ID, "Main"),
        ParentContext::new(ParentKind::ServiceInstall)
            .with_value(context_keys::SERVICE_INSTALL_ID, "AcmeSvc")
            .with_value(context_keys::COMPONENT_ID, "Main"),
    ];
    for parent in parents {
        let compiled = compile(
            CompilerConfig::default(),
            parent,
            Element::new("PermissionEx")
                .attr("User", "Everyone")
                .attr("GenericRead", "yes")
                .attr("Delete", "no"),
        );
        assert_eq!(codes(&compiled), vec![DiagnosticCode::GenericReadNotAllowed]);
    }
}

#[test]
fn folder_grant_row_and_references() {
    let compiled = compile(
        CompilerConfig::for_platform(Platform::X64),
        folder_parent(),
        Element::new("PermissionEx")
            .attr("Domain", "CONTOSO")
            .attr("User", "Builders")
            .attr("GenericRead", "yes")
            .attr("Traverse", "yes")
            .attr("Delete", "yes"),
    );
    assert!(compiled.is_success());

    let wire = compiled.tables.to_wire();
    assert_eq!(
        wire["PermissionGrant"],
        vec![vec![
            FieldValue::Text("INSTALLDIR".into()),
            FieldValue::Text("CreateFolder".into()),
            FieldValue::Text("CONTOSO".into()),
            FieldValue::Text("Builders".into()),
            FieldValue::Integer((0x8000_0000u32 | 0x0001_0000 | 0x20) as i32),
            FieldValue::Text("Main".into()),
        ]]
    );
    assert_eq!(compiled.references.hard.len(), 2);
    assert!(compiled
        .references
        .actions
        .contains("Wix4SchedSecureObjects_X64"));
}

#[test]
fn file_all_rights_on_a_file() {
    let parent = ParentContext::new(ParentKind::File)
        .with_value(context_keys::FILE_ID, "readme")
        .with_value(context_keys::COMPONENT_ID, "Main");
    let compiled = compile(
        CompilerConfig::default(),
        parent,
        Element::new("PermissionEx")
            .attr("User", "Administrators")
            .attr("FileAllRights", "yes"),
    );

    let grant = &compiled.tables.to_wire()["PermissionGrant"][0];
    assert_eq!(grant[1], FieldValue::Text("File".into()));
    assert_eq!(grant[4], FieldValue::Integer(0x001F_01FF));
}

#[test]
fn permission_names_follow_the_object_kind() {
    let compiled = compile(
        CompilerConfig::default(),
        folder_parent(),
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("ServiceStart", "yes"),
    );
    assert_eq!(codes(&compiled), vec![DiagnosticCode::UnexpectedAttribute]);
    assert!(compiled.tables.is_empty());
}

#[test]
fn user_is_required() {
    let compiled = compile(
        CompilerConfig::default(),
        folder_parent(),
        Element::new("PermissionEx").attr("Read", "yes"),
    );
    assert_eq!(codes(&compiled), vec![DiagnosticCode::MissingRequiredAttribute]);
}

#[test]
fn undeclared_object_suppresses_the_grant() {
    let parent = ParentContext::new(ParentKind::File)
        .with_value(context_keys::FILE_ID, "ghost")
        .with_value(context_keys::COMPONENT_ID, "Main");
    let compiled = compile(
        CompilerConfig::default(),
        parent,
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("Read", "yes"),
    );
    assert_eq!(codes(&compiled), vec![DiagnosticCode::UndefinedSymbol]);
    assert!(compiled.tables.rows(TableName::PermissionGrant).is_empty());
}

#[test]
fn arm_is_unsupported() {
    let compiled = compile(
        CompilerConfig::for_platform(Platform::Arm),
        folder_parent(),
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("Read", "yes"),
    );
    assert_eq!(codes(&compiled), vec![DiagnosticCode::UnsupportedPlatform]);
    assert!(compiled.tables.is_empty());
    assert!(compiled.references.actions.is_empty());
    assert!(compiled.references.hard.is_empty());
}

#[test]
fn other_parents_are_unexpected() {
    let compiled = compile(
        CompilerConfig::default(),
        ParentContext::new(ParentKind::Component).with_value(context_keys::COMPONENT_ID, "Main"),
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("Read", "yes"),
    );
    assert_eq!(codes(&compiled), vec![DiagnosticCode::UnexpectedElement]);
}

#[test]
fn missing_parent_value_is_fatal() {
    let parent = ParentContext::new(ParentKind::CreateFolder)
        .with_value(context_keys::COMPONENT_ID, "Main");
    let unit = declared_unit().with_item(
        parent,
        Element::new("PermissionEx")
            .attr("User", "Everyone")
            .attr("Read", "yes"),
    );
    let err = UnitCompiler::new(CompilerConfig::default())
        .compile(&unit)
        .unwrap_err();
    assert!(matches!(err, CompileError::MissingParentValue { ref key, .. } if key == "DirectoryId"));
}
