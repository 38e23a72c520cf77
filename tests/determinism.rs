//! Repeated compilation gives identical output.

use proptest::prelude::*;
use setup_util_compiler::markup_types::{
    context_keys, CompilationUnit, Element, ParentContext, ParentKind, SymbolKind,
};
use setup_util_compiler::{synthesize, CompilerConfig, IdentifierPrefix, UnitCompiler};

fn variable() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,10}".prop_filter("not a built-in", |v| {
        !setup_util_compiler::search::is_builtin_variable(v)
    })
}

fn path() -> impl Strategy<Value = String> {
    "[A-Za-z]:\\\\[a-z0-9]{1,8}\\.(txt|exe|dll)"
}

fn file_search(variable: &str, path: &str, condition: Option<&str>) -> Element {
    let element = Element::new("FileSearch")
        .attr("Variable", variable)
        .attr("Path", path)
        .attr("Result", "exists");
    match condition {
        Some(condition) => element.attr("Condition", condition),
        None => element,
    }
}

fn compile_json(unit: &CompilationUnit) -> String {
    let compiled = UnitCompiler::new(CompilerConfig::default())
        .compile(unit)
        .unwrap();
    serde_json::to_string(&compiled.to_wire()).unwrap()
}

proptest! {
    #[test]
    fn compiling_twice_is_byte_identical(
        searches in prop::collection::vec((variable(), path(), prop::option::of("[a-z]{1,6}")), 1..8)
    ) {
        let unit = searches.iter().fold(CompilationUnit::new("bundle.wxs"), |unit, (v, p, c)| {
            unit.with_item(ParentContext::new(ParentKind::Bundle), file_search(v, p, c.as_deref()))
        });
        prop_assert_eq!(compile_json(&unit), compile_json(&unit));
    }

    #[test]
    fn every_field_changes_the_identifier(
        fields in prop::collection::vec("[a-z]{1,6}", 5),
        index in 0usize..5,
    ) {
        let original: Vec<Option<&str>> = fields.iter().map(|f| Some(f.as_str())).collect();
        let changed_value = format!("{}x", fields[index]);
        let mut changed = original.clone();
        changed[index] = Some(changed_value.as_str());

        let a = synthesize(IdentifierPrefix::FileSearch, &original).unwrap();
        let b = synthesize(IdentifierPrefix::FileSearch, &changed).unwrap();
        prop_assert_ne!(a, b);
    }

    #[test]
    fn permission_attribute_order_does_not_matter(
        grants in prop::sample::subsequence(
            vec!["Read", "CreateFile", "Traverse", "Delete", "Synchronize", "GenericAll", "GenericWrite"],
            1..7,
        ),
        rotation in 0usize..7,
    ) {
        let build = |names: &[&str]| {
            let element = names.iter().fold(
                Element::new("PermissionEx").attr("User", "Everyone"),
                |element, name| element.attr(*name, "yes"),
            );
            CompilationUnit::new("product.wxs")
                .declare(SymbolKind::Directory, "INSTALLDIR")
                .declare(SymbolKind::Component, "Main")
                .with_item(
                    ParentContext::new(ParentKind::CreateFolder)
                        .with_value(context_keys::DIRECTORY_ID, "INSTALLDIR")
                        .with_value(context_keys::COMPONENT_ID, "Main"),
                    element,
                )
        };

        let mut reordered = grants.clone();
        let len = reordered.len();
        reordered.rotate_left(rotation % len);
        reordered.reverse();

        prop_assert_eq!(compile_json(&build(&grants)), compile_json(&build(&reordered)));
    }
}
