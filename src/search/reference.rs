//! `*SearchRef`: pull a search defined elsewhere into the bundle.

use markup_types::{Element, ParentKind};

use crate::attributes;
use crate::diagnostics;
use crate::elements::{ElementCompiler, Parent, UnitContext};
use crate::error::CompileError;
use crate::references::SoftReference;
use crate::rows::TableName;

/// Compiles one of the search reference elements.
#[derive(Debug, Clone, Copy)]
pub struct SearchRefElement {
    name: &'static str,
}

impl SearchRefElement {
    pub const NAMES: &'static [&'static str] = &[
        "ComponentSearchRef",
        "DirectorySearchRef",
        "FileSearchRef",
        "ProductSearchRef",
        "RegistrySearchRef",
    ];

    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ElementCompiler for SearchRefElement {
    fn compile(
        &self,
        element: &Element,
        parent: &Parent<'_>,
        cx: &mut UnitContext<'_>,
    ) -> Result<(), CompileError> {
        if !matches!(
            parent.host_kind(),
            Some(ParentKind::Bundle | ParentKind::Fragment)
        ) {
            cx.diagnostics.push(diagnostics::unexpected_element(
                parent.name(),
                &element.name,
                &element.location,
            ));
            return Ok(());
        }

        let mark = cx.diagnostics.error_count();
        let mut id = None;
        for attr in &element.attributes {
            match attr.name.as_str() {
                "Id" => id = attributes::identifier(self.name, attr, &mut cx.diagnostics),
                _ => cx.diagnostics.push(diagnostics::unexpected_attribute(
                    self.name,
                    &attr.name,
                    &attr.location,
                )),
            }
        }
        if element.attribute("Id").is_none() {
            cx.diagnostics
                .push(diagnostics::missing_attribute(self.name, "Id", &element.location));
        }
        for child in &element.children {
            cx.diagnostics.push(diagnostics::unexpected_element(
                self.name,
                &child.name,
                &child.location,
            ));
        }

        if let (Some(id), true) = (id, cx.diagnostics.error_count() == mark) {
            cx.emitter.soft(SoftReference::new(TableName::Search, id));
        }
        Ok(())
    }
}
