//! `PermissionEx`: grant a user rights on the enclosing folder, file,
//! registry key or service.

use markup_types::{context_keys, Element, ParentKind, SymbolKind};
use tracing::debug;

use super::encoder::PermissionEncoder;
use super::vocabulary::ObjectKind;
use crate::attributes;
use crate::diagnostics::{self, Diagnostic, DiagnosticCode};
use crate::elements::{parent_value, ElementCompiler, Parent, UnitContext};
use crate::emitter::Emitter;
use crate::error::CompileError;
use crate::references::SCHED_SECURE_OBJECTS;
use crate::rows::{PermissionGrantRow, Row};

const ELEMENT: &str = "PermissionEx";

/// Where the secured object comes from for each legal parent.
struct Target {
    kind: ObjectKind,
    context_key: &'static str,
    symbol: SymbolKind,
}

fn target_for(parent: &ParentKind) -> Option<Target> {
    let (kind, context_key, symbol) = match parent {
        ParentKind::CreateFolder => (
            ObjectKind::Folder,
            context_keys::DIRECTORY_ID,
            SymbolKind::Directory,
        ),
        ParentKind::File => (ObjectKind::File, context_keys::FILE_ID, SymbolKind::File),
        ParentKind::Registry | ParentKind::RegistryValue => (
            ObjectKind::Registry,
            context_keys::REGISTRY_ID,
            SymbolKind::Registry,
        ),
        ParentKind::ServiceInstall => (
            ObjectKind::Service,
            context_keys::SERVICE_INSTALL_ID,
            SymbolKind::ServiceInstall,
        ),
        _ => return None,
    };
    Some(Target {
        kind,
        context_key,
        symbol,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionElement;

impl ElementCompiler for PermissionElement {
    fn compile(
        &self,
        element: &Element,
        parent: &Parent<'_>,
        cx: &mut UnitContext<'_>,
    ) -> Result<(), CompileError> {
        let (host, target) = match parent {
            Parent::Host(host) => match target_for(&host.kind) {
                Some(target) => (*host, target),
                None => {
                    cx.diagnostics.push(diagnostics::unexpected_element(
                        parent.name(),
                        &element.name,
                        &element.location,
                    ));
                    return Ok(());
                }
            },
            Parent::Search { .. } => {
                cx.diagnostics.push(diagnostics::unexpected_element(
                    parent.name(),
                    &element.name,
                    &element.location,
                ));
                return Ok(());
            }
        };

        let object_id = parent_value(host, target.context_key, element)?;
        let component_id = parent_value(host, context_keys::COMPONENT_ID, element)?;

        let mark = cx.diagnostics.error_count();
        let mut domain = None;
        let mut user = None;
        let mut encoder = PermissionEncoder::new(target.kind);

        for attr in &element.attributes {
            match attr.name.as_str() {
                "Domain" => domain = attributes::string(ELEMENT, attr, &mut cx.diagnostics),
                "User" => user = attributes::string(ELEMENT, attr, &mut cx.diagnostics),
                name if encoder.accepts(name) => {
                    if let Some(granted) = attributes::yes_no(ELEMENT, attr, &mut cx.diagnostics) {
                        encoder.apply(name, granted);
                    }
                }
                name => cx.diagnostics.push(diagnostics::unexpected_attribute(
                    ELEMENT,
                    name,
                    &attr.location,
                )),
            }
        }

        if element.attribute("User").is_none() {
            cx.diagnostics
                .push(diagnostics::missing_attribute(ELEMENT, "User", &element.location));
        }
        for child in &element.children {
            cx.diagnostics.push(diagnostics::unexpected_element(
                ELEMENT,
                &child.name,
                &child.location,
            ));
        }

        let permission = encoder.finish();
        if permission.is_none() {
            cx.diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::GenericReadNotAllowed,
                    format!(
                        "The {} element grants only GenericRead on {} '{}', which allows no access. Grant Read or additional rights instead.",
                        ELEMENT,
                        target.kind.table(),
                        object_id
                    ),
                )
                .at(&element.location),
            );
        }

        let object = Emitter::require(
            target.symbol,
            object_id,
            &cx.declared,
            &element.location,
            &mut cx.diagnostics,
        );
        let component = Emitter::require(
            SymbolKind::Component,
            component_id,
            &cx.declared,
            &element.location,
            &mut cx.diagnostics,
        );
        let action = Emitter::action(
            &SCHED_SECURE_OBJECTS,
            cx.config,
            ELEMENT,
            &element.location,
            &mut cx.diagnostics,
        );

        if cx.diagnostics.error_count() != mark {
            debug!(object = object_id, "permission grant suppressed by errors");
            return Ok(());
        }
        let (Some(user), Some(permission), Some(object), Some(component), Some(action)) =
            (user, permission, object, component, action)
        else {
            return Ok(());
        };

        cx.emitter.write(Row::PermissionGrant(PermissionGrantRow {
            object_id: object_id.to_string(),
            object_table: target.kind.table().to_string(),
            domain,
            user,
            permission,
            component_id: component_id.to_string(),
        }));
        cx.emitter.record_hard(object);
        cx.emitter.record_hard(component);
        cx.emitter.record_action(action);
        Ok(())
    }
}
