//! `EventSource`: register an event log source for a component.
//!
//! Everything lands in the `Registry` table under
//! `HKLM\SYSTEM\CurrentControlSet\Services\EventLog\<Log>\<Name>`. Values use
//! the engine's typed prefixes: `#%` for an expandable string, `#` for a
//! number.

use markup_types::{context_keys, Element, ParentKind, SymbolKind};
use tracing::debug;

use crate::attributes;
use crate::diagnostics;
use crate::elements::{parent_value, ElementCompiler, Parent, UnitContext};
use crate::emitter::Emitter;
use crate::error::CompileError;
use crate::identifier::{synthesize, IdentifierPrefix};
use crate::rows::{RegistryRoot, RegistryRow, Row};

const ELEMENT: &str = "EventSource";

const EVENT_LOG_KEY: &str = r"SYSTEM\CurrentControlSet\Services\EventLog";

/// `Supports*` attributes and their `TypesSupported` bits.
const SUPPORTED_TYPES: &[(&str, u32)] = &[
    ("SupportsErrors", 0x01),
    ("SupportsWarnings", 0x02),
    ("SupportsInformation", 0x04),
    ("SupportsAuditSuccess", 0x08),
    ("SupportsAuditFailure", 0x10),
];

#[derive(Debug, Default)]
struct EventSourceFields {
    name: Option<String>,
    log: Option<String>,
    event_message_file: Option<String>,
    category_message_file: Option<String>,
    category_count: Option<u32>,
    parameter_message_file: Option<String>,
    types_supported: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventSourceElement;

impl ElementCompiler for EventSourceElement {
    fn compile(
        &self,
        element: &Element,
        parent: &Parent<'_>,
        cx: &mut UnitContext<'_>,
    ) -> Result<(), CompileError> {
        let host = match parent {
            Parent::Host(host) if host.kind == ParentKind::Component => *host,
            _ => {
                cx.diagnostics.push(diagnostics::unexpected_element(
                    parent.name(),
                    &element.name,
                    &element.location,
                ));
                return Ok(());
            }
        };
        let component_id = parent_value(host, context_keys::COMPONENT_ID, element)?;

        let mark = cx.diagnostics.error_count();
        let mut fields = EventSourceFields::default();
        let sink = &mut cx.diagnostics;

        for attr in &element.attributes {
            match attr.name.as_str() {
                "Name" => fields.name = attributes::string(ELEMENT, attr, sink),
                "Log" => fields.log = attributes::string(ELEMENT, attr, sink),
                "EventMessageFile" => {
                    fields.event_message_file = attributes::string(ELEMENT, attr, sink)
                }
                "CategoryMessageFile" => {
                    fields.category_message_file = attributes::string(ELEMENT, attr, sink)
                }
                "CategoryCount" => fields.category_count = attributes::integer(ELEMENT, attr, sink),
                "ParameterMessageFile" => {
                    fields.parameter_message_file = attributes::string(ELEMENT, attr, sink)
                }
                name => match SUPPORTED_TYPES.iter().find(|(n, _)| *n == name) {
                    Some((_, bit)) => {
                        if attributes::yes_no(ELEMENT, attr, sink) == Some(true) {
                            fields.types_supported |= bit;
                        }
                    }
                    None => sink.push(diagnostics::unexpected_attribute(
                        ELEMENT,
                        name,
                        &attr.location,
                    )),
                },
            }
        }

        for required in ["Name", "Log", "EventMessageFile"] {
            if element.attribute(required).is_none() {
                sink.push(diagnostics::missing_attribute(
                    ELEMENT,
                    required,
                    &element.location,
                ));
            }
        }
        // Category file and count only make sense together.
        for (present, missing) in [
            ("CategoryMessageFile", "CategoryCount"),
            ("CategoryCount", "CategoryMessageFile"),
        ] {
            if element.attribute(present).is_some() && element.attribute(missing).is_none() {
                sink.push(diagnostics::missing_attribute(
                    ELEMENT,
                    missing,
                    &element.location,
                ));
            }
        }
        for child in &element.children {
            sink.push(diagnostics::unexpected_element(
                ELEMENT,
                &child.name,
                &child.location,
            ));
        }

        let component = Emitter::require(
            SymbolKind::Component,
            component_id,
            &cx.declared,
            &element.location,
            &mut cx.diagnostics,
        );

        if cx.diagnostics.error_count() != mark {
            debug!(component = component_id, "event source suppressed by errors");
            return Ok(());
        }
        let (Some(name), Some(log), Some(message_file), Some(component)) =
            (fields.name, fields.log, fields.event_message_file, component)
        else {
            return Ok(());
        };

        let key = format!(r"{}\{}\{}", EVENT_LOG_KEY, log, name);
        let mut values = vec![("EventMessageFile", format!("#%{}", message_file))];
        if let (Some(file), Some(count)) = (fields.category_message_file, fields.category_count) {
            values.push(("CategoryMessageFile", format!("#%{}", file)));
            values.push(("CategoryCount", format!("#{}", count)));
        }
        if let Some(file) = fields.parameter_message_file {
            values.push(("ParameterMessageFile", format!("#%{}", file)));
        }
        if fields.types_supported != 0 {
            values.push(("TypesSupported", format!("#{}", fields.types_supported)));
        }

        for (value_name, value) in values {
            let row = registry_row(component_id, &key, value_name, value)?;
            cx.emitter.write(Row::Registry(row));
        }
        cx.emitter.record_hard(component);
        Ok(())
    }
}

fn registry_row(
    component_id: &str,
    key: &str,
    name: &str,
    value: String,
) -> Result<RegistryRow, CompileError> {
    let root = RegistryRoot::LocalMachine;
    let root_code = root.code().to_string();
    let id = synthesize(
        IdentifierPrefix::RegistryValue,
        &[Some(component_id), Some(root_code.as_str()), Some(key), Some(name)],
    )?;
    Ok(RegistryRow {
        id,
        root,
        key: key.to_string(),
        name: Some(name.to_string()),
        value: Some(value),
        component_id: component_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rows_are_keyed_by_value_name() {
        let a = registry_row("Main", "K", "EventMessageFile", "#%a".into()).unwrap();
        let b = registry_row("Main", "K", "CategoryCount", "#1".into()).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.as_str().starts_with("reg"));
        assert_eq!(a.root, RegistryRoot::LocalMachine);
    }

    #[test]
    fn same_value_gets_the_same_id() {
        let a = registry_row("Main", "K", "EventMessageFile", "#%a".into()).unwrap();
        let b = registry_row("Main", "K", "EventMessageFile", "#%b".into()).unwrap();
        assert_eq!(a.id, b.id);
    }
}
