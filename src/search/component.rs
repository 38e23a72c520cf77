//! `ComponentSearch`: state, key path or directory of an installed component.

use markup_types::{Attribute, Element};

use super::flags::ComponentSearchAttributes;
use super::{result_flags, SearchHeader, SearchKind, ValidatedSearch};
use crate::attributes;
use crate::diagnostics::{self, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::IdentifierPrefix;
use crate::rows::{ComponentSearchRow, Row};

const RESULTS: &[(&str, ComponentSearchAttributes)] = &[
    ("directory", ComponentSearchAttributes::WANT_DIRECTORY),
    ("state", ComponentSearchAttributes::STATE),
    ("keyPath", ComponentSearchAttributes::KEY_PATH),
];

#[derive(Debug, Default)]
pub struct ComponentSearchFields {
    guid: Option<String>,
    product_code: Option<String>,
    result: Option<ComponentSearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPayload {
    pub guid: String,
    pub product_code: Option<String>,
    pub attributes: ComponentSearchAttributes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentSearch;

impl SearchKind for ComponentSearch {
    const ELEMENT: &'static str = "ComponentSearch";
    type Fields = ComponentSearchFields;
    type Payload = ComponentPayload;

    fn consume(&self, fields: &mut Self::Fields, attr: &Attribute, sink: &mut DiagnosticSink) -> bool {
        match attr.name.as_str() {
            "Guid" => fields.guid = attributes::guid(Self::ELEMENT, attr, sink),
            "ProductCode" => fields.product_code = attributes::guid(Self::ELEMENT, attr, sink),
            "Result" => fields.result = result_flags(Self::ELEMENT, attr, RESULTS, sink),
            _ => return false,
        }
        true
    }

    fn validate(
        &self,
        fields: Self::Fields,
        element: &Element,
        sink: &mut DiagnosticSink,
    ) -> Option<Self::Payload> {
        let Some(guid) = fields.guid else {
            if element.attribute("Guid").is_none() {
                sink.push(diagnostics::missing_attribute(
                    Self::ELEMENT,
                    "Guid",
                    &element.location,
                ));
            }
            return None;
        };

        Some(ComponentPayload {
            guid,
            product_code: fields.product_code,
            attributes: fields.result.unwrap_or(ComponentSearchAttributes::KEY_PATH),
        })
    }

    fn build(&self, header: &SearchHeader, payload: Self::Payload) -> Result<ValidatedSearch, CompileError> {
        let bits = payload.attributes.bits().to_string();
        let id = header.identify(
            IdentifierPrefix::ComponentSearch,
            &[
                Some(payload.guid.as_str()),
                payload.product_code.as_deref(),
                Some(bits.as_str()),
            ],
        )?;
        let detail = Row::ComponentSearch(ComponentSearchRow {
            id: id.clone(),
            component_guid: payload.guid,
            product_code: payload.product_code,
            attributes: payload.attributes,
        });
        Ok(header.complete(id, detail))
    }
}
