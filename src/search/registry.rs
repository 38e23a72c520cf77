//! `RegistrySearch`: a registry value, or whether a key or value exists.

use markup_types::{Attribute, Element};

use super::flags::RegistrySearchAttributes;
use super::{result_flags, SearchHeader, SearchKind, ValidatedSearch};
use crate::attributes;
use crate::diagnostics::{self, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::IdentifierPrefix;
use crate::rows::{RegistryRoot, RegistrySearchRow, Row};

const RESULTS: &[(&str, RegistrySearchAttributes)] = &[
    ("exists", RegistrySearchAttributes::WANT_EXISTS),
    ("value", RegistrySearchAttributes::WANT_VALUE),
];

const FORMATS: &[(&str, RegistrySearchAttributes)] = &[
    ("raw", RegistrySearchAttributes::RAW),
    ("compatible", RegistrySearchAttributes::COMPATIBLE),
];

#[derive(Debug, Default)]
pub struct RegistrySearchFields {
    root: Option<RegistryRoot>,
    key: Option<String>,
    value: Option<String>,
    format: Option<RegistrySearchAttributes>,
    expand: Option<bool>,
    result: Option<RegistrySearchAttributes>,
    win64: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPayload {
    pub root: RegistryRoot,
    pub key: String,
    pub value: Option<String>,
    pub attributes: RegistrySearchAttributes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrySearch;

impl SearchKind for RegistrySearch {
    const ELEMENT: &'static str = "RegistrySearch";
    type Fields = RegistrySearchFields;
    type Payload = RegistryPayload;

    fn consume(&self, fields: &mut Self::Fields, attr: &Attribute, sink: &mut DiagnosticSink) -> bool {
        match attr.name.as_str() {
            "Root" => {
                fields.root = attributes::one_of(Self::ELEMENT, attr, RegistryRoot::LEGAL_VALUES, sink)
                    .and_then(RegistryRoot::parse)
            }
            "Key" => fields.key = attributes::string(Self::ELEMENT, attr, sink),
            "Value" => fields.value = attributes::string(Self::ELEMENT, attr, sink),
            "Format" => fields.format = result_flags(Self::ELEMENT, attr, FORMATS, sink),
            "ExpandEnvironmentVariables" => {
                fields.expand = attributes::yes_no(Self::ELEMENT, attr, sink)
            }
            "Result" => fields.result = result_flags(Self::ELEMENT, attr, RESULTS, sink),
            "Win64" => fields.win64 = attributes::yes_no(Self::ELEMENT, attr, sink),
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
        for required in ["Root", "Key"] {
            if element.attribute(required).is_none() {
                sink.push(diagnostics::missing_attribute(
                    Self::ELEMENT,
                    required,
                    &element.location,
                ));
            }
        }

        let result = fields.result.unwrap_or(RegistrySearchAttributes::WANT_VALUE);
        let expand = fields.expand.unwrap_or(false);
        if expand && result == RegistrySearchAttributes::WANT_EXISTS {
            if let Some(attr) = element.attribute("ExpandEnvironmentVariables") {
                sink.push(diagnostics::illegal_combination(
                    Self::ELEMENT,
                    "ExpandEnvironmentVariables",
                    "Result",
                    "exists",
                    &attr.location,
                ));
            }
            return None;
        }

        let mut attributes = result | fields.format.unwrap_or(RegistrySearchAttributes::RAW);
        if expand {
            attributes |= RegistrySearchAttributes::EXPAND_ENVIRONMENT_VARIABLES;
        }
        if fields.win64.unwrap_or(false) {
            attributes |= RegistrySearchAttributes::WIN64;
        }

        Some(RegistryPayload {
            root: fields.root?,
            key: fields.key?,
            value: fields.value,
            attributes,
        })
    }

    fn build(&self, header: &SearchHeader, payload: Self::Payload) -> Result<ValidatedSearch, CompileError> {
        let root = payload.root.code().to_string();
        let bits = payload.attributes.bits().to_string();
        let id = header.identify(
            IdentifierPrefix::RegistrySearch,
            &[
                Some(root.as_str()),
                Some(payload.key.as_str()),
                payload.value.as_deref(),
                Some(bits.as_str()),
            ],
        )?;
        let detail = Row::RegistrySearch(RegistrySearchRow {
            id: id.clone(),
            root: payload.root,
            key: payload.key,
            value: payload.value,
            attributes: payload.attributes,
        });
        Ok(header.complete(id, detail))
    }
}
