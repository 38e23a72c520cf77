//! `FileSearch`: existence or version of a file.

use markup_types::{Attribute, Element};

use super::flags::FileSearchAttributes;
use super::{result_flags, SearchHeader, SearchKind, ValidatedSearch};
use crate::attributes;
use crate::diagnostics::{self, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::IdentifierPrefix;
use crate::rows::{FileSearchRow, Row};

const RESULTS: &[(&str, FileSearchAttributes)] = &[
    ("exists", FileSearchAttributes::WANT_EXISTS),
    ("version", FileSearchAttributes::WANT_VERSION),
];

#[derive(Debug, Default)]
pub struct FileSearchFields {
    path: Option<String>,
    result: Option<FileSearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: String,
    pub attributes: FileSearchAttributes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileSearch;

impl SearchKind for FileSearch {
    const ELEMENT: &'static str = "FileSearch";
    type Fields = FileSearchFields;
    type Payload = FilePayload;

    fn consume(&self, fields: &mut Self::Fields, attr: &Attribute, sink: &mut DiagnosticSink) -> bool {
        match attr.name.as_str() {
            "Path" => fields.path = attributes::string(Self::ELEMENT, attr, sink),
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
        let Some(path) = fields.path else {
            if element.attribute("Path").is_none() {
                sink.push(diagnostics::missing_attribute(
                    Self::ELEMENT,
                    "Path",
                    &element.location,
                ));
            }
            return None;
        };

        // Without a Result the search returns the path itself.
        let attributes = FileSearchAttributes::DEFAULT
            | fields.result.unwrap_or(FileSearchAttributes::empty());
        Some(FilePayload { path, attributes })
    }

    fn build(&self, header: &SearchHeader, payload: Self::Payload) -> Result<ValidatedSearch, CompileError> {
        let bits = payload.attributes.bits().to_string();
        let id = header.identify(
            IdentifierPrefix::FileSearch,
            &[Some(payload.path.as_str()), Some(bits.as_str())],
        )?;
        let detail = Row::FileSearch(FileSearchRow {
            id: id.clone(),
            path: payload.path,
            attributes: payload.attributes,
        });
        Ok(header.complete(id, detail))
    }
}
