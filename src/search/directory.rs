//! `DirectorySearch`: a directory path, optionally only whether it exists.
//!
//! Shares the `FileSearch` table with file searches; the `IS_DIRECTORY` bit
//! tells them apart.

use markup_types::{Attribute, Element};

use super::flags::FileSearchAttributes;
use super::{result_flags, SearchHeader, SearchKind, ValidatedSearch};
use crate::attributes;
use crate::diagnostics::{self, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::IdentifierPrefix;
use crate::rows::{FileSearchRow, Row};

const RESULTS: &[(&str, FileSearchAttributes)] = &[("exists", FileSearchAttributes::WANT_EXISTS)];

#[derive(Debug, Default)]
pub struct DirectorySearchFields {
    path: Option<String>,
    result: Option<FileSearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPayload {
    pub path: String,
    pub attributes: FileSearchAttributes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectorySearch;

impl SearchKind for DirectorySearch {
    const ELEMENT: &'static str = "DirectorySearch";
    type Fields = DirectorySearchFields;
    type Payload = DirectoryPayload;

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

        let attributes = FileSearchAttributes::IS_DIRECTORY
            | fields.result.unwrap_or(FileSearchAttributes::empty());
        Some(DirectoryPayload { path, attributes })
    }

    fn build(&self, header: &SearchHeader, payload: Self::Payload) -> Result<ValidatedSearch, CompileError> {
        let bits = payload.attributes.bits().to_string();
        let id = header.identify(
            IdentifierPrefix::DirectorySearch,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(element: &Element) -> (Option<DirectoryPayload>, DiagnosticSink) {
        let mut sink = DiagnosticSink::default();
        let mut fields = DirectorySearchFields::default();
        for attr in &element.attributes {
            DirectorySearch.consume(&mut fields, attr, &mut sink);
        }
        (DirectorySearch.validate(fields, element, &mut sink), sink)
    }

    #[test]
    fn directory_bit_is_always_set() {
        let element = Element::new("DirectorySearch").attr("Path", "[ProgramFilesFolder]Acme");
        assert_eq!(
            validate(&element).0.unwrap().attributes,
            FileSearchAttributes::IS_DIRECTORY
        );

        let element = Element::new("DirectorySearch")
            .attr("Path", "[ProgramFilesFolder]Acme")
            .attr("Result", "exists");
        assert_eq!(validate(&element).0.unwrap().attributes.bits(), 0x300);
    }

    #[test]
    fn version_is_not_a_directory_result() {
        let element = Element::new("DirectorySearch")
            .attr("Path", "C:\\")
            .attr("Result", "version");
        let (_, sink) = validate(&element);
        assert_eq!(sink.error_count(), 1);
    }
}
