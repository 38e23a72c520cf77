//! `ProductSearch`: version, language, state or assignment of a product,
//! found by product code or by upgrade code.

use markup_types::{Attribute, Element};

use super::flags::ProductSearchAttributes;
use super::{result_flags, SearchHeader, SearchKind, ValidatedSearch};
use crate::attributes;
use crate::diagnostics::{self, Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::error::CompileError;
use crate::identifier::IdentifierPrefix;
use crate::rows::{ProductSearchRow, Row};

const RESULTS: &[(&str, ProductSearchAttributes)] = &[
    ("version", ProductSearchAttributes::VERSION),
    ("language", ProductSearchAttributes::LANGUAGE),
    ("state", ProductSearchAttributes::STATE),
    ("assignment", ProductSearchAttributes::ASSIGNMENT),
];

#[derive(Debug, Default)]
pub struct ProductSearchFields {
    /// Deprecated spelling of `ProductCode`.
    guid: Option<String>,
    product_code: Option<String>,
    upgrade_code: Option<String>,
    result: Option<ProductSearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPayload {
    /// Product code, or upgrade code when `UPGRADE_CODE` is set.
    pub code: String,
    pub attributes: ProductSearchAttributes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductSearch;

impl SearchKind for ProductSearch {
    const ELEMENT: &'static str = "ProductSearch";
    type Fields = ProductSearchFields;
    type Payload = ProductPayload;

    fn consume(&self, fields: &mut Self::Fields, attr: &Attribute, sink: &mut DiagnosticSink) -> bool {
        match attr.name.as_str() {
            "Guid" => {
                sink.push(
                    Diagnostic::warning(
                        DiagnosticCode::DeprecatedAttribute,
                        "The ProductSearch element's Guid attribute is deprecated; use ProductCode instead.",
                    )
                    .at(&attr.location),
                );
                fields.guid = attributes::guid(Self::ELEMENT, attr, sink);
            }
            "ProductCode" => fields.product_code = attributes::guid(Self::ELEMENT, attr, sink),
            "UpgradeCode" => fields.upgrade_code = attributes::guid(Self::ELEMENT, attr, sink),
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
        let guid = element.attribute("Guid");
        let product_code = element.attribute("ProductCode");
        let upgrade_code = element.attribute("UpgradeCode");

        if let (Some(attr), Some(_)) = (guid, product_code) {
            sink.push(diagnostics::mutually_exclusive(
                Self::ELEMENT,
                "Guid",
                "ProductCode",
                &attr.location,
            ));
        }

        let product_name = if product_code.is_some() { "ProductCode" } else { "Guid" };
        if let (Some(_), Some(upgrade)) = (product_code.or(guid), upgrade_code) {
            sink.push(diagnostics::mutually_exclusive(
                Self::ELEMENT,
                product_name,
                "UpgradeCode",
                &upgrade.location,
            ));
            return None;
        }

        if guid.is_none() && product_code.is_none() && upgrade_code.is_none() {
            sink.push(diagnostics::missing_one_of(
                Self::ELEMENT,
                &["ProductCode", "UpgradeCode"],
                &element.location,
            ));
            return None;
        }

        let result = fields.result.unwrap_or(ProductSearchAttributes::VERSION);
        if let Some(code) = fields.upgrade_code {
            return Some(ProductPayload {
                code,
                attributes: result | ProductSearchAttributes::UPGRADE_CODE,
            });
        }
        fields
            .product_code
            .or(fields.guid)
            .map(|code| ProductPayload {
                code,
                attributes: result,
            })
    }

    fn build(&self, header: &SearchHeader, payload: Self::Payload) -> Result<ValidatedSearch, CompileError> {
        let bits = payload.attributes.bits().to_string();
        let id = header.identify(
            IdentifierPrefix::ProductSearch,
            &[Some(payload.code.as_str()), Some(bits.as_str())],
        )?;
        let detail = Row::ProductSearch(ProductSearchRow {
            id: id.clone(),
            code: payload.code,
            attributes: payload.attributes,
        });
        Ok(header.complete(id, detail))
    }
}
