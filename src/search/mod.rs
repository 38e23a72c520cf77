//! Search elements.
//!
//! Every search kind goes through the same steps:
//!
//! 1. attributes are consumed, the common ones by [`SearchCommon`] and the
//!    rest by the kind;
//! 2. the common part becomes a [`SearchHeader`] and the kind part its
//!    payload, each reporting what is missing or illegal;
//! 3. if the element raised no error, the kind builds a [`ValidatedSearch`];
//! 4. the emitter writes its rows and ordering edge.
//!
//! Searches nested inside a search run after it. Nested elements are
//! compiled even when the enclosing search failed, so every problem in the
//! tree is reported in one pass.

pub mod component;
pub mod directory;
pub mod file;
pub mod flags;
pub mod product;
pub mod reference;
pub mod registry;

use markup_types::{Attribute, Element, ParentKind, SourceLocation};
use tracing::debug;

use crate::attributes;
use crate::config::CompilerConfig;
use crate::diagnostics::{self, Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::elements::{ElementCompiler, Parent, UnitContext};
use crate::error::CompileError;
use crate::identifier::{synthesize, Identifier, IdentifierPrefix};
use crate::rows::{Row, SearchRow};

/// Variables the bundle engine sets itself; searches may not overwrite them.
pub const BUILTIN_VARIABLES: &[&str] = &[
    "AdminToolsFolder",
    "AppDataFolder",
    "CommonAppDataFolder",
    "CommonFiles64Folder",
    "CommonFiles6432Folder",
    "CommonFilesFolder",
    "CompatibilityMode",
    "ComputerName",
    "Date",
    "DesktopFolder",
    "FavoritesFolder",
    "FontsFolder",
    "InstallerName",
    "InstallerVersion",
    "LocalAppDataFolder",
    "LogonUser",
    "MyPicturesFolder",
    "NativeMachine",
    "NTProductType",
    "NTSuiteBackOffice",
    "NTSuiteDataCenter",
    "NTSuiteEnterprise",
    "NTSuitePersonal",
    "NTSuiteSmallBusiness",
    "NTSuiteSmallBusinessRestricted",
    "NTSuiteWebServer",
    "PersonalFolder",
    "Privileged",
    "ProcessorArchitecture",
    "ProgramFiles64Folder",
    "ProgramFiles6432Folder",
    "ProgramFilesFolder",
    "ProgramMenuFolder",
    "RebootPending",
    "SendToFolder",
    "ServicePackLevel",
    "StartMenuFolder",
    "StartupFolder",
    "System64Folder",
    "SystemFolder",
    "SystemLanguageID",
    "TempFolder",
    "TemplateFolder",
    "TerminalServer",
    "UserLanguageID",
    "UserUILanguageID",
    "VersionMsi",
    "VersionNT",
    "VersionNT64",
    "WindowsFolder",
    "WindowsVolume",
    "WixBundleAction",
    "WixBundleElevated",
    "WixBundleForcedRestartPackage",
    "WixBundleInstalled",
    "WixBundleProviderKey",
    "WixBundleTag",
    "WixBundleVersion",
];

/// Built-in variable names are matched case-insensitively, as the engine does.
pub fn is_builtin_variable(name: &str) -> bool {
    BUILTIN_VARIABLES
        .iter()
        .any(|builtin| builtin.eq_ignore_ascii_case(name))
}

// =============================================================================
// COMMON ATTRIBUTES
// =============================================================================

/// Attributes every search kind accepts.
#[derive(Debug, Default)]
pub struct SearchCommon {
    pub id: Option<String>,
    pub variable: Option<String>,
    pub condition: Option<String>,
    pub after: Option<String>,
    after_location: Option<SourceLocation>,
}

impl SearchCommon {
    /// Consume a common attribute. Returns `false` for names it does not own.
    pub fn consume(
        &mut self,
        element: &str,
        attr: &Attribute,
        config: &CompilerConfig,
        sink: &mut DiagnosticSink,
    ) -> bool {
        match attr.name.as_str() {
            "Id" => self.id = attributes::identifier(element, attr, sink),
            "Variable" => {
                self.variable = attributes::identifier(element, attr, sink);
                if let Some(name) = &self.variable {
                    if !config.allow_builtin_variables && is_builtin_variable(name) {
                        sink.push(
                            Diagnostic::error(
                                DiagnosticCode::IllegalAttributeValue,
                                format!(
                                    "The {} element's Variable attribute '{}' names a built-in variable; choose another name.",
                                    element, name
                                ),
                            )
                            .at(&attr.location),
                        );
                        self.variable = None;
                    }
                }
            }
            "Condition" => self.condition = attributes::string(element, attr, sink),
            "After" => {
                self.after = attributes::identifier(element, attr, sink);
                self.after_location = Some(attr.location.clone());
            }
            _ => return false,
        }
        true
    }

    /// Check required common attributes and resolve the effective `After`.
    ///
    /// `enclosing` is `Some` for a nested search: the enclosing search's id,
    /// or `None` inside if that search did not validate.
    pub fn finish(
        self,
        element: &Element,
        enclosing: Option<Option<&Identifier>>,
        sink: &mut DiagnosticSink,
    ) -> Option<SearchHeader> {
        let after = match enclosing {
            Some(parent_id) => {
                if let Some(location) = &self.after_location {
                    sink.push(
                        Diagnostic::error(
                            DiagnosticCode::MutuallyExclusiveAttributes,
                            format!(
                                "The {} element cannot specify the After attribute when nested in another search; it already runs after its parent.",
                                element.name
                            ),
                        )
                        .at(location),
                    );
                }
                parent_id.cloned()
            }
            None => self.after.map(Identifier::explicit),
        };

        let Some(variable) = self.variable else {
            if element.attribute("Variable").is_none() {
                sink.push(diagnostics::missing_attribute(
                    &element.name,
                    "Variable",
                    &element.location,
                ));
            }
            return None;
        };

        Some(SearchHeader {
            id: self.id,
            variable,
            condition: self.condition,
            after,
        })
    }
}

/// Validated common part of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHeader {
    pub id: Option<String>,
    pub variable: String,
    pub condition: Option<String>,
    /// Effective predecessor, explicit or from nesting.
    pub after: Option<Identifier>,
}

impl SearchHeader {
    /// Explicit id, or one synthesized from the common fields followed by
    /// `fields`.
    pub fn identify(
        &self,
        prefix: IdentifierPrefix,
        fields: &[Option<&str>],
    ) -> Result<Identifier, CompileError> {
        if let Some(id) = &self.id {
            return Ok(Identifier::explicit(id.as_str()));
        }
        let mut all = vec![
            Some(self.variable.as_str()),
            self.condition.as_deref(),
            self.after.as_ref().map(Identifier::as_str),
        ];
        all.extend_from_slice(fields);
        synthesize(prefix, &all)
    }

    /// Pair the kind row with this header's `Search` row.
    pub fn complete(&self, id: Identifier, detail: Row) -> ValidatedSearch {
        ValidatedSearch {
            search: SearchRow {
                id,
                variable: self.variable.clone(),
                condition: self.condition.clone(),
            },
            detail,
            after: self.after.clone(),
        }
    }
}

/// A search ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSearch {
    pub search: SearchRow,
    /// Kind row (`FileSearch`, `RegistrySearch`, ...).
    pub detail: Row,
    pub after: Option<Identifier>,
}

// =============================================================================
// SEARCH KINDS
// =============================================================================

/// Kind-specific half of a search element.
pub trait SearchKind: Send + Sync {
    const ELEMENT: &'static str;

    /// Attributes as consumed, before validation.
    type Fields: Default;

    /// Validated kind payload.
    type Payload;

    /// Consume a kind attribute. Returns `false` for names it does not own.
    fn consume(&self, fields: &mut Self::Fields, attr: &Attribute, sink: &mut DiagnosticSink)
        -> bool;

    /// Check required attributes and combinations.
    fn validate(
        &self,
        fields: Self::Fields,
        element: &Element,
        sink: &mut DiagnosticSink,
    ) -> Option<Self::Payload>;

    /// Build the rows of a search that raised no errors.
    fn build(
        &self,
        header: &SearchHeader,
        payload: Self::Payload,
    ) -> Result<ValidatedSearch, CompileError>;
}

/// Result value legal for a kind, paired with the flags it selects.
pub(crate) fn result_flags<F: Copy>(
    element: &str,
    attr: &Attribute,
    table: &[(&'static str, F)],
    sink: &mut DiagnosticSink,
) -> Option<F> {
    let legal: Vec<&str> = table.iter().map(|(name, _)| *name).collect();
    let value = attributes::one_of(element, attr, &legal, sink)?;
    table
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, flags)| *flags)
}

/// Adapts a [`SearchKind`] to the element registry.
#[derive(Debug, Clone, Copy)]
pub struct SearchElement<K>(pub K);

impl<K: SearchKind> ElementCompiler for SearchElement<K> {
    fn compile(
        &self,
        element: &Element,
        parent: &Parent<'_>,
        cx: &mut UnitContext<'_>,
    ) -> Result<(), CompileError> {
        let enclosing = match parent {
            Parent::Host(context) => {
                if !matches!(context.kind, ParentKind::Bundle | ParentKind::Fragment) {
                    cx.diagnostics.push(diagnostics::unexpected_element(
                        parent.name(),
                        &element.name,
                        &element.location,
                    ));
                    return Ok(());
                }
                None
            }
            Parent::Search { id, .. } => Some(*id),
        };

        let kind = &self.0;
        let mark = cx.diagnostics.error_count();
        let mut common = SearchCommon::default();
        let mut fields = K::Fields::default();

        for attr in &element.attributes {
            if common.consume(K::ELEMENT, attr, cx.config, &mut cx.diagnostics) {
                continue;
            }
            if !kind.consume(&mut fields, attr, &mut cx.diagnostics) {
                cx.diagnostics.push(diagnostics::unexpected_attribute(
                    K::ELEMENT,
                    &attr.name,
                    &attr.location,
                ));
            }
        }

        let header = common.finish(element, enclosing, &mut cx.diagnostics);
        let payload = kind.validate(fields, element, &mut cx.diagnostics);

        let mut emitted = None;
        if cx.diagnostics.error_count() == mark {
            if let (Some(header), Some(payload)) = (header, payload) {
                let node = kind.build(&header, payload)?;
                emitted = Some(cx.emitter.search(node, &mut cx.graph)?);
            }
        } else {
            debug!(element = K::ELEMENT, "search suppressed by errors");
        }

        let nested = Parent::Search {
            element: &element.name,
            id: emitted.as_ref(),
        };
        for child in &element.children {
            cx.dispatch(child, &nested)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute::new(name, value)
    }

    #[test]
    fn builtin_variables_are_case_insensitive() {
        assert!(is_builtin_variable("VersionNT64"));
        assert!(is_builtin_variable("versionnt64"));
        assert!(!is_builtin_variable("HASFOO"));
    }

    #[test]
    fn common_rejects_builtin_variable_unless_allowed() {
        let mut sink = DiagnosticSink::default();
        let mut common = SearchCommon::default();
        let strict = CompilerConfig::default();
        common.consume("FileSearch", &attr("Variable", "WindowsFolder"), &strict, &mut sink);
        assert_eq!(common.variable, None);
        assert_eq!(sink.error_count(), 1);

        let allowing = CompilerConfig {
            allow_builtin_variables: true,
            ..Default::default()
        };
        let mut common = SearchCommon::default();
        common.consume("FileSearch", &attr("Variable", "WindowsFolder"), &allowing, &mut sink);
        assert_eq!(common.variable.as_deref(), Some("WindowsFolder"));
    }

    #[test]
    fn missing_variable_is_reported_once() {
        let mut sink = DiagnosticSink::default();
        let element = Element::new("FileSearch");
        assert!(SearchCommon::default().finish(&element, None, &mut sink).is_none());
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::MissingRequiredAttribute);
    }

    #[test]
    fn nested_search_takes_enclosing_id_and_rejects_after() {
        let mut sink = DiagnosticSink::default();
        let config = CompilerConfig::default();
        let mut common = SearchCommon::default();
        common.consume("FileSearch", &attr("Variable", "V"), &config, &mut sink);
        common.consume("FileSearch", &attr("After", "Other"), &config, &mut sink);

        let parent = Identifier::explicit("Outer");
        let element = Element::new("FileSearch").attr("Variable", "V");
        let header = common.finish(&element, Some(Some(&parent)), &mut sink).unwrap();

        assert_eq!(header.after, Some(parent));
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::MutuallyExclusiveAttributes);
    }

    #[test]
    fn explicit_id_bypasses_synthesis() {
        let header = SearchHeader {
            id: Some("Mine".into()),
            variable: "V".into(),
            condition: None,
            after: None,
        };
        let id = header
            .identify(IdentifierPrefix::FileSearch, &[Some("p"), Some("1")])
            .unwrap();
        assert_eq!(id.as_str(), "Mine");
    }
}
