//! Output rows and tables.
//!
//! Every row knows its table and renders its fields in wire order; the order
//! of [`Row::fields`] is the contract with the linking engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::graph::RelationStrength;
use crate::identifier::Identifier;
use crate::search::flags::{
    ComponentSearchAttributes, FileSearchAttributes, ProductSearchAttributes,
    RegistrySearchAttributes,
};

// =============================================================================
// TABLES AND FIELDS
// =============================================================================

/// Named output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableName {
    Search,
    SearchRelation,
    FileSearch,
    ComponentSearch,
    ProductSearch,
    RegistrySearch,
    PermissionGrant,
    Registry,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Search => "Search",
            TableName::SearchRelation => "SearchRelation",
            TableName::FileSearch => "FileSearch",
            TableName::ComponentSearch => "ComponentSearch",
            TableName::ProductSearch => "ProductSearch",
            TableName::RegistrySearch => "RegistrySearch",
            TableName::PermissionGrant => "PermissionGrant",
            TableName::Registry => "Registry",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column value as written to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i32),
    Null,
}

impl FieldValue {
    fn text(s: impl AsRef<str>) -> Self {
        FieldValue::Text(s.as_ref().to_string())
    }

    fn optional(s: Option<&String>) -> Self {
        s.map_or(FieldValue::Null, FieldValue::text)
    }

    /// Bit masks are stored in signed 32-bit columns.
    fn bits(bits: u32) -> Self {
        FieldValue::Integer(bits as i32)
    }
}

/// Registry hive, stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryRoot {
    ClassesRoot,
    CurrentUser,
    LocalMachine,
    Users,
}

impl RegistryRoot {
    pub const LEGAL_VALUES: &'static [&'static str] = &["HKCR", "HKCU", "HKLM", "HKU"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HKCR" => Some(RegistryRoot::ClassesRoot),
            "HKCU" => Some(RegistryRoot::CurrentUser),
            "HKLM" => Some(RegistryRoot::LocalMachine),
            "HKU" => Some(RegistryRoot::Users),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            RegistryRoot::ClassesRoot => 0,
            RegistryRoot::CurrentUser => 1,
            RegistryRoot::LocalMachine => 2,
            RegistryRoot::Users => 3,
        }
    }
}

// =============================================================================
// ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRow {
    pub id: Identifier,
    pub variable: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRelationRow {
    pub child_id: Identifier,
    pub parent_id: Identifier,
    pub strength: RelationStrength,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSearchRow {
    pub id: Identifier,
    pub path: String,
    pub attributes: FileSearchAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentSearchRow {
    pub id: Identifier,
    pub component_guid: String,
    pub product_code: Option<String>,
    pub attributes: ComponentSearchAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductSearchRow {
    pub id: Identifier,
    pub code: String,
    pub attributes: ProductSearchAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrySearchRow {
    pub id: Identifier,
    pub root: RegistryRoot,
    pub key: String,
    pub value: Option<String>,
    pub attributes: RegistrySearchAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrantRow {
    pub object_id: String,
    /// Owning table of the secured object (`CreateFolder`, `File`, ...)
    pub object_table: String,
    pub domain: Option<String>,
    pub user: String,
    pub permission: u32,
    pub component_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryRow {
    pub id: Identifier,
    pub root: RegistryRoot,
    pub key: String,
    pub name: Option<String>,
    pub value: Option<String>,
    pub component_id: String,
}

/// A row destined for one of the output tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Row {
    Search(SearchRow),
    SearchRelation(SearchRelationRow),
    FileSearch(FileSearchRow),
    ComponentSearch(ComponentSearchRow),
    ProductSearch(ProductSearchRow),
    RegistrySearch(RegistrySearchRow),
    PermissionGrant(PermissionGrantRow),
    Registry(RegistryRow),
}

impl Row {
    pub fn table(&self) -> TableName {
        match self {
            Row::Search(_) => TableName::Search,
            Row::SearchRelation(_) => TableName::SearchRelation,
            Row::FileSearch(_) => TableName::FileSearch,
            Row::ComponentSearch(_) => TableName::ComponentSearch,
            Row::ProductSearch(_) => TableName::ProductSearch,
            Row::RegistrySearch(_) => TableName::RegistrySearch,
            Row::PermissionGrant(_) => TableName::PermissionGrant,
            Row::Registry(_) => TableName::Registry,
        }
    }

    /// Identifier column of tables keyed by a row id.
    pub fn primary_key(&self) -> Option<&str> {
        match self {
            Row::Search(r) => Some(r.id.as_str()),
            Row::FileSearch(r) => Some(r.id.as_str()),
            Row::ComponentSearch(r) => Some(r.id.as_str()),
            Row::ProductSearch(r) => Some(r.id.as_str()),
            Row::RegistrySearch(r) => Some(r.id.as_str()),
            Row::Registry(r) => Some(r.id.as_str()),
            Row::SearchRelation(_) | Row::PermissionGrant(_) => None,
        }
    }

    /// Field values in wire order.
    pub fn fields(&self) -> Vec<FieldValue> {
        match self {
            Row::Search(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::text(&r.variable),
                FieldValue::optional(r.condition.as_ref()),
            ],
            Row::SearchRelation(r) => vec![
                FieldValue::text(&r.child_id),
                FieldValue::text(&r.parent_id),
                FieldValue::Integer(r.strength.wire_value()),
            ],
            Row::FileSearch(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::text(&r.path),
                FieldValue::bits(r.attributes.bits()),
            ],
            Row::ComponentSearch(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::text(&r.component_guid),
                FieldValue::optional(r.product_code.as_ref()),
                FieldValue::bits(r.attributes.bits()),
            ],
            Row::ProductSearch(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::text(&r.code),
                FieldValue::bits(r.attributes.bits()),
            ],
            Row::RegistrySearch(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::Integer(r.root.code()),
                FieldValue::text(&r.key),
                FieldValue::optional(r.value.as_ref()),
                FieldValue::bits(r.attributes.bits()),
            ],
            Row::PermissionGrant(r) => vec![
                FieldValue::text(&r.object_id),
                FieldValue::text(&r.object_table),
                FieldValue::optional(r.domain.as_ref()),
                FieldValue::text(&r.user),
                FieldValue::bits(r.permission),
                FieldValue::text(&r.component_id),
            ],
            Row::Registry(r) => vec![
                FieldValue::text(&r.id),
                FieldValue::Integer(r.root.code()),
                FieldValue::text(&r.key),
                FieldValue::optional(r.name.as_ref()),
                FieldValue::optional(r.value.as_ref()),
                FieldValue::text(&r.component_id),
            ],
        }
    }
}

// =============================================================================
// TABLE SET
// =============================================================================

/// Output tables of one compiled unit.
///
/// Rows are kept in insertion order per table. Writing a row that is already
/// present (same table, same values) is a no-op.
#[derive(Debug, Default, Serialize)]
pub struct OutputTables {
    tables: BTreeMap<TableName, Vec<Row>>,
    #[serde(skip)]
    seen: HashSet<Row>,
    #[serde(skip)]
    keys: HashSet<(TableName, String)>,
}

impl OutputTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, returning `false` if an identical row was already written.
    pub fn insert(&mut self, row: Row) -> bool {
        if self.seen.contains(&row) {
            return false;
        }
        self.seen.insert(row.clone());
        if let Some(key) = row.primary_key() {
            self.keys.insert((row.table(), key.to_string()));
        }
        self.tables.entry(row.table()).or_default().push(row);
        true
    }

    /// Whether `table` already holds a row with identifier `key`.
    pub fn has_key(&self, table: TableName, key: &str) -> bool {
        self.keys.contains(&(table, key.to_string()))
    }

    /// Rows of one table, in insertion order.
    pub fn rows(&self, table: TableName) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total row count.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Table name → rows as field lists, in wire order.
    pub fn to_wire(&self) -> BTreeMap<&'static str, Vec<Vec<FieldValue>>> {
        self.tables
            .iter()
            .map(|(table, rows)| (table.as_str(), rows.iter().map(Row::fields).collect()))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
