//! References from emitted rows to other entities.
//!
//! - **Soft** references are only recorded; the linking phase checks them
//!   across the whole program (search `After` targets, search references).
//! - **Hard** references are checked right away against the symbols the
//!   compiled unit declares (objects to secure, components).
//! - **Action** references name the platform variant of the native routine
//!   that carries the rows out at install time. Bookkeeping only.

use bitflags::bitflags;
use markup_types::{DeclaredSymbol, SymbolKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::config::Platform;
use crate::rows::TableName;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SoftReference {
    pub table: TableName,
    pub id: String,
}

impl SoftReference {
    pub fn new(table: TableName, id: impl Into<String>) -> Self {
        Self {
            table,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HardReference {
    pub kind: SymbolKind,
    pub id: String,
}

bitflags! {
    /// Platforms a native action is built for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Platforms: u8 {
        const X86 = 0x1;
        const X64 = 0x2;
        const ARM = 0x4;
        const ARM64 = 0x8;
    }
}

impl Platforms {
    pub fn supports(&self, platform: Platform) -> bool {
        let flag = match platform {
            Platform::X86 => Platforms::X86,
            Platform::X64 => Platforms::X64,
            Platform::Arm => Platforms::ARM,
            Platform::Arm64 => Platforms::ARM64,
        };
        self.contains(flag)
    }
}

/// A native action and the platforms it ships for.
#[derive(Debug, Clone, Copy)]
pub struct NativeAction {
    pub name: &'static str,
    pub platforms: Platforms,
}

impl NativeAction {
    /// Full action name for `platform`, e.g. `Wix4SchedSecureObjects_X64`.
    pub fn qualified_name(&self, prefix: &str, platform: Platform) -> String {
        format!("{}{}{}", prefix, self.name, platform.action_suffix())
    }
}

/// Scheduler for permission grants.
pub const SCHED_SECURE_OBJECTS: NativeAction = NativeAction {
    name: "SchedSecureObjects",
    platforms: Platforms::X86.union(Platforms::X64).union(Platforms::ARM64),
};

/// All references registered while compiling a unit.
#[derive(Debug, Default, Serialize)]
pub struct ReferenceSet {
    pub soft: BTreeSet<SoftReference>,
    pub hard: BTreeSet<HardReference>,
    pub actions: BTreeSet<String>,
}

impl ReferenceSet {
    pub fn add_soft(&mut self, reference: SoftReference) {
        self.soft.insert(reference);
    }

    pub fn add_hard(&mut self, reference: HardReference) {
        self.hard.insert(reference);
    }

    pub fn add_action(&mut self, name: String) {
        self.actions.insert(name);
    }

    pub fn contains_soft(&self, table: TableName, id: &str) -> bool {
        self.soft.contains(&SoftReference::new(table, id))
    }

    pub fn is_empty(&self) -> bool {
        self.soft.is_empty() && self.hard.is_empty() && self.actions.is_empty()
    }
}

/// Symbols the host declared in the compiled unit.
#[derive(Debug, Default)]
pub struct DeclaredSymbols {
    symbols: HashSet<DeclaredSymbol>,
}

impl DeclaredSymbols {
    pub fn new(symbols: impl IntoIterator<Item = DeclaredSymbol>) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    pub fn contains(&self, kind: SymbolKind, id: &str) -> bool {
        self.symbols.contains(&DeclaredSymbol::new(kind, id))
    }
}
