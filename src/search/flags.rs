//! Attribute columns of the search tables.
//!
//! Each result kind an author can ask for maps to exactly one bit here.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// `FileSearch.attributes`, shared by file and directory searches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FileSearchAttributes: u32 {
        /// Plain file search; the result is the path.
        const DEFAULT = 0x001;
        const MIN_VERSION_INCLUSIVE = 0x002;
        const MAX_VERSION_INCLUSIVE = 0x004;
        const MIN_SIZE_INCLUSIVE = 0x008;
        const MAX_SIZE_INCLUSIVE = 0x010;
        const MIN_DATE_INCLUSIVE = 0x020;
        const MAX_DATE_INCLUSIVE = 0x040;
        const WANT_VERSION = 0x080;
        const WANT_EXISTS = 0x100;
        const IS_DIRECTORY = 0x200;
    }
}

bitflags! {
    /// `ComponentSearch.attributes`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ComponentSearchAttributes: u32 {
        const KEY_PATH = 0x1;
        const STATE = 0x2;
        const WANT_DIRECTORY = 0x4;
    }
}

bitflags! {
    /// `ProductSearch.attributes`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ProductSearchAttributes: u32 {
        const VERSION = 0x01;
        const LANGUAGE = 0x02;
        const STATE = 0x04;
        const ASSIGNMENT = 0x08;
        /// The code column holds an upgrade code, not a product code.
        const UPGRADE_CODE = 0x10;
    }
}

bitflags! {
    /// `RegistrySearch.attributes`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RegistrySearchAttributes: u32 {
        const RAW = 0x01;
        const COMPATIBLE = 0x02;
        const EXPAND_ENVIRONMENT_VARIABLES = 0x04;
        const WANT_VALUE = 0x08;
        const WANT_EXISTS = 0x10;
        /// Read the 64-bit registry view.
        const WIN64 = 0x20;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_search_exists() {
        let attrs = FileSearchAttributes::DEFAULT | FileSearchAttributes::WANT_EXISTS;
        assert_eq!(attrs.bits(), 0x101);
    }

    #[test]
    fn directory_search_exists() {
        let attrs = FileSearchAttributes::IS_DIRECTORY | FileSearchAttributes::WANT_EXISTS;
        assert_eq!(attrs.bits(), 0x300);
    }

    #[test]
    fn registry_defaults() {
        let attrs = RegistrySearchAttributes::RAW | RegistrySearchAttributes::WANT_VALUE;
        assert_eq!(attrs.bits(), 0x09);
        assert!(!attrs.contains(RegistrySearchAttributes::WIN64));
    }
}
