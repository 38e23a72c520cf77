//! Permission name vocabularies.
//!
//! A name's bit is its index in the vocabulary plus the vocabulary offset.

use serde::{Deserialize, Serialize};

/// A list of permission names occupying consecutive bits.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub offset: u32,
    pub names: &'static [&'static str],
}

impl Vocabulary {
    /// Mask for `name`, if this vocabulary has it.
    pub fn mask_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| 1u32 << (self.offset + i as u32))
    }
}

/// Rights every securable object understands.
pub const STANDARD: Vocabulary = Vocabulary {
    offset: 16,
    names: &[
        "Delete",
        "ReadPermission",
        "ChangePermission",
        "TakeOwnership",
        "Synchronize",
    ],
};

/// Generic rights, mapped by the object's own access mapping.
pub const GENERIC: Vocabulary = Vocabulary {
    offset: 28,
    names: &["GenericAll", "GenericExecute", "GenericWrite", "GenericRead"],
};

pub const FOLDER: Vocabulary = Vocabulary {
    offset: 0,
    names: &[
        "Read",
        "CreateFile",
        "CreateChild",
        "ReadExtendedAttributes",
        "WriteExtendedAttributes",
        "Traverse",
        "DeleteChild",
        "ReadAttributes",
        "WriteAttributes",
    ],
};

pub const FILE: Vocabulary = Vocabulary {
    offset: 0,
    names: &[
        "Read",
        "Write",
        "Append",
        "ReadExtendedAttributes",
        "WriteExtendedAttributes",
        "Execute",
        "FileAllRights",
        "ReadAttributes",
        "WriteAttributes",
    ],
};

pub const REGISTRY: Vocabulary = Vocabulary {
    offset: 0,
    names: &[
        "Read",
        "Write",
        "CreateSubkeys",
        "EnumerateSubkeys",
        "Notify",
        "CreateLink",
    ],
};

pub const SERVICE: Vocabulary = Vocabulary {
    offset: 0,
    names: &[
        "ServiceQueryConfig",
        "ServiceChangeConfig",
        "ServiceQueryStatus",
        "ServiceEnumerateDependents",
        "ServiceStart",
        "ServiceStop",
        "ServicePauseContinue",
        "ServiceInterrogate",
        "ServiceUserDefinedControl",
    ],
};

/// `FileAllRights` grants every file-specific and standard right.
pub const FILE_ALL_RIGHTS: u32 = 0x001F_01FF;

/// Kind of object a grant secures; selects the special vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Folder,
    File,
    Registry,
    Service,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Folder,
        ObjectKind::File,
        ObjectKind::Registry,
        ObjectKind::Service,
    ];

    pub fn special(&self) -> &'static Vocabulary {
        match self {
            ObjectKind::Folder => &FOLDER,
            ObjectKind::File => &FILE,
            ObjectKind::Registry => &REGISTRY,
            ObjectKind::Service => &SERVICE,
        }
    }

    /// Owning table of objects of this kind, as written to the grant row.
    pub fn table(&self) -> &'static str {
        match self {
            ObjectKind::Folder => "CreateFolder",
            ObjectKind::File => "File",
            ObjectKind::Registry => "Registry",
            ObjectKind::Service => "ServiceInstall",
        }
    }

    fn special_mask(&self, name: &str) -> Option<u32> {
        if *self == ObjectKind::File && name == "FileAllRights" {
            return Some(FILE_ALL_RIGHTS);
        }
        self.special().mask_of(name)
    }

    /// Mask for a permission name: standard first, then generic, then special.
    pub fn mask_of(&self, name: &str) -> Option<u32> {
        STANDARD
            .mask_of(name)
            .or_else(|| GENERIC.mask_of(name))
            .or_else(|| self.special_mask(name))
    }
}
