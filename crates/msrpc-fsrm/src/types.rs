//! FSRM enumerations and shared parameter lists (MS-FSRM 2.2.1)

use std::ops::BitOr;

use msrpc_dcom::oaut::SafeArray;
use msrpc_dcom::Params;
use msrpc_ndr::{NdrDecode, NdrEncode, NdrReader, NdrWriter, PointerKind};

msrpc_ndr::ndr_enum! {
    /// Kind of pipeline module
    #[derive(Default)]
    pub enum FsrmPipelineModuleType {
        #[default]
        Unknown = 0,
        Storage = 1,
        Classifier = 2,
    }
}

msrpc_ndr::ndr_enum! {
    /// Account a pipeline module runs under
    #[derive(Default)]
    pub enum FsrmAccountType {
        #[default]
        Unknown = 0,
        NetworkService = 1,
        LocalService = 2,
        LocalSystem = 3,
        InProc = 4,
        External = 5,
        Automatic = 500,
    }
}

msrpc_ndr::ndr_enum! {
    /// Where a storage module keeps properties
    #[derive(Default)]
    pub enum FsrmStorageModuleType {
        #[default]
        Unknown = 0,
        Cache = 1,
        InFile = 2,
        Database = 3,
        System = 100,
    }
}

/// `FsrmStorageModuleCaps` flags
///
/// Travels as a 16-bit enumeration value holding any combination of flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StorageModuleCaps(pub u16);

impl StorageModuleCaps {
    pub const UNKNOWN: Self = Self(0x0);
    pub const CAN_GET: Self = Self(0x1);
    pub const CAN_SET: Self = Self(0x2);
    pub const CAN_HANDLE_DIRECTORIES: Self = Self(0x4);
    pub const CAN_HANDLE_FILES: Self = Self(0x8);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StorageModuleCaps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl NdrEncode for StorageModuleCaps {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u16(self.0);
        Ok(())
    }
}

impl NdrDecode for StorageModuleCaps {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.0 = r.read_u16()?;
        Ok(())
    }
}

/// `[in] SAFEARRAY(VARIANT)` property value, a unique pointer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SafeArrayProperty {
    pub value: Option<SafeArray>,
}

impl SafeArrayProperty {
    pub fn new(value: SafeArray) -> Self {
        Self { value: Some(value) }
    }
}

impl Params for SafeArrayProperty {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_pointer_param(self.value.as_ref(), PointerKind::Unique)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_pointer_param(&mut self.value, PointerKind::Unique)
    }
}
