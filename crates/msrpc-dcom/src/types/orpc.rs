//! ORPC (Object RPC) header types (MS-DCOM 2.2.13, 2.2.14)
//!
//! ORPCTHIS is the first parameter of every DCOM request and ORPCTHAT the
//! first out-parameter of every response.

use bytes::Bytes;
use msrpc_ndr::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, PointerKind};
use uuid::Uuid;

/// COM version structure (MS-DCOM 2.2.11)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComVersion {
    pub major: u16,
    pub minor: u16,
}

impl ComVersion {
    /// Size in bytes
    pub const SIZE: usize = 4;

    /// DCOM version 5.1 (Windows 2000)
    pub const DCOM_5_1: Self = Self { major: 5, minor: 1 };
    /// DCOM version 5.4 (Windows XP/2003)
    pub const DCOM_5_4: Self = Self { major: 5, minor: 4 };
    /// DCOM version 5.6 (Windows Vista)
    pub const DCOM_5_6: Self = Self { major: 5, minor: 6 };
    /// DCOM version 5.7 (Windows 7)
    pub const DCOM_5_7: Self = Self { major: 5, minor: 7 };

    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for ComVersion {
    fn default() -> Self {
        Self::DCOM_5_7
    }
}

impl NdrEncode for ComVersion {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u16(self.major);
        w.write_u16(self.minor);
        Ok(())
    }
}

impl NdrDecode for ComVersion {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.major = r.read_u16()?;
        self.minor = r.read_u16()?;
        Ok(())
    }
}

/// ORPC_EXTENT: one piece of out-of-band call data
///
/// A conformant struct whose byte array is padded to a multiple of 8.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcExtent {
    /// Extension identifier
    pub id: Uuid,
    pub data: Bytes,
}

impl OrpcExtent {
    pub fn new(id: Uuid, data: Bytes) -> Self {
        Self { id, data }
    }

    /// Padded length of the data on the wire
    fn max_count(size: u32) -> u32 {
        (size + 7) & !7
    }
}

impl NdrEncode for OrpcExtent {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let size = u32::try_from(self.data.len())
            .ok()
            .filter(|size| *size <= u32::MAX - 7)
            .ok_or(NdrError::LengthOverflow(self.data.len()))?;
        let max_count = Self::max_count(size);
        w.write_conformance(max_count);
        w.write_uuid(self.id);
        w.write_u32(size);
        w.write_bytes(&self.data);
        for _ in size..max_count {
            w.write_u8(0);
        }
        Ok(())
    }
}

impl NdrDecode for OrpcExtent {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        let max_count = r.read_conformance()?;
        self.id = r.read_uuid()?;
        let size = r.read_u32()?;
        if size > max_count {
            return Err(NdrError::ConformanceMismatch {
                max_count,
                offset: 0,
                actual_count: size,
            });
        }
        let padded = r.check_count(max_count, 1)?;
        let data = r.read_bytes(padded)?;
        self.data = data.slice(..size as usize);
        Ok(())
    }
}

/// ORPC_EXTENT_ARRAY
///
/// Wire form: `size`, `reserved`, then a unique pointer to a conformant
/// array of `(size + 1) & !1` unique extent pointers. Slots past `size` are
/// null.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcExtentArray {
    pub reserved: u32,
    pub extents: Vec<OrpcExtent>,
}

impl OrpcExtentArray {
    pub fn new(extents: Vec<OrpcExtent>) -> Self {
        Self {
            reserved: 0,
            extents,
        }
    }

    /// Find an extent by identifier
    pub fn find(&self, id: &Uuid) -> Option<&OrpcExtent> {
        self.extents.iter().find(|extent| extent.id == *id)
    }
}

impl NdrEncode for OrpcExtentArray {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let size = u32::try_from(self.extents.len())
            .map_err(|_| NdrError::LengthOverflow(self.extents.len()))?;
        w.write_u32(size);
        w.write_u32(self.reserved);

        let list = (!self.extents.is_empty()).then_some(self.extents.as_slice());
        w.write_pointer_with(list, PointerKind::Unique, move |w, extents| {
            let max_count = (size + 1) & !1;
            w.write_conformance(max_count);
            for extent in extents {
                w.write_pointer(Some(extent), PointerKind::Unique)?;
            }
            for _ in size..max_count {
                w.write_referent(false, PointerKind::Unique)?;
            }
            Ok(())
        })
    }
}

impl NdrDecode for OrpcExtentArray {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        let size = r.read_u32()?;
        self.reserved = r.read_u32()?;
        let referent = r.read_referent(PointerKind::Unique)?;

        let extents = &mut self.extents;
        extents.clear();
        if referent == 0 {
            return Ok(());
        }

        r.defer(move |r| {
            let max_count = r.read_conformance()?;
            if max_count < size {
                return Err(NdrError::ArraySizeMismatch {
                    expected: size as usize,
                    got: max_count as usize,
                });
            }
            let slots = r.check_count(max_count, 4)?;
            let mut present = 0;
            for _ in 0..slots {
                if r.read_referent(PointerKind::Unique)? != 0 {
                    present += 1;
                }
            }
            if present > size as usize {
                return Err(NdrError::ArraySizeMismatch {
                    expected: size as usize,
                    got: present,
                });
            }
            extents.resize_with(present, OrpcExtent::default);
            for extent in extents {
                r.defer(move |r| extent.ndr_decode(r));
            }
            Ok(())
        });
        Ok(())
    }
}

/// ORPCTHIS (MS-DCOM 2.2.13.1)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcThis {
    pub version: ComVersion,
    /// ORPCF_* flags
    pub flags: u32,
    pub reserved1: u32,
    /// Causality ID, shared by every call in one logical call chain
    pub cid: Uuid,
    pub extensions: Option<OrpcExtentArray>,
}

impl OrpcThis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_causality(cid: Uuid) -> Self {
        Self {
            cid,
            ..Self::default()
        }
    }
}

impl NdrEncode for OrpcThis {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        self.version.ndr_encode(w)?;
        w.write_u32(self.flags);
        w.write_u32(self.reserved1);
        w.write_uuid(self.cid);
        w.write_pointer(self.extensions.as_ref(), PointerKind::Unique)
    }
}

impl NdrDecode for OrpcThis {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.version.ndr_decode(r)?;
        self.flags = r.read_u32()?;
        self.reserved1 = r.read_u32()?;
        self.cid = r.read_uuid()?;
        r.read_pointer(&mut self.extensions, PointerKind::Unique)
    }
}

/// ORPCTHAT (MS-DCOM 2.2.13.2)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrpcThat {
    pub flags: u32,
    pub extensions: Option<OrpcExtentArray>,
}

impl OrpcThat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NdrEncode for OrpcThat {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u32(self.flags);
        w.write_pointer(self.extensions.as_ref(), PointerKind::Unique)
    }
}

impl NdrDecode for OrpcThat {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.flags = r.read_u32()?;
        r.read_pointer(&mut self.extensions, PointerKind::Unique)
    }
}

/// Well-known extension identifiers
pub mod extent_ids {
    use uuid::Uuid;

    /// Error information extension
    pub const ERROR_INFO: Uuid = Uuid::from_u128(0x0000031c_0000_0000_c000_000000000046);
}
