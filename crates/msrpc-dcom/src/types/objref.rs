//! OBJREF structure (MS-DCOM 2.2.18)
//!
//! OBJREF is the marshaled form of a COM interface pointer. It travels
//! inside an `MInterfacePointer` ([`InterfacePointer`]), a conformant byte
//! blob that is itself embedded in method parameters behind a unique pointer.
//! The OBJREF bytes are always little-endian.

use bytes::Bytes;
use msrpc_ndr::{NdrContext, NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter};
use uuid::Uuid;

use super::identifiers::{Ipid, Oid, Oxid};
use super::stdobjref::StdObjRef;
use super::stringbinding::DualStringArray;
use crate::error::{DcomError, Result};

/// OBJREF signature ("MEOW" in little-endian)
pub const OBJREF_SIGNATURE: u32 = 0x574F_454D;

/// OBJREF flags indicating the variant type
pub mod objref_flags {
    /// STDOBJREF + DUALSTRINGARRAY
    pub const OBJREF_STANDARD: u32 = 0x0000_0001;
    /// STDOBJREF + handler CLSID + DUALSTRINGARRAY
    pub const OBJREF_HANDLER: u32 = 0x0000_0002;
    /// Unmarshaler CLSID + opaque data
    pub const OBJREF_CUSTOM: u32 = 0x0000_0004;
}

/// OBJREF_STANDARD (MS-DCOM 2.2.18.4)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjRefStandard {
    pub std: StdObjRef,
    /// Resolver string bindings
    pub resolver_addr: DualStringArray,
}

impl ObjRefStandard {
    pub fn new(std: StdObjRef, resolver_addr: DualStringArray) -> Self {
        Self { std, resolver_addr }
    }

    /// A reference reachable only in-process, with no resolver bindings
    pub fn local(oxid: Oxid, oid: Oid, ipid: Ipid) -> Self {
        Self::new(StdObjRef::new_noping(oxid, oid, ipid, 1), DualStringArray::new())
    }
}

/// OBJREF_HANDLER (MS-DCOM 2.2.18.5)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjRefHandler {
    pub std: StdObjRef,
    /// CLSID of the client-side handler
    pub handler_clsid: Uuid,
    pub resolver_addr: DualStringArray,
}

/// OBJREF_CUSTOM (MS-DCOM 2.2.18.6)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjRefCustom {
    /// CLSID of the unmarshaler
    pub clsid: Uuid,
    pub cb_extension: u32,
    /// Custom marshaled data
    pub data: Bytes,
}

impl ObjRefCustom {
    pub fn new(clsid: Uuid, data: Bytes) -> Self {
        Self {
            clsid,
            cb_extension: 0,
            data,
        }
    }
}

/// Flavour of an OBJREF
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjRefKind {
    Standard(ObjRefStandard),
    Handler(ObjRefHandler),
    Custom(ObjRefCustom),
}

/// A marshaled interface pointer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjRef {
    /// Interface the reference was marshaled for
    pub iid: Uuid,
    pub kind: ObjRefKind,
}

impl ObjRef {
    /// Header size (signature + flags + IID)
    pub const HEADER_SIZE: usize = 24;

    pub fn standard(iid: Uuid, std: StdObjRef, resolver_addr: DualStringArray) -> Self {
        Self {
            iid,
            kind: ObjRefKind::Standard(ObjRefStandard::new(std, resolver_addr)),
        }
    }

    pub fn custom(iid: Uuid, custom: ObjRefCustom) -> Self {
        Self {
            iid,
            kind: ObjRefKind::Custom(custom),
        }
    }

    pub fn flags(&self) -> u32 {
        match self.kind {
            ObjRefKind::Standard(_) => objref_flags::OBJREF_STANDARD,
            ObjRefKind::Handler(_) => objref_flags::OBJREF_HANDLER,
            ObjRefKind::Custom(_) => objref_flags::OBJREF_CUSTOM,
        }
    }

    /// The STDOBJREF of standard and handler references
    pub fn std_obj_ref(&self) -> Option<&StdObjRef> {
        match &self.kind {
            ObjRefKind::Standard(s) => Some(&s.std),
            ObjRefKind::Handler(h) => Some(&h.std),
            ObjRefKind::Custom(_) => None,
        }
    }

    pub fn ipid(&self) -> Option<Ipid> {
        self.std_obj_ref().map(|std| std.ipid)
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut w = NdrWriter::new(NdrContext::new());
        w.write_param(self)?;
        Ok(w.finish()?)
    }

    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let mut r = NdrReader::new(data, NdrContext::new());
        let signature = r.read_u32()?;
        if signature != OBJREF_SIGNATURE {
            return Err(DcomError::InvalidObjRef(format!(
                "invalid signature: expected 0x{:08x}, got 0x{:08x}",
                OBJREF_SIGNATURE, signature
            )));
        }
        let flags = r.read_u32()?;
        let iid = r.read_uuid()?;

        let kind = match flags {
            objref_flags::OBJREF_STANDARD => ObjRefKind::Standard(ObjRefStandard {
                std: r.read_owned()?,
                resolver_addr: r.read_owned()?,
            }),
            objref_flags::OBJREF_HANDLER => ObjRefKind::Handler(ObjRefHandler {
                std: r.read_owned()?,
                handler_clsid: r.read_uuid()?,
                resolver_addr: r.read_owned()?,
            }),
            objref_flags::OBJREF_CUSTOM => {
                let clsid = r.read_uuid()?;
                let cb_extension = r.read_u32()?;
                let size = r.read_u32()?;
                let size = r.check_count(size, 1)?;
                ObjRefKind::Custom(ObjRefCustom {
                    clsid,
                    cb_extension,
                    data: r.read_bytes(size)?,
                })
            }
            _ => {
                return Err(DcomError::InvalidObjRef(format!(
                    "unknown OBJREF flags: 0x{:08x}",
                    flags
                )))
            }
        };
        Ok(Self { iid, kind })
    }
}

impl NdrEncode for ObjRef {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u32(OBJREF_SIGNATURE);
        w.write_u32(self.flags());
        w.write_uuid(self.iid);
        match &self.kind {
            ObjRefKind::Standard(s) => {
                s.std.ndr_encode(w)?;
                s.resolver_addr.ndr_encode(w)
            }
            ObjRefKind::Handler(h) => {
                h.std.ndr_encode(w)?;
                w.write_uuid(h.handler_clsid);
                h.resolver_addr.ndr_encode(w)
            }
            ObjRefKind::Custom(c) => {
                w.write_uuid(c.clsid);
                w.write_u32(c.cb_extension);
                w.write_u32(c.data.len() as u32);
                w.write_bytes(&c.data);
                Ok(())
            }
        }
    }
}

/// `MInterfacePointer`: an OBJREF as a conformant byte array
///
/// Wire format:
/// ```text
/// max_count: u32     # hoisted conformance, equal to ulCntData
/// ulCntData: u32
/// abData[ulCntData]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfacePointer {
    pub data: Bytes,
}

impl InterfacePointer {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    pub fn from_objref(objref: &ObjRef) -> Result<Self> {
        Ok(Self::new(objref.to_bytes()?))
    }

    pub fn objref(&self) -> Result<ObjRef> {
        ObjRef::from_bytes(self.data.clone())
    }
}

impl NdrEncode for InterfacePointer {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let len = u32::try_from(self.data.len()).map_err(|_| NdrError::LengthOverflow(self.data.len()))?;
        w.write_conformance(len);
        w.write_u32(len);
        w.write_bytes(&self.data);
        Ok(())
    }
}

impl NdrDecode for InterfacePointer {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        let max_count = r.read_conformance()?;
        let size = r.read_u32()?;
        if size != max_count {
            return Err(NdrError::ArraySizeMismatch {
                expected: max_count as usize,
                got: size as usize,
            });
        }
        let size = r.check_count(size, 1)?;
        self.data = r.read_bytes(size)?;
        Ok(())
    }
}
