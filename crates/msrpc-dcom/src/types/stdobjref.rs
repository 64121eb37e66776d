//! STDOBJREF structure (MS-DCOM 2.2.18.2)
//!
//! Standard Object Reference - the core structure that identifies
//! a marshaled interface pointer.

use msrpc_ndr::{NdrDecode, NdrEncode, NdrReader, NdrWriter};

use super::identifiers::{Ipid, Oid, Oxid};

/// STDOBJREF flags (SORF_*)
pub mod flags {
    /// No flags
    pub const SORF_NULL: u32 = 0x0000_0000;
    /// The object does not need to be pinged
    pub const SORF_NOPING: u32 = 0x0000_1000;
}

/// Standard Object Reference (40 bytes)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StdObjRef {
    /// SORF_* flags
    pub flags: u32,
    /// Number of public references held
    pub public_refs: u32,
    pub oxid: Oxid,
    pub oid: Oid,
    pub ipid: Ipid,
}

impl StdObjRef {
    /// Size in bytes (4 + 4 + 8 + 8 + 16 = 40)
    pub const SIZE: usize = 40;

    pub fn new(oxid: Oxid, oid: Oid, ipid: Ipid, public_refs: u32) -> Self {
        Self {
            flags: flags::SORF_NULL,
            public_refs,
            oxid,
            oid,
            ipid,
        }
    }

    /// A reference that the holder never pings
    pub fn new_noping(oxid: Oxid, oid: Oid, ipid: Ipid, public_refs: u32) -> Self {
        Self {
            flags: flags::SORF_NOPING,
            ..Self::new(oxid, oid, ipid, public_refs)
        }
    }

    pub fn requires_pinging(&self) -> bool {
        (self.flags & flags::SORF_NOPING) == 0
    }
}

impl NdrEncode for StdObjRef {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u32(self.flags);
        w.write_u32(self.public_refs);
        self.oxid.ndr_encode(w)?;
        self.oid.ndr_encode(w)?;
        self.ipid.ndr_encode(w)
    }
}

impl NdrDecode for StdObjRef {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.flags = r.read_u32()?;
        self.public_refs = r.read_u32()?;
        self.oxid = Oxid(r.read_u64()?);
        self.oid = Oid(r.read_u64()?);
        self.ipid = Ipid(r.read_uuid()?);
        Ok(())
    }
}
