//! Core DCOM types (MS-DCOM 2.2)
//!
//! - Identifiers: OXID, OID, IPID, syntax identifiers
//! - Object references: OBJREF and its variants, `MInterfacePointer`
//! - String bindings: DUALSTRINGARRAY
//! - ORPC headers: ORPCTHIS, ORPCTHAT

mod identifiers;
mod objref;
mod orpc;
mod stdobjref;
mod stringbinding;

pub use identifiers::{Ipid, Oid, Oxid, SyntaxId};
pub use objref::*;
pub use orpc::*;
pub use stdobjref::*;
pub use stringbinding::*;

/// Well-known interface UUIDs
pub mod iid {
    use uuid::Uuid;

    /// IUnknown
    pub const IUNKNOWN: Uuid = Uuid::from_u128(0x00000000_0000_0000_c000_000000000046);
    /// IDispatch
    pub const IDISPATCH: Uuid = Uuid::from_u128(0x00020400_0000_0000_c000_000000000046);
    /// ITypeInfo
    pub const ITYPEINFO: Uuid = Uuid::from_u128(0x00020401_0000_0000_c000_000000000046);
}
