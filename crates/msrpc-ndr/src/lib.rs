//! NDR (Network Data Representation) marshaling engine
//!
//! This crate implements the NDR wire format of DCE RPC and MS-RPCE as used
//! by MSRPC and DCOM interface bindings.
//!
//! # NDR Wire Format
//!
//! NDR is the standard encoding for DCE RPC data. Key characteristics:
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes)
//! - Embedded pointers are written as referent IDs; their pointees follow
//!   the immediate part of the containing value, in encounter order
//! - Conformant data (arrays with runtime-determined size) comes at the end
//! - Strings are conformant varying arrays with null terminator
//!
//! Values marshal through [`NdrWriter`] and unmarshal in place through
//! [`NdrReader`]. Both keep a deferred queue for pointees, flushed once per
//! top-level parameter by [`NdrWriter::write_param`] and
//! [`NdrReader::read_param`].

mod arrays;
mod context;
mod decode;
mod encode;
mod enums;
mod error;
mod pointers;
mod primitives;
mod reader;
mod strings;
mod unions;
mod writer;

pub use arrays::{ConformantVaryingArray, VaryingArray};
pub use context::{NdrContext, NdrLimits};
pub use decode::NdrDecode;
pub use encode::NdrEncode;
pub use enums::NdrEnum;
pub use error::{NdrError, Result};
pub use pointers::PointerKind;
pub use primitives::{Bool32, VariantBool, VARIANT_FALSE, VARIANT_TRUE};
pub use reader::NdrReader;
pub use strings::{NdrString, Termination};
pub use unions::{NdrUnion, SwitchType};
pub use writer::{NdrWriter, FIRST_REFERENT_ID, REFERENT_ID_STEP};

/// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};
