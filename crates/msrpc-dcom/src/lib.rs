//! DCOM call plumbing on top of the NDR engine
//!
//! This crate carries typed DCOM calls between an interface client and the
//! object implementing it, following MS-DCOM and MS-OAUT.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Interface bindings (clients, server traits, routers)        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  invoker              │  router             │  frame         │
//! │  - ClientBase         │  - Dispatch levels  │  - Request     │
//! │  - IPID resolution    │  - opnum lookup     │  - Response    │
//! │  - status -> error    │  - fault mapping    │  - Operation   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  conn: Connection / Transport          loopback (in-process) │
//! ├──────────────────────────────────────────────────────────────┤
//! │  types (ORPCTHIS, OBJREF, ...)   oaut (BSTR, VARIANT, ...)   │
//! ├──────────────────────────────────────────────────────────────┤
//! │                   NDR engine (msrpc-ndr crate)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - **Method**: one operation of an interface, with its opnum and the
//!   `[in]`/`[out]` parameter structures
//! - **Frame**: a request and its response, seen by the server as an
//!   [`Operation`]
//! - **Level**: the part of an opnum table owned by one interface of an
//!   inheritance chain
//! - **IPID**: Interface Pointer ID, the object a call is addressed to

pub mod conn;
pub mod error;
pub mod frame;
pub mod hresult;
pub mod invoker;
pub mod loopback;
pub mod oaut;
pub mod router;
pub mod types;

pub use conn::{CallContext, CallOptions, Connection, RpcCall, Transport};
pub use error::{CallError, CallResult, DcomError, Result};
pub use frame::{
    AfterPrepareRequest, AfterPrepareResponse, Frame, Method, Operation, Params, Property, Request, Response,
};
pub use hresult::Hresult;
pub use invoker::{connect_syntax, ClientBase, ClientConfig, InterfaceClient};
pub use loopback::{LoopbackConfig, LoopbackConnection, LoopbackStats, LoopbackTransport};
pub use oaut::{BStr, LpSafeArray, SafeArray, SafeArrayBound, SafeArrayData, Variant};
pub use router::{dispatch_method, Dispatch, Router};
pub use types::{
    ComVersion, DualStringArray, InterfacePointer, Ipid, ObjRef, ObjRefStandard, Oid, OrpcThat, OrpcThis, Oxid,
    StdObjRef, StringBinding, SyntaxId,
};

/// DCOM version supported by this implementation
pub const DCOM_VERSION: ComVersion = ComVersion::DCOM_5_7;
