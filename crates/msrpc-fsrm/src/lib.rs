//! File Server Resource Manager storage module bindings
//!
//! Client proxies, server traits and opnum routers for the interface chain
//!
//! ```text
//! IUnknown (0-2, never remoted)
//!   └─ IDispatch (3-6)
//!        └─ IFsrmObject (7-11)
//!             └─ IFsrmPipelineModuleDefinition (12-30)
//!                  └─ IFsrmStorageModuleDefinition (31-36)
//! ```
//!
//! Each interface module has:
//! - `SYNTAX` and an `opnum` table
//! - one [`Method`](msrpc_dcom::Method) marker per operation
//! - a server trait extending the base interface's trait, with every
//!   method defaulting to `E_NOTIMPL`
//! - a router factory that adds the interface's level on top of its base's
//! - a client that embeds its base client

macro_rules! methods {
    ($iface:literal { $($(#[$meta:meta])* $name:ident = $opnum:expr, $in:ty => $out:ty;)* }) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl msrpc_dcom::Method for $name {
                const OPNUM: u16 = $opnum;
                const NAME: &'static str = concat!("/", $iface, "/v0/", stringify!($name));
                type In = $in;
                type Out = $out;
            }
        )*
    };
}

pub mod idispatch;
pub mod object;
pub mod pipeline;
pub mod storage;
mod types;

pub use idispatch::{create_dispatch_router, DispatchClient, DispatchServer};
pub use object::{create_object_router, ObjectClient, ObjectServer};
pub use pipeline::{create_pipeline_module_definition_router, PipelineModuleDefinitionClient, PipelineModuleDefinitionServer};
pub use storage::{
    create_storage_module_definition_router, StorageModuleDefinitionClient, StorageModuleDefinitionServer,
};
pub use types::*;

/// Server that implements no method at all
///
/// Every call fails with `E_NOTIMPL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedServer;

impl DispatchServer for UnimplementedServer {}
impl ObjectServer for UnimplementedServer {}
impl PipelineModuleDefinitionServer for UnimplementedServer {}
impl StorageModuleDefinitionServer for UnimplementedServer {}
