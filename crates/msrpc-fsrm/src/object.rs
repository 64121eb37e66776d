//! IFsrmObject (MS-FSRM 3.2.4.2)

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_dcom::oaut::BStr;
use msrpc_dcom::{
    dispatch_method, CallContext, CallOptions, CallResult, ClientBase, DcomError, Dispatch, InterfaceClient, Ipid,
    Operation, Property, Request, Response, Result, Router, SyntaxId,
};
use msrpc_ndr::NdrContext;
use uuid::Uuid;

use crate::idispatch::{create_dispatch_router, DispatchClient, DispatchServer};

pub const IID: Uuid = Uuid::from_u128(0x22bcef93_4a3f_4183_89f9_2f8b8a628aee);

pub const SYNTAX: SyntaxId = SyntaxId::new(IID, 0, 0);

/// First opnum owned by IFsrmObject
pub const FIRST_OPNUM: u16 = 7;

pub mod opnum {
    pub const GET_ID: u16 = 7;
    pub const GET_DESCRIPTION: u16 = 8;
    pub const SET_DESCRIPTION: u16 = 9;
    pub const DELETE: u16 = 10;
    pub const COMMIT: u16 = 11;
}

methods! {
    "IFsrmObject" {
        /// `get_Id`: the FSRM object ID
        GetId = opnum::GET_ID, () => Property<Uuid>;
        GetDescription = opnum::GET_DESCRIPTION, () => Property<BStr>;
        SetDescription = opnum::SET_DESCRIPTION, Property<BStr> => ();
        Delete = opnum::DELETE, () => ();
        Commit = opnum::COMMIT, () => ();
    }
}

/// Server side of IFsrmObject
#[async_trait]
pub trait ObjectServer: DispatchServer {
    async fn get_id(&self, ctx: &CallContext, request: Request<GetId>) -> Result<Response<GetId>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_description(
        &self,
        ctx: &CallContext,
        request: Request<GetDescription>,
    ) -> Result<Response<GetDescription>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_description(
        &self,
        ctx: &CallContext,
        request: Request<SetDescription>,
    ) -> Result<Response<SetDescription>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn delete(&self, ctx: &CallContext, request: Request<Delete>) -> Result<Response<Delete>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn commit(&self, ctx: &CallContext, request: Request<Commit>) -> Result<Response<Commit>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }
}

struct Level<T> {
    server: Arc<T>,
}

#[async_trait]
impl<T: ObjectServer> Dispatch for Level<T> {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>> {
        let server = &self.server;
        match opnum {
            opnum::GET_ID => dispatch_method::<GetId, _, _>(stub, ndr, |req| server.get_id(ctx, req)).await,
            opnum::GET_DESCRIPTION => {
                dispatch_method::<GetDescription, _, _>(stub, ndr, |req| server.get_description(ctx, req)).await
            }
            opnum::SET_DESCRIPTION => {
                dispatch_method::<SetDescription, _, _>(stub, ndr, |req| server.set_description(ctx, req)).await
            }
            opnum::DELETE => dispatch_method::<Delete, _, _>(stub, ndr, |req| server.delete(ctx, req)).await,
            opnum::COMMIT => dispatch_method::<Commit, _, _>(stub, ndr, |req| server.commit(ctx, req)).await,
            _ => Ok(None),
        }
    }
}

/// Opnum table of IFsrmObject and its bases
pub fn create_object_router<T: ObjectServer>(server: Arc<T>) -> Router {
    create_dispatch_router(Arc::clone(&server)).level(FIRST_OPNUM, Arc::new(Level { server }))
}

/// Client side of IFsrmObject
#[derive(Clone, Debug)]
pub struct ObjectClient {
    dispatch: DispatchClient,
}

impl ObjectClient {
    /// The embedded IDispatch client
    pub fn dispatch(&self) -> &DispatchClient {
        &self.dispatch
    }

    pub async fn get_id(&self, ctx: &CallContext, request: Request<GetId>, opts: &CallOptions) -> CallResult<Response<GetId>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_description(
        &self,
        ctx: &CallContext,
        request: Request<GetDescription>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetDescription>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_description(
        &self,
        ctx: &CallContext,
        request: Request<SetDescription>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetDescription>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn delete(&self, ctx: &CallContext, request: Request<Delete>, opts: &CallOptions) -> CallResult<Response<Delete>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn commit(&self, ctx: &CallContext, request: Request<Commit>, opts: &CallOptions) -> CallResult<Response<Commit>> {
        self.base().invoke(ctx, request, opts).await
    }
}

impl InterfaceClient for ObjectClient {
    const SYNTAX: SyntaxId = SYNTAX;

    fn from_base(base: ClientBase) -> Self {
        Self {
            dispatch: DispatchClient::from_base(base),
        }
    }

    fn base(&self) -> &ClientBase {
        self.dispatch.base()
    }

    fn with_ipid(&self, ipid: Ipid) -> Self {
        Self {
            dispatch: self.dispatch.with_ipid(ipid),
        }
    }
}
