//! IDispatch (MS-OAUT 3.1.4)
//!
//! Only the type-information and name-lookup methods are bound. Opnums 0-2
//! belong to IUnknown and are never remoted; `Invoke` (6) is not bound, so
//! the level answers it as unrecognized.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_dcom::types::iid;
use msrpc_dcom::{
    dispatch_method, AfterPrepareRequest, CallContext, CallOptions, CallResult, ClientBase, DcomError, Dispatch,
    InterfaceClient, InterfacePointer, Ipid, Operation, Params, Property, Request, Response, Result, Router, SyntaxId,
};
use msrpc_ndr::{NdrContext, NdrDecode, NdrError, NdrReader, NdrWriter, PointerKind};
use uuid::Uuid;

pub const SYNTAX: SyntaxId = SyntaxId::new(iid::IDISPATCH, 0, 0);

/// First opnum owned by IDispatch
pub const FIRST_OPNUM: u16 = 3;

pub mod opnum {
    pub const GET_TYPE_INFO_COUNT: u16 = 3;
    pub const GET_TYPE_INFO: u16 = 4;
    pub const GET_IDS_OF_NAMES: u16 = 5;
}

/// `GetTypeInfo` in-parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetTypeInfoIn {
    pub type_info_index: u32,
    pub lcid: u32,
}

impl Params for GetTypeInfoIn {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_param(&self.type_info_index)?;
        w.write_param(&self.lcid)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_param(&mut self.type_info_index)?;
        r.read_param(&mut self.lcid)
    }
}

/// `GetTypeInfo` out-parameters: an `ITypeInfo` interface pointer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetTypeInfoOut {
    pub type_info: Option<InterfacePointer>,
}

impl Params for GetTypeInfoOut {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_pointer_param(self.type_info.as_ref(), PointerKind::Unique)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_pointer_param(&mut self.type_info, PointerKind::Unique)
    }
}

/// `GetIDsOfNames` in-parameters
///
/// `names_count` is the `size_is` of `names`; the request hook fills it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetIdsOfNamesIn {
    pub riid: Uuid,
    pub names: Vec<String>,
    pub names_count: u32,
    pub lcid: u32,
}

impl GetIdsOfNamesIn {
    pub fn new(names: Vec<String>, lcid: u32) -> Self {
        Self {
            names,
            lcid,
            ..Default::default()
        }
    }
}

impl AfterPrepareRequest for GetIdsOfNamesIn {
    fn after_prepare_request(&mut self) -> Result<()> {
        self.names_count =
            u32::try_from(self.names.len()).map_err(|_| NdrError::LengthOverflow(self.names.len()))?;
        Ok(())
    }
}

impl Params for GetIdsOfNamesIn {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        if self.names.len() != self.names_count as usize {
            return Err(NdrError::ArraySizeMismatch {
                expected: self.names_count as usize,
                got: self.names.len(),
            });
        }
        w.write_param(&self.riid)?;
        // [in, size_is(cNames)] LPOLESTR*: unique string per element
        w.write_conformance(self.names_count);
        w.write_elements_with(&self.names, |w, name| w.write_pointer(Some(name), PointerKind::Unique))?;
        w.write_deferred()?;
        w.write_param(&self.names_count)?;
        w.write_param(&self.lcid)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.riid = r.read_uuid()?;
        let count = r.read_conformance()?;
        r.read_elements_with(&mut self.names, count, 4, |r, name| {
            if r.read_referent(PointerKind::Unique)? != 0 {
                r.defer(move |r| name.ndr_decode(r));
            }
            Ok(())
        })?;
        r.read_deferred()?;
        self.names_count = r.read_u32()?;
        if self.names_count != count {
            return Err(NdrError::ArraySizeMismatch {
                expected: self.names_count as usize,
                got: count as usize,
            });
        }
        self.lcid = r.read_u32()?;
        Ok(())
    }

    fn request_hooks(&mut self) -> Option<&mut dyn AfterPrepareRequest> {
        Some(self)
    }
}

/// `GetIDsOfNames` out-parameters: one DISPID per name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetIdsOfNamesOut {
    pub disp_ids: Vec<i32>,
}

impl Params for GetIdsOfNamesOut {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_param(&self.disp_ids)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_param(&mut self.disp_ids)
    }
}

methods! {
    "IDispatch" {
        GetTypeInfoCount = opnum::GET_TYPE_INFO_COUNT, () => Property<u32>;
        GetTypeInfo = opnum::GET_TYPE_INFO, GetTypeInfoIn => GetTypeInfoOut;
        GetIdsOfNames = opnum::GET_IDS_OF_NAMES, GetIdsOfNamesIn => GetIdsOfNamesOut;
    }
}

/// Server side of IDispatch
#[async_trait]
pub trait DispatchServer: Send + Sync + 'static {
    async fn get_type_info_count(
        &self,
        ctx: &CallContext,
        request: Request<GetTypeInfoCount>,
    ) -> Result<Response<GetTypeInfoCount>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_type_info(&self, ctx: &CallContext, request: Request<GetTypeInfo>) -> Result<Response<GetTypeInfo>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_ids_of_names(
        &self,
        ctx: &CallContext,
        request: Request<GetIdsOfNames>,
    ) -> Result<Response<GetIdsOfNames>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }
}

struct Level<T> {
    server: Arc<T>,
}

#[async_trait]
impl<T: DispatchServer> Dispatch for Level<T> {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>> {
        let server = &self.server;
        match opnum {
            opnum::GET_TYPE_INFO_COUNT => {
                dispatch_method::<GetTypeInfoCount, _, _>(stub, ndr, |req| server.get_type_info_count(ctx, req)).await
            }
            opnum::GET_TYPE_INFO => {
                dispatch_method::<GetTypeInfo, _, _>(stub, ndr, |req| server.get_type_info(ctx, req)).await
            }
            opnum::GET_IDS_OF_NAMES => {
                dispatch_method::<GetIdsOfNames, _, _>(stub, ndr, |req| server.get_ids_of_names(ctx, req)).await
            }
            _ => Ok(None),
        }
    }
}

/// Opnum table of IDispatch
pub fn create_dispatch_router<T: DispatchServer>(server: Arc<T>) -> Router {
    Router::new().level(FIRST_OPNUM, Arc::new(Level { server }))
}

/// Client side of IDispatch
#[derive(Clone, Debug)]
pub struct DispatchClient {
    base: ClientBase,
}

impl DispatchClient {
    pub async fn get_type_info_count(
        &self,
        ctx: &CallContext,
        request: Request<GetTypeInfoCount>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetTypeInfoCount>> {
        self.base.invoke(ctx, request, opts).await
    }

    pub async fn get_type_info(
        &self,
        ctx: &CallContext,
        request: Request<GetTypeInfo>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetTypeInfo>> {
        self.base.invoke(ctx, request, opts).await
    }

    pub async fn get_ids_of_names(
        &self,
        ctx: &CallContext,
        request: Request<GetIdsOfNames>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetIdsOfNames>> {
        self.base.invoke(ctx, request, opts).await
    }
}

impl InterfaceClient for DispatchClient {
    const SYNTAX: SyntaxId = SYNTAX;

    fn from_base(base: ClientBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ClientBase {
        &self.base
    }

    fn with_ipid(&self, ipid: Ipid) -> Self {
        Self {
            base: self.base.with_ipid(ipid),
        }
    }
}
