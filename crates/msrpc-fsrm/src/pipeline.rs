//! IFsrmPipelineModuleDefinition (MS-FSRM 3.2.4.2.44)

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_dcom::oaut::{BStr, LpSafeArray};
use msrpc_dcom::{
    dispatch_method, CallContext, CallOptions, CallResult, ClientBase, DcomError, Dispatch, InterfaceClient, Ipid,
    Operation, Property, Request, Response, Result, Router, SyntaxId,
};
use msrpc_ndr::{NdrContext, VariantBool};
use uuid::Uuid;

use crate::object::{create_object_router, ObjectClient, ObjectServer};
use crate::types::{FsrmAccountType, FsrmPipelineModuleType, SafeArrayProperty};

pub const IID: Uuid = Uuid::from_u128(0x515c1277_2c81_440e_8fcf_367921ed4f59);

pub const SYNTAX: SyntaxId = SyntaxId::new(IID, 0, 0);

/// First opnum owned by IFsrmPipelineModuleDefinition
pub const FIRST_OPNUM: u16 = 12;

pub mod opnum {
    pub const GET_MODULE_CLSID: u16 = 12;
    pub const SET_MODULE_CLSID: u16 = 13;
    pub const GET_NAME: u16 = 14;
    pub const SET_NAME: u16 = 15;
    pub const GET_COMPANY: u16 = 16;
    pub const SET_COMPANY: u16 = 17;
    pub const GET_VERSION: u16 = 18;
    pub const SET_VERSION: u16 = 19;
    pub const GET_MODULE_TYPE: u16 = 20;
    pub const GET_ENABLED: u16 = 21;
    pub const SET_ENABLED: u16 = 22;
    pub const GET_NEEDS_FILE_CONTENT: u16 = 23;
    pub const SET_NEEDS_FILE_CONTENT: u16 = 24;
    pub const GET_ACCOUNT: u16 = 25;
    pub const SET_ACCOUNT: u16 = 26;
    pub const GET_SUPPORTED_EXTENSIONS: u16 = 27;
    pub const SET_SUPPORTED_EXTENSIONS: u16 = 28;
    pub const GET_PARAMETERS: u16 = 29;
    pub const SET_PARAMETERS: u16 = 30;
}

methods! {
    "IFsrmPipelineModuleDefinition" {
        /// CLSID of the module, as a string
        GetModuleClsid = opnum::GET_MODULE_CLSID, () => Property<BStr>;
        SetModuleClsid = opnum::SET_MODULE_CLSID, Property<BStr> => ();
        GetName = opnum::GET_NAME, () => Property<BStr>;
        SetName = opnum::SET_NAME, Property<BStr> => ();
        GetCompany = opnum::GET_COMPANY, () => Property<BStr>;
        SetCompany = opnum::SET_COMPANY, Property<BStr> => ();
        GetVersion = opnum::GET_VERSION, () => Property<BStr>;
        SetVersion = opnum::SET_VERSION, Property<BStr> => ();
        GetModuleType = opnum::GET_MODULE_TYPE, () => Property<FsrmPipelineModuleType>;
        GetEnabled = opnum::GET_ENABLED, () => Property<VariantBool>;
        SetEnabled = opnum::SET_ENABLED, Property<VariantBool> => ();
        GetNeedsFileContent = opnum::GET_NEEDS_FILE_CONTENT, () => Property<VariantBool>;
        SetNeedsFileContent = opnum::SET_NEEDS_FILE_CONTENT, Property<VariantBool> => ();
        GetAccount = opnum::GET_ACCOUNT, () => Property<FsrmAccountType>;
        SetAccount = opnum::SET_ACCOUNT, Property<FsrmAccountType> => ();
        /// File extensions the module handles, a SAFEARRAY of VARIANT
        GetSupportedExtensions = opnum::GET_SUPPORTED_EXTENSIONS, () => Property<LpSafeArray>;
        SetSupportedExtensions = opnum::SET_SUPPORTED_EXTENSIONS, SafeArrayProperty => ();
        /// `name=value` parameters, a SAFEARRAY of VARIANT
        GetParameters = opnum::GET_PARAMETERS, () => Property<LpSafeArray>;
        SetParameters = opnum::SET_PARAMETERS, SafeArrayProperty => ();
    }
}

/// Server side of IFsrmPipelineModuleDefinition
#[async_trait]
pub trait PipelineModuleDefinitionServer: ObjectServer {
    async fn get_module_clsid(&self, ctx: &CallContext, request: Request<GetModuleClsid>) -> Result<Response<GetModuleClsid>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_module_clsid(&self, ctx: &CallContext, request: Request<SetModuleClsid>) -> Result<Response<SetModuleClsid>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_name(&self, ctx: &CallContext, request: Request<GetName>) -> Result<Response<GetName>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_name(&self, ctx: &CallContext, request: Request<SetName>) -> Result<Response<SetName>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_company(&self, ctx: &CallContext, request: Request<GetCompany>) -> Result<Response<GetCompany>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_company(&self, ctx: &CallContext, request: Request<SetCompany>) -> Result<Response<SetCompany>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_version(&self, ctx: &CallContext, request: Request<GetVersion>) -> Result<Response<GetVersion>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_version(&self, ctx: &CallContext, request: Request<SetVersion>) -> Result<Response<SetVersion>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_module_type(&self, ctx: &CallContext, request: Request<GetModuleType>) -> Result<Response<GetModuleType>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_enabled(&self, ctx: &CallContext, request: Request<GetEnabled>) -> Result<Response<GetEnabled>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_enabled(&self, ctx: &CallContext, request: Request<SetEnabled>) -> Result<Response<SetEnabled>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_needs_file_content(
        &self,
        ctx: &CallContext,
        request: Request<GetNeedsFileContent>,
    ) -> Result<Response<GetNeedsFileContent>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_needs_file_content(
        &self,
        ctx: &CallContext,
        request: Request<SetNeedsFileContent>,
    ) -> Result<Response<SetNeedsFileContent>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_account(&self, ctx: &CallContext, request: Request<GetAccount>) -> Result<Response<GetAccount>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_account(&self, ctx: &CallContext, request: Request<SetAccount>) -> Result<Response<SetAccount>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_supported_extensions(
        &self,
        ctx: &CallContext,
        request: Request<GetSupportedExtensions>,
    ) -> Result<Response<GetSupportedExtensions>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_supported_extensions(
        &self,
        ctx: &CallContext,
        request: Request<SetSupportedExtensions>,
    ) -> Result<Response<SetSupportedExtensions>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_parameters(&self, ctx: &CallContext, request: Request<GetParameters>) -> Result<Response<GetParameters>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_parameters(&self, ctx: &CallContext, request: Request<SetParameters>) -> Result<Response<SetParameters>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }
}

struct Level<T> {
    server: Arc<T>,
}

#[async_trait]
impl<T: PipelineModuleDefinitionServer> Dispatch for Level<T> {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>> {
        let s = &self.server;
        match opnum {
            opnum::GET_MODULE_CLSID => dispatch_method::<GetModuleClsid, _, _>(stub, ndr, |req| s.get_module_clsid(ctx, req)).await,
            opnum::SET_MODULE_CLSID => dispatch_method::<SetModuleClsid, _, _>(stub, ndr, |req| s.set_module_clsid(ctx, req)).await,
            opnum::GET_NAME => dispatch_method::<GetName, _, _>(stub, ndr, |req| s.get_name(ctx, req)).await,
            opnum::SET_NAME => dispatch_method::<SetName, _, _>(stub, ndr, |req| s.set_name(ctx, req)).await,
            opnum::GET_COMPANY => dispatch_method::<GetCompany, _, _>(stub, ndr, |req| s.get_company(ctx, req)).await,
            opnum::SET_COMPANY => dispatch_method::<SetCompany, _, _>(stub, ndr, |req| s.set_company(ctx, req)).await,
            opnum::GET_VERSION => dispatch_method::<GetVersion, _, _>(stub, ndr, |req| s.get_version(ctx, req)).await,
            opnum::SET_VERSION => dispatch_method::<SetVersion, _, _>(stub, ndr, |req| s.set_version(ctx, req)).await,
            opnum::GET_MODULE_TYPE => dispatch_method::<GetModuleType, _, _>(stub, ndr, |req| s.get_module_type(ctx, req)).await,
            opnum::GET_ENABLED => dispatch_method::<GetEnabled, _, _>(stub, ndr, |req| s.get_enabled(ctx, req)).await,
            opnum::SET_ENABLED => dispatch_method::<SetEnabled, _, _>(stub, ndr, |req| s.set_enabled(ctx, req)).await,
            opnum::GET_NEEDS_FILE_CONTENT => {
                dispatch_method::<GetNeedsFileContent, _, _>(stub, ndr, |req| s.get_needs_file_content(ctx, req)).await
            }
            opnum::SET_NEEDS_FILE_CONTENT => {
                dispatch_method::<SetNeedsFileContent, _, _>(stub, ndr, |req| s.set_needs_file_content(ctx, req)).await
            }
            opnum::GET_ACCOUNT => dispatch_method::<GetAccount, _, _>(stub, ndr, |req| s.get_account(ctx, req)).await,
            opnum::SET_ACCOUNT => dispatch_method::<SetAccount, _, _>(stub, ndr, |req| s.set_account(ctx, req)).await,
            opnum::GET_SUPPORTED_EXTENSIONS => {
                dispatch_method::<GetSupportedExtensions, _, _>(stub, ndr, |req| s.get_supported_extensions(ctx, req)).await
            }
            opnum::SET_SUPPORTED_EXTENSIONS => {
                dispatch_method::<SetSupportedExtensions, _, _>(stub, ndr, |req| s.set_supported_extensions(ctx, req)).await
            }
            opnum::GET_PARAMETERS => dispatch_method::<GetParameters, _, _>(stub, ndr, |req| s.get_parameters(ctx, req)).await,
            opnum::SET_PARAMETERS => dispatch_method::<SetParameters, _, _>(stub, ndr, |req| s.set_parameters(ctx, req)).await,
            _ => Ok(None),
        }
    }
}

/// Opnum table of IFsrmPipelineModuleDefinition and its bases
pub fn create_pipeline_module_definition_router<T: PipelineModuleDefinitionServer>(server: Arc<T>) -> Router {
    create_object_router(Arc::clone(&server)).level(FIRST_OPNUM, Arc::new(Level { server }))
}

/// Client side of IFsrmPipelineModuleDefinition
#[derive(Clone, Debug)]
pub struct PipelineModuleDefinitionClient {
    object: ObjectClient,
}

impl PipelineModuleDefinitionClient {
    /// The embedded IFsrmObject client
    pub fn object(&self) -> &ObjectClient {
        &self.object
    }

    pub async fn get_module_clsid(
        &self,
        ctx: &CallContext,
        request: Request<GetModuleClsid>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetModuleClsid>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_module_clsid(
        &self,
        ctx: &CallContext,
        request: Request<SetModuleClsid>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetModuleClsid>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_name(&self, ctx: &CallContext, request: Request<GetName>, opts: &CallOptions) -> CallResult<Response<GetName>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_name(&self, ctx: &CallContext, request: Request<SetName>, opts: &CallOptions) -> CallResult<Response<SetName>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_company(
        &self,
        ctx: &CallContext,
        request: Request<GetCompany>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetCompany>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_company(
        &self,
        ctx: &CallContext,
        request: Request<SetCompany>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetCompany>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_version(
        &self,
        ctx: &CallContext,
        request: Request<GetVersion>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetVersion>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_version(
        &self,
        ctx: &CallContext,
        request: Request<SetVersion>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetVersion>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_module_type(
        &self,
        ctx: &CallContext,
        request: Request<GetModuleType>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetModuleType>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_enabled(
        &self,
        ctx: &CallContext,
        request: Request<GetEnabled>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetEnabled>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_enabled(
        &self,
        ctx: &CallContext,
        request: Request<SetEnabled>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetEnabled>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_needs_file_content(
        &self,
        ctx: &CallContext,
        request: Request<GetNeedsFileContent>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetNeedsFileContent>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_needs_file_content(
        &self,
        ctx: &CallContext,
        request: Request<SetNeedsFileContent>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetNeedsFileContent>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_account(
        &self,
        ctx: &CallContext,
        request: Request<GetAccount>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetAccount>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_account(
        &self,
        ctx: &CallContext,
        request: Request<SetAccount>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetAccount>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_supported_extensions(
        &self,
        ctx: &CallContext,
        request: Request<GetSupportedExtensions>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetSupportedExtensions>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_supported_extensions(
        &self,
        ctx: &CallContext,
        request: Request<SetSupportedExtensions>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetSupportedExtensions>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_parameters(
        &self,
        ctx: &CallContext,
        request: Request<GetParameters>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetParameters>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_parameters(
        &self,
        ctx: &CallContext,
        request: Request<SetParameters>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetParameters>> {
        self.base().invoke(ctx, request, opts).await
    }
}

impl InterfaceClient for PipelineModuleDefinitionClient {
    const SYNTAX: SyntaxId = SYNTAX;

    fn from_base(base: ClientBase) -> Self {
        Self {
            object: ObjectClient::from_base(base),
        }
    }

    fn base(&self) -> &ClientBase {
        self.object.base()
    }

    fn with_ipid(&self, ipid: Ipid) -> Self {
        Self {
            object: self.object.with_ipid(ipid),
        }
    }
}
