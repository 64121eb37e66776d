//! IFsrmStorageModuleDefinition (MS-FSRM 3.2.4.2.46)

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_dcom::{
    dispatch_method, CallContext, CallOptions, CallResult, ClientBase, DcomError, Dispatch, InterfaceClient, Ipid,
    Operation, Property, Request, Response, Result, Router, SyntaxId,
};
use msrpc_ndr::{NdrContext, VariantBool};
use tracing::debug;
use uuid::Uuid;

use crate::pipeline::{create_pipeline_module_definition_router, PipelineModuleDefinitionClient, PipelineModuleDefinitionServer};
use crate::types::{FsrmStorageModuleType, StorageModuleCaps};

pub const IID: Uuid = Uuid::from_u128(0x15a81350_497d_4aba_80e9_d4dbcc5521fe);

pub const SYNTAX: SyntaxId = SyntaxId::new(IID, 0, 0);

/// First opnum owned by IFsrmStorageModuleDefinition
pub const FIRST_OPNUM: u16 = 31;

pub mod opnum {
    pub const GET_CAPABILITIES: u16 = 31;
    pub const SET_CAPABILITIES: u16 = 32;
    pub const GET_STORAGE_TYPE: u16 = 33;
    pub const SET_STORAGE_TYPE: u16 = 34;
    pub const GET_UPDATES_FILE_CONTENT: u16 = 35;
    pub const SET_UPDATES_FILE_CONTENT: u16 = 36;
}

methods! {
    "IFsrmStorageModuleDefinition" {
        GetCapabilities = opnum::GET_CAPABILITIES, () => Property<StorageModuleCaps>;
        SetCapabilities = opnum::SET_CAPABILITIES, Property<StorageModuleCaps> => ();
        GetStorageType = opnum::GET_STORAGE_TYPE, () => Property<FsrmStorageModuleType>;
        SetStorageType = opnum::SET_STORAGE_TYPE, Property<FsrmStorageModuleType> => ();
        GetUpdatesFileContent = opnum::GET_UPDATES_FILE_CONTENT, () => Property<VariantBool>;
        SetUpdatesFileContent = opnum::SET_UPDATES_FILE_CONTENT, Property<VariantBool> => ();
    }
}

/// Server side of IFsrmStorageModuleDefinition
#[async_trait]
pub trait StorageModuleDefinitionServer: PipelineModuleDefinitionServer {
    async fn get_capabilities(&self, ctx: &CallContext, request: Request<GetCapabilities>) -> Result<Response<GetCapabilities>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_capabilities(&self, ctx: &CallContext, request: Request<SetCapabilities>) -> Result<Response<SetCapabilities>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_storage_type(&self, ctx: &CallContext, request: Request<GetStorageType>) -> Result<Response<GetStorageType>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_storage_type(&self, ctx: &CallContext, request: Request<SetStorageType>) -> Result<Response<SetStorageType>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn get_updates_file_content(
        &self,
        ctx: &CallContext,
        request: Request<GetUpdatesFileContent>,
    ) -> Result<Response<GetUpdatesFileContent>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }

    async fn set_updates_file_content(
        &self,
        ctx: &CallContext,
        request: Request<SetUpdatesFileContent>,
    ) -> Result<Response<SetUpdatesFileContent>> {
        let _ = (ctx, request);
        Err(DcomError::NotImplemented)
    }
}

struct Level<T> {
    server: Arc<T>,
}

#[async_trait]
impl<T: StorageModuleDefinitionServer> Dispatch for Level<T> {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>> {
        let s = &self.server;
        match opnum {
            opnum::GET_CAPABILITIES => dispatch_method::<GetCapabilities, _, _>(stub, ndr, |req| s.get_capabilities(ctx, req)).await,
            opnum::SET_CAPABILITIES => dispatch_method::<SetCapabilities, _, _>(stub, ndr, |req| s.set_capabilities(ctx, req)).await,
            opnum::GET_STORAGE_TYPE => dispatch_method::<GetStorageType, _, _>(stub, ndr, |req| s.get_storage_type(ctx, req)).await,
            opnum::SET_STORAGE_TYPE => dispatch_method::<SetStorageType, _, _>(stub, ndr, |req| s.set_storage_type(ctx, req)).await,
            opnum::GET_UPDATES_FILE_CONTENT => {
                dispatch_method::<GetUpdatesFileContent, _, _>(stub, ndr, |req| s.get_updates_file_content(ctx, req)).await
            }
            opnum::SET_UPDATES_FILE_CONTENT => {
                dispatch_method::<SetUpdatesFileContent, _, _>(stub, ndr, |req| s.set_updates_file_content(ctx, req)).await
            }
            _ => {
                debug!("IFsrmStorageModuleDefinition: no method at opnum {}", opnum);
                Ok(None)
            }
        }
    }
}

/// Opnum table of IFsrmStorageModuleDefinition and its bases
pub fn create_storage_module_definition_router<T: StorageModuleDefinitionServer>(server: Arc<T>) -> Router {
    create_pipeline_module_definition_router(Arc::clone(&server)).level(FIRST_OPNUM, Arc::new(Level { server }))
}

/// Client side of IFsrmStorageModuleDefinition
#[derive(Clone, Debug)]
pub struct StorageModuleDefinitionClient {
    pipeline_module_definition: PipelineModuleDefinitionClient,
}

impl StorageModuleDefinitionClient {
    /// The embedded IFsrmPipelineModuleDefinition client
    pub fn pipeline_module_definition(&self) -> &PipelineModuleDefinitionClient {
        &self.pipeline_module_definition
    }

    pub async fn get_capabilities(
        &self,
        ctx: &CallContext,
        request: Request<GetCapabilities>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetCapabilities>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_capabilities(
        &self,
        ctx: &CallContext,
        request: Request<SetCapabilities>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetCapabilities>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_storage_type(
        &self,
        ctx: &CallContext,
        request: Request<GetStorageType>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetStorageType>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_storage_type(
        &self,
        ctx: &CallContext,
        request: Request<SetStorageType>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetStorageType>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn get_updates_file_content(
        &self,
        ctx: &CallContext,
        request: Request<GetUpdatesFileContent>,
        opts: &CallOptions,
    ) -> CallResult<Response<GetUpdatesFileContent>> {
        self.base().invoke(ctx, request, opts).await
    }

    pub async fn set_updates_file_content(
        &self,
        ctx: &CallContext,
        request: Request<SetUpdatesFileContent>,
        opts: &CallOptions,
    ) -> CallResult<Response<SetUpdatesFileContent>> {
        self.base().invoke(ctx, request, opts).await
    }
}

impl InterfaceClient for StorageModuleDefinitionClient {
    const SYNTAX: SyntaxId = SYNTAX;

    fn from_base(base: ClientBase) -> Self {
        Self {
            pipeline_module_definition: PipelineModuleDefinitionClient::from_base(base),
        }
    }

    fn base(&self) -> &ClientBase {
        self.pipeline_module_definition.base()
    }

    fn with_ipid(&self, ipid: Ipid) -> Self {
        Self {
            pipeline_module_definition: self.pipeline_module_definition.with_ipid(ipid),
        }
    }
}
