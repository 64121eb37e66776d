//! Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use msrpc_dcom::oaut::{BStr, LpSafeArray, SafeArray};
use msrpc_dcom::{
    CallContext, DcomError, Hresult, InterfaceClient, Ipid, LoopbackConfig, LoopbackTransport, Property, Request,
    Response, Result, Transport,
};
use msrpc_fsrm::idispatch::DispatchServer;
use msrpc_fsrm::object::{self, ObjectServer};
use msrpc_fsrm::pipeline::{self, PipelineModuleDefinitionServer};
use msrpc_fsrm::storage::{self, StorageModuleDefinitionServer};
use msrpc_fsrm::{
    create_storage_module_definition_router, FsrmAccountType, FsrmPipelineModuleType, FsrmStorageModuleType,
    StorageModuleCaps, StorageModuleDefinitionClient,
};
use msrpc_ndr::VariantBool;
use parking_lot::Mutex;
use uuid::Uuid;

/// Initialize logging for tests
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("msrpc_dcom=debug".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

/// Mutable properties of the fixture module
#[derive(Debug, Clone)]
pub struct ModuleState {
    pub name: BStr,
    pub description: BStr,
    pub enabled: bool,
    pub account: FsrmAccountType,
    pub extensions: Option<SafeArray>,
    pub caps: StorageModuleCaps,
    pub storage_type: FsrmStorageModuleType,
}

impl Default for ModuleState {
    fn default() -> Self {
        Self {
            name: BStr::from("Test Storage Module"),
            description: BStr::default(),
            enabled: true,
            account: FsrmAccountType::LocalSystem,
            extensions: None,
            caps: StorageModuleCaps::CAN_GET | StorageModuleCaps::CAN_HANDLE_FILES,
            storage_type: FsrmStorageModuleType::Database,
        }
    }
}

/// In-memory storage module definition
///
/// Records the name of every method it runs. `Commit` blocks until the
/// call is cancelled.
pub struct FixtureModule {
    pub id: Uuid,
    pub state: Mutex<ModuleState>,
    calls: Mutex<Vec<&'static str>>,
    pub call_count: AtomicU64,
}

impl FixtureModule {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Mutex::new(ModuleState::default()),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record<M: msrpc_dcom::Method>(&self) {
        self.calls.lock().push(M::NAME);
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for FixtureModule {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchServer for FixtureModule {}

#[async_trait]
impl ObjectServer for FixtureModule {
    async fn get_id(&self, _ctx: &CallContext, _request: Request<object::GetId>) -> Result<Response<object::GetId>> {
        self.record::<object::GetId>();
        Ok(Response::new(Property::new(self.id)))
    }

    async fn get_description(
        &self,
        _ctx: &CallContext,
        _request: Request<object::GetDescription>,
    ) -> Result<Response<object::GetDescription>> {
        self.record::<object::GetDescription>();
        Ok(Response::new(Property::new(self.state.lock().description.clone())))
    }

    async fn set_description(
        &self,
        _ctx: &CallContext,
        request: Request<object::SetDescription>,
    ) -> Result<Response<object::SetDescription>> {
        self.record::<object::SetDescription>();
        self.state.lock().description = request.params.value;
        Ok(Response::new(()))
    }

    async fn commit(&self, ctx: &CallContext, _request: Request<object::Commit>) -> Result<Response<object::Commit>> {
        self.record::<object::Commit>();
        tokio::select! {
            _ = ctx.cancelled() => Err(DcomError::Cancelled),
            _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(Response::new(())),
        }
    }
}

#[async_trait]
impl PipelineModuleDefinitionServer for FixtureModule {
    async fn get_name(&self, _ctx: &CallContext, _request: Request<pipeline::GetName>) -> Result<Response<pipeline::GetName>> {
        self.record::<pipeline::GetName>();
        Ok(Response::new(Property::new(self.state.lock().name.clone())))
    }

    async fn set_name(&self, _ctx: &CallContext, request: Request<pipeline::SetName>) -> Result<Response<pipeline::SetName>> {
        self.record::<pipeline::SetName>();
        if request.params.value.as_str().is_empty() {
            return Ok(Response::with_status((), Hresult::FSRM_E_INVALID_NAME));
        }
        self.state.lock().name = request.params.value;
        Ok(Response::new(()))
    }

    async fn get_module_type(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetModuleType>,
    ) -> Result<Response<pipeline::GetModuleType>> {
        self.record::<pipeline::GetModuleType>();
        Ok(Response::new(Property::new(FsrmPipelineModuleType::Storage)))
    }

    async fn get_enabled(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetEnabled>,
    ) -> Result<Response<pipeline::GetEnabled>> {
        self.record::<pipeline::GetEnabled>();
        Ok(Response::new(Property::new(VariantBool(self.state.lock().enabled))))
    }

    async fn set_enabled(
        &self,
        _ctx: &CallContext,
        request: Request<pipeline::SetEnabled>,
    ) -> Result<Response<pipeline::SetEnabled>> {
        self.record::<pipeline::SetEnabled>();
        self.state.lock().enabled = request.params.value.into();
        Ok(Response::new(()))
    }

    async fn get_account(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetAccount>,
    ) -> Result<Response<pipeline::GetAccount>> {
        self.record::<pipeline::GetAccount>();
        Ok(Response::new(Property::new(self.state.lock().account)))
    }

    async fn set_account(
        &self,
        _ctx: &CallContext,
        request: Request<pipeline::SetAccount>,
    ) -> Result<Response<pipeline::SetAccount>> {
        self.record::<pipeline::SetAccount>();
        self.state.lock().account = request.params.value;
        Ok(Response::new(()))
    }

    async fn get_supported_extensions(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetSupportedExtensions>,
    ) -> Result<Response<pipeline::GetSupportedExtensions>> {
        self.record::<pipeline::GetSupportedExtensions>();
        let extensions = self.state.lock().extensions.clone();
        Ok(Response::new(Property::new(LpSafeArray(extensions))))
    }

    async fn set_supported_extensions(
        &self,
        _ctx: &CallContext,
        request: Request<pipeline::SetSupportedExtensions>,
    ) -> Result<Response<pipeline::SetSupportedExtensions>> {
        self.record::<pipeline::SetSupportedExtensions>();
        self.state.lock().extensions = request.params.value;
        Ok(Response::new(()))
    }
}

#[async_trait]
impl StorageModuleDefinitionServer for FixtureModule {
    async fn get_capabilities(
        &self,
        _ctx: &CallContext,
        _request: Request<storage::GetCapabilities>,
    ) -> Result<Response<storage::GetCapabilities>> {
        self.record::<storage::GetCapabilities>();
        Ok(Response::new(Property::new(self.state.lock().caps)))
    }

    async fn get_storage_type(
        &self,
        _ctx: &CallContext,
        _request: Request<storage::GetStorageType>,
    ) -> Result<Response<storage::GetStorageType>> {
        self.record::<storage::GetStorageType>();
        Ok(Response::new(Property::new(self.state.lock().storage_type)))
    }

    async fn set_storage_type(
        &self,
        _ctx: &CallContext,
        request: Request<storage::SetStorageType>,
    ) -> Result<Response<storage::SetStorageType>> {
        self.record::<storage::SetStorageType>();
        if request.params.value == FsrmStorageModuleType::Unknown {
            return Ok(Response::with_status((), Hresult::E_INVALIDARG));
        }
        self.state.lock().storage_type = request.params.value;
        Ok(Response::new(()))
    }
}

/// A storage module exported over loopback, with a client bound to it
pub struct Fixture {
    pub transport: LoopbackTransport,
    pub module: Arc<FixtureModule>,
    pub ipid: Ipid,
    pub client: StorageModuleDefinitionClient,
}

/// Export a fresh [`FixtureModule`] and connect a client to it
pub async fn setup() -> Fixture {
    setup_with_config(LoopbackConfig::default()).await
}

pub async fn setup_with_config(config: LoopbackConfig) -> Fixture {
    let transport = LoopbackTransport::with_config(config);
    let module = Arc::new(FixtureModule::new());
    let ipid = transport.export(storage::SYNTAX, create_storage_module_definition_router(Arc::clone(&module)));

    let ctx = CallContext::new();
    let conn = transport
        .bind(&ctx, storage::SYNTAX)
        .await
        .expect("bind to exported syntax");
    let client = StorageModuleDefinitionClient::connect(&ctx, conn)
        .await
        .expect("connect storage client")
        .with_ipid(ipid);

    Fixture {
        transport,
        module,
        ipid,
        client,
    }
}
