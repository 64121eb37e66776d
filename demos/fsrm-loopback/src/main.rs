//! FSRM storage module over loopback
//!
//! Exports an in-memory IFsrmStorageModuleDefinition and drives it through
//! the full client and server stack, base interface methods included.
//!
//! Run with: cargo run --bin fsrm-loopback -- --name "Audit Cache" --extensions docx,xlsx

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use parking_lot::Mutex;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use msrpc_dcom::oaut::{BStr, LpSafeArray, SafeArray, SafeArrayData, Variant};
use msrpc_dcom::{
    CallContext, CallOptions, InterfaceClient, LoopbackConfig, LoopbackTransport, Property, Request, Response,
    Result, Transport,
};
use msrpc_fsrm::object::{self, ObjectServer};
use msrpc_fsrm::pipeline::{self, PipelineModuleDefinitionServer};
use msrpc_fsrm::storage::{self, StorageModuleDefinitionServer};
use msrpc_fsrm::{
    create_storage_module_definition_router, DispatchServer, FsrmPipelineModuleType, FsrmStorageModuleType,
    SafeArrayProperty, StorageModuleCaps, StorageModuleDefinitionClient,
};
use msrpc_ndr::VariantBool;

#[derive(Parser)]
#[command(name = "fsrm-loopback")]
#[command(about = "FSRM storage module definition over the loopback transport")]
struct Args {
    /// Module name to set
    #[arg(short, long, default_value = "Loopback Storage Module")]
    name: String,

    /// Supported file extensions, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "txt,log")]
    extensions: Vec<String>,

    /// Marshal with big-endian data representation
    #[arg(long)]
    big_endian: bool,

    /// Log every call
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Default)]
struct ModuleState {
    name: BStr,
    description: BStr,
    enabled: bool,
    extensions: Option<SafeArray>,
    storage_type: FsrmStorageModuleType,
}

/// Storage module definition kept in memory
struct StorageModule {
    id: Uuid,
    state: Mutex<ModuleState>,
}

impl DispatchServer for StorageModule {}

#[async_trait]
impl ObjectServer for StorageModule {
    async fn get_id(&self, _ctx: &CallContext, _request: Request<object::GetId>) -> Result<Response<object::GetId>> {
        Ok(Response::new(Property::new(self.id)))
    }

    async fn get_description(
        &self,
        _ctx: &CallContext,
        _request: Request<object::GetDescription>,
    ) -> Result<Response<object::GetDescription>> {
        Ok(Response::new(Property::new(self.state.lock().description.clone())))
    }

    async fn set_description(
        &self,
        _ctx: &CallContext,
        request: Request<object::SetDescription>,
    ) -> Result<Response<object::SetDescription>> {
        self.state.lock().description = request.params.value;
        Ok(Response::new(()))
    }

    async fn commit(&self, _ctx: &CallContext, _request: Request<object::Commit>) -> Result<Response<object::Commit>> {
        info!("Committed {}", self.state.lock().name);
        Ok(Response::new(()))
    }
}

#[async_trait]
impl PipelineModuleDefinitionServer for StorageModule {
    async fn get_name(&self, _ctx: &CallContext, _request: Request<pipeline::GetName>) -> Result<Response<pipeline::GetName>> {
        Ok(Response::new(Property::new(self.state.lock().name.clone())))
    }

    async fn set_name(&self, _ctx: &CallContext, request: Request<pipeline::SetName>) -> Result<Response<pipeline::SetName>> {
        if request.params.value.as_str().is_empty() {
            return Ok(Response::with_status((), msrpc_dcom::Hresult::FSRM_E_INVALID_NAME));
        }
        self.state.lock().name = request.params.value;
        Ok(Response::new(()))
    }

    async fn get_module_type(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetModuleType>,
    ) -> Result<Response<pipeline::GetModuleType>> {
        Ok(Response::new(Property::new(FsrmPipelineModuleType::Storage)))
    }

    async fn get_enabled(&self, _ctx: &CallContext, _request: Request<pipeline::GetEnabled>) -> Result<Response<pipeline::GetEnabled>> {
        Ok(Response::new(Property::new(VariantBool(self.state.lock().enabled))))
    }

    async fn set_enabled(&self, _ctx: &CallContext, request: Request<pipeline::SetEnabled>) -> Result<Response<pipeline::SetEnabled>> {
        self.state.lock().enabled = request.params.value.into();
        Ok(Response::new(()))
    }

    async fn get_supported_extensions(
        &self,
        _ctx: &CallContext,
        _request: Request<pipeline::GetSupportedExtensions>,
    ) -> Result<Response<pipeline::GetSupportedExtensions>> {
        let extensions = self.state.lock().extensions.clone();
        Ok(Response::new(Property::new(LpSafeArray(extensions))))
    }

    async fn set_supported_extensions(
        &self,
        _ctx: &CallContext,
        request: Request<pipeline::SetSupportedExtensions>,
    ) -> Result<Response<pipeline::SetSupportedExtensions>> {
        self.state.lock().extensions = request.params.value;
        Ok(Response::new(()))
    }
}

#[async_trait]
impl StorageModuleDefinitionServer for StorageModule {
    async fn get_capabilities(
        &self,
        _ctx: &CallContext,
        _request: Request<storage::GetCapabilities>,
    ) -> Result<Response<storage::GetCapabilities>> {
        let caps = StorageModuleCaps::CAN_GET | StorageModuleCaps::CAN_SET | StorageModuleCaps::CAN_HANDLE_FILES;
        Ok(Response::new(Property::new(caps)))
    }

    async fn get_storage_type(
        &self,
        _ctx: &CallContext,
        _request: Request<storage::GetStorageType>,
    ) -> Result<Response<storage::GetStorageType>> {
        Ok(Response::new(Property::new(self.state.lock().storage_type)))
    }

    async fn set_storage_type(
        &self,
        _ctx: &CallContext,
        request: Request<storage::SetStorageType>,
    ) -> Result<Response<storage::SetStorageType>> {
        self.state.lock().storage_type = request.params.value;
        Ok(Response::new(()))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let transport = LoopbackTransport::with_config(LoopbackConfig::new().with_little_endian(!args.big_endian));
    let module = Arc::new(StorageModule {
        id: Uuid::new_v4(),
        state: Mutex::new(ModuleState::default()),
    });
    let ipid = transport.export(storage::SYNTAX, create_storage_module_definition_router(Arc::clone(&module)));
    info!("Exported storage module {} as {}", module.id, ipid);

    let ctx = CallContext::new();
    let conn = transport.bind(&ctx, storage::SYNTAX).await?;
    let client = StorageModuleDefinitionClient::connect(&ctx, conn).await?.with_ipid(ipid);
    let pipeline = client.pipeline_module_definition();
    let object = pipeline.object();
    let opts = CallOptions::new();

    pipeline
        .set_name(&ctx, Request::new(Property::new(BStr::from(args.name.as_str()))), &opts)
        .await?;
    object
        .set_description(&ctx, Request::new(Property::new(BStr::from("in-memory loopback module"))), &opts)
        .await?;
    pipeline
        .set_enabled(&ctx, Request::new(Property::new(VariantBool(true))), &opts)
        .await?;
    client
        .set_storage_type(&ctx, Request::new(Property::new(FsrmStorageModuleType::Cache)), &opts)
        .await?;

    let extensions: Vec<Variant> = args.extensions.iter().map(|ext| Variant::from(ext.as_str())).collect();
    pipeline
        .set_supported_extensions(
            &ctx,
            Request::new(SafeArrayProperty::new(SafeArray::new(SafeArrayData::Variant(extensions)))),
            &opts,
        )
        .await?;

    let id = object.get_id(&ctx, Request::default(), &opts).await?;
    let name = pipeline.get_name(&ctx, Request::default(), &opts).await?;
    let module_type = pipeline.get_module_type(&ctx, Request::default(), &opts).await?;
    let enabled = pipeline.get_enabled(&ctx, Request::default(), &opts).await?;
    let caps = client.get_capabilities(&ctx, Request::default(), &opts).await?;
    let storage_type = client.get_storage_type(&ctx, Request::default(), &opts).await?;
    let extensions = pipeline.get_supported_extensions(&ctx, Request::default(), &opts).await?;

    info!("Id: {}", id.params.value);
    info!("Name: {}", name.params.value);
    info!("Module type: {:?}", module_type.params.value);
    info!("Enabled: {}", bool::from(enabled.params.value));
    info!("Capabilities: {:#06x}", caps.params.value.0);
    info!("Storage type: {:?}", storage_type.params.value);
    info!("Supported extensions: {:?}", extensions.params.value);

    // a rejected name comes back as a status, not a fault
    if let Err(e) = pipeline.set_name(&ctx, Request::new(Property::new(BStr::default())), &opts).await {
        warn!("{}", e);
    }

    object.commit(&ctx, Request::default(), &opts).await?;

    let stats = transport.stats();
    info!("{} calls, {} faults", stats.calls(), stats.faults());
    Ok(())
}
