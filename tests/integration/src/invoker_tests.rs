//! Invoker Tests - Client Calls End to End
//!
//! These tests exercise the client side of a call:
//! - Method status codes surfaced as errors that name the operation
//! - IPID resolution from the client default or per-call options
//! - Cancellation of in-flight calls
//! - Base interface methods reached through embedded clients
//! - Byte order and stub size settings of the transport

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::*;
use msrpc_dcom::oaut::{BStr, LpSafeArray, SafeArray, SafeArrayData, Variant};
use msrpc_dcom::{
    CallContext, CallOptions, DcomError, Hresult, InterfaceClient, LoopbackConfig, Method, Property,
    Request, Transport,
};
use msrpc_fsrm::pipeline;
use msrpc_fsrm::storage;
use msrpc_fsrm::{
    create_storage_module_definition_router, FsrmAccountType, FsrmStorageModuleType, SafeArrayProperty,
    StorageModuleCaps, StorageModuleDefinitionClient,
};
use msrpc_ndr::VariantBool;

#[tokio::test]
async fn test_status_error_names_operation() {
    init_logging();
    let fixture = setup().await;
    let ctx = CallContext::new();
    let pipeline = fixture.client.pipeline_module_definition();

    let err = pipeline
        .set_name(&ctx, Request::new(Property::new(BStr::from(""))), &CallOptions::new())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("/IFsrmPipelineModuleDefinition/v0/SetName"), "{}", message);
    assert!(message.contains("The specified name is invalid"), "{}", message);
    assert!(matches!(
        err.error,
        DcomError::Status { op_name, hresult }
            if op_name == <pipeline::SetName as Method>::NAME && hresult == Hresult::FSRM_E_INVALID_NAME
    ));

    // the decoded response comes back with the error
    let response = err.response.unwrap();
    assert_eq!(response.hresult(), Hresult::FSRM_E_INVALID_NAME);
    assert_eq!(fixture.module.state.lock().name.as_str(), "Test Storage Module");
    assert_eq!(fixture.transport.stats().faults(), 0);
}

#[tokio::test]
async fn test_status_error_from_derived_method() {
    let fixture = setup().await;
    let ctx = CallContext::new();

    let err = fixture
        .client
        .set_storage_type(&ctx, Request::new(Property::new(FsrmStorageModuleType::Unknown)), &CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.error.hresult(), Some(Hresult::E_INVALIDARG));
    assert!(err.to_string().starts_with("/IFsrmStorageModuleDefinition/v0/SetStorageType: E_INVALIDARG"));
}

#[tokio::test]
async fn test_missing_ipid_fails_before_sending() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let conn = fixture.transport.bind(&ctx, storage::SYNTAX).await.unwrap();
    let anonymous = StorageModuleDefinitionClient::connect(&ctx, conn).await.unwrap();
    assert_eq!(anonymous.ipid(), None);

    let err = anonymous
        .get_capabilities(&ctx, Request::default(), &CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.error,
        DcomError::MissingIpid { op_name } if op_name == "/IFsrmStorageModuleDefinition/v0/GetCapabilities"
    ));
    assert_eq!(fixture.transport.stats().calls(), 0);

    // a per-call IPID is enough
    let response = anonymous
        .get_capabilities(&ctx, Request::default(), &CallOptions::new().with_ipid(fixture.ipid))
        .await
        .unwrap();
    assert!(response.params.value.contains(StorageModuleCaps::CAN_GET));
    assert_eq!(fixture.transport.stats().calls(), 1);
}

#[tokio::test]
async fn test_cancel_in_flight_call() {
    init_logging();
    let fixture = setup().await;
    let ctx = CallContext::new();
    let object = fixture.client.pipeline_module_definition().object();
    let opts = CallOptions::new();

    let (result, ()) = tokio::join!(object.commit(&ctx, Request::default(), &opts), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.cancel();
    });

    let err = result.unwrap_err();
    assert!(matches!(err.error, DcomError::Cancelled));
    assert!(fixture.module.calls().contains(&<msrpc_fsrm::object::Commit as Method>::NAME));
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    ctx.cancel();

    let err = fixture
        .client
        .get_storage_type(&ctx, Request::default(), &CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err.error, DcomError::Cancelled));
    assert_eq!(fixture.transport.stats().calls(), 0);
    assert!(fixture.module.calls().is_empty());
}

#[tokio::test]
async fn test_embedded_clients_share_connection_and_object() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let opts = CallOptions::new();

    let pipeline = fixture.client.pipeline_module_definition();
    let object = pipeline.object();
    let dispatch = object.dispatch();
    assert_eq!(pipeline.ipid(), Some(fixture.ipid));
    assert_eq!(object.ipid(), Some(fixture.ipid));
    assert_eq!(dispatch.ipid(), Some(fixture.ipid));
    assert_eq!(dispatch.conn().syntax(), storage::SYNTAX);

    let id = object.get_id(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(id.params.value, fixture.module.id);

    pipeline
        .set_account(&ctx, Request::new(Property::new(FsrmAccountType::NetworkService)), &opts)
        .await
        .unwrap();
    let account = pipeline.get_account(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(account.params.value, FsrmAccountType::NetworkService);

    pipeline
        .set_enabled(&ctx, Request::new(Property::new(VariantBool(false))), &opts)
        .await
        .unwrap();
    assert!(!fixture.module.state.lock().enabled);

    let module_type = pipeline.get_module_type(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(module_type.params.value, msrpc_fsrm::FsrmPipelineModuleType::Storage);

    assert_eq!(fixture.module.call_count.load(Ordering::Relaxed), 5);
}

#[tokio::test]
async fn test_with_ipid_retargets_every_level() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let opts = CallOptions::new();

    let other = std::sync::Arc::new(FixtureModule::new());
    let other_ipid = fixture.transport.export(
        storage::SYNTAX,
        create_storage_module_definition_router(std::sync::Arc::clone(&other)),
    );
    let retargeted = fixture.client.with_ipid(other_ipid);
    assert_eq!(retargeted.pipeline_module_definition().object().dispatch().ipid(), Some(other_ipid));
    assert_eq!(fixture.client.ipid(), Some(fixture.ipid));

    retargeted
        .pipeline_module_definition()
        .object()
        .set_description(&ctx, Request::new(Property::new(BStr::from("second"))), &opts)
        .await
        .unwrap();
    assert_eq!(other.state.lock().description.as_str(), "second");
    assert_eq!(fixture.module.state.lock().description.as_str(), "");

    let id = retargeted
        .pipeline_module_definition()
        .object()
        .get_id(&ctx, Request::default(), &opts)
        .await
        .unwrap();
    assert_eq!(id.params.value, other.id);
}

#[tokio::test]
async fn test_supported_extensions_roundtrip() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let opts = CallOptions::new();
    let pipeline = fixture.client.pipeline_module_definition();

    let extensions = SafeArray::new(SafeArrayData::Variant(vec![
        Variant::from("docx"),
        Variant::from("xlsx"),
        Variant::Null,
    ]));
    pipeline
        .set_supported_extensions(&ctx, Request::new(SafeArrayProperty::new(extensions.clone())), &opts)
        .await
        .unwrap();

    let response = pipeline.get_supported_extensions(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(response.params.value, LpSafeArray::new(extensions));

    pipeline
        .set_supported_extensions(&ctx, Request::new(SafeArrayProperty::default()), &opts)
        .await
        .unwrap();
    let response = pipeline.get_supported_extensions(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(response.params.value, LpSafeArray(None));
}

#[tokio::test]
async fn test_big_endian_transport() {
    let fixture = setup_with_config(LoopbackConfig::new().with_little_endian(false)).await;
    let ctx = CallContext::new();
    let opts = CallOptions::new();
    assert!(!fixture.client.conn().ndr_context().little_endian);

    let pipeline = fixture.client.pipeline_module_definition();
    pipeline
        .set_name(&ctx, Request::new(Property::new(BStr::from("Grüße"))), &opts)
        .await
        .unwrap();
    let name = pipeline.get_name(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(name.params.value.as_str(), "Grüße");

    let caps = fixture.client.get_capabilities(&ctx, Request::default(), &opts).await.unwrap();
    assert_eq!(caps.params.value, StorageModuleCaps::CAN_GET | StorageModuleCaps::CAN_HANDLE_FILES);
}

#[tokio::test]
async fn test_oversized_request_is_refused() {
    let fixture = setup_with_config(LoopbackConfig::new().with_max_stub_size(128)).await;
    let ctx = CallContext::new();

    let description = BStr::from("x".repeat(200));
    let err = fixture
        .client
        .pipeline_module_definition()
        .object()
        .set_description(&ctx, Request::new(Property::new(description)), &CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err.error, DcomError::StubTooLarge { max: 128, .. }));
    assert!(fixture.module.calls().is_empty());
}
