//! Dispatch Tests - Opnum Routing Through an Interface Chain
//!
//! These tests exercise server-side dispatch:
//! - Most derived level handles its own opnums
//! - Base opnums are served exactly as the base router serves them
//! - Unknown opnums, unknown objects and unexported syntaxes fault
//! - Unimplemented methods fault with E_NOTIMPL

mod common;

use std::sync::Arc;

use bytes::Bytes;

use common::*;
use msrpc_dcom::frame::{decode_response, encode_request};
use msrpc_dcom::oaut::{BStr, SafeArray, SafeArrayData, Variant};
use msrpc_dcom::{
    CallContext, CallOptions, DcomError, Hresult, InterfaceClient, Ipid, LoopbackTransport, Method,
    Property, Request, RpcCall, Transport,
};
use msrpc_fsrm::storage::{self, GetStorageType};
use msrpc_fsrm::{idispatch, object, pipeline};
use msrpc_fsrm::{
    create_storage_module_definition_router, FsrmAccountType, FsrmStorageModuleType, SafeArrayProperty,
    StorageModuleDefinitionClient, UnimplementedServer,
};
use msrpc_ndr::{NdrContext, VariantBool};

fn empty_request(ndr: NdrContext) -> Bytes {
    encode_request(&Request::<GetStorageType>::default(), ndr).unwrap()
}

fn fault_of(err: &DcomError) -> u32 {
    match err {
        DcomError::Fault { status } => *status,
        other => panic!("expected fault, got {:?}", other),
    }
}

#[tokio::test]
async fn test_derived_opnum_runs_local_handler() {
    init_logging();
    let module = Arc::new(FixtureModule::new());
    let router = create_storage_module_definition_router(Arc::clone(&module));
    let ctx = CallContext::new();
    let ndr = NdrContext::new();

    let reply = router
        .serve(&ctx, storage::opnum::GET_STORAGE_TYPE, empty_request(ndr), ndr)
        .await
        .unwrap();
    let response = decode_response::<GetStorageType>(reply, ndr).unwrap();
    assert_eq!(response.params.value, FsrmStorageModuleType::Database);
    assert_eq!(response.status, 0);
    assert_eq!(module.calls(), vec![<GetStorageType as Method>::NAME]);
}

fn valid_stub<M: Method>(params: M::In, ndr: NdrContext) -> (u16, Bytes) {
    (M::OPNUM, encode_request(&Request::<M>::new(params), ndr).unwrap())
}

/// A well-formed request for every remoted base opnum except Commit, which blocks
fn base_requests(ndr: NdrContext) -> Vec<(u16, Bytes)> {
    let mut names = idispatch::GetIdsOfNamesIn::new(vec!["Name".into()], 0x409);
    names.names_count = 1;
    let extensions = || SafeArrayProperty::new(SafeArray::new(SafeArrayData::Variant(vec![Variant::from("docx")])));
    let text = |s: &str| Property::new(BStr::from(s));

    vec![
        valid_stub::<idispatch::GetTypeInfoCount>((), ndr),
        valid_stub::<idispatch::GetTypeInfo>(idispatch::GetTypeInfoIn::default(), ndr),
        valid_stub::<idispatch::GetIdsOfNames>(names, ndr),
        valid_stub::<object::GetId>((), ndr),
        valid_stub::<object::GetDescription>((), ndr),
        valid_stub::<object::SetDescription>(text("routed"), ndr),
        valid_stub::<object::Delete>((), ndr),
        valid_stub::<pipeline::GetModuleClsid>((), ndr),
        valid_stub::<pipeline::SetModuleClsid>(text("{00000000-0000-0000-0000-000000000001}"), ndr),
        valid_stub::<pipeline::GetName>((), ndr),
        valid_stub::<pipeline::SetName>(text("Routed Module"), ndr),
        valid_stub::<pipeline::GetCompany>((), ndr),
        valid_stub::<pipeline::SetCompany>(text("Contoso"), ndr),
        valid_stub::<pipeline::GetVersion>((), ndr),
        valid_stub::<pipeline::SetVersion>(text("2.0"), ndr),
        valid_stub::<pipeline::GetModuleType>((), ndr),
        valid_stub::<pipeline::GetEnabled>((), ndr),
        valid_stub::<pipeline::SetEnabled>(Property::new(VariantBool(false)), ndr),
        valid_stub::<pipeline::GetNeedsFileContent>((), ndr),
        valid_stub::<pipeline::SetNeedsFileContent>(Property::new(VariantBool(true)), ndr),
        valid_stub::<pipeline::GetAccount>((), ndr),
        valid_stub::<pipeline::SetAccount>(Property::new(FsrmAccountType::LocalService), ndr),
        valid_stub::<pipeline::GetSupportedExtensions>((), ndr),
        valid_stub::<pipeline::SetSupportedExtensions>(extensions(), ndr),
        valid_stub::<pipeline::GetParameters>((), ndr),
        valid_stub::<pipeline::SetParameters>(extensions(), ndr),
    ]
}

#[tokio::test]
async fn test_base_opnums_match_base_router() {
    let module = Arc::new(FixtureModule::new());
    let router = create_storage_module_definition_router(Arc::clone(&module));
    let base = router.base();
    assert_eq!(base.top(), Some(12));
    let ctx = CallContext::new();
    let ndr = NdrContext::new();

    let requests = base_requests(ndr);
    let opnums: Vec<u16> = requests.iter().map(|(opnum, _)| *opnum).collect();
    let expected: Vec<u16> = (idispatch::FIRST_OPNUM..storage::FIRST_OPNUM)
        .filter(|opnum| *opnum != 6 && *opnum != object::opnum::COMMIT)
        .collect();
    assert_eq!(opnums, expected);

    let mut handled = 0;
    for (opnum, stub) in requests {
        let derived = router
            .serve(&ctx, opnum, stub.clone(), ndr)
            .await
            .map_err(|e| e.fault_status());
        let direct = base.serve(&ctx, opnum, stub, ndr).await.map_err(|e| e.fault_status());
        assert_eq!(derived, direct, "opnum {}", opnum);
        match derived {
            Ok(_) => handled += 1,
            Err(status) => assert_eq!(status, Hresult::E_NOTIMPL.as_u32(), "opnum {}", opnum),
        }
    }

    // every method the fixture implements ran once through each router
    assert_eq!(handled, 12);
    assert_eq!(module.calls().len(), 2 * handled);
    assert_eq!(module.state.lock().name.as_str(), "Routed Module");

    for opnum in storage::FIRST_OPNUM..=storage::opnum::SET_UPDATES_FILE_CONTENT {
        let err = base.serve(&ctx, opnum, empty_request(ndr), ndr).await.unwrap_err();
        assert!(matches!(err, DcomError::UnknownOpnum { .. }), "opnum {}", opnum);
    }
}

#[tokio::test]
async fn test_iunknown_and_invoke_are_unknown() {
    let router = create_storage_module_definition_router(Arc::new(FixtureModule::new()));
    let ctx = CallContext::new();
    let ndr = NdrContext::new();

    for opnum in [0, 1, 2, 6, 37, u16::MAX] {
        let err = router.serve(&ctx, opnum, empty_request(ndr), ndr).await.unwrap_err();
        assert!(matches!(err, DcomError::UnknownOpnum { opnum: o } if o == opnum));
        assert_eq!(err.fault_status(), Hresult::NCA_S_OP_RNG_ERROR.as_u32());
    }
}

#[tokio::test]
async fn test_unimplemented_server_faults_with_notimpl() {
    let transport = LoopbackTransport::new();
    let router = create_storage_module_definition_router(Arc::new(UnimplementedServer));
    let ipid = transport.export(storage::SYNTAX, router);
    let ctx = CallContext::new();
    let client = StorageModuleDefinitionClient::connect(&ctx, transport.bind(&ctx, storage::SYNTAX).await.unwrap())
        .await
        .unwrap()
        .with_ipid(ipid);
    let opts = CallOptions::new();

    let err = client.get_storage_type(&ctx, Request::default(), &opts).await.unwrap_err();
    assert!(err.response.is_none());
    assert_eq!(fault_of(&err.error), Hresult::E_NOTIMPL.as_u32());
    assert_eq!(err.error.hresult(), Some(Hresult::E_NOTIMPL));

    let err = client.pipeline_module_definition().object().get_id(&ctx, Request::default(), &opts).await.unwrap_err();
    assert_eq!(fault_of(&err.error), Hresult::E_NOTIMPL.as_u32());
    assert_eq!(transport.stats().faults(), 2);
}

#[tokio::test]
async fn test_out_of_range_opnum_over_loopback() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let ndr = fixture.client.conn().ndr_context();

    let call = RpcCall::new(storage::opnum::SET_UPDATES_FILE_CONTENT + 1, Some(fixture.ipid), empty_request(ndr));
    let err = fixture.client.conn().call(&ctx, call).await.unwrap_err();
    assert_eq!(fault_of(&err), Hresult::NCA_S_OP_RNG_ERROR.as_u32());
    assert!(fixture.module.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_and_revoked_objects() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let opts = CallOptions::new();

    let stranger = fixture.client.with_ipid(Ipid::generate());
    let err = stranger.get_storage_type(&ctx, Request::default(), &opts).await.unwrap_err();
    assert_eq!(fault_of(&err.error), Hresult::CO_E_OBJNOTCONNECTED.as_u32());

    fixture.client.get_storage_type(&ctx, Request::default(), &opts).await.unwrap();
    assert!(fixture.transport.revoke(&fixture.ipid));
    assert!(!fixture.transport.revoke(&fixture.ipid));
    let err = fixture.client.get_storage_type(&ctx, Request::default(), &opts).await.unwrap_err();
    assert_eq!(fault_of(&err.error), Hresult::CO_E_OBJNOTCONNECTED.as_u32());
    assert_eq!(fixture.module.call_count.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_syntax_mismatch_is_rejected() {
    let fixture = setup().await;
    let ctx = CallContext::new();

    let err = fixture.transport.bind(&ctx, object::SYNTAX).await.err().unwrap();
    assert!(matches!(err, DcomError::BindRejected { syntax } if syntax == object::SYNTAX));

    // an IFsrmObject export reached over the storage connection
    let object_ipid = fixture
        .transport
        .export(object::SYNTAX, msrpc_fsrm::create_object_router(Arc::new(FixtureModule::new())));
    let err = fixture
        .client
        .pipeline_module_definition()
        .object()
        .with_ipid(object_ipid)
        .get_id(&ctx, Request::default(), &CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(fault_of(&err.error), Hresult::NCA_S_UNK_IF.as_u32());

    let object_conn = fixture.transport.bind(&ctx, object::SYNTAX).await.unwrap();
    assert_eq!(object_conn.syntax(), object::SYNTAX);
}
