//! Wire Format Tests
//!
//! These tests pin the NDR bytes produced for DCOM calls:
//! - Null and populated unique pointers at the top level
//! - Embedded pointees deferred to the end of their parameter
//! - Full pointer aliasing
//! - VARIANT_BOOL normalization
//! - Malformed stubs rejected before a handler runs

mod common;

use bytes::Bytes;

use common::*;
use msrpc_dcom::frame::{decode_request, decode_response, encode_request, encode_response};
use msrpc_dcom::{
    CallContext, DcomError, Hresult, InterfaceClient, Method, Params, Property, Request, Response,
    RpcCall,
};
use msrpc_fsrm::pipeline;
use msrpc_fsrm::storage;
use msrpc_fsrm::FsrmStorageModuleType;
use msrpc_ndr::{
    NdrContext, NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, PointerKind, VariantBool, FIRST_REFERENT_ID,
    REFERENT_ID_STEP,
};

/// ORPCTHIS: version, flags, reserved, causality ID, extensions referent
const ORPCTHIS_LEN: usize = 32;
/// ORPCTHAT: flags, extensions referent
const ORPCTHAT_LEN: usize = 8;

/// `[in, unique] LPWSTR comment, [in] FsrmStorageModuleType kind`
#[derive(Debug, Clone, Default, PartialEq)]
struct TagIn {
    comment: Option<String>,
    kind: FsrmStorageModuleType,
}

impl Params for TagIn {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_pointer_param(self.comment.as_ref(), PointerKind::Unique)?;
        w.write_param(&self.kind)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_pointer_param(&mut self.comment, PointerKind::Unique)?;
        r.read_param(&mut self.kind)
    }
}

struct Tag;

impl Method for Tag {
    const OPNUM: u16 = 3;
    const NAME: &'static str = "/ITagger/v0/Tag";
    type In = TagIn;
    type Out = ();
}

/// A struct with embedded pointers around a scalar
#[derive(Debug, Clone, Default, PartialEq)]
struct Record {
    first: Option<String>,
    second: Option<String>,
    tail: u32,
    third: Option<String>,
}

impl NdrEncode for Record {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_pointer(self.first.as_ref(), PointerKind::Unique)?;
        w.write_pointer(self.second.as_ref(), PointerKind::Unique)?;
        w.write_u32(self.tail);
        w.write_pointer(self.third.as_ref(), PointerKind::Unique)
    }
}

impl NdrDecode for Record {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_pointer(&mut self.first, PointerKind::Unique)?;
        r.read_pointer(&mut self.second, PointerKind::Unique)?;
        self.tail = r.read_u32()?;
        r.read_pointer(&mut self.third, PointerKind::Unique)
    }
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().unwrap())
}

#[test]
fn test_null_unique_pointer_and_enum() {
    init_logging();
    let ndr = NdrContext::new();
    let request = Request::<Tag>::new(TagIn {
        comment: None,
        kind: FsrmStorageModuleType::Database,
    });

    let stub = encode_request(&request, ndr).unwrap();
    assert_eq!(stub.len(), ORPCTHIS_LEN + 6);
    assert_eq!(&stub[ORPCTHIS_LEN..ORPCTHIS_LEN + 4], &[0, 0, 0, 0]);
    assert_eq!(&stub[ORPCTHIS_LEN + 4..], &[3, 0]);

    let decoded = decode_request::<Tag>(stub, ndr).unwrap();
    assert_eq!(decoded, request);
    assert!(decoded.params.comment.is_none());
}

#[test]
fn test_populated_unique_pointer_big_endian() {
    let ndr = NdrContext::big_endian();
    let request = Request::<Tag>::new(TagIn {
        comment: Some("quota".to_string()),
        kind: FsrmStorageModuleType::InFile,
    });

    let stub = encode_request(&request, ndr).unwrap();
    let at = ORPCTHIS_LEN;
    assert_eq!(&stub[at..at + 4], &FIRST_REFERENT_ID.to_be_bytes());
    // max count, offset, actual count, then "quota\0" before the enum
    assert_eq!(&stub[at + 4..at + 8], &6u32.to_be_bytes());
    assert_eq!(&stub[at + 12..at + 16], &6u32.to_be_bytes());
    assert_eq!(&stub[stub.len() - 2..], &[0, 2]);

    assert_eq!(decode_request::<Tag>(stub, ndr).unwrap(), request);
}

#[test]
fn test_embedded_pointees_follow_the_struct() {
    let record = Record {
        first: None,
        second: Some("hi".to_string()),
        tail: 0xAABB_CCDD,
        third: Some("yo".to_string()),
    };

    let mut w = NdrWriter::new(NdrContext::new());
    w.write_param(&record).unwrap();
    let stub = w.finish().unwrap();

    assert_eq!(le_u32(&stub[0..4]), 0);
    assert_eq!(le_u32(&stub[4..8]), FIRST_REFERENT_ID);
    assert_eq!(le_u32(&stub[8..12]), 0xAABB_CCDD);
    assert_eq!(le_u32(&stub[12..16]), FIRST_REFERENT_ID + REFERENT_ID_STEP);
    // "hi\0" at 16, padded to 36, then "yo\0"
    assert_eq!(le_u32(&stub[16..20]), 3);
    assert_eq!(&stub[28..34], &[b'h', 0, b'i', 0, 0, 0]);
    assert_eq!(le_u32(&stub[36..40]), 3);
    assert_eq!(&stub[48..54], &[b'y', 0, b'o', 0, 0, 0]);
    assert_eq!(stub.len(), 54);

    let decoded: Record = NdrReader::new(stub, NdrContext::new()).read_owned().unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_full_pointer_alias_shares_referent() {
    let ndr = NdrContext::new();
    let shared = String::from("shared");

    let mut w = NdrWriter::new(ndr);
    w.write_pointer(Some(&shared), PointerKind::Full).unwrap();
    w.write_pointer(Some(&shared), PointerKind::Full).unwrap();
    w.write_deferred().unwrap();
    let stub = w.finish().unwrap();

    assert_eq!(&stub[0..4], &stub[4..8]);
    assert_eq!(le_u32(&stub[0..4]), FIRST_REFERENT_ID);
    // one pointee only
    assert_eq!(le_u32(&stub[8..12]), 7);
    assert_eq!(stub.len(), 8 + 12 + 14);

    let mut first: Option<String> = None;
    let mut second: Option<String> = None;
    let mut r = NdrReader::new(stub, ndr);
    r.read_pointer(&mut first, PointerKind::Full).unwrap();
    r.read_pointer(&mut second, PointerKind::Full).unwrap();
    r.read_deferred().unwrap();
    r.finish().unwrap();

    assert_eq!(first.as_deref(), Some("shared"));
    assert_eq!(second, first);
}

#[test]
fn test_status_trails_out_params() {
    let response = Response::<pipeline::SetName>::with_status((), Hresult::FSRM_E_INVALID_NAME);
    let stub = encode_response(&response, NdrContext::new()).unwrap();
    assert_eq!(stub.len(), ORPCTHAT_LEN + 4);
    assert_eq!(le_u32(&stub[ORPCTHAT_LEN..]), 0x8004_5308);

    let decoded = decode_response::<pipeline::SetName>(stub, NdrContext::new()).unwrap();
    assert_eq!(decoded.hresult(), Hresult::FSRM_E_INVALID_NAME);
}

#[test]
fn test_truncated_and_oversized_stubs() {
    let ndr = NdrContext::new();
    let response = Response::<pipeline::GetName>::new(Property::new("module".into()));
    let stub = encode_response(&response, ndr).unwrap();

    let truncated = stub.slice(..stub.len() - 3);
    let err = decode_response::<pipeline::GetName>(truncated, ndr).unwrap_err();
    assert!(matches!(err, NdrError::BufferUnderflow { .. }));

    let mut trailing = stub.to_vec();
    trailing.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(decode_response::<pipeline::GetName>(Bytes::from(trailing), ndr).unwrap(), response);

    let huge = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0]);
    let err = NdrReader::new(huge, ndr).read_owned::<Vec<u32>>().unwrap_err();
    assert!(matches!(err, NdrError::AllocationLimitExceeded { .. }));

    // a count the remaining bytes cannot hold
    let short = Bytes::from_static(&[0xE8, 0x03, 0, 0, 1, 0, 0, 0]);
    let err = NdrReader::new(short, ndr).read_owned::<Vec<u32>>().unwrap_err();
    assert!(matches!(err, NdrError::BufferUnderflow { .. }));
}

#[tokio::test]
async fn test_bad_stub_faults_without_running_handler() {
    init_logging();
    let fixture = setup().await;
    let ctx = CallContext::new();
    let ndr = fixture.client.conn().ndr_context();

    let request = Request::<storage::SetStorageType>::new(Property::new(FsrmStorageModuleType::Cache));
    let mut stub = encode_request(&request, ndr).unwrap().to_vec();
    stub[ORPCTHIS_LEN] = 7;

    let call = RpcCall::new(storage::opnum::SET_STORAGE_TYPE, Some(fixture.ipid), Bytes::from(stub));
    let err = fixture.client.conn().call(&ctx, call).await.unwrap_err();
    match err {
        DcomError::Fault { status } => assert_eq!(status, Hresult::RPC_X_BAD_STUB_DATA.as_u32()),
        other => panic!("expected fault, got {:?}", other),
    }
    assert!(fixture.module.calls().is_empty());
    assert_eq!(fixture.transport.stats().faults(), 1);
    assert_eq!(fixture.module.state.lock().storage_type, FsrmStorageModuleType::Database);
}

#[tokio::test]
async fn test_variant_bool_normalized_through_loopback() {
    let fixture = setup().await;
    let ctx = CallContext::new();
    let conn = fixture.client.conn();
    let ndr = conn.ndr_context();

    fixture.module.state.lock().enabled = false;

    // nonzero but not VARIANT_TRUE
    let request = Request::<pipeline::SetEnabled>::new(Property::new(VariantBool(true)));
    let mut stub = encode_request(&request, ndr).unwrap().to_vec();
    assert_eq!(&stub[ORPCTHIS_LEN..ORPCTHIS_LEN + 2], &[0xFF, 0xFF]);
    stub[ORPCTHIS_LEN] = 0x01;
    stub[ORPCTHIS_LEN + 1] = 0x00;
    conn.call(&ctx, RpcCall::new(pipeline::opnum::SET_ENABLED, Some(fixture.ipid), Bytes::from(stub)))
        .await
        .unwrap();
    assert!(fixture.module.state.lock().enabled);

    let stub = encode_request(&Request::<pipeline::GetEnabled>::default(), ndr).unwrap();
    let reply = conn
        .call(&ctx, RpcCall::new(pipeline::opnum::GET_ENABLED, Some(fixture.ipid), stub))
        .await
        .unwrap();
    assert_eq!(&reply[ORPCTHAT_LEN..ORPCTHAT_LEN + 2], &[0xFF, 0xFF]);
    assert_eq!(le_u32(&reply[ORPCTHAT_LEN + 4..]), 0);
}
