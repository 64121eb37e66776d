//! Concurrency Tests - Parallel Calls Over Loopback
//!
//! These tests exercise concurrent use of clients and routers:
//! - Many callers sharing one client
//! - Independent objects behind one transport
//! - Cancelling one call while others complete

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use common::*;
use msrpc_dcom::oaut::BStr;
use msrpc_dcom::{CallContext, CallOptions, DcomError, InterfaceClient, Property, Request};
use msrpc_fsrm::storage;
use msrpc_fsrm::{create_storage_module_definition_router, FsrmStorageModuleType};

const CALLERS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_callers_share_one_client() {
    init_logging();
    let fixture = setup().await;
    let start = Instant::now();

    let tasks: Vec<_> = (0..CALLERS)
        .map(|_| {
            let client = fixture.client.clone();
            tokio::spawn(async move {
                let ctx = CallContext::new();
                client
                    .get_storage_type(&ctx, Request::default(), &CallOptions::new())
                    .await
                    .map(|response| response.params.value)
            })
        })
        .collect();

    for result in join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), FsrmStorageModuleType::Database);
    }
    tracing::info!("{} calls in {:?}", CALLERS, start.elapsed());

    assert_eq!(fixture.module.call_count.load(Ordering::Relaxed), CALLERS as u64);
    assert_eq!(fixture.transport.stats().calls(), CALLERS as u64);
    assert_eq!(fixture.transport.stats().faults(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_objects() {
    let fixture = setup().await;
    let modules: Vec<_> = (0..8).map(|_| Arc::new(FixtureModule::new())).collect();
    let clients: Vec<_> = modules
        .iter()
        .map(|module| {
            let ipid = fixture
                .transport
                .export(storage::SYNTAX, create_storage_module_definition_router(Arc::clone(module)));
            fixture.client.with_ipid(ipid)
        })
        .collect();

    let calls = clients.iter().enumerate().map(|(i, client)| async move {
        let ctx = CallContext::new();
        let object = client.pipeline_module_definition().object();
        object
            .set_description(&ctx, Request::new(Property::new(BStr::from(format!("module {}", i)))), &CallOptions::new())
            .await
            .map_err(|e| e.into_error())?;
        object
            .get_description(&ctx, Request::default(), &CallOptions::new())
            .await
            .map(|response| response.params.value)
            .map_err(|e| e.into_error())
    });
    let descriptions = join_all(calls).await;

    for (i, (module, description)) in modules.iter().zip(descriptions).enumerate() {
        assert_eq!(description.unwrap().as_str(), format!("module {}", i));
        assert_eq!(module.calls().len(), 2);
    }
    assert!(fixture.module.calls().is_empty());
    assert_eq!(fixture.transport.export_count(), 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_one_of_many() {
    let fixture = setup().await;
    let blocked_ctx = CallContext::new();

    let object = fixture.client.pipeline_module_definition().object().clone();
    let commit_ctx = blocked_ctx.clone();
    let blocked = tokio::spawn(async move { object.commit(&commit_ctx, Request::default(), &CallOptions::new()).await });

    let readers = (0..16).map(|_| {
        let client = fixture.client.clone();
        async move {
            let ctx = CallContext::new();
            client.get_capabilities(&ctx, Request::default(), &CallOptions::new()).await
        }
    });
    for result in join_all(readers).await {
        assert!(result.is_ok());
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    blocked_ctx.cancel();
    let err = blocked.await.unwrap().unwrap_err();
    assert!(matches!(err.error, DcomError::Cancelled));
    assert_eq!(fixture.module.call_count.load(Ordering::Relaxed), 17);
}
