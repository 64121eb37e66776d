//! In-process transport
//!
//! `LoopbackTransport` keeps an export table of objects, each an IPID bound
//! to the interface it implements and the router that serves it. Calls skip
//! the wire but go through the full marshal, dispatch and unmarshal path,
//! and server errors come back as faults exactly as a remote server would
//! report them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_ndr::NdrContext;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::conn::{CallContext, Connection, RpcCall, Transport};
use crate::error::{DcomError, Result};
use crate::router::Router;
use crate::types::{Ipid, SyntaxId};

/// Loopback transport configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopbackConfig {
    /// Largest request stub accepted
    pub max_stub_size: usize,
    /// Data representation used by every connection
    pub little_endian: bool,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            max_stub_size: 4 * 1024 * 1024,
            little_endian: true,
        }
    }
}

impl LoopbackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stub_size(mut self, max_stub_size: usize) -> Self {
        self.max_stub_size = max_stub_size;
        self
    }

    pub fn with_little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }
}

/// Call counters
#[derive(Debug, Default)]
pub struct LoopbackStats {
    pub calls: AtomicU64,
    pub faults: AtomicU64,
}

impl LoopbackStats {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
struct Export {
    syntax: SyntaxId,
    router: Router,
}

struct Shared {
    config: LoopbackConfig,
    exports: RwLock<HashMap<Ipid, Export>>,
    stats: LoopbackStats,
}

impl Shared {
    fn is_exported(&self, syntax: SyntaxId) -> bool {
        self.exports.read().values().any(|export| export.syntax == syntax)
    }

    fn fault(&self, error: DcomError) -> DcomError {
        self.stats.faults.fetch_add(1, Ordering::Relaxed);
        let status = error.fault_status();
        warn!("Call faulted with 0x{:08x}: {}", status, error);
        DcomError::Fault { status }
    }
}

/// In-process transport with an export table
#[derive(Clone)]
pub struct LoopbackTransport {
    shared: Arc<Shared>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::with_config(LoopbackConfig::default())
    }

    pub fn with_config(config: LoopbackConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                exports: RwLock::new(HashMap::new()),
                stats: LoopbackStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.shared.config
    }

    pub fn stats(&self) -> &LoopbackStats {
        &self.shared.stats
    }

    /// Export an object under a fresh IPID
    pub fn export(&self, syntax: SyntaxId, router: Router) -> Ipid {
        let ipid = Ipid::generate();
        self.export_as(ipid, syntax, router);
        ipid
    }

    /// Export an object under `ipid`, replacing any previous export
    pub fn export_as(&self, ipid: Ipid, syntax: SyntaxId, router: Router) {
        info!("Exporting {} as {}", syntax, ipid);
        self.shared.exports.write().insert(ipid, Export { syntax, router });
    }

    /// Remove an export; returns whether it existed
    pub fn revoke(&self, ipid: &Ipid) -> bool {
        let removed = self.shared.exports.write().remove(ipid).is_some();
        if removed {
            info!("Revoked {}", ipid);
        }
        removed
    }

    pub fn export_count(&self) -> usize {
        self.shared.exports.read().len()
    }

    fn connection(&self, syntax: SyntaxId) -> Arc<dyn Connection> {
        Arc::new(LoopbackConnection {
            shared: Arc::clone(&self.shared),
            syntax: Mutex::new(syntax),
        })
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn bind(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<Arc<dyn Connection>> {
        ctx.check()?;
        if !self.shared.is_exported(syntax) {
            warn!("Bind rejected: {} is not exported", syntax);
            return Err(DcomError::BindRejected { syntax });
        }
        info!("Bound to {}", syntax);
        Ok(self.connection(syntax))
    }
}

/// A loopback connection bound to one syntax at a time
pub struct LoopbackConnection {
    shared: Arc<Shared>,
    syntax: Mutex<SyntaxId>,
}

impl LoopbackConnection {
    async fn serve(&self, ctx: &CallContext, call: RpcCall) -> Result<Bytes> {
        let ipid = call.object.unwrap_or_default();
        let export = self.shared.exports.read().get(&ipid).cloned();
        let Some(export) = export else {
            return Err(self.shared.fault(DcomError::UnknownObject { ipid }));
        };
        if export.syntax != self.syntax() {
            return Err(self.shared.fault(DcomError::BindRejected {
                syntax: self.syntax(),
            }));
        }

        debug!("Loopback call: opnum={}, ipid={}, stub_len={}", call.opnum, ipid, call.stub.len());
        export
            .router
            .serve(ctx, call.opnum, call.stub, self.ndr_context())
            .await
            .map_err(|e| self.shared.fault(e))
    }
}

#[async_trait]
impl Connection for LoopbackConnection {
    fn syntax(&self) -> SyntaxId {
        *self.syntax.lock()
    }

    fn ndr_context(&self) -> NdrContext {
        NdrContext::with_byte_order(self.shared.config.little_endian)
    }

    async fn call(&self, ctx: &CallContext, call: RpcCall) -> Result<Bytes> {
        ctx.check()?;
        let max = self.shared.config.max_stub_size;
        if call.stub.len() > max {
            return Err(DcomError::StubTooLarge {
                size: call.stub.len(),
                max,
            });
        }
        self.shared.stats.calls.fetch_add(1, Ordering::Relaxed);

        let opnum = call.opnum;
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!("Call cancelled: opnum={}", opnum);
                Err(DcomError::Cancelled)
            }
            result = self.serve(ctx, call) => result,
        }
    }

    async fn alter_context(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<()> {
        ctx.check()?;
        if !self.shared.is_exported(syntax) {
            return Err(DcomError::BindRejected { syntax });
        }
        debug!("Altered context to {}", syntax);
        *self.syntax.lock() = syntax;
        Ok(())
    }

    async fn sub_conn(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<Arc<dyn Connection>> {
        ctx.check()?;
        if !self.shared.is_exported(syntax) {
            return Err(DcomError::BindRejected { syntax });
        }
        Ok(Arc::new(LoopbackConnection {
            shared: Arc::clone(&self.shared),
            syntax: Mutex::new(syntax),
        }))
    }
}
