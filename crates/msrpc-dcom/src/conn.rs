//! Connections and call context
//!
//! A [`Connection`] is bound to one interface syntax and carries marshaled
//! stubs to the object named by the request's IPID. A [`Transport`] creates
//! connections. Both are object-safe so clients can hold `Arc<dyn Connection>`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_ndr::NdrContext;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{DcomError, Result};
use crate::types::{Ipid, SyntaxId};

/// Per-call context: cancellation and causality
#[derive(Clone, Debug)]
pub struct CallContext {
    cancel: CancellationToken,
    causality: Uuid,
}

impl CallContext {
    /// A fresh context with its own causality ID
    pub fn new() -> Self {
        Self::with_cancel(CancellationToken::new())
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            causality: Uuid::new_v4(),
        }
    }

    /// A nested context in the same causality chain
    ///
    /// Cancelling the parent cancels the child, not the reverse.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            causality: self.causality,
        }
    }

    pub fn causality(&self) -> Uuid {
        self.causality
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the context is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Fail with `Cancelled` if the context was cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(DcomError::Cancelled);
        }
        Ok(())
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call overrides
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Object to call, in place of the client's default IPID
    pub ipid: Option<Ipid>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ipid(mut self, ipid: Ipid) -> Self {
        self.ipid = Some(ipid);
        self
    }
}

/// One request as the transport sees it
#[derive(Clone, Debug)]
pub struct RpcCall {
    pub opnum: u16,
    /// Object UUID (the IPID)
    pub object: Option<Ipid>,
    pub stub: Bytes,
}

impl RpcCall {
    pub fn new(opnum: u16, object: Option<Ipid>, stub: Bytes) -> Self {
        Self { opnum, object, stub }
    }
}

/// A connection bound to an interface syntax
#[async_trait]
pub trait Connection: Send + Sync {
    /// Currently bound syntax
    fn syntax(&self) -> SyntaxId;

    /// Data representation negotiated for this connection
    fn ndr_context(&self) -> NdrContext;

    /// Send a request stub and return the response stub
    ///
    /// A server fault is returned as `DcomError::Fault`.
    async fn call(&self, ctx: &CallContext, call: RpcCall) -> Result<Bytes>;

    /// Rebind this connection to another syntax
    async fn alter_context(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<()>;

    /// Open another connection to the same server, bound to `syntax`
    async fn sub_conn(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<Arc<dyn Connection>> {
        let _ = ctx;
        Err(DcomError::SubConnUnsupported { syntax })
    }
}

/// Source of connections
#[async_trait]
pub trait Transport: Send + Sync {
    async fn bind(&self, ctx: &CallContext, syntax: SyntaxId) -> Result<Arc<dyn Connection>>;
}
