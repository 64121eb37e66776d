//! Opnum dispatch
//!
//! A DCOM interface inherits the opnums of its base interfaces. A [`Router`]
//! is the table of `(first_opnum, dispatch)` levels for one interface, one
//! level per interface in the inheritance chain. A call is routed to the
//! last level whose first opnum does not exceed the call's opnum.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msrpc_ndr::NdrContext;
use tracing::{debug, trace, warn};

use crate::conn::CallContext;
use crate::error::{DcomError, Result};
use crate::frame::{decode_request, Frame, Method, Operation, Request, Response};

/// One level of the opnum table
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Decode, execute and return the completed frame
    ///
    /// `Ok(None)` means this level does not know `opnum`.
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>>;
}

/// Decode a request for `M`, run `handler` and wrap the result in a frame
pub async fn dispatch_method<M, F, Fut>(
    stub: Bytes,
    ndr: NdrContext,
    handler: F,
) -> Result<Option<Box<dyn Operation>>>
where
    M: Method,
    F: FnOnce(Request<M>) -> Fut,
    Fut: Future<Output = Result<Response<M>>>,
{
    trace!("Decoding {}: stub_len={}", M::NAME, stub.len());
    let request = decode_request::<M>(stub, ndr)?;
    let response = handler(request.clone()).await?;
    Ok(Some(Box::new(Frame::completed(request, response))))
}

/// Opnum table for one interface and its bases
#[derive(Clone, Default)]
pub struct Router {
    levels: Vec<(u16, Arc<dyn Dispatch>)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the level whose opnums start at `first_opnum`
    ///
    /// Levels are kept in ascending order; a level with the same first
    /// opnum replaces the old one.
    pub fn level(mut self, first_opnum: u16, dispatch: Arc<dyn Dispatch>) -> Self {
        let at = self.levels.partition_point(|(first, _)| *first < first_opnum);
        match self.levels.get_mut(at) {
            Some(level) if level.0 == first_opnum => level.1 = dispatch,
            _ => self.levels.insert(at, (first_opnum, dispatch)),
        }
        self
    }

    /// First opnum of every level, ascending
    pub fn first_opnums(&self) -> Vec<u16> {
        self.levels.iter().map(|(first, _)| *first).collect()
    }

    /// First opnum of the most derived level
    pub fn top(&self) -> Option<u16> {
        self.levels.last().map(|(first, _)| *first)
    }

    /// The level that owns `opnum`
    pub fn route(&self, opnum: u16) -> Option<&Arc<dyn Dispatch>> {
        self.levels
            .iter()
            .rev()
            .find(|(first, _)| *first <= opnum)
            .map(|(_, dispatch)| dispatch)
    }

    /// The router of the base interface
    pub fn base(&self) -> Router {
        let keep = self.levels.len().saturating_sub(1);
        Router {
            levels: self.levels[..keep].to_vec(),
        }
    }

    /// Execute a call and marshal its response
    pub async fn serve(&self, ctx: &CallContext, opnum: u16, stub: Bytes, ndr: NdrContext) -> Result<Bytes> {
        let Some(mut op) = self.dispatch(ctx, opnum, stub, ndr).await? else {
            warn!("Unknown opnum {}", opnum);
            return Err(DcomError::UnknownOpnum { opnum });
        };
        if let Some(hooks) = op.response_hooks() {
            hooks.after_prepare_response()?;
        }
        let response = op.marshal_response(ndr)?;
        trace!("{} returned status 0x{:08x}: {} bytes", op.op_name(), op.status(), response.len());
        Ok(response)
    }
}

#[async_trait]
impl Dispatch for Router {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        opnum: u16,
        stub: Bytes,
        ndr: NdrContext,
    ) -> Result<Option<Box<dyn Operation>>> {
        let Some(level) = self.route(opnum) else {
            return Ok(None);
        };
        debug!("Dispatching opnum {}", opnum);
        level.dispatch(ctx, opnum, stub, ndr).await
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("levels", &self.first_opnums())
            .finish()
    }
}
