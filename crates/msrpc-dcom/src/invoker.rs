//! Client-side invocation
//!
//! [`ClientBase`] turns a typed [`Request`] into a call on a [`Connection`]
//! and the reply into a typed [`Response`]. Interface clients embed one and
//! implement [`InterfaceClient`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use crate::conn::{CallContext, CallOptions, Connection, RpcCall};
use crate::error::{CallError, CallResult, DcomError, Result};
use crate::frame::{decode_response, encode_request, Method, Params, Request, Response};
use crate::types::{Ipid, SyntaxId};

/// Per-client settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Options used when a call passes none of its own
    pub defaults: CallOptions,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ipid(mut self, ipid: Ipid) -> Self {
        self.defaults.ipid = Some(ipid);
        self
    }
}

/// Connection plus per-client defaults, shared by every client in an
/// interface chain
#[derive(Clone)]
pub struct ClientBase {
    conn: Arc<dyn Connection>,
    config: ClientConfig,
}

impl ClientBase {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self::with_config(conn, ClientConfig::default())
    }

    pub fn with_config(conn: Arc<dyn Connection>, config: ClientConfig) -> Self {
        Self { conn, config }
    }

    pub fn conn(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Default object of this client
    pub fn ipid(&self) -> Option<Ipid> {
        self.config.defaults.ipid
    }

    /// A copy addressing another object over the same connection
    pub fn with_ipid(&self, ipid: Ipid) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            config: self.config.clone().with_ipid(ipid),
        }
    }

    /// Marshal `request`, send it and unmarshal the reply
    ///
    /// A nonzero status is returned as `DcomError::Status` together with the
    /// decoded response.
    pub async fn invoke<M: Method>(
        &self,
        ctx: &CallContext,
        mut request: Request<M>,
        opts: &CallOptions,
    ) -> CallResult<Response<M>> {
        let ipid = opts
            .ipid
            .or(self.config.defaults.ipid)
            .ok_or(DcomError::MissingIpid { op_name: M::NAME })?;
        ctx.check()?;

        if request.this.cid.is_nil() {
            request.this.cid = ctx.causality();
        }
        if let Some(hooks) = request.params.request_hooks() {
            hooks.after_prepare_request()?;
        }

        let ndr = self.conn.ndr_context();
        let stub = encode_request(&request, ndr)?;
        debug!("Invoking {}: opnum={}, ipid={}", M::NAME, M::OPNUM, ipid);
        trace!("Request stub: {} bytes", stub.len());

        let reply = match self.conn.call(ctx, RpcCall::new(M::OPNUM, Some(ipid), stub)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{} failed: {}", M::NAME, e);
                return Err(e.into());
            }
        };
        trace!("Response stub: {} bytes", reply.len());

        let response = decode_response::<M>(reply, ndr)?;
        if response.status != 0 {
            let hresult = response.hresult();
            debug!("{} returned {}", M::NAME, hresult);
            return Err(CallError::new(
                DcomError::Status {
                    op_name: M::NAME,
                    hresult,
                },
                Some(response),
            ));
        }
        Ok(response)
    }
}

impl fmt::Debug for ClientBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBase")
            .field("syntax", &self.conn.syntax())
            .field("config", &self.config)
            .finish()
    }
}

/// Return `conn` if it is bound to `syntax`, else a sub-connection
///
/// Failing to open the sub-connection fails the whole connect.
pub async fn connect_syntax(
    ctx: &CallContext,
    conn: Arc<dyn Connection>,
    syntax: SyntaxId,
) -> Result<Arc<dyn Connection>> {
    if conn.syntax() == syntax {
        return Ok(conn);
    }
    info!("Opening sub-connection for {}", syntax);
    conn.sub_conn(ctx, syntax).await
}

/// Behaviour shared by every interface client
#[async_trait]
pub trait InterfaceClient: Clone + Send + Sync + Sized {
    /// Abstract syntax of the interface
    const SYNTAX: SyntaxId;

    /// Build the client chain around `base`
    fn from_base(base: ClientBase) -> Self;

    fn base(&self) -> &ClientBase;

    /// A copy addressing `ipid`, through every embedded base client
    fn with_ipid(&self, ipid: Ipid) -> Self;

    /// A client on `conn`, or on a sub-connection bound to [`Self::SYNTAX`]
    async fn connect(ctx: &CallContext, conn: Arc<dyn Connection>) -> Result<Self> {
        let conn = connect_syntax(ctx, conn, Self::SYNTAX).await?;
        Ok(Self::from_base(ClientBase::new(conn)))
    }

    fn conn(&self) -> &Arc<dyn Connection> {
        self.base().conn()
    }

    fn ipid(&self) -> Option<Ipid> {
        self.base().ipid()
    }

    /// Rebind the shared connection to this interface
    async fn alter_context(&self, ctx: &CallContext) -> Result<()> {
        self.conn().alter_context(ctx, Self::SYNTAX).await
    }
}
