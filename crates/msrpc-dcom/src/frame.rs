//! Operation frames
//!
//! Every DCOM method is described by a [`Method`] marker type: its opnum,
//! its display name and its in/out parameter structs. A [`Frame`] holds the
//! request and response of one call and is the unit the client invoker and
//! the server router marshal.
//!
//! Wire layout:
//!
//! ```text
//! request:  ORPCTHIS, flush, in-param 1, flush, ... in-param n, flush
//! response: ORPCTHAT, flush, out-param 1, flush, ... out-param n, flush, status (i32)
//! ```

use std::fmt;

use bytes::Bytes;
use msrpc_ndr::{NdrContext, NdrDecode, NdrEncode, NdrReader, NdrWriter};

use crate::error::Result;
use crate::hresult::Hresult;
use crate::types::{OrpcThat, OrpcThis};

/// Runs after a request is built and before it is marshaled
///
/// Typical use is filling a count field from the length of an array.
pub trait AfterPrepareRequest {
    fn after_prepare_request(&mut self) -> Result<()>;
}

/// Runs after a server method returns and before the response is marshaled
pub trait AfterPrepareResponse {
    fn after_prepare_response(&mut self) -> Result<()>;
}

/// The parameters of one direction of a method call
///
/// `marshal` and `unmarshal` handle the fields in declaration order, each
/// top-level parameter followed by one deferred flush (`write_param`,
/// `write_pointer_param` and their read counterparts do this).
pub trait Params: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()>;

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()>;

    fn request_hooks(&mut self) -> Option<&mut dyn AfterPrepareRequest> {
        None
    }

    fn response_hooks(&mut self) -> Option<&mut dyn AfterPrepareResponse> {
        None
    }
}

impl Params for () {
    fn marshal<'a>(&'a self, _w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        Ok(())
    }

    fn unmarshal<'a>(&'a mut self, _r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        Ok(())
    }
}

/// A single-value parameter list, used by property getters and setters
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Property<T> {
    pub value: T,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Params for Property<T>
where
    T: NdrEncode + NdrDecode + Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn marshal<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_param(&self.value)
    }

    fn unmarshal<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.read_param(&mut self.value)
    }
}

/// Marker type describing one remote method
pub trait Method: Send + Sync + 'static {
    const OPNUM: u16;
    /// Display name, `/Interface/vN/Method`
    const NAME: &'static str;
    type In: Params;
    type Out: Params;
}

/// Request half of a call
pub struct Request<M: Method> {
    pub this: OrpcThis,
    pub params: M::In,
}

impl<M: Method> Request<M> {
    pub fn new(params: M::In) -> Self {
        Self {
            this: OrpcThis::default(),
            params,
        }
    }
}

impl<M: Method> Default for Request<M> {
    fn default() -> Self {
        Self::new(M::In::default())
    }
}

impl<M: Method> Clone for Request<M> {
    fn clone(&self) -> Self {
        Self {
            this: self.this.clone(),
            params: self.params.clone(),
        }
    }
}

impl<M: Method> PartialEq for Request<M> {
    fn eq(&self, other: &Self) -> bool {
        self.this == other.this && self.params == other.params
    }
}

impl<M: Method> fmt::Debug for Request<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("op", &M::NAME)
            .field("this", &self.this)
            .field("params", &self.params)
            .finish()
    }
}

/// Response half of a call
pub struct Response<M: Method> {
    pub that: OrpcThat,
    pub params: M::Out,
    /// The method's HRESULT
    pub status: i32,
}

impl<M: Method> Response<M> {
    pub fn new(params: M::Out) -> Self {
        Self {
            that: OrpcThat::default(),
            params,
            status: 0,
        }
    }

    pub fn with_status(params: M::Out, status: Hresult) -> Self {
        Self {
            status: status.0,
            ..Self::new(params)
        }
    }

    pub fn hresult(&self) -> Hresult {
        Hresult(self.status)
    }
}

impl<M: Method> Default for Response<M> {
    fn default() -> Self {
        Self::new(M::Out::default())
    }
}

impl<M: Method> Clone for Response<M> {
    fn clone(&self) -> Self {
        Self {
            that: self.that.clone(),
            params: self.params.clone(),
            status: self.status,
        }
    }
}

impl<M: Method> PartialEq for Response<M> {
    fn eq(&self, other: &Self) -> bool {
        self.that == other.that && self.params == other.params && self.status == other.status
    }
}

impl<M: Method> fmt::Debug for Response<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("op", &M::NAME)
            .field("that", &self.that)
            .field("params", &self.params)
            .field("status", &self.hresult())
            .finish()
    }
}

pub fn encode_request<M: Method>(request: &Request<M>, ctx: NdrContext) -> msrpc_ndr::Result<Bytes> {
    let mut w = NdrWriter::new(ctx);
    w.write_param(&request.this)?;
    request.params.marshal(&mut w)?;
    w.finish()
}

pub fn decode_request<M: Method>(stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<Request<M>> {
    let mut request = Request::<M>::default();
    let mut r = NdrReader::new(stub, ctx);
    r.read_param(&mut request.this)?;
    request.params.unmarshal(&mut r)?;
    r.finish()?;
    Ok(request)
}

pub fn encode_response<M: Method>(response: &Response<M>, ctx: NdrContext) -> msrpc_ndr::Result<Bytes> {
    let mut w = NdrWriter::new(ctx);
    w.write_param(&response.that)?;
    response.params.marshal(&mut w)?;
    w.write_i32(response.status);
    w.finish()
}

pub fn decode_response<M: Method>(stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<Response<M>> {
    let mut response = Response::<M>::default();
    let mut r = NdrReader::new(stub, ctx);
    r.read_param(&mut response.that)?;
    response.params.unmarshal(&mut r)?;
    response.status = r.read_i32()?;
    r.finish()?;
    Ok(response)
}

/// Object-safe view of a call in flight
pub trait Operation: Send {
    fn opnum(&self) -> u16;

    fn op_name(&self) -> &'static str;

    fn marshal_request(&self, ctx: NdrContext) -> msrpc_ndr::Result<Bytes>;

    fn unmarshal_request(&mut self, stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<()>;

    fn marshal_response(&self, ctx: NdrContext) -> msrpc_ndr::Result<Bytes>;

    fn unmarshal_response(&mut self, stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<()>;

    /// The response status
    fn status(&self) -> i32;

    fn request_hooks(&mut self) -> Option<&mut dyn AfterPrepareRequest>;

    fn response_hooks(&mut self) -> Option<&mut dyn AfterPrepareResponse>;
}

/// Request and response of one call
pub struct Frame<M: Method> {
    pub request: Request<M>,
    pub response: Response<M>,
}

impl<M: Method> Frame<M> {
    pub fn new(request: Request<M>) -> Self {
        Self {
            request,
            response: Response::default(),
        }
    }

    /// A frame whose server side already ran
    pub fn completed(request: Request<M>, response: Response<M>) -> Self {
        Self { request, response }
    }

    pub fn into_response(self) -> Response<M> {
        self.response
    }
}

impl<M: Method> Default for Frame<M> {
    fn default() -> Self {
        Self::new(Request::default())
    }
}

impl<M: Method> fmt::Debug for Frame<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("request", &self.request)
            .field("response", &self.response)
            .finish()
    }
}

impl<M: Method> Operation for Frame<M> {
    fn opnum(&self) -> u16 {
        M::OPNUM
    }

    fn op_name(&self) -> &'static str {
        M::NAME
    }

    fn marshal_request(&self, ctx: NdrContext) -> msrpc_ndr::Result<Bytes> {
        encode_request(&self.request, ctx)
    }

    fn unmarshal_request(&mut self, stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<()> {
        self.request = decode_request(stub, ctx)?;
        Ok(())
    }

    fn marshal_response(&self, ctx: NdrContext) -> msrpc_ndr::Result<Bytes> {
        encode_response(&self.response, ctx)
    }

    fn unmarshal_response(&mut self, stub: Bytes, ctx: NdrContext) -> msrpc_ndr::Result<()> {
        self.response = decode_response(stub, ctx)?;
        Ok(())
    }

    fn status(&self) -> i32 {
        self.response.status
    }

    fn request_hooks(&mut self) -> Option<&mut dyn AfterPrepareRequest> {
        self.request.params.request_hooks()
    }

    fn response_hooks(&mut self) -> Option<&mut dyn AfterPrepareResponse> {
        self.response.params.response_hooks()
    }
}
