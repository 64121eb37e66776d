//! Error types for DCOM calls

use std::fmt;

use msrpc_ndr::NdrError;
use thiserror::Error;

use crate::hresult::Hresult;
use crate::types::{Ipid, SyntaxId};

/// DCOM error types
#[derive(Debug, Error)]
pub enum DcomError {
    #[error("NDR error: {0}")]
    Ndr(#[from] NdrError),

    #[error("fault: {}", Hresult::from_u32(*status))]
    Fault { status: u32 },

    #[error("{op_name}: {hresult}")]
    Status { op_name: &'static str, hresult: Hresult },

    #[error("{op_name}: no IPID for call")]
    MissingIpid { op_name: &'static str },

    #[error("unknown opnum: {opnum}")]
    UnknownOpnum { opnum: u16 },

    #[error("not implemented")]
    NotImplemented,

    #[error("call cancelled")]
    Cancelled,

    #[error("sub-connection unsupported for {syntax}")]
    SubConnUnsupported { syntax: SyntaxId },

    #[error("bind rejected: {syntax} is not exported")]
    BindRejected { syntax: SyntaxId },

    #[error("stub too large: {size} bytes exceeds maximum {max}")]
    StubTooLarge { size: usize, max: usize },

    #[error("unknown object: IPID {ipid}")]
    UnknownObject { ipid: Ipid },

    #[error("invalid OBJREF: {0}")]
    InvalidObjRef(String),

    #[error("invalid string binding: {0}")]
    InvalidStringBinding(String),
}

pub type Result<T> = std::result::Result<T, DcomError>;

impl DcomError {
    /// Status code reported to the caller when this error ends a server call
    pub fn fault_status(&self) -> u32 {
        let hresult = match self {
            DcomError::Fault { status } => return *status,
            DcomError::Status { hresult, .. } => *hresult,
            DcomError::Ndr(_) => Hresult::RPC_X_BAD_STUB_DATA,
            DcomError::UnknownOpnum { .. } => Hresult::NCA_S_OP_RNG_ERROR,
            DcomError::NotImplemented => Hresult::E_NOTIMPL,
            DcomError::Cancelled => Hresult::NCA_S_FAULT_CANCEL,
            DcomError::BindRejected { .. } => Hresult::NCA_S_UNK_IF,
            DcomError::UnknownObject { .. } => Hresult::CO_E_OBJNOTCONNECTED,
            DcomError::StubTooLarge { .. } => Hresult::NCA_S_PROTO_ERROR,
            _ => Hresult::E_UNEXPECTED,
        };
        hresult.as_u32()
    }

    /// The remote HRESULT of a `Status` error
    pub fn hresult(&self) -> Option<Hresult> {
        match self {
            DcomError::Status { hresult, .. } => Some(*hresult),
            DcomError::Fault { status } => Some(Hresult::from_u32(*status)),
            _ => None,
        }
    }
}

/// A failed call, with the response if one was decoded
///
/// A nonzero method status still carries its out-parameters; transport,
/// fault and decode failures carry none.
pub struct CallError<R> {
    pub error: DcomError,
    pub response: Option<R>,
}

pub type CallResult<R> = std::result::Result<R, CallError<R>>;

impl<R> CallError<R> {
    pub fn new(error: DcomError, response: Option<R>) -> Self {
        Self { error, response }
    }

    pub fn into_error(self) -> DcomError {
        self.error
    }
}

impl<R> From<DcomError> for CallError<R> {
    fn from(error: DcomError) -> Self {
        Self::new(error, None)
    }
}

impl<R> From<NdrError> for CallError<R> {
    fn from(error: NdrError) -> Self {
        Self::new(error.into(), None)
    }
}

impl<R> From<CallError<R>> for DcomError {
    fn from(err: CallError<R>) -> Self {
        err.error
    }
}

impl<R: fmt::Debug> fmt::Debug for CallError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallError")
            .field("error", &self.error)
            .field("response", &self.response)
            .finish()
    }
}

impl<R> fmt::Display for CallError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<R: fmt::Debug> std::error::Error for CallError<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
