//! NDR output stream
//!
//! `NdrWriter` owns the stub buffer and the deferred-pointee queue for one
//! marshal operation. Alignment is measured from the start of the stub.

use std::collections::{HashMap, VecDeque};

use bytes::{BufMut, Bytes, BytesMut};

use crate::{NdrContext, NdrEncode, NdrError, Result};

pub(crate) type DeferredWrite<'a> = Box<dyn FnOnce(&mut NdrWriter<'a>) -> Result<()> + 'a>;

/// First referent ID handed out, matching what Windows stubs emit.
pub const FIRST_REFERENT_ID: u32 = 0x0002_0000;

/// Gap between consecutive referent IDs.
pub const REFERENT_ID_STEP: u32 = 4;

/// Marshals values into an NDR stub.
pub struct NdrWriter<'a> {
    pub(crate) buf: BytesMut,
    pub(crate) ctx: NdrContext,
    pub(crate) deferred: VecDeque<DeferredWrite<'a>>,
    pub(crate) next_referent: u32,
    /// Full pointers already sent, keyed by address and type.
    pub(crate) full_pointers: HashMap<(usize, &'static str), u32>,
}

macro_rules! write_scalar {
    ($($name:ident: $ty:ty => $put:ident, $align:expr;)*) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.align($align);
                self.ctx.$put(&mut self.buf, value);
            }
        )*
    };
}

impl<'a> NdrWriter<'a> {
    /// Create an empty writer
    pub fn new(ctx: NdrContext) -> Self {
        Self {
            buf: BytesMut::new(),
            ctx,
            deferred: VecDeque::new(),
            next_referent: FIRST_REFERENT_ID,
            full_pointers: HashMap::new(),
        }
    }

    /// The data representation in use
    pub fn context(&self) -> &NdrContext {
        &self.ctx
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Number of pointees waiting for the next flush
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    /// Pad with zeros up to the next `alignment` boundary
    pub fn align(&mut self, alignment: usize) {
        let padding = NdrContext::align_padding(self.buf.len(), alignment);
        self.buf.put_bytes(0, padding);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    write_scalar! {
        write_u16: u16 => put_u16, 2;
        write_i16: i16 => put_i16, 2;
        write_u32: u32 => put_u32, 4;
        write_i32: i32 => put_i32, 4;
        write_u64: u64 => put_u64, 8;
        write_i64: i64 => put_i64, 8;
        write_f32: f32 => put_f32, 4;
        write_f64: f64 => put_f64, 8;
    }

    /// Raw bytes, no alignment
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Enqueue a pointee for the next deferred flush
    pub fn defer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut NdrWriter<'a>) -> Result<()> + 'a,
    {
        self.deferred.push_back(Box::new(f));
    }

    /// Flush the deferred queue in FIFO order.
    ///
    /// Pointees queued while writing an item are flushed right after that
    /// item, so embedded referents follow the pointee that holds them.
    pub fn write_deferred(&mut self) -> Result<()> {
        if self.deferred.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.deferred);
        for write in pending {
            write(self)?;
            self.write_deferred()?;
        }
        Ok(())
    }

    /// Write one top-level parameter followed by its pointees.
    pub fn write_param<T: NdrEncode + ?Sized>(&mut self, value: &'a T) -> Result<()> {
        value.ndr_encode(self)?;
        self.write_deferred()
    }

    /// Consume the writer, returning the stub.
    pub fn finish(self) -> Result<Bytes> {
        if !self.deferred.is_empty() {
            return Err(NdrError::PendingDeferred(self.deferred.len()));
        }
        Ok(self.buf.freeze())
    }
}
