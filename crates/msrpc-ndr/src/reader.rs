//! NDR input stream
//!
//! `NdrReader` walks a stub and keeps the deferred-read queue for one
//! unmarshal operation. Every read is bounds checked; malformed input is
//! reported as an [`NdrError`], never a panic.

use std::collections::VecDeque;

use bytes::{Buf, Bytes};

use crate::pointers::FullPointerTable;
use crate::{NdrContext, NdrDecode, NdrError, Result};

pub(crate) type DeferredRead<'a> = Box<dyn FnOnce(&mut NdrReader<'a>) -> Result<()> + 'a>;

/// Unmarshals values from an NDR stub.
pub struct NdrReader<'a> {
    pub(crate) data: Bytes,
    pub(crate) pos: usize,
    pub(crate) ctx: NdrContext,
    pub(crate) deferred: VecDeque<DeferredRead<'a>>,
    pub(crate) full_pointers: FullPointerTable,
    pub(crate) depth: usize,
}

macro_rules! read_scalar {
    ($($name:ident: $ty:ty => $get:ident, $size:expr;)*) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let ctx = self.ctx;
                let mut bytes = self.take_aligned($size)?;
                Ok(ctx.$get(&mut bytes))
            }
        )*
    };
}

impl<'a> NdrReader<'a> {
    /// Start reading `data` from its first byte
    pub fn new(data: Bytes, ctx: NdrContext) -> Self {
        Self {
            data,
            pos: 0,
            ctx,
            deferred: VecDeque::new(),
            full_pointers: FullPointerTable::default(),
            depth: 0,
        }
    }

    /// The data representation in use
    pub fn context(&self) -> &NdrContext {
        &self.ctx
    }

    /// Offset from the start of the stub
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Number of pointee reads waiting for the next flush
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let have = self.remaining();
        if have < needed {
            return Err(NdrError::BufferUnderflow { needed, have });
        }
        Ok(())
    }

    /// Skip padding up to the next `alignment` boundary
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = NdrContext::align_padding(self.pos, alignment);
        self.ensure(padding)?;
        self.pos += padding;
        Ok(())
    }

    fn take_aligned(&mut self, size: usize) -> Result<&[u8]> {
        self.align(size)?;
        self.ensure(size)?;
        let start = self.pos;
        self.pos += size;
        Ok(&self.data[start..start + size])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_aligned(1)?.get_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take_aligned(1)?.get_i8())
    }

    read_scalar! {
        read_u16: u16 => get_u16, 2;
        read_i16: i16 => get_i16, 2;
        read_u32: u32 => get_u32, 4;
        read_i32: i32 => get_i32, 4;
        read_u64: u64 => get_u64, 8;
        read_i64: i64 => get_i64, 8;
        read_f32: f32 => get_f32, 4;
        read_f64: f64 => get_f64, 8;
    }

    /// Raw bytes, no alignment
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        let out = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(out)
    }

    /// Validate a wire element count before anything is allocated for it.
    ///
    /// `min_element_size` is a lower bound on the wire size of one element;
    /// a count that cannot possibly fit in the remaining bytes is rejected.
    pub fn check_count(&self, count: u32, min_element_size: usize) -> Result<usize> {
        let count = count as usize;
        let limit = self.ctx.limits.max_array_elements;
        if count > limit {
            return Err(NdrError::AllocationLimitExceeded {
                requested: count,
                limit,
            });
        }
        self.ensure(count.saturating_mul(min_element_size))?;
        Ok(count)
    }

    /// Enqueue a pointee read for the next deferred flush
    pub fn defer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut NdrReader<'a>) -> Result<()> + 'a,
    {
        self.deferred.push_back(Box::new(f));
    }

    /// Flush the deferred queue, mirroring [`NdrWriter::write_deferred`].
    ///
    /// [`NdrWriter::write_deferred`]: crate::NdrWriter::write_deferred
    pub fn read_deferred(&mut self) -> Result<()> {
        if self.deferred.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.deferred);
        for read in pending {
            read(self)?;
            self.read_deferred()?;
        }
        Ok(())
    }

    /// Read one top-level parameter followed by its pointees.
    pub fn read_param<T: NdrDecode + ?Sized>(&mut self, dest: &'a mut T) -> Result<()> {
        dest.ndr_decode(self)?;
        self.read_deferred()
    }

    /// Decode a complete value, pointees included, into an owned `T`.
    ///
    /// The value is decoded in a child scope that shares the stream position
    /// and the full-pointer table with `self` but has its own deferred queue,
    /// which is drained before returning.
    pub fn read_owned<T: NdrDecode + Default>(&mut self) -> Result<T> {
        let limit = self.ctx.limits.max_depth;
        if self.depth >= limit {
            return Err(NdrError::NestingTooDeep(limit));
        }

        let mut value = T::default();
        let (pos, full_pointers, result) = {
            let mut scope = self.child_scope();
            let result = value
                .ndr_decode(&mut scope)
                .and_then(|()| scope.read_deferred());
            (scope.pos, std::mem::take(&mut scope.full_pointers), result)
        };
        self.pos = pos;
        self.full_pointers = full_pointers;
        result.map(|()| value)
    }

    fn child_scope<'b>(&mut self) -> NdrReader<'b> {
        NdrReader {
            data: self.data.clone(),
            pos: self.pos,
            ctx: self.ctx,
            deferred: VecDeque::new(),
            full_pointers: std::mem::take(&mut self.full_pointers),
            depth: self.depth + 1,
        }
    }

    /// Check that every deferred read was flushed.
    pub fn finish(self) -> Result<()> {
        if !self.deferred.is_empty() {
            return Err(NdrError::PendingDeferred(self.deferred.len()));
        }
        Ok(())
    }
}
