//! NDR decoding trait

use crate::{NdrReader, Result};

/// A type that can unmarshal itself from an NDR stream, in place.
///
/// Decoding fills `self` rather than returning a value because pointer
/// fields are only patched once the reader flushes its deferred queue.
/// Types start from `Default` and are overwritten field by field.
pub trait NdrDecode {
    /// Read the immediate part of the value, enqueueing any pointee reads.
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()>;
}
