//! NDR encoding trait

use crate::{NdrWriter, Result};

/// A type that can marshal itself into an NDR stream.
///
/// The `'a` borrow lets pointer fields enqueue closures that refer back into
/// `self`; those closures run when the writer's deferred queue is flushed.
pub trait NdrEncode {
    /// Write the immediate part of the value, enqueueing any pointees.
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()>;
}
