//! NDR array types
//!
//! NDR supports several array types:
//!
//! - Fixed arrays: size known at compile time, elements only
//! - Conformant arrays: `max_count` prefix, then the elements
//! - Varying arrays: `offset` and `actual_count` prefix, then the elements
//! - Conformant varying arrays: all three counts, then the elements
//!
//! The `_with` methods are generic over the element codec: the caller
//! passes the function that marshals one element. `Vec<T>` marshals as a
//! conformant array and `[T; N]` as a fixed array.
//!
//! Inside a conformant structure the conformance is hoisted to the start
//! of the structure. Such structures call [`NdrWriter::write_conformance`]
//! first and [`NdrWriter::write_elements_with`] where the array sits.

use crate::error::wire_count;
use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result};

impl<'a> NdrWriter<'a> {
    /// Conformance (`max_count`) of a conformant array or structure
    pub fn write_conformance(&mut self, max_count: u32) {
        self.write_u32(max_count);
    }

    /// One conformance per dimension, as hoisted by multi-dimensional arrays
    pub fn write_conformances(&mut self, max_counts: &[u32]) {
        for &max_count in max_counts {
            self.write_u32(max_count);
        }
    }

    /// Array header: optional `max_count`, then `offset` and `actual_count`
    pub fn write_varying_header(&mut self, max_count: Option<u32>, offset: u32, actual_count: u32) {
        if let Some(max_count) = max_count {
            self.write_u32(max_count);
        }
        self.write_u32(offset);
        self.write_u32(actual_count);
    }

    /// Elements only, each marshaled by `f`
    pub fn write_elements_with<T, F>(&mut self, items: &'a [T], mut f: F) -> Result<()>
    where
        F: FnMut(&mut NdrWriter<'a>, &'a T) -> Result<()>,
    {
        for item in items {
            f(self, item)?;
        }
        Ok(())
    }

    pub fn write_conformant_array_with<T, F>(&mut self, items: &'a [T], f: F) -> Result<()>
    where
        F: FnMut(&mut NdrWriter<'a>, &'a T) -> Result<()>,
    {
        self.write_conformance(wire_count(items.len())?);
        self.write_elements_with(items, f)
    }

    /// Varying array starting at `offset` of a fixed-size buffer
    pub fn write_varying_array_with<T, F>(&mut self, offset: u32, items: &'a [T], f: F) -> Result<()>
    where
        F: FnMut(&mut NdrWriter<'a>, &'a T) -> Result<()>,
    {
        self.write_varying_header(None, offset, wire_count(items.len())?);
        self.write_elements_with(items, f)
    }

    pub fn write_conformant_varying_array_with<T, F>(
        &mut self,
        max_count: u32,
        offset: u32,
        items: &'a [T],
        f: F,
    ) -> Result<()>
    where
        F: FnMut(&mut NdrWriter<'a>, &'a T) -> Result<()>,
    {
        let actual_count = wire_count(items.len())?;
        check_bounds(max_count, offset, actual_count)?;
        self.write_varying_header(Some(max_count), offset, actual_count);
        self.write_elements_with(items, f)
    }
}

fn check_bounds(max_count: u32, offset: u32, actual_count: u32) -> Result<()> {
    if u64::from(offset) + u64::from(actual_count) > u64::from(max_count) {
        return Err(NdrError::ConformanceMismatch {
            max_count,
            offset,
            actual_count,
        });
    }
    Ok(())
}

impl<'a> NdrReader<'a> {
    pub fn read_conformance(&mut self) -> Result<u32> {
        self.read_u32()
    }

    /// Read `dimensions` hoisted conformances
    pub fn read_conformances(&mut self, dimensions: usize) -> Result<Vec<u32>> {
        self.check_count(wire_count(dimensions)?, 4)?;
        (0..dimensions).map(|_| self.read_u32()).collect()
    }

    /// Array header: `(max_count, offset, actual_count)`.
    ///
    /// Without a conformance `max_count` is reported as `offset + actual_count`.
    /// With one, a window that overruns it is rejected.
    pub fn read_varying_header(&mut self, conformant: bool) -> Result<(u32, u32, u32)> {
        let max_count = if conformant {
            Some(self.read_u32()?)
        } else {
            None
        };
        let offset = self.read_u32()?;
        let actual_count = self.read_u32()?;
        match max_count {
            Some(max_count) => {
                check_bounds(max_count, offset, actual_count)?;
                Ok((max_count, offset, actual_count))
            }
            None => Ok((offset.saturating_add(actual_count), offset, actual_count)),
        }
    }

    /// `count` elements decoded in place by `f`.
    ///
    /// `min_size` is the smallest wire size of one element; the count is
    /// validated against it before `dest` grows.
    pub fn read_elements_with<T, F>(
        &mut self,
        dest: &'a mut Vec<T>,
        count: u32,
        min_size: usize,
        mut f: F,
    ) -> Result<()>
    where
        T: Default,
        F: FnMut(&mut NdrReader<'a>, &'a mut T) -> Result<()>,
    {
        let count = self.check_count(count, min_size)?;
        dest.clear();
        dest.resize_with(count, T::default);
        for item in dest {
            f(self, item)?;
        }
        Ok(())
    }

    pub fn read_conformant_array_with<T, F>(&mut self, dest: &'a mut Vec<T>, min_size: usize, f: F) -> Result<()>
    where
        T: Default,
        F: FnMut(&mut NdrReader<'a>, &'a mut T) -> Result<()>,
    {
        let count = self.read_conformance()?;
        self.read_elements_with(dest, count, min_size, f)
    }

    /// Varying array; returns the transmitted offset.
    pub fn read_varying_array_with<T, F>(&mut self, dest: &'a mut Vec<T>, min_size: usize, f: F) -> Result<u32>
    where
        T: Default,
        F: FnMut(&mut NdrReader<'a>, &'a mut T) -> Result<()>,
    {
        let (_, offset, actual_count) = self.read_varying_header(false)?;
        self.read_elements_with(dest, actual_count, min_size, f)?;
        Ok(offset)
    }

    /// Conformant varying array; returns `(max_count, offset)`.
    pub fn read_conformant_varying_array_with<T, F>(
        &mut self,
        dest: &'a mut Vec<T>,
        min_size: usize,
        f: F,
    ) -> Result<(u32, u32)>
    where
        T: Default,
        F: FnMut(&mut NdrReader<'a>, &'a mut T) -> Result<()>,
    {
        let (max_count, offset, actual_count) = self.read_varying_header(true)?;
        self.read_elements_with(dest, actual_count, min_size, f)?;
        Ok((max_count, offset))
    }
}

fn encode_element<'a, T: NdrEncode>(w: &mut NdrWriter<'a>, item: &'a T) -> Result<()> {
    item.ndr_encode(w)
}

fn decode_element<'a, T: NdrDecode>(r: &mut NdrReader<'a>, item: &'a mut T) -> Result<()> {
    item.ndr_decode(r)
}

/// Conformant array (`[size_is(n)] T*` pointee)
impl<T: NdrEncode> NdrEncode for Vec<T> {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_conformant_array_with(self, encode_element)
    }
}

impl<T: NdrDecode + Default> NdrDecode for Vec<T> {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        r.read_conformant_array_with(self, 1, decode_element)
    }
}

/// Fixed array: the elements, no prefix
impl<T: NdrEncode, const N: usize> NdrEncode for [T; N] {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_elements_with(self, encode_element)
    }
}

impl<T: NdrDecode, const N: usize> NdrDecode for [T; N] {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        for item in self {
            item.ndr_decode(r)?;
        }
        Ok(())
    }
}

/// Varying array: a window of a buffer whose size both sides know
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VaryingArray<T> {
    pub offset: u32,
    pub elements: Vec<T>,
}

impl<T> VaryingArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            offset: 0,
            elements,
        }
    }
}

impl<T: NdrEncode> NdrEncode for VaryingArray<T> {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_varying_array_with(self.offset, &self.elements, encode_element)
    }
}

impl<T: NdrDecode + Default> NdrDecode for VaryingArray<T> {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        self.offset = r.read_varying_array_with(&mut self.elements, 1, decode_element)?;
        Ok(())
    }
}

/// Conformant varying array (`[size_is(m), length_is(n)]`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantVaryingArray<T> {
    pub max_count: u32,
    pub offset: u32,
    pub elements: Vec<T>,
}

impl<T> ConformantVaryingArray<T> {
    /// Fully transmitted array: `max_count` equals the element count
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            max_count: elements.len() as u32,
            offset: 0,
            elements,
        }
    }

    /// Partially filled buffer of `max_count` elements
    pub fn with_max(max_count: u32, elements: Vec<T>) -> Self {
        Self {
            max_count,
            offset: 0,
            elements,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: NdrEncode> NdrEncode for ConformantVaryingArray<T> {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_conformant_varying_array_with(self.max_count, self.offset, &self.elements, encode_element)
    }
}

impl<T: NdrDecode + Default> NdrDecode for ConformantVaryingArray<T> {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        let (max_count, offset) = r.read_conformant_varying_array_with(&mut self.elements, 1, decode_element)?;
        self.max_count = max_count;
        self.offset = offset;
        Ok(())
    }
}
