//! NDR string types
//!
//! NDR strings are conformant varying arrays of characters.
//!
//! Wire format:
//! ```text
//! max_count: u32    # Maximum elements
//! offset: u32       # First transmitted element
//! actual_count: u32 # Transmitted elements, terminator included if any
//! chars[actual_count]
//! ```
//!
//! `[string]` attributed fields carry a null terminator in the count.
//! Counted fields (a length-prefixed buffer) carry exactly the characters.
//! A Rust `String` marshals as a null-terminated `[string] wchar_t*` pointee.

use crate::error::wire_count;
use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result};

/// How a string's length is conveyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `[string]`: a trailing NUL is part of the count
    NullTerminated,
    /// Length-prefixed: exactly the characters, no NUL
    Counted,
}

impl<'a> NdrWriter<'a> {
    /// Conformant varying UTF-16 string
    pub fn write_utf16(&mut self, value: &str, termination: Termination) -> Result<()> {
        let mut units: Vec<u16> = value.encode_utf16().collect();
        if termination == Termination::NullTerminated {
            units.push(0);
        }
        let count = wire_count(units.len())?;
        self.write_varying_header(Some(count), 0, count);
        for unit in units {
            self.write_u16(unit);
        }
        Ok(())
    }

    /// Conformant varying 8-bit string, always NUL terminated
    pub fn write_ansi(&mut self, value: &str) -> Result<()> {
        let count = wire_count(value.len() + 1)?;
        self.write_varying_header(Some(count), 0, count);
        self.write_bytes(value.as_bytes());
        self.write_u8(0);
        Ok(())
    }
}

impl<'a> NdrReader<'a> {
    fn read_string_count(&mut self) -> Result<usize> {
        let (_, _, actual) = self.read_varying_header(true)?;
        let limit = self.ctx.limits.max_string_len;
        if actual as usize > limit {
            return Err(NdrError::AllocationLimitExceeded {
                requested: actual as usize,
                limit,
            });
        }
        Ok(actual as usize)
    }

    /// Conformant varying UTF-16 string
    pub fn read_utf16(&mut self, termination: Termination) -> Result<String> {
        let count = self.read_string_count()?;
        self.check_count(count as u32, 2)?;
        let mut units = Vec::with_capacity(count);
        for _ in 0..count {
            units.push(self.read_u16()?);
        }
        if termination == Termination::NullTerminated && units.pop() != Some(0) {
            return Err(NdrError::InvalidString("missing null terminator".to_string()));
        }
        Ok(char::decode_utf16(units).collect::<std::result::Result<String, _>>()?)
    }

    /// Conformant varying 8-bit string
    pub fn read_ansi(&mut self) -> Result<String> {
        let count = self.read_string_count()?;
        let bytes = self.read_bytes(count)?;
        match bytes.split_last() {
            Some((0, text)) => Ok(String::from_utf8(text.to_vec())?),
            _ => Err(NdrError::InvalidString("missing null terminator".to_string())),
        }
    }
}

impl NdrEncode for String {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_utf16(self, Termination::NullTerminated)
    }
}

impl NdrDecode for String {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        *self = r.read_utf16(Termination::NullTerminated)?;
        Ok(())
    }
}

/// ANSI string (`[string] char*` pointee)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdrString(pub String);

impl NdrString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NdrString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl NdrEncode for NdrString {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_ansi(&self.0)
    }
}

impl NdrDecode for NdrString {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        self.0 = r.read_ansi()?;
        Ok(())
    }
}
