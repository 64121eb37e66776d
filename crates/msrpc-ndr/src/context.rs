//! NDR data representation context
//!
//! The context carries the negotiated byte order and the decoding limits
//! that protect a reader against hostile length prefixes. It is `Copy` so
//! that child reader scopes can inherit it cheaply.

use bytes::{Buf, BufMut};

/// Limits applied while decoding untrusted stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdrLimits {
    /// Largest element count accepted for any array or string.
    pub max_array_elements: usize,
    /// Largest string length, in code units.
    pub max_string_len: usize,
    /// Deepest pointee nesting accepted before giving up.
    pub max_depth: usize,
}

impl Default for NdrLimits {
    fn default() -> Self {
        Self {
            max_array_elements: 1 << 20,
            max_string_len: 1 << 16,
            max_depth: 64,
        }
    }
}

/// NDR encoding/decoding context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdrContext {
    /// Whether to use little-endian byte order
    pub little_endian: bool,
    /// Decoding limits
    pub limits: NdrLimits,
}

macro_rules! byte_order_accessors {
    ($($ty:ty => $put:ident, $get:ident, $put_le:ident, $get_le:ident;)*) => {
        $(
            #[inline]
            pub fn $put<B: BufMut>(&self, buf: &mut B, value: $ty) {
                if self.little_endian {
                    buf.$put_le(value)
                } else {
                    buf.$put(value)
                }
            }

            /// Caller guarantees `buf` holds enough bytes.
            #[inline]
            pub fn $get<B: Buf>(&self, buf: &mut B) -> $ty {
                if self.little_endian {
                    buf.$get_le()
                } else {
                    buf.$get()
                }
            }
        )*
    };
}

impl NdrContext {
    /// Little-endian context with default limits
    pub fn new() -> Self {
        Self {
            little_endian: true,
            limits: NdrLimits::default(),
        }
    }

    /// Big-endian context with default limits
    pub fn big_endian() -> Self {
        Self {
            little_endian: false,
            ..Self::new()
        }
    }

    /// Context with the given byte order
    pub fn with_byte_order(little_endian: bool) -> Self {
        Self {
            little_endian,
            ..Self::new()
        }
    }

    /// Replace the decoding limits
    pub fn with_limits(mut self, limits: NdrLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Padding needed to move `position` onto an `alignment` boundary
    #[inline]
    pub fn align_padding(position: usize, alignment: usize) -> usize {
        if alignment <= 1 {
            return 0;
        }
        (alignment - position % alignment) % alignment
    }

    byte_order_accessors! {
        u16 => put_u16, get_u16, put_u16_le, get_u16_le;
        i16 => put_i16, get_i16, put_i16_le, get_i16_le;
        u32 => put_u32, get_u32, put_u32_le, get_u32_le;
        i32 => put_i32, get_i32, put_i32_le, get_i32_le;
        u64 => put_u64, get_u64, put_u64_le, get_u64_le;
        i64 => put_i64, get_i64, put_i64_le, get_i64_le;
        f32 => put_f32, get_f32, put_f32_le, get_f32_le;
        f64 => put_f64, get_f64, put_f64_le, get_f64_le;
    }
}

impl Default for NdrContext {
    fn default() -> Self {
        Self::new()
    }
}
