//! NDR enumerations
//!
//! A plain NDR `enum` travels as a 16-bit value aligned to 2. Types marked
//! `[v1_enum]` travel as 32 bits. Values outside the declared set are
//! rejected on read.

use crate::{NdrError, NdrReader, NdrWriter, Result};

/// An enumeration with a fixed set of wire values.
///
/// Usually implemented through [`ndr_enum!`](crate::ndr_enum).
pub trait NdrEnum: Copy + Sized {
    fn to_wire(self) -> i32;
    fn from_wire(value: i32) -> Option<Self>;
}

impl<'a> NdrWriter<'a> {
    /// 16-bit enumeration value
    pub fn write_enum<E: NdrEnum>(&mut self, value: E) -> Result<()> {
        let wire = value.to_wire();
        let short = u16::try_from(wire).map_err(|_| NdrError::InvalidEnumValue(wire))?;
        self.write_u16(short);
        Ok(())
    }

    /// `[v1_enum]` 32-bit enumeration value
    pub fn write_v1_enum<E: NdrEnum>(&mut self, value: E) {
        self.write_i32(value.to_wire());
    }
}

impl<'a> NdrReader<'a> {
    pub fn read_enum<E: NdrEnum>(&mut self) -> Result<E> {
        let wire = i32::from(self.read_u16()?);
        E::from_wire(wire).ok_or(NdrError::InvalidEnumValue(wire))
    }

    pub fn read_v1_enum<E: NdrEnum>(&mut self) -> Result<E> {
        let wire = self.read_i32()?;
        E::from_wire(wire).ok_or(NdrError::InvalidEnumValue(wire))
    }
}

/// Declare a Rust enum with explicit NDR wire values.
///
/// The enum gets [`NdrEnum`] plus 16-bit [`NdrEncode`](crate::NdrEncode)
/// and [`NdrDecode`](crate::NdrDecode). Decoding in place needs `Default`,
/// so derive it and mark one variant `#[default]`.
///
/// ```
/// msrpc_ndr::ndr_enum! {
///     #[derive(Default)]
///     pub enum Color {
///         #[default]
///         Red = 0,
///         Blue = 7,
///     }
/// }
/// ```
#[macro_export]
macro_rules! ndr_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)*
        }

        impl $crate::NdrEnum for $name {
            fn to_wire(self) -> i32 {
                self as i32
            }

            fn from_wire(value: i32) -> Option<Self> {
                $(
                    if value == $name::$variant as i32 {
                        return Some($name::$variant);
                    }
                )*
                None
            }
        }

        impl $crate::NdrEncode for $name {
            fn ndr_encode<'a>(&'a self, w: &mut $crate::NdrWriter<'a>) -> $crate::Result<()> {
                w.write_enum(*self)
            }
        }

        impl $crate::NdrDecode for $name {
            fn ndr_decode<'a>(&'a mut self, r: &mut $crate::NdrReader<'a>) -> $crate::Result<()> {
                *self = r.read_enum()?;
                Ok(())
            }
        }
    };
}
