//! NDR primitive type implementations
//!
//! | MIDL Type      | Rust Type     | Size | Alignment |
//! |----------------|---------------|------|-----------|
//! | boolean        | bool          | 1    | 1         |
//! | byte/char      | u8            | 1    | 1         |
//! | small          | i8            | 1    | 1         |
//! | short          | i16           | 2    | 2         |
//! | long/int       | i32           | 4    | 4         |
//! | hyper          | i64           | 8    | 8         |
//! | unsigned short | u16           | 2    | 2         |
//! | unsigned long  | u32           | 4    | 4         |
//! | unsigned hyper | u64           | 8    | 8         |
//! | float          | f32           | 4    | 4         |
//! | double         | f64           | 8    | 8         |
//! | GUID           | uuid::Uuid    | 16   | 4         |
//! | BOOL           | [`Bool32`]    | 4    | 4         |
//! | VARIANT_BOOL   | [`VariantBool`] | 2  | 2         |

use uuid::Uuid;

use crate::{NdrDecode, NdrEncode, NdrReader, NdrWriter, Result};

macro_rules! impl_ndr_primitive {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl NdrEncode for $ty {
                fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
                    w.$write(*self);
                    Ok(())
                }
            }

            impl NdrDecode for $ty {
                fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
                    *self = r.$read()?;
                    Ok(())
                }
            }
        )*
    };
}

impl_ndr_primitive! {
    u8 => write_u8, read_u8;
    i8 => write_i8, read_i8;
    u16 => write_u16, read_u16;
    i16 => write_i16, read_i16;
    u32 => write_u32, read_u32;
    i32 => write_i32, read_i32;
    u64 => write_u64, read_u64;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    bool => write_boolean, read_boolean;
    Uuid => write_uuid, read_uuid;
}

/// Win32 `BOOL`: a 32-bit integer, 0 or 1 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bool32(pub bool);

/// OLE `VARIANT_BOOL`: a 16-bit integer, 0 or -1 (0xFFFF) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VariantBool(pub bool);

/// Wire value of `VARIANT_TRUE`
pub const VARIANT_TRUE: i16 = -1;
/// Wire value of `VARIANT_FALSE`
pub const VARIANT_FALSE: i16 = 0;

impl From<bool> for Bool32 {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<Bool32> for bool {
    fn from(value: Bool32) -> Self {
        value.0
    }
}

impl From<bool> for VariantBool {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<VariantBool> for bool {
    fn from(value: VariantBool) -> Self {
        value.0
    }
}

impl<'a> NdrWriter<'a> {
    /// NDR `boolean`: one byte, 0 or 1
    pub fn write_boolean(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// `BOOL`: written as 0 or 1
    pub fn write_bool32(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// `VARIANT_BOOL`: written as 0 or -1
    pub fn write_variant_bool(&mut self, value: bool) {
        self.write_i16(if value { VARIANT_TRUE } else { VARIANT_FALSE });
    }

    /// GUID: data1, data2 and data3 follow the byte order; data4 is raw
    pub fn write_uuid(&mut self, value: Uuid) {
        let (data1, data2, data3, data4) = value.as_fields();
        self.write_u32(data1);
        self.write_u16(data2);
        self.write_u16(data3);
        self.write_bytes(data4);
    }
}

impl<'a> NdrReader<'a> {
    /// NDR `boolean`; any nonzero byte is true
    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// `BOOL`; any nonzero value is true
    pub fn read_bool32(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// `VARIANT_BOOL`; any nonzero value is true
    pub fn read_variant_bool(&mut self) -> Result<bool> {
        Ok(self.read_i16()? != VARIANT_FALSE)
    }

    pub fn read_uuid(&mut self) -> Result<Uuid> {
        let data1 = self.read_u32()?;
        let data2 = self.read_u16()?;
        let data3 = self.read_u16()?;
        let tail = self.read_bytes(8)?;
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&tail);
        Ok(Uuid::from_fields(data1, data2, data3, &data4))
    }
}

impl NdrEncode for Bool32 {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_bool32(self.0);
        Ok(())
    }
}

impl NdrDecode for Bool32 {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        self.0 = r.read_bool32()?;
        Ok(())
    }
}

impl NdrEncode for VariantBool {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()> {
        w.write_variant_bool(self.0);
        Ok(())
    }
}

impl NdrDecode for VariantBool {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()> {
        self.0 = r.read_variant_bool()?;
        Ok(())
    }
}
