//! NDR discriminated unions
//!
//! A union is written as its discriminant, in the declared switch type,
//! followed by the selected arm aligned to the union's largest arm. On read
//! the discriminant picks the arm; an unknown value is a decode error.

use crate::{NdrError, NdrReader, NdrWriter, Result};

/// Wire type of a union discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchType {
    U8,
    U16,
    I16,
    U32,
    I32,
}

impl SwitchType {
    fn write(self, w: &mut NdrWriter<'_>, discriminant: u32) {
        match self {
            SwitchType::U8 => w.write_u8(discriminant as u8),
            SwitchType::U16 | SwitchType::I16 => w.write_u16(discriminant as u16),
            SwitchType::U32 | SwitchType::I32 => w.write_u32(discriminant),
        }
    }

    fn read(self, r: &mut NdrReader<'_>) -> Result<u32> {
        Ok(match self {
            SwitchType::U8 => u32::from(r.read_u8()?),
            SwitchType::U16 => u32::from(r.read_u16()?),
            SwitchType::I16 => r.read_i16()? as i32 as u32,
            SwitchType::U32 | SwitchType::I32 => r.read_u32()?,
        })
    }
}

/// A discriminated union with in-place arm decoding.
///
/// `arm_for` yields the arm with default contents, which `decode_arm` then
/// fills. Arms with pointers enqueue their pointees like any structure.
pub trait NdrUnion: Sized {
    /// Wire type of the discriminant
    const SWITCH: SwitchType;
    /// Alignment of the union body: that of its most aligned arm
    const ARM_ALIGN: usize;

    fn discriminant(&self) -> u32;

    /// Empty arm for `discriminant`, or `None` if no arm matches.
    fn arm_for(discriminant: u32) -> Option<Self>;

    fn encode_arm<'a>(&'a self, w: &mut NdrWriter<'a>) -> Result<()>;

    fn decode_arm<'a>(&'a mut self, r: &mut NdrReader<'a>) -> Result<()>;
}

impl<'a> NdrWriter<'a> {
    /// Discriminant, then the selected arm
    pub fn write_union<U: NdrUnion>(&mut self, value: &'a U) -> Result<()> {
        U::SWITCH.write(self, value.discriminant());
        self.align(U::ARM_ALIGN);
        value.encode_arm(self)
    }
}

impl<'a> NdrReader<'a> {
    /// Discriminant, then the arm it selects, decoded into `dest`
    pub fn read_union<U: NdrUnion>(&mut self, dest: &'a mut U) -> Result<()> {
        let discriminant = U::SWITCH.read(self)?;
        *dest = U::arm_for(discriminant).ok_or(NdrError::InvalidDiscriminant(discriminant))?;
        self.align(U::ARM_ALIGN)?;
        dest.decode_arm(self)
    }

    /// A union whose `[switch_is]` field was already read as `switch_is`
    ///
    /// The transmitted discriminant must repeat it.
    pub fn read_union_switched<U: NdrUnion>(&mut self, dest: &'a mut U, switch_is: u32) -> Result<()> {
        let discriminant = U::SWITCH.read(self)?;
        if discriminant != switch_is {
            return Err(NdrError::InvalidDiscriminant(discriminant));
        }
        *dest = U::arm_for(discriminant).ok_or(NdrError::InvalidDiscriminant(discriminant))?;
        self.align(U::ARM_ALIGN)?;
        dest.decode_arm(self)
    }
}
