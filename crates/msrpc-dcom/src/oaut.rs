//! OLE automation wire types (MS-OAUT 2.2)
//!
//! - [`BStr`]: `wireBSTR`, a unique pointer to a `FLAGGED_WORD_BLOB`
//! - [`Variant`]: `wireVARIANT`, a unique pointer to `_wireVARIANT`
//! - [`SafeArray`]: the `_wireSAFEARRAY` body; `Option<SafeArray>` is a
//!   `wireSAFEARRAY` field and [`LpSafeArray`] the `wirePSAFEARRAY` parameter

use std::fmt;

use msrpc_ndr::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrUnion, NdrWriter, PointerKind, SwitchType};

/// Variant types (VT_*)
pub mod vt {
    pub const EMPTY: u16 = 0;
    pub const NULL: u16 = 1;
    pub const I2: u16 = 2;
    pub const I4: u16 = 3;
    pub const R8: u16 = 5;
    pub const BSTR: u16 = 8;
    pub const BOOL: u16 = 11;
    pub const VARIANT: u16 = 12;
    pub const I1: u16 = 16;
    pub const UI1: u16 = 17;
    pub const I8: u16 = 20;
}

/// SAFEARRAY element kinds (SF_*)
pub mod sf {
    pub const I1: u32 = 16;
    pub const I2: u32 = 2;
    pub const I4: u32 = 3;
    pub const BSTR: u32 = 8;
    pub const VARIANT: u32 = 12;
}

/// SAFEARRAY feature flags (FADF_*)
pub mod fadf {
    pub const HAVEVARTYPE: u16 = 0x0080;
    pub const BSTR: u16 = 0x0100;
    pub const VARIANT: u16 = 0x0800;
}

fn wire_len(len: usize) -> msrpc_ndr::Result<u32> {
    u32::try_from(len).map_err(|_| NdrError::LengthOverflow(len))
}

/// Automation string (`BSTR`)
///
/// On the wire a non-null unique pointer to:
///
/// ```text
/// max_count: u32   # hoisted, equal to clSize
/// fFlags: u32      # byte length
/// clSize: u32      # UTF-16 code units, no terminator
/// asData[clSize]
/// ```
///
/// A null pointer decodes as the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BStr(pub String);

impl BStr {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn encode_blob(&self, w: &mut NdrWriter<'_>) -> msrpc_ndr::Result<()> {
        let units: Vec<u16> = self.0.encode_utf16().collect();
        let count = wire_len(units.len())?;
        let byte_len = count
            .checked_mul(2)
            .ok_or(NdrError::LengthOverflow(units.len()))?;
        w.write_conformance(count);
        w.write_u32(byte_len);
        w.write_u32(count);
        for unit in units {
            w.write_u16(unit);
        }
        Ok(())
    }

    fn decode_blob(&mut self, r: &mut NdrReader<'_>) -> msrpc_ndr::Result<()> {
        let max_count = r.read_conformance()?;
        let _byte_len = r.read_u32()?;
        let count = r.read_u32()?;
        if count != max_count {
            return Err(NdrError::ArraySizeMismatch {
                expected: max_count as usize,
                got: count as usize,
            });
        }
        let limit = r.context().limits.max_string_len;
        if count as usize > limit {
            return Err(NdrError::AllocationLimitExceeded {
                requested: count as usize,
                limit,
            });
        }
        let count = r.check_count(count, 2)?;
        let units = (0..count)
            .map(|_| r.read_u16())
            .collect::<msrpc_ndr::Result<Vec<u16>>>()?;
        self.0 = char::decode_utf16(units).collect::<Result<String, _>>()?;
        Ok(())
    }
}

impl From<&str> for BStr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl NdrEncode for BStr {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_referent(true, PointerKind::Unique)?;
        w.defer(move |w| self.encode_blob(w));
        Ok(())
    }
}

impl NdrDecode for BStr {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        if r.read_referent(PointerKind::Unique)? == 0 {
            self.0.clear();
            return Ok(());
        }
        r.defer(move |r| self.decode_blob(r));
        Ok(())
    }
}

/// Automation variant (`VARIANT`)
///
/// The `_wireVARIANT` body is 8-byte aligned:
///
/// ```text
/// clSize: u32          # fixed part, in 8-byte units
/// rpcReserved: u32
/// vt: u16
/// wReserved1..3: u16
/// discriminant: u32    # repeats vt
/// arm
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Variant {
    #[default]
    Empty,
    Null,
    I2(i16),
    I4(i32),
    R8(f64),
    BStr(BStr),
    Bool(bool),
    UI1(u8),
    I8(i64),
}

impl Variant {
    pub fn vt(&self) -> u16 {
        match self {
            Variant::Empty => vt::EMPTY,
            Variant::Null => vt::NULL,
            Variant::I2(_) => vt::I2,
            Variant::I4(_) => vt::I4,
            Variant::R8(_) => vt::R8,
            Variant::BStr(_) => vt::BSTR,
            Variant::Bool(_) => vt::BOOL,
            Variant::UI1(_) => vt::UI1,
            Variant::I8(_) => vt::I8,
        }
    }

    fn arm_size(&self) -> u32 {
        match self {
            Variant::Empty | Variant::Null => 0,
            Variant::UI1(_) => 1,
            Variant::I2(_) | Variant::Bool(_) => 2,
            Variant::I4(_) | Variant::BStr(_) => 4,
            Variant::R8(_) | Variant::I8(_) => 8,
        }
    }

    fn encode_body<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let fixed = match self.arm_size() {
            0 => 20,
            size => 24 + size,
        };
        w.align(8);
        w.write_u32(fixed.div_ceil(8));
        w.write_u32(0);
        w.write_u16(self.vt());
        for _ in 0..3 {
            w.write_u16(0);
        }
        w.write_union(self)
    }

    fn decode_body<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        r.align(8)?;
        let _cl_size = r.read_u32()?;
        let _rpc_reserved = r.read_u32()?;
        let vt = r.read_u16()?;
        for _ in 0..3 {
            r.read_u16()?;
        }
        r.read_union_switched(self, u32::from(vt))
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::I4(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::BStr(BStr::from(value))
    }
}

impl NdrUnion for Variant {
    const SWITCH: SwitchType = SwitchType::U32;
    const ARM_ALIGN: usize = 8;

    fn discriminant(&self) -> u32 {
        u32::from(self.vt())
    }

    fn arm_for(discriminant: u32) -> Option<Self> {
        let vt = u16::try_from(discriminant).ok()?;
        Some(match vt {
            vt::EMPTY => Variant::Empty,
            vt::NULL => Variant::Null,
            vt::I2 => Variant::I2(0),
            vt::I4 => Variant::I4(0),
            vt::R8 => Variant::R8(0.0),
            vt::BSTR => Variant::BStr(BStr::default()),
            vt::BOOL => Variant::Bool(false),
            vt::UI1 => Variant::UI1(0),
            vt::I8 => Variant::I8(0),
            _ => return None,
        })
    }

    fn encode_arm<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        match self {
            Variant::Empty | Variant::Null => {}
            Variant::I2(v) => w.write_i16(*v),
            Variant::I4(v) => w.write_i32(*v),
            Variant::R8(v) => w.write_f64(*v),
            Variant::BStr(v) => v.ndr_encode(w)?,
            Variant::Bool(v) => w.write_variant_bool(*v),
            Variant::UI1(v) => w.write_u8(*v),
            Variant::I8(v) => w.write_i64(*v),
        }
        Ok(())
    }

    fn decode_arm<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        match self {
            Variant::Empty | Variant::Null => {}
            Variant::I2(v) => *v = r.read_i16()?,
            Variant::I4(v) => *v = r.read_i32()?,
            Variant::R8(v) => *v = r.read_f64()?,
            Variant::BStr(v) => v.ndr_decode(r)?,
            Variant::Bool(v) => *v = r.read_variant_bool()?,
            Variant::UI1(v) => *v = r.read_u8()?,
            Variant::I8(v) => *v = r.read_i64()?,
        }
        Ok(())
    }
}

impl NdrEncode for Variant {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_referent(true, PointerKind::Unique)?;
        w.defer(move |w| self.encode_body(w));
        Ok(())
    }
}

impl NdrDecode for Variant {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        if r.read_referent(PointerKind::Unique)? == 0 {
            *self = Variant::Empty;
            return Ok(());
        }
        r.defer(move |r| self.decode_body(r));
        Ok(())
    }
}

/// SAFEARRAYBOUND
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SafeArrayBound {
    pub elements: u32,
    pub lower_bound: i32,
}

impl SafeArrayBound {
    pub fn new(elements: u32, lower_bound: i32) -> Self {
        Self {
            elements,
            lower_bound,
        }
    }
}

impl NdrEncode for SafeArrayBound {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_u32(self.elements);
        w.write_i32(self.lower_bound);
        Ok(())
    }
}

impl NdrDecode for SafeArrayBound {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        self.elements = r.read_u32()?;
        self.lower_bound = r.read_i32()?;
        Ok(())
    }
}

/// `SAFEARRAYUNION` arms: element count, then a pointer to the elements
#[derive(Clone, Debug, PartialEq)]
pub enum SafeArrayData {
    Bstr(Vec<BStr>),
    Variant(Vec<Variant>),
    I4(Vec<i32>),
    I2(Vec<i16>),
    I1(Vec<i8>),
}

impl Default for SafeArrayData {
    fn default() -> Self {
        SafeArrayData::I4(Vec::new())
    }
}

impl SafeArrayData {
    pub fn len(&self) -> usize {
        match self {
            SafeArrayData::Bstr(v) => v.len(),
            SafeArrayData::Variant(v) => v.len(),
            SafeArrayData::I4(v) => v.len(),
            SafeArrayData::I2(v) => v.len(),
            SafeArrayData::I1(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `cbElements` of an in-memory array of this kind
    fn element_size(&self) -> u32 {
        match self {
            SafeArrayData::Bstr(_) | SafeArrayData::I4(_) => 4,
            SafeArrayData::Variant(_) => 16,
            SafeArrayData::I2(_) => 2,
            SafeArrayData::I1(_) => 1,
        }
    }

    fn features(&self) -> u16 {
        match self {
            SafeArrayData::Bstr(_) => fadf::BSTR,
            SafeArrayData::Variant(_) => fadf::VARIANT,
            _ => fadf::HAVEVARTYPE,
        }
    }
}

/// Count, then a pointer to a conformant array of `items`
fn write_sized<'a, T, F>(w: &mut NdrWriter<'a>, items: &'a [T], kind: PointerKind, f: F) -> msrpc_ndr::Result<()>
where
    F: FnMut(&mut NdrWriter<'a>, &'a T) -> msrpc_ndr::Result<()> + 'a,
{
    w.write_u32(wire_len(items.len())?);
    w.write_pointer_with(Some(items), kind, move |w, items| {
        w.write_conformant_array_with(items, f)
    })
}

fn read_sized<'a, T, F>(
    r: &mut NdrReader<'a>,
    items: &'a mut Vec<T>,
    kind: PointerKind,
    min_size: usize,
    f: F,
) -> msrpc_ndr::Result<()>
where
    T: Default,
    F: FnMut(&mut NdrReader<'a>, &'a mut T) -> msrpc_ndr::Result<()> + 'a,
{
    let size = r.read_u32()?;
    items.clear();
    if r.read_referent(kind)? == 0 {
        return Ok(());
    }
    r.defer(move |r| {
        let count = r.read_conformance()?;
        if count != size {
            return Err(NdrError::ArraySizeMismatch {
                expected: size as usize,
                got: count as usize,
            });
        }
        r.read_elements_with(items, count, min_size, f)
    });
    Ok(())
}

impl NdrUnion for SafeArrayData {
    const SWITCH: SwitchType = SwitchType::U32;
    const ARM_ALIGN: usize = 4;

    fn discriminant(&self) -> u32 {
        match self {
            SafeArrayData::Bstr(_) => sf::BSTR,
            SafeArrayData::Variant(_) => sf::VARIANT,
            SafeArrayData::I4(_) => sf::I4,
            SafeArrayData::I2(_) => sf::I2,
            SafeArrayData::I1(_) => sf::I1,
        }
    }

    fn arm_for(discriminant: u32) -> Option<Self> {
        Some(match discriminant {
            sf::BSTR => SafeArrayData::Bstr(Vec::new()),
            sf::VARIANT => SafeArrayData::Variant(Vec::new()),
            sf::I4 => SafeArrayData::I4(Vec::new()),
            sf::I2 => SafeArrayData::I2(Vec::new()),
            sf::I1 => SafeArrayData::I1(Vec::new()),
            _ => return None,
        })
    }

    fn encode_arm<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        match self {
            SafeArrayData::Bstr(items) => write_sized(w, items, PointerKind::Ref, |w, item| item.ndr_encode(w)),
            SafeArrayData::Variant(items) => write_sized(w, items, PointerKind::Ref, |w, item| item.ndr_encode(w)),
            SafeArrayData::I4(items) => write_sized(w, items, PointerKind::Unique, |w, item| item.ndr_encode(w)),
            SafeArrayData::I2(items) => write_sized(w, items, PointerKind::Unique, |w, item| item.ndr_encode(w)),
            SafeArrayData::I1(items) => write_sized(w, items, PointerKind::Unique, |w, item| item.ndr_encode(w)),
        }
    }

    fn decode_arm<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        match self {
            SafeArrayData::Bstr(items) => read_sized(r, items, PointerKind::Ref, 4, |r, item| item.ndr_decode(r)),
            SafeArrayData::Variant(items) => read_sized(r, items, PointerKind::Ref, 4, |r, item| item.ndr_decode(r)),
            SafeArrayData::I4(items) => read_sized(r, items, PointerKind::Unique, 4, |r, item| item.ndr_decode(r)),
            SafeArrayData::I2(items) => read_sized(r, items, PointerKind::Unique, 2, |r, item| item.ndr_decode(r)),
            SafeArrayData::I1(items) => read_sized(r, items, PointerKind::Unique, 1, |r, item| item.ndr_decode(r)),
        }
    }
}

/// `_wireSAFEARRAY`, a conformant structure
///
/// ```text
/// max_count: u32        # hoisted, equal to cDims
/// cDims: u16, fFeatures: u16, cbElements: u32, cLocks: u32
/// sfType: u32, SAFEARRAYUNION
/// rgsabound[cDims]
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SafeArray {
    pub features: u16,
    pub element_size: u32,
    pub locks: u32,
    pub data: SafeArrayData,
    pub bounds: Vec<SafeArrayBound>,
}

impl SafeArray {
    /// A one-dimensional, zero-based array
    pub fn new(data: SafeArrayData) -> Self {
        let bounds = vec![SafeArrayBound::new(data.len() as u32, 0)];
        Self::with_bounds(data, bounds)
    }

    pub fn with_bounds(data: SafeArrayData, bounds: Vec<SafeArrayBound>) -> Self {
        Self {
            features: data.features(),
            element_size: data.element_size(),
            locks: 0,
            data,
            bounds,
        }
    }

    pub fn dims(&self) -> usize {
        self.bounds.len()
    }
}

impl NdrEncode for SafeArray {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let dims = u16::try_from(self.bounds.len()).map_err(|_| NdrError::LengthOverflow(self.bounds.len()))?;
        w.write_conformance(u32::from(dims));
        w.write_u16(dims);
        w.write_u16(self.features);
        w.write_u32(self.element_size);
        w.write_u32(self.locks);
        w.write_u32(self.data.discriminant());
        w.write_union(&self.data)?;
        w.write_elements_with(&self.bounds, |w, bound| bound.ndr_encode(w))
    }
}

impl NdrDecode for SafeArray {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        let max_count = r.read_conformance()?;
        let dims = r.read_u16()?;
        if u32::from(dims) != max_count {
            return Err(NdrError::ArraySizeMismatch {
                expected: max_count as usize,
                got: usize::from(dims),
            });
        }
        self.features = r.read_u16()?;
        self.element_size = r.read_u32()?;
        self.locks = r.read_u32()?;
        let sf_type = r.read_u32()?;
        r.read_union_switched(&mut self.data, sf_type)?;
        r.read_elements_with(&mut self.bounds, max_count, 8, |r, bound| bound.ndr_decode(r))
    }
}

/// `wirePSAFEARRAY`: a unique pointer to a `wireSAFEARRAY`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LpSafeArray(pub Option<SafeArray>);

impl LpSafeArray {
    pub fn new(array: SafeArray) -> Self {
        Self(Some(array))
    }
}

impl NdrEncode for LpSafeArray {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        w.write_referent(true, PointerKind::Unique)?;
        w.defer(move |w| w.write_pointer(self.0.as_ref(), PointerKind::Unique));
        Ok(())
    }
}

impl NdrDecode for LpSafeArray {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        if r.read_referent(PointerKind::Unique)? == 0 {
            self.0 = None;
            return Ok(());
        }
        r.defer(move |r| r.read_pointer(&mut self.0, PointerKind::Unique));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use msrpc_ndr::NdrContext;

    fn encode<T: NdrEncode>(value: &T) -> Bytes {
        let mut w = NdrWriter::new(NdrContext::new());
        w.write_param(value).unwrap();
        w.finish().unwrap()
    }

    fn decode<T: NdrDecode + Default>(stub: Bytes) -> T {
        NdrReader::new(stub, NdrContext::new()).read_owned().unwrap()
    }

    #[test]
    fn test_bstr_layout() {
        let stub = encode(&BStr::from("hi"));
        assert_eq!(
            &stub[..],
            &[
                0x00, 0x00, 0x02, 0x00, // referent
                2, 0, 0, 0, // max_count
                4, 0, 0, 0, // byte length
                2, 0, 0, 0, // clSize
                b'h', 0, b'i', 0,
            ]
        );
        assert_eq!(decode::<BStr>(stub), BStr::from("hi"));
    }

    #[test]
    fn test_null_bstr_decodes_empty() {
        assert_eq!(decode::<BStr>(Bytes::from_static(&[0, 0, 0, 0])), BStr::default());
    }

    #[test]
    fn test_variant_i4_layout() {
        let stub = encode(&Variant::I4(-2));
        assert_eq!(&stub[0..4], &[0x00, 0x00, 0x02, 0x00]);
        // body aligned to 8
        assert_eq!(&stub[4..8], &[0; 4]);
        assert_eq!(&stub[8..12], &4u32.to_le_bytes());
        assert_eq!(&stub[16..18], &vt::I4.to_le_bytes());
        assert_eq!(&stub[24..28], &3u32.to_le_bytes());
        assert_eq!(&stub[32..36], &(-2i32).to_le_bytes());
        assert_eq!(decode::<Variant>(stub), Variant::I4(-2));
    }

    #[test]
    fn test_variant_arms_roundtrip() {
        for value in [
            Variant::Empty,
            Variant::Null,
            Variant::I2(-3),
            Variant::R8(2.5),
            Variant::from("text"),
            Variant::from(true),
            Variant::UI1(200),
            Variant::I8(i64::MIN),
        ] {
            assert_eq!(decode::<Variant>(encode(&value)), value);
        }
    }

    #[test]
    fn test_variant_bool_is_normalized() {
        let mut stub = encode(&Variant::Bool(true)).to_vec();
        // VARIANT_BOOL arm at 32; any nonzero value reads as true
        stub[32] = 0x01;
        stub[33] = 0x00;
        assert_eq!(decode::<Variant>(Bytes::from(stub)), Variant::Bool(true));
    }

    #[test]
    fn test_variant_vt_mismatch_is_rejected() {
        let mut stub = encode(&Variant::I4(1)).to_vec();
        stub[16] = vt::I2 as u8;
        let err = NdrReader::new(Bytes::from(stub), NdrContext::new())
            .read_owned::<Variant>()
            .unwrap_err();
        assert!(matches!(err, NdrError::InvalidDiscriminant(3)));
    }

    #[test]
    fn test_unknown_vt_is_rejected() {
        let mut stub = encode(&Variant::I4(1)).to_vec();
        stub[16] = 0x40;
        stub[24] = 0x40;
        let err = NdrReader::new(Bytes::from(stub), NdrContext::new())
            .read_owned::<Variant>()
            .unwrap_err();
        assert!(matches!(err, NdrError::InvalidDiscriminant(0x40)));
    }

    #[test]
    fn test_safearray_of_bstr_roundtrip() {
        let array = LpSafeArray::new(SafeArray::new(SafeArrayData::Bstr(vec![
            BStr::from(".txt"),
            BStr::from(".docx"),
        ])));
        let decoded: LpSafeArray = decode(encode(&array));
        assert_eq!(decoded, array);
        let inner = decoded.0.unwrap();
        assert_eq!(inner.features, fadf::BSTR);
        assert_eq!(inner.bounds, vec![SafeArrayBound::new(2, 0)]);
    }

    #[test]
    fn test_safearray_of_variants_and_ints() {
        for data in [
            SafeArrayData::Variant(vec![Variant::I4(1), Variant::from("two"), Variant::Empty]),
            SafeArrayData::I4(vec![1, -2, 3]),
            SafeArrayData::I2(vec![]),
            SafeArrayData::I1(vec![-1, 1]),
        ] {
            let array = SafeArray::new(data);
            let wrapped = LpSafeArray::new(array.clone());
            assert_eq!(decode::<LpSafeArray>(encode(&wrapped)).0, Some(array));
        }
    }

    #[test]
    fn test_safearray_small_integer_arms() {
        // odd counts leave the byte and short arms unaligned at the end
        for data in [
            SafeArrayData::I2(vec![i16::MIN, -1, 300]),
            SafeArrayData::I1(vec![i8::MIN, 0, 5]),
        ] {
            let array = SafeArray::new(data);
            let decoded = decode::<LpSafeArray>(encode(&LpSafeArray::new(array.clone()))).0.unwrap();
            assert_eq!(decoded, array);
            assert_eq!(decoded.features, fadf::HAVEVARTYPE);
            assert_eq!(decoded.bounds, vec![SafeArrayBound::new(3, 0)]);
        }
    }

    #[test]
    fn test_safearray_double_pointer_layout() {
        let stub = encode(&LpSafeArray(None));
        // outer referent, then a null inner pointer
        assert_eq!(&stub[..], &[0x00, 0x00, 0x02, 0x00, 0, 0, 0, 0]);
        assert_eq!(decode::<LpSafeArray>(stub), LpSafeArray(None));

        let stub = encode(&LpSafeArray::new(SafeArray::new(SafeArrayData::I4(vec![7]))));
        assert_eq!(&stub[0..4], &[0x00, 0x00, 0x02, 0x00]);
        assert_eq!(&stub[4..8], &[0x04, 0x00, 0x02, 0x00]);
        // conformance (cDims) leads the body
        assert_eq!(&stub[8..12], &1u32.to_le_bytes());
    }

    #[test]
    fn test_oversized_safearray_count_is_an_error() {
        let stub = encode(&LpSafeArray::new(SafeArray::new(SafeArrayData::I4(vec![7]))));
        let mut bytes = stub.to_vec();
        // conformance of the element array
        let len = bytes.len();
        bytes[len - 8..len - 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(NdrReader::new(Bytes::from(bytes), NdrContext::new())
            .read_owned::<LpSafeArray>()
            .is_err());
    }
}
