//! Value types, immediates, constants and condition codes

use serde::{Deserialize, Serialize};

/// Result type of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeId {
    Invalid,
    Void,
    U1,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    Reference,
    Any,
}

impl TypeId {
    /// Whether a value of type `other` may flow where `self` is expected
    ///
    /// `Any` is compatible with every type; `Invalid` with none.
    pub fn is_compatible(self, other: TypeId) -> bool {
        if self == TypeId::Invalid || other == TypeId::Invalid {
            return false;
        }
        self == other || self == TypeId::Any || other == TypeId::Any
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeId::U1
                | TypeId::I8
                | TypeId::U8
                | TypeId::I16
                | TypeId::U16
                | TypeId::I32
                | TypeId::U32
                | TypeId::I64
                | TypeId::U64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, TypeId::F32 | TypeId::F64)
    }

    pub fn is_reference(self) -> bool {
        matches!(self, TypeId::String | TypeId::Reference)
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeId::Invalid => "invalid",
            TypeId::Void => "void",
            TypeId::U1 => "u1",
            TypeId::I8 => "i8",
            TypeId::U8 => "u8",
            TypeId::I16 => "i16",
            TypeId::U16 => "u16",
            TypeId::I32 => "i32",
            TypeId::U32 => "u32",
            TypeId::I64 => "i64",
            TypeId::U64 => "u64",
            TypeId::F32 => "f32",
            TypeId::F64 => "f64",
            TypeId::String => "string",
            TypeId::Reference => "ref",
            TypeId::Any => "any",
        }
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared width of an immediate slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BitWidth {
    /// Invalid; nothing fits
    None = 0,
    W4 = 4,
    W8 = 8,
    W16 = 16,
    W32 = 32,
    W64 = 64,
}

impl BitWidth {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn from_bits(bits: u32) -> Option<BitWidth> {
        match bits {
            0 => Some(BitWidth::None),
            4 => Some(BitWidth::W4),
            8 => Some(BitWidth::W8),
            16 => Some(BitWidth::W16),
            32 => Some(BitWidth::W32),
            64 => Some(BitWidth::W64),
            _ => None,
        }
    }

    /// Whether `value` is representable as an unsigned integer of this width
    pub fn fits(self, value: u64) -> bool {
        match self {
            BitWidth::None => false,
            BitWidth::W64 => true,
            width => value < (1u64 << width.bits()),
        }
    }
}

/// Immediate operand with its declared width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imm {
    pub value: u64,
    pub width: BitWidth,
}

impl Imm {
    pub fn new(value: u64, width: BitWidth) -> Self {
        Self { value, width }
    }
}

/// Value of a constant instruction
///
/// Equality is bit-exact, so `0.0` and `-0.0` are different constants and a NaN
/// equals a NaN with the same payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ConstValue {
    I32(i32),
    I64(i64),
    U64(u64),
    F64(f64),
}

impl ConstValue {
    pub fn type_id(&self) -> TypeId {
        match self {
            ConstValue::I32(_) => TypeId::I32,
            ConstValue::I64(_) => TypeId::I64,
            ConstValue::U64(_) => TypeId::U64,
            ConstValue::F64(_) => TypeId::F64,
        }
    }

    fn key(&self) -> (u8, u64) {
        match *self {
            ConstValue::I32(v) => (0, v as u32 as u64),
            ConstValue::I64(v) => (1, v as u64),
            ConstValue::U64(v) => (2, v),
            ConstValue::F64(v) => (3, v.to_bits()),
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ConstValue {}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::I32(v) => write!(f, "{}", v),
            ConstValue::I64(v) => write!(f, "{}", v),
            ConstValue::U64(v) => write!(f, "{}", v),
            ConstValue::F64(v) => write!(f, "{:?}", v),
        }
    }
}

/// Comparison condition of compare and branch instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCode {
    None,
    Eq,
    Ne,
    /// Signed less
    Lt,
    Le,
    Gt,
    Ge,
    /// Unsigned below
    B,
    Be,
    /// Unsigned above
    A,
    Ae,
    /// `(lhs & rhs) == 0`
    TstEq,
    /// `(lhs & rhs) != 0`
    TstNe,
}

impl ConditionCode {
    pub fn name(self) -> &'static str {
        match self {
            ConditionCode::None => "none",
            ConditionCode::Eq => "eq",
            ConditionCode::Ne => "ne",
            ConditionCode::Lt => "lt",
            ConditionCode::Le => "le",
            ConditionCode::Gt => "gt",
            ConditionCode::Ge => "ge",
            ConditionCode::B => "b",
            ConditionCode::Be => "be",
            ConditionCode::A => "a",
            ConditionCode::Ae => "ae",
            ConditionCode::TstEq => "tst_eq",
            ConditionCode::TstNe => "tst_ne",
        }
    }
}

/// Instruction-set family of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsaKind {
    Unsupported,
    Static,
    Dynamic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_fits() {
        assert!(BitWidth::W4.fits(15));
        assert!(!BitWidth::W4.fits(16));
        assert!(BitWidth::W8.fits(255));
        assert!(!BitWidth::W8.fits(256));
        assert!(BitWidth::W16.fits(0xffff));
        assert!(!BitWidth::W32.fits(1 << 32));
        assert!(BitWidth::W64.fits(u64::MAX));
        assert!(!BitWidth::None.fits(0));
    }

    #[test]
    fn test_width_from_bits() {
        assert_eq!(BitWidth::from_bits(16), Some(BitWidth::W16));
        assert_eq!(BitWidth::from_bits(12), None);
        assert_eq!(BitWidth::W32.bits(), 32);
    }

    #[test]
    fn test_const_bit_exact_equality() {
        assert_eq!(ConstValue::F64(1.5), ConstValue::F64(1.5));
        assert_ne!(ConstValue::F64(0.0), ConstValue::F64(-0.0));
        assert_eq!(ConstValue::F64(f64::NAN), ConstValue::F64(f64::NAN));
        assert_ne!(ConstValue::I32(-1), ConstValue::U64(u32::MAX as u64));
        assert_ne!(ConstValue::I64(7), ConstValue::U64(7));
    }

    #[test]
    fn test_type_compatibility() {
        assert!(TypeId::I32.is_compatible(TypeId::I32));
        assert!(TypeId::Any.is_compatible(TypeId::F64));
        assert!(TypeId::Reference.is_compatible(TypeId::Any));
        assert!(!TypeId::I32.is_compatible(TypeId::I64));
        assert!(!TypeId::Invalid.is_compatible(TypeId::Invalid));
    }
}
