//! Small reusable wrapper types shared by more than one decoder module.

use crate::error::Result;
use crate::io::{decode_f32, decode_f64, ByteSource};
use custom_debug::Debug as CustomDebug;
use std::hash::{Hash, Hasher};

/// Bridges `f32`/`f64` to the fixed-width unsigned integer holding their raw
/// bit pattern, so that [`FloatConst`] can compare and hash by bits instead
/// of by IEEE-754 value (under which NaN is never equal to itself).
pub trait FloatBits: Copy {
    type Bits: Copy + PartialEq + Eq + Hash + std::fmt::LowerHex;
    fn to_bits(self) -> Self::Bits;
}

impl FloatBits for f32 {
    type Bits = u32;
    fn to_bits(self) -> u32 {
        f32::to_bits(self)
    }
}

impl FloatBits for f64 {
    type Bits = u64;
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }
}

/// A floating point immediate from an `f32.const`/`f64.const` instruction.
///
/// Wraps the decoded value together with its raw bit pattern so that two
/// constants are `Eq`/`Hash`-equal exactly when their bits match, preserving
/// distinct NaN payloads instead of collapsing them under `==`.
#[derive(CustomDebug, Clone, Copy)]
pub struct FloatConst<T: FloatBits> {
    #[debug(format = "{:#x}")]
    bits: T::Bits,
    value: T,
}

impl<T: FloatBits> FloatConst<T> {
    pub fn new(value: T) -> Self {
        Self {
            bits: value.to_bits(),
            value,
        }
    }

    pub fn value(self) -> T {
        self.value
    }
}

impl<T: FloatBits> PartialEq for FloatConst<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T: FloatBits> Eq for FloatConst<T> {}

impl<T: FloatBits> Hash for FloatConst<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl FloatConst<f32> {
    pub(crate) fn decode(src: &mut dyn ByteSource) -> Result<Self> {
        Ok(Self::new(decode_f32(src)?))
    }
}

impl FloatConst<f64> {
    pub(crate) fn decode(src: &mut dyn ByteSource) -> Result<Self> {
        Ok(Self::new(decode_f64(src)?))
    }
}
