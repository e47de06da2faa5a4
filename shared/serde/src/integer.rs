use crate::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// An integer written with a chosen number of bits. Variable integers write
/// `BITS`-sized groups, each preceded by a continuation bit, so small values
/// stay small on the wire.
// The outer generic type wraps a non-generic inner type to limit monomorphization.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    inner: SerdeIntegerInner,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct SerdeIntegerInner {
    value: i128,
    signed: bool,
    variable: bool,
    bits: u8,
}

impl SerdeIntegerInner {
    fn check(signed: bool, variable: bool, bits: u8, value: i128) -> bool {
        if bits == 0 || bits > 63 {
            return false;
        }
        if !signed && value < 0 {
            return false;
        }
        if variable {
            return true;
        }
        let limit: i128 = 1_i128 << bits;
        value < limit && value > -limit
    }

    fn ser(&self, writer: &mut dyn BitWrite) {
        let negative = self.value < 0;
        if self.signed {
            writer.write_bit(negative);
        }

        let mut magnitude: u128 = self.value.unsigned_abs();

        if self.variable {
            loop {
                let proceed = magnitude >= (1_u128 << self.bits);
                writer.write_bit(proceed);
                for _ in 0..self.bits {
                    writer.write_bit(magnitude & 1 != 0);
                    magnitude >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        }

        for _ in 0..self.bits {
            writer.write_bit(magnitude & 1 != 0);
            magnitude >>= 1;
        }
    }

    fn de(reader: &mut BitReader, signed: bool, variable: bool, bits: u8) -> Result<Self, SerdeErr> {
        let negative = if signed { reader.read_bit()? } else { false };

        let mut magnitude: u128 = 0;
        let mut shift: u32 = 0;

        if variable {
            loop {
                let proceed = reader.read_bit()?;
                for _ in 0..bits {
                    if shift >= 127 {
                        // SECURITY: a stream of continuation bits must not overflow the accumulator
                        return Err(SerdeErr);
                    }
                    if reader.read_bit()? {
                        magnitude |= 1_u128 << shift;
                    }
                    shift += 1;
                }
                if !proceed {
                    break;
                }
            }
        } else {
            for _ in 0..bits {
                if reader.read_bit()? {
                    magnitude |= 1_u128 << shift;
                }
                shift += 1;
            }
        }

        let value = i128::try_from(magnitude).map_err(|_| SerdeErr)?;
        Ok(Self {
            value: if negative { -value } else { value },
            signed,
            variable,
            bits,
        })
    }

    fn bit_length(&self) -> u32 {
        let mut output: u32 = u32::from(self.signed);

        if !self.variable {
            return output + u32::from(self.bits);
        }

        let mut magnitude = self.value.unsigned_abs();
        loop {
            let proceed = magnitude >= (1_u128 << self.bits);
            output += 1 + u32::from(self.bits);
            magnitude >>= self.bits;
            if !proceed {
                return output;
            }
        }
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    /// Returns `None` when the value can't be represented with this encoding
    pub fn try_new<T: Into<i128>>(value: T) -> Option<Self> {
        let value = value.into();
        if !SerdeIntegerInner::check(SIGNED, VARIABLE, BITS, value) {
            return None;
        }
        Some(Self {
            inner: SerdeIntegerInner {
                value,
                signed: SIGNED,
                variable: VARIABLE,
                bits: BITS,
            },
        })
    }

    /// # Panics
    ///
    /// Panics if the value can't be represented with this encoding.
    /// For a non-panicking version, use `try_new`.
    pub fn new<T: Into<i128>>(value: T) -> Self {
        Self::try_new(value).expect("value out of range for this SerdeInteger encoding")
    }

    pub fn get(&self) -> i128 {
        self.inner.value
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde
    for SerdeInteger<SIGNED, VARIABLE, BITS>
{
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.inner.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let inner = SerdeIntegerInner::de(reader, SIGNED, VARIABLE, BITS)?;
        Ok(Self { inner })
    }

    fn bit_length(&self) -> u32 {
        self.inner.bit_length()
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        u32::from(SIGNED) + u32::from(BITS)
    }
}
