use crate::{
    BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedVariableInteger,
};

// Booleans

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Fixed-width numbers, little-endian byte order

macro_rules! impl_serde_for_number {
    ($impl_type:ty, $bytes:expr) => {
        impl Serde for $impl_type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                for byte in self.to_le_bytes() {
                    writer.write_byte(byte);
                }
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0_u8; $bytes];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$impl_type>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $impl_type {
            fn const_bit_length() -> u32 {
                $bytes * 8
            }
        }
    };
}

impl_serde_for_number!(u8, 1);
impl_serde_for_number!(u16, 2);
impl_serde_for_number!(u32, 4);
impl_serde_for_number!(u64, 8);
impl_serde_for_number!(i64, 8);

// Containers

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        1 + self.as_ref().map_or(0, |value| value.bit_length())
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.len() as u64).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<7>::de(reader)?.get();
        let length = usize::try_from(length).map_err(|_| SerdeErr)?;

        // SECURITY: every item takes at least one bit, so a length larger than
        // the bits left is malformed and must not drive the allocation
        let bits_left = reader.bytes_remaining().saturating_add(1).saturating_mul(8);
        if length > bits_left {
            return Err(SerdeErr);
        }

        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn bit_length(&self) -> u32 {
        let header = UnsignedVariableInteger::<7>::new(self.len() as u64).bit_length();
        self.iter().fold(header, |total, item| total + item.bit_length())
    }
}
