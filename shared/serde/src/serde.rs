use crate::{BitReader, BitWrite, SerdeErr};

/// A type that can be written to and read from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Serialize into the writer
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parse from the reader
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write
    fn bit_length(&self) -> u32;
}

/// Implemented by types whose encoded size never changes
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
