use std::{fmt, hash::Hasher};

use twox_hash::XxHash64;

use orbit_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use super::World;

const FINGERPRINT_SEED: u64 = 0;

/// A 64-bit digest of a [`World`]. Equal worlds always produce equal
/// fingerprints, on every platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    pub fn of(world: &World) -> Self {
        // Hash explicit little-endian bytes; `Hash` impls for usize and
        // friends vary by target.
        let mut bytes = Vec::with_capacity(8 + world.slot_count() * 52);
        bytes.extend_from_slice(&(world.slot_count() as u64).to_le_bytes());
        for body in world.iter() {
            body.write_fingerprint_bytes(&mut bytes);
        }

        let mut hasher = XxHash64::with_seed(FINGERPRINT_SEED);
        hasher.write(&bytes);
        Self(hasher.finish())
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serde for Fingerprint {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u64::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Fingerprint {
    fn const_bit_length() -> u32 {
        <u64 as ConstBitLength>::const_bit_length()
    }
}

impl World {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}
