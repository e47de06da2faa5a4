use orbit_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::{
    math::{read_float, write_float},
    BodyId, Float, Vec2,
};

/// A point mass drawn as a circle. Only the engine mutates bodies, and only
/// during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) mass: Float,
    pub(crate) radius: Float,
}

impl Body {
    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn mass(&self) -> Float {
        self.mass
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius.saturating_add(other.radius);
        self.position.distance_squared(other.position) <= reach.saturating_mul(reach)
    }

    pub(crate) fn write_fingerprint_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_le_bytes());
        for value in [
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
            self.mass,
            self.radius,
        ] {
            out.extend_from_slice(&value.to_bits().to_le_bytes());
        }
    }
}

impl Serde for Body {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.id.ser(writer);
        self.position.ser(writer);
        self.velocity.ser(writer);
        write_float(self.mass, writer);
        write_float(self.radius, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let id = BodyId::de(reader)?;
        let position = Vec2::de(reader)?;
        let velocity = Vec2::de(reader)?;
        let mass = read_float(reader)?;
        let radius = read_float(reader)?;

        // SECURITY: a body with no mass would divide by zero when merged
        if mass <= Float::ZERO || radius < Float::ZERO {
            return Err(SerdeErr);
        }

        Ok(Self {
            id,
            position,
            velocity,
            mass,
            radius,
        })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Body {
    fn const_bit_length() -> u32 {
        <BodyId as ConstBitLength>::const_bit_length()
            + 2 * <Vec2 as ConstBitLength>::const_bit_length()
            + 2 * <i64 as ConstBitLength>::const_bit_length()
    }
}
