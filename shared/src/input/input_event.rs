use orbit_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::{
    input::error::InputError,
    math::{read_float, write_float},
    Float, FrameIndex, PeerId, Vec2,
};

/// What an input does when its frame is simulated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Create a body at rest
    Spawn { position: Vec2, mass: Float },
    /// Create a body thrown from `position` towards `target`
    Impulse {
        position: Vec2,
        mass: Float,
        target: Vec2,
    },
}

impl InputKind {
    /// Builds a spawn from host coordinates
    pub fn try_spawn(x: f32, y: f32, mass: f32) -> Result<Self, InputError> {
        let kind = Self::Spawn {
            position: host_point(x, y)?,
            mass: host_mass(mass)?,
        };
        Ok(kind)
    }

    /// Builds an impulse from a drag starting at `(x, y)` and released at
    /// `(target_x, target_y)`
    pub fn try_impulse(
        x: f32,
        y: f32,
        mass: f32,
        target_x: f32,
        target_y: f32,
    ) -> Result<Self, InputError> {
        let kind = Self::Impulse {
            position: host_point(x, y)?,
            mass: host_mass(mass)?,
            target: host_point(target_x, target_y)?,
        };
        Ok(kind)
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::Spawn { position, .. } | Self::Impulse { position, .. } => *position,
        }
    }

    pub fn mass(&self) -> Float {
        match self {
            Self::Spawn { mass, .. } | Self::Impulse { mass, .. } => *mass,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.mass() <= Float::ZERO {
            return Err(InputError::InvalidInput {
                reason: "mass must be positive",
            });
        }
        Ok(())
    }
}

fn host_point(x: f32, y: f32) -> Result<Vec2, InputError> {
    Vec2::try_from_f32(x, y).ok_or(InputError::InvalidInput {
        reason: "coordinate is not a finite number in simulation range",
    })
}

fn host_mass(mass: f32) -> Result<Float, InputError> {
    let Some(mass) = Float::checked_from_num(mass) else {
        return Err(InputError::InvalidInput {
            reason: "mass is not a finite number in simulation range",
        });
    };
    if mass <= Float::ZERO {
        return Err(InputError::InvalidInput {
            reason: "mass must be positive",
        });
    }
    Ok(mass)
}

impl Serde for InputKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Self::Spawn { position, mass } => {
                UnsignedInteger::<1>::new(0).ser(writer);
                position.ser(writer);
                write_float(*mass, writer);
            }
            Self::Impulse {
                position,
                mass,
                target,
            } => {
                UnsignedInteger::<1>::new(1).ser(writer);
                position.ser(writer);
                write_float(*mass, writer);
                target.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let tag = UnsignedInteger::<1>::de(reader)?.get();
        let position = Vec2::de(reader)?;
        let mass = read_float(reader)?;
        match tag {
            0 => Ok(Self::Spawn { position, mass }),
            1 => {
                let target = Vec2::de(reader)?;
                Ok(Self::Impulse {
                    position,
                    mass,
                    target,
                })
            }
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        let mut output = 1 + Vec2::ZERO.bit_length() + 64;
        if let Self::Impulse { target, .. } = self {
            output += target.bit_length();
        }
        output
    }
}

/// `(frame, origin, sequence)`, unique per event
pub type InputKey = (FrameIndex, PeerId, u32);

/// A discrete stimulus stamped with the frame it takes effect on. Events
/// are immutable once created and applied in `(frame, origin, sequence)`
/// order on every peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputEvent {
    frame: FrameIndex,
    origin: PeerId,
    sequence: u32,
    kind: InputKind,
}

impl InputEvent {
    pub fn new(frame: FrameIndex, origin: PeerId, sequence: u32, kind: InputKind) -> Self {
        Self {
            frame,
            origin,
            sequence,
            kind,
        }
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn origin(&self) -> PeerId {
        self.origin
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    /// Total order used to apply events deterministically
    pub fn key(&self) -> InputKey {
        (self.frame, self.origin, self.sequence)
    }
}

impl Serde for InputEvent {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.frame.ser(writer);
        self.origin.ser(writer);
        self.sequence.ser(writer);
        self.kind.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let frame = FrameIndex::de(reader)?;
        let origin = PeerId::de(reader)?;
        let sequence = u32::de(reader)?;
        let kind = InputKind::de(reader)?;
        Ok(Self {
            frame,
            origin,
            sequence,
            kind,
        })
    }

    fn bit_length(&self) -> u32 {
        self.frame.bit_length()
            + self.origin.bit_length()
            + self.sequence.bit_length()
            + self.kind.bit_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_values_are_validated() {
        assert!(InputKind::try_spawn(1.0, 2.0, 3.0).is_ok());
        assert!(matches!(
            InputKind::try_spawn(1.0, 2.0, 0.0),
            Err(InputError::InvalidInput { .. })
        ));
        assert!(InputKind::try_spawn(1.0, 2.0, -5.0).is_err());
        assert!(InputKind::try_spawn(f32::NAN, 2.0, 5.0).is_err());
        assert!(InputKind::try_impulse(0.0, 0.0, 1.0, f32::INFINITY, 0.0).is_err());
    }

    #[test]
    fn impulse_keeps_its_target() {
        let kind = InputKind::try_impulse(0.0, 0.0, 2.0, 10.0, -4.0).unwrap();
        let InputKind::Impulse { target, .. } = kind else {
            panic!("expected an impulse");
        };
        assert_eq!(target, Vec2::new(Float::from_num(10), Float::from_num(-4)));
        assert_eq!(kind.mass(), Float::from_num(2));
    }

    #[test]
    fn truncated_events_are_rejected() {
        let event = InputEvent::new(9, 1, 4, InputKind::try_spawn(1.0, 1.0, 1.0).unwrap());
        let mut writer = orbit_serde::BitWriter::new();
        event.ser(&mut writer);
        assert_eq!(writer.bits_written(), event.bit_length());
        let bytes = writer.to_bytes();

        let truncated = &bytes[..bytes.len() - 2];
        assert!(InputEvent::de(&mut BitReader::new(truncated)).is_err());
        assert_eq!(InputEvent::de(&mut BitReader::new(&bytes)).unwrap(), event);
    }
}
