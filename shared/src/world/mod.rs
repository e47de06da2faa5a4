pub mod body;
pub mod fingerprint;
pub mod physics;

use orbit_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{BodyId, Float, Vec2};
use body::Body;

/// The set of live bodies, stored by slot. A body's id is its slot index, so
/// ids stay stable across ticks: removing a body leaves an empty slot behind
/// and the next spawn reuses the lowest empty slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct World {
    slots: Vec<Option<Body>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body in the lowest free slot. Returns `None` only when every
    /// representable id is live.
    pub fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        mass: Float,
        radius: Float,
    ) -> Option<BodyId> {
        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => index,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        let Ok(id) = BodyId::try_from(index) else {
            self.trim_tail();
            return None;
        };

        self.slots[index] = Some(Body {
            id,
            position,
            velocity,
            mass,
            radius,
        });
        Some(id)
    }

    /// Tombstones the body's slot. Other ids are untouched.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let removed = self.slot_mut(id)?.take();
        self.trim_tail();
        removed
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        let index = usize::try_from(id).ok()?;
        self.slots.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slot_mut(id)?.as_mut()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live bodies in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Body> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Ids of the live bodies in ascending order
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(Body::id).collect()
    }

    fn slot_mut(&mut self, id: BodyId) -> Option<&mut Option<Body>> {
        let index = usize::try_from(id).ok()?;
        self.slots.get_mut(index)
    }

    // Trailing tombstones carry no information, dropping them keeps the
    // slot layout canonical so equal worlds fingerprint equally.
    fn trim_tail(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Serde for World {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.slots.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let slots = Vec::<Option<Body>>::de(reader)?;

        // SECURITY: ids are slot indices, a body claiming another slot would
        // break id stability
        for (index, slot) in slots.iter().enumerate() {
            if let Some(body) = slot {
                if usize::try_from(body.id).ok() != Some(index) {
                    return Err(SerdeErr);
                }
            }
        }
        if matches!(slots.last(), Some(None)) {
            return Err(SerdeErr);
        }

        Ok(Self { slots })
    }

    fn bit_length(&self) -> u32 {
        self.slots.bit_length()
    }
}
