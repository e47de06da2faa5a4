use orbit_shared::{BodyId, FrameIndex, World};

/// A body converted to host floats for drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyView {
    pub id: BodyId,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub mass: f32,
}

/// Read-only copy of the world at one frame. Conversion to `f32` is lossy
/// and never feeds back into the simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSnapshot {
    pub frame: FrameIndex,
    pub bodies: Vec<BodyView>,
}

impl RenderSnapshot {
    pub fn capture(frame: FrameIndex, world: &World) -> Self {
        let bodies = world
            .iter()
            .map(|body| BodyView {
                id: body.id(),
                x: body.position().x.to_num(),
                y: body.position().y.to_num(),
                radius: body.radius().to_num(),
                mass: body.mass().to_num(),
            })
            .collect();
        Self { frame, bodies }
    }
}
