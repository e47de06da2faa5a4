pub type FrameIndex = u32;
pub type BodyId = u32;
pub type PeerId = u16;
pub type PingIndex = u16;
