use fastrand::Rng;

/// Drops a fraction of outgoing messages, standing in for a lossy network.
/// Seeded, so a test run always drops the same messages.
#[derive(Clone, Debug)]
pub struct LinkConditioner {
    loss: f32,
    rng: Rng,
}

impl LinkConditioner {
    /// `loss` is the probability, clamped to `0.0..=1.0`, that a message is dropped
    pub fn new(loss: f32, seed: u64) -> Self {
        let loss = if loss.is_nan() { 0.0 } else { loss.clamp(0.0, 1.0) };
        Self {
            loss,
            rng: Rng::with_seed(seed),
        }
    }

    pub fn perfect_condition() -> Self {
        Self::new(0.0, 0)
    }

    pub fn average_condition(seed: u64) -> Self {
        Self::new(0.02, seed)
    }

    pub fn poor_condition(seed: u64) -> Self {
        Self::new(0.1, seed)
    }

    pub fn loss(&self) -> f32 {
        self.loss
    }

    /// Decides the fate of the next message
    pub fn should_drop(&mut self) -> bool {
        self.loss > 0.0 && self.rng.f32() < self.loss
    }
}
