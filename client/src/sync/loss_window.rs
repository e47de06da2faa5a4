use std::collections::VecDeque;

/// Rolling record of whether expected messages arrived
#[derive(Clone, Debug)]
pub struct LossWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
    lost: usize,
}

impl LossWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            lost: 0,
        }
    }

    pub fn record_received(&mut self) {
        self.push(true);
    }

    pub fn record_lost(&mut self, count: usize) {
        // more losses than the window holds would only push each other out
        for _ in 0..count.min(self.capacity) {
            self.push(false);
        }
    }

    /// Fraction of expected messages that were lost, 0 when nothing was expected yet
    pub fn ratio(&self) -> f32 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.lost as f32 / self.outcomes.len() as f32
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn push(&mut self, received: bool) {
        if self.outcomes.len() == self.capacity {
            if let Some(false) = self.outcomes.pop_front() {
                self.lost -= 1;
            }
        }
        if !received {
            self.lost += 1;
        }
        self.outcomes.push_back(received);
    }
}
