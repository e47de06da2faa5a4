use std::{collections::VecDeque, time::Duration};

use log::{debug, trace};

use orbit_shared::{FrameIndex, Instant, Message, PingIndex};

use super::ping_config::PingConfig;

/// Sends periodic pings and turns the matching pongs into a smoothed round
/// trip time
pub struct PingManager {
    config: PingConfig,
    rtt_average: f32,
    has_sample: bool,
    next_index: PingIndex,
    last_sent: Option<Instant>,
    outstanding: VecDeque<(PingIndex, Instant)>,
}

impl PingManager {
    pub fn new(config: &PingConfig) -> Self {
        Self {
            config: config.clone(),
            rtt_average: config.rtt_initial_estimate.as_secs_f32(),
            has_sample: false,
            next_index: 0,
            last_sent: None,
            outstanding: VecDeque::new(),
        }
    }

    pub fn should_send_ping(&self, now: &Instant) -> bool {
        match self.last_sent {
            None => true,
            Some(sent) => now.duration_since(sent) >= self.config.ping_interval,
        }
    }

    /// Builds the next ping and starts timing it
    pub fn send_ping(&mut self, now: &Instant, frame: FrameIndex) -> Message {
        let index = self.next_index;
        self.next_index = self.next_index.wrapping_add(1);
        self.last_sent = Some(*now);
        self.outstanding.push_back((index, *now));
        trace!("Sending ping {}", index);
        Message::Ping { index, frame }
    }

    /// Folds the pong's round trip into the average. Pongs that don't match
    /// an outstanding ping are ignored and return `None`.
    pub fn process_pong(&mut self, index: PingIndex, now: &Instant) -> Option<Duration> {
        let position = self
            .outstanding
            .iter()
            .position(|(outstanding, _)| *outstanding == index)?;
        let (_, sent) = self.outstanding.remove(position)?;
        let sample = now.duration_since(sent);

        if self.has_sample {
            let alpha = self.config.rtt_smoothing_factor.clamp(0.0, 1.0);
            self.rtt_average = self.rtt_average * (1.0 - alpha) + sample.as_secs_f32() * alpha;
        } else {
            self.rtt_average = sample.as_secs_f32();
            self.has_sample = true;
        }
        debug!(
            "Pong {}: sample {:?}, smoothed rtt {:.4}s",
            index, sample, self.rtt_average
        );
        Some(sample)
    }

    /// Forgets pings that went unanswered for longer than the timeout and
    /// returns how many there were
    pub fn expire(&mut self, now: &Instant) -> usize {
        let timeout = self.config.ping_timeout;
        let before = self.outstanding.len();
        self.outstanding
            .retain(|(_, sent)| now.duration_since(*sent) < timeout);
        before - self.outstanding.len()
    }

    /// Smoothed round trip time in seconds
    pub fn rtt_secs(&self) -> f32 {
        self.rtt_average
    }

    pub fn one_way_secs(&self) -> f32 {
        self.rtt_average / 2.0
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}
