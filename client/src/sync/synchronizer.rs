use std::collections::BTreeMap;

use log::{debug, warn};

use orbit_shared::{Fingerprint, FrameHistory, FrameIndex, FrameRecord, Instant, Lookup, Message};

use super::{loss_window::LossWindow, sync_config::SyncConfig};

/// Two peers disagreed about the world at `frame`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Desync {
    pub frame: FrameIndex,
    pub local: Fingerprint,
    pub remote: Fingerprint,
}

/// Outcome of checking a remote fingerprint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch(Desync),
    /// The frame is no longer in local history; counted separately, never
    /// as a failure
    Inconclusive,
    /// The frame hasn't been simulated locally yet; it will be checked when
    /// it is
    Pending,
}

/// Exchanges world fingerprints with the peer, compares them against local
/// history and tracks how many expected fingerprints went missing.
pub struct Synchronizer {
    hash_interval: u32,
    history: FrameHistory,
    parked: BTreeMap<FrameIndex, Fingerprint>,
    resolved: Vec<(FrameIndex, Verdict)>,
    last_remote_frame: Option<FrameIndex>,
    loss: LossWindow,
    hash_successes: u64,
    hash_failures: u64,
    hash_inconclusive: u64,
}

impl Synchronizer {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            hash_interval: config.hash_interval.max(1),
            history: FrameHistory::new(config.history_capacity),
            parked: BTreeMap::new(),
            resolved: Vec::new(),
            last_remote_frame: None,
            loss: LossWindow::new(config.loss_window),
            hash_successes: 0,
            hash_failures: 0,
            hash_inconclusive: 0,
        }
    }

    /// Stores the local fingerprint for `frame`, settles any remote
    /// fingerprint that was waiting for it, and returns the message to send
    /// when `frame` is on the hash interval.
    pub fn record_local(
        &mut self,
        frame: FrameIndex,
        fingerprint: Fingerprint,
        now: Instant,
    ) -> Option<Message> {
        self.history.record(FrameRecord {
            frame,
            fingerprint,
            recorded_at: now,
        });

        let later = match frame.checked_add(1) {
            Some(next) => self.parked.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.parked, later);
        for (parked_frame, remote) in due {
            let verdict = match self.history.lookup(parked_frame) {
                Lookup::Found(record) => self.compare(parked_frame, record.fingerprint, remote),
                Lookup::Evicted | Lookup::NotYet => self.inconclusive(parked_frame),
            };
            self.resolved.push((parked_frame, verdict));
        }

        if frame % self.hash_interval == 0 {
            Some(Message::Fingerprint { frame, fingerprint })
        } else {
            None
        }
    }

    /// Checks a fingerprint the peer computed for `frame`
    pub fn receive_remote(&mut self, frame: FrameIndex, remote: Fingerprint) -> Verdict {
        self.track_arrival(frame);

        match self.history.lookup(frame) {
            Lookup::Found(record) => self.compare(frame, record.fingerprint, remote),
            Lookup::Evicted => self.inconclusive(frame),
            Lookup::NotYet => {
                if self.parked.len() >= self.history.capacity() {
                    if let Some((oldest, _)) = self.parked.pop_first() {
                        let verdict = self.inconclusive(oldest);
                        self.resolved.push((oldest, verdict));
                    }
                }
                self.parked.insert(frame, remote);
                Verdict::Pending
            }
        }
    }

    /// Verdicts reached for fingerprints that were pending, oldest first
    pub fn take_resolved(&mut self) -> Vec<(FrameIndex, Verdict)> {
        std::mem::take(&mut self.resolved)
    }

    pub fn record_ping_answered(&mut self) {
        self.loss.record_received();
    }

    pub fn record_ping_timeouts(&mut self, count: usize) {
        self.loss.record_lost(count);
    }

    pub fn packet_loss(&self) -> f32 {
        self.loss.ratio()
    }

    pub fn hash_successes(&self) -> u64 {
        self.hash_successes
    }

    pub fn hash_failures(&self) -> u64 {
        self.hash_failures
    }

    pub fn hash_inconclusive(&self) -> u64 {
        self.hash_inconclusive
    }

    pub fn pending(&self) -> usize {
        self.parked.len()
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    // Delivery is ordered, so a jump in the remote fingerprint frames means
    // the fingerprints in between were lost.
    fn track_arrival(&mut self, frame: FrameIndex) {
        if let Some(last) = self.last_remote_frame {
            if frame <= last {
                return;
            }
            let expected = (frame - last) / self.hash_interval;
            let missing = expected.saturating_sub(1);
            if missing > 0 {
                debug!("{} fingerprints lost before frame {}", missing, frame);
                self.loss
                    .record_lost(usize::try_from(missing).unwrap_or(usize::MAX));
            }
        }
        self.loss.record_received();
        self.last_remote_frame = Some(frame);
    }

    fn compare(&mut self, frame: FrameIndex, local: Fingerprint, remote: Fingerprint) -> Verdict {
        if local == remote {
            self.hash_successes += 1;
            return Verdict::Match;
        }

        self.hash_failures += 1;
        warn!(
            "Desync at frame {}: local {} remote {}",
            frame, local, remote
        );
        Verdict::Mismatch(Desync {
            frame,
            local,
            remote,
        })
    }

    fn inconclusive(&mut self, frame: FrameIndex) -> Verdict {
        self.hash_inconclusive += 1;
        debug!("Fingerprint for frame {} is no longer verifiable", frame);
        Verdict::Inconclusive
    }
}
