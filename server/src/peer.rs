use std::collections::BTreeMap;

use log::{debug, warn};

use orbit_shared::{
    Fingerprint, FrameHistory, FrameIndex, InputEvent, Lookup, Message, OutgoingInputs, PeerId,
    Transport,
};

/// Per-peer counters kept by the relay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeerStats {
    pub hash_successes: u64,
    pub hash_failures: u64,
    pub hash_inconclusive: u64,
    pub late_inputs: u64,
    pub relayed_inputs: u64,
}

/// The relay's fingerprint disagreed with a peer's
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerDesync {
    pub peer: PeerId,
    pub frame: FrameIndex,
    pub relay: Fingerprint,
    pub remote: Fingerprint,
}

pub(crate) enum PeerVerdict {
    Match,
    Mismatch(PeerDesync),
    Inconclusive,
    Pending,
}

pub(crate) struct PeerConnection<T: Transport> {
    id: PeerId,
    transport: T,
    parked: BTreeMap<FrameIndex, Fingerprint>,
    evicted: Vec<(FrameIndex, PeerVerdict)>,
    outgoing: OutgoingInputs,
    last_frame: Option<FrameIndex>,
    stats: PeerStats,
}

impl<T: Transport> PeerConnection<T> {
    pub fn new(id: PeerId, transport: T) -> Self {
        Self {
            id,
            transport,
            parked: BTreeMap::new(),
            evicted: Vec::new(),
            outgoing: OutgoingInputs::new(),
            last_frame: None,
            stats: PeerStats::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn stats(&self) -> PeerStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut PeerStats {
        &mut self.stats
    }

    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.last_frame
    }

    pub fn observe_frame(&mut self, frame: FrameIndex) {
        if self.last_frame.map_or(true, |last| frame > last) {
            self.last_frame = Some(frame);
        }
    }

    pub fn send(&self, message: &Message) {
        if let Err(error) = self.transport.send(&message.to_bytes()) {
            debug!("Couldn't send to peer {}: {}", self.id, error);
        }
    }

    /// Sends another peer's input, and keeps sending it on every
    /// [`PeerConnection::resend_inputs`] until this peer reports a frame
    /// past it
    pub fn forward_input(&mut self, event: InputEvent) {
        self.send(&Message::Input(event));
        self.outgoing.push(event);
    }

    /// Forgets inputs this peer has simulated past, then repeats the rest.
    /// Without a frame report, inputs older than `oldest` are given up on.
    pub fn resend_inputs(&mut self, oldest: FrameIndex) {
        let acknowledged = self.last_frame.unwrap_or(oldest).max(oldest);
        self.outgoing.acknowledge(acknowledged);
        for event in self.outgoing.iter() {
            self.send(&Message::Input(*event));
        }
    }

    /// Checks a fingerprint the peer reported against the relay's history.
    /// Fingerprints for frames the relay hasn't reached yet are parked.
    pub fn check(
        &mut self,
        frame: FrameIndex,
        remote: Fingerprint,
        history: &FrameHistory,
    ) -> PeerVerdict {
        match history.lookup(frame) {
            Lookup::Found(record) => self.compare(frame, record.fingerprint, remote),
            Lookup::Evicted => self.inconclusive(frame),
            Lookup::NotYet => {
                if self.parked.len() >= history.capacity() {
                    if let Some((oldest, _)) = self.parked.pop_first() {
                        let verdict = self.inconclusive(oldest);
                        self.evicted.push((oldest, verdict));
                    }
                }
                self.parked.insert(frame, remote);
                PeerVerdict::Pending
            }
        }
    }

    /// Checks parked fingerprints whose frames the relay has now simulated.
    /// Also returns the parked fingerprints given up on since the last call.
    pub fn settle(&mut self, history: &FrameHistory) -> Vec<(FrameIndex, PeerVerdict)> {
        let mut resolved = std::mem::take(&mut self.evicted);
        let Some(latest) = history.latest().map(|record| record.frame) else {
            return resolved;
        };
        let later = match latest.checked_add(1) {
            Some(next) => self.parked.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.parked, later);

        for (frame, remote) in due {
            let verdict = match history.lookup(frame) {
                Lookup::Found(record) => self.compare(frame, record.fingerprint, remote),
                Lookup::Evicted | Lookup::NotYet => self.inconclusive(frame),
            };
            resolved.push((frame, verdict));
        }
        resolved
    }

    fn compare(&mut self, frame: FrameIndex, relay: Fingerprint, remote: Fingerprint) -> PeerVerdict {
        if relay == remote {
            self.stats.hash_successes += 1;
            return PeerVerdict::Match;
        }
        self.stats.hash_failures += 1;
        warn!(
            "Peer {} desynced at frame {}: relay {} peer {}",
            self.id, frame, relay, remote
        );
        PeerVerdict::Mismatch(PeerDesync {
            peer: self.id,
            frame,
            relay,
            remote,
        })
    }

    fn inconclusive(&mut self, frame: FrameIndex) -> PeerVerdict {
        self.stats.hash_inconclusive += 1;
        debug!(
            "Fingerprint from peer {} for frame {} can't be checked",
            self.id, frame
        );
        PeerVerdict::Inconclusive
    }
}
