use std::collections::VecDeque;

use crate::{Fingerprint, FrameIndex, Instant};

/// The fingerprint of one completed frame and when it was computed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRecord {
    pub frame: FrameIndex,
    pub fingerprint: Fingerprint,
    pub recorded_at: Instant,
}

/// Outcome of looking a frame up in a [`FrameHistory`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found(FrameRecord),
    /// The frame is older than anything still retained
    Evicted,
    /// The frame hasn't been simulated yet
    NotYet,
}

/// Bounded ring of recent [`FrameRecord`]s, oldest evicted first
#[derive(Clone, Debug)]
pub struct FrameHistory {
    records: VecDeque<FrameRecord>,
    capacity: usize,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, evicting the oldest once full. A record that does
    /// not follow the latest one starts a fresh history.
    pub fn record(&mut self, record: FrameRecord) {
        if let Some(latest) = self.records.back() {
            if record.frame <= latest.frame {
                self.records.clear();
            }
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn lookup(&self, frame: FrameIndex) -> Lookup {
        let (Some(oldest), Some(latest)) = (self.records.front(), self.records.back()) else {
            return Lookup::NotYet;
        };
        if frame > latest.frame {
            return Lookup::NotYet;
        }
        if frame < oldest.frame {
            return Lookup::Evicted;
        }
        match self
            .records
            .binary_search_by_key(&frame, |record| record.frame)
        {
            Ok(index) => Lookup::Found(self.records[index]),
            Err(_) => Lookup::Evicted,
        }
    }

    pub fn latest(&self) -> Option<&FrameRecord> {
        self.records.back()
    }

    pub fn oldest_frame(&self) -> Option<FrameIndex> {
        self.records.front().map(|record| record.frame)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
