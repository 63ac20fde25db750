use crate::buffer::{SampleRingBuffer, SampleTexture, WrittenRange};

/// Number of recent trigger points kept for overlapping sweeps.
pub const TRIGGER_SLOTS: usize = 20;

/// Channel 1 level a rising edge must cross.
pub const TRIGGER_LEVEL: f32 = 0.0;

/// Circular record of the most recent trigger positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRecord {
    slots: [Option<usize>; TRIGGER_SLOTS],
    add_cursor: usize,
}

impl Default for TriggerRecord {
    fn default() -> Self {
        Self {
            slots: [None; TRIGGER_SLOTS],
            add_cursor: 0,
        }
    }
}

impl TriggerRecord {
    pub fn valid_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_count() == 0
    }

    /// Valid entries as `(age, sample index)`, newest first.
    ///
    /// `age` counts slots back from the most recently written one, so it
    /// keeps growing across invalidated slots.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..TRIGGER_SLOTS).filter_map(move |age| {
            let slot = (self.add_cursor + TRIGGER_SLOTS - 1 - age) % TRIGGER_SLOTS;
            self.slots[slot].map(|index| (age, index))
        })
    }

    fn push(&mut self, index: usize) {
        self.slots[self.add_cursor] = Some(index);
        self.add_cursor = (self.add_cursor + 1) % TRIGGER_SLOTS;
    }
}

/// What one scan changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanStats {
    pub added: usize,
    pub invalidated: usize,
}

/// Rising zero-crossing detector over channel 1 of the sample history.
#[derive(Debug, Clone, Default)]
pub struct TriggerDetector {
    record: TriggerRecord,
    /// Samples left before another trigger may fire.
    inhibition: usize,
}

impl TriggerDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &TriggerRecord {
        &self.record
    }

    pub fn inhibition(&self) -> usize {
        self.inhibition
    }

    pub fn clear(&mut self) {
        self.record = TriggerRecord::default();
        self.inhibition = 0;
    }

    /// Scan the freshly written `range` of `buffer`, which must be the
    /// buffer's last write.
    ///
    /// Entries pointing into `range` are dropped first since their samples
    /// were just overwritten.
    pub fn scan<T: SampleTexture>(
        &mut self,
        range: WrittenRange,
        buffer: &SampleRingBuffer<T>,
        inhibition_window: usize,
    ) -> ScanStats {
        let capacity = buffer.capacity();
        let mut stats = ScanStats::default();

        for slot in self.record.slots.iter_mut() {
            if matches!(slot, Some(index) if range.contains(*index, capacity)) {
                *slot = None;
                stats.invalidated += 1;
            }
        }

        let start = range.start % capacity;
        let mut previous = buffer.predecessor();
        for i in start..start + range.len {
            let value = buffer.channel1(i);
            if self.inhibition > 0 {
                self.inhibition -= 1;
            } else if previous <= TRIGGER_LEVEL && value > TRIGGER_LEVEL {
                self.record.push(i % capacity);
                self.inhibition = inhibition_window.min(capacity);
                stats.added += 1;
            }
            previous = value;
        }

        stats
    }
}
