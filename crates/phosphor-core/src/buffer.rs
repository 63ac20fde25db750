use crate::error::IngestError;

/// Interleaved channels per sample.
pub const CHANNELS: usize = 2;

/// GPU-side storage mirrored by a [`SampleRingBuffer`].
///
/// The ring buffer is the only caller; implementors never see partial
/// sub-writes out of order.
pub trait SampleTexture {
    /// (Re)allocate storage for `samples` zeroed samples.
    fn allocate(&mut self, samples: usize);

    /// Upload `interleaved` (a whole number of samples) starting at sample `offset`.
    fn write(&mut self, offset: usize, interleaved: &[f32]);
}

/// A texture that discards everything, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTexture;

impl SampleTexture for NoTexture {
    fn allocate(&mut self, _samples: usize) {}
    fn write(&mut self, _offset: usize, _interleaved: &[f32]) {}
}

/// Half-open range of freshly written sample positions.
///
/// `start` is the cursor before the write; `start + len` may run past the
/// capacity and is read modulo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenRange {
    pub start: usize,
    pub len: usize,
}

impl WrittenRange {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether buffer position `index` was overwritten by this write.
    pub fn contains(&self, index: usize, capacity: usize) -> bool {
        let start = self.start % capacity;
        let distance = (index % capacity + capacity - start) % capacity;
        distance < self.len
    }
}

/// Circular history of interleaved two-channel samples.
///
/// Keeps a CPU shadow of everything uploaded to the texture so the trigger
/// scan can read samples back cheaply.
pub struct SampleRingBuffer<T> {
    texture: T,
    shadow: Vec<f32>,
    capacity: usize,
    cursor: usize,
    /// Channel 1 of the sample that preceded the last write in the signal.
    predecessor: f32,
}

impl<T: SampleTexture> SampleRingBuffer<T> {
    pub fn new(capacity: usize, mut texture: T) -> Self {
        let capacity = capacity.max(1);
        texture.allocate(capacity);
        Self {
            texture,
            shadow: vec![0.0; capacity * CHANNELS],
            capacity,
            cursor: 0,
            predecessor: 0.0,
        }
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position the next sample will be written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as a fraction of the buffer; where the oldest sample begins.
    pub fn cut_point(&self) -> f32 {
        self.cursor as f32 / self.capacity as f32
    }

    pub fn shadow(&self) -> &[f32] {
        &self.shadow
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    pub fn texture_mut(&mut self) -> &mut T {
        &mut self.texture
    }

    /// Texture together with the shadow it must mirror.
    pub fn texture_and_shadow(&mut self) -> (&mut T, &[f32]) {
        (&mut self.texture, &self.shadow)
    }

    /// Both channels of the sample at `index` (taken modulo the capacity).
    pub fn sample(&self, index: usize) -> [f32; CHANNELS] {
        let base = (index % self.capacity) * CHANNELS;
        [self.shadow[base], self.shadow[base + 1]]
    }

    pub fn channel1(&self, index: usize) -> f32 {
        self.shadow[(index % self.capacity) * CHANNELS]
    }

    /// Channel 1 of the sample just before the last written range.
    ///
    /// When a write covers the whole buffer the slot before the range holds
    /// the chunk's own newest sample, so scans must start from this instead.
    pub fn predecessor(&self) -> f32 {
        self.predecessor
    }

    /// Drop all history and reallocate at a new depth.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        log::info!("resizing sample history {} -> {} samples", self.capacity, capacity);
        self.capacity = capacity;
        self.shadow.clear();
        self.shadow.resize(capacity * CHANNELS, 0.0);
        self.cursor = 0;
        self.predecessor = 0.0;
        self.texture.allocate(capacity);
    }

    /// Zero the history at the current depth.
    pub fn clear(&mut self) {
        self.resize(self.capacity);
    }

    /// Re-upload the whole shadow, e.g. after the texture lost its contents.
    pub fn resync(&mut self) {
        self.texture.allocate(self.capacity);
        self.texture.write(0, &self.shadow);
    }

    /// Append a chunk of interleaved samples.
    ///
    /// A chunk longer than the buffer keeps only its newest `capacity`
    /// samples, written from position 0.
    pub fn write(&mut self, chunk: &[f32]) -> Result<WrittenRange, IngestError> {
        if chunk.len() % CHANNELS != 0 {
            return Err(IngestError::UnpairedChunk {
                len: chunk.len(),
                channels: CHANNELS,
            });
        }
        let count = chunk.len() / CHANNELS;

        if count > self.capacity {
            let skipped = count - self.capacity;
            self.predecessor = chunk[(skipped - 1) * CHANNELS];
            let newest = &chunk[skipped * CHANNELS..];
            self.cursor = 0;
            self.contiguous_write(newest);
            return Ok(WrittenRange {
                start: 0,
                len: self.capacity,
            });
        }

        let start = self.cursor;
        self.predecessor = self.channel1(start + self.capacity - 1);
        let remaining = self.capacity - self.cursor;
        if count > remaining {
            let (head, tail) = chunk.split_at(remaining * CHANNELS);
            self.contiguous_write(head);
            self.contiguous_write(tail);
        } else {
            self.contiguous_write(chunk);
        }
        Ok(WrittenRange { start, len: count })
    }

    fn contiguous_write(&mut self, values: &[f32]) {
        let samples = values.len() / CHANNELS;
        if samples == 0 {
            return;
        }
        let offset = self.cursor * CHANNELS;
        self.texture.write(self.cursor, values);
        self.shadow[offset..offset + values.len()].copy_from_slice(values);
        self.cursor = (self.cursor + samples) % self.capacity;
    }
}
