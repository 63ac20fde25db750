use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use phosphor_core::CHANNELS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Interleaved chunks that may be queued between the audio thread and the editor.
pub const CHUNK_QUEUE_DEPTH: usize = 64;

/// Audio-thread end of the sample channel.
///
/// Never blocks and never allocates: chunks are built in a fixed pool of
/// buffers that circulate through the editor and back. When the editor
/// falls behind and no buffer is free, whole chunks are dropped and counted.
#[derive(Clone)]
pub struct SampleSink {
    tx: Sender<Vec<f32>>,
    recycled: Receiver<Vec<f32>>,
    recycle: Sender<Vec<f32>>,
    dropped: Arc<AtomicU64>,
}

/// Editor end of the sample channel.
pub struct SampleSource {
    rx: Receiver<Vec<f32>>,
    recycle: Sender<Vec<f32>>,
    dropped: Arc<AtomicU64>,
    reported_dropped: u64,
}

/// Create a connected sink/source pair with a pool of `depth` chunk buffers.
///
/// The buffers start empty; call [`SampleSink::reserve`] once the block size
/// is known.
pub fn sample_channel(depth: usize) -> (SampleSink, SampleSource) {
    let (tx, rx) = channel::bounded(depth);
    let (recycle, recycled) = channel::bounded(depth);
    for _ in 0..depth {
        let _ = recycle.try_send(Vec::new());
    }
    let dropped = Arc::new(AtomicU64::new(0));
    (
        SampleSink {
            tx,
            recycled,
            recycle: recycle.clone(),
            dropped: dropped.clone(),
        },
        SampleSource {
            rx,
            recycle,
            dropped,
            reported_dropped: 0,
        },
    )
}

impl SampleSink {
    /// Grow every free pool buffer to hold `frames` stereo frames.
    ///
    /// Allocates; call it outside the audio callback, e.g. from `initialize`.
    pub fn reserve(&self, frames: usize) {
        let wanted = frames * CHANNELS;
        let free: Vec<Vec<f32>> = self.recycled.try_iter().collect();
        log::debug!("reserving {} pooled chunks of {} frames", free.len(), frames);
        for mut chunk in free {
            chunk.reserve(wanted.saturating_sub(chunk.len()));
            let _ = self.recycle.try_send(chunk);
        }
    }

    /// Interleave two channel slices into a pooled chunk and queue it.
    ///
    /// Returns `false` if the chunk was dropped.
    pub fn push_stereo(&self, ch1: &[f32], ch2: &[f32]) -> bool {
        let Ok(mut chunk) = self.recycled.try_recv() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        chunk.clear();
        chunk.extend(ch1.iter().zip(ch2).flat_map(|(a, b)| [*a, *b]));
        self.push(chunk)
    }

    /// Queue an already interleaved chunk.
    ///
    /// A chunk that cannot be queued joins the free pool instead of being freed here.
    pub fn push(&self, chunk: Vec<f32>) -> bool {
        match self.tx.try_send(chunk) {
            Ok(()) => true,
            Err(TrySendError::Full(chunk)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                let _ = self.recycle.try_send(chunk);
                false
            }
            // Editor closed; nobody is listening.
            Err(TrySendError::Disconnected(chunk)) => {
                let _ = self.recycle.try_send(chunk);
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl SampleSource {
    /// Hand every queued chunk to `ingest`, oldest first, then recycle it.
    pub fn drain(&mut self, mut ingest: impl FnMut(&[f32])) -> usize {
        let mut count = 0;
        while let Ok(chunk) = self.rx.try_recv() {
            ingest(&chunk);
            let _ = self.recycle.try_send(chunk);
            count += 1;
        }

        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > self.reported_dropped {
            log::warn!(
                "scope fell behind, {} sample chunks dropped",
                dropped - self.reported_dropped
            );
            self.reported_dropped = dropped;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_arrive_interleaved_and_in_order() {
        let (sink, mut source) = sample_channel(4);
        assert!(sink.push_stereo(&[1.0, 2.0], &[-1.0, -2.0]));
        assert!(sink.push_stereo(&[3.0], &[-3.0]));

        let mut seen = Vec::new();
        assert_eq!(source.drain(|chunk| seen.push(chunk.to_vec())), 2);
        assert_eq!(seen, vec![vec![1.0, -1.0, 2.0, -2.0], vec![3.0, -3.0]]);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let (sink, mut source) = sample_channel(2);
        assert!(sink.push_stereo(&[0.0], &[0.0]));
        assert!(sink.push_stereo(&[0.0], &[0.0]));
        assert!(!sink.push_stereo(&[0.0], &[0.0]));
        assert_eq!(sink.dropped(), 1);
        assert_eq!(source.drain(|_| {}), 2);
        assert!(sink.push_stereo(&[0.0], &[0.0]));
    }

    #[test]
    fn pool_is_filled_up_front() {
        let (sink, _source) = sample_channel(4);
        assert_eq!(sink.recycled.len(), 4);
    }

    #[test]
    fn reserved_buffers_fit_a_block_without_growing() {
        let (sink, source) = sample_channel(3);
        sink.reserve(512);
        let pool: Vec<Vec<f32>> = sink.recycled.try_iter().collect();
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|chunk| chunk.capacity() >= 1024));
        for chunk in pool {
            sink.recycle.try_send(chunk).unwrap();
        }

        let block = vec![0.25; 512];
        assert!(sink.push_stereo(&block, &block));
        let queued: Vec<Vec<f32>> = source.rx.try_iter().collect();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].len(), 1024);
        assert!(queued[0].capacity() >= 1024);
    }

    #[test]
    fn rejected_chunks_return_to_the_pool() {
        let (sink, mut source) = sample_channel(1);
        assert!(sink.push_stereo(&[1.0], &[2.0]));
        // The only buffer is queued, so the next push has nothing to fill.
        assert!(!sink.push_stereo(&[3.0], &[4.0]));
        assert!(!sink.push(vec![5.0, 6.0]));
        assert_eq!(sink.dropped(), 2);
        assert_eq!(sink.recycled.len(), 1);

        source.drain(|chunk| assert_eq!(chunk, &[1.0, 2.0]));
        assert_eq!(sink.recycled.len(), 1);
    }
}
