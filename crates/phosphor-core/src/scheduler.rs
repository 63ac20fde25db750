/// Coalescing redraw queue: at most one frame is ever pending.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: bool,
    coalesced: u64,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a frame. Returns `false` if one was already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Requests folded into an already pending frame.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_coalesce_into_one_frame() {
        let mut s = RedrawScheduler::new();
        assert!(s.request());
        assert!(!s.request());
        assert!(!s.request());
        assert_eq!(s.coalesced(), 2);
        assert!(s.take());
        assert!(!s.take());
        assert!(s.request());
    }
}
