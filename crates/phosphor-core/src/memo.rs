/// A single-entry cache keyed by the value of its inputs.
///
/// The cached value is reused for as long as the key compares equal;
/// any change of value (not identity) recomputes it.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing it first on a miss.
    pub fn get_or_compute(&mut self, key: &K, compute: impl FnOnce(&K) -> V) -> &V {
        if !self.is_cached(key) {
            self.entry = None;
        }
        &self.entry.get_or_insert_with(|| (key.clone(), compute(key))).1
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_cached(&self, key: &K) -> bool {
        matches!(&self.entry, Some((cached, _)) if cached == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_only_on_value_change() {
        let mut memo: Memo<(u32, f32), u32> = Memo::new();
        let mut calls = 0;

        let v = *memo.get_or_compute(&(1, 2.0), |_| {
            calls += 1;
            10
        });
        assert_eq!(v, 10);

        // Equal value, different instance.
        let key = (1, 2.0);
        memo.get_or_compute(&key, |_| {
            calls += 1;
            11
        });
        assert_eq!(calls, 1);

        let v = *memo.get_or_compute(&(1, 3.0), |_| {
            calls += 1;
            12
        });
        assert_eq!((v, calls), (12, 2));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let mut memo: Memo<u8, u8> = Memo::new();
        memo.get_or_compute(&1, |k| *k);
        assert!(memo.is_cached(&1));
        memo.invalidate();
        assert!(!memo.is_cached(&1));
    }
}
