pub mod drain;
pub mod server;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use bytes::Bytes;
use http_body_util::Full;

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Hands out arrival indices to concurrent request handlers.
#[derive(Clone, Default)]
pub struct SharedCounter {
    count: Arc<AtomicUsize>,
}

impl SharedCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next index, starting at zero.
    #[inline]
    pub fn claim(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel)
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::SharedCounter;

    #[test]
    fn clones_share_one_sequence() {
        let counter = SharedCounter::new();
        let other = counter.clone();
        assert_eq!(counter.claim(), 0);
        assert_eq!(other.claim(), 1);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn concurrent_claims_are_unique() {
        let counter = SharedCounter::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || (0..100).map(|_| counter.claim()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..800).collect::<Vec<_>>());
    }
}
