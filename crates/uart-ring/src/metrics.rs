use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the receive path and the transport.
///
/// Each counter has a single writer (the receive path or the transport), so
/// Relaxed increments are enough; readers get a point-in-time
/// [`MetricsSnapshot`].
#[derive(Debug, Default)]
pub struct Metrics {
    bytes_received: AtomicU64,
    bytes_dropped: AtomicU64,
    spurious_interrupts: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    write_timeouts: AtomicU64,
    tx_wait_spins: AtomicU64,
}

/// Plain copy of [`Metrics`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Bytes the interrupt path stored in the ring.
    pub bytes_received: u64,
    /// Bytes the interrupt path discarded because the ring was full.
    pub bytes_dropped: u64,
    /// Interrupt invocations that found no pending byte.
    pub spurious_interrupts: u64,
    /// Bytes the foreground took out of the ring.
    pub bytes_read: u64,
    /// Bytes handed to the transmitter.
    pub bytes_written: u64,
    /// Writes abandoned because the transmitter never became ready.
    pub write_timeouts: u64,
    /// Failed transmit-ready checks across all writes.
    pub tx_wait_spins: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_received(&self) {
        self.bytes_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dropped(&self) {
        self.bytes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_spurious(&self) {
        self.spurious_interrupts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_read(&self, n: u64) {
        self.bytes_read.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_written(&self) {
        self.bytes_written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_write_timeout(&self) {
        self.write_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_tx_wait_spins(&self, n: u64) {
        if n > 0 {
            self.tx_wait_spins.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Copies every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_dropped: self.bytes_dropped.load(Ordering::Relaxed),
            spurious_interrupts: self.spurious_interrupts.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_timeouts: self.write_timeouts.load(Ordering::Relaxed),
            tx_wait_spins: self.tx_wait_spins.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let m = Metrics::new();
        m.add_received();
        m.add_received();
        m.add_dropped();
        m.add_read(2);
        m.add_tx_wait_spins(0);
        m.add_tx_wait_spins(5);

        let s = m.snapshot();
        assert_eq!(s.bytes_received, 2);
        assert_eq!(s.bytes_dropped, 1);
        assert_eq!(s.bytes_read, 2);
        assert_eq!(s.tx_wait_spins, 5);
        assert_eq!(s.write_timeouts, 0);
    }
}
