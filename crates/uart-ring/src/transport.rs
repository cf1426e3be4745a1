//! Foreground transport: the consumer side of the UART ring plus the direct
//! transmit path.

use crate::backoff::Backoff;
use crate::insights;
use crate::port::ByteSink;
use crate::{Consumer, Metrics, NoData, TransmitWait, TransportError};
use std::sync::Arc;
use std::time::Instant;

/// Polling reader and busy-waiting writer for one UART.
///
/// Reads come out of the ring filled by the matching
/// [`ReceivePath`](crate::ReceivePath); writes go straight to the sink, one
/// byte per transmit-ready signal, without buffering.
#[derive(Debug)]
pub struct Transport<'a, K> {
    consumer: Consumer<'a>,
    sink: K,
    wait: TransmitWait,
    metrics: Arc<Metrics>,
}

impl<'a, K: ByteSink> Transport<'a, K> {
    /// Creates a transport with the baseline unbounded transmit wait.
    pub fn new(consumer: Consumer<'a>, sink: K) -> Self {
        Self::with_config(
            consumer,
            sink,
            TransmitWait::Unbounded,
            Arc::new(Metrics::new()),
        )
    }

    pub fn with_config(
        consumer: Consumer<'a>,
        sink: K,
        wait: TransmitWait,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            consumer,
            sink,
            wait,
            metrics,
        }
    }

    // ---------------------------------------------------------------------
    // RECEIVE (from the ring)
    // ---------------------------------------------------------------------

    /// Takes the oldest received byte. [`NoData`] just means nothing arrived yet.
    pub fn read_byte(&mut self) -> Result<u8, NoData> {
        let byte = self.consumer.get()?;
        self.metrics.add_read(1);
        Ok(byte)
    }

    /// Moves every available byte that fits into `out`; returns the count.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let n = self.consumer.drain_into(out);
        self.metrics.add_read(n as u64);
        n
    }

    /// Number of received bytes waiting in the ring.
    pub fn available(&self) -> usize {
        self.consumer.len()
    }

    // ---------------------------------------------------------------------
    // TRANSMIT (direct to the sink)
    // ---------------------------------------------------------------------

    /// Waits for transmit-ready, writes `byte` to the sink and clears the signal.
    ///
    /// With [`TransmitWait::Unbounded`] this always returns `Ok` and spins for
    /// as long as the sink stays busy. Bounded policies return
    /// [`TransportError::WriteTimeout`] without touching the sink.
    ///
    /// On hosted targets the wait yields the thread once its spin budget is spent.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        let spins = self.wait_tx_ready(byte)?;

        self.sink.write_byte(byte);
        self.sink.clear_tx_ready();

        self.metrics.add_written();
        insights::record_write(byte, spins);
        Ok(())
    }

    /// Writes `bytes` in order, stopping at the first timeout.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        for (written, &byte) in bytes.iter().enumerate() {
            self.write_byte(byte).map_err(|err| match err {
                TransportError::WriteTimeout { waited } => {
                    TransportError::Incomplete { written, waited }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Spins until the sink is ready; returns how many checks failed.
    fn wait_tx_ready(&self, byte: u8) -> Result<u64, TransportError> {
        if self.sink.tx_ready() {
            return Ok(0);
        }

        let started = Instant::now();
        let mut backoff = Backoff::new();
        let mut spins: u64 = 0;

        loop {
            spins += 1;
            let expired = match self.wait {
                TransmitWait::Unbounded => false,
                TransmitWait::Spins(limit) => spins >= u64::from(limit),
                TransmitWait::Timeout(limit) => started.elapsed() >= limit,
            };
            if expired {
                let waited = started.elapsed();
                self.metrics.add_tx_wait_spins(spins);
                self.metrics.add_write_timeout();
                insights::record_write_timeout(byte, waited);
                return Err(TransportError::WriteTimeout { waited });
            }

            backoff.snooze();

            if self.sink.tx_ready() {
                self.metrics.add_tx_wait_spins(spins);
                return Ok(spins);
            }
        }
    }

    // ---------------------------------------------------------------------
    // ACCESSORS
    // ---------------------------------------------------------------------

    /// The device this transport writes to.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn transmit_wait(&self) -> TransmitWait {
        self.wait
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedUart;
    use crate::{ByteRing, RingBufferConfig};
    use std::time::Duration;

    #[test]
    fn test_read_empty_is_no_data() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (_, consumer) = ring.split();
        let mut tx = Transport::new(consumer, &uart);
        assert_eq!(tx.read_byte(), Err(NoData));
        assert_eq!(tx.available(), 0);
    }

    #[test]
    fn test_read_byte_drains_in_order() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (mut producer, consumer) = ring.split();
        producer.put(b'a').unwrap();
        producer.put(b'b').unwrap();

        let mut tx = Transport::new(consumer, &uart);
        assert_eq!(tx.available(), 2);
        assert_eq!(tx.read_byte(), Ok(b'a'));
        assert_eq!(tx.read_byte(), Ok(b'b'));
        assert_eq!(tx.read_byte(), Err(NoData));
        assert_eq!(tx.metrics().snapshot().bytes_read, 2);
    }

    #[test]
    fn test_write_byte_clears_ready() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (_, consumer) = ring.split();
        let mut tx = Transport::new(consumer, &uart);

        uart.raise_tx_ready();
        tx.write_byte(b'Z').unwrap();

        assert_eq!(uart.last_written(), b'Z');
        assert!(!uart.tx_ready());
        assert_eq!(tx.metrics().snapshot().bytes_written, 1);
    }

    #[test]
    fn test_write_byte_spin_limit() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (_, consumer) = ring.split();
        let mut tx = Transport::with_config(
            consumer,
            &uart,
            TransmitWait::Spins(3),
            Arc::new(Metrics::new()),
        );

        let err = tx.write_byte(b'!').unwrap_err();
        assert!(matches!(err, TransportError::WriteTimeout { .. }));
        assert!(uart.transmitted().is_empty());

        let m = tx.metrics().snapshot();
        assert_eq!(m.write_timeouts, 1);
        assert_eq!(m.tx_wait_spins, 3);
        assert_eq!(m.bytes_written, 0);
    }

    #[test]
    fn test_write_byte_timeout() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (_, consumer) = ring.split();
        let mut tx = Transport::with_config(
            consumer,
            &uart,
            TransmitWait::Timeout(Duration::from_millis(2)),
            Arc::new(Metrics::new()),
        );

        match tx.write_byte(b'!') {
            Err(TransportError::WriteTimeout { waited }) => {
                assert!(waited >= Duration::from_millis(2));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(uart.last_written(), 0);
    }

    #[test]
    fn test_write_all_reports_partial_progress() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::new();
        let (_, consumer) = ring.split();
        let mut tx = Transport::with_config(
            consumer,
            &uart,
            TransmitWait::Spins(4),
            Arc::new(Metrics::new()),
        );

        // ready for exactly one byte, then the transmitter stays busy
        uart.raise_tx_ready();
        let err = tx.write_all(b"hey").unwrap_err();
        assert_eq!(err.written(), 1);
        assert_eq!(uart.transmitted(), b"h".to_vec());
    }

    #[test]
    fn test_write_all_with_ready_transmitter() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::always_ready();
        let (_, consumer) = ring.split();
        let mut tx = Transport::new(consumer, &uart);

        tx.write_all(b"hello").unwrap();
        assert_eq!(uart.transmitted(), b"hello".to_vec());
    }

    #[test]
    fn test_accessors_expose_config_and_device() {
        let mut ring = ByteRing::new(RingBufferConfig::owned(4)).unwrap();
        let uart = SimulatedUart::always_ready();
        let (_, consumer) = ring.split();
        let wait = TransmitWait::Timeout(Duration::from_millis(1));
        let mut tx = Transport::with_config(consumer, &uart, wait, Arc::new(Metrics::new()));

        tx.write_byte(b'k').unwrap();
        assert_eq!(tx.transmit_wait(), wait);
        assert_eq!(tx.sink().last_written(), b'k');
    }
}
