//! Wiring one ring, one device and one config into the two UART paths.

use crate::port::{ByteSink, ByteSource};
use crate::{ByteRing, Metrics, ReceivePath, Transport, UartConfig};
use std::sync::Arc;

/// Splits `ring` into an interrupt [`ReceivePath`] and a foreground
/// [`Transport`] that share one [`Metrics`] instance.
///
/// `source` and `sink` are usually the same device passed by reference.
///
/// ```
/// use uart_ring::sim::SimulatedUart;
/// use uart_ring::{uart, ByteRing, UartConfig};
///
/// let config = UartConfig::default();
/// let mut ring = ByteRing::new(config.ring_config()).unwrap();
/// let device = SimulatedUart::always_ready();
/// let (mut rx, mut tx) = uart::split(&mut ring, &device, &device, &config);
///
/// device.inject(b'A');
/// rx.on_receive_interrupt();
///
/// let byte = tx.read_byte().unwrap();
/// tx.write_byte(byte + 1).unwrap();
/// assert_eq!(device.last_written(), b'B');
/// ```
pub fn split<'a, S, K>(
    ring: &'a mut ByteRing<'_>,
    source: S,
    sink: K,
    config: &UartConfig,
) -> (ReceivePath<'a, S>, Transport<'a, K>)
where
    S: ByteSource,
    K: ByteSink,
{
    let metrics = Arc::new(Metrics::new());
    let (producer, consumer) = ring.split();
    (
        ReceivePath::with_metrics(producer, source, Arc::clone(&metrics)),
        Transport::with_config(consumer, sink, config.transmit_wait, metrics),
    )
}
