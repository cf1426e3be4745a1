//! uart-ring - Interrupt-fed UART Byte Ring
//!
//! Decouples a UART receive interrupt (one byte per event) from a foreground
//! loop that polls for bytes at its own pace. The synchronization point is a
//! lock-free single-producer single-consumer byte ring:
//!
//! - Two free-running counters, `head` and `tail`; occupancy is
//!   `head.wrapping_sub(tail)`, so full and empty never look alike
//! - Power-of-two capacity, slot index is `counter & (capacity - 1)`
//! - Publish-after-write / read-before-release with Acquire/Release atomics
//! - SPSC enforced by the type system via [`ByteRing::split`]
//!
//! Device registers are reached only through the [`ByteSource`] and
//! [`ByteSink`] capability traits, so everything runs on the host against
//! [`sim::SimulatedUart`].
//!
//! # Example
//!
//! ```
//! use uart_ring::sim::SimulatedUart;
//! use uart_ring::{ByteRing, NoData, ReceivePath, RingBufferConfig, Transport};
//!
//! let mut ring = ByteRing::new(RingBufferConfig::owned(8)).unwrap();
//! let device = SimulatedUart::always_ready();
//! let (producer, consumer) = ring.split();
//!
//! let mut rx = ReceivePath::new(producer, &device);
//! let mut tx = Transport::new(consumer, &device);
//!
//! // interrupt context
//! device.inject(b'A');
//! rx.on_receive_interrupt();
//!
//! // foreground context
//! assert_eq!(tx.read_byte(), Ok(b'A'));
//! assert_eq!(tx.read_byte(), Err(NoData));
//! tx.write_byte(b'B').unwrap();
//! ```
//!
//! # Policies
//!
//! - Receive overrun drops the newest byte and counts it in [`Metrics`].
//! - Transmit waits for the ready signal per [`TransmitWait`]; the default
//!   spins without bound.

mod backoff;
mod config;
mod error;
pub mod insights;
mod invariants;
mod metrics;
pub mod port;
mod receive;
mod ring;
pub mod sim;
mod transport;
pub mod uart;

pub use config::{
    RingBufferConfig, Storage, TransmitWait, UartConfig, BURST_CONFIG, DEFAULT_CAPACITY,
};
pub use error::{Empty, Full, InitError, NoData, TransportError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use port::{ByteSink, ByteSource};
pub use receive::ReceivePath;
pub use ring::{ByteRing, Consumer, Producer};
pub use transport::Transport;
