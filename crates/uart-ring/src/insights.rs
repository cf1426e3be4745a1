//! Insights - observability hooks for the UART paths.
//!
//! Events are emitted with `tracing` when the `tracing` feature is enabled and
//! compile to nothing otherwise. The ring itself never logs.
//!
//! ```toml
//! uart-ring = { version = "0.1", features = ["tracing"] }
//! ```
//! ```rust,ignore
//! uart_ring::insights::init_logging(tracing::Level::DEBUG);
//! ```

use std::time::Duration;

/// Install a console subscriber (call once at startup). Later calls are ignored.
#[cfg(feature = "tracing")]
pub fn init_logging(max_level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .try_init();
}

/// Byte stored by the interrupt path.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_receive(byte: u8) {
    tracing::trace!(byte, "rx byte queued");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_receive(_byte: u8) {}

/// Byte discarded because the ring was full.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_overrun(byte: u8, capacity: usize) {
    tracing::warn!(byte, capacity, "rx ring full, byte dropped");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_overrun(_byte: u8, _capacity: usize) {}

/// Interrupt fired with no receive pending.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_spurious() {
    tracing::trace!("rx interrupt without pending byte");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_spurious() {}

/// Byte handed to the transmitter after `spins` failed ready checks.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_write(byte: u8, spins: u64) {
    tracing::trace!(byte, spins, "tx byte written");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_write(_byte: u8, _spins: u64) {}

/// Write abandoned after waiting `waited` for transmit-ready.
#[cfg(feature = "tracing")]
#[inline]
pub fn record_write_timeout(byte: u8, waited: Duration) {
    tracing::warn!(byte, ?waited, "tx not ready, write abandoned");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_write_timeout(_byte: u8, _waited: Duration) {}
