//! Capability traits the UART paths consume in place of device registers.
//!
//! A real driver implements these over its memory-mapped registers; tests and
//! the demo use [`SimulatedUart`](crate::sim::SimulatedUart). Methods take
//! `&self` because device registers are shared by the interrupt and foreground
//! contexts: each flag is set by one side and cleared by the other.

use std::sync::Arc;

/// The receive side of a UART: a data register plus a receive-pending flag.
pub trait ByteSource {
    /// Returns true when a received byte is waiting to be serviced.
    fn rx_pending(&self) -> bool;

    /// Acknowledges the pending receive.
    fn clear_rx_pending(&self);

    /// Reads the most recently received byte from the data register.
    fn read_latest_byte(&self) -> u8;
}

/// The transmit side of a UART: a data register plus a transmit-ready flag.
pub trait ByteSink {
    /// Returns true when the transmitter can accept another byte.
    fn tx_ready(&self) -> bool;

    /// Marks the transmitter busy after handing it a byte.
    fn clear_tx_ready(&self);

    /// Writes one byte to the transmit data register.
    fn write_byte(&self, byte: u8);
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    #[inline]
    fn rx_pending(&self) -> bool {
        (**self).rx_pending()
    }

    #[inline]
    fn clear_rx_pending(&self) {
        (**self).clear_rx_pending();
    }

    #[inline]
    fn read_latest_byte(&self) -> u8 {
        (**self).read_latest_byte()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    #[inline]
    fn rx_pending(&self) -> bool {
        (**self).rx_pending()
    }

    #[inline]
    fn clear_rx_pending(&self) {
        (**self).clear_rx_pending();
    }

    #[inline]
    fn read_latest_byte(&self) -> u8 {
        (**self).read_latest_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &T {
    #[inline]
    fn tx_ready(&self) -> bool {
        (**self).tx_ready()
    }

    #[inline]
    fn clear_tx_ready(&self) {
        (**self).clear_tx_ready();
    }

    #[inline]
    fn write_byte(&self, byte: u8) {
        (**self).write_byte(byte);
    }
}

impl<T: ByteSink + ?Sized> ByteSink for Arc<T> {
    #[inline]
    fn tx_ready(&self) -> bool {
        (**self).tx_ready()
    }

    #[inline]
    fn clear_tx_ready(&self) {
        (**self).clear_tx_ready();
    }

    #[inline]
    fn write_byte(&self, byte: u8) {
        (**self).write_byte(byte);
    }
}
