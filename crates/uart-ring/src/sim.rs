//! In-memory UART device for tests, benches and the demo.
//!
//! Registers are atomics so one thread can play the hardware (and the
//! interrupt it raises) while another runs the foreground loop.

use crate::port::{ByteSink, ByteSource};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

/// A simulated UART with one receive and one transmit data register.
#[derive(Debug, Default)]
pub struct SimulatedUart {
    rx_pending: AtomicBool,
    rx_data: AtomicU8,
    tx_ready: AtomicBool,
    tx_data: AtomicU8,
    /// Re-raise `tx_ready` as soon as the driver clears it.
    tx_auto_ready: AtomicBool,
    tx_log: Mutex<Vec<u8>>,
}

impl SimulatedUart {
    /// Creates a device with both flags lowered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a device whose transmitter is always ready.
    pub fn always_ready() -> Self {
        let uart = Self::new();
        uart.set_tx_auto_ready(true);
        uart.raise_tx_ready();
        uart
    }

    // ---------------------------------------------------------------------
    // HARDWARE SIDE
    // ---------------------------------------------------------------------

    /// Latches `byte` into the receive register and raises the pending flag.
    ///
    /// Returns `true` if an unserviced byte was overwritten (a hardware overrun).
    pub fn inject(&self, byte: u8) -> bool {
        self.rx_data.store(byte, Ordering::Relaxed);
        self.rx_pending.swap(true, Ordering::AcqRel)
    }

    /// Signals that the transmitter can take another byte.
    pub fn raise_tx_ready(&self) {
        self.tx_ready.store(true, Ordering::Release);
    }

    /// When enabled, the transmitter becomes ready again immediately after
    /// every write.
    pub fn set_tx_auto_ready(&self, enabled: bool) {
        self.tx_auto_ready.store(enabled, Ordering::Relaxed);
    }

    /// The byte currently in the transmit register.
    pub fn last_written(&self) -> u8 {
        self.tx_data.load(Ordering::Acquire)
    }

    /// Every byte written to the transmit register, oldest first.
    pub fn transmitted(&self) -> Vec<u8> {
        self.tx_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ByteSource for SimulatedUart {
    fn rx_pending(&self) -> bool {
        self.rx_pending.load(Ordering::Acquire)
    }

    fn clear_rx_pending(&self) {
        self.rx_pending.store(false, Ordering::Release);
    }

    fn read_latest_byte(&self) -> u8 {
        self.rx_data.load(Ordering::Relaxed)
    }
}

impl ByteSink for SimulatedUart {
    fn tx_ready(&self) -> bool {
        self.tx_ready.load(Ordering::Acquire)
    }

    fn clear_tx_ready(&self) {
        let auto = self.tx_auto_ready.load(Ordering::Relaxed);
        self.tx_ready.store(auto, Ordering::Release);
    }

    fn write_byte(&self, byte: u8) {
        self.tx_data.store(byte, Ordering::Release);
        self.tx_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(byte);
    }
}
