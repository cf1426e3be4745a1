//! UART ring demo.
//!
//! Plays back the classic bring-up sequence on a simulated device: four bytes
//! arrive by interrupt ('B' through 'E'), then the foreground reads each one
//! and echoes it back incremented by one. A second pass overruns a small ring
//! and shows a bounded transmit wait expiring.
//!
//! Run with: `cargo run -p uart-ring --features tracing --bin uart-demo`

use std::time::Duration;
use tracing::{info, warn, Level};
use uart_ring::sim::SimulatedUart;
use uart_ring::{insights, uart, ByteRing, NoData, UartConfig};

const DEMO_BYTES: usize = 4;

fn main() {
    insights::init_logging(Level::DEBUG);

    if let Err(err) = run() {
        warn!(%err, "demo aborted");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    echo_demo()?;
    overrun_demo()?;
    Ok(())
}

fn echo_demo() -> Result<(), Box<dyn std::error::Error>> {
    info!("=== echo ===");

    let config = UartConfig::default();
    let mut ring = ByteRing::new(config.ring_config())?;
    let device = SimulatedUart::new();
    let (mut rx, mut tx) = uart::split(&mut ring, &device, &device, &config);

    // interrupt context: the receive register counts up from 'A'
    let mut latch = b'A';
    for _ in 0..DEMO_BYTES {
        latch += 1;
        device.inject(latch);
        rx.on_receive_interrupt();
    }

    // foreground context
    for _ in 0..DEMO_BYTES {
        let value = match tx.read_byte() {
            Ok(value) => value,
            Err(NoData) => {
                info!("nothing received");
                continue;
            }
        };
        info!(value = %char::from(value), "read from UART");

        let echo = value.wrapping_add(1);
        device.raise_tx_ready();
        tx.write_byte(echo)?;
        info!(value = %char::from(echo), "wrote to UART");
    }

    info!(metrics = ?tx.metrics().snapshot(), "echo done");
    Ok(())
}

fn overrun_demo() -> Result<(), Box<dyn std::error::Error>> {
    info!("=== overrun and transmit timeout ===");

    let config = UartConfig::bounded(Duration::from_millis(1)).with_capacity(4);
    let mut ring = ByteRing::new(config.ring_config())?;
    let device = SimulatedUart::new();
    let (mut rx, mut tx) = uart::split(&mut ring, &device, &device, &config);

    for byte in b"overrun!".iter().copied() {
        device.inject(byte);
        rx.on_receive_interrupt();
    }

    let mut buf = [0u8; 16];
    let n = tx.read_into(&mut buf);
    info!(kept = %String::from_utf8_lossy(&buf[..n]), "drained ring");

    // nobody raises transmit-ready this time
    if let Err(err) = tx.write_byte(b'?') {
        info!(%err, "write gave up as configured");
    }

    info!(metrics = ?tx.metrics().snapshot(), "overrun done");
    Ok(())
}
