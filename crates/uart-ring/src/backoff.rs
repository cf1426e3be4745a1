use std::hint;
use std::thread;

/// Busy-wait pacing for the transmit-ready loop (Crossbeam-style).
///
/// Spins with PAUSE hints, doubling each step up to `2^SPIN_LIMIT` hints per
/// call. Past that, [`snooze`](Self::snooze) yields the timeslice between
/// checks so a hosted simulation of the device thread can make progress on a
/// single core. It never sleeps or parks.
#[derive(Debug, Default)]
pub(crate) struct Backoff {
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 hints per check at most

    #[inline]
    pub(crate) fn new() -> Self {
        Self { step: 0 }
    }

    /// Light spin with PAUSE hints.
    #[inline]
    pub(crate) fn spin(&mut self) {
        for _ in 0..1u32 << self.step.min(Self::SPIN_LIMIT) {
            hint::spin_loop();
        }
        if self.step <= Self::SPIN_LIMIT {
            self.step += 1;
        }
    }

    /// Spin while still ramping up, yield once the spin budget is spent.
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            self.spin();
        } else {
            thread::yield_now();
        }
    }
}
