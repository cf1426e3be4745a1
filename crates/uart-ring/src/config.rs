use std::time::Duration;

/// Receive ring capacity used when none is configured (8 slots).
pub const DEFAULT_CAPACITY: usize = 8;

/// Backing storage adopted by a [`ByteRing`](crate::ByteRing).
///
/// Either the ring owns a boxed slice, or it exclusively borrows a caller
/// buffer (e.g. a `static mut` region on a target without an allocator) for
/// its whole lifetime.
#[derive(Debug)]
pub enum Storage<'a> {
    /// Heap storage freed when the ring drops.
    Owned(Box<[u8]>),
    /// Caller storage handed back when the ring drops.
    Borrowed(&'a mut [u8]),
}

impl Storage<'_> {
    /// Number of bytes in the storage.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Storage::Owned(buf) => buf.len(),
            Storage::Borrowed(buf) => buf.len(),
        }
    }

    /// Returns `true` if the storage holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration for a [`ByteRing`](crate::ByteRing).
#[derive(Debug)]
pub struct RingBufferConfig<'a> {
    /// Number of byte slots; must be a non-zero power of two.
    pub capacity: usize,
    /// Backing storage of exactly `capacity` bytes. `None` is rejected at init.
    pub storage: Option<Storage<'a>>,
}

impl<'a> RingBufferConfig<'a> {
    /// Creates a configuration from its raw parts. Validation happens in
    /// [`ByteRing::new`](crate::ByteRing::new).
    pub const fn new(capacity: usize, storage: Option<Storage<'a>>) -> Self {
        Self { capacity, storage }
    }

    /// Uses `buffer` as the ring storage; capacity is the buffer length.
    pub fn borrowed(buffer: &'a mut [u8]) -> Self {
        Self {
            capacity: buffer.len(),
            storage: Some(Storage::Borrowed(buffer)),
        }
    }
}

impl RingBufferConfig<'static> {
    /// Allocates zeroed storage of `capacity` bytes.
    pub fn owned(capacity: usize) -> Self {
        Self {
            capacity,
            storage: Some(Storage::Owned(vec![0u8; capacity].into_boxed_slice())),
        }
    }
}

impl Default for RingBufferConfig<'static> {
    fn default() -> Self {
        Self::owned(DEFAULT_CAPACITY)
    }
}

/// How long [`Transport::write_byte`](crate::Transport::write_byte) spins
/// for the transmit-ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmitWait {
    /// Spin until the signal arrives, however long that takes.
    #[default]
    Unbounded,
    /// Give up after this many failed checks of the signal.
    Spins(u32),
    /// Give up once this much wall-clock time has elapsed.
    Timeout(Duration),
}

/// Configuration for a UART built with [`uart::split`](crate::uart::split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Receive ring capacity (power of two).
    pub capacity: usize,
    /// Transmit-ready wait policy.
    pub transmit_wait: TransmitWait,
}

impl UartConfig {
    /// Creates a configuration with custom settings.
    pub const fn new(capacity: usize, transmit_wait: TransmitWait) -> Self {
        Self {
            capacity,
            transmit_wait,
        }
    }

    /// Default capacity with a bounded transmit wait.
    pub const fn bounded(timeout: Duration) -> Self {
        Self::new(DEFAULT_CAPACITY, TransmitWait::Timeout(timeout))
    }

    /// Sets the receive ring capacity.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the transmit wait policy.
    pub const fn with_transmit_wait(mut self, transmit_wait: TransmitWait) -> Self {
        self.transmit_wait = transmit_wait;
        self
    }

    /// Owned ring configuration matching `capacity`.
    pub fn ring_config(&self) -> RingBufferConfig<'static> {
        RingBufferConfig::owned(self.capacity)
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, TransmitWait::Unbounded)
    }
}

/// Larger receive ring for bursty links (256 slots), baseline unbounded wait.
pub const BURST_CONFIG: UartConfig = UartConfig::new(256, TransmitWait::Unbounded);
