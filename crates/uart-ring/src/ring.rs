use crate::invariants::{
    debug_assert_bounded_count, debug_assert_index_in_range, debug_assert_sole_writer,
};
use crate::{Empty, Full, InitError, RingBufferConfig, Storage};
use crossbeam_utils::CachePadded;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

#[cfg(loom)]
use loom::sync::atomic::{AtomicUsize, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Two free-running `usize` counters, never wrapped into the storage range:
//
// - `head`: number of bytes ever stored. Written only by the producer.
// - `tail`: number of bytes ever taken. Written only by the consumer.
//
// Occupancy is `head.wrapping_sub(tail)`, which stays correct across integer
// overflow of either counter as long as it never exceeds `capacity`. The slot
// for a counter is `counter & (capacity - 1)`, hence the power-of-two rule.
// `head == tail` is empty and `head - tail == capacity` is full, so no flag or
// separate count is needed to tell them apart.
//
// **Producer (put):**
// 1. Load `head` with Relaxed (only the producer writes it)
// 2. Load `tail` with Acquire (the consumer is done reading the freed slot)
// 3. Write the byte into slot `head & mask`
// 4. Store `head + 1` with Release (publishes the byte)
//
// **Consumer (get):**
// 1. Load `tail` with Relaxed (only the consumer writes it)
// 2. Load `head` with Acquire (the producer's byte write is visible)
// 3. Read slot `tail & mask`
// 4. Store `tail + 1` with Release (hands the slot back to the producer)
//
// The interrupt context is the producer and the foreground loop is the
// consumer. Counters are single-word atomics, so neither side can observe a
// torn value. Exclusivity of each counter is enforced by the type system: the
// raw `put_at` / `get_at` paths are only reachable through `&mut ByteRing` or
// through the unique `Producer` / `Consumer` handles returned by `split`.
//
// =============================================================================

/// Fixed-capacity SPSC byte ring.
///
/// Built once from a [`RingBufferConfig`] and then either used directly from a
/// single context (`put` / `get` on `&mut self`) or split into one
/// [`Producer`] for the interrupt path and one [`Consumer`] for the foreground.
pub struct ByteRing<'a> {
    /// Bytes ever stored (written by producer, read by consumer)
    head: CachePadded<AtomicUsize>,
    /// Bytes ever taken (written by consumer, read by producer)
    tail: CachePadded<AtomicUsize>,
    capacity: usize,
    /// Start of the adopted storage, `capacity` bytes long.
    buffer: NonNull<u8>,
    /// Whether `buffer` came from a leaked `Box<[u8]>` that drop must free.
    owned: bool,
    _storage: PhantomData<&'a mut [u8]>,
}

// SAFETY: the ring exclusively owns or exclusively borrows its storage, so
// moving it to another thread moves that exclusive access along with it.
unsafe impl Send for ByteRing<'_> {}

// SAFETY: the only operations reachable through `&ByteRing` are atomic loads.
// Slot writes happen through `Producer` (unique, `&mut self`) and slot reads
// through `Consumer` (unique, `&mut self` for anything that moves `tail`), and
// the Acquire/Release protocol above orders every slot access against the
// counter that hands the slot over.
unsafe impl Sync for ByteRing<'_> {}

impl<'a> ByteRing<'a> {
    /// Creates a ring from `config`, adopting its storage.
    ///
    /// Validation order: missing storage, then capacity, then storage length.
    pub fn new(config: RingBufferConfig<'a>) -> Result<Self, InitError> {
        let RingBufferConfig { capacity, storage } = config;

        let storage = storage.ok_or(InitError::NullStorage)?;

        if !capacity.is_power_of_two() {
            return Err(InitError::InvalidCapacity { capacity });
        }

        if storage.len() != capacity {
            return Err(InitError::StorageLength {
                capacity,
                len: storage.len(),
            });
        }

        let (buffer, owned) = match storage {
            Storage::Owned(boxed) => (NonNull::from(Box::leak(boxed)).cast::<u8>(), true),
            Storage::Borrowed(slice) => (NonNull::from(slice).cast::<u8>(), false),
        };

        Ok(Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            capacity,
            buffer,
            owned,
            _storage: PhantomData,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of byte slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn mask(&self) -> usize {
        self.capacity - 1
    }

    /// Returns the number of bytes currently stored.
    ///
    /// Exact when called from either endpoint; a snapshot when observed from
    /// a third context.
    #[inline]
    pub fn len(&self) -> usize {
        // tail first: head can only move forward afterwards, never below it
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail).min(self.capacity)
    }

    /// Returns the number of free slots.
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.len()
    }

    /// Returns true if `head == tail`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Returns true if `head - tail == capacity`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    // ---------------------------------------------------------------------
    // SINGLE-CONTEXT API
    // ---------------------------------------------------------------------

    /// Stores `byte`, or returns [`Full`] and drops it.
    #[inline]
    pub fn put(&mut self, byte: u8) -> Result<(), Full> {
        // SAFETY: `&mut self` rules out any live Producer or Consumer.
        unsafe { self.put_at(byte) }
    }

    /// Takes the oldest byte, or returns [`Empty`].
    #[inline]
    pub fn get(&mut self) -> Result<u8, Empty> {
        // SAFETY: `&mut self` rules out any live Producer or Consumer.
        unsafe { self.get_at() }
    }

    /// Splits the ring into its producer and consumer endpoints.
    ///
    /// The ring cannot be touched mutably again until both handles are gone,
    /// so exactly one context advances each counter.
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        let ring: &ByteRing<'_> = self;
        (Producer { ring }, Consumer { ring })
    }

    // ---------------------------------------------------------------------
    // RAW PROTOCOL
    // ---------------------------------------------------------------------

    /// Producer half of the protocol.
    ///
    /// # Safety
    ///
    /// The caller must be the only context that ever calls `put_at` on this
    /// ring while it is shared.
    unsafe fn put_at(&self, byte: u8) -> Result<(), Full> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        let count = head.wrapping_sub(tail);
        debug_assert_bounded_count!(count, self.capacity);
        if count == self.capacity {
            return Err(Full);
        }

        let idx = head & self.mask();
        debug_assert_index_in_range!(idx, self.capacity);

        // SAFETY: idx < capacity, so the pointer is inside storage. The slot is
        // free: the consumer released it with a Release store on `tail` that
        // the Acquire load above observed, and it won't read it again until
        // `head` moves past it.
        unsafe { self.buffer.as_ptr().add(idx).write(byte) };

        debug_assert_sole_writer!("head", self.head, head);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Consumer half of the protocol.
    ///
    /// # Safety
    ///
    /// The caller must be the only context that ever moves `tail` on this
    /// ring while it is shared.
    unsafe fn get_at(&self) -> Result<u8, Empty> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if head == tail {
            return Err(Empty);
        }
        debug_assert_bounded_count!(head.wrapping_sub(tail), self.capacity);

        let idx = tail & self.mask();
        debug_assert_index_in_range!(idx, self.capacity);

        // SAFETY: idx < capacity. The producer wrote this slot before its
        // Release store on `head`, which the Acquire load above observed, and
        // it won't write the slot again until `tail` moves past it.
        let byte = unsafe { self.buffer.as_ptr().add(idx).read() };

        debug_assert_sole_writer!("tail", self.tail, tail);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(byte)
    }

    /// Reads the oldest byte without releasing its slot.
    fn peek_at(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let idx = tail & self.mask();
        // SAFETY: same as `get_at`; the slot stays owned by the consumer
        // because `tail` is not advanced.
        Some(unsafe { self.buffer.as_ptr().add(idx).read() })
    }

    /// Copies up to `out.len()` bytes out with a single `tail` update.
    ///
    /// # Safety
    ///
    /// Same contract as [`get_at`](Self::get_at).
    unsafe fn drain_at(&self, out: &mut [u8]) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        let avail = head.wrapping_sub(tail);
        debug_assert_bounded_count!(avail, self.capacity);
        let n = avail.min(out.len());
        if n == 0 {
            return 0;
        }

        let mask = self.mask();
        for (i, slot) in out[..n].iter_mut().enumerate() {
            let idx = tail.wrapping_add(i) & mask;
            debug_assert_index_in_range!(idx, self.capacity);
            // SAFETY: every counter in [tail, head) names a slot published by
            // the producer and not yet released.
            *slot = unsafe { self.buffer.as_ptr().add(idx).read() };
        }

        debug_assert_sole_writer!("tail", self.tail, tail);
        self.tail.store(tail.wrapping_add(n), Ordering::Release);
        n
    }
}

impl Drop for ByteRing<'_> {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: `buffer` came from `Box::leak` of a `capacity`-byte boxed
            // slice in `new` and has not been freed.
            unsafe {
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                    self.buffer.as_ptr(),
                    self.capacity,
                )));
            }
        }
    }
}

impl std::fmt::Debug for ByteRing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("owned", &self.owned)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------
// ENDPOINTS
// ---------------------------------------------------------------------

/// The writing endpoint of a split [`ByteRing`]. Owned by the interrupt path.
#[derive(Debug)]
pub struct Producer<'a> {
    ring: &'a ByteRing<'a>,
}

impl Producer<'_> {
    /// Stores `byte`, or returns [`Full`] and drops it.
    #[inline]
    pub fn put(&mut self, byte: u8) -> Result<(), Full> {
        // SAFETY: Producer is unique per split and `put` takes `&mut self`.
        unsafe { self.ring.put_at(byte) }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// The reading endpoint of a split [`ByteRing`]. Owned by the foreground.
#[derive(Debug)]
pub struct Consumer<'a> {
    ring: &'a ByteRing<'a>,
}

impl Consumer<'_> {
    /// Takes the oldest byte, or returns [`Empty`].
    #[inline]
    pub fn get(&mut self) -> Result<u8, Empty> {
        // SAFETY: Consumer is unique per split and `get` takes `&mut self`.
        unsafe { self.ring.get_at() }
    }

    /// Returns the oldest byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.ring.peek_at()
    }

    /// Moves as many stored bytes as fit into `out`, oldest first.
    ///
    /// Releases all copied slots with one counter update.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        // SAFETY: Consumer is unique per split and this takes `&mut self`.
        unsafe { self.ring.drain_at(out) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> ByteRing<'static> {
        ByteRing::new(RingBufferConfig::owned(capacity)).unwrap()
    }

    /// Ring whose counters both start at `start`, to cross the integer wrap quickly.
    fn ring_at(capacity: usize, start: usize) -> ByteRing<'static> {
        let mut r = ring(capacity);
        r.head = CachePadded::new(AtomicUsize::new(start));
        r.tail = CachePadded::new(AtomicUsize::new(start));
        r
    }

    #[test]
    fn test_new_rejects_bad_capacity() {
        for capacity in [0usize, 3, 5, 6] {
            let err = ByteRing::new(RingBufferConfig::owned(capacity)).unwrap_err();
            assert_eq!(err, InitError::InvalidCapacity { capacity });
        }
    }

    #[test]
    fn test_new_rejects_missing_storage() {
        let err = ByteRing::new(RingBufferConfig::new(8, None)).unwrap_err();
        assert_eq!(err, InitError::NullStorage);
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let mut buf = [0u8; 4];
        let config = RingBufferConfig::new(8, Some(Storage::Borrowed(&mut buf)));
        let err = ByteRing::new(config).unwrap_err();
        assert_eq!(err, InitError::StorageLength { capacity: 8, len: 4 });
    }

    #[test]
    fn test_fresh_ring_is_empty() {
        let r = ring(8);
        assert!(r.is_empty());
        assert!(!r.is_full());
        assert_eq!(r.len(), 0);
        assert_eq!(r.free(), 8);
    }

    #[test]
    fn test_capacity_one() {
        let mut r = ring(1);
        r.put(7).unwrap();
        assert!(r.is_full());
        assert_eq!(r.put(8), Err(Full));
        assert_eq!(r.get(), Ok(7));
        assert_eq!(r.get(), Err(Empty));
    }

    #[test]
    fn test_full_leaves_contents_unchanged() {
        let mut r = ring(4);
        for b in [10u8, 20, 30, 40] {
            r.put(b).unwrap();
        }
        assert!(r.is_full());
        assert_eq!(r.put(50), Err(Full));
        assert_eq!(r.len(), 4);

        for b in [10u8, 20, 30, 40] {
            assert_eq!(r.get(), Ok(b));
        }
        assert_eq!(r.get(), Err(Empty));
    }

    #[test]
    fn test_counter_integer_wrap() {
        let start = usize::MAX - 2;
        let mut r = ring_at(4, start);

        // head crosses usize::MAX -> 0 while the ring holds data
        for b in 0u8..4 {
            r.put(b).unwrap();
        }
        assert!(r.is_full());
        assert!(r.head.load(Ordering::Relaxed) < start);

        for b in 0u8..4 {
            assert_eq!(r.get(), Ok(b));
        }
        assert!(r.is_empty());

        // and keeps going after both counters wrapped
        for round in 0u8..10 {
            r.put(round).unwrap();
            assert_eq!(r.get(), Ok(round));
        }
    }

    #[test]
    fn test_split_endpoints() {
        let mut r = ring(8);
        {
            let (mut producer, mut consumer) = r.split();
            producer.put(b'x').unwrap();
            producer.put(b'y').unwrap();
            assert_eq!(consumer.peek(), Some(b'x'));
            assert_eq!(consumer.len(), 2);
            assert_eq!(consumer.get(), Ok(b'x'));
            assert_eq!(producer.free(), 7);
        }
        // ring is usable again once the endpoints are gone
        assert_eq!(r.get(), Ok(b'y'));
    }

    #[test]
    fn test_drain_into_across_wrap() {
        let mut r = ring(4);
        r.put(1).unwrap();
        r.put(2).unwrap();
        r.put(3).unwrap();
        assert_eq!(r.get(), Ok(1));
        assert_eq!(r.get(), Ok(2));
        r.put(4).unwrap();
        r.put(5).unwrap();
        r.put(6).unwrap();

        let (_, mut consumer) = r.split();
        let mut out = [0u8; 8];
        let n = consumer.drain_into(&mut out);
        assert_eq!(&out[..n], &[3, 4, 5, 6]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_drain_into_short_buffer() {
        let mut r = ring(8);
        for b in 0u8..5 {
            r.put(b).unwrap();
        }
        let (_, mut consumer) = r.split();
        let mut out = [0u8; 2];
        assert_eq!(consumer.drain_into(&mut out), 2);
        assert_eq!(out, [0, 1]);
        assert_eq!(consumer.len(), 3);
    }

    #[test]
    fn test_borrowed_storage_is_returned() {
        let mut buf = [0u8; 4];
        {
            let mut r = ByteRing::new(RingBufferConfig::borrowed(&mut buf)).unwrap();
            r.put(0xAB).unwrap();
        }
        assert_eq!(buf[0], 0xAB);
    }

    // Plain std threads: holds for every feature combination, loom swaps in
    // only under `--cfg loom`.
    #[test]
    fn test_split_handles_on_std_threads() {
        let mut r = ring(4);
        let (mut producer, mut consumer) = r.split();

        let received = std::thread::scope(|s| {
            s.spawn(move || {
                for b in 0u8..64 {
                    while producer.put(b).is_err() {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut received = Vec::with_capacity(64);
            while received.len() < 64 {
                match consumer.get() {
                    Ok(b) => received.push(b),
                    Err(Empty) => std::thread::yield_now(),
                }
            }
            received
        });

        assert_eq!(received, (0u8..64).collect::<Vec<_>>());
    }
}
