//! Single-producer/single-consumer ring of 16-bit samples.
//!
//! The generator thread owns the [`SampleProducer`] and the device callback
//! owns the [`SampleConsumer`]. Neither half is `Clone`, and both transfer
//! through `&mut self`, so there is exactly one writer and one reader.
//!
//! Cursors run over `[0, 2 * capacity)` so that "empty" (`read == write`) and
//! "full" (`write - read == capacity`) are distinct. Only the cursors are
//! atomic; sample copies are plain memory operations on disjoint regions.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ring capacity in blocks. With two blocks the generator can always get a
/// full block ahead of the callback.
pub const RING_BLOCKS: usize = 2;

struct Shared {
    slots: Box<[UnsafeCell<i16>]>,
    read: AtomicUsize,
    write: AtomicUsize,
}

// Safety: the producer only touches slots in the free region and the consumer
// only touches slots in the filled region. A region changes hands only
// through a Release store of a cursor paired with an Acquire load on the
// other side.
unsafe impl Sync for Shared {}

impl Shared {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Samples buffered between two cursor values.
    fn distance(&self, read: usize, write: usize) -> usize {
        let wrap = 2 * self.capacity();
        (write + wrap - read) % wrap
    }

    fn advance(&self, cursor: usize, count: usize) -> usize {
        (cursor + count) % (2 * self.capacity())
    }

    fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        self.distance(read, write)
    }

    fn slot_ptr(&self, index: usize) -> *mut i16 {
        debug_assert!(index <= self.capacity());
        // Derive from the whole slice so the pointer covers a span, not one cell.
        UnsafeCell::raw_get(self.slots.as_ptr().wrapping_add(index))
    }

    /// Safety: `[start, start + src.len())` must lie in the free region and
    /// within the backing store.
    unsafe fn copy_in(&self, start: usize, src: &[i16]) {
        ptr::copy_nonoverlapping(src.as_ptr(), self.slot_ptr(start), src.len());
    }

    /// Safety: `[start, start + dest.len())` must lie in the filled region and
    /// within the backing store.
    unsafe fn copy_out(&self, start: usize, dest: &mut [i16]) {
        ptr::copy_nonoverlapping(self.slot_ptr(start), dest.as_mut_ptr(), dest.len());
    }
}

/// Fixed-capacity sample ring. Call [`RingBuffer::split`] to get the two
/// halves.
pub struct RingBuffer {
    shared: Arc<Shared>,
}

impl RingBuffer {
    /// Create an empty ring holding `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        let slots = (0..capacity).map(|_| UnsafeCell::new(0)).collect();
        Self {
            shared: Arc::new(Shared {
                slots,
                read: AtomicUsize::new(0),
                write: AtomicUsize::new(0),
            }),
        }
    }

    /// Create a ring sized for `block_size`-sample transfers: `RING_BLOCKS`
    /// blocks of headroom.
    pub fn with_block_size(block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be non-zero");
        let ring = Self::new(block_size * RING_BLOCKS);
        assert!(ring.capacity() >= 2 * block_size);
        ring
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Split into the write half and the read half.
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        let producer = SampleProducer {
            shared: Arc::clone(&self.shared),
        };
        let consumer = SampleConsumer {
            shared: self.shared,
        };
        (producer, consumer)
    }
}

/// Write half. Owned by the generator thread.
pub struct SampleProducer {
    shared: Arc<Shared>,
}

impl SampleProducer {
    /// Copy as much of `src` as fits, wrapping at the end of the store.
    ///
    /// Returns the shortfall: samples of `src` that were not written. The
    /// first write into a fresh ring starts at offset 0.
    pub fn write(&mut self, src: &[i16]) -> usize {
        let shared = &*self.shared;
        let capacity = shared.capacity();
        let write = shared.write.load(Ordering::Relaxed);
        let read = shared.read.load(Ordering::Acquire);

        let free = capacity - shared.distance(read, write);
        let count = src.len().min(free);
        let start = write % capacity;
        let first = count.min(capacity - start);

        // Safety: `count <= free`, so both spans lie in the free region.
        unsafe {
            shared.copy_in(start, &src[..first]);
            shared.copy_in(0, &src[first..count]);
        }

        shared
            .write
            .store(shared.advance(write, count), Ordering::Release);
        src.len() - count
    }

    /// `true` unless the ring is completely full.
    pub fn has_space(&self) -> bool {
        self.shared.len() < self.shared.capacity()
    }

    /// Samples that can be written right now.
    pub fn free(&self) -> usize {
        self.shared.capacity() - self.shared.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Next write position, in `[0, capacity)`.
    pub fn write_cursor(&self) -> usize {
        self.shared.write.load(Ordering::Relaxed) % self.shared.capacity()
    }
}

/// Read half. Owned by the device callback.
pub struct SampleConsumer {
    shared: Arc<Shared>,
}

impl SampleConsumer {
    /// Copy up to `dest.len()` buffered samples into `dest`.
    ///
    /// Never blocks. Returns the shortfall; the tail of `dest` past the
    /// copied samples is left untouched.
    pub fn read(&mut self, dest: &mut [i16]) -> usize {
        let shared = &*self.shared;
        let capacity = shared.capacity();
        let read = shared.read.load(Ordering::Relaxed);
        let write = shared.write.load(Ordering::Acquire);

        let count = dest.len().min(shared.distance(read, write));
        let start = read % capacity;
        let first = count.min(capacity - start);

        let (head, tail) = dest[..count].split_at_mut(first);
        // Safety: `count` never exceeds the filled region.
        unsafe {
            shared.copy_out(start, head);
            shared.copy_out(0, tail);
        }

        shared
            .read
            .store(shared.advance(read, count), Ordering::Release);
        dest.len() - count
    }

    /// Samples buffered and ready to read.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Next read position, in `[0, capacity)`.
    pub fn read_cursor(&self) -> usize {
        self.shared.read.load(Ordering::Relaxed) % self.shared.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: i16, len: usize) -> Vec<i16> {
        (0..len).map(|i| start.wrapping_add(i as i16)).collect()
    }

    #[test]
    fn write_then_read_returns_same_block() {
        let (mut prod, mut cons) = RingBuffer::with_block_size(1024).split();
        assert_eq!(prod.capacity(), 2048);

        let scratch = ramp(-500, 1024);
        assert_eq!(prod.write(&scratch), 0);

        let mut dest = vec![0i16; 1024];
        assert_eq!(cons.read(&mut dest), 0);
        assert_eq!(dest, scratch);
        assert!(prod.has_space());
        assert!(cons.is_empty());
    }

    #[test]
    fn write_reports_shortfall_when_space_runs_out() {
        let (mut prod, mut cons) = RingBuffer::with_block_size(1024).split();
        assert_eq!(prod.write(&ramp(0, 1024)), 0);
        assert_eq!(prod.free(), 1024);

        let big = ramp(1024, 2048);
        assert_eq!(prod.write(&big), 1024);
        assert!(!prod.has_space());

        // Consumer frees a block; the remainder now fits
        let mut dest = vec![0i16; 1024];
        assert_eq!(cons.read(&mut dest), 0);
        assert!(prod.has_space());
        assert_eq!(prod.write(&big[1024..]), 0);

        let mut rest = vec![0i16; 2048];
        assert_eq!(cons.read(&mut rest), 0);
        assert_eq!(rest, big);
    }

    #[test]
    fn first_write_is_clamped_to_capacity() {
        let (mut prod, mut cons) = RingBuffer::new(8).split();
        let src = ramp(1, 12);
        assert_eq!(prod.write(&src), 4);

        let mut dest = [0i16; 8];
        assert_eq!(cons.read(&mut dest), 0);
        assert_eq!(&dest[..], &src[..8]);
    }

    #[test]
    fn read_underrun_leaves_tail_untouched() {
        let (mut prod, mut cons) = RingBuffer::new(16).split();
        prod.write(&[7, 8, 9]);

        let mut dest = [-1i16; 8];
        assert_eq!(cons.read(&mut dest), 5);
        assert_eq!(dest, [7, 8, 9, -1, -1, -1, -1, -1]);

        // Empty ring: nothing copied, cursor unchanged
        let cursor = cons.read_cursor();
        assert_eq!(cons.read(&mut dest), 8);
        assert_eq!(cons.read_cursor(), cursor);
    }

    #[test]
    fn transfers_wrap_around_the_end() {
        let (mut prod, mut cons) = RingBuffer::new(2048).split();
        let mut dest = vec![0i16; 2048];

        assert_eq!(prod.write(&ramp(0, 1500)), 0);
        assert_eq!(cons.read(&mut dest[..1000]), 0);

        let second = ramp(1500, 1500);
        assert_eq!(prod.write(&second), 0);
        assert_eq!(prod.write_cursor(), (1500 + 1500) % 2048);

        assert_eq!(cons.read(&mut dest[..2000]), 0);
        assert_eq!(&dest[..2000], &ramp(1000, 2000)[..]);
        assert!(cons.is_empty());
    }

    #[test]
    fn cursors_stay_in_range_and_never_cross() {
        const CAP: usize = 64;
        let (mut prod, mut cons) = RingBuffer::new(CAP).split();
        let mut next_write: i16 = 0;
        let mut next_read: i16 = 0;
        let mut seed = 0x9e37_79b9u32;
        let mut buf = [0i16; CAP + 16];

        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let n = (seed >> 8) as usize % (CAP + 16);

            if seed & 1 == 0 {
                let src: Vec<i16> = (0..n as i16).map(|i| next_write.wrapping_add(i)).collect();
                let short = prod.write(&src);
                next_write = next_write.wrapping_add((n - short) as i16);
            } else {
                let short = cons.read(&mut buf[..n]);
                for &s in &buf[..n - short] {
                    assert_eq!(s, next_read);
                    next_read = next_read.wrapping_add(1);
                }
            }

            assert!(cons.len() <= CAP);
            assert!(prod.write_cursor() < CAP);
            assert!(cons.read_cursor() < CAP);
            assert_eq!(cons.len() as i16, next_write.wrapping_sub(next_read));
        }
    }

    #[test]
    fn threaded_transfer_preserves_order() {
        const TOTAL: usize = 200_000;
        let (mut prod, mut cons) = RingBuffer::with_block_size(256).split();

        let writer = std::thread::spawn(move || {
            let data: Vec<i16> = (0..TOTAL).map(|i| i as i16).collect();
            let mut offset = 0;
            while offset < TOTAL {
                let end = (offset + 256).min(TOTAL);
                let short = prod.write(&data[offset..end]);
                offset = end - short;
                if short > 0 {
                    std::thread::yield_now();
                }
            }
        });

        let mut received = 0usize;
        let mut buf = [0i16; 300];
        while received < TOTAL {
            let short = cons.read(&mut buf);
            for &s in &buf[..buf.len() - short] {
                assert_eq!(s, received as i16);
                received += 1;
            }
            if short > 0 {
                std::thread::yield_now();
            }
        }
        writer.join().unwrap();
        assert!(cons.is_empty());
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        RingBuffer::new(0);
    }
}
