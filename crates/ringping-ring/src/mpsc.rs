//! Multi-producer single-consumer bounded ring.
//!
//! Each slot carries a sequence number (Vyukov's bounded queue). Producers
//! claim a position with a CAS on the shared tail, write the value, then
//! publish it by bumping the slot sequence. The single consumer owns the head
//! and never contends with anyone.

use crate::error::{PopError, PushError, RingResult};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct Slot<T> {
    seq: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

struct Inner<T> {
    slots: Box<[Slot<T>]>,
    mask: usize,
    /// Next position to claim (producers)
    tail: CachePadded<AtomicUsize>,
    /// Next position to read (consumer only)
    head: CachePadded<AtomicUsize>,
    producers: AtomicUsize,
    consumer_alive: AtomicBool,
}

unsafe impl<T: Send> Send for Inner<T> {}
unsafe impl<T: Send> Sync for Inner<T> {}

impl<T> Inner<T> {
    fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head).min(self.capacity())
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let mut pos = *self.head.get_mut();
        loop {
            let slot = &mut self.slots[pos & self.mask];
            if *slot.seq.get_mut() != pos.wrapping_add(1) {
                break;
            }
            // SAFETY: a sequence of pos + 1 means the slot was published and not consumed.
            unsafe { slot.value.get_mut().assume_init_drop() };
            pos = pos.wrapping_add(1);
        }
    }
}

/// Sending half. Cloning it adds another producer.
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
}

/// Receiving half. There is exactly one per ring.
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
}

/// Create an MPSC ring holding up to `capacity` items.
pub fn channel<T>(capacity: usize) -> RingResult<(Producer<T>, Consumer<T>)> {
    let mask = crate::check_capacity(capacity)?;
    let slots = (0..capacity)
        .map(|i| Slot {
            seq: AtomicUsize::new(i),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        })
        .collect();
    let inner = Arc::new(Inner {
        slots,
        mask,
        tail: CachePadded::new(AtomicUsize::new(0)),
        head: CachePadded::new(AtomicUsize::new(0)),
        producers: AtomicUsize::new(1),
        consumer_alive: AtomicBool::new(true),
    });
    Ok((
        Producer {
            inner: Arc::clone(&inner),
        },
        Consumer { inner },
    ))
}

impl<T> Producer<T> {
    /// Enqueue without blocking.
    pub fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        let inner = &*self.inner;
        if !inner.consumer_alive.load(Ordering::Acquire) {
            return Err(PushError::Disconnected(value));
        }

        let mut pos = inner.tail.load(Ordering::Relaxed);
        loop {
            let slot = &inner.slots[pos & inner.mask];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos) as isize;

            if diff == 0 {
                match inner.tail.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS gave this producer exclusive ownership of the slot.
                        unsafe { (*slot.value.get()).write(value) };
                        slot.seq.store(pos.wrapping_add(1), Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return Err(PushError::Full(value));
            } else {
                pos = inner.tail.load(Ordering::Relaxed);
            }
        }
    }

    /// Number of items currently queued (approximate under contention)
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the ring currently looks empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot count
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Whether the consumer is still alive
    pub fn is_connected(&self) -> bool {
        self.inner.consumer_alive.load(Ordering::Acquire)
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        self.inner.producers.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.inner.producers.fetch_sub(1, Ordering::Release);
    }
}

impl<T> Consumer<T> {
    /// Dequeue one item without blocking.
    pub fn try_pop(&mut self) -> Result<T, PopError> {
        // Read the producer count before the slot so a final push is never missed.
        let orphaned = self.inner.producers.load(Ordering::Acquire) == 0;
        match self.pop_ready() {
            Some(value) => Ok(value),
            None if orphaned => Err(PopError::Disconnected),
            None => Err(PopError::Empty),
        }
    }

    /// Dequeue up to `max` items into `out` without blocking.
    ///
    /// Returns how many were appended; zero when the ring is empty.
    pub fn pop_burst(&mut self, out: &mut Vec<T>, max: usize) -> usize {
        let mut n = 0;
        while n < max {
            match self.pop_ready() {
                Some(value) => {
                    out.push(value);
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn pop_ready(&mut self) -> Option<T> {
        let inner = &*self.inner;
        let pos = inner.head.load(Ordering::Relaxed);
        let slot = &inner.slots[pos & inner.mask];
        if slot.seq.load(Ordering::Acquire) != pos.wrapping_add(1) {
            return None;
        }
        // SAFETY: the sequence says a producer published this slot, and only this consumer reads.
        let value = unsafe { (*slot.value.get()).assume_init_read() };
        slot.seq
            .store(pos.wrapping_add(inner.capacity()), Ordering::Release);
        inner.head.store(pos.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Number of items currently queued
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the ring currently looks empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot count
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        self.inner.consumer_alive.store(false, Ordering::Release);
    }
}
