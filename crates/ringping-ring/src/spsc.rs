//! Single-producer single-consumer bounded ring.
//!
//! Lamport-style: the producer publishes `head`, the consumer publishes
//! `tail`, and each side caches the other's index so the shared line is only
//! touched when the cached view says full or empty.

use crate::error::{PopError, PushError, RingResult};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct Inner<T> {
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    /// Published by the producer
    head: CachePadded<AtomicUsize>,
    /// Published by the consumer
    tail: CachePadded<AtomicUsize>,
    tx_alive: AtomicBool,
    rx_alive: AtomicBool,
}

unsafe impl<T: Send> Send for Inner<T> {}
unsafe impl<T: Send> Sync for Inner<T> {}

impl<T> Inner<T> {
    fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();
        while tail != head {
            // SAFETY: slots between tail and head were written and never read.
            unsafe { self.buffer[tail & self.mask].get_mut().assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

/// Sending half
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
    head: usize,
    cached_tail: usize,
}

/// Receiving half
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
    tail: usize,
    cached_head: usize,
}

/// Create an SPSC ring holding up to `capacity` items.
pub fn channel<T>(capacity: usize) -> RingResult<(Producer<T>, Consumer<T>)> {
    let mask = crate::check_capacity(capacity)?;
    let buffer = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect();
    let inner = Arc::new(Inner {
        buffer,
        mask,
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        tx_alive: AtomicBool::new(true),
        rx_alive: AtomicBool::new(true),
    });
    Ok((
        Producer {
            inner: Arc::clone(&inner),
            head: 0,
            cached_tail: 0,
        },
        Consumer {
            inner,
            tail: 0,
            cached_head: 0,
        },
    ))
}

impl<T> Producer<T> {
    /// Enqueue without blocking.
    pub fn try_push(&mut self, value: T) -> Result<(), PushError<T>> {
        if !self.inner.rx_alive.load(Ordering::Acquire) {
            return Err(PushError::Disconnected(value));
        }

        let capacity = self.inner.capacity();
        if self.head.wrapping_sub(self.cached_tail) >= capacity {
            self.cached_tail = self.inner.tail.load(Ordering::Acquire);
            if self.head.wrapping_sub(self.cached_tail) >= capacity {
                return Err(PushError::Full(value));
            }
        }

        // SAFETY: the slot at head is outside [tail, head) so the consumer is not reading it.
        unsafe { (*self.inner.buffer[self.head & self.inner.mask].get()).write(value) };
        self.head = self.head.wrapping_add(1);
        self.inner.head.store(self.head, Ordering::Release);
        Ok(())
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

    /// Whether the consumer is still alive
    pub fn is_connected(&self) -> bool {
        self.inner.rx_alive.load(Ordering::Acquire)
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.inner.tx_alive.store(false, Ordering::Release);
    }
}

impl<T> Consumer<T> {
    /// Dequeue one item without blocking.
    pub fn try_pop(&mut self) -> Result<T, PopError> {
        if self.tail == self.cached_head {
            let alive = self.inner.tx_alive.load(Ordering::Acquire);
            self.cached_head = self.inner.head.load(Ordering::Acquire);
            if self.tail == self.cached_head {
                return Err(if alive {
                    PopError::Empty
                } else {
                    PopError::Disconnected
                });
            }
        }

        // SAFETY: the slot at tail lies in [tail, head) and was published by the producer.
        let value =
            unsafe { (*self.inner.buffer[self.tail & self.inner.mask].get()).assume_init_read() };
        self.tail = self.tail.wrapping_add(1);
        self.inner.tail.store(self.tail, Ordering::Release);
        Ok(value)
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
        self.inner.rx_alive.store(false, Ordering::Release);
    }
}
