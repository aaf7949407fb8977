//! Response ring buffer
//!
//! Fixed-capacity circular buffer guarded by a parking_lot mutex.

use parking_lot::Mutex;

/// Cursor state plus the slot storage
#[derive(Debug)]
struct Ring {
    slots: Vec<String>,

    /// Next slot to write
    write: usize,

    /// Oldest unread slot
    read: usize,

    /// Unread entries
    count: usize,
}

impl Ring {
    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.slots.len()
    }
}

/// Bounded FIFO of complete response lines
///
/// ## Concurrency:
/// - The reader thread is the only writer (`push`)
/// - Callers pop, peek, skip and reset
/// - All methods use `&self`; the ring sits behind one short-held mutex
pub struct ResponseQueue {
    ring: Mutex<Ring>,
}

impl ResponseQueue {
    /// Create a queue with `capacity` slots
    ///
    /// Each slot is preallocated with `line_capacity` bytes.
    pub fn new(capacity: usize, line_capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity)
            .map(|_| String::with_capacity(line_capacity))
            .collect();

        Self {
            ring: Mutex::new(Ring {
                slots,
                write: 0,
                read: 0,
                count: 0,
            }),
        }
    }

    /// Copy a line into the next slot
    ///
    /// When the queue is full the oldest unread line is overwritten and the
    /// read cursor moves past it. Returns `true` if a line was evicted.
    pub fn push(&self, line: &str) -> bool {
        let mut ring = self.ring.lock();
        let write = ring.write;

        let slot = &mut ring.slots[write];
        slot.clear();
        slot.push_str(line);

        ring.write = ring.advance(write);

        if ring.count == ring.slots.len() {
            ring.read = ring.advance(ring.read);
            true
        } else {
            ring.count += 1;
            false
        }
    }

    /// Take the oldest unread line, if any
    pub fn try_pop(&self) -> Option<String> {
        let mut ring = self.ring.lock();
        if ring.count == 0 {
            return None;
        }

        let read = ring.read;
        let line = ring.slots[read].clone();
        ring.read = ring.advance(read);
        ring.count -= 1;

        Some(line)
    }

    /// Copy the oldest unread line without consuming it
    pub fn peek(&self) -> Option<String> {
        let ring = self.ring.lock();
        if ring.count == 0 {
            return None;
        }
        Some(ring.slots[ring.read].clone())
    }

    /// Discard the oldest unread line; no-op when empty
    ///
    /// Returns `true` if a line was discarded.
    pub fn skip(&self) -> bool {
        let mut ring = self.ring.lock();
        if ring.count == 0 {
            return false;
        }

        ring.read = ring.advance(ring.read);
        ring.count -= 1;
        true
    }

    /// Forget all unread lines
    ///
    /// The read cursor is aligned to the write cursor, so the next push is
    /// the next line returned.
    pub fn reset(&self) {
        let mut ring = self.ring.lock();
        ring.count = 0;
        ring.read = ring.write;
    }

    /// Number of unread lines
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    /// True if nothing is waiting to be read
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.ring.lock().slots.len()
    }
}
