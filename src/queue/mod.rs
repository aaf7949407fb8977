//! Queue Module
//!
//! Bounded hand-off of response lines from the reader thread to callers.
//!
//! ## Responsibilities
//! - Fixed number of preallocated slots, no growth
//! - FIFO order matching wire order
//! - Overwrite-oldest on overflow (never rejects a write)
//! - Per-transaction `reset` that forgets unread leftovers
//!
//! ## Layout
//! ```text
//!   slots:  [ l3 | l4 | l5 | l1 | l2 ]
//!                         ^read      ^write wraps to 0
//!   count = 5 (full); next push evicts l1 and advances read
//! ```

mod ring;

pub use ring::ResponseQueue;
