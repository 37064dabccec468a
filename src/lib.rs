//! # zcrb - Zero-Copy Ring Buffer
//!
//! A fixed-capacity circular byte buffer for staging stream data (socket
//! receive buffers, log lines, framed messages) without intermediate copies.
//!
//! ## Design
//!
//! - One contiguous storage region, a read cursor and a fill count
//! - Single producer, single consumer; no internal synchronization
//! - Producer workflow: `write_lock_size` → `write_lock_ptr` → fill → `write_commit`
//! - Consumer workflow: `read_lock_size` → `read_lock_ptr` → consume → `read_commit`
//! - Windowed reads: `window_read_lock_ptr(max)` can be re-requested with a
//!   different bound before `window_read_commit`, for delimiter scanning
//! - Lock views never span the wrap boundary; commit the first part and lock
//!   again for the rest
//! - Lock/commit misuse is reported as an error and logged, never clamped
//!
//! Copying helpers (`write`, `read`, `copy`, `eat`) and scoped guards
//! (`write_chunk`, `read_chunk`, `window`) are layered on the same protocol.
//!
//! ## Example
//!
//! ```
//! use zcrb::RingBuffer;
//!
//! let mut rb = RingBuffer::new(16)?;
//!
//! // Producer: copy in, or write in place and commit
//! rb.write(b"GET ")?;
//! let span = rb.write_lock_ptr()?;
//! span[..5].copy_from_slice(b"/ok\r\n");
//! rb.write_commit(5)?;
//!
//! // Consumer: scan a window for the line end before consuming
//! let window = rb.window_read_lock_ptr(16)?;
//! let end = window.windows(2).position(|w| w == b"\r\n").unwrap() + 2;
//! assert_eq!(&window[..end], b"GET /ok\r\n");
//! rb.window_read_commit(end)?;
//!
//! assert!(rb.empty());
//! # Ok::<(), zcrb::RingError>(())
//! ```

#![warn(missing_docs)]

mod error;
mod handle;
mod io;
mod ring_buffer;

pub use error::{LockKind, Result, RingError};
pub use handle::{ReadChunk, ReadWindow, WriteChunk};
pub use ring_buffer::RingBuffer;
