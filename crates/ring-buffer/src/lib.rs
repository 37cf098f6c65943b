//! Fixed-Capacity Ring Buffer
//!
//! Rolling sample history used by the heuristic extractor (gaze-away samples).

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};
