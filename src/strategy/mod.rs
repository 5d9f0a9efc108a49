//! Replay Strategy Module
//!
//! - Sequential: one `SaxBufferProcessor` per thread, see [`crate::sax`]
//! - Parallel: one buffer into many consumers, or many buffers at once (Rayon)

pub mod parallel;

pub use parallel::{collect_many, collect_parallel, replay_parallel};
