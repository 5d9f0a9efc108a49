//! Parallel Replay
//!
//! Uses Rayon to decode frozen buffers on several threads. A buffer is only
//! read during replay, so one buffer can feed many consumers at once; every
//! task gets its own processor.

use rayon::prelude::*;

use crate::buffer::XmlStreamBuffer;
use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::sax::{ContentHandler, SaxBufferProcessor, SaxEvent};

/// Replay one buffer into every handler in parallel
///
/// Results are in handler order. A failing handler does not affect the
/// others.
pub fn replay_parallel<H>(
    buffer: &XmlStreamBuffer,
    handlers: &mut [H],
    config: &ProcessorConfig,
) -> Vec<Result<()>>
where
    H: ContentHandler + Send,
{
    handlers
        .par_iter_mut()
        .map(|handler| SaxBufferProcessor::with_config(config.clone()).process(buffer, handler))
        .collect()
}

/// Replay one buffer `copies` times in parallel and collect each event list
pub fn collect_parallel(
    buffer: &XmlStreamBuffer,
    copies: usize,
    config: &ProcessorConfig,
) -> Vec<Result<Vec<SaxEvent>>> {
    (0..copies)
        .into_par_iter()
        .map(|_| SaxBufferProcessor::with_config(config.clone()).collect(buffer))
        .collect()
}

/// Collect the events of many buffers in parallel
pub fn collect_many(
    buffers: &[XmlStreamBuffer],
    config: &ProcessorConfig,
) -> Vec<Result<Vec<SaxEvent>>> {
    buffers
        .par_iter()
        .map(|buffer| SaxBufferProcessor::with_config(config.clone()).collect(buffer))
        .collect()
}
