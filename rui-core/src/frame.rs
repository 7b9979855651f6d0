//! HDR frame sink: assembles a streamed float image and saves it as PFM.
//!
//! # Wire Protocol
//!
//! ```text
//! Server ──[hdr_header]──────────────► Client
//!   Payload: HdrHeader (width, height, channels = 3)
//!
//! Server ──[hdr_packet]──────────────► Client   (repeated)
//!   Payload: Vec<f32> chunk, appended in order
//! ```
//!
//! A header opens a staged frame. Chunks append to the stage and, once it
//! holds `width * height * 3` samples, the stage is swapped into the
//! visible buffer. Staging and the swap happen under the same lock that
//! [`FrameBufferSink::save_pfm`] holds for its entire write loop, so a
//! saved file never mixes two frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::channels;
use crate::demux::{Demuxer, SubscriptionHandle};
use crate::error::RuiError;
use crate::value::ChannelValue;

/// Interleaved samples per pixel.
pub const CHANNELS: u32 = 3;

/// Largest frame accepted from the server: 8192 x 8192 RGB.
pub const MAX_FRAME_SAMPLES: usize = 8192 * 8192 * CHANNELS as usize;

// ── HdrHeader ────────────────────────────────────────────────────

/// Dimensions of a float frame; rows are stored top to bottom in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HdrHeader {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl HdrHeader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: CHANNELS,
        }
    }

    /// Number of `f32` samples a complete frame holds, `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels as usize)
    }

    /// Check the header describes an RGB frame the sink will hold and
    /// return its sample count.
    pub fn validate(&self) -> Result<usize, RuiError> {
        if self.channels != CHANNELS {
            return Err(RuiError::UnsupportedChannelCount(self.channels));
        }
        match self.sample_count() {
            Some(n) if n <= MAX_FRAME_SAMPLES => Ok(n),
            _ => Err(RuiError::FrameDimensions {
                width: self.width,
                height: self.height,
                max: MAX_FRAME_SAMPLES,
            }),
        }
    }

    /// Samples in one scanline.
    pub fn row_len(&self) -> usize {
        (self.width as usize).saturating_mul(self.channels as usize)
    }

    /// Exact byte length of the PFM file for this header.
    pub fn pfm_len(&self) -> Option<usize> {
        self.sample_count()?
            .checked_mul(std::mem::size_of::<f32>())?
            .checked_add(pfm_preamble(self).len())
    }
}

fn pfm_preamble(header: &HdrHeader) -> String {
    format!("PF\n{} {}\n-1.0\n", header.width, header.height)
}

// ── SaveOutcome ──────────────────────────────────────────────────

/// Result of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A file was written for a frame of this size.
    Written(HdrHeader),
    /// No frame has been received yet; nothing was written.
    Skipped,
}

// ── FrameBufferSink ──────────────────────────────────────────────

#[derive(Debug)]
struct StagedFrame {
    header: HdrHeader,
    expected: usize,
    samples: Vec<f32>,
}

#[derive(Debug, Default)]
struct FrameState {
    /// Last complete frame.
    header: HdrHeader,
    buffer: Vec<f32>,
    /// Frame currently being received.
    staged: Option<StagedFrame>,
    frames_completed: u64,
}

impl FrameState {
    fn commit(&mut self, header: HdrHeader, samples: Vec<f32>) {
        self.header = header;
        self.buffer = samples;
        self.frames_completed += 1;
    }
}

/// Read-only copy of the visible frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub header: HdrHeader,
    pub samples: Vec<f32>,
}

/// Owns the HDR frame buffer shared by the reception and UI threads.
#[derive(Debug, Default)]
pub struct FrameBufferSink {
    state: Mutex<FrameState>,
}

impl FrameBufferSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, FrameState> {
        // Every mutation below leaves the state consistent before it can panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the `hdr_header` and `hdr_packet` subscriptions.
    ///
    /// The callbacks hold only a weak reference; once the sink is dropped
    /// further frame messages are ignored.
    pub fn subscribe(self: &Arc<Self>, demux: &mut Demuxer) -> [SubscriptionHandle; 2] {
        let weak: Weak<Self> = Arc::downgrade(self);
        let header_sub = demux.subscribe(channels::HDR_HEADER, move |bytes| {
            let header = HdrHeader::decode(channels::HDR_HEADER, bytes)?;
            match weak.upgrade() {
                Some(sink) => sink.begin_frame(header),
                None => Ok(()),
            }
        });

        let weak: Weak<Self> = Arc::downgrade(self);
        let packet_sub = demux.subscribe(channels::HDR_PACKET, move |bytes| {
            let chunk = Vec::<f32>::decode(channels::HDR_PACKET, bytes)?;
            match weak.upgrade() {
                Some(sink) => sink.push_chunk(&chunk).map(|_| ()),
                None => Ok(()),
            }
        });

        [header_sub, packet_sub]
    }

    /// Start staging a new frame, abandoning any incomplete one.
    ///
    /// The stage grows as chunks arrive; nothing is reserved up front for
    /// the size the header claims.
    pub fn begin_frame(&self, header: HdrHeader) -> Result<(), RuiError> {
        let expected = header.validate()?;
        trace!(width = header.width, height = header.height, "frame header");
        let mut state = self.lock();
        if state.staged.is_some() {
            debug!("abandoning incomplete frame");
        }
        state.staged = Some(StagedFrame {
            header,
            expected,
            samples: Vec::new(),
        });
        Ok(())
    }

    /// Append samples to the staged frame. Returns `true` when this chunk
    /// completed the frame and it became visible.
    pub fn push_chunk(&self, chunk: &[f32]) -> Result<bool, RuiError> {
        let mut state = self.lock();
        let Some(staged) = state.staged.as_mut() else {
            return Err(RuiError::UnexpectedChunk);
        };

        let expected = staged.expected;
        let received = staged.samples.len() + chunk.len();
        if received > expected {
            state.staged = None;
            return Err(RuiError::FrameSizeMismatch {
                expected,
                actual: received,
            });
        }
        staged.samples.extend_from_slice(chunk);
        if received < expected {
            return Ok(false);
        }

        if let Some(StagedFrame {
            header, samples, ..
        }) = state.staged.take()
        {
            state.commit(header, samples);
            trace!(frames = state.frames_completed, "frame complete");
        }
        Ok(true)
    }

    /// Replace the visible frame in one step.
    pub fn store(&self, header: HdrHeader, samples: Vec<f32>) -> Result<(), RuiError> {
        let expected = header.validate()?;
        if samples.len() != expected {
            return Err(RuiError::FrameSizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        self.lock().commit(header, samples);
        Ok(())
    }

    /// Run `f` on the visible frame while holding the lock. `None` until
    /// the first frame completes.
    pub fn with_current<R>(&self, f: impl FnOnce(&HdrHeader, &[f32]) -> R) -> Option<R> {
        let state = self.lock();
        if state.buffer.is_empty() {
            return None;
        }
        Some(f(&state.header, &state.buffer))
    }

    /// Copy of the visible frame for a preview consumer.
    pub fn current(&self) -> Option<FrameSnapshot> {
        self.with_current(|header, samples| FrameSnapshot {
            header: *header,
            samples: samples.to_vec(),
        })
    }

    pub fn frames_completed(&self) -> u64 {
        self.lock().frames_completed
    }

    /// Write the visible frame to `path` as a little-endian PFM.
    ///
    /// Scanlines are written bottom row first. The lock is held across
    /// the whole write, which blocks reception for the duration of the
    /// file I/O. Returns [`SaveOutcome::Skipped`] without touching the
    /// filesystem when no frame has been received.
    pub fn save_pfm(&self, path: impl AsRef<Path>) -> Result<SaveOutcome, RuiError> {
        let path = path.as_ref();
        let state = self.lock();
        if state.buffer.is_empty() {
            return Ok(SaveOutcome::Skipped);
        }

        let io_err = |source| RuiError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        write_pfm(&mut out, &state.header, &state.buffer).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        debug!(path = %path.display(), "saved frame");
        Ok(SaveOutcome::Written(state.header))
    }
}

/// Serialize one frame in PFM layout.
pub fn write_pfm<W: Write>(out: &mut W, header: &HdrHeader, samples: &[f32]) -> std::io::Result<()> {
    out.write_all(pfm_preamble(header).as_bytes())?;
    let row_len = header.row_len();
    if row_len == 0 {
        return Ok(());
    }
    for row in samples.chunks_exact(row_len).rev() {
        for sample in row {
            out.write_all(&sample.to_ne_bytes())?;
        }
    }
    Ok(())
}
