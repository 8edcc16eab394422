//! Scanline series accumulation: groups frames by block id into ten-wide scanline groups and
//! detects series boundaries from noisy block ids alone.

use crate::error::Result;
use crate::frame::read_counter;
use crate::header::{BlockId, OuterHeader, AUX_BLOCK_ID, MAX_BLOCK_ID};
use tracing::{debug, trace};

/// Highest imagery block id; blocks 1..=10 carry scanline data, 11 is auxiliary.
pub const MAX_IMAGERY_BLOCK_ID: BlockId = 10;

/// A single imagery frame captured for the current series, along with its decoded counter.
#[derive(Debug, Clone)]
pub struct SeriesEntry {
    pub frame: Vec<u8>,
    pub counter: u32,
}

/// The imagery frames of one scanline group, keyed by block id.
#[derive(Debug)]
pub struct Series {
    entries: [Option<SeriesEntry>; MAX_IMAGERY_BLOCK_ID as usize],
}

impl Default for Series {
    fn default() -> Self {
        Series {
            entries: std::array::from_fn(|_| None),
        }
    }
}

impl Series {
    /// Panics if `block_id` is not in `1..=MAX_IMAGERY_BLOCK_ID`; callers must classify block ids
    /// before indexing by them (see `Accumulator::push`, which drops anything outside that range).
    fn index(block_id: BlockId) -> usize {
        debug_assert!(
            (1..=MAX_IMAGERY_BLOCK_ID).contains(&block_id),
            "block id {block_id} out of range"
        );
        (block_id - 1) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    #[must_use]
    pub fn contains(&self, block_id: BlockId) -> bool {
        self.entries[Self::index(block_id)].is_some()
    }

    fn insert(&mut self, block_id: BlockId, entry: SeriesEntry) {
        self.entries[Self::index(block_id)] = Some(entry);
    }

    /// Entries in ascending block-id order.
    pub fn entries(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.entries.iter().filter_map(Option::as_ref)
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut SeriesEntry> {
        self.entries.iter_mut().filter_map(Option::as_mut)
    }

    /// Consume the series, returning its frames in ascending block-id order.
    #[must_use]
    pub fn into_frames_ascending(self) -> Vec<Vec<u8>> {
        self.entries.into_iter().flatten().map(|e| e.frame).collect()
    }
}

/// A finalized scanline group: the imagery series plus any auxiliary frames captured alongside
/// it, ready for correction and emission.
#[derive(Debug, Default)]
pub struct FinalizedSeries {
    pub series: Series,
    pub aux: Vec<Vec<u8>>,
}

/// Outcome of feeding one frame to the [`Accumulator`].
pub enum PushOutcome {
    /// The frame was classified and accumulated; nothing to emit yet.
    Continue,
    /// The frame closed out a prior series, which is ready for correction and emission.
    Boundary(FinalizedSeries),
    /// The frame's outer header could not be resolved (first redundant copy absent): the stream
    /// has ended.
    EndOfStream,
}

/// Groups a stream of raw frames into scanline series.
#[derive(Debug, Default)]
pub struct Accumulator {
    series: Series,
    pending_aux: Vec<Vec<u8>>,
    last_block_id: BlockId,
}

impl Accumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `frame` and fold it into the current series.
    ///
    /// # Errors
    /// Propagates [`crate::Error::MalformedLineHeader`] if an imagery frame's line header cannot
    /// be decoded.
    pub fn push(&mut self, frame: Vec<u8>) -> Result<PushOutcome> {
        let Some(header) = OuterHeader::resolve(&frame) else {
            return Ok(PushOutcome::EndOfStream);
        };
        let block_id = header.block_id;

        if block_id == 0 || block_id > MAX_BLOCK_ID {
            debug!(block_id, "dropping frame with invalid block id");
            return Ok(PushOutcome::Continue);
        }

        if block_id == AUX_BLOCK_ID {
            self.pending_aux.push(frame);
            self.last_block_id = AUX_BLOCK_ID;
            return Ok(PushOutcome::Continue);
        }

        let counter = read_counter(&frame)?;
        let boundary = !self.series.is_empty()
            && (self.last_block_id == MAX_IMAGERY_BLOCK_ID
                || self.last_block_id == AUX_BLOCK_ID
                || self.series.contains(block_id));

        let finalized = if boundary {
            trace!(block_id, last_block_id = self.last_block_id, "series boundary");
            Some(FinalizedSeries {
                series: std::mem::take(&mut self.series),
                aux: std::mem::take(&mut self.pending_aux),
            })
        } else {
            None
        };

        self.series.insert(block_id, SeriesEntry { frame, counter });
        self.last_block_id = block_id;

        Ok(match finalized {
            Some(f) => PushOutcome::Boundary(f),
            None => PushOutcome::Continue,
        })
    }

    /// Total frames held in unfinalized state (a trailing partial series that will be dropped
    /// at end-of-stream).
    #[must_use]
    pub fn pending_frame_count(&self) -> usize {
        self.series.len() + self.pending_aux.len()
    }
}
