//! Ties the frame reader, series accumulator, and corrector together over real I/O.

use std::io::{Read, Write};

use tracing::{debug, info, warn};

use crate::corrector::Corrector;
use crate::error::Result;
use crate::frame::FRAME_SIZE;
use crate::series::{Accumulator, FinalizedSeries, PushOutcome};

/// Index of the first frame the driver processes; frame 0 is skipped entirely. Preserved from
/// the reference implementation, named rather than left as a bare `1`.
pub const FIRST_FRAME_INDEX: u64 = 1;

/// Safety cap on the number of frames processed in a single run.
pub const MAX_FRAMES: u64 = 100_000_000;

/// Outcome of a full repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub frames_read: u64,
    pub frames_emitted: u64,
}

/// Read GVAR frames from `reader`, repair their scan counters, and write the corrected stream to
/// `writer`.
///
/// Skips the leading frame (see [`FIRST_FRAME_INDEX`]), then processes frames sequentially until
/// end-of-stream or [`MAX_FRAMES`] is reached. A trailing partial series at end-of-stream is
/// dropped without emission.
///
/// # Errors
/// Propagates I/O errors from `reader`/`writer`, and [`crate::Error::MalformedLineHeader`] /
/// [`crate::Error::CodecInvariantViolation`] from the codec and corrector.
pub fn repair<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<Summary> {
    for _ in 0..FIRST_FRAME_INDEX {
        read_frame(&mut reader)?;
    }

    let mut accumulator = Accumulator::new();
    let mut corrector = Corrector::new();
    let mut summary = Summary::default();

    loop {
        if summary.frames_read >= MAX_FRAMES {
            warn!(limit = MAX_FRAMES, "frame limit reached; stopping");
            break;
        }

        let frame = read_frame(&mut reader)?;

        match accumulator.push(frame)? {
            PushOutcome::EndOfStream => {
                info!(
                    frames_read = summary.frames_read,
                    frames_emitted = summary.frames_emitted,
                    "end of stream reached"
                );
                break;
            }
            PushOutcome::Boundary(finalized) => {
                summary.frames_read += 1;
                summary.frames_emitted += emit(finalized, &mut corrector, &mut writer)?;
            }
            PushOutcome::Continue => {
                summary.frames_read += 1;
            }
        }
    }

    let dropped = accumulator.pending_frame_count();
    if dropped > 0 {
        debug!(dropped, "dropping trailing partial series at end of stream");
    }

    Ok(summary)
}

/// Correct a finalized series and write its imagery frames (ascending block id) followed by its
/// queued auxiliary frames (arrival order).
fn emit<W: Write>(
    finalized: FinalizedSeries,
    corrector: &mut Corrector,
    writer: &mut W,
) -> Result<u64> {
    let corrected = corrector.correct(finalized.series)?;
    let mut emitted = 0u64;

    for frame in corrected.into_frames_ascending() {
        writer.write_all(&frame)?;
        emitted += 1;
    }
    for frame in finalized.aux {
        writer.write_all(&frame)?;
        emitted += 1;
    }

    Ok(emitted)
}

/// Read up to [`FRAME_SIZE`] bytes from `reader`, returning fewer if the reader is exhausted
/// first. An empty or short result at the head of a frame signals end-of-stream to the
/// downstream outer-header resolver.
fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; FRAME_SIZE];
    let mut filled = 0;
    while filled < FRAME_SIZE {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}
