//! Frame-level constants and byte-level operations shared by the accumulator and corrector.

use crate::codec::{LineHeader, LINE_HEADER_LEN};
use crate::error::{Error, Result};

/// Fixed length, in bytes, of every GVAR frame.
pub const FRAME_SIZE: usize = 32786;

/// Byte offset of the line header within a frame.
pub const LINE_HEADER_START: usize = 98;
/// Exclusive end offset of the line header within a frame.
pub const LINE_HEADER_END: usize = LINE_HEADER_START + LINE_HEADER_LEN;

/// Decode the scan counter carried in `frame`'s line header.
///
/// # Errors
/// [`crate::Error::MalformedLineHeader`] if `frame` is too short to contain a full line header.
pub fn read_counter(frame: &[u8]) -> Result<u32> {
    require_line_header(frame)?;
    let header = LineHeader::decode(&frame[LINE_HEADER_START..LINE_HEADER_END])?;
    Ok(header.counter())
}

/// Return a copy of `frame` with its line header's scan counter rewritten to `counter`.
///
/// Every byte outside `[LINE_HEADER_START, LINE_HEADER_END)` is untouched, and within that range
/// only the bits belonging to words 5 and 6 may change.
///
/// # Errors
/// [`crate::Error::MalformedLineHeader`] if `frame` is too short to contain a full line header.
pub fn with_counter(frame: &[u8], counter: u32) -> Result<Vec<u8>> {
    require_line_header(frame)?;
    let mut header = LineHeader::decode(&frame[LINE_HEADER_START..LINE_HEADER_END])?;
    header.set_counter(counter);

    let mut out = frame.to_vec();
    out[LINE_HEADER_START..LINE_HEADER_END].copy_from_slice(&header.encode());
    Ok(out)
}

/// Guard against a truncated frame that passed outer-header resolution (>= 38 bytes) but is too
/// short to contain a full line header, which would otherwise panic on the slice below.
fn require_line_header(frame: &[u8]) -> Result<()> {
    if frame.len() < LINE_HEADER_END {
        return Err(Error::MalformedLineHeader {
            len: frame.len().saturating_sub(LINE_HEADER_START),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_counter(counter: u32) -> Vec<u8> {
        let mut frame = vec![0u8; FRAME_SIZE];
        let mut header = LineHeader::decode(&[0u8; LINE_HEADER_LEN]).unwrap();
        header.set_counter(counter);
        frame[LINE_HEADER_START..LINE_HEADER_END].copy_from_slice(&header.encode());
        frame
    }

    #[test]
    fn read_counter_round_trips_through_with_counter() {
        let frame = frame_with_counter(42);
        assert_eq!(read_counter(&frame).unwrap(), 42);

        let rewritten = with_counter(&frame, 99).unwrap();
        assert_eq!(read_counter(&rewritten).unwrap(), 99);
        assert_eq!(rewritten.len(), FRAME_SIZE);
    }

    #[test]
    fn with_counter_preserves_bytes_outside_line_header() {
        let mut frame = frame_with_counter(7);
        frame[0] = 0xAB;
        frame[FRAME_SIZE - 1] = 0xCD;

        let rewritten = with_counter(&frame, 8).unwrap();
        assert_eq!(rewritten[0], 0xAB);
        assert_eq!(rewritten[FRAME_SIZE - 1], 0xCD);
        assert_eq!(&rewritten[..LINE_HEADER_START], &frame[..LINE_HEADER_START]);
        assert_eq!(&rewritten[LINE_HEADER_END..], &frame[LINE_HEADER_END..]);
    }

    #[test]
    fn truncated_frame_past_outer_header_is_malformed_not_a_panic() {
        // Long enough to pass outer-header resolution (>= 38 bytes) but short of a full line
        // header (< 126 bytes).
        let frame = vec![0u8; LINE_HEADER_START + 10];
        let err = read_counter(&frame).unwrap_err();
        assert!(matches!(err, Error::MalformedLineHeader { len: 10 }));

        let err = with_counter(&frame, 5).unwrap_err();
        assert!(matches!(err, Error::MalformedLineHeader { len: 10 }));
    }
}
