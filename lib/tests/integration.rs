//! End-to-end exercise of `repair` over a synthetic recording written to a real file.

use std::io::{Seek, SeekFrom, Write};

use gvar_repair::{repair, Summary};

const FRAME_SIZE: usize = 32786;
const OUTER_HEADER_START: usize = 8;
const LINE_HEADER_START: usize = 98;
const LINE_HEADER_LEN: usize = 28;

fn frame_for(block_id: u8, counter: u32) -> Vec<u8> {
    let mut frame = vec![0u8; FRAME_SIZE];
    for i in 0..3 {
        frame[OUTER_HEADER_START + i * 30] = block_id;
    }
    write_counter(&mut frame, counter);
    frame
}

fn write_counter(frame: &mut [u8], counter: u32) {
    let header = gvar_repair::codec::LineHeader::decode(
        &frame[LINE_HEADER_START..LINE_HEADER_START + LINE_HEADER_LEN],
    )
    .unwrap();
    let mut header = header;
    header.set_counter(counter);
    frame[LINE_HEADER_START..LINE_HEADER_START + LINE_HEADER_LEN].copy_from_slice(&header.encode());
}

fn read_counter(frame: &[u8]) -> u32 {
    gvar_repair::codec::LineHeader::decode(
        &frame[LINE_HEADER_START..LINE_HEADER_START + LINE_HEADER_LEN],
    )
    .unwrap()
    .counter()
}

#[test]
fn repairs_a_recording_with_interleaved_aux_and_one_fault_per_series() {
    let mut tmp = tempfile::tempfile().unwrap();

    // Leading frame, skipped by the driver.
    tmp.write_all(&vec![0u8; FRAME_SIZE]).unwrap();

    // Series 1: clean.
    for block_id in 1..=10u8 {
        tmp.write_all(&frame_for(block_id, 100)).unwrap();
    }
    // Two auxiliary frames between series.
    tmp.write_all(&frame_for(11, 0)).unwrap();
    tmp.write_all(&frame_for(11, 0)).unwrap();

    // Series 2: one corrupted counter, correctable by sequential consistency once series 1 has
    // armed confidence... but confidence only arms on a clean series at 100, so series 2's
    // fault is fixed by intra-series majority instead.
    let mut series2 = vec![100u32 + 1; 10];
    series2[4] = 7; // block id 5 corrupted
    for (i, &counter) in series2.iter().enumerate() {
        tmp.write_all(&frame_for((i + 1) as u8, counter)).unwrap();
    }

    // Series 3: clean, closes out series 2.
    for block_id in 1..=10u8 {
        tmp.write_all(&frame_for(block_id, 102)).unwrap();
    }

    tmp.seek(SeekFrom::Start(0)).unwrap();
    let mut output = Vec::new();
    let summary: Summary = repair(&tmp, &mut output).unwrap();

    // Series 1 (10) + 2 aux + series 2 (10) emitted; series 3 is the trailing partial series and
    // is dropped.
    assert_eq!(summary.frames_emitted, 22);
    assert_eq!(output.len(), 22 * FRAME_SIZE);

    let mut counters = Vec::new();
    let mut block_ids = Vec::new();
    for chunk in output.chunks_exact(FRAME_SIZE) {
        block_ids.push(chunk[OUTER_HEADER_START]);
        counters.push(read_counter(chunk));
    }

    assert_eq!(&block_ids[..10], &(1..=10).collect::<Vec<_>>()[..]);
    assert!(counters[..10].iter().all(|&c| c == 100));

    assert_eq!(&block_ids[10..12], &[11, 11]);

    assert_eq!(&block_ids[12..], &(1..=10).collect::<Vec<_>>()[..]);
    assert!(counters[12..].iter().all(|&c| c == 101));
}
