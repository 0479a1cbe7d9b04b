//! End-to-end decode tests: simulator edge sequences through the decoder.

use radio_clock_lib::decoder::Dcf77Decoder;
use radio_clock_lib::sim;
use radio_clock_lib::StatusSnapshot;

/// Virtual timestamp of the first simulated edge.
const START_MS: u64 = 10_000;

/// Feed one rendered frame through a fresh decoder.
///
/// Returns the decoder and the timestamp of the last edge, so tests can poll
/// "just after the minute completed".
fn decode_frame(bits: &[bool; sim::SECONDS_PER_FRAME]) -> (Dcf77Decoder, u64) {
    let decoder = Dcf77Decoder::new();
    let events = sim::edges(START_MS, bits);
    let last = events.last().expect("frame has edges").0;
    for (timestamp_ms, level) in events {
        decoder.handle_edge(timestamp_ms, level);
    }
    (decoder, last)
}

#[test]
fn full_frame_decodes_to_the_minute_that_just_ended() {
    // A frame announcing 14:38 completes as 14:37 ends
    let bits = sim::frame_bits(14, 38);
    let (decoder, last) = decode_frame(&bits);

    assert!(decoder.is_valid(last + 500));
    assert!(decoder.has_signal(last + 500));
    assert_eq!(decoder.hour(), 14);
    assert_eq!(decoder.minute(), 37);
    assert_eq!(decoder.minute_of_day(), 14 * 60 + 37);
}

#[test]
fn minute_of_day_carries_the_one_minute_offset() {
    let bits = sim::frame_bits(14, 37);
    let (decoder, last) = decode_frame(&bits);

    assert!(decoder.is_valid(last + 500));
    assert_eq!(decoder.minute_of_day(), 14 * 60 + 37 - 1);
    assert_eq!(decoder.hour(), 14);
    assert_eq!(decoder.minute(), 36);
    // The cursor sits on the last filled slot
    assert_eq!(decoder.second(), 58);
}

#[test]
fn midnight_frame_wraps_to_end_of_day() {
    let bits = sim::frame_bits(0, 0);
    let (decoder, last) = decode_frame(&bits);

    assert!(decoder.is_valid(last + 500));
    assert_eq!(decoder.minute_of_day(), 23 * 60 + 59);
    assert_eq!(decoder.hour(), 23);
    assert_eq!(decoder.minute(), 59);
}

#[test]
fn corrupted_minute_parity_invalidates_without_touching_the_getters() {
    let mut bits = sim::frame_bits(14, 38);
    bits[28] = !bits[28];
    let (decoder, last) = decode_frame(&bits);

    assert!(!decoder.is_valid(last + 500));
    // The minute and hour fields themselves were transmitted unchanged
    assert_eq!(decoder.hour(), 14);
    assert_eq!(decoder.minute(), 37);
}

#[test]
fn corrupted_start_marker_invalidates_the_frame() {
    let mut bits = sim::frame_bits(14, 38);
    bits[20] = false;
    let (decoder, last) = decode_frame(&bits);

    assert!(!decoder.is_valid(last + 500));
}

#[test]
fn sync_gap_records_sync_and_expiry_timestamps() {
    let bits = sim::frame_bits(6, 1);
    let (decoder, _) = decode_frame(&bits);
    let sync = sim::sync_instant(START_MS);

    // Fresh until exactly five minutes after the sync edge
    assert!(decoder.is_valid(sync + 299_999));
    assert!(!decoder.is_valid(sync + 300_000));
}

#[test]
fn signal_reports_lost_after_the_maximum_pulse_gap() {
    let bits = sim::frame_bits(14, 38);
    let (decoder, last) = decode_frame(&bits);
    // The final pulse rose 100 ms before its falling edge
    let last_rise = last - sim::SHORT_PULSE_MS;

    assert!(decoder.has_signal(last_rise + 2_500));
    assert!(!decoder.has_signal(last_rise + 2_501));
    // Validity does not depend on the live signal, only on freshness
    assert!(decoder.is_valid(last_rise + 2_501));
}

#[test]
fn clearing_the_decoder_forces_reacquisition() {
    let bits = sim::frame_bits(14, 38);
    let (decoder, last) = decode_frame(&bits);
    assert!(decoder.is_valid(last + 500));

    decoder.clear();

    assert!(!decoder.is_valid(last + 500));
    assert_eq!(decoder.second(), 0);
}

#[test]
fn snapshot_matches_the_decoder_queries() {
    let bits = sim::frame_bits(9, 30);
    let (decoder, last) = decode_frame(&bits);
    let status = StatusSnapshot::capture(&decoder, last + 500);

    assert!(status.signal);
    assert!(status.valid);
    assert_eq!(status.second, decoder.second());
    assert_eq!(status.minute, 29);
    assert_eq!(status.hour, 9);
    assert_eq!(status.minute_of_day, 9 * 60 + 29);
}

#[test]
fn back_to_back_frames_resync_on_each_minute() {
    let first = sim::frame_bits(7, 59);
    let (decoder, last) = decode_frame(&first);
    assert_eq!(decoder.minute(), 58);

    // The next minute opens with its own sync gap, one second after the
    // final pulse of the previous frame rose
    let second = sim::frame_bits(8, 0);
    let next_start = last - sim::SHORT_PULSE_MS + 1_000;
    for (timestamp_ms, level) in sim::edges(next_start, &second) {
        decoder.handle_edge(timestamp_ms, level);
    }

    let end = sim::sync_instant(next_start) + 58_500;
    assert!(decoder.is_valid(end));
    assert_eq!(decoder.hour(), 7);
    assert_eq!(decoder.minute(), 59);
    assert_eq!(decoder.minute_of_day(), 7 * 60 + 59);
}
