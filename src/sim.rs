//! # Synthetic DCF77 Signal
//!
//! Hardware-free stand-in for the antenna. Given an hour and minute, this
//! module produces the exact edge sequence a live receiver module would
//! deliver over one minute frame: a carrier pulse, the long sync gap where
//! the 59th-second pulse is missing, then 59 second pulses whose widths
//! encode the frame bits.
//!
//! Development mode and the integration tests run entirely on these edges,
//! so the full decode path is exercised on machines with no GPIO at all.
//! Frames are plain `[bool; 59]` arrays; tests flip individual slots before
//! rendering to produce corrupted transmissions.

/// Second slots actually transmitted per minute (second 59 is the gap).
pub const SECONDS_PER_FRAME: usize = 59;

/// Carrier drop encoding a `0` bit.
pub const SHORT_PULSE_MS: u64 = 100;

/// Carrier drop encoding a `1` bit.
pub const LONG_PULSE_MS: u64 = 200;

/// Spacing between consecutive second pulses.
const PULSE_PERIOD_MS: u64 = 1_000;

/// Pulse-start gap rendered in place of the missing 59th-second pulse.
const SYNC_GAP_MS: u64 = 2_000;

/// Encode `hour` and `minute` into the transmitted slots of a minute frame.
///
/// Slot 20 carries the start-of-time marker, slots 21..=28 the minute field
/// and its parity, slots 29..=35 the hour field and its parity. Both fields
/// use even parity. The date slots past 35 are left zero; the decoder never
/// reads them.
///
/// Note that DCF77 announces the minute that begins as the frame ends, so a
/// receiver that finishes decoding this frame reports the minute before the
/// encoded one.
pub fn frame_bits(hour: u32, minute: u32) -> [bool; SECONDS_PER_FRAME] {
    debug_assert!(hour < 24, "hour out of range: {hour}");
    debug_assert!(minute < 60, "minute out of range: {minute}");

    let mut bits = [false; SECONDS_PER_FRAME];

    // Start-of-time marker
    bits[20] = true;

    // Minute: BCD ones digit in slots 21..=24, tens digit in 25..=27
    let minute_bcd = (minute % 10) | ((minute / 10) << 4);
    for b in 0..7 {
        bits[21 + b] = (minute_bcd >> b) & 1 == 1;
    }
    bits[28] = minute_bcd.count_ones() & 1 == 1;

    // Hour: BCD ones digit in slots 29..=32, tens digit in 33..=34
    let hour_bcd = (hour % 10) | ((hour / 10) << 4);
    for b in 0..6 {
        bits[29 + b] = (hour_bcd >> b) & 1 == 1;
    }
    bits[35] = hour_bcd.count_ones() & 1 == 1;

    bits
}

/// Render a frame as `(timestamp_ms, level)` edge events.
///
/// Starts with a lone carrier pulse at `start_ms` so the following sync gap
/// is measurable, exactly as a receiver already locked to the previous
/// minute would see it. Second 0 of the frame rises at `start_ms +
/// SYNC_GAP_MS`; feed the events to the decoder in order.
pub fn edges(start_ms: u64, bits: &[bool; SECONDS_PER_FRAME]) -> Vec<(u64, bool)> {
    let mut events = Vec::with_capacity(2 * (SECONDS_PER_FRAME + 1));

    // Trailing pulse of the previous minute
    events.push((start_ms, true));
    events.push((start_ms + SHORT_PULSE_MS, false));

    let sync = start_ms + SYNC_GAP_MS;
    for (slot, &bit) in bits.iter().enumerate() {
        let rise = sync + slot as u64 * PULSE_PERIOD_MS;
        let width = if bit { LONG_PULSE_MS } else { SHORT_PULSE_MS };
        events.push((rise, true));
        events.push((rise + width, false));
    }

    events
}

/// Timestamp of the sync edge (second 0) within [`edges`] output.
pub fn sync_instant(start_ms: u64) -> u64 {
    start_ms + SYNC_GAP_MS
}
