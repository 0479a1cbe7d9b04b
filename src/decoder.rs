//! # DCF77 Pulse Decoder
//!
//! DCF77 transmits one amplitude-modulated bit per second: the carrier drops
//! for 100 ms to send a `0` and for 200 ms to send a `1`. The 59th second of
//! every minute carries no drop at all, so the gap between pulse starts grows
//! to roughly two seconds and marks the start of the next minute frame.
//!
//! [`Dcf77Decoder`] turns the edge transitions of the demodulated data line
//! into a 61-slot bit buffer and derives hour and minute from the buffer on
//! demand. The edge entry point is written for interrupt context: it does a
//! few integer comparisons, a handful of relaxed atomic stores, and returns.
//!
//! ## Concurrency
//!
//! Exactly one producer (the edge callback) writes the decoder; any number of
//! consumers poll it. Every field is an individually-atomic cell with relaxed
//! ordering, so a consumer can observe a torn multi-field state, for example
//! a cursor that has advanced before the matching bit landed. The worst case
//! is one polling cycle seeing a stale prior frame; `is_valid` is re-checked
//! on every call, so the window closes by itself.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering::Relaxed};

/// Second slots stored per minute frame, including a potential leap second.
pub const FRAME_SLOTS: usize = 61;

/// Minimum spacing between two pulse starts. Anything tighter is contact
/// bounce or atmospheric noise.
const PULSE_DISTANCE_MIN_MS: u64 = 700;

/// Minimum pulse width. Spikes narrower than this are rejected as noise.
const PULSE_WIDTH_MIN_MS: u64 = 50;

/// Width separating a short (`0`) pulse from a long (`1`) pulse. The
/// standard says 100 ms and 200 ms; real modules drift toward 130/230.
const PULSE_SPLIT_MS: u64 = 180;

/// Pulse-start gap beyond which the missing 59th-second pulse is assumed and
/// a new minute frame begins.
const SYNC_GAP_MS: u64 = 1500;

/// Pulse-start gap beyond which the signal is declared lost.
const PULSE_DISTANCE_MAX_MS: u64 = 2500;

/// A decoded time older than this is no longer trusted (5 minutes).
const STALE_AFTER_MS: u64 = 300_000;

/// Slots 0..=35 cover the start marker, minute, and hour fields. The frame
/// becomes decodable once the cursor has moved past the hour parity slot;
/// the date fields beyond it are never needed.
const MIN_SLOTS_FOR_TIME: usize = 35;

/// DCF77 edge-classification state machine with a one-minute bit buffer.
///
/// Feed every transition of the data line to [`handle_edge`] and poll
/// [`is_valid`] / [`hour`] / [`minute`] whenever a time is needed. Hour and
/// minute are recomputed from the bit buffer on every call, never cached, so
/// they always reflect the buffer as it is right now.
///
/// [`handle_edge`]: Dcf77Decoder::handle_edge
/// [`is_valid`]: Dcf77Decoder::is_valid
/// [`hour`]: Dcf77Decoder::hour
/// [`minute`]: Dcf77Decoder::minute
pub struct Dcf77Decoder {
    /// Start timestamp of the in-progress pulse
    pulse_start: AtomicU64,
    /// Start timestamp of the pulse before it
    pulse_start_previous: AtomicU64,
    /// End timestamp of the last completed pulse
    pulse_end: AtomicU64,
    /// Line level seen by the previous edge
    level_previous: AtomicBool,
    /// True while consecutive pulses fall within protocol timing bounds
    signal_ok: AtomicBool,
    /// Timestamp of the last minute sync, 0 while unsynchronized
    time_sync: AtomicU64,
    /// Timestamp after which the decoded time is stale
    time_expires: AtomicU64,
    /// One bit per second slot of the current minute frame
    bits: [AtomicBool; FRAME_SLOTS],
    /// Write position into `bits` (0..FRAME_SLOTS)
    cursor: AtomicUsize,
}

impl Dcf77Decoder {
    pub fn new() -> Self {
        Dcf77Decoder {
            pulse_start: AtomicU64::new(0),
            pulse_start_previous: AtomicU64::new(0),
            pulse_end: AtomicU64::new(0),
            level_previous: AtomicBool::new(false),
            signal_ok: AtomicBool::new(false),
            time_sync: AtomicU64::new(0),
            time_expires: AtomicU64::new(0),
            bits: std::array::from_fn(|_| AtomicBool::new(false)),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Process one transition of the data line.
    ///
    /// `now_ms` is a monotonic millisecond timestamp captured when the edge
    /// occurred, `level` the line level after the transition. Safe to call
    /// from an interrupt callback: no locks, no allocation, bounded work.
    ///
    /// Out-of-bounds timing only clears the quality flag; the cursor and the
    /// bit buffer are left untouched so a single glitch cannot corrupt an
    /// otherwise good frame.
    pub fn handle_edge(&self, now_ms: u64, level: bool) {
        // Two pulse starts packed closer than the protocol allows
        if now_ms.wrapping_sub(self.pulse_start_previous.load(Relaxed)) < PULSE_DISTANCE_MIN_MS {
            self.signal_ok.store(false, Relaxed);
            return;
        }

        // Pulse narrower than any real carrier drop
        if now_ms.wrapping_sub(self.pulse_start.load(Relaxed)) < PULSE_WIDTH_MIN_MS {
            self.signal_ok.store(false, Relaxed);
            return;
        }

        self.signal_ok.store(true, Relaxed);

        let previous = self.level_previous.load(Relaxed);
        if level && !previous {
            // Pulse start: rising edge
            self.level_previous.store(true, Relaxed);
            let previous_start = self.pulse_start.load(Relaxed);
            self.pulse_start_previous.store(previous_start, Relaxed);
            self.pulse_start.store(now_ms, Relaxed);

            if now_ms.wrapping_sub(previous_start) > SYNC_GAP_MS {
                // Missing 59th-second pulse: this edge opens a new minute
                self.cursor.store(0, Relaxed);
                self.time_sync.store(now_ms, Relaxed);
                self.time_expires.store(now_ms + STALE_AFTER_MS, Relaxed);
            } else {
                let pos = self.cursor.load(Relaxed);
                self.cursor.store((pos + 1) % FRAME_SLOTS, Relaxed);
            }
        } else if !level && previous {
            // Pulse end: falling edge classifies the bit by width
            self.level_previous.store(false, Relaxed);
            self.pulse_end.store(now_ms, Relaxed);

            let width = now_ms.wrapping_sub(self.pulse_start.load(Relaxed));
            let pos = self.cursor.load(Relaxed);
            self.bits[pos].store(width > PULSE_SPLIT_MS, Relaxed);
        }
        // A repeated read of the same level is a no-op
    }

    /// Whether pulses are currently arriving with plausible timing.
    ///
    /// Lazily re-evaluated: if more than the maximum pulse gap has elapsed
    /// since the last pulse start, the quality flag is forced to false before
    /// being returned.
    pub fn has_signal(&self, now_ms: u64) -> bool {
        if now_ms.wrapping_sub(self.pulse_start.load(Relaxed)) > PULSE_DISTANCE_MAX_MS {
            self.signal_ok.store(false, Relaxed);
        }
        self.signal_ok.load(Relaxed)
    }

    /// Whether the buffer currently holds a trustworthy time.
    ///
    /// Requires a recorded minute sync, a decoded time younger than the
    /// staleness window, enough filled slots to cover the hour field, and
    /// clean parity. Each check is independent and side-effect free.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        // No minute sync seen yet
        if self.time_sync.load(Relaxed) == 0 {
            return false;
        }

        // Decoded time is too old to trust
        if now_ms >= self.time_expires.load(Relaxed) {
            return false;
        }

        // Hour field not fully received yet
        if self.cursor.load(Relaxed) < MIN_SLOTS_FOR_TIME {
            return false;
        }

        self.parity_ok()
    }

    /// Second slot currently being filled.
    ///
    /// This is the frame cursor, a coarse seconds-within-minute indicator,
    /// not an elapsed-seconds count.
    pub fn second(&self) -> usize {
        self.cursor.load(Relaxed)
    }

    /// Decoded minute, derived from [`minute_of_day`](Self::minute_of_day).
    pub fn minute(&self) -> i32 {
        (self.minute_of_day() + 60) % 60
    }

    /// Decoded hour, derived from [`minute_of_day`](Self::minute_of_day).
    pub fn hour(&self) -> i32 {
        (self.minute_of_day() / 60) % 24
    }

    /// Decode the minute of day (0..=1439) from the bit buffer.
    ///
    /// Hour and minute are BCD-weighted sums over slots 29..=34 and 21..=27.
    /// One minute is subtracted because a completed frame describes the
    /// minute that just ended, not the one starting; the midnight frame
    /// (00:00) therefore wraps back to 23:59. Parity is deliberately not
    /// consulted here, callers gate on [`is_valid`](Self::is_valid).
    pub fn minute_of_day(&self) -> i32 {
        let bit = |i: usize| self.bits[i].load(Relaxed) as i32;

        let hour = bit(29) + 2 * bit(30) + 4 * bit(31) + 8 * bit(32) + 10 * bit(33) + 20 * bit(34);
        let minute = bit(21)
            + 2 * bit(22)
            + 4 * bit(23)
            + 8 * bit(24)
            + 10 * bit(25)
            + 20 * bit(26)
            + 40 * bit(27);

        let minute_of_day = hour * 60 + minute - 1;
        if minute_of_day < 0 {
            23 * 60 + 59
        } else {
            minute_of_day
        }
    }

    /// Reset all timing state, the quality flag, and the bit buffer.
    ///
    /// After a clear the decoder reports no signal and no valid time until a
    /// fresh minute sync arrives.
    pub fn clear(&self) {
        self.time_sync.store(0, Relaxed);
        self.time_expires.store(0, Relaxed);

        self.pulse_start.store(0, Relaxed);
        self.pulse_start_previous.store(0, Relaxed);
        self.pulse_end.store(0, Relaxed);

        self.level_previous.store(false, Relaxed);
        self.signal_ok.store(false, Relaxed);
        self.cursor.store(0, Relaxed);

        for bit in &self.bits {
            bit.store(false, Relaxed);
        }
    }

    /// Check the fixed marker slots and the minute and hour parity fields.
    ///
    /// Slot 0 must be short and slot 20 long (start-of-time marker). Slots
    /// 28 and 35 must make the minute and hour fields even. The date fields
    /// past slot 35 carry their own parity but are never decoded, so they
    /// are not checked. Any single mismatch rejects the whole frame.
    fn parity_ok(&self) -> bool {
        let bit = |i: usize| self.bits[i].load(Relaxed);

        let mut parity_ok = true;

        // Fixed values for second 0 and 20
        if bit(0) {
            parity_ok = false;
        }
        if !bit(20) {
            parity_ok = false;
        }

        // Minute parity
        let minute_sum = (21..=27).filter(|&i| bit(i)).count();
        if bit(28) != (minute_sum & 1 == 1) {
            parity_ok = false;
        }

        // Hour parity
        let hour_sum = (29..=34).filter(|&i| bit(i)).count();
        if bit(35) != (hour_sum & 1 == 1) {
            parity_ok = false;
        }

        parity_ok
    }
}

impl Default for Dcf77Decoder {
    fn default() -> Self {
        Self::new()
    }
}
