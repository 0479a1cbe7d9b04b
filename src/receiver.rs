//! # Receiver Lifecycle and Hardware Seam
//!
//! The decoder itself never touches hardware. This module defines the two
//! narrow traits the host platform must provide, the power line driving the
//! receiver module and the edge-interrupt source feeding it, and wires them
//! together with a shared monotonic clock in [`Receiver`].
//!
//! The traits keep the GPIO backend swappable: the binary plugs in `rppal`
//! implementations on the Pi, the tests plug in mocks.

use crate::decoder::Dcf77Decoder;
use crate::StatusSnapshot;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors surfaced by a hardware backend.
#[derive(Error, Debug)]
pub enum ReceiverError {
    /// GPIO access failed (permissions, busy line, missing chip)
    #[error("gpio error: {0}")]
    Gpio(String),
}

/// Monotonic millisecond clock shared by the edge callback and the pollers.
///
/// Timestamps count from the moment the clock was created. Wall-clock jumps
/// (NTP, DST) never affect it, which matters because the decoder classifies
/// pulses purely by timestamp differences.
#[derive(Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was created.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Output line powering the receiver module.
///
/// The PON input on common DCF77 modules is active low: driving the line low
/// turns the receiver on, high shuts it down.
pub trait PowerPin {
    fn set_high(&mut self) -> Result<(), ReceiverError>;
    fn set_low(&mut self) -> Result<(), ReceiverError>;
}

/// Edge-interrupt source for the demodulated data line.
///
/// `attach` must arrange for `decoder.handle_edge(clock.now_ms(), level)` to
/// run on every rising and falling transition, with the timestamp captured
/// at the moment the edge occurred. `detach` stops delivery.
pub trait EdgeSource {
    fn attach(
        &mut self,
        decoder: Arc<Dcf77Decoder>,
        clock: MonotonicClock,
    ) -> Result<(), ReceiverError>;
    fn detach(&mut self) -> Result<(), ReceiverError>;
}

/// A DCF77 receiver: decoder, clock, and the two hardware lines.
///
/// Owns the lifecycle. `start` powers the module, clears decoder state, and
/// attaches the edge callback; `stop` detaches, clears, and powers off;
/// `restart` clears state only, forcing re-acquisition without touching
/// power or registration. All three are synchronous and may be repeated.
pub struct Receiver<P: PowerPin, E: EdgeSource> {
    decoder: Arc<Dcf77Decoder>,
    clock: MonotonicClock,
    power: P,
    edges: E,
}

impl<P: PowerPin, E: EdgeSource> Receiver<P, E> {
    pub fn new(power: P, edges: E) -> Self {
        Receiver {
            decoder: Arc::new(Dcf77Decoder::new()),
            clock: MonotonicClock::new(),
            power,
            edges,
        }
    }

    /// Power the module on and begin decoding edges.
    pub fn start(&mut self) -> Result<(), ReceiverError> {
        self.power.set_low()?;
        self.decoder.clear();
        self.edges.attach(self.decoder.clone(), self.clock.clone())
    }

    /// Stop decoding and power the module off.
    pub fn stop(&mut self) -> Result<(), ReceiverError> {
        self.edges.detach()?;
        self.decoder.clear();
        self.power.set_high()
    }

    /// Force re-acquisition: clear decoder state, keep power and the edge
    /// callback untouched.
    pub fn restart(&self) {
        self.decoder.clear();
    }

    /// Whether pulses are currently arriving with plausible timing.
    pub fn has_signal(&self) -> bool {
        self.decoder.has_signal(self.clock.now_ms())
    }

    /// Whether a complete, fresh, parity-clean time is available.
    pub fn is_valid(&self) -> bool {
        self.decoder.is_valid(self.clock.now_ms())
    }

    /// Second slot currently being filled.
    pub fn second(&self) -> usize {
        self.decoder.second()
    }

    /// Decoded minute (0..=59).
    pub fn minute(&self) -> i32 {
        self.decoder.minute()
    }

    /// Decoded hour (0..=23).
    pub fn hour(&self) -> i32 {
        self.decoder.hour()
    }

    /// Decoded minute of day (0..=1439).
    pub fn minute_of_day(&self) -> i32 {
        self.decoder.minute_of_day()
    }

    /// Capture the consumer-visible state as of now.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::capture(&self.decoder, self.clock.now_ms())
    }

    /// Handle to the shared decoder, e.g. for diagnostics.
    pub fn decoder(&self) -> Arc<Dcf77Decoder> {
        self.decoder.clone()
    }
}
