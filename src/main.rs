//! # Radio Clock Application Entry Point
//!
//! This binary wires the DCF77 decoder library to real hardware on a
//! Raspberry Pi, or to a synthetic signal in development mode. Production
//! mode registers a GPIO edge interrupt for the receiver's data line and
//! polls the decoder on a fixed interval, printing one status line per poll.

// Test modules
#[cfg(test)]
mod tests;

#[cfg(all(target_os = "linux", feature = "hardware"))]
mod gpio_rppal;

// Application dependencies
use radio_clock_lib::{decoder::Dcf77Decoder, renderer, sim, StatusSnapshot};
use std::env;

/// Convert GPIO number to physical pin number for display
/// This is a simplified mapping for common pins
#[allow(dead_code)]
fn gpio_to_pin(gpio: u8) -> u8 {
    match gpio {
        4 => 7,   // Data (default)
        17 => 11, // Power (default)
        22 => 15, // Alternative data
        23 => 16, // Alternative power
        27 => 13,
        _ => 0, // Unknown
    }
}

/// Decode one synthetic minute frame and render the result.
///
/// Exercises the full decode path with no GPIO: generate the edge sequence
/// a live module would produce for the upcoming minute, feed it through the
/// decoder, and print the decoded status next to the wall clock.
fn run_simulated() {
    use chrono::{Local, Timelike};

    eprintln!("Simulated signal mode, no GPIO required");

    let decoder = Dcf77Decoder::new();

    // The transmitter announces the minute that begins as its frame ends,
    // so a frame finishing now carries the next wall-clock minute.
    let now = Local::now();
    let announced = (now.hour() * 60 + now.minute() + 1) % (24 * 60);
    let bits = sim::frame_bits(announced / 60, announced % 60);

    for (timestamp_ms, level) in sim::edges(10_000, &bits) {
        decoder.handle_edge(timestamp_ms, level);
    }

    // Poll shortly after the last pulse, like the real status loop would
    let poll_at = sim::sync_instant(10_000) + 59_000;
    let status = StatusSnapshot::capture(&decoder, poll_at);
    renderer::draw_ascii(&status);
    eprintln!("Wall clock is {}", now.format("%H:%M:%S"));
}

/// Start the receiver on real GPIO and poll it forever.
#[cfg(all(target_os = "linux", feature = "hardware"))]
fn run_hardware() -> anyhow::Result<()> {
    use radio_clock_lib::config::Config;
    use radio_clock_lib::receiver::Receiver;
    use std::thread;
    use std::time::Duration;

    // Load configuration for GPIO pins
    let config = Config::load();

    eprintln!("DCF77 receiver wiring:");
    eprintln!(
        "   Data: GPIO {} (Pin {})",
        config.receiver.data_pin,
        gpio_to_pin(config.receiver.data_pin)
    );
    eprintln!(
        "   Power (PON): GPIO {} (Pin {})",
        config.receiver.power_pin,
        gpio_to_pin(config.receiver.power_pin)
    );

    let gpio = rppal::gpio::Gpio::new().map_err(|e| anyhow::anyhow!("open GPIO: {e}"))?;
    let power = gpio_rppal::RppalPowerPin::new(&gpio, config.receiver.power_pin)?;
    let edges = gpio_rppal::RppalEdgeSource::new(&gpio, config.receiver.data_pin)?;

    let mut receiver = Receiver::new(power, edges);
    receiver.start()?;
    eprintln!("Receiver started; a clean lock takes one to two minutes");

    loop {
        thread::sleep(Duration::from_millis(config.poll.interval_ms));
        let status = receiver.snapshot();
        let stamp = chrono::Local::now().format("%H:%M:%S");
        println!("[{stamp}] {}", renderer::format_status(&status));
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    // Development mode: decode a synthetic frame without hardware
    let development_mode = env::args().any(|arg| arg == "--stdout");

    if development_mode {
        run_simulated();
        return Ok(());
    }

    // Production mode: talk to the receiver module over GPIO
    #[cfg(all(target_os = "linux", feature = "hardware"))]
    {
        run_hardware()?;
    }

    #[cfg(all(target_os = "linux", not(feature = "hardware")))]
    {
        eprintln!(
            "GPIO support not enabled. Rebuild with --features hardware to use a receiver module."
        );
        eprintln!("Showing a simulated decode instead:");
        run_simulated();
    }

    #[cfg(not(target_os = "linux"))]
    {
        eprintln!("Hardware mode is only available on Linux. Use --stdout for development mode.");
        eprintln!("Showing a simulated decode instead:");
        run_simulated();
    }

    Ok(())
}
