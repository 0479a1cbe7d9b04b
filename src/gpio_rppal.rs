// src/gpio_rppal.rs
use radio_clock_lib::decoder::Dcf77Decoder;
use radio_clock_lib::receiver::{EdgeSource, MonotonicClock, PowerPin, ReceiverError};
use rppal::gpio::{Gpio, InputPin, Level, OutputPin, Trigger};
use std::sync::Arc;

pub struct RppalPowerPin {
    pin: OutputPin,
}

pub struct RppalEdgeSource {
    pin: InputPin,
}

impl RppalPowerPin {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self, ReceiverError> {
        let mut pin = gpio
            .get(bcm)
            .map_err(|e| ReceiverError::Gpio(e.to_string()))?
            .into_output();
        // PON is active low; park the module powered off until start()
        pin.set_high();
        Ok(Self { pin })
    }
}

impl RppalEdgeSource {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self, ReceiverError> {
        let pin = gpio
            .get(bcm)
            .map_err(|e| ReceiverError::Gpio(e.to_string()))?
            .into_input();
        Ok(Self { pin })
    }
}

impl PowerPin for RppalPowerPin {
    fn set_high(&mut self) -> Result<(), ReceiverError> {
        self.pin.set_high();
        Ok(())
    }
    fn set_low(&mut self) -> Result<(), ReceiverError> {
        self.pin.set_low();
        Ok(())
    }
}

impl EdgeSource for RppalEdgeSource {
    fn attach(
        &mut self,
        decoder: Arc<Dcf77Decoder>,
        clock: MonotonicClock,
    ) -> Result<(), ReceiverError> {
        self.pin
            .set_async_interrupt(Trigger::Both, move |level| {
                decoder.handle_edge(clock.now_ms(), level == Level::High);
            })
            .map_err(|e| ReceiverError::Gpio(e.to_string()))
    }

    fn detach(&mut self) -> Result<(), ReceiverError> {
        self.pin
            .clear_async_interrupt()
            .map_err(|e| ReceiverError::Gpio(e.to_string()))
    }
}
