//! Outbound MIDI
//!
//! `Output` is a cheap, cloneable handle on a controller's MIDI sink. Event
//! handlers keep a clone so they can light LEDs in response to presses.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::address::{Address, GridAddress, LinearAddress};
use crate::error::Result;
use crate::led::{self, ColourSpec, EffectSpec, LedMessage};
use crate::midi::{format_hex, MidiMessage};
use crate::profile::{ControlClass, ControllerProfile};

/// Delay between LED writes in a slow reset
const RESET_STEP: Duration = Duration::from_millis(5);

/// Where outbound bytes go
pub trait MidiSink: Send {
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// Shared handle for writing to one controller
#[derive(Clone)]
pub struct Output {
    profile: &'static ControllerProfile,
    sink: Arc<Mutex<Box<dyn MidiSink>>>,
}

impl Output {
    pub fn new(profile: &'static ControllerProfile, sink: impl MidiSink + 'static) -> Self {
        Self {
            profile,
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn profile(&self) -> &'static ControllerProfile {
        self.profile
    }

    /// Send a message; failures are logged, not returned
    pub fn send(&self, message: &MidiMessage) {
        let data = message.encode();
        match self.sink.lock().send(&data) {
            Ok(()) => debug!("Sent: {} | {}", format_hex(&data), message),
            Err(e) => warn!("Failed to send {} to {}: {}", message, self.profile, e),
        }
    }

    pub fn send_led(&self, led: LedMessage) {
        self.send(&led.to_midi());
    }

    /// Validate, encode and send one LED write
    pub fn set_led(
        &self,
        class: ControlClass,
        address: Address,
        colour: &ColourSpec,
        effect: Option<&EffectSpec>,
    ) -> Result<()> {
        let led = led::encode(self.profile, class, address, colour, effect)?;
        self.send_led(led);
        Ok(())
    }

    /// Turn off every LED of a class
    pub fn reset_all_leds(&self, class: ControlClass) -> Result<()> {
        for led in led::reset_all(self.profile, class)? {
            self.send_led(led);
        }
        Ok(())
    }

    /// Turn off every LED on the device
    ///
    /// A slow reset paces the writes; some units drop messages sent back to back.
    /// It blocks the calling thread, so async code should use
    /// [`reset_paced`](Self::reset_paced) instead.
    pub fn reset(&self, fast: bool) {
        for note in self.profile.led_notes() {
            self.send_led(LedMessage::off(note));
            if !fast {
                std::thread::sleep(RESET_STEP);
            }
        }
    }

    /// Slow reset that yields to the runtime between writes
    pub async fn reset_paced(&self) {
        for note in self.profile.led_notes() {
            self.send_led(LedMessage::off(note));
            tokio::time::sleep(RESET_STEP).await;
        }
    }

    pub fn grid_buttons(&self) -> GridButtons<'_> {
        GridButtons { output: self }
    }

    pub fn side_buttons(&self) -> Buttons<'_> {
        self.buttons(ControlClass::SideButton)
    }

    pub fn lower_buttons(&self) -> Buttons<'_> {
        self.buttons(ControlClass::LowerButton)
    }

    pub fn mute_buttons(&self) -> Buttons<'_> {
        self.buttons(ControlClass::MuteButton)
    }

    pub fn rec_arm_buttons(&self) -> Buttons<'_> {
        self.buttons(ControlClass::RecArmButton)
    }

    pub fn bank_buttons(&self) -> Buttons<'_> {
        self.buttons(ControlClass::BankButton)
    }

    pub fn buttons(&self, class: ControlClass) -> Buttons<'_> {
        Buttons { output: self, class }
    }
}

/// The 8x8 grid LEDs
pub struct GridButtons<'a> {
    output: &'a Output,
}

impl GridButtons<'_> {
    /// Set a grid LED with the device's default effect
    pub fn set_led(&self, x: usize, y: usize, colour: impl Into<ColourSpec>) -> Result<()> {
        self.output
            .set_led(ControlClass::Grid, GridAddress::new(x, y).into(), &colour.into(), None)
    }

    pub fn set_led_with_effect(
        &self,
        x: usize,
        y: usize,
        colour: impl Into<ColourSpec>,
        effect: impl Into<EffectSpec>,
    ) -> Result<()> {
        self.output.set_led(
            ControlClass::Grid,
            GridAddress::new(x, y).into(),
            &colour.into(),
            Some(&effect.into()),
        )
    }

    /// Turn one grid LED off, on channel 0 even where effects exist
    pub fn reset_led(&self, x: usize, y: usize) -> Result<()> {
        let has_effects = self
            .output
            .profile
            .leds(ControlClass::Grid)
            .is_some_and(|leds| leds.has_effects());
        let no_effect = EffectSpec::Numeric(0);
        self.output.set_led(
            ControlClass::Grid,
            GridAddress::new(x, y).into(),
            &ColourSpec::Numeric(0),
            has_effects.then_some(&no_effect),
        )
    }

    pub fn reset_all_leds(&self) -> Result<()> {
        self.output.reset_all_leds(ControlClass::Grid)
    }
}

/// LEDs of one linear button class
pub struct Buttons<'a> {
    output: &'a Output,
    class: ControlClass,
}

impl Buttons<'_> {
    pub fn set_led(&self, index: LinearAddress, colour: impl Into<ColourSpec>) -> Result<()> {
        self.output.set_led(self.class, index.into(), &colour.into(), None)
    }

    pub fn reset_led(&self, index: LinearAddress) -> Result<()> {
        self.output.set_led(self.class, index.into(), &ColourSpec::Numeric(0), None)
    }

    pub fn reset_all_leds(&self) -> Result<()> {
        self.output.reset_all_leds(self.class)
    }
}
