//! LED encoding
//!
//! Validates a colour/effect request against a control class and turns it into
//! the note-on that lights the LED: the note addresses the control, the
//! velocity carries the colour and, on the APC Mini mk2 grid, the channel
//! carries the effect.

use std::fmt;

use crate::address::{self, Address};
use crate::error::{Error, Result};
use crate::midi::MidiMessage;
use crate::profile::{lookup_code, CodeTable, ControlClass, ControllerProfile};

/// A colour or effect, given by name or by raw code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSpec {
    Numeric(i32),
    Named(String),
}

pub type ColourSpec = CodeSpec;
pub type EffectSpec = CodeSpec;

impl From<i32> for CodeSpec {
    fn from(code: i32) -> Self {
        CodeSpec::Numeric(code)
    }
}

impl From<&str> for CodeSpec {
    fn from(name: &str) -> Self {
        CodeSpec::Named(name.to_string())
    }
}

impl From<String> for CodeSpec {
    fn from(name: String) -> Self {
        CodeSpec::Named(name)
    }
}

impl fmt::Display for CodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSpec::Numeric(code) => write!(f, "{}", code),
            CodeSpec::Named(name) => f.write_str(name),
        }
    }
}

/// Outbound LED write: a note-on with these parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedMessage {
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl LedMessage {
    pub fn off(note: u8) -> Self {
        Self { note, velocity: 0, channel: 0 }
    }

    pub fn to_midi(self) -> MidiMessage {
        MidiMessage::NoteOn {
            channel: self.channel,
            note: self.note,
            velocity: self.velocity,
        }
    }
}

/// Named codes resolve through the table; numeric codes pass unchanged
fn resolve_named(spec: &CodeSpec, table: CodeTable) -> Option<i32> {
    match spec {
        CodeSpec::Numeric(code) => Some(*code),
        CodeSpec::Named(name) => lookup_code(table, name).map(i32::from),
    }
}

fn in_range(code: i32, max: u8) -> Option<u8> {
    u8::try_from(code).ok().filter(|c| *c <= max)
}

/// Build the LED write for one control
///
/// Names are resolved first (colour, then effect), then both codes are range
/// checked, and only then is the address looked up.
pub fn encode(
    profile: &ControllerProfile,
    class: ControlClass,
    address: Address,
    colour: &ColourSpec,
    effect: Option<&EffectSpec>,
) -> Result<LedMessage> {
    let leds = profile
        .leds(class)
        .ok_or(Error::InvalidControlClass { class, profile: profile.name })?;

    let invalid_colour = || Error::InvalidColour { class, colour: colour.to_string() };
    let invalid_effect = |effect: &EffectSpec| Error::InvalidEffect { class, effect: effect.to_string() };

    let colour_code = resolve_named(colour, leds.colours).ok_or_else(invalid_colour)?;

    let effect_code = match effect {
        None => None,
        Some(spec) if !leds.has_effects() => return Err(invalid_effect(spec)),
        Some(spec) => Some((spec, resolve_named(spec, leds.effects).ok_or_else(|| invalid_effect(spec))?)),
    };

    let velocity = in_range(colour_code, leds.max_colour).ok_or_else(invalid_colour)?;

    let channel = match effect_code {
        None => leds.default_effect,
        Some((spec, code)) => in_range(code, leds.max_effect).ok_or_else(|| invalid_effect(spec))?,
    };

    let note = address::address_to_note(profile, class, address)?;

    Ok(LedMessage { note, velocity, channel })
}

/// "Off" for every LED of a class, in table order
pub fn reset_all(profile: &ControllerProfile, class: ControlClass) -> Result<Vec<LedMessage>> {
    if profile.leds(class).is_none() {
        return Err(Error::InvalidControlClass { class, profile: profile.name });
    }

    address::addresses(profile, class)?
        .into_iter()
        .map(|address| address::address_to_note(profile, class, address).map(LedMessage::off))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::GridAddress;
    use crate::error::BadAddress;
    use crate::profile::{APC_MINI, APC_MINI_MK2, MIDI_MIX};

    fn grid(x: usize, y: usize) -> Address {
        Address::Grid(GridAddress::new(x, y))
    }

    #[test]
    fn test_named_colour_and_effect() {
        let led = encode(
            &APC_MINI_MK2,
            ControlClass::Grid,
            grid(0, 5),
            &"red".into(),
            Some(&"pulse".into()),
        )
        .unwrap();

        assert_eq!(led, LedMessage { note: 5, velocity: 5, channel: 10 });
        assert_eq!(led.to_midi().encode(), vec![0x9A, 5, 5]);
    }

    #[test]
    fn test_numeric_codes_pass_through() {
        let led = encode(
            &APC_MINI_MK2,
            ControlClass::Grid,
            grid(7, 7),
            &CodeSpec::Numeric(127),
            Some(&CodeSpec::Numeric(15)),
        )
        .unwrap();

        assert_eq!(led, LedMessage { note: 63, velocity: 127, channel: 15 });
    }

    #[test]
    fn test_default_effect_is_full_brightness() {
        let led = encode(&APC_MINI_MK2, ControlClass::Grid, grid(1, 0), &"green".into(), None).unwrap();

        assert_eq!(led, LedMessage { note: 8, velocity: 17, channel: 6 });
    }

    #[test]
    fn test_unknown_names_fail() {
        let err = encode(&APC_MINI_MK2, ControlClass::Grid, grid(0, 0), &"purple".into(), None).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidColour { class: ControlClass::Grid, colour: "purple".to_string() }
        );

        let err = encode(
            &APC_MINI_MK2,
            ControlClass::Grid,
            grid(0, 0),
            &"red".into(),
            Some(&"strobe".into()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEffect { class: ControlClass::Grid, effect: "strobe".to_string() }
        );
    }

    #[test]
    fn test_numeric_range_is_checked() {
        let colour = encode(&APC_MINI_MK2, ControlClass::Grid, grid(0, 0), &CodeSpec::Numeric(128), None);
        assert!(matches!(colour, Err(Error::InvalidColour { .. })));

        let negative = encode(&APC_MINI_MK2, ControlClass::Grid, grid(0, 0), &CodeSpec::Numeric(-1), None);
        assert!(matches!(negative, Err(Error::InvalidColour { .. })));

        let effect = encode(
            &APC_MINI_MK2,
            ControlClass::Grid,
            grid(0, 0),
            &CodeSpec::Numeric(5),
            Some(&CodeSpec::Numeric(16)),
        );
        assert!(matches!(effect, Err(Error::InvalidEffect { .. })));
    }

    #[test]
    fn test_narrow_ranges() {
        let mk1 = encode(&APC_MINI, ControlClass::Grid, grid(0, 0), &CodeSpec::Numeric(7), None);
        assert!(matches!(mk1, Err(Error::InvalidColour { .. })));

        let on = encode(&MIDI_MIX, ControlClass::MuteButton, Address::Linear(2), &"on".into(), None).unwrap();
        assert_eq!(on, LedMessage { note: 7, velocity: 1, channel: 0 });

        let too_bright = encode(&MIDI_MIX, ControlClass::MuteButton, Address::Linear(2), &CodeSpec::Numeric(2), None);
        assert!(matches!(too_bright, Err(Error::InvalidColour { .. })));
    }

    #[test]
    fn test_effect_rejected_without_effect_channel() {
        let err = encode(
            &APC_MINI_MK2,
            ControlClass::SideButton,
            Address::Linear(0),
            &"on".into(),
            Some(&"blink".into()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidEffect { class: ControlClass::SideButton, .. }));
    }

    #[test]
    fn test_values_are_checked_before_address() {
        // Both colour and address are bad; the colour is reported
        let err = encode(&APC_MINI_MK2, ControlClass::SideButton, Address::Linear(8), &"pink".into(), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColour { .. }));

        let err = encode(&APC_MINI_MK2, ControlClass::SideButton, Address::Linear(8), &"on".into(), None)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidAddress { class: ControlClass::SideButton, address: BadAddress::Index(8) }
        );
    }

    #[test]
    fn test_classes_without_leds() {
        for class in [ControlClass::Fader, ControlClass::ShiftButton, ControlClass::Knob] {
            let err = encode(&APC_MINI_MK2, class, Address::Linear(0), &"off".into(), None).unwrap_err();
            assert!(matches!(err, Error::InvalidControlClass { .. }), "{}", class);
        }
        assert!(reset_all(&MIDI_MIX, ControlClass::SoloButton).is_err());
    }

    #[test]
    fn test_reset_all_lower_buttons() {
        let leds = reset_all(&APC_MINI_MK2, ControlClass::LowerButton).unwrap();

        assert_eq!(
            leds,
            (100..=107).map(LedMessage::off).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_reset_all_grid() {
        let leds = reset_all(&APC_MINI_MK2, ControlClass::Grid).unwrap();

        assert_eq!(leds.len(), 64);
        assert!(leds.iter().all(|l| l.velocity == 0 && l.channel == 0));
        assert_eq!(leds.iter().map(|l| l.note).collect::<Vec<_>>(), (0..64).collect::<Vec<u8>>());
    }
}
