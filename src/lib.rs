//! akai-pro
//!
//! Typed events and LED control for Akai APC Mini, APC Mini mk2 and MIDI Mix
//! controllers. Raw MIDI from the device is classified into [`ControlEvent`]s
//! and handed to one registered handler; LED requests are validated against the
//! device's colour tables and encoded back into MIDI.

pub mod address;
pub mod classify;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod event;
pub mod led;
pub mod midi;
pub mod output;
pub mod profile;

pub use address::{Address, GridAddress, LinearAddress};
pub use controller::{Controller, Readiness};
pub use error::{Error, Result};
pub use event::ControlEvent;
pub use led::{CodeSpec, ColourSpec, EffectSpec, LedMessage};
pub use output::{MidiSink, Output};
pub use profile::{ControlClass, ControllerProfile, Model, APC_MINI, APC_MINI_MK2, MIDI_MIX};
