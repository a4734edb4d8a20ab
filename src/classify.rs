//! Event classification
//!
//! Maps one parsed MIDI message onto the control that sent it. Messages from
//! controls the profile does not know are dropped without error; devices
//! send the odd extra controller number and that is not worth failing over.

use tracing::trace;

use crate::address;
use crate::event::ControlEvent;
use crate::midi::MidiMessage;
use crate::profile::{ControllerProfile, Source};

/// Classify a message, or `None` if no known control sent it
pub fn classify(profile: &'static ControllerProfile, message: &MidiMessage) -> Option<ControlEvent> {
    let event = match *message {
        MidiMessage::ControlChange { cc, value, .. } => classify_control_change(profile, cc, value),
        MidiMessage::NoteOn { note, velocity, .. } => classify_note(profile, note, velocity > 0),
        MidiMessage::NoteOff { note, .. } => classify_note(profile, note, false),
        MidiMessage::SysEx { .. } => None,
    };

    if event.is_none() {
        trace!("Ignoring message from unmapped control: {}", message);
    }
    event
}

fn classify_control_change(profile: &'static ControllerProfile, cc: u8, value: u8) -> Option<ControlEvent> {
    profile
        .controls
        .iter()
        .filter(|t| t.source == Source::ControlChange)
        .find_map(|table| {
            let index = address::resolve_linear(profile, table.class, cc).ok()?;
            ControlEvent::value(profile, table.class, index, value)
        })
}

fn classify_note(profile: &'static ControllerProfile, note: u8, pressed: bool) -> Option<ControlEvent> {
    if let Some(grid) = &profile.grid {
        let (low, high) = grid.note_range();
        if (low..=high).contains(&note) {
            if let Ok(address) = address::resolve_grid(profile, note) {
                return Some(ControlEvent::GridButton { controller: profile, address, pressed });
            }
        }
    }

    profile
        .controls
        .iter()
        .filter(|t| t.source == Source::Note)
        .find_map(|table| {
            let index = address::resolve_linear(profile, table.class, note).ok()?;
            ControlEvent::button(profile, table.class, index, pressed)
        })
}
