//! Control events
//!
//! One value per incoming control message. Each variant carries the profile
//! of the controller that produced it, for display only.

use std::fmt;

use crate::address::{GridAddress, LinearAddress};
use crate::profile::{ControlClass, ControllerProfile};

/// A classified control message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    GridButton {
        controller: &'static ControllerProfile,
        address: GridAddress,
        pressed: bool,
    },
    Fader {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        value: u8,
    },
    Knob {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        value: u8,
    },
    SideButton {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        pressed: bool,
    },
    LowerButton {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        pressed: bool,
    },
    ShiftButton {
        controller: &'static ControllerProfile,
        pressed: bool,
    },
    MuteButton {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        pressed: bool,
    },
    /// The MIDI Mix SOLO key
    SoloButton {
        controller: &'static ControllerProfile,
        pressed: bool,
    },
    RecArmButton {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        pressed: bool,
    },
    BankButton {
        controller: &'static ControllerProfile,
        index: LinearAddress,
        pressed: bool,
    },
}

impl ControlEvent {
    /// Build a button event for a linear class
    ///
    /// Returns `None` for classes that do not carry a pressed state.
    pub fn button(
        controller: &'static ControllerProfile,
        class: ControlClass,
        index: LinearAddress,
        pressed: bool,
    ) -> Option<Self> {
        let event = match class {
            ControlClass::SideButton => ControlEvent::SideButton { controller, index, pressed },
            ControlClass::LowerButton => ControlEvent::LowerButton { controller, index, pressed },
            ControlClass::ShiftButton => ControlEvent::ShiftButton { controller, pressed },
            ControlClass::MuteButton => ControlEvent::MuteButton { controller, index, pressed },
            ControlClass::SoloButton => ControlEvent::SoloButton { controller, pressed },
            ControlClass::RecArmButton => ControlEvent::RecArmButton { controller, index, pressed },
            ControlClass::BankButton => ControlEvent::BankButton { controller, index, pressed },
            ControlClass::Grid | ControlClass::Fader | ControlClass::Knob => return None,
        };
        Some(event)
    }

    /// Build a continuous-control event
    pub fn value(
        controller: &'static ControllerProfile,
        class: ControlClass,
        index: LinearAddress,
        value: u8,
    ) -> Option<Self> {
        match class {
            ControlClass::Fader => Some(ControlEvent::Fader { controller, index, value }),
            ControlClass::Knob => Some(ControlEvent::Knob { controller, index, value }),
            _ => None,
        }
    }

    pub fn class(&self) -> ControlClass {
        match self {
            ControlEvent::GridButton { .. } => ControlClass::Grid,
            ControlEvent::Fader { .. } => ControlClass::Fader,
            ControlEvent::Knob { .. } => ControlClass::Knob,
            ControlEvent::SideButton { .. } => ControlClass::SideButton,
            ControlEvent::LowerButton { .. } => ControlClass::LowerButton,
            ControlEvent::ShiftButton { .. } => ControlClass::ShiftButton,
            ControlEvent::MuteButton { .. } => ControlClass::MuteButton,
            ControlEvent::SoloButton { .. } => ControlClass::SoloButton,
            ControlEvent::RecArmButton { .. } => ControlClass::RecArmButton,
            ControlEvent::BankButton { .. } => ControlClass::BankButton,
        }
    }

    pub fn controller(&self) -> &'static ControllerProfile {
        match *self {
            ControlEvent::GridButton { controller, .. }
            | ControlEvent::Fader { controller, .. }
            | ControlEvent::Knob { controller, .. }
            | ControlEvent::SideButton { controller, .. }
            | ControlEvent::LowerButton { controller, .. }
            | ControlEvent::ShiftButton { controller, .. }
            | ControlEvent::MuteButton { controller, .. }
            | ControlEvent::SoloButton { controller, .. }
            | ControlEvent::RecArmButton { controller, .. }
            | ControlEvent::BankButton { controller, .. } => controller,
        }
    }

    /// Pressed state of buttons, `None` for faders and knobs
    pub fn pressed(&self) -> Option<bool> {
        match *self {
            ControlEvent::GridButton { pressed, .. }
            | ControlEvent::SideButton { pressed, .. }
            | ControlEvent::LowerButton { pressed, .. }
            | ControlEvent::ShiftButton { pressed, .. }
            | ControlEvent::MuteButton { pressed, .. }
            | ControlEvent::SoloButton { pressed, .. }
            | ControlEvent::RecArmButton { pressed, .. }
            | ControlEvent::BankButton { pressed, .. } => Some(pressed),
            ControlEvent::Fader { .. } | ControlEvent::Knob { .. } => None,
        }
    }

    /// Linear index, `None` for grid, shift and solo events
    pub fn index(&self) -> Option<LinearAddress> {
        match *self {
            ControlEvent::Fader { index, .. }
            | ControlEvent::Knob { index, .. }
            | ControlEvent::SideButton { index, .. }
            | ControlEvent::LowerButton { index, .. }
            | ControlEvent::MuteButton { index, .. }
            | ControlEvent::RecArmButton { index, .. }
            | ControlEvent::BankButton { index, .. } => Some(index),
            ControlEvent::GridButton { .. }
            | ControlEvent::ShiftButton { .. }
            | ControlEvent::SoloButton { .. } => None,
        }
    }

    /// Knob position as (column, row), `None` for everything else
    pub fn knob_position(&self) -> Option<(usize, usize)> {
        match *self {
            ControlEvent::Knob { index, .. } => Some(knob_position(index)),
            _ => None,
        }
    }
}


impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controller = self.controller();
        match *self {
            ControlEvent::GridButton { address, pressed, .. } => {
                write!(f, "{} {} {} on {}", self.class(), address, state(pressed), controller)
            }
            ControlEvent::Fader { index, value, .. } => {
                write!(f, "{} {} changed to {} on {}", self.class(), index, value, controller)
            }
            ControlEvent::Knob { index, value, .. } => {
                let (column, row) = knob_position(index);
                write!(f, "{} {},{} changed to {} on {}", self.class(), column, row, value, controller)
            }
            ControlEvent::ShiftButton { pressed, .. } | ControlEvent::SoloButton { pressed, .. } => {
                write!(f, "{} {} on {}", self.class(), state(pressed), controller)
            }
            ControlEvent::SideButton { index, pressed, .. }
            | ControlEvent::LowerButton { index, pressed, .. }
            | ControlEvent::MuteButton { index, pressed, .. }
            | ControlEvent::RecArmButton { index, pressed, .. }
            | ControlEvent::BankButton { index, pressed, .. } => {
                write!(f, "{} {} {} on {}", self.class(), index, state(pressed), controller)
            }
        }
    }
}

/// Knob position on the MIDI Mix as (column, row)
fn knob_position(index: LinearAddress) -> (usize, usize) {
    (index % 8, index / 8)
}

fn state(pressed: bool) -> &'static str {
    if pressed {
        "pressed"
    } else {
        "released"
    }
}
