//! Controller profiles
//!
//! Static mapping tables for each supported device: which MIDI note or
//! controller number belongs to which physical control, and which symbolic
//! LED colours/effects each control class accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic name to numeric code, in declaration order
pub type CodeTable = &'static [(&'static str, u8)];

/// A class of physical control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlClass {
    Grid,
    Fader,
    SideButton,
    LowerButton,
    ShiftButton,
    Knob,
    MuteButton,
    SoloButton,
    RecArmButton,
    BankButton,
}

impl fmt::Display for ControlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlClass::Grid => "Grid Button",
            ControlClass::Fader => "Fader",
            ControlClass::SideButton => "Side Button",
            ControlClass::LowerButton => "Lower Button",
            ControlClass::ShiftButton => "Shift Button",
            ControlClass::Knob => "Knob",
            ControlClass::MuteButton => "Mute Button",
            ControlClass::SoloButton => "Solo Button",
            ControlClass::RecArmButton => "Record Arm Button",
            ControlClass::BankButton => "Bank Button",
        };
        f.write_str(name)
    }
}

/// Which kind of channel message a control sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Note,
    ControlChange,
}

/// Colours (and optionally effects) a class of LEDs accepts
#[derive(Debug, PartialEq, Eq)]
pub struct LedTable {
    pub colours: CodeTable,
    /// Highest numeric colour code the device accepts
    pub max_colour: u8,
    /// Empty when the LEDs have no effect channel
    pub effects: CodeTable,
    pub max_effect: u8,
    /// Effect used when the caller gives none
    pub default_effect: u8,
}

impl LedTable {
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// Look up a symbolic name in a code table
pub fn lookup_code(table: CodeTable, name: &str) -> Option<u8> {
    table.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
}

/// Ordered table of one linear control class
#[derive(Debug, PartialEq, Eq)]
pub struct ControlTable {
    pub class: ControlClass,
    pub source: Source,
    pub numbers: &'static [u8],
    pub leds: Option<LedTable>,
}

/// The 8x8 grid: `notes[x][y]` is the note of cell (x, y)
#[derive(Debug, PartialEq, Eq)]
pub struct GridTable {
    pub notes: [[u8; 8]; 8],
    pub leds: LedTable,
}

impl GridTable {
    /// Lowest and highest note of the grid
    pub fn note_range(&self) -> (u8, u8) {
        let notes = self.notes.iter().flatten();
        let min = notes.clone().copied().min().unwrap_or(0);
        let max = notes.copied().max().unwrap_or(0);
        (min, max)
    }
}

/// Supported device models
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    ApcMiniMk2,
    ApcMini,
    MidiMix,
}

impl Model {
    pub fn profile(self) -> &'static ControllerProfile {
        match self {
            Model::ApcMiniMk2 => &APC_MINI_MK2,
            Model::ApcMini => &APC_MINI,
            Model::MidiMix => &MIDI_MIX,
        }
    }
}

/// Everything the library knows about one device variant
#[derive(Debug, PartialEq, Eq)]
pub struct ControllerProfile {
    pub name: &'static str,
    pub model: Model,
    /// Model byte of the identity reply, after the Akai manufacturer id
    pub model_id: u8,
    pub grid: Option<GridTable>,
    /// Linear tables; notes are classified in this order
    pub controls: &'static [ControlTable],
}

impl ControllerProfile {
    /// Table of a linear class, if the device has one
    pub fn table(&self, class: ControlClass) -> Option<&ControlTable> {
        self.controls.iter().find(|t| t.class == class)
    }

    /// LED table of a class, if its controls have LEDs on this device
    pub fn leds(&self, class: ControlClass) -> Option<&LedTable> {
        match class {
            ControlClass::Grid => self.grid.as_ref().map(|g| &g.leds),
            _ => self.table(class).and_then(|t| t.leds.as_ref()),
        }
    }

    pub fn has_class(&self, class: ControlClass) -> bool {
        match class {
            ControlClass::Grid => self.grid.is_some(),
            _ => self.table(class).is_some(),
        }
    }

    /// Every note that drives an LED, grid first
    pub fn led_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self
            .grid
            .iter()
            .flat_map(|g| g.notes.iter().flatten().copied())
            .collect();
        notes.sort_unstable();
        for table in self.controls.iter().filter(|t| t.leds.is_some()) {
            notes.extend_from_slice(table.numbers);
        }
        notes
    }
}

impl fmt::Display for ControllerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Row-major grid: note n sits at (n / 8, n % 8)
const SEQUENTIAL_GRID: [[u8; 8]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [8, 9, 10, 11, 12, 13, 14, 15],
    [16, 17, 18, 19, 20, 21, 22, 23],
    [24, 25, 26, 27, 28, 29, 30, 31],
    [32, 33, 34, 35, 36, 37, 38, 39],
    [40, 41, 42, 43, 44, 45, 46, 47],
    [48, 49, 50, 51, 52, 53, 54, 55],
    [56, 57, 58, 59, 60, 61, 62, 63],
];

const APC_FADERS: &[u8] = &[48, 49, 50, 51, 52, 53, 54, 55, 56];

// APC Mini mk2

const MK2_GRID_COLOURS: CodeTable = &[
    ("off", 0),
    ("white", 3),
    ("red", 5),
    ("orange", 9),
    ("yellow", 13),
    ("green", 17),
    ("lime", 21),
    ("lime2", 25),
    ("aqua green", 29),
    ("cyan", 33),
    ("sky blue", 36),
    ("blue", 37),
    ("blue2", 41),
    ("blue3", 45),
    ("magenta", 53),
    ("pink", 57),
    ("vivid green", 73),
];

const MK2_GRID_EFFECTS: CodeTable = &[
    ("brightness_10", 0),
    ("brightness_25", 1),
    ("brightness_50", 2),
    ("brightness_65", 3),
    ("brightness_75", 4),
    ("brightness_90", 5),
    ("brightness_100", 6),
    ("bright", 6),
    ("dimm", 2),
    ("pulse_1_16", 7),
    ("pulse_1_8", 8),
    ("pulse_1_4", 9),
    ("pulse_1_2", 10),
    ("pulse", 10),
    ("blink_1_24", 11),
    ("blink_1_16", 12),
    ("blink_1_8", 13),
    ("blink_1_4", 14),
    ("blink_1_2", 15),
    ("blink", 15),
];

const MK2_SIDE_COLOURS: CodeTable = &[("on", 1), ("off", 0), ("green", 1), ("green_blinking", 2)];

const MK2_LOWER_COLOURS: CodeTable = &[("on", 1), ("off", 0), ("red", 1), ("red_blinking", 2)];

pub static APC_MINI_MK2: ControllerProfile = ControllerProfile {
    name: "Akai APC Mini mk2",
    model: Model::ApcMiniMk2,
    model_id: 0x4F,
    grid: Some(GridTable {
        notes: SEQUENTIAL_GRID,
        leds: LedTable {
            colours: MK2_GRID_COLOURS,
            max_colour: 127,
            effects: MK2_GRID_EFFECTS,
            max_effect: 15,
            default_effect: 6,
        },
    }),
    controls: &[
        ControlTable {
            class: ControlClass::Fader,
            source: Source::ControlChange,
            numbers: APC_FADERS,
            leds: None,
        },
        ControlTable {
            class: ControlClass::SideButton,
            source: Source::Note,
            numbers: &[112, 113, 114, 115, 116, 117, 118, 119],
            leds: Some(LedTable {
                colours: MK2_SIDE_COLOURS,
                max_colour: 127,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::LowerButton,
            source: Source::Note,
            numbers: &[100, 101, 102, 103, 104, 105, 106, 107],
            leds: Some(LedTable {
                colours: MK2_LOWER_COLOURS,
                max_colour: 127,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::ShiftButton,
            source: Source::Note,
            numbers: &[122],
            leds: None,
        },
    ],
};

// APC Mini (first generation)

const MK1_GRID_COLOURS: CodeTable = &[
    ("off", 0),
    ("green", 1),
    ("green_blink", 2),
    ("red", 3),
    ("red_blink", 4),
    ("yellow", 5),
    ("yellow_blink", 6),
];

const MK1_BUTTON_COLOURS: CodeTable = &[("off", 0), ("on", 1), ("blink", 2)];

pub static APC_MINI: ControllerProfile = ControllerProfile {
    name: "Akai APC Mini",
    model: Model::ApcMini,
    model_id: 0x28,
    grid: Some(GridTable {
        notes: SEQUENTIAL_GRID,
        leds: LedTable {
            colours: MK1_GRID_COLOURS,
            max_colour: 6,
            effects: &[],
            max_effect: 0,
            default_effect: 0,
        },
    }),
    controls: &[
        ControlTable {
            class: ControlClass::Fader,
            source: Source::ControlChange,
            numbers: APC_FADERS,
            leds: None,
        },
        ControlTable {
            class: ControlClass::SideButton,
            source: Source::Note,
            numbers: &[82, 83, 84, 85, 86, 87, 88, 89],
            leds: Some(LedTable {
                colours: MK1_BUTTON_COLOURS,
                max_colour: 2,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::LowerButton,
            source: Source::Note,
            numbers: &[64, 65, 66, 67, 68, 69, 70, 71],
            leds: Some(LedTable {
                colours: MK1_BUTTON_COLOURS,
                max_colour: 2,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::ShiftButton,
            source: Source::Note,
            numbers: &[98],
            leds: None,
        },
    ],
};

// MIDI Mix

const MIDI_MIX_LEDS: CodeTable = &[("off", 0), ("on", 1)];

pub static MIDI_MIX: ControllerProfile = ControllerProfile {
    name: "Akai MIDI Mix",
    model: Model::MidiMix,
    model_id: 0x31,
    grid: None,
    controls: &[
        ControlTable {
            class: ControlClass::Fader,
            source: Source::ControlChange,
            numbers: &[19, 23, 27, 31, 49, 53, 57, 61, 62],
            leds: None,
        },
        // Three rows of eight, top row first
        ControlTable {
            class: ControlClass::Knob,
            source: Source::ControlChange,
            numbers: &[
                16, 20, 24, 28, 46, 50, 54, 58, //
                17, 21, 25, 29, 47, 51, 55, 59, //
                18, 22, 26, 30, 48, 52, 56, 60,
            ],
            leds: None,
        },
        ControlTable {
            class: ControlClass::MuteButton,
            source: Source::Note,
            numbers: &[1, 4, 7, 10, 13, 16, 19, 22],
            leds: Some(LedTable {
                colours: MIDI_MIX_LEDS,
                max_colour: 1,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::RecArmButton,
            source: Source::Note,
            numbers: &[3, 6, 9, 12, 15, 18, 21, 24],
            leds: Some(LedTable {
                colours: MIDI_MIX_LEDS,
                max_colour: 1,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        ControlTable {
            class: ControlClass::BankButton,
            source: Source::Note,
            numbers: &[25, 26],
            leds: Some(LedTable {
                colours: MIDI_MIX_LEDS,
                max_colour: 1,
                effects: &[],
                max_effect: 0,
                default_effect: 0,
            }),
        },
        // Single SOLO key; the mute row sends 2, 5, ..., 23 while it is held
        ControlTable {
            class: ControlClass::SoloButton,
            source: Source::Note,
            numbers: &[27],
            leds: None,
        },
    ],
};
