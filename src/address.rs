//! Address resolution
//!
//! Converts raw MIDI note/controller numbers into grid coordinates or linear
//! indices and back. Every function here is pure and fails instead of
//! coercing an out-of-range input.

use std::fmt;

use crate::error::{BadAddress, Error, Result};
use crate::profile::{ControlClass, ControllerProfile, GridTable};

/// A cell of the 8x8 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridAddress {
    pub x: usize,
    pub y: usize,
}

impl GridAddress {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Index into the ordered table of one linear control class
pub type LinearAddress = usize;

/// Address of any control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Grid(GridAddress),
    Linear(LinearAddress),
}

impl From<GridAddress> for Address {
    fn from(address: GridAddress) -> Self {
        Address::Grid(address)
    }
}

impl From<LinearAddress> for Address {
    fn from(index: LinearAddress) -> Self {
        Address::Linear(index)
    }
}

fn grid_table(profile: &ControllerProfile) -> Result<&GridTable> {
    profile.grid.as_ref().ok_or(Error::InvalidControlClass {
        class: ControlClass::Grid,
        profile: profile.name,
    })
}

fn linear_table(profile: &ControllerProfile, class: ControlClass) -> Result<&'_ [u8]> {
    let numbers = match class {
        ControlClass::Grid => None,
        _ => profile.table(class).map(|t| t.numbers),
    };
    numbers.ok_or(Error::InvalidControlClass { class, profile: profile.name })
}

/// Resolve a note to its grid cell
pub fn resolve_grid(profile: &ControllerProfile, note: u8) -> Result<GridAddress> {
    let grid = grid_table(profile)?;

    grid.notes
        .iter()
        .enumerate()
        .find_map(|(x, row)| row.iter().position(|&n| n == note).map(|y| GridAddress { x, y }))
        .ok_or(Error::InvalidAddress {
            class: ControlClass::Grid,
            address: BadAddress::Note(note),
        })
}

/// Note of a grid cell
pub fn grid_to_note(profile: &ControllerProfile, address: GridAddress) -> Result<u8> {
    let grid = grid_table(profile)?;

    grid.notes
        .get(address.x)
        .and_then(|row| row.get(address.y))
        .copied()
        .ok_or(Error::InvalidAddress {
            class: ControlClass::Grid,
            address: BadAddress::Grid { x: address.x, y: address.y },
        })
}

/// Resolve a note or controller number to its index within `class`
pub fn resolve_linear(
    profile: &ControllerProfile,
    class: ControlClass,
    number: u8,
) -> Result<LinearAddress> {
    linear_table(profile, class)?
        .iter()
        .position(|&n| n == number)
        .ok_or(Error::InvalidAddress { class, address: BadAddress::Note(number) })
}

/// Note or controller number at `index` within `class`
pub fn linear_to_note(
    profile: &ControllerProfile,
    class: ControlClass,
    index: LinearAddress,
) -> Result<u8> {
    linear_table(profile, class)?
        .get(index)
        .copied()
        .ok_or(Error::InvalidAddress { class, address: BadAddress::Index(index) })
}

/// Note of any address, checking that the address kind fits the class
pub fn address_to_note(
    profile: &ControllerProfile,
    class: ControlClass,
    address: Address,
) -> Result<u8> {
    match (class, address) {
        (ControlClass::Grid, Address::Grid(grid)) => grid_to_note(profile, grid),
        (ControlClass::Grid, Address::Linear(index)) => Err(Error::InvalidAddress {
            class,
            address: BadAddress::Index(index),
        }),
        (_, Address::Linear(index)) => linear_to_note(profile, class, index),
        (_, Address::Grid(grid)) => Err(Error::InvalidAddress {
            class,
            address: BadAddress::Grid { x: grid.x, y: grid.y },
        }),
    }
}

/// Every address of a class, in table order
pub fn addresses(profile: &ControllerProfile, class: ControlClass) -> Result<Vec<Address>> {
    match class {
        ControlClass::Grid => {
            let grid = grid_table(profile)?;
            Ok((0..grid.notes.len())
                .flat_map(|x| (0..grid.notes[x].len()).map(move |y| Address::Grid(GridAddress { x, y })))
                .collect())
        }
        _ => Ok((0..linear_table(profile, class)?.len()).map(Address::Linear).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{APC_MINI, APC_MINI_MK2, MIDI_MIX};
    use proptest::prelude::*;

    #[test]
    fn test_grid_resolution() {
        assert_eq!(resolve_grid(&APC_MINI_MK2, 5).unwrap(), GridAddress::new(0, 5));
        assert_eq!(resolve_grid(&APC_MINI_MK2, 8).unwrap(), GridAddress::new(1, 0));
        assert_eq!(resolve_grid(&APC_MINI_MK2, 63).unwrap(), GridAddress::new(7, 7));
        assert_eq!(grid_to_note(&APC_MINI_MK2, GridAddress::new(7, 0)).unwrap(), 56);
    }

    #[test]
    fn test_grid_out_of_range() {
        let err = resolve_grid(&APC_MINI_MK2, 64).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidAddress { class: ControlClass::Grid, address: BadAddress::Note(64) }
        );

        let err = grid_to_note(&APC_MINI_MK2, GridAddress::new(8, 0)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidAddress { class: ControlClass::Grid, address: BadAddress::Grid { x: 8, y: 0 } }
        );
        assert_eq!(err.to_string(), "Grid Button 8,0 does not exist on controller");
    }

    #[test]
    fn test_grid_on_device_without_grid() {
        assert_eq!(
            resolve_grid(&MIDI_MIX, 5).unwrap_err(),
            Error::InvalidControlClass { class: ControlClass::Grid, profile: MIDI_MIX.name }
        );
    }

    #[test]
    fn test_linear_resolution() {
        assert_eq!(resolve_linear(&APC_MINI_MK2, ControlClass::Fader, 56).unwrap(), 8);
        assert_eq!(resolve_linear(&APC_MINI_MK2, ControlClass::SideButton, 112).unwrap(), 0);
        assert_eq!(resolve_linear(&APC_MINI, ControlClass::LowerButton, 71).unwrap(), 7);
        assert_eq!(resolve_linear(&MIDI_MIX, ControlClass::Knob, 17).unwrap(), 8);
        assert_eq!(linear_to_note(&APC_MINI_MK2, ControlClass::LowerButton, 3).unwrap(), 103);
    }

    #[test]
    fn test_linear_out_of_range() {
        assert_eq!(
            resolve_linear(&APC_MINI_MK2, ControlClass::Fader, 57).unwrap_err(),
            Error::InvalidAddress { class: ControlClass::Fader, address: BadAddress::Note(57) }
        );
        assert_eq!(
            linear_to_note(&APC_MINI_MK2, ControlClass::SideButton, 8).unwrap_err(),
            Error::InvalidAddress { class: ControlClass::SideButton, address: BadAddress::Index(8) }
        );
        assert_eq!(
            resolve_linear(&APC_MINI_MK2, ControlClass::Knob, 16).unwrap_err(),
            Error::InvalidControlClass { class: ControlClass::Knob, profile: APC_MINI_MK2.name }
        );
    }

    #[test]
    fn test_address_kind_must_match_class() {
        assert!(address_to_note(&APC_MINI_MK2, ControlClass::Grid, Address::Linear(3)).is_err());
        assert!(address_to_note(&APC_MINI_MK2, ControlClass::SideButton, GridAddress::new(0, 0).into()).is_err());
        assert_eq!(
            address_to_note(&APC_MINI_MK2, ControlClass::Grid, GridAddress::new(2, 3).into()).unwrap(),
            19
        );
    }

    #[test]
    fn test_addresses_enumerate_whole_class() {
        assert_eq!(addresses(&APC_MINI_MK2, ControlClass::Grid).unwrap().len(), 64);
        assert_eq!(
            addresses(&APC_MINI_MK2, ControlClass::LowerButton).unwrap(),
            (0..8).map(Address::Linear).collect::<Vec<_>>()
        );
        assert_eq!(addresses(&MIDI_MIX, ControlClass::BankButton).unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_grid_note_round_trip(note in 0u8..64) {
            let address = resolve_grid(&APC_MINI_MK2, note).unwrap();
            prop_assert_eq!(grid_to_note(&APC_MINI_MK2, address).unwrap(), note);
        }

        #[test]
        fn prop_grid_address_round_trip(x in 0usize..8, y in 0usize..8) {
            let note = grid_to_note(&APC_MINI, GridAddress::new(x, y)).unwrap();
            prop_assert_eq!(resolve_grid(&APC_MINI, note).unwrap(), GridAddress::new(x, y));
        }

        #[test]
        fn prop_notes_outside_grid_fail(note in 64u8..=127) {
            prop_assert!(resolve_grid(&APC_MINI_MK2, note).is_err());
        }

        #[test]
        fn prop_linear_round_trip(index in 0usize..24) {
            let number = linear_to_note(&MIDI_MIX, ControlClass::Knob, index).unwrap();
            prop_assert_eq!(resolve_linear(&MIDI_MIX, ControlClass::Knob, number).unwrap(), index);
        }
    }
}
