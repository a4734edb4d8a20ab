//! Error types for controller mapping, LED encoding and the identification handshake.

use std::fmt;

use thiserror::Error;

use crate::profile::ControlClass;

/// The address that failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadAddress {
    /// A raw note or controller number that is in no table of the class
    Note(u8),
    /// Grid coordinates outside the 8x8 matrix
    Grid { x: usize, y: usize },
    /// Index past the end of a linear table
    Index(usize),
}

impl fmt::Display for BadAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BadAddress::Note(note) => write!(f, "for MIDI number {}", note),
            BadAddress::Grid { x, y } => write!(f, "{},{}", x, y),
            BadAddress::Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{class} {address} does not exist on controller")]
    InvalidAddress { class: ControlClass, address: BadAddress },

    #[error("Invalid colour '{colour}' for {class}")]
    InvalidColour { class: ControlClass, colour: String },

    #[error("Invalid effect '{effect}' for {class}")]
    InvalidEffect { class: ControlClass, effect: String },

    #[error("{class} is not available on {profile}")]
    InvalidControlClass { class: ControlClass, profile: &'static str },

    #[error("{profile} failed to identify: {reason}")]
    Identification { profile: &'static str, reason: String },

    #[error("{slot} handler is already registered")]
    DuplicateRegistration { slot: &'static str },

    #[error("MIDI transport error: {0}")]
    Transport(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
