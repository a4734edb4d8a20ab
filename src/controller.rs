//! Controller instance
//!
//! Holds the readiness state, the two handler slots and the output handle for
//! one physical device. Inbound messages must be fed in arrival order through
//! [`Controller::handle_message`]; the first SysEx is taken as the identity reply.

use tracing::{debug, error, info, warn};

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::event::ControlEvent;
use crate::midi::{format_hex, MidiMessage};
use crate::output::{Buttons, GridButtons, MidiSink, Output};
use crate::profile::ControllerProfile;

/// SysEx id of Akai Professional
pub const AKAI_MANUFACTURER_ID: u8 = 0x47;

/// Called once per classified event
pub type EventHandler = Box<dyn FnMut(&ControlEvent) + Send>;

/// Called once, when the device has identified itself
pub type ReadyHandler = Box<dyn FnOnce() + Send>;

/// Identification state of a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Device enquiry sent, waiting for the SysEx reply
    AwaitingIdentification,
    Ready,
    /// The SysEx reply was wrong; the instance stays unusable
    Failed(String),
}

/// Check an identity reply against a profile
///
/// `data` is the SysEx body without framing:
/// `7E <device> 06 02 <manufacturer> <model> ...`.
pub fn check_identity(profile: &ControllerProfile, message: &MidiMessage) -> std::result::Result<(), String> {
    let data = match message {
        MidiMessage::SysEx { data } => data,
        other => return Err(format!("expected identity reply, got {}", other)),
    };

    if data.len() < 6 {
        return Err(format!("identity reply too short ({} bytes)", data.len()));
    }
    if data[2] != 0x06 || data[3] != 0x02 {
        return Err("controller did not identify".to_string());
    }
    if data[4] != AKAI_MANUFACTURER_ID {
        return Err(format!("MIDI device is not an Akai device (manufacturer 0x{:02X})", data[4]));
    }
    if data[5] != profile.model_id {
        return Err(format!(
            "MIDI device is not an {} (model 0x{:02X}, expected 0x{:02X})",
            profile.name, data[5], profile.model_id
        ));
    }
    Ok(())
}

/// One physical controller
pub struct Controller {
    profile: &'static ControllerProfile,
    output: Output,
    state: Readiness,
    event_handler: Option<EventHandler>,
    ready_handler: Option<ReadyHandler>,
}

impl Controller {
    /// Create a controller and send the device enquiry
    pub fn new(profile: &'static ControllerProfile, sink: impl MidiSink + 'static) -> Self {
        Self::with_output(Output::new(profile, sink))
    }

    /// Create a controller on an existing output handle and send the device enquiry
    pub fn with_output(output: Output) -> Self {
        let profile = output.profile();
        debug!("Sending device enquiry to {}", profile);
        output.send(&MidiMessage::device_enquiry());

        Self {
            profile,
            output,
            state: Readiness::AwaitingIdentification,
            event_handler: None,
            ready_handler: None,
        }
    }

    pub fn profile(&self) -> &'static ControllerProfile {
        self.profile
    }

    pub fn state(&self) -> &Readiness {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == Readiness::Ready
    }

    /// True once a SysEx reply has been rejected
    pub fn has_failed(&self) -> bool {
        matches!(self.state, Readiness::Failed(_))
    }

    /// Register the event handler; only one per controller
    pub fn on_event<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&ControlEvent) + Send + 'static,
    {
        if self.event_handler.is_some() {
            error!("Event handler already registered for {}", self.profile);
            return Err(Error::DuplicateRegistration { slot: "Event" });
        }
        self.event_handler = Some(Box::new(handler));
        Ok(())
    }

    /// Register the ready handler; only one per controller
    pub fn on_ready<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.ready_handler.is_some() {
            error!("Ready handler already registered for {}", self.profile);
            return Err(Error::DuplicateRegistration { slot: "Ready" });
        }
        self.ready_handler = Some(Box::new(handler));
        Ok(())
    }

    /// Feed one raw inbound message
    ///
    /// Before identification, anything other than SysEx is rejected with an
    /// `Identification` error and the controller keeps waiting. A SysEx reply
    /// that does not match the profile is permanent: every later call returns
    /// the same error.
    pub fn handle_message(&mut self, data: &[u8]) -> Result<()> {
        let message = MidiMessage::parse(data);

        match &self.state {
            Readiness::Failed(reason) => Err(self.identification_error(reason.clone())),
            Readiness::AwaitingIdentification => self.identify(data, message.as_ref()),
            Readiness::Ready => {
                let Some(message) = message else {
                    debug!("Unparsed MIDI from {}: {}", self.profile, format_hex(data));
                    return Ok(());
                };
                self.dispatch(&message);
                Ok(())
            }
        }
    }

    fn identify(&mut self, data: &[u8], message: Option<&MidiMessage>) -> Result<()> {
        let message = match message {
            Some(message @ MidiMessage::SysEx { .. }) => message,
            Some(other) => {
                warn!("{} has not identified yet, ignoring {}", self.profile, other);
                return Err(self.identification_error(format!("expected identity reply, got {}", other)));
            }
            None => {
                warn!("{} has not identified yet, ignoring {}", self.profile, format_hex(data));
                return Err(self.identification_error(format!("unreadable identity reply: {}", format_hex(data))));
            }
        };

        match check_identity(self.profile, message) {
            Ok(()) => {
                info!("{} identified", self.profile);
                self.state = Readiness::Ready;
                if let Some(ready) = self.ready_handler.take() {
                    ready();
                }
                Ok(())
            }
            Err(reason) => {
                error!("{} failed to identify: {}", self.profile, reason);
                self.state = Readiness::Failed(reason.clone());
                Err(self.identification_error(reason))
            }
        }
    }

    fn identification_error(&self, reason: String) -> Error {
        Error::Identification { profile: self.profile.name, reason }
    }

    fn dispatch(&mut self, message: &MidiMessage) {
        // Without a handler there is no point classifying
        let Some(handler) = self.event_handler.as_mut() else {
            return;
        };
        if let Some(event) = classify(self.profile, message) {
            debug!("{}", event);
            handler(&event);
        }
    }

    /// Cloneable handle for LED writes, e.g. to move into the event handler
    pub fn output(&self) -> Output {
        self.output.clone()
    }

    /// Turn off every LED
    pub fn reset(&self, fast: bool) {
        self.output.reset(fast);
    }

    pub fn grid_buttons(&self) -> GridButtons<'_> {
        self.output.grid_buttons()
    }

    pub fn side_buttons(&self) -> Buttons<'_> {
        self.output.side_buttons()
    }

    pub fn lower_buttons(&self) -> Buttons<'_> {
        self.output.lower_buttons()
    }

    pub fn mute_buttons(&self) -> Buttons<'_> {
        self.output.mute_buttons()
    }

    pub fn rec_arm_buttons(&self) -> Buttons<'_> {
        self.output.rec_arm_buttons()
    }

    pub fn bank_buttons(&self) -> Buttons<'_> {
        self.output.bank_buttons()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::GridAddress;
    use crate::midi::DEVICE_ENQUIRY;
    use crate::output::testing::RecordingSink;
    use crate::profile::{APC_MINI_MK2, MIDI_MIX};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const MK2_IDENTITY: [u8; 8] = [0xF0, 0x7E, 0x00, 0x06, 0x02, 0x47, 0x4F, 0xF7];

    fn recording_controller() -> (Controller, Arc<Mutex<Vec<ControlEvent>>>) {
        let mut controller = Controller::new(&APC_MINI_MK2, RecordingSink::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        controller
            .on_event(move |event| sink.lock().unwrap().push(*event))
            .unwrap();
        (controller, events)
    }

    #[test]
    fn test_construction_sends_device_enquiry() {
        let sink = RecordingSink::default();
        let controller = Controller::new(&APC_MINI_MK2, sink.clone());

        assert_eq!(sink.sent(), vec![DEVICE_ENQUIRY.to_vec()]);
        assert_eq!(controller.state(), &Readiness::AwaitingIdentification);
    }

    #[test]
    fn test_events_only_after_identification() {
        let (mut controller, events) = recording_controller();

        // A pad pressed during connect is rejected but the handshake stays open
        assert!(matches!(
            controller.handle_message(&[0x90, 5, 127]),
            Err(Error::Identification { .. })
        ));
        assert_eq!(controller.state(), &Readiness::AwaitingIdentification);
        assert!(events.lock().unwrap().is_empty());

        controller.handle_message(&MK2_IDENTITY).unwrap();
        assert!(controller.is_ready());
        controller.handle_message(&[0x90, 5, 127]).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![ControlEvent::GridButton {
                controller: &APC_MINI_MK2,
                address: GridAddress::new(0, 5),
                pressed: true,
            }]
        );
    }

    #[test]
    fn test_stray_bytes_before_identification_keep_waiting() {
        let (mut controller, events) = recording_controller();

        assert!(controller.handle_message(&[0xFE]).is_err());
        assert!(controller.handle_message(&[0xF8]).is_err());
        assert!(controller.handle_message(&[0xB0, 48, 10]).is_err());
        assert_eq!(controller.state(), &Readiness::AwaitingIdentification);
        assert!(!controller.has_failed());

        controller.handle_message(&MK2_IDENTITY).unwrap();
        controller.handle_message(&[0xB0, 48, 10]).unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_short_identity_reply_fails() {
        let (mut controller, _) = recording_controller();

        assert!(controller.handle_message(&[0xF0, 0x7E, 0x00, 0x06, 0xF7]).is_err());
        assert!(controller.has_failed());
    }

    #[test]
    fn test_identification_failure_is_permanent() {
        let (mut controller, events) = recording_controller();

        let wrong_model = [0xF0, 0x7E, 0x00, 0x06, 0x02, 0x47, 0x31, 0xF7];
        assert!(matches!(
            controller.handle_message(&wrong_model),
            Err(Error::Identification { .. })
        ));
        assert!(matches!(controller.state(), Readiness::Failed(_)));

        // Even a correct reply afterwards does not recover the instance
        assert!(controller.handle_message(&MK2_IDENTITY).is_err());
        assert!(controller.handle_message(&[0x90, 5, 127]).is_err());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_check_identity() {
        let reply = |bytes: &[u8]| MidiMessage::SysEx { data: bytes.to_vec() };

        assert!(check_identity(&APC_MINI_MK2, &reply(&[0x7E, 0x00, 0x06, 0x02, 0x47, 0x4F, 0x00])).is_ok());
        assert!(check_identity(&MIDI_MIX, &reply(&[0x7E, 0x7F, 0x06, 0x02, 0x47, 0x31])).is_ok());
        assert!(check_identity(&APC_MINI_MK2, &reply(&[0x7E, 0x00, 0x06, 0x02, 0x41, 0x4F])).is_err());
        assert!(check_identity(&APC_MINI_MK2, &reply(&[0x7E, 0x00, 0x06, 0x01, 0x47, 0x4F])).is_err());
        assert!(check_identity(&APC_MINI_MK2, &reply(&[0x7E, 0x00, 0x06])).is_err());
        assert!(check_identity(
            &APC_MINI_MK2,
            &MidiMessage::NoteOn { channel: 0, note: 1, velocity: 1 }
        )
        .is_err());
    }

    #[test]
    fn test_ready_handler_fires_once() {
        let mut controller = Controller::new(&APC_MINI_MK2, RecordingSink::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        controller
            .on_ready(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        controller.handle_message(&MK2_IDENTITY).unwrap();
        controller.handle_message(&MK2_IDENTITY).unwrap();
        controller.handle_message(&[0x90, 1, 127]).unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first_handler() {
        let (mut controller, events) = recording_controller();
        let second_called = Arc::new(AtomicUsize::new(0));
        let counter = second_called.clone();

        let err = controller
            .on_event(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap_err();
        assert_eq!(err, Error::DuplicateRegistration { slot: "Event" });

        controller.handle_message(&MK2_IDENTITY).unwrap();
        controller.handle_message(&[0xB0, 48, 64]).unwrap();

        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(second_called.load(Ordering::SeqCst), 0);

        controller.on_ready(|| {}).unwrap();
        assert!(controller.on_ready(|| {}).is_err());
    }

    #[test]
    fn test_dispatch_in_arrival_order() {
        let (mut controller, events) = recording_controller();
        controller.handle_message(&MK2_IDENTITY).unwrap();

        controller.handle_message(&[0x90, 112, 127]).unwrap();
        controller.handle_message(&[0xB0, 50, 12]).unwrap();
        controller.handle_message(&[0x80, 112, 0]).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ControlEvent::SideButton { controller: &APC_MINI_MK2, index: 0, pressed: true });
        assert_eq!(events[1], ControlEvent::Fader { controller: &APC_MINI_MK2, index: 2, value: 12 });
        assert_eq!(events[2], ControlEvent::SideButton { controller: &APC_MINI_MK2, index: 0, pressed: false });
    }

    #[test]
    fn test_unknown_note_is_silent() {
        let (mut controller, events) = recording_controller();
        controller.handle_message(&MK2_IDENTITY).unwrap();

        assert!(controller.handle_message(&[0x90, 90, 127]).is_ok());
        assert!(controller.handle_message(&[0xE0, 0, 64]).is_ok());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_events_dropped_without_handler() {
        let mut controller = Controller::new(&APC_MINI_MK2, RecordingSink::default());
        controller.handle_message(&MK2_IDENTITY).unwrap();

        assert!(controller.handle_message(&[0x90, 5, 127]).is_ok());
    }

    #[test]
    fn test_handler_can_drive_leds() {
        let sink = RecordingSink::default();
        let mut controller = Controller::new(&APC_MINI_MK2, sink.clone());
        let output = controller.output();
        controller
            .on_event(move |event| {
                if let ControlEvent::GridButton { address, pressed: true, .. } = *event {
                    output
                        .grid_buttons()
                        .set_led_with_effect(address.x, address.y, "red", "bright")
                        .unwrap();
                }
            })
            .unwrap();

        controller.handle_message(&MK2_IDENTITY).unwrap();
        sink.clear();
        controller.handle_message(&[0x90, 9, 127]).unwrap();

        assert_eq!(sink.sent(), vec![vec![0x96, 9, 5]]);
    }

    #[test]
    fn test_lower_button_group_resets_eight_leds() {
        let sink = RecordingSink::default();
        let controller = Controller::new(&APC_MINI_MK2, sink.clone());
        sink.clear();

        controller.lower_buttons().reset_all_leds().unwrap();

        let notes: Vec<u8> = sink.sent().iter().map(|m| m[1]).collect();
        assert_eq!(notes, (100..=107).collect::<Vec<u8>>());
    }
}
