//! midir transport
//!
//! Opens the ports of a configured controller, forwards inbound bytes through
//! a channel to a single dispatch loop, and writes LED messages back out.

use std::future::Future;

use anyhow::{anyhow, Context, Result};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::midi::format_hex;
use crate::output::MidiSink;

/// Inbound messages buffered between the MIDI thread and the dispatch loop
const INBOUND_CAPACITY: usize = 1000;

const CLIENT_NAME: &str = "akai-pro";

/// `MidiSink` over a midir output connection
pub struct MidirSink {
    conn: MidiOutputConnection,
}

impl MidiSink for MidirSink {
    fn send(&mut self, data: &[u8]) -> crate::error::Result<()> {
        self.conn.send(data)?;
        Ok(())
    }
}

/// List available MIDI input ports
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new("akai-pro-scanner")?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// List available MIDI output ports
pub fn list_output_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("akai-pro-scanner")?;
    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}

/// Find a port by case-insensitive substring match
fn find_port<T: midir::MidiIO>(midi_io: &T, pattern: &str) -> Option<(T::Port, String)> {
    let pattern = pattern.to_lowercase();
    for port in midi_io.ports() {
        if let Ok(name) = midi_io.port_name(&port) {
            if name.to_lowercase().contains(&pattern) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                return Some((port, name));
            }
        }
    }
    None
}

/// A controller wired to its MIDI ports
pub struct ConnectedController {
    controller: Controller,
    reset_on_start: bool,
    // Dropping the connection closes the port
    _input_conn: MidiInputConnection<()>,
    inbound_rx: mpsc::Receiver<Vec<u8>>,
}

impl ConnectedController {
    /// Open the configured ports and send the device enquiry
    ///
    /// The input side is connected first so the identity reply cannot be missed.
    /// The LED reset asked for by `reset_on_start` happens when [`run`](Self::run) starts.
    pub fn connect(config: &ControllerConfig) -> Result<Self> {
        let profile = config.model.profile();
        info!(
            "Connecting to {} - Input: '{}', Output: '{}'",
            profile, config.input_port, config.output_port
        );

        let mut midi_in = MidiInput::new(CLIENT_NAME).context("Failed to create MIDI input")?;
        // Keep SysEx for the identity reply, drop clock and active sensing
        midi_in.ignore(Ignore::TimeAndActiveSense);

        let (in_port, in_name) = find_port(&midi_in, &config.input_port)
            .ok_or_else(|| anyhow!("Input port '{}' not found", config.input_port))?;
        info!("Connecting to input port: {}", in_name);

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let input_conn = midi_in
            .connect(
                &in_port,
                CLIENT_NAME,
                move |_timestamp, data, _| {
                    // Never block the MIDI thread
                    if let Err(e) = inbound_tx.try_send(data.to_vec()) {
                        warn!("Dropping inbound MIDI {}: {}", format_hex(data), e);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to input port: {}", e))?;

        let midi_out = MidiOutput::new(CLIENT_NAME).context("Failed to create MIDI output")?;
        let (out_port, out_name) = find_port(&midi_out, &config.output_port)
            .ok_or_else(|| anyhow!("Output port '{}' not found", config.output_port))?;
        info!("Connecting to output port: {}", out_name);

        let conn = midi_out
            .connect(&out_port, CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to connect to output port: {}", e))?;

        let controller = Controller::new(profile, MidirSink { conn });

        Ok(Self {
            controller,
            reset_on_start: config.reset_on_start,
            _input_conn: input_conn,
            inbound_rx,
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Access for registering handlers before the loop starts
    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Dispatch inbound messages until the port closes
    ///
    /// Returns an error if the device fails to identify itself.
    pub async fn run(mut self) -> Result<()> {
        if self.reset_on_start {
            self.controller.output().reset_paced().await;
        }
        info!("Listening to {}", self.controller.profile());
        dispatch(&mut self.controller, &mut self.inbound_rx).await?;
        info!("{} disconnected", self.controller.profile());
        Ok(())
    }

    /// Blocking variant of [`run`](Self::run)
    pub fn start(self) -> Result<()> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build runtime")?
            .block_on(self.run())
    }
}

/// Feed queued messages to the controller, one at a time, until the sender is gone
pub async fn dispatch(
    controller: &mut Controller,
    inbound_rx: &mut mpsc::Receiver<Vec<u8>>,
) -> Result<()> {
    while let Some(data) = inbound_rx.recv().await {
        debug!("Received from {}: {}", controller.profile(), format_hex(&data));
        let result = controller.handle_message(&data);
        // Anything but a rejected identity reply leaves the controller waiting
        if controller.has_failed() {
            result.with_context(|| format!("{} stopped", controller.profile()))?;
        }
    }
    Ok(())
}

/// Run several controllers side by side, each in its own task
///
/// Returns as soon as any controller stops with an error; the others are aborted.
pub async fn run_all(controllers: Vec<ConnectedController>) -> Result<()> {
    supervise(controllers.into_iter().map(ConnectedController::run)).await
}

/// Spawn each loop and wait for all of them, failing fast on the first error
async fn supervise<F>(loops: impl IntoIterator<Item = F>) -> Result<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for task in loops {
        tasks.spawn(task);
    }

    // Dropping the set aborts whatever is still running
    while let Some(joined) = tasks.join_next().await {
        joined.context("Controller task panicked")??;
    }
    Ok(())
}

/// Print discovered ports
pub fn print_ports() -> Result<()> {
    println!("\n=== MIDI Input Ports ===");
    for (i, name) in list_input_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }

    println!("\n=== MIDI Output Ports ===");
    for (i, name) in list_output_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }
    println!();
    Ok(())
}
