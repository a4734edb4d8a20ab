//! akai-pro - monitor and LED demo for Akai controllers
//!
//! Opens every controller named in the configuration file and either prints
//! classified events (`--monitor`) or runs a small LED demo.

use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use akai_pro::config::AppConfig;
use akai_pro::device::{self, ConnectedController};
use akai_pro::{ControlEvent, Output};

/// Akai controller monitor and LED demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "akai-pro.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Print events instead of running the LED demo
    #[arg(long)]
    monitor: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list_ports {
        device::print_ports()?;
        return Ok(());
    }

    info!("Configuration file: {}", args.config);
    let config = AppConfig::load(&args.config).await?;

    let mut controllers = Vec::with_capacity(config.controllers.len());
    for controller_config in &config.controllers {
        let mut connected = ConnectedController::connect(controller_config)?;
        register_handlers(&mut connected, args.monitor)?;
        controllers.push(connected);
    }

    tokio::select! {
        result = device::run_all(controllers) => result?,
        _ = shutdown_signal() => {}
    }

    info!("akai-pro shutdown complete");
    Ok(())
}

fn register_handlers(connected: &mut ConnectedController, monitor: bool) -> Result<()> {
    let controller = connected.controller_mut();
    let name = controller.profile().name;
    let output = controller.output();

    controller.on_ready(move || info!("✅ {} ready", name))?;

    if monitor {
        controller.on_event(print_event)?;
    } else {
        controller.on_event(move |event| {
            if let Err(e) = demo(&output, event) {
                warn!("LED update failed: {}", e);
            }
        })?;
    }
    Ok(())
}

fn print_event(event: &ControlEvent) {
    let line = event.to_string();
    match event.pressed() {
        Some(true) => println!("{}", line.green()),
        Some(false) => println!("{}", line.dimmed()),
        None => println!("{}", line.cyan()),
    }
}

/// Light LEDs in response to controls
fn demo(output: &Output, event: &ControlEvent) -> akai_pro::Result<()> {
    match *event {
        ControlEvent::GridButton { address, pressed, .. } => {
            let colour = if pressed { "red" } else { "off" };
            output.grid_buttons().set_led(address.x, address.y, colour)
        }
        ControlEvent::SideButton { index, pressed, .. } => {
            output.side_buttons().set_led(index, if pressed { 2 } else { 0 })
        }
        ControlEvent::LowerButton { index, pressed, .. } => {
            output.lower_buttons().set_led(index, if pressed { 1 } else { 0 })
        }
        ControlEvent::ShiftButton { pressed: true, .. } => {
            output.grid_buttons().reset_all_leds()
        }
        ControlEvent::Fader { index, value, controller } if controller.grid.is_some() && index < 8 => {
            fader_meter(output, index, value)
        }
        ControlEvent::MuteButton { index, pressed, .. } => {
            output.mute_buttons().set_led(index, on_off(pressed))
        }
        ControlEvent::RecArmButton { index, pressed, .. } => {
            output.rec_arm_buttons().set_led(index, on_off(pressed))
        }
        ControlEvent::BankButton { index, pressed, .. } => {
            output.bank_buttons().set_led(index, on_off(pressed))
        }
        _ => {
            info!("{}", event);
            Ok(())
        }
    }
}

/// Draw a fader's position as a bar in its grid column
fn fader_meter(output: &Output, column: usize, value: u8) -> akai_pro::Result<()> {
    let level = usize::from(value) * 7 / 127;
    for row in 0..8 {
        let colour = if value > 0 && row <= level { "green" } else { "off" };
        output.grid_buttons().set_led(row, column, colour)?;
    }
    Ok(())
}

fn on_off(pressed: bool) -> &'static str {
    if pressed {
        "on"
    } else {
        "off"
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
