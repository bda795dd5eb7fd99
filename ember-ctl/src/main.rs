//! Emberlink Controller
//!
//! Watches the USB host for the heater peripheral, verifies its identity,
//! and runs the firing script loaded at startup whenever the operator
//! fires the trigger. The script file is the only input that can change
//! behavior; fix it and restart on a load failure.
//!
//! The trigger is fed from stdin: each line is one activation. On real
//! installations the same channel is pumped by whatever input hardware is
//! wired in.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ember_detect::HostWatcher;
use ember_link::{
    ChannelTrigger, ConnectionManager, Controller, Indicator, ManagerConfig, SerialOpener,
};
use ember_script::CommandScript;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Trigger-activated controller for a serial-attached heating device
#[derive(Debug, Parser)]
#[command(name = "ember-ctl", version, about)]
struct Args {
    /// Path to the command script
    script: PathBuf,

    /// Token separator in the script file
    #[arg(long, default_value_t = ',')]
    separator: char,

    /// Substring the device's product description must contain; empty
    /// accepts any USB serial peripheral
    #[arg(long, default_value = "")]
    match_product: String,

    /// Host-side baud rate for the device session
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Trigger hold duration in milliseconds
    #[arg(long, default_value_t = 2000)]
    hold_ms: u64,

    /// Session open timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    open_timeout_ms: u64,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
}

/// Indicator that reports over the log sink
struct LogIndicator;

impl Indicator for LogIndicator {
    fn set_on(&mut self, on: bool) {
        info!("indicator {}", if on { "on" } else { "off" });
    }
}

/// Pump stdin lines into a trigger channel on a blocking thread
fn spawn_stdin_trigger() -> ChannelTrigger {
    let (tx, trigger) = ChannelTrigger::channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });

    trigger
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Include all our crates in the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ember_ctl=info,ember_script=info,ember_detect=info,ember_link=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting Emberlink controller");

    // A bad script is fatal: nothing below starts until it loads
    let script = CommandScript::load(&args.script, args.separator)
        .with_context(|| format!("loading script {}", args.script.display()))?;

    let config = ManagerConfig {
        match_substring: args.match_product.clone(),
        open_timeout_ms: args.open_timeout_ms,
        trigger_hold_ms: args.hold_ms,
        ..Default::default()
    };
    let manager = ConnectionManager::new(config, SerialOpener::new(args.baud));

    let mut controller = Controller::new(
        HostWatcher::new(),
        manager,
        spawn_stdin_trigger(),
        LogIndicator,
        script,
    );

    info!("watching for the device; press Enter to fire once connected");
    controller.run(Duration::from_millis(args.tick_ms)).await;
    Ok(())
}
