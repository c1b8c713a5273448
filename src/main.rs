//! plugmein
//!
//! Passive USB keyboard sniffer: reads usbmon traffic and prints the
//! keystrokes of boot-protocol keyboards.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use plugmein::config::Settings;
use plugmein::daemon::daemonize;
use plugmein::keylog::FrameHandler;
use plugmein::usbmon::{self, UsbMonitor};

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout may be the keystroke sink
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if cli.list {
        return list();
    }

    let settings = Settings::resolve(cli.config.as_deref(), cli.settings_layer())?;

    let sink: Box<dyn Write> = match &settings.output {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    if settings.daemon {
        daemonize().context("Failed to daemonize")?;
    }

    let mut handler = FrameHandler::new(settings.bus, sink);

    if let Some(ref pcap_file) = cli.pcap_file {
        let summary = usbmon::replay_file(pcap_file, &mut handler)?;
        info!(
            "Replay done: {} packets, {} keystrokes",
            summary.packets,
            handler.stats().keystrokes
        );
        if cli.stats {
            handler.stats().print_summary();
        }
        return Ok(());
    }

    let mut monitor = UsbMonitor::open(&settings.device, &settings.capture_options())?;
    if settings.bus != 0 {
        info!("Filtering on bus {}", settings.bus);
    }
    // Installed after daemonizing: the handler thread does not survive fork
    let running = setup_interrupt_handler();
    let result = monitor.run(&mut handler, &running);
    if cli.stats {
        handler.stats().print_summary();
    }
    result.with_context(|| format!("Capture on {} stopped", monitor.device()))
}

/// Clear the returned flag on SIGINT/SIGTERM so the capture loop returns
fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        warn!("Could not install signal handler: {e}");
    }

    running
}

fn list() -> Result<()> {
    let devices = usbmon::list_devices().context("Failed to list capture devices")?;
    if devices.is_empty() {
        println!("No usbmon devices found (is the usbmon module loaded?)");
    }
    for dev in devices {
        match dev.description {
            Some(desc) => println!("{}\t{}", dev.name, desc),
            None => println!("{}", dev.name),
        }
    }
    Ok(())
}
