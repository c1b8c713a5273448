// CLI definitions using clap

use clap::Parser;
use std::path::PathBuf;

use plugmein::config::SettingsLayer;

#[derive(Parser)]
#[command(name = "plugmein")]
#[command(author, version, about = "Reconstruct USB keyboard input from usbmon traffic")]
pub struct Cli {
    /// usbmon capture device (default: usbmon0)
    #[arg(short, long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Append decoded keystrokes to this file instead of stdout
    #[arg(short, long = "output", value_name = "OUTFILE")]
    pub output: Option<PathBuf>,

    /// Only decode traffic from this USB bus (0 = all buses)
    #[arg(short = 'B', long = "bus", value_name = "BUS_ID")]
    pub bus: Option<u16>,

    /// Run in the background (requires -o)
    #[arg(short = 'D', long)]
    pub daemon: bool,

    /// Replay a recorded pcap/pcapng capture instead of sniffing live
    #[arg(long = "file", value_name = "CAPTURE")]
    pub pcap_file: Option<PathBuf>,

    /// TOML config file (command-line flags take precedence)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Let libpcap batch frames instead of delivering them immediately
    #[arg(long)]
    pub no_immediate: bool,

    /// List usbmon capture devices and exit
    #[arg(long)]
    pub list: bool,

    /// Print frame statistics to stderr when the session ends
    #[arg(long)]
    pub stats: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Settings given on the command line; unset flags leave the layer empty
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            device: self.device.clone(),
            bus: self.bus,
            output: self.output.clone(),
            daemon: self.daemon.then_some(true),
            immediate: self.no_immediate.then_some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["plugmein", "-d", "usbmon3", "-o", "keys.txt", "-B", "3", "-D"]);
        let layer = cli.settings_layer();
        assert_eq!(layer.device.as_deref(), Some("usbmon3"));
        assert_eq!(layer.output, Some(PathBuf::from("keys.txt")));
        assert_eq!(layer.bus, Some(3));
        assert_eq!(layer.daemon, Some(true));
        assert_eq!(layer.immediate, None);
    }

    #[test]
    fn test_unset_flags_leave_layer_empty() {
        let cli = Cli::parse_from(["plugmein"]);
        assert_eq!(cli.settings_layer(), SettingsLayer::default());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_bus_must_be_numeric() {
        assert!(Cli::try_parse_from(["plugmein", "-B", "two"]).is_err());
    }
}
