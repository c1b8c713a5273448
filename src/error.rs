//! Error types for capture, replay and configuration

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Capture source could not be brought up
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Cannot create capture on {device}: {source}")]
    Create {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("Cannot activate {device}: {source}")]
    Activate {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("{device} is not a USB monitoring device (link type {linktype})")]
    NotUsbMonitor { device: String, linktype: i32 },
}

/// Live capture stopped
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture read failed: {0}")]
    Read(#[from] pcap::Error),

    #[error("Writing keystrokes failed: {0}")]
    Output(#[source] io::Error),
}

/// Offline replay failed
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PCAP parse error: {0}")]
    Parse(String),

    #[error("Capture is not from a USB monitoring device (link type {0})")]
    NotUsbMonitor(i32),

    #[error("Writing keystrokes failed: {0}")]
    Output(#[source] io::Error),
}

/// Invalid or unreadable settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Background option needs an output file (-o)")]
    DaemonWithoutOutput,
}
