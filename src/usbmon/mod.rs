//! usbmon frame sources and header parsing
//!
//! Frames come either from a live libpcap capture on a `usbmonN` device
//! or from a recorded pcap/pcapng file. Both hand each frame to a
//! [`FrameHandler`](crate::keylog::FrameHandler).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use plugmein::keylog::FrameHandler;
//! use plugmein::usbmon::{CaptureOptions, UsbMonitor};
//!
//! let running = AtomicBool::new(true);
//! let mut monitor = UsbMonitor::open("usbmon0", &CaptureOptions::default())?;
//! let mut handler = FrameHandler::new(0, std::io::stdout());
//! monitor.run(&mut handler, &running)?;
//! ```

mod capture;
mod replay;
pub mod urb;

pub use capture::{
    list_devices, CaptureOptions, MonitorDevice, UsbMonitor, READ_TIMEOUT_MS, SNAPLEN,
};
pub use replay::{replay_file, ReplaySummary};
pub use urb::{check_frame, is_admissible, FrameMeta, Rejection, UrbHeader};
