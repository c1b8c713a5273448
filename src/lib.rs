// plugmein - USB keyboard sniffer over Linux usbmon
// Frame admission, capture/replay sessions, settings and the keystroke pipeline

pub mod config;
pub mod daemon;
pub mod error;
pub mod keylog;
pub mod usbmon;

pub use config::{Settings, SettingsLayer};
pub use error::{CaptureError, ConfigError, InitError, ReplayError};
pub use keylog::{FrameHandler, FrameStats};
pub use usbmon::{FrameMeta, UsbMonitor};

pub use plugmein_hid as hid;
