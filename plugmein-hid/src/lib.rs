//! HID boot-keyboard report decoding for plugmein
//!
//! This crate turns the 8-byte boot-protocol input reports a USB keyboard
//! sends into text. It knows nothing about how the reports were captured;
//! see the `plugmein` crate for the usbmon side.
//!
//! # Example
//!
//! ```
//! use plugmein_hid::{BootReport, Renderer};
//!
//! let report = BootReport::parse(&[0x02, 0x00, 0x04, 0, 0, 0, 0, 0]).unwrap();
//! let mut renderer = Renderer::new();
//! assert_eq!(renderer.render_to_string(&report), "<LSHIFT> + a");
//! ```

pub mod error;
pub mod render;
pub mod report;
pub mod usage;

pub use error::HidError;
pub use render::{Rendered, Renderer};
pub use report::{mods, BootReport};
pub use usage::{symbol_for, USAGE_TABLE};
