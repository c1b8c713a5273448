//! HID decoding error types

use thiserror::Error;

/// Errors from report decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    /// Fewer bytes available than a boot report needs
    #[error("Malformed frame: need {needed} bytes, {available} available")]
    MalformedFrame { needed: usize, available: usize },
}
