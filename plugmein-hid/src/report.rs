//! HID boot-keyboard input report
//!
//! Boot protocol reports are always 8 bytes:
//! ```text
//! Offset  Size  Field
//! 0       1     modifier bitmask
//! 1       1     reserved
//! 2       6     key usage codes (0 = empty slot)
//! ```

use crate::error::HidError;

/// Modifier bits of byte 0
pub mod mods {
    pub const NONE: u8 = 0x00;
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LGUI: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RGUI: u8 = 0x80;

    /// Modifier bits paired with their rendered token, in output order
    pub const PREFIXES: [(u8, &str); 8] = [
        (LCTRL, "<LCTRL>"),
        (LSHIFT, "<LSHIFT>"),
        (LALT, "<LALT>"),
        (LGUI, "<LGUI>"),
        (RCTRL, "<RCTRL>"),
        (RSHIFT, "<RSHIFT>"),
        (RALT, "<RALT>"),
        (RGUI, "<RGUI>"),
    ];
}

/// Decoded boot-keyboard report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootReport {
    pub modifier: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl BootReport {
    /// Size of a boot report on the wire
    pub const LEN: usize = 8;

    /// Decode an exactly 8-byte report
    pub fn parse(raw: &[u8]) -> Result<Self, HidError> {
        if raw.len() != Self::LEN {
            return Err(HidError::MalformedFrame {
                needed: Self::LEN,
                available: raw.len(),
            });
        }

        Ok(Self {
            modifier: raw[0],
            reserved: raw[1],
            keys: [raw[2], raw[3], raw[4], raw[5], raw[6], raw[7]],
        })
    }

    /// Decode the report carried at the tail of a captured frame.
    ///
    /// usbmon appends the payload after the transfer header (and setup
    /// bytes), so the report is the last 8 of the `captured_len` bytes.
    pub fn from_frame(frame: &[u8], captured_len: usize) -> Result<Self, HidError> {
        if captured_len > frame.len() || captured_len < Self::LEN {
            return Err(HidError::MalformedFrame {
                needed: Self::LEN,
                available: captured_len.min(frame.len()),
            });
        }

        Self::parse(&frame[captured_len - Self::LEN..captured_len])
    }

    /// Encode back to wire bytes
    pub fn to_bytes(&self) -> [u8; 8] {
        let k = &self.keys;
        [
            self.modifier,
            self.reserved,
            k[0],
            k[1],
            k[2],
            k[3],
            k[4],
            k[5],
        ]
    }

    /// Usage code in the first key slot (the only one rendered)
    pub fn primary_key(&self) -> u8 {
        self.keys[0]
    }

    /// All-zero report: every key and modifier released
    pub fn is_release(&self) -> bool {
        self.to_bytes() == [0u8; 8]
    }

    /// True if any modifier bit is set
    pub fn has_modifiers(&self) -> bool {
        self.modifier != mods::NONE
    }

    /// Rendered tokens of the set modifier bits, in fixed output order
    pub fn modifier_tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        mods::PREFIXES
            .iter()
            .filter(move |(bit, _)| self.modifier & bit != 0)
            .map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shift_a() {
        let report = BootReport::parse(&[0x02, 0x00, 0x04, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(report.modifier, mods::LSHIFT);
        assert_eq!(report.primary_key(), 0x04);
        assert!(report.has_modifiers());
        assert!(!report.is_release());
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = BootReport::parse(&[0u8; 7]).unwrap_err();
        assert_eq!(
            err,
            HidError::MalformedFrame {
                needed: 8,
                available: 7
            }
        );
    }

    #[test]
    fn test_from_frame_takes_tail() {
        // 64-byte mmapped header followed by the report
        let mut frame = vec![0xAAu8; 64];
        frame.extend_from_slice(&[0x01, 0x00, 0x06, 0x07, 0, 0, 0, 0]);
        let report = BootReport::from_frame(&frame, frame.len()).unwrap();
        assert_eq!(report.modifier, mods::LCTRL);
        assert_eq!(report.keys, [0x06, 0x07, 0, 0, 0, 0]);
    }

    #[test]
    fn test_from_frame_respects_captured_len() {
        let mut frame = vec![0u8; 48];
        frame.extend_from_slice(&[0x00, 0x00, 0x05, 0, 0, 0, 0, 0]);
        frame.extend_from_slice(&[0xFF; 4]); // trailing bytes beyond caplen
        let report = BootReport::from_frame(&frame, 56).unwrap();
        assert_eq!(report.primary_key(), 0x05);
    }

    #[test]
    fn test_from_frame_malformed() {
        assert!(BootReport::from_frame(&[0u8; 4], 4).is_err());
        // captured_len claims more than the buffer holds
        assert!(BootReport::from_frame(&[0u8; 16], 32).is_err());
    }

    #[test]
    fn test_release() {
        assert!(BootReport::default().is_release());
        let modifier_only = BootReport {
            modifier: mods::LCTRL | mods::LSHIFT,
            ..Default::default()
        };
        assert!(!modifier_only.is_release());
    }

    #[test]
    fn test_modifier_tokens_order() {
        let report = BootReport {
            modifier: mods::RGUI | mods::LCTRL | mods::RSHIFT,
            ..Default::default()
        };
        let tokens: Vec<_> = report.modifier_tokens().collect();
        assert_eq!(tokens, ["<LCTRL>", "<RSHIFT>", "<RGUI>"]);
    }
}
