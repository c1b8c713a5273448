//! HID Usage Table for Keyboard/Keypad (USB HID Usage Tables 1.12, Section 10)
//!
//! Every usage code has a slot in [`USAGE_TABLE`]. Codes without a symbol
//! map to the empty string and are never rendered.

/// Usage code for Enter (Return on the main block)
pub const ENTER: u8 = 0x28;
/// Usage code for Keypad Enter
pub const KEYPAD_ENTER: u8 = 0x58;
/// Usage code for Return (the "Return" usage distinct from Enter)
pub const RETURN: u8 = 0x9E;

/// Symbol for every usage code, indexed by code.
pub static USAGE_TABLE: [&str; 256] = build_table();

const fn build_table() -> [&'static str; 256] {
    let mut table = [""; 256];
    let mut code = 0;
    while code < table.len() {
        table[code] = symbol(code as u8);
        code += 1;
    }
    table
}

/// Get the rendered symbol of a usage code ("" when unassigned)
#[inline]
pub fn symbol_for(code: u8) -> &'static str {
    USAGE_TABLE[code as usize]
}

/// True if the usage code ends a line in the rendered output
#[inline]
pub fn is_line_break(code: u8) -> bool {
    matches!(code, KEYPAD_ENTER | RETURN | ENTER)
}

#[rustfmt::skip]
const fn symbol(code: u8) -> &'static str {
    match code {
        0x01 => "<ErrorRollOver>", 0x02 => "<POSTFail>", 0x03 => "<ErrorUndefined>",
        0x04 => "a", 0x05 => "b", 0x06 => "c", 0x07 => "d",
        0x08 => "e", 0x09 => "f", 0x0A => "g", 0x0B => "h",
        0x0C => "i", 0x0D => "j", 0x0E => "k", 0x0F => "l",
        0x10 => "m", 0x11 => "n", 0x12 => "o", 0x13 => "p",
        0x14 => "q", 0x15 => "r", 0x16 => "s", 0x17 => "t",
        0x18 => "u", 0x19 => "v", 0x1A => "w", 0x1B => "x",
        0x1C => "y", 0x1D => "z",
        0x1E => "1", 0x1F => "2", 0x20 => "3", 0x21 => "4",
        0x22 => "5", 0x23 => "6", 0x24 => "7", 0x25 => "8",
        0x26 => "9", 0x27 => "0",
        0x28 => "<Enter>", 0x29 => "<Escape>", 0x2A => "<Backspace>",
        0x2B => "<Tab>", 0x2C => "<Space>", 0x2D => "<- or _>", 0x2E => "<= or +>",
        0x2F => "<[ or {>", 0x30 => "<] or }>", 0x31 => "<\\ or |>", 0x32 => "<Non-US #>",
        0x33 => "<; or  :>", 0x34 => "'", 0x35 => "~", 0x36 => "<, or <>",
        0x37 => "<> or .>", 0x38 => "</ or  ?>", 0x39 => "<Caps Lock>",
        0x3A => "<F1>", 0x3B => "<F2>", 0x3C => "<F3>", 0x3D => "<F4>",
        0x3E => "<F5>", 0x3F => "<F6>", 0x40 => "<F7>", 0x41 => "<F8>",
        0x42 => "<F9>", 0x43 => "<F10>", 0x44 => "<F11>", 0x45 => "<F12>",
        0x46 => "<PrintScreen>", 0x47 => "<Scroll Lock>", 0x48 => "<Pause>",
        0x49 => "<Insert>", 0x4A => "<Home>", 0x4B => "<PageUp>",
        0x4C => "<Delete Forward>", 0x4D => "<End>", 0x4E => "<PageDown>",
        0x4F => "<RightArrow>", 0x50 => "<LeftArrow>", 0x51 => "<DownArrow>", 0x52 => "<UpArrow>",
        0x53 => "<Keypad Num Lock Clear>", 0x54 => "<Keypad />", 0x55 => "<Keypad *>",
        0x56 => "<Keypad ->", 0x57 => "<Keypad +>", 0x58 => "<Keypad Return>",
        0x59 => "<Keypad 1>", 0x5A => "<Keypad 2>", 0x5B => "<Keypad 3>", 0x5C => "<Keypad 4>",
        0x5D => "<Keypad 5>", 0x5E => "<Keypad 6>", 0x5F => "<Keypad 7>", 0x60 => "<Keypad 8>",
        0x61 => "<Keypad 9>", 0x62 => "<Keypad 0>", 0x63 => "<Keypad . or ,>",
        0x64 => "<Non-US \\ or |>", 0x65 => "<Application>", 0x66 => "<Power>",
        0x67 => "<Keypad =>",
        0x68 => "<F13>", 0x69 => "<F14>", 0x6A => "<F15>", 0x6B => "<F16>",
        0x6C => "<F17>", 0x6D => "<F18>", 0x6E => "<F19>", 0x6F => "<F20>",
        0x70 => "<F21>", 0x71 => "<F22>", 0x72 => "<F23>", 0x73 => "<F24>",
        0x74 => "<Execute>", 0x75 => "<Help>", 0x76 => "<Menu>", 0x77 => "<Select>",
        0x78 => "<Stop>", 0x79 => "<Again>", 0x7A => "<Undo>", 0x7B => "<Cut>",
        0x7C => "<Copy>", 0x7D => "<Paste>", 0x7E => "<Find>", 0x7F => "<Mute>",
        0x80 => "<Volume Up>", 0x81 => "<Volume Down>",
        0x82 => "<Locking Caps Lock>", 0x83 => "<Locking Num Lock>", 0x84 => "<Locking Scroll Lock>",
        0x85 => "<Keypad Comma>", 0x86 => "<Keypad Equal Sign>",
        0x87 => "<International1>", 0x88 => "<International2>", 0x89 => "<International3>",
        0x8A => "<International4>", 0x8B => "<International5>", 0x8C => "<International6>",
        0x8D => "<International7>", 0x8E => "<International8>", 0x8F => "<International9>",
        0x90 => "<LANG1>", 0x91 => "<LANG2>", 0x92 => "<LANG3>", 0x93 => "<LANG4>",
        0x94 => "<LANG5>", 0x95 => "<LANG6>", 0x96 => "<LANG7>", 0x97 => "<LANG8>",
        0x98 => "<LANG9>",
        0x99 => "<Alternate Erase>", 0x9A => "<SysReq/Attention>", 0x9B => "<Cancel>",
        0x9C => "<Clear>", 0x9D => "<Prior>", 0x9E => "<Return>", 0x9F => "<Separator>",
        0xA0 => "<Out>", 0xA1 => "<Oper>", 0xA2 => "<Clear/Again>",
        0xA3 => "<CrSel/Props>", 0xA4 => "<ExSel>",
        0xE0 => "<LeftControl>", 0xE1 => "<LeftShift>", 0xE2 => "<LeftAlt>", 0xE3 => "<Left GUI>",
        0xE4 => "<RightControl>", 0xE5 => "<RightShift>", 0xE6 => "<RightAlt>", 0xE7 => "<Right GUI>",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_in_order() {
        for (i, ch) in ('a'..='z').enumerate() {
            assert_eq!(symbol_for(0x04 + i as u8), ch.to_string());
        }
    }

    #[test]
    fn test_digits_in_order() {
        let digits = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];
        for (i, d) in digits.iter().enumerate() {
            assert_eq!(symbol_for(0x1E + i as u8), *d);
        }
    }

    #[test]
    fn test_unassigned_codes_are_empty() {
        assert_eq!(symbol_for(0x00), "");
        for code in 0xA5..=0xDF {
            assert_eq!(symbol_for(code), "", "code 0x{code:02x}");
        }
        for code in 0xE8..=0xFF {
            assert_eq!(symbol_for(code), "", "code 0x{code:02x}");
        }
    }

    #[test]
    fn test_modifier_usages_indexed_by_code() {
        assert_eq!(symbol_for(0xE0), "<LeftControl>");
        assert_eq!(symbol_for(0xE7), "<Right GUI>");
    }

    #[test]
    fn test_line_break_codes() {
        assert!(is_line_break(ENTER));
        assert!(is_line_break(KEYPAD_ENTER));
        assert!(is_line_break(RETURN));
        assert!(!is_line_break(0x2C));
        assert!(!is_line_break(0x00));
    }

    #[test]
    fn test_assigned_count() {
        // 0x01..=0xA4 plus the eight modifier usages
        let assigned = USAGE_TABLE.iter().filter(|s| !s.is_empty()).count();
        assert_eq!(assigned, 0xA4 + 8);
    }
}
