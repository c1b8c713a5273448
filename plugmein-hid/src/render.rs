//! Text rendering of decoded keyboard reports
//!
//! Only the first key slot is rendered. Modifier prefixes are printed
//! along with a real key; modifier-only notifications (e.g. holding Shift
//! before an uppercase letter) produce no output.

use std::io::{self, Write};

use crate::report::BootReport;
use crate::usage;

/// What a single `render` call produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rendered {
    /// Nothing written (release or modifier-only report)
    #[default]
    Nothing,
    /// Report accepted; `symbol` is false if the key has no table entry
    Key { symbol: bool },
}

/// Renders reports to a sink, keeping per-session state
#[derive(Debug, Default)]
pub struct Renderer {
    previous_had_modifiers: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last accepted report had any modifier set.
    ///
    /// Tracked for every non-release report but not consulted by rendering.
    pub fn previous_had_modifiers(&self) -> bool {
        self.previous_had_modifiers
    }

    /// Render one report to `out`
    pub fn render<W: Write + ?Sized>(
        &mut self,
        report: &BootReport,
        out: &mut W,
    ) -> io::Result<Rendered> {
        let key = report.primary_key();

        if key != 0 {
            for token in report.modifier_tokens() {
                write!(out, "{token} + ")?;
            }
        }

        if report.is_release() {
            return Ok(Rendered::Nothing);
        }

        self.previous_had_modifiers = report.has_modifiers();

        let symbol = usage::symbol_for(key);
        if !symbol.is_empty() {
            out.write_all(symbol.as_bytes())?;
        }

        if usage::is_line_break(key) {
            out.write_all(b"\n")?;
        }

        if key == 0 {
            Ok(Rendered::Nothing)
        } else {
            Ok(Rendered::Key {
                symbol: !symbol.is_empty(),
            })
        }
    }

    /// Render into a fresh string
    pub fn render_to_string(&mut self, report: &BootReport) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render(report, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
