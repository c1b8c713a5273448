//! Per-frame keystroke pipeline
//!
//! `FrameHandler` is the callback context handed to a capture or replay
//! session: it owns the bus filter, the renderer state and the output
//! sink, and runs validate → decode → render for each frame.

use std::collections::HashMap;
use std::io::{self, Write};

use plugmein_hid::{BootReport, Rendered, Renderer};
use tracing::{debug, trace};

use crate::usbmon::urb::{check_frame, FrameMeta, Rejection};

/// Frame counters for debugging
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    pub frames: u64,
    pub rejected: HashMap<Rejection, u64>,
    pub malformed: u64,
    pub releases: u64,
    pub modifier_only: u64,
    pub keystrokes: u64,
    pub unknown_keys: u64,
}

impl FrameStats {
    pub fn rejected(&self, reason: Rejection) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn print_summary(&self) {
        eprintln!("\nFrame statistics:");
        eprintln!("  Frames seen:        {}", self.frames);
        for reason in Rejection::ALL {
            eprintln!("  Rejected ({}): {}", reason, self.rejected(reason));
        }
        eprintln!("  Malformed:          {}", self.malformed);
        eprintln!("  Releases:           {}", self.releases);
        eprintln!("  Modifier only:      {}", self.modifier_only);
        eprintln!("  Keystrokes:         {}", self.keystrokes);
        eprintln!("  Unknown keys:       {}", self.unknown_keys);
    }
}

/// Callback context turning usbmon frames into text on `W`
pub struct FrameHandler<W: Write> {
    bus_filter: u16,
    renderer: Renderer,
    sink: W,
    stats: FrameStats,
}

impl<W: Write> FrameHandler<W> {
    /// `bus_filter` of 0 accepts frames from every bus
    pub fn new(bus_filter: u16, sink: W) -> Self {
        Self {
            bus_filter,
            renderer: Renderer::new(),
            sink,
            stats: FrameStats::default(),
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Process one captured frame.
    ///
    /// Frames that are not keyboard reports are skipped silently. Only
    /// failures writing to the sink are returned.
    pub fn process_frame(&mut self, frame: &[u8], meta: FrameMeta) -> io::Result<()> {
        self.stats.frames += 1;

        if let Err(reason) = check_frame(frame, meta, self.bus_filter) {
            trace!("skip frame: {reason}");
            *self.stats.rejected.entry(reason).or_default() += 1;
            return Ok(());
        }

        let report = match BootReport::from_frame(frame, meta.captured_len as usize) {
            Ok(r) => r,
            Err(e) => {
                debug!("dropping frame: {e}");
                self.stats.malformed += 1;
                return Ok(());
            }
        };

        if report.is_release() {
            self.stats.releases += 1;
        }

        match self.renderer.render(&report, &mut self.sink)? {
            Rendered::Nothing if report.has_modifiers() => self.stats.modifier_only += 1,
            Rendered::Nothing => {}
            Rendered::Key { symbol: true } => self.stats.keystrokes += 1,
            Rendered::Key { symbol: false } => {
                debug!("no symbol for usage 0x{:02x}", report.primary_key());
                self.stats.unknown_keys += 1;
            }
        }

        self.sink.flush()
    }
}
