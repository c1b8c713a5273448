//! Live usbmon capture through libpcap

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use pcap::{Activated, Active, Capture, Device};
use tracing::{debug, info};

use super::urb::{is_usbmon_linktype, FrameMeta};
use crate::error::{CaptureError, InitError};
use crate::keylog::FrameHandler;

/// Per-frame capture cap; boot reports sit well inside it
pub const SNAPLEN: i32 = 1500;

/// How long a read blocks before the stop flag is checked again
pub const READ_TIMEOUT_MS: i32 = 250;

/// Capture tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Deliver frames as soon as they arrive instead of batching
    pub immediate: bool,
    pub snaplen: i32,
    pub timeout_ms: i32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            immediate: true,
            snaplen: SNAPLEN,
            timeout_ms: READ_TIMEOUT_MS,
        }
    }
}

/// An activated usbmon capture
pub struct UsbMonitor {
    device: String,
    cap: Capture<Active>,
}

impl UsbMonitor {
    /// Open and activate `device`, checking it delivers usbmon frames
    pub fn open(device: &str, options: &CaptureOptions) -> Result<Self, InitError> {
        let inactive = Capture::from_device(device).map_err(|source| InitError::Create {
            device: device.to_string(),
            source,
        })?;

        let cap = inactive
            .immediate_mode(options.immediate)
            .snaplen(options.snaplen)
            .timeout(options.timeout_ms)
            .open()
            .map_err(|source| InitError::Activate {
                device: device.to_string(),
                source,
            })?;

        let linktype = cap.get_datalink().0;
        if !is_usbmon_linktype(linktype) {
            return Err(InitError::NotUsbMonitor {
                device: device.to_string(),
                linktype,
            });
        }

        info!(
            "Capturing on {} (link type {}, snaplen {}, immediate {})",
            device, linktype, options.snaplen, options.immediate
        );

        Ok(Self {
            device: device.to_string(),
            cap,
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Deliver frames to `handler` until `running` is cleared or the
    /// capture fails.
    pub fn run<W: Write>(
        &mut self,
        handler: &mut FrameHandler<W>,
        running: &AtomicBool,
    ) -> Result<(), CaptureError> {
        pump(&mut self.cap, &self.device, handler, running)
    }
}

fn pump<T: Activated + ?Sized, W: Write>(
    cap: &mut Capture<T>,
    device: &str,
    handler: &mut FrameHandler<W>,
    running: &AtomicBool,
) -> Result<(), CaptureError> {
    while running.load(Ordering::SeqCst) {
        match cap.next_packet() {
            Ok(packet) => {
                let meta = FrameMeta {
                    captured_len: packet.header.caplen,
                    wire_len: packet.header.len,
                };
                handler
                    .process_frame(packet.data, meta)
                    .map_err(CaptureError::Output)?;
            }
            Err(pcap::Error::TimeoutExpired) => {
                debug!("capture timeout on {}", device);
            }
            Err(pcap::Error::NoMorePackets) => break,
            Err(e) => return Err(CaptureError::Read(e)),
        }
    }
    info!("Capture on {} stopped", device);
    Ok(())
}

/// A capture device that looks like a usbmon interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDevice {
    pub name: String,
    pub description: Option<String>,
}

/// List usbmon capture devices known to libpcap
pub fn list_devices() -> Result<Vec<MonitorDevice>, pcap::Error> {
    let devices = Device::list()?
        .into_iter()
        .filter(|d| d.name.starts_with("usbmon"))
        .map(|d| MonitorDevice {
            name: d.name,
            description: d.desc,
        })
        .collect();
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usbmon::urb::build::FrameSpec;
    use std::io::Write as _;

    fn saved_capture(frames: &[Vec<u8>]) -> tempfile::NamedTempFile {
        let mut out = Vec::new();
        out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(SNAPLEN as u32).to_le_bytes());
        out.extend_from_slice(&189u32.to_le_bytes());
        for frame in frames {
            out.extend_from_slice(&1_700_000_000u32.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            out.extend_from_slice(frame);
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&out).unwrap();
        file.flush().unwrap();
        file
    }

    fn frames() -> Vec<Vec<u8>> {
        vec![
            FrameSpec::keyboard([0, 0, 0x04, 0, 0, 0, 0, 0]).to_bytes(),
            FrameSpec::keyboard([0; 8]).to_bytes(),
            FrameSpec::keyboard([0, 0, 0x05, 0, 0, 0, 0, 0]).to_bytes(),
        ]
    }

    #[test]
    fn test_default_options_wake_up_periodically() {
        let options = CaptureOptions::default();
        assert!(options.immediate);
        assert_eq!(options.snaplen, SNAPLEN);
        assert!(options.timeout_ms > 0);
    }

    #[test]
    fn test_pump_delivers_frames_until_end() {
        let file = saved_capture(&frames());
        let mut cap = Capture::from_file(file.path()).unwrap();
        let mut handler = FrameHandler::new(0, Vec::<u8>::new());
        let running = AtomicBool::new(true);

        pump(&mut cap, "saved", &mut handler, &running).unwrap();

        assert_eq!(handler.stats().frames, 3);
        assert_eq!(handler.into_sink(), b"ab");
    }

    #[test]
    fn test_pump_returns_once_stopped() {
        let file = saved_capture(&frames());
        let mut cap = Capture::from_file(file.path()).unwrap();
        let mut handler = FrameHandler::new(0, Vec::<u8>::new());
        let running = AtomicBool::new(false);

        pump(&mut cap, "saved", &mut handler, &running).unwrap();

        assert_eq!(handler.stats().frames, 0);
        assert!(handler.sink().is_empty());
    }
}
