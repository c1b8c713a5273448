//! Linux usbmon packet header parsing and keyboard-frame admission
//!
//! libpcap delivers usbmon traffic with a fixed binary header in front of
//! every packet (`DLT_USB_LINUX`, 48 bytes; the memory-mapped variant
//! `DLT_USB_LINUX_MMAPPED` appends 16 more bytes after the same fields).
//!
//! ```text
//! Offset  Size  Field
//! 0       8     urb id
//! 8       1     event type ('S' submit, 'C' complete, 'E' error)
//! 9       1     transfer type (0=iso, 1=int, 2=ctrl, 3=bulk)
//! 10      1     endpoint address (bit 7 = IN)
//! 11      1     device address
//! 12      2     bus id
//! 14      1     setup flag
//! 15      1     data flag (0 = payload captured)
//! 16      8     timestamp seconds
//! 24      4     timestamp microseconds
//! 28      4     status
//! 32      4     urb length
//! 36      4     data length
//! 40      8     setup packet
//! ```
//!
//! Fields are in host byte order; only little-endian captures are decoded.

use std::fmt;

use plugmein_hid::BootReport;

/// Size of the usbmon header every admissible frame starts with
pub const HEADER_LEN: usize = 48;

/// Link type of usbmon captures (`DLT_USB_LINUX`)
pub const DLT_USB_LINUX: i32 = 189;
/// Link type of memory-mapped usbmon captures (`DLT_USB_LINUX_MMAPPED`)
pub const DLT_USB_LINUX_MMAPPED: i32 = 220;

/// True if a pcap link type carries usbmon headers
pub fn is_usbmon_linktype(linktype: i32) -> bool {
    linktype == DLT_USB_LINUX || linktype == DLT_USB_LINUX_MMAPPED
}

/// URB event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Submit,
    Complete,
    Error,
    Unknown(u8),
}

impl From<u8> for EventType {
    fn from(b: u8) -> Self {
        match b {
            b'S' => Self::Submit,
            b'C' => Self::Complete,
            b'E' => Self::Error,
            other => Self::Unknown(other),
        }
    }
}

/// Direction of USB transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to device (OUT)
    Out,
    /// Device to host (IN)
    In,
}

/// USB transfer type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Isochronous,
    Interrupt,
    Control,
    Bulk,
    Unknown(u8),
}

impl From<u8> for TransferType {
    fn from(b: u8) -> Self {
        match b {
            0 => Self::Isochronous,
            1 => Self::Interrupt,
            2 => Self::Control,
            3 => Self::Bulk,
            other => Self::Unknown(other),
        }
    }
}

/// Per-frame metadata from the capture backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMeta {
    /// Bytes actually captured
    pub captured_len: u32,
    /// Bytes on the wire (may exceed `captured_len` when snaplen truncates)
    pub wire_len: u32,
}

impl FrameMeta {
    /// Metadata for a frame captured in full
    pub fn whole(frame: &[u8]) -> Self {
        let len = frame.len() as u32;
        Self {
            captured_len: len,
            wire_len: len,
        }
    }
}

/// Parsed usbmon packet header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrbHeader {
    pub id: u64,
    pub event_type: EventType,
    pub transfer_type: TransferType,
    /// Endpoint address including the direction bit
    pub endpoint: u8,
    pub device: u8,
    pub bus_id: u16,
    pub setup_flag: u8,
    pub data_flag: u8,
    pub ts_sec: i64,
    pub ts_usec: i32,
    pub status: i32,
    pub urb_len: u32,
    pub data_len: u32,
    pub setup: [u8; 8],
}

impl UrbHeader {
    /// Parse the header from the front of a frame.
    ///
    /// Returns `None` if fewer than [`HEADER_LEN`] bytes are available.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let raw: &[u8; HEADER_LEN] = raw.get(..HEADER_LEN)?.try_into().ok()?;

        let u16_at = |o: usize| u16::from_le_bytes([raw[o], raw[o + 1]]);
        let u32_at = |o: usize| u32::from_le_bytes([raw[o], raw[o + 1], raw[o + 2], raw[o + 3]]);
        let u64_at = |o: usize| {
            u64::from_le_bytes([
                raw[o],
                raw[o + 1],
                raw[o + 2],
                raw[o + 3],
                raw[o + 4],
                raw[o + 5],
                raw[o + 6],
                raw[o + 7],
            ])
        };

        Some(Self {
            id: u64_at(0),
            event_type: raw[8].into(),
            transfer_type: raw[9].into(),
            endpoint: raw[10],
            device: raw[11],
            bus_id: u16_at(12),
            setup_flag: raw[14],
            data_flag: raw[15],
            ts_sec: u64_at(16) as i64,
            ts_usec: u32_at(24) as i32,
            status: u32_at(28) as i32,
            urb_len: u32_at(32),
            data_len: u32_at(36),
            setup: [
                raw[40], raw[41], raw[42], raw[43], raw[44], raw[45], raw[46], raw[47],
            ],
        })
    }

    pub fn direction(&self) -> Direction {
        if self.endpoint & 0x80 != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// Why a frame is not a keyboard report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Shorter than the usbmon header
    Truncated,
    /// From a bus other than the filtered one
    OtherBus,
    /// Submit or error event
    NotComplete,
    /// Host-to-device transfer (e.g. LED state writes)
    HostToDevice,
    /// Data flag set: no payload captured
    NoPayload,
    /// Zero-length payload
    EmptyPayload,
    /// Declared payload longer than what was captured
    PayloadTruncated,
    /// Payload is not 8 bytes long
    NotBootReport,
}

impl Rejection {
    pub const ALL: [Rejection; 8] = [
        Self::Truncated,
        Self::OtherBus,
        Self::NotComplete,
        Self::HostToDevice,
        Self::NoPayload,
        Self::EmptyPayload,
        Self::PayloadTruncated,
        Self::NotBootReport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Truncated => "truncated",
            Self::OtherBus => "other bus",
            Self::NotComplete => "not complete",
            Self::HostToDevice => "host to device",
            Self::NoPayload => "no payload",
            Self::EmptyPayload => "empty payload",
            Self::PayloadTruncated => "payload truncated",
            Self::NotBootReport => "not a boot report",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check whether a frame is a completed IN transfer carrying a boot report.
///
/// A `bus_filter` of 0 accepts every bus.
pub fn check_frame(frame: &[u8], meta: FrameMeta, bus_filter: u16) -> Result<UrbHeader, Rejection> {
    let captured = meta.captured_len as usize;
    if captured < HEADER_LEN {
        return Err(Rejection::Truncated);
    }
    let header = UrbHeader::parse(frame).ok_or(Rejection::Truncated)?;

    if bus_filter != 0 && header.bus_id != bus_filter {
        return Err(Rejection::OtherBus);
    }
    if header.event_type != EventType::Complete {
        return Err(Rejection::NotComplete);
    }
    if header.direction() != Direction::In {
        return Err(Rejection::HostToDevice);
    }
    if header.data_flag != 0 {
        return Err(Rejection::NoPayload);
    }
    if header.data_len == 0 {
        return Err(Rejection::EmptyPayload);
    }
    if HEADER_LEN as u64 + header.data_len as u64 > captured as u64 {
        return Err(Rejection::PayloadTruncated);
    }
    if header.data_len as usize != BootReport::LEN {
        return Err(Rejection::NotBootReport);
    }

    Ok(header)
}

/// Predicate form of [`check_frame`]
pub fn is_admissible(frame: &[u8], meta: FrameMeta, bus_filter: u16) -> bool {
    check_frame(frame, meta, bus_filter).is_ok()
}

/// Build a usbmon frame (test helper shared with integration tests)
#[cfg(any(test, feature = "test-util"))]
pub mod build {
    use super::HEADER_LEN;

    /// Fields of a synthetic usbmon frame
    #[derive(Debug, Clone)]
    pub struct FrameSpec {
        pub event_type: u8,
        pub transfer_type: u8,
        pub endpoint: u8,
        pub bus_id: u16,
        pub data_flag: u8,
        pub data_len: u32,
        pub payload: Vec<u8>,
    }

    impl FrameSpec {
        /// Completed interrupt-IN transfer on bus 1 carrying `report`
        pub fn keyboard(report: [u8; 8]) -> Self {
            Self {
                event_type: b'C',
                transfer_type: 1,
                endpoint: 0x81,
                bus_id: 1,
                data_flag: 0,
                data_len: 8,
                payload: report.to_vec(),
            }
        }

        pub fn to_bytes(&self) -> Vec<u8> {
            let mut raw = vec![0u8; HEADER_LEN];
            raw[0..8].copy_from_slice(&0xFFFF_8800_1234_5678u64.to_le_bytes());
            raw[8] = self.event_type;
            raw[9] = self.transfer_type;
            raw[10] = self.endpoint;
            raw[11] = 3;
            raw[12..14].copy_from_slice(&self.bus_id.to_le_bytes());
            raw[14] = b'-';
            raw[15] = self.data_flag;
            raw[32..36].copy_from_slice(&8u32.to_le_bytes());
            raw[36..40].copy_from_slice(&self.data_len.to_le_bytes());
            raw.extend_from_slice(&self.payload);
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build::FrameSpec;
    use super::*;

    const SHIFT_A: [u8; 8] = [0x02, 0x00, 0x04, 0, 0, 0, 0, 0];

    fn admit(spec: &FrameSpec, bus_filter: u16) -> Result<UrbHeader, Rejection> {
        let raw = spec.to_bytes();
        check_frame(&raw, FrameMeta::whole(&raw), bus_filter)
    }

    #[test]
    fn test_parse_header_fields() {
        let raw = FrameSpec::keyboard(SHIFT_A).to_bytes();
        let header = UrbHeader::parse(&raw).unwrap();
        assert_eq!(header.id, 0xFFFF_8800_1234_5678);
        assert_eq!(header.event_type, EventType::Complete);
        assert_eq!(header.transfer_type, TransferType::Interrupt);
        assert_eq!(header.direction(), Direction::In);
        assert_eq!(header.device, 3);
        assert_eq!(header.bus_id, 1);
        assert_eq!(header.urb_len, 8);
        assert_eq!(header.data_len, 8);
    }

    #[test]
    fn test_keyboard_frame_admitted() {
        assert!(admit(&FrameSpec::keyboard(SHIFT_A), 0).is_ok());
        assert!(admit(&FrameSpec::keyboard(SHIFT_A), 1).is_ok());
    }

    #[test]
    fn test_short_frames_rejected() {
        let raw = FrameSpec::keyboard(SHIFT_A).to_bytes();
        for len in 0..HEADER_LEN {
            let frame = &raw[..len];
            assert!(!is_admissible(frame, FrameMeta::whole(frame), 0), "len {len}");
        }
    }

    #[test]
    fn test_captured_len_below_header_rejected() {
        let raw = FrameSpec::keyboard(SHIFT_A).to_bytes();
        let meta = FrameMeta {
            captured_len: 40,
            wire_len: raw.len() as u32,
        };
        assert_eq!(check_frame(&raw, meta, 0), Err(Rejection::Truncated));
    }

    #[test]
    fn test_bus_filter() {
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.bus_id = 2;
        assert_eq!(admit(&spec, 1), Err(Rejection::OtherBus));
        assert!(admit(&spec, 2).is_ok());
        assert!(admit(&spec, 0).is_ok());
    }

    #[test]
    fn test_non_complete_rejected() {
        for ev in [b'S', b'E', b'X'] {
            let mut spec = FrameSpec::keyboard(SHIFT_A);
            spec.event_type = ev;
            assert_eq!(admit(&spec, 0), Err(Rejection::NotComplete));
        }
    }

    #[test]
    fn test_out_endpoint_rejected() {
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.endpoint = 0x01;
        assert_eq!(admit(&spec, 0), Err(Rejection::HostToDevice));
    }

    #[test]
    fn test_data_flag_rejected() {
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.data_flag = b'<';
        assert_eq!(admit(&spec, 0), Err(Rejection::NoPayload));
    }

    #[test]
    fn test_empty_payload_rejected() {
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.data_len = 0;
        spec.payload.clear();
        assert_eq!(admit(&spec, 0), Err(Rejection::EmptyPayload));
    }

    #[test]
    fn test_declared_len_exceeds_capture() {
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.payload.truncate(4);
        assert_eq!(admit(&spec, 0), Err(Rejection::PayloadTruncated));
    }

    #[test]
    fn test_non_boot_payload_rejected() {
        for len in [1usize, 7, 9, 64] {
            let mut spec = FrameSpec::keyboard(SHIFT_A);
            spec.data_len = len as u32;
            spec.payload = vec![0u8; len];
            assert_eq!(admit(&spec, 0), Err(Rejection::NotBootReport), "len {len}");
        }
    }

    #[test]
    fn test_rejection_order_prefers_bus_filter() {
        // Wrong bus and a submit event: bus filter is checked first
        let mut spec = FrameSpec::keyboard(SHIFT_A);
        spec.bus_id = 5;
        spec.event_type = b'S';
        assert_eq!(admit(&spec, 1), Err(Rejection::OtherBus));
    }

    #[test]
    fn test_linktypes() {
        assert!(is_usbmon_linktype(189));
        assert!(is_usbmon_linktype(220));
        assert!(!is_usbmon_linktype(1));
        assert!(!is_usbmon_linktype(249)); // USBPcap
    }
}
