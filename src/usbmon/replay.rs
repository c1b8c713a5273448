//! Offline replay of recorded usbmon captures (pcap or pcapng)
//!
//! Frames are fed through the same `FrameHandler` as a live capture, so a
//! capture taken with `tcpdump -i usbmon0 -w keys.pcap` decodes to the same
//! text the live session would have printed.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use pcap_parser::pcapng::Block;
use pcap_parser::{create_reader, PcapBlockOwned, PcapError};
use tracing::{debug, info, warn};

use super::urb::{is_usbmon_linktype, FrameMeta};
use crate::error::ReplayError;
use crate::keylog::FrameHandler;

/// Totals for one replayed file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub packets: u64,
    pub interfaces: u64,
    /// Trailing block was cut off
    pub truncated: bool,
}

/// Initial reader buffer
const BUFFER_SIZE: usize = 65536;
/// Largest buffer a single oversized record may grow the reader to
const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

enum Record {
    Interface(i32),
    Packet { meta: FrameMeta, data: Vec<u8> },
}

/// Replay every packet of `path` through `handler`
pub fn replay_file<W: Write>(
    path: &Path,
    handler: &mut FrameHandler<W>,
) -> Result<ReplaySummary, ReplayError> {
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buffer_size = BUFFER_SIZE;
    let mut reader =
        create_reader(buffer_size, file).map_err(|e| ReplayError::Parse(format!("{:?}", e)))?;

    let mut summary = ReplaySummary::default();

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                // Copy out what we need before consume() invalidates the block
                let record = match &block {
                    PcapBlockOwned::LegacyHeader(hdr) => Some(Record::Interface(hdr.network.0)),
                    PcapBlockOwned::Legacy(lp) => Some(Record::Packet {
                        meta: FrameMeta {
                            captured_len: lp.caplen,
                            wire_len: lp.origlen,
                        },
                        data: lp.data[..(lp.caplen as usize).min(lp.data.len())].to_vec(),
                    }),
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        Some(Record::Interface(idb.linktype.0))
                    }
                    // EPB data carries padding up to a 32-bit boundary
                    PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => Some(Record::Packet {
                        meta: FrameMeta {
                            captured_len: epb.caplen,
                            wire_len: epb.origlen,
                        },
                        data: epb.data[..(epb.caplen as usize).min(epb.data.len())].to_vec(),
                    }),
                    _ => None,
                };

                reader.consume(offset);

                match record {
                    Some(Record::Interface(linktype)) => {
                        if !is_usbmon_linktype(linktype) {
                            return Err(ReplayError::NotUsbMonitor(linktype));
                        }
                        summary.interfaces += 1;
                    }
                    Some(Record::Packet { meta, data }) => {
                        summary.packets += 1;
                        handler
                            .process_frame(&data, meta)
                            .map_err(ReplayError::Output)?;
                    }
                    None => {}
                }
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::UnexpectedEof) => {
                warn!("Could not read complete data block (file may be truncated)");
                summary.truncated = true;
                break;
            }
            Err(PcapError::BufferTooSmall) => {
                // usbmon snaplen is 256 KiB by default, so bulk transfers exceed the buffer
                if buffer_size >= MAX_BUFFER_SIZE {
                    return Err(ReplayError::Parse(format!(
                        "record larger than {} bytes",
                        MAX_BUFFER_SIZE
                    )));
                }
                buffer_size = (buffer_size * 2).min(MAX_BUFFER_SIZE);
                debug!("growing replay buffer to {} bytes", buffer_size);
                if !reader.grow(buffer_size) {
                    return Err(ReplayError::Parse(format!(
                        "could not grow buffer to {} bytes",
                        buffer_size
                    )));
                }
                reader
                    .refill()
                    .map_err(|e| ReplayError::Parse(format!("Refill error: {:?}", e)))?;
            }
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| ReplayError::Parse(format!("Refill error: {:?}", e)))?;
            }
            Err(e) => return Err(ReplayError::Parse(format!("{:?}", e))),
        }
    }

    info!(
        "Replayed {} packets from {}",
        summary.packets,
        path.display()
    );
    Ok(summary)
}
