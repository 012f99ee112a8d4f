//! Telegram framing for the ISM8 wire protocol.
//!
//! Every telegram starts with a fixed four byte signature followed by the
//! total frame length, a connection header, the object server service and
//! a service specific body:
//!
//! | Offset | Size | Content                                    |
//! |--------|------|--------------------------------------------|
//! | 0      | 4    | signature `06 20 F0 80`                    |
//! | 4      | 2    | frame length, big-endian, whole telegram   |
//! | 6      | 4    | connection header `04 00 00 00`            |
//! | 10     | 1    | main service `F0`                          |
//! | 11     | 1    | sub service                                |
//! | 12     | 2    | start datapoint, big-endian                |
//! | 14     | 2    | datapoint count, big-endian                |
//! | 16     | ..   | datapoint entries                          |
//!
//! Each entry is `{ id: u16, command: u8, length: u8, value: [u8; length] }`.
//! The [`Framer`] accumulates raw socket bytes and yields complete
//! telegrams independently of how the stream was chunked.

use crate::error::{Ism8Error, Result};

pub(crate) const SIGNATURE: [u8; 4] = [0x06, 0x20, 0xF0, 0x80];
pub(crate) const CONNECTION_HEADER: [u8; 4] = [0x04, 0x00, 0x00, 0x00];
pub(crate) const MAIN_SERVICE: u8 = 0xF0;

/// Sub service: gateway pushes datapoint values to us.
pub(crate) const SERVICE_DATAPOINT_VALUE_IND: u8 = 0x06;
/// Sub service: acknowledgement for a received value indication.
pub(crate) const SERVICE_DATAPOINT_VALUE_RES: u8 = 0x86;
/// Sub service: we write a datapoint value to the gateway.
pub(crate) const SERVICE_SET_DATAPOINT_REQ: u8 = 0xC1;
/// Sub service: ask the gateway to re-send every datapoint.
pub(crate) const SERVICE_REQUEST_ALL_DATAPOINTS: u8 = 0xD0;

/// Header plus service block; the shortest well-formed telegram.
const MIN_FRAME_LEN: usize = 16;
/// Signature, length field and connection header.
const HEADER_LEN: usize = 10;
/// Offset of the first datapoint entry.
const ENTRIES_OFFSET: usize = 16;

/// One datapoint entry inside a telegram body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Datapoint identifier.
    pub id: u16,
    /// Command byte; the gateway sends `0x03` for value indications.
    pub command: u8,
    /// Raw value bytes. May be empty, which carries no value.
    pub raw: Vec<u8>,
}

/// A parsed telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    /// Sub service byte; `0x06` for value indications.
    pub service: u8,
    /// Start datapoint from the service block, echoed back in the ack.
    pub start_datapoint: u16,
    /// Datapoint entries, in wire order.
    pub entries: Vec<Entry>,
}

/// Incremental telegram parser over a byte stream.
///
/// Feed arbitrary chunks with [`extend`](Framer::extend) and drain
/// complete telegrams with [`next_telegram`](Framer::next_telegram).
/// Bytes that precede a signature are discarded, so the parser recovers
/// from a stream joined mid-telegram. Discards draw on a budget the size
/// of the buffer limit; it refills with every parsed telegram, and a
/// stream that exhausts it without producing one is beyond recovery.
#[derive(Debug)]
pub struct Framer {
    buf: Vec<u8>,
    max_buffered: usize,
    discarded: usize,
}

impl Framer {
    /// Creates a framer that refuses to buffer more than `max_buffered`
    /// bytes of incomplete input.
    pub fn new(max_buffered: usize) -> Self {
        Framer {
            buf: Vec::new(),
            max_buffered,
            discarded: 0,
        }
    }

    /// Appends received bytes.
    ///
    /// Fails if the unconsumed buffer would exceed the configured limit;
    /// the connection is beyond recovery at that point and should be
    /// dropped.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buf.len() + bytes.len() > self.max_buffered {
            return Err(Ism8Error::framing(format!(
                "receive buffer limit of {} bytes exceeded",
                self.max_buffered
            )));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Number of buffered bytes not yet consumed by a telegram.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Extracts the next complete telegram, or `None` if more input is
    /// needed.
    ///
    /// Frames with an impossible length field or a foreign connection
    /// header are skipped byte-wise until the stream realigns. Fails with
    /// [`Ism8Error::Framing`] once more bytes than the buffer limit have
    /// been discarded without a telegram in between; the connection
    /// should be dropped at that point.
    pub fn next_telegram(&mut self) -> Result<Option<Telegram>> {
        loop {
            self.discarded += self.align();
            if self.discarded > self.max_buffered {
                return Err(Ism8Error::framing(format!(
                    "resynchronization exhausted after {} discarded bytes",
                    self.discarded
                )));
            }
            if self.buf.len() < HEADER_LEN {
                return Ok(None);
            }
            let frame_len = usize::from(u16::from_be_bytes([self.buf[4], self.buf[5]]));
            if frame_len < MIN_FRAME_LEN || frame_len > self.max_buffered {
                // Not a real frame start, only a signature look-alike.
                self.buf.drain(..1);
                self.discarded += 1;
                continue;
            }
            if self.buf.len() < frame_len {
                return Ok(None);
            }
            if self.buf[6..10] != CONNECTION_HEADER || self.buf[10] != MAIN_SERVICE {
                self.buf.drain(..1);
                self.discarded += 1;
                continue;
            }
            let frame: Vec<u8> = self.buf.drain(..frame_len).collect();
            self.discarded = 0;
            return Ok(Some(parse_frame(&frame)));
        }
    }

    /// Drops bytes until the buffer starts with the signature and returns
    /// how many were dropped. Keeps a partial signature suffix so a split
    /// signature still matches.
    fn align(&mut self) -> usize {
        let mut start = 0;
        while start < self.buf.len() {
            let rest = &self.buf[start..];
            let probe = rest.len().min(SIGNATURE.len());
            if rest[..probe] == SIGNATURE[..probe] {
                break;
            }
            start += 1;
        }
        if start > 0 {
            self.buf.drain(..start);
        }
        start
    }
}

/// Parses one complete frame. The caller guarantees signature, length
/// and connection header are already validated.
fn parse_frame(frame: &[u8]) -> Telegram {
    let service = frame[11];
    let start_datapoint = u16::from_be_bytes([frame[12], frame[13]]);
    let mut entries = Vec::new();
    let mut offset = ENTRIES_OFFSET;
    // A truncated trailing entry ends the walk; entries parsed before it
    // are kept.
    while frame.len().saturating_sub(offset) >= 4 {
        let id = u16::from_be_bytes([frame[offset], frame[offset + 1]]);
        let command = frame[offset + 2];
        let length = usize::from(frame[offset + 3]);
        offset += 4;
        if frame.len() - offset < length {
            break;
        }
        entries.push(Entry {
            id,
            command,
            raw: frame[offset..offset + length].to_vec(),
        });
        offset += length;
    }
    Telegram {
        service,
        start_datapoint,
        entries,
    }
}

/// Builds the acknowledgement for a received value indication.
///
/// The start datapoint of the acknowledged telegram is echoed back;
/// everything else is fixed.
pub fn build_ack(start_datapoint: u16) -> [u8; 17] {
    let [hi, lo] = start_datapoint.to_be_bytes();
    [
        0x06, 0x20, 0xF0, 0x80, // signature
        0x00, 0x11, // frame length 17
        0x04, 0x00, 0x00, 0x00, // connection header
        MAIN_SERVICE,
        SERVICE_DATAPOINT_VALUE_RES,
        hi,
        lo,
        0x00,
        0x00,
        0x00,
    ]
}

/// Builds a write telegram carrying one datapoint entry.
pub fn build_write(id: u16, raw: &[u8]) -> Vec<u8> {
    let frame_len = ENTRIES_OFFSET + 4 + raw.len();
    let mut frame = Vec::with_capacity(frame_len);
    frame.extend_from_slice(&SIGNATURE);
    frame.extend_from_slice(&(frame_len as u16).to_be_bytes());
    frame.extend_from_slice(&CONNECTION_HEADER);
    frame.push(MAIN_SERVICE);
    frame.push(SERVICE_SET_DATAPOINT_REQ);
    frame.extend_from_slice(&id.to_be_bytes()); // start datapoint
    frame.extend_from_slice(&1u16.to_be_bytes()); // datapoint count
    frame.extend_from_slice(&id.to_be_bytes());
    frame.push(0x00); // command byte is zero on writes
    frame.push(raw.len() as u8);
    frame.extend_from_slice(raw);
    frame
}

/// Builds the request that makes the gateway re-send all datapoints.
pub fn build_request_all() -> [u8; 16] {
    [
        0x06, 0x20, 0xF0, 0x80, // signature
        0x00, 0x10, // frame length 16
        0x04, 0x00, 0x00, 0x00, // connection header
        MAIN_SERVICE,
        SERVICE_REQUEST_ALL_DATAPOINTS,
        0x00, 0x00, 0x00, 0x00,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 4096;

    // DatapointValue.Ind for datapoint 72, bool, value true.
    fn bool_telegram() -> Vec<u8> {
        hex::decode("0620f080001504000000f006004800010048030101").unwrap()
    }

    // DatapointValue.Ind for datapoint 178, float16 6.1 degrees.
    fn float_telegram() -> Vec<u8> {
        hex::decode("0620f080001604000000f00600b2000100b203020262").unwrap()
    }

    #[test]
    fn test_parse_single_telegram() {
        let mut framer = Framer::new(MAX);
        framer.extend(&bool_telegram()).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.service, SERVICE_DATAPOINT_VALUE_IND);
        assert_eq!(telegram.start_datapoint, 72);
        assert_eq!(telegram.entries.len(), 1);
        assert_eq!(telegram.entries[0].id, 72);
        assert_eq!(telegram.entries[0].command, 0x03);
        assert_eq!(telegram.entries[0].raw, vec![0x01]);
        assert!(framer.next_telegram().unwrap().is_none());
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_chunking_is_invisible() {
        // Feeding the stream one byte at a time must parse exactly the
        // same telegram as one contiguous read.
        let wire = float_telegram();
        let mut framer = Framer::new(MAX);
        let mut parsed = Vec::new();
        for byte in &wire {
            framer.extend(std::slice::from_ref(byte)).unwrap();
            while let Some(t) = framer.next_telegram().unwrap() {
                parsed.push(t);
            }
        }
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].entries[0].id, 178);
        assert_eq!(parsed[0].entries[0].raw, vec![0x02, 0x62]);
    }

    #[test]
    fn test_two_concatenated_telegrams() {
        let mut wire = bool_telegram();
        wire.extend_from_slice(&float_telegram());
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let first = framer.next_telegram().unwrap().unwrap();
        let second = framer.next_telegram().unwrap().unwrap();
        assert_eq!(first.entries[0].id, 72);
        assert_eq!(second.entries[0].id, 178);
        assert!(framer.next_telegram().unwrap().is_none());
    }

    #[test]
    fn test_multiple_entries_in_one_telegram() {
        // Two entries: dp 1 bool false, dp 4 float16.
        let wire = hex::decode("0620f080001b04000000f006000100020001030100000403020262").unwrap();
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.start_datapoint, 1);
        assert_eq!(telegram.entries.len(), 2);
        assert_eq!(telegram.entries[0].id, 1);
        assert_eq!(telegram.entries[0].raw, vec![0x00]);
        assert_eq!(telegram.entries[1].id, 4);
        assert_eq!(telegram.entries[1].raw, vec![0x02, 0x62]);
    }

    #[test]
    fn test_zero_length_entry_is_kept_raw() {
        // Entry for dp 117 with length zero carries no value bytes.
        let wire = hex::decode("0620f080001404000000f0060075000100750300").unwrap();
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.entries.len(), 1);
        assert_eq!(telegram.entries[0].id, 117);
        assert!(telegram.entries[0].raw.is_empty());
    }

    #[test]
    fn test_truncated_entry_keeps_earlier_entries() {
        // Second entry announces four value bytes but the frame ends
        // after one.
        let wire = hex::decode("0620f080001a04000000f00600010002000103010000040304ff").unwrap();
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.entries.len(), 1);
        assert_eq!(telegram.entries[0].id, 1);
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut wire = vec![0xDE, 0xAD, 0xBE, 0xEF];
        wire.extend_from_slice(&bool_telegram());
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.entries[0].id, 72);
    }

    #[test]
    fn test_partial_signature_is_retained() {
        let wire = bool_telegram();
        let mut framer = Framer::new(MAX);
        // First two signature bytes only; must not be discarded.
        framer.extend(&wire[..2]).unwrap();
        assert!(framer.next_telegram().unwrap().is_none());
        assert_eq!(framer.pending(), 2);
        framer.extend(&wire[2..]).unwrap();
        assert!(framer.next_telegram().unwrap().is_some());
    }

    #[test]
    fn test_bogus_length_field_realigns() {
        // Signature followed by an impossible length, then a valid
        // telegram.
        let mut wire = vec![0x06, 0x20, 0xF0, 0x80, 0x00, 0x01];
        wire.extend_from_slice(&bool_telegram());
        let mut framer = Framer::new(MAX);
        framer.extend(&wire).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.entries[0].id, 72);
    }

    #[test]
    fn test_resync_exhaustion_is_fatal() {
        let mut framer = Framer::new(64);
        // A stream of pure garbage must not be discarded forever.
        for _ in 0..2 {
            framer.extend(&[0x55u8; 32]).unwrap();
            assert!(framer.next_telegram().unwrap().is_none());
        }
        framer.extend(&[0x55u8; 32]).unwrap();
        let err = framer.next_telegram().unwrap_err();
        assert!(matches!(err, Ism8Error::Framing { .. }));
    }

    #[test]
    fn test_discard_budget_resets_per_telegram() {
        let mut framer = Framer::new(64);
        // Interleaved noise below the budget stays survivable as long as
        // telegrams keep coming through.
        for _ in 0..4 {
            framer.extend(&[0x55u8; 20]).unwrap();
            assert!(framer.next_telegram().unwrap().is_none());
            framer.extend(&bool_telegram()).unwrap();
            assert!(framer.next_telegram().unwrap().is_some());
        }
    }

    #[test]
    fn test_buffer_limit_is_enforced() {
        let mut framer = Framer::new(8);
        let err = framer.extend(&[0u8; 9]).unwrap_err();
        assert!(matches!(err, Ism8Error::Framing { .. }));
    }

    #[test]
    fn test_build_ack() {
        assert_eq!(
            build_ack(72).to_vec(),
            hex::decode("0620f080001104000000f0860048000000").unwrap()
        );
        // Start datapoint is echoed verbatim.
        assert_eq!(build_ack(0x01FF)[12..14], [0x01, 0xFF]);
    }

    #[test]
    fn test_build_write() {
        let frame = build_write(56, &[0x0C, 0x1A]);
        assert_eq!(
            frame,
            hex::decode("0620f080001604000000f0c100380001003800020c1a").unwrap()
        );
        assert_eq!(&frame[..4], &SIGNATURE);
        assert_eq!(u16::from_be_bytes([frame[4], frame[5]]) as usize, frame.len());
        assert_eq!(frame[11], SERVICE_SET_DATAPOINT_REQ);
        assert_eq!(u16::from_be_bytes([frame[12], frame[13]]), 56);
        assert_eq!(u16::from_be_bytes([frame[14], frame[15]]), 1);
        assert_eq!(u16::from_be_bytes([frame[16], frame[17]]), 56);
        assert_eq!(frame[18], 0x00);
        assert_eq!(frame[19], 2);
        assert_eq!(&frame[20..], &[0x0C, 0x1A]);
    }

    #[test]
    fn test_write_telegram_parses_back() {
        let mut framer = Framer::new(MAX);
        framer.extend(&build_write(56, &[0x0C, 0x1A])).unwrap();
        let telegram = framer.next_telegram().unwrap().unwrap();
        assert_eq!(telegram.service, SERVICE_SET_DATAPOINT_REQ);
        assert_eq!(telegram.start_datapoint, 56);
        assert_eq!(telegram.entries[0].raw, vec![0x0C, 0x1A]);
    }

    #[test]
    fn test_build_request_all() {
        assert_eq!(
            build_request_all().to_vec(),
            hex::decode("0620f080001004000000f0d000000000").unwrap()
        );
    }
}
