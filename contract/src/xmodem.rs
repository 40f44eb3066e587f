//! XMODEM-derived block transfer framing shared by the monitor's receiver
//! and the host-side transfer tool.
//!
//! Constants and frame layout are grounded directly on
//! `examples/original_source/tools/kz_xmodem/src/kz_xmodem.c`: a 132-byte
//! frame of `[SOH][block][~block][128 bytes payload][checksum]`, a 1-byte
//! additive checksum, and the control-byte handshake (`NAK` to request a
//! retransmit, `ACK` to accept a block, `CAN` to abort, `EOT` to end).

/// Start Of Header: begins every data frame.
pub const SOH: u8 = 0x01;
/// End Of Transmission: sent once all data frames are done.
pub const EOT: u8 = 0x04;
/// Positive acknowledgement of a received frame.
pub const ACK: u8 = 0x06;
/// Negative acknowledgement / retransmit request.
pub const NAK: u8 = 0x15;
/// Cancel: either side may abort the transfer with this byte.
pub const CAN: u8 = 0x18;
/// Padding byte used to fill a short final block.
pub const EOF_PAD: u8 = 0x1A;

/// Payload bytes carried per data frame.
pub const DATA_LEN: usize = 128;
/// Total bytes on the wire per data frame: SOH, block, ~block, data, checksum.
pub const FRAME_LEN: usize = 1 + 1 + 1 + DATA_LEN + 1;

/// Short poll interval while waiting for the target's initial NAK, in
/// milliseconds. Matches `kz_xmodem.c`'s `select()` timeout of 10ms.
pub const TIMEOUT_SHORT_MS: u64 = 10;
/// Long per-block ACK/NAK wait, in milliseconds. Matches the 1 second
/// `select()` timeout used once the transfer is under way.
pub const TIMEOUT_LONG_MS: u64 = 1000;
/// How long the host waits, in total, for the target's first NAK before
/// giving up (`20` retries of the short timeout in the original tool).
pub const NAK_WAIT_SECS: u64 = 20;

/// A single encoded/decoded XMODEM data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub block: u8,
    pub data: [u8; DATA_LEN],
}

impl Frame {
    pub fn new(block: u8, data: [u8; DATA_LEN]) -> Self {
        Frame { block, data }
    }

    /// Additive checksum over the payload, truncated to a byte. Matches
    /// `kz_xmodem.c`'s `CALC_CHECKSUM` macro.
    pub fn checksum(&self) -> u8 {
        self.data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
    }

    /// Encodes this frame into the 132-byte wire representation.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[0] = SOH;
        out[1] = self.block;
        out[2] = !self.block;
        out[3..3 + DATA_LEN].copy_from_slice(&self.data);
        out[3 + DATA_LEN] = self.checksum();
        out
    }

    /// Decodes a 132-byte wire frame, validating the block complement and
    /// checksum. Returns `None` on any framing mismatch.
    pub fn decode(bytes: &[u8; FRAME_LEN]) -> Option<Self> {
        if bytes[0] != SOH {
            return None;
        }
        let block = bytes[1];
        if bytes[2] != !block {
            return None;
        }
        let mut data = [0u8; DATA_LEN];
        data.copy_from_slice(&bytes[3..3 + DATA_LEN]);
        let frame = Frame { block, data };
        if bytes[3 + DATA_LEN] != frame.checksum() {
            return None;
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut data = [0u8; DATA_LEN];
        for (i, b) in data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let frame = Frame::new(3, data);
        let encoded = frame.encode();
        let decoded = Frame::decode(&encoded).expect("valid frame decodes");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn rejects_bad_checksum() {
        let frame = Frame::new(1, [0xAAu8; DATA_LEN]);
        let mut encoded = frame.encode();
        encoded[FRAME_LEN - 1] ^= 0xFF;
        assert!(Frame::decode(&encoded).is_none());
    }

    #[test]
    fn rejects_bad_block_complement() {
        let frame = Frame::new(1, [0u8; DATA_LEN]);
        let mut encoded = frame.encode();
        encoded[2] = 0x00;
        assert!(Frame::decode(&encoded).is_none());
    }
}
