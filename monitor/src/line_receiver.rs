//! Interrupt-driven line assembly for the boot monitor's command prompt
//! (spec §4.2). Runs entirely inside the `SerialInterrupt` handler: each
//! received byte is appended to a fixed-capacity buffer until a newline
//! completes a line or the buffer fills first.
//!
//! Grounded on the bounded-buffer-plus-drain shape of
//! `amoljassal-sis-kernel-showcase/crates/kernel/src/arch/x86_64/serial.rs`'s
//! receive path, generalized from byte-at-a-time echo to whole-line
//! delivery.

pub const LINE_CAPACITY: usize = 128;

/// A line delivered to the consumer once a newline completes it.
/// `truncated` is set if the line exceeded [`LINE_CAPACITY`]; the
/// leading `LINE_CAPACITY` bytes are kept, and the rest were dropped on
/// the floor per spec §4.2's "no retries" failure policy.
#[derive(Clone, Copy)]
pub struct Line {
    bytes: [u8; LINE_CAPACITY],
    len: usize,
    pub truncated: bool,
}

impl Line {
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

pub struct LineReceiver {
    buf: [u8; LINE_CAPACITY],
    len: usize,
    truncated: bool,
}

impl LineReceiver {
    pub const fn new() -> Self {
        LineReceiver {
            buf: [0; LINE_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    /// Feeds one byte from the serial IRQ. Returns the completed line on
    /// `\n` or `\r`; otherwise appends (dropping the byte and marking
    /// truncation if the buffer is already full) and returns `None`.
    pub fn on_byte(&mut self, byte: u8) -> Option<Line> {
        if byte == b'\n' || byte == b'\r' {
            let line = Line {
                bytes: self.buf,
                len: self.len,
                truncated: self.truncated,
            };
            self.len = 0;
            self.truncated = false;
            return Some(line);
        }

        if self.len < LINE_CAPACITY {
            self.buf[self.len] = byte;
            self.len += 1;
        } else {
            self.truncated = true;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_line_on_newline() {
        let mut rx = LineReceiver::new();
        for b in b"echo hi" {
            assert!(rx.on_byte(*b).is_none());
        }
        let line = rx.on_byte(b'\n').expect("newline completes the line");
        assert_eq!(line.as_str(), "echo hi");
        assert!(!line.truncated);
    }

    #[test]
    fn overflow_truncates_but_still_completes_on_next_newline() {
        let mut rx = LineReceiver::new();
        for _ in 0..LINE_CAPACITY + 10 {
            rx.on_byte(b'x');
        }
        let line = rx.on_byte(b'\n').expect("newline still completes the line");
        assert_eq!(line.as_str().len(), LINE_CAPACITY);
        assert!(line.truncated);
    }

    #[test]
    fn buffer_resets_after_delivery() {
        let mut rx = LineReceiver::new();
        for b in b"exit" {
            rx.on_byte(*b);
        }
        rx.on_byte(b'\n');
        for b in b"echo again" {
            rx.on_byte(*b);
        }
        let line = rx.on_byte(b'\n').expect("second line completes");
        assert_eq!(line.as_str(), "echo again");
    }
}
