//! The transport abstraction `transfer.rs`'s retry discipline runs
//! against. A real serial port and an in-memory fake both implement
//! this, so the timeout/retry logic in `transfer.rs` can be exercised
//! deterministically in tests without a real port.

use std::time::Duration;

pub trait SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> std::io::Result<()>;

    /// Reads exactly one byte, or `Ok(None)` if `timeout` elapses first
    /// without one arriving.
    fn read_byte_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<u8>>;
}

/// Wraps a real `serialport::SerialPort`, per spec §6's default 9600
/// 8N1 line parameters (set by the caller that opens it).
pub struct RealSerial {
    port: Box<dyn serialport::SerialPort>,
}

impl RealSerial {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        RealSerial { port }
    }
}

impl SerialTransport for RealSerial {
    fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        use std::io::Write;
        self.port.write_all(data)
    }

    fn read_byte_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<u8>> {
        use std::io::Read;
        self.port
            .set_timeout(timeout)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}
