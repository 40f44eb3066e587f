//! Destination for a received image and the (stubbed) handoff to it.
//! The ELF loader that would relocate a real image into its final
//! layout is out of scope (spec §1); what's left in scope is where the
//! raw bytes land and the mechanism by which control would eventually
//! transfer there.

use contract::KernelError;

/// A region `xmodem_target` can write sequential blocks into.
pub trait ImageSink {
    /// Writes `data` at `offset` bytes from the start of the image.
    /// Fails with `OutOfMemory` if the write would run past the sink's
    /// capacity.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), KernelError>;

    /// Total bytes accepted since the sink was created.
    fn len(&self) -> usize;
}

/// Receives an image straight into a fixed RAM region. Real monitors
/// place this at the linker-fixed load address; this one uses a static
/// buffer sized generously for a demonstration image.
pub struct RamImageSink {
    buf: [u8; Self::CAPACITY],
    len: usize,
}

impl RamImageSink {
    pub const CAPACITY: usize = 256 * 1024;

    pub const fn new() -> Self {
        RamImageSink {
            buf: [0; Self::CAPACITY],
            len: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Transfers control to the received image. Stubbed: jumping into
    /// an unrelocated blob without the ELF loader spec §1 excludes would
    /// be unsound, so this only exists to mark where that handoff goes.
    pub fn jump(&self) -> ! {
        bsp::serial_println!("image: {} bytes received, jump unimplemented", self.len);
        loop {
            x86_64::instructions::hlt();
        }
    }
}

impl ImageSink for RamImageSink {
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), KernelError> {
        let end = offset.checked_add(data.len()).ok_or(KernelError::OutOfMemory)?;
        if end > Self::CAPACITY {
            return Err(KernelError::OutOfMemory);
        }
        self.buf[offset..end].copy_from_slice(data);
        self.len = self.len.max(end);
        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_land_at_offset() {
        let mut sink = RamImageSink::new();
        sink.write(0, &[1, 2, 3]).unwrap();
        sink.write(3, &[4, 5]).unwrap();
        assert_eq!(sink.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn write_past_capacity_fails() {
        let mut sink = RamImageSink::new();
        let big = [0u8; 16];
        assert!(sink.write(RamImageSink::CAPACITY - 8, &big).is_err());
    }
}
