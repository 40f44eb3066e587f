//! 8259 PIC remapping, so hardware IRQs land above the CPU exception
//! vectors instead of colliding with them.
//!
//! Adapted from the `ChainedPics` setup in
//! `TheDigitalVirus-goofy-os/kernel/src/interrupts.rs`.

use pic8259::ChainedPics;
use spin::Mutex;

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// Vector offsets for the hardware IRQs this board uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET,
    Serial = PIC_1_OFFSET + 4,
}

impl InterruptIndex {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_usize(self) -> usize {
        self as usize
    }
}

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Remaps and unmasks the PIC. Must run once before interrupts are enabled.
pub unsafe fn init() {
    unsafe { PICS.lock().initialize() };
}

pub fn notify_end_of_interrupt(vector: InterruptIndex) {
    unsafe { PICS.lock().notify_end_of_interrupt(vector.as_u8()) };
}
