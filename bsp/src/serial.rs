//! 16550 UART serial port used both as the boot monitor's/kernel's log
//! sink and as the line over which the XMODEM-style image transfer runs.
//!
//! Grounded on
//! `amoljassal-sis-kernel-showcase/crates/kernel/src/arch/x86_64/serial.rs`:
//! a `lazy_static`-wrapped `uart_16550::SerialPort` behind a spinlock, with
//! `serial_print!`/`serial_println!` macros mirroring the standard
//! `print!`/`println!` pair.

use lazy_static::lazy_static;
use spin::Mutex;
use uart_16550::SerialPort;

/// Standard COM1 I/O port base.
const SERIAL_IO_PORT: u16 = 0x3F8;

lazy_static! {
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(SERIAL_IO_PORT) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

#[doc(hidden)]
pub fn _print(args: core::fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts::without_interrupts;

    without_interrupts(|| {
        SERIAL1
            .lock()
            .write_fmt(args)
            .expect("write to serial port failed");
    });
}

/// Writes a single byte straight to the port, bypassing the `fmt::Write`
/// path. Used by the XMODEM transfer state machine, which moves raw
/// control and payload bytes rather than formatted text.
pub fn write_byte(byte: u8) {
    use x86_64::instructions::interrupts::without_interrupts;
    without_interrupts(|| {
        SERIAL1.lock().send(byte);
    });
}

/// Non-blocking read of one byte, if the receive holding register has one
/// ready. Returns `None` rather than spinning, so callers (the interrupt
/// handler, the monitor's polling receiver) decide how to wait.
pub fn try_read_byte() -> Option<u8> {
    use x86_64::instructions::port::Port;
    // LSR is base+5; bit 0 is Data Ready.
    let mut lsr: Port<u8> = Port::new(SERIAL_IO_PORT + 5);
    let ready = unsafe { lsr.read() } & 0x01 != 0;
    if !ready {
        return None;
    }
    let mut data: Port<u8> = Port::new(SERIAL_IO_PORT);
    Some(unsafe { data.read() })
}

/// Enables the "data available" interrupt so the serial IRQ fires once
/// per received byte, per spec SOFTVEC_TYPE_SERINTR semantics.
pub fn enable_rx_interrupt() {
    use x86_64::instructions::port::Port;
    let mut ier: Port<u8> = Port::new(SERIAL_IO_PORT + 1);
    unsafe { ier.write(0x01u8) };
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial::_print(format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(concat!($fmt, "\n"), $($arg)*));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_interrupt_enable_is_idempotent() {
        enable_rx_interrupt();
        enable_rx_interrupt();
    }
}
