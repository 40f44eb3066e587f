//! The boot monitor's interrupt descriptor table: the CPU exceptions
//! needed to diagnose a crash, plus the serial line IRQ routed into
//! `vector::dispatch(SerialInterrupt, ..)`. There is no syscall vector
//! here -- the monitor has no threads to trap from.

use lazy_static::lazy_static;
use x86_64::structures::idt::InterruptDescriptorTable;

use contract::VectorKind;

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        idt.breakpoint.set_handler_fn(breakpoint_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(bsp::gdt::DOUBLE_FAULT_IST_INDEX);
        }

        idt[bsp::pic::InterruptIndex::Serial.as_usize()].set_handler_fn(serial_interrupt_handler);

        idt
    };
}

pub fn init() {
    IDT.load();
}

extern "x86-interrupt" fn breakpoint_handler(
    stack_frame: x86_64::structures::idt::InterruptStackFrame,
) {
    bsp::serial_println!("breakpoint hit: {:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: x86_64::structures::idt::InterruptStackFrame,
    _error_code: u64,
) -> ! {
    bsp::serial_println!("double fault: {:#?}", stack_frame);
    crate::fatal()
}

/// The received byte (if any) is packed into the `saved_sp` slot
/// `vector::dispatch` passes along, since this vector kind has no saved
/// thread context of its own to report.
extern "x86-interrupt" fn serial_interrupt_handler(
    _stack_frame: x86_64::structures::idt::InterruptStackFrame,
) {
    if let Some(byte) = bsp::serial::try_read_byte() {
        crate::vector::dispatch(VectorKind::SerialInterrupt, byte as usize);
    }
    bsp::pic::notify_end_of_interrupt(bsp::pic::InterruptIndex::Serial);
}
