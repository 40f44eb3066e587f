//! The kernel's interrupt descriptor table: CPU exceptions and the
//! syscall trap vector, routed into `vector::dispatch` so the rest of
//! the kernel never sees raw x86 vector numbers. The kernel has no
//! serial line receiver (that's the boot monitor's job, in its own
//! binary), so unlike `monitor::idt` this table never unmasks or wires
//! up the serial IRQ.
//!
//! Adapted from `TheDigitalVirus-goofy-os/kernel/src/interrupts.rs`'s
//! `lazy_static!`-built IDT; the keyboard/mouse/PS2 entries it wires up
//! have no counterpart here and are dropped.

use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

use contract::VectorKind;

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        idt.breakpoint.set_handler_fn(breakpoint_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(bsp::gdt::DOUBLE_FAULT_IST_INDEX);
            idt.page_fault
                .set_handler_fn(page_fault_handler)
                .set_stack_index(bsp::gdt::PAGE_FAULT_IST_INDEX);
            idt.general_protection_fault
                .set_handler_fn(general_protection_fault_handler)
                .set_stack_index(bsp::gdt::GENERAL_PROTECTION_FAULT_IST_INDEX);
        }

        idt[crate::syscall::SYSCALL_VECTOR as usize].set_handler_fn(syscall_handler);

        idt
    };
}

/// Loads the table built above. Must run after `bsp::gdt::init`, since
/// the double fault entry references the TSS's IST.
pub fn init() {
    IDT.load();
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::warn!("breakpoint hit: {:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    bsp::serial_println!("double fault: {:#?}", stack_frame);
    crate::scheduler::sysdown(contract::KernelError::FatalInvariantViolated)
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    bsp::serial_println!(
        "page fault: {:#?}, address {:?}",
        stack_frame,
        x86_64::registers::control::Cr2::read()
    );
    crate::vector::dispatch(VectorKind::SoftError, error_code.bits() as usize);
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    bsp::serial_println!("general protection fault ({}): {:#?}", error_code, stack_frame);
    crate::vector::dispatch(VectorKind::SoftError, error_code as usize);
}

/// Trap entry for `int SYSCALL_VECTOR`. The CPU doesn't change privilege
/// level here -- there is only one -- so there's no parameter block to
/// marshal across a ring transition; the request already lives in the
/// current thread's TCB.
extern "x86-interrupt" fn syscall_handler(stack_frame: InterruptStackFrame) {
    crate::vector::dispatch(VectorKind::Syscall, stack_frame.stack_pointer.as_u64() as usize);
}
