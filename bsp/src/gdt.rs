//! Global descriptor table and per-exception interrupt stacks.
//!
//! Adapted from `TheDigitalVirus-goofy-os/kernel/src/gdt.rs`. The spec's
//! single flat address space has no ring-3 segments, so the user code/data
//! descriptors are dropped; everything else (IST slots for double fault,
//! page fault and general protection fault, plus a per-task privilege
//! stack swapped in by the scheduler) carries over unchanged.

use x86_64::VirtAddr;
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable, SegmentSelector};
use x86_64::structures::tss::TaskStateSegment;

pub const STACK_SIZE: usize = 1024 * 100;
pub const DOUBLE_FAULT_IST_INDEX: u16 = 0;
pub const PAGE_FAULT_IST_INDEX: u16 = 1;
pub const GENERAL_PROTECTION_FAULT_IST_INDEX: u16 = 2;

pub static mut TSS: TaskStateSegment = TaskStateSegment::new();
pub static mut GDT: (GlobalDescriptorTable, Selectors) = (
    GlobalDescriptorTable::new(),
    Selectors {
        code: SegmentSelector(0),
        data: SegmentSelector(0),
        tss: SegmentSelector(0),
    },
);

pub struct Selectors {
    pub code: SegmentSelector,
    pub data: SegmentSelector,
    pub tss: SegmentSelector,
}

unsafe fn init_gdt(initial_kernel_stack: VirtAddr) {
    unsafe {
        TSS.interrupt_stack_table[DOUBLE_FAULT_IST_INDEX as usize] = {
            static mut STACK: [u8; STACK_SIZE] = [0; STACK_SIZE];
            VirtAddr::from_ptr(&raw const STACK) + STACK_SIZE as u64
        };
        TSS.interrupt_stack_table[PAGE_FAULT_IST_INDEX as usize] = {
            static mut STACK: [u8; STACK_SIZE] = [0; STACK_SIZE];
            VirtAddr::from_ptr(&raw const STACK) + STACK_SIZE as u64
        };
        TSS.interrupt_stack_table[GENERAL_PROTECTION_FAULT_IST_INDEX as usize] = {
            static mut STACK: [u8; STACK_SIZE] = [0; STACK_SIZE];
            VirtAddr::from_ptr(&raw const STACK) + STACK_SIZE as u64
        };

        TSS.privilege_stack_table[0] = initial_kernel_stack;

        let code = GDT.0.append(Descriptor::kernel_code_segment());
        let data = GDT.0.append(Descriptor::kernel_data_segment());
        let tss = GDT.0.append(Descriptor::tss_segment(&TSS));

        GDT.1 = Selectors { code, data, tss };
    }
}

/// Loads the GDT and TSS and reloads the segment registers. `initial_kernel_stack`
/// becomes the stack the CPU switches to on any privilege-level-preserving
/// interrupt before the first task swap.
pub fn init(initial_kernel_stack: VirtAddr) {
    use x86_64::instructions::segmentation::{CS, DS, SS, Segment};
    use x86_64::instructions::tables::load_tss;

    unsafe {
        init_gdt(initial_kernel_stack);

        GDT.0.load();

        CS::set_reg(GDT.1.code);
        SS::set_reg(GDT.1.data);
        DS::set_reg(GDT.1.data);
        load_tss(GDT.1.tss);
    }
}

/// Called by the scheduler on every context switch so a nested interrupt
/// taken while the new task runs lands on that task's own kernel stack.
pub fn set_kernel_stack(stack: VirtAddr) {
    unsafe { TSS.privilege_stack_table[0] = stack };
}
