#![no_std]
#![no_main]

//! Kernel binary entry point: the image the boot monitor receives and
//! jumps to. Brings up the GDT/TSS, PIC and IDT, then hands off to the
//! scheduler with a small set of demonstration threads exercising the
//! seven system calls, in place of the ELF-loaded user program this
//! kernel doesn't load (out of scope, per spec §1).

use core::arch::asm;

use bootloader_api::config::{BootloaderConfig, Mapping};
use bootloader_api::{BootInfo, entry_point};
use x86_64::VirtAddr;

pub static BOOTLOADER_CONFIG: BootloaderConfig = {
    let mut config = BootloaderConfig::new_default();
    config.mappings.physical_memory = Some(Mapping::Dynamic);
    config
};

entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

#[inline(always)]
fn current_stack_pointer() -> u64 {
    let sp: u64;
    unsafe { asm!("mov {}, rsp", out(reg) sp, options(nomem, nostack, preserves_flags)) };
    sp
}

fn kernel_main(_boot_info: &'static mut BootInfo) -> ! {
    kernel::logging::init(log::LevelFilter::Trace);
    log::info!("kernel: booting");

    let initial_stack = VirtAddr::new(current_stack_pointer());
    bsp::gdt::init(initial_stack);
    unsafe { bsp::pic::init() };
    kernel::idt::init();

    kernel::scheduler::kernel_start(
        demo_main,
        "init",
        0,
        kernel::scheduler::DEFAULT_STACK_SIZE,
        0,
        core::ptr::null(),
    );
}

/// First thread spawned by `kernel_start`: exercises `run`, `sleep`,
/// `wakeup`, `chpri` and `getid` against two worker threads, then waits
/// for them and exits.
extern "C" fn demo_main(_argc: usize, _argv: *const *const u8) {
    log::info!("init: thread {} running", kernel::syscall::sys_getid());

    let worker_a =
        kernel::syscall::sys_run(worker, 3, 0, core::ptr::null()).expect("spawn worker_a");
    let worker_b =
        kernel::syscall::sys_run(worker, 4, 0, core::ptr::null()).expect("spawn worker_b");

    kernel::syscall::sys_wakeup(worker_a).ok();
    kernel::syscall::sys_wakeup(worker_b).ok();
    kernel::syscall::sys_wait();
    kernel::syscall::sys_exit();
}

extern "C" fn worker(_argc: usize, _argv: *const *const u8) {
    let id = kernel::syscall::sys_getid();
    log::trace!("worker {}: sleeping", id);
    kernel::syscall::sys_sleep();
    log::trace!("worker {}: woke, raising priority", id);
    let _ = kernel::syscall::sys_chpri(0);
    log::trace!("worker {}: exiting", id);
}
