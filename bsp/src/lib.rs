#![no_std]

//! Board support shared by the monitor and the kernel: serial port, GDT/TSS,
//! and the PIC. Neither binary touches these devices except through here.

pub mod gdt;
pub mod pic;
pub mod serial;
