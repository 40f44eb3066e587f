//! The boot monitor's own instance of the software-interrupt vector
//! table (spec §4.1). Independently linked from the kernel image, so
//! this table's storage is never shared with `kernel::vector` -- only
//! the `contract::VectorKind` shape is.

use contract::VectorKind;
use contract::vector::NUM_VECTOR_KINDS;

pub type HandlerFn = fn(kind: VectorKind, saved_sp: usize);

static mut TABLE: [Option<HandlerFn>; NUM_VECTOR_KINDS] = [None; NUM_VECTOR_KINDS];

/// Clears all slots. Idempotent, per spec §4.1.
pub fn vector_init() {
    unsafe {
        TABLE = [None; NUM_VECTOR_KINDS];
    }
}

/// Installs or replaces the handler for `kind`.
pub fn vector_set(kind: VectorKind, handler: HandlerFn) {
    unsafe {
        TABLE[kind.index()] = Some(handler);
    }
}

/// Invoked from the low-level trap wrappers. Calls the installed
/// handler, or halts via the fatal-error path if none is installed.
pub fn dispatch(kind: VectorKind, saved_sp: usize) {
    let handler = unsafe { TABLE[kind.index()] };
    match handler {
        Some(f) => f(kind, saved_sp),
        None => crate::fatal(),
    }
}
