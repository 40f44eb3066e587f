//! Host-side half of the block-framed image transfer protocol: library
//! crate backing the `kz_xmodem` binary.

pub mod error;
pub mod protocol;
pub mod transfer;

pub use error::TransferError;
pub use protocol::{RealSerial, SerialTransport};
pub use transfer::{run_session, Progress, StderrProgress};
