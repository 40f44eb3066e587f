//! Host-side transfer error taxonomy (spec §7) and the exit codes
//! `kz_xmodem`'s CLI contract assigns them (spec §6: "SerialOpen=2,
//! SerialWrite, TargetIllegalState, TargetIllegalResponse, FileOpen,
//! FileSeek, FileRead" -- the spec fixes the first code and the
//! enumeration order; this assigns 2..8 in that order).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("serial open error: {0}")]
    SerialOpen(#[source] serialport::Error),
    #[error("serial write error: {0}")]
    SerialWrite(#[source] std::io::Error),
    #[error("illegal target state: no NAK received within the startup window")]
    TargetIllegalState,
    #[error("illegal target response: expected ACK/NAK, got something else")]
    TargetIllegalResponse,
    #[error("file open error: {0}")]
    FileOpen(#[source] std::io::Error),
    #[error("file seek error: {0}")]
    FileSeek(#[source] std::io::Error),
    #[error("file read error: {0}")]
    FileRead(#[source] std::io::Error),
}

impl TransferError {
    /// Process exit code, per spec §6's `kz_xmodem` CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::SerialOpen(_) => 2,
            TransferError::SerialWrite(_) => 3,
            TransferError::TargetIllegalState => 4,
            TransferError::TargetIllegalResponse => 5,
            TransferError::FileOpen(_) => 6,
            TransferError::FileSeek(_) => 7,
            TransferError::FileRead(_) => 8,
        }
    }
}
