//! `kz_xmodem <elf-file> <serial-interface>`: sends an image to a
//! waiting boot monitor over a serial line.
//!
//! Argument handling and the overall flow are grounded directly on
//! `main()` in `examples/original_source/tools/kz_xmodem/src/kz_xmodem.c`
//! -- a fixed two-positional-argument CLI, not a subcommand/flag parser,
//! so no argument-parsing crate is pulled in for it.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::ExitCode;
use std::time::Duration;

use xmodem_host::protocol::RealSerial;
use xmodem_host::{run_session, StderrProgress, TransferError};

const BAUD_RATE: u32 = 9600;

fn usage(program: &str) {
    eprintln!("usage: {program} <elf-file> <serial-interface>");
}

/// Reads the whole file via explicit open/seek/read, mirroring the
/// original's `fopen`/`fseek`/`fread` so `FileOpen`/`FileSeek`/`FileRead`
/// map to the same distinct failure points.
fn read_file(path: &str) -> Result<Vec<u8>, TransferError> {
    let mut file = File::open(path).map_err(TransferError::FileOpen)?;
    let len = file
        .seek(SeekFrom::End(0))
        .map_err(TransferError::FileSeek)? as usize;
    file.seek(SeekFrom::Start(0)).map_err(TransferError::FileSeek)?;
    let mut data = vec![0u8; len];
    file.read_exact(&mut data).map_err(TransferError::FileRead)?;
    Ok(data)
}

fn run(elf_path: &str, interface: &str) -> Result<(), TransferError> {
    let data = read_file(elf_path)?;

    let port = serialport::new(interface, BAUD_RATE)
        .timeout(Duration::from_millis(10))
        .open()
        .map_err(TransferError::SerialOpen)?;
    let mut transport = RealSerial::new(port);

    eprintln!("kz_xmodem: sending {elf_path} ({} bytes) over {interface}", data.len());

    let mut progress = StderrProgress;
    run_session(&mut transport, &data, &mut progress, Duration::from_secs(1))
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        usage(&args[0]);
        return ExitCode::from(1);
    }

    match run(&args[1], &args[2]) {
        Ok(()) => {
            eprintln!("kz_xmodem: transfer complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("kz_xmodem: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
