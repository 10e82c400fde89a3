use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions observable from the emulation core.
///
/// Every kind propagates up through the CPU loop via `?`; the core performs
/// no local recovery. Uninitialized io register reads returning 0xFF and
/// dropped writes are defined behavior, not errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The opcode decoded to one of the eleven forbidden table entries.
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalInstruction { opcode: u8, pc: u16 },

    /// Write below 0x8000 with no bank controller installed.
    #[error("illegal write of {value:#04x} to rom address {addr:#06x}")]
    IllegalRomWrite { addr: u16, value: u8 },

    /// 16-bit access attempted on the io register bank; indicates a decode
    /// bug in the caller.
    #[error("word access on io register {addr:#06x}")]
    WordOnIoRegister { addr: u16 },

    /// Pop from an empty pixel fifo; indicates a pipeline bug.
    #[error("pop from an empty pixel fifo")]
    PixelFifoEmpty,

    /// A bulk copy would extend into the io register bank.
    #[error("copy of {len} bytes to {addr:#06x} overlaps the io registers")]
    CopyOverlapsIo { addr: u16, len: usize },

    /// Io slot registration with an index past the 0x81 slots.
    #[error("io register index {0:#04x} out of range")]
    InvalidRegisterIndex(u8),

    /// A boot or cartridge image could not be read at startup.
    #[error("could not read rom image {path:?}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
