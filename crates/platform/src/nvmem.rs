//! Non-volatile preference sector abstraction.
//!
//! The preference store runs over one byte-programmable sector of
//! flash-class memory: programming can only clear bits, and the only way to
//! set bits back to 1 is a full-sector erase (which reads back as 0xFF).
//! Offsets are sector-relative; the base address and the IAP command
//! plumbing live below this boundary.

use thiserror_no_std::Error;

/// Error for NV implementations that surface the device busy/command-fail
/// flag. The flag is cleared by the implementation before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NvError {
    /// The device rejected or failed the last read/write/erase command.
    #[error("non-volatile command failed (device busy)")]
    Busy,
}

/// One byte-erasable non-volatile sector.
pub trait NvSector {
    /// Command failure reported by the device.
    type Error: core::fmt::Debug;

    /// Read the byte at `offset`.
    fn read_byte(&mut self, offset: u16) -> Result<u8, Self::Error>;

    /// Program the byte at `offset`. Programming can only clear bits; the
    /// caller is responsible for only writing to erased (0xFF) slots.
    fn write_byte(&mut self, offset: u16, value: u8) -> Result<(), Self::Error>;

    /// Erase the whole sector back to 0xFF.
    fn erase(&mut self) -> Result<(), Self::Error>;
}
