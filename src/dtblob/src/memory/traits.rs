//! Address Space Trait
//!
//! Core abstraction for reading memory from a debugged process.

use super::MemoryRegion;
use anyhow::Result;

/// Random-access, read-only view of a process's memory.
///
/// Read-only: the debugged process is never written to.
pub trait AddressSpace {
    /// Read exactly `length` bytes starting at `address`
    fn read_bytes(&self, address: u64, length: u32) -> Result<Vec<u8>>;

    /// Known memory regions, if the source can enumerate them
    fn regions(&self) -> &[MemoryRegion] {
        &[]
    }

    /// True when every byte of `[address, address + length)` lies in a
    /// readable region. Adjacent regions may share the range.
    fn is_readable_range(&self, address: u64, length: u32) -> bool {
        let Some(end) = address.checked_add(length as u64) else {
            return false;
        };
        let mut cursor = address;
        while cursor < end {
            match self
                .regions()
                .iter()
                .find(|r| r.is_readable() && r.contains(cursor))
            {
                Some(region) => cursor = region.end,
                None => return false,
            }
        }
        true
    }
}

impl<T: AddressSpace + ?Sized> AddressSpace for &T {
    fn read_bytes(&self, address: u64, length: u32) -> Result<Vec<u8>> {
        (**self).read_bytes(address, length)
    }

    fn regions(&self) -> &[MemoryRegion] {
        (**self).regions()
    }
}
