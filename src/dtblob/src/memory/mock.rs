//! Mock Address Space
//!
//! An in-memory address space for tests and offline use. Every read is
//! recorded so callers can assert exactly what was touched.

use super::{AddressSpace, MemoryRegion};
use anyhow::{bail, Result};
use std::cell::RefCell;

/// In-memory address space backed by a contiguous buffer
pub struct MockAddressSpace {
    /// Raw memory data (contiguous, starting at base_address)
    pub data: Vec<u8>,
    /// Base virtual address for the data
    pub base_address: u64,
    regions: Vec<MemoryRegion>,
    /// Reads that touch this address fail, simulating an unmapped page
    fault_address: Option<u64>,
    reads: RefCell<Vec<(u64, u32)>>,
}

impl MockAddressSpace {
    /// Create a new mock with data at given base address
    pub fn new(data: Vec<u8>, base_address: u64) -> Self {
        let end = base_address + data.len() as u64;
        Self {
            data,
            base_address,
            regions: vec![MemoryRegion::new(base_address, end, "r--p")],
            fault_address: None,
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Make any read covering `address` fail
    pub fn with_fault_at(mut self, address: u64) -> Self {
        self.fault_address = Some(address);
        self
    }

    /// Every `(address, length)` read issued so far, in order
    pub fn reads(&self) -> Vec<(u64, u32)> {
        self.reads.borrow().clone()
    }
}

impl AddressSpace for MockAddressSpace {
    fn read_bytes(&self, address: u64, length: u32) -> Result<Vec<u8>> {
        self.reads.borrow_mut().push((address, length));

        if let Some(fault) = self.fault_address {
            if fault >= address && fault < address + length as u64 {
                bail!("Page fault at {:#x}", fault);
            }
        }

        if address < self.base_address {
            bail!("Address {:#x} below base {:#x}", address, self.base_address);
        }

        let offset = (address - self.base_address) as usize;
        let end = offset + length as usize;
        if end > self.data.len() {
            bail!(
                "Read of {} bytes at {:#x} exceeds data size {}",
                length,
                address,
                self.data.len()
            );
        }

        Ok(self.data[offset..end].to_vec())
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}
