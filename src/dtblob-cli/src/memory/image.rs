//! Memory Image Source
//!
//! A raw memory image (e.g. a RAM dump from a debug probe) mapped at a known
//! virtual base address.

use anyhow::{bail, Context, Result};
use dtblob::{AddressSpace, MemoryRegion};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

pub struct ImageFile {
    mmap: Mmap,
    regions: Vec<MemoryRegion>,
    base_address: u64,
}

impl ImageFile {
    /// Map `path` so that its first byte sits at `base_address`
    pub fn open<P: AsRef<Path>>(path: P, base_address: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("Failed to open memory image: {}", path.display()))?;

        let len = file.metadata()?.len();
        if len == 0 {
            bail!("Memory image {} is empty", path.display());
        }

        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to mmap memory image: {}", path.display()))?;

        let end = base_address
            .checked_add(len)
            .context("Memory image extends past the end of the address space")?;

        tracing::debug!(
            "Mapped {} ({} bytes) at {:#x}",
            path.display(),
            len,
            base_address
        );

        let mut region = MemoryRegion::new(base_address, end, "r--p");
        region.path = Some(path.display().to_string());

        Ok(ImageFile {
            mmap,
            regions: vec![region],
            base_address,
        })
    }
}

impl AddressSpace for ImageFile {
    fn read_bytes(&self, address: u64, length: u32) -> Result<Vec<u8>> {
        if address < self.base_address {
            bail!(
                "Address {:#x} below image base {:#x}",
                address,
                self.base_address
            );
        }

        let offset = (address - self.base_address) as usize;
        let end = offset
            .checked_add(length as usize)
            .filter(|&end| end <= self.mmap.len())
            .with_context(|| {
                format!(
                    "Read of {} bytes at {:#x} exceeds image size {}",
                    length,
                    address,
                    self.mmap.len()
                )
            })?;

        Ok(self.mmap[offset..end].to_vec())
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}
