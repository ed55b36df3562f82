//! Live Process Memory Source
//!
//! Reads the memory of a running (typically ptrace-stopped) process.

use anyhow::{bail, Context, Result};
use dtblob::{AddressSpace, MemoryRegion};
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use std::fs;

/// A process attached for reading
pub struct LiveProcess {
    pub pid: u32,
    handle: ProcessHandle,
    maps: Vec<MemoryRegion>,
}

impl AddressSpace for LiveProcess {
    fn read_bytes(&self, address: u64, length: u32) -> Result<Vec<u8>> {
        if !self.maps.is_empty() && !self.is_readable_range(address, length) {
            bail!(
                "{} bytes at {:#x} are not covered by readable mappings",
                length,
                address
            );
        }

        let start = usize::try_from(address).context("Address does not fit this platform")?;
        let mut buffer = vec![0u8; length as usize];
        self.handle
            .copy_address(start, &mut buffer)
            .with_context(|| {
                format!(
                    "Failed to read {} bytes at {:#x} in PID {}",
                    length, address, self.pid
                )
            })?;
        Ok(buffer)
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.maps
    }
}

impl LiveProcess {
    /// Attach to a running process by PID
    pub fn attach(pid: u32) -> Result<Self> {
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .with_context(|| format!("Failed to attach to process {}. Try running with sudo.", pid))?;

        let maps = match parse_maps(pid) {
            Ok(maps) => maps,
            Err(e) => {
                tracing::warn!("Memory map unavailable, reads are unchecked: {:#}", e);
                Vec::new()
            }
        };
        tracing::debug!("Attached to PID {} ({} mappings)", pid, maps.len());

        Ok(LiveProcess { pid, handle, maps })
    }
}

/// Parse /proc/pid/maps to get memory regions
fn parse_maps(pid: u32) -> Result<Vec<MemoryRegion>> {
    let maps_path = format!("/proc/{}/maps", pid);
    let contents = fs::read_to_string(&maps_path)
        .with_context(|| format!("Failed to open {}. Do you have permission?", maps_path))?;

    Ok(contents.lines().filter_map(parse_maps_line).collect())
}

/// Parse one /proc/pid/maps line: `start-end perms offset dev inode [path]`
pub fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (start, end) = parts.first()?.split_once('-')?;

    Some(MemoryRegion {
        start: u64::from_str_radix(start, 16).ok()?,
        end: u64::from_str_radix(end, 16).ok()?,
        perms: parts.get(1).unwrap_or(&"").to_string(),
        path: parts.get(5).map(|s| s.to_string()),
    })
}
