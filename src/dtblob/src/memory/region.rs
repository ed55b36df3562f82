//! Memory Region Types
//!
//! Data structures for representing memory regions from /proc/pid/maps.

/// A mapped memory region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub perms: String,
    pub path: Option<String>,
}

impl MemoryRegion {
    pub fn new(start: u64, end: u64, perms: impl Into<String>) -> Self {
        Self {
            start,
            end,
            perms: perms.into(),
            path: None,
        }
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }
}
