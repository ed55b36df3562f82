//! Flattened device tree header probe.
//!
//! Only the first two header words are needed to pull a blob out of memory:
//!
//! | offset | field       | encoding       |
//! |--------|-------------|----------------|
//! | 0      | `magic`     | u32 big-endian |
//! | 4      | `totalsize` | u32 big-endian |
//!
//! `totalsize` covers the whole blob, header included.

use crate::error::{Error, Result};
use crate::memory::AddressSpace;
use crate::pipeline::Stage;
use byteorder::{ByteOrder, BE};

/// FDT magic number
pub const FDT_MAGIC: u32 = 0xd00d_feed;

/// Bytes read to validate a blob
pub const HEADER_PROBE_SIZE: u32 = 8;

/// Required blob alignment
const FDT_ALIGNMENT: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub magic_number: u32,
    pub total_size: u32,
}

impl BlobHeader {
    /// Decode the probe bytes
    pub fn parse(bytes: &[u8; HEADER_PROBE_SIZE as usize]) -> Self {
        Self {
            magic_number: BE::read_u32(&bytes[0..4]),
            total_size: BE::read_u32(&bytes[4..8]),
        }
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic_number == FDT_MAGIC
    }

    /// Reject sizes that cannot describe a blob or exceed `max`
    pub fn check_total_size(&self, max: u32) -> Result<()> {
        let max = max.min(i32::MAX as u32);
        if self.total_size < HEADER_PROBE_SIZE || self.total_size > max {
            return Err(Error::InvalidTotalSize {
                size: self.total_size,
                min: HEADER_PROBE_SIZE,
                max,
            });
        }
        Ok(())
    }
}

/// Read and validate the header at `address`.
///
/// Issues a single 8-byte read. On a bad magic number nothing further is
/// read.
pub fn read_header(memory: &dyn AddressSpace, address: u64) -> Result<BlobHeader> {
    if address % FDT_ALIGNMENT != 0 {
        tracing::warn!(
            "Blob address {:#x} is not {}-byte aligned; dtc may reject it",
            address,
            FDT_ALIGNMENT
        );
    }

    let bytes = memory
        .read_bytes(address, HEADER_PROBE_SIZE)
        .map_err(|e| Error::MemoryReadFailure {
            address,
            length: HEADER_PROBE_SIZE,
            reason: format!("{:#}", e),
            stage: Stage::ValidatingHeader,
        })?;

    let probe: [u8; HEADER_PROBE_SIZE as usize] =
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::MemoryReadFailure {
                address,
                length: HEADER_PROBE_SIZE,
                reason: format!("short read ({} bytes)", bytes.len()),
                stage: Stage::ValidatingHeader,
            })?;

    let header = BlobHeader::parse(&probe);
    if !header.has_valid_magic() {
        return Err(Error::InvalidMagicNumber {
            address,
            found: header.magic_number,
            expected: FDT_MAGIC,
        });
    }

    tracing::debug!(
        "Header at {:#x}: magic {:#010x}, totalsize {}",
        address,
        header.magic_number,
        header.total_size
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockAddressSpace;

    #[test]
    fn test_read_valid_header() {
        let mem = MockAddressSpace::new(vec![0xd0, 0x0d, 0xfe, 0xed, 0x00, 0x00, 0x00, 0x10], 0x1000);

        let header = read_header(&mem, 0x1000).unwrap();
        assert_eq!(header.magic_number, FDT_MAGIC);
        assert_eq!(header.total_size, 16);
        assert_eq!(mem.reads(), vec![(0x1000, 8)]);
    }

    #[test]
    fn test_bad_magic_stops_after_probe() {
        let mut data = vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x00, 0x01, 0x00];
        data.resize(0x100, 0);
        let mem = MockAddressSpace::new(data, 0x2000);

        let err = read_header(&mem, 0x2000).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMagicNumber { address: 0x2000, found: 0xdeadbeef, .. }
        ));
        assert_eq!(mem.reads(), vec![(0x2000, 8)]);
    }

    #[test]
    fn test_little_endian_magic_rejected() {
        let mem = MockAddressSpace::new(vec![0xed, 0xfe, 0x0d, 0xd0, 0x10, 0, 0, 0], 0x1000);
        assert!(matches!(
            read_header(&mem, 0x1000),
            Err(Error::InvalidMagicNumber { .. })
        ));
    }

    #[test]
    fn test_unreadable_header() {
        let mem = MockAddressSpace::new(vec![0xd0, 0x0d, 0xfe, 0xed], 0x1000);
        let err = read_header(&mem, 0x1000).unwrap_err();
        assert!(matches!(
            err,
            Error::MemoryReadFailure { address: 0x1000, length: 8, .. }
        ));
        assert_eq!(err.stage(), Stage::ValidatingHeader);
    }

    #[test]
    fn test_check_total_size() {
        let header = |total_size| BlobHeader {
            magic_number: FDT_MAGIC,
            total_size,
        };

        assert!(header(8).check_total_size(1024).is_ok());
        assert!(header(1024).check_total_size(1024).is_ok());
        assert!(matches!(
            header(4).check_total_size(1024),
            Err(Error::InvalidTotalSize { size: 4, .. })
        ));
        assert!(matches!(
            header(1025).check_total_size(1024),
            Err(Error::InvalidTotalSize { size: 1025, max: 1024, .. })
        ));
        assert!(header(u32::MAX).check_total_size(u32::MAX).is_err());
    }
}
