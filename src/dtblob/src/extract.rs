//! Whole-blob extraction.

use crate::error::{Error, Result};
use crate::memory::AddressSpace;
use crate::pipeline::Stage;

/// Largest single read issued while extracting
pub const EXTRACT_CHUNK_SIZE: u32 = 64 * 1024;

/// A complete blob copied out of process memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlob {
    bytes: Vec<u8>,
}

impl RawBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read exactly `total_size` bytes starting at `address`.
///
/// The header is part of the count. Reads are split into chunks of at most
/// [`EXTRACT_CHUNK_SIZE`]; any failed or short chunk discards the partial
/// buffer.
pub fn extract(memory: &dyn AddressSpace, address: u64, total_size: u32) -> Result<RawBlob> {
    let mut bytes = Vec::with_capacity(total_size as usize);
    let mut offset: u32 = 0;

    while offset < total_size {
        let length = (total_size - offset).min(EXTRACT_CHUNK_SIZE);
        let chunk_address = address
            .checked_add(offset as u64)
            .ok_or_else(|| Error::MemoryReadFailure {
                address,
                length: total_size,
                reason: "address range overflows".to_string(),
                stage: Stage::Extracting,
            })?;

        let chunk = memory
            .read_bytes(chunk_address, length)
            .map_err(|e| Error::MemoryReadFailure {
                address: chunk_address,
                length,
                reason: format!("{:#}", e),
                stage: Stage::Extracting,
            })?;

        if chunk.len() != length as usize {
            return Err(Error::MemoryReadFailure {
                address: chunk_address,
                length,
                reason: format!("short read ({} of {} bytes)", chunk.len(), length),
                stage: Stage::Extracting,
            });
        }

        bytes.extend_from_slice(&chunk);
        offset += length;
    }

    tracing::info!("Extracted {} bytes from {:#x}", bytes.len(), address);
    Ok(RawBlob { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockAddressSpace;

    fn scenario_a() -> Vec<u8> {
        let mut data = vec![0xd0, 0x0d, 0xfe, 0xed, 0x00, 0x00, 0x00, 0x10];
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        // Trailing memory that must not end up in the blob
        data.extend_from_slice(&[0xff; 8]);
        data
    }

    #[test]
    fn test_extract_includes_header() {
        let data = scenario_a();
        let mem = MockAddressSpace::new(data.clone(), 0x1000);

        let blob = extract(&mem, 0x1000, 16).unwrap();
        assert_eq!(blob.len(), 16);
        assert_eq!(blob.as_bytes(), &data[..16]);
        assert_eq!(mem.reads(), vec![(0x1000, 16)]);
    }

    #[test]
    fn test_extract_in_chunks() {
        let total = EXTRACT_CHUNK_SIZE * 2 + 100;
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let mem = MockAddressSpace::new(data.clone(), 0x10_0000);

        let blob = extract(&mem, 0x10_0000, total).unwrap();
        assert_eq!(blob.as_bytes(), data.as_slice());
        assert_eq!(
            mem.reads(),
            vec![
                (0x10_0000, EXTRACT_CHUNK_SIZE),
                (0x10_0000 + EXTRACT_CHUNK_SIZE as u64, EXTRACT_CHUNK_SIZE),
                (0x10_0000 + 2 * EXTRACT_CHUNK_SIZE as u64, 100),
            ]
        );
    }

    #[test]
    fn test_extract_fault_mid_blob() {
        let total = EXTRACT_CHUNK_SIZE + 64;
        let mem = MockAddressSpace::new(vec![0; total as usize], 0x1000)
            .with_fault_at(0x1000 + EXTRACT_CHUNK_SIZE as u64 + 8);

        let err = extract(&mem, 0x1000, total).unwrap_err();
        match err {
            Error::MemoryReadFailure { address, length, .. } => {
                assert_eq!(address, 0x1000 + EXTRACT_CHUNK_SIZE as u64);
                assert_eq!(length, 64);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_past_end() {
        let mem = MockAddressSpace::new(vec![0; 8], 0x1000);
        assert!(matches!(
            extract(&mem, 0x1000, 16),
            Err(Error::MemoryReadFailure { .. })
        ));
    }
}
