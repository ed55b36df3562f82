//! Address Space Abstraction
//!
//! Read-only access to the memory of a debugged process:
//! - The `AddressSpace` trait implemented by host adapters
//! - `MemoryRegion` descriptors for readable-range checks
//! - `MockAddressSpace`, an in-memory source that records every read

mod mock;
mod region;
mod traits;

pub use mock::MockAddressSpace;
pub use region::MemoryRegion;
pub use traits::AddressSpace;
