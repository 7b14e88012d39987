//! Device Block-Transfer Adapter
//!
//! Translates the FAT library's buffer-relative transfer requests into
//! absolute firmware sector transfers. Each request is a single
//! synchronous call: the destination or source address is the buffer's
//! cursor, the length is `block_count * block_size`, and the firmware's
//! status comes back verbatim. Retry policy, if any, lives in the
//! firmware or in the FAT library, never here.
//!
//! The device is a capability, not a structure: the adapter requires
//! only the native block size and the two transfer entry points.
//! [`BootVolume`] is the boot environment's implementation, carrying a
//! firmware disk handle and the device parameters discovered at mount.

use alloc::vec::Vec;
use bitflags::bitflags;
use log::{debug, warn};

use crate::firmware::DiskIo;
use crate::iobuf::FatIoBuffer;
use crate::status::{DeviceError, DeviceResult};

bitflags! {
    /// Flags accompanying a block transfer request
    ///
    /// Carried for interface shape; the synchronous firmware path has no
    /// cache to direct, so the adapter does not act on them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IoFlags: u32 {
        /// Bypass any write-back caching below this layer
        const WRITE_THROUGH = 0x0001;
        /// The transfer carries filesystem metadata
        const METADATA = 0x0002;
    }
}

/// Parameters of a block device, discovered when the volume is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceParameters {
    /// Native block size in bytes
    pub block_size: usize,
    /// Total number of blocks on the device
    pub block_count: u64,
}

/// Capability surface the transfer adapter requires of a device token
pub trait DeviceToken {
    /// Native block size in bytes
    fn block_size(&self) -> usize;

    /// Read whole blocks starting at `block_address` into `buffer`.
    fn read_blocks(&mut self, block_address: u64, buffer: &mut [u8]) -> DeviceResult<()>;

    /// Write whole blocks starting at `block_address` from `buffer`.
    fn write_blocks(&mut self, block_address: u64, buffer: &[u8]) -> DeviceResult<()>;
}

/// A mounted boot volume: firmware disk handle plus device parameters
pub struct BootVolume<D: DiskIo> {
    disk: D,
    parameters: DeviceParameters,
}

impl<D: DiskIo> BootVolume<D> {
    pub fn new(disk: D, parameters: DeviceParameters) -> Self {
        debug!(
            "boot volume: block size {} bytes, {} blocks",
            parameters.block_size, parameters.block_count
        );

        Self { disk, parameters }
    }

    /// Device parameters this volume was opened with
    pub fn parameters(&self) -> DeviceParameters {
        self.parameters
    }
}

impl<D: DiskIo> DeviceToken for BootVolume<D> {
    fn block_size(&self) -> usize {
        self.parameters.block_size
    }

    fn read_blocks(&mut self, block_address: u64, buffer: &mut [u8]) -> DeviceResult<()> {
        let count = buffer.len() / self.parameters.block_size;
        self.disk.read_sectors(block_address, count, buffer)
    }

    fn write_blocks(&mut self, block_address: u64, buffer: &[u8]) -> DeviceResult<()> {
        let count = buffer.len() / self.parameters.block_size;
        self.disk.write_sectors(block_address, count, buffer)
    }
}

// ============================================================================
// Transfer Entry Points
// ============================================================================

/// Read blocks from the device into the buffer at its cursor.
///
/// Contract: the buffer must have at least `block_count * block_size`
/// bytes past its cursor; a shortfall is a driver bug and panics. The
/// firmware's status is propagated unchanged and no retry is performed.
pub fn fat_read_device(
    device: &mut dyn DeviceToken,
    block_address: u64,
    block_count: usize,
    _flags: IoFlags,
    buffer: &mut FatIoBuffer<'_>,
) -> DeviceResult<()> {
    let block_size = device.block_size();
    assert!(
        block_count <= buffer.remaining() / block_size,
        "I/O buffer too small for requested block read"
    );

    let byte_count = block_count * block_size;
    let status = device.read_blocks(block_address, buffer.transfer_window_mut(byte_count));
    if let Err(error) = status {
        warn!(
            "device read failed: {} blocks at {}: {}",
            block_count, block_address, error
        );
    }

    status
}

/// Write blocks to the device from the buffer at its cursor.
///
/// Symmetric to [`fat_read_device`]: same buffer-size contract, same
/// propagate-verbatim failure policy.
pub fn fat_write_device(
    device: &mut dyn DeviceToken,
    block_address: u64,
    block_count: usize,
    _flags: IoFlags,
    buffer: &FatIoBuffer<'_>,
) -> DeviceResult<()> {
    let block_size = device.block_size();
    assert!(
        block_count <= buffer.remaining() / block_size,
        "I/O buffer too small for requested block write"
    );

    let byte_count = block_count * block_size;
    let status = device.write_blocks(block_address, buffer.transfer_window(byte_count));
    if let Err(error) = status {
        warn!(
            "device write failed: {} blocks at {}: {}",
            block_count, block_address, error
        );
    }

    status
}

// ============================================================================
// Block Information and Cache Queries
// ============================================================================

/// A contiguous run of device blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRun {
    /// First block address of the run
    pub address: u64,
    /// Number of blocks in the run
    pub count: u64,
}

/// Block layout of a file, as a list of contiguous runs
#[derive(Debug, Clone, Default)]
pub struct FileBlockInformation {
    /// Runs in file order
    pub runs: Vec<BlockRun>,
}

/// Translate a file's block runs into disk-relative runs.
///
/// Not supported in this environment: all I/O goes through the
/// synchronous firmware path, so the direct-transfer setup this query
/// serves never happens. Always reports [`DeviceError::NotImplemented`].
pub fn fat_get_device_block_information(
    _device: &mut dyn DeviceToken,
    _information: &mut FileBlockInformation,
) -> DeviceResult<()> {
    Err(DeviceError::NotImplemented)
}

/// Get the data size of a block cache entry.
///
/// This environment performs no block caching; every transfer is a
/// firmware round trip. Always 0.
pub fn fat_get_io_cache_entry_data_size() -> usize {
    0
}

// ============================================================================
// Tests
// ============================================================================
