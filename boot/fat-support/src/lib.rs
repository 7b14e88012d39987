//! Boot-Environment Device Support for the FAT Library
//!
//! The FAT library implements directory, FAT-table, and cluster logic
//! against a small host interface: memory, locks, time, and block I/O.
//! This crate is that host interface for the boot environment, wired to
//! the boot allocator and the firmware's synchronous disk services.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       FAT Library                            │
//! │        (directories, FAT tables, cluster allocation)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                fat-support (this crate)                      │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────────┐  │
//! │  │  iobuf   │ │  device  │ │ mem/lock │ │  time          │  │
//! │  └──────────┘ └──────────┘ └──────────┘ └────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!          ▼                                       ▼
//! ┌─────────────────┐                     ┌─────────────────┐
//! │ Boot allocator  │                     │ Firmware disk   │
//! │ (global alloc)  │                     │ services        │
//! └─────────────────┘                     └─────────────────┘
//! ```
//!
//! # Structure
//! - `iobuf` - I/O buffers: owned or borrowed backing plus a cursor
//! - `device` - block-transfer adapter over a device capability
//! - `firmware` - the firmware disk contract and the RAM disk
//! - `mem` - paged/non-paged allocation shim over the boot allocator
//! - `lock` - inert locks for the single-threaded boot environment
//! - `time` - epoch clock and the injectable clock capability
//!
//! Everything is synchronous and single threaded: calls return before
//! the next one is issued, and the lock shim exists only to satisfy the
//! interface contract of hosts that do schedule threads.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod device;
pub mod firmware;
pub mod iobuf;
pub mod lock;
pub mod mem;
pub mod status;
pub mod time;

// Re-export the host interface surface
pub use device::{
    fat_get_device_block_information, fat_get_io_cache_entry_data_size, fat_read_device,
    fat_write_device, BlockRun, BootVolume, DeviceParameters, DeviceToken, FileBlockInformation,
    IoFlags,
};
pub use firmware::{DiskIo, RamDisk};
pub use iobuf::{
    fat_allocate_io_buffer, fat_copy_io_buffer, fat_create_io_buffer, CursorDirection, FatIoBuffer,
};
pub use lock::{fat_create_lock, BootLock, MutualExclusion, SpinHostLock};
pub use mem::{
    fat_allocate_non_paged_memory, fat_allocate_paged_memory, fat_free_non_paged_memory,
    fat_free_paged_memory, fat_get_page_size, PAGE_SIZE,
};
pub use status::{DeviceError, DeviceResult};
pub use time::{fat_get_current_system_time, BootClock, SystemClock, SystemTime};
