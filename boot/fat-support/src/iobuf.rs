//! FAT I/O Buffer Support
//!
//! The FAT library performs all device and staging I/O through an opaque
//! buffer handle. In the boot environment a buffer is nothing more than a
//! flat byte region plus a cursor: there is no virtual memory manager to
//! abstract over, so no scatter/gather list or page mapping step exists.
//!
//! Buffers come in two flavors:
//! - **Owned**: the buffer allocates its backing storage itself and frees
//!   it on release. A single heap allocation backs the buffer; the
//!   descriptor is a plain value.
//! - **Borrowed**: the buffer wraps caller-supplied memory and never
//!   frees it; the borrow ends when the buffer is released.
//!
//! All offset-taking operations are relative to the cursor
//! (`current_offset`), which the FAT library moves explicitly as it walks
//! cluster-sized windows across a larger transfer.

use alloc::alloc::{alloc_zeroed, Layout};
use alloc::boxed::Box;
use core::fmt;
use log::debug;

/// Direction for a cursor update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    /// Move the cursor toward the end of the buffer
    Forward,
    /// Move the cursor back toward the start of the buffer
    Backward,
}

/// Backing storage for an I/O buffer
enum Backing<'a> {
    /// Storage allocated (and freed) by the buffer itself
    Owned(Box<[u8]>),
    /// Caller-supplied storage; the caller keeps ownership
    Borrowed(&'a mut [u8]),
}

/// An I/O buffer in the boot environment
///
/// Invariant: `current_offset <= len()` at all times. Operations that
/// would break it are contract violations and panic rather than return a
/// status.
pub struct FatIoBuffer<'a> {
    data: Backing<'a>,
    current_offset: usize,
}

// ============================================================================
// Construction and Release
// ============================================================================

/// Allocate an I/O buffer with its own backing storage.
///
/// The storage starts zero-filled and the cursor at zero. Returns `None`
/// if the boot allocator cannot satisfy the request; the caller treats
/// that as out-of-memory.
pub fn fat_allocate_io_buffer(size: usize) -> Option<FatIoBuffer<'static>> {
    let data = match allocate_backing(size) {
        Some(data) => data,
        None => {
            debug!("I/O buffer allocation failed ({} bytes)", size);
            return None;
        }
    };

    Some(FatIoBuffer {
        data: Backing::Owned(data),
        current_offset: 0,
    })
}

/// Create an I/O buffer over caller-supplied memory.
///
/// The buffer never frees the region; releasing the buffer only ends the
/// borrow.
pub fn fat_create_io_buffer(region: &mut [u8]) -> FatIoBuffer<'_> {
    FatIoBuffer {
        data: Backing::Borrowed(region),
        current_offset: 0,
    }
}

/// Fallible zeroed allocation for owned backing storage.
///
/// `Box::new` aborts on allocation failure; the FAT library expects an
/// absent-buffer signal instead, so the storage is requested from the
/// allocator directly.
fn allocate_backing(size: usize) -> Option<Box<[u8]>> {
    if size == 0 {
        return Some(Box::default());
    }

    let layout = Layout::array::<u8>(size).ok()?;
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return None;
    }

    let raw = core::ptr::slice_from_raw_parts_mut(ptr, size);

    // Safety: the pointer came from the global allocator with the layout
    // Box expects for a [u8] of this length.
    Some(unsafe { Box::from_raw(raw) })
}

impl<'a> FatIoBuffer<'a> {
    /// Total capacity of the buffer in bytes
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Check whether the buffer has zero capacity
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor position, in bytes from the start of the buffer
    pub fn current_offset(&self) -> usize {
        self.current_offset
    }

    /// Bytes between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.len() - self.current_offset
    }

    /// Check whether this buffer owns its backing storage
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Backing::Owned(_))
    }

    /// Release the buffer.
    ///
    /// Owned backing storage is freed with the buffer. The buffer is
    /// consumed, so a second release cannot be expressed.
    pub fn release(self) {}

    // ========================================================================
    // Cursor
    // ========================================================================

    /// Move the cursor by `delta` bytes in the given direction.
    ///
    /// Contract: the resulting offset must stay within `0..=len()`.
    /// Violations are driver bugs, not runtime conditions, and panic.
    pub fn update_offset(&mut self, delta: usize, direction: CursorDirection) {
        match direction {
            CursorDirection::Forward => {
                assert!(
                    delta <= self.remaining(),
                    "I/O buffer cursor would pass the end of the buffer"
                );
                self.current_offset += delta;
            }
            CursorDirection::Backward => {
                assert!(
                    delta <= self.current_offset,
                    "I/O buffer cursor would move before the start of the buffer"
                );
                self.current_offset -= delta;
            }
        }
    }

    // ========================================================================
    // Data Access
    // ========================================================================

    /// Zero `byte_count` bytes starting `offset` bytes past the cursor.
    pub fn zero(&mut self, offset: usize, byte_count: usize) {
        let start = self.current_offset + offset;
        self.data_mut()[start..start + byte_count].fill(0);
    }

    /// Copy a linear region into the buffer, `offset` bytes past the
    /// cursor.
    pub fn copy_in(&mut self, offset: usize, data: &[u8]) {
        let start = self.current_offset + offset;
        assert!(
            start + data.len() <= self.len(),
            "copy into I/O buffer exceeds the buffer"
        );
        self.data_mut()[start..start + data.len()].copy_from_slice(data);
    }

    /// Copy out of the buffer, `offset` bytes past the cursor, into a
    /// linear region.
    pub fn copy_out(&self, offset: usize, out: &mut [u8]) {
        let start = self.current_offset + offset;
        assert!(
            start + out.len() <= self.len(),
            "copy out of I/O buffer exceeds the buffer"
        );
        out.copy_from_slice(&self.data()[start..start + out.len()]);
    }

    /// View the whole backing region.
    ///
    /// The boot environment has no separate mapping step; this is the
    /// identity view of the already-contiguous storage, starting at the
    /// base rather than the cursor.
    pub fn map(&self) -> &[u8] {
        self.data()
    }

    /// Mutable view of the whole backing region
    pub fn map_mut(&mut self) -> &mut [u8] {
        self.data_mut()
    }

    /// Window of `len` bytes at the cursor, for a device transfer
    pub(crate) fn transfer_window(&self, len: usize) -> &[u8] {
        &self.data()[self.current_offset..self.current_offset + len]
    }

    /// Mutable window of `len` bytes at the cursor
    pub(crate) fn transfer_window_mut(&mut self, len: usize) -> &mut [u8] {
        let start = self.current_offset;
        &mut self.data_mut()[start..start + len]
    }

    fn data(&self) -> &[u8] {
        match &self.data {
            Backing::Owned(data) => data,
            Backing::Borrowed(data) => data,
        }
    }

    fn data_mut(&mut self) -> &mut [u8] {
        match &mut self.data {
            Backing::Owned(data) => data,
            Backing::Borrowed(data) => data,
        }
    }
}

/// Copy between the cursor-relative windows of two buffers.
///
/// Source and destination are necessarily distinct buffers; the windows
/// cannot overlap.
pub fn fat_copy_io_buffer(
    destination: &mut FatIoBuffer<'_>,
    destination_offset: usize,
    source: &FatIoBuffer<'_>,
    source_offset: usize,
    byte_count: usize,
) {
    let dst_start = destination.current_offset + destination_offset;
    let src_start = source.current_offset + source_offset;
    let src = &source.data()[src_start..src_start + byte_count];
    destination.data_mut()[dst_start..dst_start + byte_count].copy_from_slice(src);
}

impl fmt::Debug for FatIoBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatIoBuffer")
            .field("origin", &if self.is_owned() { "owned" } else { "borrowed" })
            .field("size", &self.len())
            .field("current_offset", &self.current_offset)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_starts_at_zero() {
        let buffer = fat_allocate_io_buffer(4096).expect("allocation failed");
        assert_eq!(buffer.current_offset(), 0);
        assert_eq!(buffer.len(), 4096);
        assert!(buffer.is_owned());
        assert!(buffer.map().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_allocate_zero_size() {
        let buffer = fat_allocate_io_buffer(0).expect("allocation failed");
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.remaining(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_create_borrows_region() {
        let mut region = [0xCCu8; 256];
        let buffer = fat_create_io_buffer(&mut region);
        assert_eq!(buffer.len(), 256);
        assert_eq!(buffer.current_offset(), 0);
        assert!(!buffer.is_owned());
        buffer.release();
        assert_eq!(region[0], 0xCC);
    }

    #[test]
    fn test_cursor_forward_backward_inverse() {
        let mut buffer = fat_allocate_io_buffer(1024).unwrap();
        buffer.update_offset(100, CursorDirection::Forward);
        assert_eq!(buffer.current_offset(), 100);
        buffer.update_offset(300, CursorDirection::Forward);
        buffer.update_offset(300, CursorDirection::Backward);
        assert_eq!(buffer.current_offset(), 100);
        buffer.update_offset(100, CursorDirection::Backward);
        assert_eq!(buffer.current_offset(), 0);
    }

    #[test]
    fn test_cursor_to_end_is_valid() {
        let mut buffer = fat_allocate_io_buffer(512).unwrap();
        buffer.update_offset(512, CursorDirection::Forward);
        assert_eq!(buffer.current_offset(), 512);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    #[should_panic]
    fn test_cursor_past_end_panics() {
        let mut buffer = fat_allocate_io_buffer(512).unwrap();
        buffer.update_offset(513, CursorDirection::Forward);
    }

    #[test]
    #[should_panic]
    fn test_cursor_before_start_panics() {
        let mut buffer = fat_allocate_io_buffer(512).unwrap();
        buffer.update_offset(1, CursorDirection::Backward);
    }

    #[test]
    fn test_zero_range() {
        let mut region = [0xFFu8; 128];
        let mut buffer = fat_create_io_buffer(&mut region);
        buffer.update_offset(32, CursorDirection::Forward);
        buffer.zero(16, 32);
        let data = buffer.map();
        assert!(data[..48].iter().all(|&b| b == 0xFF));
        assert!(data[48..80].iter().all(|&b| b == 0));
        assert!(data[80..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_copy_between_buffers() {
        let mut source = fat_allocate_io_buffer(64).unwrap();
        source.copy_in(0, &[0xAB; 64]);
        source.update_offset(16, CursorDirection::Forward);

        let mut destination = fat_allocate_io_buffer(64).unwrap();
        fat_copy_io_buffer(&mut destination, 8, &source, 0, 32);

        let data = destination.map();
        assert!(data[..8].iter().all(|&b| b == 0));
        assert!(data[8..40].iter().all(|&b| b == 0xAB));
        assert!(data[40..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_in_copy_out_round_trip() {
        let mut buffer = fat_allocate_io_buffer(256).unwrap();
        buffer.update_offset(64, CursorDirection::Forward);

        let pattern: alloc::vec::Vec<u8> = (1..=128u32).map(|v| v as u8).collect();
        buffer.copy_in(0, &pattern);

        let mut readback = [0u8; 128];
        buffer.copy_out(0, &mut readback);
        assert_eq!(&readback[..], &pattern[..]);

        // The window is cursor relative.
        assert_eq!(buffer.map()[63], 0);
        assert_eq!(buffer.map()[64], 1);
        assert_eq!(buffer.map()[191], 128);
        assert_eq!(buffer.map()[192], 0);
    }

    #[test]
    #[should_panic]
    fn test_copy_in_past_end_panics() {
        let mut buffer = fat_allocate_io_buffer(32).unwrap();
        buffer.copy_in(16, &[0u8; 32]);
    }

    #[test]
    fn test_map_is_base_not_cursor() {
        let mut region = [0u8; 64];
        region[0] = 0x11;
        let mut buffer = fat_create_io_buffer(&mut region);
        buffer.update_offset(32, CursorDirection::Forward);
        assert_eq!(buffer.map()[0], 0x11);
        assert_eq!(buffer.map().len(), 64);
    }

    #[test]
    fn test_borrowed_writes_reach_caller_memory() {
        let mut region = [0u8; 64];
        {
            let mut buffer = fat_create_io_buffer(&mut region);
            buffer.copy_in(4, &[0x5A; 8]);
        }
        assert!(region[4..12].iter().all(|&b| b == 0x5A));
        assert_eq!(region[12], 0);
    }
}
