//! Device Status Codes
//!
//! Failure codes for block device transfers. Success travels through
//! `Ok(())`; the firmware implementation picks the variant and this
//! library propagates it unchanged.

use core::fmt;

/// Block device failure status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceError {
    /// Device not found
    NotFound = 1,
    /// I/O error
    Io = 2,
    /// Invalid parameter
    InvalidParameter = 3,
    /// Device busy
    Busy = 4,
    /// Media not present
    NoMedia = 5,
    /// Write protected
    WriteProtected = 6,
    /// Timeout
    Timeout = 7,
    /// Not ready
    NotReady = 8,
    /// Bad sector
    BadSector = 9,
    /// Operation not supported by this environment
    NotImplemented = 10,
}

/// Result alias used across the device support surface
pub type DeviceResult<T> = Result<T, DeviceError>;

impl DeviceError {
    /// Get a short description of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "device not found",
            Self::Io => "I/O error",
            Self::InvalidParameter => "invalid parameter",
            Self::Busy => "device busy",
            Self::NoMedia => "no media",
            Self::WriteProtected => "write protected",
            Self::Timeout => "timeout",
            Self::NotReady => "device not ready",
            Self::BadSector => "bad sector",
            Self::NotImplemented => "not implemented",
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
