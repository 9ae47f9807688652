//! Firmware storage abstraction
//!
//! Abstracts the flash layout and boot-selection mechanism of a multi-slot
//! target: the partition table, the persisted verification state the
//! bootloader leaves behind, and the erase/write/finalize cycle used to
//! stage a replacement image. BSPs implement [`FirmwareStorage`] on top of
//! the platform's flash driver; the update engine in `counter-core` drives
//! it without knowing the hardware.

/// SHA-256 digest length, in bytes.
pub const DIGEST_LEN: usize = 32;

/// Partition classification from the partition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PartitionKind {
    /// Application image slot; `slot` is the rotation index (0-based).
    App {
        /// Rotation index within the application slots.
        slot: u8,
    },
    /// Non-executable data region.
    Data,
}

/// One entry of the partition table.
///
/// Identity is the base address; exactly one partition is running at any
/// time, and the boot selector decides which one that is after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartitionInfo {
    /// Base address in flash.
    pub address: u32,
    /// Region size in bytes.
    pub size: u32,
    /// Declared type from the partition table.
    pub kind: PartitionKind,
}

impl PartitionInfo {
    /// Whether this partition holds an application image.
    pub fn is_app(&self) -> bool {
        matches!(self.kind, PartitionKind::App { .. })
    }

    /// Rotation index for application partitions, `None` for data regions.
    pub fn app_slot(&self) -> Option<u8> {
        match self.kind {
            PartitionKind::App { slot } => Some(slot),
            PartitionKind::Data => None,
        }
    }
}

/// Persisted verification state of an application image.
///
/// Owned and transitioned by the bootloader/watchdog across reboots; the
/// running firmware only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageState {
    /// Freshly flashed, never booted.
    New,
    /// Booted once, self-test verdict still outstanding.
    PendingVerify,
    /// Passed self-test on a previous boot.
    Valid,
    /// Failed self-test; the bootloader rolled back from it.
    Invalid,
    /// Boot was abandoned before a verdict.
    Aborted,
    /// No state record exists for the image.
    Undefined,
}

impl ImageState {
    /// Canonical label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageState::New => "NEW",
            ImageState::PendingVerify => "PENDING_VERIFY",
            ImageState::Valid => "VALID",
            ImageState::Invalid => "INVALID",
            ImageState::Aborted => "ABORTED",
            ImageState::Undefined => "UNDEFINED",
        }
    }
}

/// Opaque handle for an open erase/write cycle on a partition.
///
/// Returned by [`FirmwareStorage::begin_write`] and passed back to the
/// write/finalize calls. At most one cycle is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteToken(u32);

impl WriteToken {
    /// Wrap a backend-chosen handle value.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The backend's handle value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Flash regions addressable for digest reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigestRegion {
    /// The partition table itself.
    PartitionTable,
    /// The first-stage bootloader region.
    Bootloader,
    /// One partition's content.
    Partition(PartitionInfo),
}

/// Storage backend operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Requested partition or record does not exist
    NotFound,
    /// Underlying flash transaction failed
    Io,
    /// Image failed the storage layer's integrity/size check
    InvalidImage,
    /// Token does not match the open write cycle
    BadToken,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Record not found"),
            Self::Io => write!(f, "Flash I/O error"),
            Self::InvalidImage => write!(f, "Image integrity check failed"),
            Self::BadToken => write!(f, "Stale write token"),
        }
    }
}

impl core::error::Error for StorageError {}

impl embedded_io::Error for StorageError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::NotFound => embedded_io::ErrorKind::NotFound,
            Self::Io => embedded_io::ErrorKind::Other,
            Self::InvalidImage => embedded_io::ErrorKind::InvalidData,
            Self::BadToken => embedded_io::ErrorKind::InvalidInput,
        }
    }
}

/// Flash/OTA backend contract.
///
/// The backend owns the partition table, the persisted boot selection, and
/// at most one open write cycle. All calls are blocking; a write does not
/// return until the chunk is durably in flash or has failed.
pub trait FirmwareStorage {
    /// Full partition table, in flash order.
    fn partitions(&self) -> &[PartitionInfo];

    /// Partition the current image is executing from.
    fn running(&self) -> PartitionInfo;

    /// Partition the boot selector currently points at. May differ from
    /// [`running`](Self::running) when the selection record was corrupted
    /// and the loader fell back to another image.
    fn boot_target(&self) -> Result<PartitionInfo, StorageError>;

    /// Copy the descriptor record embedded in `partition`'s image into
    /// `out`. Fails with [`StorageError::NotFound`] when the partition
    /// holds no readable image.
    fn read_descriptor(&self, partition: PartitionInfo, out: &mut [u8]) -> Result<(), StorageError>;

    /// Partition holding the most recent image that failed verification
    /// and was rolled back, if any.
    fn last_invalid(&self) -> Option<PartitionInfo>;

    /// Persisted verification state of `partition`. Backends report
    /// [`ImageState::Undefined`] when the record is unavailable rather
    /// than failing.
    fn image_state(&self, partition: PartitionInfo) -> ImageState;

    /// SHA-256 digest of a flash region, computed by the storage layer.
    fn digest(&self, region: DigestRegion) -> Result<[u8; DIGEST_LEN], StorageError>;

    /// Erase `partition` and open a write cycle on it.
    fn begin_write(&mut self, partition: PartitionInfo) -> Result<WriteToken, StorageError>;

    /// Append `chunk` to the open write cycle.
    fn write(&mut self, token: WriteToken, chunk: &[u8]) -> Result<(), StorageError>;

    /// Close the write cycle and run the storage layer's integrity check
    /// over the staged image.
    fn finish_write(&mut self, token: WriteToken) -> Result<(), StorageError>;

    /// Point the boot selector at `partition` for the next reset.
    fn set_boot_target(&mut self, partition: PartitionInfo) -> Result<(), StorageError>;
}
