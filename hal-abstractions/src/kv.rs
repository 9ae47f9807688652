//! Persistent key/value storage abstraction
//!
//! NVS-style bounded records keyed by short names, surviving reboots and
//! firmware replacement. Writes are staged until [`commit`] makes them
//! durable.
//!
//! [`commit`]: KeyValueStorage::commit

/// Key/value storage operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KvError {
    /// No record stored under the key
    NotFound,
    /// Caller buffer or backend record slot too small
    Capacity,
    /// Underlying storage transaction failed
    Io,
}

impl core::fmt::Display for KvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Key not found"),
            Self::Capacity => write!(f, "Value does not fit"),
            Self::Io => write!(f, "Storage I/O error"),
        }
    }
}

impl core::error::Error for KvError {}

/// Persisted settings store contract.
pub trait KeyValueStorage {
    /// Copy the string stored under `key` into `out`, returning its
    /// length. Fails with [`KvError::Capacity`] when `out` is too small.
    fn get_str(&self, key: &str, out: &mut [u8]) -> Result<usize, KvError>;

    /// Stage a string record under `key`.
    fn set_str(&mut self, key: &str, value: &str) -> Result<(), KvError>;

    /// Read the `u16` stored under `key`.
    fn get_u16(&self, key: &str) -> Result<u16, KvError>;

    /// Stage a `u16` record under `key`.
    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), KvError>;

    /// Flush staged records to persistent storage.
    fn commit(&mut self) -> Result<(), KvError>;
}
