//! Fixed-layout firmware image descriptor
//!
//! Every application image embeds a 128-byte record identifying it:
//! version, project name, build time and date, and the platform SDK
//! version it was built against. The same record arrives over the
//! transport ahead of the image bytes during an update. Fields are
//! fixed-width, NUL-padded; version comparison is byte equality over the
//! full field, never semantic-version parsing.

use core::str;

use hal_abstractions::flash::{FirmwareStorage, PartitionInfo};

/// Width of the version field.
pub const VERSION_LEN: usize = 32;
/// Width of the project name field.
pub const PROJECT_LEN: usize = 32;
/// Width of the build time field.
pub const BUILD_TIME_LEN: usize = 16;
/// Width of the build date field.
pub const BUILD_DATE_LEN: usize = 16;
/// Width of the platform version field.
pub const PLATFORM_LEN: usize = 32;

/// Total size of the descriptor record, on flash and on the wire.
pub const DESCRIPTOR_LEN: usize =
    VERSION_LEN + PROJECT_LEN + BUILD_TIME_LEN + BUILD_DATE_LEN + PLATFORM_LEN;

/// Decoded firmware image descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppDescriptor {
    version: [u8; VERSION_LEN],
    project: [u8; PROJECT_LEN],
    build_time: [u8; BUILD_TIME_LEN],
    build_date: [u8; BUILD_DATE_LEN],
    platform: [u8; PLATFORM_LEN],
}

impl AppDescriptor {
    /// Build a descriptor from printable fields, NUL-padding each one.
    /// Oversized input is truncated to the field width.
    pub fn new(version: &str, project: &str, build_time: &str, build_date: &str, platform: &str) -> Self {
        Self {
            version: pack(version),
            project: pack(project),
            build_time: pack(build_time),
            build_date: pack(build_date),
            platform: pack(platform),
        }
    }

    /// Decode the exact-size record. Returns `None` unless `raw` is
    /// exactly [`DESCRIPTOR_LEN`] bytes.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() != DESCRIPTOR_LEN {
            return None;
        }
        let mut desc = Self {
            version: [0; VERSION_LEN],
            project: [0; PROJECT_LEN],
            build_time: [0; BUILD_TIME_LEN],
            build_date: [0; BUILD_DATE_LEN],
            platform: [0; PLATFORM_LEN],
        };
        let mut at = 0;
        for field in [
            &mut desc.version[..],
            &mut desc.project[..],
            &mut desc.build_time[..],
            &mut desc.build_date[..],
            &mut desc.platform[..],
        ] {
            field.copy_from_slice(&raw[at..at + field.len()]);
            at += field.len();
        }
        Some(desc)
    }

    /// Read and decode the descriptor embedded in `partition`'s image.
    pub fn read_from<S: FirmwareStorage>(storage: &S, partition: PartitionInfo) -> Option<Self> {
        let mut raw = [0u8; DESCRIPTOR_LEN];
        storage.read_descriptor(partition, &mut raw).ok()?;
        Self::from_bytes(&raw)
    }

    /// Serialize back to the fixed record layout.
    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_LEN] {
        let mut raw = [0u8; DESCRIPTOR_LEN];
        let mut at = 0;
        for field in [
            &self.version[..],
            &self.project[..],
            &self.build_time[..],
            &self.build_date[..],
            &self.platform[..],
        ] {
            raw[at..at + field.len()].copy_from_slice(field);
            at += field.len();
        }
        raw
    }

    /// Raw version field, full fixed width. Update admission compares
    /// this byte-for-byte.
    pub fn version_raw(&self) -> &[u8; VERSION_LEN] {
        &self.version
    }

    /// Byte equality on the version field only.
    pub fn same_version(&self, other: &AppDescriptor) -> bool {
        self.version == other.version
    }

    /// Printable version string.
    pub fn version(&self) -> &str {
        field_str(&self.version)
    }

    /// Printable project name.
    pub fn project(&self) -> &str {
        field_str(&self.project)
    }

    /// Printable build time.
    pub fn build_time(&self) -> &str {
        field_str(&self.build_time)
    }

    /// Printable build date.
    pub fn build_date(&self) -> &str {
        field_str(&self.build_date)
    }

    /// Printable platform SDK version.
    pub fn platform(&self) -> &str {
        field_str(&self.platform)
    }
}

fn pack<const N: usize>(value: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Fixed field up to the first NUL; non-UTF-8 content renders empty.
fn field_str(raw: &[u8]) -> &str {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    str::from_utf8(&raw[..end]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_record_layout() {
        let desc = AppDescriptor::new("1.2.3", "counter-node", "12:34:56", "Aug  6 2026", "sdk-5.1");
        let decoded = AppDescriptor::from_bytes(&desc.to_bytes()).unwrap();
        assert_eq!(decoded, desc);
        assert_eq!(decoded.version(), "1.2.3");
        assert_eq!(decoded.project(), "counter-node");
        assert_eq!(decoded.build_time(), "12:34:56");
        assert_eq!(decoded.build_date(), "Aug  6 2026");
        assert_eq!(decoded.platform(), "sdk-5.1");
    }

    #[test]
    fn rejects_wrong_record_length() {
        let raw = [0u8; DESCRIPTOR_LEN];
        assert!(AppDescriptor::from_bytes(&raw[..DESCRIPTOR_LEN - 1]).is_none());
        let mut long = [0u8; DESCRIPTOR_LEN + 1];
        long[..DESCRIPTOR_LEN].copy_from_slice(&raw);
        assert!(AppDescriptor::from_bytes(&long).is_none());
        assert!(AppDescriptor::from_bytes(&raw).is_some());
    }

    #[test]
    fn version_equality_covers_full_field_width() {
        let a = AppDescriptor::new("1.0.0", "a", "", "", "");
        let b = AppDescriptor::new("1.0.0", "b", "x", "y", "z");
        assert!(a.same_version(&b));

        // Equal printable prefix, different bytes past the NUL.
        let mut raw = a.to_bytes();
        raw[VERSION_LEN - 1] = 0xAA;
        let c = AppDescriptor::from_bytes(&raw).unwrap();
        assert_eq!(c.version(), "1.0.0");
        assert!(!a.same_version(&c));
    }

    #[test]
    fn oversized_field_is_truncated() {
        let long = "v".repeat(VERSION_LEN + 10);
        let desc = AppDescriptor::new(&long, "", "", "", "");
        assert_eq!(desc.version().len(), VERSION_LEN);
    }

    #[test]
    fn non_utf8_field_renders_empty() {
        let mut raw = [0u8; DESCRIPTOR_LEN];
        raw[0] = 0xFF;
        raw[1] = 0xFE;
        let desc = AppDescriptor::from_bytes(&raw).unwrap();
        assert_eq!(desc.version(), "");
    }
}
