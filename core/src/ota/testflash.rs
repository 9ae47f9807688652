//! In-memory flash backend for tests
//!
//! Models a dual-slot layout (boot selection record + two app slots) with
//! one-shot fault injection on each mutating operation. Images are plain
//! byte vectors whose leading bytes are the descriptor record, matching
//! the on-flash layout.

use std::collections::HashMap;

use hal_abstractions::flash::{
    DigestRegion, FirmwareStorage, ImageState, PartitionInfo, PartitionKind, StorageError,
    WriteToken, DIGEST_LEN,
};

use super::descriptor::AppDescriptor;

fn test_descriptor(version: &str) -> AppDescriptor {
    AppDescriptor::new(version, "counter-node", "12:00:00", "Aug  6 2026", "sdk-5.1")
}

pub(crate) struct MockFlash {
    table: Vec<PartitionInfo>,
    running: PartitionInfo,
    boot: PartitionInfo,
    images: HashMap<u32, Vec<u8>>,
    states: HashMap<u32, ImageState>,
    last_invalid: Option<PartitionInfo>,
    open: Option<(WriteToken, u32)>,
    staged: Vec<u8>,
    next_token: u32,
    erase_count: usize,
    fail_begin: bool,
    fail_write: bool,
    fail_finish: bool,
    fail_set_boot: bool,
}

impl MockFlash {
    const SELECTOR: PartitionInfo = PartitionInfo {
        address: 0x9000,
        size: 0x2000,
        kind: PartitionKind::Data,
    };
    const APP0: PartitionInfo = PartitionInfo {
        address: 0x10_000,
        size: 0x100_000,
        kind: PartitionKind::App { slot: 0 },
    };
    const APP1: PartitionInfo = PartitionInfo {
        address: 0x110_000,
        size: 0x100_000,
        kind: PartitionKind::App { slot: 1 },
    };

    fn with_table(table: Vec<PartitionInfo>, running_version: &str, state: ImageState) -> Self {
        let running = Self::APP0;
        let mut images = HashMap::new();
        let mut image = test_descriptor(running_version).to_bytes().to_vec();
        image.extend_from_slice(&[0x5A; 256]);
        images.insert(running.address, image);

        let mut states = HashMap::new();
        states.insert(running.address, state);

        Self {
            table,
            running,
            boot: running,
            images,
            states,
            last_invalid: None,
            open: None,
            staged: Vec::new(),
            next_token: 1,
            erase_count: 0,
            fail_begin: false,
            fail_write: false,
            fail_finish: false,
            fail_set_boot: false,
        }
    }

    /// Selector record plus two app slots; slot 0 runs `running_version`.
    pub(crate) fn dual_slot(running_version: &str, state: ImageState) -> Self {
        Self::with_table(
            vec![Self::SELECTOR, Self::APP0, Self::APP1],
            running_version,
            state,
        )
    }

    /// Degenerate layout with nowhere to stage an update.
    pub(crate) fn single_slot(running_version: &str) -> Self {
        Self::with_table(
            vec![Self::SELECTOR, Self::APP0],
            running_version,
            ImageState::Valid,
        )
    }

    /// Record slot 1 as the image that failed verification last.
    pub(crate) fn mark_last_invalid(&mut self, version: &str) {
        self.images
            .insert(Self::APP1.address, test_descriptor(version).to_bytes().to_vec());
        self.states.insert(Self::APP1.address, ImageState::Invalid);
        self.last_invalid = Some(Self::APP1);
    }

    /// Drop all verification records.
    pub(crate) fn clear_image_states(&mut self) {
        self.states.clear();
    }

    /// Simulate a reset: the selected partition becomes the running one.
    pub(crate) fn reboot(&mut self) {
        self.running = self.boot;
    }

    pub(crate) fn erase_count(&self) -> usize {
        self.erase_count
    }

    pub(crate) fn fail_next_begin(&mut self) {
        self.fail_begin = true;
    }

    pub(crate) fn fail_next_write(&mut self) {
        self.fail_write = true;
    }

    pub(crate) fn fail_next_finish(&mut self) {
        self.fail_finish = true;
    }

    pub(crate) fn fail_next_set_boot(&mut self) {
        self.fail_set_boot = true;
    }
}

impl FirmwareStorage for MockFlash {
    fn partitions(&self) -> &[PartitionInfo] {
        &self.table
    }

    fn running(&self) -> PartitionInfo {
        self.running
    }

    fn boot_target(&self) -> Result<PartitionInfo, StorageError> {
        Ok(self.boot)
    }

    fn read_descriptor(&self, partition: PartitionInfo, out: &mut [u8]) -> Result<(), StorageError> {
        let image = self
            .images
            .get(&partition.address)
            .ok_or(StorageError::NotFound)?;
        if image.len() < out.len() {
            return Err(StorageError::NotFound);
        }
        out.copy_from_slice(&image[..out.len()]);
        Ok(())
    }

    fn last_invalid(&self) -> Option<PartitionInfo> {
        self.last_invalid
    }

    fn image_state(&self, partition: PartitionInfo) -> ImageState {
        self.states
            .get(&partition.address)
            .copied()
            .unwrap_or(ImageState::Undefined)
    }

    fn digest(&self, region: DigestRegion) -> Result<[u8; DIGEST_LEN], StorageError> {
        // Cheap stand-in: sum of the region's bytes, repeated.
        let seed = match region {
            DigestRegion::PartitionTable => 0x01,
            DigestRegion::Bootloader => 0x02,
            DigestRegion::Partition(partition) => self
                .images
                .get(&partition.address)
                .ok_or(StorageError::NotFound)?
                .iter()
                .fold(0u8, |acc, b| acc.wrapping_add(*b)),
        };
        Ok([seed; DIGEST_LEN])
    }

    fn begin_write(&mut self, partition: PartitionInfo) -> Result<WriteToken, StorageError> {
        if self.fail_begin {
            self.fail_begin = false;
            return Err(StorageError::Io);
        }
        self.images.remove(&partition.address);
        self.erase_count += 1;
        self.staged.clear();
        let token = WriteToken::new(self.next_token);
        self.next_token += 1;
        self.open = Some((token, partition.address));
        Ok(token)
    }

    fn write(&mut self, token: WriteToken, chunk: &[u8]) -> Result<(), StorageError> {
        let Some((open_token, _)) = self.open else {
            return Err(StorageError::BadToken);
        };
        if open_token != token {
            return Err(StorageError::BadToken);
        }
        if self.fail_write {
            self.fail_write = false;
            return Err(StorageError::Io);
        }
        self.staged.extend_from_slice(chunk);
        Ok(())
    }

    fn finish_write(&mut self, token: WriteToken) -> Result<(), StorageError> {
        let Some((open_token, address)) = self.open.take() else {
            return Err(StorageError::BadToken);
        };
        if open_token != token {
            return Err(StorageError::BadToken);
        }
        if self.fail_finish {
            self.fail_finish = false;
            return Err(StorageError::InvalidImage);
        }
        self.images.insert(address, core::mem::take(&mut self.staged));
        Ok(())
    }

    fn set_boot_target(&mut self, partition: PartitionInfo) -> Result<(), StorageError> {
        if self.fail_set_boot {
            self.fail_set_boot = false;
            return Err(StorageError::Io);
        }
        self.boot = partition;
        Ok(())
    }
}
