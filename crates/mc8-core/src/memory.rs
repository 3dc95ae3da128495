//! Fixed-capacity, region-partitioned word store with label annotations.
//!
//! The store is split at construction time into a protected OS region
//! `[0, os_end]` and a user region `[user_start, size)`. The checked
//! [`Memory::write`] path is the only one reachable from instruction
//! execution or program loading; [`Memory::force_write`] is reserved for
//! system-level initialization of the OS region.

use std::fmt;

use thiserror::Error;

use crate::fault::Fault;

/// Smallest accepted total memory size, in words.
pub const MIN_TOTAL_SIZE: usize = 20;
/// Smallest accepted OS region size, in words.
pub const MIN_OS_SIZE: usize = 5;
/// Smallest accepted user region size, in words.
pub const MIN_USER_SIZE: usize = 10;
/// Total size of the default memory layout.
pub const DEFAULT_TOTAL_SIZE: usize = 100;
/// OS region size of the default memory layout.
pub const DEFAULT_OS_SIZE: usize = 20;

/// Memory configuration rejected at construction or resize time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Total size below the minimum of 20 words.
    #[error("total memory size {0} is below the minimum of 20")]
    TotalTooSmall(usize),
    /// OS region below the minimum of 5 words.
    #[error("os region size {0} is below the minimum of 5")]
    OsTooSmall(usize),
    /// User region below the minimum of 10 words.
    #[error("user region size {0} is below the minimum of 10")]
    UserTooSmall(usize),
}

/// Region classification for a memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryRegion {
    /// Protected range `[0, os_end]`, never writable via program execution.
    Os,
    /// Writable range `[user_start, size)`, holds the loaded program and its
    /// data.
    User,
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Os => write!(f, "OS"),
            Self::User => write!(f, "User"),
        }
    }
}

/// One display row of the memory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryCell {
    /// Absolute address of this cell.
    pub address: usize,
    /// Region the address currently belongs to.
    pub region: MemoryRegion,
    /// Label attached at load time, or empty.
    pub label: String,
    /// Stored word value.
    pub value: i32,
}

impl fmt::Display for MemoryCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_empty() {
            write!(f, "{} - {} ({})", self.region, self.label, self.value)
        } else if self.value != 0 {
            write!(f, "{} - {}", self.region, self.value)
        } else {
            write!(f, "{} empty space", self.region)
        }
    }
}

/// Fixed-size ordered word store partitioned into an OS and a user region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    words: Vec<i32>,
    labels: Vec<String>,
    os_size: usize,
}

impl Default for Memory {
    /// The default layout: 100 words with 20 reserved for the OS.
    fn default() -> Self {
        Self {
            words: vec![0; DEFAULT_TOTAL_SIZE],
            labels: vec![String::new(); DEFAULT_TOTAL_SIZE],
            os_size: DEFAULT_OS_SIZE,
        }
    }
}

impl Memory {
    /// Builds a zeroed store of `total_size` words with `os_size` of them
    /// reserved for the OS region.
    ///
    /// # Errors
    ///
    /// Rejects `total_size < 20`, `os_size < 5`, and a remaining user region
    /// smaller than 10 words.
    pub fn new(total_size: usize, os_size: usize) -> Result<Self, ConfigError> {
        if total_size < MIN_TOTAL_SIZE {
            return Err(ConfigError::TotalTooSmall(total_size));
        }
        if os_size < MIN_OS_SIZE {
            return Err(ConfigError::OsTooSmall(os_size));
        }
        let user_size = total_size.saturating_sub(os_size);
        if user_size < MIN_USER_SIZE {
            return Err(ConfigError::UserTooSmall(user_size));
        }

        Ok(Self {
            words: vec![0; total_size],
            labels: vec![String::new(); total_size],
            os_size,
        })
    }

    /// Total number of addressable words.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.words.len()
    }

    /// Last address of the protected OS region.
    #[must_use]
    pub const fn os_end(&self) -> usize {
        self.os_size - 1
    }

    /// First address of the user region.
    #[must_use]
    pub const fn user_start(&self) -> usize {
        self.os_size
    }

    /// Number of words in the user region.
    #[must_use]
    pub fn user_size(&self) -> usize {
        self.total_size() - self.os_size
    }

    /// Reads one word; any out-of-range address reads as zero.
    #[must_use]
    pub fn read(&self, address: usize) -> i32 {
        self.words.get(address).copied().unwrap_or(0)
    }

    /// Reads the label at an address, or empty for out-of-range addresses.
    #[must_use]
    pub fn label(&self, address: usize) -> &str {
        self.labels.get(address).map_or("", String::as_str)
    }

    /// Writes one word into the user region.
    ///
    /// `Some(label)` replaces the cell's label; `None` preserves it, which is
    /// how STORE keeps the source-text annotation placed at load time. This
    /// is the only write path reachable from instruction execution or
    /// program loading.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProtectedWrite`] for any address outside
    /// `[user_start, total_size)`; the store is left untouched.
    pub fn write(&mut self, address: usize, value: i32, label: Option<&str>) -> Result<(), Fault> {
        if address < self.user_start() || address >= self.total_size() {
            return Err(Fault::ProtectedWrite {
                address: i64::try_from(address).unwrap_or(i64::MAX),
            });
        }

        self.words[address] = value;
        if let Some(label) = label {
            self.labels[address] = label.to_string();
        }
        Ok(())
    }

    /// Writes anywhere in the store, bypassing the region check.
    ///
    /// Reserved for system-level initialization of the OS region; instruction
    /// execution must never reach this path. Returns `false` only when the
    /// address is out of bounds.
    pub fn force_write(&mut self, address: usize, value: i32, label: &str) -> bool {
        if address >= self.total_size() {
            return false;
        }

        self.words[address] = value;
        self.labels[address] = label.to_string();
        true
    }

    /// Zeroes words and labels in `[user_start, size)`; the OS region is
    /// untouched.
    pub fn clear_user(&mut self) {
        let start = self.user_start();
        for word in &mut self.words[start..] {
            *word = 0;
        }
        for label in &mut self.labels[start..] {
            label.clear();
        }
    }

    /// Replaces the store with one of `new_size` words.
    ///
    /// The overlapping address prefix is copied verbatim, growth is
    /// zero-filled, and the OS region is recomputed as `max(10, new_size/5)`.
    /// Addresses may change region without their stored values changing.
    ///
    /// # Errors
    ///
    /// Rejects `new_size < 20`; the store is left untouched.
    pub fn resize(&mut self, new_size: usize) -> Result<(), ConfigError> {
        if new_size < MIN_TOTAL_SIZE {
            return Err(ConfigError::TotalTooSmall(new_size));
        }

        self.words.resize(new_size, 0);
        self.labels.resize(new_size, String::new());
        self.os_size = (new_size / 5).max(10);
        Ok(())
    }

    /// Classifies an address against the current partition.
    #[must_use]
    pub const fn region(&self, address: usize) -> MemoryRegion {
        if address < self.os_size {
            MemoryRegion::Os
        } else {
            MemoryRegion::User
        }
    }

    /// Read-only display rendering of every cell, in address order.
    ///
    /// Not used by execution logic.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MemoryCell> {
        self.words
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(address, (value, label))| MemoryCell {
                address,
                region: self.region(address),
                label: label.clone(),
                value: *value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{ConfigError, Memory, MemoryCell, MemoryRegion};
    use crate::fault::Fault;

    #[test]
    fn default_layout_is_100_words_with_20_reserved() {
        let memory = Memory::default();
        assert_eq!(memory.total_size(), 100);
        assert_eq!(memory.os_end(), 19);
        assert_eq!(memory.user_start(), 20);
        assert_eq!(memory.user_size(), 80);
    }

    #[test]
    fn construction_enforces_the_size_constraints() {
        assert_eq!(Memory::new(19, 5), Err(ConfigError::TotalTooSmall(19)));
        assert_eq!(Memory::new(20, 4), Err(ConfigError::OsTooSmall(4)));
        assert_eq!(Memory::new(20, 11), Err(ConfigError::UserTooSmall(9)));
        assert_eq!(Memory::new(20, 25), Err(ConfigError::UserTooSmall(0)));
        assert!(Memory::new(20, 5).is_ok());
    }

    #[test]
    fn out_of_range_reads_return_zero() {
        let memory = Memory::default();
        assert_eq!(memory.read(0), 0);
        assert_eq!(memory.read(99), 0);
        assert_eq!(memory.read(100), 0);
        assert_eq!(memory.read(usize::MAX), 0);
    }

    #[test]
    fn write_with_no_label_preserves_the_existing_label() {
        let mut memory = Memory::new(20, 5).expect("valid layout");
        memory
            .write(7, 3, Some("MOV AX,3"))
            .expect("user-region write");

        memory.write(7, 9, None).expect("user-region write");

        assert_eq!(memory.read(7), 9);
        assert_eq!(memory.label(7), "MOV AX,3");
    }

    #[test]
    fn os_region_writes_are_rejected_without_mutation() {
        let mut memory = Memory::new(20, 5).expect("valid layout");
        let before = memory.clone();

        assert_eq!(
            memory.write(0, 1, None),
            Err(Fault::ProtectedWrite { address: 0 })
        );
        assert_eq!(
            memory.write(4, 1, Some("label")),
            Err(Fault::ProtectedWrite { address: 4 })
        );
        assert_eq!(
            memory.write(20, 1, None),
            Err(Fault::ProtectedWrite { address: 20 })
        );
        assert_eq!(memory, before);
    }

    #[test]
    fn force_write_reaches_the_os_region_but_not_out_of_bounds() {
        let mut memory = Memory::new(20, 5).expect("valid layout");

        assert!(memory.force_write(0, 77, "boot"));
        assert_eq!(memory.read(0), 77);
        assert_eq!(memory.label(0), "boot");

        assert!(!memory.force_write(20, 1, "oob"));
        assert_eq!(memory.read(20), 0);
    }

    #[test]
    fn clear_user_zeroes_exactly_the_user_region() {
        let mut memory = Memory::new(20, 5).expect("valid layout");
        for address in 0..5 {
            assert!(memory.force_write(address, 11, "os"));
        }
        for address in 5..20 {
            memory.write(address, 22, Some("user")).expect("user write");
        }

        memory.clear_user();

        for address in 0..5 {
            assert_eq!(memory.read(address), 11);
            assert_eq!(memory.label(address), "os");
        }
        for address in 5..20 {
            assert_eq!(memory.read(address), 0);
            assert_eq!(memory.label(address), "");
        }
    }

    #[test]
    fn resize_below_the_minimum_is_rejected_without_mutation() {
        let mut memory = Memory::new(25, 6).expect("valid layout");
        memory.write(10, 42, Some("kept")).expect("user write");
        let before = memory.clone();

        assert_eq!(memory.resize(19), Err(ConfigError::TotalTooSmall(19)));
        assert_eq!(memory, before);
    }

    #[test]
    fn resize_copies_the_prefix_and_recomputes_the_partition() {
        let mut memory = Memory::new(20, 5).expect("valid layout");
        memory.write(6, 42, Some("kept")).expect("user write");

        memory.resize(100).expect("valid size");

        assert_eq!(memory.total_size(), 100);
        assert_eq!(memory.user_start(), 20);
        // Address 6 was user space before the resize; it is OS space now and
        // its stored value is untouched.
        assert_eq!(memory.region(6), MemoryRegion::Os);
        assert_eq!(memory.read(6), 42);
        assert_eq!(memory.label(6), "kept");
        assert_eq!(memory.read(99), 0);
    }

    #[test]
    fn resize_keeps_the_minimum_os_region() {
        let mut memory = Memory::new(100, 20).expect("valid layout");
        memory.resize(20).expect("valid size");
        // 20 / 5 = 4, clamped up to the floor of 10.
        assert_eq!(memory.user_start(), 10);
    }

    #[test]
    fn snapshot_renders_labels_values_and_empty_cells() {
        let mut memory = Memory::new(20, 5).expect("valid layout");
        assert!(memory.force_write(0, 3, "boot"));
        memory.write(5, 17, None).expect("user write");
        memory.write(6, 17, Some("ADD AX")).expect("user write");

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot[0].to_string(), "OS - boot (3)");
        assert_eq!(snapshot[1].to_string(), "OS empty space");
        assert_eq!(snapshot[5].to_string(), "User - 17");
        assert_eq!(snapshot[6].to_string(), "User - ADD AX (17)");
        assert_eq!(snapshot[7].to_string(), "User empty space");
        assert_eq!(
            snapshot[6],
            MemoryCell {
                address: 6,
                region: MemoryRegion::User,
                label: "ADD AX".to_string(),
                value: 17,
            }
        );
    }

    proptest! {
        #[test]
        fn write_succeeds_exactly_inside_the_user_region(address in 0_usize..40, value in -1000_i32..1000) {
            let mut memory = Memory::new(20, 5).expect("valid layout");
            let in_user = (5..20).contains(&address);

            let result = memory.write(address, value, None);

            prop_assert_eq!(result.is_ok(), in_user);
            if in_user {
                prop_assert_eq!(memory.read(address), value);
            } else {
                prop_assert_eq!(memory.read(address), 0);
            }
        }
    }
}
