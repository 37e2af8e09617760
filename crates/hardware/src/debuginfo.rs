//! Address to source-line table.
//!
//! Loaders and the assembler register `(address, file, line)` triples; after
//! [`DebugInfo::finalize`] the table answers "which line contains this address"
//! with a binary search, optionally short-circuited by a sequential-access hint.

use serde::Serialize;

/// Index of a registered source file.
pub type FileId = u32;

/// A position in a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// File the line belongs to.
    pub file_id: FileId,
    /// One-based line number.
    pub line: u32,
}

/// Sorted address to source-location table.
#[derive(Clone, Debug, Default)]
pub struct DebugInfo {
    files: Vec<String>,
    addresses: Vec<u64>,
    locations: Vec<SourceLocation>,
}

impl DebugInfo {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `path`, registering it on first use.
    pub fn get_file_id(&mut self, path: &str) -> FileId {
        if let Some(pos) = self.files.iter().position(|f| f == path) {
            return pos as FileId;
        }
        self.files.push(path.to_string());
        (self.files.len() - 1) as FileId
    }

    /// Adds a line mapping. [`finalize`](Self::finalize) must run before lookups.
    pub fn add_line(&mut self, address: u64, file_id: FileId, line: u32) {
        self.addresses.push(address);
        self.locations.push(SourceLocation { file_id, line });
    }

    /// Sorts the table by address and drops duplicate addresses.
    ///
    /// Among entries with the same address, the one added last wins.
    pub fn finalize(&mut self) {
        let mut order: Vec<usize> = (0..self.addresses.len()).collect();
        order.sort_by(|&a, &b| {
            self.addresses[a]
                .cmp(&self.addresses[b])
                .then_with(|| b.cmp(&a))
        });

        let mut addresses = Vec::with_capacity(order.len());
        let mut locations = Vec::with_capacity(order.len());
        for idx in order {
            let addr = self.addresses[idx];
            if addresses.last() == Some(&addr) {
                continue;
            }
            addresses.push(addr);
            locations.push(self.locations[idx]);
        }
        self.addresses = addresses;
        self.locations = locations;
    }

    /// Finds the entry with the greatest address not above `address`.
    ///
    /// # Arguments
    ///
    /// * `address` - Query address.
    /// * `hint` - Index of the previous result; updated to this result's index.
    ///   A stale or out-of-range hint only costs a full search.
    ///
    /// # Returns
    ///
    /// `None` if the table is empty or `address` precedes every entry.
    pub fn find(&self, address: u64, mut hint: Option<&mut usize>) -> Option<&SourceLocation> {
        if self.addresses.is_empty() {
            return None;
        }
        let len = self.addresses.len();

        if let Some(h) = hint.as_deref_mut() {
            let at = *h;
            if at < len && self.addresses[at] <= address {
                if at + 1 >= len || self.addresses[at + 1] > address {
                    return self.locations.get(at);
                }
                if at + 2 >= len || self.addresses[at + 2] > address {
                    *h = at + 1;
                    return self.locations.get(at + 1);
                }
            }
        }

        let upper = self.addresses.partition_point(|&a| a <= address);
        if upper == 0 {
            return None;
        }
        let index = upper - 1;
        if let Some(h) = hint {
            *h = index;
        }
        self.locations.get(index)
    }

    /// Path registered for `id`.
    pub fn file_path(&self, id: FileId) -> Option<&str> {
        self.files.get(id as usize).map(String::as_str)
    }

    /// Number of line entries.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns `true` if no line is registered.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Removes every file and line.
    pub fn clear(&mut self) {
        self.files.clear();
        self.addresses.clear();
        self.locations.clear();
    }
}
