//! Program image loading.
//!
//! This module turns host files into bytes for the address space. It performs:
//! 1. **Format detection:** ELF executables are recognised by their magic number.
//! 2. **ELF loading:** Every loadable segment lands at its virtual address and the entry point becomes the reset PC.
//! 3. **Raw fallback:** Anything else is a flat big-endian image placed at a caller-chosen address.

use std::path::Path;

use object::read::elf::ElfFile32;
use object::{Endianness, Object, ObjectSegment};
use tracing::debug;

use crate::common::{Address, SimError};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// One contiguous run of bytes to write into the address space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First byte address.
    pub addr: Address,
    /// Content.
    pub bytes: Vec<u8>,
}

/// A program ready to be written into the address space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    /// Entry point for ELF executables; raw images have none.
    pub entry: Option<Address>,
    /// Bytes to load, in file order.
    pub segments: Vec<Segment>,
}

impl ProgramImage {
    /// Wraps a raw byte stream loaded at `addr`.
    pub fn raw(addr: Address, bytes: Vec<u8>) -> Self {
        Self {
            entry: None,
            segments: vec![Segment { addr, bytes }],
        }
    }

    /// Parses `bytes` as an ELF executable, or as a raw image at `raw_base`
    /// when the ELF magic is absent.
    ///
    /// # Errors
    ///
    /// `SimError::Elf` for malformed or little-endian ELF files.
    pub fn parse(bytes: Vec<u8>, raw_base: Address) -> Result<Self, SimError> {
        if !bytes.starts_with(ELF_MAGIC) {
            return Ok(Self::raw(raw_base, bytes));
        }

        let file = ElfFile32::<Endianness>::parse(bytes.as_slice())
            .map_err(|e| SimError::Elf(e.to_string()))?;
        if file.is_little_endian() {
            return Err(SimError::Elf("little-endian executable".to_string()));
        }

        let mut segments = Vec::new();
        for segment in file.segments() {
            let data = segment
                .data()
                .map_err(|e| SimError::Elf(e.to_string()))?;
            if data.is_empty() {
                continue;
            }
            debug!(addr = segment.address(), len = data.len(), "ELF segment");
            segments.push(Segment {
                addr: Address::new(segment.address()),
                bytes: data.to_vec(),
            });
        }
        Ok(Self {
            entry: Some(Address::new(file.entry())),
            segments,
        })
    }

    /// Reads and parses the file at `path`.
    pub fn from_file(path: impl AsRef<Path>, raw_base: Address) -> Result<Self, SimError> {
        Self::parse(std::fs::read(path)?, raw_base)
    }

    /// Total number of bytes across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.bytes.len()).sum()
    }

    /// Returns `true` if there is nothing to load.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
