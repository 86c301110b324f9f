//! Append-only journal with checksums
//!
//! # Binary format (per entry)
//! ```text
//! [body_len: u32]            // payload + checksum length
//! [payload:  bytes]          // JSON-serialized Record
//! [checksum: u32]            // CRC32C over payload
//! ```
//!
//! The reader walks entries sequentially and stops with a typed error on a
//! torn tail or checksum mismatch instead of returning corrupt records.

use crc32c::crc32c;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::records::Record;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Checksum mismatch at entry {index}: expected {expected:#010x}, got {got:#010x}")]
    ChecksumMismatch { index: usize, expected: u32, got: u32 },

    #[error("Truncated entry at byte offset {offset}")]
    Truncated { offset: usize },

    #[error("Implausible entry length {length} at byte offset {offset}")]
    ImplausibleLength { length: usize, offset: usize },
}

/// Upper bound on a single entry; anything larger is treated as corruption
const MAX_ENTRY_BYTES: usize = 16 * 1024 * 1024;

/// Append-only journal writer
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
    entries_written: u64,
}

impl Journal {
    /// Open a journal for appending, creating the file if needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            entries_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Append one record and flush it to the file
    pub fn append(&mut self, record: &Record) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(record)
            .map_err(|e| JournalError::Serialization(e.to_string()))?;
        let checksum = crc32c(&payload);

        let body_len = (payload.len() + 4) as u32;
        self.writer.write_all(&body_len.to_le_bytes())?;
        self.writer.write_all(&payload)?;
        self.writer.write_all(&checksum.to_le_bytes())?;
        self.writer.flush()?;

        self.entries_written += 1;
        Ok(())
    }
}

/// Read every record in a journal file, verifying checksums
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<Record>, JournalError> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        if data.len() - offset < 4 {
            return Err(JournalError::Truncated { offset });
        }
        let body_len = u32::from_le_bytes(
            data[offset..offset + 4]
                .try_into()
                .map_err(|_| JournalError::Truncated { offset })?,
        ) as usize;
        if body_len < 4 || body_len > MAX_ENTRY_BYTES {
            return Err(JournalError::ImplausibleLength {
                length: body_len,
                offset,
            });
        }
        if data.len() - offset - 4 < body_len {
            return Err(JournalError::Truncated { offset });
        }

        let payload = &data[offset + 4..offset + 4 + body_len - 4];
        let stored = u32::from_le_bytes(
            data[offset + body_len..offset + 4 + body_len]
                .try_into()
                .map_err(|_| JournalError::Truncated { offset })?,
        );
        let computed = crc32c(payload);
        if stored != computed {
            return Err(JournalError::ChecksumMismatch {
                index: records.len(),
                expected: stored,
                got: computed,
            });
        }

        let record: Record = serde_json::from_slice(payload)
            .map_err(|e| JournalError::Serialization(e.to_string()))?;
        records.push(record);
        offset += 4 + body_len;
    }

    Ok(records)
}
