//! Record sink abstraction
//!
//! The engine runtime pushes records through this trait and never looks
//! back; whether they land in a journal file or a test buffer is the
//! sink's business.

use crate::journal::{Journal, JournalError};
use crate::records::Record;

/// Append-only destination for persisted records
pub trait RecordSink: Send {
    fn append(&mut self, record: &Record) -> Result<(), JournalError>;
}

impl RecordSink for Journal {
    fn append(&mut self, record: &Record) -> Result<(), JournalError> {
        Journal::append(self, record)
    }
}

/// In-memory sink for tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Record>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one type, by label
    pub fn records_labeled(&self, label: &str) -> Vec<&Record> {
        self.records.iter().filter(|r| r.label() == label).collect()
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &Record) -> Result<(), JournalError> {
        self.records.push(record.clone());
        Ok(())
    }
}
