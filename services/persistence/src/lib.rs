//! Persistence for the trading game
//!
//! An append-only journal of game records: sessions, participants, orders,
//! trades, and lifecycle events. The engine treats the sink as opaque; a
//! failed append is logged by the runtime and never surfaces in a command
//! reply.
//!
//! Entries are length-prefixed JSON payloads with a CRC32C checksum, so a
//! torn tail or a flipped bit is detected on read instead of producing a
//! silently wrong replay.

pub mod journal;
pub mod records;
pub mod sink;

pub use journal::{Journal, JournalError};
pub use records::Record;
pub use sink::{MemorySink, RecordSink};
