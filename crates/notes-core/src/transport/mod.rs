//! Pub/sub transport abstraction.
//!
//! This module provides the trait the note directory consumes and two
//! implementations:
//!
//! - **memory**: process-local topic log, synchronous fan-out
//! - **sqlite**: topic log shared between processes through a SQLite file

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryTransport;
pub use sqlite::SqliteTransport;
pub use traits::{HistoryPage, MessageHandler, RawMessage, SubscriptionHandle, Topic, Transport};
