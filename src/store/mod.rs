pub mod memory;
pub mod sqlite;

pub use memory::MemoryQuoteStore;
pub use sqlite::SqliteQuoteStore;
