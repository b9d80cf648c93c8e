// Persistent key-value storage for the quote widget
// One string slot per key, the terminal's answer to localStorage

pub mod cache;

pub use cache::{CacheError, DisabledStore, KeyValueStore, MemoryStore, SqliteStore};
