pub mod kv;
pub mod schema;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
