//! Persistence layer — durable key-value storage namespaced per identity.

pub mod codec;
pub mod keys;
pub mod libsql_backend;
pub mod memory;
pub mod traits;

pub use codec::{Loaded, read_json, write_json};
pub use keys::Key;
pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
