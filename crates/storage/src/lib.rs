//! Configuration stores that chat directives read and mutate.
//!
//! - [`IniDocument`]: order- and comment-preserving INI model
//! - [`IniFileStore`]: live INI file with a pristine baseline file for restore
//! - [`MemoryStore`]: in-memory store with a baseline snapshot

pub mod file_store;
pub mod ini;
pub mod memory;

pub use file_store::IniFileStore;
pub use ini::IniDocument;
pub use memory::MemoryStore;
