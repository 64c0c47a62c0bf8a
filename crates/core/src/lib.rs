pub mod config;
pub mod error;
pub mod store;

pub use config::Settings;
pub use error::*;
pub use store::ConfigStore;
