//! In-memory [`ConfigStore`] for tests and dry runs.

use std::sync::RwLock;

use chatcfg_core::{ConfigStore, StoreError};

use crate::ini::IniDocument;

/// Store held entirely in memory, restorable to the document it started with.
#[derive(Debug, Default)]
pub struct MemoryStore {
    baseline: IniDocument,
    current: RwLock<IniDocument>,
}

impl MemoryStore {
    pub fn new(baseline: IniDocument) -> Self {
        Self {
            current: RwLock::new(baseline.clone()),
            baseline,
        }
    }

    pub fn from_ini(text: &str) -> Self {
        Self::new(IniDocument::parse(text))
    }

    /// Render the current document.
    pub fn snapshot(&self) -> String {
        self.current.read().expect("memory store lock poisoned").to_string()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, section: &str, property: &str) -> Result<String, StoreError> {
        let doc = self.current.read().expect("memory store lock poisoned");
        Ok(doc.get(section, property).unwrap_or_default().to_string())
    }

    fn set(&self, section: &str, property: &str, value: &str) -> Result<(), StoreError> {
        self.current
            .write()
            .expect("memory store lock poisoned")
            .set(section, property, value);
        Ok(())
    }

    fn restore(&self) -> Result<(), StoreError> {
        *self.current.write().expect("memory store lock poisoned") = self.baseline.clone();
        Ok(())
    }
}
