//! Persistence port for the cart line list.
//!
//! Only the lines are durably stored. Totals and the drawer flag are
//! derived or transient and must be reconstructed on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::cart::CartLine;

/// Storage key used when the caller does not pick one.
pub const DEFAULT_STORE_KEY: &str = "storefront-cart";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage record corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The single serialized record kept under the store key.
#[derive(Serialize, Deserialize)]
struct CartRecord {
    items: Vec<CartLine>,
}

pub trait CartStorage: Send + Sync {
    /// Loads the persisted line list. `None` means nothing was stored yet.
    fn load(&self) -> Result<Option<Vec<CartLine>>, StorageError>;

    /// Overwrites the stored record with the given lines.
    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError>;
}

/// JSON-file adapter: one record per store key, written whole on every save.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_store_key(dir, DEFAULT_STORE_KEY)
    }

    pub fn with_store_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{key}.json")) }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<CartLine>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let record: CartRecord = serde_json::from_str(&text)?;
        Ok(Some(record.items))
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let record = CartRecord { items: lines.to_vec() };
        fs::write(&self.path, serde_json::to_string(&record)?)?;
        Ok(())
    }
}
