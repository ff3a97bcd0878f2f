mod config;
mod file;
mod memory;
mod sqlite;

pub use config::{Config, StorageBackend};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::state::FocusState;

/// Durable persistence for [`FocusState`].
///
/// Last write wins; there is no concurrent-access contract beyond that.
pub trait Store: Send {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<FocusState>, StoreError>;

    fn save(&self, state: &FocusState) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&self) -> Result<Option<FocusState>, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &FocusState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}

/// Returns the data directory, creating it if needed.
///
/// Resolution order: `LINGOFOCUS_DATA_DIR`, then `~/.config/lingofocus-dev/`
/// when `LINGOFOCUS_ENV=dev`, then `~/.config/lingofocus/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("LINGOFOCUS_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LINGOFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lingofocus-dev")
            } else {
                base_dir.join("lingofocus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
