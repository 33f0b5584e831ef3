use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto;
use crate::models::AppData;

const APP_DIR: &str = "habitkin";
const DATA_FILE: &str = "data.habitkin";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

/// Encrypted single-file store for everything the app keeps on disk.
#[derive(Debug, Clone)]
pub struct Vault {
    dir: PathBuf,
}

impl Vault {
    /// Vault in the platform's local data directory.
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join(APP_DIR);
        Ok(Self::at(dir))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    /// Whether the app has been set up on this device.
    pub fn exists(&self) -> bool {
        self.file_path().exists()
    }

    pub fn save(&self, passphrase: &str, data: &AppData) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = zeroize::Zeroizing::new(serde_json::to_vec(data)?);
        let sealed = crypto::seal(passphrase, &json)?;

        // replace atomically
        let tmp = self.dir.join(format!("{DATA_FILE}.tmp"));
        fs::write(&tmp, sealed)?;
        fs::rename(&tmp, self.file_path())?;
        log::debug!("vault saved ({} habits)", data.habits.len());
        Ok(())
    }

    pub fn load(&self, passphrase: &str) -> Result<AppData, StorageError> {
        let sealed = fs::read(self.file_path())?;
        let json = crypto::open(passphrase, &sealed)?;
        let data: AppData = serde_json::from_slice(&json)?;
        Ok(data)
    }

    /// Delete all data permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        let path = self.file_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        log::info!("vault wiped");
        Ok(())
    }
}
