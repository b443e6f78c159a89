// Loading of the two local inputs: the credentials file and the data file.
// Both are JSON. Errors are returned to the caller; the binaries decide
// whether to terminate.

use crate::record::{Dataset, RecordType};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid filename: '{0}'. Must end in '.json'.")]
    InvalidExtension(String),
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Subscription credentials. Field names mirror the credentials file
/// (`{"subId": .., "token": .., "url": ..}`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "subId")]
    pub sub_id: String,
    pub token: String,
    pub url: String,
}

impl Credentials {
    /// Collection endpoint for `record_type`:
    /// `{url}/api/subscriptions/{subId}/{type}s`.
    pub fn endpoint(&self, record_type: RecordType) -> String {
        format!(
            "{}/api/subscriptions/{}/{}",
            self.url.trim_end_matches('/'),
            self.sub_id,
            record_type.collection()
        )
    }
}

/// Expand `~/` and make relative paths absolute against the working
/// directory.
pub fn resolve_path(filename: &str) -> PathBuf {
    if let Some(rest) = filename.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = Path::new(filename);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Read and deserialize a `.json` file.
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T, LoadError> {
    if !filename.ends_with(".json") {
        return Err(LoadError::InvalidExtension(filename.to_string()));
    }
    let path = resolve_path(filename);
    debug!("loading {}", path.display());
    let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse { path, source })
}

pub fn load_credentials(filename: &str) -> Result<Credentials, LoadError> {
    load_json(filename)
}

/// The data file must hold an array of JSON objects.
pub fn load_dataset(filename: &str) -> Result<Dataset, LoadError> {
    load_json(filename)
}
