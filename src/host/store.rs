// src/host/store.rs

//! JSON-file persistence for the anchor and the process identity.

use super::Persistence;
use crate::error::{DisplayError, DisplayResult};
use crate::geometry::Anchor;
use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    anchor: Option<Anchor>,
    identity: Option<String>,
}

/// Persistence backed by a single JSON document, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse store {}", path.display()))?
        } else {
            info!("JsonFileStore: {} not found, starting empty", path.display());
            StoreData::default()
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> DisplayResult<T> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| DisplayError::Host("store lock poisoned".to_string()))?;
        let mut next = data.clone();
        let out = f(&mut next);
        if next != *data {
            let text = serde_json::to_string_pretty(&next)
                .map_err(|e| DisplayError::Host(e.to_string()))?;
            std::fs::write(&self.path, text)
                .map_err(|e| DisplayError::Host(format!("{}: {}", self.path.display(), e)))?;
            debug!("JsonFileStore: wrote {}", self.path.display());
            *data = next;
        }
        Ok(out)
    }
}

impl Persistence for JsonFileStore {
    fn anchor(&self) -> DisplayResult<Option<Anchor>> {
        self.update(|d| d.anchor)
    }

    fn set_anchor(&self, anchor: Anchor) -> DisplayResult<()> {
        self.update(|d| d.anchor = Some(anchor))
    }

    fn identity(&self) -> DisplayResult<String> {
        self.update(|d| d.identity.get_or_insert_with(new_identity).clone())
    }
}

/// Random-enough identity from the clock and the process id.
pub fn new_identity() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:032x}-{:08x}", nanos, std::process::id())
}
