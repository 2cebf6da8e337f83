use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STORE_DIR: &str = "gallery";
const STORE_FILE: &str = "identity.v1.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityStoreV1 {
    pub version: u32,
    pub user_id: String,
    pub created_at: String,
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn identity_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_DIR).join(STORE_FILE)
}

/// Read the persisted device identity, minting and persisting a fresh one on
/// first use. The id survives restarts so the likes service keeps seeing the
/// same device.
pub fn load_or_create_identity(data_dir: &Path) -> Result<IdentityStoreV1, StoreError> {
    let path = identity_path(data_dir);
    if path.exists() {
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::Read(e.to_string()))?;
        let mut store: IdentityStoreV1 =
            serde_json::from_str(&raw).map_err(|e| StoreError::Parse(e.to_string()))?;
        if store.version == 0 {
            store.version = 1;
        }
        return Ok(store);
    }
    let store = IdentityStoreV1 {
        version: 1,
        user_id: Uuid::new_v4().to_string(),
        created_at: now_iso(),
    };
    write_identity_at_path(&path, &store)?;
    Ok(store)
}

pub fn write_identity_at_path(path: &Path, store: &IdentityStoreV1) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir(e.to_string()))?;
    }
    let raw =
        serde_json::to_string_pretty(store).map_err(|e| StoreError::Serialize(e.to_string()))?;
    fs::write(path, raw).map_err(|e| StoreError::Write(e.to_string()))
}
