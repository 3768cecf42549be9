// ── File-backed store ──
//
// One JSON object on disk, `{ key: value, ... }`. Writes go to a sibling
// temp file first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::error::CoreError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, CoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(&e)),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CoreError::persistence(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(CoreError::persistence(format!(
                "{} is not valid JSON: {e}",
                self.path.display()
            ))),
        }
    }

    fn io_error(&self, err: &std::io::Error) -> CoreError {
        CoreError::persistence(format!("{}: {err}", self.path.display()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_owned(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(&e))?;
        }

        let text = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| self.io_error(&e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(&e))?;

        debug!(key, path = %self.path.display(), "store written");
        Ok(())
    }
}
