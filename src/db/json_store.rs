use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use chrono::Utc;
use rand::{distributions::Uniform, Rng};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A JSON array persisted as a single file.
///
/// Every mutation rewrites the whole file. Writers are serialized through
/// `write_lock` and the new contents are renamed over the old file; readers
/// see either the old or the new array, never a partial one.
pub struct JsonCollection<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the collection, creating the parent directory and an empty `[]`
    /// file when they do not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        if tokio::fs::metadata(&path).await.is_err() {
            tokio::fs::write(&path, "[]")
                .await
                .map_err(|source| io_error(&path, source))?;
            log::info!("Created empty collection file {}", path.display());
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    /// Reads every record. A missing or unparsable file reads as empty.
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        match self.read().await {
            Err(StoreError::Serialization(err)) => {
                log::warn!(
                    "Collection file {} is not a valid JSON array ({}), treating it as empty",
                    self.path.display(),
                    err
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Loads the records, applies `f` and persists the result.
    ///
    /// The file is only rewritten when `f` reports a change through its
    /// `bool` output. An unparsable file is left untouched and the update
    /// fails with [`StoreError::Serialization`].
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> (R, bool),
    ) -> Result<R, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.read().await.map_err(|err| {
            log::error!("Refusing to rewrite {}: {}", self.path.display(), err);
            err
        })?;
        let (result, changed) = f(&mut items);
        if changed {
            self.save(&items).await?;
        }

        Ok(result)
    }

    async fn read(&self) -> Result<Vec<T>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&self.path, source)),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(items)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, body)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))?;

        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Builds a record id of the form `prefix_<unix millis>_<9 base36 chars>`.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Uniform::from(0..BASE36.len()))
        .take(ID_SUFFIX_LEN)
        .map(|i| BASE36[i] as char)
        .collect();

    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}
