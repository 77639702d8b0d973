use super::naming::{HashedName, NamingStrategy};
use super::{read_local_file, require_path, StorageService};
use crate::models::{ListingEntry, Upload};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// In-memory storage zone for tests.
#[derive(Clone)]
pub struct MockStorageClient {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    upload_count: Arc<Mutex<usize>>,
    purged: Arc<Mutex<Vec<String>>>,
    naming: Arc<dyn NamingStrategy>,
    reachable: bool,
}

impl MockStorageClient {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(BTreeMap::new())),
            upload_count: Arc::new(Mutex::new(0)),
            purged: Arc::new(Mutex::new(Vec::new())),
            naming: Arc::new(HashedName),
            reachable: true,
        }
    }

    pub fn with_file(self, key: &str, content: Vec<u8>) -> Self {
        self.files.lock().unwrap().insert(normalize(key), content);
        self
    }

    pub fn with_naming(mut self, naming: Box<dyn NamingStrategy>) -> Self {
        self.naming = Arc::from(naming);
        self
    }

    /// Makes `ping` report the API as down.
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_purged(&self) -> Vec<String> {
        self.purged.lock().unwrap().clone()
    }

    pub fn get_files(&self) -> BTreeMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

#[async_trait]
impl StorageService for MockStorageClient {
    async fn ping(&self) -> Result<bool> {
        Ok(self.reachable)
    }

    async fn list(&self, path: &str) -> Result<Vec<ListingEntry>> {
        let mut prefix = normalize(path);
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }

        let files = self.files.lock().unwrap();
        let mut entries: BTreeMap<String, ListingEntry> = BTreeMap::new();

        for (key, data) in files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => json!({
                    "ObjectName": dir,
                    "IsDirectory": true,
                    "Length": 0,
                }),
                None => json!({
                    "ObjectName": rest,
                    "IsDirectory": false,
                    "Length": data.len(),
                }),
            };
            let name = entry["ObjectName"].as_str().unwrap_or_default().to_string();
            entries.insert(name, serde_json::from_value(entry)?);
        }

        if entries.is_empty() && !prefix.is_empty() {
            return Err(Error::NotFound(path.to_string()));
        }
        Ok(entries.into_values().collect())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        require_path(path)?;
        Ok(self.files.lock().unwrap().contains_key(&normalize(path)))
    }

    async fn size(&self, path: &str) -> Result<Option<u64>> {
        require_path(path)?;
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&normalize(path))
            .map(|data| data.len() as u64))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        require_path(path)?;
        self.files
            .lock()
            .unwrap()
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    async fn upload(
        &self,
        local_path: &Path,
        remote_path: &str,
        randomize_name: bool,
    ) -> Result<Upload> {
        require_path(remote_path)?;
        let data = read_local_file(local_path).await?;

        let remote_path = if randomize_name {
            self.naming.rename(remote_path)
        } else {
            remote_path.to_string()
        };

        *self.upload_count.lock().unwrap() += 1;
        self.files
            .lock()
            .unwrap()
            .insert(normalize(&remote_path), data);

        Ok(Upload {
            stored: true,
            remote_path,
        })
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        require_path(path)?;
        Ok(self.files.lock().unwrap().remove(&normalize(path)).is_some())
    }

    async fn purge(&self, path: &str) -> Result<Value> {
        require_path(path)?;
        self.purged.lock().unwrap().push(path.to_string());
        Ok(json!({ "status": "ok" }))
    }
}
