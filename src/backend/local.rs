use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{BackendError, Document, DocumentStore, Fields};

type Collection = BTreeMap<String, Fields>;

/// Document store keeping one JSON file per collection.
///
/// `<dir>/<collection>.json` holds an object mapping document ids to their
/// fields. A missing file is an empty collection.
pub struct LocalStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> Result<Collection, BackendError> {
        read_json_or_default(&self.collection_path(collection)).await
    }

    async fn store(&self, collection: &str, documents: &Collection) -> Result<(), BackendError> {
        write_atomic(&self.collection_path(collection), &serde_json::to_vec_pretty(documents)?)
            .await
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let documents = self.load(collection).await?;
        Ok(documents
            .into_iter()
            .map(|(id, fields)| Document { id, fields })
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let mut documents = self.load(collection).await?;
        Ok(documents.remove(id).map(|fields| Document {
            id: id.to_string(),
            fields,
        }))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.load(collection).await?;
        documents.insert(id.to_string(), fields);
        self.store(collection, &documents).await?;
        debug!(collection, id, "Wrote document");
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, BackendError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.load(collection).await?;
        let id = Uuid::new_v4().simple().to_string();
        documents.insert(id.clone(), fields);
        self.store(collection, &documents).await?;
        debug!(collection, %id, "Added document");
        Ok(id)
    }
}

/// Read a JSON file, falling back to the default value if it does not exist.
pub(super) async fn read_json_or_default<T>(path: &Path) -> Result<T, BackendError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(error) => Err(error.into()),
    }
}

/// Replace `path` with `contents` through a temporary sibling file.
pub(super) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BackendError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::encode;
    use crate::model::{Price, SERVICES_COLLECTION, ServiceRecord};

    fn fields(name: &str) -> Fields {
        encode(&ServiceRecord::new(name, Price::whole(1000))).unwrap()
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(store.fetch_all(SERVICES_COLLECTION).await.unwrap().is_empty());
        assert!(store.get(SERVICES_COLLECTION, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let first = store.add(SERVICES_COLLECTION, fields("Haircut")).await.unwrap();
        let second = store.add(SERVICES_COLLECTION, fields("Manicure")).await.unwrap();
        assert_ne!(first, second);

        let documents = store.fetch_all(SERVICES_COLLECTION).await.unwrap();
        assert_eq!(documents.len(), 2);
        let found = store.get(SERVICES_COLLECTION, &first).await.unwrap().unwrap();
        assert_eq!(found.fields, fields("Haircut"));
    }

    #[tokio::test]
    async fn test_set_overwrites_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::new(dir.path());
            store.set("user", "uid-1", fields("old")).await.unwrap();
            store.set("user", "uid-1", fields("new")).await.unwrap();
        }

        let reopened = LocalStore::new(dir.path());
        let documents = reopened.fetch_all("user").await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].fields, fields("new"));
        assert!(!dir.path().join("user.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("services.json"), "not json").unwrap();
        let store = LocalStore::new(dir.path());

        let result = store.fetch_all(SERVICES_COLLECTION).await;
        assert!(matches!(result, Err(BackendError::Json(_))));
    }
}
