//! The card's memory: the photo list and the greeting, plus where they live.
//!
//! Storage is a plain string key-value store behind [`KeyValueStore`]. Photos
//! are kept as a JSON array under [`STORAGE_KEY_PHOTOS`], the greeting as raw
//! text under [`STORAGE_KEY_GREETING`].

use crate::error::StoreError;
use crate::greeting::DEFAULT_GREETING;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const STORAGE_KEY_PHOTOS: &str = "stardust_photos";
pub const STORAGE_KEY_GREETING: &str = "stardust_blessing";

/// A photo the user added.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPhoto {
    pub id: String,
    /// File path or `data:` URL.
    pub url: String,
}

impl UserPhoto {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Photo with an id derived from the clock and a counter.
    pub fn with_fresh_id(url: impl Into<String>, counter: u64) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self::new(format!("{millis}-{counter}"), url)
    }
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Remove every key.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory store, for tests and for running without a keepsake file.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.values.clear();
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.values.clear();
        self.flush()
    }
}

/// Photos and greeting as the user left them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keepsake {
    photos: Vec<UserPhoto>,
    greeting: String,
    max_photos: usize,
}

impl Keepsake {
    pub fn new(max_photos: usize) -> Self {
        Self {
            photos: Vec::new(),
            greeting: DEFAULT_GREETING.to_owned(),
            max_photos,
        }
    }

    /// Read state from `store`, keeping defaults for missing keys.
    pub fn load(store: &dyn KeyValueStore, max_photos: usize) -> Result<Self, StoreError> {
        let mut keepsake = Self::new(max_photos);
        if let Some(json) = store.get(STORAGE_KEY_PHOTOS)? {
            keepsake.photos = serde_json::from_str(&json)?;
            keepsake.trim();
        }
        if let Some(greeting) = store.get(STORAGE_KEY_GREETING)? {
            keepsake.greeting = greeting;
        }
        Ok(keepsake)
    }

    /// Write both keys to `store`.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(STORAGE_KEY_PHOTOS, &serde_json::to_string(&self.photos)?)?;
        store.set(STORAGE_KEY_GREETING, &self.greeting)
    }

    pub fn photos(&self) -> &[UserPhoto] {
        &self.photos
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Append a photo, dropping the oldest ones beyond the cap.
    pub fn add_photo(&mut self, photo: UserPhoto) {
        self.photos.push(photo);
        self.trim();
    }

    /// Remove the photo with `id`. Returns whether it existed.
    pub fn remove_photo(&mut self, id: &str) -> bool {
        let before = self.photos.len();
        self.photos.retain(|p| p.id != id);
        self.photos.len() != before
    }

    pub fn set_greeting(&mut self, greeting: impl Into<String>) {
        self.greeting = greeting.into();
    }

    /// Forget everything: no photos, default greeting, empty store.
    pub fn clear(&mut self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        self.photos.clear();
        self.greeting = DEFAULT_GREETING.to_owned();
        store.clear()
    }

    fn trim(&mut self) {
        if self.photos.len() > self.max_photos {
            let excess = self.photos.len() - self.max_photos;
            self.photos.drain(..excess);
        }
    }
}
