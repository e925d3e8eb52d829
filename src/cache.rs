//! Local persistence of the four content fields
//!
//! Quote, book, author, and seal are stored under individual keys in one
//! JSON file. An empty value deletes its key, so "stored empty string"
//! and "key absent" stay distinguishable through the load default. When
//! the backing file is unavailable the cache degrades to in-memory-only
//! operation: saves report failure to the log and nothing is surfaced to
//! the user.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::state::CardContent;

pub const KEY_QUOTE: &str = "book-excerpt-quote";
pub const KEY_BOOK: &str = "book-excerpt-book";
pub const KEY_AUTHOR: &str = "book-excerpt-author";
pub const KEY_SEAL: &str = "book-excerpt-seal";

pub struct ContentCache {
    path: PathBuf,
    available: bool,
}

impl ContentCache {
    /// Open a cache at the given file path. Availability is probed once:
    /// the parent directory must be creatable and writable.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let available = Self::probe(&path);
        if !available {
            log::warn!("content cache unavailable at {}; running in-memory only", path.display());
        }
        ContentCache { path, available }
    }

    /// A cache that never persists; used when no cache dir is configured
    pub fn disabled() -> Self {
        ContentCache { path: PathBuf::new(), available: false }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn probe(path: &PathBuf) -> bool {
        if path.as_os_str().is_empty() {
            return false;
        }
        let Some(parent) = path.parent() else {
            return false;
        };
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
        let probe = parent.join(".cache-probe");
        match fs::write(&probe, b"ok") {
            Ok(()) => {
                let _ = fs::remove_file(&probe);
                true
            }
            Err(_) => false,
        }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> bool {
        match serde_json::to_string_pretty(map) {
            Ok(json) => match fs::write(&self.path, json) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("cache save failed: {}", err);
                    false
                }
            },
            Err(err) => {
                log::warn!("cache serialization failed: {}", err);
                false
            }
        }
    }

    /// Save one value. Empty values delete the key. Returns whether the
    /// value was persisted; failures are absorbed.
    pub fn save(&self, key: &str, value: &str) -> bool {
        if !self.available {
            return false;
        }
        let mut map = self.read_map();
        if value.is_empty() {
            map.remove(key);
        } else {
            map.insert(key.to_string(), value.to_string());
        }
        self.write_map(&map)
    }

    /// Load one value, or the default when the key is absent
    pub fn load(&self, key: &str, default: &str) -> String {
        if !self.available {
            return default.to_string();
        }
        self.read_map().get(key).cloned().unwrap_or_else(|| default.to_string())
    }

    /// Remove every content key
    pub fn clear(&self) -> bool {
        if !self.available {
            return false;
        }
        let mut map = self.read_map();
        for key in [KEY_QUOTE, KEY_BOOK, KEY_AUTHOR, KEY_SEAL] {
            map.remove(key);
        }
        self.write_map(&map)
    }

    /// True when any content key is present
    pub fn has_cached_content(&self) -> bool {
        if !self.available {
            return false;
        }
        let map = self.read_map();
        [KEY_QUOTE, KEY_BOOK, KEY_AUTHOR, KEY_SEAL]
            .iter()
            .any(|key| map.contains_key(*key))
    }

    /// Persist all four content fields
    pub fn save_content(&self, content: &CardContent) -> bool {
        if !self.available {
            return false;
        }
        let mut ok = true;
        ok &= self.save(KEY_QUOTE, &content.quote);
        ok &= self.save(KEY_BOOK, &content.book);
        ok &= self.save(KEY_AUTHOR, &content.author);
        ok &= self.save(KEY_SEAL, &content.seal);
        ok
    }

    /// Load all four content fields, empty strings for absent keys
    pub fn load_content(&self) -> CardContent {
        CardContent {
            quote: self.load(KEY_QUOTE, ""),
            book: self.load(KEY_BOOK, ""),
            author: self.load(KEY_AUTHOR, ""),
            seal: self.load(KEY_SEAL, ""),
        }
    }
}
