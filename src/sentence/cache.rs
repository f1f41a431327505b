//! On-disk cache of generated sentences
//!
//! Entries are keyed by a SHA-256 digest of the sorted word list and the
//! optional context, so the same words signed in a different order reuse
//! the same sentence. Stored as JSON at `~/.sueo/cache/sentence_cache.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A cached sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub words: Vec<String>,
    pub context: Option<String>,
    pub sentence: String,
    pub created_at: DateTime<Utc>,
}

/// Cache usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_hits: u64,
    pub total_requests: u64,
    /// Hit rate as a percentage
    pub hit_rate: f64,
    pub cache_size_kb: f64,
}

/// Sentence cache backed by a JSON file
#[derive(Debug)]
pub struct SentenceCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    requests: u64,
}

/// Default cache file location (~/.sueo/cache/sentence_cache.json)
pub fn default_cache_path() -> PathBuf {
    crate::config::get_data_dir()
        .join("cache")
        .join("sentence_cache.json")
}

/// Compute the cache key for a word list and context
pub fn cache_key(words: &[String], context: Option<&str>) -> String {
    let mut sorted = words.to_vec();
    sorted.sort();

    // serde_json maps keep their keys sorted, so the encoding is stable
    let key_data = serde_json::json!({
        "words": sorted,
        "context": context.unwrap_or(""),
    });

    let mut hasher = Sha256::new();
    hasher.update(key_data.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

impl SentenceCache {
    /// Open a cache file, starting empty if it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        tracing::debug!("Sentence cache opened with {} entries", entries.len());
        Self {
            path,
            entries,
            hits: 0,
            requests: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a sentence, counting the request
    pub fn get(&mut self, words: &[String], context: Option<&str>) -> Option<String> {
        self.requests += 1;
        let sentence = self
            .entries
            .get(&cache_key(words, context))
            .map(|entry| entry.sentence.clone());

        if sentence.is_some() {
            self.hits += 1;
            tracing::debug!("Sentence cache hit for {:?}", words);
        }
        sentence
    }

    /// Store a sentence and persist the cache
    pub fn insert(
        &mut self,
        words: &[String],
        context: Option<&str>,
        sentence: &str,
    ) -> Result<(), String> {
        self.entries.insert(
            cache_key(words, context),
            CacheEntry {
                words: words.to_vec(),
                context: context.map(str::to_string),
                sentence: sentence.to_string(),
                created_at: Utc::now(),
            },
        );
        self.save()
    }

    fn save(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create cache directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialise cache: {}", e))?;

        fs::write(&self.path, content).map_err(|e| format!("Failed to write cache: {}", e))
    }

    /// Usage statistics
    pub fn stats(&self) -> CacheStats {
        let cache_size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        CacheStats {
            total_entries: self.entries.len(),
            total_hits: self.hits,
            total_requests: self.requests,
            hit_rate: self.hits as f64 / self.requests.max(1) as f64 * 100.0,
            cache_size_kb: cache_size as f64 / 1024.0,
        }
    }

    /// Drop every entry and delete the cache file
    pub fn clear(&mut self) -> Result<(), String> {
        self.entries.clear();
        self.hits = 0;
        self.requests = 0;

        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| format!("Failed to delete cache: {}", e))?;
        }
        tracing::info!("Sentence cache cleared");
        Ok(())
    }
}

fn load_entries(path: &Path) -> HashMap<String, CacheEntry> {
    if !path.exists() {
        return HashMap::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse sentence cache: {}", e);
            HashMap::new()
        }),
        Err(e) => {
            tracing::warn!("Failed to read sentence cache: {}", e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cache_key_ignores_word_order() {
        assert_eq!(
            cache_key(&words(&["나", "학교", "가다"]), None),
            cache_key(&words(&["가다", "나", "학교"]), None)
        );
    }

    #[test]
    fn test_cache_key_depends_on_context() {
        let w = words(&["구급차"]);
        assert_ne!(cache_key(&w, None), cache_key(&w, Some("응급")));
        assert_eq!(cache_key(&w, None), cache_key(&w, Some("")));
        assert_eq!(cache_key(&w, None).len(), 64);
    }

    #[test]
    fn test_insert_get_and_stats() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = SentenceCache::open(temp_dir.path().join("cache.json"));
        let w = words(&["나", "아프다"]);

        assert_eq!(cache.get(&w, None), None);
        cache.insert(&w, None, "저는 아픕니다.").unwrap();
        assert_eq!(cache.get(&w, None), Some("저는 아픕니다.".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.hit_rate, 50.0);
        assert!(stats.cache_size_kb > 0.0);
    }

    #[test]
    fn test_cache_persists_across_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("cache.json");
        let w = words(&["구급차"]);

        SentenceCache::open(&path)
            .insert(&w, None, "구급차입니다.")
            .unwrap();

        let mut reopened = SentenceCache::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&w, None), Some("구급차입니다.".to_string()));
    }

    #[test]
    fn test_corrupt_cache_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();

        assert!(SentenceCache::open(&path).is_empty());
    }

    #[test]
    fn test_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let mut cache = SentenceCache::open(&path);
        cache.insert(&words(&["병원"]), None, "병원입니다.").unwrap();
        assert!(path.exists());

        cache.clear().unwrap();
        assert!(cache.is_empty());
        assert!(!path.exists());
        assert_eq!(cache.stats().total_requests, 0);
    }
}
