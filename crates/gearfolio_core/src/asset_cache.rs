//! Type-erased asset cache
//!
//! Assets are stored as `Arc<dyn Any + Send + Sync>` and indexed by id and
//! by source path, so the same file is only ever loaded once. Assets can
//! come from a synchronous [`AssetCache::load`] or be handed over by the
//! background [`AssetLoader`](crate::AssetLoader) via [`AssetCache::insert`].
//!
//! ```ignore
//! let mut cache = AssetCache::new();
//! let handle = cache.load::<ModelAsset>("assets/models/drone.glb")?;
//! let model: Arc<ModelAsset> = cache.get(&handle).unwrap();
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset_error::AssetError;

/// Unique identifier for an asset in the cache (0 is never assigned)
pub type AssetId = u64;

/// Lightweight handle to a cached asset
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct AssetHandle {
    id: AssetId,
    path: PathBuf,
}

impl AssetHandle {
    /// Get the asset ID
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Get the file path this asset was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Types that can be loaded from a file and cached
pub trait Asset: Sized + Send + Sync + 'static {
    /// Load this asset from the given file path
    fn load_from_file(path: &Path) -> Result<Self, AssetError>;
}

struct CachedEntry {
    data: Arc<dyn Any + Send + Sync>,
    path: PathBuf,
    /// Names of the systems holding on to this asset
    dependents: Vec<String>,
}

/// Asset cache with path deduplication and dependency tracking
///
/// Assets with no dependents are released by [`gc`](Self::gc).
pub struct AssetCache {
    assets: HashMap<AssetId, CachedEntry>,
    path_index: HashMap<PathBuf, AssetId>,
    next_id: u64,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    /// Create a new empty asset cache
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
            path_index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load an asset, or return the existing handle if the path is cached
    pub fn load<T: Asset>(&mut self, path: impl AsRef<Path>) -> Result<AssetHandle, AssetError> {
        let path = path.as_ref();
        if let Some(handle) = self.handle_for_path(path) {
            return Ok(handle);
        }
        let data = T::load_from_file(path)?;
        Ok(self.insert(path, data))
    }

    /// Cache an already loaded asset under `path`
    ///
    /// Replaces the data if the path is already cached; the handle (and the
    /// dependents) stay the same.
    pub fn insert<T: Asset>(&mut self, path: impl AsRef<Path>, data: T) -> AssetHandle {
        let path = path.as_ref().to_path_buf();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(data);

        if let Some(&id) = self.path_index.get(&path) {
            if let Some(entry) = self.assets.get_mut(&id) {
                entry.data = data;
                log::debug!("Replaced cached asset {}", path.display());
                return AssetHandle { id, path };
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.assets.insert(
            id,
            CachedEntry {
                data,
                path: path.clone(),
                dependents: Vec::new(),
            },
        );
        self.path_index.insert(path.clone(), id);
        log::debug!("Cached asset {} as #{}", path.display(), id);
        AssetHandle { id, path }
    }

    /// Handle of the asset cached under `path`, if any
    pub fn handle_for_path(&self, path: impl AsRef<Path>) -> Option<AssetHandle> {
        let path = path.as_ref();
        self.path_index.get(path).map(|&id| AssetHandle {
            id,
            path: path.to_path_buf(),
        })
    }

    /// Retrieve a cached asset, downcasting to `T`
    ///
    /// Returns `None` for a stale handle or a type mismatch.
    pub fn get<T: Asset>(&self, handle: &AssetHandle) -> Option<Arc<T>> {
        let entry = self.assets.get(&handle.id)?;
        entry.data.clone().downcast::<T>().ok()
    }

    /// Register `dependent` as a user of the asset
    pub fn add_dependent(&mut self, handle: &AssetHandle, dependent: &str) {
        if let Some(entry) = self.assets.get_mut(&handle.id) {
            if !entry.dependents.iter().any(|d| d == dependent) {
                entry.dependents.push(dependent.to_string());
            }
        }
    }

    /// Release `dependent`'s claim on the asset
    pub fn remove_dependent(&mut self, handle: &AssetHandle, dependent: &str) {
        if let Some(entry) = self.assets.get_mut(&handle.id) {
            entry.dependents.retain(|d| d != dependent);
        }
    }

    /// Dependents of an asset, `None` for a stale handle
    pub fn dependents(&self, handle: &AssetHandle) -> Option<&[String]> {
        self.assets.get(&handle.id).map(|e| e.dependents.as_slice())
    }

    /// Remove assets with no dependents, returning how many were removed
    pub fn gc(&mut self) -> usize {
        let to_remove: Vec<AssetId> = self
            .assets
            .iter()
            .filter(|(_, entry)| entry.dependents.is_empty())
            .map(|(&id, _)| id)
            .collect();

        for id in &to_remove {
            if let Some(entry) = self.assets.remove(id) {
                self.path_index.remove(&entry.path);
            }
        }
        if !to_remove.is_empty() {
            log::debug!("Asset gc released {} assets", to_remove.len());
        }
        to_remove.len()
    }

    /// Number of cached assets
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Whether the handle still refers to a cached asset
    pub fn contains(&self, handle: &AssetHandle) -> bool {
        self.assets.contains_key(&handle.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Debug, PartialEq)]
    struct TextAsset {
        content: String,
    }

    impl Asset for TextAsset {
        fn load_from_file(path: &Path) -> Result<Self, AssetError> {
            Ok(TextAsset { content: fs::read_to_string(path)? })
        }
    }

    #[derive(Debug)]
    struct NumberAsset;

    impl Asset for NumberAsset {
        fn load_from_file(_path: &Path) -> Result<Self, AssetError> {
            Ok(NumberAsset)
        }
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("gearfolio_asset_cache_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_and_retrieve() {
        let path = temp_file("load.txt", "hello");
        let mut cache = AssetCache::new();
        let handle = cache.load::<TextAsset>(&path).unwrap();
        assert_eq!(handle.id(), 1);
        assert_eq!(handle.path(), path);
        assert_eq!(cache.get::<TextAsset>(&handle).unwrap().content, "hello");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_same_path_loads_once() {
        let path = temp_file("dedup.txt", "first");
        let mut cache = AssetCache::new();
        let a = cache.load::<TextAsset>(&path).unwrap();
        fs::write(&path, "second").unwrap();
        let b = cache.load::<TextAsset>(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.asset_count(), 1);
        assert_eq!(cache.get::<TextAsset>(&b).unwrap().content, "first");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cache = AssetCache::new();
        assert!(cache.load::<TextAsset>("/nonexistent/file.txt").is_err());
        assert_eq!(cache.asset_count(), 0);
    }

    #[test]
    fn test_insert_and_lookup_by_path() {
        let mut cache = AssetCache::new();
        assert!(cache.handle_for_path("models/a.glb").is_none());
        let handle = cache.insert("models/a.glb", TextAsset { content: "a".into() });
        assert_eq!(cache.handle_for_path("models/a.glb"), Some(handle.clone()));

        let again = cache.insert("models/a.glb", TextAsset { content: "b".into() });
        assert_eq!(again, handle);
        assert_eq!(cache.get::<TextAsset>(&handle).unwrap().content, "b");
    }

    #[test]
    fn test_wrong_type_returns_none() {
        let mut cache = AssetCache::new();
        let handle = cache.insert("x", TextAsset { content: String::new() });
        assert!(cache.get::<NumberAsset>(&handle).is_none());
        assert!(cache.get::<TextAsset>(&handle).is_some());
    }

    #[test]
    fn test_gc_keeps_assets_with_dependents() {
        let mut cache = AssetCache::new();
        let kept = cache.insert("kept", TextAsset { content: String::new() });
        let dropped = cache.insert("dropped", TextAsset { content: String::new() });
        cache.add_dependent(&kept, "viewer");
        cache.add_dependent(&kept, "viewer");
        assert_eq!(cache.dependents(&kept).map(<[String]>::len), Some(1));

        assert_eq!(cache.gc(), 1);
        assert!(cache.contains(&kept));
        assert!(!cache.contains(&dropped));
        assert!(cache.handle_for_path("dropped").is_none());

        cache.remove_dependent(&kept, "viewer");
        assert_eq!(cache.gc(), 1);
        assert_eq!(cache.asset_count(), 0);
    }
}
