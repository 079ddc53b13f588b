//! Load state of the model shown in the project viewer
//!
//! A [`ModelSlot`] tracks one requested model from the moment it is queued
//! until it is ready or has failed. While it is not ready the viewer shows
//! [`ModelState::placeholder`] instead of the model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset_cache::AssetCache;
use crate::asset_loader::{AssetLoader, LoadResult, LoadTicket};
use crate::model::{MaterialOverride, ModelAsset};

/// Placeholder text while a model is loading
pub const LOADING_TEXT: &str = "Loading model…";
/// Placeholder text when a model could not be loaded
pub const UNAVAILABLE_TEXT: &str = "Model unavailable";

/// Name under which the viewer registers itself as an asset dependent
const DEPENDENT: &str = "viewer";

/// Where a model is in its life cycle
#[derive(Clone, Debug)]
pub enum ModelState {
    /// Queued or being parsed
    Pending,
    /// Loaded, overrides applied
    Ready(Arc<ModelAsset>),
    /// Load failed with the given message
    Failed(String),
}

impl ModelState {
    /// Text to show instead of the model, `None` once ready
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            ModelState::Pending => Some(LOADING_TEXT),
            ModelState::Ready(_) => None,
            ModelState::Failed(_) => Some(UNAVAILABLE_TEXT),
        }
    }

    /// The model, once ready
    pub fn model(&self) -> Option<&Arc<ModelAsset>> {
        match self {
            ModelState::Ready(model) => Some(model),
            _ => None,
        }
    }

    /// Whether the load is still outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, ModelState::Pending)
    }
}

/// One requested model
#[derive(Debug)]
pub struct ModelSlot {
    path: PathBuf,
    ticket: Option<LoadTicket>,
    state: ModelState,
    overrides: MaterialOverride,
}

impl ModelSlot {
    /// Request the model at `path`
    ///
    /// A model already in `cache` is ready immediately; otherwise the load
    /// is queued on `loader` and the slot starts out pending.
    pub fn request(
        path: impl Into<PathBuf>,
        overrides: MaterialOverride,
        loader: &mut AssetLoader<ModelAsset>,
        cache: &mut AssetCache,
    ) -> Self {
        let path = path.into();
        if let Some(handle) = cache.handle_for_path(&path) {
            if let Some(model) = cache.get::<ModelAsset>(&handle) {
                log::debug!("Model {} served from cache", path.display());
                cache.add_dependent(&handle, DEPENDENT);
                return Self {
                    path,
                    ticket: None,
                    state: ModelState::Ready(model),
                    overrides,
                };
            }
        }

        let ticket = loader.load_async(path.clone());
        log::info!("Loading model {}", path.display());
        Self {
            path,
            ticket: Some(ticket),
            state: ModelState::Pending,
            overrides,
        }
    }

    /// Requested path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Offer a finished load to this slot
    ///
    /// Returns `false` (and leaves the slot untouched) when the result
    /// belongs to a different request.
    pub fn accept(&mut self, result: LoadResult<ModelAsset>, cache: &mut AssetCache) -> bool {
        if self.ticket != Some(result.ticket) {
            return false;
        }
        self.ticket = None;

        self.state = match result.result {
            Ok(mut model) => {
                model.apply_override(&self.overrides);
                let handle = cache.insert(&self.path, model);
                cache.add_dependent(&handle, DEPENDENT);
                match cache.get::<ModelAsset>(&handle) {
                    Some(model) => ModelState::Ready(model),
                    None => ModelState::Failed(format!("{} vanished from the cache", self.path.display())),
                }
            }
            Err(e) => {
                log::warn!("Model {} unavailable: {}", self.path.display(), e);
                ModelState::Failed(e.to_string())
            }
        };
        true
    }

    /// Give up the slot, releasing its claim on the cached model
    pub fn release(self, cache: &mut AssetCache) {
        if let Some(handle) = cache.handle_for_path(&self.path) {
            cache.remove_dependent(&handle, DEPENDENT);
        }
    }
}
