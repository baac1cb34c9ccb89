//! Asset resolution and the shared decoded-image cache.
//!
//! The rendering core never does IO of its own: it asks an
//! [`AssetResolver`] for "the decoded image behind this reference" and
//! degrades gracefully when the answer is no. The cache is an explicit
//! object passed by reference into the generator, not a global.

use image::RgbaImage;
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// Error type for asset loading failures
#[derive(Debug, Error)]
pub enum AssetError {
    /// The reference did not resolve to a readable file
    #[error("asset '{0}' not found")]
    NotFound(String),
    /// File I/O error
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    /// Decode failure
    #[error("failed to decode asset: {0}")]
    Decode(#[from] image::ImageError),
}

/// Resolves an asset reference (name or URL) to a decoded image.
///
/// Implemented outside the core; the filesystem resolver below covers the
/// CLI driver. Failures are expected inputs, not bugs: callers skip the
/// affected layer.
pub trait AssetResolver: Send + Sync {
    /// Load and decode the image behind `reference`.
    fn load(&self, reference: &str) -> Result<RgbaImage, AssetError>;
}

/// Resolver that treats references as paths under a root directory.
///
/// Absolute references are used as-is; relative ones are joined to the
/// root. References without an extension try `.png`.
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    /// Create a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetResolver for DirResolver {
    fn load(&self, reference: &str) -> Result<RgbaImage, AssetError> {
        let direct = PathBuf::from(reference);
        let mut path = if direct.is_absolute() { direct } else { self.root.join(reference) };
        if path.extension().is_none() {
            path.set_extension("png");
        }
        if !path.exists() {
            return Err(AssetError::NotFound(reference.to_string()));
        }
        let img = image::open(&path)?;
        Ok(img.to_rgba8())
    }
}

/// Cache slot: initialized exactly once, `None` records a failed load so
/// repeated requests don't retry a broken reference every render.
type Slot = Arc<OnceLock<Option<Arc<RgbaImage>>>>;

/// Shared decoded-image cache with get-or-load semantics.
///
/// Concurrent `get` calls for the same reference collapse onto a single
/// load: the per-key slot is handed out under the map lock, and
/// `OnceLock::get_or_init` makes the second caller block on the first
/// caller's in-flight load instead of fetching again.
pub struct AssetCache {
    resolver: Box<dyn AssetResolver>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl AssetCache {
    /// Create a cache over the given resolver.
    pub fn new(resolver: Box<dyn AssetResolver>) -> Self {
        Self { resolver, slots: Mutex::new(HashMap::new()) }
    }

    /// Fetch the decoded image for `reference`, loading it on first use.
    ///
    /// Returns `None` when the asset cannot be loaded; the failure is
    /// logged once and cached, and callers skip the layer.
    pub fn get(&self, reference: &str) -> Option<Arc<RgbaImage>> {
        if reference.is_empty() {
            return None;
        }
        let slot = {
            let mut slots = self.slots.lock().expect("asset cache lock poisoned");
            slots.entry(reference.to_string()).or_default().clone()
        };
        slot.get_or_init(|| match self.resolver.load(reference) {
            Ok(img) => Some(Arc::new(img)),
            Err(err) => {
                warn!("asset '{}' failed to load: {}", reference, err);
                None
            }
        })
        .clone()
    }

    /// Number of cached entries, including negative ones.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("asset cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
