//! Persisted cart identifier.
//!
//! One opaque cart ID per session. Stores never fail from the caller's point
//! of view: an unreadable value is "no value" and a failed write is logged.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::shopify::types::CartId;

/// Session-scoped storage for the current cart ID.
pub trait CartIdStore: Send + Sync {
    /// The stored cart ID, if any.
    fn get(&self) -> Option<CartId>;

    /// Replace the stored cart ID.
    fn set(&self, cart_id: &CartId);

    /// Forget the stored cart ID.
    fn clear(&self);
}

impl<S: CartIdStore + ?Sized> CartIdStore for std::sync::Arc<S> {
    fn get(&self) -> Option<CartId> {
        (**self).get()
    }

    fn set(&self, cart_id: &CartId) {
        (**self).set(cart_id);
    }

    fn clear(&self) {
        (**self).clear();
    }
}

// =============================================================================
// MemoryCartIdStore
// =============================================================================

/// In-process store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCartIdStore {
    cart_id: Mutex<Option<CartId>>,
}

impl MemoryCartIdStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `cart_id`.
    #[must_use]
    pub fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            cart_id: Mutex::new(Some(cart_id)),
        }
    }
}

impl CartIdStore for MemoryCartIdStore {
    fn get(&self) -> Option<CartId> {
        self.cart_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, cart_id: &CartId) {
        *self.cart_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(cart_id.clone());
    }

    fn clear(&self) {
        *self.cart_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// FileCartIdStore
// =============================================================================

/// Durable store backed by a single file holding the cart ID.
#[derive(Debug, Clone)]
pub struct FileCartIdStore {
    path: PathBuf,
}

impl FileCartIdStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartIdStore for FileCartIdStore {
    fn get(&self) -> Option<CartId> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                (!id.is_empty()).then(|| CartId::new(id))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read cart ID");
                None
            }
        }
    }

    fn set(&self, cart_id: &CartId) {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "Failed to create cart ID directory");
            return;
        }

        match std::fs::write(&self.path, cart_id.as_str()) {
            Ok(()) => debug!(path = %self.path.display(), "Stored cart ID"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to store cart ID"),
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Cleared cart ID"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to clear cart ID"),
        }
    }
}

// =============================================================================
// DetachedCartIdStore
// =============================================================================

/// Store for environments without durable storage (e.g. server-side
/// rendering). Always empty; writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedCartIdStore;

impl CartIdStore for DetachedCartIdStore {
    fn get(&self) -> Option<CartId> {
        None
    }

    fn set(&self, _cart_id: &CartId) {}

    fn clear(&self) {}
}
