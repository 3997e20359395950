//! Library item update engine.
//!
//! [`Coordinator`] is the entry point: it authorizes the actor, purges derived
//! cover renders when a cover is removed, materializes placeholder author and
//! series references into durable entities, merges the payload and persists the
//! item, then publishes change [`Notification`]s. The read side serves items
//! (optionally expanded) and their covers through the render cache.
//!
//! # Example
//!
//! ```no_run
//! use folio_library::{Actor, Coordinator, LibraryAccess};
//! use folio_model::MediaPatch;
//!
//! # async fn example(coordinator: &Coordinator) -> folio_library::error::Result<()> {
//! let actor = Actor::new("usr_1", true, LibraryAccess::All);
//! let item = coordinator.load_for(&actor, "it1").await?;
//! let patch: MediaPatch = serde_json::from_str(r#"{"coverPath":null}"#).unwrap();
//! let updated = coordinator.update_media(&actor, &item, patch).await?;
//! assert!(updated.media.cover_path.is_none());
//! # Ok(())
//! # }
//! ```

mod coordinator;
pub mod cover;
pub mod error;
pub mod guard;
mod invalidate;
pub mod notify;
pub mod resolve;

pub use crate::coordinator::{Coordinator, ItemView};
pub use crate::cover::{CacheHandle, Cover, CoverCache, CoverCacheService, RenderCache};
pub use crate::guard::{Actor, LibraryAccess, Operation, authorize};
pub use crate::invalidate::CacheInvalidator;
pub use crate::notify::{BroadcastNotifier, Notification, Notifier, NotifierHandle};
pub use crate::resolve::{ReferenceResolver, Resolution};
pub use folio_model::is_placeholder;
