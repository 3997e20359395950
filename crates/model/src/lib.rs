//! Catalog entry types for folio.
//!
//! A [`LibraryItem`] exclusively owns its [`Media`], which in turn owns the
//! [`Metadata`] describing the work: title, credits and the ordered author and
//! series references.
//!
//! # References
//! Metadata embeds [`AuthorRef`] and [`SeriesRef`] records pointing at durable
//! [`Author`] and [`Series`] entities. Clients may also create those entities
//! inline by sending a placeholder id (see [`is_placeholder`]); such entries are
//! parsed into [`Reference::Pending`] at the deserialization boundary so that
//! nothing past the payload parser has to inspect id strings again.
//!
//! # Patches
//! Update payloads are partial: [`ItemPatch`], [`MediaPatch`] and
//! [`MetadataPatch`] only carry the fields the client sent. Applying a patch is
//! an explicit, pure merge returning a [`Merge`] which records exactly which
//! fields changed.

mod author;
mod expanded;
mod item;
mod media;
mod metadata;
mod patch;
mod reference;
mod series;
pub mod timestamp;

pub use crate::author::{Author, AuthorDraft, AuthorRef};
pub use crate::expanded::{ExpandedAuthor, ExpandedItem, ExpandedMedia, ExpandedMetadata, ExpandedSeries};
pub use crate::item::LibraryItem;
pub use crate::media::Media;
pub use crate::metadata::Metadata;
pub use crate::patch::{
    ItemPatch, MediaPatch, Merge, MetadataPatch, ResolvedItemPatch, ResolvedMediaPatch, ResolvedMetadataPatch,
};
pub use crate::reference::{EntityKind, PLACEHOLDER_PREFIX, Pending, Reference, Referent, is_placeholder};
pub use crate::series::{Series, SeriesDraft, SeriesRef};
