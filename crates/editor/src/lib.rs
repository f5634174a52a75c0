//! Reelforge Editor
//!
//! Single owner of a composition's overlays. Mutations (add, change,
//! delete, duplicate, split, bulk replace, aspect-ratio switch) each
//! install a fresh overlay array and synchronously recompute the
//! [`EditorSnapshot`] the UI layer reads.

pub mod cache;
pub mod error;
pub mod playback;
pub mod state;

pub use cache::DerivedCache;
pub use error::{EditorError, EditorResult};
pub use playback::Playback;
pub use state::{EditorSnapshot, EditorState};
