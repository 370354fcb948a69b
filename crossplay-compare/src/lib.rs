//! The comparison pipeline: per-user extraction, cross-user merge,
//! multiplayer classification, and filtering.
//!
//! Stages run in order over plain data; the only external state is the
//! read-only IGDB cache the classifier consults.

pub mod classify;
pub mod extract;
pub mod filter;
pub mod merge;

pub use classify::{Classification, ClassifyContext, classify_collection, classify_entry};
pub use extract::{ExtractOptions, UserLibrary, extract_user_library};
pub use filter::{FilterCriteria, FilterOutcome, OwnershipMode, filter_collection};
pub use merge::merge_libraries;
