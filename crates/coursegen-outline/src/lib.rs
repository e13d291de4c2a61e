//! Canonical course-outline model and normalizer.
//!
//! The generation service returns loosely shaped JSON documents: lists go
//! missing, numbers arrive negative, field names drift between producer
//! versions. This crate models that input explicitly as partial types
//! ([`raw`]) and projects it through a single translation boundary
//! ([`normalize::normalize`]) into the strict, fully-owned [`Outline`] that
//! the rest of the system consumes.

/// Single projection from raw documents to the canonical outline.
pub mod normalize;
/// Strict canonical outline types.
pub mod outline;
/// Optional-everywhere producer document types.
pub mod raw;

pub use normalize::normalize;
pub use outline::{Outline, Resource, ResourceKind, Section, Subsection};
pub use raw::{RawOutlineDoc, RawResource, RawSection, RawSubsection};
