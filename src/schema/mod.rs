//! Schema model and validation for COCO annotation datasets.
//!
//! This module turns untrusted JSON into a strongly-typed [`Document`] that
//! respects every structural invariant, or a typed error describing the
//! first violation. All analysis rules operate on the validated model.
//!
//! # Design Principles
//!
//! 1. **Strict by default**: unknown fields are rejected everywhere except
//!    the free-form `info` block, so schema drift surfaces immediately.
//!
//! 2. **Invariants at construction**: field constraints (positive image
//!    dimensions, non-negative bbox extents, `iscrowd` in {0, 1}) are
//!    enforced while deserializing. A [`Document`] that exists is valid.
//!
//! 3. **Fail fast**: only the first violation is reported, with a path
//!    precise enough to act on.

mod model;
mod validate;

// Re-export core types for convenient access
pub use model::{Annotation, Category, Document, Image, Info, License, Segmentation};
pub use validate::{document_from_str, document_from_value, validate};
