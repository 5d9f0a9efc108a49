//! Structure Codec
//!
//! The tag vocabulary shared by producer and consumer:
//! - `tag`: raw tag words, flag accessors and the decoded [`Tag`] enum
//! - `state`: child-state table used by the element children loop

pub mod state;
pub mod tag;

pub use state::{child_state, ChildState};
pub use tag::{major_kind, ContentRepr, MajorKind, NameShape, Tag, ValueRepr};
