//! Buffer Module - Chained Storage for Encoded Infosets
//!
//! - `fragment`: generic append-only array of fixed-capacity segments
//! - `stream`: the four parallel streams of one encoded document and the
//!   read cursors of a decode pass
//!
//! ```text
//! structure           [0x10][0x22][0x50][len]...[0x00][0x00]
//! structure strings   "urn:x" "a" ...
//! content characters  h e l l o ...
//! content objects     Text("...") Opaque(..) ...
//! ```

pub mod fragment;
pub mod stream;

pub use fragment::{Cursor, FragmentedArray};
pub use stream::{BufferReader, ContentObject, Opaque, XmlStreamBuffer};
