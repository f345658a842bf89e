//! Board documents: the interface the layout works against, an in-memory board and
//! the KiCad file adapter.

mod document;
pub mod kicad;
pub mod maintenance;
mod memory;
pub mod sexpr;

pub use document::{BoardDocument, BoardError};
pub use kicad::{backup_path, KicadBoard};
pub use maintenance::{
    delete_all_drawings, delete_all_tracks, delete_short_tracks, DEFAULT_SHORT_TRACK_LENGTH,
};
pub use memory::{pad_position, MemoryBoard, PadDef, DEFAULT_LAYERS};
