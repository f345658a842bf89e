//! Bulk clean-up operations run instead of a layout.

use tracing::debug;

use crate::document::{BoardDocument, BoardError};

/// Tracks shorter than this (mm) are leftovers from routing onto the same pad.
pub const DEFAULT_SHORT_TRACK_LENGTH: f64 = 1e-4;

pub fn delete_all_tracks(doc: &mut dyn BoardDocument) -> Result<usize, BoardError> {
    let tracks = doc.list_tracks(None);
    for (id, track) in &tracks {
        debug!(?id, start = %track.start, end = %track.end, "deleting track");
        doc.delete_track(*id)?;
    }
    Ok(tracks.len())
}

pub fn delete_all_drawings(doc: &mut dyn BoardDocument) -> Result<usize, BoardError> {
    let drawings = doc.list_drawings(None);
    for id in &drawings {
        debug!(?id, "deleting drawing");
        doc.delete_drawing(*id)?;
    }
    Ok(drawings.len())
}

/// Delete every track strictly shorter than `min_length`.
pub fn delete_short_tracks(
    doc: &mut dyn BoardDocument,
    min_length: f64,
) -> Result<usize, BoardError> {
    let mut removed = 0;
    for (id, track) in doc.list_tracks(None) {
        if track.length() < min_length {
            debug!(?id, length = track.length(), "deleting short track");
            doc.delete_track(id)?;
            removed += 1;
        }
    }
    Ok(removed)
}
