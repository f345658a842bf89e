use thiserror::Error;

use pixelring_outline::OutlineError;
use pixelring_pcb::BoardError;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Outline(#[from] OutlineError),
    #[error("component {reference} has no pad \"{pad}\" to route to")]
    MissingPad { reference: String, pad: String },
    #[error("no component \"{prefix}1\" on the board")]
    EmptySupply { prefix: String },
}
