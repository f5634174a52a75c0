use reelforge_project_model::composition::ProjectError;
use reelforge_project_model::overlay::OverlayId;

/// Errors returned by editor operations. A failed operation leaves the
/// editor state untouched.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("No overlay with id {0}")]
    OverlayNotFound(OverlayId),

    #[error("Overlay {id} is a {from} overlay and cannot become a {to} overlay")]
    TypeChange {
        id: OverlayId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Overlay id {id} cannot be changed to {attempted}")]
    IdChange { id: OverlayId, attempted: OverlayId },

    #[error("Overlay duration must be at least one frame")]
    ZeroDuration,

    #[error("Frame {frame} is outside overlay {id} ({from}..{end})")]
    InvalidSplit {
        id: OverlayId,
        frame: u32,
        from: u32,
        end: u32,
    },

    #[error(transparent)]
    Invalid(#[from] ProjectError),
}

pub type EditorResult<T> = Result<T, EditorError>;
