use crate::types::Viewport;

/// Errors raised while ticking or drawing a [`crate::scene::Scene`].
///
/// Every variant except [`SimError::Io`] is a viewport fault: an index that
/// was computed against a stale viewport size. The scene recovers from those
/// by resynchronising with the canvas; they never leave [`crate::scene::Scene::step`].
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("cell ({column}, {row}) is outside the {}x{} viewport", .viewport.width, .viewport.height)]
    OutOfBounds {
        column: usize,
        row: usize,
        viewport: Viewport,
    },

    #[error("column {column} is outside the {width}-column snow pile")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("viewport changed from {}x{} to {}x{}", .from.width, .from.height, .to.width, .to.height)]
    ViewportChanged { from: Viewport, to: Viewport },

    #[error("canvas i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Returns `true` for faults caused by an external viewport resize.
    pub fn is_viewport_fault(&self) -> bool {
        !matches!(self, SimError::Io(_))
    }
}

/// A configuration value outside the range the simulation supports.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: `{field}` {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
