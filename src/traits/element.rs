use crate::types::Rect;

/// Positionable UI element that a keyframe is anchored to
pub trait Element {
    /// Bounding box relative to the viewport
    fn bounding_rect(&self) -> Rect;

    /// Whether the element is currently attached to the document
    fn is_connected(&self) -> bool;

    /// Toggle the debug outline and background tint
    fn set_highlighted(&self, _highlighted: bool) {}
}
