use glam::Vec2;
use std::rc::Rc;

use super::element::Element;
use crate::types::ReferenceMarker;

/// Page-level host capabilities
pub trait Document {
    /// Resolve a selector to the first matching element
    fn query_selector(&self, selector: &str) -> Option<Rc<dyn Element>>;

    /// Inner size of the window in CSS pixels
    fn viewport_size(&self) -> Vec2;

    /// Attach or detach the scroll and resize listeners.
    /// While attached, the host forwards those events to `PositionTracker::notify`.
    fn set_scroll_listening(&self, listening: bool);

    /// Show the debug reference circle, or hide it with `None`
    fn set_reference_marker(&self, marker: Option<ReferenceMarker>);
}
