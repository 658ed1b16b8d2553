use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::lerp;

/// Axis-aligned screen rectangle in CSS pixels, relative to the viewport
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Rectangle shifted by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            left: self.left + delta.x,
            top: self.top + delta.y,
            ..*self
        }
    }

    /// Area of the part of this rectangle inside a viewport of `size` anchored at the origin
    pub fn visible_area(&self, size: Vec2) -> f32 {
        let visible_width = (self.right().min(size.x) - self.left.max(0.0)).max(0.0);
        let visible_height = (self.bottom().min(size.y) - self.top.max(0.0)).max(0.0);
        visible_width * visible_height
    }
}

/// Region of interest - an element's screen footprint and visibility
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Roi {
    /// Center x in viewport pixels
    pub x: f32,
    /// Center y in viewport pixels
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Share of the element's area inside the viewport (0-1)
    pub visible_ratio: f32,
    /// Share of the viewport covered by the visible part of the element (0-1)
    pub screen_ratio: f32,
}

impl Roi {
    /// Raw measurement of `rect` against a viewport of `viewport` size
    pub fn measure(rect: Rect, viewport: Vec2) -> Self {
        let screen_area = viewport.x * viewport.y;
        let element_area = rect.area();
        let visible_area = rect.visible_area(viewport);
        let center = rect.center();

        Self {
            x: center.x,
            y: center.y,
            width: rect.width,
            height: rect.height,
            visible_ratio: if element_area > 0.0 { visible_area / element_area } else { 0.0 },
            screen_ratio: if screen_area > 0.0 { visible_area / screen_area } else { 0.0 },
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Radius of the largest circle centered in the region
    pub fn inner_radius(&self) -> f32 {
        self.width.min(self.height) / 2.0
    }

    /// Component-wise interpolation towards `other`
    pub fn lerp(&self, other: &Roi, t: f32) -> Self {
        Self {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            width: lerp(self.width, other.width, t),
            height: lerp(self.height, other.height, t),
            visible_ratio: lerp(self.visible_ratio, other.visible_ratio, t),
            screen_ratio: lerp(self.screen_ratio, other.screen_ratio, t),
        }
    }
}

/// On-screen debug circle tracking the blended reference element
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub center: Vec2,
    pub diameter: f32,
}

/// Identifier of a registered keyframe; never reused within an engine
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct KeyframeId(pub u64);

impl fmt::Display for KeyframeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyframe-{}", self.0)
    }
}

/// Identifier of a registered update callback
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CallbackId(pub(crate) u64);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback-{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IndicatorKind {
    /// Sphere at the world target, sized to the target radius
    Target,
    /// Marker at the derived look-at point
    LookAt,
}

/// Scene handle of one debug indicator
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IndicatorId {
    pub keyframe: KeyframeId,
    pub kind: IndicatorKind,
}

/// Debug sphere placed in the 3D scene
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Indicator {
    pub position: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub color: [f32; 3],
}

impl Indicator {
    pub const TARGET_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
    pub const LOOK_AT_COLOR: [f32; 3] = [1.0, 0.0, 1.0];

    pub fn new(kind: IndicatorKind, position: Vec3, scale: f32) -> Self {
        let color = match kind {
            IndicatorKind::Target => Self::TARGET_COLOR,
            IndicatorKind::LookAt => Self::LOOK_AT_COLOR,
        };
        Self {
            position,
            scale,
            opacity: 0.0,
            color,
        }
    }
}
