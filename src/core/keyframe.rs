use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::{Rc, Weak};

use super::tracker::ElementWatch;
use crate::config::KeyframeDefaults;
use crate::traits::Element;
use crate::types::{Indicator, IndicatorKind};

/// Per-frame values handed to a keyframe's update hook
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct KeyframeLiveValues {
    /// 0 = inactive, 1 = centered, anything between = blending with a neighbor
    pub activity: f32,
}

pub type KeyframeHook = Rc<dyn Fn(KeyframeLiveValues)>;

/// Anchor element of a keyframe, resolved at registration
#[derive(Clone)]
pub enum ElementTarget {
    Element(Rc<dyn Element>),
    Selector(String),
}

impl fmt::Debug for ElementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementTarget::Element(_) => f.write_str("Element(..)"),
            ElementTarget::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
        }
    }
}

/// Keyframe attributes as supplied by the caller; unset fields take the engine defaults
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeOptions {
    pub camera_pos: Option<Vec3>,
    pub camera_up: Option<Vec3>,
    pub world_target_pos: Option<Vec3>,
    pub world_target_radius: Option<f32>,
    pub ease_in: Option<bool>,
    pub ease_out: Option<bool>,
}

impl KeyframeOptions {
    pub fn resolve(&self, defaults: &KeyframeDefaults) -> KeyframePose {
        KeyframePose {
            camera_pos: self.camera_pos.unwrap_or(defaults.camera_pos),
            camera_up: self.camera_up.unwrap_or(defaults.camera_up),
            world_target_pos: self.world_target_pos.unwrap_or(defaults.world_target_pos),
            world_target_radius: self.world_target_radius.unwrap_or(defaults.world_target_radius),
            ease_in: self.ease_in.unwrap_or(defaults.ease_in),
            ease_out: self.ease_out.unwrap_or(defaults.ease_out),
        }
    }
}

/// Fully resolved camera constraint of a keyframe
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct KeyframePose {
    pub camera_pos: Vec3,
    pub camera_up: Vec3,
    pub world_target_pos: Vec3,
    /// Radius of the sphere that must exactly fill the anchor element on screen
    pub world_target_radius: f32,
    pub ease_in: bool,
    pub ease_out: bool,
}

/// Keyframe registration request
///
/// ```
/// use glam::Vec3;
/// use wirecam::core::KeyframeSpec;
///
/// let spec = KeyframeSpec::selector("#intro")
///     .camera_pos(Vec3::new(0.0, 2.0, 10.0))
///     .target(Vec3::ZERO, 1.5)
///     .ease(true, false);
/// ```
#[derive(Clone)]
pub struct KeyframeSpec {
    pub target: ElementTarget,
    pub options: KeyframeOptions,
    pub on_update: Option<KeyframeHook>,
}

impl KeyframeSpec {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::new(ElementTarget::Selector(selector.into()))
    }

    pub fn element(element: Rc<dyn Element>) -> Self {
        Self::new(ElementTarget::Element(element))
    }

    pub fn new(target: ElementTarget) -> Self {
        Self {
            target,
            options: KeyframeOptions::default(),
            on_update: None,
        }
    }

    pub fn with_options(mut self, options: KeyframeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn camera_pos(mut self, position: Vec3) -> Self {
        self.options.camera_pos = Some(position);
        self
    }

    pub fn camera_up(mut self, up: Vec3) -> Self {
        self.options.camera_up = Some(up);
        self
    }

    pub fn target(mut self, position: Vec3, radius: f32) -> Self {
        self.options.world_target_pos = Some(position);
        self.options.world_target_radius = Some(radius);
        self
    }

    pub fn ease(mut self, ease_in: bool, ease_out: bool) -> Self {
        self.options.ease_in = Some(ease_in);
        self.options.ease_out = Some(ease_out);
        self
    }

    pub fn on_update(mut self, hook: impl Fn(KeyframeLiveValues) + 'static) -> Self {
        self.on_update = Some(Rc::new(hook));
        self
    }
}

/// Camera pose derived for one keyframe in the current frame
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DerivedPose {
    pub camera_position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// World units per screen pixel at the target distance
    pub px_to_world: f32,
}

/// Whether an indicator or highlight is currently applied on the host
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct DebugVisibility {
    pub target_in_scene: bool,
    pub look_at_in_scene: bool,
    pub highlighted: bool,
}

/// Registered keyframe plus the values recomputed every frame
pub(crate) struct LiveKeyframe {
    pub element: Weak<dyn Element>,
    pub pose: KeyframePose,
    pub on_update: Option<KeyframeHook>,
    pub watch: ElementWatch,
    pub live: KeyframeLiveValues,
    /// Element center minus viewport center, in pixels
    pub offset: Vec2,
    pub ref_radius: f32,
    pub derived: DerivedPose,
    pub target_indicator: Indicator,
    pub look_at_indicator: Indicator,
    pub visibility: DebugVisibility,
}

impl LiveKeyframe {
    pub fn new(
        element: Weak<dyn Element>,
        pose: KeyframePose,
        on_update: Option<KeyframeHook>,
        watch: ElementWatch,
    ) -> Self {
        Self {
            element,
            on_update,
            watch,
            live: KeyframeLiveValues::default(),
            offset: Vec2::ZERO,
            ref_radius: 0.0,
            derived: DerivedPose {
                camera_position: pose.camera_pos,
                look_at: pose.world_target_pos,
                up: pose.camera_up,
                ..DerivedPose::default()
            },
            target_indicator: Indicator::new(
                IndicatorKind::Target,
                pose.world_target_pos,
                pose.world_target_radius,
            ),
            look_at_indicator: Indicator::new(IndicatorKind::LookAt, pose.world_target_pos, 1.0),
            visibility: DebugVisibility::default(),
            pose,
        }
    }

    /// Attached to the document and still alive
    pub fn is_connected(&self) -> bool {
        self.element
            .upgrade()
            .is_some_and(|element| element.is_connected())
    }

    pub fn element(&self) -> Option<Rc<dyn Element>> {
        self.element.upgrade()
    }
}
