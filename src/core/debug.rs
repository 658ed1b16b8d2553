use super::pose::look_at_indicator_scale;
use super::registry::KeyframeRegistry;
use super::selection::ActivePair;
use crate::math::lerp;
use crate::traits::{Document, SceneGraph};
use crate::types::{Indicator, IndicatorId, IndicatorKind, KeyframeId, ReferenceMarker, Roi};

const TARGET_OPACITY: f32 = 0.3;
const LOOK_AT_OPACITY: f32 = 0.5;

/// Debug visuals, synchronized with the host by diffing against what is
/// currently shown. Re-evaluated every frame from the debug flag.
#[derive(Debug, Default)]
pub(crate) struct DebugOverlay {
    marker: Option<ReferenceMarker>,
}

impl DebugOverlay {
    pub fn sync(
        &mut self,
        enabled: bool,
        pair: Option<ActivePair>,
        registry: &mut KeyframeRegistry,
        viewport: &Roi,
        scene: &mut dyn SceneGraph,
        document: &dyn Document,
    ) {
        let is_active = |id: KeyframeId| pair.is_some_and(|p| p.prev == id || p.next == id);

        for (id, keyframe) in registry.iter_mut() {
            let activity = keyframe.live.activity;
            let target = &mut keyframe.target_indicator;
            target.position = keyframe.pose.world_target_pos;
            target.scale = keyframe.pose.world_target_radius;
            target.opacity = activity * TARGET_OPACITY;

            let look_at = &mut keyframe.look_at_indicator;
            look_at.position = keyframe.derived.look_at;
            look_at.scale = look_at_indicator_scale(&keyframe.derived);
            look_at.opacity = activity * LOOK_AT_OPACITY;

            let shown = enabled && is_active(id);
            sync_indicator(
                scene,
                IndicatorId {
                    keyframe: id,
                    kind: IndicatorKind::Target,
                },
                &keyframe.target_indicator,
                &mut keyframe.visibility.target_in_scene,
                shown,
            );
            sync_indicator(
                scene,
                IndicatorId {
                    keyframe: id,
                    kind: IndicatorKind::LookAt,
                },
                &keyframe.look_at_indicator,
                &mut keyframe.visibility.look_at_in_scene,
                shown,
            );

            if keyframe.visibility.highlighted != shown {
                if let Some(element) = keyframe.element() {
                    element.set_highlighted(shown);
                }
                keyframe.visibility.highlighted = shown;
            }
        }

        let marker = if enabled {
            pair.and_then(|pair| reference_marker(pair, registry, viewport))
        } else {
            None
        };
        if marker != self.marker {
            document.set_reference_marker(marker);
            self.marker = marker;
        }
    }

    /// Hide the reference marker
    pub fn hide(&mut self, document: &dyn Document) {
        if self.marker.take().is_some() {
            document.set_reference_marker(None);
        }
    }
}

fn sync_indicator(
    scene: &mut dyn SceneGraph,
    id: IndicatorId,
    indicator: &Indicator,
    in_scene: &mut bool,
    shown: bool,
) {
    match (*in_scene, shown) {
        (false, true) => scene.add_indicator(id, indicator),
        (true, true) => scene.update_indicator(id, indicator),
        (true, false) => scene.remove_indicator(id),
        (false, false) => {}
    }
    *in_scene = shown;
}

/// Circle at the blended screen position and size of the active pair's anchors
fn reference_marker(
    pair: ActivePair,
    registry: &KeyframeRegistry,
    viewport: &Roi,
) -> Option<ReferenceMarker> {
    let prev = registry.get(pair.prev)?;
    let next = registry.get(pair.next)?;
    let t = pair.blend;

    let center = viewport.center() + prev.offset.lerp(next.offset, t);
    let diameter = lerp(prev.ref_radius, next.ref_radius, t) * 2.0;

    (center.is_finite() && diameter.is_finite()).then_some(ReferenceMarker { center, diameter })
}
