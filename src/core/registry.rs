use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::keyframe::{ElementTarget, KeyframeSpec, LiveKeyframe};
use super::tracker::PositionTracker;
use crate::config::KeyframeDefaults;
use crate::error::{Result, WirecamError};
use crate::traits::{Document, SceneGraph};
use crate::types::{IndicatorId, IndicatorKind, KeyframeId};

/// Owner of all live keyframes, keyed by id in registration order
#[derive(Default)]
pub(crate) struct KeyframeRegistry {
    keyframes: BTreeMap<KeyframeId, LiveKeyframe>,
    next_id: u64,
}

impl KeyframeRegistry {
    /// Resolve the anchor, start tracking it, and register the keyframe
    pub fn add(
        &mut self,
        spec: KeyframeSpec,
        document: &dyn Document,
        tracker: &PositionTracker,
        defaults: &KeyframeDefaults,
    ) -> Result<KeyframeId> {
        let element = match spec.target {
            ElementTarget::Element(element) => element,
            ElementTarget::Selector(selector) => match document.query_selector(&selector) {
                Some(element) => element,
                None => {
                    error!("Wirecam: target element not found: {}", selector);
                    return Err(WirecamError::ElementNotFound(selector));
                }
            },
        };

        let id = KeyframeId(self.next_id);
        self.next_id += 1;

        let weak = Rc::downgrade(&element);
        let watch = tracker.watch(weak.clone());
        let pose = spec.options.resolve(defaults);
        self.keyframes
            .insert(id, LiveKeyframe::new(weak, pose, spec.on_update, watch));

        debug!("Wirecam: keyframe added {}", id);
        Ok(id)
    }

    /// Detach debug visuals, stop tracking, and drop the keyframe
    pub fn remove(&mut self, id: KeyframeId, scene: &mut dyn SceneGraph) -> Result<()> {
        let Some(keyframe) = self.keyframes.remove(&id) else {
            warn!("Wirecam: keyframe not found {}", id);
            return Err(WirecamError::KeyframeNotFound(id));
        };

        if keyframe.visibility.target_in_scene {
            scene.remove_indicator(IndicatorId {
                keyframe: id,
                kind: IndicatorKind::Target,
            });
        }
        if keyframe.visibility.look_at_in_scene {
            scene.remove_indicator(IndicatorId {
                keyframe: id,
                kind: IndicatorKind::LookAt,
            });
        }
        if keyframe.visibility.highlighted {
            if let Some(element) = keyframe.element() {
                element.set_highlighted(false);
            }
        }

        // Dropping the record releases its tracker watch
        drop(keyframe);
        debug!("Wirecam: keyframe removed {}", id);
        Ok(())
    }

    /// Snapshot of the registered ids, safe to iterate while removing
    pub fn ids(&self) -> Vec<KeyframeId> {
        self.keyframes.keys().copied().collect()
    }

    pub fn get(&self, id: KeyframeId) -> Option<&LiveKeyframe> {
        self.keyframes.get(&id)
    }

    pub fn get_mut(&mut self, id: KeyframeId) -> Option<&mut LiveKeyframe> {
        self.keyframes.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyframeId, &LiveKeyframe)> {
        self.keyframes.iter().map(|(id, keyframe)| (*id, keyframe))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (KeyframeId, &mut LiveKeyframe)> {
        self.keyframes.iter_mut().map(|(id, keyframe)| (*id, keyframe))
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }
}
