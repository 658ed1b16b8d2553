use glam::Vec2;
use log::{debug, error};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::callbacks::CallbackBus;
use super::debug::DebugOverlay;
use super::keyframe::{DerivedPose, KeyframeHook, KeyframeLiveValues, KeyframeSpec};
use super::pose::{derive_pose, Framing};
use super::registry::KeyframeRegistry;
use super::selection::{select_active_pair, ActivePair, Candidate};
use super::tracker::{ElementWatch, PositionTracker};
use crate::config::{KeyframeDefaults, TrackerConfig, WirecamOptions};
use crate::error::Result;
use crate::math::{lerp, look_rotation};
use crate::traits::{CameraRig, Document, Element, FrameScheduler, SceneGraph};
use crate::types::{CallbackId, KeyframeId, Roi};

/// Host capabilities shared by every engine on one page, together with the
/// page's single position tracker
#[derive(Clone)]
pub struct HostContext {
    pub document: Rc<dyn Document>,
    pub scheduler: Rc<dyn FrameScheduler>,
    pub tracker: PositionTracker,
}

impl HostContext {
    pub fn new(document: Rc<dyn Document>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self::with_tracker_config(document, scheduler, TrackerConfig::default())
    }

    pub fn with_tracker_config(
        document: Rc<dyn Document>,
        scheduler: Rc<dyn FrameScheduler>,
        config: TrackerConfig,
    ) -> Self {
        let tracker = PositionTracker::new(Rc::clone(&document), Rc::clone(&scheduler), config);
        Self {
            document,
            scheduler,
            tracker,
        }
    }
}

/// Scroll-driven camera controller.
///
/// Every frame it finds the two keyframes whose anchor elements bracket the
/// viewport center, derives a camera pose for each from its framing
/// constraint, and writes the blend of both to the camera. All methods take
/// `&self`; keyframe hooks and update callbacks may call back into the
/// engine (e.g. through a `Weak` handle) since no internal borrow is held
/// while they run.
pub struct Wirecam<C: CameraRig, S: SceneGraph> {
    host: HostContext,
    state: RefCell<EngineState<C, S>>,
    callbacks: RefCell<CallbackBus>,
}

struct EngineState<C, S> {
    camera: C,
    scene: S,
    debug: bool,
    defaults: KeyframeDefaults,
    viewport_watch: ElementWatch,
    viewport: Roi,
    keyframes: KeyframeRegistry,
    pair: Option<ActivePair>,
    running: bool,
    overlay: DebugOverlay,
}

impl<C: CameraRig, S: SceneGraph> Wirecam<C, S> {
    /// Create an engine for the render `surface`, whose screen box defines the viewport
    pub fn new(
        host: HostContext,
        surface: Rc<dyn Element>,
        camera: C,
        scene: S,
        options: WirecamOptions,
    ) -> Self {
        let viewport_watch = host.tracker.watch(Rc::downgrade(&surface));
        let engine = Self {
            host,
            state: RefCell::new(EngineState {
                camera,
                scene,
                debug: options.debug,
                defaults: options.keyframe_defaults,
                viewport_watch,
                viewport: Roi::default(),
                keyframes: KeyframeRegistry::default(),
                pair: None,
                running: false,
                overlay: DebugOverlay::default(),
            }),
            callbacks: RefCell::new(CallbackBus::default()),
        };

        if options.auto_start {
            engine.start();
        }
        debug!("Wirecam: initialized");
        engine
    }

    /// Link an anchor element with a camera pose.
    /// Fails with `ElementNotFound` when a selector matches nothing.
    pub fn add_keyframe(&self, spec: KeyframeSpec) -> Result<KeyframeId> {
        let mut state = self.state.borrow_mut();
        let defaults = state.defaults;
        state
            .keyframes
            .add(spec, &*self.host.document, &self.host.tracker, &defaults)
    }

    /// Remove a keyframe; unknown ids are reported and change nothing
    pub fn remove_keyframe(&self, id: KeyframeId) -> Result<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.keyframes.remove(id, &mut state.scene)
    }

    /// Remove all keyframes and update callbacks
    pub fn clear(&self) {
        let ids = self.state.borrow().keyframes.ids();
        for id in ids {
            // Already gone if a previous removal dropped it
            let _ = self.remove_keyframe(id);
        }

        let callback_ids = self.callbacks.borrow().ids();
        for id in callback_ids {
            let _ = self.unregister_update_callback(id);
        }

        debug!("Wirecam: reset");
    }

    /// Stop, clear, and hide the debug marker
    pub fn dispose(&self) {
        self.stop();
        self.clear();
        self.state
            .borrow_mut()
            .overlay
            .hide(&*self.host.document);
        debug!("Wirecam: disposed");
    }

    pub fn start(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.running {
                return;
            }
            state.running = true;
        }
        self.host.scheduler.request_frame();
        debug!("Wirecam: started");
    }

    /// Takes effect at the next frame boundary
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        state.pair = None;
        debug!("Wirecam: stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Animation tick; `now` is the host's monotonic time in seconds.
    /// Does nothing while stopped, and requests the next frame while running.
    pub fn frame(&self, now: f32) {
        if !self.is_running() {
            return;
        }

        self.host.tracker.pump(now);
        self.update(now);

        if self.is_running() {
            self.host.scheduler.request_frame();
        }
    }

    /// Re-sample the render surface's screen box
    pub fn update_viewport(&self, now: f32) -> Roi {
        let mut state = self.state.borrow_mut();
        state.viewport = state.viewport_watch.sample(now);
        state.viewport
    }

    fn update(&self, now: f32) {
        self.update_viewport(now);

        let hooks = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            state.sample_keyframe_refs(now);
            state.pair = state.select_pair();
            state.derive_active_poses();
            state.apply_blend();
            state.update_activity()
        };
        for (hook, values) in hooks {
            hook(values);
        }

        {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            state.overlay.sync(
                state.debug,
                state.pair,
                &mut state.keyframes,
                &state.viewport,
                &mut state.scene,
                &*self.host.document,
            );
        }

        let callbacks = self.callbacks.borrow().snapshot();
        for (id, callback) in callbacks {
            if let Err(err) = callback() {
                error!("Wirecam: error in update callback {}: {:#}", id, err);
            }
        }
    }

    /// Register a hook that runs every frame after the camera is committed
    pub fn register_update_callback(
        &self,
        callback: impl Fn() -> anyhow::Result<()> + 'static,
    ) -> CallbackId {
        self.callbacks.borrow_mut().register(Rc::new(callback))
    }

    pub fn unregister_update_callback(&self, id: CallbackId) -> Result<()> {
        self.callbacks.borrow_mut().unregister(id)
    }

    pub fn set_debug(&self, debug: bool) {
        self.state.borrow_mut().debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.state.borrow().debug
    }

    /// Defaults applied to keyframes registered from now on
    pub fn set_keyframe_defaults(&self, defaults: KeyframeDefaults) {
        self.state.borrow_mut().defaults = defaults;
    }

    pub fn keyframe_defaults(&self) -> KeyframeDefaults {
        self.state.borrow().defaults
    }

    pub fn keyframe_count(&self) -> usize {
        self.state.borrow().keyframes.len()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn active_pair(&self) -> Option<ActivePair> {
        self.state.borrow().pair
    }

    pub fn live_values(&self, id: KeyframeId) -> Option<KeyframeLiveValues> {
        self.state.borrow().keyframes.get(id).map(|keyframe| keyframe.live)
    }

    /// Pose derived for a keyframe the last time it was active
    pub fn derived_pose(&self, id: KeyframeId) -> Option<DerivedPose> {
        self.state.borrow().keyframes.get(id).map(|keyframe| keyframe.derived)
    }

    /// Anchor offset from the viewport center; infinite while excluded from selection
    pub fn keyframe_offset(&self, id: KeyframeId) -> Option<Vec2> {
        self.state.borrow().keyframes.get(id).map(|keyframe| keyframe.offset)
    }

    pub fn viewport_roi(&self) -> Roi {
        self.state.borrow().viewport
    }

    pub fn camera(&self) -> Ref<'_, C> {
        Ref::map(self.state.borrow(), |state| &state.camera)
    }

    pub fn scene(&self) -> Ref<'_, S> {
        Ref::map(self.state.borrow(), |state| &state.scene)
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }
}

impl<C: CameraRig, S: SceneGraph> EngineState<C, S> {
    fn sample_keyframe_refs(&mut self, now: f32) {
        let viewport_center = self.viewport.center();
        for (_, keyframe) in self.keyframes.iter_mut() {
            let roi = keyframe.watch.sample(now);
            keyframe.ref_radius = roi.inner_radius();
            keyframe.offset = if keyframe.is_connected() && keyframe.ref_radius > 0.0 {
                roi.center() - viewport_center
            } else {
                Vec2::splat(f32::INFINITY)
            };
        }
    }

    fn select_pair(&self) -> Option<ActivePair> {
        let candidates: Vec<Candidate> = self
            .keyframes
            .iter()
            .map(|(id, keyframe)| Candidate {
                id,
                offset_y: keyframe.offset.y,
                ease_in: keyframe.pose.ease_in,
                ease_out: keyframe.pose.ease_out,
            })
            .collect();
        select_active_pair(&candidates)
    }

    fn derive_active_poses(&mut self) {
        let Some(pair) = self.pair else {
            return;
        };
        let viewport_height = self.viewport.height;

        let ids = if pair.prev == pair.next {
            vec![pair.prev]
        } else {
            vec![pair.prev, pair.next]
        };
        for id in ids {
            if let Some(keyframe) = self.keyframes.get_mut(id) {
                keyframe.derived = derive_pose(
                    &keyframe.pose,
                    Framing {
                        offset_x: keyframe.offset.x,
                        ref_radius: keyframe.ref_radius,
                        viewport_height,
                    },
                );
            }
        }
    }

    fn apply_blend(&mut self) {
        let Some(pair) = self.pair else {
            return;
        };
        let (Some(prev), Some(next)) = (
            self.keyframes.get(pair.prev).map(|keyframe| keyframe.derived),
            self.keyframes.get(pair.next).map(|keyframe| keyframe.derived),
        ) else {
            return;
        };
        let t = pair.blend;

        let position = prev.camera_position.lerp(next.camera_position, t);
        let from = look_rotation(prev.camera_position, prev.look_at, prev.up);
        let to = look_rotation(next.camera_position, next.look_at, next.up);
        let orientation = from.slerp(to, t);

        self.camera.set_position(position);
        self.camera.set_orientation(orientation);
        self.camera.set_fov(lerp(prev.fov, next.fov, t));
        if self.viewport.height > 0.0 {
            self.camera.set_aspect(self.viewport.width / self.viewport.height);
        }
        self.camera.update_projection();
    }

    /// Set every keyframe's activity and collect the hooks to notify
    fn update_activity(&mut self) -> Vec<(KeyframeHook, KeyframeLiveValues)> {
        let pair = self.pair;
        let mut hooks = Vec::new();

        for (id, keyframe) in self.keyframes.iter_mut() {
            keyframe.live.activity = match pair {
                Some(pair) if pair.prev == id => 1.0 - pair.blend,
                Some(pair) if pair.next == id => pair.blend,
                _ => 0.0,
            };
            if let Some(hook) = &keyframe.on_update {
                hooks.push((Rc::clone(hook), keyframe.live));
            }
        }

        hooks
    }
}
