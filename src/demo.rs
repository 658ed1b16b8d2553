//! Builds a scrollable page from a scene description and drives
//! the engine over it without a browser
//!
//! # Examples
//!
//! ```
//! use wirecam::demo::{SceneConfig, Simulation};
//!
//! let mut sim = Simulation::build(&SceneConfig::demo()).unwrap();
//! sim.scroll_to(300.0);
//! sim.advance(10, 1.0 / 60.0);
//! let report = sim.report(0);
//! assert!(report.fov > 0.0);
//! ```

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::camera::PerspectiveCamera;
use crate::config::{TrackerConfig, WirecamOptions};
use crate::core::{ActivePair, HostContext, KeyframeOptions, KeyframeSpec, Wirecam};
use crate::sim::{ManualScheduler, RecordingScene, SimDocument};
use crate::types::{KeyframeId, Rect, ReferenceMarker};

const SURFACE_SELECTOR: &str = "#wirecam-surface";

/// One anchor element on the page, optionally linked to a keyframe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub selector: String,
    /// Rectangle in page coordinates
    pub rect: Rect,
    #[serde(default)]
    pub keyframe: Option<KeyframeOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Window size in pixels
    pub viewport: Vec2,
    pub page_height: f32,
    #[serde(default)]
    pub options: WirecamOptions,
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub anchors: Vec<AnchorConfig>,
}

impl SceneConfig {
    /// Four full-height sections, each with a square anchor the camera orbits around
    pub fn demo() -> Self {
        let viewport = Vec2::new(1280.0, 720.0);
        let section = viewport.y;
        let size = 320.0;

        let poses = [
            (Vec3::new(0.0, 2.0, 12.0), 0.0),
            (Vec3::new(8.0, 3.0, 6.0), 220.0),
            (Vec3::new(-6.0, 6.0, -6.0), -220.0),
            (Vec3::new(0.0, 14.0, 0.5), 0.0),
        ];

        let anchors = poses
            .iter()
            .enumerate()
            .map(|(i, &(camera_pos, shift_x))| AnchorConfig {
                selector: format!("#section-{}", i + 1),
                rect: Rect::new(
                    (viewport.x - size) * 0.5 + shift_x,
                    section * i as f32 + (section - size) * 0.5,
                    size,
                    size,
                ),
                keyframe: Some(KeyframeOptions {
                    camera_pos: Some(camera_pos),
                    world_target_pos: Some(Vec3::ZERO),
                    world_target_radius: Some(1.5 + i as f32 * 0.5),
                    ..KeyframeOptions::default()
                }),
            })
            .collect();

        Self {
            viewport,
            page_height: section * poses.len() as f32,
            options: WirecamOptions::default(),
            tracker: TrackerConfig::default(),
            anchors,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene description")
    }

    /// Largest scroll offset of the page
    pub fn max_scroll(&self) -> f32 {
        (self.page_height - self.viewport.y).max(0.0)
    }
}

/// Camera state after one simulated step
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub step: u32,
    pub time: f32,
    pub scroll: f32,
    pub position: Vec3,
    pub forward: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub pair: Option<ActivePair>,
    pub marker: Option<ReferenceMarker>,
    pub indicators: usize,
}

pub struct Simulation {
    pub document: Rc<SimDocument>,
    pub scheduler: Rc<ManualScheduler>,
    pub engine: Wirecam<PerspectiveCamera, RecordingScene>,
    pub keyframes: Vec<KeyframeId>,
    time: f32,
}

impl Simulation {
    pub fn build(config: &SceneConfig) -> Result<Self> {
        let document = Rc::new(SimDocument::new(config.viewport));
        let scheduler = Rc::new(ManualScheduler::default());
        let host = HostContext::with_tracker_config(
            document.clone(),
            scheduler.clone(),
            config.tracker,
        );

        let surface = document.add_fixed_element(
            SURFACE_SELECTOR,
            Rect::new(0.0, 0.0, config.viewport.x, config.viewport.y),
        );
        let engine = Wirecam::new(
            host,
            surface,
            PerspectiveCamera::default(),
            RecordingScene::default(),
            config.options,
        );

        for anchor in &config.anchors {
            document.add_element(&anchor.selector, anchor.rect);
        }

        let keyframes = config
            .anchors
            .iter()
            .filter_map(|anchor| anchor.keyframe.map(|options| (anchor, options)))
            .map(|(anchor, options)| {
                engine
                    .add_keyframe(KeyframeSpec::selector(&anchor.selector).with_options(options))
                    .with_context(|| format!("failed to add keyframe for {}", anchor.selector))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            document,
            scheduler,
            engine,
            keyframes,
            time: 0.0,
        })
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Scroll the page, forwarding the event the way a browser host would
    pub fn scroll_to(&mut self, scroll: f32) {
        self.document.set_scroll(scroll);
        if self.document.is_listening() {
            self.engine.host().tracker.notify(self.time);
        }
    }

    /// Run `frames` animation ticks spaced `dt` seconds apart
    pub fn advance(&mut self, frames: u32, dt: f32) {
        for _ in 0..frames {
            self.time += dt;
            if self.engine.is_running() {
                self.engine.frame(self.time);
            } else {
                self.engine.host().tracker.pump(self.time);
            }
        }
    }

    pub fn report(&self, step: u32) -> FrameReport {
        let camera = self.engine.camera();
        FrameReport {
            step,
            time: self.time,
            scroll: self.document.scroll(),
            position: camera.position,
            forward: camera.forward(),
            fov: camera.fov,
            aspect: camera.aspect,
            pair: self.engine.active_pair(),
            marker: self.document.reference_marker(),
            indicators: self.engine.scene().len(),
        }
    }
}
