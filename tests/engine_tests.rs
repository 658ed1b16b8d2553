use glam::{Vec2, Vec3};
use std::cell::Cell;
use std::rc::Rc;
use wirecam::core::{look_at_indicator_scale, KeyframeSpec};
use wirecam::math::ease;
use wirecam::sim::{ManualScheduler, RecordingScene, SimDocument, SimElement};
use wirecam::types::{IndicatorId, IndicatorKind, KeyframeId, Rect};
use wirecam::{HostContext, PerspectiveCamera, Wirecam, WirecamError, WirecamOptions};

type Engine = Wirecam<PerspectiveCamera, RecordingScene>;

const FRAME: f32 = 1.0 / 60.0;

struct Harness {
    document: Rc<SimDocument>,
    scheduler: Rc<ManualScheduler>,
    surface: Rc<SimElement>,
    engine: Rc<Engine>,
}

/// 1000x800 viewport whose center sits at (500, 400)
fn harness(options: WirecamOptions) -> Harness {
    let document = Rc::new(SimDocument::new(Vec2::new(1000.0, 800.0)));
    let scheduler = Rc::new(ManualScheduler::default());
    let surface = document.add_fixed_element("#canvas", Rect::new(0.0, 0.0, 1000.0, 800.0));
    let host = HostContext::new(document.clone(), scheduler.clone());
    let engine = Rc::new(Wirecam::new(
        host,
        surface.clone(),
        PerspectiveCamera::default(),
        RecordingScene::default(),
        options,
    ));
    Harness {
        document,
        scheduler,
        surface,
        engine,
    }
}

/// 100x100 anchor whose center is `offset_y` pixels below the viewport center
fn anchor(h: &Harness, selector: &str, offset_y: f32) -> Rc<SimElement> {
    h.document
        .add_element(selector, Rect::new(450.0, 350.0 + offset_y, 100.0, 100.0))
}

fn keyframe(selector: &str, camera_pos: Vec3) -> KeyframeSpec {
    KeyframeSpec::selector(selector)
        .camera_pos(camera_pos)
        .target(Vec3::ZERO, 1.0)
}

/// Run frames for `seconds` starting after `start`; returns the last timestamp
fn run(engine: &Engine, start: f32, seconds: f32) -> f32 {
    let mut now = start;
    while now < start + seconds {
        now += FRAME;
        engine.frame(now);
    }
    now
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_auto_start_runs_engine() {
        let h = harness(WirecamOptions::default());
        assert!(h.engine.is_running());
        assert!(h.scheduler.requests() > 0, "Starting should request a frame");
    }

    #[test]
    fn test_start_is_idempotent() {
        let h = harness(WirecamOptions::default());
        let requests = h.scheduler.requests();
        h.engine.start();
        h.engine.start();
        assert_eq!(h.scheduler.requests(), requests, "Second start must not request frames");
    }

    #[test]
    fn test_manual_start() {
        let h = harness(WirecamOptions {
            auto_start: false,
            ..WirecamOptions::default()
        });
        assert!(!h.engine.is_running());
        h.engine.start();
        assert!(h.engine.is_running());
    }

    #[test]
    fn test_running_frame_requests_next_frame() {
        let h = harness(WirecamOptions::default());
        let requests = h.scheduler.requests();
        h.engine.frame(FRAME);
        assert!(h.scheduler.requests() > requests);
    }

    #[test]
    fn test_stop_freezes_camera() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        h.engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let now = run(&h.engine, 0.0, 0.1);

        h.engine.stop();
        assert!(!h.engine.is_running());
        assert!(h.engine.active_pair().is_none());

        let camera = *h.engine.camera();
        let requests = h.scheduler.requests();
        h.engine
            .add_keyframe(keyframe("#a", Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        let requests_after_add = h.scheduler.requests();
        run(&h.engine, now, 0.2);

        assert_eq!(*h.engine.camera(), camera, "Camera must not move while stopped");
        assert!(requests_after_add >= requests);
        assert_eq!(
            h.scheduler.requests(),
            requests_after_add,
            "Stopped engine must not request frames"
        );
    }

    #[test]
    fn test_dispose_clears_everything() {
        let h = harness(WirecamOptions {
            debug: true,
            ..WirecamOptions::default()
        });
        anchor(&h, "#a", -100.0);
        anchor(&h, "#b", 50.0);
        h.engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        h.engine
            .add_keyframe(keyframe("#b", Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        h.engine.register_update_callback(|| Ok(()));
        run(&h.engine, 0.0, 0.1);
        assert!(h.document.reference_marker().is_some());

        h.engine.dispose();

        assert!(!h.engine.is_running());
        assert_eq!(h.engine.keyframe_count(), 0);
        assert_eq!(h.engine.callback_count(), 0);
        assert!(h.engine.scene().is_empty(), "Indicators must be removed");
        assert!(h.document.reference_marker().is_none());
        assert!(!h.document.element("#a").unwrap().is_highlighted());
        assert_eq!(h.engine.host().tracker.watch_count(), 1, "Only the viewport watch remains");
    }

    #[test]
    fn test_dropping_engine_stops_tracking() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        h.engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let tracker = h.engine.host().tracker.clone();
        assert_eq!(tracker.watch_count(), 2);

        drop(h.engine);
        assert_eq!(tracker.watch_count(), 0);
        assert!(!tracker.is_running());
        assert!(!h.document.is_listening());
    }

    #[test]
    fn test_engines_share_one_tracker() {
        let h = harness(WirecamOptions::default());
        let second = Wirecam::new(
            h.engine.host().clone(),
            h.surface.clone(),
            PerspectiveCamera::default(),
            RecordingScene::default(),
            WirecamOptions::default(),
        );
        assert_eq!(h.engine.host().tracker.watch_count(), 2);

        drop(second);
        assert_eq!(h.engine.host().tracker.watch_count(), 1);
        assert!(h.document.is_listening());
    }

    #[test]
    fn test_viewport_resize_updates_aspect() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        h.engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let now = run(&h.engine, 0.0, 0.1);
        assert!((h.engine.camera().aspect - 1.25).abs() < 1e-4);

        h.surface.set_rect(Rect::new(0.0, 0.0, 800.0, 400.0));
        h.engine.host().tracker.notify(now);
        run(&h.engine, now, 2.0);

        let roi = h.engine.viewport_roi();
        assert!((roi.width - 800.0).abs() < 0.01);
        assert!((h.engine.camera().aspect - 2.0).abs() < 1e-3);
    }
}

#[cfg(test)]
mod keyframe_tests {
    use super::*;

    #[test]
    fn test_unresolvable_selector_is_rejected() {
        let h = harness(WirecamOptions::default());
        let watches = h.engine.host().tracker.watch_count();

        let result = h.engine.add_keyframe(keyframe("#missing", Vec3::Z));

        assert_eq!(result, Err(WirecamError::ElementNotFound("#missing".to_string())));
        assert_eq!(h.engine.keyframe_count(), 0);
        assert_eq!(h.engine.host().tracker.watch_count(), watches);
    }

    #[test]
    fn test_add_remove_restores_tracker_state() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let watches = h.engine.host().tracker.watch_count();

        let id = h
            .engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        assert_eq!(h.engine.keyframe_count(), 1);
        assert_eq!(h.engine.host().tracker.watch_count(), watches + 1);

        h.engine.remove_keyframe(id).unwrap();
        assert_eq!(h.engine.keyframe_count(), 0);
        assert_eq!(h.engine.host().tracker.watch_count(), watches);
        assert!(h.document.is_listening());
    }

    #[test]
    fn test_double_remove_reports_missing() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let id = h
            .engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();

        assert!(h.engine.remove_keyframe(id).is_ok());
        assert_eq!(h.engine.remove_keyframe(id), Err(WirecamError::KeyframeNotFound(id)));
    }

    #[test]
    fn test_keyframe_ids_are_unique() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let first = h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        h.engine.remove_keyframe(first).unwrap();
        let second = h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_element_target_skips_lookup() {
        let h = harness(WirecamOptions::default());
        let element = anchor(&h, "#a", 0.0);
        let id = h
            .engine
            .add_keyframe(
                KeyframeSpec::element(element)
                    .camera_pos(Vec3::new(0.0, 0.0, 10.0))
                    .target(Vec3::ZERO, 1.0),
            )
            .unwrap();
        run(&h.engine, 0.0, 0.1);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!(pair.prev, id);
    }

    #[test]
    fn test_defaults_fill_unset_options() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let mut defaults = h.engine.keyframe_defaults();
        defaults.camera_pos = Vec3::new(0.0, 0.0, 20.0);
        defaults.world_target_pos = Vec3::ZERO;
        h.engine.set_keyframe_defaults(defaults);

        h.engine.add_keyframe(KeyframeSpec::selector("#a")).unwrap();
        run(&h.engine, 0.0, 0.1);

        assert_eq!(h.engine.camera().position, Vec3::new(0.0, 0.0, 20.0));
    }

    #[test]
    fn test_clear_removes_keyframes_and_callbacks() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        anchor(&h, "#b", 100.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        h.engine.register_update_callback(|| Ok(()));

        h.engine.clear();

        assert_eq!(h.engine.keyframe_count(), 0);
        assert_eq!(h.engine.callback_count(), 0);
        assert!(h.engine.is_running(), "Clearing does not stop the engine");
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[test]
    fn test_single_keyframe_drives_camera() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let id = h
            .engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        run(&h.engine, 0.0, 0.1);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!((pair.prev, pair.next, pair.blend), (id, id, 0.0));

        let camera = h.engine.camera();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        let forward = camera.forward();
        assert!(
            (forward - Vec3::NEG_Z).length() < 1e-3,
            "Centered anchor looks at target, got {}",
            forward
        );
        assert_eq!(h.engine.live_values(id).unwrap().activity, 1.0);
    }

    #[test]
    fn test_pair_blends_between_anchors() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", -100.0);
        anchor(&h, "#b", 50.0);
        let a = h
            .engine
            .add_keyframe(keyframe("#a", Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        let b = h
            .engine
            .add_keyframe(keyframe("#b", Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        run(&h.engine, 0.0, 0.1);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!((pair.prev, pair.next), (a, b));
        let expected = ease(100.0 / 150.0, true, true);
        assert!((pair.blend - expected).abs() < 1e-4, "Expected {}, got {}", expected, pair.blend);

        let position = h.engine.camera().position;
        let lerped = Vec3::new(0.0, 0.0, 10.0).lerp(Vec3::new(10.0, 0.0, 0.0), pair.blend);
        assert!((position - lerped).length() < 1e-3);

        let activity_a = h.engine.live_values(a).unwrap().activity;
        let activity_b = h.engine.live_values(b).unwrap().activity;
        assert!((activity_a + activity_b - 1.0).abs() < 1e-6);
        assert!((activity_b - pair.blend).abs() < 1e-6);
    }

    #[test]
    fn test_inactive_keyframes_have_zero_activity() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", -100.0);
        anchor(&h, "#b", 50.0);
        anchor(&h, "#c", 900.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        let c = h.engine.add_keyframe(keyframe("#c", Vec3::Y * 10.0)).unwrap();
        run(&h.engine, 0.0, 0.1);

        assert_eq!(h.engine.live_values(c).unwrap().activity, 0.0);
    }

    #[test]
    fn test_anchors_all_below_center_use_nearest() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 300.0);
        anchor(&h, "#b", 100.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        let b = h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        run(&h.engine, 0.0, 0.1);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!((pair.prev, pair.next), (b, b));
    }

    #[test]
    fn test_detached_anchor_is_excluded() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", -100.0);
        anchor(&h, "#b", 50.0);
        let a = h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        let b = h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        let now = run(&h.engine, 0.0, 0.1);
        assert_eq!(h.engine.active_pair().unwrap().next, b);

        h.document.remove_element("#b");
        h.engine.frame(now + FRAME);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!((pair.prev, pair.next), (a, a));
        assert!(!h.engine.keyframe_offset(b).unwrap().is_finite());
        assert_eq!(h.engine.live_values(b).unwrap().activity, 0.0);
    }

    #[test]
    fn test_no_attached_anchor_leaves_camera() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        let now = run(&h.engine, 0.0, 0.1);
        let camera = *h.engine.camera();

        h.document.remove_element("#a");
        run(&h.engine, now, 0.1);

        assert!(h.engine.active_pair().is_none());
        assert_eq!(*h.engine.camera(), camera);
    }

    #[test]
    fn test_scrolling_moves_pair_forward() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        anchor(&h, "#b", 600.0);
        anchor(&h, "#c", 1200.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        let b = h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        h.engine.add_keyframe(keyframe("#c", Vec3::Y * 10.0)).unwrap();

        let now = run(&h.engine, 0.0, 0.1);
        // Just past the second anchor
        h.document.set_scroll(590.0);
        h.engine.host().tracker.notify(now);
        run(&h.engine, now, 2.0);

        let pair = h.engine.active_pair().unwrap();
        assert_eq!(pair.prev, b, "Scrolled anchor should now be centered");
        assert!(pair.blend < 1e-3);
        assert!((h.engine.camera().position - Vec3::X * 10.0).length() < 1e-2);
    }
}

#[cfg(test)]
mod callback_tests {
    use super::*;

    #[test]
    fn test_failing_callback_does_not_block_others() {
        let h = harness(WirecamOptions::default());
        let calls = Rc::new(Cell::new(0));
        h.engine
            .register_update_callback(|| Err(anyhow::anyhow!("callback failed")));
        let counter = calls.clone();
        h.engine.register_update_callback(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        for frame in 1..=3 {
            h.engine.frame(frame as f32 * FRAME);
        }

        assert_eq!(calls.get(), 3);
        assert!(h.engine.is_running());
    }

    #[test]
    fn test_unregistered_callback_stops_running() {
        let h = harness(WirecamOptions::default());
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let id = h.engine.register_update_callback(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        h.engine.frame(FRAME);
        h.engine.unregister_update_callback(id).unwrap();
        h.engine.frame(2.0 * FRAME);

        assert_eq!(calls.get(), 1);
        assert!(h.engine.unregister_update_callback(id).is_err());
    }

    #[test]
    fn test_callback_can_stop_engine() {
        let h = harness(WirecamOptions::default());
        let weak = Rc::downgrade(&h.engine);
        h.engine.register_update_callback(move || {
            if let Some(engine) = weak.upgrade() {
                engine.stop();
            }
            Ok(())
        });

        let requests = h.scheduler.requests();
        h.engine.frame(FRAME);

        assert!(!h.engine.is_running());
        assert_eq!(h.scheduler.requests(), requests, "No frame requested after stop");
    }

    #[test]
    fn test_keyframe_hook_can_remove_its_keyframe() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let own_id: Rc<Cell<Option<KeyframeId>>> = Rc::new(Cell::new(None));
        let weak = Rc::downgrade(&h.engine);
        let hook_id = own_id.clone();

        let id = h
            .engine
            .add_keyframe(keyframe("#a", Vec3::Z * 10.0).on_update(move |_| {
                if let (Some(engine), Some(id)) = (weak.upgrade(), hook_id.get()) {
                    let _ = engine.remove_keyframe(id);
                }
            }))
            .unwrap();
        own_id.set(Some(id));

        h.engine.frame(FRAME);
        assert_eq!(h.engine.keyframe_count(), 0);

        h.engine.frame(2.0 * FRAME);
        assert!(h.engine.active_pair().is_none());
    }

    #[test]
    fn test_keyframe_hook_receives_activity() {
        let h = harness(WirecamOptions::default());
        anchor(&h, "#a", 0.0);
        let seen = Rc::new(Cell::new(-1.0f32));
        let sink = seen.clone();
        h.engine
            .add_keyframe(
                keyframe("#a", Vec3::Z * 10.0).on_update(move |values| sink.set(values.activity)),
            )
            .unwrap();

        h.engine.frame(FRAME);
        assert_eq!(seen.get(), 1.0);
    }
}

#[cfg(test)]
mod debug_overlay_tests {
    use super::*;

    fn indicator(keyframe: KeyframeId, kind: IndicatorKind) -> IndicatorId {
        IndicatorId { keyframe, kind }
    }

    #[test]
    fn test_overlay_follows_debug_flag() {
        let h = harness(WirecamOptions {
            debug: true,
            ..WirecamOptions::default()
        });
        let a_el = anchor(&h, "#a", -100.0);
        let b_el = anchor(&h, "#b", 50.0);
        let c_el = anchor(&h, "#c", 900.0);
        let a = h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        let b = h.engine.add_keyframe(keyframe("#b", Vec3::X * 10.0)).unwrap();
        let c = h.engine.add_keyframe(keyframe("#c", Vec3::Y * 10.0)).unwrap();
        let now = run(&h.engine, 0.0, 0.1);

        assert_eq!(h.engine.scene().len(), 4, "Two indicators per active keyframe");
        assert!(h.engine.scene().get(indicator(c, IndicatorKind::Target)).is_none());
        assert!(a_el.is_highlighted() && b_el.is_highlighted());
        assert!(!c_el.is_highlighted());

        let pair = h.engine.active_pair().unwrap();
        let target = *h.engine.scene().get(indicator(a, IndicatorKind::Target)).unwrap();
        assert_eq!(target.position, Vec3::ZERO);
        assert_eq!(target.scale, 1.0);
        assert!((target.opacity - (1.0 - pair.blend) * 0.3).abs() < 1e-5);

        for id in [a, b] {
            let activity = h.engine.live_values(id).unwrap().activity;
            let derived = h.engine.derived_pose(id).unwrap();
            let look_at = *h.engine.scene().get(indicator(id, IndicatorKind::LookAt)).unwrap();

            assert!((look_at.opacity - activity * 0.5).abs() < 1e-5);
            assert_eq!(look_at.position, derived.look_at);
            assert_eq!(look_at.scale, look_at_indicator_scale(&derived));
            assert!((look_at.scale - 25.0 * derived.px_to_world).abs() < 1e-6);
        }

        let marker = h.document.reference_marker().unwrap();
        assert!((marker.diameter - 100.0).abs() < 1e-3);
        assert!((marker.center.x - 500.0).abs() < 1e-3);

        h.engine.set_debug(false);
        h.engine.frame(now + FRAME);

        assert!(h.engine.scene().is_empty());
        assert!(!a_el.is_highlighted() && !b_el.is_highlighted());
        assert!(h.document.reference_marker().is_none());
    }

    #[test]
    fn test_overlay_does_not_readd_each_frame() {
        let h = harness(WirecamOptions {
            debug: true,
            ..WirecamOptions::default()
        });
        anchor(&h, "#a", 0.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();

        run(&h.engine, 0.0, 0.5);

        assert_eq!(h.engine.scene().adds, 2);
        assert_eq!(h.engine.scene().removes, 0);
    }

    #[test]
    fn test_removing_keyframe_removes_its_indicators() {
        let h = harness(WirecamOptions {
            debug: true,
            ..WirecamOptions::default()
        });
        let element = anchor(&h, "#a", 0.0);
        let id = h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        run(&h.engine, 0.0, 0.1);
        assert_eq!(h.engine.scene().len(), 2);

        h.engine.remove_keyframe(id).unwrap();

        assert!(h.engine.scene().is_empty());
        assert!(!element.is_highlighted());
    }

    #[test]
    fn test_dispose_hides_overlay() {
        let h = harness(WirecamOptions {
            debug: true,
            ..WirecamOptions::default()
        });
        anchor(&h, "#a", 0.0);
        h.engine.add_keyframe(keyframe("#a", Vec3::Z * 10.0)).unwrap();
        run(&h.engine, 0.0, 0.1);

        h.engine.dispose();
        assert!(h.engine.scene().is_empty());
        assert!(h.document.reference_marker().is_none());
    }
}
