//! End-to-end frames: submit, order, dispatch, reset

use std::cell::RefCell;
use std::collections::HashSet;

use super::{ScreenPlane, TestScene};
use crate::config::{Config, ConfigError, ConfigFormat};
use crate::core::{CapacityPolicy, DispatchConfig, OrderStrategy};
use crate::foundation::collections::ObjectHandle;
use crate::foundation::logging;
use crate::foundation::math::{utils, Point3, Vec3, ViewTransform};
use crate::render::depth_key::{FrameView, RejectReason};
use crate::render::dispatch::{DispatchTable, DrawError};
use crate::render::frame::{FrameController, SubmitOutcome};
use crate::render::kinds::{DrawableDesc, DrawableKind, EffectGroup, KindDetail};
use crate::render::projection::{PerspectiveProjector, Viewport};

type CallLog = RefCell<Vec<(DrawableKind, ObjectHandle)>>;

fn recording_table(log: &CallLog) -> DispatchTable<'_> {
    let mut table = DispatchTable::new();
    for kind in DrawableKind::ALL {
        table.set(kind, move |handle, _view| {
            log.borrow_mut().push((kind, handle));
            Ok(())
        });
    }
    table
}

fn screen_frame() -> FrameView {
    FrameView::new(ViewTransform::identity(), Viewport::new(800.0, 600.0))
}

fn controller(config: DispatchConfig) -> FrameController<ScreenPlane> {
    logging::init_for_tests();
    FrameController::new(ScreenPlane, config).unwrap()
}

/// Smoke effect whose key comes out as `key` under the default bias
fn smoke(scene: &mut TestScene, key: f32) -> ObjectHandle {
    let bias = DispatchConfig::default().billboard_depth_bias;
    scene.add(
        DrawableKind::Effect,
        DrawableDesc::new(Vec3::new(400.0, 300.0, key + bias), 4.0)
            .with_detail(KindDetail::Effect { group: EffectGroup::Smoke }),
    )
}

fn structure(scene: &mut TestScene, texture_page: u32) -> ObjectHandle {
    scene.add(
        DrawableKind::Structure,
        DrawableDesc::new(Vec3::new(400.0, 300.0, 200.0), 5.0)
            .with_texture_page(texture_page)
            .with_detail(KindDetail::Structure { tall: false }),
    )
}

fn submit_all(frames: &mut FrameController<ScreenPlane>, scene: &mut TestScene, order: &[ObjectHandle]) {
    for &handle in order {
        let kind = scene.objects[handle].kind;
        frames.submit(scene, kind, handle).unwrap();
    }
}

#[test]
fn test_begin_frame_twice_leaves_empty_buffer() {
    let mut scene = TestScene::default();
    let early = smoke(&mut scene, 40.0);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    frames.submit(&mut scene, DrawableKind::Effect, early).unwrap();
    frames.begin_frame(screen_frame());
    assert!(frames.pending().is_empty());
    frames.begin_frame(screen_frame());
    assert!(frames.pending().is_empty());

    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));
    assert_eq!(stats.dispatched, 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_dispatch_is_descending_and_repeatable() {
    let mut scene = TestScene::default();
    let handles: Vec<_> = [300.0, 100.0, 500.0, 200.0, 400.0]
        .iter()
        .map(|&z| scene.add_at(DrawableKind::Particle, 400.0, 300.0, z, 1.0))
        .collect();
    let mut frames = controller(DispatchConfig::default());

    let mut runs = Vec::new();
    for _ in 0..2 {
        frames.begin_frame(screen_frame());
        submit_all(&mut frames, &mut scene, &handles);
        let log = CallLog::default();
        frames.render_frame(&mut recording_table(&log));
        runs.push(log.into_inner());
    }

    let expected: Vec<_> = [2, 4, 0, 3, 1]
        .iter()
        .map(|&i| (DrawableKind::Particle, handles[i]))
        .collect();
    assert_eq!(runs[0], expected);
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn test_clip_keeps_partial_overlap_and_drops_outside() {
    // Depth 100 after bias and scale 100: apparent radius equals world radius
    let config = DispatchConfig::default().with_perspective_scale(100.0);
    let mut scene = TestScene::default();
    let left_out = scene.add_at(DrawableKind::Particle, -11.0, 300.0, 116.0, 10.0);
    let left_in = scene.add_at(DrawableKind::Particle, -9.0, 300.0, 116.0, 10.0);
    let below_out = scene.add_at(DrawableKind::Particle, 400.0, 611.0, 116.0, 10.0);
    let corner_in = scene.add_at(DrawableKind::Particle, 805.0, 605.0, 116.0, 10.0);
    let inside = scene.add_at(DrawableKind::Particle, 400.0, 300.0, 116.0, 10.0);
    let behind = scene.add_at(DrawableKind::Particle, 400.0, 300.0, -50.0, 10.0);

    let mut frames = controller(config);
    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &[left_out, left_in, below_out, corner_in, inside, behind]);
    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));

    let drawn: HashSet<_> = log.into_inner().into_iter().map(|(_, h)| h).collect();
    assert_eq!(drawn, HashSet::from([left_in, corner_in, inside]));
    assert_eq!(stats.rejected, 3);
}

#[test]
fn test_transparent_tier_is_back_to_front_and_opaque_entries_all_drawn() {
    let mut scene = TestScene::default();
    let opaque_a = structure(&mut scene, 7);
    let near = smoke(&mut scene, 10.0);
    let opaque_b = structure(&mut scene, 7);
    let far = smoke(&mut scene, 60.0);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &[opaque_a, near, opaque_b, far]);
    let log = CallLog::default();
    frames.render_frame(&mut recording_table(&log));
    let order: Vec<_> = log.into_inner().into_iter().map(|(_, h)| h).collect();

    let position = |h| order.iter().position(|&x| x == h).unwrap();
    assert!(position(far) < position(near));
    assert!(order.contains(&opaque_a));
    assert!(order.contains(&opaque_b));
    assert_eq!(order.len(), 4);
}

#[test]
fn test_every_accepted_submission_dispatched_exactly_once() {
    let mut scene = TestScene::default();
    let kinds = [DrawableKind::Particle, DrawableKind::Feature, DrawableKind::ProximityMarker, DrawableKind::DeliveryPoint];
    let handles: Vec<_> = (0..50)
        .map(|i| {
            let kind = kinds[i % kinds.len()];
            let z = 100.0 + (i * 37 % 50) as f32 * 10.0;
            scene.add_at(kind, 100.0 + i as f32 * 12.0, 300.0, z, 2.0)
        })
        .collect();
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &handles);
    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));

    let calls = log.into_inner();
    let unique: HashSet<_> = calls.iter().map(|(_, h)| *h).collect();
    assert_eq!(stats.accepted, 50);
    assert_eq!(calls.len(), 50);
    assert_eq!(unique.len(), 50);
}

#[test]
fn test_two_effects_and_a_structure() {
    for ordering in [OrderStrategy::FullSort, OrderStrategy::Buckets { count: 1000 }] {
        let mut scene = TestScene::default();
        let effect_50 = smoke(&mut scene, 50.0);
        let effect_10 = smoke(&mut scene, 10.0);
        let building = structure(&mut scene, 7);
        let mut frames = controller(DispatchConfig::default().with_ordering(ordering));

        frames.begin_frame(screen_frame());
        submit_all(&mut frames, &mut scene, &[effect_50, effect_10, building]);
        let log = CallLog::default();
        let stats = frames.render_frame(&mut recording_table(&log));

        // The structure's state-derived key (1000 - 7) * 32 sits at the far end
        // of the key space, so the opaque tier is drawn ahead of both effects.
        assert_eq!(
            log.into_inner(),
            vec![
                (DrawableKind::Structure, building),
                (DrawableKind::Effect, effect_50),
                (DrawableKind::Effect, effect_10),
            ],
            "ordering {:?}",
            ordering
        );
        assert_eq!(stats.dispatched, 3);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.farthest_key, Some(31776.0));
        assert_eq!(stats.nearest_key, Some(10.0));
    }
}

#[test]
fn test_offscreen_unit_not_drawn_and_selection_cleared() {
    let mut scene = TestScene::default();
    let unit = scene.add_at(DrawableKind::Unit, -200.0, 300.0, 200.0, 8.0);
    let tree = scene.add_at(DrawableKind::Feature, -200.0, 300.0, 200.0, 8.0);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    let outcome = frames.submit(&mut scene, DrawableKind::Unit, unit).unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected { reason: RejectReason::OffScreen, suppress_selection_box: true }
    );
    frames.submit(&mut scene, DrawableKind::Feature, tree).unwrap();

    let log = CallLog::default();
    frames.render_frame(&mut recording_table(&log));
    assert!(log.borrow().is_empty());
    assert_eq!(scene.objects[unit].selection_frame, 0);
    assert_eq!(scene.objects[tree].selection_frame, 1);
}

#[test]
fn test_visible_unit_keeps_selection_marker() {
    let mut scene = TestScene::default();
    let unit = scene.add_at(DrawableKind::Unit, 400.0, 300.0, 200.0, 8.0);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    frames.submit(&mut scene, DrawableKind::Unit, unit).unwrap();
    let log = CallLog::default();
    frames.render_frame(&mut recording_table(&log));
    assert_eq!(log.into_inner(), vec![(DrawableKind::Unit, unit)]);
    assert_eq!(scene.objects[unit].selection_frame, 1);
}

#[test]
fn test_offscreen_structure_selection_cleared() {
    let mut scene = TestScene::default();
    let depot = scene.add(
        DrawableKind::Structure,
        DrawableDesc::new(Vec3::new(400.0, -300.0, 200.0), 6.0)
            .with_texture_page(4)
            .with_detail(KindDetail::Structure { tall: false }),
    );
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    let outcome = frames.submit(&mut scene, DrawableKind::Structure, depot).unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected { reason: RejectReason::OffScreen, suppress_selection_box: true }
    );

    let log = CallLog::default();
    frames.render_frame(&mut recording_table(&log));
    assert!(log.borrow().is_empty());
    assert_eq!(scene.objects[depot].selection_frame, 0);
}

#[test]
fn test_fixed_capacity_drops_are_counted_per_frame() {
    let mut scene = TestScene::default();
    let handles: Vec<_> = (0..5)
        .map(|i| scene.add_at(DrawableKind::Particle, 400.0, 300.0, 100.0 + i as f32, 1.0))
        .collect();
    let config = DispatchConfig::default().with_capacity(CapacityPolicy::Fixed { limit: 3 });
    let mut frames = controller(config);

    frames.begin_frame(screen_frame());
    let outcomes: Vec<_> = handles
        .iter()
        .map(|&h| frames.submit(&mut scene, DrawableKind::Particle, h).unwrap())
        .collect();
    assert_eq!(outcomes[3], SubmitOutcome::Dropped);
    assert_eq!(frames.dropped(), 2);

    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.accepted, 5);
    assert_eq!(stats.dispatched, 3);
    assert_eq!(log.into_inner().len(), 3);

    frames.begin_frame(screen_frame());
    assert_eq!(frames.dropped(), 0);
}

#[test]
fn test_bad_entity_does_not_blank_frame() {
    let mut scene = TestScene::default();
    let broken = scene.add_at(DrawableKind::Feature, 400.0, 300.0, 300.0, 4.0);
    let fine: Vec<_> = (0..3)
        .map(|i| scene.add_at(DrawableKind::Feature, 400.0, 300.0, 100.0 + i as f32, 4.0))
        .collect();
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &[broken, fine[0], fine[1], fine[2]]);

    let mut drawn = Vec::new();
    let mut table = DispatchTable::new().with(DrawableKind::Feature, |handle, _| {
        if handle == broken {
            return Err(DrawError::MissingRenderData {
                kind: DrawableKind::Feature,
                reason: "model failed to load".to_string(),
            });
        }
        drawn.push(handle);
        Ok(())
    });
    let stats = frames.render_frame(&mut table);
    drop(table);

    // Features share one render state, so submission order decides
    assert_eq!(drawn, vec![fine[0], fine[1], fine[2]]);
    assert_eq!(stats.dispatched, 4);
    assert_eq!(stats.failed, 1);
}

#[test]
fn test_vanished_object_is_rejected() {
    let mut scene = TestScene::default();
    let unit = scene.add_at(DrawableKind::Unit, 400.0, 300.0, 200.0, 8.0);
    scene.objects.remove(unit);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    let outcome = frames.submit(&mut scene, DrawableKind::Unit, unit).unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected { reason: RejectReason::Undescribed, suppress_selection_box: true }
    );
}

#[test]
fn test_opaque_tier_groups_by_texture_page() {
    let mut scene = TestScene::default();
    let first = structure(&mut scene, 3);
    let other = structure(&mut scene, 9);
    let second = structure(&mut scene, 3);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &[first, other, second]);
    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));

    let order: Vec<_> = log.into_inner().into_iter().map(|(_, h)| h).collect();
    assert_eq!(order, vec![first, second, other]);
    assert_eq!(stats.state_changes, 1);
}

#[test]
fn test_generic_effects_count_no_state_changes() {
    let mut scene = TestScene::default();
    let blood: Vec<_> = [1, 2, 3]
        .iter()
        .map(|&page| {
            scene.add(
                DrawableKind::Effect,
                DrawableDesc::new(Vec3::new(400.0, 300.0, 100.0), 4.0)
                    .with_texture_page(page)
                    .with_detail(KindDetail::Effect { group: EffectGroup::Blood }),
            )
        })
        .collect();
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &blood);
    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));

    let order: Vec<_> = log.into_inner().into_iter().map(|(_, h)| h).collect();
    assert_eq!(order, blood);
    assert_eq!(stats.dispatched, 3);
    assert_eq!(stats.state_changes, 0);
}

#[test]
fn test_oversized_capacity_config_fails_construction() {
    let doc = "capacity = { Fixed = { limit = 9223372036854775807 } }";
    let config = DispatchConfig::from_str_with_format(doc, ConfigFormat::Toml).unwrap();
    let result = FrameController::new(ScreenPlane, config);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_tiles_interleave_with_projected_drawables() {
    let mut scene = TestScene::default();
    let water = scene.add(DrawableKind::WaterTile, DrawableDesc::tile(75.0));
    let terrain = scene.add(DrawableKind::TerrainTile, DrawableDesc::tile(500.0));
    let puff = smoke(&mut scene, 200.0);
    let mut frames = controller(DispatchConfig::default());

    frames.begin_frame(screen_frame());
    submit_all(&mut frames, &mut scene, &[water, terrain, puff]);
    let log = CallLog::default();
    frames.render_frame(&mut recording_table(&log));
    assert_eq!(
        log.into_inner(),
        vec![
            (DrawableKind::TerrainTile, terrain),
            (DrawableKind::Effect, puff),
            (DrawableKind::WaterTile, water),
        ]
    );
}

#[test]
fn test_perspective_camera_end_to_end() {
    let viewport = Viewport::new(800.0, 600.0);
    let projector = PerspectiveProjector::new(60.0, viewport);
    let config = DispatchConfig::default().with_perspective_scale(projector.focal_length_px());
    let mut frames = FrameController::new(projector, config).unwrap();

    let view = utils::look_at(&Point3::new(0.0, 50.0, 200.0), &Point3::origin(), &Vec3::new(0.0, 1.0, 0.0));
    let mut scene = TestScene::default();
    let smoke_desc = |z: f32| {
        DrawableDesc::new(Vec3::new(0.0, 0.0, z), 5.0)
            .with_detail(KindDetail::Effect { group: EffectGroup::Smoke })
    };
    let near = scene.add(DrawableKind::Effect, smoke_desc(0.0));
    let far = scene.add(DrawableKind::Effect, smoke_desc(-300.0));
    let behind = scene.add(DrawableKind::Effect, smoke_desc(400.0));
    let wide = scene.add(DrawableKind::Effect, DrawableDesc::new(Vec3::new(5000.0, 0.0, 0.0), 5.0)
        .with_detail(KindDetail::Effect { group: EffectGroup::Smoke }));

    frames.begin_frame(FrameView::new(view, viewport));
    for (kind, handle) in scene.handles() {
        frames.submit(&mut scene, kind, handle).unwrap();
    }
    let log = CallLog::default();
    let stats = frames.render_frame(&mut recording_table(&log));

    let order: Vec<_> = log.into_inner().into_iter().map(|(_, h)| h).collect();
    assert_eq!(order, vec![far, near]);
    assert_eq!(stats.rejected, 2);
    assert!(!order.contains(&behind));
    assert!(!order.contains(&wide));
}
