//! Scene dispatch demo
//!
//! Scatters a few thousand drawables over a battlefield, orbits a camera
//! around it and pushes every frame through the dispatcher, logging the
//! per-frame statistics. Run with `RUST_LOG=debug` to see them.
//!
//! An optional first argument names a `.toml` or `.ron` dispatch config.

use std::cell::Cell;
use std::collections::HashSet;

use rand::Rng;
use render_dispatch::prelude::*;
use thiserror::Error;

const OBJECT_COUNT: usize = 3000;
const FRAME_COUNT: u64 = 120;
const FIELD_HALF_SIZE: f32 = 2000.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// One battlefield object
struct Prop {
    kind: DrawableKind,
    desc: DrawableDesc,
    selection_visible: bool,
}

/// Host-side scene storage
struct Battlefield {
    props: HandleMap<Prop>,
    /// Objects whose model "failed to load"
    broken: HashSet<ObjectHandle>,
}

impl Battlefield {
    fn generate(rng: &mut impl Rng) -> Self {
        let mut props = HandleMap::with_key();
        let mut broken = HashSet::new();

        for i in 0..OBJECT_COUNT {
            let position = Vec3::new(
                rng.gen_range(-FIELD_HALF_SIZE..FIELD_HALF_SIZE),
                0.0,
                rng.gen_range(-FIELD_HALF_SIZE..FIELD_HALF_SIZE),
            );
            let texture_page = rng.gen_range(0..16);
            let (kind, desc) = match i % 8 {
                0 => (
                    DrawableKind::Unit,
                    DrawableDesc::new(position, 12.0).with_texture_page(texture_page),
                ),
                1 => (
                    DrawableKind::Structure,
                    DrawableDesc::new(position, 60.0)
                        .with_texture_page(texture_page)
                        .with_detail(KindDetail::Structure { tall: rng.gen_bool(0.3) }),
                ),
                2 => (DrawableKind::Feature, DrawableDesc::new(position, 20.0).with_texture_page(texture_page)),
                3 => (
                    DrawableKind::Particle,
                    DrawableDesc::new(position + Vec3::new(0.0, rng.gen_range(50.0..400.0), 0.0), 2.0),
                ),
                4 => (
                    DrawableKind::Effect,
                    DrawableDesc::new(position, 30.0).with_texture_page(texture_page).with_detail(KindDetail::Effect {
                        group: [EffectGroup::Explosion, EffectGroup::Smoke, EffectGroup::Blood, EffectGroup::Waypoint]
                            [rng.gen_range(0..4)],
                    }),
                ),
                5 => (
                    DrawableKind::Projectile,
                    DrawableDesc::new(position + Vec3::new(0.0, 20.0, 0.0), 3.0)
                        .with_texture_page(texture_page)
                        .with_detail(KindDetail::Projectile {
                            translucent: rng.gen_bool(0.5),
                            drawn_as_effect: rng.gen_bool(0.1),
                        }),
                ),
                6 => (DrawableKind::Shadow, DrawableDesc::new(position, 12.0)),
                _ => (DrawableKind::DeliveryPoint, DrawableDesc::new(position, 10.0).with_texture_page(texture_page)),
            };

            let handle = props.insert(Prop {
                kind,
                desc,
                selection_visible: true,
            });
            if rng.gen_ratio(1, 200) {
                broken.insert(handle);
            }
        }

        Self { props, broken }
    }

    fn submissions(&self) -> Vec<(DrawableKind, ObjectHandle)> {
        self.props.iter().map(|(handle, prop)| (prop.kind, handle)).collect()
    }
}

impl DrawableSource for Battlefield {
    fn describe(&self, kind: DrawableKind, handle: ObjectHandle) -> Option<DrawableDesc> {
        self.props
            .get(handle)
            .filter(|prop| prop.kind == kind)
            .map(|prop| prop.desc)
    }

    fn clear_selection_marker(&mut self, _kind: DrawableKind, handle: ObjectHandle) {
        if let Some(prop) = self.props.get_mut(handle) {
            prop.selection_visible = false;
        }
    }
}

fn load_config(focal_length_px: f32) -> Result<DispatchConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading dispatch config from {}", path);
            let config = DispatchConfig::load_from_file(&path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(DispatchConfig::default().with_perspective_scale(focal_length_px)),
    }
}

fn main() -> Result<(), DemoError> {
    env_logger::init();

    let viewport = Viewport::new(1280.0, 720.0);
    let projector = PerspectiveProjector::new(60.0, viewport);
    let config = load_config(projector.focal_length_px())?;
    let mut frames = FrameController::new(projector, config)?;

    let mut rng = rand::thread_rng();
    let mut battlefield = Battlefield::generate(&mut rng);
    let submissions = battlefield.submissions();
    log::info!("Generated {} drawables", submissions.len());

    let mut total_dispatched = 0;
    for frame in 0..FRAME_COUNT {
        for prop in battlefield.props.values_mut() {
            prop.selection_visible = true;
        }

        let angle = frame as f32 * 0.05;
        let eye = Point3::new(angle.cos() * 1500.0, 600.0, angle.sin() * 1500.0);
        let view = utils::look_at(&eye, &Point3::origin(), &Vec3::y());

        frames.begin_frame(FrameView::new(view, viewport));
        for &(kind, handle) in &submissions {
            if let Err(e) = frames.submit(&mut battlefield, kind, handle) {
                log::error!("Submission refused: {}", e);
            }
        }

        let draws_per_kind: [Cell<usize>; DrawableKind::COUNT] = Default::default();
        let broken = &battlefield.broken;
        let stats = {
            let mut table = DispatchTable::new();
            for kind in DrawableKind::ALL {
                let draws = &draws_per_kind[kind.index()];
                table.set(kind, move |handle, _view| {
                    if broken.contains(&handle) {
                        return Err(DrawError::MissingRenderData {
                            kind,
                            reason: "model failed to load".to_string(),
                        });
                    }
                    draws.set(draws.get() + 1);
                    Ok(())
                });
            }
            frames.render_frame(&mut table)
        };
        log::trace!(
            "Frame {} draws per kind: {:?}",
            stats.frame_number,
            DrawableKind::ALL.iter().zip(draws_per_kind.iter().map(Cell::get)).collect::<Vec<_>>()
        );

        let hidden_selections = battlefield.props.values().filter(|p| !p.selection_visible).count();
        log::debug!(
            "Frame {}: {} drawn, {} selection boxes suppressed",
            stats.frame_number,
            stats.dispatched - stats.failed,
            hidden_selections
        );
        total_dispatched += stats.dispatched;
    }

    log::info!(
        "Dispatched {} draws over {} frames ({:.1} per frame)",
        total_dispatched,
        FRAME_COUNT,
        total_dispatched as f32 / FRAME_COUNT as f32
    );
    Ok(())
}
