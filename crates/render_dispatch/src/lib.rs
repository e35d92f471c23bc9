//! # Render Dispatch
//!
//! Per-frame, depth-ordered render dispatch for scenes made of unrelated
//! drawable kinds: units, structures, features, particles, projectiles,
//! effects, markers and terrain/water tiles.
//!
//! ## Features
//!
//! - **Painter's ordering**: alpha-blended drawables strictly back to front
//! - **State grouping**: opaque drawables keyed by texture page
//! - **Perspective clip test**: anything that cannot reach the viewport is skipped
//! - **Allocation-free frames**: the submission arena is reused frame to frame
//! - **Fault tolerant**: a failing draw is logged and skipped, never fatal
//!
//! ## Quick Start
//!
//! ```rust
//! use render_dispatch::prelude::*;
//!
//! struct Scene {
//!     objects: HandleMap<DrawableDesc>,
//! }
//!
//! impl DrawableSource for Scene {
//!     fn describe(&self, _kind: DrawableKind, handle: ObjectHandle) -> Option<DrawableDesc> {
//!         self.objects.get(handle).copied()
//!     }
//!
//!     fn clear_selection_marker(&mut self, _kind: DrawableKind, _handle: ObjectHandle) {}
//! }
//!
//! let viewport = Viewport::new(800.0, 600.0);
//! let projector = PerspectiveProjector::new(60.0, viewport);
//! let config = DispatchConfig::default().with_perspective_scale(projector.focal_length_px());
//! let mut frames = FrameController::new(projector, config).unwrap();
//!
//! let mut scene = Scene { objects: HandleMap::with_key() };
//! let rock = scene.objects.insert(DrawableDesc::new(Vec3::zeros(), 2.0));
//!
//! let view = utils::look_at(&Point3::new(0.0, 20.0, 100.0), &Point3::origin(), &Vec3::y());
//! frames.begin_frame(FrameView::new(view, viewport));
//! frames.submit(&mut scene, DrawableKind::Feature, rock).unwrap();
//!
//! let mut drawn = 0;
//! let mut table = DispatchTable::new().with(DrawableKind::Feature, |_handle, _view| {
//!     drawn += 1;
//!     Ok(())
//! });
//! let stats = frames.render_frame(&mut table);
//! drop(table);
//! assert_eq!(stats.dispatched, 1);
//! assert_eq!(drawn, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core configuration
pub mod core;

pub mod foundation;
pub mod config;
pub mod render;

/// Common imports for dispatcher users
pub mod prelude {
    pub use crate::{
        core::{DispatchConfig, CapacityPolicy, OrderStrategy},
        config::{Config, ConfigError},
        foundation::{
            collections::{HandleMap, ObjectHandle},
            math::{utils, Point3, Vec3, ViewTransform},
        },
        render::{
            DispatchTable, DrawError, DrawableDesc, DrawableKind, DrawableSource,
            EffectGroup, FrameController, FrameStats, FrameView, KindDetail,
            PerspectiveProjector, Projector, SubmitOutcome, Viewport,
        },
    };
}
