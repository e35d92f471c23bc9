//! Multi-component frame scenarios
//!
//! Drives the whole pipeline against a small in-memory scene.

mod frame_scenarios;

use crate::foundation::collections::{HandleMap, ObjectHandle};
use crate::foundation::math::{Point2, Point3, Vec3, ViewTransform};
use crate::render::kinds::{DrawableDesc, DrawableKind, DrawableSource};
use crate::render::projection::{Projection, Projector};

/// Maps world x/y straight to screen pixels and world z to depth
pub(super) struct ScreenPlane;

impl Projector for ScreenPlane {
    fn project(&self, world: &Point3, _view: &ViewTransform) -> Projection {
        Projection {
            screen: Point2::new(world.x, world.y),
            depth: world.z,
        }
    }
}

/// Domain object as the host would store it
pub(super) struct SceneObject {
    pub kind: DrawableKind,
    pub desc: DrawableDesc,
    /// Frame in which the selection box may be drawn; 0 means not drawn
    pub selection_frame: u64,
}

/// Host scene implementing the description contract
#[derive(Default)]
pub(super) struct TestScene {
    pub objects: HandleMap<SceneObject>,
}

impl TestScene {
    pub fn add(&mut self, kind: DrawableKind, desc: DrawableDesc) -> ObjectHandle {
        self.objects.insert(SceneObject {
            kind,
            desc,
            selection_frame: 1,
        })
    }

    /// Object at screen position (`x`, `y`) and depth `z`
    pub fn add_at(&mut self, kind: DrawableKind, x: f32, y: f32, z: f32, radius: f32) -> ObjectHandle {
        self.add(kind, DrawableDesc::new(Vec3::new(x, y, z), radius))
    }

    pub fn handles(&self) -> Vec<(DrawableKind, ObjectHandle)> {
        self.objects.iter().map(|(h, o)| (o.kind, h)).collect()
    }
}

impl DrawableSource for TestScene {
    fn describe(&self, kind: DrawableKind, handle: ObjectHandle) -> Option<DrawableDesc> {
        self.objects
            .get(handle)
            .filter(|object| object.kind == kind)
            .map(|object| object.desc)
    }

    fn clear_selection_marker(&mut self, _kind: DrawableKind, handle: ObjectHandle) {
        if let Some(object) = self.objects.get_mut(handle) {
            object.selection_frame = 0;
        }
    }
}
