//! Drawable kinds and the description contract hosts implement
//!
//! The set of kinds is closed: each one has a depth-key rule in
//! [`crate::render::depth_key`] and a slot in the dispatch table.

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec3;

/// Every category of world entity the dispatcher can order and draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawableKind {
    /// Mobile unit
    Unit,
    /// Blob shadow drawn under a unit
    Shadow,
    /// Building or defence
    Structure,
    /// Decorative or neutral map feature (trees, wrecks, boulders)
    Feature,
    /// Atmospheric billboard particle (rain, snow)
    Particle,
    /// Weapon round in flight
    Projectile,
    /// Transient visual effect (explosion, smoke, dust, ...)
    Effect,
    /// Factory delivery / rally point marker
    DeliveryPoint,
    /// Proximity message blip
    ProximityMarker,
    /// Terrain tile
    TerrainTile,
    /// Water tile
    WaterTile,
}

impl DrawableKind {
    /// Number of kinds; sizes per-kind tables
    pub const COUNT: usize = 11;

    /// All kinds, in table order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Unit,
        Self::Shadow,
        Self::Structure,
        Self::Feature,
        Self::Particle,
        Self::Projectile,
        Self::Effect,
        Self::DeliveryPoint,
        Self::ProximityMarker,
        Self::TerrainTile,
        Self::WaterTile,
    ];

    /// Slot of this kind in per-kind tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether rejecting this kind must clear its selection-box marker
    pub const fn carries_selection_marker(self) -> bool {
        matches!(self, Self::Unit | Self::Structure)
    }

    /// Whether the kind's key comes from a precomputed tile draw depth
    pub const fn is_tile(self) -> bool {
        matches!(self, Self::TerrainTile | Self::WaterTile)
    }
}

/// Effect families, which differ in how they are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectGroup {
    /// Fireball and shockwave
    Explosion,
    /// Construction dust
    Construction,
    /// Smoke puffs and trails
    Smoke,
    /// Fireworks
    Firework,
    /// Waypoint indicator
    Waypoint,
    /// Debris thrown by explosions
    Graviton,
    /// Casualty splatter
    Blood,
    /// Structure damage sparks
    Structure,
    /// Destruction sequence
    Destruction,
}

/// How an entry's key is derived, and therefore what its order means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingTier {
    /// Alpha-blended: keyed by true projected depth, strictly back to front
    TrueDepth,
    /// Opaque and depth tested: keyed by render state to group state changes
    RenderState,
}

/// Kind-specific facts the depth-key rules need beyond position and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindDetail {
    /// Nothing beyond the common description
    Plain,
    /// Structure footprint
    Structure {
        /// Defences, walls and wall corners: tall silhouettes anchored higher
        tall: bool,
    },
    /// Effect family
    Effect {
        /// Family of the effect
        group: EffectGroup,
    },
    /// Projectile weapon traits
    Projectile {
        /// Alpha-blended in-flight graphic
        translucent: bool,
        /// Weapon is visualized by an effect instead (flame, command, EMP)
        drawn_as_effect: bool,
    },
    /// Terrain or water tile
    Tile {
        /// Draw-order depth computed by the terrain pass
        draw_depth: f32,
    },
}

/// Everything the depth-key rules read from one domain object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawableDesc {
    /// World-space position before kind-specific anchor offsets
    pub position: Vec3,
    /// World-space bounding radius; `None` when the object has no model
    pub radius: Option<f32>,
    /// Texture page of the object's model, its render-state identifier
    pub texture_page: u32,
    /// Kind-specific detail
    pub detail: KindDetail,
}

impl DrawableDesc {
    /// Describe an object with a model of the given radius
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius: Some(radius),
            texture_page: 0,
            detail: KindDetail::Plain,
        }
    }

    /// Describe a tile keyed by its precomputed draw depth
    pub fn tile(draw_depth: f32) -> Self {
        Self {
            position: Vec3::zeros(),
            radius: None,
            texture_page: 0,
            detail: KindDetail::Tile { draw_depth },
        }
    }

    /// Set the texture page
    pub fn with_texture_page(mut self, texture_page: u32) -> Self {
        self.texture_page = texture_page;
        self
    }

    /// Set the kind-specific detail
    pub fn with_detail(mut self, detail: KindDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Drop the model radius (object has nothing to clip against)
    pub fn without_radius(mut self) -> Self {
        self.radius = None;
        self
    }
}

/// Host-side access to the domain objects behind handles
///
/// Implemented by the surrounding engine. The dispatcher only reads through
/// [`DrawableSource::describe`]; the single write it ever performs is
/// [`DrawableSource::clear_selection_marker`] for rejected units and structures.
pub trait DrawableSource {
    /// Describe the object behind `handle`, or `None` if it no longer exists
    fn describe(&self, kind: DrawableKind, handle: ObjectHandle) -> Option<DrawableDesc>;

    /// Mark the object as not drawn this frame so no selection box is drawn for it
    fn clear_selection_marker(&mut self, kind: DrawableKind, handle: ObjectHandle);
}
