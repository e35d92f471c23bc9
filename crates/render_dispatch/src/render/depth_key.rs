//! # Depth-Key Calculator
//!
//! Turns one domain object into either a sortable [`DepthKey`] or a rejection.
//!
//! ## Two tiers
//!
//! Alpha-blended kinds (explosions, smoke, construction dust, shadows, markers,
//! tiles, translucent projectiles) are keyed by their true projected depth so
//! the painter's algorithm composites them correctly. Opaque, depth-tested
//! kinds are keyed by render state instead, which groups texture switches; the
//! depth buffer resolves their per-pixel visibility. Both keys live in one key
//! space so a single descending sort orders the whole frame.
//!
//! ## Clip test
//!
//! The anchor is projected, its depth biased per kind, and anything at or
//! behind the camera is rejected. The bounding radius is then scaled by
//! `perspective_scale / depth` and the resulting square tested against the
//! viewport. Rejecting a unit or structure asks the caller to clear its
//! selection-box marker; the verdict carries that request explicitly.

use std::cmp::Ordering;

use crate::core::DispatchConfig;
use crate::foundation::math::{Point3, Vec3, ViewTransform};
use crate::render::kinds::{DrawableDesc, DrawableKind, EffectGroup, KindDetail, OrderingTier};
use crate::render::projection::{Projector, Viewport};

/// Sortable depth key; larger keys are further back and drawn first
///
/// Ordered with `f32::total_cmp`, so every key, including NaN, has a place in
/// the order.
#[derive(Debug, Clone, Copy)]
pub struct DepthKey(f32);

impl DepthKey {
    /// Wrap a raw key value
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Raw key value
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl PartialEq for DepthKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DepthKey {}

impl PartialOrd for DepthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DepthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The camera state a frame's keys are computed against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    /// World-to-view transform
    pub view: ViewTransform,
    /// Clip rectangle
    pub viewport: Viewport,
}

impl FrameView {
    /// Bundle a view transform with its viewport
    pub fn new(view: ViewTransform, viewport: Viewport) -> Self {
        Self { view, viewport }
    }
}

/// Why an object was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Depth at or behind the camera after biasing
    BehindCamera,
    /// Apparent bounding square entirely outside the viewport
    OffScreen,
    /// Weapon visualized by an effect; the projectile itself is never drawn
    DrawnAsEffect,
    /// Host could not describe the object, or a tile had no finite draw depth
    Undescribed,
}

/// Outcome of keying one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyVerdict {
    /// Object is potentially visible and should be queued
    Accepted {
        /// Sort key
        key: DepthKey,
        /// Tier the key was derived for
        tier: OrderingTier,
        /// Render state the object binds when drawn
        state: u32,
    },
    /// Object cannot be on screen this frame
    Rejected {
        /// Cause of the rejection
        reason: RejectReason,
        /// The caller must clear the object's selection-box marker
        suppress_selection_box: bool,
    },
}

impl KeyVerdict {
    fn reject(kind: DrawableKind, reason: RejectReason) -> Self {
        Self::Rejected {
            reason,
            suppress_selection_box: kind.carries_selection_marker(),
        }
    }

    /// Whether the object was accepted
    pub const fn accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Whether the caller must clear the object's selection-box marker
    pub const fn suppress_selection_box(&self) -> bool {
        matches!(self, Self::Rejected { suppress_selection_box: true, .. })
    }

    /// Key of an accepted object
    pub const fn key(&self) -> Option<DepthKey> {
        match self {
            Self::Accepted { key, .. } => Some(*key),
            Self::Rejected { .. } => None,
        }
    }
}

/// Per-kind depth and clip rules
#[derive(Debug, Clone)]
pub struct DepthKeyCalculator {
    config: DispatchConfig,
}

impl DepthKeyCalculator {
    /// Create a calculator using the given tuning constants
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// Tuning constants in use
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Ordering tier a kind uses by default, before kind detail is considered
    pub const fn default_tier(kind: DrawableKind) -> OrderingTier {
        match kind {
            DrawableKind::Unit
            | DrawableKind::Structure
            | DrawableKind::Feature
            | DrawableKind::DeliveryPoint
            | DrawableKind::Effect => OrderingTier::RenderState,
            DrawableKind::Shadow
            | DrawableKind::Particle
            | DrawableKind::Projectile
            | DrawableKind::ProximityMarker
            | DrawableKind::TerrainTile
            | DrawableKind::WaterTile => OrderingTier::TrueDepth,
        }
    }

    /// Ordering tier for a specific object
    pub fn tier(kind: DrawableKind, desc: &DrawableDesc) -> OrderingTier {
        match (kind, desc.detail) {
            (DrawableKind::Effect, KindDetail::Effect { group }) => match group {
                EffectGroup::Explosion
                | EffectGroup::Construction
                | EffectGroup::Smoke
                | EffectGroup::Firework => OrderingTier::TrueDepth,
                _ => OrderingTier::RenderState,
            },
            (DrawableKind::Projectile, KindDetail::Projectile { translucent, .. }) => {
                if translucent {
                    OrderingTier::TrueDepth
                } else {
                    OrderingTier::RenderState
                }
            }
            _ => Self::default_tier(kind),
        }
    }

    /// Key or reject one object
    pub fn evaluate<P: Projector + ?Sized>(
        &self,
        projector: &P,
        frame: &FrameView,
        kind: DrawableKind,
        desc: &DrawableDesc,
    ) -> KeyVerdict {
        let tier = Self::tier(kind, desc);
        let state = self.render_state(kind, desc);

        // Tiles were clipped and depth-sorted by the terrain pass already
        if kind.is_tile() {
            return match desc.detail {
                KindDetail::Tile { draw_depth } if draw_depth.is_finite() => KeyVerdict::Accepted {
                    key: DepthKey::new(draw_depth),
                    tier,
                    state,
                },
                _ => KeyVerdict::reject(kind, RejectReason::Undescribed),
            };
        }

        if let KindDetail::Projectile { drawn_as_effect: true, .. } = desc.detail {
            return KeyVerdict::reject(kind, RejectReason::DrawnAsEffect);
        }

        let anchor = self.anchor(kind, desc);
        let projection = projector.project(&anchor, &frame.view);
        let depth = projection.depth - self.depth_bias(kind, desc);

        // Also rejects NaN depths from a degenerate projection
        if !(depth > 0.0) {
            return KeyVerdict::reject(kind, RejectReason::BehindCamera);
        }

        if let Some(radius) = desc.radius {
            let apparent = radius * self.config.perspective_scale / depth;
            if !frame.viewport.overlaps(&projection.screen, apparent) {
                return KeyVerdict::reject(kind, RejectReason::OffScreen);
            }
        }

        let key = match tier {
            OrderingTier::TrueDepth => depth,
            OrderingTier::RenderState => self.config.state_key(state).max(0.0),
        };

        KeyVerdict::Accepted {
            key: DepthKey::new(key),
            tier,
            state,
        }
    }

    /// World-space point that is projected for this object
    fn anchor(&self, kind: DrawableKind, desc: &DrawableDesc) -> Point3 {
        let lift = match (kind, desc.detail) {
            (DrawableKind::Structure, KindDetail::Structure { tall: true }) => self.config.tall_structure_lift,
            (DrawableKind::Feature, _) => self.config.feature_lift,
            (DrawableKind::Shadow, _) => self.config.shadow_lift,
            _ => 0.0,
        };
        Point3::from(desc.position + Vec3::new(0.0, lift, 0.0))
    }

    /// Amount pulled off the projected depth before clipping and keying
    fn depth_bias(&self, kind: DrawableKind, desc: &DrawableDesc) -> f32 {
        match kind {
            DrawableKind::Particle | DrawableKind::Effect | DrawableKind::Projectile => {
                self.config.billboard_depth_bias
            }
            DrawableKind::Unit | DrawableKind::Shadow => {
                desc.radius.unwrap_or(0.0) * self.config.unit_depth_bias_radii
            }
            _ => 0.0,
        }
    }

    /// Render-state identifier the object binds when drawn
    ///
    /// State-tier entries are keyed and grouped by it; for every entry it
    /// drives the state-change count.
    pub fn render_state(&self, kind: DrawableKind, desc: &DrawableDesc) -> u32 {
        match (kind, desc.detail) {
            (DrawableKind::Effect, KindDetail::Effect { group }) => match group {
                EffectGroup::Waypoint | EffectGroup::Explosion | EffectGroup::Construction => desc.texture_page,
                _ => self.config.generic_effect_state,
            },
            (DrawableKind::Effect, _) => self.config.generic_effect_state,
            (DrawableKind::ProximityMarker, _) => self.config.proximity_state,
            _ => desc.texture_page,
        }
    }
}
