//! # Projection Collaborator
//!
//! The dispatcher never does camera math itself. It asks a [`Projector`] for
//! the screen position and depth of an anchor point and works from there.
//!
//! ## Coordinate System
//! [`PerspectiveProjector`] uses the right-handed Y-up view space produced by
//! `Mat4::look_at_rh`:
//! - X+ = Right
//! - Y+ = Up
//! - Z- = Forward (into the screen)
//!
//! Screen space has its origin at the top-left corner with Y growing downward,
//! measured in pixels.

use crate::foundation::math::{utils, Point2, Point3, ViewTransform};

/// Screen-space rectangle objects are clipped against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport of the given pixel size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a square of half-size `radius` centred on `center` touches the viewport
    ///
    /// Edges count as overlap, so an object exactly grazing the border is kept.
    pub fn overlaps(&self, center: &Point2, radius: f32) -> bool {
        !(center.x + radius < 0.0
            || center.x - radius > self.width
            || center.y + radius < 0.0
            || center.y - radius > self.height)
    }
}

/// Result of projecting a world-space point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Screen position in pixels
    pub screen: Point2,
    /// Distance along the view direction; zero or negative is at or behind the camera
    pub depth: f32,
}

/// World-to-screen projection, supplied by the host renderer
pub trait Projector {
    /// Project `world` through `view` onto the screen
    fn project(&self, world: &Point3, view: &ViewTransform) -> Projection;
}

impl<P: Projector + ?Sized> Projector for &P {
    fn project(&self, world: &Point3, view: &ViewTransform) -> Projection {
        (**self).project(world, view)
    }
}

/// Pinhole perspective projector
///
/// Reference implementation of [`Projector`] for hosts that do not bring their
/// own. Its [`focal_length_px`](Self::focal_length_px) is the natural value for
/// [`DispatchConfig::perspective_scale`](crate::core::DispatchConfig::perspective_scale):
/// with it, `radius * scale / depth` is exactly the apparent radius in pixels.
#[derive(Debug, Clone)]
pub struct PerspectiveProjector {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Target viewport
    pub viewport: Viewport,
}

impl PerspectiveProjector {
    /// Create a projector from a vertical field of view in degrees
    ///
    /// # Example
    /// ```rust
    /// use render_dispatch::render::{PerspectiveProjector, Viewport};
    ///
    /// let projector = PerspectiveProjector::new(60.0, Viewport::new(800.0, 600.0));
    /// assert!(projector.focal_length_px() > 500.0);
    /// ```
    pub fn new(fov_y_degrees: f32, viewport: Viewport) -> Self {
        Self {
            fov_y: utils::deg_to_rad(fov_y_degrees),
            viewport,
        }
    }

    /// Distance to the image plane in pixels
    pub fn focal_length_px(&self) -> f32 {
        (self.viewport.height * 0.5) / (self.fov_y * 0.5).tan()
    }
}

impl Projector for PerspectiveProjector {
    fn project(&self, world: &Point3, view: &ViewTransform) -> Projection {
        let eye = view.transform_point(world);
        let depth = -eye.z;
        if depth <= 0.0 {
            return Projection {
                screen: Point2::new(self.viewport.width * 0.5, self.viewport.height * 0.5),
                depth,
            };
        }

        let focal = self.focal_length_px();
        Projection {
            screen: Point2::new(
                self.viewport.width * 0.5 + focal * eye.x / depth,
                self.viewport.height * 0.5 - focal * eye.y / depth,
            ),
            depth,
        }
    }
}
