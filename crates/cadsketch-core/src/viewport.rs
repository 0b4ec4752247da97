//! Viewport module for pan/zoom/rotate transforms.

use crate::geometry::{normalize_angle, rotate_point, rotate_vec};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed scale.
pub const MIN_SCALE: f64 = 0.01;
/// Maximum allowed scale.
pub const MAX_SCALE: f64 = 1000.0;
/// Below this |determinant| a matrix is treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-6;
/// Per-unit wheel delta zoom base (`factor = WHEEL_ZOOM_BASE^delta`).
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

const DEFAULT_SCALE: f64 = 1.0;

/// The window mapping world units to screen pixels.
///
/// `origin` is the world point shown at the center of the screen. The
/// world→screen map is: translate by `-origin`, scale, rotate, then
/// translate to the screen center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    origin: Point,
    scale: f64,
    rotation: f64,
    width: f64,
    height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    /// Create a viewport of the given pixel size with the default view.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            origin: Point::ZERO,
            scale: DEFAULT_SCALE,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in radians, always within `[0, 2π)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Screen-space center of the viewport.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Resize the drawing surface (window resize).
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Set the scale, clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    /// Set the rotation, wrapped into `[0, 2π)`.
    pub fn set_rotation(&mut self, rotation: f64) {
        if rotation.is_finite() {
            self.rotation = normalize_angle(rotation);
        }
    }

    /// Get the world→screen affine transform.
    pub fn forward_matrix(&self) -> Affine {
        Affine::translate(self.center().to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(-self.origin.to_vec2())
    }

    /// Get the screen→world affine transform.
    ///
    /// Degrades to the identity when the forward matrix is near-singular.
    pub fn inverse_matrix(&self) -> Affine {
        invert_or_identity(self.forward_matrix())
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_matrix() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.forward_matrix() * world_point
    }

    /// Convert a screen-space delta into the matching world-space delta.
    fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        rotate_vec(delta, -self.rotation) / self.scale
    }

    /// Pan by a drag delta in screen pixels. Content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let world_delta = self.screen_delta_to_world(Vec2::new(dx, dy));
        self.origin -= world_delta;
    }

    /// Zoom by `factor`, keeping the world point under `screen_center` fixed.
    pub fn zoom(&mut self, factor: f64, screen_center: Point) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if !new_scale.is_finite() || new_scale == self.scale {
            return;
        }

        // World point under the pivot before the zoom
        let world_point = self.screen_to_world(screen_center);

        self.scale = new_scale;

        // Pull the origin so world_point lands back under the pivot
        let new_screen = self.world_to_screen(world_point);
        let correction = screen_center - new_screen;
        self.pan(correction.x, correction.y);
    }

    /// Zoom in response to a mouse wheel delta at the given screen point.
    pub fn zoom_wheel(&mut self, wheel_delta_y: f64, screen_point: Point) {
        self.zoom(WHEEL_ZOOM_BASE.powf(wheel_delta_y), screen_point);
    }

    /// Rotate the view by `angle` radians.
    ///
    /// With a pivot, the origin is rotated about the pivot's world point by
    /// the same angle; without one, the origin is left unchanged.
    pub fn rotate(&mut self, angle: f64, screen_pivot: Option<Point>) {
        if !angle.is_finite() {
            return;
        }
        let pivot = screen_pivot.map(|p| self.screen_to_world(p));
        self.rotation = normalize_angle(self.rotation + angle);
        if let Some(pivot) = pivot {
            self.origin = rotate_point(self.origin, pivot, angle);
        }
    }

    /// Reset origin, scale and rotation, keeping the current size.
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    /// World-space bounding box of everything currently on screen.
    pub fn visible_world_bounds(&self) -> Rect {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
        .map(|p| self.screen_to_world(p));

        corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |r, p| r.union_pt(*p))
    }

    /// Rotation an orientation (north) overlay must apply: the view rotates,
    /// so the overlay turns the opposite way.
    pub fn compass_rotation(&self) -> f64 {
        -self.rotation
    }

    /// Scale as a UI percentage (1.0 = 100%).
    pub fn zoom_percent(&self) -> f64 {
        self.scale * 100.0
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }

    /// Check if a screen point lies on the drawing surface (edges included).
    pub fn contains_screen_point(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Analytic inverse of an affine matrix, or the identity when
/// `|det| < SINGULAR_EPSILON`.
pub fn invert_or_identity(matrix: Affine) -> Affine {
    let [a, b, c, d, e, f] = matrix.as_coeffs();
    let det = a * d - b * c;
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        log::debug!("near-singular viewport matrix (det = {det}), using identity");
        return Affine::IDENTITY;
    }
    let inv_det = 1.0 / det;
    Affine::new([
        d * inv_det,
        -b * inv_det,
        -c * inv_det,
        a * inv_det,
        (c * f - d * e) * inv_det,
        (b * e - a * f) * inv_det,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn assert_point_eq(a: Point, b: Point, eps: f64) {
        assert!((a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_viewport() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.origin(), Point::ZERO);
        assert!((vp.scale() - 1.0).abs() < f64::EPSILON);
        assert_eq!(vp.rotation(), 0.0);
    }

    #[test]
    fn test_center_maps_to_origin() {
        let vp = Viewport::new(800.0, 600.0);
        assert_point_eq(vp.screen_to_world(Point::new(400.0, 300.0)), Point::ZERO, 1e-12);
        assert_point_eq(vp.world_to_screen(Point::ZERO), Point::new(400.0, 300.0), 1e-12);
    }

    #[test]
    fn test_zoom_keeps_center_fixed() {
        let mut vp = Viewport::new(800.0, 600.0);
        let center = Point::new(400.0, 300.0);
        vp.zoom(2.0, center);
        assert!((vp.scale() - 2.0).abs() < f64::EPSILON);
        assert_point_eq(vp.screen_to_world(center), Point::ZERO, 1e-12);
    }

    #[test]
    fn test_zoom_off_center_pivot_under_rotation() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_rotation(0.7);
        vp.set_origin(Point::new(12.0, -3.0));
        let pivot = Point::new(120.0, 510.0);
        let before = vp.screen_to_world(pivot);
        vp.zoom(3.5, pivot);
        assert_point_eq(vp.screen_to_world(pivot), before, 1e-9);
    }

    #[test]
    fn test_zoom_clamp_and_noop() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom(1e-9, Point::ZERO);
        assert!((vp.scale() - MIN_SCALE).abs() < f64::EPSILON);

        // Already at the floor: nothing moves
        let origin = vp.origin();
        vp.zoom(0.5, Point::new(10.0, 10.0));
        assert_eq!(vp.origin(), origin);

        vp.zoom(1e12, Point::ZERO);
        assert!((vp.scale() - MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_moves_origin_against_drag() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_scale(2.0);
        vp.pan(10.0, 20.0);
        assert_point_eq(vp.origin(), Point::new(-5.0, -10.0), 1e-12);
    }

    #[test]
    fn test_pan_content_follows_pointer_when_rotated() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_rotation(1.1);
        vp.set_scale(3.0);
        let grab = Point::new(250.0, 140.0);
        let world = vp.screen_to_world(grab);
        vp.pan(40.0, -25.0);
        assert_point_eq(vp.world_to_screen(world), Point::new(290.0, 115.0), 1e-9);
    }

    #[test]
    fn test_rotation_is_normalized() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.rotate(-FRAC_PI_2, None);
        assert!((vp.rotation() - 1.5 * PI).abs() < 1e-12);
        vp.rotate(FRAC_PI_2, None);
        let r = vp.rotation();
        assert!((0.0..TAU).contains(&r));
        assert!(r < 1e-12 || TAU - r < 1e-12);
    }

    #[test]
    fn test_rotate_without_pivot_keeps_origin() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_origin(Point::new(5.0, 7.0));
        vp.rotate(0.3, None);
        assert_eq!(vp.origin(), Point::new(5.0, 7.0));
    }

    #[test]
    fn test_rotate_about_pivot_rotates_origin() {
        let mut vp = Viewport::new(800.0, 600.0);
        // Pivot one world unit right of the origin
        let pivot_screen = Point::new(401.0, 300.0);
        vp.rotate(PI, Some(pivot_screen));
        assert_point_eq(vp.origin(), Point::new(2.0, 0.0), 1e-12);
    }

    #[test]
    fn test_reset_keeps_size() {
        let mut vp = Viewport::new(1024.0, 768.0);
        vp.pan(10.0, 10.0);
        vp.zoom(4.0, Point::new(3.0, 3.0));
        vp.rotate(1.0, None);
        vp.reset();
        assert_eq!(vp, Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn test_singular_matrix_falls_back_to_identity() {
        let singular = Affine::new([1.0, 2.0, 2.0, 4.0, 10.0, 10.0]);
        assert_eq!(invert_or_identity(singular), Affine::IDENTITY);
    }

    #[test]
    fn test_inverse_matches_forward() {
        let mut vp = Viewport::new(640.0, 480.0);
        vp.set_origin(Point::new(-3.0, 8.0));
        vp.set_scale(17.0);
        vp.set_rotation(2.2);
        let product = vp.forward_matrix() * vp.inverse_matrix();
        for (got, want) in product.as_coeffs().iter().zip(Affine::IDENTITY.as_coeffs()) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_visible_bounds_unrotated() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_scale(100.0);
        let b = vp.visible_world_bounds();
        assert!((b.x0 + 4.0).abs() < 1e-12 && (b.x1 - 4.0).abs() < 1e-12);
        assert!((b.y0 + 3.0).abs() < 1e-12 && (b.y1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compass_rotation_is_inverse() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_rotation(0.4);
        assert_eq!(vp.compass_rotation(), -0.4);
    }

    proptest! {
        #[test]
        fn roundtrip_screen_world_screen(
            scale_exp in -2.0f64..3.0,
            rotation in 0.0f64..TAU,
            ox in -1e3f64..1e3, oy in -1e3f64..1e3,
            sx in 0.0f64..800.0, sy in 0.0f64..600.0,
        ) {
            let mut vp = Viewport::new(800.0, 600.0);
            vp.set_scale(10f64.powf(scale_exp));
            vp.set_rotation(rotation);
            vp.set_origin(Point::new(ox, oy));
            let p = Point::new(sx, sy);
            let back = vp.world_to_screen(vp.screen_to_world(p));
            prop_assert!((back.x - p.x).abs() < 1e-6);
            prop_assert!((back.y - p.y).abs() < 1e-6);
        }

        #[test]
        fn zoom_preserves_pivot_world_point(
            factor in 0.05f64..20.0,
            rotation in 0.0f64..TAU,
            sx in 0.0f64..800.0, sy in 0.0f64..600.0,
        ) {
            let mut vp = Viewport::new(800.0, 600.0);
            vp.set_rotation(rotation);
            let pivot = Point::new(sx, sy);
            let before = vp.screen_to_world(pivot);
            vp.zoom(factor, pivot);
            let after = vp.screen_to_world(pivot);
            prop_assert!((before.x - after.x).abs() < 1e-6);
            prop_assert!((before.y - after.y).abs() < 1e-6);
        }

        #[test]
        fn pan_then_inverse_pan_restores_origin(
            dx in -500.0f64..500.0, dy in -500.0f64..500.0,
            rotation in 0.0f64..TAU,
            scale_exp in -2.0f64..3.0,
        ) {
            let mut vp = Viewport::new(800.0, 600.0);
            vp.set_rotation(rotation);
            vp.set_scale(10f64.powf(scale_exp));
            let origin = vp.origin();
            vp.pan(dx, dy);
            vp.pan(-dx, -dy);
            prop_assert!((vp.origin().x - origin.x).abs() < 1e-9);
            prop_assert!((vp.origin().y - origin.y).abs() < 1e-9);
        }
    }
}
