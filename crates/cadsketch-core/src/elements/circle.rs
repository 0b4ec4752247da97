//! Circle element.

use super::{ElementError, ElementKind, ElementShape, finite_point, non_negative, require};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleParams {
    pub center: Option<Point>,
    pub radius: Option<f64>,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Result<Self, ElementError> {
        Ok(Self {
            center: finite_point(center, ElementKind::Circle, "center")?,
            radius: non_negative(radius, ElementKind::Circle, "radius")?,
        })
    }

    /// Circle through `edge`, centered at `center`.
    pub fn through(center: Point, edge: Point) -> Result<Self, ElementError> {
        Self::new(center, (edge - center).hypot())
    }

    pub fn from_params(params: CircleParams) -> Result<Self, ElementError> {
        let center = require(params.center, ElementKind::Circle, "center")?;
        let radius = require(params.radius, ElementKind::Circle, "radius")?;
        Self::new(center, radius)
    }
}

impl ElementShape for Circle {
    fn kind(&self) -> ElementKind {
        ElementKind::Circle
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.center).hypot() <= self.radius + tolerance
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        // Closest point of the rect to the center
        let nearest = Point::new(
            self.center.x.clamp(rect.x0, rect.x1),
            self.center.y.clamp(rect.y0, rect.y1),
        );
        (nearest - self.center).hypot() <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_through_edge_point() {
        let c = Circle::through(Point::new(1.0, 1.0), Point::new(4.0, 5.0)).unwrap();
        assert!((c.radius - 5.0).abs() < 1e-12);
        assert_eq!(c.bounds(), Rect::new(-4.0, -4.0, 6.0, 6.0));
    }

    #[test]
    fn test_rejects_negative_radius() {
        assert!(Circle::new(Point::ORIGIN, -0.5).is_err());
        assert!(Circle::from_params(CircleParams {
            center: Some(Point::ORIGIN),
            radius: None
        })
        .is_err());
    }

    #[test]
    fn test_intersects_rect() {
        let c = Circle::new(Point::ORIGIN, 1.0).unwrap();
        assert!(c.intersects_rect(Rect::new(0.5, 0.5, 3.0, 3.0)));
        // Corner region outside the disc
        assert!(!c.intersects_rect(Rect::new(0.8, 0.8, 3.0, 3.0)));
    }
}
