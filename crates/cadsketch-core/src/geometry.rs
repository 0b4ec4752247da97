//! Shared 2D geometry helpers.
//!
//! Everything here is a pure function over `kurbo` primitives; the stateful
//! components (viewport, grid, tools, store) build on top of these.

use kurbo::{Point, Rect, Vec2};
use std::f64::consts::TAU;

/// Lock `candidate` to the horizontal or vertical axis through `anchor`.
///
/// The axis with the larger displacement wins; ties lock vertically. The
/// result always shares exactly one coordinate with the anchor.
pub fn apply_ortho_constraint(anchor: Point, candidate: Point) -> Point {
    let dx = (candidate.x - anchor.x).abs();
    let dy = (candidate.y - anchor.y).abs();

    if dx > dy {
        Point::new(candidate.x, anchor.y)
    } else {
        Point::new(anchor.x, candidate.y)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Midpoint of the segment `a`-`b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Angle of the vector `from -> to` in radians, in (-π, π].
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Same as [`angle_between`] but in degrees.
pub fn angle_between_degrees(from: Point, to: Point) -> f64 {
    angle_between(from, to).to_degrees()
}

/// Rotate `point` around `center` by `angle` radians (counter-clockwise in a
/// y-up frame).
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let x = point.x - center.x;
    let y = point.y - center.y;
    Point::new(center.x + x * cos - y * sin, center.y + x * sin + y * cos)
}

/// Rotate a vector by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    distance(point, proj)
}

/// Test if two line segments (a-b) and (c-d) intersect, touching included.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Test if a chain of segments (consecutive points) touches a rectangle,
/// either by having a vertex inside it or by crossing one of its edges.
pub fn polyline_intersects_rect(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| contains_inclusive(rect, *p)) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    points.windows(2).any(|w| {
        (0..4).any(|i| segments_intersect(w[0], w[1], corners[i], corners[(i + 1) % 4]))
    })
}

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Test if a closed polygon overlaps a rectangle: an edge touches it, or one
/// shape lies entirely inside the other.
pub fn polygon_intersects_rect(polygon: &[Point], rect: Rect) -> bool {
    let Some(first) = polygon.first() else {
        return false;
    };
    let mut ring = polygon.to_vec();
    ring.push(*first);
    polyline_intersects_rect(&ring, rect) || point_in_polygon(rect.center(), polygon)
}

/// `Rect::contains` is half-open; selection boxes should include their edges.
pub fn contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Format a number with fixed precision, trimming trailing zeros and a
/// dangling decimal point (`1.50` -> `1.5`, `2.00` -> `2`).
pub fn format_number(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$}");
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
