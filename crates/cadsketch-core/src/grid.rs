//! Grid generation and snapping.
//!
//! The grid is defined in world units. [`Grid::overlay`] turns it into
//! screen-space line and label lists for the current viewport; renderers draw
//! those lists as-is.

use crate::elements::Color;
use crate::geometry::format_number;
use crate::viewport::Viewport;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum on-screen distance between major lines before minor lines appear.
pub const MINOR_VISIBILITY_THRESHOLD: f64 = 50.0;

/// Upper bound on lines generated per axis in a single pass.
pub const MAX_LINES_PER_AXIS: i64 = 5000;

/// Offset of labels from their axis, in pixels.
pub const LABEL_PADDING: f64 = 5.0;

/// Decimal places shown on grid labels.
const LABEL_PRECISION: usize = 2;

/// Minor lines closer than this to a major line (world units) are dropped.
const MINOR_COINCIDENCE_TOLERANCE: f64 = 1e-3;

/// Largest line index that still maps to a distinct `f64` (2^53).
const MAX_EXACT_INDEX: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid spacing must be a positive finite number, got {0}")]
    InvalidSpacing(f64),
    #[error("grid subdivisions must be at least 1")]
    InvalidSubdivisions,
    #[error("label font size must be positive, got {0}")]
    InvalidLabelSize(f64),
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    pub visible: bool,
    /// Distance between major lines, in world units.
    pub spacing: f64,
    /// Minor divisions per major cell; also the snap resolution.
    pub subdivisions: u32,
    pub snap_to_grid: bool,
    pub show_axes: bool,
    pub show_labels: bool,
    pub major_line_color: Color,
    pub minor_line_color: Color,
    pub axis_x_color: Color,
    pub axis_y_color: Color,
    pub label_color: Color,
    pub label_font_size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            spacing: 1.0,
            subdivisions: 10,
            snap_to_grid: true,
            show_axes: true,
            show_labels: true,
            major_line_color: Color::rgb(0x88, 0x88, 0x88),
            minor_line_color: Color::rgb(0xDD, 0xDD, 0xDD),
            axis_x_color: Color::rgb(0xFF, 0x44, 0x44),
            axis_y_color: Color::rgb(0x44, 0xFF, 0x44),
            label_color: Color::rgb(0x33, 0x33, 0x33),
            label_font_size: 12.0,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), GridError> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(GridError::InvalidSpacing(self.spacing));
        }
        if self.subdivisions == 0 {
            return Err(GridError::InvalidSubdivisions);
        }
        if !self.label_font_size.is_finite() || self.label_font_size <= 0.0 {
            return Err(GridError::InvalidLabelSize(self.label_font_size));
        }
        Ok(())
    }

    /// Snap resolution in world units.
    pub fn minor_spacing(&self) -> f64 {
        self.spacing / self.subdivisions as f64
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether snapping was applied.
    pub snapped: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
        }
    }
}

/// World axis a line or label measures. An `X` grid line is the line
/// `x = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// A grid line in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub axis: Axis,
    /// World coordinate of the line along `axis`.
    pub value: f64,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLabel {
    pub axis: Axis,
    /// Screen position, already offset from the axis.
    pub position: Point,
    pub text: String,
    pub font_size: f64,
}

/// The two world axes and the origin marker, in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    /// The line `y = 0`.
    pub x_axis: GridLine,
    /// The line `x = 0`.
    pub y_axis: GridLine,
    pub origin: Point,
}

/// Everything needed to draw the grid for one viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridOverlay {
    pub major: Vec<GridLine>,
    pub minor: Vec<GridLine>,
    pub axes: Option<GridAxes>,
    pub labels: Vec<GridLabel>,
}

impl GridOverlay {
    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty() && self.axes.is_none() && self.labels.is_empty()
    }
}

/// Grid state: settings plus snapping and overlay generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    settings: GridSettings,
}

impl Grid {
    pub fn new(settings: GridSettings) -> Result<Self, GridError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Replace the settings. Invalid settings are rejected and the current
    /// ones kept.
    pub fn update_settings(&mut self, settings: GridSettings) -> Result<(), GridError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: f64) -> Result<(), GridError> {
        self.update_settings(GridSettings {
            spacing,
            ..self.settings.clone()
        })
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) -> Result<(), GridError> {
        self.update_settings(GridSettings {
            subdivisions,
            ..self.settings.clone()
        })
    }

    pub fn toggle_visible(&mut self) {
        self.settings.visible = !self.settings.visible;
    }

    pub fn toggle_snap(&mut self) {
        self.settings.snap_to_grid = !self.settings.snap_to_grid;
    }

    pub fn set_snap(&mut self, enabled: bool) {
        self.settings.snap_to_grid = enabled;
    }

    pub fn toggle_axes(&mut self) {
        self.settings.show_axes = !self.settings.show_axes;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    pub fn snap_enabled(&self) -> bool {
        self.settings.snap_to_grid
    }

    /// Round each coordinate to the nearest subdivision when snapping is on.
    pub fn snap(&self, point: Point) -> SnapResult {
        if !self.settings.snap_to_grid {
            return SnapResult::none(point);
        }
        // Divide by the subdivision count last so exact multiples stay exact
        let n = self.settings.subdivisions as f64;
        let spacing = self.settings.spacing;
        let snap = |v: f64| {
            let snapped = (v * n / spacing).round() * spacing / n;
            if snapped.is_finite() { snapped } else { v }
        };
        SnapResult {
            point: Point::new(snap(point.x), snap(point.y)),
            snapped: true,
        }
    }

    pub fn snap_point(&self, x: f64, y: f64) -> Point {
        self.snap(Point::new(x, y)).point
    }

    /// Screen-space grid for the given viewport.
    pub fn overlay(&self, viewport: &Viewport) -> GridOverlay {
        let settings = &self.settings;
        let mut overlay = GridOverlay::default();
        if !settings.visible {
            return overlay;
        }

        let bounds = viewport.visible_world_bounds();
        let spacing = settings.spacing;

        let line = |axis: Axis, value: f64| {
            let (a, b) = match axis {
                Axis::X => (Point::new(value, bounds.y0), Point::new(value, bounds.y1)),
                Axis::Y => (Point::new(bounds.x0, value), Point::new(bounds.x1, value)),
            };
            GridLine {
                axis,
                value,
                start: viewport.world_to_screen(a),
                end: viewport.world_to_screen(b),
            }
        };

        if settings.show_axes {
            overlay.axes = Some(GridAxes {
                x_axis: line(Axis::Y, 0.0),
                y_axis: line(Axis::X, 0.0),
                origin: viewport.world_to_screen(Point::ORIGIN),
            });
        }

        let (Some(x_range), Some(y_range)) = (
            line_range(bounds.x0, bounds.x1, spacing),
            line_range(bounds.y0, bounds.y1, spacing),
        ) else {
            log::debug!(
                "Grid skipped: spacing {spacing} over {bounds:?} exceeds {MAX_LINES_PER_AXIS} lines per axis"
            );
            return overlay;
        };

        for (axis, (lo, hi)) in [(Axis::X, x_range), (Axis::Y, y_range)] {
            for i in lo..=hi {
                overlay.major.push(line(axis, i as f64 * spacing));
            }
        }

        let subdivisions = i64::from(settings.subdivisions);
        if spacing * viewport.scale() > MINOR_VISIBILITY_THRESHOLD && subdivisions > 1 {
            let n = subdivisions as f64;
            for (axis, (lo, hi)) in [(Axis::X, x_range), (Axis::Y, y_range)] {
                let Some((first, last)) = minor_range(lo, hi, subdivisions) else {
                    log::debug!("Minor grid skipped for {axis:?}");
                    continue;
                };
                for j in (first..=last).filter(|j| j % subdivisions != 0) {
                    let value = j as f64 * spacing / n;
                    let major = (value / spacing).round() * spacing;
                    if (value - major).abs() < MINOR_COINCIDENCE_TOLERANCE {
                        continue;
                    }
                    overlay.minor.push(line(axis, value));
                }
            }
        }

        if settings.show_labels {
            overlay.labels = self.labels(viewport, x_range, y_range);
        }
        overlay
    }

    fn labels(&self, viewport: &Viewport, x_range: (i64, i64), y_range: (i64, i64)) -> Vec<GridLabel> {
        let spacing = self.settings.spacing;
        let font_size = self.settings.label_font_size;
        let mut labels = Vec::new();

        for (axis, (lo, hi)) in [(Axis::X, x_range), (Axis::Y, y_range)] {
            // No label at the origin
            for i in (lo..=hi).filter(|i| *i != 0) {
                let value = i as f64 * spacing;
                let world = match axis {
                    Axis::X => Point::new(value, 0.0),
                    Axis::Y => Point::new(0.0, value),
                };
                let screen = viewport.world_to_screen(world);
                if !viewport.contains_screen_point(screen) {
                    continue;
                }
                let position = match axis {
                    Axis::X => Point::new(screen.x, screen.y + LABEL_PADDING),
                    Axis::Y => Point::new(screen.x + LABEL_PADDING, screen.y),
                };
                labels.push(GridLabel {
                    axis,
                    position,
                    text: format_number(value, LABEL_PRECISION),
                    font_size,
                });
            }
        }
        labels
    }
}

/// Index range of major lines covering `[min, max]`, or `None` when it would
/// exceed [`MAX_LINES_PER_AXIS`] or leave the exactly representable range.
fn line_range(min: f64, max: f64, spacing: f64) -> Option<(i64, i64)> {
    let lo = (min / spacing).floor();
    let hi = (max / spacing).ceil();
    if !(lo.abs() <= MAX_EXACT_INDEX && hi.abs() <= MAX_EXACT_INDEX) {
        return None;
    }
    if hi - lo + 1.0 > MAX_LINES_PER_AXIS as f64 {
        return None;
    }
    Some((lo as i64, hi as i64))
}

/// Subdivision index range for the major range `lo..=hi`.
fn minor_range(lo: i64, hi: i64, subdivisions: i64) -> Option<(i64, i64)> {
    let first = lo.checked_mul(subdivisions)?;
    let last = hi.checked_mul(subdivisions)?;
    (last.checked_sub(first)? <= MAX_LINES_PER_AXIS).then_some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn count(lines: &[GridLine], axis: Axis) -> usize {
        lines.iter().filter(|l| l.axis == axis).count()
    }

    #[test]
    fn test_default_settings() {
        let s = GridSettings::default();
        assert!(s.visible && s.snap_to_grid && s.show_axes && s.show_labels);
        assert!((s.spacing - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.subdivisions, 10);
        assert_eq!(s.axis_x_color.to_hex(), "#ff4444");
        assert!((s.minor_spacing() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_update_keeps_settings() {
        let mut grid = Grid::default();
        assert_eq!(grid.set_spacing(0.0), Err(GridError::InvalidSpacing(0.0)));
        assert_eq!(grid.set_subdivisions(0), Err(GridError::InvalidSubdivisions));
        assert!(grid.set_spacing(f64::NAN).is_err());
        assert_eq!(grid.settings(), &GridSettings::default());
        assert!(grid.set_spacing(5.0).is_ok());
        assert!((grid.settings().spacing - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_rounds_to_subdivision() {
        let grid = Grid::default();
        let p = grid.snap_point(1.26, -0.04);
        assert!((p.x - 1.3).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(grid.snap(Point::new(0.0, 0.0)).snapped);
    }

    #[test]
    fn test_snap_disabled_is_identity() {
        let mut grid = Grid::default();
        grid.toggle_snap();
        let p = Point::new(1.234, 5.678);
        assert_eq!(grid.snap(p), SnapResult::none(p));
    }

    #[test]
    fn test_hidden_grid_is_empty() {
        let mut grid = Grid::default();
        grid.toggle_visible();
        assert!(grid.overlay(&Viewport::new(800.0, 600.0)).is_empty());
    }

    #[test]
    fn test_major_lines_without_minor_at_low_zoom() {
        let grid = Grid::default();
        let overlay = grid.overlay(&Viewport::new(800.0, 600.0));
        // x in [-400, 400], y in [-300, 300]
        assert_eq!(count(&overlay.major, Axis::X), 801);
        assert_eq!(count(&overlay.major, Axis::Y), 601);
        assert!(overlay.minor.is_empty());
        assert!(overlay.axes.is_some());
    }

    #[test]
    fn test_minor_lines_when_zoomed_in() {
        let grid = Grid::default();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scale(100.0);
        let overlay = grid.overlay(&viewport);
        assert_eq!(count(&overlay.major, Axis::X), 9);
        assert_eq!(count(&overlay.major, Axis::Y), 7);
        // 81 subdivision positions on x, 9 of them major; 61 on y, 7 major
        assert_eq!(count(&overlay.minor, Axis::X), 72);
        assert_eq!(count(&overlay.minor, Axis::Y), 54);
    }

    #[test]
    fn test_labels_skip_origin_and_offset() {
        let grid = Grid::default();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scale(100.0);
        let overlay = grid.overlay(&viewport);
        assert!(overlay.labels.iter().all(|l| l.text != "0"));
        let one = overlay
            .labels
            .iter()
            .find(|l| l.axis == Axis::X && l.text == "1")
            .unwrap();
        assert!((one.position.x - 500.0).abs() < 1e-9);
        assert!((one.position.y - 305.0).abs() < 1e-9);
        let y_one = overlay
            .labels
            .iter()
            .find(|l| l.axis == Axis::Y && l.text == "1")
            .unwrap();
        assert!((y_one.position.x - 405.0).abs() < 1e-9);
        assert!((y_one.position.y - 400.0).abs() < 1e-9);
        // x: -4..=4 minus 0, y: -3..=3 minus 0
        assert_eq!(overlay.labels.len(), 8 + 6);
    }

    #[test]
    fn test_axes_and_origin_marker() {
        let grid = Grid::default();
        let overlay = grid.overlay(&Viewport::new(800.0, 600.0));
        let axes = overlay.axes.unwrap();
        assert_eq!(axes.origin, Point::new(400.0, 300.0));
        assert!((axes.x_axis.start.y - 300.0).abs() < 1e-9);
        assert!((axes.y_axis.start.x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_runaway_guard_skips_lines() {
        let mut grid = Grid::default();
        grid.set_spacing(0.01).unwrap();
        let overlay = grid.overlay(&Viewport::new(800.0, 600.0));
        assert!(overlay.major.is_empty());
        assert!(overlay.labels.is_empty());
        assert!(overlay.axes.is_some());
    }

    #[test]
    fn test_tiny_spacing_skips_grid() {
        let mut grid = Grid::default();
        grid.set_spacing(1e-300).unwrap();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scale(0.01);
        let overlay = grid.overlay(&viewport);
        assert!(overlay.major.is_empty() && overlay.minor.is_empty());
        assert!(overlay.labels.is_empty());
        assert!(overlay.axes.is_some());
    }

    #[test]
    fn test_far_origin_does_not_overflow() {
        let grid = Grid::default();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scale(100.0);
        viewport.set_origin(Point::new(1e18, 0.0));
        let overlay = grid.overlay(&viewport);
        assert!(overlay.major.is_empty() && overlay.minor.is_empty());

        viewport.set_origin(Point::new(1e15, 0.0));
        let overlay = grid.overlay(&viewport);
        assert!(!overlay.major.is_empty());
        assert!(!overlay.minor.is_empty());
    }

    #[test]
    fn test_minor_lines_near_major_are_dropped() {
        let mut grid = Grid::default();
        grid.update_settings(GridSettings {
            spacing: 0.06,
            subdivisions: 100,
            ..GridSettings::default()
        })
        .unwrap();
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scale(1000.0);
        let overlay = grid.overlay(&viewport);
        assert!(!overlay.minor.is_empty());
        for l in &overlay.minor {
            let major = (l.value / 0.06).round() * 0.06;
            assert!((l.value - major).abs() >= 1e-3, "minor line at {}", l.value);
        }
        assert!(!overlay.minor.iter().any(|l| (l.value - 0.0006).abs() < 1e-9));
        assert!(overlay.minor.iter().any(|l| (l.value - 0.0012).abs() < 1e-9));
    }

    proptest! {
        #[test]
        fn snap_is_idempotent(x in -1e5f64..1e5, y in -1e5f64..1e5, spacing in 0.01f64..100.0, subdivisions in 1u32..20) {
            let mut grid = Grid::default();
            grid.update_settings(GridSettings { spacing, subdivisions, ..GridSettings::default() }).unwrap();
            let once = grid.snap_point(x, y);
            let twice = grid.snap_point(once.x, once.y);
            prop_assert_eq!(once, twice);
        }
    }
}
