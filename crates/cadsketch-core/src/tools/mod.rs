//! Drawing tools.
//!
//! Each tool is a small state machine over [`ToolState`] that consumes
//! world-space cursor points (already snapped and ortho-constrained by the
//! caller) and yields a [`ToolOutput`] for the canvas to apply. Only the
//! active tool's transient data is kept; switching tools discards it.

use crate::elements::{Arc, Circle, ElementError, ElementGeometry, Line, Polyline, Rectangle};
use crate::geometry::{angle_between, distance};
use crate::input::Modifiers;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Line,
    Polyline,
    Rectangle,
    Circle,
    Arc,
    Text,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Line => "line",
            ToolKind::Polyline => "polyline",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Arc => "arc",
            ToolKind::Text => "text",
        }
    }

    /// Tools whose in-progress edge is axis-locked in ortho mode.
    pub fn supports_ortho(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Rectangle)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction state shared by all tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolState {
    /// No interaction in progress.
    #[default]
    Idle,
    /// Armed after finishing a shape; the next click starts a new one.
    Active,
    /// Anchor captured, awaiting completion.
    Drawing,
    /// Reserved for element editing.
    Editing,
}

impl ToolState {
    fn is_ready(self) -> bool {
        matches!(self, ToolState::Idle | ToolState::Active)
    }
}

/// Two-click tools: line and rectangle share this shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorTool {
    pub state: ToolState,
    pub anchor: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircleTool {
    pub state: ToolState,
    pub center: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineTool {
    pub state: ToolState,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcTool {
    pub state: ToolState,
    pub center: Option<Point>,
    /// Radius and start angle, fixed by the second click.
    pub radius: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTool {
    pub state: ToolState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectTool {
    pub state: ToolState,
    pub start: Option<Point>,
    pub end: Option<Point>,
    dragged: bool,
    /// The click that closes a drag gesture must not clear the selection.
    swallow_click: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanTool {
    pub state: ToolState,
    pub dragging: bool,
}

/// Transient data of the active tool, one variant per [`ToolKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolData {
    Select(SelectTool),
    Pan(PanTool),
    Line(AnchorTool),
    Polyline(PolylineTool),
    Rectangle(AnchorTool),
    Circle(CircleTool),
    Arc(ArcTool),
    Text(TextTool),
}

impl ToolData {
    /// Fresh data for a tool.
    pub fn initial(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Select => ToolData::Select(SelectTool::default()),
            ToolKind::Pan => ToolData::Pan(PanTool::default()),
            ToolKind::Line => ToolData::Line(AnchorTool::default()),
            ToolKind::Polyline => ToolData::Polyline(PolylineTool::default()),
            ToolKind::Rectangle => ToolData::Rectangle(AnchorTool::default()),
            ToolKind::Circle => ToolData::Circle(CircleTool::default()),
            ToolKind::Arc => ToolData::Arc(ArcTool::default()),
            ToolKind::Text => ToolData::Text(TextTool::default()),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolData::Select(_) => ToolKind::Select,
            ToolData::Pan(_) => ToolKind::Pan,
            ToolData::Line(_) => ToolKind::Line,
            ToolData::Polyline(_) => ToolKind::Polyline,
            ToolData::Rectangle(_) => ToolKind::Rectangle,
            ToolData::Circle(_) => ToolKind::Circle,
            ToolData::Arc(_) => ToolKind::Arc,
            ToolData::Text(_) => ToolKind::Text,
        }
    }

    pub fn state(&self) -> ToolState {
        match self {
            ToolData::Select(t) => t.state,
            ToolData::Pan(t) => t.state,
            ToolData::Line(t) | ToolData::Rectangle(t) => t.state,
            ToolData::Polyline(t) => t.state,
            ToolData::Circle(t) => t.state,
            ToolData::Arc(t) => t.state,
            ToolData::Text(t) => t.state,
        }
    }
}

/// What the canvas should do after a tool handled an event.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    None,
    /// A finished shape to add to the store.
    Create(ElementGeometry),
    /// Pan the viewport by a screen-space delta.
    Pan(Vec2),
    /// Select elements touching a world-space rectangle.
    SelectRect { rect: Rect, additive: bool },
    ClearSelection,
    /// Ask the text-input collaborator for a label at this point.
    RequestText(Point),
}

/// In-progress geometry for guide overlays, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPreview {
    Line { start: Point, end: Point },
    /// Captured vertices plus the rubber band to the cursor.
    Polyline { points: Vec<Point>, cursor: Point },
    Rectangle(Rect),
    Circle { center: Point, radius: f64 },
    Arc {
        center: Point,
        radius: f64,
        start_angle: Option<f64>,
        end_angle: f64,
    },
    SelectionBox(Rect),
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolManager {
    data: ToolData,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a rejected shape and swallow it; the tool still resets.
fn created(geometry: Result<impl Into<ElementGeometry>, ElementError>) -> ToolOutput {
    match geometry {
        Ok(g) => ToolOutput::Create(g.into()),
        Err(err) => {
            log::warn!("Discarding shape: {err}");
            ToolOutput::None
        }
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self {
            data: ToolData::initial(ToolKind::default()),
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.data.kind()
    }

    pub fn state(&self) -> ToolState {
        self.data.state()
    }

    pub fn data(&self) -> &ToolData {
        &self.data
    }

    /// Switch tools. Switching away discards in-progress geometry; selecting
    /// the current tool again keeps it.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.current_tool() {
            return;
        }
        if self.data.state() == ToolState::Drawing {
            log::debug!("Discarding in-progress {} gesture", self.current_tool());
        }
        log::debug!("Tool {} -> {tool}", self.current_tool());
        self.data = ToolData::initial(tool);
    }

    /// Reference point for ortho locking, if the active tool has one.
    pub fn ortho_anchor(&self) -> Option<Point> {
        match &self.data {
            ToolData::Line(t) | ToolData::Rectangle(t) if t.state == ToolState::Drawing => t.anchor,
            _ => None,
        }
    }

    /// Handle a click at a world point.
    pub fn click(&mut self, point: Point, modifiers: Modifiers) -> ToolOutput {
        match &mut self.data {
            ToolData::Line(t) => match (t.state, t.anchor) {
                (ToolState::Drawing, Some(start)) => {
                    *t = AnchorTool {
                        state: ToolState::Active,
                        anchor: None,
                    };
                    created(Line::new(start, point))
                }
                (state, _) if state.is_ready() => {
                    *t = AnchorTool {
                        state: ToolState::Drawing,
                        anchor: Some(point),
                    };
                    ToolOutput::None
                }
                _ => ToolOutput::None,
            },
            ToolData::Rectangle(t) => match (t.state, t.anchor) {
                (ToolState::Drawing, Some(anchor)) => {
                    *t = AnchorTool {
                        state: ToolState::Active,
                        anchor: None,
                    };
                    created(Rectangle::from_corners(anchor, point))
                }
                (state, _) if state.is_ready() => {
                    *t = AnchorTool {
                        state: ToolState::Drawing,
                        anchor: Some(point),
                    };
                    ToolOutput::None
                }
                _ => ToolOutput::None,
            },
            ToolData::Circle(t) => match (t.state, t.center) {
                (ToolState::Drawing, Some(center)) => {
                    *t = CircleTool {
                        state: ToolState::Active,
                        center: None,
                    };
                    created(Circle::through(center, point))
                }
                (state, _) if state.is_ready() => {
                    *t = CircleTool {
                        state: ToolState::Drawing,
                        center: Some(point),
                    };
                    ToolOutput::None
                }
                _ => ToolOutput::None,
            },
            ToolData::Polyline(t) => {
                match t.state {
                    ToolState::Drawing => t.points.push(point),
                    state if state.is_ready() => {
                        t.points = vec![point];
                        t.state = ToolState::Drawing;
                    }
                    _ => {}
                }
                ToolOutput::None
            }
            ToolData::Arc(t) => Self::arc_click(t, point),
            ToolData::Text(_) => ToolOutput::RequestText(point),
            ToolData::Select(t) => {
                if std::mem::take(&mut t.swallow_click) || modifiers.shift {
                    ToolOutput::None
                } else {
                    ToolOutput::ClearSelection
                }
            }
            ToolData::Pan(_) => ToolOutput::None,
        }
    }

    fn arc_click(t: &mut ArcTool, point: Point) -> ToolOutput {
        match (t.state, t.center, t.radius) {
            (ToolState::Drawing, Some(center), None) => {
                let radius = distance(center, point);
                if radius < f64::EPSILON {
                    log::trace!("Arc radius click on the center ignored");
                } else {
                    t.radius = Some((radius, angle_between(center, point)));
                }
                ToolOutput::None
            }
            (ToolState::Drawing, Some(center), Some((radius, start_angle))) => {
                let end_angle = angle_between(center, point);
                *t = ArcTool {
                    state: ToolState::Active,
                    ..ArcTool::default()
                };
                created(Arc::new(center, radius, start_angle, end_angle))
            }
            (state, ..) if state.is_ready() => {
                *t = ArcTool {
                    state: ToolState::Drawing,
                    center: Some(point),
                    radius: None,
                };
                ToolOutput::None
            }
            _ => ToolOutput::None,
        }
    }

    /// Handle a double-click. Finishes an open polyline with at least two
    /// points; otherwise does nothing.
    pub fn double_click(&mut self, _point: Point) -> ToolOutput {
        let ToolData::Polyline(t) = &mut self.data else {
            return ToolOutput::None;
        };
        if t.state != ToolState::Drawing || t.points.len() < 2 {
            return ToolOutput::None;
        }
        let points = std::mem::take(&mut t.points);
        t.state = ToolState::Idle;
        created(Polyline::open(points))
    }

    pub fn pointer_down(&mut self, point: Point) {
        match &mut self.data {
            ToolData::Select(t) => {
                *t = SelectTool {
                    state: ToolState::Active,
                    start: Some(point),
                    end: Some(point),
                    ..SelectTool::default()
                };
            }
            ToolData::Pan(t) => {
                t.dragging = true;
                t.state = ToolState::Active;
            }
            _ => {}
        }
    }

    /// Handle pointer movement with a button held. `screen_delta` is the
    /// movement since the previous event, in pixels.
    pub fn drag(&mut self, point: Point, screen_delta: Vec2) -> ToolOutput {
        match &mut self.data {
            ToolData::Select(t) if t.start.is_some() => {
                t.end = Some(point);
                t.dragged = true;
                t.state = ToolState::Drawing;
                ToolOutput::None
            }
            ToolData::Pan(t) if t.dragging => ToolOutput::Pan(screen_delta),
            _ => ToolOutput::None,
        }
    }

    pub fn pointer_up(&mut self, point: Point, modifiers: Modifiers) -> ToolOutput {
        match &mut self.data {
            ToolData::Select(t) => {
                let output = match (t.start, t.dragged) {
                    (Some(start), true) => ToolOutput::SelectRect {
                        rect: Rect::from_points(start, point),
                        additive: modifiers.shift,
                    },
                    _ => ToolOutput::None,
                };
                *t = SelectTool {
                    swallow_click: output != ToolOutput::None,
                    ..SelectTool::default()
                };
                output
            }
            ToolData::Pan(t) => {
                *t = PanTool::default();
                ToolOutput::None
            }
            _ => ToolOutput::None,
        }
    }

    /// Guide geometry for the gesture in progress, given the current
    /// (snapped, constrained) cursor.
    pub fn preview(&self, cursor: Point) -> Option<ToolPreview> {
        if self.state() != ToolState::Drawing {
            return None;
        }
        match &self.data {
            ToolData::Line(t) => t.anchor.map(|start| ToolPreview::Line { start, end: cursor }),
            ToolData::Rectangle(t) => t
                .anchor
                .map(|anchor| ToolPreview::Rectangle(Rect::from_points(anchor, cursor))),
            ToolData::Circle(t) => t.center.map(|center| ToolPreview::Circle {
                center,
                radius: distance(center, cursor),
            }),
            ToolData::Polyline(t) => Some(ToolPreview::Polyline {
                points: t.points.clone(),
                cursor,
            }),
            ToolData::Arc(t) => t.center.map(|center| match t.radius {
                Some((radius, start_angle)) => ToolPreview::Arc {
                    center,
                    radius,
                    start_angle: Some(start_angle),
                    end_angle: angle_between(center, cursor),
                },
                None => ToolPreview::Arc {
                    center,
                    radius: distance(center, cursor),
                    start_angle: None,
                    end_angle: angle_between(center, cursor),
                },
            }),
            ToolData::Select(t) => match (t.start, t.end) {
                (Some(start), Some(end)) => Some(ToolPreview::SelectionBox(Rect::from_points(start, end))),
                _ => None,
            },
            ToolData::Pan(_) | ToolData::Text(_) => None,
        }
    }
}
