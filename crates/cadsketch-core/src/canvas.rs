//! The drawing session: viewport, grid, tools and element store together.

use crate::command::{CommandError, CommandRequest, CommandService};
use crate::config::CanvasConfig;
use crate::elements::{Element, ElementDraft, ElementId, Text};
use crate::geometry::apply_ortho_constraint;
use crate::grid::{Grid, GridError, GridOverlay};
use crate::input::{PointerEvent, PointerEventKind};
use crate::store::ElementStore;
use crate::tools::{ToolKind, ToolManager, ToolOutput, ToolPreview, ToolState};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use std::fmt;

/// Prompt shown when the text tool asks for content.
pub const TEXT_PROMPT: &str = "Enter text:";

/// Supplies text for the text tool, e.g. a dialog in the host UI.
pub trait TextInput: fmt::Debug {
    /// Return the entered text, or `None` if the user cancelled.
    fn request_text(&mut self, prompt: &str) -> Option<String>;
}

/// Text input that is always cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextInput;

impl TextInput for NoTextInput {
    fn request_text(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

/// Cursor position in every space the UI displays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    pub screen: Point,
    /// World point before snapping.
    pub world: Point,
    /// World point after snapping and ortho locking, as seen by the tools.
    pub snapped: Point,
}

/// Snapshot for a status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStatus {
    pub cursor: CursorPosition,
    pub zoom_percent: f64,
    pub rotation_degrees: f64,
    pub tool: ToolKind,
    pub tool_state: ToolState,
    pub ortho_mode: bool,
    pub snap_to_grid: bool,
    pub element_count: usize,
    pub selection_count: usize,
}

/// A drawing session. Each canvas owns all of its state, so any number of
/// canvases can coexist.
#[derive(Debug)]
pub struct Canvas {
    viewport: Viewport,
    grid: Grid,
    tools: ToolManager,
    store: ElementStore,
    ortho_mode: bool,
    cursor: CursorPosition,
    /// Screen point of the previous event, for drag deltas.
    last_screen_point: Option<Point>,
    text_input: Box<dyn TextInput>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a canvas with default settings.
    pub fn new() -> Self {
        let config = CanvasConfig::default();
        Self {
            viewport: Viewport::new(config.viewport_size.width, config.viewport_size.height),
            grid: Grid::default(),
            tools: ToolManager::new(),
            store: ElementStore::with_default_layer_color(config.default_layer_color),
            ortho_mode: config.ortho_mode,
            cursor: CursorPosition::default(),
            last_screen_point: None,
            text_input: Box::new(NoTextInput),
        }
    }

    /// Create a canvas from a config, rejecting invalid grid settings.
    pub fn with_config(config: CanvasConfig) -> Result<Self, GridError> {
        Ok(Self {
            viewport: Viewport::new(config.viewport_size.width, config.viewport_size.height),
            grid: Grid::new(config.grid)?,
            store: ElementStore::with_default_layer_color(config.default_layer_color),
            ortho_mode: config.ortho_mode,
            ..Self::new()
        })
    }

    pub fn with_text_input(mut self, text_input: impl TextInput + 'static) -> Self {
        self.text_input = Box::new(text_input);
        self
    }

    pub fn set_text_input(&mut self, text_input: impl TextInput + 'static) {
        self.text_input = Box::new(text_input);
    }

    // --- Event pipeline ---

    /// Process one pointer event: screen to world, snap, ortho lock, then
    /// the active tool. Returns the id of an element created by the event.
    pub fn handle_event(&mut self, event: &PointerEvent) -> Option<ElementId> {
        let screen = event.screen_point;
        let delta = self.last_screen_point.map_or(Vec2::ZERO, |last| screen - last);
        self.last_screen_point = Some(screen);

        if event.kind == PointerEventKind::Wheel {
            self.viewport.zoom_wheel(event.wheel_delta.y, screen);
        }

        let point = self.update_cursor(screen);
        let output = match event.kind {
            PointerEventKind::Move | PointerEventKind::Wheel => ToolOutput::None,
            PointerEventKind::Down => {
                self.tools.pointer_down(point);
                ToolOutput::None
            }
            PointerEventKind::Drag => self.tools.drag(point, delta),
            PointerEventKind::Up => self.tools.pointer_up(point, event.modifiers),
            PointerEventKind::Click => self.tools.click(point, event.modifiers),
            PointerEventKind::DoubleClick => self.tools.double_click(point),
        };
        self.apply_tool_output(output)
    }

    fn update_cursor(&mut self, screen: Point) -> Point {
        let world = self.viewport.screen_to_world(screen);
        let mut snapped = self.grid.snap(world).point;
        if self.ortho_mode && self.tools.current_tool().supports_ortho() {
            if let Some(anchor) = self.tools.ortho_anchor() {
                snapped = apply_ortho_constraint(anchor, snapped);
            }
        }
        self.cursor = CursorPosition {
            screen,
            world,
            snapped,
        };
        snapped
    }

    fn apply_tool_output(&mut self, output: ToolOutput) -> Option<ElementId> {
        match output {
            ToolOutput::None => None,
            ToolOutput::Create(geometry) => Some(self.store.add(ElementDraft::new(geometry))),
            ToolOutput::Pan(delta) => {
                self.viewport.pan(delta.x, delta.y);
                None
            }
            ToolOutput::SelectRect { rect, additive } => {
                let hits = self.store.elements_in_rect(rect);
                if !additive {
                    self.store.deselect_all();
                }
                let selected = self.store.select_many(&hits);
                log::debug!("Selection rectangle hit {selected} elements");
                None
            }
            ToolOutput::ClearSelection => {
                self.store.deselect_all();
                None
            }
            ToolOutput::RequestText(position) => {
                let content = self.text_input.request_text(TEXT_PROMPT)?;
                match Text::new(position, content) {
                    Ok(text) => Some(self.store.add(ElementDraft::new(text))),
                    Err(err) => {
                        log::debug!("No text element created: {err}");
                        None
                    }
                }
            }
        }
    }

    // --- Commands ---

    /// Create an element from a structured request. Nothing changes on error.
    pub fn apply_command(&mut self, request: &CommandRequest) -> Result<ElementId, CommandError> {
        let draft = request.to_draft()?;
        let id = self.store.add(draft);
        log::debug!("Command {} created {id}", request.action);
        Ok(id)
    }

    /// Interpret free text with `service` and apply the resulting request.
    pub fn run_text_command(
        &mut self,
        service: &dyn CommandService,
        text: &str,
    ) -> Result<ElementId, CommandError> {
        let request = service
            .interpret(text)
            .ok_or_else(|| CommandError::Unrecognized(text.to_string()))?;
        self.apply_command(&request)
    }

    // --- Tools and modes ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn ortho_mode(&self) -> bool {
        self.ortho_mode
    }

    pub fn set_ortho_mode(&mut self, enabled: bool) {
        self.ortho_mode = enabled;
    }

    pub fn toggle_ortho_mode(&mut self) {
        self.ortho_mode = !self.ortho_mode;
    }

    pub fn snap_enabled(&self) -> bool {
        self.grid.snap_enabled()
    }

    pub fn toggle_snap(&mut self) {
        self.grid.toggle_snap();
    }

    // --- Components ---

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Resize the drawing surface. `origin` stays at the screen center.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ElementStore {
        &mut self.store
    }

    // --- Render-facing views ---

    pub fn grid_overlay(&self) -> GridOverlay {
        self.grid.overlay(&self.viewport)
    }

    pub fn visible_elements(&self) -> Vec<&Element> {
        self.store.visible_elements()
    }

    pub fn tool_preview(&self) -> Option<ToolPreview> {
        self.tools.preview(self.cursor.snapped)
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn status(&self) -> CanvasStatus {
        CanvasStatus {
            cursor: self.cursor,
            zoom_percent: self.viewport.zoom_percent(),
            rotation_degrees: self.viewport.rotation_degrees(),
            tool: self.tools.current_tool(),
            tool_state: self.tools.state(),
            ortho_mode: self.ortho_mode,
            snap_to_grid: self.grid.snap_enabled(),
            element_count: self.store.len(),
            selection_count: self.store.selection().len(),
        }
    }
}
