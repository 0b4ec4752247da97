//! Element and layer registry.

use crate::elements::{
    Color, Element, ElementDraft, ElementId, ElementKind, ElementPatch, ElementShape, ElementStyle,
    Metadata,
};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of a layer. The `default` layer always exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub const DEFAULT: &'static str = "default";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn default_layer() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A named group of elements sharing visibility, lock state and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub color: Color,
    pub order: i32,
}

impl Layer {
    fn default_layer(color: Color) -> Self {
        Self {
            id: LayerId::default_layer(),
            name: "Default".to_string(),
            visible: true,
            locked: false,
            color,
            order: 0,
        }
    }
}

/// Fields for a new layer. `order` defaults to above every existing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDraft {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub color: Color,
    pub order: Option<i32>,
}

impl LayerDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            color: Color::black(),
            order: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub color: Option<Color>,
    pub order: Option<i32>,
}

/// Canonical owner of elements and layers.
///
/// Operations that target an unknown id are silent no-ops: stale ids from UI
/// races are expected. Refused operations (removing the default layer,
/// selecting a locked element) fail soft as well.
#[derive(Debug, Clone)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    /// Insertion order, for stable enumeration.
    order: Vec<ElementId>,
    layers: HashMap<LayerId, Layer>,
    active_layer: LayerId,
    selection: Vec<ElementId>,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    pub fn new() -> Self {
        Self::with_default_layer_color(Color::black())
    }

    pub fn with_default_layer_color(color: Color) -> Self {
        let default = Layer::default_layer(color);
        let mut layers = HashMap::new();
        layers.insert(default.id.clone(), default);
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            layers,
            active_layer: LayerId::default_layer(),
            selection: Vec::new(),
        }
    }

    // --- Elements ---

    /// Add an element, resolving its layer and default style. Returns the
    /// freshly assigned id.
    pub fn add(&mut self, draft: ElementDraft) -> ElementId {
        let layer_id = match draft.layer_id {
            Some(id) if self.layers.contains_key(&id) => id,
            Some(id) => {
                log::warn!("Unknown layer {id}, using active layer {}", self.active_layer);
                self.active_layer.clone()
            }
            None => self.active_layer.clone(),
        };
        let layer_color = self.layers.get(&layer_id).map(|l| l.color).unwrap_or_default();
        let style = draft.style.unwrap_or_else(|| match draft.geometry.kind() {
            ElementKind::Text => ElementStyle::text_for_layer(layer_color),
            _ => ElementStyle::for_layer(layer_color),
        });

        let id = Uuid::new_v4();
        let element = Element {
            id,
            layer_id,
            style,
            selected: false,
            locked: false,
            metadata: draft.metadata.unwrap_or_else(Metadata::new),
            geometry: draft.geometry,
        };
        log::debug!("Added {} {id} on layer {}", element.kind(), element.layer_id);
        self.elements.insert(id, element);
        self.order.push(id);
        id
    }

    /// Merge `patch` into an element. Returns false if `id` is unknown.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            log::trace!("update: no element {id}");
            return false;
        };
        if let Some(geometry) = patch.geometry {
            element.geometry = geometry;
        }
        if let Some(layer_id) = patch.layer_id {
            if self.layers.contains_key(&layer_id) {
                element.layer_id = layer_id;
            } else {
                log::warn!("update: ignoring unknown layer {layer_id} for {id}");
            }
        }
        if let Some(style) = patch.style {
            element.style = style;
        }
        if let Some(locked) = patch.locked {
            element.locked = locked;
        }
        if let Some(metadata) = patch.metadata {
            element.metadata = metadata;
        }
        true
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id)?;
        self.order.retain(|e| *e != id);
        self.selection.retain(|e| *e != id);
        log::debug!("Removed {} {id}", removed.kind());
        Some(removed)
    }

    pub fn remove_many(&mut self, ids: &[ElementId]) -> usize {
        ids.iter().filter(|id| self.remove(**id).is_some()).count()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements on visible layers, in insertion order.
    pub fn visible_elements(&self) -> Vec<&Element> {
        self.elements().filter(|e| self.layer_visible(&e.layer_id)).collect()
    }

    pub fn elements_by_layer(&self, layer_id: &LayerId) -> Vec<&Element> {
        self.elements().filter(|e| &e.layer_id == layer_id).collect()
    }

    pub fn elements_by_kind(&self, kind: ElementKind) -> Vec<&Element> {
        self.elements().filter(|e| e.kind() == kind).collect()
    }

    /// Visible, unlocked elements whose geometry touches `rect`.
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        self.elements()
            .filter(|e| self.is_selectable(e) && e.intersects_rect(rect))
            .map(|e| e.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // --- Selection ---

    /// Select an element. Locked or unknown elements are skipped.
    pub fn select(&mut self, id: ElementId) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            return false;
        };
        if element.locked {
            log::debug!("select: {id} is locked");
            return false;
        }
        element.selected = true;
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        true
    }

    pub fn select_many(&mut self, ids: &[ElementId]) -> usize {
        ids.iter().filter(|id| self.select(**id)).count()
    }

    pub fn deselect(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.selected = false;
        }
        self.selection.retain(|e| *e != id);
    }

    pub fn deselect_many(&mut self, ids: &[ElementId]) {
        for id in ids {
            self.deselect(*id);
        }
    }

    pub fn deselect_all(&mut self) {
        for id in std::mem::take(&mut self.selection) {
            if let Some(element) = self.elements.get_mut(&id) {
                element.selected = false;
            }
        }
    }

    /// Select every unlocked element on a visible layer.
    pub fn select_all(&mut self) -> usize {
        let ids: Vec<ElementId> = self
            .elements()
            .filter(|e| !e.locked && self.layer_visible(&e.layer_id))
            .map(|e| e.id)
            .collect();
        self.select_many(&ids)
    }

    /// Selected ids, in selection order.
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    fn is_selectable(&self, element: &Element) -> bool {
        !element.locked && self.layer_visible(&element.layer_id)
    }

    // --- Layers ---

    pub fn add_layer(&mut self, draft: LayerDraft) -> LayerId {
        let id = LayerId::generate();
        let order = draft
            .order
            .unwrap_or_else(|| self.layers.values().map(|l| l.order).max().unwrap_or(0) + 1);
        log::debug!("Added layer {id} ({})", draft.name);
        self.layers.insert(
            id.clone(),
            Layer {
                id: id.clone(),
                name: draft.name,
                visible: draft.visible,
                locked: draft.locked,
                color: draft.color,
                order,
            },
        );
        id
    }

    pub fn update_layer(&mut self, id: &LayerId, patch: LayerPatch) -> bool {
        let Some(layer) = self.layers.get_mut(id) else {
            return false;
        };
        if let Some(name) = patch.name {
            layer.name = name;
        }
        if let Some(visible) = patch.visible {
            layer.visible = visible;
        }
        if let Some(locked) = patch.locked {
            layer.locked = locked;
        }
        if let Some(color) = patch.color {
            layer.color = color;
        }
        if let Some(order) = patch.order {
            layer.order = order;
        }
        true
    }

    /// Remove a layer, moving its elements to the default layer. The default
    /// layer itself is never removed.
    pub fn remove_layer(&mut self, id: &LayerId) -> bool {
        if id.is_default() {
            log::debug!("remove_layer: refusing to remove the default layer");
            return false;
        }
        if self.layers.remove(id).is_none() {
            return false;
        }
        let default = LayerId::default_layer();
        for element in self.elements.values_mut().filter(|e| &e.layer_id == id) {
            element.layer_id = default.clone();
        }
        if &self.active_layer == id {
            self.active_layer = default;
        }
        log::debug!("Removed layer {id}");
        true
    }

    pub fn set_active_layer(&mut self, id: &LayerId) -> bool {
        if !self.layers.contains_key(id) {
            return false;
        }
        self.active_layer = id.clone();
        true
    }

    pub fn active_layer(&self) -> &LayerId {
        &self.active_layer
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Layers sorted by `order`, ties broken by id.
    pub fn layers(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.values().collect();
        layers.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        layers
    }

    fn layer_visible(&self, id: &LayerId) -> bool {
        self.layers.get(id).is_some_and(|l| l.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Circle, Line, LineType, Text};
    use kurbo::Point;
    use proptest::prelude::*;

    fn line_draft(x: f64) -> ElementDraft {
        ElementDraft::new(Line::new(Point::new(x, 0.0), Point::new(x + 1.0, 0.0)).unwrap())
    }

    #[test]
    fn test_add_applies_defaults() {
        let mut store = ElementStore::new();
        let id = store.add(line_draft(0.0));
        let e = store.get(id).unwrap();
        assert!(e.layer_id.is_default());
        assert!(!e.is_selected());
        assert!(!e.locked);
        assert!(e.metadata.is_empty());
        assert_eq!(e.style.stroke_color, Color::black());
        assert_eq!(e.style.line_type, LineType::Solid);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = ElementStore::new();
        let a = store.add(line_draft(0.0));
        store.remove(a);
        let b = store.add(line_draft(0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_style_follows_layer_color() {
        let mut store = ElementStore::new();
        let red = store.add_layer(LayerDraft::new("Red").with_color(Color::rgb(255, 0, 0)));
        store.set_active_layer(&red);
        let id = store.add(ElementDraft::new(Circle::new(Point::ORIGIN, 1.0).unwrap()));
        assert_eq!(store.get(id).unwrap().style.stroke_color, Color::rgb(255, 0, 0));

        let text = store.add(ElementDraft::new(Text::new(Point::ORIGIN, "hi").unwrap()));
        let style = &store.get(text).unwrap().style;
        assert_eq!(style.fill_color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(style.stroke_width, 0.0);
        assert!((style.fill_opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_layer_falls_back_to_active() {
        let mut store = ElementStore::new();
        let id = store.add(line_draft(0.0).with_layer(LayerId::new("ghost")));
        assert!(store.get(id).unwrap().layer_id.is_default());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = ElementStore::new();
        store.add(line_draft(0.0));
        assert!(!store.update(Uuid::new_v4(), ElementPatch::default()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = ElementStore::new();
        let id = store.add(line_draft(0.0));
        let patch = ElementPatch {
            locked: Some(true),
            ..Default::default()
        };
        assert!(store.update(id, patch));
        let e = store.get(id).unwrap();
        assert!(e.locked);
        assert_eq!(e.kind(), ElementKind::Line);
    }

    #[test]
    fn test_locked_element_not_selected() {
        let mut store = ElementStore::new();
        let id = store.add(line_draft(0.0));
        store.update(
            id,
            ElementPatch {
                locked: Some(true),
                ..Default::default()
            },
        );
        assert!(!store.select(id));
        assert!(store.selection().is_empty());
        // Deselect still succeeds
        store.deselect(id);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = ElementStore::new();
        let a = store.add(line_draft(0.0));
        let b = store.add(line_draft(5.0));
        store.select_many(&[a, b]);
        assert_eq!(store.remove_many(&[a]), 1);
        assert_eq!(store.selection(), &[b]);
    }

    #[test]
    fn test_select_all_skips_hidden_and_locked() {
        let mut store = ElementStore::new();
        let hidden = store.add_layer(LayerDraft::new("Hidden"));
        store.update_layer(
            &hidden,
            LayerPatch {
                visible: Some(false),
                ..Default::default()
            },
        );
        let visible = store.add(line_draft(0.0));
        let locked = store.add(line_draft(1.0));
        store.update(
            locked,
            ElementPatch {
                locked: Some(true),
                ..Default::default()
            },
        );
        store.add(line_draft(2.0).with_layer(hidden.clone()));

        assert_eq!(store.select_all(), 1);
        assert_eq!(store.selection(), &[visible]);
        assert_eq!(store.visible_elements().len(), 2);
    }

    #[test]
    fn test_default_layer_cannot_be_removed() {
        let mut store = ElementStore::new();
        assert!(!store.remove_layer(&LayerId::default_layer()));
        assert!(store.layer(&LayerId::default_layer()).is_some());
    }

    #[test]
    fn test_remove_layer_reparents_and_resets_active() {
        let mut store = ElementStore::new();
        let layer = store.add_layer(LayerDraft::new("Walls"));
        store.set_active_layer(&layer);
        let a = store.add(line_draft(0.0));
        let b = store.add(line_draft(1.0));

        assert!(store.remove_layer(&layer));
        assert!(store.layer(&layer).is_none());
        assert!(store.get(a).unwrap().layer_id.is_default());
        assert!(store.get(b).unwrap().layer_id.is_default());
        assert!(store.active_layer().is_default());
    }

    #[test]
    fn test_set_active_layer_unknown_is_noop() {
        let mut store = ElementStore::new();
        assert!(!store.set_active_layer(&LayerId::new("nope")));
        assert!(store.active_layer().is_default());
    }

    #[test]
    fn test_layers_sorted_by_order() {
        let mut store = ElementStore::new();
        let top = store.add_layer(LayerDraft::new("Top"));
        let mut bottom = LayerDraft::new("Bottom");
        bottom.order = Some(-1);
        let bottom = store.add_layer(bottom);
        let ids: Vec<_> = store.layers().iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, [bottom, LayerId::default_layer(), top]);
    }

    #[test]
    fn test_elements_in_rect_and_queries() {
        let mut store = ElementStore::new();
        let near = store.add(line_draft(0.0));
        store.add(line_draft(100.0));
        store.add(ElementDraft::new(Circle::new(Point::new(50.0, 50.0), 1.0).unwrap()));
        assert_eq!(store.elements_in_rect(Rect::new(-1.0, -1.0, 2.0, 1.0)), vec![near]);
        assert_eq!(store.elements_by_kind(ElementKind::Line).len(), 2);
        assert_eq!(store.elements_by_layer(&LayerId::default_layer()).len(), 3);
    }

    #[test]
    fn test_visible_enumeration_is_stable() {
        let mut store = ElementStore::new();
        for i in 0..20 {
            store.add(line_draft(i as f64));
        }
        let first: Vec<_> = store.visible_elements().iter().map(|e| e.id()).collect();
        let second: Vec<_> = store.visible_elements().iter().map(|e| e.id()).collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn remove_then_select_leaves_selection(count in 1usize..12, pick in 0usize..12, preselect in proptest::collection::vec(any::<bool>(), 12)) {
            let mut store = ElementStore::new();
            let ids: Vec<_> = (0..count).map(|i| store.add(line_draft(i as f64))).collect();
            for (id, sel) in ids.iter().zip(&preselect) {
                if *sel {
                    store.select(*id);
                }
            }
            let target = ids[pick % count];
            store.remove(target);
            let before = store.selection().to_vec();
            prop_assert!(!store.select(target));
            prop_assert!(store.get(target).is_none());
            prop_assert_eq!(store.selection(), before.as_slice());
        }

        #[test]
        fn removing_layer_reparents_everything(on_layer in 0usize..10, elsewhere in 0usize..10) {
            let mut store = ElementStore::new();
            let layer = store.add_layer(LayerDraft::new("Temp"));
            let moved: Vec<_> = (0..on_layer)
                .map(|i| store.add(line_draft(i as f64).with_layer(layer.clone())))
                .collect();
            for i in 0..elsewhere {
                store.add(line_draft(i as f64));
            }
            prop_assert!(store.remove_layer(&layer));
            prop_assert!(store.layer(&layer).is_none());
            for id in moved {
                prop_assert!(store.get(id).unwrap().layer_id.is_default());
            }
            prop_assert_eq!(store.len(), on_layer + elsewhere);
        }
    }
}
