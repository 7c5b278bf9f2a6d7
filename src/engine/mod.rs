//! # Layout Engine
//!
//! The single owner of a layout aggregate and its selection. Every change
//! goes through a method here, which validates it, applies it completely or
//! not at all, and then notifies subscribers.
//!
//! Placement rules:
//! - a move or resize must stay inside the grid,
//! - must not overlap any *other* element (shared edges are fine),
//! - and must actually change something.
//!
//! A rejected command returns `false` and emits nothing.

pub mod events;

pub use events::{LayoutEvent, LayoutObserver, SubscriptionId};

use serde::Serialize;
use uuid::Uuid;

use crate::error::PageGridError;
use crate::grid::page_dimensions;
use crate::model::{
    element_templates, ElementKind, ElementStyles, ElementTemplate, FitMode, GridConfig,
    GridPosition, Layout, LayoutElement, PageSize, TextAlign,
};
use events::ObserverRegistry;

/// One updatable attribute of an element. `None` clears the attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementUpdate {
    Content(Option<String>),
    Src(Option<String>),
    Fit(Option<FitMode>),
    Color(Option<String>),
    FontSize(Option<String>),
    FontWeight(Option<String>),
    TextAlign(Option<TextAlign>),
    LineHeight(Option<f64>),
    BackgroundColor(Option<String>),
    Padding(Option<String>),
    Border(Option<String>),
    BorderWidth(Option<String>),
    BorderColor(Option<String>),
    BorderRadius(Option<String>),
}

/// Rounded page size for display next to the grid settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEstimate {
    pub width: String,
    pub height: String,
    pub elements: usize,
}

/// Owns a [`Layout`] and the current selection.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    layout: Layout,
    selected: Option<String>,
    observers: ObserverRegistry,
}

impl LayoutEngine {
    /// An engine holding the default 12x8 A4 layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine holding `layout`, validated first.
    pub fn with_layout(layout: Layout) -> Result<Self, PageGridError> {
        layout.validate().map_err(PageGridError::InvalidLayout)?;
        Ok(Self {
            layout,
            ..Self::default()
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// An owned copy of the current layout, e.g. for export.
    pub fn snapshot(&self) -> Layout {
        self.layout.clone()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected element, if the selection names one that exists.
    pub fn selected_element(&self) -> Option<&LayoutElement> {
        self.selected.as_deref().and_then(|id| self.layout.element(id))
    }

    /// The palette catalog.
    pub fn templates(&self) -> Vec<ElementTemplate> {
        element_templates()
    }

    pub fn subscribe(&mut self, observer: Box<dyn LayoutObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn layout_changed(&mut self) {
        self.observers.emit(LayoutEvent::LayoutChanged, &self.layout);
    }

    fn selection_changed(&mut self) {
        let event = LayoutEvent::SelectionChanged(self.selected.clone());
        self.observers.emit(event, &self.layout);
    }

    // ── Element commands ────────────────────────────────────────

    /// Drop a new 1x1 element built from `template` at (row, col).
    ///
    /// Placement is not checked against the grid or other elements; the
    /// drop target is trusted to be a free cell.
    pub fn place(&mut self, template: &ElementTemplate, row: u32, col: u32) -> LayoutElement {
        let mut element = LayoutElement {
            id: new_element_id(),
            kind: template.kind,
            grid_position: GridPosition::cell(row, col),
            content: template.default_content.map(str::to_string),
            src: None,
            fit: None,
            styles: template.default_styles.clone(),
        };
        if template.kind == ElementKind::Image {
            element.src = Some(String::new());
            element.fit = Some(FitMode::Cover);
        }

        log::debug!("placed {} '{}' at ({}, {})", template.label, element.id, row, col);
        self.layout.elements.push(element.clone());
        self.layout_changed();
        element
    }

    /// Move an element so its top-left cell is (row, col), keeping its span.
    pub fn move_element(&mut self, id: &str, row: u32, col: u32) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let current = self.layout.elements[index].grid_position;
        let Some(target) =
            GridPosition::checked_spanning(row, col, current.col_span(), current.row_span())
        else {
            log::debug!("rejecting move of '{}' to ({}, {}): out of range", id, row, col);
            return false;
        };
        self.reposition(index, target)
    }

    /// Resize an element from its current top-left cell. Spans below 1
    /// become 1.
    pub fn resize_element(&mut self, id: &str, col_span: u32, row_span: u32) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let current = self.layout.elements[index].grid_position;
        let Some(target) = GridPosition::checked_spanning(
            current.start_row,
            current.start_col,
            col_span.max(1),
            row_span.max(1),
        ) else {
            log::debug!("rejecting resize of '{}' to {}x{}: out of range", id, col_span, row_span);
            return false;
        };
        self.reposition(index, target)
    }

    fn reposition(&mut self, index: usize, target: GridPosition) -> bool {
        let element = &self.layout.elements[index];
        if element.grid_position == target {
            return false;
        }
        if !target.fits_within(&self.layout.grid) {
            log::debug!("rejecting {:?} for '{}': outside grid", target, element.id);
            return false;
        }
        if self.collides(&target, Some(index)) {
            log::debug!("rejecting {:?} for '{}': overlap", target, element.id);
            return false;
        }
        self.layout.elements[index].grid_position = target;
        self.layout_changed();
        true
    }

    /// Whether `target` overlaps any element other than `skip`.
    pub fn collides(&self, target: &GridPosition, skip: Option<usize>) -> bool {
        self.layout
            .elements
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, other)| other.grid_position.overlaps(target))
    }

    /// Remove an element. Clears the selection if it pointed at it.
    pub fn remove_element(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.layout.elements.remove(index);
        self.layout_changed();
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            self.selection_changed();
        }
        true
    }

    /// Set or clear the selection. The id is not checked against the
    /// element set.
    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
        self.selection_changed();
    }

    /// Change one attribute of an element in place.
    pub fn update_element(&mut self, id: &str, update: ElementUpdate) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let element = &mut self.layout.elements[index];
        match update {
            ElementUpdate::Content(v) => element.content = v,
            ElementUpdate::Src(v) => element.src = v,
            ElementUpdate::Fit(v) => element.fit = v,
            ElementUpdate::Color(v) => styles_mut(element).color = v,
            ElementUpdate::FontSize(v) => styles_mut(element).font_size = v,
            ElementUpdate::FontWeight(v) => styles_mut(element).font_weight = v,
            ElementUpdate::TextAlign(v) => styles_mut(element).text_align = v,
            ElementUpdate::LineHeight(v) => styles_mut(element).line_height = v,
            ElementUpdate::BackgroundColor(v) => styles_mut(element).background_color = v,
            ElementUpdate::Padding(v) => styles_mut(element).padding = v,
            ElementUpdate::Border(v) => styles_mut(element).border = v,
            ElementUpdate::BorderWidth(v) => styles_mut(element).border_width = v,
            ElementUpdate::BorderColor(v) => styles_mut(element).border_color = v,
            ElementUpdate::BorderRadius(v) => styles_mut(element).border_radius = v,
        }
        self.layout_changed();
        true
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.layout.elements.iter().position(|e| e.id == id)
    }

    // ── Grid commands ───────────────────────────────────────────

    /// Change the column count. Rejected when out of range or when an
    /// element would end up outside the grid.
    pub fn set_columns(&mut self, columns: u32) -> bool {
        let grid = GridConfig {
            columns,
            ..self.layout.grid.clone()
        };
        self.set_grid(grid)
    }

    pub fn set_rows(&mut self, rows: u32) -> bool {
        let grid = GridConfig {
            rows,
            ..self.layout.grid.clone()
        };
        self.set_grid(grid)
    }

    /// Gap between cells in pixels, 0..=50.
    pub fn set_gap(&mut self, gap: u32) -> bool {
        let grid = GridConfig {
            gap,
            ..self.layout.grid.clone()
        };
        self.set_grid(grid)
    }

    /// Apply a preset page size. `Custom` keeps the current dimensions and
    /// returns `false`.
    pub fn set_page_size(&mut self, size: PageSize) -> bool {
        if size == PageSize::Custom {
            return false;
        }
        let (width, height) = size.lengths();
        self.apply_page_lengths(width, height)
    }

    /// Set free-form page lengths such as `"200mm"`. Both must start with a
    /// positive number.
    pub fn set_custom_page(&mut self, width: &str, height: &str) -> bool {
        let positive = |s: &str| {
            crate::units::parse_length_prefix(s)
                .map(|v| v > 0.0)
                .unwrap_or(false)
        };
        if !positive(width) || !positive(height) {
            return false;
        }
        self.apply_page_lengths(width.trim(), height.trim())
    }

    fn apply_page_lengths(&mut self, width: &str, height: &str) -> bool {
        let page = &mut self.layout.grid.page;
        if page.width == width && page.height == height {
            return false;
        }
        page.width = width.to_string();
        page.height = height.to_string();
        self.layout_changed();
        true
    }

    pub fn toggle_orientation(&mut self) {
        let page = &mut self.layout.grid.page;
        page.orientation = page.orientation.toggled();
        self.layout_changed();
    }

    /// Replace the whole grid configuration, all or nothing.
    pub fn set_grid(&mut self, grid: GridConfig) -> bool {
        if grid == self.layout.grid {
            return false;
        }
        if let Err(reason) = grid.validate() {
            log::debug!("rejecting grid change: {}", reason);
            return false;
        }
        if let Some(outside) = self
            .layout
            .elements
            .iter()
            .find(|e| !e.grid_position.fits_within(&grid))
        {
            log::debug!(
                "rejecting grid change: '{}' would fall outside a {}x{} grid",
                outside.id,
                grid.columns,
                grid.rows
            );
            return false;
        }
        self.layout.grid = grid;
        self.layout_changed();
        true
    }

    // ── Whole-layout commands ───────────────────────────────────

    /// Back to the default empty layout.
    pub fn reset(&mut self) {
        self.layout = Layout::default();
        self.selected = None;
        self.layout_changed();
        self.selection_changed();
    }

    /// Replace the layout after validating it. Clears the selection.
    pub fn load_layout(&mut self, layout: Layout) -> Result<(), PageGridError> {
        layout.validate().map_err(PageGridError::InvalidLayout)?;
        log::info!(
            "loaded layout: {}x{} grid, {} element(s)",
            layout.grid.columns,
            layout.grid.rows,
            layout.elements.len()
        );
        self.layout = layout;
        self.selected = None;
        self.layout_changed();
        self.selection_changed();
        Ok(())
    }

    pub fn load_layout_json(&mut self, json: &str) -> Result<(), PageGridError> {
        let layout: Layout = serde_json::from_str(json)?;
        self.load_layout(layout)
    }

    /// The layout as pretty-printed JSON.
    pub fn export_layout_json(&self) -> Result<String, PageGridError> {
        Ok(serde_json::to_string_pretty(&self.layout)?)
    }

    /// Page size in whole points plus the element count.
    pub fn estimate_page_size(&self) -> PageEstimate {
        let page = page_dimensions(&self.layout.grid.page);
        PageEstimate {
            width: format!("{}pt", page.width.round()),
            height: format!("{}pt", page.height.round()),
            elements: self.layout.elements.len(),
        }
    }
}

fn styles_mut(element: &mut LayoutElement) -> &mut ElementStyles {
    element.styles.get_or_insert_with(ElementStyles::default)
}

fn new_element_id() -> String {
    format!("element-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Orientation;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn text_template() -> ElementTemplate {
        element_templates().remove(0)
    }

    fn image_template() -> ElementTemplate {
        element_templates().remove(1)
    }

    fn recorder(engine: &mut LayoutEngine) -> Rc<RefCell<Vec<LayoutEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(Box::new(move |e: &LayoutEvent, _: &Layout| {
            sink.borrow_mut().push(e.clone());
        }));
        events
    }

    #[test]
    fn test_place_text_uses_template() {
        let mut engine = LayoutEngine::new();
        let el = engine.place(&text_template(), 2, 3);
        assert!(el.id.starts_with("element-"));
        assert_eq!(el.grid_position, GridPosition::cell(2, 3));
        assert_eq!(el.content.as_deref(), Some("<p>Click to edit text</p>"));
        assert_eq!(
            el.styles.as_ref().unwrap().font_size.as_deref(),
            Some("14px")
        );
        assert_eq!(engine.layout().elements.len(), 1);
    }

    #[test]
    fn test_place_image_defaults() {
        let mut engine = LayoutEngine::new();
        let el = engine.place(&image_template(), 1, 1);
        assert_eq!(el.src.as_deref(), Some(""));
        assert_eq!(el.fit, Some(FitMode::Cover));
        assert!(el.content.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        let b = engine.place(&text_template(), 1, 2);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_move_rules() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        let b = engine.place(&text_template(), 1, 3);

        assert!(!engine.move_element(&a.id, 1, 1), "same position");
        assert!(!engine.move_element(&a.id, 1, 3), "onto b");
        assert!(!engine.move_element(&a.id, 9, 1), "below the grid");
        assert!(!engine.move_element(&a.id, 1, 13), "right of the grid");
        assert!(!engine.move_element("nope", 2, 2), "unknown id");
        assert!(engine.move_element(&a.id, 1, 2), "touching b is fine");
        assert!(engine.move_element(&b.id, 8, 12));
        assert_eq!(
            engine.layout().element(&b.id).unwrap().grid_position,
            GridPosition::cell(8, 12)
        );
    }

    #[test]
    fn test_far_out_of_range_commands_are_rejected() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 2, 2);
        let events = recorder(&mut engine);
        let before = engine.snapshot();

        assert!(!engine.move_element(&a.id, u32::MAX, 1));
        assert!(!engine.move_element(&a.id, 1, u32::MAX));
        assert!(!engine.move_element(&a.id, u32::MAX, u32::MAX));
        assert!(!engine.resize_element(&a.id, u32::MAX, 1));
        assert!(!engine.resize_element(&a.id, 1, u32::MAX));
        assert!(!engine.resize_element(&a.id, u32::MAX - 1, u32::MAX - 1));

        assert_eq!(engine.layout(), &before);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_place_at_far_cell_does_not_overflow() {
        let mut engine = LayoutEngine::new();
        let el = engine.place(&text_template(), u32::MAX, u32::MAX);
        assert!(!el.grid_position.fits_within(&engine.layout().grid));
        assert!(!engine.move_element(&el.id, u32::MAX, u32::MAX));
    }

    #[test]
    fn test_move_keeps_span() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        assert!(engine.resize_element(&a.id, 3, 2));
        assert!(engine.move_element(&a.id, 4, 5));
        let pos = engine.layout().element(&a.id).unwrap().grid_position;
        assert_eq!(pos, GridPosition::spanning(4, 5, 3, 2));
        // A 3-wide element cannot start in column 11 of 12.
        assert!(!engine.move_element(&a.id, 1, 11));
    }

    #[test]
    fn test_resize_rules() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        engine.place(&text_template(), 1, 4);

        assert!(!engine.resize_element(&a.id, 1, 1), "unchanged");
        assert!(!engine.resize_element(&a.id, 4, 1), "would cover the neighbour");
        assert!(!engine.resize_element(&a.id, 1, 9), "taller than the grid");
        assert!(engine.resize_element(&a.id, 3, 8));
        // Zero spans clamp to one.
        assert!(engine.resize_element(&a.id, 0, 0));
        assert_eq!(
            engine.layout().element(&a.id).unwrap().grid_position,
            GridPosition::cell(1, 1)
        );
    }

    #[test]
    fn test_rejected_commands_emit_nothing() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        let events = recorder(&mut engine);
        let before = engine.snapshot();
        assert!(!engine.move_element(&a.id, 1, 1));
        assert!(!engine.resize_element(&a.id, 20, 1));
        assert!(!engine.remove_element("missing"));
        assert!(!engine.set_columns(25));
        assert!(events.borrow().is_empty());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_remove_clears_selection_only_for_selected() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        let b = engine.place(&text_template(), 2, 1);
        engine.select(Some(a.id.clone()));

        assert!(engine.remove_element(&b.id));
        assert_eq!(engine.selected_id(), Some(a.id.as_str()));

        let events = recorder(&mut engine);
        assert!(engine.remove_element(&a.id));
        assert_eq!(engine.selected_id(), None);
        assert_eq!(
            *events.borrow(),
            vec![LayoutEvent::LayoutChanged, LayoutEvent::SelectionChanged(None)]
        );
    }

    #[test]
    fn test_select_is_not_validated() {
        let mut engine = LayoutEngine::new();
        engine.select(Some("ghost".to_string()));
        assert_eq!(engine.selected_id(), Some("ghost"));
        assert!(engine.selected_element().is_none());
    }

    #[test]
    fn test_update_element() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        assert!(engine.update_element(&a.id, ElementUpdate::Content(Some("<p>Hi</p>".into()))));
        assert!(engine.update_element(
            &a.id,
            ElementUpdate::BackgroundColor(Some("#ff0000".into()))
        ));
        assert!(engine.update_element(&a.id, ElementUpdate::FontSize(None)));
        assert!(!engine.update_element("missing", ElementUpdate::Src(None)));

        let el = engine.layout().element(&a.id).unwrap();
        assert_eq!(el.content.as_deref(), Some("<p>Hi</p>"));
        let styles = el.styles.as_ref().unwrap();
        assert_eq!(styles.background_color.as_deref(), Some("#ff0000"));
        assert!(styles.font_size.is_none());
        assert_eq!(styles.color.as_deref(), Some("#333333"));
    }

    #[test]
    fn test_grid_bounds_enforced() {
        let mut engine = LayoutEngine::new();
        assert!(!engine.set_columns(0));
        assert!(!engine.set_columns(25));
        assert!(engine.set_columns(24));
        assert!(!engine.set_rows(30));
        assert!(engine.set_rows(1));
        assert!(!engine.set_gap(51));
        assert!(engine.set_gap(0));
        assert_eq!(engine.layout().grid.columns, 24);
        assert_eq!(engine.layout().grid.rows, 1);
    }

    #[test]
    fn test_shrinking_grid_cannot_orphan_elements() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 10);
        assert!(!engine.set_columns(9));
        assert!(engine.set_columns(10));
        assert!(engine.layout().element(&a.id).is_some());
    }

    #[test]
    fn test_page_size_and_orientation() {
        let mut engine = LayoutEngine::new();
        assert!(engine.set_page_size(PageSize::Letter));
        assert_eq!(engine.layout().grid.page.width, "8.5in");
        assert!(!engine.set_page_size(PageSize::Letter));
        assert!(!engine.set_page_size(PageSize::Custom));
        assert!(engine.set_custom_page("100mm", "150mm"));
        assert!(!engine.set_custom_page("wide", "150mm"));
        engine.toggle_orientation();
        assert_eq!(engine.layout().grid.page.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_estimate_page_size() {
        let mut engine = LayoutEngine::new();
        engine.place(&text_template(), 1, 1);
        let est = engine.estimate_page_size();
        assert_eq!(est.width, "595pt");
        assert_eq!(est.height, "842pt");
        assert_eq!(est.elements, 1);
    }

    #[test]
    fn test_json_round_trip_and_load_clears_selection() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        engine.place(&image_template(), 2, 2);
        engine.select(Some(a.id.clone()));
        let json = engine.export_layout_json().unwrap();

        let mut other = LayoutEngine::new();
        other.select(Some("x".to_string()));
        other.load_layout_json(&json).unwrap();
        assert_eq!(other.snapshot(), engine.snapshot());
        assert_eq!(other.selected_id(), None);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut engine = LayoutEngine::new();
        assert!(matches!(
            engine.load_layout_json("{ not json"),
            Err(PageGridError::Parse { .. })
        ));
        let mut bad = Layout::default();
        bad.grid.gap = 80;
        assert!(matches!(
            engine.load_layout(bad),
            Err(PageGridError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_reset() {
        let mut engine = LayoutEngine::new();
        let a = engine.place(&text_template(), 1, 1);
        engine.select(Some(a.id));
        engine.set_columns(6);
        engine.reset();
        assert_eq!(engine.snapshot(), Layout::default());
        assert!(engine.selected_id().is_none());
    }
}
