//! In-memory host for headless runs and tests: a scrollable page of
//! rectangles, a frame-request counter, and a scene that records indicators.

use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::traits::{Document, Element, FrameScheduler, SceneGraph};
use crate::types::{Indicator, IndicatorId, Rect, ReferenceMarker};

/// Scrollable page with a selector table
pub struct SimDocument {
    viewport: Cell<Vec2>,
    scroll: Rc<Cell<f32>>,
    elements: RefCell<BTreeMap<String, Rc<SimElement>>>,
    listening: Cell<bool>,
    marker: Cell<Option<ReferenceMarker>>,
}

impl SimDocument {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport: Cell::new(viewport),
            scroll: Rc::new(Cell::new(0.0)),
            elements: RefCell::new(BTreeMap::new()),
            listening: Cell::new(false),
            marker: Cell::new(None),
        }
    }

    /// Add an element that scrolls with the page; `page_rect` is in page coordinates
    pub fn add_element(&self, selector: &str, page_rect: Rect) -> Rc<SimElement> {
        self.insert(selector, page_rect, false)
    }

    /// Add an element pinned to the viewport (e.g. the render surface)
    pub fn add_fixed_element(&self, selector: &str, rect: Rect) -> Rc<SimElement> {
        self.insert(selector, rect, true)
    }

    fn insert(&self, selector: &str, rect: Rect, fixed: bool) -> Rc<SimElement> {
        let element = Rc::new(SimElement {
            rect: Cell::new(rect),
            fixed,
            scroll: Rc::clone(&self.scroll),
            connected: Cell::new(true),
            highlighted: Cell::new(false),
        });
        self.elements
            .borrow_mut()
            .insert(selector.to_string(), Rc::clone(&element));
        element
    }

    /// Detach an element from the page; returns it if it was present
    pub fn remove_element(&self, selector: &str) -> Option<Rc<SimElement>> {
        let element = self.elements.borrow_mut().remove(selector)?;
        element.connected.set(false);
        Some(element)
    }

    pub fn element(&self, selector: &str) -> Option<Rc<SimElement>> {
        self.elements.borrow().get(selector).cloned()
    }

    pub fn set_scroll(&self, scroll_y: f32) {
        self.scroll.set(scroll_y);
    }

    pub fn scroll(&self) -> f32 {
        self.scroll.get()
    }

    pub fn set_viewport_size(&self, size: Vec2) {
        self.viewport.set(size);
    }

    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    pub fn reference_marker(&self) -> Option<ReferenceMarker> {
        self.marker.get()
    }
}

impl Document for SimDocument {
    fn query_selector(&self, selector: &str) -> Option<Rc<dyn Element>> {
        self.element(selector).map(|element| element as Rc<dyn Element>)
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport.get()
    }

    fn set_scroll_listening(&self, listening: bool) {
        self.listening.set(listening);
    }

    fn set_reference_marker(&self, marker: Option<ReferenceMarker>) {
        self.marker.set(marker);
    }
}

pub struct SimElement {
    rect: Cell<Rect>,
    fixed: bool,
    scroll: Rc<Cell<f32>>,
    connected: Cell<bool>,
    highlighted: Cell<bool>,
}

impl SimElement {
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.get()
    }
}

impl Element for SimElement {
    fn bounding_rect(&self) -> Rect {
        let rect = self.rect.get();
        if self.fixed {
            rect
        } else {
            rect.translated(Vec2::new(0.0, -self.scroll.get()))
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn set_highlighted(&self, highlighted: bool) {
        self.highlighted.set(highlighted);
    }
}

/// Counts frame requests; the caller drives frames explicitly
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requests: Cell<u32>,
}

impl ManualScheduler {
    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// Scene that keeps the indicators currently added to it
#[derive(Debug, Default)]
pub struct RecordingScene {
    indicators: BTreeMap<IndicatorId, Indicator>,
    pub adds: u32,
    pub removes: u32,
}

impl RecordingScene {
    pub fn get(&self, id: IndicatorId) -> Option<&Indicator> {
        self.indicators.get(&id)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

impl SceneGraph for RecordingScene {
    fn add_indicator(&mut self, id: IndicatorId, indicator: &Indicator) {
        self.adds += 1;
        self.indicators.insert(id, *indicator);
    }

    fn update_indicator(&mut self, id: IndicatorId, indicator: &Indicator) {
        if let Some(existing) = self.indicators.get_mut(&id) {
            *existing = *indicator;
        }
    }

    fn remove_indicator(&mut self, id: IndicatorId) {
        if self.indicators.remove(&id).is_some() {
            self.removes += 1;
        }
    }
}
