//! In-memory host page model
//!
//! A self-contained implementation of the host-page collaborator traits,
//! backing the test suites and the CLI replay/resolve commands. Element rects
//! are stored in absolute document coordinates; [`DomQuery::bounding_rect`]
//! translates them into viewport space using the current scroll position, the
//! same frame of reference a real host reports.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::attorneys::AttorneyRecord;
use crate::dom::{CardHost, DomActions, DomQuery, ElementHandle, Rect, ScrollBehavior};
use crate::error::InteractError;

/// One recorded scroll request, in issue order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    rect: Rect,
    parent: Option<u64>,
    connected: bool,
    inline_transform: Option<String>,
    card_record: Option<AttorneyRecord>,
}

/// Simulated page: a flat element table with parent links, a viewport, and a
/// scroll position. Mutations issued through [`DomActions`] are recorded so
/// callers can assert on them after the fact.
#[derive(Debug)]
pub struct PageModel {
    elements: Vec<ElementData>,
    viewport: (f64, f64),
    scroll_y: f64,
    scroll_requests: Vec<ScrollRequest>,
    reflow_requests: Vec<ElementHandle>,
}

impl PageModel {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            elements: Vec::new(),
            viewport: (viewport_width, viewport_height),
            scroll_y: 0.0,
            scroll_requests: Vec::new(),
            reflow_requests: Vec::new(),
        }
    }

    /// Build the model from a JSON page description.
    pub fn from_json(json: &str) -> Result<Self, InteractError> {
        let spec: PageSpec = serde_json::from_str(json)?;
        let mut page = PageModel::new(spec.viewport.width, spec.viewport.height);
        page.scroll_y = spec.scroll_y;
        for element in spec.elements {
            page.insert_spec(element, None);
        }
        Ok(page)
    }

    fn insert_spec(&mut self, spec: ElementSpec, parent: Option<ElementHandle>) {
        let mut builder = self.element(&spec.tag);
        if let Some(id) = &spec.id {
            builder = builder.id(id);
        }
        for class in &spec.classes {
            builder = builder.class(class);
        }
        for (name, value) in &spec.attrs {
            builder = builder.attr(name, value);
        }
        if let Some([x, y, width, height]) = spec.rect {
            builder = builder.rect(Rect::new(x, y, width, height));
        }
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }
        let handle = builder.insert();
        for child in spec.children {
            self.insert_spec(child, Some(handle));
        }
    }

    /// Start building a new element with the given tag.
    pub fn element(&mut self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            page: self,
            data: ElementData {
                tag: tag.to_ascii_lowercase(),
                id: None,
                classes: Vec::new(),
                attrs: BTreeMap::new(),
                rect: Rect::default(),
                parent: None,
                connected: true,
                inline_transform: None,
                card_record: None,
            },
        }
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    /// Detach an element and its descendants from the document. Handles stay
    /// valid; queries report the subtree as disconnected.
    pub fn remove_element(&mut self, el: ElementHandle) {
        let mut detached = vec![el.0];
        while let Some(index) = detached.pop() {
            if let Some(data) = self.elements.get_mut(index as usize) {
                data.connected = false;
            }
            for (child, data) in self.elements.iter().enumerate() {
                if data.parent == Some(index) && data.connected {
                    detached.push(child as u64);
                }
            }
        }
    }

    /// Scroll requests issued so far, in order.
    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    /// Elements whose subtree layout was forcibly recomputed, in order.
    pub fn reflow_requests(&self) -> &[ElementHandle] {
        &self.reflow_requests
    }

    pub fn inline_transform(&self, el: ElementHandle) -> Option<String> {
        self.get(el).and_then(|data| data.inline_transform.clone())
    }

    /// Record pushed into a card through [`CardHost::populate`], if any.
    pub fn card_record(&self, el: ElementHandle) -> Option<&AttorneyRecord> {
        self.get(el).and_then(|data| data.card_record.as_ref())
    }

    fn get(&self, el: ElementHandle) -> Option<&ElementData> {
        self.elements.get(el.0 as usize)
    }

    fn get_connected_mut(&mut self, el: ElementHandle) -> Option<&mut ElementData> {
        self.elements
            .get_mut(el.0 as usize)
            .filter(|data| data.connected)
    }
}

/// Builder for one element; [`insert`](Self::insert) attaches it to the page.
#[derive(Debug)]
pub struct ElementBuilder<'a> {
    page: &'a mut PageModel,
    data: ElementData,
}

impl ElementBuilder<'_> {
    pub fn id(mut self, id: &str) -> Self {
        self.data.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.data.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.data.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Bounding rect in absolute document coordinates.
    pub fn rect(mut self, rect: Rect) -> Self {
        self.data.rect = rect;
        self
    }

    pub fn parent(mut self, parent: ElementHandle) -> Self {
        self.data.parent = Some(parent.0);
        self
    }

    pub fn insert(self) -> ElementHandle {
        let handle = ElementHandle(self.page.elements.len() as u64);
        self.page.elements.push(self.data);
        handle
    }
}

impl DomQuery for PageModel {
    fn document_order(&self) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, data)| data.connected)
            .map(|(index, _)| ElementHandle(index as u64))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementHandle> {
        let mut matches = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, data)| data.connected && data.id.as_deref() == Some(id));
        let (index, _) = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(ElementHandle(index as u64))
    }

    fn tag_name(&self, el: ElementHandle) -> Option<String> {
        self.get(el).map(|data| data.tag.clone())
    }

    fn has_class(&self, el: ElementHandle, class: &str) -> bool {
        self.get(el)
            .map(|data| data.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String> {
        self.get(el).and_then(|data| data.attrs.get(name).cloned())
    }

    fn parent(&self, el: ElementHandle) -> Option<ElementHandle> {
        self.get(el)
            .and_then(|data| data.parent)
            .map(ElementHandle)
    }

    fn is_connected(&self, el: ElementHandle) -> bool {
        self.get(el).map(|data| data.connected).unwrap_or(false)
    }

    fn bounding_rect(&self, el: ElementHandle) -> Option<Rect> {
        self.get(el).map(|data| {
            let mut rect = data.rect;
            rect.y -= self.scroll_y;
            rect
        })
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }
}

impl DomActions for PageModel {
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.push(ScrollRequest { top, behavior });
        // The model cannot scroll past the document origin.
        self.scroll_y = top.max(0.0);
    }

    fn add_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(data) = self.get_connected_mut(el) {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(data) = self.get_connected_mut(el) {
            data.classes.retain(|c| c != class);
        }
    }

    fn set_inline_transform(&mut self, el: ElementHandle, value: &str) {
        if let Some(data) = self.get_connected_mut(el) {
            data.inline_transform = Some(value.to_string());
        }
    }

    fn clear_inline_transform(&mut self, el: ElementHandle) {
        if let Some(data) = self.get_connected_mut(el) {
            data.inline_transform = None;
        }
    }

    fn force_reflow(&mut self, el: ElementHandle) {
        if self.is_connected(el) {
            self.reflow_requests.push(el);
        }
    }
}

impl CardHost for PageModel {
    fn populate(&mut self, card: ElementHandle, record: &AttorneyRecord) {
        if let Some(data) = self.get_connected_mut(card) {
            data.card_record = Some(record.clone());
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageSpec {
    viewport: ViewportSpec,
    #[serde(default)]
    scroll_y: f64,
    #[serde(default)]
    elements: Vec<ElementSpec>,
}

#[derive(Debug, Deserialize)]
struct ViewportSpec {
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct ElementSpec {
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    rect: Option<[f64; 4]>,
    #[serde(default)]
    children: Vec<ElementSpec>,
}
