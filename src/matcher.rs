//! Target classification matchers
//!
//! The router classifies a click by walking the ancestor chain of the
//! originating element against typed matchers, instead of relying on a
//! platform's event-bubbling semantics. A [`Matcher`] is the small subset of
//! selector predicates the interaction layer actually needs: tag name, class
//! membership, attribute presence, and attribute value prefix.

use crate::dom::{DomQuery, ElementHandle};

/// Predicate on an attribute value.
#[derive(Debug, Clone)]
enum AttrPredicate {
    Present,
    StartsWith(String),
}

/// Conjunction of element predicates.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    tag: Option<String>,
    class: Option<String>,
    attr: Option<(String, AttrPredicate)>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_ascii_lowercase());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn attr_present(mut self, name: &str) -> Self {
        self.attr = Some((name.to_string(), AttrPredicate::Present));
        self
    }

    pub fn attr_starts_with(mut self, name: &str, prefix: &str) -> Self {
        self.attr = Some((
            name.to_string(),
            AttrPredicate::StartsWith(prefix.to_string()),
        ));
        self
    }

    /// Whether the element itself satisfies every predicate.
    pub fn matches(&self, dom: &dyn DomQuery, el: ElementHandle) -> bool {
        if let Some(tag) = &self.tag {
            match dom.tag_name(el) {
                Some(name) if &name == tag => {}
                _ => return false,
            }
        }

        if let Some(class) = &self.class {
            if !dom.has_class(el, class) {
                return false;
            }
        }

        if let Some((name, predicate)) = &self.attr {
            match (dom.attribute(el, name), predicate) {
                (Some(_), AttrPredicate::Present) => {}
                (Some(value), AttrPredicate::StartsWith(prefix)) => {
                    if !value.starts_with(prefix.as_str()) {
                        return false;
                    }
                }
                (None, _) => return false,
            }
        }

        true
    }

    /// Nearest matching element starting from `el` and walking up the
    /// ancestor chain, mirroring `Element::closest`.
    pub fn closest(&self, dom: &dyn DomQuery, el: ElementHandle) -> Option<ElementHandle> {
        let mut current = Some(el);
        while let Some(candidate) = current {
            if self.matches(dom, candidate) {
                return Some(candidate);
            }
            current = dom.parent(candidate);
        }
        None
    }

    /// First matching element in document order.
    pub fn first_match(&self, dom: &dyn DomQuery) -> Option<ElementHandle> {
        dom.document_order()
            .into_iter()
            .find(|&el| self.matches(dom, el))
    }
}
