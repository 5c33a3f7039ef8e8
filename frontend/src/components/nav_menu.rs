use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

/// Open/closed state of the mobile navigation menu.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns whether anything changed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

pub struct NavAnchors {
    pub toggle: Element,
    pub menu: Element,
    pub links: Vec<Element>,
    pub body: Option<HtmlElement>,
}

impl NavAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let (Some(toggle), Some(menu)) = (
            document.get_element_by_id("navToggle"),
            document.get_element_by_id("navMenu"),
        ) else {
            return Ok(None);
        };
        Ok(Some(Self {
            toggle,
            menu,
            links: dom::query_all(document, ".nav-link")?,
            body: document.body(),
        }))
    }
}

struct MenuView {
    toggle: Element,
    menu: Element,
    body: Option<HtmlElement>,
    state: Cell<MenuState>,
}

impl MenuView {
    fn render(&self) {
        let open = self.state.get().is_open();
        dom::set_class(&self.toggle, "active", open);
        dom::set_class(&self.menu, "active", open);
        if let Some(body) = &self.body {
            dom::set_style(body, "overflow", if open { "hidden" } else { "" });
        }
    }

    fn toggle(&self) {
        let mut state = self.state.get();
        state.toggle();
        self.state.set(state);
        self.render();
    }

    fn close(&self) {
        let mut state = self.state.get();
        if state.close() {
            self.state.set(state);
            self.render();
        }
    }

    fn contains(&self, node: &Node) -> bool {
        self.menu.contains(Some(node)) || self.toggle.contains(Some(node))
    }
}

/// Mobile menu toggle. Locks page scroll while open.
pub struct NavMenu {
    _listeners: Vec<Listener>,
}

impl NavMenu {
    pub fn new(document: &Document, anchors: NavAnchors) -> Result<Self, SiteError> {
        let view = Rc::new(MenuView {
            toggle: anchors.toggle,
            menu: anchors.menu,
            body: anchors.body,
            state: Cell::new(MenuState::default()),
        });

        let mut listeners = Vec::with_capacity(anchors.links.len() + 2);
        listeners.push(Listener::new(&view.toggle, "click", {
            let view = view.clone();
            move |_| view.toggle()
        })?);

        for link in &anchors.links {
            listeners.push(Listener::new(link, "click", {
                let view = view.clone();
                move |_| view.close()
            })?);
        }

        listeners.push(Listener::new(document, "click", {
            let view = view.clone();
            move |e| {
                let inside = e
                    .target()
                    .and_then(|target| target.dyn_into::<Node>().ok())
                    .map(|node| view.contains(&node))
                    .unwrap_or(false);
                if !inside {
                    view.close();
                }
            }
        })?);

        Ok(Self { _listeners: listeners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state() {
        let mut state = MenuState::default();
        assert!(!state.is_open());
        assert!(state.toggle());
        assert!(!state.toggle());
    }

    #[test]
    fn test_close_reports_change_only_when_open() {
        let mut state = MenuState::default();
        assert!(!state.close());
        state.toggle();
        assert!(state.close());
        assert!(!state.is_open());
    }
}
