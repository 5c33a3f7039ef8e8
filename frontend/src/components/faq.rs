use std::cell::Cell;
use std::rc::Rc;

use web_sys::{Document, Element};

use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

/// Single-open accordion over `len` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accordion {
    open: Option<usize>,
    len: usize,
}

impl Accordion {
    pub fn new(len: usize) -> Self {
        Self { open: None, len }
    }

    /// Start with `open` already expanded, as rendered by the markup.
    pub fn with_open(len: usize, open: Option<usize>) -> Self {
        Self {
            open: open.filter(|item| *item < len),
            len,
        }
    }

    pub fn open_item(self) -> Option<usize> {
        self.open
    }

    pub fn is_open(self, item: usize) -> bool {
        self.open == Some(item)
    }

    /// Close `item` if it is open, otherwise make it the only open item.
    pub fn toggle(&mut self, item: usize) -> Option<usize> {
        if item >= self.len {
            return self.open;
        }
        self.open = if self.open == Some(item) { None } else { Some(item) };
        self.open
    }
}

pub struct FaqAnchors {
    /// Each item paired with its clickable question region.
    pub items: Vec<(Element, Element)>,
}

impl FaqAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let mut items = Vec::new();
        for item in dom::query_all(document, ".faq-item")? {
            match item.query_selector(".faq-question")? {
                Some(question) => items.push((item, question)),
                None => log::warn!("FAQ item without a question, skipping"),
            }
        }
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { items }))
    }
}

struct FaqView {
    items: Vec<Element>,
    state: Cell<Accordion>,
}

impl FaqView {
    fn toggle(&self, index: usize) {
        let mut state = self.state.get();
        state.toggle(index);
        self.state.set(state);
        for (i, item) in self.items.iter().enumerate() {
            dom::set_class(item, "active", state.is_open(i));
        }
    }
}

pub struct Faq {
    _listeners: Vec<Listener>,
}

impl Faq {
    pub fn new(anchors: FaqAnchors) -> Result<Self, SiteError> {
        let (items, questions): (Vec<Element>, Vec<Element>) = anchors.items.into_iter().unzip();
        let rendered_open = items.iter().position(|item| item.class_list().contains("active"));
        let view = Rc::new(FaqView {
            state: Cell::new(Accordion::with_open(items.len(), rendered_open)),
            items,
        });

        let listeners = questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let view = view.clone();
                Listener::new(question, "click", move |_| view.toggle(i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { _listeners: listeners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_count(accordion: Accordion, len: usize) -> usize {
        (0..len).filter(|i| accordion.is_open(*i)).count()
    }

    #[test]
    fn test_opening_one_closes_others() {
        let mut accordion = Accordion::new(4);
        accordion.toggle(1);
        accordion.toggle(3);
        assert_eq!(accordion.open_item(), Some(3));
        assert_eq!(open_count(accordion, 4), 1);
    }

    #[test]
    fn test_toggling_open_item_closes_everything() {
        let mut accordion = Accordion::new(4);
        accordion.toggle(2);
        assert!(accordion.is_open(2));
        assert_eq!(accordion.toggle(2), None);
        assert_eq!(open_count(accordion, 4), 0);
    }

    #[test]
    fn test_item_open_in_markup_closes_on_first_click() {
        let mut accordion = Accordion::with_open(3, Some(0));
        assert!(accordion.is_open(0));
        assert_eq!(accordion.toggle(0), None);
        assert_eq!(open_count(accordion, 3), 0);
    }

    #[test]
    fn test_item_open_in_markup_closes_when_another_opens() {
        let mut accordion = Accordion::with_open(3, Some(0));
        assert_eq!(accordion.toggle(2), Some(2));
        assert!(!accordion.is_open(0));
    }

    #[test]
    fn test_out_of_range_seed_starts_closed() {
        assert_eq!(Accordion::with_open(2, Some(4)).open_item(), None);
    }

    #[test]
    fn test_out_of_range_toggle_is_ignored() {
        let mut accordion = Accordion::new(2);
        accordion.toggle(0);
        assert_eq!(accordion.toggle(5), Some(0));
    }
}
