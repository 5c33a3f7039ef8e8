use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

/// Selected portfolio tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    All,
    Category(String),
}

impl FilterKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => FilterKey::All,
            other => FilterKey::Category(other.to_string()),
        }
    }

    /// Whether a card tagged with `categories` stays visible.
    ///
    /// Matching is substring containment on the raw tag string, so `"ab"`
    /// also matches a card tagged `"xab y"`.
    pub fn matches(&self, categories: &str) -> bool {
        match self {
            FilterKey::All => true,
            FilterKey::Category(key) => categories.contains(key.as_str()),
        }
    }
}

/// Indices of the cards that remain visible under `key`.
pub fn visible_cards<'a>(key: &FilterKey, categories: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    categories
        .into_iter()
        .enumerate()
        .filter(|(_, tags)| key.matches(tags))
        .map(|(i, _)| i)
        .collect()
}

pub struct FilterAnchors {
    pub tabs: Vec<Element>,
    pub cards: Vec<HtmlElement>,
}

impl FilterAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let tabs = dom::query_all(document, ".tab-btn")?;
        if tabs.is_empty() {
            return Ok(None);
        }
        let cards = dom::query_all(document, ".project-card")?
            .into_iter()
            .filter_map(|card| card.dyn_into::<HtmlElement>().ok())
            .collect();
        Ok(Some(Self { tabs, cards }))
    }
}

struct FilterView {
    tabs: Vec<Element>,
    cards: Vec<(HtmlElement, String)>,
}

impl FilterView {
    fn select(&self, active: usize, key: &FilterKey) {
        for (i, tab) in self.tabs.iter().enumerate() {
            dom::set_class(tab, "active", i == active);
        }
        let shown = visible_cards(key, self.cards.iter().map(|(_, categories)| categories.as_str()));
        for (i, (card, _)) in self.cards.iter().enumerate() {
            if shown.binary_search(&i).is_ok() {
                dom::set_class(card, "hidden", false);
                dom::set_style(card, "animation", "fadeIn 0.4s ease");
            } else {
                dom::set_class(card, "hidden", true);
            }
        }
    }
}

/// Portfolio category tabs.
pub struct ProjectFilter {
    _listeners: Vec<Listener>,
}

impl ProjectFilter {
    pub fn new(anchors: FilterAnchors) -> Result<Self, SiteError> {
        let cards = anchors
            .cards
            .into_iter()
            .map(|card| {
                let categories = dom::data_attr(&card, "category").unwrap_or_default();
                (card, categories)
            })
            .collect();
        let view = Rc::new(FilterView {
            tabs: anchors.tabs,
            cards,
        });

        let listeners = view
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let key = FilterKey::parse(&dom::data_attr(tab, "filter").unwrap_or_default());
                let view = view.clone();
                Listener::new(tab, "click", move |_| view.select(i, &key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { _listeners: listeners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: [&str; 5] = ["web app", "app", "branding", "", "web"];

    #[test]
    fn test_all_shows_every_card() {
        assert_eq!(visible_cards(&FilterKey::parse("all"), CARDS), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_key_shows_cards_containing_it() {
        assert_eq!(visible_cards(&FilterKey::parse("web"), CARDS), vec![0, 4]);
        assert_eq!(visible_cards(&FilterKey::parse("app"), CARDS), vec![0, 1]);
        assert_eq!(visible_cards(&FilterKey::parse("seo"), CARDS), Vec::<usize>::new());
    }

    #[test]
    fn test_substring_match_is_loose() {
        let key = FilterKey::parse("ab");
        assert!(key.matches("xab y"));
        assert!(!key.matches("a b"));
    }

    #[test]
    fn test_untagged_cards_only_show_under_all() {
        assert!(FilterKey::All.matches(""));
        assert!(!FilterKey::parse("web").matches(""));
    }
}
