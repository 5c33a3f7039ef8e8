use web_sys::{Document, Element, Window};

use crate::connections::line::LINE_TRIGGER_SELECTOR;
use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

/// Where an in-page `#...` link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InPageLink<'a> {
    /// `#section`, usable directly as a selector.
    Section(&'a str),
    /// A bare `#`: the jump is suppressed and nothing scrolls.
    Bare,
}

/// Classify `href`. `None` for links that leave the page.
pub fn in_page_link(href: &str) -> Option<InPageLink<'_>> {
    match href.strip_prefix('#') {
        Some("") => Some(InPageLink::Bare),
        Some(_) => Some(InPageLink::Section(href)),
        None => None,
    }
}

/// In-page `#section` links scroll smoothly and stop below the fixed header.
pub struct SmoothScroll {
    _listeners: Vec<Listener>,
}

impl SmoothScroll {
    pub fn new(
        window: Window,
        document: Document,
        links: Vec<Element>,
        header_offset: f64,
    ) -> Result<Option<Self>, SiteError> {
        let mut listeners = Vec::new();
        for link in links {
            // LINE buttons have their own click handling.
            if link.matches(LINE_TRIGGER_SELECTOR).unwrap_or(false) {
                continue;
            }
            let Some(href) = link.get_attribute("href") else {
                continue;
            };
            let selector = match in_page_link(&href) {
                Some(InPageLink::Section(selector)) => Some(selector.to_string()),
                Some(InPageLink::Bare) => None,
                None => continue,
            };
            let window = window.clone();
            let document = document.clone();
            listeners.push(Listener::new(&link, "click", move |e| {
                e.prevent_default();
                let Some(selector) = selector.as_deref() else {
                    return;
                };
                // An id that is not a valid selector behaves like a missing target.
                if let Ok(Some(target)) = document.query_selector(selector) {
                    dom::scroll_below_header(&window, &target, header_offset);
                }
            })?);
        }
        if listeners.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { _listeners: listeners }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_links_resolve_to_selector() {
        assert_eq!(in_page_link("#contact"), Some(InPageLink::Section("#contact")));
        assert_eq!(in_page_link("#faq"), Some(InPageLink::Section("#faq")));
    }

    #[test]
    fn test_bare_hash_is_bound_without_target() {
        assert_eq!(in_page_link("#"), Some(InPageLink::Bare));
    }

    #[test]
    fn test_links_leaving_the_page_are_ignored() {
        assert_eq!(in_page_link(""), None);
        assert_eq!(in_page_link("https://line.me/ti/p/@x"), None);
        assert_eq!(in_page_link("/about#team"), None);
    }
}
