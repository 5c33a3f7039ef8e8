use web_sys::{Element, Window};

use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

pub fn past_threshold(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

/// Floating "back to top" button, shown once the page is scrolled down.
pub struct BackToTop {
    _listeners: [Listener; 2],
}

impl BackToTop {
    pub fn new(window: Window, button: Element, threshold: f64) -> Result<Self, SiteError> {
        let on_scroll = Listener::new(&window, "scroll", {
            let window = window.clone();
            let button = button.clone();
            move |_| {
                let scroll_y = window.scroll_y().unwrap_or(0.0);
                dom::set_class(&button, "show", past_threshold(scroll_y, threshold));
            }
        })?;
        let on_click = Listener::new(&button, "click", {
            let window = window.clone();
            move |_| dom::smooth_scroll_to(&window, 0.0)
        })?;
        Ok(Self {
            _listeners: [on_scroll, on_click],
        })
    }
}
