use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::components::back_to_top::BackToTop;
use crate::components::contact_form::{self, ContactAnchors, ContactForm};
use crate::components::counter::{CounterAnchors, CounterAnimation};
use crate::components::faq::{Faq, FaqAnchors};
use crate::components::nav_menu::{NavAnchors, NavMenu};
use crate::components::project_filter::{FilterAnchors, ProjectFilter};
use crate::components::slider::{HeroSlider, SliderAnchors};
use crate::components::smooth_scroll::SmoothScroll;
use crate::components::toast::Toaster;
use crate::config::SiteConfig;
use crate::connections::line::{LineAnchors, LineButton};
use crate::error::SiteError;
use crate::utils::dom;

thread_local! {
    static PAGE: RefCell<Option<HomePage>> = const { RefCell::new(None) };
}

/// Every behavior bound to the landing page. Components whose anchors are
/// missing from the markup are simply absent.
pub struct HomePage {
    nav: Option<NavMenu>,
    slider: Option<HeroSlider>,
    counters: Option<CounterAnimation>,
    filter: Option<ProjectFilter>,
    faq: Option<Faq>,
    contact: Option<ContactForm>,
    back_to_top: Option<BackToTop>,
    line: Option<LineButton>,
    anchors: Option<SmoothScroll>,
}

/// Log and drop a component that failed to bind so the rest of the page still works.
fn mount<T>(name: &str, bound: Result<Option<T>, SiteError>) -> Option<T> {
    match bound {
        Ok(Some(component)) => {
            log::debug!("Mounted {}", name);
            Some(component)
        }
        Ok(None) => {
            log::debug!("Skipping {}: not on this page", name);
            None
        }
        Err(e) => {
            log::warn!("Skipping {}: {}", name, e);
            None
        }
    }
}

impl HomePage {
    pub fn bootstrap(window: Window, document: Document, config: &SiteConfig) -> Self {
        if let Err(e) = contact_form::install_spinner_style(&document) {
            log::warn!("Spinner style not installed: {}", e);
        }
        let toaster = Toaster::new(document.clone(), config);

        let nav = mount(
            "navigation",
            NavAnchors::locate(&document)
                .and_then(|anchors| anchors.map(|a| NavMenu::new(&document, a)).transpose()),
        );

        let slider = mount(
            "hero slider",
            SliderAnchors::locate(&document).and_then(|anchors| match anchors {
                Some(a) => HeroSlider::new(a, config.slide_interval),
                None => Ok(None),
            }),
        );

        let counters = mount(
            "counters",
            CounterAnchors::locate(&document).and_then(|anchors| match anchors {
                Some(a) => CounterAnimation::new(
                    window.clone(),
                    a,
                    config.counter_duration,
                    config.counter_visibility_threshold,
                ),
                None => Ok(None),
            }),
        );

        let filter = mount(
            "project filter",
            FilterAnchors::locate(&document)
                .and_then(|anchors| anchors.map(ProjectFilter::new).transpose()),
        );

        let faq = mount(
            "faq",
            FaqAnchors::locate(&document).and_then(|anchors| anchors.map(Faq::new).transpose()),
        );

        let contact = mount(
            "contact form",
            ContactAnchors::locate(&document).and_then(|anchors| {
                anchors
                    .map(|a| ContactForm::new(a, toaster.clone(), config))
                    .transpose()
            }),
        );

        let back_to_top = mount(
            "back to top",
            dom::by_id::<Element>(&document, "backToTop")
                .map(|button| BackToTop::new(window.clone(), button, config.back_to_top_threshold))
                .transpose(),
        );

        let line = mount(
            "LINE button",
            LineAnchors::locate(&document).and_then(|anchors| {
                anchors
                    .map(|a| LineButton::new(window.clone(), document.clone(), a, toaster.clone(), config))
                    .transpose()
            }),
        );

        let anchors = mount(
            "anchor scrolling",
            dom::query_all(&document, "a[href^=\"#\"]").and_then(|links| {
                SmoothScroll::new(window.clone(), document.clone(), links, config.anchor_header_offset)
            }),
        );

        Self {
            nav,
            slider,
            counters,
            filter,
            faq,
            contact,
            back_to_top,
            line,
            anchors,
        }
    }

    pub fn mounted(&self) -> usize {
        [
            self.nav.is_some(),
            self.slider.is_some(),
            self.counters.is_some(),
            self.filter.is_some(),
            self.faq.is_some(),
            self.contact.is_some(),
            self.back_to_top.is_some(),
            self.line.is_some(),
            self.anchors.is_some(),
        ]
        .iter()
        .filter(|mounted| **mounted)
        .count()
    }
}

/// `document.readyState` is `"loading"` until the parser finishes.
fn dom_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

fn install(window: Window, document: Document, config: SiteConfig) {
    let page = HomePage::bootstrap(window, document, &config);
    log::info!("Page ready with {} behaviors", page.mounted());
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
}

/// Bind the page now, or once the DOM has finished parsing.
pub fn mount_when_ready(config: SiteConfig) -> Result<(), SiteError> {
    let window = dom::window()?;
    let document = window.document().ok_or(SiteError::NoDocument)?;

    if dom_parsed(&document.ready_state()) {
        install(window, document, config);
        return Ok(());
    }

    let target = document.clone();
    let callback = Closure::once_into_js(move || install(window, document, config));
    target.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    Ok(())
}
