use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, Window};
use web_sys::js_sys;

use crate::components::toast::{ToastKind, Toaster};
use crate::config::SiteConfig;
use crate::connections::deep_link::{
    CancellationToken, DeepLinkTarget, DesktopProbe, FocusWatch, LaunchHost, LaunchTimings,
    MobileLaunch,
};
use crate::error::SiteError;
use crate::utils::dom::{self, Listener};
use crate::utils::platform::Platform;

/// Elements that should open LINE instead of following their link.
pub const LINE_TRIGGER_SELECTOR: &str = ".line-float, .contact-line, a[href*=\"line.me\"]";

impl FocusWatch for Listener {
    fn release(&mut self) {
        Listener::release(self);
    }
}

/// [`LaunchHost`] backed by the live page.
#[derive(Clone)]
pub struct BrowserHost {
    window: Window,
    document: Document,
    contact_form: Option<HtmlElement>,
    toaster: Toaster,
    form_header_offset: f64,
    form_focus_delay: u32,
    notice_duration: u32,
}

impl BrowserHost {
    pub fn new(
        window: Window,
        document: Document,
        contact_form: Option<HtmlElement>,
        toaster: Toaster,
        config: &SiteConfig,
    ) -> Self {
        Self {
            window,
            document,
            contact_form,
            toaster,
            form_header_offset: config.form_header_offset,
            form_focus_delay: config.form_focus_delay,
            notice_duration: config.line_toast_duration,
        }
    }
}

impl LaunchHost for BrowserHost {
    type Surface = HtmlIFrameElement;
    type Watch = Listener;

    fn now(&self) -> f64 {
        js_sys::Date::now()
    }

    fn navigate(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            log::warn!("Navigation to {} failed: {:?}", url, e);
        }
    }

    fn attach_surface(&self) -> Option<HtmlIFrameElement> {
        let body = self.document.body()?;
        let frame = self
            .document
            .create_element("iframe")
            .ok()?
            .dyn_into::<HtmlIFrameElement>()
            .ok()?;
        dom::set_style(&frame, "display", "none");
        if let Err(e) = body.append_child(&frame) {
            log::warn!("Could not attach LINE probe frame: {:?}", e);
            return None;
        }
        Some(frame)
    }

    fn load_surface(&self, surface: &HtmlIFrameElement, url: &str) {
        // Cross-origin access errors are expected here and carry no signal.
        if let Some(frame_window) = surface.content_window() {
            let _ = frame_window.location().set_href(url);
        }
    }

    fn detach_surface(&self, surface: HtmlIFrameElement) {
        surface.remove();
    }

    fn reveal_contact_form(&self) {
        let Some(form) = self.contact_form.as_ref() else {
            return;
        };
        dom::scroll_below_header(&self.window, form, self.form_header_offset);

        let form = form.clone();
        Timeout::new(self.form_focus_delay, move || {
            let first_input = form
                .query_selector("input")
                .ok()
                .flatten()
                .and_then(|input| input.dyn_into::<HtmlElement>().ok());
            if let Some(input) = first_input {
                let _ = input.focus();
            }
        })
        .forget();
    }

    fn notify(&self, message: &str) {
        if let Err(e) = self.toaster.show(message, ToastKind::Info, self.notice_duration) {
            log::warn!("Could not show LINE notice: {}", e);
        }
    }
}

/// Page anchors the LINE button binds to.
pub struct LineAnchors {
    pub triggers: Vec<Element>,
    pub contact_form: Option<HtmlElement>,
}

impl LineAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let triggers = dom::query_all(document, LINE_TRIGGER_SELECTOR)?;
        if triggers.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            triggers,
            contact_form: dom::by_id::<HtmlElement>(document, "contactForm"),
        }))
    }
}

/// Routes clicks on LINE links through the app launcher.
pub struct LineButton {
    _listeners: Vec<Listener>,
}

impl LineButton {
    pub fn new(
        window: Window,
        document: Document,
        anchors: LineAnchors,
        toaster: Toaster,
        config: &SiteConfig,
    ) -> Result<Self, SiteError> {
        let target = config.line_target()?;
        let timings = config.launch_timings();
        let platform = Platform::detect(&window);
        log::debug!("LINE button bound to {} elements ({:?})", anchors.triggers.len(), platform);

        let host = BrowserHost::new(window, document, anchors.contact_form, toaster, config);
        let listeners = anchors
            .triggers
            .iter()
            .map(|trigger| {
                let host = host.clone();
                let target = target.clone();
                Listener::new(trigger, "click", move |e| {
                    e.prevent_default();
                    let launched = match platform {
                        Platform::Mobile => launch_mobile(&host, &target, timings),
                        Platform::Desktop => launch_desktop(&host, &target, timings),
                    };
                    if let Err(e) = launched {
                        log::error!("LINE launch failed: {}", e);
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { _listeners: listeners })
    }
}

fn launch_mobile(host: &BrowserHost, target: &DeepLinkTarget, timings: LaunchTimings) -> Result<(), SiteError> {
    let cancel = CancellationToken::default();
    let departure = vec![
        Listener::new(&host.window, "pagehide", {
            let cancel = cancel.clone();
            move |_| cancel.cancel()
        })?,
        Listener::new(&host.document, "visibilitychange", {
            let cancel = cancel.clone();
            let document = host.document.clone();
            move |_| {
                if document.hidden() {
                    cancel.cancel();
                }
            }
        })?,
    ];

    let mut attempt = MobileLaunch::start(host, target, cancel);
    let host = host.clone();
    Timeout::new(timings.mobile_check_delay, move || {
        let outcome = attempt.on_check(&host, timings.mobile_departure_threshold);
        log::info!("LINE mobile launch resolved: {:?}", outcome);
        drop(departure);
    })
    .forget();
    Ok(())
}

fn launch_desktop(host: &BrowserHost, target: &DeepLinkTarget, timings: LaunchTimings) -> Result<(), SiteError> {
    let probe: Rc<RefCell<DesktopProbe<BrowserHost>>> = Rc::new(RefCell::new(DesktopProbe::new()));

    let blur = Listener::new(&host.window, "blur", {
        let probe = probe.clone();
        let host = host.clone();
        move |_| {
            if let Ok(mut probe) = probe.try_borrow_mut() {
                probe.on_focus_lost(&host);
            }
        }
    })?;

    {
        let mut probe = probe.borrow_mut();
        probe.begin(host);
        probe.watch(blur);
        probe.load(host, target.app_url());
    }

    let host = host.clone();
    Timeout::new(timings.desktop_probe_window, move || {
        let outcome = probe.borrow_mut().on_timeout(&host);
        log::info!("LINE desktop launch resolved: {:?}", outcome);
    })
    .forget();
    Ok(())
}
