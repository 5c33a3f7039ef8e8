use gloo_timers::callback::Timeout;
use web_sys::{Document, Element};

use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::utils::dom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class_name(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStep {
    Show,
    Hide,
    Remove,
}

/// Lifecycle of one toast, in ms from the moment it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastSchedule {
    pub enter_delay: u32,
    pub dwell: u32,
    pub exit_delay: u32,
}

impl ToastSchedule {
    /// Show a tick after insertion so the hidden state renders first, hide
    /// after the dwell, then remove once the exit transition has run.
    pub fn steps(&self) -> [(u32, ToastStep); 3] {
        let hide_at = self.dwell.max(self.enter_delay);
        [
            (self.enter_delay, ToastStep::Show),
            (hide_at, ToastStep::Hide),
            (hide_at.saturating_add(self.exit_delay), ToastStep::Remove),
        ]
    }
}

/// Where toasts live. At most one is present at a time.
pub trait ToastLayer {
    type Toast;

    fn current(&self) -> Result<Option<Self::Toast>, SiteError>;
    fn create(&self, message: &str, kind: ToastKind) -> Result<Self::Toast, SiteError>;
    fn set_shown(&self, toast: &Self::Toast, shown: bool);
    fn discard(&self, toast: &Self::Toast);
}

/// Replace whatever toast is on screen with a new one.
pub fn present<L: ToastLayer>(layer: &L, message: &str, kind: ToastKind) -> Result<L::Toast, SiteError> {
    if let Some(existing) = layer.current()? {
        layer.discard(&existing);
    }
    layer.create(message, kind)
}

pub fn apply<L: ToastLayer>(layer: &L, toast: &L::Toast, step: ToastStep) {
    match step {
        ToastStep::Show => layer.set_shown(toast, true),
        ToastStep::Hide => layer.set_shown(toast, false),
        ToastStep::Remove => layer.discard(toast),
    }
}

/// Shows one transient message at a time at the bottom of the page.
#[derive(Clone)]
pub struct Toaster {
    document: Document,
    enter_delay: u32,
    exit_delay: u32,
}

impl ToastLayer for Toaster {
    type Toast = Element;

    fn current(&self) -> Result<Option<Element>, SiteError> {
        dom::query(&self.document, ".toast")
    }

    fn create(&self, message: &str, kind: ToastKind) -> Result<Element, SiteError> {
        let body = self.document.body().ok_or(SiteError::MissingAnchor("body"))?;
        let toast = self.document.create_element("div")?;
        toast.set_class_name(&format!("toast {}", kind.class_name()));
        toast.set_text_content(Some(message));
        body.append_child(&toast)?;
        Ok(toast)
    }

    fn set_shown(&self, toast: &Element, shown: bool) {
        dom::set_class(toast, "show", shown);
    }

    fn discard(&self, toast: &Element) {
        toast.remove();
    }
}

impl Toaster {
    pub fn new(document: Document, config: &SiteConfig) -> Self {
        Self {
            document,
            enter_delay: config.toast_enter_delay,
            exit_delay: config.toast_exit_delay,
        }
    }

    /// Replace any visible toast with `message` and retire it after `duration` ms.
    pub fn show(&self, message: &str, kind: ToastKind, duration: u32) -> Result<(), SiteError> {
        let toast = present(self, message, kind)?;
        let schedule = ToastSchedule {
            enter_delay: self.enter_delay,
            dwell: duration,
            exit_delay: self.exit_delay,
        };
        for (delay, step) in schedule.steps() {
            let layer = self.clone();
            let toast = toast.clone();
            Timeout::new(delay, move || apply(&layer, &toast, step)).forget();
        }
        Ok(())
    }
}
