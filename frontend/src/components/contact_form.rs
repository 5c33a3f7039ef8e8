use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys;
use web_sys::{Document, Event, FormData, HtmlButtonElement, HtmlFormElement};

use crate::components::toast::{ToastKind, Toaster};
use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::utils::dom::{self, Listener};

pub const REQUIRED_FIELDS: [&str; 4] = ["name", "contact", "service", "message"];

const MISSING_FIELDS_NOTICE: &str = "請填寫所有必填欄位";
const SUCCESS_NOTICE: &str = "感謝您的諮詢！我會盡快與您聯繫。";

const BUSY_LABEL: &str = r#"
    送出中...
    <svg class="spin" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
        <path d="M12 2v4M12 18v4M4.93 4.93l2.83 2.83M16.24 16.24l2.83 2.83M2 12h4M18 12h4M4.93 19.07l2.83-2.83M16.24 7.76l2.83-2.83"/>
    </svg>
"#;

const IDLE_LABEL: &str = r#"
    送出諮詢
    <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
        <path d="M22 2L11 13M22 2l-7 20-4-9-9-4 20-7z"/>
    </svg>
"#;

const SPIN_CSS: &str = r#"
    @keyframes spin {
        from { transform: rotate(0deg); }
        to { transform: rotate(360deg); }
    }
    .spin {
        animation: spin 1s linear infinite;
    }
"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// A contact request as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub contact: String,
    pub service: String,
    pub message: String,
    /// Any further optional fields the form carries.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TryFrom<BTreeMap<String, String>> for ContactSubmission {
    type Error = ValidationError;

    fn try_from(mut fields: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut take = |key: &'static str| {
            fields
                .remove(key)
                .filter(|value| !value.is_empty())
                .ok_or(ValidationError::MissingField(key))
        };
        let name = take("name")?;
        let contact = take("contact")?;
        let service = take("service")?;
        let message = take("message")?;
        Ok(Self {
            name,
            contact,
            service,
            message,
            extra: fields,
        })
    }
}

/// Text fields of `form` keyed by input name. File inputs are skipped.
fn collect_fields(form: &HtmlFormElement) -> Result<BTreeMap<String, String>, SiteError> {
    let data = FormData::new_with_form(form)?;
    let mut fields = BTreeMap::new();
    let Some(entries) = js_sys::try_iter(&data)? else {
        return Ok(fields);
    };
    for entry in entries {
        let entry: js_sys::Array = entry?.unchecked_into();
        if let (Some(key), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            fields.insert(key, value);
        }
    }
    Ok(fields)
}

/// Append the keyframes used by the busy spinner to `<head>`.
pub fn install_spinner_style(document: &Document) -> Result<(), SiteError> {
    let head = document.head().ok_or(SiteError::MissingAnchor("head"))?;
    let style = document.create_element("style")?;
    style.set_text_content(Some(SPIN_CSS));
    head.append_child(&style)?;
    Ok(())
}

pub struct ContactAnchors {
    pub form: HtmlFormElement,
    pub submit: Option<HtmlButtonElement>,
}

impl ContactAnchors {
    pub fn locate(document: &Document) -> Result<Option<Self>, SiteError> {
        let Some(form) = dom::by_id::<HtmlFormElement>(document, "contactForm") else {
            return Ok(None);
        };
        let submit = form
            .query_selector("button[type=\"submit\"]")?
            .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok());
        Ok(Some(Self { form, submit }))
    }
}

/// What a submission does to the page.
pub trait FormSurface {
    fn fields(&self) -> Result<BTreeMap<String, String>, SiteError>;
    fn set_busy(&self, busy: bool);
    fn reset(&self);
    fn toast(&self, message: &str, kind: ToastKind);
}

/// Validate the form. A complete submission leaves the form busy; anything
/// else leaves it untouched apart from a single error notice.
pub fn begin_submit<S: FormSurface>(surface: &S) -> Option<ContactSubmission> {
    let fields = match surface.fields() {
        Ok(fields) => fields,
        Err(e) => {
            log::error!("Could not read contact form: {}", e);
            return None;
        }
    };
    match ContactSubmission::try_from(fields) {
        Ok(submission) => {
            surface.set_busy(true);
            Some(submission)
        }
        Err(e) => {
            log::info!("Contact form rejected: {}", e);
            surface.toast(MISSING_FIELDS_NOTICE, ToastKind::Error);
            None
        }
    }
}

/// Settle an accepted submission once the simulated delay has passed.
pub fn finish_submit<S: FormSurface>(surface: &S, submission: &ContactSubmission) {
    surface.set_busy(false);
    surface.reset();
    surface.toast(SUCCESS_NOTICE, ToastKind::Success);
}

struct FormView {
    form: HtmlFormElement,
    submit: Option<HtmlButtonElement>,
    toaster: Toaster,
    submit_delay: u32,
    toast_duration: u32,
}

impl FormSurface for FormView {
    fn fields(&self) -> Result<BTreeMap<String, String>, SiteError> {
        collect_fields(&self.form)
    }

    fn set_busy(&self, busy: bool) {
        if let Some(button) = &self.submit {
            button.set_disabled(busy);
            button.set_inner_html(if busy { BUSY_LABEL } else { IDLE_LABEL });
        }
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn toast(&self, message: &str, kind: ToastKind) {
        if let Err(e) = self.toaster.show(message, kind, self.toast_duration) {
            log::warn!("Could not show form notice: {}", e);
        }
    }
}

impl FormView {
    fn handle_submit(self: &Rc<Self>, event: Event) {
        event.prevent_default();
        let Some(submission) = begin_submit(&**self) else {
            return;
        };
        let view = self.clone();
        spawn_local(async move {
            // No backend: the delay stands in for the network round trip.
            TimeoutFuture::new(view.submit_delay).await;
            finish_submit(&*view, &submission);
            match serde_json::to_string(&submission) {
                Ok(json) => gloo_console::log!("Form submitted:", json),
                Err(e) => log::warn!("Could not serialize submission: {}", e),
            }
        });
    }
}

/// Contact form with local validation and simulated submission.
pub struct ContactForm {
    _listener: Listener,
}

impl ContactForm {
    pub fn new(anchors: ContactAnchors, toaster: Toaster, config: &SiteConfig) -> Result<Self, SiteError> {
        let view = Rc::new(FormView {
            form: anchors.form,
            submit: anchors.submit,
            toaster,
            submit_delay: config.submit_delay,
            toast_duration: config.form_toast_duration,
        });
        let listener = Listener::new(&view.form, "submit", {
            let view = view.clone();
            move |e| view.handle_submit(e)
        })?;
        Ok(Self { _listener: listener })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Effect {
        Busy(bool),
        Reset,
        Toast(ToastKind, String),
    }

    struct FakeForm {
        fields: BTreeMap<String, String>,
        effects: RefCell<Vec<Effect>>,
    }

    impl FakeForm {
        fn with(fields: BTreeMap<String, String>) -> Self {
            Self {
                fields,
                effects: RefCell::new(Vec::new()),
            }
        }

        fn effects(&self) -> Vec<Effect> {
            self.effects.borrow().clone()
        }
    }

    impl FormSurface for FakeForm {
        fn fields(&self) -> Result<BTreeMap<String, String>, SiteError> {
            Ok(self.fields.clone())
        }

        fn set_busy(&self, busy: bool) {
            self.effects.borrow_mut().push(Effect::Busy(busy));
        }

        fn reset(&self) {
            self.effects.borrow_mut().push(Effect::Reset);
        }

        fn toast(&self, message: &str, kind: ToastKind) {
            self.effects.borrow_mut().push(Effect::Toast(kind, message.to_string()));
        }
    }

    fn complete_fields() -> BTreeMap<String, String> {
        [
            ("name", "陳小明"),
            ("contact", "0912-345-678"),
            ("service", "website"),
            ("message", "想做一個形象網站"),
            ("budget", "50k"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_empty_required_field_only_shows_one_error() {
        for field in REQUIRED_FIELDS {
            let mut fields = complete_fields();
            fields.insert(field.to_string(), String::new());
            let form = FakeForm::with(fields);

            assert!(begin_submit(&form).is_none());
            assert_eq!(
                form.effects(),
                vec![Effect::Toast(ToastKind::Error, MISSING_FIELDS_NOTICE.to_string())],
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_accepted_submission_goes_busy_then_resets() {
        let form = FakeForm::with(complete_fields());
        let submission = begin_submit(&form).unwrap();
        assert_eq!(form.effects(), vec![Effect::Busy(true)]);

        finish_submit(&form, &submission);
        assert_eq!(
            form.effects(),
            vec![
                Effect::Busy(true),
                Effect::Busy(false),
                Effect::Reset,
                Effect::Toast(ToastKind::Success, SUCCESS_NOTICE.to_string()),
            ]
        );
    }

    #[test]
    fn test_complete_form_is_accepted() {
        let submission = ContactSubmission::try_from(complete_fields()).unwrap();
        assert_eq!(submission.name, "陳小明");
        assert_eq!(submission.service, "website");
        assert_eq!(submission.extra.get("budget").map(String::as_str), Some("50k"));
        assert!(!submission.extra.contains_key("name"));
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        for field in REQUIRED_FIELDS {
            let mut fields = complete_fields();
            fields.remove(field);
            assert_eq!(
                ContactSubmission::try_from(fields),
                Err(ValidationError::MissingField(field))
            );
        }
    }

    #[test]
    fn test_each_empty_field_is_rejected() {
        for field in REQUIRED_FIELDS {
            let mut fields = complete_fields();
            fields.insert(field.to_string(), String::new());
            assert_eq!(
                ContactSubmission::try_from(fields),
                Err(ValidationError::MissingField(field))
            );
        }
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut fields = complete_fields();
        fields.remove("budget");
        let submission = ContactSubmission::try_from(fields).unwrap();
        assert!(submission.extra.is_empty());
    }

    #[test]
    fn test_submission_serializes_flat() {
        let submission = ContactSubmission::try_from(complete_fields()).unwrap();
        let json: serde_json::Value = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["contact"], "0912-345-678");
        assert_eq!(json["budget"], "50k");
    }
}
