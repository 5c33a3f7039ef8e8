use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    #[error("No global window available")]
    NoWindow,
    #[error("Window has no document")]
    NoDocument,
    #[error("Missing page element: {0}")]
    MissingAnchor(&'static str),
    #[error("JavaScript error: {0}")]
    Js(String),
    #[error("Invalid site config: {0}")]
    InvalidConfig(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        SiteError::Js(message)
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        SiteError::InvalidConfig(err.to_string())
    }
}

impl From<url::ParseError> for SiteError {
    fn from(err: url::ParseError) -> Self {
        SiteError::InvalidConfig(err.to_string())
    }
}
