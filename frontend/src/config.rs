use serde::Deserialize;
use web_sys::Document;

use crate::connections::deep_link::{DeepLinkTarget, LaunchTimings};
use crate::error::SiteError;

/// Id of the optional `<script type="application/json">` block that overrides defaults.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Every tunable of the page behaviors. Durations are in milliseconds,
/// offsets and thresholds in CSS pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub line_id: String,
    pub line_scheme: String,
    pub line_web_host: String,
    pub mobile_check_delay: u32,
    pub mobile_departure_threshold: u32,
    pub desktop_probe_window: u32,
    pub form_focus_delay: u32,
    pub form_header_offset: f64,
    pub anchor_header_offset: f64,
    pub slide_interval: u32,
    pub counter_duration: u32,
    pub counter_visibility_threshold: f64,
    pub back_to_top_threshold: f64,
    pub submit_delay: u32,
    pub form_toast_duration: u32,
    pub line_toast_duration: u32,
    pub toast_enter_delay: u32,
    pub toast_exit_delay: u32,
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            line_id: "@442fjdqq".to_string(),
            line_scheme: "line".to_string(),
            line_web_host: "line.me".to_string(),
            mobile_check_delay: 2_500,
            mobile_departure_threshold: 3_000,
            desktop_probe_window: 1_500,
            form_focus_delay: 800,
            form_header_offset: 100.0,
            anchor_header_offset: 80.0,
            slide_interval: 5_000,
            counter_duration: 2_000,
            counter_visibility_threshold: 0.5,
            back_to_top_threshold: 500.0,
            submit_delay: 1_500,
            form_toast_duration: 4_000,
            line_toast_duration: 5_000,
            toast_enter_delay: 10,
            toast_exit_delay: 300,
            log_level: "info".to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse overrides from a JSON document. Missing keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, SiteError> {
        let config: SiteConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config data island from the page, falling back to defaults when absent.
    pub fn from_document(document: &Document) -> Result<Self, SiteError> {
        match document.get_element_by_id(CONFIG_ELEMENT_ID) {
            Some(element) => {
                let raw = element.text_content().unwrap_or_default();
                if raw.trim().is_empty() {
                    Ok(Self::default())
                } else {
                    Self::from_json(&raw)
                }
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), SiteError> {
        if !(0.0..=1.0).contains(&self.counter_visibility_threshold) {
            return Err(SiteError::InvalidConfig(format!(
                "counterVisibilityThreshold must be within [0, 1], got {}",
                self.counter_visibility_threshold
            )));
        }
        if self.counter_duration == 0 {
            return Err(SiteError::InvalidConfig("counterDuration must be positive".to_string()));
        }
        if self.mobile_check_delay >= self.mobile_departure_threshold {
            return Err(SiteError::InvalidConfig(format!(
                "mobileCheckDelay ({}) must be shorter than mobileDepartureThreshold ({})",
                self.mobile_check_delay, self.mobile_departure_threshold
            )));
        }
        if self.slide_interval == 0 {
            return Err(SiteError::InvalidConfig("slideInterval must be positive".to_string()));
        }
        self.line_target().map(|_| ())
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    pub fn line_target(&self) -> Result<DeepLinkTarget, SiteError> {
        DeepLinkTarget::new(&self.line_scheme, &self.line_web_host, &self.line_id)
    }

    pub fn launch_timings(&self) -> LaunchTimings {
        LaunchTimings {
            mobile_check_delay: self.mobile_check_delay,
            mobile_departure_threshold: f64::from(self.mobile_departure_threshold),
            desktop_probe_window: self.desktop_probe_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_behavior() {
        let config = SiteConfig::default();
        assert_eq!(config.line_id, "@442fjdqq");
        assert_eq!(config.mobile_check_delay, 2_500);
        assert_eq!(config.desktop_probe_window, 1_500);
        assert_eq!(config.slide_interval, 5_000);
        assert_eq!(config.log_level(), log::Level::Info);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(r#"{"lineId": "@abc123", "slideInterval": 7000}"#).unwrap();
        assert_eq!(config.line_id, "@abc123");
        assert_eq!(config.slide_interval, 7_000);
        assert_eq!(config.counter_duration, 2_000);
        assert_eq!(
            config.line_target().unwrap().web_url(),
            "https://line.me/ti/p/@abc123"
        );
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = SiteConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig(_)));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let err = SiteConfig::from_json(r#"{"counterVisibilityThreshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig(_)));
    }

    #[test]
    fn test_check_delay_must_precede_departure_threshold() {
        let err = SiteConfig::from_json(r#"{"mobileCheckDelay": 3000}"#).unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig(_)));
        let err = SiteConfig::from_json(r#"{"mobileCheckDelay": 4000, "mobileDepartureThreshold": 3500}"#)
            .unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig(_)));
        let config =
            SiteConfig::from_json(r#"{"mobileCheckDelay": 2000, "mobileDepartureThreshold": 2500}"#).unwrap();
        assert_eq!(config.launch_timings().mobile_departure_threshold, 2_500.0);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let config = SiteConfig::from_json(r#"{"logLevel": "chatty"}"#).unwrap();
        assert_eq!(config.log_level(), log::Level::Info);
        let config = SiteConfig::from_json(r#"{"logLevel": "debug"}"#).unwrap();
        assert_eq!(config.log_level(), log::Level::Debug);
    }
}
