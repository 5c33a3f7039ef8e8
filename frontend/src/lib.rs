//! DevCraft Studio site behaviors, compiled to wasm and bound to the static page.

pub mod components;
pub mod config;
pub mod connections;
pub mod error;
pub mod pages;
pub mod utils;

pub use config::SiteConfig;
pub use error::SiteError;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();

    let document = utils::dom::document()?;
    let (config, config_error) = match SiteConfig::from_document(&document) {
        Ok(config) => (config, None),
        Err(e) => (SiteConfig::default(), Some(e)),
    };

    wasm_logger::init(wasm_logger::Config::new(config.log_level()));
    if let Some(e) = config_error {
        log::warn!("Ignoring site config, using defaults: {}", e);
    }

    pages::home::mount_when_ready(config)?;
    Ok(())
}
