/// First-Run Closer - Chrome Extension that closes first-run and update tabs
/// Built with Rust + WASM + Yew

pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod recording;
pub mod rule;
pub mod storage;
pub mod tab_data;

// Host-facing parts only exist in the browser build
#[cfg(target_arch = "wasm32")]
pub mod background;
#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod ui;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the configurator page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_configurator() {
    yew::Renderer::<ui::configurator::Configurator>::new().render();
}
