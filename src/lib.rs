// cargo: dep = "yew"
// cargo: dep = "serde"
// cargo: dep = "serde_json"
// cargo: dep = "reqwest"
// cargo: dep = "pulldown-cmark"
// cargo: dep = "futures-util"
// cargo: dep = "wasm-bindgen"
// cargo: dep = "wasm-bindgen-futures"
// cargo: dep = "web-sys"
// cargo: dep = "uuid"
// cargo: dep = "js-sys"
// cargo: dep = "anyhow"
// cargo: dep = "console_error_panic_hook"
// cargo: dep = "thiserror"
// cargo: dep = "async-trait"
// cargo: dep = "chrono"
// cargo: dep = "log"
// cargo: dep = "wasm-logger"

mod app;
mod bridge;
mod components;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;
use app::App;

#[wasm_bindgen(start)]
pub fn run_app() {
    utils::set_panic_hook();
    utils::init_logging();
    log::info!("starting cyberchat-web {}", env!("CARGO_PKG_VERSION"));
    yew::Renderer::<App>::new().render();
}
