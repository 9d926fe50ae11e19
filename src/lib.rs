pub mod api;
pub mod banner;
pub mod config;
pub mod dom;
pub mod error;
pub mod models;
pub mod page;
pub mod render;
pub mod timer;

#[cfg(target_arch = "wasm32")]
pub mod browser;
