//! Platform abstraction layer
//!
//! - `host`: mount/unmount and resize coalescing, independent of any display
//! - `web`: browser DOM binding (wasm32 only)

pub mod host;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::SceneHost;
