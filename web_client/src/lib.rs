#![forbid(unsafe_code)]

//! Browser binding for the admin panel's AJAX layer.
//!
//! On `wasm32` the module start hook reads the page configuration, wires the
//! DOM implementations of the `ajax_core` seams and installs one document-level
//! submit listener.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::start;

/// Native builds compile this crate as a stub so the workspace still builds on
/// non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn start() {
    tracing::warn!("web_client only runs inside a browser");
}
