#![forbid(unsafe_code)]

//! Browser adapter for the domshift relocation engine.
//!
//! This crate provides [`DomShift`], a `wasm-bindgen`-exported struct that
//! wraps a [`domshift_core::ObservedRelocator`] over the live document and
//! feeds it from a `ResizeObserver` on the root element.
//!
//! ```js
//! const shift = new DomShift([
//!   { sourceElement: desc, breakpoints: { 768: { targetElement: aside } } },
//! ]);
//! shift.activeThreshold(); // 768 or "default"
//! shift.dispose();
//! ```
//!
//! The pieces are usable on their own from Rust: [`WebDom`] implements
//! [`domshift_core::ElementTree`] over `web_sys::Element`, and
//! [`raw_value`] converts JS records into [`domshift_core::RawValue`].

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod intake;
#[cfg(target_arch = "wasm32")]
mod observer;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use intake::raw_value;
#[cfg(target_arch = "wasm32")]
pub use observer::{ResizeObserverSubscription, read_observation};
#[cfg(target_arch = "wasm32")]
pub use wasm::DomShift;

// Host-agnostic mapping is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod bridge;
