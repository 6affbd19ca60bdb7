#![forbid(unsafe_code)]

//! domshift public facade crate.
//!
//! Re-exports the relocation engine from `domshift-core` and, on `wasm32`,
//! the browser adapter from `domshift-web`. Most users only need the
//! [`prelude`].

// --- Engine re-exports ----------------------------------------------------

pub use domshift_core::{
    CoveragePolicy, ObservedRelocator, PlacementRule, RelocationConfig, RelocationSpec, Relocator,
    RelocatorOptions, Transition,
};

// --- Tree re-exports ------------------------------------------------------

pub use domshift_core::{ArenaTree, ElementTree, NodeId};

// --- Threshold and observation re-exports ---------------------------------

pub use domshift_core::{
    ManualSubscription, Px, SizeSubscription, Threshold, Thresholds, ViewportMetrics,
    WidthObservation,
};

// --- Errors ---------------------------------------------------------------

pub use domshift_core::{ConfigError, DomError, ErrorKind, RangeError, RelocateError, Result};

// --- Web re-exports -------------------------------------------------------

#[cfg(target_arch = "wasm32")]
pub use domshift_web::{DomShift, WebDom};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CoveragePolicy, ElementTree, PlacementRule, RelocateError, RelocationSpec, Relocator,
        RelocatorOptions, Result, Threshold, WidthObservation,
    };

    #[cfg(target_arch = "wasm32")]
    pub use crate::{DomShift, WebDom};

    pub use crate::core;
    #[cfg(target_arch = "wasm32")]
    pub use crate::web;
}

pub use domshift_core as core;
#[cfg(target_arch = "wasm32")]
pub use domshift_web as web;
