#![forbid(unsafe_code)]

//! Breakpoint-driven element relocation.
//!
//! A [`Relocator`] takes a set of [`RelocationSpec`]s, each naming a source
//! element and per-threshold placement rules, and moves sources between
//! containers as the observed width crosses thresholds. The engine only
//! talks to the document through [`ElementTree`], so the same code drives a
//! live DOM (`domshift-web`) and the in-memory [`ArenaTree`].
//!
//! # Example
//!
//! ```
//! use domshift_core::{ArenaTree, PlacementRule, RelocationSpec, Relocator, RelocatorOptions};
//!
//! let mut tree = ArenaTree::new("body");
//! let main = tree.element(tree.root(), "main");
//! let desc = tree.element(main, "p");
//! let aside = tree.element(tree.root(), "aside");
//!
//! let spec = RelocationSpec::new(desc).at(768.0, PlacementRule::new(aside));
//! let mut relocator = Relocator::new(&mut tree, vec![spec], RelocatorOptions::new()).unwrap();
//!
//! relocator.apply_width(&mut tree, 500.0);
//! assert_eq!(tree.parent_of(desc), Some(aside));
//! relocator.apply_width(&mut tree, 1024.0);
//! assert_eq!(tree.parent_of(desc), Some(main));
//! ```

pub mod apply;
pub mod arena;
pub mod config;
pub mod engine;
pub mod error;
pub mod observe;
pub mod plan;
pub mod raw;
pub mod spec;
pub mod threshold;
pub mod tree;

pub use arena::{ArenaTree, NodeId};
pub use config::RelocationConfig;
pub use engine::{ObservedRelocator, Relocator, RelocatorOptions, Transition};
pub use error::{ConfigError, DomError, ErrorKind, RangeError, RelocateError, Result};
pub use observe::{ManualSubscription, SizeSubscription, ViewportMetrics, WidthObservation};
pub use plan::{CoveragePolicy, Placement, PlacementPlan, PlanSet};
pub use raw::RawValue;
pub use spec::{PlacementRule, RelocationSpec, ValidatedSpec};
pub use threshold::{Px, Threshold, Thresholds};
pub use tree::{ElementTree, is_void_element};
