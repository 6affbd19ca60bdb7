#![forbid(unsafe_code)]

//! Width observations and scrollbar compensation.
//!
//! Box-size observers report the content width of the observed root, which
//! excludes a vertical scrollbar the browser reserves. Breakpoints are
//! authored against the viewport width, so the scrollbar width is added back
//! before resolution.

use serde::{Deserialize, Serialize};

/// Viewport measurements taken when an observation is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportMetrics {
    /// `window.innerWidth`.
    pub viewport_width: f64,
    /// `clientWidth` of the observed element.
    pub client_width: f64,
    /// `offsetWidth` of the observed element.
    pub offset_width: f64,
}

impl ViewportMetrics {
    /// Width reserved by a vertical scrollbar; never negative.
    #[must_use]
    pub fn scrollbar_width(&self) -> f64 {
        let rendered = self.client_width.min(self.offset_width);
        if rendered == self.viewport_width {
            return 0.0;
        }
        (self.viewport_width - rendered).max(0.0)
    }
}

/// One notification from a box-size observer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WidthObservation {
    /// Reported inline size of the observed box.
    pub inline_size: f64,
    pub metrics: ViewportMetrics,
}

impl WidthObservation {
    /// Observation with no scrollbar reserved.
    #[must_use]
    pub const fn plain(inline_size: f64) -> Self {
        Self {
            inline_size,
            metrics: ViewportMetrics {
                viewport_width: inline_size,
                client_width: inline_size,
                offset_width: inline_size,
            },
        }
    }

    /// Observed width plus scrollbar compensation.
    #[must_use]
    pub fn effective_width(&self) -> f64 {
        self.inline_size + self.metrics.scrollbar_width()
    }
}

/// A live registration with a box-size observation service.
pub trait SizeSubscription {
    /// Stop delivering notifications and release host resources.
    fn unsubscribe(&mut self);
}

/// Subscription for hosts that deliver observations by hand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualSubscription {
    released: bool,
}

impl ManualSubscription {
    #[must_use]
    pub const fn new() -> Self {
        Self { released: false }
    }

    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl SizeSubscription for ManualSubscription {
    fn unsubscribe(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrollbar_width_from_metrics() {
        let m = ViewportMetrics {
            viewport_width: 1000.0,
            client_width: 984.0,
            offset_width: 984.0,
        };
        assert_eq!(m.scrollbar_width(), 16.0);
    }

    #[test]
    fn smaller_of_client_and_offset_is_used() {
        let m = ViewportMetrics {
            viewport_width: 1000.0,
            client_width: 983.0,
            offset_width: 1000.0,
        };
        assert_eq!(m.scrollbar_width(), 17.0);
    }

    #[test]
    fn no_scrollbar_when_widths_match() {
        let m = ViewportMetrics {
            viewport_width: 800.0,
            client_width: 800.0,
            offset_width: 800.0,
        };
        assert_eq!(m.scrollbar_width(), 0.0);
    }

    #[test]
    fn negative_difference_clamps_to_zero() {
        let m = ViewportMetrics {
            viewport_width: 800.0,
            client_width: 820.0,
            offset_width: 820.0,
        };
        assert_eq!(m.scrollbar_width(), 0.0);
    }

    #[test]
    fn effective_width_adds_compensation() {
        let obs = WidthObservation {
            inline_size: 984.0,
            metrics: ViewportMetrics {
                viewport_width: 1000.0,
                client_width: 984.0,
                offset_width: 984.0,
            },
        };
        assert_eq!(obs.effective_width(), 1000.0);
        assert_eq!(WidthObservation::plain(640.0).effective_width(), 640.0);
    }

    #[test]
    fn manual_subscription_releases() {
        let mut sub = ManualSubscription::new();
        assert!(!sub.is_released());
        sub.unsubscribe();
        assert!(sub.is_released());
    }
}
