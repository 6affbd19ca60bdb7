#![forbid(unsafe_code)]

//! `ResizeObserver` subscription and viewport measurement.

use domshift_core::{SizeSubscription, ViewportMetrics, WidthObservation};
use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, HtmlElement, ResizeObserver, ResizeObserverBoxOptions, ResizeObserverEntry,
    ResizeObserverOptions, ResizeObserverSize,
};

type ResizeCallback = Closure<dyn FnMut(Array, ResizeObserver)>;

/// A content-box `ResizeObserver` on one element.
///
/// The callback closure lives as long as the subscription; unsubscribing
/// disconnects the observer and drops the closure.
pub struct ResizeObserverSubscription {
    observer: ResizeObserver,
    callback: Option<ResizeCallback>,
}

impl ResizeObserverSubscription {
    /// Observe `target`'s content box, handing each notification to `on_resize`.
    pub fn observe(
        target: &Element,
        mut on_resize: impl FnMut(WidthObservation) + 'static,
    ) -> Result<Self, JsValue> {
        let observed = target.clone();
        let callback: ResizeCallback = Closure::new(move |entries: Array, _: ResizeObserver| {
            if let Some(observation) = read_observation(&entries, &observed) {
                on_resize(observation);
            }
        });
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        let options = ResizeObserverOptions::new();
        options.set_box(ResizeObserverBoxOptions::ContentBox);
        observer.observe_with_options(target, &options);
        Ok(Self {
            observer,
            callback: Some(callback),
        })
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.callback.is_some()
    }
}

impl SizeSubscription for ResizeObserverSubscription {
    fn unsubscribe(&mut self) {
        self.observer.disconnect();
        self.callback = None;
    }
}

/// Inline size of the last entry plus viewport metrics for `observed`.
#[must_use]
pub fn read_observation(entries: &Array, observed: &Element) -> Option<WidthObservation> {
    let entry = entries.iter().last()?.dyn_into::<ResizeObserverEntry>().ok()?;
    let inline_size = entry
        .content_box_size()
        .iter()
        .next()
        .and_then(|size| size.dyn_into::<ResizeObserverSize>().ok())
        .map_or_else(|| entry.content_rect().width(), |size| size.inline_size());
    Some(WidthObservation {
        inline_size,
        metrics: viewport_metrics(observed, inline_size),
    })
}

fn viewport_metrics(observed: &Element, fallback: f64) -> ViewportMetrics {
    let viewport_width = web_sys::window()
        .and_then(|window| window.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(fallback);
    let client_width = f64::from(observed.client_width());
    let offset_width = observed
        .dyn_ref::<HtmlElement>()
        .map_or(client_width, |el| f64::from(el.offset_width()));
    ViewportMetrics {
        viewport_width,
        client_width,
        offset_width,
    }
}
