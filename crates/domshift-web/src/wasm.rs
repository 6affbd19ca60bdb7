#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`DomShift`].
//!
//! Only compiled on `wasm32` targets.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use domshift_core::{
    ObservedRelocator, RawValue, RelocateError, RelocationConfig, Relocator, RelocatorOptions,
    WidthObservation,
};
use js_sys::Reflect;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::bridge::{DEFAULT_KEY, JsErrorClass, ThresholdKey, js_error_parts};
use crate::dom::WebDom;
use crate::intake::raw_value;
use crate::observer::ResizeObserverSubscription;

type Binding = ObservedRelocator<WebDom, ResizeObserverSubscription>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn to_js_error(err: &RelocateError) -> JsValue {
    let (class, message) = js_error_parts(err);
    match class {
        JsErrorClass::TypeError => js_sys::TypeError::new(&message).into(),
        JsErrorClass::RangeError => js_sys::RangeError::new(&message).into(),
        JsErrorClass::Error => js_sys::Error::new(&message).into(),
    }
}

fn host_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn document_root(dom: &WebDom) -> Result<Element, JsValue> {
    dom.document()
        .document_element()
        .ok_or_else(|| host_error("document has no root element"))
}

/// Breakpoint-driven element relocation for the current document.
#[wasm_bindgen]
pub struct DomShift {
    inner: Rc<RefCell<Binding>>,
}

#[wasm_bindgen]
impl DomShift {
    /// Validate `specs`, apply the default layout and start observing.
    ///
    /// Throws `TypeError` for malformed specs and `RangeError` for invalid
    /// thresholds or positions. Nothing is moved when it throws.
    #[wasm_bindgen(constructor)]
    pub fn new(specs: Box<[JsValue]>) -> Result<DomShift, JsValue> {
        install_panic_hook();
        let mut dom = WebDom::from_window().ok_or_else(|| host_error("no global document"))?;
        let raw: Vec<RawValue<Element>> = specs.iter().map(raw_value).collect();
        let relocator = Relocator::from_raw(&mut dom, raw, RelocatorOptions::new())
            .map_err(|err| to_js_error(&err))?;
        Self::bind(dom, relocator)
    }

    /// Build from a JSON config whose elements are referenced by `id`.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(text: &str) -> Result<DomShift, JsValue> {
        install_panic_hook();
        let mut dom = WebDom::from_window().ok_or_else(|| host_error("no global document"))?;
        let config = RelocationConfig::from_json(&dom, text)
            .map_err(|err| to_js_error(&RelocateError::from(err)))?;
        let relocator = config.build(&mut dom).map_err(|err| to_js_error(&err))?;
        Self::bind(dom, relocator)
    }

    /// Threshold applied last: a pixel value or `"default"`.
    #[wasm_bindgen(js_name = activeThreshold)]
    pub fn active_threshold(&self) -> JsValue {
        match ThresholdKey::from(self.inner.borrow().relocator().active()) {
            ThresholdKey::Width(px) => JsValue::from_f64(px),
            ThresholdKey::Default => JsValue::from_str(DEFAULT_KEY),
        }
    }

    /// Numeric thresholds, ascending.
    pub fn thresholds(&self) -> Vec<f64> {
        self.inner
            .borrow()
            .relocator()
            .thresholds()
            .as_slice()
            .iter()
            .map(|px| px.get())
            .collect()
    }

    /// Stop observing. Elements stay where they are.
    pub fn dispose(&self) {
        self.inner.borrow_mut().dispose();
    }

    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().is_disposed()
    }
}

impl DomShift {
    fn bind(dom: WebDom, relocator: Relocator<Element>) -> Result<DomShift, JsValue> {
        let root = document_root(&dom)?;
        let handle: Rc<OnceCell<Weak<RefCell<Binding>>>> = Rc::new(OnceCell::new());
        let subscription = {
            let handle = Rc::clone(&handle);
            ResizeObserverSubscription::observe(&root, move |observation| {
                deliver(&handle, observation);
            })?
        };
        let inner = Rc::new(RefCell::new(ObservedRelocator::new(
            dom,
            relocator,
            subscription,
        )));
        let _ = handle.set(Rc::downgrade(&inner));
        Ok(Self { inner })
    }
}

fn deliver(handle: &OnceCell<Weak<RefCell<Binding>>>, observation: WidthObservation) {
    let Some(binding) = handle.get().and_then(Weak::upgrade) else {
        return;
    };
    match binding.try_borrow_mut() {
        Ok(mut binding) => {
            binding.deliver(observation);
        }
        Err(_) => debug!(
            width = observation.effective_width(),
            "binding busy; notification skipped"
        ),
    };
}
