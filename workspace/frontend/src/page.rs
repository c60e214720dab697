use std::rc::Rc;

use common::{PredictRequest, PriceHistory};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, FormData, HtmlCanvasElement, HtmlFormElement};

use crate::api_client::HttpPredictionApi;
use crate::chartjs::ChartJs;
use crate::dashboard::DashboardUi;
use crate::error::{describe_js, DashboardError};

pub const HISTORY_CANVAS_ID: &str = "stockChart";
pub const PREDICTION_CANVAS_ID: &str = "priceChart";
pub const PREDICT_FORM_ID: &str = "predictForm";
pub const REPORT_CONTAINER_ID: &str = "predictionReport";
pub const REPORT_TEXT_ID: &str = "reportText";

/// Host page global holding the history's date labels.
pub const DATES_GLOBAL: &str = "dates";
/// Host page global holding the history's closing prices.
pub const PRICES_GLOBAL: &str = "prices";

/// Everything the dashboard reads from or writes to the host page.
/// Every lookup is optional; a missing element means "skip".
pub trait Page {
    /// Drawing target handed to the chart library
    type Canvas;

    fn price_history(&self) -> Option<PriceHistory>;

    fn canvas(&self, id: &str) -> Option<Self::Canvas>;

    /// Reveals the report panel with `html` as its text. Returns `false`
    /// when the panel is not on the page.
    fn show_report(&self, html: &str) -> bool;
}

/// `Page` over the live browser document.
#[derive(Debug, Clone)]
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn attach() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for DomPage {
    type Canvas = JsValue;

    fn price_history(&self) -> Option<PriceHistory> {
        let dates = host_global(DATES_GLOBAL)?;
        let prices = host_global(PRICES_GLOBAL)?;

        let dates: Vec<String> = decode_global(DATES_GLOBAL, dates)?;
        let prices: Vec<f64> = decode_global(PRICES_GLOBAL, prices)?;

        let history = PriceHistory::new(dates, prices);
        if !history.is_aligned() {
            log::warn!(
                "Host history is misaligned: {} dates, {} prices",
                history.dates.len(),
                history.prices.len()
            );
        }
        Some(history)
    }

    fn canvas(&self, id: &str) -> Option<JsValue> {
        let canvas = self
            .document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let context = canvas.get_context("2d").ok()??;
        Some(context.into())
    }

    fn show_report(&self, html: &str) -> bool {
        let (Some(container), Some(text)) = (
            self.document.get_element_by_id(REPORT_CONTAINER_ID),
            self.document.get_element_by_id(REPORT_TEXT_ID),
        ) else {
            log::debug!("Report elements not found; skipping report");
            return false;
        };

        if let Err(e) = container.class_list().remove_1("hidden") {
            log::warn!("Failed to reveal report: {}", describe_js(&e));
        }
        text.set_inner_html(html);
        true
    }
}

#[wasm_bindgen]
extern "C" {
    /// The global `Function` constructor, used to see lexical globals.
    #[wasm_bindgen(js_name = Function)]
    type ScriptFunction;

    #[wasm_bindgen(constructor, js_class = "Function", catch)]
    fn new(body: &str) -> Result<ScriptFunction, JsValue>;

    #[wasm_bindgen(method, js_class = "Function", js_name = call, catch)]
    fn call0(this: &ScriptFunction, this_arg: &JsValue) -> Result<JsValue, JsValue>;
}

/// Reads a global binding by name. `window` properties are checked first;
/// `const`/`let` declarations of classic page scripts are not properties of
/// `window` and need a compiled lookup, which a strict CSP may forbid.
fn host_global(name: &str) -> Option<JsValue> {
    let on_window = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(name))
        .ok()
        .filter(is_present);

    resolve_global(name, on_window, || {
        let body = format!("return typeof {0} === 'undefined' ? undefined : {0};", name);
        let lookup = ScriptFunction::new(&body).map_err(|e| describe_js(&e))?;
        let value = lookup.call0(&JsValue::UNDEFINED).map_err(|e| describe_js(&e))?;
        Ok::<_, String>(Some(value).filter(is_present))
    })
}

fn is_present(value: &JsValue) -> bool {
    !value.is_undefined() && !value.is_null()
}

/// Prefers the `window` value; otherwise runs the lexical lookup, treating
/// a failed lookup as an absent global.
fn resolve_global<T, E, F>(name: &str, on_window: Option<T>, lexical: F) -> Option<T>
where
    E: std::fmt::Display,
    F: FnOnce() -> Result<Option<T>, E>,
{
    if on_window.is_some() {
        return on_window;
    }
    match lexical() {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Cannot look up host global `{}`: {}", name, e);
            None
        }
    }
}

fn decode_global<T>(name: &str, value: JsValue) -> Option<T>
where
    T: for<'de> serde::Deserialize<'de>,
{
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| log::warn!("Host global `{}` is not usable: {}", name, e))
        .ok()
}

/// Collects a form's fields the way `Object.fromEntries(new FormData(form))`
/// would. File inputs are skipped.
pub fn form_request(form: &HtmlFormElement) -> Result<PredictRequest, DashboardError> {
    let form_data = FormData::new_with_form(form).map_err(|e| DashboardError::Dom(describe_js(&e)))?;
    let entries = js_sys::try_iter(&form_data)
        .map_err(|e| DashboardError::Dom(describe_js(&e)))?
        .ok_or_else(|| DashboardError::Dom("FormData is not iterable".to_string()))?;

    let mut request = PredictRequest::new();
    for entry in entries {
        let entry = js_sys::Array::from(&entry.map_err(|e| DashboardError::Dom(describe_js(&e)))?);
        if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
            request.insert(name, value);
        }
    }
    Ok(request)
}

/// The request to send for a submit event, or `None` when the fields could
/// not be read. Nothing is posted in that case.
fn submitted_request(form: Option<Result<PredictRequest, DashboardError>>) -> Option<PredictRequest> {
    match form {
        Some(Ok(request)) => Some(request),
        Some(Err(e)) => {
            log::error!("Failed to read form fields: {}", e);
            None
        }
        None => {
            log::error!("Submit event did not come from a form");
            None
        }
    }
}

/// The dashboard as wired in the browser.
pub type BrowserDashboard = DashboardUi<DomPage, ChartJs, HttpPredictionApi>;

/// Routes `#predictForm` submissions to the dashboard. Does nothing when
/// the form is absent.
pub fn bind_predict_form(page: &DomPage, dashboard: Rc<BrowserDashboard>) -> Result<(), DashboardError> {
    let Some(form) = page.document().get_element_by_id(PREDICT_FORM_ID) else {
        log::debug!("No #{} on this page", PREDICT_FORM_ID);
        return Ok(());
    };

    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();

        let form = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
            .map(|form| form_request(&form));
        let Some(request) = submitted_request(form) else {
            return;
        };

        let dashboard = dashboard.clone();
        spawn_local(async move {
            let outcome = dashboard.on_predict_submit(request).await;
            log::debug!("Prediction submit finished: {:?}", outcome);
        });
    });

    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
        .map_err(|e| DashboardError::Dom(describe_js(&e)))?;
    // The listener lives as long as the page.
    on_submit.forget();

    log::debug!("Bound submit handler to #{}", PREDICT_FORM_ID);
    Ok(())
}
