use wasm_bindgen::prelude::*;

use crate::chart::{ChartConfig, ChartFactory, ChartHandle};
use crate::error::{describe_js, DashboardError};

#[wasm_bindgen]
extern "C" {
    /// The global `Chart` class of Chart.js, loaded by the host page.
    #[wasm_bindgen(js_name = Chart)]
    pub type JsChart;

    #[wasm_bindgen(constructor, js_class = "Chart", catch)]
    fn new(context: &JsValue, config: &JsValue) -> Result<JsChart, JsValue>;

    #[wasm_bindgen(method, js_class = "Chart")]
    fn destroy(this: &JsChart);
}

/// Version string of the loaded Chart.js, or `None` when the library is missing.
pub fn library_version() -> Option<String> {
    let chart = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Chart")).ok()?;
    if chart.is_undefined() || chart.is_null() {
        return None;
    }
    js_sys::Reflect::get(&chart, &JsValue::from_str("version"))
        .ok()
        .and_then(|v| v.as_string())
}

/// `ChartFactory` backed by Chart.js.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartJs;

impl ChartFactory for ChartJs {
    type Target = JsValue;
    type Handle = ChartJsInstance;

    fn create(&self, context: &JsValue, config: &ChartConfig) -> Result<ChartJsInstance, DashboardError> {
        let config = serde_wasm_bindgen::to_value(config)
            .map_err(|e| DashboardError::Chart(format!("Invalid chart config: {}", e)))?;

        let chart = JsChart::new(context, &config).map_err(|e| DashboardError::Chart(describe_js(&e)))?;
        Ok(ChartJsInstance { chart })
    }
}

/// A live Chart.js chart.
pub struct ChartJsInstance {
    chart: JsChart,
}

impl ChartHandle for ChartJsInstance {
    fn destroy(&mut self) {
        self.chart.destroy();
    }
}
