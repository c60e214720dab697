use std::rc::Rc;

pub mod api_client;
pub mod chart;
pub mod chartjs;
pub mod dashboard;
pub mod error;
pub mod page;
pub mod report;
pub mod settings;

use api_client::HttpPredictionApi;
use chartjs::ChartJs;
use dashboard::DashboardUi;
use page::DomPage;

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    // Initialize settings first
    settings::init_settings();

    // Initialize logger with settings
    let settings = settings::get_settings();
    wasm_logger::init(wasm_logger::Config::new(settings.log_level));

    log::info!("=== Stock Dashboard Starting ===");
    log::info!("Application settings: {:?}", settings);
    log::debug!("Prediction endpoint: {}", settings.predict_url());

    match chartjs::library_version() {
        Some(version) => log::info!("Chart.js version: {}", version),
        None => log::warn!("Chart.js is not loaded; charts will not render"),
    }

    let Some(page) = DomPage::attach() else {
        log::error!("No document available; dashboard not started");
        return;
    };

    let dashboard = Rc::new(DashboardUi::new(
        page.clone(),
        ChartJs,
        HttpPredictionApi::new(&settings),
        settings.currency_symbol.clone(),
    ));

    dashboard.init();

    if let Err(e) = page::bind_predict_form(&page, dashboard) {
        log::error!("Failed to bind prediction form: {}", e);
    }

    log::info!("Dashboard initialized successfully");
}
