use std::cell::RefCell;

use common::{PredictRequest, PriceHistory, PredictionResult};

use crate::api_client::PredictionApi;
use crate::chart::{history_chart_config, prediction_chart_config, ChartFactory, ChartSlot};
use crate::error::DashboardError;
use crate::page::{Page, HISTORY_CANVAS_ID, PREDICTION_CANVAS_ID};
use crate::report::Report;

/// How a prediction form submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Report shown; `charted` tells whether the prediction chart was drawn.
    Predicted { charted: bool },
    /// The backend answered with an error, shown inline.
    Rejected(String),
    /// Request or parsing failed; the generic message was shown.
    Unavailable(String),
    /// The page has no report panel, so nothing was drawn.
    Detached,
}

/// Controller for the price dashboard page: owns the two charts and reacts
/// to prediction form submissions.
pub struct DashboardUi<P, F, A>
where
    F: ChartFactory,
{
    page: P,
    charts: F,
    api: A,
    currency: String,
    history_chart: RefCell<ChartSlot<F::Handle>>,
    prediction_chart: RefCell<ChartSlot<F::Handle>>,
}

impl<P, F, A> DashboardUi<P, F, A>
where
    P: Page,
    F: ChartFactory<Target = P::Canvas>,
    A: PredictionApi,
{
    pub fn new(page: P, charts: F, api: A, currency: impl Into<String>) -> Self {
        Self {
            page,
            charts,
            api,
            currency: currency.into(),
            history_chart: RefCell::new(ChartSlot::new()),
            prediction_chart: RefCell::new(ChartSlot::new()),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Draws the history chart from the host page's data. Failures are
    /// logged, never raised.
    pub fn init(&self) {
        let history = self.page.price_history();
        if let Err(e) = self.render_history_chart(history.as_ref()) {
            log::error!("Error initializing main dashboard chart: {}", e);
        }
    }

    /// Renders the close-price chart into `#stockChart`, replacing any
    /// previous one. Returns `Ok(false)` when there is no data or no canvas.
    pub fn render_history_chart(&self, history: Option<&PriceHistory>) -> Result<bool, DashboardError> {
        let Some(history) = history else {
            log::debug!("No price history on page; skipping history chart");
            return Ok(false);
        };
        let Some(canvas) = self.page.canvas(HISTORY_CANVAS_ID) else {
            log::debug!("No #{} canvas; skipping history chart", HISTORY_CANVAS_ID);
            return Ok(false);
        };

        let config = history_chart_config(history, &self.currency);
        self.history_chart
            .borrow_mut()
            .replace(|| self.charts.create(&canvas, &config))?;

        log::info!("History chart rendered with {} points", history.len());
        Ok(true)
    }

    /// Sends the form fields to the prediction endpoint and shows the
    /// outcome. No retry, timeout or cancellation.
    pub async fn on_predict_submit(&self, request: PredictRequest) -> SubmitOutcome {
        log::debug!("Prediction requested with risk profile {}", request.risk());

        // No chart state is borrowed across this await.
        let response = self.api.predict(&request).await;

        let result = match response {
            Ok(response) => response.into_result(),
            Err(e) => {
                log::error!("Prediction error: {}", e);
                if !self.page.show_report(&Report::Unavailable.to_html()) {
                    return SubmitOutcome::Detached;
                }
                return SubmitOutcome::Unavailable(e.to_string());
            }
        };

        match result {
            Err(message) if message.trim().is_empty() => {
                log::error!("Prediction rejected without a message");
                if !self.page.show_report(&Report::Unavailable.to_html()) {
                    return SubmitOutcome::Detached;
                }
                SubmitOutcome::Unavailable("empty error message".to_string())
            }
            Err(message) => {
                log::warn!("Prediction rejected by backend: {}", message);
                if !self.page.show_report(&Report::Rejected(&message).to_html()) {
                    return SubmitOutcome::Detached;
                }
                SubmitOutcome::Rejected(message)
            }
            Ok(result) => {
                let report = Report::Prediction {
                    result: &result,
                    currency: &self.currency,
                };
                if !self.page.show_report(&report.to_html()) {
                    return SubmitOutcome::Detached;
                }
                log::info!("Prediction received: {} ({})", result.prediction, result.trend);

                let charted = match self.render_prediction_chart(&result) {
                    Ok(charted) => charted,
                    Err(e) => {
                        log::error!("Failed to render prediction chart: {}", e);
                        false
                    }
                };
                SubmitOutcome::Predicted { charted }
            }
        }
    }

    fn render_prediction_chart(&self, result: &PredictionResult) -> Result<bool, DashboardError> {
        let Some(canvas) = self.page.canvas(PREDICTION_CANVAS_ID) else {
            log::debug!("No #{} canvas; skipping prediction chart", PREDICTION_CANVAS_ID);
            return Ok(false);
        };

        let config = prediction_chart_config(result, &self.currency);
        self.prediction_chart
            .borrow_mut()
            .replace(|| self.charts.create(&canvas, &config))?;
        Ok(true)
    }

    pub fn has_history_chart(&self) -> bool {
        self.history_chart.borrow().is_occupied()
    }

    pub fn has_prediction_chart(&self) -> bool {
        self.prediction_chart.borrow().is_occupied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartConfig, ChartHandle, PREDICTED_POINT};
    use crate::report::UNAVAILABLE_MESSAGE;
    use async_trait::async_trait;
    use common::PredictionResponse;
    use futures::executor::block_on;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum ChartEvent {
        Created { id: usize, canvas: String, config: ChartConfig },
        Destroyed { id: usize },
    }

    type EventLog = Rc<RefCell<Vec<ChartEvent>>>;

    struct FakePage {
        history: Option<PriceHistory>,
        canvases: Vec<&'static str>,
        has_report: bool,
        report: RefCell<Option<String>>,
    }

    impl FakePage {
        fn full() -> Self {
            Self {
                history: Some(PriceHistory::new(
                    vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
                    vec![21500.0, 21610.0],
                )),
                canvases: vec![HISTORY_CANVAS_ID, PREDICTION_CANVAS_ID],
                has_report: true,
                report: RefCell::new(None),
            }
        }

        fn report(&self) -> Option<String> {
            self.report.borrow().clone()
        }
    }

    impl Page for FakePage {
        type Canvas = String;

        fn price_history(&self) -> Option<PriceHistory> {
            self.history.clone()
        }

        fn canvas(&self, id: &str) -> Option<String> {
            self.canvases.iter().find(|c| **c == id).map(|c| c.to_string())
        }

        fn show_report(&self, html: &str) -> bool {
            if self.has_report {
                *self.report.borrow_mut() = Some(html.to_string());
            }
            self.has_report
        }
    }

    struct FakeHandle {
        id: usize,
        log: EventLog,
    }

    impl ChartHandle for FakeHandle {
        fn destroy(&mut self) {
            self.log.borrow_mut().push(ChartEvent::Destroyed { id: self.id });
        }
    }

    #[derive(Default)]
    struct FakeCharts {
        log: EventLog,
        next_id: RefCell<usize>,
        fail: bool,
    }

    impl FakeCharts {
        fn created_on(&self, canvas: &str) -> Vec<ChartConfig> {
            self.log
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    ChartEvent::Created { canvas: c, config, .. } if c == canvas => Some(config.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl ChartFactory for FakeCharts {
        type Target = String;
        type Handle = FakeHandle;

        fn create(&self, canvas: &String, config: &ChartConfig) -> Result<FakeHandle, DashboardError> {
            if self.fail {
                return Err(DashboardError::Chart("Chart is not defined".to_string()));
            }
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            self.log.borrow_mut().push(ChartEvent::Created {
                id: *next_id,
                canvas: canvas.clone(),
                config: config.clone(),
            });
            Ok(FakeHandle {
                id: *next_id,
                log: self.log.clone(),
            })
        }
    }

    struct FakeApi {
        reply: Result<PredictionResponse, DashboardError>,
        requests: RefCell<Vec<PredictRequest>>,
    }

    impl FakeApi {
        fn replying(body: serde_json::Value) -> Self {
            Self {
                reply: Ok(serde_json::from_value(body).expect("Should be a valid response")),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing(error: DashboardError) -> Self {
            Self {
                reply: Err(error),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl PredictionApi for FakeApi {
        async fn predict(&self, request: &PredictRequest) -> Result<PredictionResponse, DashboardError> {
            self.requests.borrow_mut().push(request.clone());
            self.reply.clone()
        }
    }

    fn prediction_body() -> serde_json::Value {
        let last_30: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 4.0 / 29.0).collect();
        serde_json::json!({
            "prediction": 105.2,
            "suggestion": "Hold",
            "trend": "Up",
            "volatility": 3.1,
            "last_30_days": last_30,
        })
    }

    fn dashboard(page: FakePage, api: FakeApi) -> DashboardUi<FakePage, FakeCharts, FakeApi> {
        DashboardUi::new(page, FakeCharts::default(), api, "₹")
    }

    #[test]
    fn test_history_render_without_data_is_noop() {
        let page = FakePage {
            history: None,
            ..FakePage::full()
        };
        let ui = dashboard(page, FakeApi::replying(prediction_body()));

        ui.init();

        assert_eq!(ui.render_history_chart(None), Ok(false));
        assert!(!ui.has_history_chart());
        assert!(ui.charts.log.borrow().is_empty());
    }

    #[test]
    fn test_history_render_without_canvas_is_noop() {
        let page = FakePage {
            canvases: vec![],
            ..FakePage::full()
        };
        let ui = dashboard(page, FakeApi::replying(prediction_body()));

        let history = ui.page().price_history();
        assert_eq!(ui.render_history_chart(history.as_ref()), Ok(false));
        assert!(ui.charts.log.borrow().is_empty());
    }

    #[test]
    fn test_history_render_draws_host_data() {
        let ui = dashboard(FakePage::full(), FakeApi::replying(prediction_body()));

        ui.init();

        let configs = ui.charts.created_on(HISTORY_CANVAS_ID);
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].data.datasets[0].data, vec![21500.0, 21610.0]);
        assert!(ui.has_history_chart());
    }

    #[test]
    fn test_history_rerender_destroys_previous_chart_first() {
        let ui = dashboard(FakePage::full(), FakeApi::replying(prediction_body()));
        let history = ui.page().price_history();

        assert_eq!(ui.render_history_chart(history.as_ref()), Ok(true));
        assert_eq!(ui.render_history_chart(history.as_ref()), Ok(true));

        let log = ui.charts.log.borrow();
        assert_eq!(log.len(), 3);
        assert!(matches!(log[0], ChartEvent::Created { id: 1, .. }));
        assert_eq!(log[1], ChartEvent::Destroyed { id: 1 });
        assert!(matches!(log[2], ChartEvent::Created { id: 2, .. }));
    }

    #[test]
    fn test_history_chart_failure_is_reported() {
        let ui = DashboardUi::new(
            FakePage::full(),
            FakeCharts {
                fail: true,
                ..FakeCharts::default()
            },
            FakeApi::replying(prediction_body()),
            "₹",
        );

        let history = ui.page().price_history();
        assert!(matches!(
            ui.render_history_chart(history.as_ref()),
            Err(DashboardError::Chart(_))
        ));
        // Startup swallows the error.
        ui.init();
        assert!(!ui.has_history_chart());
    }

    #[test]
    fn test_successful_prediction_shows_report_and_chart() {
        let ui = dashboard(FakePage::full(), FakeApi::replying(prediction_body()));
        let request = PredictRequest::new().with_field("risk", "Low");

        let outcome = block_on(ui.on_predict_submit(request.clone()));

        assert_eq!(outcome, SubmitOutcome::Predicted { charted: true });
        assert_eq!(*ui.api.requests.borrow(), vec![request]);

        let report = ui.page().report().expect("Report should be shown");
        assert!(report.contains("105.2"));
        assert!(report.contains("Hold"));
        assert!(report.contains("Up"));
        assert!(report.contains("3.1%"));

        let configs = ui.charts.created_on(PREDICTION_CANVAS_ID);
        assert_eq!(configs.len(), 1);
        let dataset = &configs[0].data.datasets[0];
        assert_eq!(dataset.data.len(), 31);
        assert_eq!(dataset.data[30], 105.2);

        let last = dataset.point_background_color.color_at(30);
        assert_eq!(last, Some(PREDICTED_POINT));
        for i in 0..30 {
            assert_ne!(dataset.point_background_color.color_at(i), last);
        }
    }

    #[test]
    fn test_repeated_predictions_replace_chart() {
        let ui = dashboard(FakePage::full(), FakeApi::replying(prediction_body()));

        block_on(ui.on_predict_submit(PredictRequest::new()));
        block_on(ui.on_predict_submit(PredictRequest::new()));

        let log = ui.charts.log.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1], ChartEvent::Destroyed { id: 1 });
        assert!(ui.has_prediction_chart());
    }

    #[test]
    fn test_backend_error_is_shown_without_chart() {
        let ui = dashboard(
            FakePage::full(),
            FakeApi::replying(serde_json::json!({"error": "model unavailable"})),
        );

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert_eq!(outcome, SubmitOutcome::Rejected("model unavailable".to_string()));
        let report = ui.page().report().unwrap();
        assert!(report.contains("model unavailable"));
        assert!(report.contains("text-red-600"));
        assert!(ui.charts.log.borrow().is_empty());
        assert!(!ui.has_prediction_chart());
    }

    #[test]
    fn test_backend_error_keeps_existing_prediction_chart() {
        let mut ui = dashboard(FakePage::full(), FakeApi::replying(prediction_body()));
        block_on(ui.on_predict_submit(PredictRequest::new()));

        ui.api = FakeApi::replying(serde_json::json!({"error": "model unavailable"}));
        block_on(ui.on_predict_submit(PredictRequest::new()));

        assert!(ui.has_prediction_chart());
        assert_eq!(ui.charts.log.borrow().len(), 1);
    }

    #[test]
    fn test_empty_backend_error_shows_generic_message() {
        let ui = dashboard(FakePage::full(), FakeApi::replying(serde_json::json!({"error": ""})));

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert!(matches!(outcome, SubmitOutcome::Unavailable(_)));
        assert!(ui.page().report().unwrap().contains(UNAVAILABLE_MESSAGE));
        assert!(ui.charts.log.borrow().is_empty());
    }

    #[test]
    fn test_network_failure_shows_generic_message() {
        let ui = dashboard(
            FakePage::full(),
            FakeApi::failing(DashboardError::Request("TypeError: Failed to fetch".to_string())),
        );

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert!(matches!(outcome, SubmitOutcome::Unavailable(_)));
        assert!(ui.page().report().unwrap().contains(UNAVAILABLE_MESSAGE));
        assert!(ui.charts.log.borrow().is_empty());
    }

    #[test]
    fn test_parse_failure_shows_generic_message() {
        let ui = dashboard(
            FakePage::full(),
            FakeApi::failing(DashboardError::Parse("expected value at line 1".to_string())),
        );

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert_eq!(
            outcome,
            SubmitOutcome::Unavailable("Failed to parse response: expected value at line 1".to_string())
        );
        assert!(ui.page().report().unwrap().contains(UNAVAILABLE_MESSAGE));
    }

    #[test]
    fn test_missing_report_panel_skips_everything() {
        let page = FakePage {
            has_report: false,
            ..FakePage::full()
        };
        let ui = dashboard(page, FakeApi::replying(prediction_body()));

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert_eq!(outcome, SubmitOutcome::Detached);
        assert!(ui.charts.log.borrow().is_empty());
    }

    #[test]
    fn test_missing_prediction_canvas_still_reports() {
        let page = FakePage {
            canvases: vec![HISTORY_CANVAS_ID],
            ..FakePage::full()
        };
        let ui = dashboard(page, FakeApi::replying(prediction_body()));

        let outcome = block_on(ui.on_predict_submit(PredictRequest::new()));

        assert_eq!(outcome, SubmitOutcome::Predicted { charted: false });
        assert!(ui.page().report().unwrap().contains("105.2"));
    }
}
