use common::{PriceHistory, PredictionResult};
use serde::Serialize;

use crate::error::DashboardError;

pub const HISTORY_BORDER: &str = "#3b82f6";
pub const HISTORY_FILL: &str = "rgba(59,130,246,0.2)";
pub const PREDICTION_BORDER: &str = "#28a745";
pub const PREDICTION_FILL: &str = "rgba(40,167,69,0.2)";
/// Marker color for observed closes on the prediction chart
pub const OBSERVED_POINT: &str = "#3b82f6";
/// Marker color for the forecasted close
pub const PREDICTED_POINT: &str = "#f87171";

pub const PREDICTION_TITLE: &str = "Last 30 Days + Prediction";
pub const PREDICTION_LABEL: &str = "Prediction";

/// Chart.js configuration object (`new Chart(ctx, config)`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
    pub tension: f64,
    pub point_background_color: PointColors,
}

/// Chart.js accepts either one color for every marker or one per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PointColors {
    Uniform(String),
    PerPoint(Vec<String>),
}

impl PointColors {
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match self {
            Self::Uniform(color) => Some(color),
            Self::PerPoint(colors) => colors.get(index).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub plugins: Plugins,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    fn text(text: impl Into<String>) -> Self {
        Self {
            display: true,
            text: Some(text.into()),
            font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

fn line_chart(labels: Vec<String>, dataset: Dataset, title: Title, x_label: &str, currency: &str) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels,
            datasets: vec![dataset],
        },
        options: ChartOptions {
            responsive: true,
            plugins: Plugins {
                legend: Legend { display: false },
                title,
            },
            scales: Scales {
                x: Axis {
                    title: Title::text(x_label),
                },
                y: Axis {
                    title: Title::text(format!("Close Price ({})", currency)),
                },
            },
        },
    }
}

/// Close-price line chart over the host page's history.
pub fn history_chart_config(history: &PriceHistory, currency: &str) -> ChartConfig {
    let dataset = Dataset {
        label: "Close Price".to_string(),
        data: history.prices.clone(),
        border_color: HISTORY_BORDER.to_string(),
        background_color: HISTORY_FILL.to_string(),
        fill: true,
        tension: 0.25,
        point_background_color: PointColors::Uniform(HISTORY_BORDER.to_string()),
    };

    // Title is shown but left blank; the host page supplies the heading.
    let title = Title {
        display: true,
        text: None,
        font: None,
    };

    line_chart(history.dates.clone(), dataset, title, "Date", currency)
}

/// Recent closes followed by the forecasted close, whose marker stands out.
pub fn prediction_chart_config(result: &PredictionResult, currency: &str) -> ChartConfig {
    let observed = result.last_30_days.len();

    let mut labels: Vec<String> = (1..=observed).map(|day| format!("Day {}", day)).collect();
    labels.push(PREDICTION_LABEL.to_string());

    let mut data = result.last_30_days.clone();
    data.push(result.prediction);

    let mut colors = vec![OBSERVED_POINT.to_string(); observed];
    colors.push(PREDICTED_POINT.to_string());

    let dataset = Dataset {
        label: "Close Price".to_string(),
        data,
        border_color: PREDICTION_BORDER.to_string(),
        background_color: PREDICTION_FILL.to_string(),
        fill: true,
        tension: 0.2,
        point_background_color: PointColors::PerPoint(colors),
    };

    let title = Title {
        display: true,
        text: Some(PREDICTION_TITLE.to_string()),
        font: Some(Font {
            size: 14,
            weight: "bold".to_string(),
        }),
    };

    line_chart(labels, dataset, title, "Days", currency)
}

/// A live chart instance owned by the charting library.
pub trait ChartHandle {
    /// Releases the instance and detaches it from its canvas.
    fn destroy(&mut self);
}

/// Constructor side of the charting library.
pub trait ChartFactory {
    /// What a chart is drawn onto (a 2D canvas context in the browser)
    type Target;
    type Handle: ChartHandle;

    fn create(&self, target: &Self::Target, config: &ChartConfig) -> Result<Self::Handle, DashboardError>;
}

/// Holds at most one live chart for a canvas.
#[derive(Debug)]
pub struct ChartSlot<H> {
    current: Option<H>,
}

impl<H> Default for ChartSlot<H> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<H: ChartHandle> ChartSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys the current chart, then stores the one built by `create`.
    /// If `create` fails the slot is left empty.
    pub fn replace<F>(&mut self, create: F) -> Result<(), DashboardError>
    where
        F: FnOnce() -> Result<H, DashboardError>,
    {
        self.clear();
        self.current = Some(create()?);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(mut handle) = self.current.take() {
            handle.destroy();
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.current.is_some()
    }
}
