use common::PredictionResult;

pub const UNAVAILABLE_MESSAGE: &str = "Unable to fetch prediction.";

const ERROR_LABEL: &str = r#"<span class="text-red-600 font-semibold">Error:</span>"#;

/// Text shown in the report panel next to the prediction form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report<'a> {
    /// Successful prediction, with the currency symbol to prefix the price
    Prediction {
        result: &'a PredictionResult,
        currency: &'a str,
    },
    /// The backend answered with an error message
    Rejected(&'a str),
    /// The request or response parsing failed
    Unavailable,
}

impl Report<'_> {
    /// Inner HTML for the report text element.
    pub fn to_html(&self) -> String {
        match self {
            Report::Prediction { result, currency } => format!(
                "Predicted Next Close Price: <strong>{}{}</strong><br>\
                 Personalized Suggestion: <strong>{}</strong><br>\
                 Last 30 Days Trend: <strong>{}</strong><br>\
                 Volatility: <strong>{}%</strong>",
                escape_html(currency),
                result.prediction,
                escape_html(&result.suggestion),
                escape_html(&result.trend),
                result.volatility,
            ),
            Report::Rejected(message) => format!("{} {}", ERROR_LABEL, escape_html(message)),
            Report::Unavailable => format!("{} {}", ERROR_LABEL, UNAVAILABLE_MESSAGE),
        }
    }
}

/// Escapes text for interpolation into element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
