use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Form field carrying the investor's risk appetite.
pub const RISK_FIELD: &str = "risk";

/// Request body for `POST /predict-next`: the submitted form fields as a
/// flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictRequest {
    fields: BTreeMap<String, String>,
}

impl PredictRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field. A repeated name overwrites the earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn risk(&self) -> RiskProfile {
        self.get(RISK_FIELD).map(RiskProfile::from).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PredictRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (name, value) in iter {
            request.insert(name, value);
        }
        request
    }
}

/// Risk appetite the backend tailors its suggestion to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskProfile {
    Low,
    #[default]
    Medium,
    High,
}

impl From<&str> for RiskProfile {
    /// Anything other than `Low` or `Medium` is treated as `High`, matching
    /// the backend's fallthrough.
    fn from(value: &str) -> Self {
        match value {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(name)
    }
}

/// Successful prediction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted next close price
    pub prediction: f64,
    /// Personalized suggestion text
    pub suggestion: String,
    /// Recent trend label (e.g. "Rising")
    pub trend: String,
    /// Volatility in percent
    pub volatility: f64,
    /// Most recent closes, oldest first
    #[serde(default, deserialize_with = "lenient_series")]
    pub last_30_days: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Failure payload, returned by the backend together with a 4xx/5xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRejection {
    pub error: String,
}

/// Response body of `POST /predict-next`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Predicted(PredictionResult),
    Rejected(PredictionRejection),
}

impl PredictionResponse {
    /// Splits the response into the result or the backend's error message.
    /// A non-empty `error` wins even when prediction fields are present.
    pub fn into_result(self) -> Result<PredictionResult, String> {
        match self {
            Self::Predicted(result) => match result.error {
                Some(ref error) if !error.is_empty() => Err(error.clone()),
                _ => Ok(result),
            },
            Self::Rejected(rejection) => Err(rejection.error),
        }
    }
}

/// Accepts a numeric array; anything else (null, object, string) becomes
/// an empty series.
fn lenient_series<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Series {
        Values(Vec<f64>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Series::deserialize(deserializer)? {
        Series::Values(values) => values,
        Series::Other(_) => Vec::new(),
    })
}
