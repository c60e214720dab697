use async_trait::async_trait;
use common::{PredictRequest, PredictionResponse};
use gloo_net::http::Request;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::settings::AppSettings;

/// Backend call behind the prediction form.
#[async_trait(?Send)]
pub trait PredictionApi {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionResponse, DashboardError>;
}

/// `PredictionApi` over HTTP, posting to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpPredictionApi {
    url: String,
}

impl HttpPredictionApi {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            url: settings.predict_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl PredictionApi for HttpPredictionApi {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionResponse, DashboardError> {
        log::trace!("Submitting prediction request with {} field(s), risk={}", request.len(), request.risk());
        post_json(&self.url, request).await
    }
}

/// POSTs `body` as JSON and parses the JSON reply.
///
/// The status code is not treated as a failure: the backend reports
/// application errors as a JSON body alongside a 4xx/5xx status, and that
/// body is what the caller needs to show.
pub async fn post_json<T, B>(url: &str, body: &B) -> Result<T, DashboardError>
where
    T: for<'de> Deserialize<'de>,
    B: Serialize,
{
    log::debug!("POST request to: {}", url);

    let response = Request::post(url)
        .json(body)
        .map_err(|e| {
            let err = DashboardError::Serialize(e.to_string());
            log::error!("POST {} - {}", url, err);
            err
        })?
        .send()
        .await
        .map_err(|e| {
            let err = DashboardError::Request(e.to_string());
            log::error!("POST {} - {}", url, err);
            err
        })?;

    if !response.ok() {
        log::warn!("POST {} - Non-OK response: {}", url, response.status());
    }

    log::trace!("POST {} - Response received, parsing JSON", url);
    let parsed = response.json::<T>().await.map_err(|e| {
        let err = DashboardError::Parse(e.to_string());
        log::error!("POST {} - {}", url, err);
        err
    })?;

    log::info!("POST {} - Response parsed (status {})", url, response.status());
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_endpoint() {
        let settings = AppSettings {
            api_base: "https://stocks.example.com".to_string(),
            ..AppSettings::default()
        };

        assert_eq!(HttpPredictionApi::new(&settings).url(), "https://stocks.example.com/predict-next");
        assert_eq!(HttpPredictionApi::new(&AppSettings::default()).url(), "/predict-next");
    }
}
