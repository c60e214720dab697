//! Transport-layer types shared with the prediction backend.
//! These structs mirror the host page data and the `/predict-next`
//! request/response payloads so the frontend can (de)serialize them
//! without duplicating shapes.

mod history;
mod prediction;

pub use history::{PriceHistory, PricePoint};
pub use prediction::{RISK_FIELD, PredictRequest, PredictionRejection, PredictionResponse, PredictionResult, RiskProfile};
