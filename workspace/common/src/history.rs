use serde::{Deserialize, Serialize};

/// A single closing price on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

/// Historical closing prices as supplied by the host page: two parallel
/// sequences of date labels and prices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

impl PriceHistory {
    pub fn new(dates: Vec<String>, prices: Vec<f64>) -> Self {
        Self { dates, prices }
    }

    /// Zips the two sequences into points. Trailing entries of the longer
    /// sequence are dropped.
    pub fn points(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.dates
            .iter()
            .zip(self.prices.iter())
            .map(|(date, price)| PricePoint {
                date: date.clone(),
                price: *price,
            })
    }

    /// Whether every date has exactly one price.
    pub fn is_aligned(&self) -> bool {
        self.dates.len() == self.prices.len()
    }

    pub fn len(&self) -> usize {
        self.dates.len().min(self.prices.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
