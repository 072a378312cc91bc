//! Spend currency normalization ahead of procurement requests.

use std::collections::BTreeMap;

use crate::config::types::ProcurementSettings;

/// Currencies the compute service accepts directly (lower-case ISO 4217).
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "usd", "afn", "dzd", "ars", "aud", "bhd", "brl", "cad", "kyd", "cny", "dkk", "egp", "eur",
    "hkd", "huf", "isk", "inr", "iqd", "ils", "jpy", "lbp", "mxn", "mad", "nzd", "nok", "qar",
    "rub", "sar", "sgd", "zar", "krw", "sek", "chf", "thb", "twd", "tnd", "try", "aed", "gbp",
];

/// Source of conversion factors into a single base currency.
pub trait ExchangeRates {
    /// Currency converted amounts are expressed in.
    fn base_currency(&self) -> &str;

    /// Multiplier from `currency` into the base currency.
    fn rate(&self, currency: &str) -> Option<f64>;
}

/// Fixed rates taken from the job file.
#[derive(Debug, Clone)]
pub struct StaticRates {
    base_currency: String,
    rates: BTreeMap<String, f64>,
}

impl StaticRates {
    #[must_use]
    pub fn new(base_currency: impl Into<String>, rates: BTreeMap<String, f64>) -> Self {
        Self {
            base_currency: base_currency.into().to_lowercase(),
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.to_lowercase(), rate))
                .collect(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ProcurementSettings) -> Self {
        Self::new(settings.base_currency.clone(), settings.rates.clone())
    }
}

impl ExchangeRates for StaticRates {
    fn base_currency(&self) -> &str {
        &self.base_currency
    }

    fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

#[must_use]
pub fn is_supported(currency: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&currency)
}

/// Normalize a spend amount and currency for the service.
///
/// Supported currencies pass through (lower-cased). Unsupported ones are
/// converted when a rate is known and passed through otherwise.
pub fn normalize_spend(amount: f64, currency: &str, rates: &dyn ExchangeRates) -> (f64, String) {
    let code = currency.trim().to_lowercase();
    if is_supported(&code) {
        return (amount, code);
    }
    match rates.rate(&code) {
        Some(rate) => {
            let base = rates.base_currency().to_string();
            tracing::debug!(from = code.as_str(), to = base.as_str(), rate, "Converting spend");
            (amount * rate, base)
        }
        None => {
            tracing::warn!(
                currency = code.as_str(),
                "Unsupported currency without a configured rate, sending as-is"
            );
            (amount, code)
        }
    }
}
