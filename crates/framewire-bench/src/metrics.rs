use std::{collections::BTreeMap, fmt::Display};

use framewire_core::strategy::Strategy;
use framewire_profilation_utils::SessionSummary;
use log::warn;
use serde::{Deserialize, Serialize};

const UNIT_SUFFIXES: [&str; 5] = ["MB/s", "img/s", "MB", "ms", "s"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Text values still count when they start with a number, like `"12.5 s"`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(value) => Some(*value),
            MetricValue::Text(text) => text
                .split_whitespace()
                .next()
                .and_then(|token| token.parse().ok()),
        }
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(value) => write!(f, "{:.2}", value),
            MetricValue::Text(text) => f.write_str(text),
        }
    }
}

pub type Metrics = BTreeMap<String, MetricValue>;

/// Scans a client's standard output for its summary block and collects the
/// `key: value` lines following the header. Values that are not a number,
/// optionally followed by a known unit, are kept as text.
pub fn extract_metrics(output: &str) -> Metrics {
    let headers = Strategy::all().map(|strategy| strategy.summary_header());

    let mut metrics = Metrics::new();
    let mut in_summary = false;

    for line in output.lines() {
        if headers.iter().any(|header| line.starts_with(header.as_str())) {
            in_summary = true;
            continue;
        }

        if !in_summary || line.trim().is_empty() {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            metrics.insert(key.trim().to_string(), parse_value(value.trim()));
        }
    }

    metrics
}

pub fn metrics_from_summary(summary: &SessionSummary) -> Metrics {
    summary
        .to_metrics()
        .into_iter()
        .map(|(key, value)| (key, MetricValue::Number(value)))
        .collect()
}

fn parse_value(value: &str) -> MetricValue {
    let mut tokens = value.split_whitespace();

    let number = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(number), None, _) => number.parse().ok(),
        (Some(number), Some(unit), None) if UNIT_SUFFIXES.contains(&unit) => number.parse().ok(),
        _ => None,
    };

    match number {
        Some(number) => MetricValue::Number(number),
        None => {
            warn!("Keeping unparsable metric value as text: '{}'", value);
            MetricValue::Text(value.to_string())
        }
    }
}
