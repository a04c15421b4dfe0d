use std::{collections::BTreeMap, fmt::Display, time::Instant};

use framewire_core::{field_vec, vec_avg};
use serde::{Deserialize, Serialize};

use self::loggers::SessionLogger;

pub mod loggers;

#[cfg(test)]
mod tests;

const MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Client,
    Server,
}

impl SessionRole {
    fn labels(&self) -> [&'static str; 6] {
        match self {
            SessionRole::Client => [
                "Total images sent",
                "Total data sent",
                "Average transmission time",
                "Total time",
                "Throughput",
                "Bandwidth",
            ],
            SessionRole::Server => [
                "Total images processed",
                "Total bytes received",
                "Average processing time",
                "Total time",
                "Throughput",
                "Bandwidth",
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub label: String,
    pub message_bytes: usize,
    pub elapsed_ms: f64,
}

/// Counters of one connection, owned by the peer serving it.
pub struct SessionStats {
    role: SessionRole,
    start_time: Instant,

    total_bytes: usize,
    records: Vec<ImageRecord>,

    loggers: Vec<Box<dyn SessionLogger + Send>>,
}

impl SessionStats {
    pub fn new(role: SessionRole) -> Self {
        Self {
            role,
            start_time: Instant::now(),
            total_bytes: 0,
            records: Vec::new(),
            loggers: Vec::new(),
        }
    }

    pub fn logger<T: 'static + SessionLogger + Send>(mut self, logger: T) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }

    pub fn restart(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn register_bytes(&mut self, bytes: usize) {
        self.total_bytes += bytes;
    }

    pub fn register_image(&mut self, record: ImageRecord) {
        for logger in &mut self.loggers {
            logger.log_record(&record);
        }

        self.records.push(record);
    }

    pub fn images(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn summary(&self) -> SessionSummary {
        let total_time_s = self.start_time.elapsed().as_secs_f64();
        let images = self.records.len();
        let elapsed_times = field_vec!(self.records, elapsed_ms, f64);

        let (throughput, bandwidth) = if total_time_s > 0.0 {
            (
                images as f64 / total_time_s,
                self.total_bytes as f64 / total_time_s / MEGABYTE,
            )
        } else {
            (0.0, 0.0)
        };

        SessionSummary {
            role: self.role,
            images,
            total_bytes: self.total_bytes,
            average_ms: vec_avg!(elapsed_times, f64),
            total_time_s,
            throughput,
            bandwidth,
        }
    }

    /// Computes the summary and hands it to every logger.
    pub fn finish(&mut self) -> SessionSummary {
        let summary = self.summary();

        for logger in &mut self.loggers {
            logger.log_summary(&summary);
        }

        summary
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub role: SessionRole,

    pub images: usize,
    pub total_bytes: usize,
    pub average_ms: f64,
    pub total_time_s: f64,

    /// Images per second
    pub throughput: f64,
    /// Megabytes per second
    pub bandwidth: f64,
}

impl SessionSummary {
    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / MEGABYTE
    }

    /// `(label, value, unit)` triples in the order of the printed summary.
    pub fn entries(&self) -> Vec<(&'static str, f64, &'static str)> {
        let [images, data, average, total, throughput, bandwidth] = self.role.labels();

        vec![
            (images, self.images as f64, ""),
            (data, self.total_megabytes(), "MB"),
            (average, self.average_ms, "ms"),
            (total, self.total_time_s, "s"),
            (throughput, self.throughput, "img/s"),
            (bandwidth, self.bandwidth, "MB/s"),
        ]
    }

    pub fn to_metrics(&self) -> BTreeMap<String, f64> {
        self.entries()
            .into_iter()
            .map(|(label, value, _)| (label.to_string(), value))
            .collect()
    }
}

impl Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, value, unit) in self.entries() {
            if unit.is_empty() {
                writeln!(f, "{}: {}", label, value)?;
            } else {
                writeln!(f, "{}: {:.2} {}", label, value, unit)?;
            }
        }

        Ok(())
    }
}
