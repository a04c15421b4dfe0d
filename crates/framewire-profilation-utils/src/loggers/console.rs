use log::{debug, info};

use crate::{ImageRecord, SessionSummary};

use super::SessionLogger;

#[derive(Default)]
pub struct ConsoleSessionLogger {
    header: Option<String>,
}

impl ConsoleSessionLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }
}

impl SessionLogger for ConsoleSessionLogger {
    fn log_record(&mut self, record: &ImageRecord) {
        debug!(
            "{}: {:.2} KB in {:.2} ms",
            record.label,
            record.message_bytes as f64 / 1024.0,
            record.elapsed_ms
        );
    }

    fn log_summary(&mut self, summary: &SessionSummary) {
        if summary.images == 0 {
            info!("No images were processed correctly");
            return;
        }

        if let Some(header) = &self.header {
            info!("{}", header);
        }

        for line in summary.to_string().lines() {
            info!("{}", line);
        }
    }
}
