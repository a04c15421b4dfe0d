use std::{fs::File, path::Path};

use csv::Writer;
use log::warn;

use crate::{ImageRecord, SessionSummary};

use super::SessionLogger;

pub struct CsvSessionLogger {
    writer: Writer<File>,
}

impl CsvSessionLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl SessionLogger for CsvSessionLogger {
    fn log_record(&mut self, record: &ImageRecord) {
        if let Err(e) = self.writer.serialize(record) {
            warn!("Unable to write CSV record for {}: {}", record.label, e);
        }
    }

    fn log_summary(&mut self, _summary: &SessionSummary) {
        if let Err(e) = self.writer.flush() {
            warn!("Unable to flush CSV log: {}", e);
        }
    }
}
