use crate::{ImageRecord, SessionSummary};

pub mod console;
pub mod csv;

pub trait SessionLogger {
    fn log_record(&mut self, record: &ImageRecord);
    fn log_summary(&mut self, summary: &SessionSummary);
}
