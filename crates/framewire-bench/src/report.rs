use std::{fs::File, io::BufWriter, path::Path};

use framewire_core::error::Result;
use image::{Rgb, RgbImage};
use itertools::Itertools;
use log::info;

use crate::{
    metrics::MetricValue,
    orchestrator::BenchmarkReport,
    process::BenchmarkResult,
};

const THROUGHPUT: &str = "Throughput";
const LATENCY: &str = "Average transmission time";
const BANDWIDTH: &str = "Bandwidth";
const TOTAL_TIME: &str = "Total time";

const PANEL_WIDTH: u32 = 750;
const PANEL_HEIGHT: u32 = 500;
const PANEL_MARGIN: u32 = 50;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);

/// Chart panels, laid out row by row in a 2x2 grid.
const PANELS: [(&str, Rgb<u8>); 4] = [
    (THROUGHPUT, Rgb([135, 206, 235])),
    (LATENCY, Rgb([250, 128, 114])),
    (BANDWIDTH, Rgb([144, 238, 144])),
    (TOTAL_TIME, Rgb([255, 165, 0])),
];

fn metric_cell(result: &BenchmarkResult, key: &str) -> String {
    result
        .metrics
        .get(key)
        .map(MetricValue::to_string)
        .unwrap_or_else(|| "N/A".to_string())
}

fn metric_number(result: &BenchmarkResult, key: &str) -> f64 {
    result
        .metrics
        .get(key)
        .and_then(MetricValue::as_number)
        .unwrap_or(0.0)
}

impl BenchmarkReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn table(&self) -> String {
        let mut lines = vec![
            "=".repeat(80),
            "COMPARATIVE REPORT OF TRANSMISSION METHODS".to_string(),
            "=".repeat(80),
            format!(
                "{:<10} {:<20} {:<15} {:<20} {:<15}",
                "Method", "Throughput (img/s)", "Latency (ms)", "Bandwidth (MB/s)", "Total time (s)"
            ),
            "-".repeat(85),
        ];

        for (strategy, result) in &self.results {
            lines.push(format!(
                "{:<10} {:<20} {:<15} {:<20} {:<15}",
                strategy.name(),
                metric_cell(result, THROUGHPUT),
                metric_cell(result, LATENCY),
                metric_cell(result, BANDWIDTH),
                metric_cell(result, TOTAL_TIME),
            ));
        }

        lines.push("=".repeat(85));

        lines.iter().join("\n")
    }

    pub fn print_table(&self) {
        println!("\n{}\n", self.table());
    }

    /// Dumps every captured result as JSON, keyed by strategy name.
    pub fn write_results(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.results)?;

        info!("Results saved in {}", path.display());
        Ok(())
    }

    /// Draws one bar panel per compared metric, bars in strategy order.
    pub fn draw_chart(&self, path: &Path) -> Result<()> {
        let mut chart = RgbImage::from_pixel(PANEL_WIDTH * 2, PANEL_HEIGHT * 2, BACKGROUND);

        for (idx, (key, color)) in PANELS.iter().enumerate() {
            let values = self
                .results
                .values()
                .map(|result| metric_number(result, key))
                .collect::<Vec<f64>>();

            let origin_x = (idx as u32 % 2) * PANEL_WIDTH;
            let origin_y = (idx as u32 / 2) * PANEL_HEIGHT;
            draw_panel(&mut chart, origin_x, origin_y, &values, *color);
        }

        chart.save(path)?;

        info!("Graph saved as {}", path.display());
        Ok(())
    }
}

fn draw_panel(chart: &mut RgbImage, origin_x: u32, origin_y: u32, values: &[f64], color: Rgb<u8>) {
    let plot_width = PANEL_WIDTH - 2 * PANEL_MARGIN;
    let plot_height = PANEL_HEIGHT - 2 * PANEL_MARGIN;
    let baseline = origin_y + PANEL_MARGIN + plot_height;
    let left = origin_x + PANEL_MARGIN;

    fill_rect(chart, left, origin_y + PANEL_MARGIN, 2, plot_height, AXIS);
    fill_rect(chart, left, baseline, plot_width, 2, AXIS);

    if values.is_empty() {
        return;
    }

    let max_value = values.iter().cloned().fold(0.0, f64::max);
    let slot_width = plot_width / values.len() as u32;
    let bar_width = slot_width * 3 / 5;

    for (idx, value) in values.iter().enumerate() {
        let bar_height = if max_value > 0.0 {
            ((value.max(0.0) / max_value) * plot_height as f64) as u32
        } else {
            0
        };

        let bar_x = left + idx as u32 * slot_width + (slot_width - bar_width) / 2;
        fill_rect(chart, bar_x, baseline - bar_height, bar_width, bar_height, color);
    }
}

fn fill_rect(chart: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..(y + height).min(chart.height()) {
        for px in x..(x + width).min(chart.width()) {
            chart.put_pixel(px, py, color);
        }
    }
}
